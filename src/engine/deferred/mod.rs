//! ### English
//! Deferred call queue: work submitted from any thread, executed by the GL-owning thread on poll.
//!
//! ### 中文
//! 延迟调用队列：任意线程提交工作，由 GL 持有线程在 poll 时执行。
mod handle;
mod queue;

pub use handle::CallAsyncHandle;
pub use queue::{DeferredCall, DeferredCallQueue};
