//! ### English
//! Lock-free primitives used to hand work to the GL-owning thread.
//!
//! ### 中文
//! 用于把工作移交给 GL 持有线程的无锁原语。
mod mpsc;

pub(crate) use mpsc::MpscQueue;
