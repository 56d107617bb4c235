use std::sync::Arc;

use super::DeferredCallQueue;

/// ### English
/// Cloneable, thread-safe handle used to schedule work onto the GL-owning thread.
///
/// The headless context itself is pinned to its thread; hand this handle to worker threads
/// instead.
///
/// ### 中文
/// 可克隆、线程安全的句柄，用于把工作调度到 GL 持有线程。
///
/// headless 上下文本身固定在所属线程；请将该句柄交给工作线程使用。
#[derive(Clone)]
pub struct CallAsyncHandle {
    queue: Arc<DeferredCallQueue>,
}

impl CallAsyncHandle {
    pub(crate) fn new(queue: Arc<DeferredCallQueue>) -> Self {
        Self { queue }
    }

    /// ### English
    /// Schedules `callback` to run during the owner's next `poll`.
    ///
    /// ### 中文
    /// 调度 `callback`，在持有线程下一次 `poll` 时执行。
    pub fn call_async<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue.submit(callback);
    }
}
