//! ### English
//! FIFO of deferred callbacks drained on the GL-owning thread.
//!
//! ### 中文
//! 在 GL 持有线程上 drain 的延迟回调 FIFO 队列。

use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::lockfree::MpscQueue;

/// ### English
/// Zero-argument callback payload accepted by [`DeferredCallQueue`].
///
/// ### 中文
/// [`DeferredCallQueue`] 接受的无参回调载荷。
pub type DeferredCall = Box<dyn FnOnce() + Send + 'static>;

/// ### English
/// Thread-safe queue of callbacks that must run on the thread owning the GL context.
///
/// Threading model:
/// - Any number of producers call [`Self::submit`] from any thread.
/// - The owning thread calls [`Self::drain`]; at most one drain runs at a time.
///
/// ### 中文
/// 必须在 GL 上下文持有线程上执行的回调的线程安全队列。
///
/// 线程模型：
/// - 任意数量的生产者可在任意线程调用 [`Self::submit`]。
/// - 持有线程调用 [`Self::drain`]；同一时刻最多只有一个 drain 在运行。
pub struct DeferredCallQueue {
    /// ### English
    /// Pending callbacks in submission order.
    ///
    /// ### 中文
    /// 按提交顺序排列的待执行回调。
    pending: MpscQueue<DeferredCall>,
    /// ### English
    /// Set while a drain is running; makes the MPSC consumer side exclusive.
    ///
    /// ### 中文
    /// drain 运行期间置位；保证 MPSC 消费端的独占性。
    draining: AtomicBool,
}

/// ### English
/// Clears the draining flag on every exit path, including a panicking callback.
///
/// ### 中文
/// 在所有退出路径（包括回调 panic）上清除 draining 标记。
struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl DeferredCallQueue {
    pub fn new() -> Self {
        Self {
            pending: MpscQueue::new(),
            draining: AtomicBool::new(false),
        }
    }

    /// ### English
    /// Appends `callback` to the pending sequence.
    ///
    /// Never blocks and never fails; the callback runs exactly once in a later [`Self::drain`].
    ///
    /// #### Parameters
    /// - `callback`: Work to run on the owning thread.
    ///
    /// ### 中文
    /// 将 `callback` 追加到待执行序列。
    ///
    /// 不阻塞、不会失败；该回调会在之后某次 [`Self::drain`] 中恰好执行一次。
    ///
    /// #### 参数
    /// - `callback`：需要在持有线程上执行的工作。
    pub fn submit<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit_boxed(Box::new(callback));
    }

    /// ### English
    /// Same as [`Self::submit`] for an already boxed callback.
    ///
    /// ### 中文
    /// 与 [`Self::submit`] 相同，接受已装箱的回调。
    pub fn submit_boxed(&self, callback: DeferredCall) {
        self.pending.push(callback);
    }

    /// ### English
    /// Runs pending callbacks on the calling thread until the queue is observed empty.
    ///
    /// Callbacks submitted while the drain runs may be picked up by the same pass. If another
    /// drain is already in progress (such as a callback calling `drain` re-entrantly), this
    /// call returns `0` immediately and the running drain executes the remaining work.
    ///
    /// Returns the number of callbacks executed by this call.
    ///
    /// ### 中文
    /// 在调用线程上执行待处理回调，直到观察到队列为空。
    ///
    /// drain 期间新提交的回调可能会在同一轮中执行。若已有 drain 在进行（例如回调内部重入调用
    /// `drain`），本次调用立即返回 `0`，剩余工作由正在运行的 drain 执行。
    ///
    /// 返回本次调用执行的回调数量。
    pub fn drain(&self) -> usize {
        if self.draining.swap(true, Ordering::AcqRel) {
            return 0;
        }
        let _guard = DrainGuard(&self.draining);

        let mut executed = 0;
        while let Some(callback) = unsafe { self.pending.pop() } {
            callback();
            executed += 1;
        }
        executed
    }

    /// ### English
    /// Returns `true` if nothing is pending at the moment of the call.
    ///
    /// ### 中文
    /// 调用瞬间若没有待处理回调则返回 `true`。
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Default for DeferredCallQueue {
    fn default() -> Self {
        Self::new()
    }
}
