use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

struct Node<T> {
    next: AtomicPtr<Node<T>>,
    value: Option<T>,
}

impl<T> Node<T> {
    #[inline]
    fn boxed(value: Option<T>) -> *mut Self {
        Box::into_raw(Box::new(Self {
            next: AtomicPtr::new(ptr::null_mut()),
            value,
        }))
    }
}

/// ### English
/// Unbounded lock-free MPSC queue (multi-producer, single-consumer).
///
/// - FIFO per producer (Vyukov intrusive linked list with a stub node).
/// - `push` is wait-free and may be called from any thread.
/// - `pop` must only ever run on one thread at a time.
/// - `head` is only written by the consumer; it is atomic so `is_empty` may read it from any
///   thread.
///
/// ### 中文
/// 无界无锁 MPSC 队列（多生产者、单消费者）。
///
/// - 对每个生产者保持 FIFO（Vyukov 侵入式链表 + stub 节点）。
/// - `push` 为 wait-free，可在任意线程调用。
/// - `pop` 同一时刻只能有一个线程调用。
/// - `head` 只由消费者写入；它是原子的，因此 `is_empty` 可在任意线程读取。
pub(crate) struct MpscQueue<T> {
    head: AtomicPtr<Node<T>>,
    tail: AtomicPtr<Node<T>>,
}

unsafe impl<T: Send> Send for MpscQueue<T> {}
unsafe impl<T: Send> Sync for MpscQueue<T> {}

impl<T> MpscQueue<T> {
    pub(crate) fn new() -> Self {
        let stub = Node::boxed(None);
        Self {
            head: AtomicPtr::new(stub),
            tail: AtomicPtr::new(stub),
        }
    }

    /// ### English
    /// Appends `value` at the tail.
    ///
    /// ### 中文
    /// 将 `value` 追加到队尾。
    #[inline]
    pub(crate) fn push(&self, value: T) {
        let node = Node::boxed(Some(value));
        let prev = self.tail.swap(node, Ordering::AcqRel);
        unsafe {
            (*prev).next.store(node, Ordering::Release);
        }
    }

    /// ### English
    /// Removes the oldest linked value.
    ///
    /// Never waits: a producer that already swapped the tail but has not linked its node yet has
    /// not finished its `push`, so `None` is returned and a later `pop` picks the value up.
    ///
    /// # Safety
    /// Callers must guarantee that no other thread runs `pop` concurrently.
    ///
    /// ### 中文
    /// 取出最早链接入队的值。
    ///
    /// 从不等待：已交换 tail 但尚未完成链接的生产者还没有完成 `push`，此时返回 `None`，
    /// 由之后的 `pop` 取走该值。
    ///
    /// # Safety
    /// 调用方必须保证没有其他线程并发调用 `pop`。
    pub(crate) unsafe fn pop(&self) -> Option<T> {
        let head = self.head.load(Ordering::Relaxed);
        let next = unsafe { (*head).next.load(Ordering::Acquire) };
        if next.is_null() {
            return None;
        }

        self.head.store(next, Ordering::Release);
        unsafe {
            let value = (*next).value.take();
            drop(Box::from_raw(head));
            value
        }
    }

    /// ### English
    /// Returns `true` if no push has started at the moment of the call (racy hint).
    ///
    /// ### 中文
    /// 调用瞬间若没有任何已开始的 push 则返回 `true`（仅为竞态提示）。
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        let head = self.head.load(Ordering::Acquire);
        self.tail.load(Ordering::Acquire) == head
    }
}

impl<T> Drop for MpscQueue<T> {
    fn drop(&mut self) {
        while let Some(value) = unsafe { self.pop() } {
            drop(value);
        }

        let head = *self.head.get_mut();
        unsafe {
            drop(Box::from_raw(head));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use super::{MpscQueue, Node};

    #[test]
    fn pops_in_push_order() {
        let queue = MpscQueue::new();
        assert!(queue.is_empty());
        for i in 0..5 {
            queue.push(i);
        }
        assert!(!queue.is_empty());

        let drained: Vec<i32> = std::iter::from_fn(|| unsafe { queue.pop() }).collect();
        assert_eq!(drained, vec![0, 1, 2, 3, 4]);
        assert!(queue.is_empty());
        assert_eq!(unsafe { queue.pop() }, None);
    }

    #[test]
    fn keeps_per_producer_order_across_threads() {
        const PRODUCERS: usize = 4;
        const PER_PRODUCER: usize = 500;

        let queue = Arc::new(MpscQueue::new());
        let handles: Vec<_> = (0..PRODUCERS)
            .map(|producer| {
                let queue = queue.clone();
                thread::spawn(move || {
                    for seq in 0..PER_PRODUCER {
                        queue.push((producer, seq));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut next_expected = [0usize; PRODUCERS];
        let mut total = 0;
        while let Some((producer, seq)) = unsafe { queue.pop() } {
            assert_eq!(seq, next_expected[producer]);
            next_expected[producer] += 1;
            total += 1;
        }
        assert_eq!(total, PRODUCERS * PER_PRODUCER);
    }

    #[test]
    fn pop_does_not_wait_for_an_unlinked_push() {
        let queue = Arc::new(MpscQueue::new());
        queue.push(1);

        // First half of a push: the tail moves, the link is not stored yet.
        let node = Node::boxed(Some(2));
        let prev = queue.tail.swap(node, Ordering::AcqRel);

        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || {
                let first = unsafe { queue.pop() };
                let second = unsafe { queue.pop() };
                (first, second)
            })
        };
        assert_eq!(consumer.join().unwrap(), (Some(1), None));
        assert!(!queue.is_empty());

        unsafe { (*prev).next.store(node, Ordering::Release) };
        assert_eq!(unsafe { queue.pop() }, Some(2));
        assert_eq!(unsafe { queue.pop() }, None);
        assert!(queue.is_empty());
    }

    #[test]
    fn drop_releases_unpopped_values() {
        struct Tracked(Arc<AtomicUsize>);
        impl Drop for Tracked {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let dropped = Arc::new(AtomicUsize::new(0));
        {
            let queue = MpscQueue::new();
            queue.push(Tracked(dropped.clone()));
            queue.push(Tracked(dropped.clone()));
        }
        assert_eq!(dropped.load(Ordering::SeqCst), 2);
    }
}
