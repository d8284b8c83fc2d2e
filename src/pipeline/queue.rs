// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 阻塞FIFO队列 (生产者 → 消费者)
//! Blocking FIFO hand-off queue

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// 无界阻塞队列
///
/// 队列同时持有发送端与接收端, 因此通道在队列存活期间不会断开:
/// `pop` 只会挂起等待, 不会返回占位值。
pub struct BlockingQueue<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> BlockingQueue<T> {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// 尾部插入, 唤醒至多一个等待中的 `pop`
    pub fn push(&self, item: T) {
        if self.tx.send(item).is_err() {
            unreachable!("queue owns its receiver");
        }
    }

    /// 取出队首元素, 队列为空时挂起当前线程
    pub fn pop(&self) -> T {
        match self.rx.recv() {
            Ok(item) => item,
            Err(_) => unreachable!("queue owns its sender"),
        }
    }

    /// 最多等待 `timeout`; 超时返回 `None`
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(item) => Some(item),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => unreachable!("queue owns its sender"),
        }
    }

    pub fn try_pop(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
