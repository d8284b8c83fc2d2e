// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 一次性完成信号
//! One-shot completion signal (write once, read many)

use crate::error::{PipelineError, Result};
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// 一次写入、多次读取的完成信号
///
/// 生产者在推送完所有帧后调用 `set(总数)`; 消费者通过 `try_get` 有限等待读取。
pub struct CompletionSignal<V> {
    value: Mutex<Option<V>>,
    ready: Condvar,
}

impl<V: Clone> CompletionSignal<V> {
    pub fn new() -> Self {
        Self {
            value: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    /// 写入最终值; 重复写入返回 `SignalAlreadySet`, 首次写入的值保持不变
    pub fn set(&self, value: V) -> Result<()> {
        let mut slot = self.value.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Err(PipelineError::SignalAlreadySet);
        }
        *slot = Some(value);
        self.ready.notify_all();
        Ok(())
    }

    /// 最多等待 `timeout` 读取值, 未设置时返回 `None`
    pub fn try_get(&self, timeout: Duration) -> Option<V> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.value.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(value) = slot.as_ref() {
                return Some(value.clone());
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            // 处理虚假唤醒: 按剩余时间继续等待
            slot = self
                .ready
                .wait_timeout(slot, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    pub fn is_set(&self) -> bool {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl<V: Clone> Default for CompletionSignal<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_unset_times_out() {
        let signal: CompletionSignal<usize> = CompletionSignal::new();
        let start = Instant::now();
        assert_eq!(signal.try_get(Duration::from_millis(30)), None);
        assert!(start.elapsed() >= Duration::from_millis(30));
        assert!(!signal.is_set());
    }

    #[test]
    fn test_set_then_read_many_times() {
        let signal = CompletionSignal::new();
        signal.set(5usize).unwrap();
        for _ in 0..10 {
            assert_eq!(signal.try_get(Duration::ZERO), Some(5));
        }
        assert!(signal.is_set());
    }

    #[test]
    fn test_second_set_is_rejected() {
        let signal = CompletionSignal::new();
        signal.set(3usize).unwrap();
        assert!(matches!(signal.set(4), Err(PipelineError::SignalAlreadySet)));
        assert_eq!(signal.try_get(Duration::ZERO), Some(3));
    }

    #[test]
    fn test_waiting_reader_wakes_on_set() {
        let signal = Arc::new(CompletionSignal::new());
        let reader_signal = Arc::clone(&signal);

        let reader = thread::spawn(move || reader_signal.try_get(Duration::from_secs(5)));

        thread::sleep(Duration::from_millis(20));
        let set_at = Instant::now();
        signal.set(9usize).unwrap();

        assert_eq!(reader.join().unwrap(), Some(9));
        assert!(set_at.elapsed() < Duration::from_secs(5));
    }
}
