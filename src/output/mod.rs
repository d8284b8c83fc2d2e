// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 视频输出系统 (Video Output System)
//!
//! 消费者线程把处理后的帧写入 `FrameSink`:
//! - ImageSequenceSink: 编号PNG序列 + stream.json 元数据
//! - MemorySink: 内存收集 (测试/嵌入)
pub mod image_sequence;

pub use image_sequence::ImageSequenceSink;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// 帧输出接口
pub trait FrameSink<T>: Send {
    fn write(&mut self, item: T) -> anyhow::Result<()>;

    /// 释放资源; 可重复调用
    fn close(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<T> FrameSink<T> for Box<dyn FrameSink<T>> {
    fn write(&mut self, item: T) -> anyhow::Result<()> {
        (**self).write(item)
    }

    fn close(&mut self) -> anyhow::Result<()> {
        (**self).close()
    }
}

/// 内存帧收集器
///
/// 写入的帧保存在共享句柄中, 流水线结束后可通过 `handle()` 读取。
pub struct MemorySink<T> {
    items: Arc<Mutex<Vec<T>>>,
    closed: Arc<AtomicBool>,
}

impl<T> MemorySink<T> {
    pub fn new() -> Self {
        Self {
            items: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn handle(&self) -> MemorySinkHandle<T> {
        MemorySinkHandle {
            items: Arc::clone(&self.items),
            closed: Arc::clone(&self.closed),
        }
    }
}

impl<T> Default for MemorySink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> FrameSink<T> for MemorySink<T> {
    fn write(&mut self, item: T) -> anyhow::Result<()> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(item);
        Ok(())
    }

    fn close(&mut self) -> anyhow::Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

/// `MemorySink` 的只读句柄
pub struct MemorySinkHandle<T> {
    items: Arc<Mutex<Vec<T>>>,
    closed: Arc<AtomicBool>,
}

impl<T> MemorySinkHandle<T> {
    pub fn len(&self) -> usize {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// 取出全部已写入的帧
    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.items.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
