// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 生产者: 帧源 → 队列, 结束时发布总帧数
//! Producer task
use super::queue::BlockingQueue;
use super::signal::CompletionSignal;
use crate::error::{PipelineError, Result};
use crate::input::FrameSource;
use std::sync::Arc;
use std::time::Instant;

/// 生产者任务
pub struct Producer<T, S> {
    source: S,
    queue: Arc<BlockingQueue<T>>,
    signal: Arc<CompletionSignal<usize>>,
    max_items: Option<usize>,
}

/// 保证完成信号一定被发布 (包括线程panic的情况)
struct PublishGuard<'a> {
    signal: &'a CompletionSignal<usize>,
    produced: usize,
    published: bool,
}

impl PublishGuard<'_> {
    fn publish(&mut self) -> Result<()> {
        self.published = true;
        self.signal.set(self.produced)
    }
}

impl Drop for PublishGuard<'_> {
    fn drop(&mut self) {
        if !self.published {
            log::error!("❌ 生产者异常退出, 发布已推送帧数 {}", self.produced);
            let _ = self.signal.set(self.produced);
        }
    }
}

impl<T, S: FrameSource<T>> Producer<T, S> {
    pub fn new(
        source: S,
        queue: Arc<BlockingQueue<T>>,
        signal: Arc<CompletionSignal<usize>>,
        max_items: Option<usize>,
    ) -> Self {
        Self {
            source,
            queue,
            signal,
            max_items,
        }
    }

    /// 运行至流结束或达到 `max_items`, 返回推送的帧数
    ///
    /// 源故障时先发布已推送帧数, 再返回 `PipelineError::Source`。
    pub fn run(mut self) -> Result<usize> {
        let start = Instant::now();
        let mut guard = PublishGuard {
            signal: &self.signal,
            produced: 0,
            published: false,
        };
        log::info!("🎬 生产者启动 (max_items: {:?})", self.max_items);

        let outcome = loop {
            if self.max_items == Some(guard.produced) {
                log::info!("⏹️  达到最大帧数 {}", guard.produced);
                break Ok(());
            }
            match self.source.next_frame() {
                Ok(Some(item)) => {
                    self.queue.push(item);
                    guard.produced += 1;
                }
                Ok(None) => {
                    log::info!("📭 帧源结束");
                    break Ok(());
                }
                Err(e) => {
                    log::error!("❌ 帧源读取失败 (已推送 {} 帧): {:#}", guard.produced, e);
                    break Err(PipelineError::Source(e));
                }
            }
        };

        let produced = guard.produced;
        let published = guard.publish();
        log::info!(
            "✅ 生产者退出: {} 帧 ({:.2}s)",
            produced,
            start.elapsed().as_secs_f64()
        );

        match (outcome, published) {
            (Err(e), Err(set_err)) => {
                log::warn!("⚠️  完成信号发布失败: {}", set_err);
                Err(e)
            }
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
            (Ok(()), Ok(())) => Ok(produced),
        }
    }
}
