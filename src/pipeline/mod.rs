// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 视频处理流水线 (Video Processing Pipeline)
//!
//! 双线程架构, 通过阻塞队列 + 一次性完成信号通信:
//! - Producer: 帧源 → 队列, 结束后发布总帧数 (独立线程)
//! - Consumer: 队列 → 处理器 → 输出, 消费数等于总数时退出 (独立线程)
//!
//! 两个线程结束后, 生产数必须等于消费数, 否则返回 `PipelineError::Integrity`。
pub mod consumer;
pub mod producer;
pub mod queue;
pub mod signal;

pub use consumer::Consumer;
pub use producer::Producer;
pub use queue::BlockingQueue;
pub use signal::CompletionSignal;

use crate::detection::FrameProcessor;
use crate::error::{PipelineError, Result};
use crate::input::FrameSource;
use crate::output::FrameSink;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// 消费者默认轮询间隔
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// 流水线配置
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    pub max_items: Option<usize>, // 最多生产的帧数, None表示直到流结束
    pub poll_interval: Duration,  // 消费者等待完成信号的有限时长
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_items: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// 一次运行的统计
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineReport {
    pub produced: usize,
    pub consumed: usize,
    pub elapsed: Duration,
}

impl PipelineReport {
    pub fn fps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.consumed as f64 / secs
        } else {
            0.0
        }
    }
}

/// 生产数与消费数必须相等
pub fn check_integrity(produced: usize, consumed: usize) -> Result<()> {
    if produced != consumed {
        return Err(PipelineError::Integrity { produced, consumed });
    }
    Ok(())
}

/// 流水线编排器
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// 启动生产者与消费者线程并等待两者结束
    pub fn run<T, S, P, K>(&self, source: S, processor: P, sink: K) -> Result<PipelineReport>
    where
        T: Send + 'static,
        S: FrameSource<T> + 'static,
        P: FrameProcessor<T> + 'static,
        K: FrameSink<T> + 'static,
    {
        let start = Instant::now();
        let queue = Arc::new(BlockingQueue::new());
        let signal = Arc::new(CompletionSignal::new());

        let producer = Producer::new(
            source,
            Arc::clone(&queue),
            Arc::clone(&signal),
            self.config.max_items,
        );
        let consumer = Consumer::new(
            Arc::clone(&queue),
            Arc::clone(&signal),
            processor,
            sink,
            self.config.poll_interval,
        );

        let producer = thread::Builder::new()
            .name("frame-producer".to_string())
            .spawn(move || producer.run())?;
        let consumer = match thread::Builder::new()
            .name("frame-consumer".to_string())
            .spawn(move || consumer.run())
        {
            Ok(consumer) => consumer,
            Err(e) => {
                // 生产者独立结束, 队列随之释放
                let _ = producer.join();
                return Err(e.into());
            }
        };

        // 错误优先级: 线程panic > 生产者错误 > 消费者错误 > 完整性
        let produced = join_worker(producer, "producer");
        let consumed = join_worker(consumer, "consumer");
        let (produced, consumed) = match (produced, consumed) {
            (Err(e @ PipelineError::WorkerPanicked(_)), _)
            | (_, Err(e @ PipelineError::WorkerPanicked(_))) => return Err(e),
            (Err(e), _) | (_, Err(e)) => return Err(e),
            (Ok(produced), Ok(consumed)) => (produced, consumed),
        };

        if let Err(e) = check_integrity(produced, consumed) {
            log::error!("❌ {}", e);
            return Err(e);
        }

        let report = PipelineReport {
            produced,
            consumed,
            elapsed: start.elapsed(),
        };
        log::info!(
            "📊 流水线完成: {} 帧 | {:.2}s | {:.1}fps",
            report.consumed,
            report.elapsed.as_secs_f64(),
            report.fps()
        );
        Ok(report)
    }
}

fn join_worker(handle: JoinHandle<Result<usize>>, name: &'static str) -> Result<usize> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => {
            log::error!("❌ {} 线程panic", name);
            Err(PipelineError::WorkerPanicked(name))
        }
    }
}
