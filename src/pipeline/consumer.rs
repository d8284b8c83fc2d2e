// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 消费者: 队列 → 处理器 → 输出, 消费数等于生产者发布的总数时退出
//! Consumer task
use super::queue::BlockingQueue;
use super::signal::CompletionSignal;
use crate::detection::FrameProcessor;
use crate::error::{PipelineError, Result};
use crate::output::FrameSink;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 消费者任务
pub struct Consumer<T, P, K> {
    queue: Arc<BlockingQueue<T>>,
    signal: Arc<CompletionSignal<usize>>,
    processor: P,
    sink: K,
    poll_interval: Duration,
}

impl<T, P, K> Consumer<T, P, K>
where
    P: FrameProcessor<T>,
    K: FrameSink<T>,
{
    pub fn new(
        queue: Arc<BlockingQueue<T>>,
        signal: Arc<CompletionSignal<usize>>,
        processor: P,
        sink: K,
        poll_interval: Duration,
    ) -> Self {
        Self {
            queue,
            signal,
            processor,
            sink,
            poll_interval,
        }
    }

    /// 运行至消费数等于发布的总数, 返回消费的帧数
    ///
    /// 总数未知时只做有限等待 (`pop_timeout`), 已知且未消费完时才无限等待 `pop`:
    /// 此时剩余的帧一定已经入队。
    pub fn run(mut self) -> Result<usize> {
        let start = Instant::now();
        let mut consumed = 0usize;
        let mut total: Option<usize> = None;
        log::info!("🔍 消费者启动");

        let outcome = loop {
            if total.is_none() {
                // 队列有积压时不等待信号
                let wait = if self.queue.is_empty() {
                    self.poll_interval
                } else {
                    Duration::ZERO
                };
                total = self.signal.try_get(wait);
                if let Some(total) = total {
                    log::debug!("生产者完成, 总帧数 {}", total);
                }
            }

            let item = match total {
                Some(total) if consumed >= total => break Ok(()),
                Some(_) => self.queue.pop(),
                None => match self.queue.pop_timeout(self.poll_interval) {
                    Some(item) => item,
                    None => continue,
                },
            };

            if let Err(e) = self.handle(item) {
                log::error!("❌ 第 {} 帧处理失败: {}", consumed, e);
                break Err(e);
            }
            consumed += 1;
        };

        let closed = self.sink.close().map_err(PipelineError::Sink);
        let elapsed = start.elapsed().as_secs_f64();
        log::info!(
            "✅ 消费者退出: {} 帧 ({:.2}s, {:.1}fps)",
            consumed,
            elapsed,
            if elapsed > 0.0 { consumed as f64 / elapsed } else { 0.0 }
        );

        match (outcome, closed) {
            (Err(e), Err(close_err)) => {
                log::warn!("⚠️  输出关闭失败: {}", close_err);
                Err(e)
            }
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
            (Ok(()), Ok(())) => Ok(consumed),
        }
    }

    fn handle(&mut self, item: T) -> Result<()> {
        let item = self
            .processor
            .process(item)
            .map_err(PipelineError::Processor)?;
        self.sink.write(item).map_err(PipelineError::Sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::Passthrough;
    use crate::output::MemorySink;
    use std::thread;

    const POLL: Duration = Duration::from_millis(10);

    fn setup() -> (Arc<BlockingQueue<u32>>, Arc<CompletionSignal<usize>>) {
        (
            Arc::new(BlockingQueue::new()),
            Arc::new(CompletionSignal::new()),
        )
    }

    #[test]
    fn test_drains_prefilled_queue() {
        let (queue, signal) = setup();
        for i in 0..3 {
            queue.push(i);
        }
        signal.set(3).unwrap();

        let sink = MemorySink::new();
        let handle = sink.handle();
        let consumer = Consumer::new(queue, signal, Passthrough, sink, POLL);

        assert_eq!(consumer.run().unwrap(), 3);
        assert_eq!(handle.take(), vec![0, 1, 2]);
        assert!(handle.is_closed());
    }

    #[test]
    fn test_zero_total_stops_immediately() {
        let (queue, signal) = setup();
        signal.set(0).unwrap();
        let consumer = Consumer::new(queue, signal, Passthrough, MemorySink::new(), POLL);
        assert_eq!(consumer.run().unwrap(), 0);
    }

    #[test]
    fn test_signal_without_further_pushes_does_not_hang() {
        // 消费者清空队列后, 生产者在不再推送的情况下才发布总数
        let (queue, signal) = setup();
        queue.push(1);

        let sink = MemorySink::new();
        let handle = sink.handle();
        let consumer = Consumer::new(
            Arc::clone(&queue),
            Arc::clone(&signal),
            Passthrough,
            sink,
            POLL,
        );
        let worker = thread::spawn(move || consumer.run());

        while handle.len() != 1 {
            thread::yield_now();
        }
        thread::sleep(Duration::from_millis(50));
        signal.set(1).unwrap();

        assert_eq!(worker.join().unwrap().unwrap(), 1);
    }

    #[test]
    fn test_processor_failure_stops_and_closes() {
        let (queue, signal) = setup();
        for i in 0..5 {
            queue.push(i);
        }
        signal.set(5).unwrap();

        let failing = |x: u32| -> anyhow::Result<u32> {
            if x == 2 {
                anyhow::bail!("bad frame");
            }
            Ok(x)
        };
        let sink = MemorySink::new();
        let handle = sink.handle();
        let consumer = Consumer::new(queue, signal, failing, sink, POLL);

        let err = consumer.run().err().unwrap();
        assert!(matches!(err, PipelineError::Processor(_)));
        assert_eq!(handle.take(), vec![0, 1]);
        assert!(handle.is_closed());
    }

    struct FailingSink;

    impl FrameSink<u32> for FailingSink {
        fn write(&mut self, _item: u32) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }
    }

    #[test]
    fn test_sink_failure() {
        let (queue, signal) = setup();
        queue.push(1);
        signal.set(1).unwrap();
        let consumer = Consumer::new(queue, signal, Passthrough, FailingSink, POLL);
        assert!(matches!(consumer.run(), Err(PipelineError::Sink(_))));
    }
}
