// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 检测系统 (Detection System)
//!
//! 消费者线程对每一帧调用 `FrameProcessor::process`:
//! - ObjectDetector: 预处理 → 推理后端 → 置信度过滤 + NMS → 画框
//! - Passthrough:    原样返回 (未配置模型时)
pub mod detector;
#[cfg(feature = "onnx")]
pub mod ort_backend;
pub mod types;

pub use detector::{InferenceBackend, ObjectDetector};
#[cfg(feature = "onnx")]
pub use ort_backend::OrtBackend;
pub use types::{non_max_suppression, Bbox};

/// 帧处理接口 (同步, CPU密集)
pub trait FrameProcessor<T>: Send {
    fn process(&mut self, item: T) -> anyhow::Result<T>;
}

impl<T, F> FrameProcessor<T> for F
where
    F: FnMut(T) -> anyhow::Result<T> + Send,
{
    fn process(&mut self, item: T) -> anyhow::Result<T> {
        self(item)
    }
}

/// 直通处理器
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl<T> FrameProcessor<T> for Passthrough {
    fn process(&mut self, item: T) -> anyhow::Result<T> {
        Ok(item)
    }
}
