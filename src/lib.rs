#![allow(clippy::too_many_arguments)]
// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
pub mod config; // 命令行参数与检测器配置
pub mod detection; // 目标检测 (帧处理器)
pub mod error; // 错误类型
pub mod frame; // 帧与流元数据
pub mod input; // 视频输入 (帧源)
pub mod output; // 视频输出 (帧输出)
pub mod pipeline; // 生产者/消费者流水线

pub use crate::config::{Args, DetectorConfig};
pub use crate::detection::{
    non_max_suppression, Bbox, FrameProcessor, InferenceBackend, ObjectDetector, Passthrough,
};
pub use crate::error::{PipelineError, Result};
pub use crate::frame::{Frame, StreamInfo};
pub use crate::input::{FrameSource, ImageSequenceSource, IterSource};
pub use crate::output::{FrameSink, ImageSequenceSink, MemorySink};
pub use crate::pipeline::{
    check_integrity, BlockingQueue, CompletionSignal, Pipeline, PipelineConfig, PipelineReport,
};
