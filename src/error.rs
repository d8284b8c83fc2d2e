// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 流水线错误类型
//! Error taxonomy for the frame pipeline

use thiserror::Error;

/// 流水线结果类型
pub type Result<T> = std::result::Result<T, PipelineError>;

/// 流水线错误
///
/// - 启动错误: `SourceOpen` / `SinkOpen` / `Config`, 在任何线程启动前返回
/// - 运行错误: `Source` / `Processor` / `Sink`
/// - 完整性错误: `Integrity`, 生产数与消费数不一致
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to open frame source {path}: {reason}")]
    SourceOpen { path: String, reason: String },

    #[error("failed to open frame sink {path}: {reason}")]
    SinkOpen { path: String, reason: String },

    #[error("frame source failed: {0:#}")]
    Source(anyhow::Error),

    #[error("frame processor failed: {0:#}")]
    Processor(anyhow::Error),

    #[error("frame sink failed: {0:#}")]
    Sink(anyhow::Error),

    #[error("completion signal was already set")]
    SignalAlreadySet,

    #[error("frame count mismatch: produced {produced}, consumed {consumed}")]
    Integrity { produced: usize, consumed: usize },

    #[error("{0} thread panicked")]
    WorkerPanicked(&'static str),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn source_open<P: AsRef<std::path::Path>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::SourceOpen {
            path: path.as_ref().display().to_string(),
            reason: reason.into(),
        }
    }

    pub fn sink_open<P: AsRef<std::path::Path>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::SinkOpen {
            path: path.as_ref().display().to_string(),
            reason: reason.into(),
        }
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// 启动阶段错误 (无任何线程运行)
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            Self::SourceOpen { .. } | Self::SinkOpen { .. } | Self::Config(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrity_message_reports_both_counts() {
        let err = PipelineError::Integrity {
            produced: 5,
            consumed: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("produced 5"));
        assert!(msg.contains("consumed 4"));
    }

    #[test]
    fn test_startup_classification() {
        assert!(PipelineError::source_open("in", "missing").is_startup());
        assert!(PipelineError::config("bad threshold").is_startup());
        assert!(!PipelineError::SignalAlreadySet.is_startup());
    }

    #[test]
    fn test_source_error_keeps_context_chain() {
        let inner = anyhow::anyhow!("truncated file").context("reading frame 3");
        let msg = PipelineError::Source(inner).to_string();
        assert!(msg.contains("reading frame 3"));
        assert!(msg.contains("truncated file"));
    }
}
