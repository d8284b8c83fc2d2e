// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 命令行参数与检测器配置 (JSON文件)
//! Command-line arguments and detector configuration

use crate::error::{PipelineError, Result};
use crate::pipeline::PipelineConfig;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 视频帧检测流水线
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "视频帧目标检测流水线", long_about = None)]
pub struct Args {
    /// 输入图像序列目录
    #[arg(short, long)]
    pub input: PathBuf,

    /// 输出目录 (PNG序列 + stream.json)
    #[arg(short, long)]
    pub output: PathBuf,

    /// ONNX检测模型路径 (未指定时帧原样输出)
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// 检测器配置JSON
    #[arg(long)]
    pub detector_config: Option<PathBuf>,

    /// 最多处理的帧数
    #[arg(long)]
    pub max_frames: Option<usize>,

    /// 输入帧率
    #[arg(long, default_value_t = 25.0)]
    pub fps: f64,

    /// 消费者轮询完成信号的间隔 (毫秒)
    #[arg(long, default_value_t = 20, hide = true)]
    pub poll_interval_ms: u64,
}

impl Args {
    /// 启动前参数检查
    pub fn validate(&self) -> Result<()> {
        if !(self.fps > 0.0) || !self.fps.is_finite() {
            return Err(PipelineError::config(format!(
                "--fps must be a positive number, got {}",
                self.fps
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(PipelineError::config("--poll-interval-ms must be at least 1"));
        }
        Ok(())
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            max_items: self.max_frames,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

/// 检测器参数配置
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    // === 检测参数 ===
    pub conf_threshold: f32, // 检测置信度阈值
    pub nms_threshold: f32,  // NMS IOU阈值

    // === 模型输入 ===
    pub input_width: u32,
    pub input_height: u32,

    // === 绘制 ===
    pub box_color: [u8; 3], // RGB
    pub box_thickness: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            conf_threshold: 0.5,
            nms_threshold: 0.4,
            input_width: 416,
            input_height: 416,
            box_color: [50, 178, 255],
            box_thickness: 3,
        }
    }
}

impl DetectorConfig {
    /// 从JSON文件加载配置; 缺失字段使用默认值
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            PipelineError::config(format!("reading {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|e| {
            PipelineError::config(format!("parsing {}: {}", path.display(), e))
        })?;
        config.validate()?;
        log::info!("✅ 检测器配置已从 {} 加载", path.display());
        Ok(config)
    }

    /// 保存配置到JSON文件
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.conf_threshold) {
            return Err(PipelineError::config(format!(
                "conf_threshold must be in [0, 1], got {}",
                self.conf_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.nms_threshold) {
            return Err(PipelineError::config(format!(
                "nms_threshold must be in [0, 1], got {}",
                self.nms_threshold
            )));
        }
        if self.input_width == 0 || self.input_height == 0 {
            return Err(PipelineError::config("model input size must be non-zero"));
        }
        Ok(())
    }

    /// 打印当前配置
    pub fn log_summary(&self) {
        log::info!(
            "🎛️  检测器配置: 置信度 {:.2} | NMS {:.2} | 输入 {}x{}",
            self.conf_threshold,
            self.nms_threshold,
            self.input_width,
            self.input_height
        );
    }
}
