// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 视频帧与流元数据
//! Frame item and stream metadata

use image::RgbImage;
use serde::{Deserialize, Serialize};

/// 解码后的视频帧
///
/// 所有权在 源 → 队列 → 消费者 之间整体转移, 因此不实现 `Clone`。
#[derive(Debug)]
pub struct Frame {
    pub index: u64, // 帧序号 (从0开始)
    pub image: RgbImage,
}

impl Frame {
    pub fn new(index: u64, image: RgbImage) -> Self {
        Self { index, image }
    }
}

/// 流的静态元数据 (启动时查询一次)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    pub frame_rate: f64,
    pub codec: String, // 编码标识 (类似FourCC)
    pub width: u32,
    pub height: u32,
}

impl Default for StreamInfo {
    fn default() -> Self {
        Self {
            frame_rate: 25.0,
            codec: String::from("raw"),
            width: 0,
            height: 0,
        }
    }
}
