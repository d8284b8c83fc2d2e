// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 视频输入系统 (Video Input System)
//!
//! 生产者线程从 `FrameSource` 拉取帧:
//! - ImageSequenceSource: 按文件名排序的图像序列目录
//! - IterSource: 任意迭代器 (测试/合成流)
pub mod image_sequence;

pub use image_sequence::ImageSequenceSource;

use crate::frame::StreamInfo;

/// 帧源接口
///
/// `Ok(None)` 表示流正常结束, `Err` 表示源故障, 两者必须区分。
pub trait FrameSource<T>: Send {
    /// 拉取下一帧
    fn next_frame(&mut self) -> anyhow::Result<Option<T>>;

    /// 流元数据
    fn stream_info(&self) -> StreamInfo {
        StreamInfo::default()
    }
}

impl<T> FrameSource<T> for Box<dyn FrameSource<T>> {
    fn next_frame(&mut self) -> anyhow::Result<Option<T>> {
        (**self).next_frame()
    }

    fn stream_info(&self) -> StreamInfo {
        (**self).stream_info()
    }
}

/// 迭代器帧源
pub struct IterSource<I> {
    iter: I,
    info: StreamInfo,
}

impl<I> IterSource<I> {
    pub fn new<J: IntoIterator<IntoIter = I>>(items: J) -> Self {
        Self {
            iter: items.into_iter(),
            info: StreamInfo::default(),
        }
    }

    pub fn with_info(mut self, info: StreamInfo) -> Self {
        self.info = info;
        self
    }
}

impl<I> FrameSource<I::Item> for IterSource<I>
where
    I: Iterator + Send,
{
    fn next_frame(&mut self) -> anyhow::Result<Option<I::Item>> {
        Ok(self.iter.next())
    }

    fn stream_info(&self) -> StreamInfo {
        self.info.clone()
    }
}
