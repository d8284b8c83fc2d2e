// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 图像序列输出: frame_000000.png ... + stream.json
//! Image sequence sink
use super::FrameSink;
use crate::error::{PipelineError, Result};
use crate::frame::{Frame, StreamInfo};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 元数据文件名
pub const METADATA_FILE: &str = "stream.json";

/// 输出目录元数据
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SequenceMetadata {
    pub stream: StreamInfo,
    pub frames_written: u64,
    pub created_at: String,
}

/// 图像序列输出
pub struct ImageSequenceSink {
    dir: PathBuf,
    info: StreamInfo,
    written: u64,
    created_at: String,
    closed: bool,
}

impl ImageSequenceSink {
    /// 创建输出目录; 失败返回 `SinkOpen`
    pub fn create<P: AsRef<Path>>(dir: P, info: &StreamInfo) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| PipelineError::sink_open(dir, e.to_string()))?;
        if !dir.is_dir() {
            return Err(PipelineError::sink_open(dir, "not a directory"));
        }

        log::info!(
            "💾 输出目录: {} | {}x{} @ {:.2}fps",
            dir.display(),
            info.width,
            info.height,
            info.frame_rate
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            info: info.clone(),
            written: 0,
            created_at: gen_time_string("-"),
            closed: false,
        })
    }

    pub fn frames_written(&self) -> u64 {
        self.written
    }

    pub fn frame_path(&self, seq: u64) -> PathBuf {
        self.dir.join(format!("frame_{:06}.png", seq))
    }

    /// 读取已关闭输出目录的元数据
    pub fn read_metadata<P: AsRef<Path>>(dir: P) -> Result<SequenceMetadata> {
        let json = std::fs::read_to_string(dir.as_ref().join(METADATA_FILE))?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl FrameSink<Frame> for ImageSequenceSink {
    fn write(&mut self, frame: Frame) -> anyhow::Result<()> {
        if self.closed {
            anyhow::bail!("sink {} is closed", self.dir.display());
        }
        let path = self.frame_path(self.written);
        frame
            .image
            .save(&path)
            .with_context(|| format!("writing frame {} to {}", frame.index, path.display()))?;
        log::debug!("frame {} -> {}", frame.index, path.display());
        self.written += 1;
        Ok(())
    }

    fn close(&mut self) -> anyhow::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let metadata = SequenceMetadata {
            stream: self.info.clone(),
            frames_written: self.written,
            created_at: self.created_at.clone(),
        };
        let path = self.dir.join(METADATA_FILE);
        std::fs::write(&path, serde_json::to_string_pretty(&metadata)?)
            .with_context(|| format!("writing {}", path.display()))?;

        log::info!("✅ 输出完成: {} 帧 → {}", self.written, self.dir.display());
        Ok(())
    }
}

/// 本地时间字符串, 各字段以 `delimiter` 分隔
pub fn gen_time_string(delimiter: &str) -> String {
    let fmt = format!(
        "%Y{}%m{}%d{}%H{}%M{}%S{}%f",
        delimiter, delimiter, delimiter, delimiter, delimiter, delimiter
    );
    chrono::Local::now().format(&fmt).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn info(w: u32, h: u32) -> StreamInfo {
        StreamInfo {
            frame_rate: 12.5,
            codec: "png".to_string(),
            width: w,
            height: h,
        }
    }

    #[test]
    fn test_writes_frames_and_metadata() {
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("nested").join("out");
        let mut sink = ImageSequenceSink::create(&out, &info(2, 2)).unwrap();

        for i in 0..3 {
            let image = RgbImage::from_pixel(2, 2, Rgb([i as u8, 0, 0]));
            sink.write(Frame::new(i, image)).unwrap();
        }
        sink.close().unwrap();
        sink.close().unwrap();

        assert_eq!(sink.frames_written(), 3);
        let second = image::open(out.join("frame_000001.png")).unwrap().to_rgb8();
        assert_eq!(second.get_pixel(0, 0).0, [1, 0, 0]);

        let metadata = ImageSequenceSink::read_metadata(&out).unwrap();
        assert_eq!(metadata.frames_written, 3);
        assert_eq!(metadata.stream, info(2, 2));
        assert!(!metadata.created_at.is_empty());
    }

    #[test]
    fn test_write_after_close_fails() {
        let root = tempfile::tempdir().unwrap();
        let mut sink = ImageSequenceSink::create(root.path(), &info(1, 1)).unwrap();
        sink.close().unwrap();
        let frame = Frame::new(0, RgbImage::new(1, 1));
        assert!(sink.write(frame).is_err());
    }

    #[test]
    fn test_create_over_file_fails() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("occupied");
        std::fs::write(&file, b"x").unwrap();
        let err = ImageSequenceSink::create(&file, &info(1, 1)).err().unwrap();
        assert!(matches!(err, PipelineError::SinkOpen { .. }));
    }

    #[test]
    fn test_time_string_delimiter() {
        let s = gen_time_string("-");
        assert_eq!(s.split('-').count(), 7);
    }
}
