// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 图像序列帧源: 目录中按文件名排序的静态图像
//! Image sequence source
use super::FrameSource;
use crate::error::{PipelineError, Result};
use crate::frame::{Frame, StreamInfo};
use anyhow::{bail, Context};
use std::path::{Path, PathBuf};

/// 支持的图像扩展名
const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// 图像序列帧源
pub struct ImageSequenceSource {
    files: Vec<PathBuf>,
    next: usize,
    info: StreamInfo,
}

impl ImageSequenceSource {
    /// 打开图像序列目录; 目录不存在或没有帧时返回 `SourceOpen`
    pub fn open<P: AsRef<Path>>(dir: P, frame_rate: f64) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(PipelineError::source_open(dir, "not a directory"));
        }
        if !(frame_rate > 0.0) {
            return Err(PipelineError::config(format!(
                "frame rate must be positive, got {}",
                frame_rate
            )));
        }

        let mut files = Vec::new();
        let entries =
            std::fs::read_dir(dir).map_err(|e| PipelineError::source_open(dir, e.to_string()))?;
        for entry in entries {
            let path = entry
                .map_err(|e| PipelineError::source_open(dir, e.to_string()))?
                .path();
            if path.is_file() && is_frame_file(&path) {
                files.push(path);
            }
        }
        files.sort();

        let first = match files.first() {
            Some(first) => first,
            None => return Err(PipelineError::source_open(dir, "no frames found")),
        };
        let (width, height) = image::image_dimensions(first)
            .map_err(|e| PipelineError::source_open(first, e.to_string()))?;
        let codec = first
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        log::info!(
            "📂 图像序列: {} | {} 帧 | {}x{} @ {:.2}fps",
            dir.display(),
            files.len(),
            width,
            height,
            frame_rate
        );

        Ok(Self {
            files,
            next: 0,
            info: StreamInfo {
                frame_rate,
                codec,
                width,
                height,
            },
        })
    }

    /// 帧总数
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            FRAME_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

impl FrameSource<Frame> for ImageSequenceSource {
    fn next_frame(&mut self) -> anyhow::Result<Option<Frame>> {
        let path = match self.files.get(self.next) {
            Some(path) => path,
            None => return Ok(None),
        };

        let image = image::open(path)
            .with_context(|| format!("decoding {}", path.display()))?
            .to_rgb8();
        if image.dimensions() != (self.info.width, self.info.height) {
            bail!(
                "frame {} is {}x{}, stream is {}x{}",
                path.display(),
                image.width(),
                image.height(),
                self.info.width,
                self.info.height
            );
        }

        let frame = Frame::new(self.next as u64, image);
        self.next += 1;
        Ok(Some(frame))
    }

    fn stream_info(&self) -> StreamInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_frame(dir: &Path, name: &str, w: u32, h: u32, value: u8) {
        RgbImage::from_pixel(w, h, Rgb([value, value, value]))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn test_reads_frames_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_frame(dir.path(), "frame_002.png", 4, 3, 20);
        write_frame(dir.path(), "frame_000.png", 4, 3, 0);
        write_frame(dir.path(), "frame_001.png", 4, 3, 10);
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut source = ImageSequenceSource::open(dir.path(), 30.0).unwrap();
        assert_eq!(source.len(), 3);

        let info = source.stream_info();
        assert_eq!((info.width, info.height), (4, 3));
        assert_eq!(info.codec, "png");
        assert_eq!(info.frame_rate, 30.0);

        for expected in 0..3u8 {
            let frame = source.next_frame().unwrap().unwrap();
            assert_eq!(frame.index, expected as u64);
            assert_eq!(frame.image.get_pixel(0, 0).0, [expected * 10; 3]);
        }
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_open_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageSequenceSource::open(dir.path().join("missing"), 25.0)
            .err()
            .unwrap();
        assert!(matches!(err, PipelineError::SourceOpen { .. }));
    }

    #[test]
    fn test_open_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageSequenceSource::open(dir.path(), 25.0).err().unwrap();
        assert!(err.is_startup());
        assert!(err.to_string().contains("no frames"));
    }

    #[test]
    fn test_size_change_is_source_failure() {
        let dir = tempfile::tempdir().unwrap();
        write_frame(dir.path(), "a.png", 4, 4, 0);
        write_frame(dir.path(), "b.png", 8, 8, 0);

        let mut source = ImageSequenceSource::open(dir.path(), 25.0).unwrap();
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().is_err());
    }
}
