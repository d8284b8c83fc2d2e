// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 目标检测器 (Object Detector)
//! 职责: 帧 → 预处理 → 推理后端 → 置信度过滤 + NMS → 在帧上画框

use super::types::{non_max_suppression, Bbox};
use super::FrameProcessor;
use crate::config::DetectorConfig;
use crate::error::Result;
use crate::frame::Frame;
use anyhow::bail;
use image::{imageops, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use ndarray::{Array, ArrayD, Ix4};
use std::time::Instant;

/// 推理后端接口: NCHW输入 → 原始输出张量
pub trait InferenceBackend: Send {
    fn forward(&mut self, blob: ArrayD<f32>) -> anyhow::Result<Vec<ArrayD<f32>>>;
}

impl InferenceBackend for Box<dyn InferenceBackend> {
    fn forward(&mut self, blob: ArrayD<f32>) -> anyhow::Result<Vec<ArrayD<f32>>> {
        (**self).forward(blob)
    }
}

/// Darknet-YOLO 检测器
///
/// 输出行格式: `[cx, cy, w, h, objectness, class_0, class_1, ...]`, 坐标按帧尺寸归一化。
pub struct ObjectDetector<B> {
    backend: B,
    config: DetectorConfig,

    // 统计
    frames: u64,
    detections: u64,
}

impl<B: InferenceBackend> ObjectDetector<B> {
    pub fn new(backend: B, config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        config.log_summary();
        Ok(Self {
            backend,
            config,
            frames: 0,
            detections: 0,
        })
    }

    /// (已处理帧数, 累计检测框数)
    pub fn stats(&self) -> (u64, u64) {
        (self.frames, self.detections)
    }

    /// RGB帧 → 1x3xHxW, 像素缩放到 [0, 1]
    pub fn preprocess(&self, image: &RgbImage) -> Array<f32, Ix4> {
        let (w, h) = (self.config.input_width, self.config.input_height);
        let resized = imageops::resize(image, w, h, imageops::FilterType::Triangle);

        let mut blob = Array::zeros((1, 3, h as usize, w as usize));
        for (x, y, rgb) in resized.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            let [r, g, b] = rgb.0;
            blob[[0, 0, y, x]] = r as f32 / 255.0;
            blob[[0, 1, y, x]] = g as f32 / 255.0;
            blob[[0, 2, y, x]] = b as f32 / 255.0;
        }
        blob
    }

    /// 扫描所有输出行, 保留最高类别分数超过阈值的框, 再做NMS
    pub fn postprocess(
        &self,
        outputs: &[ArrayD<f32>],
        frame_width: u32,
        frame_height: u32,
    ) -> anyhow::Result<Vec<Bbox>> {
        let mut boxes = Vec::new();

        for output in outputs {
            let cols = match output.shape().last() {
                Some(&cols) if output.ndim() >= 2 => cols,
                _ => bail!("expected a 2-D detection output, got shape {:?}", output.shape()),
            };
            if cols <= 5 {
                bail!("detection rows need more than 5 columns, got {}", cols);
            }

            let data: Vec<f32> = output.iter().copied().collect();
            for row in data.chunks_exact(cols) {
                let best = row[5..]
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1.total_cmp(b.1));
                let (class_id, &confidence) = match best {
                    Some(best) => best,
                    None => continue,
                };
                if confidence > self.config.conf_threshold {
                    boxes.push(Bbox::from_normalized_cxcywh(
                        row[0],
                        row[1],
                        row[2],
                        row[3],
                        frame_width,
                        frame_height,
                        class_id,
                        confidence,
                    ));
                }
            }
        }

        non_max_suppression(&mut boxes, self.config.nms_threshold);
        Ok(boxes)
    }

    /// 检测一帧, 不修改图像
    pub fn detect(&mut self, image: &RgbImage) -> anyhow::Result<Vec<Bbox>> {
        let blob = self.preprocess(image);
        let outputs = self.backend.forward(blob.into_dyn())?;
        self.postprocess(&outputs, image.width(), image.height())
    }

    /// 在帧上绘制检测框
    pub fn draw(&self, image: &mut RgbImage, boxes: &[Bbox]) {
        let color = image::Rgb(self.config.box_color);
        let thickness = self.config.box_thickness as i32;
        // 线宽以框边为中心向内外扩展
        let inner = thickness / 2;

        for bbox in boxes {
            let (x, y) = (bbox.xmin() as i32, bbox.ymin() as i32);
            let (w, h) = (bbox.width() as i32, bbox.height() as i32);
            for offset in -inner..(thickness - inner) {
                let (rw, rh) = (w - 2 * offset, h - 2 * offset);
                if rw < 1 || rh < 1 {
                    continue;
                }
                let rect = Rect::at(x + offset, y + offset).of_size(rw as u32, rh as u32);
                draw_hollow_rect_mut(image, rect, color);
            }
        }
    }
}

impl<B: InferenceBackend> FrameProcessor<Frame> for ObjectDetector<B> {
    fn process(&mut self, mut frame: Frame) -> anyhow::Result<Frame> {
        let start = Instant::now();
        let boxes = self.detect(&frame.image)?;
        self.draw(&mut frame.image, &boxes);

        self.frames += 1;
        self.detections += boxes.len() as u64;
        log::debug!(
            "🔍 帧 {}: {} 个目标 ({:.1}ms)",
            frame.index,
            boxes.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(frame)
    }
}
