// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! ONNX Runtime 推理后端 (需启用 `onnx` 功能)
//! ONNX Runtime inference backend

use super::detector::InferenceBackend;
use crate::error::{PipelineError, Result};
use ndarray::ArrayD;
use ort::{GraphOptimizationLevel, Session};
use std::path::Path;

pub struct OrtBackend {
    session: Session,
    output_names: Vec<String>,
}

impl OrtBackend {
    /// 加载ONNX模型; 失败属于启动错误
    pub fn new<P: AsRef<Path>>(model: P) -> Result<Self> {
        let model = model.as_ref();
        let session = Session::builder()
            .and_then(|builder| builder.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|builder| builder.commit_from_file(model))
            .map_err(|e| PipelineError::config(format!("loading {}: {}", model.display(), e)))?;
        let output_names = session.outputs.iter().map(|o| o.name.clone()).collect();

        log::info!("✅ 检测模型加载成功: {}", model.display());
        Ok(Self {
            session,
            output_names,
        })
    }
}

impl InferenceBackend for OrtBackend {
    fn forward(&mut self, blob: ArrayD<f32>) -> anyhow::Result<Vec<ArrayD<f32>>> {
        let outputs = self.session.run(ort::inputs![blob.view()]?)?;
        let mut ys = Vec::with_capacity(self.output_names.len());
        for name in &self.output_names {
            let y = outputs[name.as_str()].try_extract_tensor::<f32>()?;
            ys.push(y.into_owned());
        }
        Ok(ys)
    }
}
