// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
/// 视频帧检测流水线 - 双线程架构 (生产者: 读帧 / 消费者: 检测+写出)
///
/// 主程序入口 - 直接运行: cargo run --bin detect --release -- -i frames/ -o out/
use anyhow::{Context, Result};
use clap::Parser;
use detect_pipeline::{
    Args, DetectorConfig, Frame, FrameProcessor, FrameSource, ImageSequenceSink,
    ImageSequenceSource, Passthrough, Pipeline,
};
use std::path::Path;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

type BoxedProcessor = Box<dyn FnMut(Frame) -> anyhow::Result<Frame> + Send>;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    args.validate()?;

    let detector_config = match &args.detector_config {
        Some(path) => DetectorConfig::load(path)?,
        None => DetectorConfig::default(),
    };

    // 启动阶段: 帧源、输出、模型任一失败都不启动流水线
    let source = ImageSequenceSource::open(&args.input, args.fps)
        .with_context(|| format!("opening input {}", args.input.display()))?;
    let info = FrameSource::<Frame>::stream_info(&source);
    let processor = build_processor(args.model.as_deref(), detector_config)?;
    let sink = ImageSequenceSink::create(&args.output, &info)
        .with_context(|| format!("opening output {}", args.output.display()))?;

    log::info!("📹 输入: {}", args.input.display());
    log::info!("💾 输出: {}", args.output.display());
    if let Some(max) = args.max_frames {
        log::info!("⏹️  最多处理 {} 帧", max);
    }

    let report = Pipeline::new(args.pipeline_config()).run(source, processor, sink)?;

    println!(
        "✅ 完成: {} 帧 | {:.2}s | {:.1}fps",
        report.consumed,
        report.elapsed.as_secs_f64(),
        report.fps()
    );
    Ok(())
}

/// 有模型时使用检测器, 否则帧原样写出
fn build_processor(model: Option<&Path>, config: DetectorConfig) -> Result<BoxedProcessor> {
    match model {
        None => {
            log::warn!("⚠️  未指定检测模型, 帧将原样输出");
            let mut passthrough = Passthrough;
            Ok(Box::new(move |frame: Frame| passthrough.process(frame)))
        }
        Some(path) => load_detector(path, config),
    }
}

#[cfg(feature = "onnx")]
fn load_detector(path: &Path, config: DetectorConfig) -> Result<BoxedProcessor> {
    use detect_pipeline::detection::OrtBackend;
    use detect_pipeline::ObjectDetector;

    let backend = OrtBackend::new(path)?;
    let mut detector = ObjectDetector::new(backend, config)?;
    Ok(Box::new(move |frame: Frame| detector.process(frame)))
}

#[cfg(not(feature = "onnx"))]
fn load_detector(path: &Path, _config: DetectorConfig) -> Result<BoxedProcessor> {
    anyhow::bail!(
        "cannot load {}: built without the `onnx` feature (cargo build --features onnx)",
        path.display()
    )
}
