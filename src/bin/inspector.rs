// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 瓶子质检 (Bottle Inspector)
///
/// 产线瓶子缺陷检测与记录
///
/// 系统架构:
/// 1. 帧来源: 图片目录或空白帧 (可选独立采集线程)
/// 2. 检测来源: 检测器输出回放
/// 3. 主循环: 检测带过滤 → 身份追踪 → 状态聚合 → 落盘
use anyhow::{Context, Result};
use bottle_inspect::input::{spawn_capture, BlankSource, FrameSource, ImageDirSource};
use bottle_inspect::pipeline::{self, FrameClock};
use bottle_inspect::{
    local_now, Args, CsvRecordStore, InspectionConfig, InspectionPipeline, MemorySink,
    RecordSink, Renderer, ReplaySource,
};
use clap::Parser;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let mut config = InspectionConfig::load(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?;
    if let Some(csv) = &args.csv {
        config.csv_path = csv.clone();
    }
    if let Some(dir) = &args.snapshots {
        config.snapshot_dir = dir.clone();
    }
    config.validate().context("validating config")?;

    info!("🚀 瓶子质检系统启动");
    config.log_summary();

    let mut detector = ReplaySource::open(&args.detections)
        .with_context(|| format!("opening detections {}", args.detections.display()))?;
    if detector.is_empty() {
        warn!("⚠️ 检测回放为空, 所有帧按无检测处理");
    }

    let source: Box<dyn FrameSource + Send> = match &args.frames {
        Some(dir) => Box::new(
            ImageDirSource::open(dir)
                .with_context(|| format!("opening frames {}", dir.display()))?,
        ),
        None => {
            let count = detector.last_frame().map(|last| last + 1).unwrap_or(0);
            info!(count, "📄 未指定帧目录, 使用空白帧");
            Box::new(BlankSource::new(args.frame_width, args.frame_height, Some(count)))
        }
    };

    let (mut frames, capture) = if args.threaded {
        let (rx, handle) = spawn_capture(source, 2).context("starting capture thread")?;
        (Box::new(rx) as Box<dyn FrameSource>, Some(handle))
    } else {
        (source as Box<dyn FrameSource>, None)
    };

    let renderer = match &args.font {
        Some(path) => Renderer::new(Some(
            Renderer::load_font(path).with_context(|| format!("loading font {}", path.display()))?,
        )),
        None => Renderer::default(),
    };

    let sink: Box<dyn RecordSink> = if args.dry_run {
        info!("🧪 演练模式: 不写文件");
        Box::new(MemorySink::new())
    } else {
        Box::new(CsvRecordStore::new(
            &config.csv_path,
            &config.snapshot_dir,
            &config.snapshot_format,
        )?)
    };

    let mut clock = match args.replay_fps {
        Some(fps) => FrameClock::simulated(fps, Instant::now(), local_now()),
        None => FrameClock::Wall,
    };

    let mut inspection = InspectionPipeline::new(config, sink, renderer, local_now())?;
    let summary = pipeline::run(
        &mut inspection,
        &mut frames,
        &mut detector,
        &mut clock,
        |_| {},
    );

    drop(frames);
    if let Some(handle) = capture {
        let _ = handle.join();
    }

    println!(
        "frames={} bottles={} saved={} failures={}",
        summary.frames, summary.bottles_created, summary.records_saved, summary.write_failures
    );
    Ok(())
}
