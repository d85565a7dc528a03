// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 质检流水线 (Inspection Pipeline)
///
/// 单线程协作循环, 每帧完整处理后才请求下一帧:
/// ```text
/// 取帧 → 检测 → 检测带过滤 → 身份追踪 → 状态聚合 → 绘制检测框 → 持久化门控 → 状态面板
/// ```
/// 追踪器、门控和编号计数器都由 `InspectionPipeline` 独占。
pub mod clock;

pub use clock::FrameClock;

use crate::detection::{filter_zone, BottleTracker, Detection, DetectionSource, InspectionBand, TrackEvent};
use crate::inspection::{aggregate, BottleRecord, InspectionStatus, PersistOutcome, PersistenceGate, RecordSink};
use crate::input::{Frame, FrameSource};
use crate::renderer::Renderer;
use crate::{InspectionConfig, Result};
use chrono::NaiveDateTime;
use image::RgbImage;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// 单帧处理结果
#[derive(Debug)]
pub struct FrameReport {
    pub frame_id: u64,
    pub event: TrackEvent,
    pub bottle_detected: bool,
    /// 本帧结束时当前记录的编号与状态
    pub number: u64,
    pub status: InspectionStatus,
    pub persisted: Option<PersistOutcome>,
    /// 渲染后的显示画面
    pub display: RgbImage,
}

/// 运行统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub bottles_created: u64,
    pub records_saved: u64,
    pub write_failures: u64,
}

pub struct InspectionPipeline<S: RecordSink> {
    config: InspectionConfig,
    tracker: BottleTracker,
    gate: PersistenceGate,
    sink: S,
    renderer: Renderer,
    summary: RunSummary,
}

impl<S: RecordSink> InspectionPipeline<S> {
    pub fn new(config: InspectionConfig, sink: S, renderer: Renderer, wall: NaiveDateTime) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            tracker: BottleTracker::new(config.tracker_params(), wall),
            gate: PersistenceGate::new(config.save_interval()),
            config,
            sink,
            renderer,
            summary: RunSummary::default(),
        })
    }

    pub fn band_for(&self, width: u32) -> InspectionBand {
        InspectionBand::from_width(
            width,
            self.config.band_width_ratio,
            self.config.status_panel_ratio,
        )
    }

    /// 处理一帧
    pub fn process_frame(
        &mut self,
        frame: Frame,
        detections: &[Detection],
        now: Instant,
        wall: NaiveDateTime,
    ) -> FrameReport {
        self.tracker.current_mut().stamp(wall);

        let band = self.band_for(frame.width());
        let confident: Vec<Detection> = detections
            .iter()
            .filter(|d| d.confidence >= self.config.min_confidence)
            .copied()
            .collect();
        let in_band = filter_zone(&confident, &band);

        let bottle = BottleTracker::select_primary(&in_band).map(|d| d.bbox);
        let event = self.tracker.observe(bottle.as_ref(), now, wall);
        let bottle_detected = aggregate(self.tracker.current_mut(), &in_band).is_some();

        let mut display = frame.image;
        self.renderer.draw_layout(&mut display, &band);
        self.renderer.annotate(&mut display, &in_band);

        let persisted = self.gate.persist(
            self.tracker.current(),
            &display,
            bottle_detected,
            now,
            &mut self.sink,
        );
        if let Some(outcome) = &persisted {
            self.summary.records_saved += 1;
            self.summary.write_failures += outcome.failures() as u64;
        }

        self.renderer
            .draw_status_panel(&mut display, &band, self.tracker.current());

        self.summary.frames += 1;
        self.summary.bottles_created = self.tracker.bottles_created();

        let record = self.tracker.current();
        debug!(
            frame = frame.frame_id,
            detections = detections.len(),
            in_band = in_band.len(),
            ?event,
            number = record.number,
            status = %record.status,
            "帧处理完成"
        );

        FrameReport {
            frame_id: frame.frame_id,
            event,
            bottle_detected,
            number: record.number,
            status: record.status,
            persisted,
            display,
        }
    }

    /// 当前记录 (只读)
    pub fn record(&self) -> &BottleRecord {
        self.tracker.current()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }
}

/// 主循环: 直到帧来源结束或失败
///
/// 取帧失败视为本次运行结束, 已落盘的记录保持不变。
/// 检测失败只影响当前帧, 按无检测处理。
pub fn run<S, F, D, V>(
    pipeline: &mut InspectionPipeline<S>,
    frames: &mut F,
    detector: &mut D,
    clock: &mut FrameClock,
    mut on_frame: V,
) -> RunSummary
where
    S: RecordSink,
    F: FrameSource + ?Sized,
    D: DetectionSource + ?Sized,
    V: FnMut(&FrameReport),
{
    loop {
        let frame = match frames.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                info!("🏁 帧来源结束");
                break;
            }
            Err(e) => {
                error!("❌ 取帧失败, 结束运行: {}", e);
                break;
            }
        };

        let detections = detector.detect(&frame).unwrap_or_else(|e| {
            warn!(frame = frame.frame_id, "⚠️ 检测失败, 按无检测处理: {}", e);
            Vec::new()
        });

        let (now, wall) = clock.tick();
        let report = pipeline.process_frame(frame, &detections, now, wall);
        on_frame(&report);
    }

    let summary = pipeline.summary();
    info!(
        frames = summary.frames,
        bottles = summary.bottles_created,
        saved = summary.records_saved,
        failures = summary.write_failures,
        "📊 运行结束"
    );
    summary
}
