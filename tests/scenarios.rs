// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 端到端场景: 回放检测 → 流水线 → 记录

use bottle_inspect::input::{spawn_capture, BlankSource, Frame, FrameSource};
use bottle_inspect::inspection::CapState;
use bottle_inspect::pipeline::{self, FrameClock};
use bottle_inspect::{
    CsvRecordStore, InspectError, InspectionConfig, InspectionPipeline, InspectionStatus,
    MemorySink, RecordSink, Renderer, ReplaySource, RunSummary, TrackEvent,
};
use chrono::NaiveDateTime;
use std::time::Instant;

// 画面宽1000: 检测带 [200, 500]
const WIDTH: u32 = 1000;
const HEIGHT: u32 = 400;

fn wall_start() -> NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2024, 6, 3)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

fn bottle(x1: i32, x2: i32) -> String {
    format!(r#"{{"label": "bottle", "bbox": [{}, 50, {}, 350], "confidence": 0.9}}"#, x1, x2)
}

fn component(label: &str, x1: i32, x2: i32) -> String {
    format!(r#"{{"label": "{}", "bbox": [{}, 40, {}, 90], "confidence": 0.8}}"#, label, x1, x2)
}

/// 每个元素为一帧的检测列表
fn replay(frames: &[Vec<String>]) -> ReplaySource {
    let text: String = frames
        .iter()
        .enumerate()
        .map(|(i, dets)| format!("{{\"frame\": {}, \"detections\": [{}]}}\n", i, dets.join(",")))
        .collect();
    ReplaySource::from_reader(text.as_bytes()).unwrap()
}

struct Run<S: RecordSink> {
    summary: RunSummary,
    events: Vec<(TrackEvent, u64, InspectionStatus)>,
    pipeline: InspectionPipeline<S>,
}

/// 以 2 FPS 模拟时钟运行 (每帧 0.5 秒)
fn run_with<S: RecordSink, F: FrameSource>(frames: &mut F, sink: S, detections: &[Vec<String>]) -> Run<S> {
    let mut detector = replay(detections);
    let mut clock = FrameClock::simulated(2.0, Instant::now(), wall_start());
    let mut inspection =
        InspectionPipeline::new(InspectionConfig::default(), sink, Renderer::default(), wall_start())
            .unwrap();
    let mut events = Vec::new();
    let summary = pipeline::run(&mut inspection, frames, &mut detector, &mut clock, |r| {
        events.push((r.event, r.number, r.status))
    });
    Run {
        summary,
        events,
        pipeline: inspection,
    }
}

fn run_memory(detections: &[Vec<String>]) -> Run<MemorySink> {
    let mut frames = BlankSource::new(WIDTH, HEIGHT, Some(detections.len() as u64));
    run_with(&mut frames, MemorySink::new(), detections)
}

fn saved_numbers(sink: &MemorySink) -> Vec<u64> {
    sink.rows.iter().map(|r| r.number).collect()
}

#[test]
fn scenario_a_clean_bottle_after_dwell() {
    let frames: Vec<Vec<String>> = (0..5).map(|_| vec![bottle(250, 450)]).collect();
    let run = run_memory(&frames);

    assert_eq!(run.events[0].0, TrackEvent::Arrived);
    assert!(matches!(run.events[2].0, TrackEvent::Dwelling { .. }));
    assert_eq!(
        run.events[3].0,
        TrackEvent::NewBottle {
            number: 2,
            distance: None
        }
    );
    assert!(matches!(run.events[4].0, TrackEvent::SameBottle { number: 2, .. }));

    let sink = run.pipeline.sink();
    assert_eq!(saved_numbers(sink), vec![2]);
    assert_eq!(sink.rows[0].status, InspectionStatus::NonDefective);
    assert_eq!(sink.rows[0].time, "08:00:01");
    assert_eq!(run.pipeline.record().status, InspectionStatus::NonDefective);
    assert_eq!(run.summary.bottles_created, 1);
    assert_eq!(run.summary.records_saved, 1);
}

#[test]
fn scenario_b_missing_cap_is_defective() {
    let frames: Vec<Vec<String>> = (0..5)
        .map(|_| vec![bottle(250, 450), component("cap missing", 300, 400)])
        .collect();
    let run = run_memory(&frames);

    let sink = run.pipeline.sink();
    assert_eq!(saved_numbers(sink), vec![2]);
    assert_eq!(sink.snapshots, vec![2]);
    assert_eq!(sink.rows[0].cap, CapState::Missing);
    assert_eq!(sink.rows[0].status, InspectionStatus::Defective);
}

#[test]
fn scenario_c_jitter_is_same_bottle() {
    let mut frames: Vec<Vec<String>> = (0..4).map(|_| vec![bottle(250, 450)]).collect();
    frames.push(vec![bottle(300, 500)]);
    frames.extend((0..8).map(|i| vec![bottle(260 + i * 5, 460 + i * 5)]));
    let run = run_memory(&frames);

    assert!(run.events[3..].iter().all(|(_, number, _)| *number == 2));
    assert_eq!(saved_numbers(run.pipeline.sink()), vec![2]);
    assert_eq!(run.summary.bottles_created, 1);
}

#[test]
fn scenario_d_far_bottle_is_new_and_rate_limited() {
    let mut frames: Vec<Vec<String>> = (0..4).map(|_| vec![bottle(210, 330)]).collect();
    frames.extend((0..4).map(|_| vec![bottle(360, 480)]));
    let run = run_memory(&frames);

    assert_eq!(
        run.events[4].0,
        TrackEvent::NewBottle {
            number: 3,
            distance: Some(150.0)
        }
    );
    // 第4帧 (2.0s) 距上次落盘仅0.5s, 第7帧 (3.5s) 才落盘
    let sink = run.pipeline.sink();
    assert_eq!(saved_numbers(sink), vec![2, 3]);
    assert_eq!(sink.rows[0].time, "08:00:01");
    assert_eq!(sink.rows[1].time, "08:00:03");
    assert_eq!(run.summary.bottles_created, 2);
}

#[test]
fn short_sightings_never_found_a_bottle() {
    // 每次出现1.0s后消失, 驻留门限从未满足
    let pattern = [true, true, true, false];
    let frames: Vec<Vec<String>> = (0..16)
        .map(|i| {
            if pattern[i % 4] {
                vec![bottle(250, 450)]
            } else {
                Vec::new()
            }
        })
        .collect();
    let run = run_memory(&frames);

    assert!(run.events.iter().all(|(_, number, _)| *number == 1));
    assert!(run.pipeline.sink().rows.is_empty());
    assert_eq!(run.summary.bottles_created, 0);
    assert_eq!(run.summary.frames, 16);
}

#[test]
fn each_number_persisted_at_most_once() {
    // 四个瓶子依次通过, 中间有空档
    let mut frames: Vec<Vec<String>> = Vec::new();
    for (x1, x2) in [(210, 330), (360, 480), (210, 330), (360, 480)] {
        frames.extend((0..8).map(|_| vec![bottle(x1, x2)]));
        frames.push(Vec::new());
    }
    let run = run_memory(&frames);

    let numbers = saved_numbers(run.pipeline.sink());
    assert_eq!(numbers, vec![2, 3, 4, 5]);
    let mut deduped = numbers.clone();
    deduped.dedup();
    assert_eq!(deduped, numbers);
    assert_eq!(run.pipeline.sink().snapshots, numbers);
}

#[test]
fn filesystem_store_writes_csv_and_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("bottle_data.csv");
    let shots = dir.path().join("screenshots");
    let store = CsvRecordStore::new(&csv, &shots, "png").unwrap();

    let mut frames: Vec<Vec<String>> = (0..4)
        .map(|_| vec![bottle(210, 330), component("label missing", 220, 320)])
        .collect();
    frames.extend((0..4).map(|_| vec![bottle(360, 480), component("label", 370, 470)]));
    let mut source = BlankSource::new(WIDTH, HEIGHT, Some(frames.len() as u64));
    let run = run_with(&mut source, store, &frames);
    assert_eq!(run.summary.records_saved, 2);

    let text = std::fs::read_to_string(&csv).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Bottle Number,Cap,Label,Plastic,Status,Day,Date,Time",
            "2,NotDetected,Missing,Good,Defective,Monday,03/06/24,08:00:01",
            "3,NotDetected,Detected,Good,NonDefective,Monday,03/06/24,08:00:03",
        ]
    );
    assert!(shots.join("bottle_2.png").exists());
    assert!(shots.join("bottle_3.png").exists());
    assert!(!shots.join("bottle_1.png").exists());

    let snapshot = image::open(shots.join("bottle_2.png")).unwrap();
    assert_eq!((snapshot.width(), snapshot.height()), (WIDTH, HEIGHT));
}

#[test]
fn threaded_capture_matches_inline_run() {
    let mut frames: Vec<Vec<String>> = (0..4).map(|_| vec![bottle(210, 330)]).collect();
    frames.extend((0..4).map(|_| vec![bottle(360, 480)]));

    let inline = run_memory(&frames);
    let (mut rx, handle) =
        spawn_capture(BlankSource::new(WIDTH, HEIGHT, Some(frames.len() as u64)), 2).unwrap();
    let threaded = run_with(&mut rx, MemorySink::new(), &frames);
    handle.join().unwrap();

    assert_eq!(
        saved_numbers(threaded.pipeline.sink()),
        saved_numbers(inline.pipeline.sink())
    );
    assert_eq!(threaded.summary, inline.summary);
}

struct FailAfter {
    inner: BlankSource,
    left: usize,
}

impl FrameSource for FailAfter {
    fn next_frame(&mut self) -> bottle_inspect::Result<Option<Frame>> {
        if self.left == 0 {
            return Err(InspectError::SourceClosed);
        }
        self.left -= 1;
        self.inner.next_frame()
    }
}

#[test]
fn frame_failure_ends_run_keeping_saved_records() {
    let frames: Vec<Vec<String>> = (0..10).map(|_| vec![bottle(250, 450)]).collect();
    let mut source = FailAfter {
        inner: BlankSource::new(WIDTH, HEIGHT, None),
        left: 5,
    };
    let run = run_with(&mut source, MemorySink::new(), &frames);
    assert_eq!(run.summary.frames, 5);
    assert_eq!(saved_numbers(run.pipeline.sink()), vec![2]);
}
