// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 瓶子身份追踪 (Bottle Tracker)
//!
//! 判定检测带内的瓶子是新瓶子还是同一个瓶子:
//! - 驻留门限: 瓶子连续出现满 `dwell` 时长后才参与身份判定
//! - 距离门限: 与上一个新确认瓶子的中心距离超过 `distance` 才视为新瓶子
//!
//! 追踪器独占当前 `BottleRecord`, 聚合器和持久化只通过追踪器的句柄读写它。

use super::types::{BBox, Detection, DetectionLabel};
use crate::inspection::record::BottleRecord;
use chrono::NaiveDateTime;
use std::time::{Duration, Instant};
use tracing::{debug, info};

// ========== 配置 ==========

/// 追踪门限
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerParams {
    /// 驻留时长门限
    pub dwell: Duration,
    /// 中心距离门限 (像素)
    pub distance: f32,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            dwell: Duration::from_millis(1500),
            distance: 100.0,
        }
    }
}

// ========== 状态 ==========

/// 追踪阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackPhase {
    /// 检测带内无瓶子
    Absent,
    /// 瓶子已出现, 驻留计时中
    Arriving,
    /// 驻留满足, 当前瓶子已确认
    Confirmed,
}

/// 单帧追踪结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackEvent {
    /// 本帧没有瓶子
    Idle,
    /// 瓶子刚出现, 开始驻留计时
    Arrived,
    /// 驻留未满
    Dwelling { elapsed: Duration },
    /// 同一瓶子继续被观测
    SameBottle { number: u64, distance: f32 },
    /// 新瓶子, 已分配新记录
    NewBottle { number: u64, distance: Option<f32> },
}

/// 编号计数器 (严格递增, 只在追踪器内部使用)
#[derive(Debug, Clone)]
struct BottleCounter {
    last: u64,
}

impl BottleCounter {
    fn new() -> Self {
        Self { last: 0 }
    }

    fn allocate(&mut self) -> u64 {
        self.last += 1;
        self.last
    }
}

/// 追踪器状态
#[derive(Debug, Clone)]
pub struct TrackerState {
    /// 上一个新确认瓶子的检测框 (并非上一帧的检测框)
    pub last_seen_bbox: Option<BBox>,
    /// 本次连续出现的起始时间
    pub in_frame_since: Option<Instant>,
    pub phase: TrackPhase,
    pub current_record: BottleRecord,
}

// ========== 追踪器 ==========

pub struct BottleTracker {
    params: TrackerParams,
    counter: BottleCounter,
    state: TrackerState,
    bottles_created: u64,
}

impl BottleTracker {
    /// 创建追踪器, 同时生成启动时的空闲记录 (编号1, 未确认)
    pub fn new(params: TrackerParams, now: NaiveDateTime) -> Self {
        let mut counter = BottleCounter::new();
        let idle = BottleRecord::new(counter.allocate(), false, now);
        Self {
            params,
            counter,
            state: TrackerState {
                last_seen_bbox: None,
                in_frame_since: None,
                phase: TrackPhase::Absent,
                current_record: idle,
            },
            bottles_created: 0,
        }
    }

    /// 从本帧检测中挑选参与追踪的瓶子
    ///
    /// 多个瓶子同时出现时取面积最大者, 面积相同取最左侧, 再相同取检测顺序靠前者。
    pub fn select_primary(detections: &[Detection]) -> Option<&Detection> {
        detections
            .iter()
            .filter(|d| d.label == DetectionLabel::Bottle)
            .fold(None, |best: Option<&Detection>, d| match best {
                None => Some(d),
                Some(b) => {
                    let (da, ba) = (d.bbox.area(), b.bbox.area());
                    let (dx, bx) = (d.bbox.normalized().x1, b.bbox.normalized().x1);
                    if da > ba || (da == ba && dx < bx) {
                        Some(d)
                    } else {
                        Some(b)
                    }
                }
            })
    }

    /// 处理一帧的瓶子观测
    ///
    /// - `bottle`: 本帧参与追踪的瓶子检测框 (无瓶子为 `None`)
    /// - `now`: 单调时钟, 用于驻留判定
    /// - `wall`: 墙上时间, 用于新记录的日期字段
    pub fn observe(&mut self, bottle: Option<&BBox>, now: Instant, wall: NaiveDateTime) -> TrackEvent {
        let Some(bbox) = bottle else {
            // 缺席只重置驻留计时, 不清除当前记录
            if self.state.phase != TrackPhase::Absent {
                debug!("瓶子离开检测带, 重置驻留计时");
            }
            self.state.phase = TrackPhase::Absent;
            self.state.in_frame_since = None;
            return TrackEvent::Idle;
        };

        let Some(since) = self.state.in_frame_since else {
            self.state.phase = TrackPhase::Arriving;
            self.state.in_frame_since = Some(now);
            return TrackEvent::Arrived;
        };

        let elapsed = now.saturating_duration_since(since);
        if elapsed < self.params.dwell {
            return TrackEvent::Dwelling { elapsed };
        }

        self.state.phase = TrackPhase::Confirmed;
        let distance = self.state.last_seen_bbox.map(|last| last.distance(bbox));
        match distance {
            Some(d) if d <= self.params.distance => TrackEvent::SameBottle {
                number: self.state.current_record.number,
                distance: d,
            },
            _ => {
                let number = self.counter.allocate();
                self.state.current_record = BottleRecord::new(number, true, wall);
                self.state.last_seen_bbox = Some(*bbox);
                self.bottles_created += 1;
                let (cx, cy) = bbox.center();
                info!(
                    number,
                    center_x = cx,
                    center_y = cy,
                    distance = ?distance,
                    "🍾 新瓶子确认"
                );
                TrackEvent::NewBottle { number, distance }
            }
        }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn phase(&self) -> TrackPhase {
        self.state.phase
    }

    /// 当前记录 (只读快照, 供渲染器使用)
    pub fn current(&self) -> &BottleRecord {
        &self.state.current_record
    }

    pub fn current_mut(&mut self) -> &mut BottleRecord {
        &mut self.state.current_record
    }

    /// 已确认的新瓶子数量 (不含启动空闲记录)
    pub fn bottles_created(&self) -> u64 {
        self.bottles_created
    }
}
