// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 持久化门控 (Persistence Gate)
//!
//! 每个瓶子最多落盘一次, 两次落盘间隔不小于 `save_interval`。
//! 除本帧有瓶子、编号未落盘、间隔已到之外, 还要求记录已由追踪器确认:
//! 启动时的空闲记录 (编号1) 从不落盘, 同一个瓶子只会在驻留确认后写一行。
//! CSV和截图互相独立, 任一失败都不阻塞另一项; 无论成败都推进门控状态, 不重试。

use super::record::BottleRecord;
use super::store::RecordSink;
use crate::InspectError;
use image::RgbImage;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// 门控状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistenceState {
    pub last_saved_bottle_number: Option<u64>,
    /// `None` 表示本次运行尚未落盘
    pub last_saved_at: Option<Instant>,
}

/// 门控判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Fire,
    /// 本帧无瓶子, 状态未刷新
    NoBottle,
    /// 启动空闲记录, 未经追踪器确认
    Unconfirmed,
    /// 该编号已落盘
    AlreadySaved,
    /// 距上次落盘不足间隔
    RateLimited { remaining: Duration },
}

/// 单次落盘结果
#[derive(Debug)]
pub struct PersistOutcome {
    pub number: u64,
    pub csv: Result<(), InspectError>,
    pub snapshot: Result<PathBuf, InspectError>,
}

impl PersistOutcome {
    pub fn failures(&self) -> usize {
        self.csv.is_err() as usize + self.snapshot.is_err() as usize
    }
}

pub struct PersistenceGate {
    save_interval: Duration,
    state: PersistenceState,
}

impl PersistenceGate {
    pub fn new(save_interval: Duration) -> Self {
        Self {
            save_interval,
            state: PersistenceState::default(),
        }
    }

    pub fn state(&self) -> &PersistenceState {
        &self.state
    }

    /// 判定当前记录是否应落盘 (不修改状态)
    pub fn evaluate(&self, record: &BottleRecord, bottle_detected: bool, now: Instant) -> GateDecision {
        if !bottle_detected {
            return GateDecision::NoBottle;
        }
        if !record.confirmed {
            return GateDecision::Unconfirmed;
        }
        if self.state.last_saved_bottle_number == Some(record.number) {
            return GateDecision::AlreadySaved;
        }
        if let Some(last) = self.state.last_saved_at {
            let since = now.saturating_duration_since(last);
            if since < self.save_interval {
                return GateDecision::RateLimited {
                    remaining: self.save_interval - since,
                };
            }
        }
        GateDecision::Fire
    }

    fn commit(&mut self, number: u64, now: Instant) {
        self.state.last_saved_bottle_number = Some(number);
        self.state.last_saved_at = Some(now);
    }

    /// 满足条件时写CSV和截图, 返回落盘结果
    pub fn persist<S: RecordSink + ?Sized>(
        &mut self,
        record: &BottleRecord,
        frame: &RgbImage,
        bottle_detected: bool,
        now: Instant,
        sink: &mut S,
    ) -> Option<PersistOutcome> {
        match self.evaluate(record, bottle_detected, now) {
            GateDecision::Fire => {}
            GateDecision::RateLimited { remaining } => {
                debug!(number = record.number, ?remaining, "⏳ 落盘间隔未到");
                return None;
            }
            _ => return None,
        }

        let csv = sink.append_record(record);
        let snapshot = sink.write_snapshot(record.number, frame);
        self.commit(record.number, now);

        match &csv {
            Ok(()) => {}
            Err(e) => error!(number = record.number, "❌ CSV写入失败: {}", e),
        }
        match &snapshot {
            Ok(path) => info!(
                number = record.number,
                status = %record.status,
                path = %path.display(),
                "💾 记录已保存"
            ),
            Err(e) => error!(number = record.number, "❌ 截图保存失败: {}", e),
        }

        Some(PersistOutcome {
            number: record.number,
            csv,
            snapshot,
        })
    }
}
