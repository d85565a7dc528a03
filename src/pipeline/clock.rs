// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 帧时钟
//!
//! - Wall: 系统时钟, 实时运行
//! - Simulated: 每帧固定推进 1/FPS 秒, 离线回放结果可复现

use chrono::NaiveDateTime;
use std::time::{Duration, Instant};

const DEFAULT_FPS: f64 = 30.0;

pub enum FrameClock {
    Wall,
    /// `now`/`wall` 为下一次 `tick` 返回的时间
    Simulated {
        now: Instant,
        wall: NaiveDateTime,
        step: Duration,
    },
}

/// 每帧步长; 帧率无效或步长超出 `Duration` 范围时使用默认帧率
fn frame_step(fps: f64) -> Duration {
    if fps.is_finite() && fps > 0.0 {
        if let Ok(step) = Duration::try_from_secs_f64(1.0 / fps) {
            return step;
        }
    }
    Duration::from_secs_f64(1.0 / DEFAULT_FPS)
}

impl FrameClock {
    pub fn simulated(fps: f64, start: Instant, wall_start: NaiveDateTime) -> Self {
        FrameClock::Simulated {
            now: start,
            wall: wall_start,
            step: frame_step(fps),
        }
    }

    /// 返回本帧的 (单调时间, 墙上时间)
    ///
    /// 模拟时钟推进溢出时停在最后一个可表示的时间点。
    pub fn tick(&mut self) -> (Instant, NaiveDateTime) {
        match self {
            FrameClock::Wall => (Instant::now(), crate::local_now()),
            FrameClock::Simulated { now, wall, step } => {
                let current = (*now, *wall);
                let next_now = now.checked_add(*step);
                let next_wall = chrono::Duration::from_std(*step)
                    .ok()
                    .and_then(|d| wall.checked_add_signed(d));
                if let (Some(n), Some(w)) = (next_now, next_wall) {
                    *now = n;
                    *wall = w;
                }
                current
            }
        }
    }
}
