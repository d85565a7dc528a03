// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 检测系统 (Detection System)
///
/// - Types:   检测类别与检测框
/// - Zone:    检测带过滤
/// - Tracker: 瓶子身份追踪
/// - Source:  检测来源接口与回放
pub mod source;
pub mod tracker;
pub mod types;
pub mod zone;

pub use source::{DetectionSource, ReplaySource};
pub use tracker::{BottleTracker, TrackEvent, TrackPhase, TrackerParams, TrackerState};
pub use types::{BBox, Detection, DetectionLabel, CLASS_NAMES};
pub use zone::{filter_zone, InspectionBand};
