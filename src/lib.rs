// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
pub mod config; // 命令行参数
pub mod detection; // 检测数据、检测带过滤与瓶子追踪
pub mod error;
pub mod input; // 帧输入系统
pub mod inspection; // 状态聚合与持久化
pub mod inspection_config; // 质检参数配置
pub mod pipeline; // 单线程处理循环
pub mod renderer;

pub use crate::config::Args;
pub use crate::detection::{
    BBox, BottleTracker, Detection, DetectionLabel, DetectionSource, InspectionBand, ReplaySource,
    TrackEvent, TrackPhase, TrackerParams,
};
pub use crate::error::{InspectError, Result};
pub use crate::inspection::{
    BottleRecord, CsvRecordStore, InspectionStatus, MemorySink, PersistenceGate, RecordSink,
};
pub use crate::inspection_config::InspectionConfig;
pub use crate::pipeline::{FrameClock, InspectionPipeline, RunSummary};
pub use crate::renderer::Renderer;

/// 本地墙上时间
pub fn local_now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}
