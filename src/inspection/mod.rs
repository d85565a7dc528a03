// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 质检判定系统 (Inspection System)
///
/// - Record:      瓶子记录与组件状态
/// - Aggregator:  组件检测 → 合格/缺陷判定
/// - Persistence: 每个瓶子最多落盘一次
/// - Store:       CSV日志与截图目录
pub mod aggregator;
pub mod persistence;
pub mod record;
pub mod store;

pub use aggregator::{aggregate, derive_status, ComponentScan};
pub use persistence::{GateDecision, PersistOutcome, PersistenceGate, PersistenceState};
pub use record::{BottleRecord, CapState, InspectionStatus, LabelState, PlasticState, CSV_HEADER};
pub use store::{CsvRecordStore, MemorySink, RecordSink};
