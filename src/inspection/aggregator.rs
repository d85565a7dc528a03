// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 状态聚合 (Status Aggregator)
//!
//! 只在本帧检测带内存在瓶子时运行: 各组件先回到默认值
//! (NotDetected / NotDetected / Good), 再由同帧的组件检测覆盖。
//! 同一组件在一帧内既有正常又有缺陷检测时, 缺陷优先。

use super::record::{BottleRecord, CapState, InspectionStatus, LabelState, PlasticState};
use crate::detection::types::{Detection, DetectionLabel};

/// 单帧组件扫描结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComponentScan {
    pub cap: CapState,
    pub label: LabelState,
    pub plastic: PlasticState,
}

impl ComponentScan {
    /// 扫描本帧 (已过滤) 检测结果
    pub fn from_detections(detections: &[Detection]) -> Self {
        let mut scan = Self::default();
        for det in detections {
            match det.label {
                DetectionLabel::Cap if scan.cap != CapState::Missing => {
                    scan.cap = CapState::Detected
                }
                DetectionLabel::CapMissing => scan.cap = CapState::Missing,
                DetectionLabel::Label if scan.label != LabelState::Missing => {
                    scan.label = LabelState::Detected
                }
                DetectionLabel::LabelMissing => scan.label = LabelState::Missing,
                DetectionLabel::DamagedPlastic => scan.plastic = PlasticState::Damaged,
                _ => {}
            }
        }
        scan
    }

    pub fn status(&self) -> InspectionStatus {
        derive_status(self.cap, self.label, self.plastic)
    }
}

/// 综合判定: 任一缺陷即为 Defective
pub fn derive_status(cap: CapState, label: LabelState, plastic: PlasticState) -> InspectionStatus {
    if cap == CapState::Missing || label == LabelState::Missing || plastic == PlasticState::Damaged
    {
        InspectionStatus::Defective
    } else {
        InspectionStatus::NonDefective
    }
}

/// 本帧是否检测到瓶子
pub fn bottle_present(detections: &[Detection]) -> bool {
    detections.iter().any(|d| d.label == DetectionLabel::Bottle)
}

/// 将本帧检测聚合到当前记录
///
/// 没有瓶子时记录保持不变, 返回 `None`。
pub fn aggregate(record: &mut BottleRecord, detections: &[Detection]) -> Option<InspectionStatus> {
    if !bottle_present(detections) {
        return None;
    }
    let scan = ComponentScan::from_detections(detections);
    record.cap = scan.cap;
    record.label = scan.label;
    record.plastic = scan.plastic;
    record.status = scan.status();
    Some(record.status)
}
