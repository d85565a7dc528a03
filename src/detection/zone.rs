// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 检测区域过滤 (Zone Filter)
//!
//! 画面布局 (从左到右):
//! ```text
//! | 非检测区 | 检测带 | 非检测区 | 状态面板 |
//! ```
//! 只有完全落在检测带内的检测框才参与追踪和状态判定。

use super::types::{BBox, Detection};

/// 检测带水平范围 (像素)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InspectionBand {
    pub track_start: i32,
    pub track_end: i32,
    /// 状态面板起始x坐标
    pub status_start: i32,
}

impl InspectionBand {
    pub fn new(track_start: i32, track_end: i32, status_start: i32) -> Self {
        Self {
            track_start,
            track_end,
            status_start,
        }
    }

    /// 根据画面宽度计算检测带
    ///
    /// - `band_ratio`: 检测带占画面宽度比例
    /// - `panel_ratio`: 状态面板占画面宽度比例
    ///
    /// 剩余宽度平均分给检测带两侧的非检测区。
    pub fn from_width(width: u32, band_ratio: f32, panel_ratio: f32) -> Self {
        let w = width as i32;
        let panel = (width as f32 * panel_ratio) as i32;
        let band = (width as f32 * band_ratio) as i32;
        let dead = ((w - band - panel) / 2).max(0);
        let status_start = w - panel;
        Self {
            track_start: dead,
            track_end: (status_start - dead).max(dead),
            status_start,
        }
    }

    pub fn width(&self) -> i32 {
        self.track_end - self.track_start
    }

    /// 检测框是否完全位于检测带内 (先规范化坐标)
    pub fn contains(&self, bbox: &BBox) -> bool {
        let b = bbox.normalized();
        b.x1 >= self.track_start && b.x2 <= self.track_end
    }
}

/// 过滤掉检测带外的检测结果, 保持原有顺序
pub fn filter_zone(detections: &[Detection], band: &InspectionBand) -> Vec<Detection> {
    detections
        .iter()
        .filter(|d| band.contains(&d.bbox))
        .copied()
        .collect()
}
