// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 检测来源 (Detection Source)
//!
//! 检测模型本身在本系统之外, 这里只约定接口: 给定一帧, 返回该帧的检测框。
//! `ReplaySource` 从 JSON Lines 文件回放检测器输出:
//! ```text
//! {"frame": 0, "detections": [{"label": "bottle", "bbox": [250, 80, 450, 620], "confidence": 0.91}]}
//! ```

use super::types::Detection;
use crate::input::Frame;
use crate::{InspectError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// 检测器接口
pub trait DetectionSource {
    /// 对一帧做检测 (无检测时返回空列表)
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>>;
}

#[derive(Deserialize)]
struct ReplayLine {
    frame: u64,
    #[serde(default)]
    detections: Vec<Detection>,
}

/// 检测回放
#[derive(Debug, Default)]
pub struct ReplaySource {
    by_frame: HashMap<u64, Vec<Detection>>,
    last_frame: Option<u64>,
}

impl ReplaySource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| InspectError::io(path, e))?;
        let source = Self::from_reader(BufReader::new(file))?;
        info!(
            path = %path.display(),
            frames = source.by_frame.len(),
            "📼 检测回放已加载"
        );
        Ok(source)
    }

    /// 逐行解析; 空行和 `#` 开头的行忽略, 同一帧多行时合并
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut source = Self::default();
        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.map_err(|e| InspectError::Replay {
                line: line_no,
                message: e.to_string(),
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let parsed: ReplayLine =
                serde_json::from_str(trimmed).map_err(|e| InspectError::Replay {
                    line: line_no,
                    message: e.to_string(),
                })?;
            source.last_frame = source.last_frame.max(Some(parsed.frame));
            source
                .by_frame
                .entry(parsed.frame)
                .or_default()
                .extend(parsed.detections);
        }
        Ok(source)
    }

    /// 回放中出现的最大帧号
    pub fn last_frame(&self) -> Option<u64> {
        self.last_frame
    }

    pub fn is_empty(&self) -> bool {
        self.by_frame.is_empty()
    }
}

impl DetectionSource for ReplaySource {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>> {
        Ok(self.by_frame.remove(&frame.frame_id).unwrap_or_default())
    }
}
