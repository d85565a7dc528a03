// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 质检参数配置 - 通过JSON文件调整参数

use crate::detection::TrackerParams;
use crate::{InspectError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// 质检参数配置
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectionConfig {
    // === 画面布局 ===
    pub band_width_ratio: f32,   // 检测带宽度比例
    pub status_panel_ratio: f32, // 状态面板宽度比例

    // === 追踪参数 ===
    pub dwell_threshold_secs: f64,  // 驻留时长门限
    pub distance_threshold_px: f32, // 新瓶子中心距离门限
    pub min_confidence: f32,        // 低于此置信度的检测丢弃

    // === 落盘参数 ===
    pub save_interval_secs: f64, // 两次落盘最小间隔
    pub csv_path: PathBuf,
    pub snapshot_dir: PathBuf,
    pub snapshot_format: String, // 截图扩展名
}

impl Default for InspectionConfig {
    fn default() -> Self {
        Self {
            band_width_ratio: 0.3,
            status_panel_ratio: 0.3,

            dwell_threshold_secs: 1.5,
            distance_threshold_px: 100.0,
            min_confidence: 0.0,

            save_interval_secs: 2.0,
            csv_path: PathBuf::from("bottle_data.csv"),
            snapshot_dir: PathBuf::from("screenshots"),
            snapshot_format: String::from("png"),
        }
    }
}

/// 秒数转换为 `Duration`, 超出范围时报配置错误
fn duration_secs(name: &str, secs: f64) -> Result<Duration> {
    finite_non_negative(name, secs)?;
    Duration::try_from_secs_f64(secs).map_err(|e| {
        InspectError::Config(format!("{} is out of range ({}): {}", name, secs, e))
    })
}

fn finite_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(InspectError::Config(format!(
            "{} must be a non-negative number, got {}",
            name, value
        )))
    }
}

impl InspectionConfig {
    /// 从JSON文件加载配置, 文件不存在时写出默认配置
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "📝 配置文件不存在, 创建默认配置");
            let config = Self::default();
            if let Err(e) = config.save(path) {
                warn!("⚠️ 保存默认配置失败: {}", e);
            }
            return Ok(config);
        }
        let json = fs::read_to_string(path).map_err(|e| InspectError::io(path, e))?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        info!(path = %path.display(), "✅ 配置已加载");
        Ok(config)
    }

    /// 保存配置到JSON文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| InspectError::io(path, e))
    }

    pub fn validate(&self) -> Result<()> {
        for (name, ratio) in [
            ("band_width_ratio", self.band_width_ratio),
            ("status_panel_ratio", self.status_panel_ratio),
        ] {
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(InspectError::Config(format!(
                    "{} must be in (0, 1], got {}",
                    name, ratio
                )));
            }
        }
        if self.band_width_ratio + self.status_panel_ratio > 1.0 {
            return Err(InspectError::Config(
                "band_width_ratio + status_panel_ratio must not exceed 1".into(),
            ));
        }
        duration_secs("dwell_threshold_secs", self.dwell_threshold_secs)?;
        duration_secs("save_interval_secs", self.save_interval_secs)?;
        finite_non_negative("distance_threshold_px", self.distance_threshold_px as f64)?;
        finite_non_negative("min_confidence", self.min_confidence as f64)?;
        if self.snapshot_format.trim().is_empty() {
            return Err(InspectError::Config("snapshot_format is empty".into()));
        }
        Ok(())
    }

    /// 未通过 `validate` 的时长按 `Duration::MAX` 处理
    pub fn tracker_params(&self) -> TrackerParams {
        TrackerParams {
            dwell: duration_secs("dwell_threshold_secs", self.dwell_threshold_secs)
                .unwrap_or(Duration::MAX),
            distance: self.distance_threshold_px,
        }
    }

    pub fn save_interval(&self) -> Duration {
        duration_secs("save_interval_secs", self.save_interval_secs).unwrap_or(Duration::MAX)
    }

    /// 打印当前配置
    pub fn log_summary(&self) {
        info!(
            band = self.band_width_ratio,
            panel = self.status_panel_ratio,
            dwell_secs = self.dwell_threshold_secs,
            distance_px = self.distance_threshold_px,
            save_interval_secs = self.save_interval_secs,
            csv = %self.csv_path.display(),
            snapshots = %self.snapshot_dir.display(),
            "🎛️ 当前质检配置"
        );
    }
}
