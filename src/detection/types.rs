// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 瓶子检测数据结构定义
/// Data structures for bottle inspection detections
use serde::Deserialize;
use std::fmt;

// ========== 公共常量 ==========

/// 模型类别表 (按模型输出的类别ID排序)
pub const CLASS_NAMES: [&str; 6] = [
    "bottle",
    "cap",
    "cap missing",
    "damaged plastic",
    "label",
    "label missing",
];

// ========== 枚举类型 ==========

/// 检测类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "LabelRepr")]
pub enum DetectionLabel {
    Bottle,
    Cap,
    CapMissing,
    DamagedPlastic,
    Label,
    LabelMissing,
}

impl DetectionLabel {
    pub const ALL: [DetectionLabel; 6] = [
        DetectionLabel::Bottle,
        DetectionLabel::Cap,
        DetectionLabel::CapMissing,
        DetectionLabel::DamagedPlastic,
        DetectionLabel::Label,
        DetectionLabel::LabelMissing,
    ];

    /// 从模型类别ID映射
    pub fn from_class_id(id: u32) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// 从类别名称映射 (忽略大小写, 允许下划线)
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_lowercase().replace('_', " ");
        CLASS_NAMES
            .iter()
            .position(|n| *n == normalized)
            .map(|i| Self::ALL[i])
    }

    pub fn class_id(&self) -> u32 {
        *self as u32
    }

    pub fn as_str(&self) -> &'static str {
        CLASS_NAMES[*self as usize]
    }

    /// 显示用标题
    pub fn caption(&self) -> &'static str {
        match self {
            Self::Bottle => "Bottle",
            Self::Cap => "Cap",
            Self::CapMissing => "Cap Missing",
            Self::DamagedPlastic => "Damaged Plastic",
            Self::Label => "Label",
            Self::LabelMissing => "Label Missing",
        }
    }

    /// 是否为缺陷类别
    pub fn is_defect(&self) -> bool {
        matches!(
            self,
            Self::CapMissing | Self::LabelMissing | Self::DamagedPlastic
        )
    }
}

impl fmt::Display for DetectionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 回放文件中的类别: 名称或类别ID
#[derive(Deserialize)]
#[serde(untagged)]
enum LabelRepr {
    Id(u32),
    Name(String),
}

impl TryFrom<LabelRepr> for DetectionLabel {
    type Error = String;

    fn try_from(repr: LabelRepr) -> Result<Self, Self::Error> {
        match repr {
            LabelRepr::Id(id) => {
                Self::from_class_id(id).ok_or_else(|| format!("unknown class id {}", id))
            }
            LabelRepr::Name(name) => {
                Self::from_name(&name).ok_or_else(|| format!("unknown label '{}'", name))
            }
        }
    }
}

// ========== 数据结构 ==========

/// 检测框 (像素坐标, 检测器不保证 x1<x2 / y1<y2)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "[f32; 4]")]
pub struct BBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl From<[f32; 4]> for BBox {
    fn from(xyxy: [f32; 4]) -> Self {
        Self::new(xyxy[0] as i32, xyxy[1] as i32, xyxy[2] as i32, xyxy[3] as i32)
    }
}

impl BBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// 规范化: 保证 x1<=x2, y1<=y2
    pub fn normalized(&self) -> Self {
        Self {
            x1: self.x1.min(self.x2),
            y1: self.y1.min(self.y2),
            x2: self.x1.max(self.x2),
            y2: self.y1.max(self.y2),
        }
    }

    pub fn width(&self) -> u32 {
        self.x1.abs_diff(self.x2)
    }

    pub fn height(&self) -> u32 {
        self.y1.abs_diff(self.y2)
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// 中心点 (与坐标顺序无关)
    pub fn center(&self) -> (f32, f32) {
        let cx = (self.x1 as f32 + self.x2 as f32) / 2.0;
        let cy = (self.y1 as f32 + self.y2 as f32) / 2.0;
        (cx, cy)
    }

    /// 两框中心点的欧氏距离
    pub fn distance(&self, other: &BBox) -> f32 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }
}

/// 单帧检测结果
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Detection {
    pub label: DetectionLabel,
    pub bbox: BBox,
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

fn default_confidence() -> f32 {
    1.0
}

impl Detection {
    pub fn new(label: DetectionLabel, bbox: BBox, confidence: f32) -> Self {
        Self {
            label,
            bbox,
            confidence,
        }
    }
}
