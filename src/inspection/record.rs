// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 瓶子记录 (BottleRecord)
/// One record per physical bottle, as written to the CSV log
use chrono::NaiveDateTime;
use std::fmt;

/// CSV表头 (字段顺序与 `BottleRecord::csv_fields` 一致)
pub const CSV_HEADER: [&str; 8] = [
    "Bottle Number",
    "Cap",
    "Label",
    "Plastic",
    "Status",
    "Day",
    "Date",
    "Time",
];

// ========== 组件状态 ==========

/// 瓶盖状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapState {
    #[default]
    NotDetected,
    Detected,
    Missing,
}

/// 标签状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelState {
    #[default]
    NotDetected,
    Detected,
    Missing,
}

/// 瓶身状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlasticState {
    #[default]
    Good,
    Damaged,
}

/// 综合判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InspectionStatus {
    /// 尚未聚合过瓶身检测
    #[default]
    Pending,
    Defective,
    NonDefective,
}

impl CapState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotDetected => "NotDetected",
            Self::Detected => "Detected",
            Self::Missing => "Missing",
        }
    }
}

impl LabelState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotDetected => "NotDetected",
            Self::Detected => "Detected",
            Self::Missing => "Missing",
        }
    }
}

impl PlasticState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Damaged => "Damaged",
        }
    }
}

impl InspectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Defective => "Defective",
            Self::NonDefective => "NonDefective",
        }
    }
}

macro_rules! impl_display {
    ($($t:ty),*) => {
        $(impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display!(CapState, LabelState, PlasticState, InspectionStatus);

// ========== 瓶子记录 ==========

#[derive(Debug, Clone, PartialEq)]
pub struct BottleRecord {
    /// 全局递增编号, 不复用
    pub number: u64,
    pub cap: CapState,
    pub label: LabelState,
    pub plastic: PlasticState,
    pub status: InspectionStatus,
    /// 星期 (例如 "Monday")
    pub day: String,
    /// 日期 DD/MM/YY
    pub date: String,
    /// 时间 HH:MM:SS
    pub time: String,
    /// 是否由追踪器确认 (启动时的空闲记录为 false)
    pub confirmed: bool,
}

impl BottleRecord {
    pub fn new(number: u64, confirmed: bool, now: NaiveDateTime) -> Self {
        let mut record = Self {
            number,
            cap: CapState::default(),
            label: LabelState::default(),
            plastic: PlasticState::default(),
            status: InspectionStatus::default(),
            day: String::new(),
            date: String::new(),
            time: String::new(),
            confirmed,
        };
        record.stamp(now);
        record
    }

    /// 刷新日期时间字段 (每帧调用)
    pub fn stamp(&mut self, now: NaiveDateTime) {
        self.day = now.format("%A").to_string();
        self.date = now.format("%d/%m/%y").to_string();
        self.time = now.format("%H:%M:%S").to_string();
    }

    /// CSV字段 (顺序与 `CSV_HEADER` 一致)
    pub fn csv_fields(&self) -> [String; 8] {
        [
            self.number.to_string(),
            self.cap.to_string(),
            self.label.to_string(),
            self.plastic.to_string(),
            self.status.to_string(),
            self.day.clone(),
            self.date.clone(),
            self.time.clone(),
        ]
    }
}
