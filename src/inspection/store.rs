// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 记录存储 (Record Store)
//!
//! - CSV日志: 首次创建文件时写表头, 之后每个瓶子追加一行
//! - 截图目录: 首次写入时创建, 文件名 `bottle_<编号>.<扩展名>`

use super::record::{BottleRecord, CSV_HEADER};
use crate::{InspectError, Result};
use image::{ImageFormat, RgbImage};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// 记录落盘接口
pub trait RecordSink {
    /// 追加一行CSV记录
    fn append_record(&mut self, record: &BottleRecord) -> Result<()>;

    /// 写入截图, 返回文件路径
    fn write_snapshot(&mut self, number: u64, frame: &RgbImage) -> Result<PathBuf>;
}

impl<T: RecordSink + ?Sized> RecordSink for Box<T> {
    fn append_record(&mut self, record: &BottleRecord) -> Result<()> {
        (**self).append_record(record)
    }

    fn write_snapshot(&mut self, number: u64, frame: &RgbImage) -> Result<PathBuf> {
        (**self).write_snapshot(number, frame)
    }
}

/// 截图文件名
pub fn snapshot_file_name(number: u64, extension: &str) -> String {
    format!("bottle_{}.{}", number, extension)
}

/// 文件系统存储
pub struct CsvRecordStore {
    csv_path: PathBuf,
    snapshot_dir: PathBuf,
    extension: String,
    format: ImageFormat,
    dir_ready: bool,
}

impl CsvRecordStore {
    pub fn new(csv_path: impl Into<PathBuf>, snapshot_dir: impl Into<PathBuf>, extension: &str) -> Result<Self> {
        let extension = extension.trim_start_matches('.').to_lowercase();
        let format = ImageFormat::from_extension(&extension).ok_or_else(|| {
            InspectError::Config(format!("unsupported snapshot format '{}'", extension))
        })?;
        Ok(Self {
            csv_path: csv_path.into(),
            snapshot_dir: snapshot_dir.into(),
            extension,
            format,
            dir_ready: false,
        })
    }

    pub fn snapshot_path(&self, number: u64) -> PathBuf {
        self.snapshot_dir
            .join(snapshot_file_name(number, &self.extension))
    }
}

/// CSV字段转义 (含逗号/引号/换行时加引号)
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn csv_line<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

impl RecordSink for CsvRecordStore {
    fn append_record(&mut self, record: &BottleRecord) -> Result<()> {
        let path = &self.csv_path;
        let write_header = !path.exists();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| InspectError::io(parent, e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| InspectError::io(path, e))?;

        let mut buf = String::new();
        if write_header {
            buf.push_str(&csv_line(&CSV_HEADER));
            buf.push('\n');
        }
        buf.push_str(&csv_line(&record.csv_fields()));
        buf.push('\n');

        file.write_all(buf.as_bytes())
            .map_err(|e| InspectError::io(path, e))
    }

    fn write_snapshot(&mut self, number: u64, frame: &RgbImage) -> Result<PathBuf> {
        if !self.dir_ready {
            fs::create_dir_all(&self.snapshot_dir)
                .map_err(|e| InspectError::io(&self.snapshot_dir, e))?;
            self.dir_ready = true;
        }
        let path = self.snapshot_path(number);
        frame
            .save_with_format(&path, self.format)
            .map_err(|source| InspectError::ImageWrite {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

/// 内存存储 (演练模式 / 测试)
#[derive(Debug, Default)]
pub struct MemorySink {
    pub rows: Vec<BottleRecord>,
    pub snapshots: Vec<u64>,
    pub fail_csv: bool,
    pub fail_snapshot: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordSink for MemorySink {
    fn append_record(&mut self, record: &BottleRecord) -> Result<()> {
        if self.fail_csv {
            return Err(InspectError::io(
                "memory.csv",
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "csv disabled"),
            ));
        }
        self.rows.push(record.clone());
        Ok(())
    }

    fn write_snapshot(&mut self, number: u64, _frame: &RgbImage) -> Result<PathBuf> {
        if self.fail_snapshot {
            return Err(InspectError::io(
                "memory",
                std::io::Error::new(std::io::ErrorKind::Other, "snapshot disabled"),
            ));
        }
        self.snapshots.push(number);
        Ok(PathBuf::from(snapshot_file_name(number, "png")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspection::record::{CapState, InspectionStatus};

    fn record(number: u64) -> BottleRecord {
        let now = chrono::NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let mut r = BottleRecord::new(number, true, now);
        r.status = InspectionStatus::NonDefective;
        r
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("bottle_data.csv");
        let mut store = CsvRecordStore::new(&csv, dir.path().join("shots"), "png").unwrap();
        store.append_record(&record(2)).unwrap();
        let mut defective = record(3);
        defective.cap = CapState::Missing;
        defective.status = InspectionStatus::Defective;
        store.append_record(&defective).unwrap();

        // 重新打开已有文件, 不再写表头
        let mut reopened = CsvRecordStore::new(&csv, dir.path().join("shots"), "png").unwrap();
        reopened.append_record(&record(4)).unwrap();

        let text = fs::read_to_string(&csv).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Bottle Number,Cap,Label,Plastic,Status,Day,Date,Time",
                "2,NotDetected,NotDetected,Good,NonDefective,Friday,17/05/24,10:30:00",
                "3,Missing,NotDetected,Good,Defective,Friday,17/05/24,10:30:00",
                "4,NotDetected,NotDetected,Good,NonDefective,Friday,17/05/24,10:30:00",
            ]
        );
    }

    #[test]
    fn test_snapshot_dir_created_on_first_use() {
        let dir = tempfile::tempdir().unwrap();
        let shots = dir.path().join("screenshots");
        let mut store = CsvRecordStore::new(dir.path().join("log.csv"), &shots, "png").unwrap();
        assert!(!shots.exists());

        let frame = RgbImage::new(8, 4);
        let path = store.write_snapshot(9, &frame).unwrap();
        assert_eq!(path, shots.join("bottle_9.png"));
        let loaded = image::open(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (8, 4));
    }

    #[test]
    fn test_unknown_snapshot_format() {
        assert!(matches!(
            CsvRecordStore::new("a.csv", "shots", "xyz"),
            Err(InspectError::Config(_))
        ));
        assert!(CsvRecordStore::new("a.csv", "shots", ".JPG").is_ok());
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("Good"), "Good");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
