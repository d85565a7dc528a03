// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 质检系统错误类型
//! Error types for the inspection pipeline

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, InspectError>;

#[derive(Error, Debug)]
pub enum InspectError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("Failed to decode image {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Failed to write image {path}: {source}")]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Failed to load font {0}")]
    Font(PathBuf),
    #[error("Replay line {line}: {message}")]
    Replay { line: usize, message: String },
    #[error("Frame source closed")]
    SourceClosed,
}

impl InspectError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
