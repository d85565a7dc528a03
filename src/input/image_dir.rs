// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 图片目录输入 - 按文件名排序逐帧读取

use super::{Frame, FrameSource};
use crate::{InspectError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "webp"];

pub struct ImageDirSource {
    files: Vec<PathBuf>,
    cursor: usize,
}

impl ImageDirSource {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|e| InspectError::io(dir, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| InspectError::io(dir, e))?.path();
            let is_image = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false);
            if is_image && path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        info!(dir = %dir.display(), frames = files.len(), "🎞️ 图片目录已打开");
        Ok(Self { files, cursor: 0 })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FrameSource for ImageDirSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(path) = self.files.get(self.cursor) else {
            return Ok(None);
        };
        let image = image::open(path)
            .map_err(|source| InspectError::ImageDecode {
                path: path.clone(),
                source,
            })?
            .to_rgb8();
        let frame = Frame::new(self.cursor as u64, image);
        self.cursor += 1;
        Ok(Some(frame))
    }
}
