// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 视频输入系统 (Video Input System)
///
/// - FrameSource:    帧来源接口 (阻塞获取下一帧)
/// - ImageDirSource: 从图片目录按文件名顺序读取帧
/// - BlankSource:    固定尺寸空白帧 (仅回放检测时使用)
/// - capture:        独立采集线程 + 有界通道
pub mod capture;
pub mod image_dir;

pub use capture::{spawn_capture, ChannelSource};
pub use image_dir::ImageDirSource;

use crate::Result;
use image::{Rgb, RgbImage};

/// 一帧画面
#[derive(Clone, Debug)]
pub struct Frame {
    /// 帧序号 (从0开始)
    pub frame_id: u64,
    pub image: RgbImage,
}

impl Frame {
    pub fn new(frame_id: u64, image: RgbImage) -> Self {
        Self { frame_id, image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }
}

/// 帧来源
///
/// `Ok(None)` 表示正常结束, `Err` 表示取帧失败; 两者都会结束处理循环。
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        (**self).next_frame()
    }
}

/// 空白帧来源
pub struct BlankSource {
    width: u32,
    height: u32,
    remaining: Option<u64>,
    next_id: u64,
}

impl BlankSource {
    /// `count` 为 `None` 时无限产生
    pub fn new(width: u32, height: u32, count: Option<u64>) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            remaining: count,
            next_id: 0,
        }
    }
}

impl FrameSource for BlankSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return Ok(None);
            }
            *remaining -= 1;
        }
        let frame = Frame::new(
            self.next_id,
            RgbImage::from_pixel(self.width, self.height, Rgb([40, 40, 40])),
        );
        self.next_id += 1;
        Ok(Some(frame))
    }
}
