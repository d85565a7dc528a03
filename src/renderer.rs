// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 画面渲染 - 检测框与状态面板
//!
//! 只读取当前记录, 不修改任何质检状态。文字仅在提供字体时绘制。

use crate::detection::{Detection, DetectionLabel, InspectionBand};
use crate::inspection::{BottleRecord, InspectionStatus};
use crate::{InspectError, Result};
use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::path::Path;

// ========== 颜色 ==========

pub const COLOR_BOTTLE: Rgb<u8> = Rgb([0, 0, 255]);
pub const COLOR_PRESENT: Rgb<u8> = Rgb([0, 255, 0]);
pub const COLOR_DEFECTIVE: Rgb<u8> = Rgb([255, 0, 0]);
pub const COLOR_TEXT: Rgb<u8> = Rgb([0, 0, 0]);
pub const COLOR_PANEL: Rgb<u8> = Rgb([255, 255, 255]);
const COLOR_BAND_BORDER: Rgb<u8> = Rgb([255, 255, 255]);

const BOX_PADDING: i32 = 10;
const BOX_THICKNESS: i32 = 6;
const BAND_BORDER_THICKNESS: i32 = 8;
/// 非检测区亮度保留比例
const DEAD_ZONE_SHADE: f32 = 0.25;
/// 字号按此参考高度缩放
const REFERENCE_HEIGHT: f32 = 1600.0;

pub fn label_color(label: DetectionLabel) -> Rgb<u8> {
    match label {
        DetectionLabel::Bottle => COLOR_BOTTLE,
        l if l.is_defect() => COLOR_DEFECTIVE,
        _ => COLOR_PRESENT,
    }
}

pub fn status_color(status: InspectionStatus) -> Rgb<u8> {
    if status == InspectionStatus::NonDefective {
        COLOR_PRESENT
    } else {
        COLOR_DEFECTIVE
    }
}

/// 画粗边框 (自动裁剪到画面内)
fn draw_thick_rect(img: &mut RgbImage, x1: i32, y1: i32, x2: i32, y2: i32, thickness: i32, color: Rgb<u8>) {
    for i in 0..thickness {
        let w = x2 - x1 - 2 * i;
        let h = y2 - y1 - 2 * i;
        if w <= 0 || h <= 0 {
            break;
        }
        let rect = Rect::at(x1 + i, y1 + i).of_size(w as u32, h as u32);
        draw_hollow_rect_mut(img, rect, color);
    }
}

fn shade_columns(img: &mut RgbImage, from: i32, to: i32) {
    let from = from.clamp(0, img.width() as i32) as u32;
    let to = to.clamp(0, img.width() as i32) as u32;
    for y in 0..img.height() {
        for x in from..to {
            let p = img.get_pixel_mut(x, y);
            for c in p.0.iter_mut() {
                *c = (*c as f32 * DEAD_ZONE_SHADE) as u8;
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct Renderer {
    font: Option<FontArc>,
}

impl Renderer {
    pub fn new(font: Option<FontArc>) -> Self {
        Self { font }
    }

    /// 加载TTF/OTF字体
    pub fn load_font(path: impl AsRef<Path>) -> Result<FontArc> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| InspectError::io(path, e))?;
        FontArc::try_from_vec(bytes).map_err(|_| InspectError::Font(path.to_path_buf()))
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    fn text(&self, img: &mut RgbImage, text: &str, x: i32, y: i32, size: f32, color: Rgb<u8>) {
        if let Some(font) = &self.font {
            let scale = PxScale::from(size * img.height() as f32 / REFERENCE_HEIGHT);
            draw_text_mut(img, color, x, y, scale, font, text);
        }
    }

    /// 画面分区: 非检测区压暗, 检测带描边, 状态面板底色
    pub fn draw_layout(&self, img: &mut RgbImage, band: &InspectionBand) {
        let (w, h) = (img.width() as i32, img.height() as i32);
        shade_columns(img, 0, band.track_start);
        shade_columns(img, band.track_end, band.status_start);
        draw_thick_rect(
            img,
            band.track_start,
            0,
            band.track_end,
            h,
            BAND_BORDER_THICKNESS,
            COLOR_BAND_BORDER,
        );
        let panel_w = w - band.status_start;
        if panel_w > 0 && h > 0 {
            draw_filled_rect_mut(
                img,
                Rect::at(band.status_start, 0).of_size(panel_w as u32, h as u32),
                COLOR_PANEL,
            );
        }
    }

    /// 绘制检测框与标题
    pub fn annotate(&self, img: &mut RgbImage, detections: &[Detection]) {
        for det in detections {
            let b = det.bbox.normalized();
            let color = label_color(det.label);
            let x1 = (b.x1 - BOX_PADDING).max(0);
            let y1 = (b.y1 - BOX_PADDING).max(0);
            draw_thick_rect(
                img,
                x1,
                y1,
                b.x2 + BOX_PADDING,
                b.y2 + BOX_PADDING,
                BOX_THICKNESS,
                color,
            );
            self.text(img, det.label.caption(), x1, (y1 - 40).max(0), 40.0, color);
        }
    }

    /// 绘制状态面板
    pub fn draw_status_panel(&self, img: &mut RgbImage, band: &InspectionBand, record: &BottleRecord) {
        if !self.has_font() {
            return;
        }
        let x = band.status_start + 20;
        let h = img.height() as f32;
        let rows = [
            (format!("Bottle: #{}", record.number), 30.0, 90.0, COLOR_TEXT),
            (
                format!("Status: {}", record.status),
                200.0,
                50.0,
                status_color(record.status),
            ),
            (format!("Cap: {}", record.cap), 300.0, 45.0, COLOR_TEXT),
            (format!("Label: {}", record.label), 400.0, 45.0, COLOR_TEXT),
            (format!("Plastic: {}", record.plastic), 500.0, 45.0, COLOR_TEXT),
            (format!("Production Day: {}", record.day), 1150.0, 40.0, COLOR_TEXT),
            (format!("Production Date: {}", record.date), 1250.0, 40.0, COLOR_TEXT),
            (format!("Current Time: {}", record.time), 1350.0, 40.0, COLOR_TEXT),
        ];
        for (text, y, size, color) in &rows {
            let y = (y * h / REFERENCE_HEIGHT) as i32;
            self.text(img, text, x, y, *size, *color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::BBox;

    #[test]
    fn test_label_colors() {
        assert_eq!(label_color(DetectionLabel::Bottle), COLOR_BOTTLE);
        assert_eq!(label_color(DetectionLabel::Cap), COLOR_PRESENT);
        assert_eq!(label_color(DetectionLabel::LabelMissing), COLOR_DEFECTIVE);
        assert_eq!(status_color(InspectionStatus::NonDefective), COLOR_PRESENT);
        assert_eq!(status_color(InspectionStatus::Pending), COLOR_DEFECTIVE);
    }

    #[test]
    fn test_annotate_draws_padded_box() {
        let mut img = RgbImage::from_pixel(200, 200, Rgb([10, 10, 10]));
        let det = Detection::new(DetectionLabel::Bottle, BBox::new(120, 120, 50, 50), 0.9);
        Renderer::default().annotate(&mut img, &[det]);
        // 规范化后外扩10px: 左上角 (40, 40)
        assert_eq!(*img.get_pixel(40, 40), COLOR_BOTTLE);
        assert_eq!(*img.get_pixel(100, 100), Rgb([10, 10, 10]));
    }

    #[test]
    fn test_annotate_clips_boxes_at_edges() {
        let mut img = RgbImage::new(50, 50);
        let dets = [
            Detection::new(DetectionLabel::CapMissing, BBox::new(0, 0, 80, 80), 0.9),
            Detection::new(DetectionLabel::Cap, BBox::new(30, 30, 30, 30), 0.9),
        ];
        Renderer::default().annotate(&mut img, &dets);
        assert_eq!(*img.get_pixel(0, 0), COLOR_DEFECTIVE);
    }

    #[test]
    fn test_layout_regions() {
        let mut img = RgbImage::from_pixel(1000, 100, Rgb([200, 200, 200]));
        let band = InspectionBand::from_width(1000, 0.3, 0.3);
        Renderer::default().draw_layout(&mut img, &band);
        assert_eq!(*img.get_pixel(50, 50), Rgb([50, 50, 50]));
        assert_eq!(*img.get_pixel(350, 50), Rgb([200, 200, 200]));
        assert_eq!(*img.get_pixel(200, 50), COLOR_BAND_BORDER);
        assert_eq!(*img.get_pixel(600, 50), Rgb([50, 50, 50]));
        assert_eq!(*img.get_pixel(900, 50), COLOR_PANEL);
    }
}
