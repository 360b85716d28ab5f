//! OCR前の画像前処理
//!
//! ## 処理フロー
//! 1. デコード（必要ならサイズ制限）
//! 2. EXIFの向き補正、コントラスト1.2倍、明るさ1.1倍、グレースケール化
//! 3. 背景を除いた内容領域で自動トリミング
//! 4. JPEGでエンコード

mod exif;

pub use exif::read_orientation;

use crate::error::Result;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat};
use std::io::Cursor;

const CONTRAST: f32 = 1.2;
const BRIGHTNESS: f32 = 1.1;
/// 縮小サンプリング倍率
const SAMPLE_DIVISOR: u32 = 4;
/// 行・列を内容ありと判定する暗画素の割合
const CONTENT_RATIO: f64 = 0.02;
/// これ以上縮まないならトリミングしない
const MIN_SHRINK: u32 = 8;

/// 前処理の設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessOptions {
    pub limit_size: bool,
    pub max_width: u32,
    pub max_height: u32,
    pub background_threshold: u8,
    pub padding: u32,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            limit_size: false,
            max_width: 1024,
            max_height: 768,
            background_threshold: 245,
            padding: 10,
        }
    }
}

/// 画像バイト列を前処理してJPEGバイト列を返す
pub fn preprocess(bytes: &[u8], opts: &PreprocessOptions) -> Result<Vec<u8>> {
    let orientation = read_orientation(bytes);
    let mut img = image::load_from_memory(bytes)?;
    tracing::debug!(
        width = img.width(),
        height = img.height(),
        orientation = ?orientation,
        "画像をデコード"
    );

    if opts.limit_size {
        img = limit_size(img, opts.max_width, opts.max_height);
    }

    let gray = normalize(img, orientation);
    let cropped = auto_crop(gray, opts.background_threshold, opts.padding);

    let mut out = Vec::new();
    DynamicImage::ImageLuma8(cropped).write_to(&mut Cursor::new(&mut out), ImageFormat::Jpeg)?;
    Ok(out)
}

/// 最大サイズに収める（縦横比維持）
pub fn limit_size(img: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    if img.width() > max_width || img.height() > max_height {
        img.resize(max_width, max_height, FilterType::Triangle)
    } else {
        img
    }
}

/// 向き補正・コントラスト・明るさ調整後にグレースケール化
pub fn normalize(img: DynamicImage, orientation: Option<u32>) -> GrayImage {
    let oriented = match orientation {
        Some(o) => apply_orientation(img, o),
        None => img,
    };

    let mut rgba = oriented.to_rgba8();
    for pixel in rgba.pixels_mut() {
        for channel in pixel.0.iter_mut().take(3) {
            *channel = adjust_channel(*channel);
        }
    }

    DynamicImage::ImageRgba8(rgba).to_luma8()
}

/// コントラスト（中間灰色基準）→ 明るさ（乗算）
fn adjust_channel(value: u8) -> u8 {
    let v = value as f32 / 255.0;
    let v = ((v - 0.5) * CONTRAST + 0.5) * BRIGHTNESS;
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// EXIF Orientation（1〜8）に従って回転・反転
pub fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// 内容領域（サンプル画像上の座標、両端含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

fn row_has_content(gray: &GrayImage, y: u32, threshold: u8) -> bool {
    let w = gray.width();
    let limit = content_limit(w);
    let mut dark = 0;
    for x in 0..w {
        if gray.get_pixel(x, y).0[0] < threshold {
            dark += 1;
            if dark >= limit {
                return true;
            }
        }
    }
    false
}

fn col_has_content(gray: &GrayImage, x: u32, threshold: u8) -> bool {
    let h = gray.height();
    let limit = content_limit(h);
    let mut dark = 0;
    for y in 0..h {
        if gray.get_pixel(x, y).0[0] < threshold {
            dark += 1;
            if dark >= limit {
                return true;
            }
        }
    }
    false
}

fn content_limit(len: u32) -> u32 {
    ((len as f64 * CONTENT_RATIO).floor() as u32).max(1)
}

/// 内容のある行・列の範囲を探す（見つからなければ全域）
pub fn find_content_box(gray: &GrayImage, threshold: u8) -> ContentBox {
    let (w, h) = gray.dimensions();
    let last_x = w.saturating_sub(1);
    let last_y = h.saturating_sub(1);

    ContentBox {
        top: (0..h).find(|&y| row_has_content(gray, y, threshold)).unwrap_or(0),
        bottom: (0..h).rev().find(|&y| row_has_content(gray, y, threshold)).unwrap_or(last_y),
        left: (0..w).find(|&x| col_has_content(gray, x, threshold)).unwrap_or(0),
        right: (0..w).rev().find(|&x| col_has_content(gray, x, threshold)).unwrap_or(last_x),
    }
}

/// 元解像度でのトリミング範囲 `(x, y, width, height)`
///
/// 十分に縮まない場合は `None`。
pub fn crop_rect(gray: &GrayImage, background_threshold: u8, padding: u32) -> Option<(u32, u32, u32, u32)> {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    // 縮小したコピーで走査
    let sample_w = (width / SAMPLE_DIVISOR).max(1);
    let sample_h = (height / SAMPLE_DIVISOR).max(1);
    let sample = if width > sample_w || height > sample_h {
        DynamicImage::ImageLuma8(gray.clone())
            .resize(sample_w, sample_h, FilterType::Triangle)
            .to_luma8()
    } else {
        gray.clone()
    };

    let bbox = find_content_box(&sample, background_threshold);
    let scale_x = width as f64 / sample.width() as f64;
    let scale_y = height as f64 / sample.height() as f64;

    let x1 = ((bbox.left as f64 * scale_x).floor() as i64 - padding as i64).max(0);
    let y1 = ((bbox.top as f64 * scale_y).floor() as i64 - padding as i64).max(0);
    let x2 = (((bbox.right + 1) as f64 * scale_x).ceil() as i64 + padding as i64).min(width as i64);
    let y2 = (((bbox.bottom + 1) as f64 * scale_y).ceil() as i64 + padding as i64).min(height as i64);

    let crop_w = (x2 - x1).max(1) as u32;
    let crop_h = (y2 - y1).max(1) as u32;

    if crop_w + MIN_SHRINK < width && crop_h + MIN_SHRINK < height {
        Some((x1 as u32, y1 as u32, crop_w, crop_h))
    } else {
        None
    }
}

/// 内容領域にトリミング（余白を付けて画像内に収める）
pub fn auto_crop(gray: GrayImage, background_threshold: u8, padding: u32) -> GrayImage {
    match crop_rect(&gray, background_threshold, padding) {
        Some((x, y, w, h)) => {
            tracing::debug!(x, y, w, h, "自動トリミング");
            image::imageops::crop_imm(&gray, x, y, w, h).to_image()
        }
        None => gray,
    }
}
