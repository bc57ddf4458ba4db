//! Thumbnail derivation for uploaded photos.
//!
//! Thumbnails are about 256px high with the aspect ratio kept, and are
//! stored next to the original under a content-independent key derived from
//! the original's key.

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

/// Default target height for thumbnails in pixels.
pub const DEFAULT_THUMB_HEIGHT: u32 = 256;

/// Minimum width for thumbnails (to handle extreme aspect ratios).
const MIN_THUMB_WIDTH: u32 = 64;

/// Maximum width for thumbnails (to handle extreme panoramas).
const MAX_THUMB_WIDTH: u32 = 1024;

const JPEG_QUALITY: u8 = 85;

/// An encoded JPEG thumbnail.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Storage key for the thumbnail of the object stored under `key`.
pub fn thumbnail_key(key: &str) -> String {
    format!("thumbs/{:016x}.jpg", xxh3_64(key.as_bytes()))
}

/// Decodes `data` and renders a JPEG thumbnail at `target_height`.
pub fn render(data: &[u8], target_height: u32) -> Result<Thumbnail> {
    let img = image::load_from_memory(data).context("Failed to decode uploaded image")?;
    let (src_width, src_height) = img.dimensions();
    let (width, height) = thumbnail_dimensions(src_width, src_height, target_height);
    debug!(src_width, src_height, width, height, "Rendering thumbnail");

    let resized = img.resize_exact(width, height, FilterType::CatmullRom);

    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    resized
        .to_rgb8()
        .write_with_encoder(encoder)
        .context("Failed to encode thumbnail")?;

    Ok(Thumbnail {
        data: buffer,
        width,
        height,
    })
}

/// Width follows the aspect ratio within `MIN_THUMB_WIDTH..=MAX_THUMB_WIDTH`.
/// Neither side ever exceeds the source: narrow sources keep their own width
/// rather than being widened to the minimum.
fn thumbnail_dimensions(src_width: u32, src_height: u32, target_height: u32) -> (u32, u32) {
    if src_width == 0 || src_height == 0 {
        return (target_height, target_height);
    }

    let height = target_height.min(src_height);
    let aspect = src_width as f64 / src_height as f64;
    let width = (height as f64 * aspect).round() as u32;

    let (width, height) = if width > MAX_THUMB_WIDTH {
        let height = (MAX_THUMB_WIDTH as f64 / aspect).round() as u32;
        (MAX_THUMB_WIDTH, height)
    } else if width < MIN_THUMB_WIDTH {
        (MIN_THUMB_WIDTH.min(src_width), height)
    } else {
        (width, height)
    };
    (width.clamp(1, src_width), height.clamp(1, src_height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        RgbImage::new(width, height)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_dimensions_landscape() {
        let (w, h) = thumbnail_dimensions(1920, 1080, 256);
        assert_eq!(h, 256);
        assert!((w as i32 - 455).abs() <= 1);
    }

    #[test]
    fn test_dimensions_no_upscale() {
        assert_eq!(thumbnail_dimensions(200, 100, 256), (200, 100));
    }

    #[test]
    fn test_dimensions_clamped() {
        let (w, h) = thumbnail_dimensions(10000, 500, 256);
        assert_eq!(w, MAX_THUMB_WIDTH);
        assert!(h < 256);

        assert_eq!(thumbnail_dimensions(100, 5000, 256), (MIN_THUMB_WIDTH, 256));
    }

    #[test]
    fn test_dimensions_tall_never_upscaled() {
        for (src_w, src_h) in [(10, 1000), (1, 4000), (63, 300), (40, 100)] {
            let (w, h) = thumbnail_dimensions(src_w, src_h, DEFAULT_THUMB_HEIGHT);
            assert!(w <= src_w && h <= src_h, "{src_w}x{src_h} became {w}x{h}");
            assert!(h <= DEFAULT_THUMB_HEIGHT);
        }
        assert_eq!(thumbnail_dimensions(10, 1000, 256), (10, 256));
    }

    #[test]
    fn test_render_tall_narrow() {
        let thumb = render(&png(8, 800), DEFAULT_THUMB_HEIGHT).unwrap();
        assert_eq!((thumb.width, thumb.height), (8, 256));
    }

    #[test]
    fn test_render_png() {
        let thumb = render(&png(800, 400), DEFAULT_THUMB_HEIGHT).unwrap();
        assert_eq!((thumb.width, thumb.height), (512, 256));
        assert_eq!(
            image::guess_format(&thumb.data).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_render_rejects_garbage() {
        assert!(render(b"definitely not an image", DEFAULT_THUMB_HEIGHT).is_err());
    }

    #[test]
    fn test_thumbnail_key_is_stable() {
        let key = thumbnail_key("uploads/1/100-live.jpg");
        assert!(key.starts_with("thumbs/"));
        assert!(key.ends_with(".jpg"));
        assert_eq!(key.len(), "thumbs/".len() + 16 + ".jpg".len());
        assert_eq!(key, thumbnail_key("uploads/1/100-live.jpg"));
        assert_ne!(key, thumbnail_key("uploads/1/101-live.jpg"));
    }
}
