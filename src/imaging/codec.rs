//! Decode, resize and JPEG-encode helpers around the `image` crate.

use crate::error::Result;
use crate::persist;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::path::Path;

/// Decode an image, sniffing the format from content before the extension.
pub fn decode(path: &Path) -> Result<DynamicImage> {
    Ok(ImageReader::open(path)?.with_guessed_format()?.decode()?)
}

/// Dimensions after scaling to `target_width`, keeping the aspect ratio.
///
/// Height never collapses below one pixel.
pub fn scaled_dimensions(width: u32, height: u32, target_width: u32) -> (u32, u32) {
    if width == 0 {
        return (target_width, height.max(1));
    }
    let scale = target_width as f64 / width as f64;
    let new_height = (height as f64 * scale).round().max(1.0) as u32;
    (target_width, new_height)
}

/// Resize to `target_width` with Lanczos3, keeping the aspect ratio.
pub fn resize_to_width(img: &DynamicImage, target_width: u32) -> DynamicImage {
    let (width, height) = scaled_dimensions(img.width(), img.height(), target_width);
    img.resize_exact(width, height, FilterType::Lanczos3)
}

/// Encode as baseline JPEG. Alpha is dropped.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = img.to_rgb8();
    let mut data = Vec::new();
    JpegEncoder::new_with_quality(&mut data, quality).encode_image(&rgb)?;
    Ok(data)
}

/// Encode `img` as JPEG and atomically write it to `target`.
pub fn save_jpeg(img: &DynamicImage, target: &Path, quality: u8) -> Result<()> {
    let data = encode_jpeg(img, quality)?;
    persist::write_atomic(target, &data)
}
