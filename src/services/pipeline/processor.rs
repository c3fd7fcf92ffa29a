//! CPU side of the pipeline: decode, orientation correction, resize, encode
//!
//! These functions are synchronous and CPU-bound; the stages run them through
//! `tokio::task::spawn_blocking` so the async runtime is never blocked.

use bytes::Bytes;
use exif::{In, Tag, Value};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageOutputFormat};
use std::io::Cursor;

use crate::error::{AppError, Result};
use crate::models::ThumbnailSize;

/// Quality used for every lossy re-encode in the pipeline
pub const JPEG_QUALITY: u8 = 80;

/// Decode raw bytes into an in-memory image
pub fn decode(data: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(data)
        .map_err(|e| AppError::ProcessingError(format!("failed to decode image: {e}")))
}

/// Decode raw bytes, applying embedded JPEG orientation metadata
///
/// Only JPEG sources carry EXIF orientation here. Missing or unreadable
/// metadata is not an error; the image passes through unrotated.
pub fn decode_oriented(data: &[u8]) -> Result<DynamicImage> {
    let decoded = decode(data)?;

    let is_jpeg = matches!(image::guess_format(data), Ok(ImageFormat::Jpeg));
    if is_jpeg {
        if let Some(orientation) = read_orientation(data) {
            return Ok(apply_orientation(decoded, orientation));
        }
    }

    Ok(decoded)
}

/// Re-encode an image as JPEG at the pipeline quality setting
pub fn encode_jpeg(img: &DynamicImage) -> Result<Bytes> {
    let mut buf = Vec::new();
    let mut cursor = Cursor::new(&mut buf);

    img.write_to(&mut cursor, ImageOutputFormat::Jpeg(JPEG_QUALITY))
        .map_err(|e| AppError::ProcessingError(format!("failed to encode JPEG: {e}")))?;

    Ok(Bytes::from(buf))
}

/// Resize to the exact catalog dimensions and encode
///
/// Aspect ratio is intentionally not preserved; output dimensions are exact.
pub fn render_thumbnail(img: &DynamicImage, size: &ThumbnailSize) -> Result<Bytes> {
    let resized = img.resize_exact(size.width, size.height, FilterType::Lanczos3);
    encode_jpeg(&resized)
}

fn read_orientation(data: &[u8]) -> Option<u32> {
    let mut cursor = Cursor::new(data);
    let exif = exif::Reader::new().read_from_container(&mut cursor).ok()?;
    let field = exif.get_field(Tag::Orientation, In::PRIMARY)?;
    match &field.value {
        Value::Short(v) => v.first().map(|&x| x as u32),
        Value::Long(v) => v.first().copied(),
        _ => None,
    }
}

fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
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

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    fn half_and_half(width: u32, height: u32) -> DynamicImage {
        // Left half red, right half blue
        let mut img = RgbImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let px = if x < width / 2 {
                    Rgb([220u8, 20, 20])
                } else {
                    Rgb([20u8, 20, 220])
                };
                img.put_pixel(x, y, px);
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    /// Splice an EXIF APP1 segment carrying only the orientation tag into a
    /// JPEG, right after the SOI marker.
    fn with_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "not a JPEG");

        let mut tiff = Vec::new();
        tiff.extend_from_slice(b"II\x2A\x00"); // little-endian TIFF header
        tiff.extend_from_slice(&8u32.to_le_bytes()); // offset of 0th IFD
        tiff.extend_from_slice(&1u16.to_le_bytes()); // one entry
        tiff.extend_from_slice(&0x0112u16.to_le_bytes()); // Orientation
        tiff.extend_from_slice(&3u16.to_le_bytes()); // SHORT
        tiff.extend_from_slice(&1u32.to_le_bytes()); // count
        tiff.extend_from_slice(&orientation.to_le_bytes());
        tiff.extend_from_slice(&[0, 0]); // value padding
        tiff.extend_from_slice(&0u32.to_le_bytes()); // no next IFD

        let payload_len = 6 + tiff.len(); // "Exif\0\0" + TIFF body
        let mut out = Vec::with_capacity(jpeg.len() + payload_len + 4);
        out.extend_from_slice(&jpeg[..2]);
        out.extend_from_slice(&[0xFF, 0xE1]);
        out.extend_from_slice(&((payload_len + 2) as u16).to_be_bytes());
        out.extend_from_slice(b"Exif\x00\x00");
        out.extend_from_slice(&tiff);
        out.extend_from_slice(&jpeg[2..]);
        out
    }

    fn assert_reddish(px: [u8; 4]) {
        assert!(px[0] > 128 && px[2] < 128, "expected red, got {px:?}");
    }

    fn assert_bluish(px: [u8; 4]) {
        assert!(px[2] > 128 && px[0] < 128, "expected blue, got {px:?}");
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert!(err.to_string().contains("decode"));
    }

    #[test]
    fn encode_preserves_dimensions() {
        let img = half_and_half(80, 40);
        let encoded = encode_jpeg(&img).unwrap();
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded.dimensions(), (80, 40));
    }

    #[test]
    fn render_thumbnail_produces_exact_dimensions() {
        let img = half_and_half(500, 333);
        let size = ThumbnailSize {
            width: 400,
            height: 200,
            label: "wide",
            kind: crate::models::ThumbnailKind::Wide,
        };
        let rendered = render_thumbnail(&img, &size).unwrap();
        let decoded = decode(&rendered).unwrap();
        assert_eq!(decoded.dimensions(), (400, 200));
    }

    #[test]
    fn jpeg_without_exif_passes_through_unrotated() {
        let encoded = encode_jpeg(&half_and_half(80, 40)).unwrap();
        let decoded = decode_oriented(&encoded).unwrap();
        assert_eq!(decoded.dimensions(), (80, 40));
    }

    #[test]
    fn orientation_six_rotates_ninety_clockwise() {
        let encoded = encode_jpeg(&half_and_half(80, 40)).unwrap();
        let tagged = with_orientation(&encoded, 6);

        let decoded = decode_oriented(&tagged).unwrap();
        assert_eq!(decoded.dimensions(), (40, 80));

        // The red left edge becomes the top edge
        assert_reddish(decoded.get_pixel(20, 10).0);
        assert_bluish(decoded.get_pixel(20, 70).0);
    }

    #[test]
    fn orientation_three_rotates_one_eighty() {
        let encoded = encode_jpeg(&half_and_half(80, 40)).unwrap();
        let tagged = with_orientation(&encoded, 3);

        let decoded = decode_oriented(&tagged).unwrap();
        assert_eq!(decoded.dimensions(), (80, 40));

        // Halves swap sides
        assert_bluish(decoded.get_pixel(10, 20).0);
        assert_reddish(decoded.get_pixel(70, 20).0);
    }

    #[test]
    fn orientation_one_is_identity() {
        let encoded = encode_jpeg(&half_and_half(80, 40)).unwrap();
        let tagged = with_orientation(&encoded, 1);

        let decoded = decode_oriented(&tagged).unwrap();
        assert_eq!(decoded.dimensions(), (80, 40));
        assert_reddish(decoded.get_pixel(10, 20).0);
    }

    #[test]
    fn png_ignores_orientation_path() {
        let img = half_and_half(64, 32);
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
            .unwrap();
        let decoded = decode_oriented(&buf).unwrap();
        assert_eq!(decoded.dimensions(), (64, 32));
    }
}
