use fast_image_resize::{self as fir, images::Image as FirImage};
use image::{Rgb, RgbImage};

use crate::error::{Error, Result};

/// Default edge length of grid thumbnails, in pixels.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 128;

const PLACEHOLDER_GREY: Rgb<u8> = Rgb([200, 200, 200]);

/// Decode `bytes`, center-crop to a square and resize to `size × size`.
///
/// JPEG goes through `turbojpeg` when the feature is enabled; everything else,
/// and any JPEG turbojpeg rejects, through the `image` crate.
pub fn generate(bytes: &[u8], size: u32) -> Result<RgbImage> {
    let size = size.max(1);
    let (rgb, w, h) = decode_rgb(bytes)?;

    let side = w.min(h);
    let left = (w - side) / 2;
    let top = (h - side) / 2;

    let src = FirImage::from_vec_u8(w, h, rgb, fir::PixelType::U8x3)?;
    let mut dst = FirImage::new(size, size, fir::PixelType::U8x3);
    let options = fir::ResizeOptions::new().crop(
        left as f64,
        top as f64,
        side as f64,
        side as f64,
    );
    fir::Resizer::new().resize(&src, &mut dst, &options)?;

    RgbImage::from_raw(size, size, dst.buffer().to_vec()).ok_or(Error::UnrecognizedImage)
}

/// Flat grey square shown in place of an image that can't be loaded.
pub fn placeholder(size: u32) -> RgbImage {
    let size = size.max(1);
    RgbImage::from_pixel(size, size, PLACEHOLDER_GREY)
}

fn decode_rgb(bytes: &[u8]) -> Result<(Vec<u8>, u32, u32)> {
    if matches!(image::guess_format(bytes), Ok(image::ImageFormat::Jpeg)) {
        if let Some(decoded) = decode_jpeg_rgb(bytes) {
            return Ok(decoded);
        }
    }

    let rgb = image::load_from_memory(bytes)?.to_rgb8();
    let (w, h) = rgb.dimensions();
    Ok((rgb.into_raw(), w, h))
}

#[cfg(feature = "turbojpeg")]
fn decode_jpeg_rgb(bytes: &[u8]) -> Option<(Vec<u8>, u32, u32)> {
    let mut decompressor = turbojpeg::Decompressor::new().ok()?;
    let header = decompressor.read_header(bytes).ok()?;
    let (w, h) = (header.width, header.height);

    let mut buf = vec![0u8; w * h * 3];
    let output = turbojpeg::Image {
        pixels: buf.as_mut_slice(),
        width: w,
        pitch: w * 3,
        height: h,
        format: turbojpeg::PixelFormat::RGB,
    };
    decompressor.decompress(bytes, output).ok()?;
    Some((buf, w as u32, h as u32))
}

#[cfg(not(feature = "turbojpeg"))]
fn decode_jpeg_rgb(_bytes: &[u8]) -> Option<(Vec<u8>, u32, u32)> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode(img: &RgbImage, format: image::ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_thumbnail_is_square() {
        let img = RgbImage::from_fn(200, 100, |x, _| Rgb([x as u8, 0, 0]));
        let thumb = generate(&encode(&img, image::ImageFormat::Png), 32).unwrap();
        assert_eq!(thumb.dimensions(), (32, 32));
    }

    #[test]
    fn test_thumbnail_from_jpeg() {
        let img = RgbImage::from_fn(64, 96, |_, y| Rgb([0, y as u8, 255]));
        let thumb = generate(&encode(&img, image::ImageFormat::Jpeg), 16).unwrap();
        assert_eq!(thumb.dimensions(), (16, 16));
    }

    #[test]
    fn test_thumbnail_crops_center() {
        // Red left third, green middle, blue right third: a centered square
        // crop of a 300x100 image only sees green.
        let img = RgbImage::from_fn(300, 100, |x, _| match x {
            0..=99 => Rgb([255, 0, 0]),
            100..=199 => Rgb([0, 255, 0]),
            _ => Rgb([0, 0, 255]),
        });
        let thumb = generate(&encode(&img, image::ImageFormat::Png), 10).unwrap();
        let px = thumb.get_pixel(5, 5);
        assert!(px[1] > 200 && px[0] < 50 && px[2] < 50, "got {px:?}");
    }

    #[test]
    fn test_thumbnail_zero_size_clamped() {
        let img = RgbImage::from_pixel(8, 8, Rgb([1, 2, 3]));
        let thumb = generate(&encode(&img, image::ImageFormat::Png), 0).unwrap();
        assert_eq!(thumb.dimensions(), (1, 1));
    }

    #[test]
    fn test_thumbnail_garbage_is_error() {
        assert!(generate(b"definitely not an image", 16).is_err());
    }

    #[test]
    fn test_placeholder() {
        let p = placeholder(4);
        assert_eq!(p.dimensions(), (4, 4));
        assert!(p.pixels().all(|px| *px == PLACEHOLDER_GREY));
    }
}
