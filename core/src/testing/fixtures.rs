//! Test fixtures for common image inputs.

use crate::error::ProcessorResult;
use image::{DynamicImage, Rgb, RgbImage};

/// A single-color RGB image.
pub fn solid_image(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)))
}

/// Red ramps left to right, green ramps top to bottom, blue is constant.
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    let (w, h) = (width.max(2) - 1, height.max(2) - 1);
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / w) as u8, (y * 255 / h) as u8, 96])
    }))
}

/// Black and white squares of `cell` pixels.
pub fn checkerboard_image(width: u32, height: u32, cell: u32) -> DynamicImage {
    let cell = cell.max(1);
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    }))
}

/// Encode an image as PNG bytes, e.g. to write a fixture file.
pub fn png_bytes(image: &DynamicImage) -> ProcessorResult<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_corners() {
        let image = gradient_image(10, 5).to_rgb8();

        assert_eq!(*image.get_pixel(0, 0), Rgb([0, 0, 96]));
        assert_eq!(*image.get_pixel(9, 4), Rgb([255, 255, 96]));
    }

    #[test]
    fn test_checkerboard_alternates() {
        let image = checkerboard_image(4, 4, 2).to_rgb8();

        assert_eq!(*image.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(*image.get_pixel(2, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_png_bytes_decode() {
        let bytes = png_bytes(&solid_image(3, 3, [1, 2, 3])).unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(*decoded.get_pixel(1, 1), Rgb([1, 2, 3]));
    }
}
