//! Image geometry operations.
//!
//! This module provides:
//! - `resize`: Resize an RGB image using interpolation
//! - `center_crop`: Center crop an RGB image to target dimensions
//! - `random_resized_crop`: Crop a random area/aspect region and resize it
//! - `horizontal_flip`: Mirror an image left to right with a probability

use super::InterpolationMethod;
use crate::error::{ProcessorError, ProcessorResult};
use image::imageops;
use image::RgbImage;
use log::{debug, warn};
use rand::Rng;

/// Number of area/aspect samples tried before falling back to a center crop.
const RANDOM_CROP_ATTEMPTS: usize = 10;

/// A crop window in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

fn ensure_not_empty(image: &RgbImage, op: &str) -> ProcessorResult<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ProcessorError::InvalidInput(format!(
            "{} requires a non-empty image (got {}x{})",
            op,
            image.width(),
            image.height()
        )));
    }
    Ok(())
}

/// Resize an image to exactly `width` x `height`.
///
/// # Arguments
/// - `image`: Source image
/// - `width`: Target width
/// - `height`: Target height
/// - `interpolation`: Interpolation method (Nearest, Bilinear, Bicubic)
pub fn resize(
    image: &RgbImage,
    width: u32,
    height: u32,
    interpolation: InterpolationMethod,
) -> ProcessorResult<RgbImage> {
    ensure_not_empty(image, "Resize")?;
    if width == 0 || height == 0 {
        return Err(ProcessorError::InvalidConfig(format!(
            "Resize target must be non-empty (got {}x{})",
            width, height
        )));
    }

    if image.width() == width && image.height() == height {
        return Ok(image.clone());
    }

    Ok(imageops::resize(
        image,
        width,
        height,
        interpolation.filter_type(),
    ))
}

/// Center crop an image to `width` x `height`.
pub fn center_crop(image: &RgbImage, width: u32, height: u32) -> ProcessorResult<RgbImage> {
    ensure_not_empty(image, "CenterCrop")?;

    let (src_w, src_h) = image.dimensions();
    if width > src_w || height > src_h {
        return Err(ProcessorError::InvalidInput(format!(
            "Cannot crop {}x{} from {}x{} image",
            width, height, src_w, src_h
        )));
    }

    let offset_x = (src_w - width) / 2;
    let offset_y = (src_h - height) / 2;

    Ok(imageops::crop_imm(image, offset_x, offset_y, width, height).to_image())
}

/// Sample the crop window used by [`random_resized_crop`].
///
/// Tries up to ten times to find a window whose area is a uniform fraction
/// of the image drawn from `scale` and whose aspect ratio is log-uniform in
/// `ratio`. Falls back to the largest centered window whose aspect ratio is
/// clamped into `ratio`.
pub fn sample_crop_region<R: Rng + ?Sized>(
    width: u32,
    height: u32,
    scale: (f64, f64),
    ratio: (f64, f64),
    rng: &mut R,
) -> CropRegion {
    let area = (width as f64) * (height as f64);
    let log_ratio = (ratio.0.ln(), ratio.1.ln());

    for _ in 0..RANDOM_CROP_ATTEMPTS {
        let target_area = area * rng.random_range(scale.0..=scale.1);
        let aspect_ratio = rng.random_range(log_ratio.0..=log_ratio.1).exp();

        let w = (target_area * aspect_ratio).sqrt().round() as u32;
        let h = (target_area / aspect_ratio).sqrt().round() as u32;

        if w > 0 && w <= width && h > 0 && h <= height {
            let y = rng.random_range(0..=height - h);
            let x = rng.random_range(0..=width - w);
            return CropRegion {
                x,
                y,
                width: w,
                height: h,
            };
        }
    }

    let in_ratio = width as f64 / height as f64;
    let (w, h) = if in_ratio < ratio.0 {
        let h = (width as f64 / ratio.0).round() as u32;
        (width, h.clamp(1, height))
    } else if in_ratio > ratio.1 {
        let w = (height as f64 * ratio.1).round() as u32;
        (w.clamp(1, width), height)
    } else {
        (width, height)
    };

    warn!(
        "RandomResizedCrop fell back to a center crop of {}x{} for a {}x{} image",
        w, h, width, height
    );

    CropRegion {
        x: (width - w) / 2,
        y: (height - h) / 2,
        width: w,
        height: h,
    }
}

/// Crop a random region and resize it to `size` x `size`.
///
/// # Arguments
/// - `image`: Source image
/// - `size`: Output side length
/// - `scale`: Range of the crop area as a fraction of the image area
/// - `ratio`: Range of the crop aspect ratio (width / height)
/// - `interpolation`: Interpolation used when resizing the crop
pub fn random_resized_crop<R: Rng + ?Sized>(
    image: &RgbImage,
    size: u32,
    scale: (f64, f64),
    ratio: (f64, f64),
    interpolation: InterpolationMethod,
    rng: &mut R,
) -> ProcessorResult<RgbImage> {
    ensure_not_empty(image, "RandomResizedCrop")?;
    validate_crop_ranges(scale, ratio)?;

    let region = sample_crop_region(image.width(), image.height(), scale, ratio, rng);
    debug!("RandomResizedCrop region: {:?}", region);

    let cropped =
        imageops::crop_imm(image, region.x, region.y, region.width, region.height).to_image();
    resize(&cropped, size, size, interpolation)
}

/// Check the scale/ratio ranges accepted by [`random_resized_crop`].
pub fn validate_crop_ranges(scale: (f64, f64), ratio: (f64, f64)) -> ProcessorResult<()> {
    if !(scale.0 > 0.0 && scale.0 <= scale.1 && scale.1 <= 1.0) {
        return Err(ProcessorError::InvalidConfig(format!(
            "RandomResizedCrop scale must satisfy 0 < min <= max <= 1 (got {:?})",
            scale
        )));
    }
    if !(ratio.0 > 0.0 && ratio.0 <= ratio.1 && ratio.1.is_finite()) {
        return Err(ProcessorError::InvalidConfig(format!(
            "RandomResizedCrop ratio must satisfy 0 < min <= max (got {:?})",
            ratio
        )));
    }
    Ok(())
}

/// Mirror the image left to right with probability `p`.
pub fn horizontal_flip<R: Rng + ?Sized>(image: RgbImage, p: f64, rng: &mut R) -> RgbImage {
    if p > 0.0 && rng.random::<f64>() < p {
        imageops::flip_horizontal(&image)
    } else {
        image
    }
}
