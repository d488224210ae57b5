//! Tensor conversion and normalization.
//!
//! This module provides:
//! - `to_tensor`: Convert an RGB image to a `[3, H, W]` tensor in `[0, 1]`
//! - `normalize`: Normalize tensor values using per-channel mean and standard deviation

use crate::error::{ProcessorError, ProcessorResult};
use image::RgbImage;
use ndarray::{Array3, Axis};

/// Convert an RGB image to a channels-first `f32` tensor scaled to `[0, 1]`.
pub fn to_tensor(image: &RgbImage) -> Array3<f32> {
    let (width, height) = image.dimensions();
    Array3::from_shape_fn((3, height as usize, width as usize), |(c, y, x)| {
        image.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
    })
}

/// Normalize tensor values using mean and standard deviation.
///
/// # Arguments
/// - `tensor`: Channels-first tensor
/// - `mean`: Per-channel mean values
/// - `std`: Per-channel standard deviation values
pub fn normalize(mut tensor: Array3<f32>, mean: &[f32], std: &[f32]) -> ProcessorResult<Array3<f32>> {
    let channels = tensor.shape()[0];
    if mean.len() != channels || std.len() != channels {
        return Err(ProcessorError::InvalidInput(format!(
            "Normalize expects {} mean/std values (got {} and {})",
            channels,
            mean.len(),
            std.len()
        )));
    }
    if let Some(bad) = std.iter().find(|s| **s == 0.0 || !s.is_finite()) {
        return Err(ProcessorError::InvalidConfig(format!(
            "Normalize std values must be finite and non-zero (got {})",
            bad
        )));
    }

    for (c, mut channel) in tensor.axis_iter_mut(Axis(0)).enumerate() {
        let (m, s) = (mean[c], std[c]);
        channel.mapv_inplace(|v| (v - m) / s);
    }

    Ok(tensor)
}
