//! Pixel-level augmentation operations used by [`RandomAugment`](super::RandomAugment).
//!
//! Every op takes an RGB image plus a magnitude-derived argument and returns a
//! new image of the same size. Geometric ops sample bilinearly and fill pixels
//! that map outside the source with [`FILL_COLOR`].

use crate::error::ProcessorError;
use image::{Rgb, RgbImage};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest magnitude level accepted by the level-to-argument mapping.
pub const MAX_LEVEL: f32 = 10.0;

/// Gray used for pixels uncovered by shear, translate and rotate.
pub const FILL_COLOR: Rgb<u8> = Rgb([128, 128, 128]);

/// Maximum translation in pixels at `MAX_LEVEL`.
const TRANSLATE_CONST: f32 = 10.0;

/// Augmentation operation catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AugmentOp {
    Identity,
    AutoContrast,
    Equalize,
    Rotate,
    Solarize,
    Color,
    Contrast,
    Brightness,
    Sharpness,
    ShearX,
    ShearY,
    TranslateX,
    TranslateY,
    Posterize,
}

impl AugmentOp {
    pub const ALL: [AugmentOp; 14] = [
        AugmentOp::Identity,
        AugmentOp::AutoContrast,
        AugmentOp::Equalize,
        AugmentOp::Rotate,
        AugmentOp::Solarize,
        AugmentOp::Color,
        AugmentOp::Contrast,
        AugmentOp::Brightness,
        AugmentOp::Sharpness,
        AugmentOp::ShearX,
        AugmentOp::ShearY,
        AugmentOp::TranslateX,
        AugmentOp::TranslateY,
        AugmentOp::Posterize,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AugmentOp::Identity => "Identity",
            AugmentOp::AutoContrast => "AutoContrast",
            AugmentOp::Equalize => "Equalize",
            AugmentOp::Rotate => "Rotate",
            AugmentOp::Solarize => "Solarize",
            AugmentOp::Color => "Color",
            AugmentOp::Contrast => "Contrast",
            AugmentOp::Brightness => "Brightness",
            AugmentOp::Sharpness => "Sharpness",
            AugmentOp::ShearX => "ShearX",
            AugmentOp::ShearY => "ShearY",
            AugmentOp::TranslateX => "TranslateX",
            AugmentOp::TranslateY => "TranslateY",
            AugmentOp::Posterize => "Posterize",
        }
    }

    /// Whether the op moves pixels (and therefore uses the fill color).
    pub fn is_geometric(&self) -> bool {
        matches!(
            self,
            AugmentOp::Rotate
                | AugmentOp::ShearX
                | AugmentOp::ShearY
                | AugmentOp::TranslateX
                | AugmentOp::TranslateY
        )
    }

    /// Map a magnitude level to this op's argument.
    ///
    /// Shear, translate and rotate flip the sign of the argument with
    /// probability 0.5, so this draws from `rng`.
    pub fn level_to_arg<R: Rng + ?Sized>(&self, level: f32, rng: &mut R) -> f32 {
        let fraction = level / MAX_LEVEL;
        let signed = |value: f32, rng: &mut R| if rng.random::<f32>() > 0.5 { -value } else { value };

        match self {
            AugmentOp::Identity | AugmentOp::AutoContrast | AugmentOp::Equalize => 0.0,
            AugmentOp::Color | AugmentOp::Contrast | AugmentOp::Brightness | AugmentOp::Sharpness => {
                fraction * 1.8 + 0.1
            }
            AugmentOp::Solarize => 256.0 - (fraction * 256.0).trunc(),
            AugmentOp::Posterize => 4.0 - (fraction * 4.0).trunc(),
            AugmentOp::ShearX | AugmentOp::ShearY => signed(fraction * 0.3, rng),
            AugmentOp::TranslateX | AugmentOp::TranslateY => signed(fraction * TRANSLATE_CONST, rng),
            AugmentOp::Rotate => signed(fraction * 30.0, rng),
        }
    }

    /// Apply the op with an already-mapped argument.
    pub fn apply(&self, image: &RgbImage, arg: f32) -> RgbImage {
        match self {
            AugmentOp::Identity => image.clone(),
            AugmentOp::AutoContrast => auto_contrast(image),
            AugmentOp::Equalize => equalize(image),
            AugmentOp::Rotate => rotate(image, arg),
            AugmentOp::Solarize => solarize(image, arg.clamp(0.0, 256.0) as u16),
            AugmentOp::Color => color(image, arg),
            AugmentOp::Contrast => contrast(image, arg),
            AugmentOp::Brightness => brightness(image, arg),
            AugmentOp::Sharpness => sharpness(image, arg),
            AugmentOp::ShearX => shear_x(image, arg),
            AugmentOp::ShearY => shear_y(image, arg),
            AugmentOp::TranslateX => translate_x(image, arg),
            AugmentOp::TranslateY => translate_y(image, arg),
            AugmentOp::Posterize => posterize(image, arg.clamp(1.0, 8.0) as u8),
        }
    }
}

impl fmt::Display for AugmentOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AugmentOp {
    type Err = ProcessorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AugmentOp::ALL
            .iter()
            .copied()
            .find(|op| op.name() == s)
            .ok_or_else(|| ProcessorError::InvalidConfig(format!("Unknown augmentation op: {}", s)))
    }
}

fn clamp_u8(value: f32) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

fn map_channels(image: &RgbImage, table: &[[u8; 256]; 3]) -> RgbImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        for c in 0..3 {
            pixel[c] = table[c][pixel[c] as usize];
        }
    }
    out
}

fn map_all_channels(image: &RgbImage, table: &[u8; 256]) -> RgbImage {
    map_channels(image, &[*table, *table, *table])
}

fn histograms(image: &RgbImage) -> [[u32; 256]; 3] {
    let mut hist = [[0u32; 256]; 3];
    for pixel in image.pixels() {
        for c in 0..3 {
            hist[c][pixel[c] as usize] += 1;
        }
    }
    hist
}

fn luma(pixel: &Rgb<u8>) -> f32 {
    0.299 * pixel[0] as f32 + 0.587 * pixel[1] as f32 + 0.114 * pixel[2] as f32
}

/// Stretch each channel so its darkest value maps to 0 and brightest to 255.
pub fn auto_contrast(image: &RgbImage) -> RgbImage {
    let hist = histograms(image);
    let mut table = [[0u8; 256]; 3];

    for c in 0..3 {
        let low = hist[c].iter().position(|&n| n > 0);
        let high = hist[c].iter().rposition(|&n| n > 0);
        for (v, entry) in table[c].iter_mut().enumerate() {
            *entry = match (low, high) {
                (Some(lo), Some(hi)) if hi > lo => {
                    let shifted = v as f32 - lo as f32;
                    clamp_u8(shifted * 255.0 / (hi - lo) as f32)
                }
                _ => v as u8,
            };
        }
    }

    map_channels(image, &table)
}

/// Per-channel histogram equalization.
pub fn equalize(image: &RgbImage) -> RgbImage {
    let hist = histograms(image);
    let mut table = [[0u8; 256]; 3];

    for c in 0..3 {
        let non_zero: Vec<u32> = hist[c].iter().copied().filter(|&n| n > 0).collect();
        let step = non_zero
            .iter()
            .take(non_zero.len().saturating_sub(1))
            .map(|&n| n as u64)
            .sum::<u64>()
            / 255;

        if step == 0 {
            for (v, entry) in table[c].iter_mut().enumerate() {
                *entry = v as u8;
            }
            continue;
        }

        let mut cumulative = step / 2;
        for (v, entry) in table[c].iter_mut().enumerate() {
            *entry = (cumulative / step).min(255) as u8;
            cumulative += hist[c][v] as u64;
        }
    }

    map_channels(image, &table)
}

/// Invert every value at or above `threshold`.
pub fn solarize(image: &RgbImage, threshold: u16) -> RgbImage {
    let mut table = [0u8; 256];
    for (v, entry) in table.iter_mut().enumerate() {
        *entry = if (v as u16) < threshold { v as u8 } else { 255 - v as u8 };
    }
    map_all_channels(image, &table)
}

/// Keep only the top `bits` bits of each value.
pub fn posterize(image: &RgbImage, bits: u8) -> RgbImage {
    let bits = bits.clamp(1, 8);
    let mask = (0xFFu16 << (8 - bits)) as u8;
    let mut table = [0u8; 256];
    for (v, entry) in table.iter_mut().enumerate() {
        *entry = v as u8 & mask;
    }
    map_all_channels(image, &table)
}

/// Scale every value by `factor`.
pub fn brightness(image: &RgbImage, factor: f32) -> RgbImage {
    let mut table = [0u8; 256];
    for (v, entry) in table.iter_mut().enumerate() {
        *entry = clamp_u8(v as f32 * factor);
    }
    map_all_channels(image, &table)
}

/// Blend each pixel with its grayscale value; 0 is grayscale, 1 is unchanged.
pub fn color(image: &RgbImage, factor: f32) -> RgbImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let gray = luma(pixel);
        for c in 0..3 {
            pixel[c] = clamp_u8(gray + factor * (pixel[c] as f32 - gray));
        }
    }
    out
}

/// Blend each value with the mean gray level; 0 is flat gray, 1 is unchanged.
pub fn contrast(image: &RgbImage, factor: f32) -> RgbImage {
    let count = (image.width() as f64) * (image.height() as f64);
    if count == 0.0 {
        return image.clone();
    }
    let mean = (image.pixels().map(|p| luma(p) as f64).sum::<f64>() / count) as f32;

    let mut table = [0u8; 256];
    for (v, entry) in table.iter_mut().enumerate() {
        *entry = clamp_u8((v as f32 - mean) * factor + mean);
    }
    map_all_channels(image, &table)
}

/// Blend interior pixels with a 3x3 smoothed copy; border pixels are kept.
pub fn sharpness(image: &RgbImage, factor: f32) -> RgbImage {
    let (width, height) = image.dimensions();
    if width < 3 || height < 3 || factor == 1.0 {
        return image.clone();
    }

    const KERNEL: [[f32; 3]; 3] = [[1.0, 1.0, 1.0], [1.0, 5.0, 1.0], [1.0, 1.0, 1.0]];
    const KERNEL_SUM: f32 = 13.0;

    let mut out = image.clone();
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut smoothed = [0.0f32; 3];
            for (ky, row) in KERNEL.iter().enumerate() {
                for (kx, weight) in row.iter().enumerate() {
                    let p = image.get_pixel(x + kx as u32 - 1, y + ky as u32 - 1);
                    for c in 0..3 {
                        smoothed[c] += weight * p[c] as f32;
                    }
                }
            }

            let original = image.get_pixel(x, y);
            let target = out.get_pixel_mut(x, y);
            for c in 0..3 {
                let degenerate = (smoothed[c] / KERNEL_SUM).round();
                target[c] = clamp_u8(degenerate + factor * (original[c] as f32 - degenerate));
            }
        }
    }
    out
}

/// Resample `image` through an inverse affine map `[a, b, c, d, e, f]`:
/// output pixel `(x, y)` reads source `(a*x + b*y + c, d*x + e*y + f)`.
fn warp_affine(image: &RgbImage, inverse: [f32; 6]) -> RgbImage {
    let (width, height) = image.dimensions();
    let [a, b, c, d, e, f] = inverse;

    let fetch = |x: i64, y: i64| -> [f32; 3] {
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            [FILL_COLOR[0] as f32, FILL_COLOR[1] as f32, FILL_COLOR[2] as f32]
        } else {
            let p = image.get_pixel(x as u32, y as u32);
            [p[0] as f32, p[1] as f32, p[2] as f32]
        }
    };

    RgbImage::from_fn(width, height, |x, y| {
        let (xf, yf) = (x as f32, y as f32);
        let sx = a * xf + b * yf + c;
        let sy = d * xf + e * yf + f;

        let x0 = sx.floor();
        let y0 = sy.floor();
        let (dx, dy) = (sx - x0, sy - y0);
        let (x0, y0) = (x0 as i64, y0 as i64);

        let p00 = fetch(x0, y0);
        let p10 = fetch(x0 + 1, y0);
        let p01 = fetch(x0, y0 + 1);
        let p11 = fetch(x0 + 1, y0 + 1);

        let mut out = [0u8; 3];
        for ch in 0..3 {
            let top = p00[ch] * (1.0 - dx) + p10[ch] * dx;
            let bottom = p01[ch] * (1.0 - dx) + p11[ch] * dx;
            out[ch] = clamp_u8((top * (1.0 - dy) + bottom * dy).round());
        }
        Rgb(out)
    })
}

/// Shear horizontally: output `x' = x + factor * y`.
pub fn shear_x(image: &RgbImage, factor: f32) -> RgbImage {
    warp_affine(image, [1.0, -factor, 0.0, 0.0, 1.0, 0.0])
}

/// Shear vertically: output `y' = y + factor * x`.
pub fn shear_y(image: &RgbImage, factor: f32) -> RgbImage {
    warp_affine(image, [1.0, 0.0, 0.0, -factor, 1.0, 0.0])
}

/// Shift content left by `offset` pixels (right for negative offsets).
pub fn translate_x(image: &RgbImage, offset: f32) -> RgbImage {
    warp_affine(image, [1.0, 0.0, offset, 0.0, 1.0, 0.0])
}

/// Shift content up by `offset` pixels (down for negative offsets).
pub fn translate_y(image: &RgbImage, offset: f32) -> RgbImage {
    warp_affine(image, [1.0, 0.0, 0.0, 0.0, 1.0, offset])
}

/// Rotate counter-clockwise by `degrees` about the image center.
pub fn rotate(image: &RgbImage, degrees: f32) -> RgbImage {
    let (cx, cy) = (image.width() as f32 / 2.0, image.height() as f32 / 2.0);
    let (sin, cos) = degrees.to_radians().sin_cos();

    warp_affine(
        image,
        [
            cos,
            -sin,
            (1.0 - cos) * cx + sin * cy,
            sin,
            cos,
            -sin * cx + (1.0 - cos) * cy,
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(40 + x * 4) as u8, (60 + y * 3) as u8, 100])
        })
    }

    #[test]
    fn test_op_names_round_trip_through_from_str() {
        for op in AugmentOp::ALL {
            assert_eq!(op.name().parse::<AugmentOp>().unwrap(), op);
        }
        assert!("Invert".parse::<AugmentOp>().is_err());
        assert!("rotate".parse::<AugmentOp>().is_err());
    }

    #[test]
    fn test_enhance_level_mapping() {
        let mut rng = StdRng::seed_from_u64(0);

        let factor = AugmentOp::Brightness.level_to_arg(5.0, &mut rng);

        assert!((factor - 1.0).abs() < 1e-6);
        assert!((AugmentOp::Sharpness.level_to_arg(10.0, &mut rng) - 1.9).abs() < 1e-6);
    }

    #[test]
    fn test_geometric_level_mapping_magnitude() {
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..20 {
            assert!((AugmentOp::ShearX.level_to_arg(5.0, &mut rng).abs() - 0.15).abs() < 1e-6);
            assert!((AugmentOp::TranslateY.level_to_arg(5.0, &mut rng).abs() - 5.0).abs() < 1e-6);
            assert!((AugmentOp::Rotate.level_to_arg(5.0, &mut rng).abs() - 15.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_solarize_and_posterize_level_mapping() {
        let mut rng = StdRng::seed_from_u64(0);

        assert_eq!(AugmentOp::Solarize.level_to_arg(5.0, &mut rng), 128.0);
        assert_eq!(AugmentOp::Posterize.level_to_arg(5.0, &mut rng), 2.0);
    }

    #[test]
    fn test_every_op_preserves_dimensions() {
        let image = gradient(17, 11);
        let mut rng = StdRng::seed_from_u64(5);

        for op in AugmentOp::ALL {
            let arg = op.level_to_arg(5.0, &mut rng);
            let out = op.apply(&image, arg);
            assert_eq!(out.dimensions(), image.dimensions(), "op {}", op);
        }
    }

    #[test]
    fn test_auto_contrast_stretches_range() {
        let image = gradient(10, 10);

        let out = auto_contrast(&image);

        let reds: Vec<u8> = out.pixels().map(|p| p[0]).collect();
        assert_eq!(*reds.iter().min().unwrap(), 0);
        assert_eq!(*reds.iter().max().unwrap(), 255);
        // Constant channel is left alone
        assert!(out.pixels().all(|p| p[2] == 100));
    }

    #[test]
    fn test_equalize_constant_image_unchanged() {
        let image = RgbImage::from_pixel(8, 8, Rgb([30, 60, 90]));

        assert_eq!(equalize(&image), image);
    }

    #[test]
    fn test_equalize_spreads_values() {
        let image = RgbImage::from_fn(32, 32, |x, _| Rgb([(x * 2) as u8, 0, 0]));

        let out = equalize(&image);

        let reds: Vec<u8> = out.pixels().map(|p| p[0]).collect();
        assert!(*reds.iter().max().unwrap() > 200);
    }

    #[test]
    fn test_solarize_inverts_bright_values() {
        let image = RgbImage::from_pixel(2, 2, Rgb([10, 200, 128]));

        let out = solarize(&image, 128);

        assert_eq!(*out.get_pixel(0, 0), Rgb([10, 55, 127]));
    }

    #[test]
    fn test_posterize_masks_low_bits() {
        let image = RgbImage::from_pixel(1, 1, Rgb([0b1011_0111, 255, 1]));

        let out = posterize(&image, 2);

        assert_eq!(*out.get_pixel(0, 0), Rgb([0b1000_0000, 0b1100_0000, 0]));
    }

    #[test]
    fn test_brightness_scales_and_clamps() {
        let image = RgbImage::from_pixel(1, 1, Rgb([100, 200, 0]));

        let out = brightness(&image, 1.5);

        assert_eq!(*out.get_pixel(0, 0), Rgb([150, 255, 0]));
    }

    #[test]
    fn test_color_zero_is_grayscale() {
        let image = gradient(4, 4);

        let out = color(&image, 0.0);

        assert!(out.pixels().all(|p| p[0] == p[1] && p[1] == p[2]));
    }

    #[test]
    fn test_contrast_zero_is_flat() {
        let image = gradient(6, 6);

        let out = contrast(&image, 0.0);

        let first = *out.get_pixel(0, 0);
        assert!(out.pixels().all(|p| *p == first));
    }

    #[test]
    fn test_sharpness_keeps_border() {
        let image = gradient(6, 6);

        let out = sharpness(&image, 0.1);

        assert_eq!(out.get_pixel(0, 0), image.get_pixel(0, 0));
        assert_eq!(out.get_pixel(5, 5), image.get_pixel(5, 5));
    }

    #[test]
    fn test_translate_x_shifts_and_fills() {
        let image = gradient(8, 4);

        let out = translate_x(&image, 2.0);

        assert_eq!(out.get_pixel(0, 0), image.get_pixel(2, 0));
        assert_eq!(*out.get_pixel(7, 0), FILL_COLOR);
    }

    #[test]
    fn test_translate_y_negative_offset() {
        let image = gradient(4, 8);

        let out = translate_y(&image, -3.0);

        assert_eq!(out.get_pixel(1, 3), image.get_pixel(1, 0));
        assert_eq!(*out.get_pixel(1, 0), FILL_COLOR);
    }

    #[test]
    fn test_rotate_zero_is_identity() {
        let image = gradient(9, 7);

        assert_eq!(rotate(&image, 0.0), image);
    }

    #[test]
    fn test_rotate_fills_corners() {
        let image = RgbImage::from_pixel(20, 20, Rgb([0, 0, 0]));

        let out = rotate(&image, 45.0);

        assert_eq!(*out.get_pixel(0, 0), FILL_COLOR);
        assert_eq!(*out.get_pixel(10, 10), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_shear_zero_is_identity() {
        let image = gradient(5, 5);

        assert_eq!(shear_x(&image, 0.0), image);
        assert_eq!(shear_y(&image, 0.0), image);
    }
}
