//! Image transform steps and their composition.
//!
//! ## Module Organization
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`image`] | Geometry: resize, center crop, random resized crop, flip |
//! | [`tensor`] | Tensor conversion and per-channel normalization |
//!
//! A [`Compose`] runs a list of [`TransformStep`]s over an RGB image. Steps are
//! serde-tagged so they can sit inside a larger training config:
//!
//! ```json
//! [
//!   { "type": "RandomResizedCrop", "size": 384, "scale": [0.5, 1.0], "interpolation": "Bicubic" },
//!   { "type": "RandomHorizontalFlip" }
//! ]
//! ```

pub mod image;
pub mod tensor;

pub use self::image::{
    center_crop, horizontal_flip, random_resized_crop, resize, sample_crop_region, CropRegion,
};
pub use self::tensor::{normalize, to_tensor};

use crate::augment::RandomAugment;
use crate::error::{ProcessorError, ProcessorResult};
use ::image::imageops::FilterType;
use ::image::RgbImage;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Interpolation method for image resizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterpolationMethod {
    Nearest,
    Bilinear,
    Bicubic,
}

impl Default for InterpolationMethod {
    fn default() -> Self {
        InterpolationMethod::Bilinear
    }
}

impl InterpolationMethod {
    pub fn filter_type(&self) -> FilterType {
        match self {
            InterpolationMethod::Nearest => FilterType::Nearest,
            InterpolationMethod::Bilinear => FilterType::Triangle,
            InterpolationMethod::Bicubic => FilterType::CatmullRom,
        }
    }
}

/// Default area range for [`TransformStep::RandomResizedCrop`].
pub const DEFAULT_CROP_SCALE: (f64, f64) = (0.08, 1.0);

/// Default aspect ratio range for [`TransformStep::RandomResizedCrop`].
pub const DEFAULT_CROP_RATIO: (f64, f64) = (3.0 / 4.0, 4.0 / 3.0);

fn default_crop_scale() -> (f64, f64) {
    DEFAULT_CROP_SCALE
}

fn default_crop_ratio() -> (f64, f64) {
    DEFAULT_CROP_RATIO
}

fn default_flip_probability() -> f64 {
    0.5
}

/// A single image transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TransformStep {
    /// Crop a random area/aspect region and resize it to `size` x `size`
    RandomResizedCrop {
        /// Output side length
        size: u32,

        /// Crop area range as a fraction of the image (default: 0.08..1.0)
        #[serde(default = "default_crop_scale")]
        scale: (f64, f64),

        /// Crop aspect ratio range (default: 3/4..4/3)
        #[serde(default = "default_crop_ratio")]
        ratio: (f64, f64),

        /// Interpolation method
        #[serde(default)]
        interpolation: InterpolationMethod,
    },

    /// Resize to exactly `width` x `height`
    Resize {
        width: u32,
        height: u32,
        #[serde(default)]
        interpolation: InterpolationMethod,
    },

    /// Center crop to `width` x `height`
    CenterCrop { width: u32, height: u32 },

    /// Mirror left to right with probability `p` (default: 0.5)
    RandomHorizontalFlip {
        #[serde(default = "default_flip_probability")]
        p: f64,
    },

    /// Randomized augmentation ops
    RandAugment(RandomAugment),
}

impl TransformStep {
    /// Check parameters without touching an image.
    pub fn validate(&self) -> ProcessorResult<()> {
        match self {
            TransformStep::RandomResizedCrop {
                size, scale, ratio, ..
            } => {
                if *size == 0 {
                    return Err(ProcessorError::InvalidConfig(
                        "RandomResizedCrop size must be positive".to_string(),
                    ));
                }
                self::image::validate_crop_ranges(*scale, *ratio)
            }
            TransformStep::Resize { width, height, .. }
            | TransformStep::CenterCrop { width, height } => {
                if *width == 0 || *height == 0 {
                    return Err(ProcessorError::InvalidConfig(format!(
                        "{} target must be non-empty (got {}x{})",
                        self.name(),
                        width,
                        height
                    )));
                }
                Ok(())
            }
            TransformStep::RandomHorizontalFlip { p } => {
                if !(0.0..=1.0).contains(p) {
                    return Err(ProcessorError::InvalidConfig(format!(
                        "RandomHorizontalFlip probability must be within [0, 1] (got {})",
                        p
                    )));
                }
                Ok(())
            }
            TransformStep::RandAugment(augment) => augment.validate(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TransformStep::RandomResizedCrop { .. } => "RandomResizedCrop",
            TransformStep::Resize { .. } => "Resize",
            TransformStep::CenterCrop { .. } => "CenterCrop",
            TransformStep::RandomHorizontalFlip { .. } => "RandomHorizontalFlip",
            TransformStep::RandAugment(_) => "RandAugment",
        }
    }

    /// Whether applying the step draws from the RNG.
    pub fn is_random(&self) -> bool {
        match self {
            TransformStep::RandomResizedCrop { .. } | TransformStep::RandAugment(_) => true,
            TransformStep::RandomHorizontalFlip { p } => *p > 0.0 && *p < 1.0,
            TransformStep::Resize { .. } | TransformStep::CenterCrop { .. } => false,
        }
    }

    pub fn apply<R: Rng + ?Sized>(&self, image: RgbImage, rng: &mut R) -> ProcessorResult<RgbImage> {
        match self {
            TransformStep::RandomResizedCrop {
                size,
                scale,
                ratio,
                interpolation,
            } => random_resized_crop(&image, *size, *scale, *ratio, *interpolation, rng),
            TransformStep::Resize {
                width,
                height,
                interpolation,
            } => resize(&image, *width, *height, *interpolation),
            TransformStep::CenterCrop { width, height } => center_crop(&image, *width, *height),
            TransformStep::RandomHorizontalFlip { p } => Ok(horizontal_flip(image, *p, rng)),
            TransformStep::RandAugment(augment) => Ok(augment.apply(image, rng)),
        }
    }
}

/// An ordered list of transform steps.
///
/// Deserializes from a plain list; every step is validated on the way in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TransformStep>", into = "Vec<TransformStep>")]
pub struct Compose {
    steps: Vec<TransformStep>,
}

impl TryFrom<Vec<TransformStep>> for Compose {
    type Error = ProcessorError;

    fn try_from(steps: Vec<TransformStep>) -> ProcessorResult<Self> {
        Compose::new(steps)
    }
}

impl From<Compose> for Vec<TransformStep> {
    fn from(compose: Compose) -> Self {
        compose.steps
    }
}

impl Compose {
    /// Create a composition, validating every step.
    pub fn new(steps: Vec<TransformStep>) -> ProcessorResult<Self> {
        for step in &steps {
            step.validate()?;
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[TransformStep] {
        &self.steps
    }

    /// Whether the composition gives the same output for the same input.
    pub fn is_deterministic(&self) -> bool {
        !self.steps.iter().any(TransformStep::is_random)
    }

    /// Run every step in order.
    pub fn apply<R: Rng + ?Sized>(&self, image: RgbImage, rng: &mut R) -> ProcessorResult<RgbImage> {
        self.steps
            .iter()
            .try_fold(image, |image, step| step.apply(image, rng))
    }
}
