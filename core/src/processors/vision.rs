//! Image processors for the training and evaluation splits.
//!
//! Both share [`ImageNormalize`]; they differ in the geometry/augmentation
//! steps run before tensor conversion.

use super::{ImageProcessor, Processor};
use crate::augment::RandomAugment;
use crate::config::ProcessorConfig;
use crate::error::{ProcessorError, ProcessorResult};
use crate::transforms::{
    normalize, to_tensor, Compose, InterpolationMethod, TransformStep, DEFAULT_CROP_RATIO,
};
use crate::types::{ProcessorInput, ProcessorOutput};
use image::DynamicImage;
use log::debug;
use ndarray::Array3;
use rand::RngCore;

/// Default output side length.
pub const DEFAULT_IMAGE_SIZE: u32 = 384;

/// Per-channel mean of the CLIP image normalization.
pub const CLIP_MEAN: [f32; 3] = [0.48145466, 0.4578275, 0.40821073];

/// Per-channel std of the CLIP image normalization.
pub const CLIP_STD: [f32; 3] = [0.26862954, 0.26130258, 0.27577711];

const DEFAULT_MIN_SCALE: f64 = 0.5;
const DEFAULT_MAX_SCALE: f64 = 1.0;

/// Mean/std normalization shared by the image processors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageNormalize {
    mean: [f32; 3],
    std: [f32; 3],
}

impl Default for ImageNormalize {
    fn default() -> Self {
        Self {
            mean: CLIP_MEAN,
            std: CLIP_STD,
        }
    }
}

impl ImageNormalize {
    /// Create a normalization; `None` selects the CLIP statistics.
    pub fn new(mean: Option<[f32; 3]>, std: Option<[f32; 3]>) -> ProcessorResult<Self> {
        let normalize = Self {
            mean: mean.unwrap_or(CLIP_MEAN),
            std: std.unwrap_or(CLIP_STD),
        };
        if let Some(bad) = normalize.std.iter().find(|s| **s == 0.0 || !s.is_finite()) {
            return Err(ProcessorError::InvalidConfig(format!(
                "std values must be finite and non-zero (got {})",
                bad
            )));
        }
        Ok(normalize)
    }

    /// Read `mean` and `std` from a config.
    pub fn from_config(cfg: &ProcessorConfig) -> ProcessorResult<Self> {
        Self::new(cfg.get_opt("mean")?, cfg.get_opt("std")?)
    }

    pub fn mean(&self) -> [f32; 3] {
        self.mean
    }

    pub fn std(&self) -> [f32; 3] {
        self.std
    }

    pub fn apply(&self, tensor: Array3<f32>) -> ProcessorResult<Array3<f32>> {
        normalize(tensor, &self.mean, &self.std)
    }
}

fn expect_image(input: ProcessorInput, processor: &str) -> ProcessorResult<DynamicImage> {
    match input {
        ProcessorInput::Image(image) => Ok(image),
        other => Err(ProcessorError::InvalidInput(format!(
            "{} requires image input (got {})",
            processor,
            other.kind()
        ))),
    }
}

fn read_image_size(cfg: &ProcessorConfig) -> ProcessorResult<u32> {
    let image_size: u32 = cfg.get_or("image_size", DEFAULT_IMAGE_SIZE)?;
    if image_size == 0 {
        return Err(ProcessorError::InvalidConfig(
            "image_size must be positive".to_string(),
        ));
    }
    Ok(image_size)
}

/// Training pipeline: random resized crop, flip, RandAugment, tensor, normalize.
#[derive(Debug, Clone)]
pub struct BlipImageTrainProcessor {
    image_size: u32,
    transform: Compose,
    normalize: ImageNormalize,
}

impl BlipImageTrainProcessor {
    pub const NAME: &'static str = "blip_coco_vis_train";

    pub fn new(
        image_size: u32,
        normalize: ImageNormalize,
        min_scale: f64,
        max_scale: f64,
    ) -> ProcessorResult<Self> {
        let transform = Compose::new(vec![
            TransformStep::RandomResizedCrop {
                size: image_size,
                scale: (min_scale, max_scale),
                ratio: DEFAULT_CROP_RATIO,
                interpolation: InterpolationMethod::Bicubic,
            },
            TransformStep::RandomHorizontalFlip { p: 0.5 },
            TransformStep::RandAugment(RandomAugment::blip_train()),
        ])?;

        Ok(Self {
            image_size,
            transform,
            normalize,
        })
    }

    /// Build from config keys `image_size` (384), `mean`, `std`,
    /// `min_scale` (0.5) and `max_scale` (1.0).
    pub fn build(cfg: Option<&ProcessorConfig>) -> ProcessorResult<Self> {
        let empty = ProcessorConfig::default();
        let cfg = cfg.unwrap_or(&empty);

        let image_size = read_image_size(cfg)?;
        let normalize = ImageNormalize::from_config(cfg)?;
        let min_scale: f64 = cfg.get_or("min_scale", DEFAULT_MIN_SCALE)?;
        let max_scale: f64 = cfg.get_or("max_scale", DEFAULT_MAX_SCALE)?;

        debug!(
            "Building {} (image_size={}, scale=({}, {}), mean={:?}, std={:?})",
            Self::NAME,
            image_size,
            min_scale,
            max_scale,
            normalize.mean(),
            normalize.std()
        );
        Self::new(image_size, normalize, min_scale, max_scale)
    }

    pub fn transform(&self) -> &Compose {
        &self.transform
    }

    pub fn normalization(&self) -> &ImageNormalize {
        &self.normalize
    }
}

impl ImageProcessor for BlipImageTrainProcessor {
    fn image_size(&self) -> u32 {
        self.image_size
    }

    fn process_image_with_rng(
        &self,
        image: &DynamicImage,
        rng: &mut dyn RngCore,
    ) -> ProcessorResult<Array3<f32>> {
        let augmented = self.transform.apply(image.to_rgb8(), rng)?;
        self.normalize.apply(to_tensor(&augmented))
    }
}

impl Processor for BlipImageTrainProcessor {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self, input: ProcessorInput) -> ProcessorResult<ProcessorOutput> {
        let mut rng = rand::rng();
        self.process_with_rng(input, &mut rng)
    }

    fn process_with_rng(
        &self,
        input: ProcessorInput,
        rng: &mut dyn RngCore,
    ) -> ProcessorResult<ProcessorOutput> {
        let image = expect_image(input, Self::NAME)?;
        Ok(ProcessorOutput::Tensor(
            self.process_image_with_rng(&image, rng)?,
        ))
    }
}

/// Evaluation pipeline: bicubic resize to a square, tensor, normalize.
#[derive(Debug, Clone)]
pub struct BlipImageEvalProcessor {
    image_size: u32,
    transform: Compose,
    normalize: ImageNormalize,
}

impl BlipImageEvalProcessor {
    pub const NAME: &'static str = "blip_coco_vis_eval";

    pub fn new(image_size: u32, normalize: ImageNormalize) -> ProcessorResult<Self> {
        let transform = Compose::new(vec![TransformStep::Resize {
            width: image_size,
            height: image_size,
            interpolation: InterpolationMethod::Bicubic,
        }])?;

        Ok(Self {
            image_size,
            transform,
            normalize,
        })
    }

    /// Build from config keys `image_size` (384), `mean` and `std`.
    pub fn build(cfg: Option<&ProcessorConfig>) -> ProcessorResult<Self> {
        let empty = ProcessorConfig::default();
        let cfg = cfg.unwrap_or(&empty);

        let image_size = read_image_size(cfg)?;
        let normalize = ImageNormalize::from_config(cfg)?;

        debug!(
            "Building {} (image_size={}, mean={:?}, std={:?})",
            Self::NAME,
            image_size,
            normalize.mean(),
            normalize.std()
        );
        Self::new(image_size, normalize)
    }

    pub fn transform(&self) -> &Compose {
        &self.transform
    }

    pub fn normalization(&self) -> &ImageNormalize {
        &self.normalize
    }
}

impl ImageProcessor for BlipImageEvalProcessor {
    fn image_size(&self) -> u32 {
        self.image_size
    }

    fn process_image_with_rng(
        &self,
        image: &DynamicImage,
        rng: &mut dyn RngCore,
    ) -> ProcessorResult<Array3<f32>> {
        let resized = self.transform.apply(image.to_rgb8(), rng)?;
        self.normalize.apply(to_tensor(&resized))
    }
}

impl Processor for BlipImageEvalProcessor {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self, input: ProcessorInput) -> ProcessorResult<ProcessorOutput> {
        let image = expect_image(input, Self::NAME)?;
        Ok(ProcessorOutput::Tensor(self.process_image(&image)?))
    }
}
