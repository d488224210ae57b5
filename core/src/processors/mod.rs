//! Processor traits and the built-in BLIP processors.
//!
//! | Registry key | Type | Input → Output |
//! |--------------|------|----------------|
//! | `blip_coco_text` | [`BlipCaptionProcessor`] | caption → cleaned, prompted caption |
//! | `blip_question` | [`BlipQuestionProcessor`] | question → cleaned question |
//! | `blip_coco_vis_train` | [`BlipImageTrainProcessor`] | image → augmented `[3, S, S]` tensor |
//! | `blip_coco_vis_eval` | [`BlipImageEvalProcessor`] | image → resized `[3, S, S]` tensor |

mod text;
mod vision;

pub use text::{BlipCaptionProcessor, BlipQuestionProcessor};
pub use vision::{
    BlipImageEvalProcessor, BlipImageTrainProcessor, ImageNormalize, CLIP_MEAN, CLIP_STD,
    DEFAULT_IMAGE_SIZE,
};

use crate::error::ProcessorResult;
use crate::types::{ProcessorInput, ProcessorOutput};
use image::DynamicImage;
use ndarray::Array3;
use rand::RngCore;
use std::fmt;

/// A configured transform applied to raw text or image data.
///
/// Processors are immutable after construction and safe to share between
/// threads.
pub trait Processor: fmt::Debug + Send + Sync {
    /// Registry key this processor is published under.
    fn name(&self) -> &'static str;

    /// Process one input, drawing any randomness from the thread-local RNG.
    fn process(&self, input: ProcessorInput) -> ProcessorResult<ProcessorOutput>;

    /// Process one input with a caller-supplied RNG.
    ///
    /// Deterministic processors ignore `rng`.
    fn process_with_rng(
        &self,
        input: ProcessorInput,
        rng: &mut dyn RngCore,
    ) -> ProcessorResult<ProcessorOutput> {
        let _ = rng;
        self.process(input)
    }
}

/// Text-to-text processors.
pub trait TextProcessor {
    fn process_text(&self, text: &str) -> String;
}

/// Image-to-tensor processors.
pub trait ImageProcessor {
    /// Side length of the square output.
    fn image_size(&self) -> u32;

    fn process_image_with_rng(
        &self,
        image: &DynamicImage,
        rng: &mut dyn RngCore,
    ) -> ProcessorResult<Array3<f32>>;

    fn process_image(&self, image: &DynamicImage) -> ProcessorResult<Array3<f32>> {
        let mut rng = rand::rng();
        self.process_image_with_rng(image, &mut rng)
    }
}
