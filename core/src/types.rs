//! Data types passed into and out of processors.
//!
//! - [`ProcessorInput`]: raw caption text or a decoded image
//! - [`ProcessorOutput`]: cleaned text or a normalized `[3, H, W]` tensor

use crate::error::{ProcessorError, ProcessorResult};
use image::{DynamicImage, RgbImage};
use ndarray::Array3;

/// Raw data handed to a processor.
#[derive(Debug, Clone)]
pub enum ProcessorInput {
    /// Caption or question text
    Text(String),

    /// Decoded image in any pixel format
    Image(DynamicImage),
}

impl ProcessorInput {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessorInput::Text(_) => "text",
            ProcessorInput::Image(_) => "image",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ProcessorInput::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&DynamicImage> {
        match self {
            ProcessorInput::Image(image) => Some(image),
            _ => None,
        }
    }
}

impl From<String> for ProcessorInput {
    fn from(text: String) -> Self {
        ProcessorInput::Text(text)
    }
}

impl From<&str> for ProcessorInput {
    fn from(text: &str) -> Self {
        ProcessorInput::Text(text.to_string())
    }
}

impl From<DynamicImage> for ProcessorInput {
    fn from(image: DynamicImage) -> Self {
        ProcessorInput::Image(image)
    }
}

impl From<RgbImage> for ProcessorInput {
    fn from(image: RgbImage) -> Self {
        ProcessorInput::Image(DynamicImage::ImageRgb8(image))
    }
}

/// Processed data ready for model consumption.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessorOutput {
    /// Cleaned (and prompted) text
    Text(String),

    /// Channels-first image tensor, shape `[3, H, W]`
    Tensor(Array3<f32>),
}

impl ProcessorOutput {
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessorOutput::Text(_) => "text",
            ProcessorOutput::Tensor(_) => "tensor",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ProcessorOutput::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_tensor(&self) -> Option<&Array3<f32>> {
        match self {
            ProcessorOutput::Tensor(tensor) => Some(tensor),
            _ => None,
        }
    }

    /// Take the text out, failing for tensor outputs.
    pub fn into_text(self) -> ProcessorResult<String> {
        match self {
            ProcessorOutput::Text(text) => Ok(text),
            other => Err(ProcessorError::InvalidInput(format!(
                "expected text output (got {})",
                other.kind()
            ))),
        }
    }

    /// Take the tensor out, failing for text outputs.
    pub fn into_tensor(self) -> ProcessorResult<Array3<f32>> {
        match self {
            ProcessorOutput::Tensor(tensor) => Ok(tensor),
            other => Err(ProcessorError::InvalidInput(format!(
                "expected tensor output (got {})",
                other.kind()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_conversions() {
        let text: ProcessorInput = "a dog".into();
        assert_eq!(text.as_text(), Some("a dog"));
        assert_eq!(text.kind(), "text");

        let image: ProcessorInput = RgbImage::new(2, 2).into();
        assert!(image.as_image().is_some());
        assert_eq!(image.kind(), "image");
    }

    #[test]
    fn test_output_accessors() {
        let output = ProcessorOutput::Tensor(Array3::zeros((3, 2, 2)));
        assert_eq!(output.as_tensor().map(|t| t.shape().to_vec()), Some(vec![3, 2, 2]));
        assert!(output.clone().into_text().is_err());
        assert!(output.into_tensor().is_ok());
    }
}
