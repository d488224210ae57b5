//! Error types shared by every processor, transform and registry operation.

use thiserror::Error;

/// Error type for processor construction and execution.
#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Unknown processor: {0}")]
    UnknownProcessor(String),
    #[error("Processor already registered: {0}")]
    DuplicateProcessor(String),
    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type for processor operations.
pub type ProcessorResult<T> = Result<T, ProcessorError>;

impl From<serde_json::Error> for ProcessorError {
    fn from(err: serde_json::Error) -> Self {
        ProcessorError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ProcessorError {
    fn from(err: serde_yaml::Error) -> Self {
        ProcessorError::SerializationError(err.to_string())
    }
}
