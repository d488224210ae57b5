//! Blipprep Core - caption and image preprocessing for BLIP-style
//! vision-language training.
//!
//! ## Module Organization
//!
//! ### Processors
//! - [`processors`] - Caption/question cleaners and train/eval image processors
//! - [`registry`] - Name-based processor construction
//!
//! ### Image Pipeline
//! - [`transforms`] - Resize, crops, flip, tensor conversion, normalization
//! - [`augment`] - RandAugment operation catalogue
//!
//! ### Data Types
//! - [`config`] - Loosely-typed processor configuration
//! - [`types`] - Processor inputs and outputs
//! - [`error`] - Error type shared by every module
//!
//! ## Quick Start
//!
//! ```rust
//! use blipprep_core::config::ProcessorConfig;
//! use blipprep_core::registry::ProcessorRegistry;
//! use blipprep_core::testing::gradient_image;
//!
//! let registry = ProcessorRegistry::global();
//! let cfg = ProcessorConfig::new().with("image_size", 32);
//! let eval = registry.build("blip_coco_vis_eval", &cfg)?;
//!
//! let tensor = eval.process(gradient_image(64, 48).into())?.into_tensor()?;
//! assert_eq!(tensor.shape(), &[3, 32, 32]);
//! # Ok::<(), blipprep_core::error::ProcessorError>(())
//! ```

// ============================================================================
// Processors
// ============================================================================

/// Processor traits and built-in BLIP processors
pub mod processors;

/// Processor registry (name -> builder)
pub mod registry;

// ============================================================================
// Image Pipeline
// ============================================================================

/// Image geometry, tensor conversion and composition
pub mod transforms;

/// Randomized augmentation ops
pub mod augment;

// ============================================================================
// Data Types
// ============================================================================

/// Processor configuration
pub mod config;

/// Processor inputs and outputs
pub mod types;

/// Error types
pub mod error;

// ============================================================================
// Test Support
// ============================================================================

/// Synthetic fixtures for tests
pub mod testing;

pub use config::{ProcessorConfig, ProcessorSpec};
pub use error::{ProcessorError, ProcessorResult};
pub use processors::{ImageProcessor, Processor, TextProcessor};
pub use registry::{ProcessorBuilder, ProcessorRegistry};
pub use types::{ProcessorInput, ProcessorOutput};
