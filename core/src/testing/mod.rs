//! Testing utilities for blipprep-core.
//!
//! Provides synthetic images so processor tests run without image files on
//! disk.
//!
//! ## Usage
//!
//! ```rust
//! use blipprep_core::testing::gradient_image;
//!
//! let image = gradient_image(64, 48);
//! assert_eq!((image.width(), image.height()), (64, 48));
//! ```

pub mod fixtures;

pub use fixtures::*;
