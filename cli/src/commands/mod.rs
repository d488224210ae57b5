//! CLI command handlers organized by subcommand.
//!
//! | Module | Commands |
//! |--------|----------|
//! | [`list`] | `list` - Registered processors |
//! | [`text`] | `text` - Clean a caption or question |
//! | [`image`] | `image` - Turn an image file into a tensor |

pub mod image;
pub mod list;
pub mod text;
pub mod utils;

pub use utils::*;
