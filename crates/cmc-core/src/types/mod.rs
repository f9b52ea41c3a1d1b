//! Domain types for cxx-modules-converter.
//!
//! # Module Organization
//!
//! - [`content_type`] - File classification and conversion direction
//! - [`output`] - Conversion output units
//! - [`pattern`] - Relative path glob patterns
//!
//! All public types are re-exported here and at the crate root:
//!
//! ```
//! use cmc_core::{ContentType, ConvertAction, OutputFile, PathPatterns};
//! ```

mod content_type;
mod output;
mod pattern;

pub use content_type::{ContentType, ConvertAction};
pub use output::OutputFile;
pub use pattern::PathPatterns;
