//! Core types, options, and errors for cxx-modules-converter.
//!
//! This crate provides the foundational types shared across the workspace:
//!
//! - [`ContentType`] and [`ConvertAction`] classification
//! - [`Options`] / [`FileOptions`] run configuration, with the
//!   action-scoped [`ExtensionMap`] tables and [`PathPatterns`] globs
//! - [`ConfigFile`] for loading options from JSON
//! - [`ConfigError`] for configuration failures
//! - [`OutputFile`], the unit of conversion output

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    ConfigFile, DEFAULT_ALWAYS_INCLUDE, DEFAULT_COMPAT_MACRO, ExportMap, ExtensionEntry,
    ExtensionMap, FileOptions, Options, WILDCARD_EXPORT,
};
pub use error::ConfigError;
pub use types::{ContentType, ConvertAction, OutputFile, PathPatterns};
