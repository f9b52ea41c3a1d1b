//! Error types for the cmc-core crate.
//!
//! This module provides the [`ConfigError`] type for configuration failures
//! that can occur while building [`Options`](crate::Options), parsing path
//! patterns, or loading a JSON configuration file.

use camino::Utf8PathBuf;

/// Errors that can occur during configuration loading and validation.
///
/// # Examples
///
/// ```
/// use cmc_core::ConfigError;
///
/// let error = ConfigError::EmptyOutputExtension { content_type: "header" };
/// assert!(error.to_string().contains("header"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An output extension was set to an empty value (or just `.`).
    #[error("output extension for {content_type} must not be empty")]
    EmptyOutputExtension {
        /// Human label of the content type being configured.
        content_type: &'static str,
    },

    /// A path pattern is not a valid glob.
    #[error("invalid path pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Explanation from the glob parser.
        reason: String,
    },

    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// The directory being converted is not inside the configured root.
    #[error("directory '{directory}' is not inside root '{root}'")]
    OutsideRoot {
        /// The directory being converted.
        directory: Utf8PathBuf,
        /// The configured root directory.
        root: Utf8PathBuf,
    },

    /// An I/O error occurred while reading configuration.
    #[error("failed to read configuration '{path}': {source}")]
    Io {
        /// The configuration file path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the configuration file.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Creates an [`InvalidOption`](Self::InvalidOption) error.
    #[must_use]
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }
}
