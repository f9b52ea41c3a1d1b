//! Error types for the cmc-scanner crate.
//!
//! This module provides the [`ScanError`] type for errors that can occur
//! while indexing a tree and converting it into a destination directory.

use camino::Utf8PathBuf;
use cmc_converter::ConvertError;
use cmc_core::ConfigError;

/// Errors that can occur during directory conversion.
///
/// # Error Recovery Strategy
///
/// - **Walker errors** ([`ScanError::Walk`]): Fatal - propagate immediately
/// - **Configuration errors** ([`ScanError::Config`]): Fatal
/// - **File errors** ([`ScanError::Read`], [`ScanError::Write`],
///   [`ScanError::Convert`]): Log warning, skip file, continue
///
/// # Examples
///
/// ```
/// use cmc_scanner::ScanError;
///
/// fn handle_error(err: ScanError) {
///     match err {
///         ScanError::Walk(e) => eprintln!("Walk error: {e}"),
///         ScanError::Read { path, .. } => eprintln!("Read error: {path}"),
///         ScanError::Write { path, .. } => eprintln!("Write error: {path}"),
///         ScanError::Convert(e) => eprintln!("Convert error: {}", e.path()),
///         ScanError::Config(e) => eprintln!("Config error: {e}"),
///         ScanError::NonUtf8Path(p) => eprintln!("Invalid path: {}", p.display()),
///     }
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Failed to walk a directory while building the path index.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// Failed to read a file or list a directory.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The path that couldn't be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write, copy, or create an output.
    #[error("failed to write {path}: {source}")]
    Write {
        /// The destination path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The converter rejected a file.
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// Invalid run configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),
}

impl ScanError {
    /// Creates a new [`ScanError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ScanError::Write`] error.
    #[inline]
    pub fn write(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Creates a [`ScanError::Config`] error for an invalid option.
    #[inline]
    pub fn config(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config(ConfigError::invalid_option(option, reason))
    }

    /// Returns `true` if this error is recoverable (the run can continue
    /// with the next file).
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Read { .. } | Self::Write { .. } | Self::Convert(_)
        )
    }

    /// Returns `true` if this error is fatal (the run should stop).
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Read { path, .. } | Self::Write { path, .. } => Some(path),
            Self::Convert(err) => Some(err.path()),
            Self::Walk(_) | Self::Config(_) | Self::NonUtf8Path(_) => None,
        }
    }
}
