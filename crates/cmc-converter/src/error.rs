//! Error types for the cmc-converter crate.
//!
//! This module provides the [`ConvertError`] type for failures while
//! converting a single file.

use camino::Utf8PathBuf;
use cmc_core::ContentType;

/// Errors that can occur while converting one file.
///
/// # Examples
///
/// ```
/// use cmc_converter::ConvertError;
///
/// fn describe(err: &ConvertError) -> &'static str {
///     match err {
///         ConvertError::UnsupportedContentType { .. } => "not a header or source",
///         ConvertError::InternalInvariantViolation { .. } => "converter bug",
///     }
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The file's content type cannot be converted by the requested action.
    #[error("cannot convert {path}: unsupported content type '{content_type}'")]
    UnsupportedContentType {
        /// The file being converted.
        path: Utf8PathBuf,
        /// Its content type.
        content_type: ContentType,
    },

    /// The builder reached an inconsistent state.
    #[error("internal error converting {path}: {detail}")]
    InternalInvariantViolation {
        /// The file being converted.
        path: Utf8PathBuf,
        /// What was inconsistent.
        detail: String,
    },
}

impl ConvertError {
    /// Creates a new [`ConvertError::InternalInvariantViolation`] error.
    #[inline]
    pub fn invariant(path: impl Into<Utf8PathBuf>, detail: impl Into<String>) -> Self {
        Self::InternalInvariantViolation {
            path: path.into(),
            detail: detail.into(),
        }
    }

    /// Returns the path of the file that failed.
    #[must_use]
    pub fn path(&self) -> &Utf8PathBuf {
        match self {
            Self::UnsupportedContentType { path, .. }
            | Self::InternalInvariantViolation { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_content_type_display() {
        let err = ConvertError::UnsupportedContentType {
            path: Utf8PathBuf::from("notes.txt"),
            content_type: ContentType::Other,
        };
        assert_eq!(
            err.to_string(),
            "cannot convert notes.txt: unsupported content type 'other'"
        );
        assert_eq!(err.path(), "notes.txt");
    }

    #[test]
    fn test_invariant_display() {
        let err = ConvertError::invariant("a.h", "fragment without module declaration");
        let msg = err.to_string();
        assert!(msg.contains("a.h"));
        assert!(msg.contains("fragment without module declaration"));
    }
}
