//! Conversion output units.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use super::content_type::ContentType;

/// One file produced by converting a source file.
///
/// A header converted in compatibility mode yields two outputs: the module
/// interface unit and a forwarding header.
///
/// # Examples
///
/// ```
/// use cmc_core::{ContentType, OutputFile};
///
/// let out = OutputFile::new("simple.cppm", ContentType::ModuleInterface, "export module simple;\n");
/// assert_eq!(out.path, "simple.cppm");
/// assert!(out.content_type.is_module_form());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFile {
    /// Output path, relative to the conversion root.
    pub path: Utf8PathBuf,
    /// Content type of the produced file.
    pub content_type: ContentType,
    /// Full file text.
    pub content: String,
}

impl OutputFile {
    /// Creates a new output file.
    #[must_use]
    pub fn new(
        path: impl Into<Utf8PathBuf>,
        content_type: ContentType,
        content: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            content_type,
            content: content.into(),
        }
    }
}
