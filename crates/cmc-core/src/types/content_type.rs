//! File classification and conversion direction.
//!
//! A [`ContentType`] is derived from a file's extension through the
//! action-scoped [`ExtensionMap`](crate::ExtensionMap); the
//! [`ConvertAction`] decides which of the two maps applies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// The kind of a file in the tree being converted.
///
/// # Examples
///
/// ```
/// use cmc_core::ContentType;
///
/// assert_eq!(ContentType::Header.converted(), ContentType::ModuleInterface);
/// assert_eq!(ContentType::ModuleImpl.converted(), ContentType::CxxSource);
/// assert!(ContentType::Header.is_interface());
/// assert!(!ContentType::CxxSource.is_interface());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Classic header (`.h` by default).
    Header,
    /// Classic source file (`.cpp` by default).
    CxxSource,
    /// C++20 module interface unit (`.cppm` by default).
    ModuleInterface,
    /// C++20 module implementation unit (`.cpp` by default).
    ModuleImpl,
    /// Anything else; copied as-is by the directory converter.
    Other,
}

impl ContentType {
    /// All content types, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Header,
        Self::CxxSource,
        Self::ModuleInterface,
        Self::ModuleImpl,
        Self::Other,
    ];

    /// Returns the counterpart this type converts into.
    ///
    /// Headers and module interfaces map onto each other, as do sources
    /// and module implementation units. [`Other`](Self::Other) maps to itself.
    #[inline]
    #[must_use]
    pub const fn converted(self) -> Self {
        match self {
            Self::Header => Self::ModuleInterface,
            Self::CxxSource => Self::ModuleImpl,
            Self::ModuleInterface => Self::Header,
            Self::ModuleImpl => Self::CxxSource,
            Self::Other => Self::Other,
        }
    }

    /// Returns `true` for headers and module interface units.
    ///
    /// Interface files are visited before other entries of the same
    /// directory so that their global module fragments are known when the
    /// matching implementation unit is built.
    #[inline]
    #[must_use]
    pub const fn is_interface(self) -> bool {
        matches!(self, Self::Header | Self::ModuleInterface)
    }

    /// Returns `true` for content already in module form.
    #[inline]
    #[must_use]
    pub const fn is_module_form(self) -> bool {
        matches!(self, Self::ModuleInterface | Self::ModuleImpl)
    }

    /// Returns a human-readable label for this type.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmc_core::ContentType;
    ///
    /// assert_eq!(ContentType::CxxSource.label(), "source");
    /// assert_eq!(ContentType::ModuleImpl.label(), "module implementation unit");
    /// ```
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::CxxSource => "source",
            Self::ModuleInterface => "module interface unit",
            Self::ModuleImpl => "module implementation unit",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The direction of a conversion run.
///
/// # Examples
///
/// ```
/// use cmc_core::ConvertAction;
///
/// let action: ConvertAction = "headers".parse().unwrap();
/// assert_eq!(action, ConvertAction::Headers);
/// assert_eq!(ConvertAction::Modules.to_string(), "modules");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvertAction {
    /// Convert headers and sources into module units.
    #[default]
    Modules,
    /// Convert module units back into headers and sources.
    Headers,
}

impl ConvertAction {
    /// Returns the textual form accepted by [`FromStr`].
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Modules => "modules",
            Self::Headers => "headers",
        }
    }
}

impl fmt::Display for ConvertAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConvertAction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "modules" => Ok(Self::Modules),
            "headers" => Ok(Self::Headers),
            other => Err(ConfigError::invalid_option(
                "action",
                format!("unknown action '{other}', expected 'modules' or 'headers'"),
            )),
        }
    }
}
