//! Re-export rules for imports of module interface units.

use cmc_core::{ExportMap, Options, WILDCARD_EXPORT};

/// Decides whether an interface unit re-exports one of its imports.
///
/// An import of `target` by `owner` becomes `export import target;` when
///
/// - the rules for `owner` list `target` or `*`,
/// - the rules for `*` list `target` or `*`, or
/// - `target` is `owner` followed by one of the export suffixes.
///
/// # Examples
///
/// ```
/// use cmc_converter::ExportRules;
/// use cmc_core::Options;
///
/// let mut options = Options::default();
/// options.add_export("simple", "simple_fwd");
/// options.export_suffixes.push("_impl".to_owned());
///
/// let rules = ExportRules::new(&options);
/// assert!(rules.needs_export("simple", "simple_fwd"));
/// assert!(rules.needs_export("simple", "simple_impl"));
/// assert!(!rules.needs_export("simple", "simple2"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ExportRules<'a> {
    exports: &'a ExportMap,
    suffixes: &'a [String],
}

impl<'a> ExportRules<'a> {
    /// Creates rules from the export map and suffixes in `options`.
    #[must_use]
    pub fn new(options: &'a Options) -> Self {
        Self {
            exports: options.exports(),
            suffixes: &options.export_suffixes,
        }
    }

    /// Returns `true` if `owner` re-exports its import of `target`.
    #[must_use]
    pub fn needs_export(&self, owner: &str, target: &str) -> bool {
        self.exports.covers(owner, target)
            || self.exports.covers(WILDCARD_EXPORT, target)
            || self
                .suffixes
                .iter()
                .any(|suffix| target.strip_prefix(owner) == Some(suffix.as_str()))
    }
}
