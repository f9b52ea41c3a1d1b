//! Run configuration for cxx-modules-converter.
//!
//! This module provides:
//!
//! - [`Options`] - Settings shared by every file of a run
//! - [`FileOptions`] - Per-file flags (compatibility mode)
//! - [`ExtensionMap`] - Action-scoped extension to [`ContentType`] table
//! - [`ExportMap`] - Which imports an interface unit re-exports
//! - [`ConfigFile`] - JSON configuration applied on top of the defaults
//!
//! `Options` is built once, before conversion starts, and is read-only
//! afterwards.

use camino::{Utf8Path, Utf8PathBuf};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::types::{ContentType, ConvertAction, PathPatterns};
use crate::ConfigError;

/// Default macro guarding the module-only parts of compat output.
pub const DEFAULT_COMPAT_MACRO: &str = "CXX_COMPAT_HEADER";

/// Headers that always stay literal includes in the global module fragment.
pub const DEFAULT_ALWAYS_INCLUDE: [&str; 2] = ["cassert", "assert.h"];

/// Wildcard accepted on either side of an export rule.
pub const WILDCARD_EXPORT: &str = "*";

/// Ordered extension to content type table.
///
/// Each table starts with built-in defaults. The first explicit
/// [`add`](Self::add) for a content type replaces that type's default
/// extension; later additions for the same type append. Adding an extension
/// that is already present reassigns it.
///
/// # Examples
///
/// ```
/// use cmc_core::{ContentType, ExtensionMap};
///
/// let mut map = ExtensionMap::for_modules();
/// assert_eq!(map.get(".h"), ContentType::Header);
///
/// map.add("hpp", ContentType::Header);
/// map.add(".hh", ContentType::Header);
/// assert_eq!(map.get(".h"), ContentType::Other);
/// assert_eq!(map.get(".hpp"), ContentType::Header);
/// assert_eq!(map.get(".hh"), ContentType::Header);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionMap {
    entries: SmallVec<[(String, ContentType); 4]>,
    defaults: SmallVec<[ContentType; 2]>,
}

impl ExtensionMap {
    fn with_defaults(defaults: &[(&str, ContentType)]) -> Self {
        Self {
            entries: defaults
                .iter()
                .map(|(ext, ty)| ((*ext).to_owned(), *ty))
                .collect(),
            defaults: defaults.iter().map(|(_, ty)| *ty).collect(),
        }
    }

    /// Table used by [`ConvertAction::Modules`]: `.h` headers, `.cpp` sources.
    #[must_use]
    pub fn for_modules() -> Self {
        Self::with_defaults(&[
            (".h", ContentType::Header),
            (".cpp", ContentType::CxxSource),
        ])
    }

    /// Table used by [`ConvertAction::Headers`]: `.cppm` interfaces, `.cpp`
    /// implementation units.
    #[must_use]
    pub fn for_headers() -> Self {
        Self::with_defaults(&[
            (".cppm", ContentType::ModuleInterface),
            (".cpp", ContentType::ModuleImpl),
        ])
    }

    /// Maps `ext` (with or without the leading dot) to `content_type`.
    pub fn add(&mut self, ext: &str, content_type: ContentType) {
        let ext = normalize_extension(ext);
        if let Some(pos) = self.defaults.iter().position(|ty| *ty == content_type) {
            self.defaults.remove(pos);
            if let Some(entry) = self.entries.iter().position(|(_, ty)| *ty == content_type) {
                self.entries.remove(entry);
            }
        }
        match self.entries.iter_mut().find(|(e, _)| *e == ext) {
            Some(entry) => entry.1 = content_type,
            None => self.entries.push((ext, content_type)),
        }
    }

    /// Returns the content type for a dotted extension, or
    /// [`ContentType::Other`] when unknown.
    #[must_use]
    pub fn get(&self, ext: &str) -> ContentType {
        self.entries
            .iter()
            .find(|(e, _)| e == ext)
            .map_or(ContentType::Other, |(_, ty)| *ty)
    }

    /// Classifies `path` by its final extension.
    #[must_use]
    pub fn content_type_of(&self, path: &Utf8Path) -> ContentType {
        path.extension()
            .map_or(ContentType::Other, |ext| self.get(&format!(".{ext}")))
    }

    /// Iterates over `(extension, content type)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ContentType)> {
        self.entries.iter().map(|(e, ty)| (e.as_str(), *ty))
    }
}

fn normalize_extension(ext: &str) -> String {
    if ext.starts_with('.') {
        ext.to_owned()
    } else {
        format!(".{ext}")
    }
}

/// Owner module name to the set of imported module names it re-exports.
///
/// Either side may be [`WILDCARD_EXPORT`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportMap {
    rules: FxHashMap<String, FxHashSet<String>>,
}

impl ExportMap {
    /// Records that `owner` re-exports `target`.
    pub fn add(&mut self, owner: impl Into<String>, target: impl Into<String>) {
        self.rules
            .entry(owner.into())
            .or_default()
            .insert(target.into());
    }

    /// Returns `true` if the targets recorded for `owner` contain `target`
    /// or the wildcard.
    #[must_use]
    pub fn covers(&self, owner: &str, target: &str) -> bool {
        self.rules
            .get(owner)
            .is_some_and(|targets| targets.contains(target) || targets.contains(WILDCARD_EXPORT))
    }

    /// Returns `true` if no rules are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Per-file conversion flags.
///
/// # Examples
///
/// ```
/// use cmc_core::FileOptions;
///
/// assert!(!FileOptions::default().compat);
/// assert!(FileOptions::default().with_compat(true).compat);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileOptions {
    /// Emit the module unit in compatibility mode, with a forwarding
    /// header for interface units.
    pub compat: bool,
}

impl FileOptions {
    /// Sets the compatibility flag.
    #[inline]
    #[must_use]
    pub const fn with_compat(mut self, compat: bool) -> Self {
        self.compat = compat;
        self
    }
}

/// Settings shared by every file of a conversion run.
///
/// # Examples
///
/// ```
/// use cmc_core::{ContentType, ConvertAction, Options};
///
/// let mut options = Options::default().with_root_module_name("org");
/// options.add_export("simple", "simple_fwd");
///
/// assert_eq!(options.compat_macro, "CXX_COMPAT_HEADER");
/// assert_eq!(options.output_extension(ContentType::ModuleInterface), Some(".cppm"));
/// assert_eq!(
///     options.content_type_of(ConvertAction::Modules, "a/b.h".as_ref()),
///     ContentType::Header
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// Root of the include tree; module names are relative to it.
    pub root_dir: Option<Utf8PathBuf>,

    /// Prefix prepended to module names of files found in the tree.
    pub root_module_name: String,

    /// Extra include directories, relative to the root, searched in order.
    pub search_paths: Vec<Utf8PathBuf>,

    /// Files and directories that are neither converted nor copied.
    pub skip_patterns: PathPatterns,

    /// Files and directories converted in compatibility mode.
    pub compat_patterns: PathPatterns,

    /// Macro guarding module-only lines in compatibility output.
    pub compat_macro: String,

    /// Includes that always stay literal in the global module fragment.
    pub always_include: PathPatterns,

    /// Module name suffixes whose imports are re-exported by the owner
    /// (`simple` + `_fwd` exports `simple_fwd`).
    pub export_suffixes: Vec<String>,

    exports: ExportMap,
    modules_extensions: ExtensionMap,
    headers_extensions: ExtensionMap,
    output_extensions: FxHashMap<ContentType, String>,
}

impl Default for Options {
    fn default() -> Self {
        let mut always_include = PathPatterns::new();
        for name in DEFAULT_ALWAYS_INCLUDE {
            always_include.push_literal(name);
        }
        let output_extensions = [
            (ContentType::Header, ".h"),
            (ContentType::CxxSource, ".cpp"),
            (ContentType::ModuleInterface, ".cppm"),
            (ContentType::ModuleImpl, ".cpp"),
        ]
        .into_iter()
        .map(|(ty, ext)| (ty, ext.to_owned()))
        .collect();

        Self {
            root_dir: None,
            root_module_name: String::new(),
            search_paths: Vec::new(),
            skip_patterns: PathPatterns::new(),
            compat_patterns: PathPatterns::new(),
            compat_macro: DEFAULT_COMPAT_MACRO.to_owned(),
            always_include,
            export_suffixes: Vec::new(),
            exports: ExportMap::default(),
            modules_extensions: ExtensionMap::for_modules(),
            headers_extensions: ExtensionMap::for_headers(),
            output_extensions,
        }
    }
}

impl Options {
    /// Sets the root directory.
    #[must_use]
    pub fn with_root_dir(mut self, root: impl Into<Utf8PathBuf>) -> Self {
        self.root_dir = Some(root.into());
        self
    }

    /// Sets the root module-name prefix.
    #[must_use]
    pub fn with_root_module_name(mut self, name: impl Into<String>) -> Self {
        self.root_module_name = name.into();
        self
    }

    /// Appends a search path.
    #[must_use]
    pub fn with_search_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Records that `owner` re-exports its import of `target`.
    pub fn add_export(&mut self, owner: impl Into<String>, target: impl Into<String>) {
        self.exports.add(owner, target);
    }

    /// Parses and records an `OWNER=TARGET` export rule.
    pub fn add_export_rule(&mut self, rule: &str) -> Result<(), ConfigError> {
        match rule.split_once('=') {
            Some((owner, target)) if !owner.is_empty() && !target.is_empty() => {
                self.add_export(owner, target);
                Ok(())
            }
            _ => Err(ConfigError::invalid_option(
                "export",
                format!("'{rule}' is not of the form OWNER=TARGET"),
            )),
        }
    }

    /// Returns the export rules.
    #[inline]
    #[must_use]
    pub const fn exports(&self) -> &ExportMap {
        &self.exports
    }

    /// Maps a source extension to a content type for `action`.
    ///
    /// See [`ExtensionMap::add`] for the override rule.
    pub fn add_extension(&mut self, action: ConvertAction, ext: &str, content_type: ContentType) {
        match action {
            ConvertAction::Modules => self.modules_extensions.add(ext, content_type),
            ConvertAction::Headers => self.headers_extensions.add(ext, content_type),
        }
    }

    /// Returns the source extension table for `action`.
    #[inline]
    #[must_use]
    pub const fn extensions(&self, action: ConvertAction) -> &ExtensionMap {
        match action {
            ConvertAction::Modules => &self.modules_extensions,
            ConvertAction::Headers => &self.headers_extensions,
        }
    }

    /// Classifies `path` for `action`.
    #[must_use]
    pub fn content_type_of(&self, action: ConvertAction, path: &Utf8Path) -> ContentType {
        self.extensions(action).content_type_of(path)
    }

    /// Sets the extension given to outputs of `content_type`.
    ///
    /// Rejects empty extensions and a bare `.`.
    pub fn set_output_extension(
        &mut self,
        content_type: ContentType,
        ext: &str,
    ) -> Result<(), ConfigError> {
        let ext = normalize_extension(ext);
        if ext == "." {
            return Err(ConfigError::EmptyOutputExtension {
                content_type: content_type.label(),
            });
        }
        self.output_extensions.insert(content_type, ext);
        Ok(())
    }

    /// Returns the extension given to outputs of `content_type`.
    #[must_use]
    pub fn output_extension(&self, content_type: ContentType) -> Option<&str> {
        self.output_extensions.get(&content_type).map(String::as_str)
    }

    /// Sets the compat macro, rejecting an empty name.
    pub fn set_compat_macro(&mut self, name: impl Into<String>) -> Result<(), ConfigError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::invalid_option("compat_macro", "must not be empty"));
        }
        self.compat_macro = name;
        Ok(())
    }
}

/// One extension mapping in a [`ConfigFile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionEntry {
    /// Extension, with or without the leading dot.
    pub extension: String,
    /// Content type the extension maps to.
    pub content_type: ContentType,
}

/// JSON configuration file.
///
/// Every field is optional. [`apply`](Self::apply) layers the file on top
/// of an existing [`Options`] through the same mutators the CLI uses, so the
/// extension override rule holds for files too.
///
/// # Examples
///
/// ```
/// use cmc_core::{ConfigFile, ContentType, ConvertAction, Options};
///
/// let file = ConfigFile::from_json(r#"{
///     "root_module_name": "org",
///     "export": { "simple": ["simple_fwd"] },
///     "modules_extensions": [{ "extension": "hpp", "content_type": "header" }]
/// }"#).unwrap();
///
/// let mut options = Options::default();
/// file.apply(&mut options).unwrap();
/// assert_eq!(options.root_module_name, "org");
/// assert!(options.exports().covers("simple", "simple_fwd"));
/// assert_eq!(
///     options.content_type_of(ConvertAction::Modules, "x.hpp".as_ref()),
///     ContentType::Header
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Root directory of the include tree.
    pub root: Option<Utf8PathBuf>,
    /// Root module-name prefix.
    pub root_module_name: Option<String>,
    /// Search paths, appended in order.
    pub search_paths: Vec<Utf8PathBuf>,
    /// Skip patterns.
    pub skip: Vec<String>,
    /// Compat patterns.
    pub compat: Vec<String>,
    /// Compat macro name.
    pub compat_macro: Option<String>,
    /// Additional always-include patterns.
    pub always_include: Vec<String>,
    /// Export rules, owner to targets.
    pub export: FxHashMap<String, Vec<String>>,
    /// Export suffixes.
    pub export_suffixes: Vec<String>,
    /// Extension mappings for the modules action.
    pub modules_extensions: Vec<ExtensionEntry>,
    /// Extension mappings for the headers action.
    pub headers_extensions: Vec<ExtensionEntry>,
    /// Output extensions per content type.
    pub output_extensions: FxHashMap<ContentType, String>,
}

impl ConfigFile {
    /// Parses a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a configuration file.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Applies every setting present in the file to `options`.
    pub fn apply(&self, options: &mut Options) -> Result<(), ConfigError> {
        if let Some(root) = &self.root {
            options.root_dir = Some(root.clone());
        }
        if let Some(name) = &self.root_module_name {
            options.root_module_name.clone_from(name);
        }
        options.search_paths.extend(self.search_paths.iter().cloned());
        for pattern in &self.skip {
            options.skip_patterns.push(pattern)?;
        }
        for pattern in &self.compat {
            options.compat_patterns.push(pattern)?;
        }
        if let Some(name) = &self.compat_macro {
            options.set_compat_macro(name.as_str())?;
        }
        for pattern in &self.always_include {
            options.always_include.push(pattern)?;
        }
        for (owner, targets) in &self.export {
            for target in targets {
                options.add_export(owner.as_str(), target.as_str());
            }
        }
        options
            .export_suffixes
            .extend(self.export_suffixes.iter().cloned());
        for entry in &self.modules_extensions {
            options.add_extension(ConvertAction::Modules, &entry.extension, entry.content_type);
        }
        for entry in &self.headers_extensions {
            options.add_extension(ConvertAction::Headers, &entry.extension, entry.content_type);
        }
        for (content_type, ext) in &self.output_extensions {
            options.set_output_extension(*content_type, ext)?;
        }
        Ok(())
    }
}
