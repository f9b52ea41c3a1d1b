//! Module unit builder: the staging and flush state machine.
//!
//! A [`UnitBuilder`] receives the classified lines of one file and sorts
//! them into the regions of a module unit:
//!
//! ```text
//! <file comment>
//! module;                      fragment start, opened lazily
//! <compat includes>            compat interfaces only
//! <compat end>
//! <global module fragment>     literal includes of foreign headers
//! export module <name>;        purview start, opened lazily
//! <module content>             imports and declarations
//! ```
//!
//! Preprocessor lines cannot be placed until it is known what they guard,
//! so they are held in two staging buffers, one per destination. A
//! foreign include at nesting depth zero commits the fragment staging to the
//! global module fragment; an import or a declaration commits the module
//! staging to the module content. Conditionals that guard both kinds of
//! lines end up in both regions.

use camino::{Utf8Path, Utf8PathBuf};
use cmc_core::{ContentType, FileOptions, Options};

use crate::classify::IncludeDirective;
use crate::{ConvertError, ExportRules, IncludeResolver, PathMap};

/// The two kinds of module unit, sharing one state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// Built from a header; always a module.
    Interface,
    /// Built from a source file; a module only once it includes its own
    /// header.
    Implementation,
}

impl UnitKind {
    /// Returns the unit kind a source content type is converted into.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmc_converter::UnitKind;
    /// use cmc_core::ContentType;
    ///
    /// assert_eq!(UnitKind::for_source(ContentType::Header), Some(UnitKind::Interface));
    /// assert_eq!(UnitKind::for_source(ContentType::Other), None);
    /// ```
    #[inline]
    #[must_use]
    pub const fn for_source(content_type: ContentType) -> Option<Self> {
        match content_type {
            ContentType::Header => Some(Self::Interface),
            ContentType::CxxSource => Some(Self::Implementation),
            _ => None,
        }
    }

    /// Returns the content type of the built unit.
    #[inline]
    #[must_use]
    pub const fn content_type(self) -> ContentType {
        match self {
            Self::Interface => ContentType::ModuleInterface,
            Self::Implementation => ContentType::ModuleImpl,
        }
    }

    /// Returns the keyword that opens the module purview.
    #[inline]
    #[must_use]
    pub const fn purview_keyword(self) -> &'static str {
        match self {
            Self::Interface => "export module",
            Self::Implementation => "module",
        }
    }
}

/// Result of [`UnitBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltUnit {
    /// Module name of the unit.
    pub name: String,
    /// Full text of the unit.
    pub content: String,
    /// Lines of the global module fragment body.
    pub fragment: Vec<String>,
}

/// Builds one module unit from a stream of classified lines.
#[derive(Debug)]
pub struct UnitBuilder<'a> {
    kind: UnitKind,
    path: Utf8PathBuf,
    name: String,
    compat: bool,
    actually_module: bool,
    options: &'a Options,
    resolver: IncludeResolver<'a>,
    exports: ExportRules<'a>,

    copyright: Vec<String>,
    fragment_start: Vec<String>,
    compat_includes: Vec<String>,
    compat_end: Vec<String>,
    fragment: Vec<String>,
    purview_start: Vec<String>,
    content: Vec<String>,

    module_staging: Vec<String>,
    fragment_staging: Vec<String>,
    /// Open `#if` depth.
    nesting: i32,
    /// Foreign includes staged since the last fragment commit.
    pending_foreign: usize,
    /// Foreign includes moved by the fragment commit in progress.
    flushed_foreign: usize,
    /// Nesting depth at the last module staging commit.
    flushed_module_nesting: i32,
    /// Index in the module staging of the last line outside any `#if`.
    last_unnested: usize,
    /// Content index where the export block starts.
    export_insert_at: Option<usize>,
}

impl<'a> UnitBuilder<'a> {
    /// Creates a builder for the file at `path`, relative to the root.
    #[must_use]
    pub fn new(
        kind: UnitKind,
        path: &Utf8Path,
        options: &'a Options,
        paths: &'a PathMap,
        file_options: FileOptions,
    ) -> Self {
        let resolver = IncludeResolver::new(paths, options);
        Self {
            kind,
            path: path.to_owned(),
            name: resolver.module_name(path),
            compat: file_options.compat,
            actually_module: false,
            options,
            resolver,
            exports: ExportRules::new(options),
            copyright: Vec::new(),
            fragment_start: Vec::new(),
            compat_includes: Vec::new(),
            compat_end: Vec::new(),
            fragment: Vec::new(),
            purview_start: Vec::new(),
            content: Vec::new(),
            module_staging: Vec::new(),
            fragment_staging: Vec::new(),
            nesting: 0,
            pending_foreign: 0,
            flushed_foreign: 0,
            flushed_module_nesting: 0,
            last_unnested: 0,
            export_insert_at: None,
        }
    }

    /// Returns the module name of the unit.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unit kind.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Returns `true` if the unit declares a module.
    #[inline]
    #[must_use]
    pub const fn is_module(&self) -> bool {
        matches!(self.kind, UnitKind::Interface) || self.actually_module
    }

    fn compat_header(&self) -> bool {
        self.compat && self.kind == UnitKind::Interface
    }

    fn wrap_compat(&self, lines: Vec<String>) -> Vec<String> {
        if !self.compat_header() {
            return lines;
        }
        let mut wrapped = Vec::with_capacity(lines.len() + 2);
        wrapped.push(format!("#ifndef {}", self.options.compat_macro));
        wrapped.extend(lines);
        wrapped.push("#endif".to_owned());
        wrapped
    }

    fn open_fragment(&mut self) {
        if !self.fragment_start.is_empty() || !self.is_module() {
            return;
        }
        if self.compat_header() {
            self.fragment_start = vec![
                format!("#ifndef {}", self.options.compat_macro),
                "module;".to_owned(),
                "#else".to_owned(),
                "#pragma once".to_owned(),
            ];
            self.compat_end = vec!["#endif".to_owned()];
        } else {
            self.fragment_start = vec!["module;".to_owned()];
        }
    }

    fn open_purview(&mut self) {
        if !self.purview_start.is_empty() || !self.is_module() {
            return;
        }
        let declaration = format!("{} {};", self.kind.purview_keyword(), self.name);
        self.purview_start = self.wrap_compat(vec![declaration]);
    }

    fn mark_actually_module(&mut self) {
        self.actually_module = true;
        if !self.fragment.is_empty() {
            self.open_fragment();
        }
    }

    /// Appends a line of the leading file comment.
    pub fn copyright(&mut self, line: String) {
        self.copyright.push(line);
    }

    /// Handles a preprocessor line that moves with includes.
    ///
    /// `delta` is `+1` for `#if*`, `-1` for `#endif` and `0` otherwise.
    pub fn preprocessor(&mut self, line: &str, delta: i32) {
        self.nesting += delta;
        self.stage_module(line.to_owned(), delta);
        self.stage_fragment(line.to_owned());
    }

    /// Handles `#pragma once`, which is kept as a comment.
    pub fn pragma_once(&mut self, line: &str) {
        self.stage_module(format!("// {line}"), 0);
    }

    /// Handles a declaration or any other non-preprocessor line.
    pub fn content(&mut self, line: &str) {
        self.flush_module(true);
        self.add_content(line.to_owned());
    }

    /// Handles an `#include` line.
    ///
    /// Includes of files outside the tree, and of always-include names,
    /// stay literal in the global module fragment. Everything else becomes
    /// an import, except an implementation unit's include of its own
    /// header, which turns the unit into a module.
    pub fn include(&mut self, line: &str, directive: IncludeDirective<'_>, quoted: bool) {
        self.open_purview();

        let Some(resolved) = self.resolver.resolve(&self.path, directive.target, quoted) else {
            self.foreign_include(line);
            return;
        };
        if self.options.always_include.matches(&resolved) {
            self.foreign_include(line);
            return;
        }

        let module = self.resolver.module_name(&resolved);
        if module == self.name {
            self.mark_actually_module();
            self.open_purview();
            return;
        }

        if self.compat_header() {
            self.open_fragment();
            self.compat_includes.push(line.to_owned());
        }

        let export = if self.kind == UnitKind::Interface
            && self.exports.needs_export(&self.name, &module)
        {
            "export "
        } else {
            ""
        };
        let import = format!(
            "{}{}{export}import {module};{}",
            directive.indent, directive.gap, directive.tail
        );
        for line in self.wrap_compat(vec![import]) {
            self.add_content(line);
        }
    }

    fn foreign_include(&mut self, line: &str) {
        self.pending_foreign += 1;
        self.stage_fragment(line.to_owned());
    }

    fn stage_fragment(&mut self, line: String) {
        self.fragment_staging.push(line);
        self.flush_fragment();
    }

    fn stage_module(&mut self, line: String, delta: i32) {
        if (self.nesting == 0 && delta == 0) || (self.nesting == 1 && delta == 1) {
            self.last_unnested = self.module_staging.len();
        }
        self.module_staging.push(line);
        if self.nesting == 0 && delta == -1 {
            self.last_unnested = self.module_staging.len();
        }
    }

    fn flush_fragment(&mut self) {
        self.flushed_foreign = 0;
        if self.nesting != 0 {
            return;
        }
        if self.pending_foreign == 0 && !self.compat_header() {
            return;
        }
        self.open_fragment();
        self.fragment.append(&mut self.fragment_staging);
        self.flushed_foreign = self.pending_foreign;
        self.pending_foreign = 0;
        self.flush_module(false);
    }

    /// Commits the module staging to the content, unless it was just
    /// committed to the fragment at the top level.
    fn flush_module(&mut self, mark_export: bool) {
        self.open_purview();
        let staging = std::mem::take(&mut self.module_staging);
        if self.flushed_foreign == 0 || self.flushed_module_nesting != 0 {
            let staged = staging.len();
            for (index, line) in staging.into_iter().enumerate() {
                if mark_export && index == self.last_unnested {
                    self.mark_export_start();
                }
                self.content.push(line);
            }
            if mark_export && self.last_unnested == staged {
                self.mark_export_start();
            }
        }
        self.flushed_module_nesting = self.nesting;
        self.flushed_foreign = 0;
        self.last_unnested = 0;
    }

    fn mark_export_start(&mut self) {
        if self.export_insert_at.is_none() {
            self.export_insert_at = Some(self.content.len());
        }
    }

    fn add_content(&mut self, line: String) {
        self.flush_module(false);
        self.open_purview();
        self.content.push(line);
    }

    fn wrap_exports(&mut self) {
        let Some(at) = self.export_insert_at else {
            return;
        };
        let mut start = Vec::new();
        let mut end = Vec::new();
        if self.compat {
            start.push(r#"extern "C++" {"#.to_owned());
            end.push(r#"} // extern "C++""#.to_owned());
        }
        if self.kind == UnitKind::Interface {
            start.insert(0, "export {".to_owned());
            end.push("} // export".to_owned());
        }
        let start = self.wrap_compat(start);
        let end = self.wrap_compat(end);
        self.content.splice(at..at, start);
        self.content.extend(end);
    }

    /// Finishes the unit and renders its text.
    ///
    /// For a module implementation unit, `sibling_fragment` is the global
    /// module fragment of the interface unit with the same name; it is
    /// placed before the unit's own fragment.
    pub fn build(
        mut self,
        sibling_fragment: Option<&[String]>,
    ) -> Result<BuiltUnit, ConvertError> {
        if (!self.fragment.is_empty() || !self.compat_includes.is_empty())
            && self.fragment_start.is_empty() == self.is_module()
        {
            return Err(ConvertError::invariant(
                self.path,
                "global module fragment does not match the module declaration",
            ));
        }

        if self.kind == UnitKind::Implementation && self.is_module() {
            if let Some(sibling) = sibling_fragment.filter(|lines| !lines.is_empty()) {
                self.open_fragment();
                let own = std::mem::take(&mut self.fragment);
                self.fragment = sibling.iter().cloned().chain(own).collect();
            }
        }

        self.flush_module(false);
        self.wrap_exports();

        let mut text = [
            &self.copyright,
            &self.fragment_start,
            &self.compat_includes,
            &self.compat_end,
            &self.fragment,
            &self.purview_start,
            &self.content,
        ]
        .iter()
        .map(|region| region.join("\n"))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
        text.push('\n');

        Ok(BuiltUnit {
            name: self.name,
            content: text,
            fragment: self.fragment,
        })
    }
}
