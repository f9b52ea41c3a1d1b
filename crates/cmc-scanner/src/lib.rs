//! Directory conversion for cxx-modules-converter.
//!
//! This crate is the filesystem side of the converter. It indexes the
//! include tree, walks the source directory in a stable order, routes each
//! file to the conversion engine or to a plain copy, and writes outputs only
//! when their content changed.
//!
//! # Overview
//!
//! The main entry point is [`DirectoryConverter`], which combines:
//!
//! - [`PathWalker`]: index of every path under the root (`ignore` crate)
//! - [`Converter`](cmc_converter::Converter): the single-file engine
//! - [`ConvertStats`]: atomic counters for the run summary
//!
//! # Example
//!
//! ```no_run
//! use cmc_core::{ConvertAction, Options};
//! use cmc_scanner::DirectoryConverter;
//! use camino::Utf8Path;
//!
//! let converter = DirectoryConverter::new(ConvertAction::Modules, Options::default());
//! let report = converter.convert_directory(Utf8Path::new("include"), Utf8Path::new("modules"))?;
//! println!("{} outputs written", report.stats.converted);
//! # Ok::<(), cmc_scanner::ScanError>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//! DirectoryConverter::convert_directory
//!     │
//!     ├── PathWalker (index the root into a PathMap)
//!     │
//!     └── Run (sorted WalkBuilder traversal, links followed)
//!             │
//!             ├── skip / compat / always-include patterns
//!             ├── copy if changed
//!             └── Converter::convert → write if changed
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod error;
mod stats;
mod walker;

pub use error::ScanError;
pub use stats::{ConvertStats, StatsSnapshot};
pub use walker::PathWalker;

use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};
use cmc_converter::{Converter, InterfaceRegistry};
use cmc_core::{ConfigError, ContentType, ConvertAction, FileOptions, Options, PathPatterns};
use ignore::WalkBuilder;
use tracing::{debug, info, warn};

/// Result of a directory conversion.
///
/// Contains statistics and any per-file errors encountered.
#[derive(Debug)]
pub struct ConvertReport {
    /// Statistics snapshot from the run.
    pub stats: StatsSnapshot,
    /// Per-file errors; the run skipped these files and continued.
    pub errors: Vec<(Utf8PathBuf, ScanError)>,
}

/// Converts a directory tree into a destination directory.
///
/// # Examples
///
/// ```no_run
/// use cmc_core::{ConvertAction, Options};
/// use cmc_scanner::DirectoryConverter;
/// use camino::Utf8Path;
///
/// let mut options = Options::default().with_root_module_name("org");
/// options.compat_patterns.push("legacy/*")?;
///
/// let converter = DirectoryConverter::new(ConvertAction::Modules, options);
/// let report = converter.convert_directory(Utf8Path::new("src"), Utf8Path::new("out"))?;
/// for (path, error) in &report.errors {
///     eprintln!("{path}: {error}");
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct DirectoryConverter {
    action: ConvertAction,
    options: Options,
    stats: ConvertStats,
}

impl DirectoryConverter {
    /// Creates a directory converter for `action`.
    #[must_use]
    pub fn new(action: ConvertAction, options: Options) -> Self {
        Self {
            action,
            options,
            stats: ConvertStats::new(),
        }
    }

    /// Returns the run options.
    #[inline]
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// Returns the statistics of the last run.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> &ConvertStats {
        &self.stats
    }

    /// Converts `source` into `destination`.
    ///
    /// When a root directory is configured and differs from `source`, the
    /// include tree is indexed from the root and `source` keeps its path
    /// relative to the root in the destination.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if `source` or the root is not a
    /// directory, or `source` lies outside the root. Returns
    /// [`ScanError::Walk`] or [`ScanError::NonUtf8Path`] if the tree cannot
    /// be indexed. Per-file failures are collected in the report instead.
    pub fn convert_directory(
        &self,
        source: &Utf8Path,
        destination: &Utf8Path,
    ) -> Result<ConvertReport, ScanError> {
        self.stats.reset();
        let (root, subdir) = self.split_root(source)?;

        info!(
            root = %root,
            source = %source,
            destination = %destination,
            action = %self.action,
            "converting directory"
        );
        let paths = PathWalker::new(&root)?
            .with_follow_links(true)
            .build_path_map()?;
        let converter = Converter::new(self.action, self.options.clone()).with_paths(paths);

        let mut run = Run {
            converter: &converter,
            root: &root,
            destination,
            stats: &self.stats,
            registry: InterfaceRegistry::new(),
            errors: Vec::new(),
        };
        run.visit_tree(&subdir)?;

        let stats = self.stats.snapshot();
        info!(
            files = stats.all,
            converted = stats.converted,
            copied = stats.copied,
            errors = stats.errors,
            "directory conversion complete"
        );
        Ok(ConvertReport {
            stats,
            errors: run.errors,
        })
    }

    /// Returns the directory to index and the path of `source` inside it.
    fn split_root(&self, source: &Utf8Path) -> Result<(Utf8PathBuf, Utf8PathBuf), ScanError> {
        match &self.options.root_dir {
            Some(root) if !is_trivial(root) && root.as_path() != source => {
                let subdir = source.strip_prefix(root).map_err(|_| {
                    ConfigError::OutsideRoot {
                        directory: source.to_owned(),
                        root: root.clone(),
                    }
                })?;
                if !source.is_dir() {
                    return Err(ScanError::config("directory", format!("{source} is not a directory")));
                }
                Ok((root.clone(), subdir.to_owned()))
            }
            _ => Ok((source.to_owned(), Utf8PathBuf::new())),
        }
    }
}

fn is_trivial(root: &Utf8Path) -> bool {
    root.as_str().is_empty() || root.as_str() == "."
}

/// State of one directory conversion run.
struct Run<'a> {
    converter: &'a Converter,
    root: &'a Utf8Path,
    destination: &'a Utf8Path,
    stats: &'a ConvertStats,
    registry: InterfaceRegistry,
    errors: Vec<(Utf8PathBuf, ScanError)>,
}

impl Run<'_> {
    fn options(&self) -> &Options {
        self.converter.options()
    }

    fn record(&mut self, error: ScanError) -> Result<(), ScanError> {
        if error.is_fatal() {
            return Err(error);
        }
        let path = error.path().cloned().unwrap_or_default();
        warn!(path = %path, error = %error, "skipping file");
        self.stats.increment_errors();
        self.errors.push((path, error));
        Ok(())
    }

    /// Visits every entry under `subdir` in traversal order, following
    /// symbolic links.
    fn visit_tree(&mut self, subdir: &Utf8Path) -> Result<(), ScanError> {
        self.make_dir(subdir)?;

        let start = if subdir.as_str().is_empty() {
            self.root.to_owned()
        } else {
            self.root.join(subdir)
        };
        for result in self.build_walker(&start) {
            let entry = result?;
            if entry.depth() == 0 {
                continue;
            }

            let path = entry.path();
            let utf8_path =
                Utf8Path::from_path(path).ok_or_else(|| ScanError::NonUtf8Path(path.to_owned()))?;
            let Ok(relative) = utf8_path.strip_prefix(self.root) else {
                continue;
            };
            let relative = relative.to_owned();

            if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                self.make_dir(&relative)?;
            } else {
                let file_options = self.file_options(subdir, &relative);
                if let Err(error) = self.visit_file(&relative, file_options) {
                    self.record(error)?;
                }
            }
        }
        Ok(())
    }

    /// Builds the walker for one run.
    ///
    /// Siblings are ordered interface files first, then by name, so that
    /// interface units are registered before their implementation units.
    /// Entries matching a skip pattern are pruned with their subtrees.
    fn build_walker(&self, start: &Utf8Path) -> ignore::Walk {
        let options = self.options().clone();
        let action = self.converter.action();
        let root = self.root.to_owned();
        let skip = self.options().skip_patterns.clone();

        WalkBuilder::new(start)
            .standard_filters(false)
            .follow_links(true)
            .threads(1)
            .sort_by_file_path(move |a, b| compare_entries(&options, action, a, b))
            .filter_entry(move |entry| entry.depth() == 0 || !is_skipped(&root, &skip, entry.path()))
            .build()
    }

    /// Compat mode applies to a file when it, or a directory between the
    /// converted subdirectory and it, matches a compat pattern.
    fn file_options(&self, subdir: &Utf8Path, relative: &Utf8Path) -> FileOptions {
        let compat = relative
            .ancestors()
            .take_while(|ancestor| *ancestor != subdir && ancestor.starts_with(subdir))
            .any(|ancestor| self.options().compat_patterns.matches(ancestor));
        FileOptions::default().with_compat(compat)
    }

    fn make_dir(&mut self, relative: &Utf8Path) -> Result<(), ScanError> {
        let out_dir = self.destination.join(relative);
        match fs::create_dir_all(&out_dir) {
            Ok(()) => Ok(()),
            Err(source) => self.record(ScanError::write(out_dir, source)),
        }
    }

    fn visit_file(&mut self, relative: &Utf8Path, file_options: FileOptions) -> Result<(), ScanError> {
        self.stats.increment_all();
        let content_type = self.converter.content_type_of(relative);
        if content_type == ContentType::Other || self.options().always_include.matches(relative) {
            return self.copy_file(relative);
        }

        self.stats.increment_convertible();
        let source_path = self.root.join(relative);
        let content =
            fs::read_to_string(&source_path).map_err(|e| ScanError::read(&source_path, e))?;
        let outputs = self
            .converter
            .convert(&mut self.registry, &content, relative, file_options)?;
        for output in outputs {
            let target = self.destination.join(&output.path);
            if write_if_changed(&target, &output.content)? {
                self.stats.increment_converted();
                debug!(path = %target, content_type = %output.content_type, "wrote output");
            }
        }
        Ok(())
    }

    fn copy_file(&self, relative: &Utf8Path) -> Result<(), ScanError> {
        let source_path = self.root.join(relative);
        let target = self.destination.join(relative);
        if source_path == target {
            return Ok(());
        }
        let bytes = fs::read(&source_path).map_err(|e| ScanError::read(&source_path, e))?;
        if matches!(fs::read(&target), Ok(existing) if existing == bytes) {
            return Ok(());
        }
        fs::copy(&source_path, &target).map_err(|e| ScanError::write(&target, e))?;
        self.stats.increment_copied();
        debug!(path = %target, "copied");
        Ok(())
    }
}

fn compare_entries(options: &Options, action: ConvertAction, a: &Path, b: &Path) -> Ordering {
    let rank = |path: &Path| {
        Utf8Path::from_path(path)
            .map_or(1, |path| u8::from(!options.content_type_of(action, path).is_interface()))
    };
    rank(a).cmp(&rank(b)).then_with(|| a.file_name().cmp(&b.file_name()))
}

fn is_skipped(root: &Utf8Path, skip: &PathPatterns, path: &Path) -> bool {
    let Some(relative) = Utf8Path::from_path(path).and_then(|path| path.strip_prefix(root).ok())
    else {
        return false;
    };
    let skipped = skip.matches(relative);
    if skipped {
        info!(path = %relative, "skipping");
    }
    skipped
}

/// Writes `content` to `path` unless the file already holds it. Returns
/// whether the file was written.
fn write_if_changed(path: &Utf8Path, content: &str) -> Result<bool, ScanError> {
    match fs::read_to_string(path) {
        Ok(existing) if existing == content => return Ok(false),
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound || e.kind() == io::ErrorKind::InvalidData => {}
        Err(e) => return Err(ScanError::read(path, e)),
    }
    fs::write(path, content).map_err(|e| ScanError::write(path, e))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tree {
        _dir: tempfile::TempDir,
        base: Utf8PathBuf,
    }

    impl Tree {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let base = Utf8PathBuf::from_path_buf(dir.path().to_owned()).unwrap();
            Self { _dir: dir, base }
        }

        fn write(&self, path: &str, content: &str) {
            let path = self.base.join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        fn read(&self, path: &str) -> String {
            fs::read_to_string(self.base.join(path)).unwrap()
        }

        fn path(&self, path: &str) -> Utf8PathBuf {
            self.base.join(path)
        }

        /// Every file under `path`, relative to it, sorted.
        fn files(&self, path: &str) -> Vec<String> {
            let root = self.path(path);
            let mut files = Vec::new();
            let mut pending = vec![root.clone()];
            while let Some(dir) = pending.pop() {
                for entry in fs::read_dir(&dir).unwrap() {
                    let entry = entry.unwrap();
                    let entry_path = Utf8PathBuf::from_path_buf(entry.path()).unwrap();
                    if entry.file_type().unwrap().is_dir() {
                        pending.push(entry_path);
                    } else {
                        files.push(entry_path.strip_prefix(&root).unwrap().to_string());
                    }
                }
            }
            files.sort();
            files
        }
    }

    fn convert(tree: &Tree, options: Options, source: &str) -> ConvertReport {
        DirectoryConverter::new(ConvertAction::Modules, options)
            .convert_directory(&tree.path(source), &tree.path("out"))
            .unwrap()
    }

    #[test]
    fn test_simple_pair() {
        let tree = Tree::new();
        tree.write("input/simple.h", "#include <vector>\nint f();\n");
        tree.write("input/simple.cpp", "#include \"simple.h\"\n#include <map>\nint f() { return 0; }\n");

        let report = convert(&tree, Options::default(), "input");

        assert!(report.errors.is_empty());
        assert_eq!(tree.files("out"), ["simple.cpp", "simple.cppm"]);
        assert_eq!(
            tree.read("out/simple.cppm"),
            "module;\n#include <vector>\nexport module simple;\nexport {\nint f();\n} // export\n"
        );
        assert_eq!(
            tree.read("out/simple.cpp"),
            "module;\n#include <vector>\n#include <map>\nmodule simple;\nint f() { return 0; }\n"
        );
    }

    #[test]
    fn test_second_run_writes_nothing() {
        let tree = Tree::new();
        tree.write("input/simple.h", "int f();\n");
        tree.write("input/simple.cpp", "#include \"simple.h\"\n");
        tree.write("input/other.txt", "notes\n");

        let first = convert(&tree, Options::default(), "input");
        assert_eq!(
            first.stats,
            StatsSnapshot { all: 3, convertible: 2, converted: 2, copied: 1, errors: 0 }
        );
        assert_eq!(tree.read("out/other.txt"), "notes\n");

        let second = convert(&tree, Options::default(), "input");
        assert_eq!(
            second.stats,
            StatsSnapshot { all: 3, convertible: 2, converted: 0, copied: 0, errors: 0 }
        );
        assert!(second.stats.is_up_to_date());
    }

    #[test]
    fn test_subdirectories_and_skip_patterns() {
        let tree = Tree::new();
        tree.write("input/simple1.h", "");
        tree.write("input/subdir1/simple1.h", "");
        tree.write("input/subdir1/simple2.h", "");
        tree.write("input/subdir1/skipsubdir/simple3.h", "");
        tree.write("input/skipdir/simple4.h", "");
        tree.write("input/subdir1/subdir2/simple1.h", "");

        let mut options = Options::default();
        for pattern in ["skipdir", "subdir1/simple2.h", "subdir1/skipsubdir"] {
            options.skip_patterns.push(pattern).unwrap();
        }
        let report = convert(&tree, options, "input");

        assert_eq!(report.stats.all, 3);
        assert_eq!(
            tree.files("out"),
            ["simple1.cppm", "subdir1/simple1.cppm", "subdir1/subdir2/simple1.cppm"]
        );
        assert_eq!(
            tree.read("out/subdir1/subdir2/simple1.cppm"),
            "export module subdir1.subdir2.simple1;\n"
        );
    }

    #[test]
    fn test_root_prefix_keeps_relative_paths() {
        let tree = Tree::new();
        tree.write("input/subdir/local_include.h", "");
        tree.write("input/subdir/simple.h", "#include \"local_include.h\"\n");
        tree.write("input/other/ignored.h", "");

        let options = Options::default()
            .with_root_dir(tree.path("input"))
            .with_root_module_name("org");
        let report = convert(&tree, options, "input/subdir");

        assert!(report.errors.is_empty());
        assert_eq!(
            tree.files("out"),
            ["subdir/local_include.cppm", "subdir/simple.cppm"]
        );
        assert_eq!(
            tree.read("out/subdir/simple.cppm"),
            "export module org.subdir.simple;\nimport org.subdir.local_include;\n"
        );
    }

    #[test]
    fn test_source_outside_root_is_fatal() {
        let tree = Tree::new();
        tree.write("input/simple.h", "");
        tree.write("elsewhere/simple.h", "");

        let err = DirectoryConverter::new(
            ConvertAction::Modules,
            Options::default().with_root_dir(tree.path("input")),
        )
        .convert_directory(&tree.path("elsewhere"), &tree.path("out"))
        .unwrap_err();
        assert!(matches!(err, ScanError::Config(ConfigError::OutsideRoot { .. })));
    }

    #[test]
    fn test_compat_patterns_are_inherited() {
        let tree = Tree::new();
        tree.write("input/simple.h", "");
        tree.write("input/plain.h", "");
        tree.write("input/subdir/simple2.h", "");

        let mut options = Options::default();
        options.compat_patterns.push("simple.h").unwrap();
        options.compat_patterns.push("subdir").unwrap();
        convert(&tree, options, "input");

        assert_eq!(
            tree.files("out"),
            [
                "plain.cppm",
                "simple.cppm",
                "simple.h",
                "subdir/simple2.cppm",
                "subdir/simple2.h",
            ]
        );
        assert_eq!(tree.read("out/plain.cppm"), "export module plain;\n");
        assert!(tree.read("out/subdir/simple2.h").contains("#include \"simple2.cppm\"\n"));
        assert_eq!(
            tree.read("out/subdir/simple2.cppm"),
            "#ifndef CXX_COMPAT_HEADER\nexport module subdir.simple2;\n#endif\n"
        );
    }

    #[test]
    fn test_always_include_files_are_copied() {
        let tree = Tree::new();
        tree.write("input/simple.h", "int f();\n");
        tree.write("input/simple.cpp", "#include \"simple.h\"\n");

        let mut options = Options::default();
        options.always_include.push("simple.h").unwrap();
        let report = convert(&tree, options, "input");

        assert_eq!(report.stats.copied, 1);
        assert_eq!(tree.files("out"), ["simple.cpp", "simple.h"]);
        assert_eq!(tree.read("out/simple.h"), "int f();\n");
        assert_eq!(tree.read("out/simple.cpp"), "#include \"simple.h\"\n");
    }

    #[test]
    fn test_unreadable_file_is_recorded_and_run_continues() {
        let tree = Tree::new();
        tree.write("input/good.h", "");
        fs::write(tree.path("input/bad.h"), [0xff, 0xfe, 0x00]).unwrap();

        let report = convert(&tree, Options::default(), "input");

        assert_eq!(report.stats.errors, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].0.as_str().ends_with("bad.h"));
        assert_eq!(tree.files("out"), ["good.cppm"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_is_followed() {
        let tree = Tree::new();
        tree.write("input/top.h", "");
        tree.write("real/sub/a.h", "#include \"top.h\"\n");
        std::os::unix::fs::symlink(tree.path("real/sub"), tree.path("input/linked")).unwrap();

        let report = convert(&tree, Options::default(), "input");

        assert!(report.errors.is_empty());
        assert_eq!(
            report.stats,
            StatsSnapshot { all: 2, convertible: 2, converted: 2, copied: 0, errors: 0 }
        );
        assert_eq!(tree.files("out"), ["linked/a.cppm", "top.cppm"]);
        assert_eq!(
            tree.read("out/linked/a.cppm"),
            "export module linked.a;\nimport top;\n"
        );
    }

    #[test]
    fn test_skipped_directory_is_not_created() {
        let tree = Tree::new();
        tree.write("input/keep/simple.h", "");
        tree.write("input/skipdir/simple.h", "");

        let mut options = Options::default();
        options.skip_patterns.push("skipdir").unwrap();
        convert(&tree, options, "input");

        assert!(tree.path("out/keep").is_dir());
        assert!(!tree.path("out/skipdir").exists());
    }

    #[test]
    fn test_headers_action_copies_through() {
        let tree = Tree::new();
        tree.write("input/simple.cppm", "export module simple;\n");
        tree.write("input/simple.h", "int f();\n");

        let report = DirectoryConverter::new(ConvertAction::Headers, Options::default())
            .convert_directory(&tree.path("input"), &tree.path("out"))
            .unwrap();

        assert_eq!(report.stats.convertible, 1);
        assert_eq!(report.stats.copied, 1);
        assert_eq!(tree.read("out/simple.cppm"), "export module simple;\n");
        assert_eq!(tree.read("out/simple.h"), "int f();\n");
    }
}
