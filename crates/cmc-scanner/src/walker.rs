//! Path index of the tree being converted.
//!
//! This module provides [`PathWalker`], which uses the `ignore` crate to
//! record every file and directory under the root in a [`PathMap`].
//! Include resolution asks that map whether a candidate path exists.
//!
//! Unlike a source scanner, the walker applies no filters: hidden files,
//! `.gitignore`d files and build directories are all part of the include
//! tree.
//!
//! # Examples
//!
//! ```no_run
//! use cmc_scanner::PathWalker;
//! use camino::Utf8Path;
//!
//! let walker = PathWalker::new(Utf8Path::new("./include"))?;
//! let paths = walker.build_path_map()?;
//! println!("Indexed {} files", paths.file_count());
//! # Ok::<(), cmc_scanner::ScanError>(())
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use cmc_converter::PathMap;
use ignore::WalkBuilder;
use tracing::debug;

use crate::error::ScanError;

/// Walks a root directory and indexes every path under it.
#[derive(Debug)]
pub struct PathWalker {
    /// The root directory to walk.
    root: Utf8PathBuf,
    /// Whether to follow symbolic links.
    follow_links: bool,
}

impl PathWalker {
    /// Creates a new walker for the given root directory.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if the root path doesn't exist or
    /// isn't a directory.
    pub fn new(root: &Utf8Path) -> Result<Self, ScanError> {
        if !root.exists() {
            return Err(ScanError::config("directory", format!("{root} does not exist")));
        }
        if !root.is_dir() {
            return Err(ScanError::config("directory", format!("{root} is not a directory")));
        }

        Ok(Self {
            root: root.to_owned(),
            follow_links: false,
        })
    }

    /// Configures whether to follow symbolic links.
    ///
    /// By default, symbolic links are not followed.
    #[must_use]
    pub const fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Records every file and directory under the root, relative to it.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Walk`] if directory traversal fails.
    /// Returns [`ScanError::NonUtf8Path`] if a non-UTF-8 path is encountered.
    pub fn build_path_map(&self) -> Result<PathMap, ScanError> {
        let mut paths = PathMap::new();

        for result in self.build_walker() {
            let entry = result?;
            if entry.depth() == 0 {
                continue;
            }

            let path = entry.path();
            let utf8_path =
                Utf8Path::from_path(path).ok_or_else(|| ScanError::NonUtf8Path(path.to_owned()))?;
            let Ok(relative) = utf8_path.strip_prefix(&self.root) else {
                continue;
            };

            if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                paths.insert_dir(relative);
            } else {
                paths.insert_file(relative);
            }
        }

        debug!(root = %self.root, files = paths.file_count(), "indexed include tree");
        Ok(paths)
    }

    /// Builds the ignore walker with every filter disabled.
    fn build_walker(&self) -> ignore::Walk {
        WalkBuilder::new(&self.root)
            .standard_filters(false)
            .follow_links(self.follow_links)
            .threads(1)
            .build()
    }

    /// Returns the root directory being walked.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}
