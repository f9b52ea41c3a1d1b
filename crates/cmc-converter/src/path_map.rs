//! Snapshot of which paths exist in the tree being converted.
//!
//! The [`PathMap`] is populated once, by walking the root directory or
//! synthetically in tests, and only queried during conversion. Include
//! resolution and module-name prefixing both ask it whether a path exists.

use camino::{Utf8Component, Utf8Path};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// A node of the [`PathMap`] tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathEntry {
    /// A regular file.
    File,
    /// A directory and its children.
    Directory(FxHashMap<String, PathEntry>),
}

impl PathEntry {
    fn empty_dir() -> Self {
        Self::Directory(FxHashMap::default())
    }
}

/// Tree of path segments to files and directories.
///
/// # Examples
///
/// ```
/// use cmc_converter::PathMap;
///
/// let map = PathMap::from_files(["root.h", "subdir1/simple1.h"]);
/// assert!(map.exists("root.h"));
/// assert!(map.exists("subdir1"));
/// assert!(map.exists("subdir1/simple1.h"));
/// assert!(!map.exists("missing.h"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMap {
    root: FxHashMap<String, PathEntry>,
    files: usize,
}

fn segments(path: &Utf8Path) -> impl Iterator<Item = &str> {
    path.components().filter_map(|c| match c {
        Utf8Component::Normal(s) => Some(s),
        Utf8Component::ParentDir => Some(".."),
        _ => None,
    })
}

/// Inserts the entry named by `segments` below `node`, turning any file met
/// on the way into a directory. Returns `true` if a new file was recorded.
fn insert_entry(node: &mut FxHashMap<String, PathEntry>, segments: &[&str], file: bool) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        return false;
    };
    if rest.is_empty() {
        if file {
            return node.insert((*first).to_owned(), PathEntry::File) != Some(PathEntry::File);
        }
        node.entry((*first).to_owned()).or_insert_with(PathEntry::empty_dir);
        return false;
    }
    let entry = node
        .entry((*first).to_owned())
        .or_insert_with(PathEntry::empty_dir);
    if matches!(entry, PathEntry::File) {
        *entry = PathEntry::empty_dir();
    }
    match entry {
        PathEntry::Directory(children) => insert_entry(children, rest, file),
        PathEntry::File => false,
    }
}

impl PathMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map containing `files` and their parent directories.
    #[must_use]
    pub fn from_files<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Utf8Path>,
    {
        let mut map = Self::new();
        for file in files {
            map.insert_file(file.as_ref());
        }
        map
    }

    /// Records a file, creating its parent directories.
    pub fn insert_file(&mut self, path: &Utf8Path) {
        let segments: SmallVec<[&str; 8]> = segments(path).collect();
        if insert_entry(&mut self.root, &segments, true) {
            self.files += 1;
        }
    }

    /// Records a directory, creating its parents.
    pub fn insert_dir(&mut self, path: &Utf8Path) {
        let segments: SmallVec<[&str; 8]> = segments(path).collect();
        insert_entry(&mut self.root, &segments, false);
    }

    /// Returns the entry at `path`, if any.
    #[must_use]
    pub fn get(&self, path: impl AsRef<Utf8Path>) -> Option<&PathEntry> {
        let mut segments = segments(path.as_ref());
        let mut entry = self.root.get(segments.next()?)?;
        for segment in segments {
            match entry {
                PathEntry::Directory(children) => entry = children.get(segment)?,
                PathEntry::File => return None,
            }
        }
        Some(entry)
    }

    /// Returns `true` if `path` names a file or a non-empty directory.
    #[must_use]
    pub fn exists(&self, path: impl AsRef<Utf8Path>) -> bool {
        match self.get(path) {
            Some(PathEntry::File) => true,
            Some(PathEntry::Directory(children)) => !children.is_empty(),
            None => false,
        }
    }

    /// Returns the number of files recorded.
    #[inline]
    #[must_use]
    pub const fn file_count(&self) -> usize {
        self.files
    }

    /// Returns `true` if nothing has been recorded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}
