//! Include resolution and module-name derivation.
//!
//! An include target is looked up, in order:
//!
//! 1. relative to the root of the tree,
//! 2. relative to the including file's directory (quoted includes only),
//! 3. under each configured search path.
//!
//! Candidates are normalized lexically before the [`PathMap`] is asked
//! whether they exist. A quoted include that cannot be found is assumed to
//! name a file of the tree anyway; an angle include that cannot be found is
//! foreign.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cmc_core::Options;
use tracing::warn;

use crate::PathMap;

/// Normalizes `path` lexically: `.` segments are dropped and `dir/..`
/// pairs collapse. Leading `..` segments are kept.
///
/// # Examples
///
/// ```
/// use cmc_converter::resolver::normalize;
///
/// assert_eq!(normalize("./a/b/../c.h".as_ref()), "a/c.h");
/// assert_eq!(normalize("../x.h".as_ref()), "../x.h");
/// ```
#[must_use]
pub fn normalize(path: &Utf8Path) -> Utf8PathBuf {
    let mut parts: Vec<&str> = Vec::new();
    let mut absolute = false;
    for component in path.components() {
        match component {
            Utf8Component::RootDir => absolute = true,
            Utf8Component::CurDir | Utf8Component::Prefix(_) => {}
            Utf8Component::ParentDir => match parts.last() {
                Some(last) if *last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            Utf8Component::Normal(name) => parts.push(name),
        }
    }
    let mut normalized = if absolute {
        Utf8PathBuf::from("/")
    } else {
        Utf8PathBuf::new()
    };
    for part in parts {
        normalized.push(part);
    }
    normalized
}

/// Derives a dotted module name from a path, without any root prefix.
///
/// # Examples
///
/// ```
/// use cmc_converter::resolver::module_name_of;
///
/// assert_eq!(module_name_of("subdir/simple.h".as_ref()), "subdir.simple");
/// assert_eq!(module_name_of("simple.cpp".as_ref()), "simple");
/// ```
#[must_use]
pub fn module_name_of(path: &Utf8Path) -> String {
    path.with_extension("").as_str().replace(['/', '\\'], ".")
}

/// Resolves includes against the [`PathMap`] snapshot of the tree.
#[derive(Debug, Clone, Copy)]
pub struct IncludeResolver<'a> {
    paths: &'a PathMap,
    options: &'a Options,
}

impl<'a> IncludeResolver<'a> {
    /// Creates a resolver over `paths` using the search paths and root
    /// module name from `options`.
    #[inline]
    #[must_use]
    pub const fn new(paths: &'a PathMap, options: &'a Options) -> Self {
        Self { paths, options }
    }

    /// Resolves `include` as written in `current_file`.
    ///
    /// Returns `None` only for an angle include that names no file of the
    /// tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmc_converter::{IncludeResolver, PathMap};
    /// use cmc_core::Options;
    ///
    /// let paths = PathMap::from_files(["subdir1/subdir2/simple2.h"]);
    /// let options = Options::default();
    /// let resolver = IncludeResolver::new(&paths, &options);
    ///
    /// let found = resolver.resolve("subdir1/test.cpp".as_ref(), "subdir2/simple2.h", true);
    /// assert_eq!(found.as_deref(), Some("subdir1/subdir2/simple2.h".as_ref()));
    /// assert_eq!(resolver.resolve("a.cpp".as_ref(), "vector", false), None);
    /// ```
    #[must_use]
    pub fn resolve(
        &self,
        current_file: &Utf8Path,
        include: &str,
        quoted: bool,
    ) -> Option<Utf8PathBuf> {
        let include_path = Utf8Path::new(include);

        let candidate = normalize(include_path);
        if self.paths.exists(&candidate) {
            return Some(candidate);
        }

        if quoted {
            let current_dir = current_file.parent().unwrap_or(Utf8Path::new(""));
            let candidate = normalize(&current_dir.join(include_path));
            if self.paths.exists(&candidate) {
                return Some(candidate);
            }
        }

        for search_path in &self.options.search_paths {
            let candidate = normalize(&search_path.join(include_path));
            if self.paths.exists(&candidate) {
                return Some(candidate);
            }
        }

        if quoted {
            warn!(include, from = %current_file, "included file not found");
            return Some(normalize(include_path));
        }
        None
    }

    /// Derives the module name for a file of the tree.
    ///
    /// The root module-name prefix is applied only when the path exists in
    /// the [`PathMap`].
    #[must_use]
    pub fn module_name(&self, path: &Utf8Path) -> String {
        let path = normalize(path);
        let prefix = &self.options.root_module_name;
        if !prefix.is_empty() && self.paths.exists(&path) {
            module_name_of(&Utf8Path::new(prefix).join(&path))
        } else {
            module_name_of(&path)
        }
    }
}
