//! Relative path glob patterns.
//!
//! Patterns are matched component-wise against the *trailing* components of
//! a path, so a bare name matches at any depth:
//!
//! ```
//! use cmc_core::PathPatterns;
//!
//! let mut patterns = PathPatterns::new();
//! patterns.push("skipdir").unwrap();
//! patterns.push("subdir/*.h").unwrap();
//!
//! assert!(patterns.matches("skipdir"));
//! assert!(patterns.matches("a/b/skipdir"));
//! assert!(patterns.matches("a/subdir/x.h"));
//! assert!(!patterns.matches("subdir/x.cpp"));
//! ```
//!
//! A pattern starting with `/` is anchored and must match every component.

use camino::Utf8Path;
use glob::Pattern;
use smallvec::SmallVec;

use crate::ConfigError;

/// One path component of a pattern.
#[derive(Debug, Clone)]
enum Component {
    Glob(Pattern),
    Literal(String),
}

impl Component {
    fn matches(&self, part: &str) -> bool {
        match self {
            Self::Glob(pattern) => pattern.matches(part),
            Self::Literal(name) => name == part,
        }
    }
}

/// One compiled pattern: its source text and per-component matchers.
#[derive(Debug, Clone)]
struct PathPattern {
    source: String,
    anchored: bool,
    components: SmallVec<[Component; 4]>,
}

impl PathPattern {
    fn parse(source: &str) -> Result<Self, ConfigError> {
        let anchored = source.starts_with('/');
        let components = source
            .split('/')
            .filter(|c| !c.is_empty() && *c != ".")
            .map(|c| {
                Pattern::new(c)
                    .map(Component::Glob)
                    .map_err(|e| ConfigError::InvalidPattern {
                        pattern: source.to_owned(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<SmallVec<[Component; 4]>, _>>()?;
        if components.is_empty() {
            return Err(ConfigError::InvalidPattern {
                pattern: source.to_owned(),
                reason: "empty pattern".to_owned(),
            });
        }
        Ok(Self {
            source: source.to_owned(),
            anchored,
            components,
        })
    }

    /// A pattern whose components match by equality only.
    fn literal(source: &str) -> Option<Self> {
        let components: SmallVec<[Component; 4]> = source
            .split('/')
            .filter(|c| !c.is_empty() && *c != ".")
            .map(|c| Component::Literal(c.to_owned()))
            .collect();
        if components.is_empty() {
            return None;
        }
        Some(Self {
            source: source.to_owned(),
            anchored: source.starts_with('/'),
            components,
        })
    }

    fn matches(&self, parts: &[&str]) -> bool {
        if parts.len() < self.components.len() {
            return false;
        }
        if self.anchored && parts.len() != self.components.len() {
            return false;
        }
        let tail = &parts[parts.len() - self.components.len()..];
        self.components
            .iter()
            .zip(tail)
            .all(|(component, part)| component.matches(part))
    }
}

/// An ordered list of glob patterns; a path matches if any pattern does.
#[derive(Debug, Clone, Default)]
pub struct PathPatterns {
    patterns: Vec<PathPattern>,
}

impl PathPatterns {
    /// Creates an empty pattern list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Compiles every pattern in `sources`.
    pub fn from_patterns<I, S>(sources: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut patterns = Self::new();
        for source in sources {
            patterns.push(source.as_ref())?;
        }
        Ok(patterns)
    }

    /// Compiles and appends a pattern.
    pub fn push(&mut self, source: &str) -> Result<(), ConfigError> {
        self.patterns.push(PathPattern::parse(source)?);
        Ok(())
    }

    /// Appends a pattern matched literally, with no glob syntax.
    ///
    /// A source without any path component is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmc_core::PathPatterns;
    ///
    /// let mut patterns = PathPatterns::new();
    /// patterns.push_literal("assert.h");
    /// patterns.push_literal("a*");
    ///
    /// assert!(patterns.matches("sys/assert.h"));
    /// assert!(patterns.matches("a*"));
    /// assert!(!patterns.matches("abc"));
    /// ```
    pub fn push_literal(&mut self, source: &str) {
        if let Some(pattern) = PathPattern::literal(source) {
            self.patterns.push(pattern);
        }
    }

    /// Returns `true` if any pattern matches `path`.
    #[must_use]
    pub fn matches(&self, path: impl AsRef<Utf8Path>) -> bool {
        let parts: SmallVec<[&str; 8]> = path
            .as_ref()
            .as_str()
            .split(['/', '\\'])
            .filter(|c| !c.is_empty() && *c != ".")
            .collect();
        self.patterns.iter().any(|p| p.matches(&parts))
    }

    /// Returns the number of patterns.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns `true` if there are no patterns.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Iterates over the pattern source texts.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.source.as_str())
    }
}
