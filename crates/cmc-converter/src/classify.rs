//! Line classification for the conversion scanner.
//!
//! The converter is not a preprocessor: every logical line is matched
//! against a fixed, ordered set of regular expressions and classified as one
//! [`LineKind`]. Patterns are compiled once on first use.
//!
//! # Examples
//!
//! ```
//! use cmc_converter::classify::{classify, LineKind};
//!
//! match classify(" # include <vector> // std") {
//!     LineKind::AngleInclude(inc) => {
//!         assert_eq!(inc.indent, " ");
//!         assert_eq!(inc.gap, " ");
//!         assert_eq!(inc.target, "vector");
//!         assert_eq!(inc.tail, " // std");
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//! assert_eq!(classify("#ifdef FLAG"), LineKind::Conditional(1));
//! assert_eq!(classify("#endif"), LineKind::Conditional(-1));
//! ```

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::{Captures, Regex};

static ANGLE_INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)#(\s*)include\s*<(.+)>(.*)$").expect("angle include regex is valid")
});

static QUOTE_INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(\s*)#(\s*)include\s*"(.+)"(.*)$"#).expect("quote include regex is valid")
});

static PRAGMA_ONCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*#\s*pragma\s+once.*$").expect("pragma once regex is valid")
});

static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*//.*$").expect("line comment regex is valid"));

static OTHER_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*#\s*(error|elif|else|pragma|warning)").expect("directive regex is valid")
});

static BLANK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*$").expect("blank regex is valid"));

static DEFINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\s*define").expect("define regex is valid"));

static IF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*#\s*if").expect("if regex is valid"));

static ENDIF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\s*endif.*$").expect("endif regex is valid"));

static ANY_INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\s*include").expect("include regex is valid"));

/// Captures of an `#include` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncludeDirective<'a> {
    /// Whitespace before `#`.
    pub indent: &'a str,
    /// Whitespace between `#` and `include`.
    pub gap: &'a str,
    /// Included name, between the delimiters.
    pub target: &'a str,
    /// Anything after the closing delimiter, usually a comment.
    pub tail: &'a str,
}

impl<'a> IncludeDirective<'a> {
    fn from_captures(caps: &Captures<'a>) -> Self {
        let group = |i| caps.get(i).map_or("", |m| m.as_str());
        Self {
            indent: group(1),
            gap: group(2),
            target: group(3),
            tail: group(4),
        }
    }
}

/// Classification of one logical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `#include <...>`.
    AngleInclude(IncludeDirective<'a>),
    /// `#include "..."`.
    QuoteInclude(IncludeDirective<'a>),
    /// `#pragma once`.
    PragmaOnce,
    /// Preprocessor line that moves with includes: comments, blank lines,
    /// `#define`, `#error`, `#elif`, `#else`, `#pragma`, `#warning` (delta 0),
    /// `#if*` (+1) and `#endif` (-1).
    Conditional(i32),
    /// Starts like `#include` but matches neither include form.
    MalformedInclude,
    /// Anything else.
    Content,
}

/// Classifies a logical line.
///
/// Priority order: angle include, quote include, `#pragma once`, neutral
/// lines, `#define`, `#if*`, `#endif`, malformed include, content.
#[must_use]
pub fn classify(line: &str) -> LineKind<'_> {
    if let Some(caps) = ANGLE_INCLUDE.captures(line) {
        return LineKind::AngleInclude(IncludeDirective::from_captures(&caps));
    }
    if let Some(caps) = QUOTE_INCLUDE.captures(line) {
        return LineKind::QuoteInclude(IncludeDirective::from_captures(&caps));
    }
    if PRAGMA_ONCE.is_match(line) {
        return LineKind::PragmaOnce;
    }
    if LINE_COMMENT.is_match(line)
        || OTHER_DIRECTIVE.is_match(line)
        || BLANK.is_match(line)
        || DEFINE.is_match(line)
    {
        return LineKind::Conditional(0);
    }
    if IF.is_match(line) {
        return LineKind::Conditional(1);
    }
    if ENDIF.is_match(line) {
        return LineKind::Conditional(-1);
    }
    if ANY_INCLUDE.is_match(line) {
        return LineKind::MalformedInclude;
    }
    LineKind::Content
}

/// Iterator over logical lines.
///
/// Physical lines are split like [`str::lines`]. A line ending in a
/// backslash absorbs the next physical line, joined with `\n`, for as long
/// as the result still ends in a backslash and input remains.
///
/// # Examples
///
/// ```
/// use cmc_converter::classify::LogicalLines;
///
/// let lines: Vec<_> = LogicalLines::new("#define X \\\n  1\nint x;\n").collect();
/// assert_eq!(lines, vec!["#define X \\\n  1".to_owned(), "int x;".to_owned()]);
/// ```
#[derive(Debug, Clone)]
pub struct LogicalLines<'a> {
    physical: std::str::Lines<'a>,
}

impl<'a> LogicalLines<'a> {
    /// Splits `content` into logical lines.
    #[must_use]
    pub fn new(content: &'a str) -> Self {
        Self {
            physical: content.lines(),
        }
    }
}

impl Iterator for LogicalLines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = self.physical.next()?.to_owned();
        while line.ends_with('\\') {
            let Some(next) = self.physical.next() else {
                break;
            };
            line.push('\n');
            line.push_str(next);
        }
        Some(line)
    }
}
