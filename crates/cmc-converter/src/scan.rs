//! Scanner front-end: feeds the logical lines of a file to a [`UnitBuilder`].
//!
//! The scanner first captures the leading file comment (licence or
//! copyright block), which is kept at the very top of the output. The first
//! line that is not part of it switches the scanner to the main state for
//! the rest of the file.

use tracing::warn;

use crate::UnitBuilder;
use crate::classify::{LineKind, LogicalLines, classify};

const BOM: char = '\u{feff}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Start,
    FileComment,
    Main,
}

fn is_comment_start(text: &str) -> bool {
    text.starts_with("//") || text.starts_with("/*")
}

fn is_bom_comment_start(line: &str) -> bool {
    line.strip_prefix(BOM).is_some_and(is_comment_start)
}

/// Whether the first line opens a file comment.
fn opens_file_comment(line: &str) -> bool {
    line.is_empty() || is_comment_start(line) || is_bom_comment_start(line)
}

/// Whether a line continues the file comment.
fn continues_file_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || is_comment_start(trimmed)
        || trimmed.starts_with('*')
        || is_bom_comment_start(line)
}

fn dispatch(builder: &mut UnitBuilder<'_>, line: &str) {
    match classify(line) {
        LineKind::AngleInclude(directive) => builder.include(line, directive, false),
        LineKind::QuoteInclude(directive) => builder.include(line, directive, true),
        LineKind::PragmaOnce => builder.pragma_once(line),
        LineKind::Conditional(delta) => builder.preprocessor(line, delta),
        LineKind::MalformedInclude => {
            warn!(module = builder.name(), line, "unrecognized include, kept as content");
            builder.content(line);
        }
        LineKind::Content => builder.content(line),
    }
}

/// Feeds every logical line of `content` to `builder`.
pub fn scan(builder: &mut UnitBuilder<'_>, content: &str) {
    let mut state = ScanState::Start;
    for line in LogicalLines::new(content) {
        if state == ScanState::Start {
            state = if opens_file_comment(&line) {
                ScanState::FileComment
            } else {
                ScanState::Main
            };
        }
        if state == ScanState::FileComment {
            if continues_file_comment(&line) {
                builder.copyright(line);
                continue;
            }
            state = ScanState::Main;
        }
        dispatch(builder, &line);
    }
}
