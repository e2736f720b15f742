//! Structurally-safe replacement of the backlinks region.
//!
//! # Responsibility
//! - Locate the backlinks region between the `## Backlinks` header and the
//!   first following `---` rule.
//! - Produce new full content with only that region replaced, or a typed
//!   skip decision when the structure is malformed.
//!
//! # Invariants
//! - Every byte outside the region is byte-identical to the input.
//! - Output is all-or-nothing per note; no partial splice ever escapes.
//! - When the header occurs more than once, the LAST occurrence is the
//!   active region.

use crate::model::note::NoteId;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Header marker opening a backlinks region. The trailing newline is part
/// of the marker: a header with trailing text on the same line is not a
/// backlinks declaration.
pub const BACKLINKS_HEADER: &str = "## Backlinks\n";

/// Horizontal-rule marker closing a backlinks region.
pub const RULE_MARKER: &str = "---";

/// Why a note was skipped instead of spliced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No `## Backlinks` header line in the content.
    MissingHeader,
    /// Header present but no `---` after it; splicing would clobber the
    /// rest of the note.
    MissingClosingRule,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "no `## Backlinks` header"),
            Self::MissingClosingRule => {
                write!(f, "no closing `---` after the backlinks header")
            }
        }
    }
}

/// Result of one splice attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpliceOutcome {
    /// New full note content with only the backlinks region replaced.
    Updated(String),
    /// The note must not be touched.
    Skipped(SkipReason),
}

/// Replaces the backlinks region of `content` with `fragment`.
///
/// Two-phase scan: find the last header occurrence, then the first rule
/// marker after it. `note_id` is only used for log context.
pub fn splice_backlinks(note_id: NoteId, content: &str, fragment: &str) -> SpliceOutcome {
    let Some(header_at) = content.rfind(BACKLINKS_HEADER) else {
        return SpliceOutcome::Skipped(SkipReason::MissingHeader);
    };

    if content.matches(BACKLINKS_HEADER).count() > 1 {
        info!(
            "event=splice module=splice status=ambiguous_header note_id={note_id} \
             detail=multiple_headers_last_occurrence_wins"
        );
    }

    let (prefix, region) = content.split_at(header_at + BACKLINKS_HEADER.len());
    let Some(rule_at) = region.find(RULE_MARKER) else {
        return SpliceOutcome::Skipped(SkipReason::MissingClosingRule);
    };
    let suffix = &region[rule_at..];

    let mut updated = String::with_capacity(prefix.len() + fragment.len() + suffix.len());
    updated.push_str(prefix);
    updated.push_str(fragment);
    updated.push_str(suffix);
    SpliceOutcome::Updated(updated)
}
