//! Note domain model.
//!
//! # Responsibility
//! - Define the lightweight `NoteReference` handle and the full `Note` entity.
//! - Derive the wiki-link-safe title rendering and backlink search terms.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `NoteReference` equality and hashing use `id` only; two distinct notes
//!   may share a title.
//! - `content` is only replaced wholesale by the splicer, never edited in
//!   place piecemeal.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Stable identifier for every note known to a store.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NoteId = Uuid;

static WIKI_UNSAFE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\[\]/|]").expect("valid wiki escape regex"));

/// Lightweight handle to a note: identity plus display title.
///
/// Immutable once obtained from a store. Equality and hashing are by
/// identity only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteReference {
    /// Stable note id.
    pub id: NoteId,
    /// Display title as stored.
    pub title: String,
}

impl NoteReference {
    /// Creates a reference from parts.
    pub fn new(id: NoteId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }

    /// Returns the title escaped for embedding inside a `[[...]]` link.
    ///
    /// `[`, `]`, `/` and `|` would terminate, nest or alias the link, so
    /// each is prefixed with a backslash.
    pub fn wiki_title(&self) -> String {
        WIKI_UNSAFE_RE.replace_all(&self.title, r"\$0").into_owned()
    }

    /// Returns the search terms other notes would use to reference this one.
    ///
    /// Both shipped stores derive `backlink_search_terms` through this
    /// method so the term shape cannot drift between them.
    pub fn backlink_terms(&self) -> Vec<String> {
        vec![format!("[[{}]]", self.wiki_title())]
    }
}

impl PartialEq for NoteReference {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for NoteReference {}

impl Hash for NoteReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Full note entity resolved from a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Stable note id.
    pub id: NoteId,
    /// Display title.
    pub title: String,
    /// Raw markdown source text captured at resolution time.
    pub content: String,
    /// Whether the note sits in the store's trash.
    pub trashed: bool,
    /// Ordered query strings used to find notes referencing this one.
    pub backlink_search_terms: Vec<String>,
}

impl Note {
    /// Creates a note with a generated stable id and derived search terms.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), title, content)
    }

    /// Creates a note with a caller-provided stable id.
    ///
    /// Used by store implementations where identity already exists
    /// externally.
    pub fn with_id(id: NoteId, title: impl Into<String>, content: impl Into<String>) -> Self {
        let title = title.into();
        let terms = NoteReference::new(id, title.clone()).backlink_terms();
        Self {
            id,
            title,
            content: content.into(),
            trashed: false,
            backlink_search_terms: terms,
        }
    }

    /// Returns the lightweight handle for this note.
    pub fn reference(&self) -> NoteReference {
        NoteReference::new(self.id, self.title.clone())
    }
}

/// Deduplicated backlink references found for one note in one run.
///
/// Membership is keyed by note identity, never by title. Insertion order is
/// preserved so downstream stable sorting has a defined pre-order
/// (first-seen across search terms).
#[derive(Debug, Clone, Default)]
pub struct BacklinkSet {
    references: Vec<NoteReference>,
    seen: HashSet<NoteId>,
}

impl BacklinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts one reference; returns whether it was newly added.
    pub fn insert(&mut self, reference: NoteReference) -> bool {
        if !self.seen.insert(reference.id) {
            return false;
        }
        self.references.push(reference);
        true
    }

    /// Drops references failing the predicate, keeping insertion order.
    pub fn retain(&mut self, mut keep: impl FnMut(&NoteReference) -> bool) {
        let seen = &mut self.seen;
        self.references.retain(|reference| {
            let kept = keep(reference);
            if !kept {
                seen.remove(&reference.id);
            }
            kept
        });
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Iterates references in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &NoteReference> {
        self.references.iter()
    }
}
