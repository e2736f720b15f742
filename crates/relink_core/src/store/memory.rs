//! Deterministic in-memory note store and commit channel.
//!
//! # Responsibility
//! - Provide a dependency-free store for tests and embedding.
//! - Record the exact commit order for observability in tests.
//!
//! # Invariants
//! - Search iterates notes in id order, so results are deterministic.
//! - Injected failures surface as errors, never as empty results.

use crate::model::note::{Note, NoteId, NoteReference};
use crate::store::{CommitChannel, CommitError, NoteStore, StoreError, StoreResult};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};

/// In-memory implementation of [`NoteStore`] and [`CommitChannel`].
#[derive(Default)]
pub struct MemoryNoteStore {
    notes: RefCell<BTreeMap<NoteId, Note>>,
    committed: RefCell<Vec<NoteId>>,
    failing_terms: RefCell<HashSet<String>>,
    failing_commits: RefCell<HashSet<NoteId>>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts one note and returns its id.
    pub fn insert(&self, note: Note) -> NoteId {
        let id = note.id;
        self.notes.borrow_mut().insert(id, note);
        id
    }

    /// Makes every later search for `term` fail, to exercise the
    /// failed-lookup path distinctly from the empty-result path.
    pub fn fail_searches_for(&self, term: impl Into<String>) {
        self.failing_terms.borrow_mut().insert(term.into());
    }

    /// Makes every later commit for `id` fail.
    pub fn fail_commits_for(&self, id: NoteId) {
        self.failing_commits.borrow_mut().insert(id);
    }

    /// Returns committed note ids in commit order.
    pub fn committed_ids(&self) -> Vec<NoteId> {
        self.committed.borrow().clone()
    }

    /// Returns the current content of one note.
    pub fn content_of(&self, id: NoteId) -> Option<String> {
        self.notes.borrow().get(&id).map(|note| note.content.clone())
    }
}

impl NoteStore for MemoryNoteStore {
    fn search(&self, term: &str) -> StoreResult<Vec<NoteReference>> {
        if self.failing_terms.borrow().contains(term) {
            return Err(StoreError::Backend(format!(
                "search unavailable for term `{term}`"
            )));
        }

        Ok(self
            .notes
            .borrow()
            .values()
            .filter(|note| note.content.contains(term))
            .map(Note::reference)
            .collect())
    }

    fn resolve(&self, reference: &NoteReference) -> StoreResult<Note> {
        self.notes
            .borrow()
            .get(&reference.id)
            .cloned()
            .ok_or(StoreError::NoteNotFound(reference.id))
    }
}

impl CommitChannel for MemoryNoteStore {
    fn commit(&self, note_id: NoteId, new_content: &str) -> Result<(), CommitError> {
        if self.failing_commits.borrow().contains(&note_id) {
            return Err(CommitError::Channel(format!(
                "injected commit failure for {note_id}"
            )));
        }

        let mut notes = self.notes.borrow_mut();
        let note = notes
            .get_mut(&note_id)
            .ok_or(CommitError::NoteNotFound(note_id))?;
        note.content = new_content.to_string();
        self.committed.borrow_mut().push(note_id);
        Ok(())
    }
}
