//! Candidate selection and backlink resolution.
//!
//! # Responsibility
//! - Find notes that declare a backlinks section and are not trashed.
//! - Resolve each candidate's declared search terms into its deduplicated
//!   backlink set.
//!
//! # Invariants
//! - Candidate and backlink membership are keyed by note identity.
//! - A failed search propagates; it is never flattened into an empty set.
//! - Resolution is read-only and idempotent for a fixed store state.

use crate::model::note::{BacklinkSet, Note};
use crate::store::{NoteStore, StoreResult};
use log::debug;
use std::collections::HashSet;

/// Phrase searched to find notes declaring a backlinks section. False
/// positives (the phrase in running text without the exact header line)
/// are weeded out later by the splicer's missing-header skip.
pub const BACKLINKS_QUERY: &str = "## Backlinks";

/// What to do with backlink references that point at trashed notes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrashedRefPolicy {
    /// List them like any other reference.
    #[default]
    Keep,
    /// Resolve each reference and drop the trashed ones.
    Drop,
}

/// Read-only service over a note store for selection and resolution.
pub struct BacklinkService<'a, S: NoteStore> {
    store: &'a S,
    trashed_refs: TrashedRefPolicy,
}

impl<'a, S: NoteStore> BacklinkService<'a, S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: &'a S, trashed_refs: TrashedRefPolicy) -> Self {
        Self {
            store,
            trashed_refs,
        }
    }

    /// Returns every non-trashed note declaring a backlinks section,
    /// deduplicated by id, in store search order.
    ///
    /// Zero candidates is a valid result, not an error.
    pub fn select_candidates(&self) -> StoreResult<Vec<Note>> {
        let hits = self.store.search(BACKLINKS_QUERY)?;
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for reference in hits {
            if !seen.insert(reference.id) {
                continue;
            }
            let note = self.store.resolve(&reference)?;
            if note.trashed {
                continue;
            }
            candidates.push(note);
        }

        debug!(
            "event=select module=backlinks status=ok candidates={}",
            candidates.len()
        );
        Ok(candidates)
    }

    /// Resolves one candidate's backlink set by running every declared
    /// term and unioning the hits by identity.
    pub fn resolve_backlinks(&self, note: &Note) -> StoreResult<BacklinkSet> {
        let mut set = BacklinkSet::new();
        for term in &note.backlink_search_terms {
            for reference in self.store.search(term)? {
                set.insert(reference);
            }
        }

        if self.trashed_refs == TrashedRefPolicy::Drop {
            let mut trashed_ids = HashSet::new();
            for reference in set.iter() {
                if self.store.resolve(reference)?.trashed {
                    trashed_ids.insert(reference.id);
                }
            }
            set.retain(|reference| !trashed_ids.contains(&reference.id));
        }

        debug!(
            "event=resolve module=backlinks status=ok note_id={} backlinks={}",
            note.id,
            set.len()
        );
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::{BacklinkService, TrashedRefPolicy};
    use crate::model::note::Note;
    use crate::store::MemoryNoteStore;

    fn note_with_backlinks_section(title: &str) -> Note {
        Note::new(
            title,
            format!("# {title}\n\nbody\n\n## Backlinks\nstale\n---\nfooter"),
        )
    }

    #[test]
    fn selection_excludes_trashed_notes() {
        let store = MemoryNoteStore::new();
        let live = store.insert(note_with_backlinks_section("Live"));
        let mut trashed = note_with_backlinks_section("Trashed");
        trashed.trashed = true;
        store.insert(trashed);

        let service = BacklinkService::new(&store, TrashedRefPolicy::Keep);
        let candidates = service.select_candidates().expect("selection succeeds");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, live);
    }

    #[test]
    fn selection_of_empty_store_yields_zero_candidates() {
        let store = MemoryNoteStore::new();
        let service = BacklinkService::new(&store, TrashedRefPolicy::Keep);
        assert!(service
            .select_candidates()
            .expect("empty selection is valid")
            .is_empty());
    }

    #[test]
    fn resolution_unions_terms_and_dedups_by_identity() {
        let store = MemoryNoteStore::new();
        let target_id = store.insert(note_with_backlinks_section("Target"));
        let citing = store.insert(Note::new("Citing", "see [[Target]] twice: [[Target]]"));

        let service = BacklinkService::new(&store, TrashedRefPolicy::Keep);
        let target = service
            .select_candidates()
            .expect("selection succeeds")
            .into_iter()
            .find(|note| note.id == target_id)
            .expect("target is a candidate");

        let set = service.resolve_backlinks(&target).expect("resolution succeeds");
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next().expect("one reference").id, citing);
    }

    #[test]
    fn drop_policy_filters_trashed_references() {
        let store = MemoryNoteStore::new();
        store.insert(note_with_backlinks_section("Target"));
        let mut trashed_citing = Note::new("Gone", "mentions [[Target]]");
        trashed_citing.trashed = true;
        store.insert(trashed_citing);
        let live_citing = store.insert(Note::new("Here", "mentions [[Target]]"));

        let keep_service = BacklinkService::new(&store, TrashedRefPolicy::Keep);
        let drop_service = BacklinkService::new(&store, TrashedRefPolicy::Drop);
        let target = keep_service
            .select_candidates()
            .expect("selection succeeds")
            .remove(0);

        assert_eq!(
            keep_service
                .resolve_backlinks(&target)
                .expect("keep resolution succeeds")
                .len(),
            2
        );
        let dropped = drop_service
            .resolve_backlinks(&target)
            .expect("drop resolution succeeds");
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped.iter().next().expect("one reference").id, live_citing);
    }

    #[test]
    fn search_failure_propagates_instead_of_emptying_the_set() {
        let store = MemoryNoteStore::new();
        store.insert(note_with_backlinks_section("Target"));

        let service = BacklinkService::new(&store, TrashedRefPolicy::Keep);
        let target = service
            .select_candidates()
            .expect("selection succeeds")
            .remove(0);

        store.fail_searches_for("[[Target]]");
        assert!(service.resolve_backlinks(&target).is_err());
    }
}
