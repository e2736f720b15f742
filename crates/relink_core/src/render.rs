//! Deterministic markdown rendering of a backlink set.
//!
//! # Responsibility
//! - Turn one note's backlink set into the replacement fragment for its
//!   backlinks region.
//!
//! # Invariants
//! - Pure: identical set + timestamp yields byte-identical output.
//! - List entries are ordered case-insensitively by title; equal keys keep
//!   their first-seen order (stable sort).
//! - An empty set renders the placeholder sentence, never an empty list.

use crate::model::note::BacklinkSet;
use crate::model::stamp::RunTimestamp;

/// Sentence emitted when a note has no backlinks.
pub const NO_BACKLINKS_PLACEHOLDER: &str = "_No backlinks found._\n";

/// Renders the replacement fragment for one note's backlinks region.
pub fn render_backlinks(set: &BacklinkSet, stamp: &RunTimestamp) -> String {
    let mut fragment = String::new();

    if set.is_empty() {
        fragment.push_str(NO_BACKLINKS_PLACEHOLDER);
    } else {
        let mut references: Vec<_> = set.iter().collect();
        references.sort_by_key(|reference| reference.title.to_lowercase());
        for reference in references {
            fragment.push_str("- [[");
            fragment.push_str(&reference.wiki_title());
            fragment.push_str("]]\n");
        }
    }

    fragment.push('\n');
    fragment.push_str("_Backlinks calculated ");
    fragment.push_str(&stamp.human());
    fragment.push_str("._\n\n");
    fragment
}

#[cfg(test)]
mod tests {
    use super::{render_backlinks, NO_BACKLINKS_PLACEHOLDER};
    use crate::model::note::{BacklinkSet, NoteReference};
    use crate::model::stamp::RunTimestamp;
    use chrono::{Local, TimeZone};
    use uuid::Uuid;

    fn stamp() -> RunTimestamp {
        let datetime = Local
            .with_ymd_and_hms(2024, 6, 1, 15, 0, 0)
            .single()
            .expect("unambiguous local datetime");
        RunTimestamp::from_datetime(datetime)
    }

    fn set_of(titles: &[&str]) -> BacklinkSet {
        let mut set = BacklinkSet::new();
        for title in titles {
            set.insert(NoteReference::new(Uuid::new_v4(), *title));
        }
        set
    }

    #[test]
    fn empty_set_renders_placeholder_and_timestamp() {
        let fragment = render_backlinks(&BacklinkSet::new(), &stamp());
        assert_eq!(
            fragment,
            "_No backlinks found._\n\n_Backlinks calculated June 1, 2024 at 3:00 PM._\n\n"
        );
        assert!(fragment.starts_with(NO_BACKLINKS_PLACEHOLDER));
    }

    #[test]
    fn list_is_sorted_case_insensitively() {
        let fragment = render_backlinks(&set_of(&["Zebra", "apple"]), &stamp());
        assert_eq!(
            fragment,
            "- [[apple]]\n- [[Zebra]]\n\n_Backlinks calculated June 1, 2024 at 3:00 PM._\n\n"
        );
    }

    #[test]
    fn equal_keys_keep_first_seen_order() {
        let first = NoteReference::new(Uuid::new_v4(), "Same");
        let second = NoteReference::new(Uuid::new_v4(), "same");
        let mut set = BacklinkSet::new();
        set.insert(first.clone());
        set.insert(second.clone());

        let fragment = render_backlinks(&set, &stamp());
        let first_at = fragment.find("[[Same]]").expect("first entry rendered");
        let second_at = fragment.find("[[same]]").expect("second entry rendered");
        assert!(first_at < second_at);
    }

    #[test]
    fn titles_are_escaped_in_list_entries() {
        let fragment = render_backlinks(&set_of(&["Topics/Rust"]), &stamp());
        assert!(fragment.contains(r"- [[Topics\/Rust]]"));
    }

    #[test]
    fn rendering_is_idempotent_for_identical_inputs() {
        let set = set_of(&["beta", "Alpha"]);
        assert_eq!(
            render_backlinks(&set, &stamp()),
            render_backlinks(&set, &stamp())
        );
    }
}
