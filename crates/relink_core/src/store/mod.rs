//! Note store and editor-commit boundaries.
//!
//! # Responsibility
//! - Define the search/resolve contract the backlink engine reads through.
//! - Define the commit contract mutations are applied through, including
//!   the pacing the channel requires around each commit.
//!
//! # Invariants
//! - Store reads must be deterministic within a run.
//! - A failed search is reported as an error, never as an empty result set;
//!   the two have different correctness implications for callers.
//! - Commit implementations replace full note content, nothing partial.

use crate::model::note::{Note, NoteId, NoteReference};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryNoteStore;
pub use sqlite::{open_store, open_store_in_memory, SqliteNoteStore};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-layer error for search, resolution and row decoding.
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    NoteNotFound(NoteId),
    /// Persisted state that cannot be decoded into a valid note.
    InvalidData(String),
    /// Failure reported by an external store backend.
    Backend(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::Backend(message) => write!(f, "store backend failure: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Error reported by an editor-commit channel.
#[derive(Debug)]
pub enum CommitError {
    NoteNotFound(NoteId),
    Sqlite(rusqlite::Error),
    /// Failure reported by an external editor channel.
    Channel(String),
}

impl Display for CommitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(id) => write!(f, "commit target not found: {id}"),
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Channel(message) => write!(f, "editor channel failure: {message}"),
        }
    }
}

impl Error for CommitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for CommitError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Settle delays a commit channel requires around each commit.
///
/// Channels backed by a UI-driven editor need the underlying application to
/// settle between operations; the delays are part of the channel's contract,
/// not of the engine, so each implementation declares its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitPacing {
    /// Pause before handing content to the channel.
    pub settle_before: Duration,
    /// Pause after the channel reports completion.
    pub settle_after: Duration,
}

impl CommitPacing {
    /// No pacing; suitable for direct-write channels.
    pub const NONE: Self = Self {
        settle_before: Duration::ZERO,
        settle_after: Duration::ZERO,
    };

    /// Pacing for channels that drive an interactive editor application.
    pub const fn ui_editor() -> Self {
        Self {
            settle_before: Duration::from_millis(500),
            settle_after: Duration::from_millis(500),
        }
    }
}

/// Read-side contract: resolve query strings and references to notes.
///
/// Implementations must be deterministic for the duration of one run.
pub trait NoteStore {
    /// Returns every note whose content matches `term`.
    fn search(&self, term: &str) -> StoreResult<Vec<NoteReference>>;

    /// Resolves a reference to the full note entity.
    fn resolve(&self, reference: &NoteReference) -> StoreResult<Note>;
}

/// Write-side contract: apply new full content for one note.
///
/// Callers must observe [`CommitChannel::pacing`] before and after each
/// commit and must invoke commits strictly one at a time.
pub trait CommitChannel {
    /// Settle delays this channel requires around each commit.
    fn pacing(&self) -> CommitPacing {
        CommitPacing::NONE
    }

    /// Replaces the full content of `note_id`.
    fn commit(&self, note_id: NoteId, new_content: &str) -> Result<(), CommitError>;
}
