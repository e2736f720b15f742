//! End-to-end backlink update run.
//!
//! # Responsibility
//! - Sequence selection, resolution, rendering and splicing into an ordered
//!   new-content list, then back up and commit.
//! - Report updated-vs-needing-update counts so skips and commit failures
//!   stay observable.
//!
//! # Invariants
//! - Everything before the backup step is read-only; selection or
//!   resolution failures abort the run with nothing touched.
//! - Every backup file is written before the first commit.
//! - Commits run serially, in built order, honoring the channel's pacing.
//! - A commit failure is recorded and the run continues; there is no retry
//!   and no rollback (backups are the recovery path).

use crate::backup::{write_backups, BackupError};
use crate::model::note::NoteId;
use crate::model::stamp::RunTimestamp;
use crate::render::render_backlinks;
use crate::service::backlinks::{BacklinkService, TrashedRefPolicy};
use crate::splice::{splice_backlinks, SkipReason, SpliceOutcome};
use crate::store::{CommitChannel, NoteStore, StoreError};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

/// Run-level configuration threaded in by the caller.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory under which run-scoped backup directories are created.
    pub backups_root: PathBuf,
    /// Policy for backlink references that point at trashed notes.
    pub trashed_refs: TrashedRefPolicy,
}

/// One note excluded from backup-and-commit, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedNote {
    pub note_id: NoteId,
    pub title: String,
    pub reason: SkipReason,
}

/// One note whose commit was rejected by the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitFailure {
    pub note_id: NoteId,
    pub message: String,
}

/// Final accounting for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Notes identified as needing a backlink update.
    pub candidates: usize,
    /// Notes whose new content was committed successfully.
    pub updated: usize,
    /// Notes excluded by the splicer, in candidate order.
    pub skipped: Vec<SkippedNote>,
    /// Commits rejected by the channel, in commit order.
    pub commit_failures: Vec<CommitFailure>,
    /// Run backup directory; `None` when no note needed mutation.
    pub backup_dir: Option<PathBuf>,
}

/// Fatal run error. Recoverable per-note conditions never surface here;
/// they land in [`RunReport`] instead.
#[derive(Debug)]
pub enum RunError {
    /// Candidate selection failed.
    Selection(StoreError),
    /// Backlink resolution failed for one note; treating the failure as an
    /// empty set would corrupt that note with a false negative, so the run
    /// stops before mutating anything.
    Resolution { note_id: NoteId, source: StoreError },
    Backup(BackupError),
}

impl Display for RunError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Selection(err) => write!(f, "candidate selection failed: {err}"),
            Self::Resolution { note_id, source } => {
                write!(f, "backlink resolution failed for note {note_id}: {source}")
            }
            Self::Backup(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Selection(err) => Some(err),
            Self::Resolution { source, .. } => Some(source),
            Self::Backup(err) => Some(err),
        }
    }
}

impl From<BackupError> for RunError {
    fn from(value: BackupError) -> Self {
        Self::Backup(value)
    }
}

/// Executes one full run: select, resolve, render, splice, back up, commit.
///
/// `stamp` must be captured once by the caller; it names the backup
/// directory and dates every rendered fragment of this run.
pub fn run_backlink_update<S: NoteStore, C: CommitChannel>(
    store: &S,
    channel: &C,
    config: &RunConfig,
    stamp: &RunTimestamp,
) -> Result<RunReport, RunError> {
    let service = BacklinkService::new(store, config.trashed_refs);
    let candidates = service.select_candidates().map_err(RunError::Selection)?;
    info!(
        "event=run module=run status=start candidates={}",
        candidates.len()
    );

    let mut updates: Vec<(NoteId, String)> = Vec::new();
    let mut originals: Vec<(NoteId, &str)> = Vec::new();
    let mut skipped = Vec::new();
    for note in &candidates {
        let set = service
            .resolve_backlinks(note)
            .map_err(|source| RunError::Resolution {
                note_id: note.id,
                source,
            })?;
        let fragment = render_backlinks(&set, stamp);
        match splice_backlinks(note.id, &note.content, &fragment) {
            SpliceOutcome::Updated(new_content) => {
                originals.push((note.id, note.content.as_str()));
                updates.push((note.id, new_content));
            }
            SpliceOutcome::Skipped(reason) => {
                warn!(
                    "event=splice module=run status=skipped note_id={} title={:?} reason={}",
                    note.id, note.title, reason
                );
                skipped.push(SkippedNote {
                    note_id: note.id,
                    title: note.title.clone(),
                    reason,
                });
            }
        }
    }

    let backup_dir = if updates.is_empty() {
        None
    } else {
        Some(write_backups(&config.backups_root, stamp, &originals)?)
    };

    let pacing = channel.pacing();
    let mut updated = 0usize;
    let mut commit_failures = Vec::new();
    for (note_id, new_content) in &updates {
        pause(pacing.settle_before);
        match channel.commit(*note_id, new_content) {
            Ok(()) => {
                debug!("event=commit module=run status=ok note_id={note_id}");
                updated += 1;
            }
            Err(err) => {
                error!(
                    "event=commit module=run status=error note_id={note_id} error={err}"
                );
                commit_failures.push(CommitFailure {
                    note_id: *note_id,
                    message: err.to_string(),
                });
            }
        }
        pause(pacing.settle_after);
    }

    let report = RunReport {
        candidates: candidates.len(),
        updated,
        skipped,
        commit_failures,
        backup_dir,
    };
    info!(
        "event=run module=run status=ok updated={} needing_update={} skipped={} commit_failures={}",
        report.updated,
        report.candidates,
        report.skipped.len(),
        report.commit_failures.len()
    );
    Ok(report)
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}
