//! Pre-mutation backups under a run-scoped directory.
//!
//! # Responsibility
//! - Snapshot the original content of every note a run will mutate, before
//!   the first commit.
//!
//! # Invariants
//! - The run directory is created fresh; an existing directory with the
//!   same name is a fatal collision, not something to merge into.
//! - One `<note id>.md` file per note, write-once, never read back by the
//!   run that wrote it.

use crate::model::note::NoteId;
use crate::model::stamp::RunTimestamp;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Backup-layer error.
#[derive(Debug)]
pub enum BackupError {
    /// The run directory already exists; continuing could silently mix
    /// snapshots from two runs.
    DirectoryCollision(PathBuf),
    Io {
        path: PathBuf,
        source: io::Error,
    },
}

impl Display for BackupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectoryCollision(path) => {
                write!(f, "backup directory already exists: {}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "backup write failed at {}: {source}", path.display())
            }
        }
    }
}

impl Error for BackupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DirectoryCollision(_) => None,
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// Writes one backup file per entry under `root/<run dir>` and returns the
/// run directory path.
///
/// Entries carry the ORIGINAL content captured at selection time. The whole
/// set is written before the caller may start committing.
pub fn write_backups(
    root: &Path,
    stamp: &RunTimestamp,
    entries: &[(NoteId, &str)],
) -> Result<PathBuf, BackupError> {
    fs::create_dir_all(root).map_err(|source| BackupError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    let run_dir = root.join(stamp.dir_name());
    if let Err(source) = fs::create_dir(&run_dir) {
        if source.kind() == io::ErrorKind::AlreadyExists {
            return Err(BackupError::DirectoryCollision(run_dir));
        }
        return Err(BackupError::Io {
            path: run_dir,
            source,
        });
    }

    for (note_id, content) in entries {
        let path = run_dir.join(format!("{note_id}.md"));
        fs::write(&path, content).map_err(|source| BackupError::Io { path, source })?;
    }

    info!(
        "event=backup module=backup status=ok notes={} dir={}",
        entries.len(),
        run_dir.display()
    );
    Ok(run_dir)
}
