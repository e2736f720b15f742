//! SQLite-backed note store and commit channel.
//!
//! # Responsibility
//! - Open and bootstrap local note store connections.
//! - Implement literal substring search with deterministic ordering.
//! - Apply full-content commits directly against storage.
//!
//! # Invariants
//! - Returned stores have the schema fully applied.
//! - Search ordering is deterministic: case-folded title, then id.
//! - Commits replace the whole `content` column for exactly one row.

use crate::model::note::{Note, NoteId, NoteReference};
use crate::store::{CommitChannel, CommitError, CommitPacing, NoteStore, StoreError, StoreResult};
use log::{error, info};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::time::{Duration, Instant};
use uuid::Uuid;

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS notes (
    id      TEXT PRIMARY KEY,
    title   TEXT NOT NULL,
    content TEXT NOT NULL,
    trashed INTEGER NOT NULL DEFAULT 0
);";

/// SQLite-backed implementation of [`NoteStore`] and [`CommitChannel`].
pub struct SqliteNoteStore {
    conn: Connection,
}

/// Opens a note store file and applies the schema.
///
/// # Side effects
/// - Emits `store_open` logging events with duration and status.
pub fn open_store(path: impl AsRef<Path>) -> StoreResult<SqliteNoteStore> {
    let started_at = Instant::now();
    info!("event=store_open module=store status=start mode=file");

    let conn = match Connection::open(path) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=store_open module=store status=error mode=file duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&conn) {
        Ok(()) => {
            info!(
                "event=store_open module=store status=ok mode=file duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(SqliteNoteStore { conn })
        }
        Err(err) => {
            error!(
                "event=store_open module=store status=error mode=file duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Opens an in-memory note store and applies the schema.
pub fn open_store_in_memory() -> StoreResult<SqliteNoteStore> {
    let conn = Connection::open_in_memory()?;
    bootstrap_connection(&conn)?;
    info!("event=store_open module=store status=ok mode=memory");
    Ok(SqliteNoteStore { conn })
}

fn bootstrap_connection(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

impl SqliteNoteStore {
    /// Inserts one note row. Used by import paths and tests.
    pub fn insert_note(&self, note: &Note) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO notes (id, title, content, trashed) VALUES (?1, ?2, ?3, ?4);",
            params![
                note.id.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                i64::from(note.trashed),
            ],
        )?;
        Ok(())
    }

    /// Returns the raw content of one note. Audit/test helper.
    pub fn content_of(&self, id: NoteId) -> StoreResult<String> {
        let mut stmt = self
            .conn
            .prepare("SELECT content FROM notes WHERE id = ?1;")?;
        let mut rows = stmt.query(params![id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(row.get(0)?),
            None => Err(StoreError::NoteNotFound(id)),
        }
    }
}

impl NoteStore for SqliteNoteStore {
    fn search(&self, term: &str) -> StoreResult<Vec<NoteReference>> {
        // instr() keeps the match literal; LIKE would treat % and _ in note
        // titles or terms as wildcards.
        let mut stmt = self.conn.prepare(
            "SELECT id, title FROM notes
             WHERE instr(content, ?1) > 0
             ORDER BY lower(title) ASC, id ASC;",
        )?;
        let mut rows = stmt.query(params![term])?;
        let mut references = Vec::new();
        while let Some(row) = rows.next()? {
            references.push(parse_reference(row)?);
        }
        Ok(references)
    }

    fn resolve(&self, reference: &NoteReference) -> StoreResult<Note> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, content, trashed FROM notes WHERE id = ?1;")?;
        let mut rows = stmt.query(params![reference.id.to_string()])?;
        match rows.next()? {
            Some(row) => parse_note(row),
            None => Err(StoreError::NoteNotFound(reference.id)),
        }
    }
}

impl CommitChannel for SqliteNoteStore {
    fn pacing(&self) -> CommitPacing {
        // Direct storage writes need no editor settle time.
        CommitPacing::NONE
    }

    fn commit(&self, note_id: NoteId, new_content: &str) -> Result<(), CommitError> {
        let changed = self.conn.execute(
            "UPDATE notes SET content = ?2 WHERE id = ?1;",
            params![note_id.to_string(), new_content],
        )?;
        if changed == 0 {
            return Err(CommitError::NoteNotFound(note_id));
        }
        Ok(())
    }
}

fn parse_reference(row: &Row<'_>) -> StoreResult<NoteReference> {
    let id = parse_id(row.get::<_, String>("id")?)?;
    Ok(NoteReference::new(id, row.get::<_, String>("title")?))
}

fn parse_note(row: &Row<'_>) -> StoreResult<Note> {
    let id = parse_id(row.get::<_, String>("id")?)?;
    let title: String = row.get("title")?;
    let content: String = row.get("content")?;
    let trashed: i64 = row.get("trashed")?;
    let mut note = Note::with_id(id, title, content);
    note.trashed = trashed != 0;
    Ok(note)
}

fn parse_id(raw: String) -> StoreResult<NoteId> {
    Uuid::parse_str(&raw).map_err(|_| StoreError::InvalidData(format!("invalid note id `{raw}`")))
}
