//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `scene.db` file in the configured output directory with
//! two tables: `checkpoints` and `ensemble_events`.

use std::path::Path;

use rusqlite::Connection;

use rv_events::EnsembleEvent;

use crate::writer::OutputWriter;
use crate::{CheckpointRow, OutputResult};

/// Writes an imported scene to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `scene.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("scene.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS checkpoints (
                 person  TEXT NOT NULL,
                 time    REAL NOT NULL,
                 kind    TEXT NOT NULL,
                 vehicle TEXT,
                 link    TEXT
             );
             CREATE INDEX IF NOT EXISTS checkpoints_person ON checkpoints (person, time);
             CREATE TABLE IF NOT EXISTS ensemble_events (
                 time        REAL    NOT NULL,
                 coordinator TEXT    NOT NULL,
                 member      TEXT    NOT NULL,
                 ensemble    TEXT    NOT NULL,
                 membership  INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_checkpoints(&mut self, rows: &[CheckpointRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO checkpoints (person, time, kind, vehicle, link) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.person,
                    row.time,
                    row.kind.as_str(),
                    row.vehicle,
                    row.link,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_ensemble_events(&mut self, events: &[EnsembleEvent]) -> OutputResult<()> {
        if events.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO ensemble_events (time, coordinator, member, ensemble, membership) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for e in events {
                stmt.execute(rusqlite::params![
                    e.time,
                    e.coordinator,
                    e.member,
                    e.ensemble,
                    e.membership as i64
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
