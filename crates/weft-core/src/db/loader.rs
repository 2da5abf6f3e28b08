//! Event-log file ingestion into the graph store.
//!
//! [`Loader`] streams a log file through the row parser and writes the
//! accepted records into the graph: Person/Role/Case nodes are upserted
//! (`persons.role` is last-write-wins), WORKED_ON rows are *inserted*,
//! never merged — reloading the same file doubles its `work_events` rows.
//!
//! Each file load is one transaction: a failure mid-file rolls back that
//! file only; rows from previously loaded files stay committed. Rejected
//! rows (missing required field, bad timestamp) are counted and logged at
//! `debug`, and never abort the batch.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use serde::Serialize;

use crate::error::CoreError;
use crate::event::parser::{parse_header, parse_row};

// ---------------------------------------------------------------------------
// LoadStats
// ---------------------------------------------------------------------------

/// Row counts returned after loading one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Rows parsed and written to the graph.
    pub accepted: usize,
    /// Rows rejected (missing required field or unparseable timestamp).
    pub skipped: usize,
}

impl LoadStats {
    /// Merge counts from another file's load into this one.
    pub fn absorb(&mut self, other: Self) {
        self.accepted += other.accepted;
        self.skipped += other.skipped;
    }
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Writes parsed work events into the graph store.
pub struct Loader<'conn> {
    conn: &'conn Connection,
}

impl<'conn> Loader<'conn> {
    /// Create a loader backed by the given connection.
    #[must_use]
    pub const fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Delete every node and relationship in the graph.
    ///
    /// Destructive and immediate; there is no confirmation and no backup.
    ///
    /// # Errors
    ///
    /// Returns an error if any delete statement fails; in that case the
    /// transaction rolls back and the graph is unchanged.
    pub fn clear(&self) -> Result<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("begin clear transaction")?;

        // Relationship tables first to satisfy foreign keys.
        for table in [
            "work_events",
            "collaborations",
            "interactions",
            "persons",
            "cases",
            "roles",
        ] {
            tx.execute(&format!("DELETE FROM {table}"), [])
                .with_context(|| format!("clear table {table}"))?;
        }

        tx.commit().context("commit clear transaction")?;
        tracing::info!("graph cleared");
        Ok(())
    }

    /// Load one event-log file, returning accepted/skipped row counts.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SourceFileNotFound`] when `path` does not
    /// exist, [`CoreError::HeaderMissingColumn`] when the header lacks a
    /// required column, and a generic error if reading or writing fails.
    /// On error the file's transaction rolls back.
    pub fn load_file(&self, path: &Path) -> Result<LoadStats> {
        if !path.exists() {
            return Err(CoreError::SourceFileNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let file =
            File::open(path).with_context(|| format!("open event log {}", path.display()))?;
        let mut lines = BufReader::new(file).lines();

        let header_line = match lines.next() {
            Some(line) => line.with_context(|| format!("read header of {}", path.display()))?,
            None => return Ok(LoadStats::default()),
        };
        let header = parse_header(&header_line).map_err(|e| CoreError::HeaderMissingColumn {
            path: path.to_path_buf(),
            column: e.column,
        })?;

        let source_file = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

        let tx = self
            .conn
            .unchecked_transaction()
            .context("begin load transaction")?;

        let mut stats = LoadStats::default();
        {
            let mut upsert_person = tx.prepare(
                "INSERT INTO persons (name, role) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET role = excluded.role",
            )?;
            let mut upsert_role = tx.prepare("INSERT OR IGNORE INTO roles (name) VALUES (?1)")?;
            let mut upsert_case =
                tx.prepare("INSERT OR IGNORE INTO cases (case_id) VALUES (?1)")?;
            let mut insert_event = tx.prepare(
                "INSERT INTO work_events
                     (person, case_id, activity, ts_us, month, hour, weekday, source_file)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;

            for (line_no, line) in lines.enumerate() {
                let line =
                    line.with_context(|| format!("read line of {}", path.display()))?;
                if line.trim().is_empty() {
                    continue;
                }

                let record = match parse_row(&header, &line) {
                    Ok(record) => record,
                    Err(reason) => {
                        tracing::debug!(
                            file = %source_file,
                            line = line_no + 2,
                            %reason,
                            "skipping row"
                        );
                        stats.skipped += 1;
                        continue;
                    }
                };

                upsert_person.execute(params![record.resource, record.role])?;
                upsert_role.execute(params![record.role])?;
                upsert_case.execute(params![record.case_id])?;
                insert_event.execute(params![
                    record.resource,
                    record.case_id,
                    record.activity,
                    record.ts_us(),
                    record.month,
                    record.hour,
                    record.weekday,
                    source_file,
                ])?;
                stats.accepted += 1;
            }
        }

        tx.commit()
            .with_context(|| format!("commit load of {}", path.display()))?;

        tracing::info!(
            file = %source_file,
            accepted = stats.accepted,
            skipped = stats.skipped,
            "event log loaded"
        );
        Ok(stats)
    }
}
