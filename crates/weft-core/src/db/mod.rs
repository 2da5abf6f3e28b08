//! SQLite-backed property graph store.
//!
//! The weft graph is rendered onto a relational schema: node tables
//! (`persons`, `roles`, `cases`) and relationship tables (`work_events`,
//! `collaborations`, `interactions`). See [`schema`] for the exact shape.
//!
//! Runtime defaults are intentionally conservative:
//! - `journal_mode = WAL` to allow concurrent readers while a load runs
//! - `busy_timeout = 5s` to reduce transient lock failures under contention
//! - `foreign_keys = ON` to protect relational integrity in edge tables
//!
//! Connections are acquired per unit of work and released by RAII on
//! every exit path; there is no pooling and no cached query state.

pub mod loader;
pub mod project;
pub mod query;
pub mod schema;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::{path::Path, time::Duration};

use crate::error::CoreError;

/// Busy timeout used for graph store connections.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (or create) the graph store, apply runtime pragmas, and create
/// the schema if it does not exist yet.
///
/// # Errors
///
/// Returns [`CoreError::StoreUnavailable`] if the database cannot be
/// opened or configured, and a generic error if schema creation fails.
pub fn open_graph(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create graph store directory {}", parent.display()))?;
        }
    }

    let conn = Connection::open(path).map_err(|e| CoreError::StoreUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    configure_connection(&conn).map_err(|e| CoreError::StoreUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    schema::init(&conn).context("create graph schema")?;

    Ok(conn)
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    let _journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    Ok(())
}
