//! Work-event data model for the weft event log.
//!
//! A weft event log is a semicolon-delimited CSV with a header row naming
//! at least `CaseID`, `timestamp`, `Resource`, `Role`, `NameActivity`.
//! Each data row records one person performing one activity on one case
//! at one point in time:
//!
//! ```text
//! CaseID;timestamp;Resource;Role;NameActivity
//! case-001;4-24-19 15:00;Alice;Developer;Commit Code
//! ```
//!
//! Parsing a row yields a [`WorkRecord`], with the calendar-month bucket
//! and clock fields pre-derived so the graph store never has to re-parse
//! timestamps. Rows with missing required fields or unparseable timestamps
//! are rejected row-by-row (skip, don't fail the batch) by the parser.

pub mod parser;

pub use parser::{Header, HeaderError, RowError, parse_header, parse_row};

use chrono::NaiveDateTime;

/// Microseconds per second, for wall-clock storage columns.
const MICROS_PER_SEC: i64 = 1_000_000;

/// A single accepted row from a work-event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkRecord {
    /// Case (process instance) identifier, externally supplied.
    pub case_id: String,
    /// Name of the person who performed the activity.
    pub resource: String,
    /// Role the person held when the row was written. May be empty.
    pub role: String,
    /// Activity name. May be empty.
    pub activity: String,
    /// Parsed event timestamp (naive local time, as recorded in the log).
    pub ts: NaiveDateTime,
    /// Calendar-month bucket, `YYYY-MM`.
    pub month: String,
    /// Hour of day, 0–23.
    pub hour: u32,
    /// Day of week, 1 = Monday … 7 = Sunday.
    pub weekday: u32,
}

impl WorkRecord {
    /// Wall-clock timestamp in microseconds since the Unix epoch.
    #[must_use]
    pub fn ts_us(&self) -> i64 {
        self.ts.and_utc().timestamp() * MICROS_PER_SEC
    }
}
