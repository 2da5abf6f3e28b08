//! Delimited event-log row parser.
//!
//! Parses semicolon-delimited log lines into [`WorkRecord`] values. The
//! header line is resolved once per file into a [`Header`] column map;
//! data rows are then parsed positionally against it.
//!
//! # Lenient ingestion
//!
//! Row-level problems (missing required field, unparseable timestamp)
//! yield a typed [`RowError`] so the caller can count and skip them
//! without failing the batch. Only a malformed *header* is a hard error:
//! without the required columns no row in the file can be interpreted.
//!
//! # Timestamp format
//!
//! `M-D-YY H:MM` — non-zero-padded month/day, two-digit year, 24-hour
//! clock (e.g. `4-24-19 15:00`). Two-digit years map 69–99 to 19xx and
//! 00–68 to 20xx.

use std::fmt;

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::event::WorkRecord;

// ---------------------------------------------------------------------------
// Format constants
// ---------------------------------------------------------------------------

/// Field delimiter used by weft event logs.
pub const FIELD_DELIMITER: char = ';';

/// `strftime`-style format of the `timestamp` column.
pub const TIMESTAMP_FORMAT: &str = "%m-%d-%y %H:%M";

/// Columns the header row must provide, in no particular order.
pub const REQUIRED_COLUMNS: [&str; 5] =
    ["CaseID", "timestamp", "Resource", "Role", "NameActivity"];

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Error returned when the header row cannot satisfy [`REQUIRED_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderError {
    /// The first required column that was not found.
    pub column: String,
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "header is missing required column '{}': expected CaseID, timestamp, \
             Resource, Role, NameActivity",
            self.column
        )
    }
}

impl std::error::Error for HeaderError {}

/// Row-level rejection reasons. Rows failing with these are skipped, not
/// fatal; the loader counts them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    /// The `CaseID` field is absent or empty.
    MissingCaseId,
    /// The `timestamp` field is absent or empty.
    MissingTimestamp,
    /// The `Resource` field is absent or empty.
    MissingResource,
    /// The `timestamp` field did not match [`TIMESTAMP_FORMAT`].
    BadTimestamp(String),
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCaseId => f.write_str("row has no CaseID"),
            Self::MissingTimestamp => f.write_str("row has no timestamp"),
            Self::MissingResource => f.write_str("row has no Resource"),
            Self::BadTimestamp(raw) => {
                write!(f, "timestamp '{raw}' does not match {TIMESTAMP_FORMAT}")
            }
        }
    }
}

impl std::error::Error for RowError {}

// ---------------------------------------------------------------------------
// Header resolution
// ---------------------------------------------------------------------------

/// Column positions resolved from a log file's header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    case_id: usize,
    timestamp: usize,
    resource: usize,
    role: usize,
    activity: usize,
}

/// Resolve the header line into column positions.
///
/// Column names are matched exactly after trimming surrounding
/// whitespace. Extra columns are ignored.
///
/// # Errors
///
/// Returns [`HeaderError`] naming the first required column that is
/// absent from the line.
pub fn parse_header(line: &str) -> Result<Header, HeaderError> {
    let columns: Vec<&str> = line.split(FIELD_DELIMITER).map(str::trim).collect();

    let position = |name: &str| -> Result<usize, HeaderError> {
        columns
            .iter()
            .position(|c| *c == name)
            .ok_or_else(|| HeaderError {
                column: name.to_string(),
            })
    };

    Ok(Header {
        case_id: position("CaseID")?,
        timestamp: position("timestamp")?,
        resource: position("Resource")?,
        role: position("Role")?,
        activity: position("NameActivity")?,
    })
}

// ---------------------------------------------------------------------------
// Row parsing
// ---------------------------------------------------------------------------

/// Parse one data row against a resolved [`Header`].
///
/// A field is considered missing when its column is absent from the row
/// or holds the empty string. `Role` and `NameActivity` may be empty;
/// `CaseID`, `timestamp`, and `Resource` may not.
///
/// # Errors
///
/// Returns a [`RowError`] describing why the row must be skipped.
pub fn parse_row(header: &Header, line: &str) -> Result<WorkRecord, RowError> {
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    let field = |idx: usize| fields.get(idx).copied().unwrap_or_default();

    let case_id = field(header.case_id);
    if case_id.is_empty() {
        return Err(RowError::MissingCaseId);
    }

    let raw_ts = field(header.timestamp);
    if raw_ts.is_empty() {
        return Err(RowError::MissingTimestamp);
    }

    let resource = field(header.resource);
    if resource.is_empty() {
        return Err(RowError::MissingResource);
    }

    let ts = NaiveDateTime::parse_from_str(raw_ts, TIMESTAMP_FORMAT)
        .map_err(|_| RowError::BadTimestamp(raw_ts.to_string()))?;

    Ok(WorkRecord {
        case_id: case_id.to_string(),
        resource: resource.to_string(),
        role: field(header.role).to_string(),
        activity: field(header.activity).to_string(),
        month: format!("{:04}-{:02}", ts.year(), ts.month()),
        hour: ts.hour(),
        weekday: ts.weekday().number_from_monday(),
        ts,
    })
}
