use std::fmt;
use std::path::PathBuf;

/// Machine-readable error codes for scripted and agent callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    SourceFileNotFound,
    HeaderMissingColumn,
    StoreUnavailable,
    QueryFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::SourceFileNotFound => "E2001",
            Self::HeaderMissingColumn => "E2002",
            Self::StoreUnavailable => "E3001",
            Self::QueryFailed => "E4001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::SourceFileNotFound => "Event log file not found",
            Self::HeaderMissingColumn => "Event log header missing required column",
            Self::StoreUnavailable => "Graph store unavailable",
            Self::QueryFailed => "Analytics query failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in weft.toml and retry."),
            Self::SourceFileNotFound => Some("Check the path passed to `wf load`/`wf reload`."),
            Self::HeaderMissingColumn => {
                Some("The header row must contain CaseID, timestamp, Resource, Role, NameActivity.")
            }
            Self::StoreUnavailable => Some("Check the --db path and write permissions."),
            Self::QueryFailed => Some("Run `wf reload` to rebuild the graph, then retry."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Typed failures raised by the core pipeline.
///
/// Each variant maps to exactly one [`ErrorCode`], which the CLI surfaces
/// alongside the human-readable message.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("failed to parse config at {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    #[error("event log file not found: {path}")]
    SourceFileNotFound { path: PathBuf },

    #[error("event log {path} is missing required column '{column}'")]
    HeaderMissingColumn { path: PathBuf, column: String },

    #[error("graph store unavailable at {path}: {reason}")]
    StoreUnavailable { path: PathBuf, reason: String },
}

impl CoreError {
    /// The machine-readable code for this failure.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Self::SourceFileNotFound { .. } => ErrorCode::SourceFileNotFound,
            Self::HeaderMissingColumn { .. } => ErrorCode::HeaderMissingColumn,
            Self::StoreUnavailable { .. } => ErrorCode::StoreUnavailable,
        }
    }
}
