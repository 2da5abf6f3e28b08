//! Shared output layer for human/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its
//! result accordingly: aligned text for humans, stable JSON for scripts.
//! Errors render once, to stderr, with their machine-readable code.

use serde::Serialize;
use std::io::{self, Write};

use weft_core::{CoreError, ErrorCode};

/// Shared width for human output separators.
pub const RULE_WIDTH: usize = 64;

/// The two output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text (tables, sections).
    Human,
    /// Machine-readable JSON (one value per invocation).
    Json,
}

impl OutputMode {
    /// Derive the output mode from the global `--json` flag.
    #[must_use]
    pub const fn resolve(json_flag: bool) -> Self {
        if json_flag { Self::Json } else { Self::Human }
    }
}

/// Write a horizontal separator used by human output.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = RULE_WIDTH)
}

/// Write a section heading followed by a separator.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    rule(w)
}

/// Render a left-aligned key/value line in human output.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<20} {}", format!("{key}:"), value.as_ref())
}

/// Render `value` to stdout: serde JSON in [`OutputMode::Json`], the
/// given closure otherwise.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut w = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut w, value)?;
            writeln!(w)?;
        }
        OutputMode::Human => human(value, &mut w)?,
    }
    Ok(())
}

/// Report a failure once, to stderr, with its machine-readable code and
/// optional remediation hint.
pub fn render_error(err: &anyhow::Error, fallback: ErrorCode) {
    let code = err
        .downcast_ref::<CoreError>()
        .map_or(fallback, CoreError::code);

    eprintln!("error[{code}]: {err:#}");
    if let Some(hint) = code.hint() {
        eprintln!("hint: {hint}");
    }
}
