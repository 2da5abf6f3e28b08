//! weft-core library.
//!
//! Event-log ingestion and organizational graph analytics:
//!
//! - [`event`] parses delimited work-event log rows into typed records
//! - [`db`] owns the SQLite-backed property graph: schema, loader,
//!   relationship projector, and the analytics query set
//! - [`config`] loads the optional `weft.toml` project config
//! - [`error`] carries machine-readable error codes for scripted callers
//!
//! # Conventions
//!
//! - **Errors**: typed leaf errors via `thiserror`; `anyhow::Result` with
//!   context at operation boundaries.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).

pub mod config;
pub mod db;
pub mod error;
pub mod event;

pub use db::loader::{LoadStats, Loader};
pub use db::project::{ProjectionStats, Projector};
pub use error::{CoreError, ErrorCode};
pub use event::WorkRecord;
