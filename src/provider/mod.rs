// src/provider/mod.rs
// =============================================================================
// Record providers: where the links to check come from.
//
// - mysql: the Moodle database (`SELECT id, course, name, externalurl ...`)
// - file: a JSON file with the same row shape, handy for one-off audits
//
// A provider is opened explicitly, asked for its rows once, and closed.
// Failing to open or read a provider is the only error that stops a run.
// =============================================================================

mod file;
mod mysql;

pub use file::FileProvider;
pub use mysql::{MySqlProvider, MySqlSettings};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::record::RawRow;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("could not connect to the database: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("timed out after {0:?} connecting to the database")]
    Timeout(Duration),
    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),
    #[error("invalid table name '{0}' (only letters, digits and '_' are allowed)")]
    InvalidTable(String),
    #[error("provider is already closed")]
    Closed,
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A finite source of link rows.
#[async_trait]
pub trait RecordProvider: Send {
    /// Returns every row the provider has.
    async fn next_records(&mut self) -> Result<Vec<RawRow>, ProviderError>;

    /// Releases whatever the provider holds. Safe to call more than once.
    async fn close(&mut self) -> Result<(), ProviderError> {
        Ok(())
    }
}
