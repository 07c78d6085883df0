// src/record.rs
// =============================================================================
// Link records: one row from the record provider, checked once per run.
//
// A row is turned into a LinkRecord as soon as the provider yields it. Rows
// without a URL are dropped here with a warning; everything else (including
// URLs that are obviously garbage) becomes a record, because a malformed URL
// is an outcome of the check, not a reason to skip the row.
// =============================================================================

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// A raw row as the provider returns it: `(id, owner_id, name, url)`.
///
/// `name` and `url` are optional because the backing store may hold NULLs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawRow {
    pub id: i64,
    pub owner_id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Raised when a row has no usable URL.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("record {id} (owner {owner_id}) has no URL")]
pub struct InvalidRecord {
    pub id: i64,
    pub owner_id: i64,
}

// One link to check. Immutable once built: fields are private and only
// exposed through getters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRecord {
    id: i64,
    owner_id: i64,
    name: String,
    #[serde(rename = "url")]
    raw_url: String,
}

impl LinkRecord {
    /// Builds a record, failing with `InvalidRecord` when the URL is missing (NULL).
    ///
    /// An empty string is still a record; the check reports it as a malformed URL.
    pub fn new(
        id: i64,
        owner_id: i64,
        name: impl Into<String>,
        raw_url: Option<String>,
    ) -> Result<Self, InvalidRecord> {
        match raw_url {
            Some(raw_url) => Ok(Self {
                id,
                owner_id,
                name: name.into(),
                raw_url,
            }),
            None => Err(InvalidRecord { id, owner_id }),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn owner_id(&self) -> i64 {
        self.owner_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn raw_url(&self) -> &str {
        &self.raw_url
    }
}

impl TryFrom<RawRow> for LinkRecord {
    type Error = InvalidRecord;

    fn try_from(row: RawRow) -> Result<Self, Self::Error> {
        LinkRecord::new(row.id, row.owner_id, row.name.unwrap_or_default(), row.url)
    }
}

// Converts provider rows into records, dropping (and warning about) the
// ones without a URL. Never fails as a whole.
pub fn ingest(rows: Vec<RawRow>) -> Vec<LinkRecord> {
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        match LinkRecord::try_from(row) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping row: {}", e),
        }
    }

    records
}
