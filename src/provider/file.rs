// src/provider/file.rs
// Reads rows from a JSON file:
//
//   [
//     {"id": 1, "owner_id": 12, "name": "Syllabus", "url": "https://example.com/a"},
//     {"id": 2, "owner_id": 12, "name": "Slides", "url": null}
//   ]

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use super::{ProviderError, RecordProvider};
use crate::record::RawRow;

pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RecordProvider for FileProvider {
    async fn next_records(&mut self) -> Result<Vec<RawRow>, ProviderError> {
        let path_text = self.path.display().to_string();

        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| ProviderError::Io {
                path: path_text.clone(),
                source,
            })?;

        let rows: Vec<RawRow> =
            serde_json::from_str(&text).map_err(|source| ProviderError::Parse {
                path: path_text.clone(),
                source,
            })?;

        info!("Read {} row(s) from {}", rows.len(), path_text);
        Ok(rows)
    }
}
