//! Record store abstraction.
//!
//! The store is an external collaborator: a table of [`IngestRecord`]s
//! addressable by id and by url. Backends are swappable and untrusted, so
//! every backend hands back fully typed records and reports shape
//! mismatches as [`StoreError::Malformed`].

mod postgrest;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use xss_core::{IngestRecord, NewRecord};

use crate::config::StoreConfig;

pub use postgrest::PostgrestStore;
pub use sqlite::SqliteStore;

/// An id no store ever assigns. `id <> NO_SUCH_ID` matches every row.
pub const NO_SUCH_ID: i64 = -1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("request to record store failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("record store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed response from record store: {0}")]
    Malformed(String),

    #[error("cannot create store directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("store connection lock poisoned")]
    Poisoned,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a record and return it with its assigned id.
    async fn insert(&self, record: NewRecord) -> Result<IngestRecord, StoreError>;

    /// Set `screenshot` on every record whose url equals `url`. Returns the
    /// updated rows; an empty vec when nothing matched.
    async fn update_screenshot_by_url(
        &self,
        url: &str,
        screenshot: Option<&str>,
    ) -> Result<Vec<IngestRecord>, StoreError>;

    /// Set `screenshot` on the record `id`, provided its url equals `url`.
    async fn update_screenshot_by_id(
        &self,
        id: i64,
        url: &str,
        screenshot: Option<&str>,
    ) -> Result<Vec<IngestRecord>, StoreError>;

    /// Every record, all columns.
    async fn list(&self) -> Result<Vec<IngestRecord>, StoreError>;

    /// Delete one record. `Ok(false)` when the id did not exist.
    async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError>;

    /// Delete every record (`id <> NO_SUCH_ID`). Returns the number removed.
    async fn delete_all(&self) -> Result<usize, StoreError>;

    /// Cheap reachability check used by `/health`.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Open the backend described by `config`.
pub fn open(config: &StoreConfig) -> Result<Arc<dyn RecordStore>, StoreError> {
    match config {
        StoreConfig::Sqlite { path } => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            tracing::info!("Record store: sqlite {:?}", path);
            Ok(Arc::new(SqliteStore::open(path)?))
        }
        StoreConfig::Postgrest { url, api_key, table } => {
            tracing::info!("Record store: postgrest {} (table {})", url, table);
            Ok(Arc::new(PostgrestStore::new(url, api_key, table)?))
        }
    }
}
