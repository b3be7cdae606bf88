//! Blind XSS callback collector
//!
//! Ingest endpoints for beacon and screenshot callbacks, a swappable record
//! store, and the admin console (HTML page, JSON API and CLI).

pub mod admin;
pub mod app;
pub mod config;
pub mod console;
pub mod error;
pub mod health;
pub mod ingest;
pub mod logging;
pub mod store;

pub use app::{build_router, AppState, SharedState};
pub use config::{CollectorConfig, ConfigError, CorsConfig, StoreConfig};
pub use console::{AdminConsole, ConsoleError, PurgeOutcome};
pub use error::ApiError;
pub use store::{PostgrestStore, RecordStore, SqliteStore, StoreError};
