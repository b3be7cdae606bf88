//! Collector configuration
//!
//! Layered as: built-in defaults, then an optional YAML file, then
//! `XSS_COLLECTOR_*` environment variables, then command-line flags
//! (applied by the binary).

use std::path::{Path, PathBuf};

use axum::http::{header, HeaderValue, Method};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::cors::{AllowOrigin, CorsLayer};
use xss_core::payload::DEFAULT_SCREENSHOT_LIBRARY;
use xss_core::{OffsetError, PayloadSettings, TriggerClock, RECORD_TABLE};

pub const ENV_PREFIX: &str = "XSS_COLLECTOR_";

/// Body limit of `POST /api/screenshot` unless configured.
pub const DEFAULT_MAX_SCREENSHOT_BYTES: usize = 32 * 1024 * 1024;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: String, value: String },

    #[error(transparent)]
    Offset(#[from] OffsetError),

    #[error("Invalid CORS origin: {0}")]
    InvalidOrigin(String),
}

// ============================================================================
// Configuration Types
// ============================================================================

/// Top-level collector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Address the HTTP server binds to
    pub bind: String,
    /// TCP port of the HTTP server
    pub port: u16,
    /// Record store backend
    pub store: StoreConfig,
    /// Origins allowed to call the ingest endpoints
    pub cors: CorsConfig,
    /// Public base URL victims reach the collector at; used in the payload
    pub public_url: String,
    /// Fixed UTC offset trigger times are recorded in
    pub utc_offset: String,
    /// Script URL of the screenshot library the payload loads
    pub screenshot_library: String,
    /// Largest accepted `POST /api/screenshot` body
    pub max_screenshot_bytes: usize,
    /// Directory for rolling log files; stderr only when unset
    pub log_dir: Option<PathBuf>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3000,
            store: StoreConfig::default(),
            cors: CorsConfig::default(),
            public_url: "http://localhost:3000".to_string(),
            utc_offset: "+08:00".to_string(),
            screenshot_library: DEFAULT_SCREENSHOT_LIBRARY.to_string(),
            max_screenshot_bytes: DEFAULT_MAX_SCREENSHOT_BYTES,
            log_dir: None,
        }
    }
}

/// Record store backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Local SQLite database file
    Sqlite { path: PathBuf },
    /// Hosted PostgREST API
    Postgrest {
        /// Base REST URL, e.g. `https://<project>.supabase.co/rest/v1`
        url: String,
        /// Sent as both `apikey` and bearer token
        api_key: String,
        #[serde(default = "default_table")]
        table: String,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Sqlite {
            path: default_db_path(),
        }
    }
}

fn default_table() -> String {
    RECORD_TABLE.to_string()
}

pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("xss-collector")
        .join("collector.db")
}

/// Cross-origin policy of the ingest endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// `*` allows any origin
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
        }
    }
}

impl CorsConfig {
    pub fn allows_any(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }

    /// Methods `POST, GET, OPTIONS` and the `Content-Type` header.
    pub fn layer(&self) -> Result<CorsLayer, ConfigError> {
        let origin = if self.allows_any() {
            AllowOrigin::any()
        } else {
            let origins = self
                .allowed_origins
                .iter()
                .map(|o| {
                    HeaderValue::from_str(o).map_err(|_| ConfigError::InvalidOrigin(o.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            AllowOrigin::list(origins)
        };

        Ok(CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]))
    }
}

// ============================================================================
// Loading
// ============================================================================

impl CollectorConfig {
    /// Defaults, overlaid with `path` when given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `XSS_COLLECTOR_*` overrides read through `var`.
    pub fn apply_env_overrides<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| var(&format!("{ENV_PREFIX}{name}")).filter(|v| !v.is_empty());

        if let Some(bind) = get("BIND") {
            self.bind = bind;
        }
        if let Some(port) = get("PORT") {
            self.port = port.parse().map_err(|_| ConfigError::InvalidEnv {
                key: format!("{ENV_PREFIX}PORT"),
                value: port.clone(),
            })?;
        }
        if let Some(path) = get("DB") {
            self.store = StoreConfig::Sqlite {
                path: PathBuf::from(path),
            };
        }
        if let Some(url) = get("POSTGREST_URL") {
            let api_key = get("POSTGREST_KEY").unwrap_or_default();
            let table = get("POSTGREST_TABLE").unwrap_or_else(default_table);
            self.store = StoreConfig::Postgrest {
                url,
                api_key,
                table,
            };
        }
        if let Some(origins) = get("ALLOWED_ORIGINS") {
            self.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(url) = get("PUBLIC_URL") {
            self.public_url = url;
        }
        if let Some(offset) = get("UTC_OFFSET") {
            self.utc_offset = offset;
        }
        if let Some(lib) = get("SCREENSHOT_LIBRARY") {
            self.screenshot_library = lib;
        }
        if let Some(limit) = get("MAX_SCREENSHOT_BYTES") {
            self.max_screenshot_bytes = limit.parse().map_err(|_| ConfigError::InvalidEnv {
                key: format!("{ENV_PREFIX}MAX_SCREENSHOT_BYTES"),
                value: limit.clone(),
            })?;
        }
        if let Some(dir) = get("LOG_DIR") {
            self.log_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    pub fn trigger_clock(&self) -> Result<TriggerClock, ConfigError> {
        Ok(TriggerClock::from_offset_str(&self.utc_offset)?)
    }

    pub fn payload_settings(&self) -> PayloadSettings {
        PayloadSettings::new(&self.public_url, &self.screenshot_library)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
