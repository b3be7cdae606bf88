//! Application state and the top-level router

use std::sync::Arc;

use axum::response::Redirect;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use xss_core::{PayloadSettings, TriggerClock};

use crate::config::{CollectorConfig, ConfigError, DEFAULT_MAX_SCREENSHOT_BYTES};
use crate::store::RecordStore;
use crate::{admin, health, ingest};

pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    /// Stamps `trigger_time` on new beacons
    pub clock: TriggerClock,
    /// Renders `/payload.js` and the admin snippet
    pub payload: PayloadSettings,
    /// Request body limit of `POST /api/screenshot`
    pub max_screenshot_bytes: usize,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, clock: TriggerClock, payload: PayloadSettings) -> Self {
        Self {
            store,
            clock,
            payload,
            max_screenshot_bytes: DEFAULT_MAX_SCREENSHOT_BYTES,
        }
    }

    pub fn with_screenshot_limit(mut self, bytes: usize) -> Self {
        self.max_screenshot_bytes = bytes;
        self
    }

    pub fn from_config(
        store: Arc<dyn RecordStore>,
        config: &CollectorConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(
            store,
            config.trigger_clock()?,
            config.payload_settings(),
        )
        .with_screenshot_limit(config.max_screenshot_bytes))
    }
}

/// Ingest endpoints behind `cors`; admin and health endpoints without it.
pub fn build_router(state: SharedState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/admin") }))
        .merge(ingest::ingest_router(state.clone()).layer(cors))
        .merge(admin::admin_router(state.clone()))
        .merge(health::health_router(state))
}
