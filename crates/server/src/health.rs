//! GET /health
//!
//! Build info plus record store reachability. Does not touch any record.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::SharedState;

// ============================================================================
// Health Response Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthVerdict {
    Healthy,
    /// Record store unreachable; ingest calls will fail with 500
    Degraded,
}

/// Record store reachability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageHealth {
    pub store_ok: bool,
    /// Store error from the failed ping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Crate version of the running collector
    pub version: String,
    /// Record store health
    pub storage: StorageHealth,
    /// Overall verdict
    pub verdict: HealthVerdict,
    /// Timestamp of this check
    pub checked_at: DateTime<Utc>,
}

// ============================================================================
// Handler
// ============================================================================

async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    let storage = match state.store.ping().await {
        Ok(()) => StorageHealth {
            store_ok: true,
            store_error: None,
        },
        Err(e) => {
            tracing::warn!("Health check: record store unreachable: {}", e);
            StorageHealth {
                store_ok: false,
                store_error: Some(e.to_string()),
            }
        }
    };

    let (status, verdict) = if storage.store_ok {
        (StatusCode::OK, HealthVerdict::Healthy)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, HealthVerdict::Degraded)
    };

    (
        status,
        Json(HealthResponse {
            version: env!("CARGO_PKG_VERSION").to_string(),
            storage,
            verdict,
            checked_at: Utc::now(),
        }),
    )
}

pub fn health_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state)
}
