//! Admin console over HTTP
//!
//! - GET    /admin                          - rendered record table
//! - GET    /admin/api/records              - all records
//! - DELETE /admin/api/records/:id          - delete one record
//! - DELETE /admin/api/records?confirm=true - delete every record
//! - GET    /admin/api/payload              - decoded injection snippet

mod page;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::app::SharedState;

pub use page::{render_admin_page, COPY_NOTICE_MS};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }

    fn err(msg: &str) -> Json<Self> {
        Json(Self {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct PurgeParams {
    #[serde(default)]
    confirm: bool,
}

async fn admin_page(State(state): State<SharedState>) -> impl IntoResponse {
    match state.store.list().await {
        Ok(records) => (
            StatusCode::OK,
            Html(render_admin_page(&records, &state.payload.encoded_snippet())),
        ),
        Err(e) => {
            tracing::error!("Failed to load records: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!(
                    "<h1>Record store unavailable</h1><p>{}</p>",
                    xss_core::encode_html_entities(&e.to_string())
                )),
            )
        }
    }
}

async fn list_records(State(state): State<SharedState>) -> impl IntoResponse {
    match state.store.list().await {
        Ok(records) => (StatusCode::OK, ApiResponse::ok(records)),
        Err(e) => {
            tracing::error!("Failed to list records: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::err(&format!("Database error: {e}")),
            )
        }
    }
}

async fn delete_record(State(state): State<SharedState>, Path(id): Path<i64>) -> impl IntoResponse {
    match state.store.delete_by_id(id).await {
        Ok(deleted) => {
            tracing::info!(id, deleted, "Delete record");
            (
                StatusCode::OK,
                ApiResponse::ok(serde_json::json!({ "id": id, "deleted": deleted })),
            )
        }
        Err(e) => {
            tracing::error!("Failed to delete record {}: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::err(&format!("Database error: {e}")),
            )
        }
    }
}

async fn delete_all_records(
    State(state): State<SharedState>,
    Query(params): Query<PurgeParams>,
) -> impl IntoResponse {
    if !params.confirm {
        return (
            StatusCode::BAD_REQUEST,
            ApiResponse::err("Deleting all records requires confirm=true"),
        );
    }

    match state.store.delete_all().await {
        Ok(count) => {
            tracing::info!(count, "Deleted all records");
            (
                StatusCode::OK,
                ApiResponse::ok(serde_json::json!({ "deleted": count })),
            )
        }
        Err(e) => {
            tracing::error!("Failed to delete all records: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::err(&format!("Database error: {e}")),
            )
        }
    }
}

async fn payload_snippet(State(state): State<SharedState>) -> impl IntoResponse {
    ApiResponse::ok(serde_json::json!({
        "encoded": state.payload.encoded_snippet(),
        "snippet": state.payload.snippet(),
    }))
}

pub fn admin_router(state: SharedState) -> Router {
    Router::new()
        .route("/admin", get(admin_page))
        .route(
            "/admin/api/records",
            get(list_records).delete(delete_all_records),
        )
        .route("/admin/api/records/:id", delete(delete_record))
        .route("/admin/api/payload", get(payload_snippet))
        .with_state(state)
}
