//! HTTP-facing error taxonomy of the ingest endpoints

use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use xss_core::ValidationError;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing required field; 400, no store write happened.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Store failure; 500 with the store's detail.
    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },

    /// Anything but POST/OPTIONS on an ingest endpoint; 405.
    #[error("Method {0} Not Allowed")]
    UnsupportedMethod(Method),
}

impl ApiError {
    pub fn store(context: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| ApiError::Store { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UnsupportedMethod(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(e) => {
                (status, Json(json!({ "error": e.to_string() }))).into_response()
            }
            ApiError::Store { context, source } => {
                tracing::error!("{}: {}", context, source);
                (
                    status,
                    Json(json!({ "error": context, "details": source.to_string() })),
                )
                    .into_response()
            }
            ApiError::UnsupportedMethod(method) => (
                status,
                [(header::ALLOW, "POST")],
                format!("Method {method} Not Allowed"),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::from(ValidationError::MissingField("url")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::store("Failed to insert record")(StoreError::Poisoned).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::UnsupportedMethod(Method::GET).status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn test_method_not_allowed_names_post() {
        let response = ApiError::UnsupportedMethod(Method::PUT).into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "POST");
    }
}
