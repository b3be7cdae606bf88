//! Error taxonomy shared by the ingest and console layers

use thiserror::Error;

/// A request body that is well-formed JSON but misses a field the operation
/// cannot do without.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Failures decoding a `data:` URI screenshot.
#[derive(Debug, Error)]
pub enum DataUriError {
    #[error("not a data URI")]
    NotDataUri,

    #[error("data URI has no payload separator")]
    MissingSeparator,

    #[error("data URI is not base64 encoded")]
    NotBase64,

    #[error("invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// Unparseable fixed UTC offset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid UTC offset '{0}', expected +HH:MM or -HH:MM")]
pub struct OffsetError(pub String);
