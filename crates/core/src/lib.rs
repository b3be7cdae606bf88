//! Shared types for the blind XSS collector
//!
//! Record shapes, the request contracts of the two ingest endpoints, the
//! trigger-time clock and the string handling used by the admin console.

pub mod clock;
pub mod display;
pub mod entities;
pub mod error;
pub mod payload;
pub mod record;
pub mod screenshot;

pub use clock::{TriggerClock, TRIGGER_TIME_FORMAT};
pub use display::{cell_text, truncate_display, COLLAPSED_CHARS};
pub use entities::{decode_html_entities, encode_html_entities};
pub use error::{DataUriError, OffsetError, ValidationError};
pub use payload::PayloadSettings;
pub use record::{
    BeaconRequest, Correlation, IngestRecord, NewRecord, ScreenshotRequest, ScreenshotUpdate,
    MISSING_FIELD_SENTINEL, RECORD_COLUMNS, RECORD_TABLE,
};
pub use screenshot::{is_image_data_uri, DataUri};
