//! Ingest record shapes and the request contracts of the two ingest
//! operations.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// Value stored for `url`/`cookie` when a beacon omits them (or sends null).
pub const MISSING_FIELD_SENTINEL: &str = "null";

/// Name of the record table in every store backend.
pub const RECORD_TABLE: &str = "xss";

/// Column list selected by the admin console.
pub const RECORD_COLUMNS: &str = "id, url, cookie, screenshot, trigger_time";

/// One collected callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestRecord {
    pub id: i64,
    pub url: String,
    pub cookie: String,
    #[serde(default)]
    pub screenshot: Option<String>,
    pub trigger_time: String,
}

impl IngestRecord {
    pub fn has_screenshot(&self) -> bool {
        self.screenshot.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// A record before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRecord {
    pub url: String,
    pub cookie: String,
    pub screenshot: Option<String>,
    pub trigger_time: String,
}

impl NewRecord {
    pub fn with_id(self, id: i64) -> IngestRecord {
        IngestRecord {
            id,
            url: self.url,
            cookie: self.cookie,
            screenshot: self.screenshot,
            trigger_time: self.trigger_time,
        }
    }
}

/// Body of `POST /api/get`.
///
/// Absent or null `url`/`cookie` deserialize to [`MISSING_FIELD_SENTINEL`].
/// Everything else is taken verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BeaconRequest {
    #[serde(default = "sentinel", deserialize_with = "string_or_sentinel")]
    pub url: String,
    #[serde(default = "sentinel", deserialize_with = "string_or_sentinel")]
    pub cookie: String,
    #[serde(default)]
    pub screenshot: Option<String>,
}

impl BeaconRequest {
    /// Stamp the beacon with its trigger time.
    pub fn into_record(self, trigger_time: String) -> NewRecord {
        NewRecord {
            url: self.url,
            cookie: self.cookie,
            screenshot: self.screenshot,
            trigger_time,
        }
    }
}

fn sentinel() -> String {
    MISSING_FIELD_SENTINEL.to_string()
}

fn string_or_sentinel<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(sentinel))
}

/// Body of `POST /api/screenshot`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ScreenshotRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub screenshot: Option<String>,
    /// Id returned by the beacon. Narrows the update to that single row.
    #[serde(default)]
    pub id: Option<i64>,
}

/// How a screenshot finds the record(s) it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Correlation {
    /// Every record whose url equals the key.
    Url(String),
    /// Exactly the record with this id, and only if its url still matches.
    Record { id: i64, url: String },
}

impl Correlation {
    pub fn url(&self) -> &str {
        match self {
            Correlation::Url(url) | Correlation::Record { url, .. } => url,
        }
    }
}

/// A validated screenshot update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotUpdate {
    pub target: Correlation,
    pub screenshot: Option<String>,
}

impl ScreenshotRequest {
    pub fn validate(self) -> Result<ScreenshotUpdate, ValidationError> {
        let url = match self.url {
            Some(url) if !url.is_empty() => url,
            _ => return Err(ValidationError::MissingField("url")),
        };
        let target = match self.id {
            Some(id) => Correlation::Record { id, url },
            None => Correlation::Url(url),
        };
        Ok(ScreenshotUpdate {
            target,
            screenshot: self.screenshot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_beacon_defaults_missing_fields_to_sentinel() {
        let req: BeaconRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.url, "null");
        assert_eq!(req.cookie, "null");
        assert_eq!(req.screenshot, None);
    }

    #[test]
    fn test_beacon_null_fields_map_to_sentinel() {
        let req: BeaconRequest =
            serde_json::from_str(r#"{"url": null, "cookie": null}"#).unwrap();
        assert_eq!(req.url, MISSING_FIELD_SENTINEL);
        assert_eq!(req.cookie, MISSING_FIELD_SENTINEL);
    }

    #[test]
    fn test_beacon_keeps_hostile_strings_verbatim() {
        let req: BeaconRequest = serde_json::from_str(
            r#"{"url": "https://victim.test/?q=<script>alert(1)</script>", "cookie": ""}"#,
        )
        .unwrap();
        assert_eq!(req.url, "https://victim.test/?q=<script>alert(1)</script>");
        assert_eq!(req.cookie, "");
    }

    #[test]
    fn test_beacon_into_record() {
        let req: BeaconRequest =
            serde_json::from_str(r#"{"url": "https://a.test", "cookie": "sid=1"}"#).unwrap();
        let record = req.into_record("2025-01-02 03:04:05".to_string());
        assert_eq!(
            record,
            NewRecord {
                url: "https://a.test".to_string(),
                cookie: "sid=1".to_string(),
                screenshot: None,
                trigger_time: "2025-01-02 03:04:05".to_string(),
            }
        );
    }

    #[test]
    fn test_screenshot_requires_url() {
        let missing = ScreenshotRequest::default().validate();
        assert_eq!(missing, Err(ValidationError::MissingField("url")));

        let empty: ScreenshotRequest =
            serde_json::from_str(r#"{"url": "", "screenshot": "data:image/png;base64,AA=="}"#)
                .unwrap();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_screenshot_correlation_by_url_or_id() {
        let by_url: ScreenshotRequest =
            serde_json::from_str(r#"{"url": "https://a.test", "screenshot": "x"}"#).unwrap();
        let update = by_url.validate().unwrap();
        assert_eq!(update.target, Correlation::Url("https://a.test".to_string()));
        assert_eq!(update.screenshot.as_deref(), Some("x"));

        let by_id: ScreenshotRequest =
            serde_json::from_str(r#"{"url": "https://a.test", "id": 7}"#).unwrap();
        let update = by_id.validate().unwrap();
        assert_eq!(
            update.target,
            Correlation::Record {
                id: 7,
                url: "https://a.test".to_string()
            }
        );
        assert_eq!(update.target.url(), "https://a.test");
        assert_eq!(update.screenshot, None);
    }

    #[test]
    fn test_record_rejects_wrong_shape() {
        let bad = serde_json::from_str::<IngestRecord>(r#"{"id": "one", "url": "u"}"#);
        assert!(bad.is_err());

        let ok: IngestRecord = serde_json::from_str(
            r#"{"id": 1, "url": "u", "cookie": "", "trigger_time": "2025-01-01 00:00:00"}"#,
        )
        .unwrap();
        assert!(!ok.has_screenshot());
    }
}
