//! Decoding of `data:` URI screenshots

use base64::Engine;

use crate::error::DataUriError;

/// A decoded `data:<mime>;base64,<payload>` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DataUri {
    pub fn parse(uri: &str) -> Result<Self, DataUriError> {
        let body = uri
            .trim()
            .strip_prefix("data:")
            .ok_or(DataUriError::NotDataUri)?;
        let (meta, payload) = body
            .split_once(',')
            .ok_or(DataUriError::MissingSeparator)?;
        let mime = meta
            .strip_suffix(";base64")
            .ok_or(DataUriError::NotBase64)?;

        let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
        Ok(Self {
            mime: mime.to_string(),
            bytes,
        })
    }

    /// File extension matching the mime type, `bin` when unknown.
    pub fn extension(&self) -> &'static str {
        match self.mime.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "bin",
        }
    }
}

/// Whether a stored screenshot is safe to place in an `<img src>`.
pub fn is_image_data_uri(uri: &str) -> bool {
    uri.starts_with("data:image/")
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const PIXEL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    #[test]
    fn test_parse_png() {
        let uri = DataUri::parse(PIXEL).unwrap();
        assert_eq!(uri.mime, "image/png");
        assert_eq!(uri.extension(), "png");
        assert_eq!(&uri.bytes[1..4], b"PNG");
    }

    #[test]
    fn test_parse_rejects_non_base64_and_garbage() {
        assert!(matches!(
            DataUri::parse("https://a.test/x.png"),
            Err(DataUriError::NotDataUri)
        ));
        assert!(matches!(
            DataUri::parse("data:image/png;base64"),
            Err(DataUriError::MissingSeparator)
        ));
        assert!(matches!(
            DataUri::parse("data:text/plain,hello"),
            Err(DataUriError::NotBase64)
        ));
        assert!(matches!(
            DataUri::parse("data:image/png;base64,@@@"),
            Err(DataUriError::Decode(_))
        ));
    }

    #[test]
    fn test_image_data_uri_check() {
        assert!(is_image_data_uri(PIXEL));
        assert!(!is_image_data_uri("javascript:alert(1)"));
        assert!(!is_image_data_uri("data:text/html;base64,PHNjcmlwdD4="));
    }
}
