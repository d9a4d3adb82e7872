//! Accepted upload types and the inline payload encoding.
//!
//! The service accepts exactly seven MIME types. Anything else is rejected
//! before a single byte is decoded, both by the workflow (no request is sent)
//! and by the endpoint (400).
//!
//! Processed images travel back to callers inline as base64 data URLs
//! (`data:image/webp;base64,...`); [`to_data_url`] and [`decode_data_url`]
//! are the two halves of that contract.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An upload type the service knows how to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupportedType {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/gif")]
    Gif,
    #[serde(rename = "image/webp")]
    WebP,
    #[serde(rename = "image/svg+xml")]
    Svg,
    #[serde(rename = "image/bmp")]
    Bmp,
    #[serde(rename = "image/tiff")]
    Tiff,
}

impl SupportedType {
    pub const ALL: [SupportedType; 7] = [
        SupportedType::Jpeg,
        SupportedType::Png,
        SupportedType::Gif,
        SupportedType::WebP,
        SupportedType::Svg,
        SupportedType::Bmp,
        SupportedType::Tiff,
    ];

    /// Match a MIME type exactly. Parameters (`; charset=...`) and casing
    /// variants are not accepted, mirroring how browsers report `File.type`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.mime() == mime)
    }

    pub fn mime(self) -> &'static str {
        match self {
            SupportedType::Jpeg => "image/jpeg",
            SupportedType::Png => "image/png",
            SupportedType::Gif => "image/gif",
            SupportedType::WebP => "image/webp",
            SupportedType::Svg => "image/svg+xml",
            SupportedType::Bmp => "image/bmp",
            SupportedType::Tiff => "image/tiff",
        }
    }

    /// Guess the type from a file extension (case-insensitive).
    ///
    /// Used by the CLI, where there is no browser to report a MIME type.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "jpe" => Some(SupportedType::Jpeg),
            "png" => Some(SupportedType::Png),
            "gif" => Some(SupportedType::Gif),
            "webp" => Some(SupportedType::WebP),
            "svg" => Some(SupportedType::Svg),
            "bmp" => Some(SupportedType::Bmp),
            "tif" | "tiff" => Some(SupportedType::Tiff),
            _ => None,
        }
    }
}

/// The subtype half of a MIME string: `image/svg+xml` → `svg+xml`.
///
/// Falls back to `unknown` when there is no slash or nothing after it.
pub fn format_label(mime: &str) -> String {
    match mime.split_once('/') {
        Some((_, sub)) if !sub.is_empty() => sub.to_string(),
        _ => "unknown".to_string(),
    }
}

pub const WEBP_MIME: &str = "image/webp";

/// Encode bytes as a base64 data URL.
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DataUrlError {
    #[error("not a data URL")]
    NotDataUrl,
    #[error("data URL is not base64 encoded")]
    NotBase64,
    #[error("invalid base64 payload: {0}")]
    Payload(String),
}

/// A decoded data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Decode a `data:<mime>;base64,<payload>` URL back into bytes.
pub fn decode_data_url(url: &str) -> Result<DataUrl, DataUrlError> {
    let rest = url.strip_prefix("data:").ok_or(DataUrlError::NotDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUrlError::NotDataUrl)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(DataUrlError::NotBase64)?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| DataUrlError::Payload(e.to_string()))?;
    Ok(DataUrl {
        mime: mime.to_string(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exactly_seven_types() {
        for t in SupportedType::ALL {
            assert_eq!(SupportedType::from_mime(t.mime()), Some(t));
        }
        for rejected in ["text/plain", "image/avif", "image/heic", ""] {
            assert_eq!(SupportedType::from_mime(rejected), None, "{rejected}");
        }
    }

    #[test]
    fn mime_match_is_exact() {
        assert_eq!(SupportedType::from_mime("IMAGE/PNG"), None);
        assert_eq!(SupportedType::from_mime("image/png; q=1"), None);
        assert_eq!(SupportedType::from_mime("image/png"), Some(SupportedType::Png));
    }

    #[test]
    fn extension_guessing() {
        assert_eq!(SupportedType::from_extension("JPG"), Some(SupportedType::Jpeg));
        assert_eq!(SupportedType::from_extension("tif"), Some(SupportedType::Tiff));
        assert_eq!(SupportedType::from_extension("svg"), Some(SupportedType::Svg));
        assert_eq!(SupportedType::from_extension("txt"), None);
    }

    #[test]
    fn format_label_takes_subtype() {
        assert_eq!(format_label("image/jpeg"), "jpeg");
        assert_eq!(format_label("image/svg+xml"), "svg+xml");
        assert_eq!(format_label("image/"), "unknown");
        assert_eq!(format_label("garbage"), "unknown");
    }

    #[test]
    fn data_url_shape() {
        let url = to_data_url(WEBP_MIME, b"RIFF");
        assert_eq!(url, "data:image/webp;base64,UklGRg==");
    }

    #[test]
    fn decode_data_url_recovers_bytes_and_mime() {
        let decoded = decode_data_url("data:image/webp;base64,UklGRg==").unwrap();
        assert_eq!(decoded.mime, "image/webp");
        assert_eq!(decoded.bytes, b"RIFF");
    }

    #[test]
    fn decode_data_url_rejects_non_base64_and_junk() {
        assert_eq!(
            decode_data_url("https://example.com/a.webp"),
            Err(DataUrlError::NotDataUrl)
        );
        assert_eq!(
            decode_data_url("data:text/plain,hello"),
            Err(DataUrlError::NotBase64)
        );
        assert!(matches!(
            decode_data_url("data:image/webp;base64,@@@"),
            Err(DataUrlError::Payload(_))
        ));
    }
}
