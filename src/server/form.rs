//! Multipart form values and their interpretation.
//!
//! Numeric fields follow integer-prefix parsing: leading whitespace is
//! skipped, an optional sign and the leading digits are read, anything after
//! is ignored (`"200px"` → 200). No digits, or zero, means "not set".

use super::error::ApiError;
use crate::config::DefaultsConfig;
use crate::imaging::{FitMode, Quality};
use crate::types::ResizeOptions;
use bytes::Bytes;
use std::str::FromStr;

/// The `file` part of an upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: Option<String>,
    /// Declared part content type, matched exactly against the accepted set.
    pub mime: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Raw text values for the option fields, as sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub width: Option<String>,
    pub height: Option<String>,
    pub maintain_aspect_ratio: Option<String>,
    pub fit: Option<String>,
    pub quality: Option<String>,
}

impl FormFields {
    /// Record a text field by its wire name. Unknown names are ignored and the
    /// first value of a repeated field wins.
    pub fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "width" => &mut self.width,
            "height" => &mut self.height,
            "maintainAspectRatio" => &mut self.maintain_aspect_ratio,
            "fit" => &mut self.fit,
            "quality" => &mut self.quality,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    /// Interpret the fields, filling gaps from `defaults`.
    pub fn resolve(&self, defaults: &DefaultsConfig) -> Result<ResizeOptions, ApiError> {
        let width = parse_dimension("width", self.width.as_deref())?;
        let height = parse_dimension("height", self.height.as_deref())?;
        let quality = parse_quality(self.quality.as_deref(), defaults.quality)?;
        let fit = match self.fit.as_deref().map(str::trim) {
            None | Some("") => defaults.fit,
            Some(raw) => FitMode::from_str(raw).map_err(ApiError::InvalidOption)?,
        };

        Ok(ResizeOptions {
            width,
            height,
            maintain_aspect_ratio: self.maintain_aspect_ratio.as_deref() == Some("true"),
            fit,
            quality,
        })
    }
}

impl From<&ResizeOptions> for FormFields {
    fn from(options: &ResizeOptions) -> Self {
        let mut fields = FormFields::default();
        for (name, value) in options.to_form_fields() {
            fields.set(name, value);
        }
        fields
    }
}

/// A parsed upload: at most one file plus option fields.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub fields: FormFields,
}

/// Leading integer of `raw`, or `None` when there are no digits.
///
/// Saturates instead of overflowing so absurd inputs still land in the
/// out-of-range checks.
pub fn integer_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    let magnitude = digits[..len].bytes().fold(0i64, |acc, d| {
        acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

fn parse_dimension(field: &str, raw: Option<&str>) -> Result<Option<u32>, ApiError> {
    match raw.and_then(integer_prefix) {
        None | Some(0) => Ok(None),
        Some(n) => u32::try_from(n).map(Some).map_err(|_| {
            ApiError::InvalidOption(format!(
                "Expected positive integer for {field} but received {n}"
            ))
        }),
    }
}

fn parse_quality(raw: Option<&str>, fallback: u32) -> Result<Quality, ApiError> {
    let value = match raw.and_then(integer_prefix) {
        None | Some(0) => i64::from(fallback),
        Some(n) => n,
    };
    u32::try_from(value)
        .ok()
        .and_then(Quality::checked)
        .ok_or_else(|| {
            ApiError::InvalidOption(format!(
                "Expected integer between 1 and 100 for quality but received {value}"
            ))
        })
}
