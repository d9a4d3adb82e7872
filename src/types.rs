//! Shared types used by the endpoint and the workflow.
//!
//! The wire types serialize with camelCase keys so the JSON matches what a
//! browser front end expects (`processedImage`, `maintainAspectRatio`, ...).

use crate::imaging::{FitMode, Quality};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Largest width or height accepted from an options patch.
pub const MAX_DIMENSION: u32 = 10_000;

/// Describes either the original or a processed image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    /// MIME subtype (`jpeg`, `svg+xml`) for originals, `webp` for results.
    pub format: String,
    /// Size in bytes.
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_alpha: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
}

/// User-editable resize configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub maintain_aspect_ratio: bool,
    #[serde(default)]
    pub fit: FitMode,
    #[serde(default)]
    pub quality: Quality,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            maintain_aspect_ratio: true,
            fit: FitMode::Contain,
            quality: Quality::default(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    #[error("{field} must be between 1 and 10000, got {value}")]
    Dimension { field: &'static str, value: u32 },
    #[error("quality must be between 1 and 100, got {0}")]
    Quality(u32),
}

/// A partial update to [`ResizeOptions`].
///
/// `None` leaves a field alone. For `width`/`height`, `Some(None)` clears the
/// side so it is derived from the aspect ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionsPatch {
    pub width: Option<Option<u32>>,
    pub height: Option<Option<u32>>,
    pub maintain_aspect_ratio: Option<bool>,
    pub fit: Option<FitMode>,
    pub quality: Option<u32>,
}

impl OptionsPatch {
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(Some(width));
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(Some(height));
        self
    }

    pub fn dimensions(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn maintain_aspect_ratio(mut self, lock: bool) -> Self {
        self.maintain_aspect_ratio = Some(lock);
        self
    }

    pub fn fit(mut self, fit: FitMode) -> Self {
        self.fit = Some(fit);
        self
    }

    pub fn quality(mut self, quality: u32) -> Self {
        self.quality = Some(quality);
        self
    }
}

fn check_dimension(field: &'static str, value: Option<u32>) -> Result<Option<u32>, OptionsError> {
    match value {
        Some(v) if !(1..=MAX_DIMENSION).contains(&v) => Err(OptionsError::Dimension { field, value: v }),
        other => Ok(other),
    }
}

impl ResizeOptions {
    /// Apply a patch, validating every field it touches.
    ///
    /// Pure: on error `self` is returned untouched to the caller's scope.
    pub fn merge(&self, patch: &OptionsPatch) -> Result<ResizeOptions, OptionsError> {
        let mut next = *self;
        if let Some(width) = patch.width {
            next.width = check_dimension("width", width)?;
        }
        if let Some(height) = patch.height {
            next.height = check_dimension("height", height)?;
        }
        if let Some(lock) = patch.maintain_aspect_ratio {
            next.maintain_aspect_ratio = lock;
        }
        if let Some(fit) = patch.fit {
            next.fit = fit;
        }
        if let Some(q) = patch.quality {
            next.quality = Quality::checked(q).ok_or(OptionsError::Quality(q))?;
        }
        Ok(next)
    }

    /// Flatten into multipart text fields, in submission order.
    ///
    /// Width and height are only sent when set.
    pub fn to_form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::with_capacity(5);
        if let Some(w) = self.width {
            fields.push(("width", w.to_string()));
        }
        if let Some(h) = self.height {
            fields.push(("height", h.to_string()));
        }
        fields.push(("maintainAspectRatio", self.maintain_aspect_ratio.to_string()));
        fields.push(("fit", self.fit.to_string()));
        fields.push(("quality", self.quality.value().to_string()));
        fields
    }
}

/// Where a processing run stands.
///
/// Only `idle`, `uploading`, `processing`, `completed`, and `error` are ever
/// held by the workflow; the three pipeline stages label log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessingStatus {
    #[default]
    Idle,
    Uploading,
    Processing,
    StrippingMetadata,
    Resizing,
    Converting,
    Completed,
    Error,
}

impl ProcessingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessingStatus::Idle => "idle",
            ProcessingStatus::Uploading => "uploading",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::StrippingMetadata => "stripping-metadata",
            ProcessingStatus::Resizing => "resizing",
            ProcessingStatus::Converting => "converting",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Error => "error",
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error payload shared by the endpoint response and the workflow state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingError {
    pub message: String,
}

impl ProcessingError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ProcessingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProcessingError {}

/// A finished conversion held by the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedImageResult {
    /// The WebP bytes.
    pub data: Bytes,
    pub metadata: ImageMetadata,
    /// URL of the live preview showing `data`, if one was created.
    pub data_url: Option<String>,
}

/// `processedImage` in a successful response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedImagePayload {
    /// `data:image/webp;base64,...`
    pub url: String,
    pub metadata: ImageMetadata,
}

/// Body of every `/process-image` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessImageResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_image: Option<ProcessedImagePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ProcessingError>,
}

impl ProcessImageResponse {
    pub fn ok(payload: ProcessedImagePayload) -> Self {
        Self {
            success: true,
            processed_image: Some(payload),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            processed_image: None,
            error: Some(ProcessingError::new(message)),
        }
    }
}
