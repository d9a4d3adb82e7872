//! Endpoint errors and their HTTP mapping.
//!
//! Validation failures are 400s with a fixed message. Everything after
//! validation is a 500 carrying the underlying message.

use crate::imaging::BackendError;
use crate::types::ProcessImageResponse;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred while processing the image";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request must be multipart/form-data")]
    NotMultipart,
    #[error("No file provided")]
    NoFile,
    #[error("File size exceeds the maximum allowed size ({limit})")]
    FileTooLarge { limit: String },
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    /// A form value the codec cannot act on (negative width, quality 300).
    #[error("{0}")]
    InvalidOption(String),
    /// The multipart body itself could not be read.
    #[error("{0}")]
    Malformed(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("An unknown error occurred while processing the image")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotMultipart
            | ApiError::NoFile
            | ApiError::FileTooLarge { .. }
            | ApiError::UnsupportedType(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidOption(_)
            | ApiError::Malformed(_)
            | ApiError::Backend(_)
            | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn file_too_large(max_bytes: u64) -> Self {
        ApiError::FileTooLarge {
            limit: size_limit_label(max_bytes),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            tracing::error!(%status, error = %message, "processing failed");
        } else {
            tracing::warn!(%status, error = %message, "rejected upload");
        }
        (status, Json(ProcessImageResponse::failed(message))).into_response()
    }
}

/// Human label for an upload limit: `10485760` → `10MB`.
pub fn size_limit_label(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{}KB", bytes / KIB)
    } else {
        format!("{bytes} bytes")
    }
}
