//! `POST /process-image`.
//!
//! Validation runs in a fixed order and stops at the first failure:
//! content type, file present, file size, file type. Only then are the
//! option fields interpreted and the codec invoked.

use super::AppState;
use super::error::ApiError;
use super::form::{UploadForm, UploadedFile};
use crate::formats::{SupportedType, WEBP_MIME, format_label, to_data_url};
use crate::imaging::{SourceImage, optimize, plan_optimize};
use crate::types::{ImageMetadata, ProcessImageResponse, ProcessedImagePayload};
use axum::Json;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use bytes::BytesMut;
use std::time::Instant;

pub async fn process_image(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<ProcessImageResponse>, ApiError> {
    let started = Instant::now();

    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().starts_with("multipart/form-data"));
    if !is_multipart {
        return Err(ApiError::NotMultipart);
    }

    let multipart = Multipart::from_request(request, &state)
        .await
        .map_err(|rejection| ApiError::Malformed(rejection.body_text()))?;
    let form = read_form(multipart, state.config.limits.max_file_size).await?;

    let payload = process_upload(&state, form).await?;
    tracing::info!(
        width = payload.metadata.width,
        height = payload.metadata.height,
        size = payload.metadata.size,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "processed image"
    );
    Ok(Json(ProcessImageResponse::ok(payload)))
}

fn multipart_error(err: MultipartError, max_file_size: u64) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::file_too_large(max_file_size)
    } else {
        ApiError::Malformed(err.body_text())
    }
}

/// Drain the multipart stream into an [`UploadForm`].
///
/// The file part is streamed chunk by chunk and abandoned as soon as it
/// passes `max_file_size`.
async fn read_form(mut multipart: Multipart, max_file_size: u64) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_file_size))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if name == "file" {
            if form.file.is_none() {
                form.file = Some(read_file(field, max_file_size).await?);
            }
            continue;
        }
        let value = field
            .text()
            .await
            .map_err(|e| multipart_error(e, max_file_size))?;
        form.fields.set(&name, value);
    }

    Ok(form)
}

async fn read_file(mut field: Field<'_>, max_file_size: u64) -> Result<UploadedFile, ApiError> {
    let name = field.file_name().map(str::to_owned);
    let mime = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_owned();

    let mut buf = BytesMut::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, max_file_size))?
    {
        if (buf.len() + chunk.len()) as u64 > max_file_size {
            return Err(ApiError::file_too_large(max_file_size));
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(UploadedFile {
        name,
        mime,
        bytes: buf.freeze(),
    })
}

/// Validate a parsed upload and run it through the codec.
///
/// Shared by the HTTP handler and the in-process transport, so both apply
/// the same checks in the same order.
pub async fn process_upload(
    state: &AppState,
    form: UploadForm,
) -> Result<ProcessedImagePayload, ApiError> {
    let file = form.file.ok_or(ApiError::NoFile)?;
    let max_file_size = state.config.limits.max_file_size;
    if file.size() > max_file_size {
        return Err(ApiError::file_too_large(max_file_size));
    }
    let kind =
        SupportedType::from_mime(&file.mime).ok_or_else(|| ApiError::UnsupportedType(file.mime.clone()))?;

    let options = form.fields.resolve(&state.config.defaults)?;
    let params = plan_optimize(&options);
    tracing::debug!(
        name = file.name.as_deref().unwrap_or(""),
        format = %format_label(&file.mime),
        size = file.size(),
        ?params,
        "accepted upload"
    );

    let backend = state.backend.clone();
    let bytes = file.bytes;
    let encoded = tokio::task::spawn_blocking(move || {
        optimize(backend.as_ref(), &SourceImage { bytes: &bytes, kind }, &params)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "codec task did not complete");
        ApiError::Internal
    })??;

    Ok(ProcessedImagePayload {
        url: to_data_url(WEBP_MIME, &encoded.bytes),
        metadata: ImageMetadata {
            width: encoded.width,
            height: encoded.height,
            format: format_label(WEBP_MIME),
            size: encoded.bytes.len() as u64,
            has_alpha: None,
            original_name: None,
        },
    })
}
