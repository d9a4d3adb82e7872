//! How the workflow reaches the processing endpoint.
//!
//! [`HttpTransport`] posts a multipart form to a running server.
//! [`LocalTransport`] hands the same form to the endpoint's processing code
//! in-process, which is what the CLI uses when no server URL is given.

use super::SelectedFile;
use crate::server::{AppState, FormFields, UploadForm, UploadedFile, process_upload};
use crate::types::{ProcessImageResponse, ResizeOptions};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid response from server (status {status}): {message}")]
    InvalidResponse { status: u16, message: String },
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Submit `file` with `options` flattened into form fields.
    ///
    /// Any response with a JSON body is `Ok`, including failures; the caller
    /// inspects `success`.
    async fn process(
        &self,
        file: &SelectedFile,
        options: &ResizeOptions,
    ) -> Result<ProcessImageResponse, TransportError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/process-image", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn process(
        &self,
        file: &SelectedFile,
        options: &ResizeOptions,
    ) -> Result<ProcessImageResponse, TransportError> {
        let part = reqwest::multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.mime)?;
        let form = options
            .to_form_fields()
            .into_iter()
            .fold(reqwest::multipart::Form::new().part("file", part), |form, (name, value)| {
                form.text(name, value)
            });

        tracing::debug!(endpoint = %self.endpoint, name = %file.name, "submitting upload");
        let response = self.client.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| TransportError::InvalidResponse {
            status: status.as_u16(),
            message: e.to_string(),
        })
    }
}

/// Calls the endpoint's processing path directly, no sockets involved.
pub struct LocalTransport {
    state: AppState,
}

impl LocalTransport {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn process(
        &self,
        file: &SelectedFile,
        options: &ResizeOptions,
    ) -> Result<ProcessImageResponse, TransportError> {
        let form = UploadForm {
            file: Some(UploadedFile {
                name: Some(file.name.clone()),
                mime: file.mime.clone(),
                bytes: file.bytes.clone(),
            }),
            fields: FormFields::from(options),
        };
        Ok(match process_upload(&self.state, form).await {
            Ok(payload) => ProcessImageResponse::ok(payload),
            Err(e) => ProcessImageResponse::failed(e.to_string()),
        })
    }
}
