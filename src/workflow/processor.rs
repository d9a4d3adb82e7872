//! [`ImageProcessor`]: the workflow's driver.
//!
//! Every state change goes through [`ProcessorState::apply`]; this type only
//! performs the side effects around it (metadata extraction, previews, the
//! transport call) and releases whatever handles a transition returns.

use super::SelectedFile;
use super::controls::ResizeControls;
use super::preview::{MemoryPreviews, PreviewStore};
use super::state::{Event, ProcessorState};
use super::transport::Transport;
use crate::formats::{SupportedType, WEBP_MIME, decode_data_url, format_label};
use crate::imaging::{RustBackend, SourceImage, identify};
use crate::naming::download_file_name;
use crate::output::format_file_size;
use crate::types::{
    ImageMetadata, OptionsError, OptionsPatch, ProcessedImageResult, ProcessingError,
    ProcessingStatus, ResizeOptions,
};
use bytes::Bytes;
use std::path::{Path, PathBuf};

const PROCESS_FAILED_MESSAGE: &str = "Failed to process the image";
const DOWNLOAD_FAILED_MESSAGE: &str = "Failed to download the image";

/// A processed image ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Before/after sizes of a conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionStats {
    pub original_size: u64,
    pub processed_size: u64,
    /// Negative when the WebP came out larger.
    pub savings: i64,
    pub percent_reduction: f64,
    pub original_size_formatted: String,
    pub processed_size_formatted: String,
    pub savings_formatted: String,
}

pub fn compression_stats(original_size: u64, processed_size: u64) -> CompressionStats {
    let savings = original_size as i64 - processed_size as i64;
    let percent_reduction = if original_size == 0 {
        0.0
    } else {
        savings as f64 / original_size as f64 * 100.0
    };
    let savings_formatted = if savings < 0 {
        format!("-{}", format_file_size(savings.unsigned_abs()))
    } else {
        format_file_size(savings as u64)
    };
    CompressionStats {
        original_size,
        processed_size,
        savings,
        percent_reduction,
        original_size_formatted: format_file_size(original_size),
        processed_size_formatted: format_file_size(processed_size),
        savings_formatted,
    }
}

pub struct ImageProcessor<T: Transport, P: PreviewStore = MemoryPreviews> {
    state: ProcessorState,
    controls: ResizeControls,
    transport: T,
    previews: P,
    backend: RustBackend,
}

impl<T: Transport, P: PreviewStore> ImageProcessor<T, P> {
    pub fn new(transport: T, previews: P) -> Self {
        Self {
            state: ProcessorState::default(),
            controls: ResizeControls::default(),
            transport,
            previews,
            backend: RustBackend::new(),
        }
    }

    pub fn state(&self) -> &ProcessorState {
        &self.state
    }

    pub fn status(&self) -> ProcessingStatus {
        self.state.status
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn options(&self) -> &ResizeOptions {
        &self.state.options
    }

    pub fn original_metadata(&self) -> Option<&ImageMetadata> {
        self.state.original_metadata.as_ref()
    }

    pub fn processed(&self) -> Option<&ProcessedImageResult> {
        self.state.processed.as_ref()
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.state.preview_url()
    }

    pub fn previews(&self) -> &P {
        &self.previews
    }

    /// Editing rules bound to the current original's dimensions.
    ///
    /// Rebound on every successful selection and cleared by [`reset`](Self::reset);
    /// the constraint mode and percentage persist in between.
    pub fn controls(&self) -> &ResizeControls {
        &self.controls
    }

    /// Scale both sides to `percent` of the original through the held controls.
    pub fn set_percentage(&mut self, percent: u32) -> Result<(), OptionsError> {
        match self.controls.set_percentage(percent) {
            Some(patch) => self.update_options(&patch),
            None => Ok(()),
        }
    }

    /// Switch the held controls between dimension and percentage editing.
    pub fn toggle_constraint_mode(&mut self) {
        self.controls.toggle_constraint_mode(&self.state.options);
    }

    fn dispatch(&mut self, event: Event) {
        let step = std::mem::take(&mut self.state).apply(event);
        self.state = step.state;
        for handle in step.released {
            if let Err(e) = self.previews.release(handle) {
                tracing::warn!(error = %e, "preview release failed");
            }
        }
    }

    /// Select a new original.
    ///
    /// An unaccepted MIME type only flags an error; the previous selection
    /// stays. Otherwise the old preview and result are dropped and the new
    /// file's dimensions become the requested size.
    pub fn select_file(&mut self, file: SelectedFile) {
        let Some(kind) = SupportedType::from_mime(&file.mime) else {
            tracing::warn!(name = %file.name, mime = %file.mime, "unsupported selection");
            self.dispatch(Event::FileRejected { mime: file.mime });
            return;
        };

        self.dispatch(Event::FileAccepted(file.clone()));

        let source = SourceImage {
            bytes: &file.bytes,
            kind,
        };
        match identify(&self.backend, &source) {
            Ok(info) => {
                let metadata = ImageMetadata {
                    width: info.dimensions.width,
                    height: info.dimensions.height,
                    format: format_label(&file.mime),
                    size: file.size(),
                    has_alpha: Some(info.has_alpha),
                    original_name: Some(file.name.clone()),
                };
                tracing::debug!(name = %file.name, ?metadata, "selected");
                self.controls = ResizeControls::new(metadata.width, metadata.height);
                let preview = self.previews.create(&file.mime, file.bytes.clone());
                self.dispatch(Event::MetadataExtracted { metadata, preview });
            }
            Err(e) => {
                tracing::warn!(name = %file.name, error = %e, "could not read selection");
                self.controls = ResizeControls::default();
                self.dispatch(Event::MetadataFailed {
                    message: e.to_string(),
                });
            }
        }
    }

    /// Merge `patch` into the options. An invalid patch changes nothing.
    pub fn update_options(&mut self, patch: &OptionsPatch) -> Result<(), OptionsError> {
        let options = self.state.options.merge(patch)?;
        self.dispatch(Event::OptionsUpdated(options));
        Ok(())
    }

    /// Submit the current selection and options.
    ///
    /// Does nothing without a selection or while a request is in flight.
    /// A failure is recorded in the state as well as returned.
    pub async fn process(&mut self) -> Result<(), ProcessingError> {
        if !self.state.can_process() {
            return Ok(());
        }
        let Some(file) = self.state.original_file.clone() else {
            return Ok(());
        };
        let options = self.state.options;
        self.dispatch(Event::ProcessingStarted);

        match self.submit(&file, &options).await {
            Ok((data, metadata)) => {
                tracing::info!(
                    name = %file.name,
                    width = metadata.width,
                    height = metadata.height,
                    size = metadata.size,
                    "processing completed"
                );
                self.dispatch(Event::PreviewRetired);
                let preview = self.previews.create(WEBP_MIME, data.clone());
                let result = ProcessedImageResult {
                    data,
                    metadata,
                    data_url: Some(preview.url().to_string()),
                };
                self.dispatch(Event::ProcessingSucceeded { result, preview });
                Ok(())
            }
            Err(message) => {
                tracing::warn!(name = %file.name, error = %message, "processing failed");
                self.dispatch(Event::ProcessingFailed {
                    message: message.clone(),
                });
                Err(ProcessingError::new(message))
            }
        }
    }

    async fn submit(
        &self,
        file: &SelectedFile,
        options: &ResizeOptions,
    ) -> Result<(Bytes, ImageMetadata), String> {
        let response = self
            .transport
            .process(file, options)
            .await
            .map_err(|e| e.to_string())?;

        let payload = match response.processed_image {
            Some(payload) if response.success => payload,
            _ => {
                return Err(response
                    .error
                    .map(|e| e.message)
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| PROCESS_FAILED_MESSAGE.to_string()));
            }
        };
        let decoded = decode_data_url(&payload.url).map_err(|e| e.to_string())?;
        Ok((Bytes::from(decoded.bytes), payload.metadata))
    }

    /// The processed image under its download name.
    pub fn download(&self) -> Option<Download> {
        let processed = self.state.processed.as_ref()?;
        let original = self.state.original_file.as_ref()?;
        Some(Download {
            file_name: download_file_name(
                &original.name,
                processed.metadata.width,
                processed.metadata.height,
            ),
            bytes: processed.data.clone(),
        })
    }

    /// Write the download into `dir`.
    ///
    /// `Ok(None)` when nothing has been processed. A write failure sets the
    /// error message but leaves the status alone.
    pub async fn download_to(&mut self, dir: &Path) -> Result<Option<PathBuf>, ProcessingError> {
        let Some(download) = self.download() else {
            return Ok(None);
        };
        let path = dir.join(&download.file_name);
        match tokio::fs::write(&path, &download.bytes).await {
            Ok(()) => Ok(Some(path)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "download failed");
                self.dispatch(Event::DownloadFailed {
                    message: DOWNLOAD_FAILED_MESSAGE.to_string(),
                });
                Err(ProcessingError::new(DOWNLOAD_FAILED_MESSAGE))
            }
        }
    }

    pub fn compression_stats(&self) -> Option<CompressionStats> {
        let original = self.state.original_file.as_ref()?;
        let processed = self.state.processed.as_ref()?;
        Some(compression_stats(original.size(), processed.metadata.size))
    }

    /// Drop everything and return to the initial state.
    pub fn reset(&mut self) {
        self.controls = ResizeControls::default();
        self.dispatch(Event::Reset);
    }
}

impl<T: Transport, P: PreviewStore> Drop for ImageProcessor<T, P> {
    fn drop(&mut self) {
        if let Some(handle) = self.state.preview.take() {
            if let Err(e) = self.previews.release(handle) {
                tracing::warn!(error = %e, "preview release failed");
            }
        }
    }
}
