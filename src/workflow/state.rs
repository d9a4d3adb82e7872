//! The workflow as a pure state machine.
//!
//! [`ProcessorState::apply`] takes an [`Event`] and returns the next state
//! together with every preview handle the transition let go of. Nothing here
//! does I/O; the caller releases the returned handles.
//!
//! ```text
//! idle ──FileAccepted──▶ uploading ──MetadataExtracted──▶ idle
//!                              └────MetadataFailed─────▶ error
//! idle ──ProcessingStarted──▶ processing ──Succeeded──▶ completed
//!                                   └──────Failed─────▶ error
//! any ──Reset──▶ idle (initial)
//! ```

use super::SelectedFile;
use super::preview::PreviewHandle;
use crate::types::{ImageMetadata, ProcessedImageResult, ProcessingStatus, ResizeOptions};

#[derive(Debug)]
pub enum Event {
    /// A selection with an unaccepted MIME type.
    FileRejected { mime: String },
    /// An accepted selection; metadata extraction follows.
    FileAccepted(SelectedFile),
    MetadataExtracted {
        metadata: ImageMetadata,
        preview: PreviewHandle,
    },
    MetadataFailed { message: String },
    /// Options after a validated merge.
    OptionsUpdated(ResizeOptions),
    ProcessingStarted,
    /// The held preview is let go ahead of creating its replacement.
    PreviewRetired,
    ProcessingSucceeded {
        result: ProcessedImageResult,
        preview: PreviewHandle,
    },
    ProcessingFailed { message: String },
    DownloadFailed { message: String },
    Reset,
}

/// Everything the workflow knows.
///
/// Holds at most one preview. The driver retires the held handle before
/// creating the next one, so two are never live at once.
#[derive(Debug, Default)]
pub struct ProcessorState {
    pub original_file: Option<SelectedFile>,
    pub original_metadata: Option<ImageMetadata>,
    pub processed: Option<ProcessedImageResult>,
    pub preview: Option<PreviewHandle>,
    pub status: ProcessingStatus,
    pub error: Option<String>,
    pub options: ResizeOptions,
}

/// The outcome of one transition.
#[derive(Debug)]
pub struct Step {
    pub state: ProcessorState,
    /// Handles dropped by the transition, to be released by the caller.
    pub released: Vec<PreviewHandle>,
}

impl ProcessorState {
    /// Whether a `process` call would start a request now.
    pub fn can_process(&self) -> bool {
        self.original_file.is_some()
            && self.original_metadata.is_some()
            && !matches!(
                self.status,
                ProcessingStatus::Processing | ProcessingStatus::Uploading
            )
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.preview.as_ref().map(PreviewHandle::url)
    }

    pub fn apply(mut self, event: Event) -> Step {
        let mut released = Vec::new();

        match event {
            Event::FileRejected { mime } => {
                self.status = ProcessingStatus::Error;
                self.error = Some(format!("Unsupported file type: {mime}"));
            }
            Event::FileAccepted(file) => {
                released.extend(self.preview.take());
                self.processed = None;
                self.original_metadata = None;
                self.original_file = Some(file);
                self.status = ProcessingStatus::Uploading;
                self.error = None;
            }
            Event::MetadataExtracted { metadata, preview } => {
                if self.status == ProcessingStatus::Uploading {
                    released.extend(self.preview.replace(preview));
                    self.options.width = Some(metadata.width);
                    self.options.height = Some(metadata.height);
                    self.original_metadata = Some(metadata);
                    self.status = ProcessingStatus::Idle;
                } else {
                    // Stale extraction: the selection it belongs to is gone.
                    released.push(preview);
                }
            }
            Event::MetadataFailed { message } => {
                if self.status == ProcessingStatus::Uploading {
                    self.original_file = None;
                    self.status = ProcessingStatus::Error;
                    self.error = Some(message);
                }
            }
            Event::OptionsUpdated(options) => {
                self.options = options;
            }
            Event::ProcessingStarted => {
                if self.can_process() {
                    self.status = ProcessingStatus::Processing;
                    self.error = None;
                }
            }
            Event::PreviewRetired => {
                released.extend(self.preview.take());
            }
            Event::ProcessingSucceeded { result, preview } => {
                if self.status == ProcessingStatus::Processing {
                    released.extend(self.preview.replace(preview));
                    self.processed = Some(result);
                    self.status = ProcessingStatus::Completed;
                } else {
                    released.push(preview);
                }
            }
            Event::ProcessingFailed { message } => {
                if self.status == ProcessingStatus::Processing {
                    self.status = ProcessingStatus::Error;
                    self.error = Some(message);
                }
            }
            Event::DownloadFailed { message } => {
                self.error = Some(message);
            }
            Event::Reset => {
                released.extend(self.preview.take());
                self = ProcessorState::default();
            }
        }

        Step {
            state: self,
            released,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::FitMode;
    use crate::workflow::preview::{MemoryPreviews, PreviewStore};
    use bytes::Bytes;

    fn file() -> SelectedFile {
        SelectedFile::new("photo.jpg", "image/jpeg", b"jpeg".to_vec())
    }

    fn metadata(width: u32, height: u32) -> ImageMetadata {
        ImageMetadata {
            width,
            height,
            format: "jpeg".into(),
            size: 4,
            has_alpha: Some(false),
            original_name: Some("photo.jpg".into()),
        }
    }

    fn result() -> ProcessedImageResult {
        ProcessedImageResult {
            data: Bytes::from_static(b"webp"),
            metadata: ImageMetadata {
                width: 200,
                height: 100,
                format: "webp".into(),
                size: 4,
                has_alpha: None,
                original_name: None,
            },
            data_url: None,
        }
    }

    /// Drive to idle-with-file, returning the state and the preview store.
    fn selected(store: &mut MemoryPreviews) -> ProcessorState {
        let step = ProcessorState::default().apply(Event::FileAccepted(file()));
        let preview = store.create("image/jpeg", Bytes::new());
        step.state
            .apply(Event::MetadataExtracted {
                metadata: metadata(400, 200),
                preview,
            })
            .state
    }

    #[test]
    fn initial_state() {
        let s = ProcessorState::default();
        assert_eq!(s.status, ProcessingStatus::Idle);
        assert!(s.original_file.is_none());
        assert!(s.preview.is_none());
        assert_eq!(s.options, ResizeOptions::default());
        assert!(!s.can_process());
    }

    #[test]
    fn rejection_leaves_selection_intact() {
        let mut store = MemoryPreviews::new();
        let s = selected(&mut store);
        let step = s.apply(Event::FileRejected {
            mime: "text/plain".into(),
        });
        assert!(step.released.is_empty());
        let s = step.state;
        assert_eq!(s.status, ProcessingStatus::Error);
        assert_eq!(s.error.as_deref(), Some("Unsupported file type: text/plain"));
        assert!(s.original_file.is_some());
        assert!(s.original_metadata.is_some());
        assert!(s.preview.is_some());
    }

    #[test]
    fn metadata_sets_native_dimensions() {
        let mut store = MemoryPreviews::new();
        let s = selected(&mut store);
        assert_eq!(s.status, ProcessingStatus::Idle);
        assert_eq!(s.options.width, Some(400));
        assert_eq!(s.options.height, Some(200));
        assert_eq!(s.options.quality.value(), 80);
        assert_eq!(s.options.fit, FitMode::Contain);
        assert!(s.options.maintain_aspect_ratio);
        assert_eq!(s.preview_url(), Some("preview://1"));
    }

    #[test]
    fn new_selection_releases_preview_and_drops_result() {
        let mut store = MemoryPreviews::new();
        let s = selected(&mut store);
        let s = s.apply(Event::ProcessingStarted).state;
        let processed_preview = store.create("image/webp", Bytes::new());
        let step = s.apply(Event::ProcessingSucceeded {
            result: result(),
            preview: processed_preview,
        });
        assert_eq!(step.released.len(), 1);
        assert_eq!(step.released[0].id(), 1);

        let step = step.state.apply(Event::FileAccepted(file()));
        assert_eq!(step.released.len(), 1);
        assert_eq!(step.released[0].id(), 2);
        assert!(step.state.processed.is_none());
        assert!(step.state.preview.is_none());
        assert_eq!(step.state.status, ProcessingStatus::Uploading);
    }

    #[test]
    fn processing_guarded_while_in_flight() {
        let mut store = MemoryPreviews::new();
        let s = selected(&mut store).apply(Event::ProcessingStarted).state;
        assert_eq!(s.status, ProcessingStatus::Processing);
        assert!(!s.can_process());
    }

    #[test]
    fn processing_without_file_is_noop() {
        let s = ProcessorState::default().apply(Event::ProcessingStarted).state;
        assert_eq!(s.status, ProcessingStatus::Idle);
    }

    #[test]
    fn processing_clears_previous_error() {
        let mut store = MemoryPreviews::new();
        let s = selected(&mut store)
            .apply(Event::ProcessingStarted)
            .state
            .apply(Event::ProcessingFailed {
                message: "boom".into(),
            })
            .state;
        assert_eq!(s.status, ProcessingStatus::Error);
        let s = s.apply(Event::ProcessingStarted).state;
        assert_eq!(s.status, ProcessingStatus::Processing);
        assert!(s.error.is_none());
    }

    #[test]
    fn stale_success_hands_preview_back() {
        let mut store = MemoryPreviews::new();
        let s = selected(&mut store);
        let stray = store.create("image/webp", Bytes::new());
        let step = s.apply(Event::ProcessingSucceeded {
            result: result(),
            preview: stray,
        });
        assert_eq!(step.released.len(), 1);
        assert_eq!(step.state.status, ProcessingStatus::Idle);
        assert!(step.state.processed.is_none());
    }

    #[test]
    fn retiring_hands_the_preview_back() {
        let mut store = MemoryPreviews::new();
        let step = selected(&mut store)
            .apply(Event::ProcessingStarted)
            .state
            .apply(Event::PreviewRetired);
        assert_eq!(step.released.len(), 1);
        assert!(step.state.preview.is_none());
        assert_eq!(step.state.status, ProcessingStatus::Processing);

        let again = step.state.apply(Event::PreviewRetired);
        assert!(again.released.is_empty());
    }

    #[test]
    fn metadata_failure_moves_to_error() {
        let s = ProcessorState::default()
            .apply(Event::FileAccepted(file()))
            .state
            .apply(Event::MetadataFailed {
                message: "Failed to decode image: eof".into(),
            })
            .state;
        assert_eq!(s.status, ProcessingStatus::Error);
        assert!(s.original_file.is_none());
        assert!(!s.can_process());
    }

    #[test]
    fn download_failure_keeps_status() {
        let mut store = MemoryPreviews::new();
        let s = selected(&mut store)
            .apply(Event::ProcessingStarted)
            .state
            .apply(Event::ProcessingSucceeded {
                result: result(),
                preview: store.create("image/webp", Bytes::new()),
            })
            .state
            .apply(Event::DownloadFailed {
                message: "Failed to download the image".into(),
            })
            .state;
        assert_eq!(s.status, ProcessingStatus::Completed);
        assert_eq!(s.error.as_deref(), Some("Failed to download the image"));
    }

    #[test]
    fn reset_returns_everything() {
        let mut store = MemoryPreviews::new();
        let step = selected(&mut store).apply(Event::Reset);
        assert_eq!(step.released.len(), 1);
        let s = step.state;
        assert_eq!(s.status, ProcessingStatus::Idle);
        assert!(s.original_file.is_none());
        assert!(s.preview.is_none());
        assert_eq!(s.options, ResizeOptions::default());
    }
}
