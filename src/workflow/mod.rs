//! Client-side workflow: select a file, set options, process, preview,
//! download.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |---|---|
//! | `state` | Pure state machine: [`ProcessorState::apply`] |
//! | `preview` | Preview handles and the store that issues them |
//! | `controls` | Linked-dimension and percentage editing rules |
//! | `transport` | HTTP or in-process route to the endpoint |
//! | `processor` | [`ImageProcessor`], which drives the above |

pub mod controls;
pub mod preview;
pub mod processor;
pub mod state;
pub mod transport;

pub use controls::{ConstraintMode, ResizeControls};
pub use preview::{MemoryPreviews, PreviewError, PreviewHandle, PreviewStore};
pub use processor::{CompressionStats, Download, ImageProcessor, compression_stats};
pub use state::{Event, ProcessorState, Step};
pub use transport::{HttpTransport, LocalTransport, Transport, TransportError};

use crate::formats::SupportedType;
use bytes::Bytes;
use std::path::Path;

/// A file as handed over by the user: name, declared MIME type, contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Read a file from disk, declaring its MIME type from the extension.
    ///
    /// Unknown extensions are declared as `application/octet-stream`, which
    /// selection then rejects.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let mime = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(SupportedType::from_extension)
            .map_or("application/octet-stream", SupportedType::mime);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, mime, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn from_path_guesses_mime() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Holiday.JPG");
        std::fs::write(&path, b"jpeg").unwrap();

        let file = SelectedFile::from_path(&path).await.unwrap();
        assert_eq!(file.name, "Holiday.JPG");
        assert_eq!(file.mime, "image/jpeg");
        assert_eq!(file.size(), 4);
    }

    #[tokio::test]
    async fn from_path_unknown_extension() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let file = SelectedFile::from_path(&path).await.unwrap();
        assert_eq!(file.mime, "application/octet-stream");
    }
}
