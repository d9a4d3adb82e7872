//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait splits the optimize pipeline into the steps a
//! codec has to supply: identify, decode, strip metadata, resize, and WebP
//! encode. [`operations`](super::operations) strings them together, so the
//! ordering rules (strip before resize, skip resize when nothing was asked
//! for) live in one place and can be tested against a mock.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::calculations::ResizeStep;
use super::params::Quality;
use crate::formats::SupportedType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("WebP encode failed: {0}")]
    Encode(String),
}

/// Raw upload bytes plus the declared type.
#[derive(Debug, Clone, Copy)]
pub struct SourceImage<'a> {
    pub bytes: &'a [u8],
    pub kind: SupportedType,
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Cheap facts about an image, read without a full decode where possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub dimensions: Dimensions,
    pub has_alpha: bool,
}

/// Which embedded metadata blocks a strip removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrippedMetadata {
    pub icc_profile: bool,
    pub exif: bool,
}

/// A finished WebP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub has_alpha: bool,
}

/// Trait for image processing backends.
///
/// `Image` is whatever decoded representation the backend works on; callers
/// never look inside it.
pub trait ImageBackend: Sync {
    type Image;

    /// Dimensions and alpha presence.
    fn identify(&self, source: &SourceImage<'_>) -> Result<ImageInfo, BackendError>;

    /// Decode the upload into the backend's working representation.
    fn decode(&self, source: &SourceImage<'_>) -> Result<Self::Image, BackendError>;

    /// Current pixel dimensions of a decoded image.
    fn dimensions(&self, image: &Self::Image) -> Dimensions;

    /// Drop EXIF/ICC/IPTC/XMP so nothing but pixels reaches the encoder.
    fn strip_metadata(&self, image: &mut Self::Image) -> StrippedMetadata;

    /// Execute a resolved resize.
    fn resize(&self, image: Self::Image, step: &ResizeStep) -> Result<Self::Image, BackendError>;

    /// Lossy WebP encode.
    fn encode_webp(&self, image: &Self::Image, quality: Quality)
    -> Result<EncodedImage, BackendError>;
}
