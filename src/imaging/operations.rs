//! High-level image operations.
//!
//! These functions combine calculations with backend execution. They take
//! the caller's options, compute parameters, and call the backend.

use super::backend::{BackendError, EncodedImage, ImageBackend, ImageInfo, SourceImage};
use super::calculations::resize_step;
use super::params::{FitMode, OptimizeParams, ResizeRequest};
use crate::types::{ProcessingStatus, ResizeOptions};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions and alpha presence using the backend.
pub fn identify(backend: &impl ImageBackend, source: &SourceImage<'_>) -> Result<ImageInfo> {
    backend.identify(source)
}

/// Plan an optimize run without executing it.
///
/// A resize is only requested when at least one side is set. When both
/// sides are set and the aspect lock is off, the fit is forced to
/// [`FitMode::Fill`] whatever the caller asked for.
pub fn plan_optimize(options: &ResizeOptions) -> OptimizeParams {
    let resize = match (options.width, options.height) {
        (None, None) => None,
        (width, height) => {
            let fit = if !options.maintain_aspect_ratio && width.is_some() && height.is_some() {
                FitMode::Fill
            } else {
                options.fit
            };
            Some(ResizeRequest { width, height, fit })
        }
    };

    OptimizeParams {
        resize,
        quality: options.quality,
    }
}

/// Decode → strip metadata → resize (if requested) → lossy WebP.
pub fn optimize(
    backend: &impl ImageBackend,
    source: &SourceImage<'_>,
    params: &OptimizeParams,
) -> Result<EncodedImage> {
    let mut image = backend.decode(source)?;

    tracing::debug!(stage = %ProcessingStatus::StrippingMetadata, "pipeline stage");
    let stripped = backend.strip_metadata(&mut image);
    if stripped.icc_profile || stripped.exif {
        tracing::debug!(
            icc = stripped.icc_profile,
            exif = stripped.exif,
            "removed embedded metadata"
        );
    }

    if let Some(request) = &params.resize {
        let dims = backend.dimensions(&image);
        if let Some(step) = resize_step((dims.width, dims.height), request) {
            tracing::debug!(stage = %ProcessingStatus::Resizing, ?step, "pipeline stage");
            image = backend.resize(image, &step)?;
        }
    }

    tracing::debug!(
        stage = %ProcessingStatus::Converting,
        quality = params.quality.value(),
        "pipeline stage"
    );
    backend.encode_webp(&image, params.quality)
}
