//! Download file naming.
//!
//! A processed image is offered as `<base>-<width>x<height>.webp`, where the
//! base is the original file name cut at its first dot:
//! - `holiday.photo.jpg` at 800x600 → `holiday-800x600.webp`
//! - `scan.tiff` at 100x50 → `scan-100x50.webp`
//! - `.hidden` (nothing before the dot) → `image-WxH.webp`

/// Used when the original name has no usable stem.
pub const FALLBACK_BASE_NAME: &str = "image";

/// The original name up to its first `.`, or [`FALLBACK_BASE_NAME`] when
/// that leaves nothing.
pub fn base_name(original: &str) -> &str {
    let stem = original.split('.').next().unwrap_or_default();
    if stem.is_empty() {
        FALLBACK_BASE_NAME
    } else {
        stem
    }
}

/// `<base>-<width>x<height>.webp`
pub fn download_file_name(original: &str, width: u32, height: u32) -> String {
    format!("{}-{width}x{height}.webp", base_name(original))
}
