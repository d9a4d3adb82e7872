//! Image processing: decode, strip, resize, lossy WebP.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader` decoder header, `resvg` tree size for SVG |
//! | **Strip metadata** | ICC/EXIF dropped after decode, pixels only are kept |
//! | **Resize** | `image::imageops` with the configured filter |
//! | **Encode** | `webp::Encoder` (libwebp, lossy) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{
    BackendError, Dimensions, EncodedImage, ImageBackend, ImageInfo, SourceImage,
    StrippedMetadata,
};
pub use calculations::{
    ResizeStep, average_percent, linked_height, linked_width, resize_step, scale_by_percent,
};
pub use operations::{identify, optimize, plan_optimize};
pub use params::{FitMode, OptimizeParams, Quality, ResampleFilter, ResizeRequest};
pub use rust_backend::{RustBackend, WEBP_MAX_DIMENSION};
