//! Shared test utilities for the webp-optimizer test suite.
//!
//! Every fixture is synthesized in memory, so tests never depend on files
//! checked into the repository.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let bytes = encode_sample(SupportedType::Tiff, 64, 48);
//! let file = selected_file("scan.tiff", SupportedType::Tiff, bytes);
//! ```

use crate::formats::SupportedType;
use crate::workflow::SelectedFile;
use image::codecs::bmp::BmpEncoder;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tiff::TiffEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};
use std::io::Cursor;

// =========================================================================
// Pixel sources
// =========================================================================

fn gradient_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

fn gradient_rgba(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 128, ((x + y) % 256) as u8])
    })
}

// =========================================================================
// Encoders, one per accepted upload type
// =========================================================================

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::new();
    JpegEncoder::new(&mut out)
        .write_image(
            gradient_rgb(width, height).as_raw(),
            width,
            height,
            ExtendedColorType::Rgb8,
        )
        .unwrap();
    out
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            gradient_rgb(width, height).as_raw(),
            width,
            height,
            ExtendedColorType::Rgb8,
        )
        .unwrap();
    out
}

pub fn png_rgba_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            gradient_rgba(width, height).as_raw(),
            width,
            height,
            ExtendedColorType::Rgba8,
        )
        .unwrap();
    out
}

pub fn gif_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut out);
        encoder
            .encode(
                gradient_rgba(width, height).as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            )
            .unwrap();
    }
    out
}

pub fn webp_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::new();
    WebPEncoder::new_lossless(&mut out)
        .write_image(
            gradient_rgb(width, height).as_raw(),
            width,
            height,
            ExtendedColorType::Rgb8,
        )
        .unwrap();
    out
}

pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::new();
    BmpEncoder::new(&mut out)
        .write_image(
            gradient_rgb(width, height).as_raw(),
            width,
            height,
            ExtendedColorType::Rgb8,
        )
        .unwrap();
    out
}

pub fn tiff_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    TiffEncoder::new(&mut out)
        .write_image(
            gradient_rgb(width, height).as_raw(),
            width,
            height,
            ExtendedColorType::Rgb8,
        )
        .unwrap();
    out.into_inner()
}

pub fn svg_bytes(width: u32, height: u32) -> Vec<u8> {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}"><rect x="0" y="0" width="{width}" height="{height}" fill="#3366cc"/></svg>"##
    )
    .into_bytes()
}

/// Encode a gradient sample of the requested type.
pub fn encode_sample(kind: SupportedType, width: u32, height: u32) -> Vec<u8> {
    match kind {
        SupportedType::Jpeg => jpeg_bytes(width, height),
        SupportedType::Png => png_bytes(width, height),
        SupportedType::Gif => gif_bytes(width, height),
        SupportedType::WebP => webp_bytes(width, height),
        SupportedType::Svg => svg_bytes(width, height),
        SupportedType::Bmp => bmp_bytes(width, height),
        SupportedType::Tiff => tiff_bytes(width, height),
    }
}

// =========================================================================
// Workflow fixtures
// =========================================================================

/// A file as a browser would hand it over.
pub fn selected_file(name: &str, kind: SupportedType, bytes: Vec<u8>) -> SelectedFile {
    SelectedFile::new(name, kind.mime(), bytes)
}

/// A 400x200 JPEG named `landscape.jpg`.
pub fn landscape_jpeg() -> SelectedFile {
    selected_file("landscape.jpg", SupportedType::Jpeg, jpeg_bytes(400, 200))
}
