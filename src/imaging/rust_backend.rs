//! Production backend built on the `image` crate ecosystem.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, WebP, BMP, TIFF) | `image::ImageReader` with content sniffing |
//! | Decode (SVG) | `resvg` rasterizes at the document's intrinsic size |
//! | Identify | decoder header only (`ImageDecoder::dimensions`), no pixel decode |
//! | Resize | `image::imageops` with the configured [`ResampleFilter`] |
//! | Encode → WebP | `webp` (libwebp, lossy) |
//!
//! Metadata stripping falls out of the decode: only pixels survive into a
//! `DynamicImage`, and the encoder is handed raw RGB(A) buffers, so EXIF,
//! IPTC, and XMP never reach the output. The ICC profile is the one block
//! the decoder hands back separately; it is dropped explicitly.

use super::backend::{
    BackendError, Dimensions, EncodedImage, ImageBackend, ImageInfo, SourceImage,
    StrippedMetadata,
};
use super::calculations::{ResizeStep, centre_offset};
use super::params::{Quality, ResampleFilter};
use crate::formats::SupportedType;
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageReader, Rgba, RgbaImage};
use std::io::Cursor;

/// libwebp refuses anything larger on either side.
pub const WEBP_MAX_DIMENSION: u32 = 16383;

/// Padding colour for `contain`: opaque black.
const PAD_COLOUR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Largest SVG canvas rasterized, in pixels. The same budget as 0x3FFF².
const MAX_SVG_PIXELS: u64 = WEBP_MAX_DIMENSION as u64 * WEBP_MAX_DIMENSION as u64;

/// A decoded upload plus the metadata the decoder surfaced.
pub struct Decoded {
    image: DynamicImage,
    icc_profile: Option<Vec<u8>>,
    exif: Option<Vec<u8>>,
}

/// Backend using `image`, `resvg`, and `webp`.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend {
    filter: FilterType,
}

impl RustBackend {
    pub fn new() -> Self {
        Self::with_filter(ResampleFilter::default())
    }

    pub fn with_filter(filter: ResampleFilter) -> Self {
        let filter = match filter {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        };
        Self { filter }
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_failed(e: impl std::fmt::Display) -> BackendError {
    BackendError::Decode(e.to_string())
}

/// Parse an SVG document with default options.
fn parse_svg(bytes: &[u8]) -> Result<resvg::usvg::Tree, BackendError> {
    let options = resvg::usvg::Options::default();
    resvg::usvg::Tree::from_data(bytes, &options).map_err(decode_failed)
}

/// Intrinsic canvas size, refused above [`MAX_SVG_PIXELS`] before anything
/// is allocated.
fn svg_size(tree: &resvg::usvg::Tree) -> Result<resvg::tiny_skia::IntSize, BackendError> {
    let size = tree.size().to_int_size();
    let pixels = u64::from(size.width()) * u64::from(size.height());
    if pixels > MAX_SVG_PIXELS {
        return Err(BackendError::Decode(format!(
            "SVG canvas {}x{} exceeds the limit of {MAX_SVG_PIXELS} pixels",
            size.width(),
            size.height()
        )));
    }
    Ok(size)
}

/// Rasterize an SVG at its intrinsic size into straight (non-premultiplied) RGBA.
fn rasterize_svg(bytes: &[u8]) -> Result<DynamicImage, BackendError> {
    let tree = parse_svg(bytes)?;
    let size = svg_size(&tree)?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| BackendError::Decode("SVG has an empty canvas".into()))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::default(),
        &mut pixmap.as_mut(),
    );

    let mut rgba = Vec::with_capacity(pixmap.pixels().len() * 4);
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RgbaImage::from_raw(size.width(), size.height(), rgba)
        .map(DynamicImage::ImageRgba8)
        .ok_or_else(|| BackendError::Decode("SVG raster buffer size mismatch".into()))
}

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(decode_failed)
}

impl ImageBackend for RustBackend {
    type Image = Decoded;

    fn identify(&self, source: &SourceImage<'_>) -> Result<ImageInfo, BackendError> {
        if source.kind == SupportedType::Svg {
            let size = svg_size(&parse_svg(source.bytes)?)?;
            return Ok(ImageInfo {
                dimensions: Dimensions {
                    width: size.width(),
                    height: size.height(),
                },
                has_alpha: true,
            });
        }

        let decoder = reader(source.bytes)?
            .into_decoder()
            .map_err(decode_failed)?;
        let (width, height) = decoder.dimensions();
        Ok(ImageInfo {
            dimensions: Dimensions { width, height },
            has_alpha: decoder.color_type().has_alpha(),
        })
    }

    fn decode(&self, source: &SourceImage<'_>) -> Result<Decoded, BackendError> {
        if source.kind == SupportedType::Svg {
            return Ok(Decoded {
                image: rasterize_svg(source.bytes)?,
                icc_profile: None,
                exif: None,
            });
        }

        let mut decoder = reader(source.bytes)?
            .into_decoder()
            .map_err(decode_failed)?;
        let icc_profile = decoder.icc_profile().ok().flatten();
        let exif = decoder.exif_metadata().ok().flatten();
        let image = DynamicImage::from_decoder(decoder).map_err(decode_failed)?;
        Ok(Decoded {
            image,
            icc_profile,
            exif,
        })
    }

    fn dimensions(&self, image: &Decoded) -> Dimensions {
        Dimensions {
            width: image.image.width(),
            height: image.image.height(),
        }
    }

    fn strip_metadata(&self, image: &mut Decoded) -> StrippedMetadata {
        StrippedMetadata {
            icc_profile: image.icc_profile.take().is_some(),
            exif: image.exif.take().is_some(),
        }
    }

    fn resize(&self, decoded: Decoded, step: &ResizeStep) -> Result<Decoded, BackendError> {
        let (peak_w, peak_h) = step.peak();
        if peak_w > WEBP_MAX_DIMENSION || peak_h > WEBP_MAX_DIMENSION {
            return Err(BackendError::ProcessingFailed(format!(
                "resizing needs a {peak_w}x{peak_h} image, beyond the WebP limit of \
                 {WEBP_MAX_DIMENSION}px per side"
            )));
        }

        let img = decoded.image;
        let resized = match *step {
            ResizeStep::Stretch { width, height } | ResizeStep::Scale { width, height } => {
                img.resize_exact(width, height, self.filter)
            }
            ResizeStep::ScaleThenCrop {
                scaled,
                width,
                height,
            } => {
                let filled = img.resize_exact(scaled.0, scaled.1, self.filter);
                let (x, y) = centre_offset(scaled, (width, height));
                filled.crop_imm(x, y, width, height)
            }
            ResizeStep::ScaleThenPad {
                scaled,
                width,
                height,
            } => {
                let had_alpha = img.color().has_alpha();
                let inner = img.resize_exact(scaled.0, scaled.1, self.filter).to_rgba8();
                let mut canvas = RgbaImage::from_pixel(width, height, PAD_COLOUR);
                let (x, y) = centre_offset((width, height), scaled);
                image::imageops::overlay(&mut canvas, &inner, x as i64, y as i64);
                let padded = DynamicImage::ImageRgba8(canvas);
                if had_alpha {
                    padded
                } else {
                    DynamicImage::ImageRgb8(padded.to_rgb8())
                }
            }
        };
        Ok(Decoded {
            image: resized,
            icc_profile: decoded.icc_profile,
            exif: decoded.exif,
        })
    }

    fn encode_webp(
        &self,
        decoded: &Decoded,
        quality: Quality,
    ) -> Result<EncodedImage, BackendError> {
        let img = &decoded.image;
        let (width, height) = (img.width(), img.height());
        if width > WEBP_MAX_DIMENSION || height > WEBP_MAX_DIMENSION {
            return Err(BackendError::Encode(format!(
                "{width}x{height} exceeds the WebP limit of {WEBP_MAX_DIMENSION}px per side"
            )));
        }

        let has_alpha = img.color().has_alpha();
        let memory = if has_alpha {
            let rgba = img.to_rgba8();
            webp::Encoder::from_rgba(rgba.as_raw(), width, height)
                .encode_simple(false, quality.value() as f32)
        } else {
            let rgb = img.to_rgb8();
            webp::Encoder::from_rgb(rgb.as_raw(), width, height)
                .encode_simple(false, quality.value() as f32)
        }
        .map_err(|e| BackendError::Encode(format!("{e:?}")))?;

        Ok(EncodedImage {
            bytes: memory.to_vec(),
            width,
            height,
            has_alpha,
        })
    }
}
