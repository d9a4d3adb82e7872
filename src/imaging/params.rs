//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how*. They sit between
//! [`operations`](super::operations), which decides the pipeline for one
//! request, and the [`backend`](super::backend), which does the pixel work.
//!
//! ## Types
//!
//! - [`Quality`]: lossy WebP quality (1–100, default 80). Clamped on construction.
//! - [`FitMode`]: how a box of requested dimensions is filled.
//! - [`ResampleFilter`]: resampling kernel used for every resize.
//! - [`ResizeRequest`]: requested box (either side optional) plus fit.
//! - [`OptimizeParams`]: everything one pipeline run needs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality setting for lossy encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    /// Like [`Quality::new`] but refuses out-of-range values instead of clamping.
    pub fn checked(value: u32) -> Option<Self> {
        (1..=100).contains(&value).then_some(Self(value))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// How the requested width/height box is filled.
///
/// With only one side requested every mode scales the other side to keep
/// the aspect ratio. With both sides:
///
/// | Mode | Output |
/// |---|---|
/// | `contain` | fit inside the box, pad to exactly the box |
/// | `cover` | cover the box, centre-crop to exactly the box |
/// | `fill` | stretch to exactly the box |
/// | `inside` | largest aspect-preserving size within the box |
/// | `outside` | smallest aspect-preserving size covering the box |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    #[default]
    Contain,
    Cover,
    Fill,
    Inside,
    Outside,
}

impl FitMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FitMode::Contain => "contain",
            FitMode::Cover => "cover",
            FitMode::Fill => "fill",
            FitMode::Inside => "inside",
            FitMode::Outside => "outside",
        }
    }
}

impl fmt::Display for FitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contain" => Ok(FitMode::Contain),
            "cover" => Ok(FitMode::Cover),
            "fill" => Ok(FitMode::Fill),
            "inside" => Ok(FitMode::Inside),
            "outside" => Ok(FitMode::Outside),
            other => Err(format!(
                "Expected valid fit (contain, cover, fill, inside, outside) but received {other}"
            )),
        }
    }
}

/// Resampling kernel for resizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

/// A requested output box. `None` on a side means "derive from aspect ratio".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeRequest {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fit: FitMode,
}

/// Full specification for one optimize run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizeParams {
    /// `None` keeps the decoded dimensions.
    pub resize: Option<ResizeRequest>,
    pub quality: Quality,
}
