//! Shared value types used by every stage of the crop-and-compose engine.
//!
//! Percentages are always `0.0..=100.0` of the containing box (the image for
//! a crop, the frame for a placement). Pixel sizes are native unless a name
//! says otherwise.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Export DPI used when no target DPI is configured.
///
/// This is the only place an absent resolution turns into a number.
pub const DEFAULT_EXPORT_DPI: f64 = 300.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TargetError {
    #[error("physical size must be positive, got {width} x {height}")]
    InvalidSize { width: f64, height: f64 },
    #[error("DPI must be positive, got {0}")]
    InvalidDpi(f64),
}

/// Pixel dimensions of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.width, self.height)
    }
}

/// A width:height ratio kept as its two terms.
///
/// Keeping the terms (rather than the quotient) lets `8:10` derive exact
/// integer pairs such as 800 x 1000.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub width: f64,
    pub height: f64,
}

impl AspectRatio {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The 8:10 print ratio.
    pub fn print_8x10() -> Self {
        Self::new(8.0, 10.0)
    }

    pub fn value(self) -> f64 {
        self.width / self.height
    }

    /// Height paired with `width` under this ratio.
    pub fn height_for(self, width: f64) -> f64 {
        width * self.height / self.width
    }

    /// Width paired with `height` under this ratio.
    pub fn width_for(self, height: f64) -> f64 {
        height * self.width / self.height
    }
}

/// Physical print size, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalSize {
    pub width: f64,
    pub height: f64,
}

impl PhysicalSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn ratio(self) -> AspectRatio {
        AspectRatio::new(self.width, self.height)
    }

    fn is_valid(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Physical size plus print density. Defines the exact output raster size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub size: PhysicalSize,
    pub dpi: f64,
}

impl TargetSpec {
    pub fn new(size: PhysicalSize, dpi: f64) -> Result<Self, TargetError> {
        if !size.is_valid() {
            return Err(TargetError::InvalidSize {
                width: size.width,
                height: size.height,
            });
        }
        if !dpi.is_finite() || dpi <= 0.0 {
            return Err(TargetError::InvalidDpi(dpi));
        }
        Ok(Self { size, dpi })
    }

    /// Build the export target, falling back to [`DEFAULT_EXPORT_DPI`].
    pub fn for_export(size: PhysicalSize, dpi: Option<f64>) -> Result<Self, TargetError> {
        let dpi = dpi.unwrap_or_else(|| {
            log::debug!("no target DPI configured, exporting at {DEFAULT_EXPORT_DPI}");
            DEFAULT_EXPORT_DPI
        });
        Self::new(size, dpi)
    }

    pub fn ratio(&self) -> AspectRatio {
        self.size.ratio()
    }

    /// Output raster size: physical x DPI, height derived from the rounded width.
    pub fn output_dimensions(&self) -> Dimensions {
        crate::imaging::output_pixel_dimensions(self.size, self.dpi)
    }
}

/// How a [`SelectionRect`] is interpreted by the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// The rectangle is a region of the image, drawn edge to edge.
    #[default]
    Crop,
    /// The rectangle is where the whole image sits inside the fixed frame.
    Placement,
}

impl FromStr for SelectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "crop" => Ok(Self::Crop),
            "placement" | "place" => Ok(Self::Placement),
            other => Err(format!("unknown selection mode '{other}' (expected crop or placement)")),
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Crop => f.write_str("crop"),
            Self::Placement => f.write_str("placement"),
        }
    }
}

/// A rectangle in percentage units of its containing box.
///
/// Values produced by [`CropRegion`](crate::crop::CropRegion) hold the
/// target ratio in native pixels and stay inside `0..=100`. Values built
/// directly are candidates and carry no guarantee until corrected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SelectionRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole box.
    pub fn full() -> Self {
        Self::new(0.0, 0.0, 100.0, 100.0)
    }

    /// Convert a rectangle measured in displayed (on-screen) pixels.
    pub fn from_display_pixels(x: f64, y: f64, width: f64, height: f64, displayed: Dimensions) -> Self {
        let dw = displayed.width as f64;
        let dh = displayed.height as f64;
        Self::new(x / dw * 100.0, y / dh * 100.0, width / dw * 100.0, height / dh * 100.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
    }

    /// All edges inside `0..=100`, within floating-point slack.
    pub fn is_within_bounds(&self) -> bool {
        const SLACK: f64 = 1e-9;
        self.x >= -SLACK
            && self.y >= -SLACK
            && self.right() <= 100.0 + SLACK
            && self.bottom() <= 100.0 + SLACK
    }

    /// Width and height in the pixels of a box of size `native`.
    pub fn native_size(&self, native: Dimensions) -> (f64, f64) {
        (
            self.width / 100.0 * native.width as f64,
            self.height / 100.0 * native.height as f64,
        )
    }
}
