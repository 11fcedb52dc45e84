//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides the geometry) and the [`backend`](super::backend)
//! (which does the pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG quality, restricted to the near-lossless band 90–100 (default 100).
//! - [`OutputFormat`]: JPEG or PNG export.
//! - [`ComposePlan`]: crop source rectangle or placement destination rectangle.
//! - [`ComposeParams`]: output size, plan, and background for one composite.
//! - [`EncodeParams`]: output path, format, quality, and density tag.

use super::calculations::{DestRect, PixelRect};
use crate::types::Dimensions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Lowest JPEG quality accepted for print output.
pub const MIN_PRINT_QUALITY: u8 = 90;

/// JPEG quality for print output (90–100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(MIN_PRINT_QUALITY, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(100)
    }
}

/// Encoded export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            other => Err(format!("unsupported output format '{other}' (expected jpeg or png)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jpeg => f.write_str("JPEG"),
            Self::Png => f.write_str("PNG"),
        }
    }
}

/// What to draw where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposePlan {
    /// Draw this native source region scaled to fill the whole output.
    Crop { source: PixelRect },
    /// Draw the whole source into this output region.
    Placement { destination: DestRect },
}

/// Parameters for one composite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeParams {
    pub output: Dimensions,
    pub plan: ComposePlan,
    /// Solid fill applied before drawing.
    pub background: [u8; 3],
}

/// Parameters for writing a composite to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeParams {
    pub output: PathBuf,
    pub format: OutputFormat,
    pub quality: Quality,
    /// Density written into the file header.
    pub dpi: u16,
}
