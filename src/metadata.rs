//! Source image metadata: native size, embedded resolution, and type.
//!
//! ## Absent resolution
//!
//! Formats without a resolution tag produce `None` for `dpi_x`/`dpi_y`.
//! That absence travels unchanged through [`Resolution::ppi`], the quality
//! estimator, and the info display (which prints "Unknown"). The only place
//! it becomes a number is the export target, see
//! [`TargetSpec::for_export`](crate::types::TargetSpec::for_export).
//!
//! ## Combined resolution
//!
//! PPI is the arithmetic mean of the horizontal and vertical DPI, rounded to
//! two decimals, and exists only when both are present.
//!
//! ## Accepted types
//!
//! `image/png`, `image/jpeg` and its alias `image/jpg`. The declared type
//! must agree with what the bytes actually are; a `.jpg` that is really a
//! GIF is refused before any geometry work.

use crate::imaging::{ImageBackend, read_metadata};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("{0} type is not supported. Please choose a PNG, JPG, or JPEG image instead.")]
    UnsupportedType(String),
    #[error("Image could not be read: {0}")]
    Undecodable(String),
}

/// Horizontal and vertical resolution in dots per inch, each optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub dpi_x: Option<f64>,
    pub dpi_y: Option<f64>,
}

impl Resolution {
    pub fn new(dpi_x: f64, dpi_y: f64) -> Self {
        Self {
            dpi_x: Some(dpi_x),
            dpi_y: Some(dpi_y),
        }
    }

    /// True when at least one axis is known.
    pub fn is_known(&self) -> bool {
        self.dpi_x.is_some() || self.dpi_y.is_some()
    }

    /// Mean of both axes rounded to 2 decimals; `None` unless both are present.
    pub fn ppi(&self) -> Option<f64> {
        let (x, y) = (self.dpi_x?, self.dpi_y?);
        Some(((x + y) / 2.0 * 100.0).round() / 100.0)
    }
}

/// Output of the metadata reader.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub native_width: u32,
    pub native_height: u32,
    pub resolution: Resolution,
}

impl ImageMetadata {
    pub fn dimensions(&self) -> crate::types::Dimensions {
        crate::types::Dimensions::new(self.native_width, self.native_height)
    }
}

/// Accepted source MIME types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MimeType {
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg", alias = "image/jpg")]
    Jpeg,
}

impl MimeType {
    /// Parse a declared MIME type. `image/jpg` is accepted as JPEG.
    pub fn parse(mime: &str) -> Result<Self, MetadataError> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Ok(Self::Png),
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            _ => Err(MetadataError::UnsupportedType(mime.to_string())),
        }
    }

    /// Infer from a file extension (`png`, `jpg`, `jpeg`).
    pub fn from_path(path: &Path) -> Result<Self, MetadataError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "" => Err(MetadataError::UnsupportedType("(no extension)".to_string())),
            other => Err(MetadataError::UnsupportedType(format!(".{other}"))),
        }
    }

    /// Check that `bytes` really are this type.
    pub fn verify(self, bytes: &[u8]) -> Result<(), MetadataError> {
        let actual = image::guess_format(bytes)
            .map_err(|_| MetadataError::Undecodable("unrecognised file signature".to_string()))?;
        let matches = matches!(
            (self, actual),
            (Self::Png, image::ImageFormat::Png) | (Self::Jpeg, image::ImageFormat::Jpeg)
        );
        if matches {
            Ok(())
        } else {
            Err(MetadataError::UnsupportedType(format!(
                "{} (declared {})",
                actual.to_mime_type(),
                self.as_str()
            )))
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A loaded source image. Immutable once built.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    /// Stable content key (SHA-256 of the bytes).
    pub id: String,
    pub name: String,
    pub mime: MimeType,
    pub metadata: ImageMetadata,
    bytes: Vec<u8>,
}

impl ImageAsset {
    /// Validate type, then read metadata. Nothing is decoded beyond the header.
    pub fn load(
        backend: &impl ImageBackend,
        name: impl Into<String>,
        mime: MimeType,
        bytes: Vec<u8>,
    ) -> Result<Self, MetadataError> {
        mime.verify(&bytes)?;
        let metadata =
            read_metadata(backend, &bytes).map_err(|e| MetadataError::Undecodable(e.to_string()))?;
        Ok(Self {
            id: crate::store::hash_bytes(&bytes),
            name: name.into(),
            mime,
            metadata,
            bytes,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}
