//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four operations every backend must
//! support: identify, read_resolution, compose, and encode. All inputs are
//! in-memory bytes; only `encode` touches the filesystem.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) on top of the `image`
//! crate.

use super::params::{ComposeParams, EncodeParams};
use crate::metadata::Resolution;
use crate::types::Dimensions;
use image::RgbImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode image: {0}")]
    Encode(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Native pixel dimensions, read from the header without a full decode.
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError>;

    /// Embedded horizontal/vertical resolution. Missing tags are `None`, not an error.
    fn read_resolution(&self, bytes: &[u8]) -> Result<Resolution, BackendError>;

    /// Decode `source` and render it into a raster of exactly `params.output`.
    fn compose(&self, source: &[u8], params: &ComposeParams) -> Result<RgbImage, BackendError>;

    /// Write a raster to `params.output`.
    fn encode(&self, image: &RgbImage, params: &EncodeParams) -> Result<(), BackendError>;
}
