//! High-level image operations.
//!
//! These functions combine calculations with backend execution. They take a
//! selection and a target, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{crop_source_rect, placement_dest_rect};
use super::params::{ComposeParams, ComposePlan, EncodeParams, OutputFormat, Quality};
use crate::metadata::{ImageAsset, ImageMetadata};
use crate::naming::export_file_name;
use crate::types::{Dimensions, SelectionMode, SelectionRect, TargetError, TargetSpec};
use image::RgbImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for backend-only operations.
pub type Result<T> = std::result::Result<T, BackendError>;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("No finalized selection: complete a crop or placement before exporting")]
    NotReady,
    #[error("Invalid print target: {0}")]
    InvalidTarget(#[from] TargetError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Read native dimensions and embedded resolution.
pub fn read_metadata(backend: &impl ImageBackend, bytes: &[u8]) -> Result<ImageMetadata> {
    let dims = backend.identify(bytes)?;
    let resolution = backend.read_resolution(bytes)?;
    Ok(ImageMetadata {
        native_width: dims.width,
        native_height: dims.height,
        resolution,
    })
}

/// Everything the compositor needs besides the source bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeRequest {
    /// The finalized selection, or `None` if the user never completed one.
    pub selection: Option<SelectionRect>,
    pub mode: SelectionMode,
    pub target: TargetSpec,
    /// Size the image was shown at when the selection was made. Crop mode only.
    pub displayed: Dimensions,
    pub background: [u8; 3],
}

/// The rendered print and the target it was rendered for.
#[derive(Debug, Clone)]
pub struct CompositeResult {
    pub raster: RgbImage,
    pub target: TargetSpec,
    pub mode: SelectionMode,
    pub selection: SelectionRect,
}

impl CompositeResult {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.raster.width(), self.raster.height())
    }
}

/// Plan a composite without executing it.
pub fn plan_composite(
    native: Dimensions,
    request: &ComposeRequest,
) -> std::result::Result<ComposeParams, ComposeError> {
    let selection = request.selection.ok_or(ComposeError::NotReady)?;
    let output = request.target.output_dimensions();

    let plan = match request.mode {
        SelectionMode::Crop => ComposePlan::Crop {
            source: crop_source_rect(&selection, native, request.displayed),
        },
        SelectionMode::Placement => ComposePlan::Placement {
            destination: placement_dest_rect(&selection, output),
        },
    };

    Ok(ComposeParams {
        output,
        plan,
        background: request.background,
    })
}

/// Render the selection of `asset` at the target's exact pixel size.
///
/// Refused with [`ComposeError::NotReady`] before any decoding when there is
/// no finalized selection.
pub fn compose(
    backend: &impl ImageBackend,
    asset: &ImageAsset,
    request: &ComposeRequest,
) -> std::result::Result<CompositeResult, ComposeError> {
    let params = plan_composite(asset.metadata.dimensions(), request)?;
    log::debug!(
        "composing {} as {:?} into {}",
        asset.name,
        params.plan,
        params.output
    );
    let raster = backend.compose(asset.bytes(), &params)?;

    Ok(CompositeResult {
        raster,
        target: request.target,
        mode: request.mode,
        selection: request.selection.ok_or(ComposeError::NotReady)?,
    })
}

/// Encoding choices for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportSettings {
    pub format: OutputFormat,
    pub quality: Quality,
}

/// Write `composite` into `output_dir` under its deterministic name.
///
/// The file carries the target DPI in its density header.
pub fn export(
    backend: &impl ImageBackend,
    composite: &CompositeResult,
    output_dir: &Path,
    settings: ExportSettings,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(export_file_name(composite.target.size, settings.format));
    let dpi = composite.target.dpi.round().clamp(1.0, u16::MAX as f64) as u16;

    backend.encode(
        &composite.raster,
        &EncodeParams {
            output: path.clone(),
            format: settings.format,
            quality: settings.quality,
            dpi,
        },
    )?;
    log::info!("exported {} ({})", path.display(), composite.dimensions());
    Ok(path)
}
