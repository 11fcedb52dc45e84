//! Compositor: source bytes in, print-sized raster out.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` |
//! | **Resolution** | `kamadak-exif`, then JFIF / `pHYs` density parser |
//! | **Crop → fill** | `crop_imm` + Lanczos3 (exact copy at 1:1) |
//! | **Placement** | Lanczos3 + `imageops::replace` onto a background canvas |
//! | **Encode** | JPEG (quality 90–100, JFIF density) or PNG |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for print geometry (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
mod resolution_parser;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{
    DestRect, DisplayScale, PixelRect, covered_pixels, crop_source_rect, display_scale, fit_ratio,
    output_pixel_dimensions, placement_dest_rect, visible_placement,
};
pub use operations::{
    ComposeError, ComposeRequest, CompositeResult, ExportSettings, compose, export, plan_composite,
    read_metadata,
};
pub use params::{ComposeParams, ComposePlan, EncodeParams, MIN_PRINT_QUALITY, OutputFormat, Quality};
pub use rust_backend::RustBackend;
