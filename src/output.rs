//! CLI output formatting.
//!
//! # Unknown Is A Value
//!
//! Absent resolution is displayed as `Unknown`, never as a number. This is
//! the only module that turns `None` into text.
//!
//! # Output Format
//!
//! ## Info
//!
//! ```text
//! Image
//!     Name: dawn.jpg
//!     Resolution: 4000 x 5000
//!     Type: image/jpeg
//!     Size: 2345.67 KB
//!     DPI (X): 300
//!     DPI (Y): 300
//!     PPI: 300
//! Whole image at 8x10: 500 DPI (Excellent)
//! ```
//!
//! ## Crop
//!
//! ```text
//! Crop selection
//!     Position: 10.00%, 10.00%
//!     Size: 80.00% x 80.00%
//!     Source pixels: 3200 x 4000
//! Warning: Current crop size (400×500px) is below ...
//! ```
//!
//! ## Export
//!
//! ```text
//! Exported 8x10_photo_print_quality.jpg
//!     Path: prints/8x10_photo_print_quality.jpg
//!     Aspect ratio: 8:10
//!     Format: JPEG (quality 100)
//!     Resolution: 2400 x 3000
//!     Print DPI: 300 (Excellent)
//!     Minimum crop: 800 x 1000
//! ```
//!
//! # Architecture
//!
//! Each display has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::crop::SizeAdvisory;
use crate::imaging::{CompositeResult, ExportSettings, OutputFormat};
use crate::metadata::ImageAsset;
use crate::naming::format_dimension;
use crate::quality::QualityReport;
use crate::types::{Dimensions, SelectionMode, SelectionRect};
use std::path::Path;

const UNKNOWN: &str = "Unknown";

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Byte size in kilobytes with two decimals (`12.34 KB`).
pub fn byte_size_label(bytes: u64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

/// A resolution value, or `Unknown`.
fn resolution_label(value: Option<f64>) -> String {
    value.map_or_else(|| UNKNOWN.to_string(), format_dimension)
}

/// `300 (Excellent)` or `Unknown`.
fn quality_label(report: &QualityReport) -> String {
    match report.dpi {
        Some(dpi) => format!("{dpi} ({})", report.tier),
        None => UNKNOWN.to_string(),
    }
}

// ============================================================================
// Asset info
// ============================================================================

pub fn format_asset_info(asset: &ImageAsset, source_quality: &QualityReport) -> Vec<String> {
    let res = asset.metadata.resolution;
    let i = indent(1);
    vec![
        "Image".to_string(),
        format!("{i}Name: {}", asset.name),
        format!("{i}Resolution: {}", asset.metadata.dimensions()),
        format!("{i}Type: {}", asset.mime),
        format!("{i}Size: {}", byte_size_label(asset.byte_size())),
        format!("{i}DPI (X): {}", resolution_label(res.dpi_x)),
        format!("{i}DPI (Y): {}", resolution_label(res.dpi_y)),
        format!("{i}PPI: {}", resolution_label(res.ppi())),
        format!(
            "Whole image at {}x{}: {}",
            format_dimension(source_quality.physical.width),
            format_dimension(source_quality.physical.height),
            match source_quality.dpi {
                Some(dpi) => format!("{dpi} DPI ({})", source_quality.tier),
                None => UNKNOWN.to_string(),
            }
        ),
    ]
}

pub fn print_asset_info(asset: &ImageAsset, source_quality: &QualityReport) {
    for line in format_asset_info(asset, source_quality) {
        println!("{}", line);
    }
}

// ============================================================================
// Selection
// ============================================================================

/// Selection summary. `pixels` is the selection size in source pixels
/// (crop) or frame pixels (placement).
pub fn format_selection(
    mode: SelectionMode,
    rect: &SelectionRect,
    pixels: (f64, f64),
    advisory: Option<&SizeAdvisory>,
) -> Vec<String> {
    let i = indent(1);
    let (title, pixel_label) = match mode {
        SelectionMode::Crop => ("Crop selection", "Source pixels"),
        SelectionMode::Placement => ("Placement", "Frame pixels"),
    };
    let mut lines = vec![
        title.to_string(),
        format!("{i}Position: {:.2}%, {:.2}%", rect.x, rect.y),
        format!("{i}Size: {:.2}% x {:.2}%", rect.width, rect.height),
        format!(
            "{i}{pixel_label}: {} x {}",
            pixels.0.round() as i64,
            pixels.1.round() as i64
        ),
    ];
    lines.extend(format_advisory(advisory));
    lines
}

pub fn print_selection(
    mode: SelectionMode,
    rect: &SelectionRect,
    pixels: (f64, f64),
    advisory: Option<&SizeAdvisory>,
) {
    for line in format_selection(mode, rect, pixels, advisory) {
        println!("{}", line);
    }
}

pub fn format_advisory(advisory: Option<&SizeAdvisory>) -> Vec<String> {
    advisory
        .map(|a| vec![format!("Warning: {a}")])
        .unwrap_or_default()
}

// ============================================================================
// Export
// ============================================================================

fn format_label(settings: ExportSettings) -> String {
    match settings.format {
        OutputFormat::Jpeg => format!("JPEG (quality {})", settings.quality.value()),
        OutputFormat::Png => "PNG (lossless)".to_string(),
    }
}

pub fn format_export_report(
    path: &Path,
    composite: &CompositeResult,
    settings: ExportSettings,
    quality: &QualityReport,
    minimum: Dimensions,
) -> Vec<String> {
    let i = indent(1);
    let size = composite.target.size;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    vec![
        format!("Exported {file_name}"),
        format!("{i}Path: {}", path.display()),
        format!(
            "{i}Aspect ratio: {}:{}",
            format_dimension(size.width),
            format_dimension(size.height)
        ),
        format!("{i}Format: {}", format_label(settings)),
        format!("{i}Resolution: {}", composite.dimensions()),
        format!("{i}Print DPI: {}", quality_label(quality)),
        format!("{i}Minimum crop: {minimum}"),
    ]
}

pub fn print_export_report(
    path: &Path,
    composite: &CompositeResult,
    settings: ExportSettings,
    quality: &QualityReport,
    minimum: Dimensions,
) {
    for line in format_export_report(path, composite, settings, quality, minimum) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::{CropGeometry, advisory_for};
    use crate::imaging::Quality;
    use crate::imaging::backend::tests::MockBackend;
    use crate::metadata::{MimeType, Resolution};
    use crate::quality::estimate;
    use crate::types::{PhysicalSize, TargetSpec};
    use std::io::Cursor;

    const EIGHT_BY_TEN: PhysicalSize = PhysicalSize {
        width: 8.0,
        height: 10.0,
    };

    fn asset(resolution: Resolution) -> ImageAsset {
        let mut buf = Cursor::new(Vec::new());
        image::RgbImage::new(2, 2)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        let backend = MockBackend::with_resolution(4000, 5000, resolution);
        ImageAsset::load(&backend, "dawn.png", MimeType::Png, buf.into_inner()).unwrap()
    }

    #[test]
    fn byte_size_in_kilobytes() {
        assert_eq!(byte_size_label(12636), "12.34 KB");
        assert_eq!(byte_size_label(0), "0.00 KB");
    }

    #[test]
    fn info_shows_known_resolution() {
        let asset = asset(Resolution::new(300.0, 299.72));
        let lines = format_asset_info(&asset, &estimate(Some(asset.metadata.dimensions()), EIGHT_BY_TEN));
        assert_eq!(lines[0], "Image");
        assert_eq!(lines[1], "    Name: dawn.png");
        assert_eq!(lines[2], "    Resolution: 4000 x 5000");
        assert_eq!(lines[3], "    Type: image/png");
        assert_eq!(lines[5], "    DPI (X): 300");
        assert_eq!(lines[6], "    DPI (Y): 299.72");
        assert_eq!(lines[7], "    PPI: 299.86");
        assert_eq!(lines[8], "Whole image at 8x10: 500 DPI (Excellent)");
    }

    #[test]
    fn info_shows_unknown_resolution() {
        let asset = asset(Resolution::default());
        let lines = format_asset_info(&asset, &estimate(None, EIGHT_BY_TEN));
        assert_eq!(lines[5], "    DPI (X): Unknown");
        assert_eq!(lines[6], "    DPI (Y): Unknown");
        assert_eq!(lines[7], "    PPI: Unknown");
        assert_eq!(lines[8], "Whole image at 8x10: Unknown");
    }

    #[test]
    fn selection_with_advisory() {
        let g = CropGeometry::new(Dimensions::new(4000, 5000), EIGHT_BY_TEN, 800);
        let rect = SelectionRect::new(0.0, 0.0, 10.0, 10.0);
        let advisory = advisory_for(&g, &rect);
        let lines = format_selection(SelectionMode::Crop, &rect, (400.0, 500.0), advisory.as_ref());

        assert_eq!(lines[0], "Crop selection");
        assert_eq!(lines[1], "    Position: 0.00%, 0.00%");
        assert_eq!(lines[2], "    Size: 10.00% x 10.00%");
        assert_eq!(lines[3], "    Source pixels: 400 x 500");
        assert!(lines[4].starts_with("Warning: Current crop size (400×500px)"));
    }

    #[test]
    fn selection_without_advisory_has_no_warning() {
        let rect = SelectionRect::new(10.0, 10.0, 80.0, 80.0);
        let lines = format_selection(SelectionMode::Placement, &rect, (1920.0, 2400.0), None);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Placement");
        assert_eq!(lines[3], "    Frame pixels: 1920 x 2400");
    }

    #[test]
    fn export_report_lines() {
        let target = TargetSpec::new(EIGHT_BY_TEN, 300.0).unwrap();
        let composite = CompositeResult {
            raster: image::RgbImage::new(2400, 3000),
            target,
            mode: SelectionMode::Crop,
            selection: SelectionRect::full(),
        };
        let quality = estimate(Some(composite.dimensions()), EIGHT_BY_TEN);
        let lines = format_export_report(
            Path::new("prints/8x10_photo_print_quality.jpg"),
            &composite,
            ExportSettings::default(),
            &quality,
            Dimensions::new(800, 1000),
        );

        assert_eq!(
            lines,
            vec![
                "Exported 8x10_photo_print_quality.jpg",
                "    Path: prints/8x10_photo_print_quality.jpg",
                "    Aspect ratio: 8:10",
                "    Format: JPEG (quality 100)",
                "    Resolution: 2400 x 3000",
                "    Print DPI: 300 (Excellent)",
                "    Minimum crop: 800 x 1000",
            ]
        );
    }

    #[test]
    fn png_format_label() {
        let settings = ExportSettings {
            format: OutputFormat::Png,
            quality: Quality::default(),
        };
        assert_eq!(format_label(settings), "PNG (lossless)");
    }
}
