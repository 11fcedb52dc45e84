//! Print quality estimate from pixel count and physical size.
//!
//! `dpi = round(mean(width / physical_width, height / physical_height))`,
//! then tiered. Nothing is cached: call again whenever the raster changes.

use crate::metadata::ImageMetadata;
use crate::types::{Dimensions, PhysicalSize};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum QualityTier {
    Unknown,
    Low,
    Acceptable,
    Good,
    Excellent,
}

impl QualityTier {
    pub fn from_dpi(dpi: u32) -> Self {
        match dpi {
            300.. => Self::Excellent,
            200..=299 => Self::Good,
            150..=199 => Self::Acceptable,
            _ => Self::Low,
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unknown => "Unknown",
            Self::Low => "Low",
            Self::Acceptable => "Acceptable",
            Self::Good => "Good",
            Self::Excellent => "Excellent",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityReport {
    /// `None` when there was nothing to measure.
    pub dpi: Option<u32>,
    pub tier: QualityTier,
    pub dimensions: Option<Dimensions>,
    pub physical: PhysicalSize,
}

/// Estimate print density for `dimensions` printed at `physical`.
pub fn estimate(dimensions: Option<Dimensions>, physical: PhysicalSize) -> QualityReport {
    let unknown = QualityReport {
        dpi: None,
        tier: QualityTier::Unknown,
        dimensions,
        physical,
    };
    let Some(dims) = dimensions else {
        return unknown;
    };
    if !(physical.width > 0.0 && physical.height > 0.0) {
        return unknown;
    }

    let dpi_x = dims.width as f64 / physical.width;
    let dpi_y = dims.height as f64 / physical.height;
    let dpi = ((dpi_x + dpi_y) / 2.0).round() as u32;

    QualityReport {
        dpi: Some(dpi),
        tier: QualityTier::from_dpi(dpi),
        dimensions,
        physical,
    }
}

/// Estimate for printing the whole source image at `physical`.
pub fn estimate_from_metadata(metadata: Option<&ImageMetadata>, physical: PhysicalSize) -> QualityReport {
    estimate(metadata.map(ImageMetadata::dimensions), physical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Resolution;

    const EIGHT_BY_TEN: PhysicalSize = PhysicalSize {
        width: 8.0,
        height: 10.0,
    };

    #[test]
    fn full_res_8x10_is_excellent() {
        let report = estimate(Some(Dimensions::new(2400, 3000)), EIGHT_BY_TEN);
        assert_eq!(report.dpi, Some(300));
        assert_eq!(report.tier, QualityTier::Excellent);
    }

    #[test]
    fn two_hundred_dpi_is_good() {
        let report = estimate(Some(Dimensions::new(1600, 2000)), EIGHT_BY_TEN);
        assert_eq!(report.dpi, Some(200));
        assert_eq!(report.tier, QualityTier::Good);
    }

    #[test]
    fn absent_dimensions_are_unknown() {
        let report = estimate(None, EIGHT_BY_TEN);
        assert_eq!(report.dpi, None);
        assert_eq!(report.tier, QualityTier::Unknown);
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(QualityTier::from_dpi(299), QualityTier::Good);
        assert_eq!(QualityTier::from_dpi(199), QualityTier::Acceptable);
        assert_eq!(QualityTier::from_dpi(150), QualityTier::Acceptable);
        assert_eq!(QualityTier::from_dpi(149), QualityTier::Low);
        assert_eq!(QualityTier::from_dpi(0), QualityTier::Low);
    }

    #[test]
    fn mean_of_both_axes_is_rounded() {
        // 1200/8 = 150, 1600/10 = 160 → 155
        let report = estimate(Some(Dimensions::new(1200, 1600)), EIGHT_BY_TEN);
        assert_eq!(report.dpi, Some(155));
        assert_eq!(report.tier, QualityTier::Acceptable);
    }

    #[test]
    fn from_metadata_uses_native_size() {
        let meta = ImageMetadata {
            native_width: 800,
            native_height: 1000,
            resolution: Resolution::default(),
        };
        let report = estimate_from_metadata(Some(&meta), EIGHT_BY_TEN);
        assert_eq!(report.dpi, Some(100));
        assert_eq!(report.tier, QualityTier::Low);
        assert_eq!(estimate_from_metadata(None, EIGHT_BY_TEN).tier, QualityTier::Unknown);
    }
}
