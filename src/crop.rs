//! Ratio-constrained crop region.
//!
//! A crop is a [`SelectionRect`] in percent of the image. Every rectangle
//! this module hands out satisfies three rules, checked in native pixels
//! rather than displayed pixels:
//!
//! 1. `native_width / native_height` equals the print ratio.
//! 2. Both native sides are at least the [`MinimumSize`], unless the image
//!    itself is smaller, in which case the crop is as large as the image allows.
//! 3. The rectangle lies inside `0..=100` on both axes.
//!
//! Corrections happen in [`propose_change`], a pure function called on every
//! interaction tick. Width drives height: the candidate's native width is
//! raised to the minimum, the height is derived from it, and only then is the
//! pair shrunk (ratio intact) to fit the image. Moving the origin back inside
//! the image never resizes.
//!
//! A [`SizeAdvisory`] reports when the result is still under the minimum.
//! It is feedback only and never blocks cropping or export.

use crate::imaging::fit_ratio;
use crate::naming::format_dimension;
use crate::types::{Dimensions, PhysicalSize, SelectionRect};
use std::fmt;

/// Pixel tolerance when comparing a crop against the minimum.
const MIN_SIZE_TOLERANCE: f64 = 1e-6;

/// Minimum native crop size, derived from a minimum width and the print ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimumSize {
    pub width: f64,
    pub height: f64,
}

impl MinimumSize {
    /// `min_width_px` paired with the height the ratio implies (800 → 1000 for 8:10).
    pub fn for_print(min_width_px: u32, print: PhysicalSize) -> Self {
        let width = min_width_px as f64;
        Self {
            width,
            height: print.ratio().height_for(width),
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width.round() as u32, self.height.round() as u32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisoryKind {
    /// The whole image is under the minimum; no crop can fix it.
    SourceTooSmall,
    /// The current crop is under the minimum.
    CropTooSmall,
}

/// Non-blocking size warning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeAdvisory {
    pub kind: AdvisoryKind,
    /// Native pixel size that triggered the advisory.
    pub actual: Dimensions,
    pub minimum: Dimensions,
    pub print: PhysicalSize,
}

impl fmt::Display for SizeAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            AdvisoryKind::SourceTooSmall => write!(
                f,
                "Your image ({}×{}px) is smaller than the recommended minimum size for {}\"×{}\" printing ({}×{}px). The quality may be reduced.",
                self.actual.width,
                self.actual.height,
                format_dimension(self.print.width),
                format_dimension(self.print.height),
                self.minimum.width,
                self.minimum.height
            ),
            AdvisoryKind::CropTooSmall => write!(
                f,
                "Current crop size ({}×{}px) is below the minimum recommended size ({}×{}px) for quality printing.",
                self.actual.width, self.actual.height, self.minimum.width, self.minimum.height
            ),
        }
    }
}

/// Fixed inputs of the crop math for one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropGeometry {
    pub native: Dimensions,
    pub print: PhysicalSize,
    pub minimum: MinimumSize,
}

impl CropGeometry {
    pub fn new(native: Dimensions, print: PhysicalSize, min_width_px: u32) -> Self {
        Self {
            native,
            print,
            minimum: MinimumSize::for_print(min_width_px, print),
        }
    }

    /// True when the image cannot hold a minimum-size crop.
    pub fn source_too_small(&self) -> bool {
        (self.native.width as f64) < self.minimum.width
            || (self.native.height as f64) < self.minimum.height
    }
}

/// Correct a candidate rectangle. Pure.
///
/// Non-finite or non-positive candidates are rejected by returning `current`.
pub fn propose_change(
    geometry: &CropGeometry,
    current: SelectionRect,
    candidate: SelectionRect,
) -> SelectionRect {
    if !candidate.is_finite() || candidate.width <= 0.0 || candidate.height <= 0.0 {
        log::debug!("ignoring invalid crop candidate {candidate:?}");
        return current;
    }

    let ratio = geometry.print.ratio();
    let nw = geometry.native.width as f64;
    let nh = geometry.native.height as f64;

    let (candidate_w, _) = candidate.native_size(geometry.native);
    let mut w = candidate_w.max(geometry.minimum.width);
    let mut h = ratio.height_for(w);
    if w > nw {
        w = nw;
        h = ratio.height_for(w);
    }
    if h > nh {
        h = nh;
        w = ratio.width_for(h);
    }

    let width = (w / nw * 100.0).min(100.0);
    let height = (h / nh * 100.0).min(100.0);
    let x = candidate.x.min(100.0 - width).max(0.0);
    let y = candidate.y.min(100.0 - height).max(0.0);

    let corrected = SelectionRect::new(x, y, width, height);
    if corrected != candidate {
        log::debug!("crop corrected {candidate:?} -> {corrected:?}");
    }
    corrected
}

/// The advisory that applies to `rect`, if any.
///
/// A too-small source always wins and cannot be cleared by any crop.
pub fn advisory_for(geometry: &CropGeometry, rect: &SelectionRect) -> Option<SizeAdvisory> {
    let minimum = geometry.minimum.dimensions();
    if geometry.source_too_small() {
        return Some(SizeAdvisory {
            kind: AdvisoryKind::SourceTooSmall,
            actual: geometry.native,
            minimum,
            print: geometry.print,
        });
    }

    let (w, h) = rect.native_size(geometry.native);
    if w < geometry.minimum.width - MIN_SIZE_TOLERANCE
        || h < geometry.minimum.height - MIN_SIZE_TOLERANCE
    {
        return Some(SizeAdvisory {
            kind: AdvisoryKind::CropTooSmall,
            actual: Dimensions::new(w.round() as u32, h.round() as u32),
            minimum,
            print: geometry.print,
        });
    }
    None
}

/// Crop state for the current image.
#[derive(Debug, Clone, PartialEq)]
pub struct CropRegion {
    geometry: CropGeometry,
    selection: SelectionRect,
    advisory: Option<SizeAdvisory>,
}

impl CropRegion {
    /// Largest ratio rectangle in the image, scaled to `initial_fill` percent
    /// and centred, then passed through the usual corrections.
    pub fn initialize(geometry: CropGeometry, initial_fill: f64) -> Self {
        let (fit_w, fit_h) = fit_ratio(geometry.native, geometry.print.ratio());
        let fill = initial_fill / 100.0;
        let width = fit_w * fill / geometry.native.width as f64 * 100.0;
        let height = fit_h * fill / geometry.native.height as f64 * 100.0;
        let candidate = SelectionRect::new((100.0 - width) / 2.0, (100.0 - height) / 2.0, width, height);

        let mut selection = propose_change(&geometry, candidate, candidate);
        // Re-centre if the minimum grew the rectangle
        selection.x = (100.0 - selection.width) / 2.0;
        selection.y = (100.0 - selection.height) / 2.0;

        let advisory = advisory_for(&geometry, &selection);
        if let Some(advisory) = &advisory {
            log::warn!("{advisory}");
        }
        Self {
            geometry,
            selection,
            advisory,
        }
    }

    /// Apply a resize/move candidate and return the accepted rectangle.
    pub fn propose_change(&mut self, candidate: SelectionRect) -> SelectionRect {
        self.selection = propose_change(&self.geometry, self.selection, candidate);
        self.advisory = advisory_for(&self.geometry, &self.selection);
        self.selection
    }

    pub fn selection(&self) -> SelectionRect {
        self.selection
    }

    pub fn advisory(&self) -> Option<&SizeAdvisory> {
        self.advisory.as_ref()
    }

    pub fn geometry(&self) -> &CropGeometry {
        &self.geometry
    }

    /// Current crop in native pixels.
    pub fn native_size(&self) -> (f64, f64) {
        self.selection.native_size(self.geometry.native)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(w: u32, h: u32) -> CropGeometry {
        CropGeometry::new(Dimensions::new(w, h), PhysicalSize::new(8.0, 10.0), 800)
    }

    /// Candidate of the given native size at the given percent origin.
    fn candidate(g: &CropGeometry, x: f64, y: f64, w_px: f64, h_px: f64) -> SelectionRect {
        SelectionRect::new(
            x,
            y,
            w_px / g.native.width as f64 * 100.0,
            h_px / g.native.height as f64 * 100.0,
        )
    }

    fn native_ratio(g: &CropGeometry, rect: &SelectionRect) -> f64 {
        let (w, h) = rect.native_size(g.native);
        w / h
    }

    #[test]
    fn minimum_for_8x10_is_800_by_1000() {
        let min = MinimumSize::for_print(800, PhysicalSize::new(8.0, 10.0));
        assert_eq!(min.dimensions(), Dimensions::new(800, 1000));
    }

    #[test]
    fn small_candidate_clamps_to_minimum() {
        let g = geometry(4000, 5000);
        let start = SelectionRect::new(0.0, 0.0, 50.0, 50.0);
        let rect = propose_change(&g, start, candidate(&g, 10.0, 10.0, 500.0, 700.0));

        let (w, h) = rect.native_size(g.native);
        assert!((w - 800.0).abs() < 1e-9);
        assert!((h - 1000.0).abs() < 1e-9);
        assert_eq!(advisory_for(&g, &rect), None);
    }

    #[test]
    fn clamp_inside_tiny_source_keeps_ratio_and_bounds() {
        let g = geometry(700, 900);
        let start = SelectionRect::full();
        let rect = propose_change(&g, start, candidate(&g, 0.0, 0.0, 500.0, 700.0));

        let (w, h) = rect.native_size(g.native);
        assert!((w - 700.0).abs() < 1e-9);
        assert!((h - 875.0).abs() < 1e-9);
        assert!(rect.is_within_bounds());
        assert!((native_ratio(&g, &rect) - 0.8).abs() < 1e-3);
        assert_eq!(
            advisory_for(&g, &rect).map(|a| a.kind),
            Some(AdvisoryKind::SourceTooSmall)
        );
    }

    #[test]
    fn width_drives_height() {
        let g = geometry(4000, 5000);
        // Off-ratio candidate: 2000 px wide, 500 px tall
        let rect = propose_change(&g, SelectionRect::full(), candidate(&g, 0.0, 0.0, 2000.0, 500.0));
        let (w, h) = rect.native_size(g.native);
        assert!((w - 2000.0).abs() < 1e-9);
        assert!((h - 2500.0).abs() < 1e-9);
    }

    #[test]
    fn oversize_candidate_shrinks_to_image_height() {
        // Landscape: height is the limit
        let g = geometry(6000, 4000);
        let rect = propose_change(&g, SelectionRect::full(), candidate(&g, 0.0, 0.0, 6000.0, 7500.0));
        let (w, h) = rect.native_size(g.native);
        assert!((h - 4000.0).abs() < 1e-9);
        assert!((w - 3200.0).abs() < 1e-9);
    }

    #[test]
    fn origin_is_pulled_inside_without_resizing() {
        let g = geometry(4000, 5000);
        let rect = propose_change(&g, SelectionRect::full(), SelectionRect::new(90.0, -5.0, 20.0, 20.0));
        assert_eq!(rect.width, 20.0);
        assert_eq!(rect.height, 20.0);
        assert_eq!(rect.x, 80.0);
        assert_eq!(rect.y, 0.0);
    }

    #[test]
    fn invalid_candidate_keeps_current() {
        let g = geometry(4000, 5000);
        let current = SelectionRect::new(10.0, 10.0, 40.0, 40.0);
        assert_eq!(
            propose_change(&g, current, SelectionRect::new(f64::NAN, 0.0, 10.0, 10.0)),
            current
        );
        assert_eq!(
            propose_change(&g, current, SelectionRect::new(0.0, 0.0, 0.0, 10.0)),
            current
        );
        assert_eq!(
            propose_change(&g, current, SelectionRect::new(0.0, 0.0, -5.0, 10.0)),
            current
        );
    }

    #[test]
    fn initialize_centres_eighty_percent_of_fit() {
        let region = CropRegion::initialize(geometry(4000, 5000), 80.0);
        let rect = region.selection();
        assert!((rect.width - 80.0).abs() < 1e-9);
        assert!((rect.height - 80.0).abs() < 1e-9);
        assert!((rect.x - 10.0).abs() < 1e-9);
        assert!((rect.y - 10.0).abs() < 1e-9);
        assert!(region.advisory().is_none());
    }

    #[test]
    fn initialize_landscape_centres_horizontally() {
        let g = geometry(6000, 4000);
        let region = CropRegion::initialize(g, 80.0);
        let rect = region.selection();
        let (w, h) = region.native_size();
        assert!((w - 2560.0).abs() < 1e-9);
        assert!((h - 3200.0).abs() < 1e-9);
        assert!((rect.x + rect.width / 2.0 - 50.0).abs() < 1e-9);
        assert!((rect.y + rect.height / 2.0 - 50.0).abs() < 1e-9);
    }

    #[test]
    fn initialize_grows_to_minimum_and_recentres() {
        // 80% of a 1000x1250 fit is 800x1000 exactly; 50% would be under
        let region = CropRegion::initialize(geometry(1000, 1250), 50.0);
        let (w, h) = region.native_size();
        assert!((w - 800.0).abs() < 1e-9);
        assert!((h - 1000.0).abs() < 1e-9);
        assert!((region.selection().x - 10.0).abs() < 1e-9);
        assert!(region.advisory().is_none());
    }

    #[test]
    fn small_source_advisory_present_at_load_and_persists() {
        let mut region = CropRegion::initialize(geometry(700, 900), 80.0);
        assert_eq!(
            region.advisory().map(|a| a.kind),
            Some(AdvisoryKind::SourceTooSmall)
        );

        region.propose_change(SelectionRect::full());
        region.propose_change(SelectionRect::new(5.0, 5.0, 10.0, 10.0));
        assert_eq!(
            region.advisory().map(|a| a.kind),
            Some(AdvisoryKind::SourceTooSmall)
        );
    }

    #[test]
    fn crop_too_small_reported_for_undersized_rect() {
        let g = geometry(4000, 5000);
        let advisory = advisory_for(&g, &SelectionRect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        assert_eq!(advisory.kind, AdvisoryKind::CropTooSmall);
        assert_eq!(advisory.actual, Dimensions::new(400, 500));
    }

    #[test]
    fn advisory_text_names_sizes() {
        let g = geometry(700, 900);
        let text = advisory_for(&g, &SelectionRect::full()).unwrap().to_string();
        assert_eq!(
            text,
            "Your image (700×900px) is smaller than the recommended minimum size for 8\"×10\" printing (800×1000px). The quality may be reduced."
        );

        let g = geometry(4000, 5000);
        let text = advisory_for(&g, &SelectionRect::new(0.0, 0.0, 10.0, 10.0))
            .unwrap()
            .to_string();
        assert_eq!(
            text,
            "Current crop size (400×500px) is below the minimum recommended size (800×1000px) for quality printing."
        );
    }
}
