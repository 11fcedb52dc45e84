//! Placement region: the frame stays fixed and the image moves inside it.
//!
//! The rectangle is the position and size of the whole image in percent of
//! the frame. The image keeps its own aspect ratio, measured in frame pixels,
//! so the width alone decides the size. It may be smaller than the frame
//! (leaving background margins) or larger (overhanging edges are clipped by
//! the compositor).
//!
//! Position rule: an image narrower than the frame stays inside it; an image
//! wider than the frame keeps the frame covered. The same applies vertically.

use crate::types::{Dimensions, SelectionRect};

/// Placement state for the current image.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRegion {
    native: Dimensions,
    frame: Dimensions,
    selection: SelectionRect,
}

impl PlacementRegion {
    /// Image at `initial_scale` of its native size, anchored top-left.
    pub fn initialize(native: Dimensions, frame: Dimensions, initial_scale: f64) -> Self {
        let width = native.width as f64 * initial_scale / frame.width as f64 * 100.0;
        let height = native.height as f64 * initial_scale / frame.height as f64 * 100.0;
        let start = SelectionRect::new(0.0, 0.0, width, height);

        let mut region = Self {
            native,
            frame,
            selection: start,
        };
        region.selection = region.correct(start);
        region
    }

    /// Apply a pan/scale candidate and return the accepted rectangle.
    ///
    /// Non-finite or non-positive candidates leave the placement unchanged.
    pub fn propose_change(&mut self, candidate: SelectionRect) -> SelectionRect {
        if !candidate.is_finite() || candidate.width <= 0.0 {
            log::debug!("ignoring invalid placement candidate {candidate:?}");
            return self.selection;
        }
        self.selection = self.correct(candidate);
        self.selection
    }

    fn correct(&self, candidate: SelectionRect) -> SelectionRect {
        let fw = self.frame.width as f64;
        let fh = self.frame.height as f64;
        let image_aspect = self.native.height as f64 / self.native.width as f64;

        let width = candidate.width;
        let height = width / 100.0 * fw * image_aspect / fh * 100.0;

        let (x_lo, x_hi) = position_range(width);
        let (y_lo, y_hi) = position_range(height);
        SelectionRect::new(
            candidate.x.clamp(x_lo, x_hi),
            candidate.y.clamp(y_lo, y_hi),
            width,
            height,
        )
    }

    pub fn selection(&self) -> SelectionRect {
        self.selection
    }

    pub fn frame(&self) -> Dimensions {
        self.frame
    }

    /// Image size in frame pixels.
    pub fn content_size(&self) -> (f64, f64) {
        self.selection.native_size(self.frame)
    }
}

/// Allowed origin range for a side of `size` percent.
fn position_range(size: f64) -> (f64, f64) {
    let slack = 100.0 - size;
    (slack.min(0.0), slack.max(0.0))
}
