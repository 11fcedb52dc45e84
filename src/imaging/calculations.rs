//! Pure calculation functions for print geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use crate::types::{AspectRatio, Dimensions, PhysicalSize, SelectionRect};

/// Calculate the output raster size for a physical print.
///
/// The width is rounded from `physical width x dpi`; the height is derived
/// from that rounded width and the physical ratio so the pair never drifts
/// from the ratio by more than one pixel.
///
/// # Examples
/// ```
/// # use print_frame::imaging::output_pixel_dimensions;
/// # use print_frame::types::{Dimensions, PhysicalSize};
/// assert_eq!(
///     output_pixel_dimensions(PhysicalSize::new(8.0, 10.0), 300.0),
///     Dimensions::new(2400, 3000)
/// );
/// ```
pub fn output_pixel_dimensions(size: PhysicalSize, dpi: f64) -> Dimensions {
    let width = (size.width * dpi).round().max(1.0);
    let height = size.ratio().height_for(width).round().max(1.0);
    Dimensions::new(width as u32, height as u32)
}

/// Largest rectangle of `ratio` that fits inside `native`, in native pixels.
pub fn fit_ratio(native: Dimensions, ratio: AspectRatio) -> (f64, f64) {
    let nw = native.width as f64;
    let nh = native.height as f64;
    if nw / nh > ratio.value() {
        // Wider than the ratio: height is the limiting dimension
        (ratio.width_for(nh), nh)
    } else {
        (nw, ratio.height_for(nw))
    }
}

/// Native-per-displayed scale factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayScale {
    pub x: f64,
    pub y: f64,
}

/// `scaleX = nativeW / displayedW`, `scaleY = nativeH / displayedH`.
pub fn display_scale(native: Dimensions, displayed: Dimensions) -> DisplayScale {
    DisplayScale {
        x: native.width as f64 / displayed.width.max(1) as f64,
        y: native.height as f64 / displayed.height.max(1) as f64,
    }
}

/// An integer rectangle inside a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Map a crop selection (percent of the displayed image) to native source pixels.
///
/// The selection is first placed on the displayed image, then scaled by
/// [`display_scale`]. The result is clamped to the source and is never empty.
pub fn crop_source_rect(selection: &SelectionRect, native: Dimensions, displayed: Dimensions) -> PixelRect {
    let scale = display_scale(native, displayed);
    let dw = displayed.width as f64;
    let dh = displayed.height as f64;

    let x = (selection.x / 100.0 * dw * scale.x).round().max(0.0) as u32;
    let y = (selection.y / 100.0 * dh * scale.y).round().max(0.0) as u32;
    let width = (selection.width / 100.0 * dw * scale.x).round().max(1.0) as u32;
    let height = (selection.height / 100.0 * dh * scale.y).round().max(1.0) as u32;

    let x = x.min(native.width.saturating_sub(1));
    let y = y.min(native.height.saturating_sub(1));
    PixelRect {
        x,
        y,
        width: width.min(native.width - x).max(1),
        height: height.min(native.height - y).max(1),
    }
}

/// Where the whole source lands in the output raster for a placement.
///
/// The offset may be negative and the size may exceed the output: the
/// compositor clips whatever falls outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Map a placement (percent of the frame) onto the output raster.
pub fn placement_dest_rect(selection: &SelectionRect, output: Dimensions) -> DestRect {
    let ow = output.width as f64;
    let oh = output.height as f64;
    DestRect {
        x: (selection.x / 100.0 * ow).round() as i64,
        y: (selection.y / 100.0 * oh).round() as i64,
        width: (selection.width / 100.0 * ow).round().max(1.0) as u32,
        height: (selection.height / 100.0 * oh).round().max(1.0) as u32,
    }
}

/// The part of `dest` that lies on the output, or `None` when nothing does.
fn clip_to_output(dest: &DestRect, output: Dimensions) -> Option<DestRect> {
    let left = dest.x.max(0);
    let top = dest.y.max(0);
    let right = dest.x.saturating_add(dest.width as i64).min(output.width as i64);
    let bottom = dest.y.saturating_add(dest.height as i64).min(output.height as i64);
    if right <= left || bottom <= top {
        return None;
    }
    Some(DestRect {
        x: left,
        y: top,
        width: (right - left) as u32,
        height: (bottom - top) as u32,
    })
}

/// Number of output pixels covered by a placement, after clipping.
pub fn covered_pixels(dest: &DestRect, output: Dimensions) -> u64 {
    clip_to_output(dest, output).map_or(0, |c| c.width as u64 * c.height as u64)
}

/// Source region to draw for a placement and where it lands, clipped to the output.
///
/// Only the visible part is resampled, so the work stays bounded by the
/// output size however far the placement is zoomed. The source region is
/// widened to whole pixels; `None` means the image is entirely off the frame.
///
/// ```
/// use print_frame::imaging::{DestRect, visible_placement};
/// use print_frame::types::Dimensions;
///
/// let dest = DestRect { x: 0, y: 0, width: 120_000, height: 120_000 };
/// let (region, target) =
///     visible_placement(&dest, Dimensions::new(10, 10), Dimensions::new(2400, 3000)).unwrap();
/// assert_eq!((region.width, region.height), (1, 1));
/// assert_eq!((target.width, target.height), (2400, 3000));
/// ```
pub fn visible_placement(
    dest: &DestRect,
    source: Dimensions,
    output: Dimensions,
) -> Option<(PixelRect, DestRect)> {
    if source.width == 0 || source.height == 0 {
        return None;
    }
    let target = clip_to_output(dest, output)?;

    let sx = source.width as f64 / dest.width as f64;
    let sy = source.height as f64 / dest.height as f64;
    let x0 = (((target.x - dest.x) as f64 * sx).floor() as u32).min(source.width - 1);
    let y0 = (((target.y - dest.y) as f64 * sy).floor() as u32).min(source.height - 1);
    let x1 = (((target.x - dest.x + target.width as i64) as f64 * sx).ceil() as u32).clamp(x0 + 1, source.width);
    let y1 = (((target.y - dest.y + target.height as i64) as f64 * sy).ceil() as u32).clamp(y0 + 1, source.height);

    let region = PixelRect {
        x: x0,
        y: y0,
        width: x1 - x0,
        height: y1 - y0,
    };
    Some((region, target))
}
