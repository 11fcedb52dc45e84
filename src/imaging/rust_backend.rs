//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG) | `image` crate |
//! | Resolution | `kamadak-exif` (X/YResolution + ResolutionUnit), then JFIF / `pHYs` fallback |
//! | Crop | `image::imageops::crop_imm` |
//! | Resample | `image::imageops::resize` with `Lanczos3`, skipped at 1:1 |
//! | Draw | `image::imageops::replace` on a background-filled canvas, visible part only |
//! | Encode → JPEG | `JpegEncoder` at quality 90–100 with JFIF density |
//! | Encode → PNG | `PngEncoder` (lossless) |

use super::backend::{BackendError, ImageBackend};
use super::calculations::visible_placement;
use super::params::{ComposeParams, ComposePlan, EncodeParams, OutputFormat};
use crate::metadata::Resolution;
use crate::types::Dimensions;
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageReader, Rgb, RgbImage};
use std::io::{BufWriter, Cursor};

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(BackendError::Io)
}

/// Decode an in-memory image.
fn load_image(bytes: &[u8]) -> Result<DynamicImage, BackendError> {
    reader(bytes)?
        .decode()
        .map_err(|e| BackendError::Decode(e.to_string()))
}

/// Flatten onto `background` when the source has alpha; otherwise a plain RGB view.
fn to_rgb_over(img: DynamicImage, background: [u8; 3]) -> RgbImage {
    if !img.color().has_alpha() {
        return img.into_rgb8();
    }
    let rgba = img.into_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let px = rgba.get_pixel(x, y).0;
        let alpha = px[3] as u32;
        let mix = |fg: u8, bg: u8| ((fg as u32 * alpha + bg as u32 * (255 - alpha) + 127) / 255) as u8;
        Rgb([
            mix(px[0], background[0]),
            mix(px[1], background[1]),
            mix(px[2], background[2]),
        ])
    })
}

/// Resample only when the size actually changes, so 1:1 draws are exact copies.
fn scale_to(img: RgbImage, width: u32, height: u32) -> RgbImage {
    if img.dimensions() == (width, height) {
        img
    } else {
        imageops::resize(&img, width, height, FilterType::Lanczos3)
    }
}

/// Resolution from EXIF, or `None` when there is no usable EXIF resolution.
fn exif_resolution(bytes: &[u8]) -> Option<Resolution> {
    let mut cursor = Cursor::new(bytes);
    let exif = exif::Reader::new().read_from_container(&mut cursor).ok()?;

    // ResolutionUnit: 1 = none, 2 = inch (default), 3 = centimetre
    let scale = match exif
        .get_field(exif::Tag::ResolutionUnit, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
    {
        Some(1) => return None,
        Some(3) => 2.54,
        _ => 1.0,
    };

    let read = |tag: exif::Tag| -> Option<f64> {
        let field = exif.get_field(tag, exif::In::PRIMARY)?;
        let value = match &field.value {
            exif::Value::Rational(values) => values.first()?.to_f64(),
            _ => return None,
        };
        (value.is_finite() && value > 0.0).then_some(value * scale)
    };

    let resolution = Resolution {
        dpi_x: read(exif::Tag::XResolution),
        dpi_y: read(exif::Tag::YResolution),
    };
    resolution.is_known().then_some(resolution)
}

impl ImageBackend for RustBackend {
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError> {
        let (width, height) = reader(bytes)?
            .into_dimensions()
            .map_err(|e| BackendError::Decode(format!("Failed to read dimensions: {}", e)))?;
        if width == 0 || height == 0 {
            return Err(BackendError::Decode(format!("Empty image: {width}x{height}")));
        }
        Ok(Dimensions::new(width, height))
    }

    fn read_resolution(&self, bytes: &[u8]) -> Result<Resolution, BackendError> {
        if let Some(resolution) = exif_resolution(bytes) {
            return Ok(resolution);
        }
        Ok(super::resolution_parser::read_density(bytes))
    }

    fn compose(&self, source: &[u8], params: &ComposeParams) -> Result<RgbImage, BackendError> {
        let img = to_rgb_over(load_image(source)?, params.background);
        let Dimensions { width, height } = params.output;
        let mut canvas = RgbImage::from_pixel(width, height, Rgb(params.background));

        match params.plan {
            ComposePlan::Crop { source: rect } => {
                if rect.x + rect.width > img.width() || rect.y + rect.height > img.height() {
                    return Err(BackendError::ProcessingFailed(format!(
                        "Crop {}x{}+{}+{} exceeds source {}x{}",
                        rect.width,
                        rect.height,
                        rect.x,
                        rect.y,
                        img.width(),
                        img.height()
                    )));
                }
                let region = imageops::crop_imm(&img, rect.x, rect.y, rect.width, rect.height).to_image();
                imageops::replace(&mut canvas, &scale_to(region, width, height), 0, 0);
            }
            ComposePlan::Placement { destination } => {
                let source = Dimensions::new(img.width(), img.height());
                if let Some((region, target)) = visible_placement(&destination, source, params.output) {
                    let part = imageops::crop_imm(&img, region.x, region.y, region.width, region.height).to_image();
                    let scaled = scale_to(part, target.width, target.height);
                    imageops::replace(&mut canvas, &scaled, target.x, target.y);
                }
            }
        }

        Ok(canvas)
    }

    fn encode(&self, image: &RgbImage, params: &EncodeParams) -> Result<(), BackendError> {
        let file = std::fs::File::create(&params.output).map_err(BackendError::Io)?;
        let writer = BufWriter::new(file);
        let result = match params.format {
            OutputFormat::Jpeg => {
                let mut encoder = JpegEncoder::new_with_quality(writer, params.quality.value());
                encoder.set_pixel_density(PixelDensity::dpi(params.dpi));
                encoder.write_image(image.as_raw(), image.width(), image.height(), ExtendedColorType::Rgb8)
            }
            OutputFormat::Png => PngEncoder::new(writer).write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgb8,
            ),
        };
        result.map_err(|e| BackendError::Encode(format!("{} encode failed: {}", params.format, e)))
    }
}
