//! Minimal density-tag parser for files without EXIF resolution.
//!
//! Reads two container-level density fields:
//! - JPEG: JFIF APP0 (`FF E0`, `"JFIF\0"`) units + X/Y density
//! - PNG: `pHYs` chunk, pixels per unit with unit byte
//!
//! Densities with no absolute unit (pixel aspect only) are reported as
//! absent. EXIF is handled by `kamadak-exif` in the backend before this
//! parser is consulted.

use crate::metadata::Resolution;

const INCHES_PER_METER: f64 = 39.370_078_740_157_48;
const CM_PER_INCH: f64 = 2.54;

/// Read density from JFIF or `pHYs`, dispatching on the file signature.
/// Returns an empty [`Resolution`] on any parse failure.
pub fn read_density(data: &[u8]) -> Resolution {
    if data.starts_with(&[0xFF, 0xD8]) {
        read_jfif_density(data)
    } else if data.starts_with(PNG_SIGNATURE) {
        read_png_density(data)
    } else {
        Resolution::default()
    }
}

fn round_2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn positive(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

// ---------------------------------------------------------------------------
// JPEG: JFIF APP0
// ---------------------------------------------------------------------------

const JFIF_IDENT: &[u8] = b"JFIF\0";

/// Extract density from a JPEG's JFIF APP0 segment.
///
/// APP0 payload layout after the 2-byte length:
///   0..5   "JFIF\0"
///   5..7   version
///   7      units (0 = aspect only, 1 = dots/inch, 2 = dots/cm)
///   8..10  X density (big-endian u16)
///   10..12 Y density (big-endian u16)
fn read_jfif_density(data: &[u8]) -> Resolution {
    let Some(segment) = find_jpeg_app0(data) else {
        return Resolution::default();
    };
    if segment.len() < 12 || !segment.starts_with(JFIF_IDENT) {
        return Resolution::default();
    }

    let scale = match segment[7] {
        1 => 1.0,
        2 => CM_PER_INCH,
        _ => return Resolution::default(),
    };
    let x = u16::from_be_bytes([segment[8], segment[9]]) as f64;
    let y = u16::from_be_bytes([segment[10], segment[11]]) as f64;

    Resolution {
        dpi_x: positive(round_2(x * scale)),
        dpi_y: positive(round_2(y * scale)),
    }
}

/// Find the payload of the first JFIF APP0 segment.
fn find_jpeg_app0(data: &[u8]) -> Option<&[u8]> {
    // Skip SOI
    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        // Fill bytes
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // SOS: entropy-coded data follows, no more headers
        if marker == 0xDA || marker == 0xD9 {
            return None;
        }
        if (0xD0..=0xD7).contains(&marker) || marker == 0x01 {
            pos += 2;
            continue;
        }

        let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if seg_len < 2 {
            return None;
        }
        let seg_start = pos + 4;
        let seg_end = (pos + 2 + seg_len).min(data.len());

        if marker == 0xE0 && data[seg_start..seg_end].starts_with(JFIF_IDENT) {
            return Some(&data[seg_start..seg_end]);
        }
        pos += 2 + seg_len;
    }
    None
}

// ---------------------------------------------------------------------------
// PNG: pHYs chunk
// ---------------------------------------------------------------------------

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Extract density from a PNG `pHYs` chunk.
///
/// Chunk layout: length (4, BE) + type (4) + data + CRC (4).
/// `pHYs` data: X pixels/unit (4), Y pixels/unit (4), unit (1 = metre).
/// The chunk must precede `IDAT`; scanning stops there.
fn read_png_density(data: &[u8]) -> Resolution {
    let mut pos = PNG_SIGNATURE.len();
    while pos + 8 <= data.len() {
        let len =
            u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]) as usize;
        let kind = &data[pos + 4..pos + 8];
        let body_start = pos + 8;
        let Some(body_end) = body_start.checked_add(len).filter(|end| *end <= data.len()) else {
            break;
        };

        match kind {
            b"pHYs" if len >= 9 => {
                let body = &data[body_start..body_end];
                if body[8] != 1 {
                    return Resolution::default();
                }
                let x = u32::from_be_bytes([body[0], body[1], body[2], body[3]]) as f64;
                let y = u32::from_be_bytes([body[4], body[5], body[6], body[7]]) as f64;
                return Resolution {
                    dpi_x: positive(round_2(x / INCHES_PER_METER)),
                    dpi_y: positive(round_2(y / INCHES_PER_METER)),
                };
            }
            b"IDAT" | b"IEND" => break,
            _ => {}
        }

        // Skip body and CRC
        pos = body_end + 4;
    }
    Resolution::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jfif(units: u8, x: u16, y: u16) -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        data.extend_from_slice(b"JFIF\0");
        data.extend_from_slice(&[0x01, 0x02, units]);
        data.extend_from_slice(&x.to_be_bytes());
        data.extend_from_slice(&y.to_be_bytes());
        data.extend_from_slice(&[0x00, 0x00]); // no thumbnail
        data.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02]);
        data
    }

    fn png_with_chunk(kind: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut data = PNG_SIGNATURE.to_vec();
        // IHDR with dummy contents
        data.extend_from_slice(&13u32.to_be_bytes());
        data.extend_from_slice(b"IHDR");
        data.extend_from_slice(&[0u8; 13]);
        data.extend_from_slice(&[0u8; 4]);
        data.extend_from_slice(&(body.len() as u32).to_be_bytes());
        data.extend_from_slice(kind);
        data.extend_from_slice(body);
        data.extend_from_slice(&[0u8; 4]);
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(b"IEND");
        data.extend_from_slice(&[0u8; 4]);
        data
    }

    fn phys(x: u32, y: u32, unit: u8) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&x.to_be_bytes());
        body.extend_from_slice(&y.to_be_bytes());
        body.push(unit);
        png_with_chunk(b"pHYs", &body)
    }

    #[test]
    fn empty_input_is_unknown() {
        assert_eq!(read_density(&[]), Resolution::default());
    }

    #[test]
    fn jfif_dots_per_inch() {
        let r = read_density(&jfif(1, 300, 240));
        assert_eq!(r.dpi_x, Some(300.0));
        assert_eq!(r.dpi_y, Some(240.0));
    }

    #[test]
    fn jfif_dots_per_cm_converts() {
        let r = read_density(&jfif(2, 118, 118));
        assert_eq!(r.dpi_x, Some(299.72));
    }

    #[test]
    fn jfif_aspect_only_is_unknown() {
        assert_eq!(read_density(&jfif(0, 1, 1)), Resolution::default());
    }

    #[test]
    fn jfif_zero_density_is_unknown() {
        let r = read_density(&jfif(1, 0, 300));
        assert_eq!(r.dpi_x, None);
        assert_eq!(r.dpi_y, Some(300.0));
    }

    #[test]
    fn png_phys_metres_convert_to_inches() {
        // 11811 px/m ≈ 300 dpi
        let r = read_density(&phys(11811, 11811, 1));
        assert_eq!(r.dpi_x, Some(300.0));
        assert_eq!(r.dpi_y, Some(300.0));
    }

    #[test]
    fn png_phys_unknown_unit_is_unknown() {
        assert_eq!(read_density(&phys(1, 1, 0)), Resolution::default());
    }

    #[test]
    fn png_without_phys_is_unknown() {
        assert_eq!(
            read_density(&png_with_chunk(b"tEXt", b"Comment\0hi")),
            Resolution::default()
        );
    }

    #[test]
    fn truncated_png_is_unknown() {
        let mut data = phys(11811, 11811, 1);
        data.truncate(PNG_SIGNATURE.len() + 30);
        assert_eq!(read_density(&data), Resolution::default());
    }

    #[test]
    fn other_formats_are_unknown() {
        assert_eq!(read_density(b"GIF89a......"), Resolution::default());
    }
}
