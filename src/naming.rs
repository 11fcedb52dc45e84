//! Print-size names: parsing `8x10` and naming export files after it.
//!
//! Exports are named by what they are, not by the source file:
//! - 8 x 10 JPEG → `8x10_photo_print_quality.jpg`
//! - 8.5 x 11 PNG → `8.5x11_photo_print_quality.png`

use crate::imaging::OutputFormat;
use crate::types::PhysicalSize;

/// Format a physical dimension without trailing zeros (`8`, `8.5`, `2.25`).
pub fn format_dimension(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        let s = format!("{value:.3}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Parse `WxH` (also `W×H`, `W X H`) into a physical size in inches.
pub fn parse_physical_size(text: &str) -> Result<PhysicalSize, String> {
    let normalized = text.trim().to_lowercase().replace('×', "x");
    let (w, h) = normalized
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{text}'"))?;
    let parse = |part: &str| {
        part.trim()
            .trim_end_matches('"')
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v > 0.0)
            .ok_or_else(|| format!("invalid print dimension '{}' in '{text}'", part.trim()))
    };
    Ok(PhysicalSize::new(parse(w)?, parse(h)?))
}

/// Deterministic export file name for a print size and format.
pub fn export_file_name(size: PhysicalSize, format: OutputFormat) -> String {
    format!(
        "{}x{}_photo_print_quality.{}",
        format_dimension(size.width),
        format_dimension(size.height),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_dimensions_drop_decimals() {
        assert_eq!(format_dimension(8.0), "8");
        assert_eq!(format_dimension(10.0), "10");
    }

    #[test]
    fn fractional_dimensions_trim_zeros() {
        assert_eq!(format_dimension(8.5), "8.5");
        assert_eq!(format_dimension(2.25), "2.25");
    }

    #[test]
    fn parse_plain() {
        assert_eq!(parse_physical_size("8x10"), Ok(PhysicalSize::new(8.0, 10.0)));
    }

    #[test]
    fn parse_variants() {
        assert_eq!(parse_physical_size("8.5 X 11"), Ok(PhysicalSize::new(8.5, 11.0)));
        assert_eq!(parse_physical_size("8×10"), Ok(PhysicalSize::new(8.0, 10.0)));
        assert_eq!(parse_physical_size("8\"x10\""), Ok(PhysicalSize::new(8.0, 10.0)));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_physical_size("8by10").is_err());
        assert!(parse_physical_size("0x10").is_err());
        assert!(parse_physical_size("8x").is_err());
        assert!(parse_physical_size("-8x10").is_err());
    }

    #[test]
    fn export_names() {
        assert_eq!(
            export_file_name(PhysicalSize::new(8.0, 10.0), OutputFormat::Jpeg),
            "8x10_photo_print_quality.jpg"
        );
        assert_eq!(
            export_file_name(PhysicalSize::new(8.5, 11.0), OutputFormat::Png),
            "8.5x11_photo_print_quality.png"
        );
    }
}
