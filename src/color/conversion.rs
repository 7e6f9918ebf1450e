//! Color space conversion utilities
//!
//! Provides conversions between display and perceptual color:
//! - 8-bit sRGB to CIE Lab (D65) and back, with gamut clamping
//! - Hex color representation
//! - ΔE76 and CIEDE2000 color differences
//!
//! Every perceptual comparison in the crate goes through this module.

use palette::{color_difference::Ciede2000, FromColor, Lab, Srgb};
use crate::{Result, ScanError};

/// Converter between 8-bit sRGB and Lab under the D65 white point
///
/// The white point is fixed by palette's `Lab` type, which defaults to D65.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorConverter;

impl ColorConverter {
    pub fn new() -> Self {
        Self
    }

    /// Convert an 8-bit sRGB triple to Lab
    ///
    /// Applies the sRGB companding curve before the XYZ/Lab transform, so
    /// `[0, 0, 0]` maps to L* = 0 and `[255, 255, 255]` to L* = 100.
    pub fn rgb_to_lab(&self, rgb: [u8; 3]) -> Lab {
        let srgb = Srgb::new(
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        );
        Lab::from_color(srgb)
    }

    /// Convert Lab to sRGB with gamut clamping
    pub fn lab_to_srgb(&self, lab: Lab) -> Srgb {
        let srgb = Srgb::from_color(lab);
        // Clamp to valid sRGB gamut; NaN collapses to 0
        Srgb::new(
            clamp_unit(srgb.red),
            clamp_unit(srgb.green),
            clamp_unit(srgb.blue),
        )
    }

    /// Convert Lab to the nearest displayable 8-bit sRGB triple
    pub fn lab_to_rgb(&self, lab: Lab) -> [u8; 3] {
        let srgb = self.lab_to_srgb(lab);
        [
            (srgb.red * 255.0).round() as u8,
            (srgb.green * 255.0).round() as u8,
            (srgb.blue * 255.0).round() as u8,
        ]
    }

    /// Format an 8-bit sRGB triple as an uppercase hex string (e.g. "#FF0000")
    pub fn rgb_to_hex(&self, rgb: [u8; 3]) -> String {
        format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2])
    }

    /// Parse a hex color string to an 8-bit sRGB triple
    ///
    /// Accepts "#RRGGBB" or "RRGGBB" in either case.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::InvalidParameter` if the string is not six hex digits
    pub fn hex_to_rgb(&self, hex: &str) -> Result<[u8; 3]> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ScanError::invalid_parameter("hex", hex));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| ScanError::invalid_parameter("hex", hex))
        };

        Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
    }

    /// Lab of a hex color string
    pub fn hex_to_lab(&self, hex: &str) -> Result<Lab> {
        Ok(self.rgb_to_lab(self.hex_to_rgb(hex)?))
    }

    /// Compute ΔE76 (Euclidean distance in Lab) between two colors
    ///
    /// Used wherever centroids are averaged, since the k-means mean minimises
    /// exactly this metric.
    pub fn delta_e(&self, lab1: Lab, lab2: Lab) -> f32 {
        let dl = lab1.l - lab2.l;
        let da = lab1.a - lab2.a;
        let db = lab1.b - lab2.b;
        (dl * dl + da * da + db * db).sqrt()
    }

    /// Compute CIEDE2000 color difference between two colors
    pub fn delta_e_2000(&self, lab1: Lab, lab2: Lab) -> f32 {
        lab1.difference(lab2)
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Lab as a plain `[L, a, b]` array, the serialized form
pub fn lab_to_array(lab: Lab) -> [f32; 3] {
    [lab.l, lab.a, lab.b]
}

/// Lab from a plain `[L, a, b]` array
pub fn array_to_lab(values: [f32; 3]) -> Lab {
    Lab::new(values[0], values[1], values[2])
}
