//! RGB vertex colors

use serde::{Deserialize, Serialize};

/// Linear RGB color with components nominally in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };

    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Convert an 8-bit color, as stored on [`crate::TriangleMesh`].
    pub fn from_rgb8(rgb: [u8; 3]) -> Self {
        Self {
            r: f64::from(rgb[0]) / 255.0,
            g: f64::from(rgb[1]) / 255.0,
            b: f64::from(rgb[2]) / 255.0,
        }
    }

    /// Convert back to 8 bits, clamping out-of-range components.
    pub fn to_rgb8(&self) -> [u8; 3] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Elementwise average of two colors.
    pub fn average(a: &Color, b: &Color) -> Color {
        Color {
            r: (a.r + b.r) * 0.5,
            g: (a.g + b.g) * 0.5,
            b: (a.b + b.b) * 0.5,
        }
    }

    /// Sum of absolute per-channel differences (L1 distance).
    pub fn abs_diff_sum(&self, other: &Color) -> f64 {
        (self.r - other.r).abs() + (self.g - other.g).abs() + (self.b - other.b).abs()
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_average() {
        let avg = Color::average(&Color::new(1.0, 0.0, 0.0), &Color::new(0.0, 1.0, 0.0));
        assert_eq!(avg, Color::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn test_abs_diff_sum() {
        let a = Color::new(1.0, 0.0, 0.25);
        let b = Color::new(0.5, 0.5, 0.0);
        assert_relative_eq!(a.abs_diff_sum(&b), 1.25);
        assert_relative_eq!(b.abs_diff_sum(&a), 1.25);
    }

    #[test]
    fn test_rgb8_conversion() {
        let c = Color::from_rgb8([255, 0, 51]);
        assert_relative_eq!(c.r, 1.0);
        assert_relative_eq!(c.g, 0.0);
        assert_relative_eq!(c.b, 0.2);
        assert_eq!(c.to_rgb8(), [255, 0, 51]);
        assert_eq!(Color::new(2.0, -1.0, 0.5).to_rgb8(), [255, 0, 128]);
    }
}
