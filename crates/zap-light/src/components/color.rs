use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Straight (non-premultiplied) RGBA color used by the public API.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl LightColor {
    /// Create a color from RGBA components (0.0 - 1.0).
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a fully opaque color from RGB components.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color from RGBA u8 values (0-255).
    pub fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    /// Create a color with the given alpha value.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Whether this is the default occluder color (fully blocks light).
    pub fn is_opaque_black(&self) -> bool {
        self.r <= 0.0 && self.g <= 0.0 && self.b <= 0.0 && self.a >= 1.0
    }

    /// Premultiplied pixel value, components clamped to `[0, 1]`.
    pub fn to_pixel(self) -> Rgba {
        let a = self.a.clamp(0.0, 1.0);
        Rgba::new(
            self.r.clamp(0.0, 1.0) * a,
            self.g.clamp(0.0, 1.0) * a,
            self.b.clamp(0.0, 1.0) * a,
            a,
        )
    }

    /// Component-wise interpolation.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);
    pub const WARM: Self = Self::rgb(1.0, 0.85, 0.6);
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    /// Half-opaque black (`#00000088`), the default ambient darkness.
    pub const DUSK: Self = Self::new(0.0, 0.0, 0.0, 136.0 / 255.0);
}

impl Default for LightColor {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Premultiplied RGBA pixel stored in surfaces.
/// 4 floats = 16 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Scale all four components (opacity on a premultiplied pixel).
    #[inline]
    pub fn scale(self, k: f32) -> Self {
        Self::new(self.r * k, self.g * k, self.b * k, self.a * k)
    }

    /// Back to straight color. Transparent pixels map to transparent black.
    pub fn unpremultiply(self) -> LightColor {
        if self.a <= 0.0 {
            return LightColor::TRANSPARENT;
        }
        LightColor::new(self.r / self.a, self.g / self.a, self.b / self.a, self.a)
    }

    /// Sum of the color channels; used by tests as a brightness measure.
    pub fn luma_sum(&self) -> f32 {
        self.r + self.g + self.b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premultiply_round_trip_keeps_hue() {
        let c = LightColor::new(1.0, 0.5, 0.0, 0.5);
        let p = c.to_pixel();
        assert_eq!(p, Rgba::new(0.5, 0.25, 0.0, 0.5));
        let back = p.unpremultiply();
        assert!((back.g - 0.5).abs() < 1e-6);
    }

    #[test]
    fn opaque_black_detection() {
        assert!(LightColor::BLACK.is_opaque_black());
        assert!(!LightColor::BLACK.with_alpha(0.5).is_opaque_black());
        assert!(!LightColor::RED.is_opaque_black());
    }

    #[test]
    fn dusk_is_half_opaque() {
        assert!((LightColor::DUSK.a - 0.533).abs() < 0.01);
    }

    #[test]
    fn color_deserializes_from_json() {
        let c: LightColor = serde_json::from_str(r#"{"r":1,"g":0.5,"b":0,"a":1}"#).unwrap();
        assert_eq!(c, LightColor::new(1.0, 0.5, 0.0, 1.0));
    }
}
