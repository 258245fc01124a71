use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::color::{LightColor, Rgba};

/// A gradient color stop. `offset` runs from 0.0 (start) to 1.0 (end).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub offset: f32,
    pub color: LightColor,
}

/// Ambient darkness filling a light area where no source reaches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Background {
    Solid(LightColor),
    /// Linear gradient. `start`/`end` are in normalised viewport
    /// coordinates (0..1 on each axis), so it survives resizes.
    Gradient {
        start: Vec2,
        end: Vec2,
        stops: Vec<ColorStop>,
    },
}

impl Background {
    /// Gradient with stops sorted by offset.
    pub fn gradient(start: Vec2, end: Vec2, mut stops: Vec<ColorStop>) -> Self {
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        Background::Gradient { start, end, stops }
    }

    /// Straight color at normalised viewport position `uv`.
    pub fn color_at(&self, uv: Vec2) -> LightColor {
        match self {
            Background::Solid(c) => *c,
            Background::Gradient { start, end, stops } => {
                let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
                    return LightColor::TRANSPARENT;
                };
                let axis = *end - *start;
                let len2 = axis.length_squared();
                let t = if len2 > 0.0 { (uv - *start).dot(axis) / len2 } else { 0.0 };
                if t <= first.offset {
                    return first.color;
                }
                if t >= last.offset {
                    return last.color;
                }
                for pair in stops.windows(2) {
                    let (a, b) = (pair[0], pair[1]);
                    if t <= b.offset {
                        let span = b.offset - a.offset;
                        let k = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
                        return a.color.lerp(b.color, k);
                    }
                }
                last.color
            }
        }
    }

    /// Premultiplied pixel at pixel centre `p` of a `size` viewport.
    pub fn pixel_at(&self, p: Vec2, size: Vec2) -> Rgba {
        self.color_at(p / size.max(Vec2::ONE)).to_pixel()
    }

    pub fn is_solid(&self) -> bool {
        matches!(self, Background::Solid(_))
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::Solid(LightColor::DUSK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical() -> Background {
        Background::gradient(
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 1.0),
            vec![
                ColorStop { offset: 1.0, color: LightColor::BLACK },
                ColorStop { offset: 0.0, color: LightColor::BLACK.with_alpha(0.0) },
            ],
        )
    }

    #[test]
    fn gradient_sorts_and_interpolates() {
        let bg = vertical();
        assert_eq!(bg.color_at(Vec2::new(0.5, 0.0)).a, 0.0);
        assert!((bg.color_at(Vec2::new(0.5, 0.5)).a - 0.5).abs() < 1e-6);
        assert_eq!(bg.color_at(Vec2::new(0.5, 2.0)).a, 1.0);
    }

    #[test]
    fn empty_gradient_is_transparent() {
        let bg = Background::gradient(Vec2::ZERO, Vec2::X, Vec::new());
        assert_eq!(bg.color_at(Vec2::splat(0.5)), LightColor::TRANSPARENT);
    }

    #[test]
    fn default_is_dusk() {
        assert_eq!(Background::default(), Background::Solid(LightColor::DUSK));
    }

    #[test]
    fn background_from_json() {
        let bg: Background = serde_json::from_str(
            r#"{"kind":"solid","r":0,"g":0,"b":0.1,"a":0.8}"#,
        )
        .unwrap();
        assert_eq!(bg, Background::Solid(LightColor::new(0.0, 0.0, 0.1, 0.8)));
    }
}
