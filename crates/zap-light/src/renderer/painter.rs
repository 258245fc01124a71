use glam::{Affine2, Vec2};

use crate::components::color::{LightColor, Rgba};
use super::blend::BlendMode;
use super::surface::{PixelRect, Surface};
use super::tessellate::{circle_path, polygon_path, PathFiller};

/// Drawing handle given to custom light-mask renderers and occluder
/// sprite-mask callbacks.
///
/// Coordinates are local to the owner (the light's centre, or the block's
/// position and rotation); `transform` maps them to the target's pixels.
/// Every primitive is written with the painter's blend mode.
pub struct MaskPainter<'a> {
    target: &'a mut Surface,
    filler: &'a mut PathFiller,
    transform: Affine2,
    mode: BlendMode,
    clip: PixelRect,
}

impl<'a> MaskPainter<'a> {
    pub fn new(
        target: &'a mut Surface,
        filler: &'a mut PathFiller,
        transform: Affine2,
        mode: BlendMode,
        clip: PixelRect,
    ) -> Self {
        let clip = clip.intersect(&target.bounds());
        Self { target, filler, transform, mode, clip }
    }

    /// Local -> pixel transform in effect.
    pub fn transform(&self) -> Affine2 {
        self.transform
    }

    /// Fill a polygon given in local coordinates.
    pub fn fill_polygon(&mut self, points: &[Vec2], color: LightColor) {
        let mapped: Vec<Vec2> = points
            .iter()
            .map(|p| self.transform.transform_point2(*p))
            .collect();
        if let Some(path) = polygon_path(&mapped) {
            self.filler
                .fill_path(self.target, &path, color.to_pixel(), self.mode, self.clip);
        }
    }

    /// Fill an axis-aligned (in local space) rectangle.
    pub fn fill_rect(&mut self, min: Vec2, size: Vec2, color: LightColor) {
        self.fill_polygon(
            &[
                min,
                Vec2::new(min.x + size.x, min.y),
                min + size,
                Vec2::new(min.x, min.y + size.y),
            ],
            color,
        );
    }

    /// Fill a circle. Under a non-uniform transform the result is the
    /// circle through the mapped radius along local +X.
    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: LightColor) {
        let c = self.transform.transform_point2(center);
        let r = self.transform.transform_vector2(Vec2::new(radius, 0.0)).length();
        if let Some(path) = circle_path(c, r) {
            self.filler
                .fill_path(self.target, &path, color.to_pixel(), self.mode, self.clip);
        }
    }

    /// Evaluate `shader` at the centre of every pixel inside `clip`,
    /// passing local coordinates. Used for gradients and procedural masks.
    pub fn shade<F>(&mut self, mut shader: F)
    where
        F: FnMut(Vec2) -> Rgba,
    {
        let inverse = self.transform.inverse();
        let clip = self.clip;
        self.target
            .fill_rect_with(clip, self.mode, |p| shader(inverse.transform_point2(p)));
    }

    /// Draw an image whose top-left sits at local `origin`, one pixel per local unit.
    pub fn draw_surface(&mut self, image: &Surface, origin: Vec2) {
        let t = self.transform * Affine2::from_translation(origin);
        self.target.draw_surface(image, t, 1.0, self.mode, self.clip);
    }
}
