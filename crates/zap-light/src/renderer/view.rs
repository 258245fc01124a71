use glam::{Affine2, Vec2};
use serde::{Deserialize, Serialize};

/// Camera transform supplied by the engine for one frame.
///
/// `x`/`y` is the world position shown at the top-left pixel, `zoom`
/// scales world units to pixels, `width`/`height` are the target
/// surface's pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub x: f32,
    pub y: f32,
    pub zoom: f32,
    pub width: f32,
    pub height: f32,
}

impl View {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
            width,
            height,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.x = offset.x;
        self.y = offset.y;
        self
    }

    /// Set the zoom factor. Non-positive values are clamped to a small epsilon.
    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom.max(1e-3);
        self
    }

    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// World -> pixel.
    #[inline]
    pub fn to_screen(&self, p: Vec2) -> Vec2 {
        (p - self.offset()) * self.zoom
    }

    /// Pixel -> world.
    #[inline]
    pub fn to_world(&self, p: Vec2) -> Vec2 {
        p / self.zoom + self.offset()
    }

    /// The world -> pixel mapping as an affine transform.
    pub fn transform(&self) -> Affine2 {
        Affine2::from_scale(Vec2::splat(self.zoom)) * Affine2::from_translation(-self.offset())
    }

    /// Visible world rectangle as `(min, max)`.
    pub fn world_rect(&self) -> (Vec2, Vec2) {
        let min = self.offset();
        (min, min + Vec2::new(self.width, self.height) / self.zoom)
    }

    /// Whether a circle overlaps the visible area.
    pub fn is_circle_visible(&self, center: Vec2, radius: f32) -> bool {
        let (min, max) = self.world_rect();
        center.x + radius > min.x
            && center.x - radius < max.x
            && center.y + radius > min.y
            && center.y - radius < max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_world_round_trip() {
        let view = View::new(200.0, 100.0)
            .with_offset(Vec2::new(50.0, 20.0))
            .with_zoom(2.0);
        let p = Vec2::new(60.0, 30.0);
        let s = view.to_screen(p);
        assert_eq!(s, Vec2::new(20.0, 20.0));
        assert!((view.to_world(s) - p).length() < 1e-5);
        assert!((view.transform().transform_point2(p) - s).length() < 1e-5);
    }

    #[test]
    fn world_rect_shrinks_with_zoom() {
        let view = View::new(200.0, 100.0).with_zoom(2.0);
        let (min, max) = view.world_rect();
        assert_eq!(min, Vec2::ZERO);
        assert_eq!(max, Vec2::new(100.0, 50.0));
    }

    #[test]
    fn circle_visibility() {
        let view = View::new(100.0, 100.0);
        assert!(view.is_circle_visible(Vec2::new(50.0, 50.0), 1.0));
        assert!(view.is_circle_visible(Vec2::new(-20.0, 50.0), 30.0));
        assert!(!view.is_circle_visible(Vec2::new(-20.0, 50.0), 10.0));
        assert!(!view.is_circle_visible(Vec2::new(300.0, 300.0), 100.0));
    }
}
