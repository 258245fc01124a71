use glam::Vec2;

/// World-space region that never receives shadow.
///
/// Its area is cut out of every shadow before the shadow is applied, so
/// light reaching it is never darkened by occluders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoCastRegion {
    /// Axis-aligned rectangle from `min` with `size`.
    Rect { min: Vec2, size: Vec2 },
    Circle { center: Vec2, radius: f32 },
}

impl NoCastRegion {
    pub fn rect(min: Vec2, size: Vec2) -> Self {
        NoCastRegion::Rect { min, size }
    }

    pub fn circle(center: Vec2, radius: f32) -> Self {
        NoCastRegion::Circle { center, radius }
    }

    /// Whether the region overlaps a light's reach.
    pub fn touches(&self, source: Vec2, radius: f32) -> bool {
        match *self {
            NoCastRegion::Rect { min, size } => {
                let nearest = source.clamp(min, min + size);
                nearest.distance_squared(source) < radius * radius
            }
            NoCastRegion::Circle { center, radius: r } => {
                let reach = radius + r;
                center.distance_squared(source) < reach * reach
            }
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        match *self {
            NoCastRegion::Rect { min, size } => {
                p.x >= min.x && p.y >= min.y && p.x < min.x + size.x && p.y < min.y + size.y
            }
            NoCastRegion::Circle { center, radius } => center.distance_squared(p) < radius * radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_touches_light_near_its_edge() {
        let region = NoCastRegion::rect(Vec2::new(10.0, 0.0), Vec2::new(5.0, 5.0));
        assert!(region.touches(Vec2::new(0.0, 2.0), 11.0));
        assert!(!region.touches(Vec2::new(0.0, 2.0), 9.0));
    }

    #[test]
    fn circle_contains() {
        let region = NoCastRegion::circle(Vec2::ZERO, 2.0);
        assert!(region.contains(Vec2::new(1.0, 1.0)));
        assert!(!region.contains(Vec2::new(2.0, 1.0)));
        assert!(region.touches(Vec2::new(5.0, 0.0), 4.0));
    }
}
