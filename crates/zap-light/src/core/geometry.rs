//! Angle and point helpers shared by the shadow and mask code.
//!
//! All angles are radians, measured from +X toward +Y (screen space, Y down).

use std::f32::consts::{PI, TAU};
use glam::Vec2;

/// Angle of the vector `(dx, dy)`, normalised to `[0, 2π)`.
pub fn angle_of(dx: f32, dy: f32) -> f32 {
    let a = dy.atan2(dx);
    if a < 0.0 {
        // Tiny negative angles round up to exactly TAU.
        (a + TAU) % TAU
    } else {
        a
    }
}

/// Signed difference `a0 - a1`, wrapped to `(-π, π]`.
///
/// The sign picks the sweep direction when tracing the light boundary from
/// `a1` back to `a0`; the shadow wedge winding depends on it.
pub fn angular_difference(a0: f32, a1: f32) -> f32 {
    let d = (a0 - a1 + PI).rem_euclid(TAU) - PI;
    if d <= -PI {
        PI
    } else {
        d
    }
}

/// Unit vector pointing at `angle`.
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Rotate `v` by `angle` around the origin.
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Even-odd point-in-polygon test. Points on an edge may land on either side.
pub fn point_in_polygon(p: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Vertex average. Good enough as a "centre" for convex silhouettes.
pub fn centroid(points: &[Vec2]) -> Vec2 {
    if points.is_empty() {
        return Vec2::ZERO;
    }
    points.iter().copied().sum::<Vec2>() / points.len() as f32
}

/// Half the diagonal of the origin-centred box enclosing `points`.
///
/// Bounds every point under any rotation about the origin.
pub fn bounding_radius(points: &[Vec2]) -> f32 {
    let extent = points
        .iter()
        .fold(Vec2::ZERO, |acc, p| acc.max(p.abs()));
    extent.length()
}

/// Twice the signed area of a polygon (positive for clockwise in Y-down space).
pub fn signed_area2(points: &[Vec2]) -> f32 {
    let n = points.len();
    (0..n)
        .map(|i| points[i].perp_dot(points[(i + 1) % n]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_of_covers_all_quadrants() {
        assert!((angle_of(1.0, 0.0) - 0.0).abs() < 1e-6);
        assert!((angle_of(0.0, 1.0) - PI / 2.0).abs() < 1e-6);
        assert!((angle_of(-1.0, 0.0) - PI).abs() < 1e-6);
        assert!((angle_of(0.0, -1.0) - 3.0 * PI / 2.0).abs() < 1e-6);
        let a = angle_of(1.0, -1e-9);
        assert!((0.0..TAU).contains(&a));
    }

    #[test]
    fn angular_difference_wraps() {
        assert!((angular_difference(0.1, TAU - 0.1) - 0.2).abs() < 1e-5);
        assert!((angular_difference(TAU - 0.1, 0.1) + 0.2).abs() < 1e-5);
        assert!((angular_difference(PI, 0.0) - PI).abs() < 1e-6);
        assert!((angular_difference(0.0, PI) - PI).abs() < 1e-6);
    }

    #[test]
    fn rotate_quarter_turn() {
        let v = rotate(Vec2::new(1.0, 0.0), PI / 2.0);
        assert!((v - Vec2::new(0.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn point_in_square() {
        let square = [
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(-1.0, 1.0),
        ];
        assert!(point_in_polygon(Vec2::ZERO, &square));
        assert!(!point_in_polygon(Vec2::new(2.0, 0.0), &square));
        assert!(!point_in_polygon(Vec2::ZERO, &square[..2]));
    }

    #[test]
    fn bounding_radius_of_rectangle_is_half_diagonal() {
        let rect = [
            Vec2::new(-3.0, -4.0),
            Vec2::new(3.0, -4.0),
            Vec2::new(3.0, 4.0),
            Vec2::new(-3.0, 4.0),
        ];
        assert!((bounding_radius(&rect) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn zero_area_polygon() {
        let line = [Vec2::ZERO, Vec2::X, Vec2::new(2.0, 0.0)];
        assert_eq!(signed_area2(&line), 0.0);
    }
}
