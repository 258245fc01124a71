//! Occluders ("blocks"): convex polygons or circles that cast shadows.
//!
//! The silhouette is stored untransformed; world points are computed from
//! the block's position and rotation when read, so repeated rotation never
//! accumulates error. Polygon silhouettes must be convex. Concave shapes
//! do not crash but their shadows are wrong.

use std::f32::consts::FRAC_PI_2;
use std::fmt;

use glam::{Affine2, Vec2};

use crate::core::geometry::{
    angle_of, angular_difference, bounding_radius, centroid, direction, point_in_polygon,
    signed_area2,
};
use crate::renderer::painter::MaskPainter;
use super::binding::Binding;
use super::color::LightColor;

/// Group value meaning "not merged with neighbours".
pub const NO_GROUP: i32 = -1;

/// Exact occluder outline drawn in block-local coordinates
/// (origin at the block position, rotated with the block). Whatever it
/// paints is cut out of the block's shadow.
pub type SpriteMask = Box<dyn Fn(&mut MaskPainter<'_>)>;

/// Shape of an occluder, in local coordinates around the block position.
#[derive(Debug, Clone, PartialEq)]
pub enum Silhouette {
    Polygon(Vec<Vec2>),
    Circle { radius: f32 },
}

impl Silhouette {
    /// Axis-aligned rectangle centred on the block position.
    pub fn rect(width: f32, height: f32) -> Self {
        let (hw, hh) = (width / 2.0, height / 2.0);
        Silhouette::Polygon(vec![
            Vec2::new(-hw, -hh),
            Vec2::new(hw, -hh),
            Vec2::new(hw, hh),
            Vec2::new(-hw, hh),
        ])
    }

    pub fn circle(radius: f32) -> Self {
        Silhouette::Circle { radius: radius.max(0.0) }
    }

    pub fn polygon(points: Vec<Vec2>) -> Self {
        Silhouette::Polygon(points)
    }

    /// Radius of the circle around the block position that contains the shape.
    pub fn clip_radius(&self) -> f32 {
        match self {
            Silhouette::Polygon(points) => bounding_radius(points),
            Silhouette::Circle { radius } => *radius,
        }
    }

    /// Zero-area polygons and zero-radius circles cast nothing.
    pub fn is_degenerate(&self) -> bool {
        match self {
            Silhouette::Polygon(points) => points.len() < 3 || signed_area2(points).abs() < 1e-6,
            Silhouette::Circle { radius } => *radius <= 0.0,
        }
    }
}

/// A shadow-casting occluder.
pub struct Block {
    pos: Vec2,
    angle: f32,
    silhouette: Silhouette,
    clip_radius: f32,
    group: i32,
    block_light_inside: bool,
    translucent_color: LightColor,
    sprite_mask: Option<SpriteMask>,
    active: bool,
    binding: Option<Binding>,
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("pos", &self.pos)
            .field("angle", &self.angle)
            .field("silhouette", &self.silhouette)
            .field("clip_radius", &self.clip_radius)
            .field("group", &self.group)
            .field("block_light_inside", &self.block_light_inside)
            .field("translucent_color", &self.translucent_color)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl Block {
    pub fn new(pos: Vec2, silhouette: Silhouette) -> Self {
        let clip_radius = silhouette.clip_radius();
        Self {
            pos,
            angle: 0.0,
            silhouette,
            clip_radius,
            group: NO_GROUP,
            block_light_inside: false,
            translucent_color: LightColor::BLACK,
            sprite_mask: None,
            active: true,
            binding: None,
        }
    }

    /// Rectangle of `size` centred on `pos`.
    pub fn rect(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos, Silhouette::rect(size.x, size.y))
    }

    pub fn circle(pos: Vec2, radius: f32) -> Self {
        Self::new(pos, Silhouette::circle(radius))
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_group(mut self, group: i32) -> Self {
        self.group = group;
        self
    }

    pub fn with_block_light_inside(mut self, block: bool) -> Self {
        self.block_light_inside = block;
        self
    }

    pub fn with_translucent_color(mut self, color: LightColor) -> Self {
        self.translucent_color = color;
        self
    }

    pub fn with_sprite_mask(mut self, mask: SpriteMask) -> Self {
        self.sprite_mask = Some(mask);
        self
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = Some(binding);
        self
    }

    // ---- Accessors ----

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn silhouette(&self) -> &Silhouette {
        &self.silhouette
    }

    pub fn clip_radius(&self) -> f32 {
        self.clip_radius
    }

    pub fn group(&self) -> i32 {
        self.group
    }

    pub fn blocks_light_inside(&self) -> bool {
        self.block_light_inside
    }

    pub fn translucent_color(&self) -> LightColor {
        self.translucent_color
    }

    /// Anything other than opaque black tints instead of blocking.
    pub fn is_translucent(&self) -> bool {
        !self.translucent_color.is_opaque_black()
    }

    pub fn sprite_mask(&self) -> Option<&SpriteMask> {
        self.sprite_mask.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    // ---- Mutators ----

    pub fn set_pos(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    pub fn set_angle(&mut self, angle: f32) {
        self.angle = angle;
    }

    pub fn set_silhouette(&mut self, silhouette: Silhouette) {
        self.clip_radius = silhouette.clip_radius();
        self.silhouette = silhouette;
    }

    pub fn set_group(&mut self, group: i32) {
        self.group = group;
    }

    pub fn set_block_light_inside(&mut self, block: bool) {
        self.block_light_inside = block;
    }

    pub fn set_translucent_color(&mut self, color: LightColor) {
        self.translucent_color = color;
    }

    pub fn set_sprite_mask(&mut self, mask: Option<SpriteMask>) {
        self.sprite_mask = mask;
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn bind(&mut self, binding: Option<Binding>) {
        self.binding = binding;
    }

    // ---- Geometry ----

    /// Block-local -> world.
    pub fn local_to_world(&self) -> Affine2 {
        Affine2::from_angle_translation(self.angle, self.pos)
    }

    /// Polygon vertices in world space (empty for circles).
    pub fn world_points(&self) -> Vec<Vec2> {
        match &self.silhouette {
            Silhouette::Polygon(points) => {
                let t = self.local_to_world();
                points.iter().map(|p| t.transform_point2(*p)).collect()
            }
            Silhouette::Circle { .. } => Vec::new(),
        }
    }

    /// Whether `p` lies inside the silhouette.
    pub fn contains(&self, p: Vec2) -> bool {
        match &self.silhouette {
            Silhouette::Polygon(_) => point_in_polygon(p, &self.world_points()),
            Silhouette::Circle { radius } => p.distance_squared(self.pos) < radius * radius,
        }
    }

    /// Whether this block can shadow a light of `radius` at `source`.
    pub fn in_range(&self, source: Vec2, radius: f32) -> bool {
        let reach = radius + self.clip_radius;
        self.pos.distance_squared(source) < reach * reach
    }

    /// Silhouette edge points seen from `source`: `(min-angle, max-angle)`.
    ///
    /// Circles use the points at ±90° from the source->centre direction,
    /// `clip_radius` away from the centre. Polygons use the vertices with
    /// the smallest and largest angular deviation from the source->centroid
    /// line. `None` when the shape is degenerate or the source sits on its
    /// centre.
    pub fn tangent_points(&self, source: Vec2) -> Option<(Vec2, Vec2)> {
        if self.silhouette.is_degenerate() {
            return None;
        }
        match &self.silhouette {
            Silhouette::Circle { .. } => {
                let to_centre = self.pos - source;
                if to_centre.length_squared() < 1e-12 {
                    return None;
                }
                let a = angle_of(to_centre.x, to_centre.y);
                let r = self.clip_radius;
                Some((
                    self.pos + direction(a - FRAC_PI_2) * r,
                    self.pos + direction(a + FRAC_PI_2) * r,
                ))
            }
            Silhouette::Polygon(_) => {
                let points = self.world_points();
                let to_centre = centroid(&points) - source;
                if to_centre.length_squared() < 1e-12 {
                    return None;
                }
                let normal = angle_of(to_centre.x, to_centre.y);
                let mut min = (f32::INFINITY, points[0]);
                let mut max = (f32::NEG_INFINITY, points[0]);
                for p in &points {
                    let d = *p - source;
                    let dev = angular_difference(angle_of(d.x, d.y), normal);
                    if dev < min.0 {
                        min = (dev, *p);
                    }
                    if dev > max.0 {
                        max = (dev, *p);
                    }
                }
                Some((min.1, max.1))
            }
        }
    }
}
