//! Emissive point/area light with a cached falloff mask.
//!
//! The mask is a `2r x 2r` surface (capped at `MAX_MASK_SIDE`) holding the
//! light's falloff, tint and arc, built facing +X. Orientation is applied
//! at blit time, so turning a light never rebuilds it. Radius, color, arc
//! and edge blur changes mark the mask dirty; `refresh_mask` rebuilds it
//! once per frame.

use std::f32::consts::{FRAC_PI_2, TAU};
use std::fmt;

use glam::{Affine2, Vec2};

use crate::core::geometry::{angle_of, angular_difference};
use crate::renderer::blend::BlendMode;
use crate::renderer::painter::MaskPainter;
use crate::renderer::surface::Surface;
use crate::renderer::tessellate::PathFiller;
use super::binding::Binding;
use super::color::{LightColor, Rgba};

/// Largest mask edge in pixels. Bigger lights get a coarser mask that is
/// scaled up at blit time.
pub const MAX_MASK_SIDE: u32 = 1024;

/// Light properties a mask renderer needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskParams {
    pub radius: f32,
    pub color: LightColor,
    pub arc: f32,
    pub edge_blur: f32,
}

/// Custom mask renderer. Draws in local coordinates: the light's centre
/// at the origin, facing +X, reaching `params.radius`.
pub type MaskRenderer = Box<dyn Fn(&mut MaskPainter<'_>, &MaskParams)>;

/// A light source.
pub struct LightSource {
    pos: Vec2,
    angle: f32,
    radius: f32,
    color: LightColor,
    opacity: f32,
    casts_shadows: bool,
    arc: f32,
    edge_blur: f32,
    active: bool,
    /// Set when the radius clamp (not the caller) switched the light off.
    radius_disabled: bool,
    binding: Option<Binding>,
    renderer: Option<MaskRenderer>,
    mask: Surface,
    /// Mask pixels per world unit; below 1 only for lights wider than `MAX_MASK_SIDE`.
    mask_scale: f32,
    dirty: bool,
}

impl fmt::Debug for LightSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LightSource")
            .field("pos", &self.pos)
            .field("angle", &self.angle)
            .field("radius", &self.radius)
            .field("color", &self.color)
            .field("casts_shadows", &self.casts_shadows)
            .field("arc", &self.arc)
            .field("edge_blur", &self.edge_blur)
            .field("active", &self.active)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl LightSource {
    /// Create a full-circle, shadow-casting light at `pos`.
    pub fn new(pos: Vec2, radius: f32, color: LightColor) -> Self {
        let mut light = Self {
            pos,
            angle: 0.0,
            radius: 1.0,
            color,
            opacity: 1.0,
            casts_shadows: true,
            arc: TAU,
            edge_blur: 0.0,
            active: true,
            radius_disabled: false,
            binding: None,
            renderer: None,
            mask: Surface::new(0, 0),
            mask_scale: 1.0,
            dirty: true,
        };
        light.set_radius(radius);
        light
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_casts_shadows(mut self, casts: bool) -> Self {
        self.casts_shadows = casts;
        self
    }

    pub fn with_arc(mut self, arc: f32) -> Self {
        self.set_arc(arc);
        self
    }

    pub fn with_edge_blur(mut self, blur: f32) -> Self {
        self.set_edge_blur(blur);
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.set_opacity(opacity);
        self
    }

    pub fn with_mask_renderer(mut self, renderer: MaskRenderer) -> Self {
        self.set_mask_renderer(Some(renderer));
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

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn color(&self) -> LightColor {
        self.color
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn casts_shadows(&self) -> bool {
        self.casts_shadows
    }

    pub fn arc(&self) -> f32 {
        self.arc
    }

    pub fn edge_blur(&self) -> f32 {
        self.edge_blur
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    /// The cached mask. Stale while `is_dirty()`.
    pub fn mask(&self) -> &Surface {
        &self.mask
    }

    // ---- Mutators ----

    pub fn set_pos(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    pub fn set_angle(&mut self, angle: f32) {
        self.angle = angle;
    }

    /// Set the emission radius.
    ///
    /// Radii below 1 clamp to 1 and switch the light off (it stays
    /// registered). Growing back to 1 or more switches it on again, unless
    /// it was switched off with `set_active(false)`.
    pub fn set_radius(&mut self, radius: f32) {
        if !(radius >= 1.0) {
            self.radius = 1.0;
            if self.active {
                self.radius_disabled = true;
            }
            self.active = false;
        } else {
            self.radius = radius;
            if self.radius_disabled {
                self.active = true;
                self.radius_disabled = false;
            }
        }
        self.dirty = true;
    }

    pub fn set_color(&mut self, color: LightColor) {
        self.color = color;
        self.dirty = true;
    }

    /// Cone width in radians, clamped to `[0, 2π]`.
    pub fn set_arc(&mut self, arc: f32) {
        self.arc = arc.clamp(0.0, TAU);
        self.dirty = true;
    }

    pub fn set_edge_blur(&mut self, blur: f32) {
        self.edge_blur = blur.max(0.0);
        self.dirty = true;
    }

    /// Blit-time multiplier; does not touch the mask.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn set_casts_shadows(&mut self, casts: bool) {
        self.casts_shadows = casts;
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        self.radius_disabled = false;
    }

    pub fn set_mask_renderer(&mut self, renderer: Option<MaskRenderer>) {
        self.renderer = renderer;
        self.dirty = true;
    }

    /// Slave position/orientation to an anchor, or release it with `None`.
    pub fn bind(&mut self, binding: Option<Binding>) {
        self.binding = binding;
    }

    /// Mask parameters as currently set.
    pub fn mask_params(&self) -> MaskParams {
        MaskParams {
            radius: self.radius,
            color: self.color,
            arc: self.arc,
            edge_blur: self.edge_blur,
        }
    }

    /// Rebuild the mask if any mask property changed since the last build.
    /// Returns whether a rebuild happened.
    pub fn refresh_mask(&mut self, filler: &mut PathFiller) -> bool {
        if !self.is_dirty() {
            return false;
        }
        let wanted = (self.radius * 2.0).ceil().max(2.0);
        let side = (wanted as u32).min(MAX_MASK_SIDE);
        self.mask_scale = if side < wanted as u32 { side as f32 / (self.radius * 2.0) } else { 1.0 };
        if self.mask.width() != side || self.mask.height() != side {
            self.mask.resize(side, side);
        } else {
            self.mask.clear();
        }

        let params = self.mask_params();
        let centre = Affine2::from_translation(Vec2::splat(side as f32 / 2.0))
            * Affine2::from_scale(Vec2::splat(self.mask_scale));
        let clip = self.mask.bounds();
        let mut painter = MaskPainter::new(&mut self.mask, filler, centre, BlendMode::Copy, clip);
        match &self.renderer {
            Some(render) => render(&mut painter, &params),
            None => painter.shade(|p| default_mask_pixel(p, &params)),
        }
        self.dirty = false;
        true
    }

    /// Mask pixel space -> world space.
    pub fn mask_to_world(&self) -> Affine2 {
        let half = self.mask.width() as f32 / 2.0;
        Affine2::from_angle_translation(self.angle, self.pos)
            * Affine2::from_scale(Vec2::splat(1.0 / self.mask_scale))
            * Affine2::from_translation(Vec2::splat(-half))
    }
}

/// Radial falloff from `color` at the centre to transparent at the radius,
/// limited to `±arc/2` around +X with `edge_blur`-wide linear edges.
pub fn default_mask_pixel(p: Vec2, params: &MaskParams) -> Rgba {
    let d = p.length();
    if d >= params.radius {
        return Rgba::TRANSPARENT;
    }
    let mut alpha = params.color.a * (1.0 - d / params.radius);

    if params.arc < TAU {
        let half = params.arc / 2.0;
        let off_axis = angular_difference(angle_of(p.x, p.y), 0.0).abs();
        if off_axis > half {
            return Rgba::TRANSPARENT;
        }
        if params.edge_blur > 0.0 {
            let gap = half - off_axis;
            let edge_dist = if gap >= FRAC_PI_2 { f32::INFINITY } else { d * gap.sin() };
            alpha *= (edge_dist / params.edge_blur).min(1.0);
        }
    }

    params.color.with_alpha(alpha.clamp(0.0, 1.0)).to_pixel()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn built(mut light: LightSource) -> LightSource {
        light.refresh_mask(&mut PathFiller::default());
        light
    }

    #[test]
    fn mask_is_two_radii_wide() {
        let light = built(LightSource::new(Vec2::ZERO, 20.0, LightColor::WHITE));
        assert_eq!(light.mask().width(), 40);
        assert_eq!(light.mask().height(), 40);
        assert!(!light.is_dirty());
    }

    #[test]
    fn huge_light_mask_is_capped_and_scaled_at_blit() {
        let light = built(LightSource::new(Vec2::new(10.0, 20.0), 5000.0, LightColor::WHITE));
        assert_eq!(light.mask().width(), MAX_MASK_SIDE);
        let to_world = light.mask_to_world();
        let side = MAX_MASK_SIDE as f32;
        let centre = to_world.transform_point2(Vec2::splat(side / 2.0));
        let right = to_world.transform_point2(Vec2::new(side, side / 2.0));
        assert!((centre - Vec2::new(10.0, 20.0)).length() < 1e-2);
        assert!((right.x - 5010.0).abs() < 0.5);
        // Falloff still spans the whole mask.
        assert!(light.mask().pixel(512, 512).a > 0.99);
        assert!(light.mask().pixel(768, 512).a > 0.4);
        assert_eq!(light.mask().pixel(0, 0).a, 0.0);
    }

    #[test]
    fn falloff_is_brightest_at_centre() {
        let light = built(LightSource::new(Vec2::ZERO, 20.0, LightColor::WHITE));
        let centre = light.mask().pixel(20, 20).a;
        let mid = light.mask().pixel(30, 20).a;
        let edge = light.mask().pixel(39, 20).a;
        assert!(centre > mid && mid > edge);
        assert_eq!(light.mask().pixel(0, 0).a, 0.0);
    }

    #[test]
    fn setters_mark_dirty() {
        let mut light = built(LightSource::new(Vec2::ZERO, 10.0, LightColor::WHITE));
        light.set_color(LightColor::RED);
        assert!(light.is_dirty());
        light.refresh_mask(&mut PathFiller::default());
        light.set_arc(PI);
        assert!(light.is_dirty());
        light.refresh_mask(&mut PathFiller::default());
        light.set_edge_blur(2.0);
        assert!(light.is_dirty());
        light.refresh_mask(&mut PathFiller::default());
        light.set_radius(12.0);
        assert!(light.is_dirty());
        assert!(light.refresh_mask(&mut PathFiller::default()));
        assert_eq!(light.mask().width(), 24);

        // Orientation and opacity are blit-time only.
        light.set_angle(1.0);
        light.set_opacity(0.5);
        assert!(!light.is_dirty());
    }

    #[test]
    fn tiny_radius_deactivates() {
        let mut light = LightSource::new(Vec2::ZERO, 10.0, LightColor::WHITE);
        light.set_radius(0.5);
        assert!(!light.is_active());
        assert_eq!(light.radius(), 1.0);

        light.set_radius(8.0);
        assert!(light.is_active());
    }

    #[test]
    fn explicit_deactivation_survives_radius_change() {
        let mut light = LightSource::new(Vec2::ZERO, 10.0, LightColor::WHITE);
        light.set_active(false);
        light.set_radius(0.2);
        light.set_radius(5.0);
        assert!(!light.is_active());
    }

    #[test]
    fn nan_radius_is_degenerate() {
        let light = LightSource::new(Vec2::ZERO, f32::NAN, LightColor::WHITE);
        assert!(!light.is_active());
        assert_eq!(light.radius(), 1.0);
    }

    #[test]
    fn arc_limits_mask() {
        let light = built(LightSource::new(Vec2::ZERO, 20.0, LightColor::WHITE).with_arc(PI / 2.0));
        // Ahead (+X) is lit, behind is dark.
        assert!(light.mask().pixel(30, 20).a > 0.0);
        assert_eq!(light.mask().pixel(10, 20).a, 0.0);
        assert_eq!(light.mask().pixel(20, 30).a, 0.0);
    }

    #[test]
    fn edge_blur_softens_cone_edges() {
        let params = MaskParams {
            radius: 100.0,
            color: LightColor::WHITE,
            arc: PI / 2.0,
            edge_blur: 10.0,
        };
        let sharp = MaskParams { edge_blur: 0.0, ..params };
        // Just inside the +45° edge.
        let p = Vec2::new(50.0, 48.0);
        let soft = default_mask_pixel(p, &params).a;
        let hard = default_mask_pixel(p, &sharp).a;
        assert!(soft < hard);
        assert!(soft > 0.0);
        // On the axis, blur has no effect.
        let axis = Vec2::new(50.0, 0.0);
        assert_eq!(default_mask_pixel(axis, &params).a, default_mask_pixel(axis, &sharp).a);
    }

    #[test]
    fn custom_renderer_replaces_default() {
        let light = built(
            LightSource::new(Vec2::ZERO, 10.0, LightColor::WHITE).with_mask_renderer(Box::new(
                |painter: &mut MaskPainter<'_>, params: &MaskParams| {
                    let r = params.radius;
                    painter.fill_rect(Vec2::new(-r, -r), Vec2::new(r, 2.0 * r), params.color);
                },
            )),
        );
        // Left half filled, right half empty.
        assert_eq!(light.mask().pixel(2, 10).a, 1.0);
        assert_eq!(light.mask().pixel(15, 10).a, 0.0);
    }

    #[test]
    fn mask_to_world_centres_on_position() {
        let light = built(LightSource::new(Vec2::new(100.0, 50.0), 10.0, LightColor::WHITE));
        let centre = light.mask_to_world().transform_point2(Vec2::splat(10.0));
        assert!((centre - Vec2::new(100.0, 50.0)).length() < 1e-4);
    }
}
