//! Shadow wedge construction.
//!
//! Pure geometry: given a light and the occluders around it, decide which
//! shadows to punch and in what shape. Nothing here touches a surface, so
//! planning can run for several lights before any compositing happens.

use glam::Vec2;

use crate::api::types::BlockId;
use crate::components::block::{Block, NO_GROUP};
use crate::components::color::LightColor;
use crate::core::geometry::{angle_of, angular_difference, direction};

/// The region an occluder hides from a light, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowWedge {
    /// Silhouette point with the smallest angle.
    pub p0: Vec2,
    /// Silhouette point with the largest angle.
    pub p1: Vec2,
    /// Angle of `p0` as seen from the light.
    pub a0: f32,
    /// Angle of `p1` as seen from the light.
    pub a1: f32,
}

impl ShadowWedge {
    pub fn new(source: Vec2, p0: Vec2, p1: Vec2) -> Self {
        let d0 = p0 - source;
        let d1 = p1 - source;
        Self {
            p0,
            p1,
            a0: angle_of(d0.x, d0.y),
            a1: angle_of(d1.x, d1.y),
        }
    }

    /// Closed outline `p0 -> p1 -> far(a1) -> arc -> far(a0)`.
    ///
    /// The boundary arc is swept from `a1` to `a0` the short way, using the
    /// sign of `angular_difference(a0, a1)`, which keeps every wedge wound
    /// the same way as its near edge.
    pub fn outline(&self, source: Vec2, reach: f32, arc_step: f32) -> Vec<Vec2> {
        let sweep = angular_difference(self.a0, self.a1);
        let steps = ((sweep.abs() / arc_step).ceil() as usize).max(1);
        let mut points = Vec::with_capacity(steps + 3);
        points.push(self.p0);
        points.push(self.p1);
        for i in 0..=steps {
            let a = self.a1 + sweep * (i as f32 / steps as f32);
            points.push(source + direction(a) * reach);
        }
        points
    }
}

/// One shadow punch: a single block, or a run of blocks sharing a group.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowPass {
    /// Indices into the slice handed to `plan_shadows`, nearest first.
    pub members: Vec<usize>,
    /// One world-space outline per member that casts a shadow.
    pub outlines: Vec<Vec<Vec2>>,
    /// Tint of the pass; opaque black erases.
    pub tint: LightColor,
}

impl ShadowPass {
    pub fn is_translucent(&self) -> bool {
        !self.tint.is_opaque_black()
    }
}

/// Everything one light needs to draw its shadows this frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShadowPlan {
    /// The light sits inside a `block_light_inside` occluder: emit nothing.
    pub blocked: bool,
    /// Occluders that passed the distance cull.
    pub considered: u32,
    pub passes: Vec<ShadowPass>,
}

/// Shape parameters for wedge outlines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WedgeParams {
    /// Multiplier on the light radius for the far arc.
    pub reach: f32,
    /// Max radians per arc segment.
    pub arc_step: f32,
}

/// Active blocks within reach of a light, sorted nearest first.
pub fn near_blocks(source: Vec2, radius: f32, blocks: &[(BlockId, Block)]) -> Vec<usize> {
    let mut near: Vec<(f32, usize)> = blocks
        .iter()
        .enumerate()
        .filter(|(_, (_, b))| b.is_active() && b.in_range(source, radius))
        .map(|(i, (_, b))| (b.pos().distance_squared(source), i))
        .collect();
    near.sort_by(|a, b| a.0.total_cmp(&b.0));
    near.into_iter().map(|(_, i)| i).collect()
}

/// Plan the shadows of a light of `radius` at `source`.
///
/// Blocks are visited nearest first. Consecutive blocks with the same
/// group (other than `NO_GROUP`) share one pass, so their wedges are filled
/// as one shape with no seam between them.
pub fn plan_shadows(
    source: Vec2,
    radius: f32,
    blocks: &[(BlockId, Block)],
    params: WedgeParams,
) -> ShadowPlan {
    let order = near_blocks(source, radius, blocks);
    let mut plan = ShadowPlan {
        blocked: false,
        considered: order.len() as u32,
        passes: Vec::new(),
    };

    if order
        .iter()
        .map(|&i| &blocks[i].1)
        .any(|b| b.blocks_light_inside() && b.contains(source))
    {
        plan.blocked = true;
        return plan;
    }

    let reach = radius * params.reach;
    let mut current_group = NO_GROUP;
    for i in order {
        let block = &blocks[i].1;
        let joins = block.group() != NO_GROUP && block.group() == current_group;
        if !joins {
            plan.passes.push(ShadowPass {
                members: Vec::new(),
                outlines: Vec::new(),
                tint: block.translucent_color(),
            });
        }
        current_group = block.group();

        let Some(pass) = plan.passes.last_mut() else { continue };
        pass.members.push(i);
        if let Some((p0, p1)) = block.tangent_points(source) {
            let wedge = ShadowWedge::new(source, p0, p1);
            pass.outlines.push(wedge.outline(source, reach, params.arc_step));
        }
    }

    plan.passes.retain(|p| !p.outlines.is_empty());
    plan
}
