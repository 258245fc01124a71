// components/binding.rs
//
// Slaves a light or occluder to an engine object's transform.
// The engine exposes its objects through `AnchorProvider`; lighting never
// holds references into engine state.

use std::collections::HashMap;
use glam::Vec2;
use crate::core::geometry::rotate;

/// Identifies an engine object that lights/blocks can follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorId(pub u32);

/// World transform of an engine object at the start of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Anchor {
    pub pos: Vec2,
    pub angle: f32,
}

impl Anchor {
    pub fn new(pos: Vec2, angle: f32) -> Self {
        Self { pos, angle }
    }
}

/// Lookup of anchor transforms, implemented by the engine side.
pub trait AnchorProvider {
    fn anchor(&self, id: AnchorId) -> Option<Anchor>;
}

impl AnchorProvider for HashMap<AnchorId, Anchor> {
    fn anchor(&self, id: AnchorId) -> Option<Anchor> {
        self.get(&id).copied()
    }
}

/// Provider for frames with no bound objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnchors;

impl AnchorProvider for NoAnchors {
    fn anchor(&self, _id: AnchorId) -> Option<Anchor> {
        None
    }
}

/// Position/orientation relationship to an anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binding {
    pub anchor: AnchorId,
    /// Offset in the anchor's local frame (rotated by the anchor's angle).
    pub offset: Vec2,
    /// Added to the anchor's angle when `follow_angle` is set.
    pub angle_offset: f32,
    pub follow_angle: bool,
}

impl Binding {
    pub fn new(anchor: AnchorId) -> Self {
        Self {
            anchor,
            offset: Vec2::ZERO,
            angle_offset: 0.0,
            follow_angle: true,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_angle_offset(mut self, angle_offset: f32) -> Self {
        self.angle_offset = angle_offset;
        self
    }

    /// Keep position slaved but leave orientation alone.
    pub fn position_only(mut self) -> Self {
        self.follow_angle = false;
        self
    }

    /// Resolve the bound world transform. `None` if the anchor is gone,
    /// in which case the object stays where it was.
    pub fn resolve(&self, anchors: &dyn AnchorProvider) -> Option<(Vec2, Option<f32>)> {
        let anchor = anchors.anchor(self.anchor)?;
        let pos = anchor.pos + rotate(self.offset, anchor.angle);
        let angle = self.follow_angle.then(|| anchor.angle + self.angle_offset);
        Some((pos, angle))
    }
}
