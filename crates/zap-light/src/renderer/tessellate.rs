//! Lyon-based path filling.
//!
//! Paths are tessellated into triangles with the non-zero fill rule, so the
//! sub-paths of a merged shadow union instead of cancelling, then handed to
//! the surface rasteriser.

use glam::Vec2;
use lyon::math::point;
use lyon::path::{Path, Winding};
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, FillVertexConstructor,
    VertexBuffers,
};

use crate::components::color::Rgba;
use super::blend::BlendMode;
use super::surface::{PixelRect, Surface};

/// Vertex constructor for lyon fill tessellation.
struct PositionCtor;

impl FillVertexConstructor<Vec2> for PositionCtor {
    fn new_vertex(&mut self, vertex: FillVertex) -> Vec2 {
        let p = vertex.position();
        Vec2::new(p.x, p.y)
    }
}

/// Reusable tessellator + triangle scratch.
pub struct PathFiller {
    tess: FillTessellator,
    geometry: VertexBuffers<Vec2, u32>,
    triangles: Vec<[Vec2; 3]>,
    tolerance: f32,
}

impl PathFiller {
    pub fn new(tolerance: f32) -> Self {
        Self {
            tess: FillTessellator::new(),
            geometry: VertexBuffers::new(),
            triangles: Vec::with_capacity(256),
            tolerance: tolerance.max(0.01),
        }
    }

    /// Tessellate `path`. Returns false (and logs) if lyon rejects it.
    fn tessellate(&mut self, path: &Path) -> bool {
        self.geometry.vertices.clear();
        self.geometry.indices.clear();
        self.triangles.clear();

        let options = FillOptions::tolerance(self.tolerance).with_fill_rule(FillRule::NonZero);
        let result = self.tess.tessellate_path(
            path,
            &options,
            &mut BuffersBuilder::new(&mut self.geometry, PositionCtor),
        );
        if let Err(err) = result {
            log::debug!("skipping untessellatable path: {err:?}");
            return false;
        }

        for tri in self.geometry.indices.chunks_exact(3) {
            self.triangles.push([
                self.geometry.vertices[tri[0] as usize],
                self.geometry.vertices[tri[1] as usize],
                self.geometry.vertices[tri[2] as usize],
            ]);
        }
        true
    }

    /// Fill `path` (pixel-space coordinates) into `target`.
    pub fn fill_path(&mut self, target: &mut Surface, path: &Path, color: Rgba, mode: BlendMode, clip: PixelRect) {
        if self.tessellate(path) {
            target.fill_triangles(&self.triangles, color, mode, clip);
        }
    }

}

impl Default for PathFiller {
    fn default() -> Self {
        Self::new(0.25)
    }
}

/// Closed polygon path. Returns `None` for fewer than 3 points.
pub fn polygon_path(points: &[Vec2]) -> Option<Path> {
    if points.len() < 3 {
        return None;
    }
    let mut builder = Path::builder();
    builder.begin(point(points[0].x, points[0].y));
    for p in &points[1..] {
        builder.line_to(point(p.x, p.y));
    }
    builder.close();
    Some(builder.build())
}

/// Circle path. Returns `None` for non-positive radii.
pub fn circle_path(center: Vec2, radius: f32) -> Option<Path> {
    if radius <= 0.0 {
        return None;
    }
    let mut builder = Path::builder();
    builder.add_circle(point(center.x, center.y), radius, Winding::Positive);
    Some(builder.build())
}
