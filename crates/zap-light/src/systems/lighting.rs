/// Per-region light compositing.
///
/// A `LightArea` owns the lights, occluders and no-cast regions of one world
/// region plus the scratch surfaces it draws through. `draw` runs once per
/// frame after the scene is drawn:
///
/// 1. bound lights/blocks follow their anchors, the light layer is cleared;
/// 2. each active, visible light blits its mask into the working layer,
///    has its shadows punched out (nearest occluder first), and is added to
///    the light layer;
/// 3. the darkness layer is filled with the background and the light layer
///    erased out of it;
/// 4. darkness is drawn over the target, then the light layer additively.
///
/// Scratch layers are cleared, never diffed, so nothing stale survives a
/// frame.

use lyon::math::point;
use lyon::path::Path;

use crate::api::types::{BlockId, FrameStats, NoCastId, RegionId, SourceId};
use crate::components::background::Background;
use crate::components::binding::AnchorProvider;
use crate::components::block::Block;
use crate::components::color::{LightColor, Rgba};
use crate::components::no_cast::NoCastRegion;
use crate::components::source::LightSource;
use crate::core::config::LightingConfig;
use crate::renderer::blend::BlendMode;
use crate::renderer::buffers::CompositingBuffers;
use crate::renderer::painter::MaskPainter;
use crate::renderer::surface::{PixelRect, Surface};
use crate::renderer::tessellate::PathFiller;
use crate::renderer::view::View;
use super::shadow::{plan_shadows, ShadowPass, WedgeParams};

const COVERAGE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

pub struct LightArea {
    region: RegionId,
    sources: Vec<(SourceId, LightSource)>,
    blocks: Vec<(BlockId, Block)>,
    no_casts: Vec<(NoCastId, NoCastRegion)>,
    background: Background,
    active: bool,
    buffers: CompositingBuffers,
    filler: PathFiller,
    wedge: WedgeParams,
}

impl LightArea {
    /// Create an area with the given ambient darkness and default settings.
    pub fn new(region: RegionId, ambient: LightColor) -> Self {
        let config = LightingConfig {
            default_ambient: ambient,
            ..LightingConfig::default()
        };
        Self::with_config(region, &config)
    }

    pub fn with_config(region: RegionId, config: &LightingConfig) -> Self {
        Self {
            region,
            sources: Vec::new(),
            blocks: Vec::new(),
            no_casts: Vec::new(),
            background: Background::Solid(config.default_ambient),
            active: true,
            buffers: CompositingBuffers::new(config.viewport_width, config.viewport_height),
            filler: PathFiller::new(config.tessellation_tolerance),
            wedge: WedgeParams {
                reach: config.shadow_reach,
                arc_step: config.arc_step,
            },
        }
    }

    pub fn region(&self) -> RegionId {
        self.region
    }

    // ---- Sources ----

    /// Register a light. Returns its handle.
    pub fn add_source(&mut self, source: LightSource) -> SourceId {
        let id = SourceId::next();
        self.insert_source(id, source);
        id
    }

    pub(crate) fn insert_source(&mut self, id: SourceId, source: LightSource) {
        self.sources.push((id, source));
    }

    /// Detach a light. Returns it so it can be registered elsewhere.
    pub fn remove_source(&mut self, id: SourceId) -> Option<LightSource> {
        let idx = self.sources.iter().position(|(sid, _)| *sid == id)?;
        Some(self.sources.remove(idx).1)
    }

    pub fn source(&self, id: SourceId) -> Option<&LightSource> {
        self.sources.iter().find(|(sid, _)| *sid == id).map(|(_, s)| s)
    }

    pub fn source_mut(&mut self, id: SourceId) -> Option<&mut LightSource> {
        self.sources.iter_mut().find(|(sid, _)| *sid == id).map(|(_, s)| s)
    }

    pub fn sources(&self) -> impl Iterator<Item = (SourceId, &LightSource)> {
        self.sources.iter().map(|(id, s)| (*id, s))
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    // ---- Blocks ----

    /// Register an occluder. Returns its handle.
    pub fn add_block(&mut self, block: Block) -> BlockId {
        let id = BlockId::next();
        self.insert_block(id, block);
        id
    }

    pub(crate) fn insert_block(&mut self, id: BlockId, block: Block) {
        self.blocks.push((id, block));
    }

    pub fn remove_block(&mut self, id: BlockId) -> Option<Block> {
        let idx = self.blocks.iter().position(|(bid, _)| *bid == id)?;
        Some(self.blocks.remove(idx).1)
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|(bid, _)| *bid == id).map(|(_, b)| b)
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|(bid, _)| *bid == id).map(|(_, b)| b)
    }

    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.blocks.iter().map(|(id, b)| (*id, b))
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    // ---- No-cast regions ----

    pub fn add_no_cast(&mut self, region: NoCastRegion) -> NoCastId {
        let id = NoCastId::next();
        self.no_casts.push((id, region));
        id
    }

    pub fn remove_no_cast(&mut self, id: NoCastId) -> Option<NoCastRegion> {
        let idx = self.no_casts.iter().position(|(nid, _)| *nid == id)?;
        Some(self.no_casts.remove(idx).1)
    }

    pub fn no_casts(&self) -> impl Iterator<Item = (NoCastId, &NoCastRegion)> {
        self.no_casts.iter().map(|(id, n)| (*id, n))
    }

    // ---- Area settings ----

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn set_background(&mut self, background: Background) {
        self.background = background;
    }

    /// Shorthand for a solid ambient color.
    pub fn set_ambient(&mut self, color: LightColor) {
        self.background = Background::Solid(color);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// An inactive area draws nothing (no darkness, no light).
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Reallocate scratch surfaces for a new viewport. Call between frames.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.buffers.resize(width, height);
    }

    /// Scratch surfaces, as left by the last `draw`.
    pub fn buffers(&self) -> &CompositingBuffers {
        &self.buffers
    }

    /// Move bound lights and blocks onto their anchors.
    pub fn sync_bindings(&mut self, anchors: &dyn AnchorProvider) {
        for (_, source) in &mut self.sources {
            let Some(binding) = source.binding().copied() else { continue };
            match binding.resolve(anchors) {
                Some((pos, angle)) => {
                    source.set_pos(pos);
                    if let Some(angle) = angle {
                        source.set_angle(angle);
                    }
                }
                None => log::trace!("light anchor {:?} missing; light stays put", binding.anchor),
            }
        }
        for (_, block) in &mut self.blocks {
            let Some(binding) = block.binding().copied() else { continue };
            match binding.resolve(anchors) {
                Some((pos, angle)) => {
                    block.set_pos(pos);
                    if let Some(angle) = angle {
                        block.set_angle(angle);
                    }
                }
                None => log::trace!("block anchor {:?} missing; block stays put", binding.anchor),
            }
        }
    }

    /// Composite this frame's lighting onto `target`.
    pub fn draw(&mut self, target: &mut Surface, view: &View, anchors: &dyn AnchorProvider) -> FrameStats {
        let mut stats = FrameStats::default();
        if !self.active {
            return stats;
        }

        if self.buffers.size() != (target.width(), target.height()) {
            self.buffers.resize(target.width(), target.height());
        }
        self.sync_bindings(anchors);

        let Self {
            region,
            sources,
            blocks,
            no_casts,
            background,
            buffers,
            filler,
            wedge,
            ..
        } = self;

        buffers.light.clear();
        let bounds = buffers.light.bounds();
        let world_to_screen = view.transform();

        for (_, source) in sources.iter_mut() {
            if !source.is_active() || source.opacity() <= 0.0 {
                continue;
            }
            if !view.is_circle_visible(source.pos(), source.radius()) {
                stats.sources_culled += 1;
                continue;
            }
            source.refresh_mask(filler);

            let centre = view.to_screen(source.pos());
            let reach = source.radius() * view.zoom + 1.0;
            let rect = PixelRect::enclosing(centre - reach, centre + reach).intersect(&bounds);
            if rect.is_empty() {
                stats.sources_culled += 1;
                continue;
            }
            let mask_to_screen = world_to_screen * source.mask_to_world();

            if !source.casts_shadows() {
                buffers.light.draw_surface(
                    source.mask(),
                    mask_to_screen,
                    source.opacity(),
                    BlendMode::Additive,
                    rect,
                );
                stats.sources_drawn += 1;
                continue;
            }

            let plan = plan_shadows(source.pos(), source.radius(), blocks, *wedge);
            stats.blocks_considered += plan.considered;
            if plan.blocked {
                stats.sources_blocked += 1;
                continue;
            }

            buffers.working.draw_surface(
                source.mask(),
                mask_to_screen,
                source.opacity(),
                BlendMode::Copy,
                rect,
            );
            for pass in &plan.passes {
                apply_shadow(buffers, filler, pass, blocks, no_casts, source, view, rect);
                stats.shadow_passes += 1;
            }
            buffers.light.composite_from(&buffers.working, rect, BlendMode::Additive);
            buffers.working.clear_rect(rect);
            stats.sources_drawn += 1;
        }

        let size = glam::Vec2::new(bounds.x1 as f32, bounds.y1 as f32);
        if background.is_solid() {
            let fill = background.pixel_at(glam::Vec2::ZERO, size);
            buffers.darkness.fill_rect(bounds, fill, BlendMode::Copy);
        } else {
            buffers
                .darkness
                .fill_rect_with(bounds, BlendMode::Copy, |p| background.pixel_at(p, size));
        }
        buffers.darkness.composite_from(&buffers.light, bounds, BlendMode::Erase);

        target.composite_from(&buffers.darkness, bounds, BlendMode::Normal);
        target.composite_from(&buffers.light, bounds, BlendMode::Additive);

        log::trace!("light area {:?}: {:?}", region, stats);
        stats
    }
}

/// Punch one shadow pass out of the working layer.
///
/// The wedges are filled as coverage into the translucency layer, sprite
/// masks and no-cast regions are erased from that coverage, then the
/// coverage either erases the light (opaque) or tints it.
#[allow(clippy::too_many_arguments)]
fn apply_shadow(
    buffers: &mut CompositingBuffers,
    filler: &mut PathFiller,
    pass: &ShadowPass,
    blocks: &[(BlockId, Block)],
    no_casts: &[(NoCastId, NoCastRegion)],
    source: &LightSource,
    view: &View,
    rect: PixelRect,
) {
    let mut builder = Path::builder();
    for outline in &pass.outlines {
        let mut points = outline.iter().map(|p| view.to_screen(*p));
        let Some(first) = points.next() else { continue };
        builder.begin(point(first.x, first.y));
        for p in points {
            builder.line_to(point(p.x, p.y));
        }
        builder.close();
    }
    let path = builder.build();
    filler.fill_path(&mut buffers.translucency, &path, COVERAGE, BlendMode::Copy, rect);

    let world_to_screen = view.transform();
    for &i in &pass.members {
        let block = &blocks[i].1;
        if let Some(mask) = block.sprite_mask() {
            let t = world_to_screen * block.local_to_world();
            let mut painter = MaskPainter::new(&mut buffers.translucency, filler, t, BlendMode::Erase, rect);
            mask(&mut painter);
        }
    }

    for (_, region) in no_casts {
        if !region.touches(source.pos(), source.radius()) {
            continue;
        }
        let mut painter =
            MaskPainter::new(&mut buffers.translucency, filler, world_to_screen, BlendMode::Erase, rect);
        match *region {
            NoCastRegion::Rect { min, size } => painter.fill_rect(min, size, LightColor::BLACK),
            NoCastRegion::Circle { center, radius } => painter.fill_circle(center, radius, LightColor::BLACK),
        }
    }

    if pass.is_translucent() {
        buffers
            .translucency
            .fill_rect(rect, pass.tint.to_pixel(), BlendMode::KeepWhereOpaque);
        buffers.working.composite_from(&buffers.translucency, rect, BlendMode::Tint);
    } else {
        buffers.working.composite_from(&buffers.translucency, rect, BlendMode::Erase);
    }
    buffers.translucency.clear_rect(rect);
}
