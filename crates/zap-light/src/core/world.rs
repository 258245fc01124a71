use std::collections::{HashMap, HashSet};

use glam::Vec2;

use crate::api::error::{LightError, LightResult};
use crate::api::types::{BlockId, FrameStats, NoCastId, RegionId, SourceId};
use crate::components::binding::AnchorProvider;
use crate::components::block::Block;
use crate::components::color::LightColor;
use crate::components::no_cast::NoCastRegion;
use crate::components::source::LightSource;
use crate::renderer::surface::Surface;
use crate::renderer::view::View;
use crate::systems::lighting::LightArea;
use super::config::LightingConfig;

/// Light areas keyed by the world region that owns them.
///
/// A region has lighting once `enable` has been called for it and loses it
/// (with every light and occluder in it) on `remove_region`.
pub struct LightWorld {
    config: LightingConfig,
    areas: HashMap<RegionId, LightArea>,
    /// Regions already reported as having lighting disabled.
    warned: HashSet<RegionId>,
}

impl LightWorld {
    pub fn new(config: LightingConfig) -> Self {
        Self {
            config: config.sanitized(),
            areas: HashMap::new(),
            warned: HashSet::new(),
        }
    }

    pub fn config(&self) -> &LightingConfig {
        &self.config
    }

    // ---- Regions ----

    /// Turn lighting on for a region. Returns the existing area if it
    /// already has one.
    pub fn enable(&mut self, region: RegionId) -> &mut LightArea {
        self.warned.remove(&region);
        let config = &self.config;
        self.areas.entry(region).or_insert_with(|| {
            log::debug!("lighting enabled for region {:?}", region);
            LightArea::with_config(region, config)
        })
    }

    /// `enable` with a solid ambient color in place of the configured default.
    pub fn enable_with_ambient(&mut self, region: RegionId, ambient: LightColor) -> &mut LightArea {
        let area = self.enable(region);
        area.set_ambient(ambient);
        area
    }

    pub fn is_enabled(&self, region: RegionId) -> bool {
        self.areas.contains_key(&region)
    }

    /// Destroy a region's area along with everything registered in it.
    pub fn remove_region(&mut self, region: RegionId) -> Option<LightArea> {
        self.warned.remove(&region);
        self.areas.remove(&region)
    }

    pub fn area(&self, region: RegionId) -> Option<&LightArea> {
        self.areas.get(&region)
    }

    pub fn area_mut(&mut self, region: RegionId) -> Option<&mut LightArea> {
        self.areas.get_mut(&region)
    }

    pub fn region_count(&self) -> usize {
        self.areas.len()
    }

    fn enabled_area(&mut self, region: RegionId) -> LightResult<&mut LightArea> {
        if !self.areas.contains_key(&region) {
            if self.warned.insert(region) {
                log::warn!("lighting is not enabled for region {:?}; ignoring its lights", region);
            }
            return Err(LightError::LightingDisabled(region));
        }
        self.areas
            .get_mut(&region)
            .ok_or(LightError::LightingDisabled(region))
    }

    // ---- Registration ----

    /// A light with the configured default radius.
    pub fn new_source(&self, pos: Vec2, color: LightColor) -> LightSource {
        LightSource::new(pos, self.config.default_radius, color)
    }

    /// Register a light in a region. Fails (and drops the light) if the
    /// region has no lighting.
    pub fn add_source(&mut self, region: RegionId, source: LightSource) -> LightResult<SourceId> {
        Ok(self.enabled_area(region)?.add_source(source))
    }

    pub fn add_block(&mut self, region: RegionId, block: Block) -> LightResult<BlockId> {
        Ok(self.enabled_area(region)?.add_block(block))
    }

    pub fn add_no_cast(&mut self, region: RegionId, no_cast: NoCastRegion) -> LightResult<NoCastId> {
        Ok(self.enabled_area(region)?.add_no_cast(no_cast))
    }

    /// Region currently owning a light.
    pub fn source_region(&self, id: SourceId) -> Option<RegionId> {
        self.areas
            .values()
            .find(|area| area.source(id).is_some())
            .map(|area| area.region())
    }

    pub fn block_region(&self, id: BlockId) -> Option<RegionId> {
        self.areas
            .values()
            .find(|area| area.block(id).is_some())
            .map(|area| area.region())
    }

    /// A light by id, whichever region owns it.
    pub fn source_mut(&mut self, id: SourceId) -> Option<&mut LightSource> {
        self.areas.values_mut().find_map(|area| area.source_mut(id))
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.areas.values_mut().find_map(|area| area.block_mut(id))
    }

    pub fn remove_source(&mut self, id: SourceId) -> LightResult<LightSource> {
        self.areas
            .values_mut()
            .find_map(|area| area.remove_source(id))
            .ok_or(LightError::UnknownSource(id))
    }

    pub fn remove_block(&mut self, id: BlockId) -> LightResult<Block> {
        self.areas
            .values_mut()
            .find_map(|area| area.remove_block(id))
            .ok_or(LightError::UnknownBlock(id))
    }

    pub fn remove_no_cast(&mut self, id: NoCastId) -> LightResult<NoCastRegion> {
        self.areas
            .values_mut()
            .find_map(|area| area.remove_no_cast(id))
            .ok_or(LightError::UnknownNoCast(id))
    }

    /// Move a light to another region, keeping its id. On error the light
    /// stays where it was.
    pub fn transfer_source(&mut self, id: SourceId, to: RegionId) -> LightResult<()> {
        self.enabled_area(to)?;
        if self.source_region(id) == Some(to) {
            return Ok(());
        }
        let source = self.remove_source(id)?;
        self.enabled_area(to)?.insert_source(id, source);
        Ok(())
    }

    pub fn transfer_block(&mut self, id: BlockId, to: RegionId) -> LightResult<()> {
        self.enabled_area(to)?;
        if self.block_region(id) == Some(to) {
            return Ok(());
        }
        let block = self.remove_block(id)?;
        self.enabled_area(to)?.insert_block(id, block);
        Ok(())
    }

    // ---- Frame ----

    /// Composite a region's lighting onto `target`.
    pub fn draw(
        &mut self,
        region: RegionId,
        target: &mut Surface,
        view: &View,
        anchors: &dyn AnchorProvider,
    ) -> LightResult<FrameStats> {
        let area = self
            .areas
            .get_mut(&region)
            .ok_or(LightError::UnknownRegion(region))?;
        Ok(area.draw(target, view, anchors))
    }

    /// Reallocate every area's scratch surfaces. Call between frames.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        for area in self.areas.values_mut() {
            area.resize(width, height);
        }
    }
}

impl Default for LightWorld {
    fn default() -> Self {
        Self::new(LightingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::binding::NoAnchors;

    const CAVE: RegionId = RegionId(1);
    const SURFACE: RegionId = RegionId(2);

    fn small_world() -> LightWorld {
        LightWorld::new(LightingConfig {
            viewport_width: 100,
            viewport_height: 100,
            ..LightingConfig::default()
        })
    }

    #[test]
    fn adding_to_unlit_region_fails() {
        let mut world = small_world();
        let light = world.new_source(Vec2::ZERO, LightColor::WHITE);
        let err = world.add_source(CAVE, light).unwrap_err();
        assert!(matches!(err, LightError::LightingDisabled(r) if r == CAVE));
        assert!(matches!(
            world.add_block(CAVE, Block::circle(Vec2::ZERO, 5.0)),
            Err(LightError::LightingDisabled(_))
        ));
        assert!(world.warned.contains(&CAVE));
    }

    #[test]
    fn enable_then_add() {
        let mut world = small_world();
        world.enable(CAVE);
        let id = world.add_source(CAVE, world.new_source(Vec2::ZERO, LightColor::WHITE)).unwrap();
        assert_eq!(world.source_region(id), Some(CAVE));
        assert_eq!(world.area(CAVE).unwrap().source(id).unwrap().radius(), 150.0);
        assert_eq!(world.area(CAVE).unwrap().buffers().size(), (100, 100));
    }

    #[test]
    fn enable_twice_keeps_area() {
        let mut world = small_world();
        world.enable(CAVE).add_block(Block::circle(Vec2::ZERO, 5.0));
        world.enable(CAVE);
        assert_eq!(world.area(CAVE).unwrap().block_count(), 1);
        assert_eq!(world.region_count(), 1);
    }

    #[test]
    fn removing_region_drops_its_lights() {
        let mut world = small_world();
        world.enable(CAVE);
        let id = world.add_source(CAVE, world.new_source(Vec2::ZERO, LightColor::WHITE)).unwrap();
        assert!(world.remove_region(CAVE).is_some());
        assert!(!world.is_enabled(CAVE));
        assert!(matches!(world.remove_source(id), Err(LightError::UnknownSource(_))));
    }

    #[test]
    fn transfer_keeps_id() {
        let mut world = small_world();
        world.enable(CAVE);
        world.enable(SURFACE);
        let light = world.add_source(CAVE, world.new_source(Vec2::ZERO, LightColor::RED)).unwrap();
        let block = world.add_block(CAVE, Block::circle(Vec2::ZERO, 4.0)).unwrap();

        world.transfer_source(light, SURFACE).unwrap();
        world.transfer_block(block, SURFACE).unwrap();
        assert_eq!(world.source_region(light), Some(SURFACE));
        assert_eq!(world.block_region(block), Some(SURFACE));
        assert_eq!(world.area(CAVE).unwrap().source_count(), 0);
        assert_eq!(world.area(SURFACE).unwrap().source(light).unwrap().color(), LightColor::RED);
    }

    #[test]
    fn transfer_to_unlit_region_leaves_object_in_place() {
        let mut world = small_world();
        world.enable(CAVE);
        let light = world.add_source(CAVE, world.new_source(Vec2::ZERO, LightColor::WHITE)).unwrap();
        assert!(world.transfer_source(light, SURFACE).is_err());
        assert_eq!(world.source_region(light), Some(CAVE));
    }

    #[test]
    fn lookup_by_id_across_regions() {
        let mut world = small_world();
        world.enable(CAVE);
        world.enable(SURFACE);
        let block = world.add_block(SURFACE, Block::circle(Vec2::ZERO, 4.0)).unwrap();
        world.block_mut(block).unwrap().set_pos(Vec2::new(3.0, 4.0));
        assert_eq!(world.area(SURFACE).unwrap().block(block).unwrap().pos(), Vec2::new(3.0, 4.0));
        assert!(world.source_mut(SourceId(u32::MAX)).is_none());
    }

    #[test]
    fn remove_no_cast_by_id() {
        let mut world = small_world();
        world.enable(CAVE);
        let id = world.add_no_cast(CAVE, NoCastRegion::circle(Vec2::ZERO, 3.0)).unwrap();
        assert!(world.remove_no_cast(id).is_ok());
        assert!(matches!(world.remove_no_cast(id), Err(LightError::UnknownNoCast(_))));
    }

    #[test]
    fn draw_unknown_region_errors() {
        let mut world = small_world();
        let mut target = Surface::new(10, 10);
        let result = world.draw(CAVE, &mut target, &View::new(10.0, 10.0), &NoAnchors);
        assert!(matches!(result, Err(LightError::UnknownRegion(_))));
    }

    #[test]
    fn draw_forwards_to_area() {
        let mut world = small_world();
        world.enable_with_ambient(CAVE, LightColor::BLACK);
        world
            .add_source(CAVE, LightSource::new(Vec2::new(50.0, 50.0), 20.0, LightColor::WHITE))
            .unwrap();
        let mut target = Surface::new(100, 100);
        let stats = world
            .draw(CAVE, &mut target, &View::new(100.0, 100.0), &NoAnchors)
            .unwrap();
        assert_eq!(stats.sources_drawn, 1);
        assert!(target.pixel(50, 50).luma_sum() > 0.0);
        assert_eq!(target.pixel(5, 5).luma_sum(), 0.0);
    }

    #[test]
    fn resize_reaches_every_area() {
        let mut world = small_world();
        world.enable(CAVE);
        world.enable(SURFACE);
        world.resize(320, 240);
        assert_eq!(world.area(CAVE).unwrap().buffers().size(), (320, 240));
        assert_eq!(world.area(SURFACE).unwrap().buffers().size(), (320, 240));
        world.enable(RegionId(3));
        assert_eq!(world.area(RegionId(3)).unwrap().buffers().size(), (320, 240));
    }
}
