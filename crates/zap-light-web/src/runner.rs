use std::collections::HashMap;

use zap_light::glam::Vec2;
use zap_light::{
    Anchor, AnchorId, Block, BlockId, FrameStats, LightColor, LightResult, LightSource,
    LightWorld, LightingConfig, NoCastId, NoCastRegion, RegionId, SourceId, Surface, View,
};

/// Lighting runner behind the wasm exports.
///
/// Owns the light world, the camera and the output frame. JS registers
/// lights and occluders by region, pushes anchor transforms each frame,
/// calls `draw` and reads the RGBA overlay back through `frame_ptr`.
/// wasm-bindgen cannot export this struct's borrowed state directly, so
/// `lib.rs` keeps one in a `thread_local!`.
pub struct LightRunner {
    world: LightWorld,
    view: View,
    anchors: HashMap<AnchorId, Anchor>,
    frame: Surface,
    /// Straight-alpha bytes of the last drawn frame.
    rgba: Vec<u8>,
    stats: FrameStats,
}

impl LightRunner {
    pub fn new(config: LightingConfig) -> Self {
        let (w, h) = (config.viewport_width, config.viewport_height);
        Self {
            world: LightWorld::new(config),
            view: View::new(w as f32, h as f32),
            anchors: HashMap::new(),
            frame: Surface::new(w, h),
            rgba: Vec::with_capacity((w * h * 4) as usize),
            stats: FrameStats::default(),
        }
    }

    /// Build from a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> LightResult<Self> {
        Ok(Self::new(LightingConfig::from_json(json)?))
    }

    pub fn world(&self) -> &LightWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut LightWorld {
        &mut self.world
    }

    // ---- Viewport ----

    pub fn resize(&mut self, width: u32, height: u32) {
        self.world.resize(width, height);
        self.frame.resize(width, height);
        self.view.width = width as f32;
        self.view.height = height as f32;
        log::info!("lighting viewport {}x{}", width, height);
    }

    pub fn set_view(&mut self, x: f32, y: f32, zoom: f32) {
        self.view = self.view.with_offset(Vec2::new(x, y)).with_zoom(zoom);
    }

    pub fn set_anchor(&mut self, id: u32, x: f32, y: f32, angle: f32) {
        self.anchors.insert(AnchorId(id), Anchor::new(Vec2::new(x, y), angle));
    }

    pub fn remove_anchor(&mut self, id: u32) {
        self.anchors.remove(&AnchorId(id));
    }

    // ---- Regions ----

    pub fn enable_region(&mut self, region: u32, ambient: LightColor) {
        self.world.enable_with_ambient(RegionId(region), ambient);
    }

    pub fn remove_region(&mut self, region: u32) -> bool {
        self.world.remove_region(RegionId(region)).is_some()
    }

    // ---- Lights ----

    /// Register a light; returns its id, or 0 if the region has no lighting.
    pub fn add_light(&mut self, region: u32, pos: Vec2, radius: f32, color: LightColor) -> u32 {
        let light = LightSource::new(pos, radius, color);
        self.world
            .add_source(RegionId(region), light)
            .map(|id| id.0)
            .unwrap_or(0)
    }

    pub fn light_mut(&mut self, id: u32) -> Option<&mut LightSource> {
        self.world.source_mut(SourceId(id))
    }

    pub fn remove_light(&mut self, id: u32) -> bool {
        self.world.remove_source(SourceId(id)).is_ok()
    }

    pub fn move_light(&mut self, id: u32, region: u32) -> bool {
        match self.world.transfer_source(SourceId(id), RegionId(region)) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("light {} not moved: {}", id, e);
                false
            }
        }
    }

    // ---- Blocks ----

    /// Register an occluder; returns its id, or 0 if the region has no lighting.
    pub fn add_block(&mut self, region: u32, block: Block) -> u32 {
        self.world
            .add_block(RegionId(region), block)
            .map(|id| id.0)
            .unwrap_or(0)
    }

    pub fn block_mut(&mut self, id: u32) -> Option<&mut Block> {
        self.world.block_mut(BlockId(id))
    }

    pub fn remove_block(&mut self, id: u32) -> bool {
        self.world.remove_block(BlockId(id)).is_ok()
    }

    pub fn move_block(&mut self, id: u32, region: u32) -> bool {
        self.world.transfer_block(BlockId(id), RegionId(region)).is_ok()
    }

    pub fn add_no_cast(&mut self, region: u32, no_cast: NoCastRegion) -> u32 {
        self.world
            .add_no_cast(RegionId(region), no_cast)
            .map(|id| id.0)
            .unwrap_or(0)
    }

    pub fn remove_no_cast(&mut self, id: u32) -> bool {
        self.world.remove_no_cast(NoCastId(id)).is_ok()
    }

    // ---- Frame ----

    /// Draw one region's lighting overlay into the output frame.
    ///
    /// The frame starts transparent, so the result is the darkness and
    /// light layers alone, ready to be drawn over the scene canvas.
    pub fn draw(&mut self, region: u32) -> FrameStats {
        self.frame.clear();
        self.stats = match self
            .world
            .draw(RegionId(region), &mut self.frame, &self.view, &self.anchors)
        {
            Ok(stats) => stats,
            Err(e) => {
                log::debug!("nothing drawn: {}", e);
                FrameStats::default()
            }
        };
        self.frame.write_rgba8(&mut self.rgba);
        self.stats
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn frame(&self) -> &Surface {
        &self.frame
    }

    pub fn frame_bytes(&self) -> &[u8] {
        &self.rgba
    }

    pub fn frame_ptr(&self) -> *const u8 {
        self.rgba.as_ptr()
    }

    pub fn frame_len(&self) -> u32 {
        self.rgba.len() as u32
    }

    pub fn width(&self) -> u32 {
        self.frame.width()
    }

    pub fn height(&self) -> u32 {
        self.frame.height()
    }
}

impl Default for LightRunner {
    fn default() -> Self {
        Self::new(LightingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> LightRunner {
        LightRunner::new(LightingConfig {
            viewport_width: 64,
            viewport_height: 64,
            ..LightingConfig::default()
        })
    }

    #[test]
    fn from_json_reads_viewport() {
        let runner = LightRunner::from_json(r#"{ "viewport_width": 32, "viewport_height": 16 }"#).unwrap();
        assert_eq!((runner.width(), runner.height()), (32, 16));
        assert!(LightRunner::from_json("{ not json").is_err());
    }

    #[test]
    fn unlit_region_returns_zero_ids() {
        let mut runner = runner();
        assert_eq!(runner.add_light(5, Vec2::ZERO, 10.0, LightColor::WHITE), 0);
        assert_eq!(runner.add_block(5, Block::circle(Vec2::ZERO, 2.0)), 0);
    }

    #[test]
    fn draw_writes_overlay_bytes() {
        let mut runner = runner();
        runner.enable_region(1, LightColor::BLACK);
        let id = runner.add_light(1, Vec2::new(32.0, 32.0), 16.0, LightColor::WHITE);
        assert_ne!(id, 0);

        let stats = runner.draw(1);
        assert_eq!(stats.sources_drawn, 1);
        assert_eq!(runner.frame_len(), 64 * 64 * 4);

        let bytes = runner.frame_bytes();
        let corner = &bytes[0..4];
        assert_eq!(corner, &[0, 0, 0, 255]);
        let centre = ((32 * 64 + 32) * 4) as usize;
        assert!(bytes[centre] > 200);
    }

    #[test]
    fn anchors_drive_bound_lights() {
        let mut runner = runner();
        runner.enable_region(1, LightColor::BLACK);
        let id = runner.add_light(1, Vec2::ZERO, 8.0, LightColor::WHITE);
        runner
            .light_mut(id)
            .unwrap()
            .bind(Some(zap_light::Binding::new(AnchorId(3))));
        runner.set_anchor(3, 20.0, 40.0, 0.0);
        runner.draw(1);
        assert_eq!(runner.light_mut(id).unwrap().pos(), Vec2::new(20.0, 40.0));
    }

    #[test]
    fn resize_reallocates_frame() {
        let mut runner = runner();
        runner.enable_region(1, LightColor::BLACK);
        runner.resize(16, 8);
        runner.draw(1);
        assert_eq!(runner.frame_len(), 16 * 8 * 4);
        assert_eq!(runner.world().area(RegionId(1)).unwrap().buffers().size(), (16, 8));
    }

    #[test]
    fn drawing_unknown_region_yields_empty_stats() {
        let mut runner = runner();
        assert_eq!(runner.draw(9), FrameStats::default());
        assert!(runner.frame().is_clear());
    }
}
