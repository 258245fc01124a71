pub mod runner;

pub use runner::LightRunner;

use std::cell::RefCell;

use wasm_bindgen::prelude::*;
use wasm_bindgen::Clamped;
use zap_light::glam::Vec2;
use zap_light::{Block, LightColor, NoCastRegion};

thread_local! {
    static RUNNER: RefCell<Option<LightRunner>> = const { RefCell::new(None) };
}

/// Run `f` against the runner. `None` (and a warning) before `light_init`.
fn with_runner<R>(f: impl FnOnce(&mut LightRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        match borrow.as_mut() {
            Some(runner) => Some(f(runner)),
            None => {
                log::warn!("lighting not initialized; call light_init() first");
                None
            }
        }
    })
}

/// Install logging and create the runner from an optional JSON config.
#[wasm_bindgen]
pub fn light_init(config_json: Option<String>) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let runner = match config_json {
        Some(json) => LightRunner::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => LightRunner::default(),
    };
    log::info!("lighting: initialized {}x{}", runner.width(), runner.height());
    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(runner);
    });
    Ok(())
}

#[wasm_bindgen]
pub fn light_resize(width: u32, height: u32) {
    with_runner(|r| r.resize(width, height));
}

#[wasm_bindgen]
pub fn light_set_view(x: f32, y: f32, zoom: f32) {
    with_runner(|r| r.set_view(x, y, zoom));
}

#[wasm_bindgen]
pub fn light_set_anchor(id: u32, x: f32, y: f32, angle: f32) {
    with_runner(|r| r.set_anchor(id, x, y, angle));
}

#[wasm_bindgen]
pub fn light_remove_anchor(id: u32) {
    with_runner(|r| r.remove_anchor(id));
}

// ---- Regions ----

#[wasm_bindgen]
pub fn light_enable_region(region: u32, r: f32, g: f32, b: f32, a: f32) {
    with_runner(|runner| runner.enable_region(region, LightColor::new(r, g, b, a)));
}

#[wasm_bindgen]
pub fn light_remove_region(region: u32) -> bool {
    with_runner(|r| r.remove_region(region)).unwrap_or(false)
}

// ---- Lights ----

#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn light_add(region: u32, x: f32, y: f32, radius: f32, r: f32, g: f32, b: f32, a: f32) -> u32 {
    with_runner(|runner| runner.add_light(region, Vec2::new(x, y), radius, LightColor::new(r, g, b, a)))
        .unwrap_or(0)
}

#[wasm_bindgen]
pub fn light_set_position(id: u32, x: f32, y: f32, angle: f32) {
    with_runner(|r| {
        if let Some(light) = r.light_mut(id) {
            light.set_pos(Vec2::new(x, y));
            light.set_angle(angle);
        }
    });
}

#[wasm_bindgen]
pub fn light_set_radius(id: u32, radius: f32) {
    with_runner(|r| r.light_mut(id).map(|light| light.set_radius(radius)));
}

#[wasm_bindgen]
pub fn light_set_color(id: u32, r: f32, g: f32, b: f32, a: f32) {
    with_runner(|runner| runner.light_mut(id).map(|light| light.set_color(LightColor::new(r, g, b, a))));
}

#[wasm_bindgen]
pub fn light_set_cone(id: u32, arc: f32, edge_blur: f32) {
    with_runner(|r| {
        r.light_mut(id).map(|light| {
            light.set_arc(arc);
            light.set_edge_blur(edge_blur);
        })
    });
}

#[wasm_bindgen]
pub fn light_set_opacity(id: u32, opacity: f32) {
    with_runner(|r| r.light_mut(id).map(|light| light.set_opacity(opacity)));
}

#[wasm_bindgen]
pub fn light_set_casts_shadows(id: u32, casts: bool) {
    with_runner(|r| r.light_mut(id).map(|light| light.set_casts_shadows(casts)));
}

#[wasm_bindgen]
pub fn light_set_active(id: u32, active: bool) {
    with_runner(|r| r.light_mut(id).map(|light| light.set_active(active)));
}

#[wasm_bindgen]
pub fn light_remove(id: u32) -> bool {
    with_runner(|r| r.remove_light(id)).unwrap_or(false)
}

#[wasm_bindgen]
pub fn light_move_to_region(id: u32, region: u32) -> bool {
    with_runner(|r| r.move_light(id, region)).unwrap_or(false)
}

// ---- Blocks ----

#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn block_add_rect(region: u32, x: f32, y: f32, width: f32, height: f32, angle: f32, group: i32) -> u32 {
    let block = Block::rect(Vec2::new(x, y), Vec2::new(width, height))
        .with_angle(angle)
        .with_group(group);
    with_runner(|r| r.add_block(region, block)).unwrap_or(0)
}

#[wasm_bindgen]
pub fn block_add_circle(region: u32, x: f32, y: f32, radius: f32, group: i32) -> u32 {
    let block = Block::circle(Vec2::new(x, y), radius).with_group(group);
    with_runner(|r| r.add_block(region, block)).unwrap_or(0)
}

/// Polygon occluder from interleaved local `[x0, y0, x1, y1, ...]` points.
#[wasm_bindgen]
pub fn block_add_polygon(region: u32, x: f32, y: f32, points: &[f32], group: i32) -> u32 {
    let points: Vec<Vec2> = points.chunks_exact(2).map(|p| Vec2::new(p[0], p[1])).collect();
    let block = Block::new(Vec2::new(x, y), zap_light::Silhouette::polygon(points)).with_group(group);
    with_runner(|r| r.add_block(region, block)).unwrap_or(0)
}

#[wasm_bindgen]
pub fn block_set_position(id: u32, x: f32, y: f32, angle: f32) {
    with_runner(|r| {
        if let Some(block) = r.block_mut(id) {
            block.set_pos(Vec2::new(x, y));
            block.set_angle(angle);
        }
    });
}

#[wasm_bindgen]
pub fn block_set_translucent(id: u32, r: f32, g: f32, b: f32, a: f32) {
    with_runner(|runner| runner.block_mut(id).map(|block| block.set_translucent_color(LightColor::new(r, g, b, a))));
}

#[wasm_bindgen]
pub fn block_set_light_inside(id: u32, blocks: bool) {
    with_runner(|r| r.block_mut(id).map(|block| block.set_block_light_inside(blocks)));
}

#[wasm_bindgen]
pub fn block_remove(id: u32) -> bool {
    with_runner(|r| r.remove_block(id)).unwrap_or(false)
}

#[wasm_bindgen]
pub fn block_move_to_region(id: u32, region: u32) -> bool {
    with_runner(|r| r.move_block(id, region)).unwrap_or(false)
}

// ---- No-cast regions ----

#[wasm_bindgen]
pub fn no_cast_add_rect(region: u32, x: f32, y: f32, width: f32, height: f32) -> u32 {
    let area = NoCastRegion::rect(Vec2::new(x, y), Vec2::new(width, height));
    with_runner(|r| r.add_no_cast(region, area)).unwrap_or(0)
}

#[wasm_bindgen]
pub fn no_cast_add_circle(region: u32, x: f32, y: f32, radius: f32) -> u32 {
    let area = NoCastRegion::circle(Vec2::new(x, y), radius);
    with_runner(|r| r.add_no_cast(region, area)).unwrap_or(0)
}

#[wasm_bindgen]
pub fn no_cast_remove(id: u32) -> bool {
    with_runner(|r| r.remove_no_cast(id)).unwrap_or(false)
}

// ---- Frame ----

/// Draw a region's lighting overlay. Returns the number of lights drawn.
#[wasm_bindgen]
pub fn light_draw(region: u32) -> u32 {
    with_runner(|r| r.draw(region).sources_drawn).unwrap_or(0)
}

/// Draw the last frame onto a 2D canvas context at the origin.
#[wasm_bindgen]
pub fn light_present(ctx: &web_sys::CanvasRenderingContext2d) -> Result<(), JsValue> {
    with_runner(|r| {
        let image = web_sys::ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(r.frame_bytes()),
            r.width(),
            r.height(),
        )?;
        ctx.put_image_data(&image, 0.0, 0.0)
    })
    .unwrap_or(Ok(()))
}

/// Copy of the last frame's RGBA bytes.
#[wasm_bindgen]
pub fn light_frame() -> js_sys::Uint8ClampedArray {
    with_runner(|r| js_sys::Uint8ClampedArray::from(r.frame_bytes()))
        .unwrap_or_else(|| js_sys::Uint8ClampedArray::new_with_length(0))
}

#[wasm_bindgen]
pub fn get_frame_ptr() -> *const u8 {
    with_runner(|r| r.frame_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_frame_len() -> u32 {
    with_runner(|r| r.frame_len()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_frame_width() -> u32 {
    with_runner(|r| r.width()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_frame_height() -> u32 {
    with_runner(|r| r.height()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_shadow_passes() -> u32 {
    with_runner(|r| r.stats().shadow_passes).unwrap_or(0)
}
