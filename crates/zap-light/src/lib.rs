pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;

pub use glam;

// Re-export key types at crate root for convenience
pub use api::error::{LightError, LightResult};
pub use api::types::{RegionId, SourceId, BlockId, NoCastId, FrameStats};
pub use components::color::{LightColor, Rgba};
pub use components::source::{LightSource, MaskParams, MaskRenderer, default_mask_pixel};
pub use components::block::{Block, Silhouette, SpriteMask, NO_GROUP};
pub use components::no_cast::NoCastRegion;
pub use components::background::{Background, ColorStop};
pub use components::binding::{Anchor, AnchorId, AnchorProvider, Binding, NoAnchors};
pub use core::config::LightingConfig;
pub use core::world::LightWorld;
pub use renderer::blend::BlendMode;
pub use renderer::surface::{PixelRect, Surface};
pub use renderer::painter::MaskPainter;
pub use renderer::view::View;
pub use systems::lighting::LightArea;
pub use systems::shadow::{ShadowWedge, ShadowPass, ShadowPlan};
