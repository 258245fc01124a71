use serde::{Deserialize, Serialize};

use crate::api::error::LightResult;
use crate::components::color::LightColor;

/// Lighting configuration, usually loaded from the game's JSON config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Initial viewport width in pixels (default: 800).
    pub viewport_width: u32,
    /// Initial viewport height in pixels (default: 600).
    pub viewport_height: u32,
    /// Ambient darkness for newly enabled regions (default: `#00000088`).
    pub default_ambient: LightColor,
    /// Radius used by `LightWorld::new_source` (default: 150).
    pub default_radius: f32,
    /// Shadow wedges extend to `radius * shadow_reach` so the polyline arc
    /// fully covers the mask (default: 1.1).
    pub shadow_reach: f32,
    /// Maximum angle in radians per segment of the wedge's boundary arc.
    pub arc_step: f32,
    /// Lyon tessellation tolerance in pixels (default: 0.25).
    pub tessellation_tolerance: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            viewport_width: 800,
            viewport_height: 600,
            default_ambient: LightColor::DUSK,
            default_radius: 150.0,
            shadow_reach: 1.1,
            arc_step: std::f32::consts::PI / 32.0,
            tessellation_tolerance: 0.25,
        }
    }
}

impl LightingConfig {
    /// Parse a config from a JSON string. Missing fields take defaults.
    pub fn from_json(json: &str) -> LightResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Clamp values that would break the frame loop.
    pub fn sanitized(mut self) -> Self {
        self.shadow_reach = self.shadow_reach.max(1.0);
        self.arc_step = self.arc_step.clamp(0.001, std::f32::consts::FRAC_PI_2);
        self.tessellation_tolerance = self.tessellation_tolerance.max(0.01);
        self.default_radius = self.default_radius.max(1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let config = LightingConfig::from_json(r#"{ "viewport_width": 320, "shadow_reach": 1.5 }"#).unwrap();
        assert_eq!(config.viewport_width, 320);
        assert_eq!(config.viewport_height, 600);
        assert_eq!(config.shadow_reach, 1.5);
        assert_eq!(config.default_radius, 150.0);
    }

    #[test]
    fn bad_values_are_clamped() {
        let config = LightingConfig::from_json(r#"{ "shadow_reach": 0.2, "arc_step": 0 }"#).unwrap();
        assert_eq!(config.shadow_reach, 1.0);
        assert!(config.arc_step > 0.0);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = LightingConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, crate::api::error::LightError::Config(_)));
    }
}
