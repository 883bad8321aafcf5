use crate::foundation::core::{LayerSize, Rgba8Premul};
use crate::foundation::error::InkResult;
use crate::geometry::brush::BrushConfig;

/// Environment variable overriding [`CanvasOpts::use_intermediate_points`] (`0`/`1`,
/// `false`/`true`).
pub const USE_INTERMEDIATE_POINTS_ENV: &str = "INKFLOW_USE_INTERMEDIATE_POINTS";

/// Canvas construction options.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CanvasOpts {
    /// Scene background.
    pub background: Rgba8Premul,
    /// Submit every point of a batched event with back-filled timestamps instead of only the
    /// last one.
    pub use_intermediate_points: bool,
    /// Brush for the first stroke.
    pub brush: BrushConfig,
    /// Stroke color for the first stroke.
    pub color: Rgba8Premul,
    /// Allocate layers immediately at this size.
    pub initial_size: Option<LayerSize>,
    /// Seed of the per-stroke seed sequence.
    pub random_seed: u64,
}

impl Default for CanvasOpts {
    fn default() -> Self {
        Self {
            background: Rgba8Premul::WHITE,
            use_intermediate_points: true,
            brush: BrushConfig::default(),
            color: Rgba8Premul::BLACK,
            initial_size: None,
            random_seed: 0x1F0E_A5ED,
        }
    }
}

impl CanvasOpts {
    /// Parse options from JSON; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> InkResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Set the scene background.
    pub fn with_background(mut self, background: Rgba8Premul) -> Self {
        self.background = background;
        self
    }

    /// Set the batch policy.
    pub fn with_intermediate_points(mut self, enabled: bool) -> Self {
        self.use_intermediate_points = enabled;
        self
    }

    /// Set the initial brush.
    pub fn with_brush(mut self, brush: BrushConfig) -> Self {
        self.brush = brush;
        self
    }

    /// Set the initial stroke color.
    pub fn with_color(mut self, color: Rgba8Premul) -> Self {
        self.color = color;
        self
    }

    /// Allocate layers at construction.
    pub fn with_initial_size(mut self, size: LayerSize) -> Self {
        self.initial_size = Some(size);
        self
    }

    /// Set the seed sequence origin.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Apply [`USE_INTERMEDIATE_POINTS_ENV`] if it is set to a recognised value.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = std::env::var(USE_INTERMEDIATE_POINTS_ENV)
            .ok()
            .and_then(|v| parse_flag(&v))
        {
            self.use_intermediate_points = v;
        }
        self
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
