use crate::input::sample::DeviceClass;

/// Maps a normalized input (speed or pressure) onto a path-point attribute.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpeedCurve {
    /// Speed (px/s) at or below which `min_value` applies.
    pub min_speed: f64,
    /// Speed (px/s) at or above which `max_value` applies.
    pub max_speed: f64,
    /// Output at the low end.
    pub min_value: f32,
    /// Output at the high end.
    pub max_value: f32,
    /// Value for the first point of a stroke.
    #[serde(default)]
    pub initial: Option<f32>,
    /// Value for the last point of a stroke.
    #[serde(default)]
    pub final_value: Option<f32>,
    /// Remap exponent applied to the normalized input.
    #[serde(default = "default_exponent")]
    pub exponent: f32,
}

fn default_exponent() -> f32 {
    1.0
}

impl SpeedCurve {
    fn new(min_speed: f64, max_speed: f64, min_value: f32, max_value: f32) -> Self {
        Self {
            min_speed,
            max_speed,
            min_value,
            max_value,
            initial: None,
            final_value: None,
            exponent: 1.0,
        }
    }

    fn with_ends(mut self, initial: f32, final_value: f32) -> Self {
        self.initial = Some(initial);
        self.final_value = Some(final_value);
        self
    }

    fn with_exponent(mut self, exponent: f32) -> Self {
        self.exponent = exponent;
        self
    }

    /// Evaluate for a pointer speed in px/s.
    pub fn at_speed(&self, speed: f64) -> f32 {
        let span = self.max_speed - self.min_speed;
        let k = if span <= 0.0 {
            1.0
        } else {
            ((speed.clamp(self.min_speed, self.max_speed) - self.min_speed) / span) as f32
        };
        self.remap(k)
    }

    /// Evaluate for a normalized pressure.
    pub fn at_pressure(&self, force: f32) -> f32 {
        self.remap(force.clamp(0.0, 1.0))
    }

    /// Value used for the first point of a stroke.
    pub fn start_value(&self) -> f32 {
        self.initial.unwrap_or(self.min_value)
    }

    fn remap(&self, k: f32) -> f32 {
        let k = if self.exponent == 1.0 {
            k
        } else {
            k.powf(self.exponent)
        };
        self.min_value + k * (self.max_value - self.min_value)
    }
}

/// Which path-point attributes a device drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct PathPointLayout {
    /// Size varies per point.
    pub size: bool,
    /// Opacity varies per point.
    pub alpha: bool,
    /// Pen altitude widens the stamp.
    pub tilt_scale: bool,
}

/// How raw samples become path-point attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointCalculator {
    /// Derive attributes from pointer speed.
    Speed,
    /// Use pressure when the sample carries it, otherwise speed.
    PressureOrSpeed,
}

/// Vector (outline) brush tools.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorTool {
    /// Thin ball-point pen.
    Pen,
    /// Felt-tip marker.
    Felt,
    /// Soft brush with a wide speed range.
    Brush,
}

/// Particle (stamp) brush tools.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleTool {
    /// Small translucent grains.
    Pencil,
    /// Large, very transparent wash.
    WaterBrush,
    /// Medium, fairly opaque grains.
    Crayon,
}

/// Brush style, one variant per geometry family.
///
/// Changing the brush only takes effect at the next stroke begin.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BrushConfig {
    /// Filled outlines.
    Vector {
        /// Tool preset.
        tool: VectorTool,
    },
    /// Stamped particles.
    Particle {
        /// Tool preset.
        tool: ParticleTool,
    },
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self::Vector {
            tool: VectorTool::Pen,
        }
    }
}

/// Particle placement parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleParams {
    /// Distance between dabs as a fraction of the dab size.
    pub spacing: f64,
    /// Random offset as a fraction of the dab size.
    pub scattering: f64,
    /// Per-dab opacity curve.
    pub alpha: SpeedCurve,
}

impl BrushConfig {
    /// Return `true` for outline brushes.
    pub fn is_vector(&self) -> bool {
        matches!(self, Self::Vector { .. })
    }

    /// Size (diameter) curve of the tool.
    pub fn size_curve(&self) -> SpeedCurve {
        match self {
            Self::Vector { tool } => match tool {
                VectorTool::Pen => SpeedCurve::new(180.0, 2100.0, 1.5, 3.0)
                    .with_ends(1.5, 1.5)
                    .with_exponent(0.35),
                VectorTool::Felt => SpeedCurve::new(80.0, 1400.0, 3.0, 7.0)
                    .with_ends(3.0, 3.0)
                    .with_exponent(0.65),
                VectorTool::Brush => SpeedCurve::new(0.0, 3500.0, 1.5, 10.2).with_exponent(1.17),
            },
            Self::Particle { tool } => match tool {
                ParticleTool::Pencil => SpeedCurve::new(80.0, 1400.0, 4.0, 5.0),
                ParticleTool::WaterBrush => {
                    SpeedCurve::new(38.0, 1500.0, 28.0, 32.0).with_exponent(3.0)
                }
                ParticleTool::Crayon => SpeedCurve::new(10.0, 1400.0, 18.0, 28.0),
            },
        }
    }

    /// Particle parameters, `None` for vector brushes.
    pub fn particle_params(&self) -> Option<ParticleParams> {
        let Self::Particle { tool } = self else {
            return None;
        };
        Some(match tool {
            ParticleTool::Pencil => ParticleParams {
                spacing: 0.3,
                scattering: 0.05,
                alpha: SpeedCurve::new(80.0, 1400.0, 0.05, 0.2),
            },
            ParticleTool::WaterBrush => ParticleParams {
                spacing: 0.15,
                scattering: 0.05,
                alpha: SpeedCurve::new(38.0, 1500.0, 0.02, 0.25),
            },
            ParticleTool::Crayon => ParticleParams {
                spacing: 0.15,
                scattering: 0.05,
                alpha: SpeedCurve::new(10.0, 1400.0, 0.1, 0.6),
            },
        })
    }

    /// Path-point layout for strokes drawn with `device`.
    pub fn layout_for(&self, device: DeviceClass) -> PathPointLayout {
        let stylus = device == DeviceClass::Stylus;
        match self {
            Self::Vector { tool } => PathPointLayout {
                size: true,
                alpha: false,
                tilt_scale: stylus && matches!(tool, VectorTool::Felt | VectorTool::Brush),
            },
            Self::Particle { .. } => PathPointLayout {
                size: true,
                alpha: true,
                tilt_scale: false,
            },
        }
    }

    /// Point calculator for strokes drawn with `device`.
    pub fn calculator_for(&self, device: DeviceClass) -> PointCalculator {
        match (self, device) {
            (_, DeviceClass::Mouse | DeviceClass::Touch) => PointCalculator::Speed,
            (Self::Vector { tool: VectorTool::Pen | VectorTool::Felt }, DeviceClass::Stylus) => {
                PointCalculator::Speed
            }
            (_, DeviceClass::Stylus) => PointCalculator::PressureOrSpeed,
        }
    }
}

/// Everything the geometry collaborator needs at stroke begin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipelineSetup {
    /// Attributes driven by input.
    pub layout: PathPointLayout,
    /// Sample-to-point mapping.
    pub calculator: PointCalculator,
    /// Brush style.
    pub brush: BrushConfig,
    /// Seed for any randomized placement.
    pub seed: u64,
}

impl PipelineSetup {
    /// Derive the setup for `brush` drawn with `device`.
    pub fn for_device(device: DeviceClass, brush: BrushConfig, seed: u64) -> Self {
        Self {
            layout: brush.layout_for(device),
            calculator: brush.calculator_for(device),
            brush,
            seed,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/brush.rs"]
mod tests;
