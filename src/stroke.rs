use crate::foundation::core::Rgba8Premul;
use crate::geometry::brush::BrushConfig;
use crate::geometry::primitive::Primitive;
use crate::input::sample::{DeviceClass, InputSample};
use crate::render::layer::LayerBlend;

/// Visual style of one stroke.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrokeStyle {
    /// Premultiplied stroke color.
    pub color: Rgba8Premul,
    /// Brush used to generate the geometry.
    pub brush: BrushConfig,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Rgba8Premul::BLACK,
            brush: BrushConfig::default(),
        }
    }
}

impl StrokeStyle {
    /// Blend used while the stroke is being drawn into the current-stroke layer.
    pub fn live_blend(&self) -> LayerBlend {
        if self.brush.is_vector() {
            LayerBlend::Max
        } else {
            LayerBlend::SourceOver
        }
    }
}

/// The durable result of one finished stroke. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrokeRecord {
    /// Document-unique id, increasing in commit order.
    pub id: u64,
    /// Class of the device that drew the stroke.
    pub device_class: DeviceClass,
    /// Style at stroke begin.
    pub style: StrokeStyle,
    /// Final geometry.
    pub geometry: Vec<Primitive>,
    /// Samples the geometry was derived from.
    #[serde(default)]
    pub samples: Vec<InputSample>,
    /// Seed used for randomized particle placement.
    #[serde(default)]
    pub random_seed: u64,
    /// Lengths of the additions `geometry` was drawn in while live. Empty means one run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub batches: Vec<usize>,
}

/// Receives every committed stroke, e.g. to persist it.
pub trait StrokeSink: Send + Sync {
    /// Called once per stroke, after it has been composited into the committed layer.
    fn stroke_committed(&self, record: &StrokeRecord);
}

/// A sink that ignores every stroke.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl StrokeSink for NullSink {
    fn stroke_committed(&self, _record: &StrokeRecord) {}
}
