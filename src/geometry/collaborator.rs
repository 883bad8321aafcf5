use crate::foundation::core::PixelRect;
use crate::foundation::error::InkResult;
use crate::geometry::brush::PipelineSetup;
use crate::geometry::primitive::{GeometryDelta, Primitive};
use crate::input::sample::InputSample;
use crate::render::layer::{Layer, LayerBlend};
use crate::render::raster::Rasterizer;
use crate::stroke::StrokeStyle;

/// Brush geometry collaborator.
///
/// Owns the smoothing / fitting / outline stages that turn samples into drawable primitives. The
/// engine treats it as a black box: it is configured once per stroke, fed batches of samples, and
/// asked to draw finished geometry.
pub trait BrushGeometry: Send {
    /// Configure the stroke about to begin. Never called between a stroke's begin and end.
    fn setup(&mut self, setup: &PipelineSetup);

    /// Feed the samples accumulated since the previous call.
    ///
    /// `first` marks the first batch of a stroke (internal state must be reset), `last` marks the
    /// batch carrying the end sample (prediction must be empty).
    fn add_samples(&mut self, first: bool, last: bool, samples: &[InputSample]) -> GeometryDelta;

    /// Draw `primitives` into `target` and return the touched pixel bounds.
    ///
    /// Used for live additions and predictions as well as for full-document replay.
    fn render_committed(
        &self,
        primitives: &[Primitive],
        style: &StrokeStyle,
        blend: LayerBlend,
        raster: &mut Rasterizer,
        target: &mut Layer,
    ) -> InkResult<PixelRect> {
        raster.draw(primitives, style.color, blend, target)
    }
}
