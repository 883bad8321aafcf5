use crate::foundation::core::{LayerSize, PixelRect, Rgba8Premul};
use crate::foundation::error::InkResult;
use crate::geometry::collaborator::BrushGeometry;
use crate::geometry::primitive::{GeometryDelta, Primitive, measure_bounds, split_batches};
use crate::render::dirty::DirtyRectTracker;
use crate::render::layer::{Layer, LayerBlend};
use crate::render::raster::Rasterizer;
use crate::stroke::{StrokeRecord, StrokeStyle};

/// The four offscreen layers owned by the compositor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Background plus everything visible; what gets presented.
    Scene,
    /// All committed strokes, in commit order.
    AllCommittedStrokes,
    /// Additions of the stroke in progress.
    CurrentStroke,
    /// Current stroke plus this frame's prediction, rebuilt inside the dirty rect every frame.
    PrelimPrediction,
}

impl LayerKind {
    /// All layers, bottom to top.
    pub const ALL: [Self; 4] = [
        Self::Scene,
        Self::AllCommittedStrokes,
        Self::CurrentStroke,
        Self::PrelimPrediction,
    ];
}

#[derive(Debug)]
struct LayerSet {
    scene: Layer,
    all_committed: Layer,
    current: Layer,
    prelim: Layer,
}

impl LayerSet {
    fn get(&self, kind: LayerKind) -> &Layer {
        match kind {
            LayerKind::Scene => &self.scene,
            LayerKind::AllCommittedStrokes => &self.all_committed,
            LayerKind::CurrentStroke => &self.current,
            LayerKind::PrelimPrediction => &self.prelim,
        }
    }

    fn slot_mut(&mut self, kind: LayerKind) -> &mut Layer {
        match kind {
            LayerKind::Scene => &mut self.scene,
            LayerKind::AllCommittedStrokes => &mut self.all_committed,
            LayerKind::CurrentStroke => &mut self.current,
            LayerKind::PrelimPrediction => &mut self.prelim,
        }
    }

    /// Rebuild the scene inside `rect` from background, committed strokes and the preliminary layer.
    fn compose_scene(&mut self, rect: PixelRect, background: Rgba8Premul) -> InkResult<()> {
        self.scene.clear_rect(rect, background);
        self.scene
            .blend_rect_from(&self.all_committed, rect, LayerBlend::SourceOver, 1.0)?;
        self.scene
            .blend_rect_from(&self.prelim, rect, LayerBlend::SourceOver, 1.0)
    }
}

/// Result of [`LayerCompositor::resize`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResizeOutcome {
    /// Degenerate size; prior layers kept.
    Ignored,
    /// Layers resized and the document replayed.
    Resized {
        /// Layers destroyed and recreated.
        recreated: usize,
        /// Stroke records replayed.
        replayed: usize,
    },
}

/// Premultiplied RGBA8 readback of a layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgba {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major pixel bytes.
    pub data: Vec<u8>,
    /// Always `true` for layer readbacks.
    pub premultiplied: bool,
}

/// Owns the offscreen layers and the blend steps that combine them.
///
/// Per frame: addition into CurrentStroke, dirty rect, CurrentStroke copied into
/// PrelimPrediction with the prediction on top, then Scene rebuilt from background,
/// AllCommittedStrokes and PrelimPrediction inside the dirty rect.
#[derive(Debug)]
pub struct LayerCompositor {
    layers: Option<LayerSet>,
    background: Rgba8Premul,
    tracker: DirtyRectTracker,
    raster: Rasterizer,
    pending: PixelRect,
}

impl LayerCompositor {
    /// Compositor with no layers; call [`resize`](Self::resize) before drawing.
    pub fn new(background: Rgba8Premul) -> Self {
        Self {
            layers: None,
            background,
            tracker: DirtyRectTracker::new(),
            raster: Rasterizer::new(),
            pending: PixelRect::EMPTY,
        }
    }

    /// Current layer size, `None` before the first successful resize.
    pub fn size(&self) -> Option<LayerSize> {
        self.layers.as_ref().map(|l| l.scene.size())
    }

    /// Borrow one layer.
    pub fn layer(&self, kind: LayerKind) -> Option<&Layer> {
        self.layers.as_ref().map(|l| l.get(kind))
    }

    /// Borrow the scene layer.
    pub fn scene(&self) -> Option<&Layer> {
        self.layer(LayerKind::Scene)
    }

    /// Copy one layer's pixels out.
    pub fn snapshot(&self, kind: LayerKind) -> Option<FrameRgba> {
        self.layer(kind).map(|l| FrameRgba {
            width: l.size().width,
            height: l.size().height,
            data: l.data().to_vec(),
            premultiplied: true,
        })
    }

    /// Take the region invalidated outside the frame flow (resize, reload, abort).
    pub fn take_pending(&mut self) -> PixelRect {
        std::mem::replace(&mut self.pending, PixelRect::EMPTY)
    }

    /// Mark `rect` for presentation on the next frame.
    pub fn invalidate(&mut self, rect: PixelRect) {
        self.pending = self.pending.union(rect);
    }

    /// Recreate layers whose size differs from `size` and rebuild their content from `strokes`.
    ///
    /// Zero-sized requests are ignored and keep the prior layers.
    #[tracing::instrument(skip(self, strokes, geometry), fields(strokes = strokes.len()))]
    pub fn resize<G: BrushGeometry>(
        &mut self,
        size: LayerSize,
        strokes: &[StrokeRecord],
        geometry: &G,
    ) -> InkResult<ResizeOutcome> {
        if !size.is_drawable() {
            tracing::warn!(?size, "ignoring degenerate resize");
            return Ok(ResizeOutcome::Ignored);
        }
        let size = size.validate()?;

        let mut recreated = 0;
        let layers = match self.layers.take() {
            Some(mut set) => {
                for kind in LayerKind::ALL {
                    let slot = set.slot_mut(kind);
                    if slot.size() != size {
                        *slot = Layer::new(size)?;
                        recreated += 1;
                    }
                }
                set
            }
            None => {
                recreated = LayerKind::ALL.len();
                LayerSet {
                    scene: Layer::new(size)?,
                    all_committed: Layer::new(size)?,
                    current: Layer::new(size)?,
                    prelim: Layer::new(size)?,
                }
            }
        };
        self.layers = Some(layers);

        let replayed = self.replay(strokes, geometry)?;
        tracing::debug!(recreated, replayed, "layers resized");
        Ok(ResizeOutcome::Resized {
            recreated,
            replayed,
        })
    }

    /// Clear every layer and redraw `strokes` oldest first.
    ///
    /// Each record is drawn in the additions it was drawn in live, with the live blend, so the
    /// rebuilt pixels match what was shown. Returns the number of strokes drawn. Without layers
    /// nothing is drawn.
    pub fn replay<G: BrushGeometry>(
        &mut self,
        strokes: &[StrokeRecord],
        geometry: &G,
    ) -> InkResult<usize> {
        let background = self.background;
        let Some(layers) = self.layers.as_mut() else {
            return Ok(0);
        };
        layers.scene.clear(background);
        layers.all_committed.clear(Rgba8Premul::TRANSPARENT);
        layers.current.clear(Rgba8Premul::TRANSPARENT);
        layers.prelim.clear(Rgba8Premul::TRANSPARENT);

        let full = layers.scene.size().full_rect();
        for record in strokes {
            let drawn = draw_batches(
                geometry,
                &record.geometry,
                &record.batches,
                &record.style,
                &mut self.raster,
                &mut layers.current,
            )?;
            layers
                .all_committed
                .blend_rect_from(&layers.current, drawn, LayerBlend::SourceOver, 1.0)?;
            layers.current.clear_rect(drawn, Rgba8Premul::TRANSPARENT);
        }
        layers.compose_scene(full, background)?;

        self.tracker.reset();
        self.pending = full;
        Ok(strokes.len())
    }

    /// Redraw the in-progress stroke's accumulated additions into CurrentStroke, one run of
    /// `batches` at a time.
    pub fn redraw_current<G: BrushGeometry>(
        &mut self,
        additions: &[Primitive],
        batches: &[usize],
        style: &StrokeStyle,
        geometry: &G,
    ) -> InkResult<PixelRect> {
        let Some(layers) = self.layers.as_mut() else {
            return Ok(PixelRect::EMPTY);
        };
        let drawn = draw_batches(
            geometry,
            additions,
            batches,
            style,
            &mut self.raster,
            &mut layers.current,
        )?;
        layers.prelim.copy_rect_from(&layers.current, drawn)?;
        layers.compose_scene(drawn, self.background)?;
        self.pending = self.pending.union(drawn);
        Ok(drawn)
    }

    /// Run one frame of the compositing flow for `delta` and return the dirty rect.
    ///
    /// Without layers the delta is dropped and the rect is empty.
    pub fn apply_delta<G: BrushGeometry>(
        &mut self,
        delta: &GeometryDelta,
        style: &StrokeStyle,
        geometry: &G,
    ) -> InkResult<PixelRect> {
        let Some(layers) = self.layers.as_mut() else {
            return Ok(PixelRect::EMPTY);
        };
        let size = layers.scene.size();
        let blend = style.live_blend();

        let addition = geometry.render_committed(
            &delta.addition,
            style,
            blend,
            &mut self.raster,
            &mut layers.current,
        )?;
        let prediction = measure_bounds(&delta.prediction, size);
        let dirty = self
            .tracker
            .get_update_rect(addition, prediction)
            .union(std::mem::replace(&mut self.pending, PixelRect::EMPTY));
        if dirty.is_empty() {
            return Ok(dirty);
        }

        layers.prelim.copy_rect_from(&layers.current, dirty)?;
        geometry.render_committed(
            &delta.prediction,
            style,
            blend,
            &mut self.raster,
            &mut layers.prelim,
        )?;
        layers.compose_scene(dirty, self.background)?;
        tracing::trace!(?addition, ?prediction, ?dirty, "frame composited");
        Ok(dirty)
    }

    /// Fold CurrentStroke into AllCommittedStrokes, clear it and reset the dirty tracker.
    #[tracing::instrument(skip(self))]
    pub fn commit_current_stroke(&mut self) -> InkResult<()> {
        if let Some(layers) = self.layers.as_mut() {
            let full = layers.current.size().full_rect();
            layers
                .all_committed
                .blend_rect_from(&layers.current, full, LayerBlend::SourceOver, 1.0)?;
            layers.current.clear(Rgba8Premul::TRANSPARENT);
        }
        self.tracker.reset();
        Ok(())
    }

    /// Throw away CurrentStroke and PrelimPrediction and repaint `area` plus the last
    /// prediction.
    pub fn discard_current_stroke(&mut self, area: PixelRect) -> InkResult<PixelRect> {
        let rect = area.union(self.tracker.previous_prediction());
        self.tracker.reset();
        let Some(layers) = self.layers.as_mut() else {
            return Ok(PixelRect::EMPTY);
        };
        let rect = rect.intersect(layers.scene.size().full_rect());
        layers.current.clear(Rgba8Premul::TRANSPARENT);
        layers.prelim.clear(Rgba8Premul::TRANSPARENT);
        layers.compose_scene(rect, self.background)?;
        self.pending = self.pending.union(rect);
        Ok(rect)
    }

    /// Change the background and repaint the whole scene.
    pub fn set_background(&mut self, background: Rgba8Premul) -> InkResult<()> {
        self.background = background;
        let Some(layers) = self.layers.as_mut() else {
            return Ok(());
        };
        let full = layers.scene.size().full_rect();
        layers.prelim.copy_rect_from(&layers.current, full)?;
        layers.compose_scene(full, background)?;
        self.pending = full;
        Ok(())
    }
}

/// Draw `primitives` into `target` run by run with the stroke's live blend.
fn draw_batches<G: BrushGeometry>(
    geometry: &G,
    primitives: &[Primitive],
    batches: &[usize],
    style: &StrokeStyle,
    raster: &mut Rasterizer,
    target: &mut Layer,
) -> InkResult<PixelRect> {
    let blend = style.live_blend();
    let mut drawn = PixelRect::EMPTY;
    for run in split_batches(primitives, batches) {
        drawn = drawn.union(geometry.render_committed(run, style, blend, raster, target)?);
    }
    Ok(drawn)
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
