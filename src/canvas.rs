use crate::config::CanvasOpts;
use crate::foundation::core::{LayerSize, PixelRect, Rgba8Premul};
use crate::foundation::error::InkResult;
use crate::foundation::math::splitmix64;
use crate::geometry::brush::BrushConfig;
use crate::geometry::collaborator::BrushGeometry;
use crate::geometry::pipeline::GeometryPipeline;
use crate::input::arbiter::PointerArbiter;
use crate::input::capture::{CaptureHandle, InputHub, PointerSink};
use crate::input::sample::{DeviceClass, DeviceToken, Phase, PointerEvent, RawPoint};
use crate::render::compositor::{FrameRgba, LayerCompositor, LayerKind, ResizeOutcome};
use crate::render::layer::Layer;
use crate::stroke::{NullSink, StrokeRecord, StrokeSink, StrokeStyle};
use parking_lot::Mutex;
use std::sync::Arc;

/// Result of one pass of the frame flow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct FrameUpdate {
    /// Region of the scene that changed and must be presented.
    pub dirty: PixelRect,
    /// A pending geometry update was consumed.
    pub consumed: bool,
}

#[derive(Clone, Copy, Debug)]
struct ActiveStroke {
    device: DeviceToken,
    style: StrokeStyle,
    seed: u64,
    touched: PixelRect,
}

struct CanvasState<G> {
    pipeline: GeometryPipeline<G>,
    compositor: LayerCompositor,
    strokes: Vec<StrokeRecord>,
    active: Option<ActiveStroke>,
    next_style: StrokeStyle,
    next_id: u64,
    seed_state: u64,
    sink: Arc<dyn StrokeSink>,
}

impl<G: BrushGeometry> CanvasState<G> {
    fn frame(&mut self) -> InkResult<FrameUpdate> {
        if !self.pipeline.has_pending_update() {
            return Ok(FrameUpdate {
                dirty: self.compositor.take_pending(),
                consumed: false,
            });
        }
        let delta = self.pipeline.consume_update();
        let style = self.active.map_or(self.next_style, |a| a.style);
        let dirty = self
            .compositor
            .apply_delta(&delta, &style, self.pipeline.geometry())?;
        if let Some(active) = self.active.as_mut() {
            active.touched = active.touched.union(dirty);
        }
        Ok(FrameUpdate {
            dirty,
            consumed: true,
        })
    }

    fn commit(&mut self) -> InkResult<Option<u64>> {
        let geometry = self.pipeline.finalize()?;
        self.compositor.commit_current_stroke()?;
        let Some(active) = self.active.take() else {
            return Ok(None);
        };
        if geometry.primitives.is_empty() {
            tracing::debug!(device = ?active.device, "stroke produced no geometry; not recorded");
            return Ok(None);
        }
        let record = StrokeRecord {
            id: self.next_id,
            device_class: active.device.class,
            style: active.style,
            geometry: geometry.primitives,
            samples: geometry.samples,
            random_seed: active.seed,
            batches: geometry.batches,
        };
        self.next_id += 1;
        self.sink.stroke_committed(&record);
        tracing::debug!(id = record.id, primitives = record.geometry.len(), "stroke committed");
        let id = record.id;
        self.strokes.push(record);
        Ok(Some(id))
    }

    fn rebuild(&mut self) -> InkResult<()> {
        self.compositor
            .replay(&self.strokes, self.pipeline.geometry())?;
        self.restore_active()
    }

    fn restore_active(&mut self) -> InkResult<()> {
        if let Some(active) = self.active {
            self.compositor.redraw_current(
                self.pipeline.accumulated(),
                self.pipeline.batches(),
                &active.style,
                self.pipeline.geometry(),
            )?;
        }
        Ok(())
    }
}

/// The incremental stroke engine: arbitration, geometry pipeline, layers and the committed
/// stroke list behind one lock.
///
/// Input callbacks ([`pointer_down`](Self::pointer_down) and friends) and the frame callback
/// ([`render_frame`](Self::render_frame)) may run on different threads.
pub struct InkCanvas<G> {
    arbiter: Mutex<PointerArbiter>,
    state: Mutex<CanvasState<G>>,
}

impl<G> std::fmt::Debug for InkCanvas<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InkCanvas")
            .field("owner", &self.arbiter.lock().owner())
            .finish_non_exhaustive()
    }
}

impl<G: BrushGeometry> InkCanvas<G> {
    /// Build a canvas around `geometry`. Environment overrides are applied to `opts`.
    pub fn new(geometry: G, opts: CanvasOpts) -> InkResult<Self> {
        let opts = opts.with_env_overrides();
        let mut state = CanvasState {
            pipeline: GeometryPipeline::new(geometry, opts.use_intermediate_points),
            compositor: LayerCompositor::new(opts.background),
            strokes: Vec::new(),
            active: None,
            next_style: StrokeStyle {
                color: opts.color,
                brush: opts.brush,
            },
            next_id: 1,
            seed_state: opts.random_seed,
            sink: Arc::new(NullSink),
        };
        if let Some(size) = opts.initial_size {
            state
                .compositor
                .resize(size, &[], state.pipeline.geometry())?;
        }
        Ok(Self {
            arbiter: Mutex::new(PointerArbiter::new()),
            state: Mutex::new(state),
        })
    }

    /// Route committed strokes to `sink`.
    pub fn with_sink(self, sink: Arc<dyn StrokeSink>) -> Self {
        self.state.lock().sink = sink;
        self
    }

    /// Start a stroke. Returns `false` while another device owns the canvas.
    pub fn pointer_down(&self, event: &PointerEvent) -> bool {
        if !accepts(event) {
            return false;
        }
        let mut arbiter = self.arbiter.lock();
        if !arbiter.on_pressed(event.device) {
            tracing::debug!(device = ?event.device, owner = ?arbiter.owner(), "press rejected");
            return false;
        }
        let mut state = self.state.lock();
        let style = state.next_style;
        let seed = splitmix64(&mut state.seed_state);
        state
            .pipeline
            .begin_setup(event.device.class, style.brush, event.stylus.as_ref(), seed);
        state
            .pipeline
            .submit_batch(Phase::Begin, event.timestamp_us, &event.points);
        state.active = Some(ActiveStroke {
            device: event.device,
            style,
            seed,
            touched: PixelRect::EMPTY,
        });
        tracing::debug!(device = ?event.device, seed, "stroke begin");
        true
    }

    /// Feed movement of the owning device.
    pub fn pointer_move(&self, event: &PointerEvent) -> bool {
        if !accepts(event) {
            return false;
        }
        let arbiter = self.arbiter.lock();
        if !arbiter.on_moved(event.device) {
            return false;
        }
        self.state
            .lock()
            .pipeline
            .submit_batch(Phase::Update, event.timestamp_us, &event.points);
        true
    }

    /// End the stroke of the owning device: draw its last segment and commit it.
    pub fn pointer_up(&self, event: &PointerEvent) -> bool {
        if event.synthetic && event.device.class == DeviceClass::Mouse {
            return false;
        }
        let mut arbiter = self.arbiter.lock();
        if !arbiter.on_released(event.device) {
            return false;
        }
        let mut state = self.state.lock();
        if event.points.is_empty() {
            let last = state
                .pipeline
                .last_position()
                .map(|p| RawPoint::at(p.x, p.y));
            if let Some(point) = last {
                state
                    .pipeline
                    .submit_batch(Phase::End, event.timestamp_us, &[point]);
            }
        } else {
            state
                .pipeline
                .submit_batch(Phase::End, event.timestamp_us, &event.points);
        }

        let committed = match state.frame() {
            Ok(update) => {
                state.compositor.invalidate(update.dirty);
                state.commit()
            }
            Err(err) => Err(err),
        };
        if let Err(err) = committed {
            tracing::error!(%err, "stroke commit failed");
            state.pipeline.abort();
            if let Some(active) = state.active.take()
                && let Err(err) = state.compositor.discard_current_stroke(active.touched)
            {
                tracing::error!(%err, "discarding failed stroke");
            }
        }
        true
    }

    /// Run the frame flow: consume pending geometry, update layers and return the dirty rect.
    ///
    /// With nothing pending the rect only carries regions invalidated since the last frame.
    pub fn render_frame(&self) -> InkResult<FrameUpdate> {
        let update = self.state.lock().frame()?;
        if !update.dirty.is_empty() {
            tracing::trace!(dirty = ?update.dirty, consumed = update.consumed, "frame");
        }
        Ok(update)
    }

    /// Copy the scene inside `rect` into `target`. Returns `false` if the canvas has no layers
    /// of `target`'s size.
    pub fn present_into(&self, target: &mut Layer, rect: PixelRect) -> InkResult<bool> {
        let state = self.state.lock();
        match state.compositor.scene() {
            Some(scene) if scene.size() == target.size() => {
                target.copy_rect_from(scene, rect)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Resize every layer and replay the document. Zero-sized requests are ignored.
    pub fn resize(&self, size: LayerSize) -> InkResult<ResizeOutcome> {
        let mut state = self.state.lock();
        let state = &mut *state;
        let outcome = state
            .compositor
            .resize(size, &state.strokes, state.pipeline.geometry())?;
        if matches!(outcome, ResizeOutcome::Resized { .. }) {
            state.restore_active()?;
        }
        Ok(outcome)
    }

    /// Remove every committed stroke.
    pub fn clear_strokes(&self) -> InkResult<()> {
        let mut state = self.state.lock();
        state.strokes.clear();
        state.rebuild()
    }

    /// Replace the document with `strokes` and redraw it.
    pub fn load_strokes(&self, strokes: Vec<StrokeRecord>) -> InkResult<()> {
        let mut state = self.state.lock();
        state.next_id = strokes.iter().map(|s| s.id).max().map_or(1, |id| id + 1);
        state.strokes = strokes;
        state.rebuild()
    }

    /// Committed strokes, oldest first.
    pub fn strokes(&self) -> Vec<StrokeRecord> {
        self.state.lock().strokes.clone()
    }

    /// Brush for strokes that begin after this call.
    pub fn set_brush(&self, brush: BrushConfig) {
        self.state.lock().next_style.brush = brush;
    }

    /// Color for strokes that begin after this call.
    pub fn set_color(&self, color: Rgba8Premul) {
        self.state.lock().next_style.color = color;
    }

    /// Style the next stroke will use.
    pub fn next_style(&self) -> StrokeStyle {
        self.state.lock().next_style
    }

    /// Change the scene background.
    pub fn set_background(&self, background: Rgba8Premul) -> InkResult<()> {
        self.state.lock().compositor.set_background(background)
    }

    /// Drop the stroke in progress without recording it and release the arbiter.
    ///
    /// Recovers from a device that vanished mid-stroke. Returns `false` when no stroke was
    /// active.
    #[tracing::instrument(skip(self))]
    pub fn abort_stroke(&self) -> InkResult<bool> {
        let mut arbiter = self.arbiter.lock();
        let owner = arbiter.force_release();
        let mut state = self.state.lock();
        let was_active = state.pipeline.abort();
        let Some(active) = state.active.take() else {
            return Ok(was_active || owner.is_some());
        };
        state.compositor.discard_current_stroke(active.touched)?;
        tracing::debug!(device = ?active.device, "stroke aborted");
        Ok(true)
    }

    /// Device currently owning the canvas.
    pub fn active_device(&self) -> Option<DeviceToken> {
        self.arbiter.lock().owner()
    }

    /// Layer size, `None` until the first successful resize.
    pub fn size(&self) -> Option<LayerSize> {
        self.state.lock().compositor.size()
    }

    /// Read back the scene.
    pub fn scene_snapshot(&self) -> Option<FrameRgba> {
        self.layer_snapshot(LayerKind::Scene)
    }

    /// Read back any layer.
    pub fn layer_snapshot(&self, kind: LayerKind) -> Option<FrameRgba> {
        self.state.lock().compositor.snapshot(kind)
    }
}

impl<G: BrushGeometry + 'static> InkCanvas<G> {
    /// Register this canvas with `hub`; input flows until the handle is stopped or dropped.
    pub fn start_capture(self: &Arc<Self>, hub: &InputHub) -> CaptureHandle {
        hub.subscribe(Arc::clone(self) as Arc<dyn PointerSink>)
    }
}

impl<G: BrushGeometry> PointerSink for InkCanvas<G> {
    fn handle_pointer(&self, event: &PointerEvent) -> bool {
        match event.phase {
            Phase::Begin => self.pointer_down(event),
            Phase::Update => self.pointer_move(event),
            Phase::End => self.pointer_up(event),
        }
    }
}

/// Mouse events the host synthesized from pen or touch input would start a second stream.
fn accepts(event: &PointerEvent) -> bool {
    !event.points.is_empty() && !(event.synthetic && event.device.class == DeviceClass::Mouse)
}

#[cfg(test)]
#[path = "../tests/unit/canvas.rs"]
mod tests;
