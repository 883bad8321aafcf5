use crate::foundation::core::Point;
use crate::foundation::error::{InkError, InkResult};
use crate::geometry::brush::{BrushConfig, PipelineSetup};
use crate::geometry::collaborator::BrushGeometry;
use crate::geometry::primitive::{GeometryDelta, Primitive, StrokeGeometry};
use crate::input::sample::{
    DeviceClass, InputSample, Phase, RawPoint, StylusDescription, TiltMapper,
    altitude_azimuth_from_tilt,
};

/// Incremental adapter around a [`BrushGeometry`] collaborator.
///
/// Samples are queued by [`submit`](Self::submit) and handed to the collaborator in one batch per
/// [`consume_update`](Self::consume_update). Additions are also accumulated here so that
/// [`finalize`](Self::finalize) returns exactly their concatenation.
#[derive(Debug)]
pub struct GeometryPipeline<G> {
    geometry: G,
    use_intermediate_points: bool,
    tilt: Option<TiltMapper>,
    active: bool,
    first_batch: bool,
    saw_end: bool,
    last_timestamp_us: i64,
    pending: Vec<InputSample>,
    update_count: usize,
    accumulated: Vec<Primitive>,
    batches: Vec<usize>,
    samples: Vec<InputSample>,
}

impl<G: BrushGeometry> GeometryPipeline<G> {
    /// Wrap `geometry`; `use_intermediate_points` selects the batch policy of
    /// [`submit_batch`](Self::submit_batch).
    pub fn new(geometry: G, use_intermediate_points: bool) -> Self {
        Self {
            geometry,
            use_intermediate_points,
            tilt: None,
            active: false,
            first_batch: true,
            saw_end: false,
            last_timestamp_us: 0,
            pending: Vec::new(),
            update_count: 0,
            accumulated: Vec::new(),
            batches: Vec::new(),
            samples: Vec::new(),
        }
    }

    /// Configure the collaborator for the stroke about to begin.
    pub fn begin_setup(
        &mut self,
        device: DeviceClass,
        brush: BrushConfig,
        stylus: Option<&StylusDescription>,
        seed: u64,
    ) {
        self.tilt = stylus.and_then(TiltMapper::from_description);
        self.geometry
            .setup(&PipelineSetup::for_device(device, brush, seed));
    }

    /// Queue one sample. `Begin` resets all accumulation state.
    pub fn submit(&mut self, sample: InputSample) {
        match sample.phase {
            Phase::Begin => {
                self.clear_stroke_state();
                self.active = true;
            }
            _ if !self.active => {
                tracing::warn!(phase = ?sample.phase, "sample submitted with no active stroke; ignoring");
                return;
            }
            Phase::End => self.saw_end = true,
            Phase::Update => {}
        }
        self.pending.push(sample);
        self.samples.push(sample);
        self.update_count += 1;
    }

    /// Queue the points of one host event.
    ///
    /// With intermediate points enabled, every point is submitted and timestamps are spread
    /// evenly between the previous event and this one; only the final point of an `End` batch
    /// keeps `End`. Otherwise only the last point is submitted, with the event's phase.
    pub fn submit_batch(&mut self, phase: Phase, timestamp_us: i64, points: &[RawPoint]) {
        let Some(last) = points.last() else {
            return;
        };

        if !self.use_intermediate_points || phase == Phase::Begin || points.len() == 1 {
            let sample = self.sample_from(last, phase, timestamp_us);
            self.last_timestamp_us = timestamp_us;
            self.submit(sample);
            return;
        }

        let n = points.len();
        let step = (timestamp_us - self.last_timestamp_us) as f64 / n as f64;
        self.last_timestamp_us = timestamp_us;
        for (i, raw) in points.iter().enumerate() {
            let back = (n - 1 - i) as f64;
            let ts = (timestamp_us as f64 - step * back).floor() as i64;
            let p = if phase == Phase::End && i + 1 < n {
                Phase::Update
            } else {
                phase
            };
            let sample = self.sample_from(raw, p, ts);
            self.submit(sample);
        }
    }

    fn sample_from(&self, raw: &RawPoint, phase: Phase, timestamp_us: i64) -> InputSample {
        let mut sample = InputSample::new(raw.x, raw.y, phase, timestamp_us);
        sample.force = raw.force;
        if let (Some(mapper), Some(tx), Some(ty)) = (self.tilt, raw.tilt_x, raw.tilt_y) {
            let (dx, dy) = mapper.degrees(tx, ty);
            let (altitude, azimuth) = altitude_azimuth_from_tilt(dx, dy);
            sample.altitude = Some(altitude);
            sample.azimuth = Some(azimuth);
        }
        sample
    }

    /// Return `true` if samples were submitted since the last [`consume_update`](Self::consume_update).
    pub fn has_pending_update(&self) -> bool {
        self.update_count > 0
    }

    /// Run the collaborator over everything queued since the previous call.
    ///
    /// Without pending samples this is a no-op returning an empty delta.
    pub fn consume_update(&mut self) -> GeometryDelta {
        if !self.has_pending_update() {
            return GeometryDelta::default();
        }
        let delta = self
            .geometry
            .add_samples(self.first_batch, self.saw_end, &self.pending);
        self.first_batch = false;
        self.pending.clear();
        self.update_count = 0;
        if !delta.addition.is_empty() {
            self.batches.push(delta.addition.len());
            self.accumulated.extend(delta.addition.iter().cloned());
        }
        delta
    }

    /// Flush buffered samples and return the complete stroke, leaving the pipeline idle.
    pub fn finalize(&mut self) -> InkResult<StrokeGeometry> {
        if !self.active {
            return Err(InkError::pipeline("finalize called with no active stroke"));
        }
        if self.has_pending_update() {
            let _ = self.consume_update();
        }
        let geometry = StrokeGeometry {
            primitives: std::mem::take(&mut self.accumulated),
            samples: std::mem::take(&mut self.samples),
            batches: std::mem::take(&mut self.batches),
        };
        self.clear_stroke_state();
        Ok(geometry)
    }

    /// Drop the active stroke without producing geometry.
    pub fn abort(&mut self) -> bool {
        let was_active = self.active;
        self.clear_stroke_state();
        was_active
    }

    fn clear_stroke_state(&mut self) {
        self.active = false;
        self.first_batch = true;
        self.saw_end = false;
        self.pending.clear();
        self.update_count = 0;
        self.accumulated.clear();
        self.batches.clear();
        self.samples.clear();
    }

    /// Return `true` between `Begin` and `finalize`/`abort`.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Position of the most recent sample of the active stroke.
    pub fn last_position(&self) -> Option<Point> {
        self.samples.last().map(|s| s.position)
    }

    /// Samples submitted for the active stroke so far.
    pub fn samples(&self) -> &[InputSample] {
        &self.samples
    }

    /// Additions accumulated for the active stroke so far.
    pub fn accumulated(&self) -> &[Primitive] {
        &self.accumulated
    }

    /// Length of each addition accumulated so far.
    pub fn batches(&self) -> &[usize] {
        &self.batches
    }

    /// The wrapped collaborator.
    pub fn geometry(&self) -> &G {
        &self.geometry
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/pipeline.rs"]
mod tests;
