use crate::foundation::core::{BezPath, Point, Vec2};
use crate::foundation::math::unit_signed;
use crate::geometry::brush::{ParticleParams, PipelineSetup, PointCalculator, SpeedCurve};
use crate::geometry::collaborator::BrushGeometry;
use crate::geometry::primitive::{Dab, GeometryDelta, Primitive};
use crate::input::sample::InputSample;
use kurbo::{Circle, Shape};

const CURVE_TOLERANCE: f64 = 0.1;
const MIN_SPACING_PX: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
struct PathPoint {
    pos: Point,
    size: f64,
    alpha: f32,
}

/// Particle walk state. Cloned for predictions so speculative dabs never advance it.
#[derive(Clone, Copy, Debug, Default)]
struct Walk {
    rng: u64,
    to_next: f64,
}

/// Deterministic reference geometry: capsule outlines for vector brushes, evenly spaced jittered
/// dabs for particle brushes, and one-interval linear extrapolation as prediction.
#[derive(Debug, Default)]
pub struct StampGeometry {
    setup: Option<PipelineSetup>,
    particles: Option<ParticleParams>,
    last_sample: Option<InputSample>,
    last_point: Option<PathPoint>,
    prev_point: Option<PathPoint>,
    previous_size: f32,
    previous_alpha: f32,
    walk: Walk,
}

impl StampGeometry {
    /// Unconfigured geometry; [`BrushGeometry::setup`] must run before samples arrive.
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self) {
        let seed = self.setup.map_or(0, |s| s.seed);
        self.last_sample = None;
        self.last_point = None;
        self.prev_point = None;
        self.walk = Walk {
            rng: seed,
            to_next: 0.0,
        };
        if let Some(setup) = self.setup {
            self.previous_size = setup.brush.size_curve().start_value();
        }
        if let Some(p) = self.particles {
            self.previous_alpha = p.alpha.start_value();
        }
    }

    fn evaluate(
        &self,
        curve: &SpeedCurve,
        previous: f32,
        calculator: PointCalculator,
        sample: &InputSample,
        is_final: bool,
    ) -> f32 {
        if calculator == PointCalculator::PressureOrSpeed
            && let Some(force) = sample.force
        {
            return curve.at_pressure(force);
        }
        let Some(last) = self.last_sample else {
            return curve.start_value();
        };
        if is_final && let Some(v) = curve.final_value {
            return v;
        }
        let dt_s = (sample.timestamp_us - last.timestamp_us) as f64 / 1_000_000.0;
        if dt_s <= 0.0 {
            return previous;
        }
        curve.at_speed(sample.position.distance(last.position) / dt_s)
    }

    fn path_point(
        &mut self,
        setup: &PipelineSetup,
        sample: &InputSample,
        is_final: bool,
    ) -> PathPoint {
        let size_curve = setup.brush.size_curve();
        let mut size = if setup.layout.size {
            self.evaluate(
                &size_curve,
                self.previous_size,
                setup.calculator,
                sample,
                is_final,
            )
        } else {
            size_curve.start_value()
        };
        self.previous_size = size;

        if setup.layout.tilt_scale
            && let Some(altitude) = sample.altitude
        {
            size *= 1.0 + 0.5 * altitude.cos().abs();
        }

        let alpha = match self.particles {
            Some(p) if setup.layout.alpha => {
                let a = self.evaluate(
                    &p.alpha,
                    self.previous_alpha,
                    PointCalculator::Speed,
                    sample,
                    is_final,
                );
                self.previous_alpha = a;
                a
            }
            _ => 1.0,
        };

        PathPoint {
            pos: sample.position,
            size: f64::from(size),
            alpha,
        }
    }

    fn segment(
        &self,
        from: Option<PathPoint>,
        to: PathPoint,
        walk: &mut Walk,
        out: &mut Vec<Primitive>,
    ) {
        match self.particles {
            None => capsule(from, to, out),
            Some(p) => dabs(&p, from, to, walk, out),
        }
    }
}

fn circle_path(center: Point, radius: f64) -> BezPath {
    Circle::new(center, radius).to_path(CURVE_TOLERANCE)
}

fn capsule(from: Option<PathPoint>, to: PathPoint, out: &mut Vec<Primitive>) {
    let r1 = to.size * 0.5;
    out.push(Primitive::Fill {
        path: circle_path(to.pos, r1),
    });
    let Some(from) = from else {
        return;
    };
    let dir: Vec2 = to.pos - from.pos;
    let len = dir.hypot();
    if len <= f64::EPSILON {
        return;
    }
    let n = Vec2::new(-dir.y, dir.x) / len;
    let r0 = from.size * 0.5;
    let mut hull = BezPath::new();
    hull.move_to(from.pos + n * r0);
    hull.line_to(to.pos + n * r1);
    hull.line_to(to.pos - n * r1);
    hull.line_to(from.pos - n * r0);
    hull.close_path();
    out.push(Primitive::Fill { path: hull });
}

fn dabs(
    params: &ParticleParams,
    from: Option<PathPoint>,
    to: PathPoint,
    walk: &mut Walk,
    out: &mut Vec<Primitive>,
) {
    let mut place = |pos: Point, size: f64, alpha: f32, walk: &mut Walk| {
        let jitter = params.scattering * size;
        let offset = Vec2::new(
            unit_signed(&mut walk.rng) * jitter,
            unit_signed(&mut walk.rng) * jitter,
        );
        out.push(Primitive::Dab(Dab {
            center: pos + offset,
            radius: size * 0.5,
            alpha,
        }));
    };

    let Some(from) = from else {
        place(to.pos, to.size, to.alpha, walk);
        walk.to_next = (params.spacing * to.size).max(MIN_SPACING_PX);
        return;
    };

    let len = from.pos.distance(to.pos);
    if len <= f64::EPSILON {
        return;
    }
    let mut at = walk.to_next;
    while at <= len {
        let t = at / len;
        let size = from.size + (to.size - from.size) * t;
        let alpha = from.alpha + (to.alpha - from.alpha) * t as f32;
        place(from.pos.lerp(to.pos, t), size, alpha, walk);
        at += (params.spacing * size).max(MIN_SPACING_PX);
    }
    walk.to_next = at - len;
}

impl BrushGeometry for StampGeometry {
    fn setup(&mut self, setup: &PipelineSetup) {
        self.setup = Some(*setup);
        self.particles = setup.brush.particle_params();
        self.reset();
    }

    fn add_samples(&mut self, first: bool, last: bool, samples: &[InputSample]) -> GeometryDelta {
        let Some(setup) = self.setup else {
            tracing::warn!("geometry fed samples before setup; dropping batch");
            return GeometryDelta::default();
        };
        if first {
            self.reset();
        }

        let mut delta = GeometryDelta::default();
        let mut walk = self.walk;
        for (i, sample) in samples.iter().enumerate() {
            let is_final = last && i + 1 == samples.len();
            let point = self.path_point(&setup, sample, is_final);
            self.segment(self.last_point, point, &mut walk, &mut delta.addition);
            self.prev_point = self.last_point;
            self.last_point = Some(point);
            self.last_sample = Some(*sample);
        }
        self.walk = walk;

        if !last
            && let (Some(prev), Some(cur)) = (self.prev_point, self.last_point)
        {
            let ahead = PathPoint {
                pos: cur.pos + (cur.pos - prev.pos),
                ..cur
            };
            if ahead.pos != cur.pos {
                let mut speculative = self.walk;
                self.segment(Some(cur), ahead, &mut speculative, &mut delta.prediction);
            }
        }
        delta
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/stamp.rs"]
mod tests;
