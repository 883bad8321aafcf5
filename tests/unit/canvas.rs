use super::*;
use crate::geometry::brush::{ParticleTool, VectorTool};
use crate::geometry::stamp::StampGeometry;
use crate::input::sample::StylusDescription;

fn canvas() -> InkCanvas<StampGeometry> {
    let opts = CanvasOpts::default().with_initial_size(LayerSize::new(96, 64));
    InkCanvas::new(StampGeometry::new(), opts).unwrap()
}

fn ev(device: DeviceToken, phase: Phase, ts: i64, x: f64, y: f64) -> PointerEvent {
    PointerEvent::single(device, phase, ts, RawPoint::at(x, y))
}

fn draw_line(c: &InkCanvas<StampGeometry>, device: DeviceToken, y: f64) {
    assert!(c.pointer_down(&ev(device, Phase::Begin, 0, 10.0, y)));
    for i in 1..5 {
        assert!(c.pointer_move(&ev(device, Phase::Update, i * 10_000, 10.0 + 15.0 * i as f64, y)));
        c.render_frame().unwrap();
    }
    assert!(c.pointer_up(&ev(device, Phase::End, 50_000, 80.0, y)));
}

#[test]
fn second_device_is_locked_out_until_release() {
    let c = canvas();
    let a = DeviceToken::stylus(1);
    let b = DeviceToken::MOUSE;

    assert!(c.pointer_down(&ev(a, Phase::Begin, 0, 1.0, 1.0)));
    assert!(!c.pointer_down(&ev(b, Phase::Begin, 0, 5.0, 5.0)));
    assert!(!c.pointer_move(&ev(b, Phase::Update, 10, 6.0, 5.0)));
    assert!(!c.pointer_up(&ev(b, Phase::End, 20, 7.0, 5.0)));
    assert_eq!(c.active_device(), Some(a));
    assert!(c.pointer_up(&ev(a, Phase::End, 30, 2.0, 1.0)));
    assert!(c.pointer_down(&ev(b, Phase::Begin, 40, 5.0, 5.0)));
}

#[test]
fn synthetic_mouse_events_are_dropped() {
    let c = canvas();
    let mut e = ev(DeviceToken::MOUSE, Phase::Begin, 0, 1.0, 1.0);
    e.synthetic = true;
    assert!(!c.pointer_down(&e));
    assert_eq!(c.active_device(), None);
}

#[test]
fn empty_press_is_rejected() {
    let c = canvas();
    let e = PointerEvent::batch(DeviceToken::MOUSE, Phase::Begin, 0, []);
    assert!(!c.pointer_down(&e));
    assert_eq!(c.active_device(), None);
}

#[test]
fn completed_stroke_is_recorded_and_composited() {
    let c = canvas();
    c.set_color(Rgba8Premul::from_straight_rgba(0, 0, 255, 255));
    draw_line(&c, DeviceToken::MOUSE, 30.0);

    let strokes = c.strokes();
    assert_eq!(strokes.len(), 1);
    let s = &strokes[0];
    assert_eq!(s.id, 1);
    assert_eq!(s.device_class, DeviceClass::Mouse);
    assert_eq!(s.style.color, Rgba8Premul::from_straight_rgba(0, 0, 255, 255));
    assert_eq!(s.samples.len(), 6);
    assert!(!s.geometry.is_empty());

    let committed = c.layer_snapshot(LayerKind::AllCommittedStrokes).unwrap();
    let i = ((30 * 96 + 40) * 4) as usize;
    assert_eq!(&committed.data[i..i + 4], &[0, 0, 255, 255]);
    let current = c.layer_snapshot(LayerKind::CurrentStroke).unwrap();
    assert!(current.data.iter().all(|&b| b == 0));
    assert_eq!(c.active_device(), None);
}

#[test]
fn idle_frames_are_empty() {
    let c = canvas();
    let first = c.render_frame().unwrap();
    assert_eq!(first.dirty, LayerSize::new(96, 64).full_rect());
    let second = c.render_frame().unwrap();
    assert!(second.dirty.is_empty());
    assert!(!second.consumed);
}

#[test]
fn brush_changes_apply_to_next_stroke_only() {
    let c = canvas();
    assert!(c.pointer_down(&ev(DeviceToken::MOUSE, Phase::Begin, 0, 10.0, 10.0)));
    let crayon = BrushConfig::Particle {
        tool: ParticleTool::Crayon,
    };
    c.set_brush(crayon);
    assert!(c.pointer_move(&ev(DeviceToken::MOUSE, Phase::Update, 10_000, 30.0, 10.0)));
    assert!(c.pointer_up(&ev(DeviceToken::MOUSE, Phase::End, 20_000, 40.0, 10.0)));
    assert_eq!(
        c.strokes()[0].style.brush,
        BrushConfig::Vector {
            tool: VectorTool::Pen
        }
    );
    assert_eq!(c.next_style().brush, crayon);

    draw_line(&c, DeviceToken::MOUSE, 40.0);
    assert_eq!(c.strokes()[1].style.brush, crayon);
    assert!(
        c.strokes()[1]
            .geometry
            .iter()
            .all(|p| matches!(p, crate::geometry::primitive::Primitive::Dab(_)))
    );
}

#[test]
fn strokes_get_distinct_seeds() {
    let c = canvas();
    draw_line(&c, DeviceToken::MOUSE, 10.0);
    draw_line(&c, DeviceToken::MOUSE, 20.0);
    let s = c.strokes();
    assert_ne!(s[0].random_seed, s[1].random_seed);
}

#[test]
fn abort_releases_a_stuck_device() {
    let c = canvas();
    let dead = DeviceToken::stylus(7);
    assert!(c.pointer_down(&ev(dead, Phase::Begin, 0, 10.0, 10.0)));
    assert!(c.pointer_move(&ev(dead, Phase::Update, 10_000, 40.0, 10.0)));
    c.render_frame().unwrap();

    assert!(c.abort_stroke().unwrap());
    assert_eq!(c.active_device(), None);
    assert!(c.strokes().is_empty());
    let scene = c.scene_snapshot().unwrap();
    assert!(scene.data.iter().all(|&b| b == 255));
    assert!(!c.render_frame().unwrap().dirty.is_empty());

    assert!(c.pointer_down(&ev(DeviceToken::MOUSE, Phase::Begin, 0, 1.0, 1.0)));
    assert!(!c.pointer_move(&ev(dead, Phase::Update, 20_000, 50.0, 10.0)));
}

#[test]
fn abort_without_stroke_reports_false() {
    let c = canvas();
    assert!(!c.abort_stroke().unwrap());
}

#[test]
fn clear_and_load_rebuild_the_document() {
    let c = canvas();
    draw_line(&c, DeviceToken::MOUSE, 30.0);
    let saved = c.strokes();

    c.clear_strokes().unwrap();
    assert!(c.strokes().is_empty());
    let scene = c.scene_snapshot().unwrap();
    assert!(scene.data.iter().all(|&b| b == 255));

    c.load_strokes(saved.clone()).unwrap();
    assert_eq!(c.strokes(), saved);
    draw_line(&c, DeviceToken::MOUSE, 50.0);
    assert_eq!(c.strokes()[1].id, saved[0].id + 1);
}

#[test]
fn resize_replays_and_keeps_active_stroke() {
    let c = canvas();
    draw_line(&c, DeviceToken::MOUSE, 30.0);
    assert!(c.pointer_down(&ev(DeviceToken::MOUSE, Phase::Begin, 0, 10.0, 50.0)));
    assert!(c.pointer_move(&ev(DeviceToken::MOUSE, Phase::Update, 10_000, 40.0, 50.0)));
    c.render_frame().unwrap();

    assert_eq!(c.resize(LayerSize::new(0, 0)).unwrap(), ResizeOutcome::Ignored);
    assert_eq!(c.size(), Some(LayerSize::new(96, 64)));

    let out = c.resize(LayerSize::new(120, 80)).unwrap();
    assert_eq!(
        out,
        ResizeOutcome::Resized {
            recreated: 4,
            replayed: 1
        }
    );
    let current = c.layer_snapshot(LayerKind::CurrentStroke).unwrap();
    assert_eq!(current.width, 120);
    assert!(current.data.iter().any(|&b| b != 0));

    assert!(c.pointer_up(&ev(DeviceToken::MOUSE, Phase::End, 20_000, 60.0, 50.0)));
    assert_eq!(c.strokes().len(), 2);
}

#[test]
fn sink_sees_every_commit() {
    #[derive(Default)]
    struct Collect(parking_lot::Mutex<Vec<u64>>);
    impl StrokeSink for Collect {
        fn stroke_committed(&self, record: &StrokeRecord) {
            self.0.lock().push(record.id);
        }
    }

    let sink = Arc::new(Collect::default());
    let c = canvas().with_sink(sink.clone());
    draw_line(&c, DeviceToken::MOUSE, 10.0);
    draw_line(&c, DeviceToken::stylus(2), 20.0);
    assert_eq!(*sink.0.lock(), vec![1, 2]);
}

#[test]
fn capture_routes_hub_events() {
    let c = Arc::new(canvas());
    let hub = InputHub::new();
    let handle = c.start_capture(&hub);

    assert!(hub.dispatch(&ev(DeviceToken::MOUSE, Phase::Begin, 0, 10.0, 10.0)));
    assert!(hub.dispatch(&ev(DeviceToken::MOUSE, Phase::Update, 10_000, 30.0, 10.0)));
    assert!(hub.dispatch(&ev(DeviceToken::MOUSE, Phase::End, 20_000, 40.0, 10.0)));
    assert_eq!(c.strokes().len(), 1);

    handle.stop();
    assert!(!hub.dispatch(&ev(DeviceToken::MOUSE, Phase::Begin, 0, 10.0, 10.0)));
    assert_eq!(c.active_device(), None);
}

#[test]
fn stylus_description_is_accepted_on_press() {
    let c = canvas();
    let mut e = ev(DeviceToken::stylus(3), Phase::Begin, 0, 10.0, 10.0);
    e.stylus = Some(StylusDescription::default());
    assert!(c.pointer_down(&e));
}

/// Stamp geometry whose renderer refuses the batch carrying the end sample.
#[derive(Debug, Default)]
struct FailsAtEnd {
    inner: StampGeometry,
    ended: bool,
}

impl BrushGeometry for FailsAtEnd {
    fn setup(&mut self, setup: &crate::geometry::brush::PipelineSetup) {
        self.ended = false;
        self.inner.setup(setup);
    }

    fn add_samples(
        &mut self,
        first: bool,
        last: bool,
        samples: &[crate::input::sample::InputSample],
    ) -> crate::geometry::primitive::GeometryDelta {
        self.ended = last;
        self.inner.add_samples(first, last, samples)
    }

    fn render_committed(
        &self,
        primitives: &[crate::geometry::primitive::Primitive],
        style: &StrokeStyle,
        blend: crate::render::layer::LayerBlend,
        raster: &mut crate::render::raster::Rasterizer,
        target: &mut Layer,
    ) -> InkResult<PixelRect> {
        if self.ended {
            return Err(crate::foundation::error::InkError::surface("target lost"));
        }
        raster.draw(primitives, style.color, blend, target)
    }
}

#[test]
fn failed_commit_leaves_no_pixels_behind() {
    let opts = CanvasOpts::default().with_initial_size(LayerSize::new(96, 64));
    let c = InkCanvas::new(FailsAtEnd::default(), opts).unwrap();
    let pen = DeviceToken::MOUSE;

    assert!(c.pointer_down(&ev(pen, Phase::Begin, 0, 10.0, 30.0)));
    for i in 1..4 {
        assert!(c.pointer_move(&ev(pen, Phase::Update, i * 10_000, 10.0 + 15.0 * i as f64, 30.0)));
        c.render_frame().unwrap();
    }
    let scene = c.scene_snapshot().unwrap();
    let i = ((30 * 96 + 30) * 4) as usize;
    assert_ne!(&scene.data[i..i + 4], &[255, 255, 255, 255]);

    assert!(c.pointer_up(&ev(pen, Phase::End, 40_000, 60.0, 30.0)));
    assert!(c.strokes().is_empty());
    assert_eq!(c.active_device(), None);
    for kind in [LayerKind::CurrentStroke, LayerKind::PrelimPrediction] {
        let layer = c.layer_snapshot(kind).unwrap();
        assert!(layer.data.iter().all(|&b| b == 0), "{kind:?} not cleared");
    }
    let update = c.render_frame().unwrap();
    assert!(update.dirty.contains_rect(PixelRect::new(12, 29, 50, 31)));
    let scene = c.scene_snapshot().unwrap();
    assert_eq!(&scene.data[i..i + 4], &[255, 255, 255, 255]);
}
