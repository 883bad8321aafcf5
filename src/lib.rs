//! inkflow is an incremental, predictive stroke rendering engine.
//!
//! Pen, mouse and touch input is arbitrated to one device at a time, fed through a two-phase
//! geometry pipeline (final additions and speculative predictions) and composited across four
//! offscreen layers so each frame only redraws the region that actually changed.
//!
//! - Build an [`InkCanvas`] around a [`BrushGeometry`] (e.g. [`StampGeometry`])
//! - Feed it [`PointerEvent`]s directly or through an [`InputHub`]
//! - Drive presentation with a [`FrameDriver`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod canvas;
pub(crate) mod config;
pub(crate) mod geometry;
pub(crate) mod input;
pub(crate) mod render;
pub(crate) mod stroke;

pub use crate::foundation::core::{
    BezPath, LayerSize, MAX_LAYER_EDGE, PixelRect, Point, Rect, Rgba8Premul, Vec2,
};
pub use crate::foundation::error::{InkError, InkResult};

pub use crate::canvas::{FrameUpdate, InkCanvas};
pub use crate::config::{CanvasOpts, USE_INTERMEDIATE_POINTS_ENV};
pub use crate::geometry::brush::{
    BrushConfig, ParticleParams, ParticleTool, PathPointLayout, PipelineSetup, PointCalculator,
    SpeedCurve, VectorTool,
};
pub use crate::geometry::collaborator::BrushGeometry;
pub use crate::geometry::pipeline::GeometryPipeline;
pub use crate::geometry::primitive::{
    Dab, GeometryDelta, Primitive, StrokeGeometry, measure_bounds,
};
pub use crate::geometry::stamp::StampGeometry;
pub use crate::input::arbiter::PointerArbiter;
pub use crate::input::capture::{CaptureHandle, InputHub, PointerSink};
pub use crate::input::sample::{
    AxisRange, DeviceClass, DeviceToken, InputSample, Phase, PointerEvent, RawPoint,
    StylusDescription, altitude_azimuth_from_tilt,
};
pub use crate::render::compositor::{FrameRgba, LayerCompositor, LayerKind, ResizeOutcome};
pub use crate::render::dirty::DirtyRectTracker;
pub use crate::render::frame::{FrameDriver, FrameReport, SurfaceHandoff};
pub use crate::render::layer::{Layer, LayerBlend, PremulRgba8};
pub use crate::render::raster::Rasterizer;
pub use crate::stroke::{NullSink, StrokeRecord, StrokeSink, StrokeStyle};
