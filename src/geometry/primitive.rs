use crate::foundation::core::{BezPath, LayerSize, PixelRect, Point, Rect};
use crate::input::sample::InputSample;
use kurbo::Shape;

/// Antialiasing margin added around measured geometry.
const AA_MARGIN: f64 = 1.0;

/// One round particle stamp.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Dab {
    /// Stamp center.
    pub center: Point,
    /// Stamp radius in pixels.
    pub radius: f64,
    /// Stamp opacity in `[0,1]`.
    pub alpha: f32,
}

/// A drawable piece of stroke geometry.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    /// Filled outline polygon.
    Fill {
        /// Outline path (nonzero fill).
        path: BezPath,
    },
    /// Particle stamp.
    Dab(Dab),
}

impl Primitive {
    /// Geometric bounds, `None` for primitives that draw nothing.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Fill { path } => {
                if path.elements().is_empty() {
                    None
                } else {
                    Some(path.bounding_box())
                }
            }
            Self::Dab(d) => {
                if d.radius <= 0.0 || d.alpha <= 0.0 {
                    None
                } else {
                    Some(Rect::from_center_size(
                        d.center,
                        (d.radius * 2.0, d.radius * 2.0),
                    ))
                }
            }
        }
    }
}

/// Pixel bounds of `primitives` (with antialiasing margin) clipped to a layer of `size`.
pub fn measure_bounds<'a>(
    primitives: impl IntoIterator<Item = &'a Primitive>,
    size: LayerSize,
) -> PixelRect {
    let mut acc: Option<Rect> = None;
    for r in primitives.into_iter().filter_map(Primitive::bounds) {
        acc = Some(match acc {
            Some(a) => a.union(r),
            None => r,
        });
    }
    match acc {
        Some(r) => PixelRect::from_rect_clipped(r.inflate(AA_MARGIN, AA_MARGIN), size),
        None => PixelRect::EMPTY,
    }
}

/// Output of one pipeline update.
///
/// `addition` is final and only ever appended; `prediction` replaces the previous prediction
/// wholesale and must never reach a permanent layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryDelta {
    /// Newly finalized geometry.
    pub addition: Vec<Primitive>,
    /// Speculative geometry past the last real sample.
    pub prediction: Vec<Primitive>,
}

impl GeometryDelta {
    /// Return `true` when neither part carries geometry.
    pub fn is_empty(&self) -> bool {
        self.addition.is_empty() && self.prediction.is_empty()
    }
}

/// Complete geometry of one finished stroke.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StrokeGeometry {
    /// Concatenation of every addition produced for the stroke.
    pub primitives: Vec<Primitive>,
    /// Samples submitted for the stroke, in arrival order.
    pub samples: Vec<InputSample>,
    /// Length of each non-empty addition, in the order they were produced.
    pub batches: Vec<usize>,
}

/// Split `primitives` into consecutive runs of the given lengths.
///
/// Lengths that do not add up to the slice length (or no lengths at all) yield one run.
pub(crate) fn split_batches<'a>(
    primitives: &'a [Primitive],
    lens: &[usize],
) -> Vec<&'a [Primitive]> {
    if lens.is_empty() || lens.iter().sum::<usize>() != primitives.len() {
        return vec![primitives];
    }
    let mut rest = primitives;
    lens.iter()
        .map(|&n| {
            let (head, tail) = rest.split_at(n);
            rest = tail;
            head
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/primitive.rs"]
mod tests;
