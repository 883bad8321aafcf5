use crate::foundation::error::{InkError, InkResult};

pub use kurbo::{BezPath, Point, Rect, Vec2};

/// Largest layer edge the CPU raster backend can address.
pub const MAX_LAYER_EDGE: u32 = u16::MAX as u32;

/// Layer dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct LayerSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl LayerSize {
    /// Create a size without validating it.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Return `true` when both edges are non-zero.
    pub fn is_drawable(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Validate the size against the raster backend limits.
    pub fn validate(self) -> InkResult<Self> {
        if !self.is_drawable() {
            return Err(InkError::validation(format!(
                "layer size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width > MAX_LAYER_EDGE || self.height > MAX_LAYER_EDGE {
            return Err(InkError::surface(format!(
                "layer size {}x{} exceeds {MAX_LAYER_EDGE}",
                self.width, self.height
            )));
        }
        Ok(self)
    }

    /// The whole layer as a pixel rectangle.
    pub fn full_rect(self) -> PixelRect {
        PixelRect::new(0, 0, self.width, self.height)
    }
}

/// Integer, half-open pixel rectangle `[x0,x1) x [y0,y1)` in layer space.
///
/// All empty rectangles compare equal to [`PixelRect::EMPTY`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct PixelRect {
    /// Left edge (inclusive).
    pub x0: u32,
    /// Top edge (inclusive).
    pub y0: u32,
    /// Right edge (exclusive).
    pub x1: u32,
    /// Bottom edge (exclusive).
    pub y1: u32,
}

impl PixelRect {
    /// The empty rectangle.
    pub const EMPTY: Self = Self {
        x0: 0,
        y0: 0,
        x1: 0,
        y1: 0,
    };

    /// Create a rectangle, collapsing degenerate input to [`PixelRect::EMPTY`].
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        if x1 <= x0 || y1 <= y0 {
            return Self::EMPTY;
        }
        Self { x0, y0, x1, y1 }
    }

    /// Round a floating-point rectangle outward to whole pixels and clip it to `size`.
    pub fn from_rect_clipped(r: Rect, size: LayerSize) -> Self {
        if !(r.x0.is_finite() && r.y0.is_finite() && r.x1.is_finite() && r.y1.is_finite()) {
            return Self::EMPTY;
        }
        let r = r.abs();
        let clip = |v: f64, max: u32| -> u32 { v.clamp(0.0, f64::from(max)) as u32 };
        Self::new(
            clip(r.x0.floor(), size.width),
            clip(r.y0.floor(), size.height),
            clip(r.x1.ceil(), size.width),
            clip(r.y1.ceil(), size.height),
        )
    }

    /// Return `true` when the rectangle covers no pixels.
    pub fn is_empty(self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    /// Width in pixels.
    pub fn width(self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    /// Height in pixels.
    pub fn height(self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    /// Smallest rectangle covering both inputs. Empty inputs are the identity.
    pub fn union(self, other: Self) -> Self {
        match (self.is_empty(), other.is_empty()) {
            (true, true) => Self::EMPTY,
            (true, false) => other,
            (false, true) => self,
            (false, false) => Self {
                x0: self.x0.min(other.x0),
                y0: self.y0.min(other.y0),
                x1: self.x1.max(other.x1),
                y1: self.y1.max(other.y1),
            },
        }
    }

    /// Overlap of both inputs.
    pub fn intersect(self, other: Self) -> Self {
        Self::new(
            self.x0.max(other.x0),
            self.y0.max(other.y0),
            self.x1.min(other.x1),
            self.y1.min(other.y1),
        )
    }

    /// Return `true` when `other` lies entirely inside `self`. Empty rectangles are contained
    /// everywhere.
    pub fn contains_rect(self, other: Self) -> bool {
        other.is_empty()
            || (!self.is_empty()
                && self.x0 <= other.x0
                && self.y0 <= other.y0
                && self.x1 >= other.x1
                && self.y1 >= other.y1)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// Opaque white.
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };

    /// Opaque black.
    pub const BLACK: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Recover straight-alpha RGBA8. Fully transparent input maps to transparent black.
    pub fn to_straight_rgba(self) -> [u8; 4] {
        if self.a == 0 {
            return [0, 0, 0, 0];
        }
        let a = u32::from(self.a);
        let unpremul = |c: u8| -> u8 { ((u32::from(c) * 255 + a / 2) / a).min(255) as u8 };
        [unpremul(self.r), unpremul(self.g), unpremul(self.b), self.a]
    }

    /// Byte layout used by layers.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
