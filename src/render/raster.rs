use crate::foundation::core::{BezPath, PixelRect, Point, Rgba8Premul};
use crate::foundation::error::InkResult;
use crate::geometry::primitive::{Primitive, measure_bounds};
use crate::render::layer::{Layer, LayerBlend};
use kurbo::{Circle, Shape};

const DAB_TOLERANCE: f64 = 0.1;

/// Rasterizes primitives with `vello_cpu` into a scratch layer and blends the result into a
/// target layer.
///
/// Outline fills are drawn opaque and the stroke alpha is applied once at blend time, so
/// overlapping pieces of one stroke never double up. Dabs are painted with their own alpha times
/// the stroke alpha and blended at full opacity, so every dab composites the same way whichever
/// batch it arrives in.
///
/// The render context and scratch layer are kept between draws; only the region touched by the
/// previous draw is cleared.
#[derive(Default)]
pub struct Rasterizer {
    ctx: Option<vello_cpu::RenderContext>,
    scratch: Option<Layer>,
    scratch_dirty: PixelRect,
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer")
            .field("scratch", &self.scratch)
            .field("scratch_dirty", &self.scratch_dirty)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Pass {
    Fills,
    Dabs,
}

impl Pass {
    fn takes(self, prim: &Primitive) -> bool {
        match self {
            Self::Fills => matches!(prim, Primitive::Fill { .. }),
            Self::Dabs => matches!(prim, Primitive::Dab(_)),
        }
    }
}

impl Rasterizer {
    /// Rasterizer with no scratch surface yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw `primitives` in `color` into `target` using `blend` and return the touched bounds.
    pub fn draw(
        &mut self,
        primitives: &[Primitive],
        color: Rgba8Premul,
        blend: LayerBlend,
        target: &mut Layer,
    ) -> InkResult<PixelRect> {
        let fills = self.draw_pass(Pass::Fills, primitives, color, blend, target)?;
        let dabs = self.draw_pass(Pass::Dabs, primitives, color, blend, target)?;
        Ok(fills.union(dabs))
    }

    fn draw_pass(
        &mut self,
        pass: Pass,
        primitives: &[Primitive],
        color: Rgba8Premul,
        blend: LayerBlend,
        target: &mut Layer,
    ) -> InkResult<PixelRect> {
        let size = target.size();
        let bounds = measure_bounds(primitives.iter().filter(|p| pass.takes(p)), size);
        if bounds.is_empty() {
            return Ok(PixelRect::EMPTY);
        }

        if self.scratch.as_ref().is_none_or(|s| s.size() != size) {
            self.scratch = Some(Layer::new(size)?);
            self.scratch_dirty = PixelRect::EMPTY;
        }
        let Some(scratch) = self.scratch.as_mut() else {
            return Ok(PixelRect::EMPTY);
        };
        scratch.clear_rect(self.scratch_dirty, Rgba8Premul::TRANSPARENT);

        let (w, h) = (size_u16(size.width), size_u16(size.height));
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);

        let [r, g, b, a] = color.to_straight_rgba();
        let stroke_alpha = f32::from(a) / 255.0;
        for prim in primitives.iter().filter(|p| pass.takes(p)) {
            match prim {
                Primitive::Fill { path } => {
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, 255));
                    ctx.fill_path(&bezpath_to_cpu(path));
                }
                Primitive::Dab(dab) => {
                    if dab.radius <= 0.0 || dab.alpha <= 0.0 {
                        continue;
                    }
                    let alpha = (dab.alpha.clamp(0.0, 1.0) * stroke_alpha * 255.0).round() as u8;
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, alpha));
                    let circle = Circle::new(dab.center, dab.radius).to_path(DAB_TOLERANCE);
                    ctx.fill_path(&bezpath_to_cpu(&circle));
                }
            }
        }
        ctx.flush();
        ctx.render_to_pixmap(scratch.pixmap_mut());
        self.ctx = Some(ctx);
        self.scratch_dirty = bounds;

        let opacity = match pass {
            Pass::Fills => stroke_alpha,
            Pass::Dabs => 1.0,
        };
        target.blend_rect_from(scratch, bounds, blend, opacity)?;
        Ok(bounds)
    }
}

fn size_u16(v: u32) -> u16 {
    u16::try_from(v).unwrap_or(u16::MAX)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
