use crate::foundation::core::{LayerSize, PixelRect, Rgba8Premul};
use crate::foundation::error::{InkError, InkResult};
use crate::foundation::math::{mul_div255_u8, opacity_u16};

/// Premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// How a source layer is combined into a destination region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerBlend {
    /// Porter-Duff source-over.
    SourceOver,
    /// Per-channel maximum. Overlapping outline pieces of one stroke do not darken.
    Max,
    /// Replace destination pixels.
    Copy,
}

/// Source-over of `src` scaled by `opacity` onto `dst`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: u16) -> PremulRgba8 {
    if opacity == 0 || src[3] == 0 {
        return dst;
    }
    let sa = mul_div255_u8(u16::from(src[3]), opacity);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), opacity);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Per-channel maximum of `dst` and `src` scaled by `opacity`.
pub fn max(dst: PremulRgba8, src: PremulRgba8, opacity: u16) -> PremulRgba8 {
    let mut out = dst;
    for i in 0..4 {
        out[i] = dst[i].max(mul_div255_u8(u16::from(src[i]), opacity));
    }
    out
}

/// An offscreen premultiplied RGBA8 raster surface.
pub struct Layer {
    size: LayerSize,
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer").field("size", &self.size).finish()
    }
}

impl Layer {
    /// Allocate a transparent layer.
    pub fn new(size: LayerSize) -> InkResult<Self> {
        let size = size.validate()?;
        let w: u16 = size
            .width
            .try_into()
            .map_err(|_| InkError::surface("layer width exceeds u16"))?;
        let h: u16 = size
            .height
            .try_into()
            .map_err(|_| InkError::surface("layer height exceeds u16"))?;
        Ok(Self {
            size,
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    /// Pixel size.
    pub fn size(&self) -> LayerSize {
        self.size
    }

    /// Raw premultiplied bytes, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut vello_cpu::Pixmap {
        &mut self.pixmap
    }

    /// Pixel at `(x, y)`, `None` outside the layer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<PremulRgba8> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let i = ((y as usize) * (self.size.width as usize) + x as usize) * 4;
        let d = self.data();
        Some([d[i], d[i + 1], d[i + 2], d[i + 3]])
    }

    /// Fill the whole layer with `color`.
    pub fn clear(&mut self, color: Rgba8Premul) {
        let px = color.to_array();
        for chunk in self.pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Fill `rect` (clipped to the layer) with `color`.
    pub fn clear_rect(&mut self, rect: PixelRect, color: Rgba8Premul) {
        let rect = rect.intersect(self.size.full_rect());
        if rect.is_empty() {
            return;
        }
        let px = color.to_array();
        let stride = self.size.width as usize * 4;
        let data = self.pixmap.data_as_u8_slice_mut();
        for y in rect.y0..rect.y1 {
            let row = y as usize * stride;
            let span = &mut data[row + rect.x0 as usize * 4..row + rect.x1 as usize * 4];
            for chunk in span.chunks_exact_mut(4) {
                chunk.copy_from_slice(&px);
            }
        }
    }

    /// Combine `src` into `self` within `rect`.
    ///
    /// Both layers must have the same size. `opacity` scales the source for `SourceOver` and
    /// `Max`; `Copy` ignores it.
    pub fn blend_rect_from(
        &mut self,
        src: &Layer,
        rect: PixelRect,
        mode: LayerBlend,
        opacity: f32,
    ) -> InkResult<()> {
        if src.size != self.size {
            return Err(InkError::surface(format!(
                "blend between mismatched layers: {:?} vs {:?}",
                src.size, self.size
            )));
        }
        let rect = rect.intersect(self.size.full_rect());
        if rect.is_empty() {
            return Ok(());
        }
        let op = opacity_u16(opacity);
        let stride = self.size.width as usize * 4;
        let src_data = src.data();
        let dst_data = self.pixmap.data_as_u8_slice_mut();
        for y in rect.y0..rect.y1 {
            let start = y as usize * stride + rect.x0 as usize * 4;
            let end = y as usize * stride + rect.x1 as usize * 4;
            let (d_row, s_row) = (&mut dst_data[start..end], &src_data[start..end]);
            if mode == LayerBlend::Copy {
                d_row.copy_from_slice(s_row);
                continue;
            }
            for (d, s) in d_row.chunks_exact_mut(4).zip(s_row.chunks_exact(4)) {
                let dst = [d[0], d[1], d[2], d[3]];
                let src = [s[0], s[1], s[2], s[3]];
                let out = match mode {
                    LayerBlend::SourceOver => over(dst, src, op),
                    LayerBlend::Max => max(dst, src, op),
                    LayerBlend::Copy => src,
                };
                d.copy_from_slice(&out);
            }
        }
        Ok(())
    }

    /// Copy `src` into `self` within `rect`.
    pub fn copy_rect_from(&mut self, src: &Layer, rect: PixelRect) -> InkResult<()> {
        self.blend_rect_from(src, rect, LayerBlend::Copy, 1.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/layer.rs"]
mod tests;
