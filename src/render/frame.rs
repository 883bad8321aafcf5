use crate::canvas::InkCanvas;
use crate::foundation::core::{LayerSize, PixelRect};
use crate::foundation::error::InkResult;
use crate::geometry::collaborator::BrushGeometry;
use crate::render::layer::Layer;

/// The host's backing surface for this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SurfaceHandoff {
    /// Changes whenever the host hands over a new surface.
    pub generation: u64,
    /// Surface size in pixels.
    pub size: LayerSize,
}

/// What one tick did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct FrameReport {
    /// Scene region copied to the presentable surface.
    pub dirty: PixelRect,
    /// Pixels were presented.
    pub presented: bool,
    /// The presentable surface was (re)created this tick.
    pub recreated_surface: bool,
}

#[derive(Debug)]
struct Presentable {
    generation: u64,
    layer: Layer,
}

/// Presentation-timer entry point. Runs independently of the input callbacks.
#[derive(Debug, Default)]
pub struct FrameDriver {
    surface: Option<Presentable>,
}

impl FrameDriver {
    /// Driver with no presentable surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one frame: adopt a new surface if handed over, run the canvas frame flow, and copy
    /// the changed scene region into the presentable surface.
    ///
    /// A missing or zero-sized surface drops the presentable layer; the next handoff starts
    /// from scratch.
    #[tracing::instrument(level = "trace", skip(self, canvas))]
    pub fn tick<G: BrushGeometry>(
        &mut self,
        canvas: &InkCanvas<G>,
        handoff: Option<SurfaceHandoff>,
    ) -> InkResult<FrameReport> {
        let Some(handoff) = handoff.filter(|h| h.size.is_drawable()) else {
            if self.surface.take().is_some() {
                tracing::warn!("backing surface lost; will recreate on next handoff");
            }
            let update = canvas.render_frame()?;
            return Ok(FrameReport {
                dirty: update.dirty,
                presented: false,
                recreated_surface: false,
            });
        };

        let recreated = match &self.surface {
            Some(s) => s.generation != handoff.generation || s.layer.size() != handoff.size,
            None => true,
        };
        if recreated {
            self.surface = Some(Presentable {
                generation: handoff.generation,
                layer: Layer::new(handoff.size)?,
            });
            if canvas.size() != Some(handoff.size) {
                canvas.resize(handoff.size)?;
            }
        }

        let update = canvas.render_frame()?;
        let dirty = if recreated {
            handoff.size.full_rect()
        } else {
            update.dirty
        };

        let Some(surface) = self.surface.as_mut() else {
            return Ok(FrameReport::default());
        };
        let presented = !dirty.is_empty() && canvas.present_into(&mut surface.layer, dirty)?;
        Ok(FrameReport {
            dirty,
            presented,
            recreated_surface: recreated,
        })
    }

    /// The presentable surface, if one has been handed over.
    pub fn presented(&self) -> Option<&Layer> {
        self.surface.as_ref().map(|s| &s.layer)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
