use crate::foundation::core::PixelRect;

/// Computes the region to recomposite each frame.
///
/// Remembers the previous frame's prediction bounds so a retracted prediction is always
/// repainted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirtyRectTracker {
    previous_prediction: PixelRect,
}

impl DirtyRectTracker {
    /// Tracker with no remembered prediction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the stored prediction bounds. Called once per committed stroke.
    pub fn reset(&mut self) {
        self.previous_prediction = PixelRect::EMPTY;
    }

    /// Union of `addition`, `prediction` and the previous frame's prediction; stores
    /// `prediction` for the next call.
    pub fn get_update_rect(&mut self, addition: PixelRect, prediction: PixelRect) -> PixelRect {
        let rect = addition
            .union(prediction)
            .union(self.previous_prediction);
        self.previous_prediction = prediction;
        rect
    }

    /// Prediction bounds remembered from the last call.
    pub fn previous_prediction(&self) -> PixelRect {
        self.previous_prediction
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/dirty.rs"]
mod tests;
