use crate::input::sample::DeviceToken;

/// Owns "the one active input device".
///
/// A press is accepted only while no device owns the canvas; moves and releases are accepted only
/// from the owner. A second device can never interrupt a stroke in progress.
#[derive(Debug, Default)]
pub struct PointerArbiter {
    owner: Option<DeviceToken>,
}

impl PointerArbiter {
    /// Arbiter with no owner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim ownership for `device`. Returns `false` while another stroke is active.
    pub fn on_pressed(&mut self, device: DeviceToken) -> bool {
        if self.owner.is_some() {
            return false;
        }
        self.owner = Some(device);
        true
    }

    /// Accept movement only from the current owner.
    pub fn on_moved(&self, device: DeviceToken) -> bool {
        self.owner == Some(device)
    }

    /// Release ownership if `device` is the owner.
    pub fn on_released(&mut self, device: DeviceToken) -> bool {
        if self.owner != Some(device) {
            return false;
        }
        self.owner = None;
        true
    }

    /// The device currently holding the canvas.
    pub fn owner(&self) -> Option<DeviceToken> {
        self.owner
    }

    /// Drop ownership regardless of device. Used by the stroke-abort path.
    pub fn force_release(&mut self) -> Option<DeviceToken> {
        self.owner.take()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/input/arbiter.rs"]
mod tests;
