//! Pointer input: samples, device arbitration and capture registration.

pub(crate) mod arbiter;
pub(crate) mod capture;
pub(crate) mod sample;
