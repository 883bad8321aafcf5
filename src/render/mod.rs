//! Offscreen layers, rasterization, dirty-rect tracking, layer compositing and frame
//! presentation.

pub(crate) mod compositor;
pub(crate) mod dirty;
pub(crate) mod frame;
pub(crate) mod layer;
pub(crate) mod raster;
