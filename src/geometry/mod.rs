//! Stroke geometry: brush configuration, primitives, the collaborator contract and the
//! incremental pipeline adapter.

pub(crate) mod brush;
pub(crate) mod collaborator;
pub(crate) mod pipeline;
pub(crate) mod primitive;
pub(crate) mod stamp;
