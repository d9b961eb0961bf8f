//! Engine-wide value types: geometry and the input event model.

pub mod event;
pub mod geom;
