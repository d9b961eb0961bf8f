//! Painting primitives: styles, the off-screen cell buffer, and the clipped
//! painter widgets draw through.

pub mod buffer;
pub mod painter;
pub mod style;

pub use buffer::{Buffer, Cell};
pub use painter::{BorderKind, Painter};
pub use style::{Color, Mod, Style};
