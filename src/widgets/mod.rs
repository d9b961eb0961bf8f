//! Built-in controls. Each one is a [`crate::tree::Widget`] implementation;
//! nothing here is special-cased by the runtime.

pub mod button;
pub mod checkbox;
pub mod label;
pub mod panel;
pub mod window;

pub use button::Button;
pub use checkbox::CheckBox;
pub use label::Label;
pub use panel::Panel;
pub use window::Window;
