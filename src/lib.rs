//! retui is a retained-mode terminal UI runtime: a tree of controls with
//! anchor-based layout, a single-threaded event loop, and an accelerator
//! command bar, drawn through a diffing frame buffer.
//!
//! The shortest useful program:
//!
//! ```no_run
//! use retui::app::{AppFlags, Application, EventResponse};
//! use retui::backend::CrosstermBackend;
//! use retui::layout::LayoutSpec;
//! use retui::tree::ControlEventKind;
//! use retui::widgets::{Button, Window};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let _logging = retui::logging::init();
//!     let mut app = Application::new(CrosstermBackend::new(), AppFlags::COMMAND_BAR)?;
//!     let win = app.add(
//!         app.desktop(),
//!         LayoutSpec::fixed(5, 3, 40, 10),
//!         Box::new(Window::new("Hello")),
//!     )?;
//!     app.add(win, LayoutSpec::fixed(2, 2, 12, 1), Box::new(Button::new("&Quit")))?;
//!     app.set_event_handler(Box::new(|event| match event.kind {
//!         ControlEventKind::ButtonClicked | ControlEventKind::WindowClosed => {
//!             EventResponse::CloseApp
//!         }
//!         _ => EventResponse::Ignored,
//!     }));
//!     app.run()?;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod backend;
pub mod commandbar;
pub mod core;
pub mod layout;
pub mod logging;
pub mod render;
pub mod theme;
pub mod tree;
pub mod widgets;

pub use crate::app::{AppError, AppFlags, Application, EventResponse};
pub use crate::core::event::{Key, KeyCode, KeyModifiers, SystemEvent};
pub use crate::layout::LayoutSpec;
pub use crate::theme::Theme;
pub use crate::tree::{ControlEventKind, ControlId, Widget};
