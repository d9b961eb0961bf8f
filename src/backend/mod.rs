//! Terminal backends. The engine talks to a [`Backend`] and never performs
//! raw character I/O itself, so the event loop runs unchanged against a real
//! terminal or the in-memory test backend.

pub mod memory;

#[cfg(feature = "tui")]
pub mod crossterm;
#[cfg(feature = "tui")]
pub mod guard;

pub use memory::MemoryBackend;

#[cfg(feature = "tui")]
pub use crossterm::CrosstermBackend;

use std::io;

use crate::core::event::SystemEvent;
use crate::core::geom::Pos;
use crate::render::Buffer;

pub trait Backend {
    /// Acquire the output device (raw mode, alternate screen, ...).
    fn init(&mut self) -> io::Result<()>;

    /// Release the device; must be safe to call more than once.
    fn shutdown(&mut self) -> io::Result<()>;

    /// Current size in cells.
    fn size(&self) -> (i32, i32);

    /// Block until the next input event. This is the single suspension point
    /// of the whole runtime.
    fn read_event(&mut self) -> io::Result<SystemEvent>;

    /// Present a finished frame.
    fn flush(&mut self, buffer: &Buffer) -> io::Result<()>;

    /// Place (or hide, with `None`) the hardware cursor.
    fn set_cursor(&mut self, pos: Option<Pos>) -> io::Result<()>;
}
