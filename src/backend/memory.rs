use std::collections::VecDeque;
use std::io;

use crate::backend::Backend;
use crate::core::event::SystemEvent;
use crate::core::geom::Pos;
use crate::render::Buffer;

/// Headless backend driven by a scripted event queue; captures every flushed
/// frame. Used by the event-loop tests and for embedding the runtime without
/// a terminal.
pub struct MemoryBackend {
    w: i32,
    h: i32,
    events: VecDeque<SystemEvent>,
    frames: Vec<Buffer>,
    cursor: Option<Pos>,
    initialized: bool,
}

impl MemoryBackend {
    pub fn new(w: i32, h: i32) -> Self {
        Self {
            w,
            h,
            events: VecDeque::new(),
            frames: Vec::new(),
            cursor: None,
            initialized: false,
        }
    }

    pub fn push_event(&mut self, event: SystemEvent) {
        self.events.push_back(event);
    }

    pub fn push_events(&mut self, events: impl IntoIterator<Item = SystemEvent>) {
        self.events.extend(events);
    }

    pub fn frames(&self) -> &[Buffer] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&Buffer> {
        self.frames.last()
    }

    pub fn cursor(&self) -> Option<Pos> {
        self.cursor
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl Backend for MemoryBackend {
    fn init(&mut self) -> io::Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn shutdown(&mut self) -> io::Result<()> {
        self.initialized = false;
        Ok(())
    }

    fn size(&self) -> (i32, i32) {
        (self.w, self.h)
    }

    /// Pops the next scripted event; an exhausted script reads as an
    /// application close so test loops always terminate. A scripted resize
    /// updates the reported size, like a real terminal would.
    fn read_event(&mut self) -> io::Result<SystemEvent> {
        let event = self.events.pop_front().unwrap_or(SystemEvent::Close);
        if let SystemEvent::Resize(w, h) = event {
            self.w = w;
            self.h = h;
        }
        Ok(event)
    }

    fn flush(&mut self, buffer: &Buffer) -> io::Result<()> {
        self.frames.push(buffer.clone());
        Ok(())
    }

    fn set_cursor(&mut self, pos: Option<Pos>) -> io::Result<()> {
        self.cursor = pos;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/memory.rs"]
mod tests;
