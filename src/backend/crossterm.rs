//! Crossterm-backed terminal: raw mode + alternate screen + mouse capture,
//! buffer-diff flushing, and translation of crossterm events into the
//! engine's input model.

use std::io::{self, Write};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use crossterm::style::{
    Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::{cursor, queue};

use crate::backend::guard::{TerminalGuard, TerminationSignal};
use crate::backend::Backend;
use crate::core::event::{
    Key, KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind, SystemEvent,
};
use crate::core::geom::Pos;
use crate::render::{Buffer, Color, Mod, Style};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct CrosstermBackend {
    guard: Option<TerminalGuard>,
    signals: Option<Receiver<TerminationSignal>>,
    prev: Option<Buffer>,
    size: (i32, i32),
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self {
            guard: None,
            signals: None,
            prev: None,
            size: (0, 0),
        }
    }
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for CrosstermBackend {
    fn init(&mut self) -> io::Result<()> {
        if unsafe { libc::isatty(libc::STDOUT_FILENO) } == 0 {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "stdout is not a terminal",
            ));
        }
        let guard = TerminalGuard::new()?;
        #[cfg(unix)]
        {
            use crate::backend::guard::install_termination_signals;

            let (tx, rx) = std::sync::mpsc::channel();
            // Watcher thread lives for the process; the handle is not joined.
            let _watcher = install_termination_signals(guard.restorer(), tx)?;
            self.signals = Some(rx);
        }
        let (w, h) = crossterm::terminal::size()?;
        self.size = (w as i32, h as i32);
        self.guard = Some(guard);
        queue!(io::stdout(), cursor::Hide)?;
        io::stdout().flush()?;
        Ok(())
    }

    fn shutdown(&mut self) -> io::Result<()> {
        match self.guard.take() {
            Some(guard) => guard.restore(),
            None => Ok(()),
        }
    }

    fn size(&self) -> (i32, i32) {
        self.size
    }

    fn read_event(&mut self) -> io::Result<SystemEvent> {
        loop {
            if let Some(rx) = &self.signals {
                match rx.try_recv() {
                    Ok(_) => return Ok(SystemEvent::Close),
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => self.signals = None,
                }
            }
            if !crossterm::event::poll(POLL_INTERVAL)? {
                continue;
            }
            if let Some(event) = into_system_event(crossterm::event::read()?) {
                if let SystemEvent::Resize(w, h) = event {
                    self.size = (w, h);
                }
                return Ok(event);
            }
        }
    }

    fn flush(&mut self, buffer: &Buffer) -> io::Result<()> {
        let mut out = io::stdout();
        let diff = match &self.prev {
            Some(prev) => buffer.diff(prev),
            None => buffer.diff(&Buffer::new(0, 0)),
        };
        let mut last_style: Option<Style> = None;
        let mut last_pos: Option<(i32, i32)> = None;
        for (x, y, cell) in diff {
            // MoveTo only when not continuing the previous run.
            if last_pos != Some((x - 1, y)) {
                queue!(out, cursor::MoveTo(x as u16, y as u16))?;
            }
            if last_style != Some(cell.style) {
                apply_style(&mut out, cell.style)?;
                last_style = Some(cell.style);
            }
            queue!(out, Print(cell.symbol))?;
            last_pos = Some((x, y));
        }
        queue!(out, ResetColor)?;
        out.flush()?;
        self.prev = Some(buffer.clone());
        Ok(())
    }

    fn set_cursor(&mut self, pos: Option<Pos>) -> io::Result<()> {
        let mut out = io::stdout();
        match pos {
            Some(p) => queue!(out, cursor::MoveTo(p.x as u16, p.y as u16), cursor::Show)?,
            None => queue!(out, cursor::Hide)?,
        }
        out.flush()
    }
}

fn apply_style(out: &mut impl Write, style: Style) -> io::Result<()> {
    queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
    if let Some(fg) = style.fg {
        queue!(out, SetForegroundColor(into_crossterm_color(fg)))?;
    }
    if let Some(bg) = style.bg {
        queue!(out, SetBackgroundColor(into_crossterm_color(bg)))?;
    }
    if style.mods.contains(Mod::BOLD) {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    if style.mods.contains(Mod::DIM) {
        queue!(out, SetAttribute(Attribute::Dim))?;
    }
    if style.mods.contains(Mod::UNDERLINE) {
        queue!(out, SetAttribute(Attribute::Underlined))?;
    }
    if style.mods.contains(Mod::REVERSE) {
        queue!(out, SetAttribute(Attribute::Reverse))?;
    }
    if style.mods.contains(Mod::ITALIC) {
        queue!(out, SetAttribute(Attribute::Italic))?;
    }
    Ok(())
}

fn into_crossterm_color(color: Color) -> crossterm::style::Color {
    match color {
        Color::Reset => crossterm::style::Color::Reset,
        Color::Rgb(r, g, b) => crossterm::style::Color::Rgb { r, g, b },
        Color::Indexed(i) => crossterm::style::Color::AnsiValue(i),
    }
}

/// Translate a crossterm event; key releases/repeats are dropped so controls
/// only ever see presses.
pub fn into_system_event(event: crossterm::event::Event) -> Option<SystemEvent> {
    match event {
        crossterm::event::Event::Key(key) => {
            if key.kind == crossterm::event::KeyEventKind::Release {
                return None;
            }
            Some(SystemEvent::Key(into_key(key)))
        }
        crossterm::event::Event::Mouse(mouse) => Some(SystemEvent::Mouse(into_mouse(mouse))),
        crossterm::event::Event::Resize(w, h) => Some(SystemEvent::Resize(w as i32, h as i32)),
        crossterm::event::Event::FocusGained => Some(SystemEvent::FocusGained),
        crossterm::event::Event::FocusLost => Some(SystemEvent::FocusLost),
        crossterm::event::Event::Paste(s) => Some(SystemEvent::Paste(s)),
    }
}

fn into_key(event: crossterm::event::KeyEvent) -> Key {
    let mut modifiers = into_modifiers(event.modifiers);
    let code = into_key_code(event.code, &mut modifiers);
    Key::new(code, modifiers)
}

fn into_modifiers(mods: crossterm::event::KeyModifiers) -> KeyModifiers {
    let mut out = KeyModifiers::NONE;
    if mods.contains(crossterm::event::KeyModifiers::SHIFT) {
        out |= KeyModifiers::SHIFT;
    }
    if mods.contains(crossterm::event::KeyModifiers::CONTROL) {
        out |= KeyModifiers::CONTROL;
    }
    if mods.contains(crossterm::event::KeyModifiers::ALT) {
        out |= KeyModifiers::ALT;
    }
    out
}

fn into_key_code(code: crossterm::event::KeyCode, modifiers: &mut KeyModifiers) -> KeyCode {
    match code {
        crossterm::event::KeyCode::Char(ch) => KeyCode::Char(ch),
        crossterm::event::KeyCode::Enter => KeyCode::Enter,
        crossterm::event::KeyCode::Esc => KeyCode::Esc,
        crossterm::event::KeyCode::Tab => KeyCode::Tab,
        crossterm::event::KeyCode::BackTab => KeyCode::BackTab,
        crossterm::event::KeyCode::Backspace => KeyCode::Backspace,
        crossterm::event::KeyCode::Delete => KeyCode::Delete,
        crossterm::event::KeyCode::Insert => KeyCode::Insert,
        crossterm::event::KeyCode::Up => KeyCode::Up,
        crossterm::event::KeyCode::Down => KeyCode::Down,
        crossterm::event::KeyCode::Left => KeyCode::Left,
        crossterm::event::KeyCode::Right => KeyCode::Right,
        crossterm::event::KeyCode::Home => KeyCode::Home,
        crossterm::event::KeyCode::End => KeyCode::End,
        crossterm::event::KeyCode::PageUp => KeyCode::PageUp,
        crossterm::event::KeyCode::PageDown => KeyCode::PageDown,
        crossterm::event::KeyCode::F(n) => KeyCode::F(n),
        crossterm::event::KeyCode::Null => {
            *modifiers |= KeyModifiers::CONTROL;
            KeyCode::Char(' ')
        }
        _ => KeyCode::Unknown,
    }
}

fn into_mouse(event: crossterm::event::MouseEvent) -> MouseEvent {
    MouseEvent {
        kind: into_mouse_kind(event.kind),
        column: event.column as i32,
        row: event.row as i32,
        modifiers: into_modifiers(event.modifiers),
    }
}

fn into_button(button: crossterm::event::MouseButton) -> MouseButton {
    match button {
        crossterm::event::MouseButton::Left => MouseButton::Left,
        crossterm::event::MouseButton::Right => MouseButton::Right,
        crossterm::event::MouseButton::Middle => MouseButton::Middle,
    }
}

fn into_mouse_kind(kind: crossterm::event::MouseEventKind) -> MouseEventKind {
    match kind {
        crossterm::event::MouseEventKind::Down(button) => MouseEventKind::Down(into_button(button)),
        crossterm::event::MouseEventKind::Up(button) => MouseEventKind::Up(into_button(button)),
        crossterm::event::MouseEventKind::Drag(button) => MouseEventKind::Drag(into_button(button)),
        crossterm::event::MouseEventKind::Moved => MouseEventKind::Moved,
        crossterm::event::MouseEventKind::ScrollUp => MouseEventKind::ScrollUp,
        crossterm::event::MouseEventKind::ScrollDown
        | crossterm::event::MouseEventKind::ScrollLeft
        | crossterm::event::MouseEventKind::ScrollRight => MouseEventKind::ScrollDown,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/crossterm.rs"]
mod tests;
