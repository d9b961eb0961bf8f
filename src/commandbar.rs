//! The command bar: a flat registry of (key, label, command) accelerators
//! painted on the bottom row, independent of the control tree.
//!
//! Fields are keyed by the full chord, so `F2` and `Shift+F2` are distinct
//! entries; only the subset matching the current shift state is visible and
//! mouse-active. Screen spans are cached per paint and invalidated through a
//! monotonically increasing version instead of eagerly on every mutation.

use std::fmt;

use compact_str::CompactString;
use rustc_hash::FxHashMap;

use crate::core::event::{Key, KeyCode, KeyModifiers};
use crate::core::geom::Pos;
use crate::render::{Painter, Style};
use crate::theme::Theme;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandBarError {
    /// Command ids must be positive; zero/negative are reserved for "none".
    InvalidCommand(i32),
    EmptyName,
}

impl fmt::Display for CommandBarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandBarError::InvalidCommand(id) => {
                write!(f, "command id must be positive, got {}", id)
            }
            CommandBarError::EmptyName => f.write_str("command bar field needs a non-empty name"),
        }
    }
}

impl std::error::Error for CommandBarError {}

#[derive(Debug, Clone)]
struct Field {
    key: Key,
    name: CompactString,
    command: i32,
    // Screen span on the bar row, rebuilt lazily; `version` tells whether
    // the cached span is current.
    start_x: i32,
    end_x: i32,
    version: u64,
}

#[derive(Debug)]
pub struct CommandBar {
    fields: FxHashMap<Key, Field>,
    /// Visible order (left to right) for the current shift state.
    visible: Vec<Key>,
    visible_version: u64,
    version: u64,
    shift_state: KeyModifiers,
    width: i32,
    row: i32,
    enabled: bool,
    hovered: Option<Key>,
    pressed: Option<Key>,
}

impl CommandBar {
    pub fn new(desktop_w: i32, desktop_h: i32, enabled: bool) -> Self {
        Self {
            fields: FxHashMap::default(),
            visible: Vec::new(),
            visible_version: 0,
            version: 1,
            shift_state: KeyModifiers::NONE,
            width: desktop_w,
            row: desktop_h - 1,
            enabled,
            hovered: None,
            pressed: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn row(&self) -> i32 {
        self.row
    }

    pub fn set_desktop_size(&mut self, w: i32, h: i32) {
        self.width = w;
        self.row = h - 1;
        self.version += 1;
    }

    pub fn clear(&mut self) {
        self.fields.clear();
        self.hovered = None;
        self.pressed = None;
        self.version += 1;
    }

    /// Insert or replace the field for `key`.
    pub fn set(&mut self, key: Key, name: &str, command: i32) -> Result<(), CommandBarError> {
        if command <= 0 {
            return Err(CommandBarError::InvalidCommand(command));
        }
        if name.is_empty() {
            return Err(CommandBarError::EmptyName);
        }
        self.fields.insert(
            key,
            Field {
                key,
                name: CompactString::from(name),
                command,
                start_x: 0,
                end_x: 0,
                version: 0,
            },
        );
        self.version += 1;
        Ok(())
    }

    /// Switch the displayed shift-state subset. Returns whether the visible
    /// set changed (the caller repaints if so).
    pub fn set_shift_state(&mut self, mods: KeyModifiers) -> bool {
        if mods == self.shift_state {
            return false;
        }
        let before: Vec<Key> = self.visible_keys(self.shift_state);
        let after: Vec<Key> = self.visible_keys(mods);
        self.shift_state = mods;
        self.version += 1;
        self.hovered = None;
        self.pressed = None;
        before != after
    }

    pub fn shift_state(&self) -> KeyModifiers {
        self.shift_state
    }

    /// Command registered for this exact chord, if any.
    pub fn command_for_key(&self, key: Key) -> Option<i32> {
        self.fields.get(&key).map(|f| f.command)
    }

    fn visible_keys(&self, mods: KeyModifiers) -> Vec<Key> {
        let mut keys: Vec<Key> = self
            .fields
            .values()
            .filter(|f| f.key.modifiers == mods)
            .map(|f| f.key)
            .collect();
        keys.sort_by_key(|k| key_order(k.code));
        keys
    }

    /// Rebuild the visible-order cache and screen spans if stale.
    fn refresh_positions(&mut self) {
        if self.visible_version == self.version {
            return;
        }
        self.visible = self.visible_keys(self.shift_state);
        let mut x = 0;
        for key in &self.visible {
            let field = self.fields.get_mut(key).expect("visible key present");
            let label = key_label(*key);
            let span = 1 + label.chars().count() as i32 + 1 + field.name.chars().count() as i32 + 1;
            field.start_x = x;
            field.end_x = x + span;
            field.version = self.version;
            x += span;
        }
        self.visible_version = self.version;
    }

    fn field_at(&mut self, pos: Pos) -> Option<Key> {
        if !self.enabled || pos.y != self.row {
            return None;
        }
        self.refresh_positions();
        self.visible
            .iter()
            .copied()
            .find(|key| {
                self.fields
                    .get(key)
                    .is_some_and(|f| pos.x >= f.start_x && pos.x < f.end_x)
            })
    }

    /// Hover tracking. Returns `(claimed, repaint)`: `claimed` when the
    /// pointer is on the bar row, `repaint` when the highlight changed.
    pub fn on_mouse_over(&mut self, pos: Pos) -> (bool, bool) {
        if !self.enabled || pos.y != self.row {
            let repaint = self.hovered.take().is_some();
            return (false, repaint);
        }
        let hit = self.field_at(pos);
        let repaint = hit != self.hovered;
        self.hovered = hit;
        (true, repaint)
    }

    /// Returns whether the bar claims the press (locks the mouse to the
    /// accelerator object).
    pub fn on_mouse_down(&mut self, pos: Pos) -> bool {
        match self.field_at(pos) {
            Some(key) => {
                self.pressed = Some(key);
                self.hovered = Some(key);
                true
            }
            None => false,
        }
    }

    /// Release while locked to the bar. Returns the command to raise, if the
    /// press ended on a field.
    pub fn on_mouse_up(&mut self) -> Option<i32> {
        let pressed = self.pressed.take()?;
        self.fields.get(&pressed).map(|f| f.command)
    }

    /// Paint the bar over its own bottom row. The caller resets the render
    /// clip first; the bar is never clipped by controls.
    pub fn paint(&mut self, painter: &mut Painter<'_>, theme: &Theme) {
        if !self.enabled {
            return;
        }
        self.refresh_positions();
        let base = Style::new().bg(theme.bar_bg);
        painter.hline(0, self.row, self.width, ' ', base);
        for key in self.visible.clone() {
            let Some(field) = self.fields.get(&key) else {
                continue;
            };
            let bg = if self.pressed == Some(key) {
                theme.bar_pressed_bg
            } else if self.hovered == Some(key) {
                theme.bar_hover_bg
            } else {
                theme.bar_bg
            };
            let key_style = Style::new().fg(theme.bar_key_fg).bg(bg);
            let name_style = Style::new().fg(theme.bar_name_fg).bg(bg);
            let label = key_label(key);
            let mut x = field.start_x;
            painter.put(x, self.row, ' ', key_style);
            x += 1;
            painter.text(x, self.row, &label, key_style);
            x += label.chars().count() as i32;
            painter.put(x, self.row, ' ', name_style);
            x += 1;
            painter.text(x, self.row, &field.name, name_style);
            x += field.name.chars().count() as i32;
            painter.put(x, self.row, ' ', name_style);
        }
    }
}

/// Stable ordering for bar display: function keys first, then everything
/// else by name.
fn key_order(code: KeyCode) -> (u8, u8, char) {
    match code {
        KeyCode::F(n) => (0, n, ' '),
        KeyCode::Char(ch) => (1, 0, ch),
        _ => (2, 0, ' '),
    }
}

pub(crate) fn key_label(key: Key) -> String {
    let mut out = String::new();
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        out.push_str("Ctrl+");
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        out.push_str("Alt+");
    }
    if key.modifiers.contains(KeyModifiers::SHIFT) {
        out.push_str("Shift+");
    }
    match key.code {
        KeyCode::F(n) => {
            out.push('F');
            out.push_str(&n.to_string());
        }
        KeyCode::Char(ch) => out.push(ch.to_ascii_uppercase()),
        KeyCode::Enter => out.push_str("Enter"),
        KeyCode::Esc => out.push_str("Esc"),
        KeyCode::Tab => out.push_str("Tab"),
        KeyCode::BackTab => out.push_str("Shift+Tab"),
        KeyCode::Backspace => out.push_str("Backspace"),
        KeyCode::Delete => out.push_str("Del"),
        KeyCode::Insert => out.push_str("Ins"),
        KeyCode::Up => out.push_str("Up"),
        KeyCode::Down => out.push_str("Down"),
        KeyCode::Left => out.push_str("Left"),
        KeyCode::Right => out.push_str("Right"),
        KeyCode::Home => out.push_str("Home"),
        KeyCode::End => out.push_str("End"),
        KeyCode::PageUp => out.push_str("PgUp"),
        KeyCode::PageDown => out.push_str("PgDn"),
        KeyCode::Unknown => out.push('?'),
    }
    out
}

#[cfg(test)]
#[path = "../tests/unit/commandbar.rs"]
mod tests;
