use crate::core::event::{Key, KeyCode, MouseButton};
use crate::core::geom::{Pos, Rect};
use crate::render::{Mod, Painter, Style};
use crate::theme::Theme;
use crate::tree::{ControlEventKind, ControlState, Ctx, Widget};

/// A two-state check box; toggling raises
/// [`ControlEventKind::CheckStateChanged`] with the new state.
#[derive(Debug)]
pub struct CheckBox {
    caption: String,
    checked: bool,
}

impl CheckBox {
    pub fn new(caption: impl Into<String>, checked: bool) -> Self {
        Self {
            caption: caption.into(),
            checked,
        }
    }

    fn toggle(&mut self, state: &mut ControlState, ctx: &mut Ctx<'_>) {
        let checked = !state.is_checked();
        state.set_checked(checked);
        ctx.raise(ControlEventKind::CheckStateChanged(checked));
        ctx.request_repaint();
    }
}

impl Widget for CheckBox {
    fn on_attach(&mut self, state: &mut ControlState) {
        state.set_caption(&self.caption);
        state.set_checked(self.checked);
    }

    fn paint(&mut self, state: &ControlState, theme: &Theme, painter: &mut Painter<'_>) {
        let fg = if state.has_focus() {
            theme.text
        } else {
            theme.text_inactive
        };
        let mut style = Style::new().fg(fg);
        if state.has_focus() {
            style = style.add_mod(Mod::BOLD);
        }
        let mark = if state.is_checked() { 'x' } else { ' ' };
        painter.put(0, 0, '[', style);
        painter.put(1, 0, mark, style);
        painter.put(2, 0, ']', style);
        painter.text(4, 0, state.caption(), style);
        if let Some(offset) = state.hotkey_offset() {
            if let Some(ch) = state.caption().chars().nth(offset) {
                painter.put(4 + offset as i32, 0, ch, style.fg(theme.hotkey));
            }
        }
    }

    fn on_key_event(&mut self, state: &mut ControlState, key: Key, ctx: &mut Ctx<'_>) -> bool {
        if !key.modifiers.is_empty() {
            return false;
        }
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.toggle(state, ctx);
                true
            }
            _ => false,
        }
    }

    fn on_mouse_released(
        &mut self,
        state: &mut ControlState,
        pos: Pos,
        _button: MouseButton,
        ctx: &mut Ctx<'_>,
    ) {
        let area = state.resolved();
        if Rect::new(0, 0, area.w, area.h).contains(pos) {
            self.toggle(state, ctx);
        }
    }

    fn on_hot_key(&mut self, state: &mut ControlState, ctx: &mut Ctx<'_>) {
        self.toggle(state, ctx);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/widgets/checkbox.rs"]
mod tests;
