use crate::core::event::{Key, KeyCode, MouseButton};
use crate::core::geom::{Pos, Rect};
use crate::render::{Mod, Painter, Style};
use crate::theme::Theme;
use crate::tree::{ControlEventKind, ControlState, Ctx, Widget};

/// A push button. Clicking it (mouse, Enter, Space, or its hotkey) raises
/// [`ControlEventKind::ButtonClicked`] toward the ancestors.
#[derive(Debug)]
pub struct Button {
    caption: String,
    pressed: bool,
}

impl Button {
    pub fn new(caption: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            pressed: false,
        }
    }

    fn click(&mut self, ctx: &mut Ctx<'_>) {
        ctx.raise(ControlEventKind::ButtonClicked);
        ctx.request_repaint();
    }
}

impl Widget for Button {
    fn on_attach(&mut self, state: &mut ControlState) {
        state.set_caption(&self.caption);
    }

    fn paint(&mut self, state: &ControlState, theme: &Theme, painter: &mut Painter<'_>) {
        let area = state.resolved();
        let bg = if state.has_focus() {
            theme.button_focused_bg
        } else {
            theme.button_bg
        };
        let mut style = Style::new().fg(theme.button_fg).bg(bg);
        if self.pressed {
            style = style.add_mod(Mod::REVERSE);
        } else if state.is_mouse_over() {
            style = style.add_mod(Mod::BOLD);
        }
        painter.fill_rect(Rect::new(0, 0, area.w, area.h), ' ', style);
        let caption = state.caption();
        let x = ((area.w - caption.chars().count() as i32) / 2).max(0);
        let y = area.h / 2;
        painter.text(x, y, caption, style);
        if let Some(offset) = state.hotkey_offset() {
            if let Some(ch) = caption.chars().nth(offset) {
                painter.put(
                    x + offset as i32,
                    y,
                    ch,
                    style.fg(theme.hotkey).add_mod(Mod::UNDERLINE),
                );
            }
        }
    }

    fn on_key_event(&mut self, _state: &mut ControlState, key: Key, ctx: &mut Ctx<'_>) -> bool {
        if !key.modifiers.is_empty() {
            return false;
        }
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.click(ctx);
                true
            }
            _ => false,
        }
    }

    fn on_mouse_pressed(
        &mut self,
        _state: &mut ControlState,
        _pos: Pos,
        _button: MouseButton,
        ctx: &mut Ctx<'_>,
    ) {
        self.pressed = true;
        ctx.request_repaint();
    }

    fn on_mouse_released(
        &mut self,
        state: &mut ControlState,
        pos: Pos,
        _button: MouseButton,
        ctx: &mut Ctx<'_>,
    ) {
        let was_pressed = self.pressed;
        self.pressed = false;
        // Releasing outside the button cancels the click.
        let area = state.resolved();
        if was_pressed && Rect::new(0, 0, area.w, area.h).contains(pos) {
            self.click(ctx);
        } else {
            ctx.request_repaint();
        }
    }

    fn on_mouse_enter(&mut self, _state: &mut ControlState, _ctx: &mut Ctx<'_>) -> bool {
        true
    }

    fn on_mouse_leave(&mut self, _state: &mut ControlState, _ctx: &mut Ctx<'_>) -> bool {
        true
    }

    fn on_hot_key(&mut self, _state: &mut ControlState, ctx: &mut Ctx<'_>) {
        self.click(ctx);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/widgets/button.rs"]
mod tests;
