use crate::core::event::{Key, KeyCode, MouseButton};
use crate::core::geom::{Pos, Rect};
use crate::layout::Margins;
use crate::render::{BorderKind, Mod, Painter, Style};
use crate::theme::Theme;
use crate::tree::{ControlEventKind, ControlState, Ctx, Widget};

/// A titled, draggable window. The border doubles while the window holds
/// focus; dragging the title row moves it; `Esc` or the close box raises
/// [`ControlEventKind::WindowClosed`].
///
/// A window marked [`modal`](Window::modal) also ends the innermost event
/// loop when closed, which is what closes a modal session.
#[derive(Debug)]
pub struct Window {
    caption: String,
    modal: bool,
    drag_from: Option<Pos>,
}

impl Window {
    pub fn new(caption: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            modal: false,
            drag_from: None,
        }
    }

    pub fn modal(mut self) -> Self {
        self.modal = true;
        self
    }

    fn close(&self, ctx: &mut Ctx<'_>) {
        ctx.raise(ControlEventKind::WindowClosed);
        if self.modal {
            ctx.close_loop();
        }
        ctx.request_repaint();
    }

    fn close_box_x(area: Rect) -> i32 {
        area.w - 4
    }

    fn in_close_box(area: Rect, pos: Pos) -> bool {
        pos.y == 0 && pos.x >= Self::close_box_x(area) && pos.x < Self::close_box_x(area) + 3
    }
}

impl Widget for Window {
    fn on_attach(&mut self, state: &mut ControlState) {
        state.set_caption(&self.caption);
        state.set_margins(Margins::new(1, 1, 1, 1));
    }

    fn paint(&mut self, state: &ControlState, theme: &Theme, painter: &mut Painter<'_>) {
        let area = state.resolved();
        let local = Rect::new(0, 0, area.w, area.h);
        let focused = state.has_focus();
        let border_color = if focused {
            theme.window_border_focused
        } else {
            theme.window_border
        };
        let bg = Style::new().bg(theme.window_bg);
        let border = bg.fg(border_color);
        painter.fill_rect(local, ' ', bg);
        let kind = if focused {
            BorderKind::Double
        } else {
            BorderKind::Single
        };
        painter.rect_border(local, border, kind);
        let caption = state.caption();
        if !caption.is_empty() && area.w > 6 {
            let x = ((area.w - caption.chars().count() as i32) / 2).max(1);
            let title = bg.fg(theme.window_title).add_mod(Mod::BOLD);
            painter.put(x - 1, 0, ' ', title);
            painter.text(x, 0, caption, title);
            painter.put(x + caption.chars().count() as i32, 0, ' ', title);
        }
        if area.w > 6 {
            painter.text(Self::close_box_x(area), 0, "[x]", border);
        }
    }

    fn on_key_event(&mut self, _state: &mut ControlState, key: Key, ctx: &mut Ctx<'_>) -> bool {
        if key.code == KeyCode::Esc && key.modifiers.is_empty() {
            self.close(ctx);
            return true;
        }
        false
    }

    fn on_mouse_pressed(
        &mut self,
        state: &mut ControlState,
        pos: Pos,
        button: MouseButton,
        _ctx: &mut Ctx<'_>,
    ) {
        let area = state.resolved();
        if button == MouseButton::Left && pos.y == 0 && !Self::in_close_box(area, pos) {
            self.drag_from = Some(pos);
        }
    }

    fn on_mouse_released(
        &mut self,
        state: &mut ControlState,
        pos: Pos,
        button: MouseButton,
        ctx: &mut Ctx<'_>,
    ) {
        self.drag_from = None;
        if button == MouseButton::Left && Self::in_close_box(state.resolved(), pos) {
            self.close(ctx);
        }
    }

    fn on_mouse_drag(
        &mut self,
        state: &mut ControlState,
        pos: Pos,
        _button: MouseButton,
        _ctx: &mut Ctx<'_>,
    ) -> bool {
        let Some(from) = self.drag_from else {
            return false;
        };
        let delta = Pos::new(pos.x - from.x, pos.y - from.y);
        if delta.x == 0 && delta.y == 0 {
            return false;
        }
        let area = state.resolved();
        state.move_to(area.x + delta.x, area.y + delta.y);
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/widgets/window.rs"]
mod tests;
