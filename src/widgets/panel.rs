use crate::core::geom::Rect;
use crate::layout::Margins;
use crate::render::{BorderKind, Painter, Style};
use crate::theme::Theme;
use crate::tree::{ControlState, Widget};

/// A bordered grouping container. Children are laid out against the area
/// inside the border.
#[derive(Debug)]
pub struct Panel {
    caption: String,
}

impl Panel {
    pub fn new(caption: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
        }
    }
}

impl Widget for Panel {
    fn on_attach(&mut self, state: &mut ControlState) {
        state.set_caption(&self.caption);
        state.set_tab_stop(false);
        state.set_margins(Margins::new(1, 1, 1, 1));
    }

    fn paint(&mut self, state: &ControlState, theme: &Theme, painter: &mut Painter<'_>) {
        let area = state.resolved();
        let local = Rect::new(0, 0, area.w, area.h);
        let border = Style::new().fg(theme.window_border);
        painter.fill_rect(local, ' ', Style::new().bg(theme.window_bg));
        painter.rect_border(local, border, BorderKind::Single);
        let caption = state.caption();
        if !caption.is_empty() && area.w > 4 {
            painter.text(2, 0, caption, Style::new().fg(theme.window_title));
        }
    }
}
