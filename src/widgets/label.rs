use crate::render::{Painter, Style};
use crate::theme::Theme;
use crate::tree::{ControlState, Widget};

/// Static text. Not a tab stop; a `&` in the caption still declares a hotkey
/// that moves focus past the label (useful for captioning an input next to
/// it via `group_id` conventions, or just for the underline).
#[derive(Debug)]
pub struct Label {
    caption: String,
}

impl Label {
    pub fn new(caption: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
        }
    }
}

impl Widget for Label {
    fn on_attach(&mut self, state: &mut ControlState) {
        state.set_caption(&self.caption);
        state.set_tab_stop(false);
    }

    fn paint(&mut self, state: &ControlState, theme: &Theme, painter: &mut Painter<'_>) {
        painter.text(0, 0, state.caption(), Style::new().fg(theme.text));
        if let Some(offset) = state.hotkey_offset() {
            if let Some(ch) = state.caption().chars().nth(offset) {
                painter.put(offset as i32, 0, ch, Style::new().fg(theme.hotkey));
            }
        }
    }
}
