use crate::core::geom::Rect;
use crate::render::Painter;
use crate::theme::Theme;
use crate::tree::{ControlState, Widget};

/// The implicit root control behind every window: fills its area with the
/// theme's background pattern and consumes nothing.
#[derive(Debug, Default)]
pub struct Desktop;

impl Widget for Desktop {
    fn paint(&mut self, state: &ControlState, theme: &Theme, painter: &mut Painter<'_>) {
        let area = state.resolved();
        painter.fill_rect(
            Rect::new(0, 0, area.w, area.h),
            theme.desktop_fill,
            theme.desktop,
        );
    }
}
