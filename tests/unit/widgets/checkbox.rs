use super::*;

use crate::app::{LoopStatus, RepaintStatus};
use crate::layout::LayoutSpec;
use crate::tree::{ControlEvent, ControlId};

struct Harness {
    repaint: RepaintStatus,
    loop_status: LoopStatus,
    pending: Vec<ControlEvent>,
}

impl Harness {
    fn new() -> Self {
        Self {
            repaint: RepaintStatus::clean(),
            loop_status: LoopStatus::Normal,
            pending: Vec::new(),
        }
    }

    fn ctx(&mut self) -> Ctx<'_> {
        Ctx {
            id: ControlId::default(),
            repaint: &mut self.repaint,
            loop_status: &mut self.loop_status,
            pending: &mut self.pending,
        }
    }
}

fn attached(checkbox: &mut CheckBox, w: i32) -> ControlState {
    let mut state = ControlState::new(LayoutSpec::fixed(0, 0, w, 1));
    checkbox.on_attach(&mut state);
    state.resolved = Rect::new(0, 0, w, 1);
    state
}

#[test]
fn attach_applies_the_initial_check_state() {
    let mut unchecked = CheckBox::new("Wrap", false);
    assert!(!attached(&mut unchecked, 12).is_checked());
    let mut checked = CheckBox::new("Wrap", true);
    assert!(attached(&mut checked, 12).is_checked());
}

#[test]
fn space_toggles_and_raises_the_new_state() {
    let mut checkbox = CheckBox::new("Wrap", false);
    let mut state = attached(&mut checkbox, 12);
    let mut h = Harness::new();

    assert!(checkbox.on_key_event(&mut state, Key::simple(KeyCode::Char(' ')), &mut h.ctx()));
    assert!(state.is_checked());
    assert_eq!(h.pending[0].kind, ControlEventKind::CheckStateChanged(true));

    assert!(checkbox.on_key_event(&mut state, Key::simple(KeyCode::Char(' ')), &mut h.ctx()));
    assert!(!state.is_checked());
    assert_eq!(h.pending[1].kind, ControlEventKind::CheckStateChanged(false));
}

#[test]
fn click_inside_toggles_but_outside_does_not() {
    let mut checkbox = CheckBox::new("Wrap", false);
    let mut state = attached(&mut checkbox, 12);
    let mut h = Harness::new();

    checkbox.on_mouse_released(&mut state, Pos::new(1, 0), MouseButton::Left, &mut h.ctx());
    assert!(state.is_checked());

    checkbox.on_mouse_released(&mut state, Pos::new(20, 0), MouseButton::Left, &mut h.ctx());
    assert!(state.is_checked());
    assert_eq!(h.pending.len(), 1);
}

#[test]
fn hot_key_toggles() {
    let mut checkbox = CheckBox::new("&Wrap", false);
    let mut state = attached(&mut checkbox, 12);
    let mut h = Harness::new();
    checkbox.on_hot_key(&mut state, &mut h.ctx());
    assert!(state.is_checked());
    assert_eq!(state.hotkey(), Some('w'));
}

#[test]
fn paint_shows_the_check_mark() {
    let mut checkbox = CheckBox::new("Wrap", true);
    let state = attached(&mut checkbox, 12);
    let mut buf = crate::render::Buffer::new(12, 1);
    let mut painter = Painter::whole(&mut buf);
    checkbox.paint(&state, &Theme::dark(), &mut painter);
    assert_eq!(buf.row_text(0), "[x] Wrap    ");
}
