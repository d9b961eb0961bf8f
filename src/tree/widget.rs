use crate::app::{LoopStatus, RepaintStatus};
use crate::commandbar::CommandBar;
use crate::core::event::{Key, MouseButton};
use crate::core::geom::Pos;
use crate::render::Painter;
use crate::theme::Theme;
use crate::tree::{ControlId, ControlState};

/// Semantic event raised by a control and bubbled through its ancestors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlEventKind {
    ButtonClicked,
    CheckStateChanged(bool),
    WindowClosed,
    HotKeyActivated,
    /// A command-bar (or keyboard accelerator) command.
    Command(i32),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlEvent {
    pub source: ControlId,
    pub kind: ControlEventKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelDirection {
    Up,
    Down,
}

/// What a widget may do to the runtime from inside a hook.
///
/// Deliberately narrow: a hook can request repaints, raise events, and stop
/// loops, but it cannot reach back into the control tree while a dispatch is
/// in flight.
pub struct Ctx<'a> {
    pub(crate) id: ControlId,
    pub(crate) repaint: &'a mut RepaintStatus,
    pub(crate) loop_status: &'a mut LoopStatus,
    pub(crate) pending: &'a mut Vec<ControlEvent>,
}

impl Ctx<'_> {
    /// Id of the control the hook is running for.
    pub fn id(&self) -> ControlId {
        self.id
    }

    /// Something visual changed; redraw before the next input wait.
    pub fn request_repaint(&mut self) {
        self.repaint.mark_draw();
    }

    /// Geometry changed; recompute layout and redraw.
    pub fn request_layout(&mut self) {
        self.repaint.mark_all();
    }

    /// Raise a semantic event from this control. Delivery (bubbling through
    /// the ancestor chain) happens after the current hook returns.
    pub fn raise(&mut self, kind: ControlEventKind) {
        self.pending.push(ControlEvent {
            source: self.id,
            kind,
        });
    }

    /// Stop the innermost event loop (ends a modal session).
    pub fn close_loop(&mut self) {
        self.loop_status.stop_current();
    }

    /// Stop the application; propagates through every nested loop.
    pub fn close_app(&mut self) {
        *self.loop_status = LoopStatus::StopApp;
    }
}

/// Behavior contract every concrete control implements.
///
/// Default bodies are the engine's default behavior, so a widget overrides
/// only the hooks it cares about. Each hook receives the control's own state;
/// the tree itself is never reachable from inside a hook.
#[allow(unused_variables)]
pub trait Widget {
    /// Runs once, when the control enters the tree. The place to set the
    /// caption, margins and flags the widget wants.
    fn on_attach(&mut self, state: &mut ControlState) {}

    fn paint(&mut self, state: &ControlState, theme: &Theme, painter: &mut Painter<'_>) {}

    /// Return `true` to consume the key and stop the ancestor walk.
    fn on_key_event(&mut self, state: &mut ControlState, key: Key, ctx: &mut Ctx<'_>) -> bool {
        false
    }

    /// `pos` is in control-local coordinates.
    fn on_mouse_pressed(
        &mut self,
        state: &mut ControlState,
        pos: Pos,
        button: MouseButton,
        ctx: &mut Ctx<'_>,
    ) {
    }

    fn on_mouse_released(
        &mut self,
        state: &mut ControlState,
        pos: Pos,
        button: MouseButton,
        ctx: &mut Ctx<'_>,
    ) {
    }

    /// Return `true` if the drag changed geometry (triggers a layout pass).
    fn on_mouse_drag(
        &mut self,
        state: &mut ControlState,
        pos: Pos,
        button: MouseButton,
        ctx: &mut Ctx<'_>,
    ) -> bool {
        false
    }

    /// Return `true` to request a repaint.
    fn on_mouse_enter(&mut self, state: &mut ControlState, ctx: &mut Ctx<'_>) -> bool {
        false
    }

    fn on_mouse_leave(&mut self, state: &mut ControlState, ctx: &mut Ctx<'_>) -> bool {
        false
    }

    fn on_mouse_over(&mut self, state: &mut ControlState, pos: Pos, ctx: &mut Ctx<'_>) -> bool {
        false
    }

    fn on_mouse_wheel(
        &mut self,
        state: &mut ControlState,
        direction: WheelDirection,
        ctx: &mut Ctx<'_>,
    ) -> bool {
        false
    }

    fn on_focus(&mut self, state: &mut ControlState, ctx: &mut Ctx<'_>) {}

    fn on_lose_focus(&mut self, state: &mut ControlState, ctx: &mut Ctx<'_>) {}

    /// A bubbled event from `source` (a descendant, or the control itself).
    /// Return `true` to consume it.
    fn on_event(
        &mut self,
        state: &mut ControlState,
        source: ControlId,
        kind: &ControlEventKind,
        ctx: &mut Ctx<'_>,
    ) -> bool {
        false
    }

    /// Contribute fields to the command bar. Return `true` to stop the
    /// leaf-to-root walk here.
    fn on_update_command_bar(&self, state: &ControlState, bar: &mut CommandBar) -> bool {
        false
    }

    /// The control's hotkey was pressed (after focus moved to it).
    fn on_hot_key(&mut self, state: &mut ControlState, ctx: &mut Ctx<'_>) {}
}

/// The default behavior object: every hook keeps its default body.
#[derive(Debug, Default)]
pub struct DefaultWidget;

impl Widget for DefaultWidget {}
