//! The single-threaded runtime: owns the backend, the control tree, the
//! command bar and the frame buffer, and runs the event loop.
//!
//! One loop iteration is: resolve layout if geometry is dirty, repaint if the
//! frame is dirty, flush, then block on the backend for the next event and
//! dispatch it. Nothing runs between events; every widget hook executes on
//! this thread before the loop parks again.

pub mod desktop;

pub use desktop::Desktop;

use std::fmt;
use std::io;
use std::ops::{BitOr, BitOrAssign};

use crate::backend::Backend;
use crate::commandbar::CommandBar;
use crate::core::event::{Key, KeyCode, KeyModifiers, MouseButton, MouseEventKind, SystemEvent};
use crate::core::geom::{Pos, Rect};
use crate::layout::LayoutSpec;
use crate::render::{Buffer, Painter, Style};
use crate::theme::Theme;
use crate::tree::{
    ControlEvent, ControlEventKind, ControlId, ControlState, ControlTree, Ctx, TreeError,
    WheelDirection, Widget,
};

/// Nested modal sessions are capped; a push past this depth is refused.
pub const MAX_MODAL_STACK: usize = 16;

/// Dirty state accumulated between frames. Two independent bits: geometry
/// (layout must be re-resolved) and pixels (the frame must be repainted).
/// Marking geometry dirty always dirties the frame too.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RepaintStatus(u8);

impl RepaintStatus {
    const DRAW: u8 = 1 << 0;
    const LAYOUT: u8 = 1 << 1;

    pub const fn clean() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self(Self::DRAW | Self::LAYOUT)
    }

    pub fn mark_draw(&mut self) {
        self.0 |= Self::DRAW;
    }

    pub fn mark_all(&mut self) {
        self.0 |= Self::DRAW | Self::LAYOUT;
    }

    pub fn needs_draw(self) -> bool {
        self.0 & Self::DRAW != 0
    }

    pub fn needs_layout(self) -> bool {
        self.0 & Self::LAYOUT != 0
    }

    fn clear_draw(&mut self) {
        self.0 &= !Self::DRAW;
    }

    fn clear_layout(&mut self) {
        self.0 &= !Self::LAYOUT;
    }
}

/// What the innermost event loop should do after the current dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopStatus {
    #[default]
    Normal,
    /// End the innermost loop only (closes one modal session).
    StopCurrent,
    /// End every loop; the application is shutting down.
    StopApp,
}

impl LoopStatus {
    /// Request the innermost loop to stop; never downgrades a pending
    /// application stop.
    pub fn stop_current(&mut self) {
        if *self == LoopStatus::Normal {
            *self = LoopStatus::StopCurrent;
        }
    }
}

/// Application-level feature flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AppFlags(u8);

impl AppFlags {
    pub const NONE: Self = Self(0);
    /// Reserve the bottom screen row for the accelerator command bar.
    pub const COMMAND_BAR: Self = Self(1 << 0);

    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl BitOr for AppFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for AppFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

#[derive(Debug)]
pub enum AppError {
    /// The modal stack is at capacity; the session was not opened.
    ModalStackFull,
    Backend(io::Error),
    Tree(TreeError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ModalStackFull => {
                write!(f, "modal stack is full ({} sessions)", MAX_MODAL_STACK)
            }
            AppError::Backend(err) => write!(f, "terminal backend error: {}", err),
            AppError::Tree(err) => write!(f, "control tree error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Backend(err) => Some(err),
            AppError::Tree(err) => Some(err),
            AppError::ModalStackFull => None,
        }
    }
}

impl From<TreeError> for AppError {
    fn from(err: TreeError) -> Self {
        AppError::Tree(err)
    }
}

/// What the application-level event handler wants done with an event that no
/// control consumed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EventResponse {
    #[default]
    Ignored,
    Handled,
    /// Open a nested modal session for this control.
    ShowModal(ControlId),
    CloseApp,
}

pub type EventHandler = Box<dyn FnMut(&ControlEvent) -> EventResponse>;

/// While a button is held, every mouse event is routed to the owner of the
/// press, regardless of where the pointer is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum MouseLock {
    #[default]
    None,
    CommandBar,
    Control(ControlId),
}

pub struct Application<B: Backend> {
    backend: B,
    tree: ControlTree,
    desktop: ControlId,
    commandbar: CommandBar,
    theme: Theme,
    buffer: Buffer,
    repaint: RepaintStatus,
    loop_status: LoopStatus,
    modal_stack: Vec<ControlId>,
    mouse_lock: MouseLock,
    hover: Option<ControlId>,
    pending: Vec<ControlEvent>,
    handler: Option<EventHandler>,
}

impl<B: Backend> Application<B> {
    pub fn new(mut backend: B, flags: AppFlags) -> Result<Self, AppError> {
        backend.init().map_err(AppError::Backend)?;
        let (w, h) = backend.size();
        let mut tree = ControlTree::new();
        let desktop = tree.insert_root(LayoutSpec::fill(), Box::new(Desktop))?;
        let commandbar = CommandBar::new(w, h, flags.contains(AppFlags::COMMAND_BAR));
        tracing::info!(width = w, height = h, "application initialized");
        Ok(Self {
            backend,
            tree,
            desktop,
            commandbar,
            theme: Theme::dark(),
            buffer: Buffer::new(w, h),
            repaint: RepaintStatus::all(),
            loop_status: LoopStatus::Normal,
            modal_stack: Vec::new(),
            mouse_lock: MouseLock::None,
            hover: None,
            pending: Vec::new(),
            handler: None,
        })
    }

    pub fn desktop(&self) -> ControlId {
        self.desktop
    }

    pub fn tree(&self) -> &ControlTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ControlTree {
        &mut self.tree
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.repaint.mark_draw();
    }

    /// Receives events no control consumed; also the place to open modal
    /// sessions or stop the application in response to a command.
    pub fn set_event_handler(&mut self, handler: EventHandler) {
        self.handler = Some(handler);
    }

    /// Insert a widget into the tree; geometry is recomputed before the next
    /// frame.
    pub fn add(
        &mut self,
        parent: ControlId,
        layout: LayoutSpec,
        widget: Box<dyn Widget>,
    ) -> Result<ControlId, AppError> {
        let id = self.tree.insert(parent, layout, widget)?;
        self.repaint.mark_all();
        Ok(id)
    }

    pub fn focus(&mut self, id: ControlId) {
        self.focus_control(id);
    }

    pub fn request_repaint(&mut self) {
        self.repaint.mark_draw();
    }

    pub fn stop(&mut self) {
        self.loop_status = LoopStatus::StopApp;
    }

    pub fn modal_depth(&self) -> usize {
        self.modal_stack.len()
    }

    /// Run until the application stops, then restore the terminal.
    pub fn run(&mut self) -> Result<(), AppError> {
        tracing::info!("event loop starting");
        let result = self.execute_event_loop(None);
        let shutdown = self.backend.shutdown().map_err(AppError::Backend);
        tracing::info!("event loop finished");
        result?;
        shutdown
    }

    /// Open a modal session for `id`: input is confined to its subtree until
    /// something inside it stops the innermost loop.
    pub fn show_modal(&mut self, id: ControlId) -> Result<(), AppError> {
        self.execute_event_loop(Some(id))
    }

    fn push_modal(&mut self, id: ControlId) -> Result<(), AppError> {
        if self.modal_stack.len() >= MAX_MODAL_STACK {
            tracing::warn!(control = ?id, depth = self.modal_stack.len(), "modal push refused");
            return Err(AppError::ModalStackFull);
        }
        self.modal_stack.push(id);
        self.repaint.mark_all();
        Ok(())
    }

    fn execute_event_loop(&mut self, modal: Option<ControlId>) -> Result<(), AppError> {
        if let Some(id) = modal {
            self.push_modal(id)?;
        }
        self.update_command_bar();
        while self.loop_status == LoopStatus::Normal {
            self.redraw_if_needed()?;
            let event = self.backend.read_event().map_err(AppError::Backend)?;
            self.dispatch(event);
            self.drain_pending();
        }
        if modal.is_some() {
            self.modal_stack.pop();
            self.update_command_bar();
            self.repaint.mark_all();
        }
        // A modal close stops only its own loop; an application stop
        // propagates through every enclosing loop.
        if self.loop_status == LoopStatus::StopCurrent {
            self.loop_status = LoopStatus::Normal;
        }
        Ok(())
    }

    /// The root input is routed against: the top live modal control, or the
    /// desktop when no modal session is open.
    fn active_root(&self) -> ControlId {
        self.modal_stack
            .iter()
            .rev()
            .copied()
            .find(|&id| self.tree.contains(id))
            .unwrap_or(self.desktop)
    }

    fn redraw_if_needed(&mut self) -> Result<(), AppError> {
        if !self.repaint.needs_draw() && !self.repaint.needs_layout() {
            return Ok(());
        }
        if self.repaint.needs_layout() {
            self.compute_positions();
            self.repaint.clear_layout();
        }
        self.repaint.clear_draw();
        self.paint();
        // A focus hook may have dirtied the frame mid-paint; at most one
        // extra pass per frame.
        if self.repaint.needs_draw() {
            if self.repaint.needs_layout() {
                self.compute_positions();
                self.repaint.clear_layout();
            }
            self.repaint.clear_draw();
            self.paint();
        }
        self.backend.flush(&self.buffer).map_err(AppError::Backend)
    }

    fn compute_positions(&mut self) {
        let (w, h) = self.backend.size();
        if self.buffer.width() != w || self.buffer.height() != h {
            self.buffer.resize(w, h);
            self.commandbar.set_desktop_size(w, h);
        }
        let desktop_h = if self.commandbar.is_enabled() {
            (h - 1).max(0)
        } else {
            h
        };
        let screen = Rect::new(0, 0, w, desktop_h);
        self.tree.propagate_layout(self.desktop, screen);
        for i in 0..self.modal_stack.len() {
            let id = self.modal_stack[i];
            self.tree.propagate_layout(id, screen);
        }
    }

    fn paint(&mut self) {
        self.buffer.fill(Style::new());
        self.paint_control(self.desktop, self.modal_stack.is_empty());
        let top = self.modal_stack.len().wrapping_sub(1);
        for i in 0..self.modal_stack.len() {
            let id = self.modal_stack[i];
            self.paint_control(id, i == top);
        }
        let mut painter = Painter::whole(&mut self.buffer);
        self.commandbar.paint(&mut painter, &self.theme);
    }

    /// Paint `id` and its subtree. The focused path is painted last so it
    /// ends up on top of overlapping siblings; focus hooks fire here, when a
    /// control's painted focus state first disagrees with its stored one, so
    /// a loss hook always runs before the matching gain hook.
    fn paint_control(&mut self, id: ControlId, focused: bool) {
        let Some(state) = self.tree.state(id) else {
            return;
        };
        if !state.is_visible() {
            return;
        }
        if state.has_focus() != focused {
            self.with_widget(id, |w, st, ctx| {
                st.focused = focused;
                if focused {
                    w.on_focus(st, ctx);
                } else {
                    w.on_lose_focus(st, ctx);
                }
            });
        }
        if let Some(node) = self.tree.node_mut(id) {
            let clip = node.state.clip();
            if clip.visible {
                let mut painter = Painter::new(&mut self.buffer, clip.rect, clip.origin);
                node.widget.paint(&node.state, &self.theme, &mut painter);
            }
        }
        let (children, current) = match self.tree.state(id) {
            Some(s) => (s.children().to_vec(), s.current_child()),
            None => return,
        };
        let cnt = children.len();
        if cnt == 0 {
            return;
        }
        match current {
            Some(ci) if ci < cnt => {
                for step in 1..cnt {
                    self.paint_child(children[(ci + step) % cnt], false);
                }
                self.paint_child(children[ci], focused);
            }
            _ => {
                for child in children {
                    self.paint_child(child, false);
                }
            }
        }
    }

    /// Recurse into a child unless it is a modal root; those are painted in
    /// their own stack pass, never as part of an ancestor's subtree, so their
    /// focus hooks see one state per frame.
    fn paint_child(&mut self, id: ControlId, focused: bool) {
        if self.modal_stack.contains(&id) {
            return;
        }
        self.paint_control(id, focused);
    }

    /// Rebuild the command bar by walking from the focused leaf toward the
    /// active root; the first control that claims the bar ends the walk.
    fn update_command_bar(&mut self) {
        self.commandbar.clear();
        self.repaint.mark_draw();
        if !self.commandbar.is_enabled() {
            return;
        }
        let root = self.active_root();
        let mut cur = self.tree.focused_leaf(root);
        while let Some(id) = cur {
            let Some(node) = self.tree.node_mut(id) else {
                break;
            };
            if node.widget.on_update_command_bar(&node.state, &mut self.commandbar) {
                break;
            }
            if id == root {
                break;
            }
            cur = node.state.parent();
        }
    }

    /// Run one widget hook with a dispatch context built from the runtime's
    /// disjoint fields.
    fn with_widget<R>(
        &mut self,
        id: ControlId,
        f: impl FnOnce(&mut dyn Widget, &mut ControlState, &mut Ctx<'_>) -> R,
    ) -> Option<R> {
        let node = self.tree.node_mut(id)?;
        let mut ctx = Ctx {
            id,
            repaint: &mut self.repaint,
            loop_status: &mut self.loop_status,
            pending: &mut self.pending,
        };
        Some(f(node.widget.as_mut(), &mut node.state, &mut ctx))
    }

    fn dispatch(&mut self, event: SystemEvent) {
        match event {
            SystemEvent::Close => self.loop_status = LoopStatus::StopApp,
            SystemEvent::Resize(w, h) => {
                tracing::debug!(width = w, height = h, "terminal resized");
                self.buffer.resize(w, h);
                self.commandbar.set_desktop_size(w, h);
                self.repaint.mark_all();
            }
            SystemEvent::Key(key) => self.process_key(key),
            SystemEvent::Mouse(mouse) => {
                if self.commandbar.set_shift_state(mouse.modifiers) {
                    self.repaint.mark_draw();
                }
                let pos = Pos::new(mouse.column, mouse.row);
                match mouse.kind {
                    MouseEventKind::Down(button) => self.process_mouse_down(pos, button),
                    MouseEventKind::Up(button) => self.process_mouse_up(pos, button),
                    MouseEventKind::Drag(button) => self.process_mouse_drag(pos, button),
                    MouseEventKind::Moved => self.process_mouse_move(pos),
                    MouseEventKind::ScrollUp => self.process_mouse_wheel(pos, WheelDirection::Up),
                    MouseEventKind::ScrollDown => {
                        self.process_mouse_wheel(pos, WheelDirection::Down)
                    }
                }
            }
            SystemEvent::Paste(_) | SystemEvent::FocusGained | SystemEvent::FocusLost => {}
        }
    }

    fn process_key(&mut self, key: Key) {
        if self.commandbar.set_shift_state(key.modifiers) {
            self.repaint.mark_draw();
        }
        let root = self.active_root();
        let mut chain = Vec::new();
        let mut cur = self.tree.focused_leaf(root);
        while let Some(id) = cur {
            chain.push(id);
            if id == root {
                break;
            }
            cur = self.tree.state(id).and_then(|s| s.parent());
        }
        for id in chain {
            let consumed = self
                .with_widget(id, |w, st, ctx| w.on_key_event(st, key, ctx))
                .unwrap_or(false);
            if consumed {
                return;
            }
        }
        match key.code {
            KeyCode::Tab if key.modifiers.is_empty() => {
                self.move_focus(true);
                return;
            }
            KeyCode::Tab if key.modifiers == KeyModifiers::SHIFT => {
                self.move_focus(false);
                return;
            }
            KeyCode::BackTab => {
                self.move_focus(false);
                return;
            }
            KeyCode::Char(ch) if key.modifiers.contains(KeyModifiers::ALT) => {
                if let Some(target) = self.tree.find_hotkey(root, ch) {
                    self.focus_control(target);
                    self.with_widget(target, |w, st, ctx| w.on_hot_key(st, ctx));
                    self.pending.push(ControlEvent {
                        source: target,
                        kind: ControlEventKind::HotKeyActivated,
                    });
                    return;
                }
            }
            _ => {}
        }
        if let Some(command) = self.commandbar.command_for_key(key) {
            self.send_command(command);
        }
    }

    fn move_focus(&mut self, forward: bool) {
        let root = self.active_root();
        if let Some(next) = self.tree.find_next_control(root, forward) {
            self.focus_control(next);
        }
    }

    fn focus_control(&mut self, id: ControlId) {
        if self.tree.set_focus(id) {
            self.repaint.mark_draw();
            self.update_command_bar();
        }
    }

    fn send_command(&mut self, command: i32) {
        let root = self.active_root();
        let source = self.tree.focused_leaf(root).unwrap_or(root);
        tracing::debug!(command, "command raised");
        self.pending.push(ControlEvent {
            source,
            kind: ControlEventKind::Command(command),
        });
    }

    fn local_pos(&self, id: ControlId, pos: Pos) -> Option<Pos> {
        self.tree.state(id).map(|s| s.clip().to_local(pos))
    }

    fn process_mouse_down(&mut self, pos: Pos, button: MouseButton) {
        if self.commandbar.on_mouse_down(pos) {
            self.mouse_lock = MouseLock::CommandBar;
            self.repaint.mark_draw();
            return;
        }
        let root = self.active_root();
        let Some(hit) = self.tree.hit_test(root, pos) else {
            return;
        };
        self.focus_control(hit);
        self.mouse_lock = MouseLock::Control(hit);
        if let Some(local) = self.local_pos(hit, pos) {
            self.with_widget(hit, |w, st, ctx| w.on_mouse_pressed(st, local, button, ctx));
        }
        self.repaint.mark_draw();
    }

    fn process_mouse_up(&mut self, pos: Pos, button: MouseButton) {
        match std::mem::replace(&mut self.mouse_lock, MouseLock::None) {
            MouseLock::CommandBar => {
                if let Some(command) = self.commandbar.on_mouse_up() {
                    self.send_command(command);
                }
                self.repaint.mark_draw();
            }
            MouseLock::Control(id) => {
                if let Some(local) = self.local_pos(id, pos) {
                    self.with_widget(id, |w, st, ctx| w.on_mouse_released(st, local, button, ctx));
                }
                self.repaint.mark_draw();
            }
            MouseLock::None => {}
        }
    }

    fn process_mouse_drag(&mut self, pos: Pos, button: MouseButton) {
        // Drags outside any lock, and drags while the bar holds the lock, are
        // dropped.
        let MouseLock::Control(id) = self.mouse_lock else {
            return;
        };
        let Some(local) = self.local_pos(id, pos) else {
            return;
        };
        let moved = self
            .with_widget(id, |w, st, ctx| w.on_mouse_drag(st, local, button, ctx))
            .unwrap_or(false);
        if moved {
            self.repaint.mark_all();
        }
    }

    fn process_mouse_move(&mut self, pos: Pos) {
        if self.mouse_lock != MouseLock::None {
            return;
        }
        let (claimed, repaint) = self.commandbar.on_mouse_over(pos);
        if repaint {
            self.repaint.mark_draw();
        }
        if claimed {
            self.set_hover(None);
            return;
        }
        let hit = self.tree.hit_test(self.active_root(), pos);
        if hit != self.hover {
            self.set_hover(hit);
        }
        // The hover target always receives the position update, including on
        // the event that entered it.
        if let Some(id) = self.hover {
            if let Some(local) = self.local_pos(id, pos) {
                let changed = self
                    .with_widget(id, |w, st, ctx| w.on_mouse_over(st, local, ctx))
                    .unwrap_or(false);
                if changed {
                    self.repaint.mark_draw();
                }
            }
        }
    }

    fn set_hover(&mut self, new: Option<ControlId>) {
        if let Some(old) = self.hover.take() {
            let changed = self.with_widget(old, |w, st, ctx| {
                st.mouse_over = false;
                w.on_mouse_leave(st, ctx)
            });
            if changed.unwrap_or(false) {
                self.repaint.mark_draw();
            }
        }
        if let Some(id) = new {
            let changed = self.with_widget(id, |w, st, ctx| {
                st.mouse_over = true;
                w.on_mouse_enter(st, ctx)
            });
            if changed.unwrap_or(false) {
                self.repaint.mark_draw();
            }
            self.hover = Some(id);
        }
    }

    fn process_mouse_wheel(&mut self, pos: Pos, direction: WheelDirection) {
        // Wheel input is dropped while a button is held.
        if self.mouse_lock != MouseLock::None {
            return;
        }
        let target = self
            .hover
            .or_else(|| self.tree.hit_test(self.active_root(), pos));
        let Some(id) = target else {
            return;
        };
        let consumed = self
            .with_widget(id, |w, st, ctx| w.on_mouse_wheel(st, direction, ctx))
            .unwrap_or(false);
        if consumed {
            self.repaint.mark_draw();
        }
    }

    /// Bubble queued control events: the source first, then each ancestor,
    /// then the application handler. Handlers may queue more events; those
    /// are delivered in the same drain.
    fn drain_pending(&mut self) {
        while !self.pending.is_empty() {
            let batch = std::mem::take(&mut self.pending);
            for event in batch {
                self.deliver(event);
            }
        }
    }

    fn deliver(&mut self, event: ControlEvent) {
        let mut cur = Some(event.source);
        while let Some(id) = cur {
            let consumed = self
                .with_widget(id, |w, st, ctx| w.on_event(st, event.source, &event.kind, ctx))
                .unwrap_or(false);
            if consumed {
                return;
            }
            cur = self.tree.state(id).and_then(|s| s.parent());
        }
        if let Some(mut handler) = self.handler.take() {
            let response = handler(&event);
            self.handler = Some(handler);
            match response {
                EventResponse::CloseApp => self.loop_status = LoopStatus::StopApp,
                EventResponse::ShowModal(id) => {
                    if let Err(err) = self.show_modal(id) {
                        tracing::warn!(error = %err, "modal session refused");
                    }
                }
                EventResponse::Ignored | EventResponse::Handled => {}
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/app/app.rs"]
mod tests;
