//! The control tree: a slotmap arena of controls plus the layout, clip,
//! hit-test and focus algorithms that walk it.
//!
//! Every cross-reference into the tree (parent links, the modal stack, the
//! mouse lock and hover observers) is a [`ControlId`]; the slotmap generation
//! check turns use-after-remove into a clean `None` instead of a dangling
//! pointer.

pub mod control;
pub mod widget;

pub use control::{ControlFlags, ControlState, ScreenClip};
pub use widget::{ControlEvent, ControlEventKind, Ctx, DefaultWidget, WheelDirection, Widget};

use std::fmt;

use slotmap::{new_key_type, SlotMap};

use crate::core::geom::{Pos, Rect};
use crate::layout::{self, LayoutError, LayoutSpec};

new_key_type! {
    /// Generation-checked handle to a control in the arena.
    pub struct ControlId;
}

#[derive(Debug)]
pub enum TreeError {
    /// The parent handle is stale or was never valid.
    InvalidParent,
    /// The layout spec cannot be resolved on some axis; nothing was inserted.
    Layout(LayoutError),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::InvalidParent => f.write_str("parent control no longer exists"),
            TreeError::Layout(err) => write!(f, "rejected control layout: {}", err),
        }
    }
}

impl std::error::Error for TreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TreeError::Layout(err) => Some(err),
            TreeError::InvalidParent => None,
        }
    }
}

pub struct ControlNode {
    pub state: ControlState,
    pub widget: Box<dyn Widget>,
}

/// Owns every control. Insertion transfers the widget into the arena under
/// exactly one parent; removing a control drops its whole subtree.
#[derive(Default)]
pub struct ControlTree {
    arena: SlotMap<ControlId, ControlNode>,
}

/// Rect used to probe a spec for structural resolvability at insert time,
/// so a malformed layout is reported at the offending call and not during a
/// layout pass.
const PROBE_RECT: Rect = Rect::new(0, 0, 100, 100);

impl ControlTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: ControlId) -> bool {
        self.arena.contains_key(id)
    }

    /// Insert a parentless root (the desktop, or a modal window not yet
    /// attached anywhere).
    pub fn insert_root(
        &mut self,
        layout: LayoutSpec,
        mut widget: Box<dyn Widget>,
    ) -> Result<ControlId, TreeError> {
        layout::resolve(&layout, PROBE_RECT).map_err(TreeError::Layout)?;
        let mut state = ControlState::new(layout);
        widget.on_attach(&mut state);
        Ok(self.arena.insert(ControlNode { state, widget }))
    }

    /// Insert a child; tab order is insertion order. The first tab-eligible
    /// child of a parent becomes its current (focused) child.
    pub fn insert(
        &mut self,
        parent: ControlId,
        layout: LayoutSpec,
        widget: Box<dyn Widget>,
    ) -> Result<ControlId, TreeError> {
        if !self.arena.contains_key(parent) {
            return Err(TreeError::InvalidParent);
        }
        let id = self.insert_root(layout, widget)?;
        self.arena[id].state.parent = Some(parent);
        let eligible = {
            let st = &self.arena[id].state;
            st.is_interactive() && st.is_tab_stop()
        };
        let parent_state = &mut self.arena[parent].state;
        parent_state.children.push(id);
        if parent_state.current_child.is_none() && eligible {
            parent_state.current_child = Some(parent_state.children.len() - 1);
        }
        Ok(id)
    }

    /// Remove a control and its whole subtree. Non-owning observers (modal
    /// stack, mouse lock, hover) detect the removal through the generation
    /// check on their next lookup.
    pub fn remove(&mut self, id: ControlId) -> bool {
        let Some(parent) = self.arena.get(id).map(|n| n.state.parent) else {
            return false;
        };
        if let Some(parent) = parent.and_then(|p| self.arena.get_mut(p)) {
            let state = &mut parent.state;
            if let Some(idx) = state.children.iter().position(|&c| c == id) {
                state.children.remove(idx);
                state.current_child = match state.current_child {
                    Some(ci) if ci == idx => None,
                    Some(ci) if ci > idx => Some(ci - 1),
                    other => other,
                };
            }
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.arena.remove(next) {
                stack.extend(node.state.children);
            }
        }
        true
    }

    pub fn state(&self, id: ControlId) -> Option<&ControlState> {
        self.arena.get(id).map(|n| &n.state)
    }

    pub fn state_mut(&mut self, id: ControlId) -> Option<&mut ControlState> {
        self.arena.get_mut(id).map(|n| &mut n.state)
    }

    pub(crate) fn node_mut(&mut self, id: ControlId) -> Option<&mut ControlNode> {
        self.arena.get_mut(id)
    }

    /// Resolve layouts and derive clips for the subtree under `root`,
    /// depth-first pre-order. `screen` is the absolute rectangle the root is
    /// laid out against.
    pub fn propagate_layout(&mut self, root: ControlId, screen: Rect) {
        let parent_clip = ScreenClip {
            rect: screen,
            origin: Pos::new(screen.x, screen.y),
            visible: !screen.is_empty(),
        };
        self.layout_node(root, Rect::new(0, 0, screen.w, screen.h), &parent_clip);
    }

    fn layout_node(&mut self, id: ControlId, parent_client: Rect, parent_clip: &ScreenClip) {
        let (children, child_client, child_clip) = {
            let Some(node) = self.arena.get_mut(id) else {
                return;
            };
            let state = &mut node.state;
            match layout::resolve(&state.layout, parent_client) {
                Ok(rect) => state.resolved = rect,
                Err(err) => {
                    // Rejected at insert time normally; degrade to a no-op.
                    tracing::warn!(control = ?id, error = %err, "layout resolution failed");
                    return;
                }
            }
            state.clip = ScreenClip::derive(parent_clip, state.resolved);
            let client_local = state.client_rect();
            state.client_clip = ScreenClip::derive(&state.clip, client_local);
            (
                state.children.clone(),
                Rect::new(0, 0, client_local.w, client_local.h),
                state.client_clip,
            )
        };
        for child in children {
            self.layout_node(child, child_client, &child_clip);
        }
    }

    /// Deepest enabled+visible control whose clip contains `pos`. The child
    /// search starts at the current focused child and wraps once, so an
    /// overlapped focused sibling wins the tie.
    pub fn hit_test(&self, id: ControlId, pos: Pos) -> Option<ControlId> {
        let state = self.state(id)?;
        if !state.is_interactive() || !state.clip.visible || !state.clip.rect.contains(pos) {
            return None;
        }
        let count = state.children.len();
        if count > 0 {
            let start = match state.current_child {
                Some(ci) if ci < count => ci,
                _ => 0,
            };
            for step in 0..count {
                let child = state.children[(start + step) % count];
                if let Some(hit) = self.hit_test(child, pos) {
                    return Some(hit);
                }
            }
        }
        Some(id)
    }

    /// Follow the current-child chain down to the control that would receive
    /// keyboard input.
    pub fn focused_leaf(&self, id: ControlId) -> Option<ControlId> {
        let state = self.state(id)?;
        if !state.is_interactive() {
            return None;
        }
        if let Some(ci) = state.current_child {
            if let Some(&child) = state.children.get(ci) {
                if let Some(leaf) = self.focused_leaf(child) {
                    return Some(leaf);
                }
            }
        }
        Some(id)
    }

    /// Re-chain the current-child indexes so `id` (and its subtree's current
    /// leaf) is the focus target. Focus hooks fire lazily during the next
    /// paint pass.
    pub fn set_focus(&mut self, id: ControlId) -> bool {
        let interactive = self.state(id).is_some_and(|s| s.is_interactive());
        if !interactive {
            tracing::debug!(control = ?id, "focus refused: control missing or not interactive");
            return false;
        }
        let mut child = id;
        while let Some(parent) = self.state(child).and_then(|s| s.parent) {
            let Some(idx) = self
                .state(parent)
                .and_then(|s| s.children.iter().position(|&c| c == child))
            else {
                return false;
            };
            if let Some(state) = self.state_mut(parent) {
                state.current_child = Some(idx);
            }
            child = parent;
        }
        true
    }

    /// Tab-eligible controls under `root`, pre-order. A container with
    /// eligible descendants defers to them; only "leaves" of the tab order
    /// are listed.
    pub fn tab_stops(&self, root: ControlId) -> Vec<ControlId> {
        let mut out = Vec::new();
        self.collect_tab_stops(root, &mut out);
        out
    }

    fn collect_tab_stops(&self, id: ControlId, out: &mut Vec<ControlId>) {
        let Some(state) = self.state(id) else {
            return;
        };
        if !state.is_interactive() {
            return;
        }
        let before = out.len();
        for &child in &state.children {
            self.collect_tab_stops(child, out);
        }
        if out.len() == before && state.is_tab_stop() {
            out.push(id);
        }
    }

    /// Next (or previous) control in tab order after the focused leaf,
    /// wrapping exactly once so the whole tree is covered per direction.
    pub fn find_next_control(&self, root: ControlId, forward: bool) -> Option<ControlId> {
        let stops = self.tab_stops(root);
        if stops.is_empty() {
            return None;
        }
        let focused = self.focused_leaf(root)?;
        match stops.iter().position(|&c| c == focused) {
            Some(i) if forward => Some(stops[(i + 1) % stops.len()]),
            Some(i) => Some(stops[(i + stops.len() - 1) % stops.len()]),
            None if forward => Some(stops[0]),
            None => stops.last().copied(),
        }
    }

    /// First enabled+visible control in pre-order whose hotkey matches `ch`,
    /// independent of focus.
    pub fn find_hotkey(&self, root: ControlId, ch: char) -> Option<ControlId> {
        let state = self.state(root)?;
        if !state.is_interactive() {
            return None;
        }
        if state.hotkey() == Some(ch.to_ascii_lowercase()) {
            return Some(root);
        }
        for &child in &state.children {
            if let Some(found) = self.find_hotkey(child, ch) {
                return Some(found);
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tree/tree.rs"]
mod tests;
