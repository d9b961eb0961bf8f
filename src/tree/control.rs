use std::ops::{BitOr, BitOrAssign};

use compact_str::CompactString;

use crate::core::geom::{Pos, Rect};
use crate::layout::{LayoutSpec, Margins};
use crate::tree::ControlId;

/// Per-control attribute flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ControlFlags(u8);

impl ControlFlags {
    pub const NONE: Self = Self(0);
    pub const ENABLED: Self = Self(1 << 0);
    pub const VISIBLE: Self = Self(1 << 1);
    pub const TAB_STOP: Self = Self(1 << 2);
    pub const CHECKED: Self = Self(1 << 3);

    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn set(&mut self, other: Self, on: bool) {
        if on {
            self.0 |= other.0;
        } else {
            self.0 &= !other.0;
        }
    }
}

impl Default for ControlFlags {
    fn default() -> Self {
        Self::ENABLED | Self::VISIBLE | Self::TAB_STOP
    }
}

impl BitOr for ControlFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ControlFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Absolute-coordinate visibility rectangle of a control.
///
/// `rect` is the on-screen area the control may actually paint (already
/// intersected with every ancestor); `origin` is where the control's local
/// `(0, 0)` lands on screen, which can differ from `rect`'s corner when the
/// control is partially clipped. `visible == false` means "skip paint and
/// hit-test", never "invalid".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScreenClip {
    pub rect: Rect,
    pub origin: Pos,
    pub visible: bool,
}

impl ScreenClip {
    /// Clip covering the whole screen.
    pub fn screen(w: i32, h: i32) -> Self {
        Self {
            rect: Rect::new(0, 0, w, h),
            origin: Pos::new(0, 0),
            visible: w > 0 && h > 0,
        }
    }

    /// Derive the clip of a child rectangle given in `parent`-local
    /// coordinates.
    pub fn derive(parent: &ScreenClip, local: Rect) -> Self {
        let origin = Pos::new(parent.origin.x + local.x, parent.origin.y + local.y);
        if !parent.visible {
            return Self {
                rect: Rect::default(),
                origin,
                visible: false,
            };
        }
        let rect = local
            .translated(parent.origin.x, parent.origin.y)
            .intersect(parent.rect);
        Self {
            rect,
            origin,
            visible: !rect.is_empty(),
        }
    }

    /// Translate an absolute point into control-local coordinates.
    pub fn to_local(&self, p: Pos) -> Pos {
        Pos::new(p.x - self.origin.x, p.y - self.origin.y)
    }
}

/// State every control carries, managed by the tree; widget behavior lives in
/// the control's [`crate::tree::Widget`] next to it.
#[derive(Debug)]
pub struct ControlState {
    pub(crate) layout: LayoutSpec,
    pub(crate) resolved: Rect,
    pub(crate) clip: ScreenClip,
    pub(crate) client_clip: ScreenClip,
    pub(crate) margins: Margins,
    pub(crate) flags: ControlFlags,
    pub(crate) focused: bool,
    pub(crate) mouse_over: bool,
    caption: CompactString,
    hotkey: Option<char>,
    hotkey_offset: Option<usize>,
    pub control_id: i32,
    pub group_id: i32,
    pub(crate) parent: Option<ControlId>,
    pub(crate) children: Vec<ControlId>,
    pub(crate) current_child: Option<usize>,
}

impl ControlState {
    pub(crate) fn new(layout: LayoutSpec) -> Self {
        Self {
            layout,
            resolved: Rect::default(),
            clip: ScreenClip::default(),
            client_clip: ScreenClip::default(),
            margins: Margins::default(),
            flags: ControlFlags::default(),
            focused: false,
            mouse_over: false,
            caption: CompactString::default(),
            hotkey: None,
            hotkey_offset: None,
            control_id: 0,
            group_id: 0,
            parent: None,
            children: Vec::new(),
            current_child: None,
        }
    }

    pub fn layout(&self) -> &LayoutSpec {
        &self.layout
    }

    /// Rectangle resolved by the last layout pass, in parent-client
    /// coordinates. Widgets read it; only the layout pass writes it.
    pub fn resolved(&self) -> Rect {
        self.resolved
    }

    pub fn clip(&self) -> ScreenClip {
        self.clip
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn set_margins(&mut self, margins: Margins) {
        self.margins = margins;
    }

    /// Client area in control-local coordinates (the rect children are laid
    /// out against).
    pub fn client_rect(&self) -> Rect {
        Rect::new(
            self.margins.left,
            self.margins.top,
            self.resolved.w - self.margins.left - self.margins.right,
            self.resolved.h - self.margins.top - self.margins.bottom,
        )
    }

    /// Request a move to `(x, y)` in parent-client cells. Takes effect on the
    /// next layout pass; the caller must also request a layout recompute.
    pub fn move_to(&mut self, x: i32, y: i32) {
        self.layout.shift_to(x, y);
    }

    pub fn set_layout(&mut self, layout: LayoutSpec) {
        self.layout = layout;
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Set the caption; a `&` before a character declares it as the
    /// control's hotkey (`"&Save"` → hotkey `s`).
    pub fn set_caption(&mut self, caption: &str) {
        self.hotkey = None;
        self.hotkey_offset = None;
        let mut text = CompactString::default();
        let mut chars = caption.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch == '&' {
                if let Some(&next) = chars.peek() {
                    if self.hotkey.is_none() && next != '&' {
                        self.hotkey = Some(next.to_ascii_lowercase());
                        self.hotkey_offset = Some(text.chars().count());
                        continue;
                    }
                    if next == '&' {
                        chars.next();
                    }
                }
            }
            text.push(ch);
        }
        self.caption = text;
    }

    pub fn hotkey(&self) -> Option<char> {
        self.hotkey
    }

    /// Character index of the hotkey inside the caption, for underlining.
    pub fn hotkey_offset(&self) -> Option<usize> {
        self.hotkey_offset
    }

    pub fn is_enabled(&self) -> bool {
        self.flags.contains(ControlFlags::ENABLED)
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(ControlFlags::VISIBLE)
    }

    pub fn is_tab_stop(&self) -> bool {
        self.flags.contains(ControlFlags::TAB_STOP)
    }

    pub fn is_checked(&self) -> bool {
        self.flags.contains(ControlFlags::CHECKED)
    }

    pub fn set_enabled(&mut self, on: bool) {
        self.flags.set(ControlFlags::ENABLED, on);
    }

    pub fn set_visible(&mut self, on: bool) {
        self.flags.set(ControlFlags::VISIBLE, on);
    }

    pub fn set_tab_stop(&mut self, on: bool) {
        self.flags.set(ControlFlags::TAB_STOP, on);
    }

    pub fn set_checked(&mut self, on: bool) {
        self.flags.set(ControlFlags::CHECKED, on);
    }

    /// Enabled and visible; the precondition for focus, keys and hit-tests.
    pub fn is_interactive(&self) -> bool {
        self.flags
            .contains(ControlFlags::ENABLED | ControlFlags::VISIBLE)
    }

    pub fn has_focus(&self) -> bool {
        self.focused
    }

    pub fn is_mouse_over(&self) -> bool {
        self.mouse_over
    }

    pub fn parent(&self) -> Option<ControlId> {
        self.parent
    }

    pub fn children(&self) -> &[ControlId] {
        &self.children
    }

    pub fn current_child(&self) -> Option<usize> {
        self.current_child
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tree/control.rs"]
mod tests;
