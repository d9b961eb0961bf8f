//! Declarative anchor/size layout.
//!
//! A [`LayoutSpec`] is parsed once (from a `"x:1,y:1,w:10,h:3"` style format
//! string or built programmatically) and resolved against a parent rectangle
//! on every layout pass. Resolution is a pure function; see [`resolve`].

mod resolve;

pub use resolve::resolve;

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Malformed format string; the offending fragment is carried verbatim.
    Parse(String),
    /// The spec cannot determine a position and a size for this axis.
    Unresolvable(Axis),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::Parse(frag) => write!(f, "malformed layout fragment: {:?}", frag),
            LayoutError::Unresolvable(axis) => {
                write!(f, "layout has no anchor/size source for the {} axis", axis)
            }
        }
    }
}

impl std::error::Error for LayoutError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Horizontal => f.write_str("horizontal"),
            Axis::Vertical => f.write_str("vertical"),
        }
    }
}

/// A single dimension value: absolute cells or a percentage of the parent
/// client axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dim {
    Cells(i32),
    Percent(i32),
}

impl Dim {
    pub(crate) fn resolve(self, parent_axis: i32) -> i32 {
        match self {
            Dim::Cells(v) => v,
            Dim::Percent(p) => parent_axis * p / 100,
        }
    }
}

/// Interior margins applied to a control's client area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Margins {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Margins {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// Parsed, declarative layout for one control.
///
/// `x`/`y` are aliases for the left/top anchors; when both opposite anchors
/// of an axis are present the size on that axis is derived and any explicit
/// size is ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutSpec {
    pub left: Option<Dim>,
    pub right: Option<Dim>,
    pub top: Option<Dim>,
    pub bottom: Option<Dim>,
    pub width: Option<Dim>,
    pub height: Option<Dim>,
    pub min_width: Option<i32>,
    pub max_width: Option<i32>,
    pub min_height: Option<i32>,
    pub max_height: Option<i32>,
}

impl LayoutSpec {
    /// Fixed position and size in cells.
    pub fn fixed(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            left: Some(Dim::Cells(x)),
            top: Some(Dim::Cells(y)),
            width: Some(Dim::Cells(w)),
            height: Some(Dim::Cells(h)),
            ..Self::default()
        }
    }

    /// Anchored to all four parent edges: fills the parent client area.
    pub fn fill() -> Self {
        Self {
            left: Some(Dim::Cells(0)),
            right: Some(Dim::Cells(0)),
            top: Some(Dim::Cells(0)),
            bottom: Some(Dim::Cells(0)),
            ..Self::default()
        }
    }

    /// Parse a `"key:value,key:value"` format string.
    ///
    /// Keys: `x`/`l`, `y`/`t`, `r`, `b`, `w`, `h` (plus the long forms
    /// `left/top/right/bottom/width/height`), and the clamps
    /// `minw`/`maxw`/`minh`/`maxh`. Values are integers, optionally suffixed
    /// with `%` for parent-relative dimensions.
    pub fn parse(format: &str) -> Result<Self, LayoutError> {
        let mut spec = Self::default();
        for raw in format.split(',') {
            let frag = raw.trim();
            if frag.is_empty() {
                continue;
            }
            let (key, value) = frag
                .split_once(':')
                .ok_or_else(|| LayoutError::Parse(frag.to_string()))?;
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();
            match key.as_str() {
                "x" | "l" | "left" => spec.left = Some(parse_dim(frag, value)?),
                "y" | "t" | "top" => spec.top = Some(parse_dim(frag, value)?),
                "r" | "right" => spec.right = Some(parse_dim(frag, value)?),
                "b" | "bottom" => spec.bottom = Some(parse_dim(frag, value)?),
                "w" | "width" => spec.width = Some(parse_dim(frag, value)?),
                "h" | "height" => spec.height = Some(parse_dim(frag, value)?),
                "minw" => spec.min_width = Some(parse_cells(frag, value)?),
                "maxw" => spec.max_width = Some(parse_cells(frag, value)?),
                "minh" => spec.min_height = Some(parse_cells(frag, value)?),
                "maxh" => spec.max_height = Some(parse_cells(frag, value)?),
                _ => return Err(LayoutError::Parse(frag.to_string())),
            }
        }
        Ok(spec)
    }

    /// Fill in an intrinsic size for axes the caller left unspecified.
    ///
    /// Widgets use this so `"x:1,y:1,w:30"` works for a one-row control.
    pub fn with_default_size(mut self, w: i32, h: i32) -> Self {
        if self.width.is_none() && !(self.left.is_some() && self.right.is_some()) {
            self.width = Some(Dim::Cells(w));
        }
        if self.height.is_none() && !(self.top.is_some() && self.bottom.is_some()) {
            self.height = Some(Dim::Cells(h));
        }
        self
    }

    /// Shift the left/top anchors by a cell delta, keeping everything else.
    ///
    /// Used for drag-moving; anchors expressed as percentages are converted
    /// to cells on first move.
    pub fn shift_to(&mut self, x: i32, y: i32) {
        self.left = Some(Dim::Cells(x));
        self.top = Some(Dim::Cells(y));
    }
}

fn parse_dim(frag: &str, value: &str) -> Result<Dim, LayoutError> {
    if let Some(pct) = value.strip_suffix('%') {
        let v = pct
            .trim()
            .parse::<i32>()
            .map_err(|_| LayoutError::Parse(frag.to_string()))?;
        Ok(Dim::Percent(v))
    } else {
        Ok(Dim::Cells(parse_cells(frag, value)?))
    }
}

fn parse_cells(frag: &str, value: &str) -> Result<i32, LayoutError> {
    value
        .parse::<i32>()
        .map_err(|_| LayoutError::Parse(frag.to_string()))
}

#[cfg(test)]
#[path = "../../tests/unit/layout/spec.rs"]
mod tests;
