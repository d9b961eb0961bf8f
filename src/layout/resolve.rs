use crate::core::geom::Rect;
use crate::layout::{Axis, Dim, LayoutError, LayoutSpec};

/// Resolve `spec` against a parent client rectangle of `parent.w × parent.h`.
///
/// Pure and deterministic: no control tree required, safe to call from tests
/// or background validation. Returns the rectangle in parent-client
/// coordinates (so `parent.x`/`parent.y` are ignored here; clip derivation
/// adds the absolute origin later).
///
/// Errors if an axis has neither a position source (left/right anchor) nor a
/// size source (explicit size or both anchors); nothing is partially applied.
pub fn resolve(spec: &LayoutSpec, parent: Rect) -> Result<Rect, LayoutError> {
    let (x, w) = resolve_axis(
        spec.left,
        spec.right,
        spec.width,
        spec.min_width,
        spec.max_width,
        parent.w,
        Axis::Horizontal,
    )?;
    let (y, h) = resolve_axis(
        spec.top,
        spec.bottom,
        spec.height,
        spec.min_height,
        spec.max_height,
        parent.h,
        Axis::Vertical,
    )?;
    Ok(Rect::new(x, y, w, h))
}

fn resolve_axis(
    near: Option<Dim>,
    far: Option<Dim>,
    size: Option<Dim>,
    min: Option<i32>,
    max: Option<i32>,
    parent_axis: i32,
    axis: Axis,
) -> Result<(i32, i32), LayoutError> {
    let clamp = |v: i32| -> i32 {
        let v = match min {
            Some(lo) => v.max(lo),
            None => v,
        };
        match max {
            Some(hi) => v.min(hi),
            None => v,
        }
    };

    match (near, far, size) {
        // Both anchors: size is derived, explicit size ignored.
        (Some(n), Some(f), _) => {
            let pos = n.resolve(parent_axis);
            let derived = parent_axis - pos - f.resolve(parent_axis);
            Ok((pos, clamp(derived)))
        }
        (Some(n), None, Some(s)) => Ok((n.resolve(parent_axis), clamp(s.resolve(parent_axis)))),
        (None, Some(f), Some(s)) => {
            let w = clamp(s.resolve(parent_axis));
            Ok((parent_axis - f.resolve(parent_axis) - w, w))
        }
        _ => Err(LayoutError::Unresolvable(axis)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/resolve.rs"]
mod tests;
