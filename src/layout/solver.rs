use crate::{
    foundation::core::{Offset, Role, RoleMap, Size},
    foundation::error::{MergeError, MergeResult},
};

/// Canvas size and per-role placement for one part set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrossLayout {
    /// One third of the canvas in each axis; the center anchor is derived from it.
    pub cell: Size,
    /// Full canvas size, `3 * cell`.
    pub canvas: Size,
    placement: RoleMap<Offset>,
}

impl CrossLayout {
    pub fn offset_for(&self, role: Role) -> Offset {
        *self.placement.get(role)
    }

    pub fn placement(&self) -> &RoleMap<Offset> {
        &self.placement
    }
}

/// Cell size of the cross motif.
///
/// Width spans the horizontal arm (left, center, right); height spans the vertical parts
/// (top, center, bottom, reference). The reference width never contributes.
pub fn cell_size(sizes: &RoleMap<Size>) -> Size {
    let width = [Role::Left, Role::Center, Role::Right]
        .into_iter()
        .map(|r| sizes[r].width)
        .max()
        .unwrap_or(0);
    let height = [Role::Top, Role::Center, Role::Bottom, Role::Reference]
        .into_iter()
        .map(|r| sizes[r].height)
        .max()
        .unwrap_or(0);
    Size::new(width, height)
}

/// Resolve the cross layout for the given part sizes.
pub fn resolve_cross_layout(sizes: &RoleMap<Size>) -> MergeResult<CrossLayout> {
    let cell = cell_size(sizes);
    let canvas = match (cell.width.checked_mul(3), cell.height.checked_mul(3)) {
        (Some(w), Some(h)) => Size::new(w, h),
        _ => {
            return Err(MergeError::validation(format!(
                "canvas for cell {}x{} overflows",
                cell.width, cell.height
            )));
        }
    };

    let canvas_bytes = (u64::from(canvas.width) * u64::from(canvas.height)).checked_mul(4);
    if canvas_bytes.is_none_or(|b| b > isize::MAX as u64) {
        return Err(MergeError::validation(format!(
            "canvas {}x{} is too large to allocate",
            canvas.width, canvas.height
        )));
    }

    let cw = i64::from(cell.width);
    let ch = i64::from(cell.height);
    let w = |r: Role| i64::from(sizes[r].width);
    let h = |r: Role| i64::from(sizes[r].height);

    let o = Offset::new(cw, half(ch));
    let placement = RoleMap::from_fn(|role| match role {
        Role::Center => o,
        Role::Top => Offset::new(half(cw - w(Role::Top)) + o.x, o.y - h(Role::Top)),
        Role::Left => Offset::new(
            o.x - w(Role::Left),
            o.y + half(h(Role::Center)) - half(h(Role::Left)),
        ),
        Role::Right => Offset::new(
            o.x + w(Role::Center),
            o.y + half(h(Role::Center)) - half(h(Role::Right)),
        ),
        Role::Bottom => Offset::new(
            half(cw - w(Role::Bottom)) + o.x,
            o.y + h(Role::Center),
        ),
        Role::Reference => Offset::new(
            half(cw - w(Role::Reference)) + o.x,
            o.y + h(Role::Center) + h(Role::Bottom),
        ),
    });

    tracing::debug!(
        cell_w = cell.width,
        cell_h = cell.height,
        canvas_w = canvas.width,
        canvas_h = canvas.height,
        "resolved cross layout"
    );

    Ok(CrossLayout {
        cell,
        canvas,
        placement,
    })
}

// Floor division; parts wider than the cell give negative numerators.
fn half(v: i64) -> i64 {
    v.div_euclid(2)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/solver.rs"]
mod tests;
