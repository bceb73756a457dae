use std::fmt;

/// One of the six fixed input image categories.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Observed center image (`_o`).
    Center,
    /// Reference strip placed below the bottom limb (`_r`).
    Reference,
    /// Left limb (`_le`).
    Left,
    /// Bottom limb (`_be`).
    Bottom,
    /// Top limb (`_te`).
    Top,
    /// Right limb (`_re`).
    Right,
}

impl Role {
    /// Roles in file-suffix order, as they are looked up on disk.
    pub const ALL: [Role; 6] = [
        Role::Center,
        Role::Reference,
        Role::Left,
        Role::Bottom,
        Role::Top,
        Role::Right,
    ];

    /// Back-to-front paste order, also the order of frames 1..=6 in the output.
    pub const LAYER_ORDER: [Role; 6] = [
        Role::Top,
        Role::Left,
        Role::Center,
        Role::Right,
        Role::Bottom,
        Role::Reference,
    ];

    /// File-name suffix without the leading underscore.
    pub fn suffix(self) -> &'static str {
        match self {
            Role::Center => "o",
            Role::Reference => "r",
            Role::Left => "le",
            Role::Bottom => "be",
            Role::Top => "te",
            Role::Right => "re",
        }
    }

    /// Dense index used by [`RoleMap`].
    pub(crate) fn index(self) -> usize {
        match self {
            Role::Center => 0,
            Role::Reference => 1,
            Role::Left => 2,
            Role::Bottom => 3,
            Role::Top => 4,
            Role::Right => 5,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Fixed-size role-indexed storage; every role always has a value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleMap<T> {
    slots: [T; 6],
}

impl<T> RoleMap<T> {
    /// Build a map by evaluating `f` for every role.
    pub fn from_fn(mut f: impl FnMut(Role) -> T) -> Self {
        Self {
            slots: Role::ALL.map(&mut f),
        }
    }

    /// Fallible variant of [`RoleMap::from_fn`].
    pub fn try_from_fn<E>(mut f: impl FnMut(Role) -> Result<T, E>) -> Result<Self, E> {
        let [a, b, c, d, e, g] = Role::ALL;
        Ok(Self {
            slots: [f(a)?, f(b)?, f(c)?, f(d)?, f(e)?, f(g)?],
        })
    }

    /// Value for `role`.
    pub fn get(&self, role: Role) -> &T {
        &self.slots[role.index()]
    }

    /// Consume the map, yielding values in [`Role::ALL`] order.
    pub fn into_pairs(self) -> impl Iterator<Item = (Role, T)> {
        Role::ALL.into_iter().zip(self.slots)
    }
}

impl<T> std::ops::Index<Role> for RoleMap<T> {
    type Output = T;

    fn index(&self, role: Role) -> &T {
        self.get(role)
    }
}

/// Pixel dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Signed top-left offset into a canvas. May lie outside the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Offset {
    pub x: i64,
    pub y: i64,
}

impl Offset {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Resolution metadata in dots per inch.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Resolution {
    pub x: f64,
    pub y: f64,
}

impl Resolution {
    /// Value used when the center image carries no usable resolution.
    pub const DEFAULT_DPI: f64 = 72.0;

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Build from a value in dots per centimeter.
    pub fn from_dots_per_cm(x: f64, y: f64) -> Self {
        Self {
            x: x * 2.54,
            y: y * 2.54,
        }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DPI, Self::DEFAULT_DPI)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
