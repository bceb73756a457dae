use image::RgbaImage;

use crate::foundation::core::{Resolution, Role, RoleMap, Size};
use crate::foundation::error::{MergeError, MergeResult};

/// One decoded input image, already promoted to RGBA8.
#[derive(Clone, Debug, PartialEq)]
pub struct Part {
    /// Straight-alpha RGBA8 pixels.
    pub pixels: RgbaImage,
    /// Resolution stored in the source file, if any.
    pub resolution: Option<Resolution>,
}

impl Part {
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            pixels,
            resolution: None,
        }
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }
}

/// The complete collection of six role-to-image mappings for one base name.
///
/// A `PartSet` always holds all six roles; there is no partial state.
#[derive(Clone, Debug, PartialEq)]
pub struct PartSet {
    parts: RoleMap<Part>,
}

impl PartSet {
    /// Build from a role-indexed map.
    pub fn new(parts: RoleMap<Part>) -> Self {
        Self { parts }
    }

    /// Build from `(role, part)` pairs. Every role must appear exactly once.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Role, Part)>) -> MergeResult<Self> {
        let mut slots: [Option<Part>; 6] = Default::default();
        for (role, part) in pairs {
            let slot = &mut slots[role.index()];
            if slot.is_some() {
                return Err(MergeError::validation(format!(
                    "part set has duplicate role '{role}'"
                )));
            }
            *slot = Some(part);
        }
        let parts = RoleMap::try_from_fn(|role| {
            slots[role.index()]
                .take()
                .ok_or_else(|| MergeError::validation(format!("part set is missing role '{role}'")))
        })?;
        Ok(Self { parts })
    }

    pub fn get(&self, role: Role) -> &Part {
        self.parts.get(role)
    }

    /// Resolution propagated to the output: the center image's, or the default.
    pub fn resolution(&self) -> Resolution {
        self.get(Role::Center).resolution.unwrap_or_default()
    }

    pub fn sizes(&self) -> RoleMap<Size> {
        RoleMap::from_fn(|role| self.get(role).size())
    }

    pub fn into_parts(self) -> RoleMap<Part> {
        self.parts
    }
}

impl std::ops::Index<Role> for PartSet {
    type Output = Part;

    fn index(&self, role: Role) -> &Part {
        self.get(role)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/model.rs"]
mod tests;
