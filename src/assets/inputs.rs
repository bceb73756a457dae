use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    assets::decode::{decode_part_file, probe_part_file},
    composition::model::PartSet,
    foundation::core::{Role, RoleMap},
    foundation::error::{MergeError, MergeResult},
};

/// The six input paths for one base name: `{dir}/{base}_{suffix}.{ext}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartPaths {
    base: String,
    paths: RoleMap<PathBuf>,
}

impl PartPaths {
    pub fn new(dir: &Path, base: &str, ext: &str) -> Self {
        Self {
            base: base.to_string(),
            paths: RoleMap::from_fn(|role| dir.join(format!("{base}_{}.{ext}", role.suffix()))),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn path(&self, role: Role) -> &Path {
        self.paths.get(role)
    }
}

/// Base names of every `{base}_o.{ext}` file in `dir`, sorted.
///
/// Symlinks are followed; a link to a regular file counts as one.
pub fn discover_base_names(dir: &Path, ext: &str) -> MergeResult<Vec<String>> {
    let suffix = format!("_{}.{ext}", Role::Center.suffix());
    let entries =
        fs::read_dir(dir).with_context(|| format!("read input dir '{}'", dir.display()))?;

    let mut bases = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read entry in '{}'", dir.display()))?;
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(base) = name.strip_suffix(&suffix)
            && !base.is_empty()
        {
            bases.push(base.to_string());
        }
    }
    bases.sort();
    Ok(bases)
}

/// Check that all six inputs exist and are 3-channel RGB, reading headers only.
///
/// Existence is checked for every role before any header is opened. A header that cannot be
/// read at all is an error, not a rejection.
pub fn validate_part_paths(paths: &PartPaths) -> MergeResult<()> {
    let missing: Vec<Role> = Role::ALL
        .into_iter()
        .filter(|r| !paths.path(*r).is_file())
        .collect();
    if !missing.is_empty() {
        return Err(MergeError::IncompleteSet {
            base: paths.base().to_string(),
            missing,
            non_rgb: Vec::new(),
        });
    }

    let mut non_rgb = Vec::new();
    for role in Role::ALL {
        let header = probe_part_file(paths.path(role))?;
        if !header.layout.is_rgb() {
            non_rgb.push(role);
        }
    }
    if !non_rgb.is_empty() {
        return Err(MergeError::IncompleteSet {
            base: paths.base().to_string(),
            missing: Vec::new(),
            non_rgb,
        });
    }
    Ok(())
}

/// Decode all six validated inputs.
pub fn load_part_set(paths: &PartPaths) -> MergeResult<PartSet> {
    let parts = RoleMap::try_from_fn(|role| decode_part_file(paths.path(role)))?;
    Ok(PartSet::new(parts))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/inputs.rs"]
mod tests;
