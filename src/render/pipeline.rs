use std::collections::BTreeMap;

use image::{Rgba, RgbaImage};

use crate::{
    composition::model::PartSet,
    foundation::core::{Resolution, Role, Size},
    foundation::error::MergeResult,
    layout::solver::{CrossLayout, resolve_cross_layout},
    render::composite::{over_in_place, paste_over},
};

/// Opaque background the composited canvas is flattened onto.
pub const BACKGROUND_RGBA: [u8; 4] = [0, 0, 0, 255];

/// Multi-frame output for one part set.
///
/// Frame 0 is the flattened composite; frames 1..=6 are the original parts in
/// [`Role::LAYER_ORDER`], unresized.
#[derive(Clone, Debug, PartialEq)]
pub struct Artifact {
    /// Composite of all six parts over an opaque background.
    pub flattened: RgbaImage,
    /// Original parts in layer order.
    pub layers: Vec<(Role, RgbaImage)>,
    /// Resolution written to every page.
    pub resolution: Resolution,
    /// Layout used for the composite.
    pub layout: CrossLayout,
}

impl Artifact {
    /// All seven frames, flattened composite first.
    pub fn frames(&self) -> impl Iterator<Item = &RgbaImage> {
        std::iter::once(&self.flattened).chain(self.layers.iter().map(|(_, img)| img))
    }

    pub fn frame_count(&self) -> usize {
        1 + self.layers.len()
    }

    pub fn canvas_size(&self) -> Size {
        self.layout.canvas
    }
}

/// Lay out, composite and flatten a complete part set.
///
/// Parts are pasted back to front in [`Role::LAYER_ORDER`] onto a transparent canvas, which is
/// then flattened over [`BACKGROUND_RGBA`]. The parts are moved into the artifact's layer frames.
#[tracing::instrument(skip(parts))]
pub fn compose(parts: PartSet) -> MergeResult<Artifact> {
    let layout = resolve_cross_layout(&parts.sizes())?;
    let resolution = parts.resolution();

    let mut canvas = RgbaImage::new(layout.canvas.width, layout.canvas.height);
    for role in Role::LAYER_ORDER {
        paste_over(&mut canvas, &parts[role].pixels, layout.offset_for(role));
    }

    let mut flattened = RgbaImage::from_pixel(
        layout.canvas.width,
        layout.canvas.height,
        Rgba(BACKGROUND_RGBA),
    );
    over_in_place(&mut flattened, &canvas)?;

    let mut by_role: BTreeMap<Role, RgbaImage> = parts
        .into_parts()
        .into_pairs()
        .map(|(role, part)| (role, part.pixels))
        .collect();
    let layers = Role::LAYER_ORDER
        .into_iter()
        .filter_map(|role| by_role.remove(&role).map(|img| (role, img)))
        .collect();

    Ok(Artifact {
        flattened,
        layers,
        resolution,
        layout,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
