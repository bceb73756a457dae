//! crossmerge composites six related scans into one cross-shaped, multi-page TIFF.
//!
//! Each input set shares a base name and consists of a center image (`_o`), four limb images
//! (`_te`, `_le`, `_re`, `_be`) and a reference strip (`_r`). For every complete set:
//!
//! 1. **Validate**: all six files exist and are RGB without alpha (headers only, no pixel decode)
//! 2. **Decode**: convert each image to RGBA8 and read the center image's resolution
//! 3. **Compose**: size a canvas, place the parts in a plus-sign motif, paste them back to
//!    front and flatten onto opaque black ([`compose`])
//! 4. **Write**: emit the flattened composite plus the six originals as pages of one TIFF
//!
//! Sets are independent. A missing or non-RGB input skips the set; any other fault fails only
//! that set. [`run_batch`] drives a whole directory and reports one [`SetOutcome`] per set.
#![forbid(unsafe_code)]

mod assets;
mod composition;
mod encode;
mod foundation;
mod layout;
mod render;
mod session;

pub use assets::decode::{
    PartHeader, PixelLayout, decode_part, decode_part_file, probe_part, probe_part_file,
};
pub use assets::inputs::{PartPaths, discover_base_names, load_part_set, validate_part_paths};
pub use composition::model::{Part, PartSet};
pub use encode::multipage::{PageCompression, write_artifact_tiff};
pub use encode::sink::{ArtifactSink, InMemorySink, TiffSink};
pub use foundation::core::{Offset, Resolution, Role, RoleMap, Size};
pub use foundation::error::{MergeError, MergeResult, Stage};
pub use layout::solver::{CrossLayout, cell_size, resolve_cross_layout};
pub use render::composite::{StraightRgba8, over, over_in_place, paste_over};
pub use render::pipeline::{Artifact, BACKGROUND_RGBA, compose};
pub use session::batch::{
    BatchOpts, BatchReport, DEFAULT_OUT_DIR, SetOutcome, process_set, run_batch, run_batch_with,
};
