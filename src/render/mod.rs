//! Compositing of a part set into a flattened canvas.

/// Straight-alpha pixel compositing primitives.
pub mod composite;
/// `compose`: layout, paste, flatten and frame assembly.
pub mod pipeline;
