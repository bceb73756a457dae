//! Output side: multi-page TIFF encoding and artifact sinks.

/// Multi-page TIFF writer.
pub mod multipage;
/// Sink trait and built-in sinks.
pub mod sink;
