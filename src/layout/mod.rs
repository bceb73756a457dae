/// Cross-motif canvas sizing and placement.
pub mod solver;
