/// Batch driver over a directory of input sets.
pub mod batch;
