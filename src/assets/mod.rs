//! Input side: locating, validating and decoding the six source images of a set.

/// TIFF header probing and RGB decoding.
pub mod decode;
/// Base-name discovery, path conventions and pre-decode validation.
pub mod inputs;
