use std::fmt;

use crate::foundation::core::Role;

/// Convenience result type used across crossmerge.
pub type MergeResult<T> = Result<T, MergeError>;

/// Pipeline stage in which a per-set processing failure happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Reading pixel data and metadata from the six input files.
    Decode,
    /// Layout and compositing.
    Compose,
    /// Writing the multi-frame artifact.
    Write,
    /// A panic was caught at the per-set boundary.
    Panic,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Decode => "decode",
            Stage::Compose => "compose",
            Stage::Write => "write",
            Stage::Panic => "panic",
        };
        f.write_str(s)
    }
}

/// Top-level error taxonomy used by crossmerge APIs.
///
/// The two per-set variants render as the exact diagnostic lines printed by the batch driver.
#[derive(thiserror::Error, Debug)]
pub enum MergeError {
    /// One or more of the six inputs is missing or not RGB without alpha.
    #[error("Skipping {base} - Incomplete set of images or non-RGB format.")]
    IncompleteSet {
        /// Base name of the rejected set.
        base: String,
        /// Roles whose file does not exist.
        missing: Vec<Role>,
        /// Roles whose file exists but is not 3-channel RGB.
        non_rgb: Vec<Role>,
    },

    /// Any fault after validation passed.
    #[error("Error processing {base}: {detail}")]
    Processing {
        /// Base name of the failed set.
        base: String,
        /// Stage that failed.
        stage: Stage,
        /// Rendered underlying cause, including its context chain.
        detail: String,
    },

    /// Invalid options or inconsistent input data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Unsupported or malformed image data.
    #[error("codec error: {0}")]
    Codec(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MergeError {
    /// Build a [`MergeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MergeError::Codec`] value.
    pub fn codec(msg: impl Into<String>) -> Self {
        Self::Codec(msg.into())
    }

    /// Wrap `err` as a [`MergeError::Processing`] failure for `base`.
    ///
    /// Already-wrapped per-set errors are returned unchanged.
    pub fn processing(base: impl Into<String>, stage: Stage, err: MergeError) -> Self {
        match err {
            e @ (MergeError::Processing { .. } | MergeError::IncompleteSet { .. }) => e,
            e => Self::Processing {
                base: base.into(),
                stage,
                detail: format!("{e:#}"),
            },
        }
    }

    /// Base name this error is attached to, for per-set variants.
    pub fn base(&self) -> Option<&str> {
        match self {
            MergeError::IncompleteSet { base, .. } | MergeError::Processing { base, .. } => {
                Some(base)
            }
            _ => None,
        }
    }

    /// `true` for the skip (rejected set) variant.
    pub fn is_skip(&self) -> bool {
        matches!(self, MergeError::IncompleteSet { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
