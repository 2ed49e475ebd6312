use thiserror::Error;

use super::bits::BitVector;

pub type VdtResult<T> = Result<T, VdtError>;

/// Failures raised while building patterns or generating a decode tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VdtError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("overlapping instructions found: {}", .instructions.join(", "))]
    OverlapAmbiguity { instructions: Vec<String> },
    #[error("pattern error: {0}")]
    Pattern(String),
    #[error("encoding error: {0}")]
    Encoding(String),
}

impl VdtError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        VdtError::Validation(msg.into())
    }

    pub(crate) fn pattern(msg: impl Into<String>) -> Self {
        VdtError::Pattern(msg.into())
    }

    pub(crate) fn encoding(msg: impl Into<String>) -> Self {
        VdtError::Encoding(msg.into())
    }
}

/// A word that no path of the tree accepts. This is an ordinary decode outcome
/// (an illegal or unknown encoding), not a generation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no instruction matches 0x{word:x} ({word})")]
pub struct DecodeMiss {
    pub word: BitVector,
}
