//! Error types for grid construction and stepping.

use thiserror::Error;

use crate::chunk::ChunkState;

/// Errors that can occur while building or mutating a grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// Rank, emptiness or layout problem in the constructor inputs.
    #[error("invalid grid input: {0}")]
    Validation(String),

    /// An array does not have the shape the grid layout requires.
    #[error("{what} has shape {found:?}, expected {expected}")]
    ShapeMismatch {
        what: String,
        expected: String,
        found: Vec<usize>,
    },

    /// Mesh name other than "spherical" or "flat".
    #[error("unknown mesh '{0}', expected 'spherical' or 'flat'")]
    InvalidMesh(String),

    /// Non-finite or decreasing time samples.
    #[error("invalid time axis: {0}")]
    InvalidTime(String),

    /// Halo request that cannot be applied to this grid.
    #[error("invalid halo: {0}")]
    InvalidHalo(String),

    /// Chunk state change not allowed by the loading protocol.
    #[error("chunk {index}: transition {from:?} -> {to:?} is not allowed")]
    InvalidChunkTransition {
        index: usize,
        from: ChunkState,
        to: ChunkState,
    },

    /// Chunk index outside the configured layout.
    #[error("chunk index {index} out of range for {len} chunks")]
    ChunkIndexOutOfRange { index: usize, len: usize },

    /// Time origin conversion failure.
    #[error("calendar error: {0}")]
    Calendar(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl GridError {
    /// Create a Validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(
        what: impl Into<String>,
        expected: impl Into<String>,
        found: &[usize],
    ) -> Self {
        Self::ShapeMismatch {
            what: what.into(),
            expected: expected.into(),
            found: found.to_vec(),
        }
    }

    /// Create an InvalidTime error.
    pub fn invalid_time(msg: impl Into<String>) -> Self {
        Self::InvalidTime(msg.into())
    }

    /// Create an InvalidHalo error.
    pub fn invalid_halo(msg: impl Into<String>) -> Self {
        Self::InvalidHalo(msg.into())
    }

    /// Create a Calendar error.
    pub fn calendar(msg: impl Into<String>) -> Self {
        Self::Calendar(msg.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<ndarray::ShapeError> for GridError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
