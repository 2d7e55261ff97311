//! Error types for grid and window operations.

use plume_core::{Coord, Shape};
use std::fmt;

/// Errors arising from extents, windows and marker location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpaceError {
    /// A window would leave the grid, so extraction is ill-defined.
    OutOfBounds {
        /// Window origin in grid coordinates.
        origin: Coord,
        /// Window shape.
        shape: Shape,
        /// Grid dimensions.
        extent: Shape,
    },
    /// A window specification is unusable.
    InvalidWindow {
        /// What went wrong.
        reason: String,
    },
    /// An extent with no axes or a zero-length axis.
    EmptyExtent,
    /// Two objects of different dimensionality were combined.
    DimensionMismatch {
        /// Dimensionality that was required.
        expected: usize,
        /// Dimensionality that was supplied.
        got: usize,
    },
    /// A data buffer does not cover the grid it is said to describe.
    DataLengthMismatch {
        /// Cell count of the grid.
        expected: usize,
        /// Length of the buffer.
        got: usize,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds {
                origin,
                shape,
                extent,
            } => write!(
                f,
                "window at {origin:?} with shape {shape:?} exceeds grid extent {extent:?}"
            ),
            Self::InvalidWindow { reason } => write!(f, "invalid window: {reason}"),
            Self::EmptyExtent => write!(f, "grid extent must have at least one cell"),
            Self::DimensionMismatch { expected, got } => {
                write!(f, "expected {expected}D, got {got}D")
            }
            Self::DataLengthMismatch { expected, got } => {
                write!(f, "buffer length {got} does not match {expected} grid cells")
            }
        }
    }
}

impl std::error::Error for SpaceError {}
