//! Error types shared across Plume crates.
//!
//! Field and tensor construction errors live here, together with the
//! errors an inference backend may report through
//! [`InferenceModel`](crate::InferenceModel).

use std::error::Error;
use std::fmt;

/// Errors from constructing or reshaping fields and tensors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldError {
    /// The value buffer does not match the declared shape.
    ShapeMismatch {
        /// Element count implied by the shape.
        expected: usize,
        /// Length of the supplied buffer.
        got: usize,
    },
    /// A quantity identifier could not be split into name and unit.
    MalformedQuantity {
        /// The offending identifier.
        id: String,
        /// What went wrong.
        reason: String,
    },
    /// Statistics were already attached with a different `(mean, std)`.
    StatsConflict {
        /// The quantity whose statistics would have changed.
        quantity: String,
    },
    /// A channel index beyond the leading axis was requested.
    ChannelOutOfRange {
        /// Requested channel.
        index: usize,
        /// Number of channels available.
        count: usize,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch { expected, got } => {
                write!(f, "shape mismatch: expected {expected} values, got {got}")
            }
            Self::MalformedQuantity { id, reason } => {
                write!(f, "malformed quantity '{id}': {reason}")
            }
            Self::StatsConflict { quantity } => {
                write!(f, "statistics for '{quantity}' are already set and immutable")
            }
            Self::ChannelOutOfRange { index, count } => {
                write!(f, "channel {index} out of range ({count} channels)")
            }
        }
    }
}

impl Error for FieldError {}

/// Errors reported by an inference backend.
///
/// Inference is treated as a bounded, synchronous call per box: any
/// error is fatal for the run that issued it and is never retried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InferenceError {
    /// The backend failed to produce an output.
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// Input or output tensor shape differs from the fixed model shape.
    ShapeMismatch {
        /// Shape the model (or caller) expected.
        expected: Vec<usize>,
        /// Shape that was actually seen.
        got: Vec<usize>,
    },
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutionFailed { reason } => write!(f, "inference failed: {reason}"),
            Self::ShapeMismatch { expected, got } => {
                write!(f, "inference shape mismatch: expected {expected:?}, got {got:?}")
            }
        }
    }
}

impl Error for InferenceError {}
