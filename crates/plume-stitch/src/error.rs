//! Error types for stitching.

use std::fmt;

use crate::method::StitchMethod;

/// Errors from configuring or running a [`Stitcher`](crate::Stitcher).
#[derive(Clone, Debug, PartialEq)]
pub enum StitchError {
    /// Only `max` with a background of `0.0` is supported for
    /// preparing datasets.
    UnsupportedConfig {
        /// Requested method.
        method: StitchMethod,
        /// Requested background value.
        background: f32,
    },
    /// A stitching method name that is not recognised.
    UnknownMethod {
        /// The name as given.
        name: String,
    },
    /// The background value is NaN or infinite.
    NonFiniteBackground,
    /// A layer's values or mask do not cover the target grid.
    LayerLength {
        /// Position of the layer in the input slice.
        layer: usize,
        /// Cells in the target.
        expected: usize,
        /// Length that was supplied.
        got: usize,
    },
}

impl fmt::Display for StitchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedConfig { method, background } => write!(
                f,
                "unsupported stitching config: method={method}, background={background} \
                 (only max with background 0 is supported)"
            ),
            Self::UnknownMethod { name } => write!(f, "unknown stitching method '{name}'"),
            Self::NonFiniteBackground => write!(f, "background value must be finite"),
            Self::LayerLength {
                layer,
                expected,
                got,
            } => write!(f, "layer {layer} has length {got}, expected {expected}"),
        }
    }
}

impl std::error::Error for StitchError {}
