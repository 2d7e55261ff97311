//! Error types for statistics fitting and normalization.

use plume_core::FieldError;
use std::fmt;

/// Errors from fitting, storing or applying standardization statistics.
#[derive(Clone, Debug, PartialEq)]
pub enum NormError {
    /// The quantity's standard deviation is zero: every value is the
    /// same, and standardizing would divide by zero.
    ZeroStd {
        /// The degenerate quantity.
        quantity: String,
    },
    /// Mean or standard deviation is NaN or infinite.
    NonFinite {
        /// The affected quantity.
        quantity: String,
        /// Offending mean.
        mean: f64,
        /// Offending standard deviation.
        std: f64,
    },
    /// Too few values to estimate a sample standard deviation.
    InsufficientSamples {
        /// The affected quantity.
        quantity: String,
        /// Number of values seen.
        count: u64,
    },
    /// No statistics are recorded for the quantity.
    UnknownQuantity {
        /// The requested quantity.
        quantity: String,
    },
    /// A table already holds different statistics for the quantity.
    Conflict {
        /// The affected quantity.
        quantity: String,
    },
    /// The process-wide table was already installed.
    AlreadyInstalled,
    /// A field rejected the statistics.
    Field(FieldError),
}

impl fmt::Display for NormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroStd { quantity } => {
                write!(f, "standard deviation of '{quantity}' is zero")
            }
            Self::NonFinite {
                quantity,
                mean,
                std,
            } => write!(
                f,
                "non-finite statistics for '{quantity}': mean={mean}, std={std}"
            ),
            Self::InsufficientSamples { quantity, count } => {
                write!(f, "'{quantity}' has {count} samples, need at least 2")
            }
            Self::UnknownQuantity { quantity } => {
                write!(f, "no statistics recorded for '{quantity}'")
            }
            Self::Conflict { quantity } => {
                write!(f, "conflicting statistics for '{quantity}'")
            }
            Self::AlreadyInstalled => write!(f, "process-wide statistics already installed"),
            Self::Field(e) => write!(f, "field: {e}"),
        }
    }
}

impl std::error::Error for NormError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Field(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FieldError> for NormError {
    fn from(e: FieldError) -> Self {
        Self::Field(e)
    }
}

/// Check that `stats` can be used to standardize `quantity`.
pub(crate) fn check_usable(quantity: &str, mean: f64, std: f64) -> Result<(), NormError> {
    if !mean.is_finite() || !std.is_finite() {
        return Err(NormError::NonFinite {
            quantity: quantity.to_string(),
            mean,
            std,
        });
    }
    if std == 0.0 {
        return Err(NormError::ZeroStd {
            quantity: quantity.to_string(),
        });
    }
    Ok(())
}
