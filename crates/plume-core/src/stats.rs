//! The `(mean, std)` pair captured once per quantity per dataset.

use serde::{Deserialize, Serialize};

/// Standardization statistics of one quantity.
///
/// Computed once over a training dataset and reused unchanged for every
/// run that shares the dataset, so that normalize/denormalize round
/// trips are exact across runs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormStats {
    /// Mean over all values of the quantity in the training dataset.
    pub mean: f64,
    /// Standard deviation over the same values.
    pub std: f64,
}

impl NormStats {
    /// Construct a statistics pair.
    pub fn new(mean: f64, std: f64) -> Self {
        Self { mean, std }
    }

    /// Whether both components are finite and `std` is non-zero.
    pub fn is_usable(&self) -> bool {
        self.mean.is_finite() && self.std.is_finite() && self.std != 0.0
    }
}
