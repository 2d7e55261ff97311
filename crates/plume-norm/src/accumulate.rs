//! Streaming mean / standard deviation over many runs.

use plume_core::NormStats;

use crate::error::{check_usable, NormError};

/// Welford accumulator for one quantity across a whole dataset.
///
/// Values can arrive run by run; partial accumulators from independent
/// workers combine with [`merge`](Self::merge). The standard deviation
/// is the sample (Bessel-corrected) estimate.
#[derive(Clone, Debug)]
pub struct StatsAccumulator {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Default for StatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsAccumulator {
    /// An empty accumulator.
    pub fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Add one value.
    pub fn push(&mut self, value: f32) {
        let x = value as f64;
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
        self.min = self.min.min(x);
        self.max = self.max.max(x);
    }

    /// Add every value of a slice.
    pub fn extend(&mut self, values: &[f32]) {
        for &v in values {
            self.push(v);
        }
    }

    /// Fold another accumulator into this one (Chan et al. combination).
    pub fn merge(&mut self, other: &StatsAccumulator) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other.clone();
            return;
        }
        let n_a = self.count as f64;
        let n_b = other.count as f64;
        let n = n_a + n_b;
        let delta = other.mean - self.mean;
        self.mean += delta * n_b / n;
        self.m2 += other.m2 + delta * delta * n_a * n_b / n;
        self.count += other.count;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Number of values seen.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Smallest value seen, if any.
    pub fn min(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min)
    }

    /// Largest value seen, if any.
    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }

    /// Final statistics for `quantity`.
    ///
    /// Fails with [`NormError::ZeroStd`] for a constant quantity and
    /// [`NormError::InsufficientSamples`] below two values.
    pub fn finish(&self, quantity: &str) -> Result<NormStats, NormError> {
        if self.count < 2 {
            return Err(NormError::InsufficientSamples {
                quantity: quantity.to_string(),
                count: self.count,
            });
        }
        let std = (self.m2 / (self.count - 1) as f64).sqrt();
        check_usable(quantity, self.mean, std)?;
        Ok(NormStats::new(self.mean, std))
    }
}

/// Fit `(mean, std)` of `quantity` over a single buffer.
pub fn fit(quantity: &str, values: &[f32]) -> Result<NormStats, NormError> {
    let mut acc = StatsAccumulator::new();
    acc.extend(values);
    acc.finish(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sample_std_of_known_values() {
        // mean 5, sample variance 32/7
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let s = fit("x", &values).unwrap();
        assert!((s.mean - 5.0).abs() < 1e-12);
        assert!((s.std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn constant_quantity_is_zero_std() {
        assert_eq!(
            fit("Material_ID", &[1.0; 10]),
            Err(NormError::ZeroStd {
                quantity: "Material_ID".into()
            })
        );
    }

    #[test]
    fn single_value_is_insufficient() {
        assert!(matches!(
            fit("x", &[3.0]),
            Err(NormError::InsufficientSamples { count: 1, .. })
        ));
    }

    #[test]
    fn nan_is_non_finite() {
        assert!(matches!(
            fit("x", &[1.0, f32::NAN, 2.0]),
            Err(NormError::NonFinite { .. })
        ));
    }

    #[test]
    fn min_max_tracked() {
        let mut acc = StatsAccumulator::new();
        assert_eq!(acc.min(), None);
        acc.extend(&[3.0, -1.0, 8.0]);
        assert_eq!(acc.min(), Some(-1.0));
        assert_eq!(acc.max(), Some(8.0));
    }

    proptest! {
        #[test]
        fn merge_matches_single_pass(
            a in prop::collection::vec(-100.0f32..100.0, 1..50),
            b in prop::collection::vec(-100.0f32..100.0, 1..50),
        ) {
            let mut whole = StatsAccumulator::new();
            whole.extend(&a);
            whole.extend(&b);

            let mut left = StatsAccumulator::new();
            left.extend(&a);
            let mut right = StatsAccumulator::new();
            right.extend(&b);
            left.merge(&right);

            prop_assert_eq!(left.count(), whole.count());
            prop_assert!((left.mean - whole.mean).abs() < 1e-9);
            prop_assert!((left.m2 - whole.m2).abs() < 1e-6 * (1.0 + whole.m2.abs()));
        }
    }
}
