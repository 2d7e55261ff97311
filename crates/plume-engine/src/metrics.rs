//! Per-run timing metrics.
//!
//! [`RunMetrics`] captures where one run spent its time. The pipeline
//! folds them into the dataset's measurements document.

use std::time::Duration;

use plume_store::RunTiming;

/// Timing collected while preparing a single run.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunMetrics {
    /// Loading the domain and cutting boxes.
    pub domain_us: u64,
    /// All inference calls of the run.
    pub inference_us: u64,
    /// Stitching, renormalizing and saving.
    pub stitch_us: u64,
    /// Wall-clock time of the whole run.
    pub total_us: u64,
    /// Inference calls made.
    pub inferences: u32,
    /// Boxes written.
    pub boxes: u32,
}

pub(crate) fn micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

fn secs(us: u64) -> f64 {
    us as f64 / 1e6
}

impl RunMetrics {
    /// The document form of these metrics.
    pub fn to_timing(&self, run_id: &str, outcome: &str) -> RunTiming {
        RunTiming {
            run_id: run_id.to_string(),
            outcome: outcome.to_string(),
            boxes: self.boxes as usize,
            domain_secs: secs(self.domain_us),
            inference_secs: secs(self.inference_us),
            stitch_secs: secs(self.stitch_us),
            total_secs: secs(self.total_us),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = RunMetrics::default();
        assert_eq!(m.total_us, 0);
        assert_eq!(m.inferences, 0);
        assert_eq!(m.boxes, 0);
    }

    #[test]
    fn timing_in_seconds() {
        let m = RunMetrics {
            domain_us: 1_500_000,
            inference_us: 250_000,
            boxes: 2,
            ..RunMetrics::default()
        };
        let t = m.to_timing("RUN_1", "prepared");
        assert_eq!(t.run_id, "RUN_1");
        assert_eq!(t.boxes, 2);
        assert!((t.domain_secs - 1.5).abs() < 1e-12);
        assert!((t.inference_secs - 0.25).abs() < 1e-12);
        assert_eq!(micros(Duration::from_millis(3)), 3000);
    }
}
