//! Preparation measurements (`measurements.json`).

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Timing of one run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunTiming {
    /// The run.
    pub run_id: String,
    /// `prepared`, `skipped` or `failed`.
    pub outcome: String,
    /// Boxes written for this run.
    pub boxes: usize,
    /// Loading the domain and cutting boxes, in seconds.
    pub domain_secs: f64,
    /// Inference over all boxes, in seconds.
    pub inference_secs: f64,
    /// Stitching and saving, in seconds.
    pub stitch_secs: f64,
    /// Whole run, in seconds.
    pub total_secs: f64,
}

/// What a preparation did and how long it took.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    /// Start, RFC 3339.
    pub begin: String,
    /// End, RFC 3339; `None` while running.
    pub end: Option<String>,
    /// Source dataset location.
    pub source: String,
    /// Destination dataset location.
    pub destination: String,
    /// Name of the stage-1 model, if inference was run.
    pub model: Option<String>,
    /// Input channels fed to the model, in order.
    #[serde(default)]
    pub model_inputs: Vec<String>,
    /// Stitching method used.
    pub stitching_method: String,
    /// Worker threads.
    pub workers: usize,
    /// Runs that produced boxes.
    pub runs_prepared: usize,
    /// Runs skipped (no heat pump, or a box left the grid).
    pub runs_skipped: usize,
    /// Runs that failed.
    pub runs_failed: usize,
    /// Boxes written in total.
    pub boxes: usize,
    /// Mean inference time per box, in seconds.
    pub avg_inference_secs: Option<f64>,
    /// Summed domain preparation time, in seconds.
    pub domain_prep_secs: f64,
    /// Wall-clock time of the whole preparation, in seconds.
    pub total_secs: f64,
    /// Per-run timings in run order.
    pub per_run: Vec<RunTiming>,
    /// Measurements of the preparation this one was derived from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<Box<Measurements>>,
}

/// Current time as RFC 3339 with millisecond precision.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl Measurements {
    /// Start a record now.
    pub fn begin(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            begin: timestamp_now(),
            source: source.into(),
            destination: destination.into(),
            ..Self::default()
        }
    }

    /// Stamp the end time.
    pub fn finish(&mut self) {
        self.end = Some(timestamp_now());
    }

    /// Runs seen in total.
    pub fn runs_total(&self) -> usize {
        self.runs_prepared + self.runs_skipped + self.runs_failed
    }
}
