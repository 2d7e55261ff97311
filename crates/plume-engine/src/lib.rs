//! Stage-2 dataset preparation for heat-pump surrogates.
//!
//! A [`Domain`] holds one simulation run on its full grid. It locates
//! the heat pumps, cuts a fixed-size [`HeatPumpBox`] around each, and
//! the [`pipeline`] runs the stage-1 model on every box before
//! stitching each box's neighbours into a second input channel.
//!
//! # Architecture
//!
//! - [`PrepareConfig`] is validated once; [`DatasetContext`] carries it
//!   together with the dataset's statistics to every worker
//! - [`prepare_dataset`] spreads runs over a worker pool and writes the
//!   prepared dataset, its metadata and a measurements document
//! - [`merge_separate_inputs`] collapses a prepared dataset to one input
//!   channel; [`fit_dataset_info`] computes statistics for a training set

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod fit;
pub mod heat_pump;
pub mod merge;
pub mod metrics;
pub mod pipeline;

pub use config::{ConfigError, PrepareConfig};
pub use context::DatasetContext;
pub use domain::Domain;
pub use error::{DomainError, PrepareError};
pub use fit::fit_dataset_info;
pub use heat_pump::HeatPumpBox;
pub use merge::merge_separate_inputs;
pub use metrics::RunMetrics;
pub use pipeline::{
    finish_boxes, infer_primaries, prepare_dataset, prepare_run, separate_inputs_info,
    stitch_others, PrepareReport, RunOutcome, RunReport,
};
