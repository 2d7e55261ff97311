//! Stage-2 preparation: per-run phases and the worker pool over runs.
//!
//! Within a run the work is split into three phases with a barrier
//! between the first two:
//!
//! 1. [`infer_primaries`]: every box gets its own prediction, converted
//!    back to physical units.
//! 2. [`stitch_others`]: every box gets the stitched predictions of its
//!    neighbours, computed from an immutable view of phase 1.
//! 3. [`finish_boxes`]: both fields are standardized again and saved.
//!
//! Runs are independent and are spread over a pool of worker threads by
//! [`prepare_dataset`].

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use plume_core::{InferenceModel, PhysicalField};
use plume_stitch::Stitcher;
use plume_store::{DatasetInfo, Measurements, RunStore, VariableInfo};
use tracing::{debug, info, warn};

use crate::config::PrepareConfig;
use crate::context::DatasetContext;
use crate::domain::Domain;
use crate::error::PrepareError;
use crate::heat_pump::{HeatPumpBox, OTHER_PREFIX, PRIMARY_PREFIX};
use crate::metrics::{micros, RunMetrics};

/// What happened to one run.
#[derive(Debug)]
pub enum RunOutcome {
    /// Boxes were written.
    Prepared {
        /// Number of boxes.
        boxes: usize,
    },
    /// No heat pump, or a box left the grid; nothing was written.
    Skipped,
    /// The run failed; other runs were unaffected.
    Failed(PrepareError),
}

impl RunOutcome {
    /// Short label used in measurements.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Prepared { .. } => "prepared",
            Self::Skipped => "skipped",
            Self::Failed(_) => "failed",
        }
    }
}

/// Outcome and timing of one run.
#[derive(Debug)]
pub struct RunReport {
    /// The run.
    pub run_id: String,
    /// What happened.
    pub outcome: RunOutcome,
    /// Where the time went.
    pub metrics: RunMetrics,
}

/// Aggregate result of [`prepare_dataset`].
#[derive(Debug)]
pub struct PrepareReport {
    /// One entry per run, in run order.
    pub runs: Vec<RunReport>,
    /// The measurements document that was written.
    pub measurements: Measurements,
}

impl PrepareReport {
    /// Runs that produced boxes.
    pub fn prepared(&self) -> usize {
        self.count(|o| matches!(o, RunOutcome::Prepared { .. }))
    }

    /// Runs that were skipped.
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RunOutcome::Skipped))
    }

    /// Runs that failed.
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, RunOutcome::Failed(_)))
    }

    /// Boxes written over all runs.
    pub fn boxes(&self) -> usize {
        self.runs
            .iter()
            .map(|r| match r.outcome {
                RunOutcome::Prepared { boxes } => boxes,
                _ => 0,
            })
            .sum()
    }

    fn count(&self, pred: impl Fn(&RunOutcome) -> bool) -> usize {
        self.runs.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Phase 1: predict every box and convert the prediction to physical
/// units with the label statistics of the property.
pub fn infer_primaries(
    domain: &Domain,
    boxes: &mut [HeatPumpBox],
    model: &dyn InferenceModel,
    metrics: &mut RunMetrics,
) -> Result<(), PrepareError> {
    let property = domain.context().property().clone();
    for b in boxes.iter_mut() {
        let start = Instant::now();
        let predicted = b.apply_nn(model, &property)?;
        metrics.inference_us += micros(start.elapsed());
        metrics.inferences += 1;
        b.set_primary(domain.reverse_norm(predicted, property.id())?);
    }
    Ok(())
}

/// Phase 2: stitch every box's neighbours.
///
/// All stitched fields are computed from the same immutable slice and
/// written back only afterwards, so no box sees a partially stitched
/// neighbour.
pub fn stitch_others(boxes: &mut [HeatPumpBox], stitcher: &Stitcher) -> Result<(), PrepareError> {
    let view: &[HeatPumpBox] = boxes;
    let others = view
        .iter()
        .map(|b| b.get_other_temp_field(view, stitcher))
        .collect::<Result<Vec<PhysicalField>, PrepareError>>()?;
    for (b, other) in boxes.iter_mut().zip(others) {
        b.set_other(other);
    }
    Ok(())
}

/// Phase 3: standardize both fields of every box and save it.
///
/// Returns the number of boxes written.
pub fn finish_boxes(
    domain: &Domain,
    boxes: &mut [HeatPumpBox],
    destination: &dyn RunStore,
) -> Result<usize, PrepareError> {
    let property = domain.context().property().id().to_string();
    for b in boxes.iter_mut() {
        let index = b.index();
        let primary = b.take_primary().ok_or(PrepareError::PrimaryMissing { index })?;
        let other = b.take_other().ok_or(PrepareError::OtherMissing { index })?;
        b.set_primary(domain.norm(primary, &property)?);
        b.set_other(domain.norm(other, &property)?);
        let key = b.save(destination, domain.run_id())?;
        debug!(run_id = domain.run_id(), key = %key, "box saved");
    }
    Ok(boxes.len())
}

fn run_phases(
    source: &dyn RunStore,
    destination: &dyn RunStore,
    run_id: &str,
    ctx: Arc<DatasetContext>,
    model: &dyn InferenceModel,
    metrics: &mut RunMetrics,
) -> Result<RunOutcome, PrepareError> {
    let start = Instant::now();
    let mut domain = Domain::load(source, run_id, ctx)?;
    let mut boxes = domain.extract_hp_boxes()?;
    metrics.domain_us = micros(start.elapsed());
    if domain.is_skipped() {
        return Ok(RunOutcome::Skipped);
    }

    infer_primaries(&domain, &mut boxes, model, metrics)?;

    let start = Instant::now();
    stitch_others(&mut boxes, &domain.context().stitcher())?;
    let written = finish_boxes(&domain, &mut boxes, destination)?;
    metrics.stitch_us = micros(start.elapsed());
    metrics.boxes = u32::try_from(written).unwrap_or(u32::MAX);
    Ok(RunOutcome::Prepared { boxes: written })
}

/// Prepare one run: load, cut, predict, stitch and save.
///
/// Never fails as a whole; failures are reported in the outcome so the
/// caller can continue with other runs.
pub fn prepare_run(
    source: &dyn RunStore,
    destination: &dyn RunStore,
    run_id: &str,
    ctx: Arc<DatasetContext>,
    model: &dyn InferenceModel,
) -> RunReport {
    let start = Instant::now();
    let mut metrics = RunMetrics::default();
    let outcome = match run_phases(source, destination, run_id, ctx, model, &mut metrics) {
        Ok(RunOutcome::Skipped) => {
            warn!(run_id, "skipping run");
            RunOutcome::Skipped
        }
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(run_id, error = %e, "run failed");
            RunOutcome::Failed(e)
        }
    };
    metrics.total_us = micros(start.elapsed());
    RunReport {
        run_id: run_id.to_string(),
        outcome,
        metrics,
    }
}

/// Metadata of the prepared dataset: two inputs, the box's own
/// prediction and its stitched neighbours, both carrying the label
/// statistics of the property; labels as in the source.
pub fn separate_inputs_info(ctx: &DatasetContext) -> Result<DatasetInfo, PrepareError> {
    let property = ctx.property();
    let stats = ctx.label_table().require(property.id())?;
    let mut info = DatasetInfo {
        labels: ctx.info().labels.clone(),
        cell_size: ctx.info().cell_size,
        dimensions: Some(ctx.window().shape().to_vec()),
        normalized: true,
        ..DatasetInfo::default()
    };
    for (index, prefix) in [PRIMARY_PREFIX, OTHER_PREFIX].into_iter().enumerate() {
        info.inputs.insert(
            property.with_prefix(prefix).id().to_string(),
            VariableInfo::new(index, stats),
        );
    }
    Ok(info)
}

/// Prepare every run of `source` into `destination`.
///
/// Configuration, metadata and statistics are checked before any run
/// is touched. Runs are then processed by a pool of worker threads;
/// per-run failures and skips are collected in the report. Finally the
/// two-channel `info.json` and a `measurements.json` are written to
/// `destination`.
pub fn prepare_dataset(
    config: &PrepareConfig,
    source: Arc<dyn RunStore>,
    destination: Arc<dyn RunStore>,
    model: Arc<dyn InferenceModel>,
) -> Result<PrepareReport, PrepareError> {
    let started = Instant::now();
    let mut measurements = Measurements::begin(source.location(), destination.location());

    config.validate()?;
    let ctx = Arc::new(DatasetContext::new(config, source.load_info()?)?);
    let runs = source.list_runs()?;
    let workers = config.resolved_worker_count().min(runs.len()).max(1);
    info!(
        source = %source.location(),
        destination = %destination.location(),
        runs = runs.len(),
        workers,
        model = model.name(),
        "preparing dataset"
    );

    let (job_tx, job_rx) = crossbeam_channel::bounded::<(usize, String)>(config.job_queue_capacity);
    let (reply_tx, reply_rx) = crossbeam_channel::unbounded::<(usize, RunReport)>();

    let mut handles = Vec::with_capacity(workers);
    for i in 0..workers {
        let job_rx = job_rx.clone();
        let reply_tx = reply_tx.clone();
        let source = Arc::clone(&source);
        let destination = Arc::clone(&destination);
        let model = Arc::clone(&model);
        let ctx = Arc::clone(&ctx);
        let handle = thread::Builder::new()
            .name(format!("plume-prep-{i}"))
            .spawn(move || {
                while let Ok((seq, run_id)) = job_rx.recv() {
                    let report =
                        prepare_run(&*source, &*destination, &run_id, Arc::clone(&ctx), &*model);
                    if reply_tx.send((seq, report)).is_err() {
                        break;
                    }
                }
            })
            .map_err(|e| PrepareError::ThreadSpawn {
                reason: e.to_string(),
            })?;
        handles.push(handle);
    }
    drop(job_rx);
    drop(reply_tx);

    for (seq, run_id) in runs.iter().enumerate() {
        if job_tx.send((seq, run_id.clone())).is_err() {
            break;
        }
    }
    drop(job_tx);

    let mut replies: Vec<(usize, RunReport)> = reply_rx.iter().collect();
    let mut panicked = false;
    for handle in handles {
        panicked |= handle.join().is_err();
    }
    if panicked {
        return Err(PrepareError::WorkerPanicked);
    }
    replies.sort_by_key(|(seq, _)| *seq);
    let reports: Vec<RunReport> = replies.into_iter().map(|(_, r)| r).collect();

    destination.save_info(&separate_inputs_info(&ctx)?)?;

    let mut inference_us = 0u64;
    let mut inferences = 0u64;
    for r in &reports {
        inference_us += r.metrics.inference_us;
        inferences += u64::from(r.metrics.inferences);
        measurements.domain_prep_secs += r.metrics.domain_us as f64 / 1e6;
        measurements
            .per_run
            .push(r.metrics.to_timing(&r.run_id, r.outcome.label()));
    }
    let mut report = PrepareReport {
        runs: reports,
        measurements: Measurements::default(),
    };
    measurements.model = Some(model.name().to_string());
    measurements.model_inputs = ctx.model_inputs().to_vec();
    measurements.stitching_method = ctx.stitcher().method().to_string();
    measurements.workers = workers;
    measurements.runs_prepared = report.prepared();
    measurements.runs_skipped = report.skipped();
    measurements.runs_failed = report.failed();
    measurements.boxes = report.boxes();
    measurements.avg_inference_secs =
        (inferences > 0).then(|| inference_us as f64 / 1e6 / inferences as f64);
    measurements.total_secs = started.elapsed().as_secs_f64();
    measurements.finish();
    destination.save_measurements(&measurements)?;

    info!(
        prepared = measurements.runs_prepared,
        skipped = measurements.runs_skipped,
        failed = measurements.runs_failed,
        boxes = measurements.boxes,
        "dataset prepared"
    );
    report.measurements = measurements;
    Ok(report)
}
