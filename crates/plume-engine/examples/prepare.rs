//! Plume end to end: build a small raw dataset, prepare it for stage 2
//! and merge the result into a single-channel dataset.
//!
//! Demonstrates:
//!   1. Writing runs and `info.json` with a `DirStore`
//!   2. Implementing `InferenceModel` (an analytic plume instead of a net)
//!   3. `prepare_dataset` over a worker pool
//!   4. `merge_separate_inputs` on the prepared output
//!   5. Installing the label statistics process-wide with
//!      `plume_norm::global` and reading them back for reporting
//!
//! Run with:
//!   RUST_LOG=plume_engine=debug cargo run --example prepare [-- <config.json>]

use std::error::Error;
use std::sync::Arc;

use plume_core::{InferenceError, InferenceModel, NormStats, Tensor};
use plume_engine::{merge_separate_inputs, prepare_dataset, PrepareConfig};
use plume_norm::{denormalize_values, NormTable};
use plume_stitch::StitchMethod;
use plume_store::{Category, ChannelStack, DatasetInfo, DirStore, RunStore, VariableInfo};
use tracing_subscriber::EnvFilter;

// ─── Grid parameters ────────────────────────────────────────────

const ROWS: usize = 48;
const COLS: usize = 32;
const RUNS: usize = 6;

// ─── Model: Gaussian plume drifting down the rows ───────────────
//
// Peaks at the heat pump and decays with distance, stretched along the
// flow axis. Output is in standardized units.

struct AnalyticPlume {
    peak: f32,
    spread: f32,
}

impl InferenceModel for AnalyticPlume {
    fn name(&self) -> &str {
        "analytic-plume"
    }

    fn infer(&self, input: &Tensor) -> Result<Tensor, InferenceError> {
        let spatial = input.spatial_shape();
        let &[rows, cols] = spatial else {
            return Err(InferenceError::ShapeMismatch {
                expected: vec![0, 0],
                got: spatial.to_vec(),
            });
        };
        let (r0, c0) = ((rows / 2) as f32, (cols / 2) as f32);
        let mut out = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                let dr = (r as f32 - r0) / 3.0;
                let dc = c as f32 - c0;
                let d2 = (dr * dr + dc * dc) / (self.spread * self.spread);
                out.push(self.peak * (-d2).exp() - 1.0);
            }
        }
        Tensor::new(&[1, rows, cols], out).map_err(|e| InferenceError::ExecutionFailed {
            reason: e.to_string(),
        })
    }
}

// ─── Synthetic raw dataset ──────────────────────────────────────

fn write_raw(store: &DirStore) -> Result<(), Box<dyn Error>> {
    let mut info = DatasetInfo {
        cell_size: Some(5.0),
        dimensions: Some(vec![ROWS, COLS]),
        normalized: true,
        ..DatasetInfo::default()
    };
    info.inputs.insert(
        "Pressure [Pa]".into(),
        VariableInfo::new(0, NormStats::new(9.8e5, 2.0e3)),
    );
    info.inputs.insert(
        "Material_ID".into(),
        VariableInfo::new(1, NormStats::new(0.0, 1.0)),
    );
    info.labels.insert(
        "Temperature [C]".into(),
        VariableInfo::new(0, NormStats::new(10.6, 0.4)),
    );
    store.save_info(&info)?;

    for run in 0..RUNS {
        let mut pressure = Vec::with_capacity(ROWS * COLS);
        let mut material = vec![1.0f32; ROWS * COLS];
        for r in 0..ROWS {
            for _ in 0..COLS {
                pressure.push(1.0 - 2.0 * r as f32 / ROWS as f32);
            }
        }
        // up to three heat pumps, some close enough to overlap
        for k in 0..=(run % 3) {
            let (r, c) = (12 + 10 * k, 10 + 4 * k + run);
            material[r * COLS + c] = 2.0;
        }
        let temperature = vec![0.0f32; ROWS * COLS];
        let id = format!("RUN_{run}");
        let inputs = ChannelStack::from_channels(
            &[("Pressure [Pa]", pressure.as_slice()), ("Material_ID", material.as_slice())],
            &[ROWS, COLS],
        )?;
        store.save(&id, Category::Inputs, &inputs)?;
        let labels = ChannelStack::from_channels(
            &[("Temperature [C]", temperature.as_slice())],
            &[ROWS, COLS],
        )?;
        store.save(&id, Category::Labels, &labels)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => PrepareConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => PrepareConfig {
            window_shape: vec![16, 16],
            worker_count: Some(2),
            ..PrepareConfig::default()
        },
    };

    let tmp = tempfile::tempdir()?;
    let raw = DirStore::create(tmp.path().join("raw"))?;
    write_raw(&raw)?;

    let info = raw.load_info()?;
    let labels = plume_norm::global::install(NormTable::try_from_entries(
        info.labels.iter().map(|(name, v)| (name.clone(), v.stats())),
    )?)?;
    tracing::info!(quantities = labels.len(), "installed label statistics");

    let separate = Arc::new(DirStore::create(tmp.path().join("separate"))?);
    let report = prepare_dataset(
        &config,
        Arc::new(raw),
        separate.clone(),
        Arc::new(AnalyticPlume {
            peak: 6.0,
            spread: 4.0,
        }),
    )?;

    println!("=== Separate inputs ===");
    for run in &report.runs {
        println!(
            "  {:<8} {:<9} {:>8.3} ms",
            run.run_id,
            run.outcome.label(),
            run.metrics.total_us as f64 / 1000.0
        );
    }
    println!(
        "  {} prepared, {} skipped, {} failed, {} boxes",
        report.prepared(),
        report.skipped(),
        report.failed(),
        report.boxes()
    );

    let merged = DirStore::create(tmp.path().join("merged"))?;
    let m = merge_separate_inputs(&*separate, &merged, StitchMethod::Max)?;
    println!("\n=== Merged inputs ===");
    println!("  {} boxes in {:.3} s", m.boxes, m.total_secs);
    let temperature = plume_norm::global::installed()
        .and_then(|t| t.get("Temperature [C]"))
        .ok_or("label statistics not installed")?;
    for key in merged.list_runs()?.iter().take(3) {
        let stack = merged.load(key, Category::Inputs)?;
        let values = stack.channel_at(0)?;
        let peak = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mut celsius = [peak];
        denormalize_values("Temperature [C]", &mut celsius, temperature)?;
        println!(
            "  {key:<10} {:?} peak {peak:.3} ({:.2} degC)",
            stack.channels(),
            celsius[0]
        );
    }
    Ok(())
}
