//! Collapse two-channel box inputs into one channel.
//!
//! A prepared dataset stores each box as `[primary, other]`. Some
//! stage-2 models take a single channel instead; this pass merges the
//! two with the `max` stitcher, copies the labels and writes matching
//! metadata.

use std::time::Instant;

use plume_core::{FieldError, QuantityKey};
use plume_stitch::{StitchMethod, Stitcher};
use plume_store::{Category, ChannelStack, DatasetInfo, Measurements, RunStore, StoreError};
use tracing::info;

use crate::config::ConfigError;
use crate::error::PrepareError;
use crate::heat_pump::PRIMARY_PREFIX;
use crate::metrics::{micros, RunMetrics};

/// The merged channel's identifier: the first channel's with the
/// primary prefix dropped.
fn merged_name(first: &str) -> Result<String, FieldError> {
    let key = QuantityKey::parse(first)?;
    let stripped = key
        .name()
        .strip_prefix(PRIMARY_PREFIX)
        .map(str::trim_start)
        .unwrap_or(key.name());
    Ok(match key.unit() {
        Some(unit) => format!("{stripped} [{unit}]"),
        None => stripped.to_string(),
    })
}

/// Merge every box of `separate` into `merged`.
///
/// Only `StitchMethod::Max` is accepted: other methods would need a
/// meaningful background in standardized units. Returns the
/// measurements document that was written, which embeds the separate
/// preparation's measurements when present.
pub fn merge_separate_inputs(
    separate: &dyn RunStore,
    merged: &dyn RunStore,
    method: StitchMethod,
) -> Result<Measurements, PrepareError> {
    let started = Instant::now();
    let stitcher = Stitcher::new(method, 0.0).map_err(ConfigError::from)?;
    let mut measurements = Measurements::begin(separate.location(), merged.location());
    measurements.stitching_method = stitcher.method().to_string();
    measurements.workers = 1;

    let source_info = separate.load_info()?;
    let mut merged_channel = None;

    for run_id in separate.list_runs()? {
        let run_start = Instant::now();
        let stack = separate.load(&run_id, Category::Inputs)?;
        if stack.channels().len() != 2 {
            return Err(FieldError::ShapeMismatch {
                expected: 2,
                got: stack.channels().len(),
            }
            .into());
        }
        let name = merged_name(&stack.channels()[0])?;
        let values = stitcher.merge_pair(stack.channel_at(0)?, stack.channel_at(1)?)?;
        let out =
            ChannelStack::from_channels(&[(name.as_str(), values.as_slice())], stack.spatial_shape())?;
        merged.save(&run_id, Category::Inputs, &out)?;

        if separate.contains(&run_id, Category::Labels) {
            merged.save(&run_id, Category::Labels, &separate.load(&run_id, Category::Labels)?)?;
        }

        let metrics = RunMetrics {
            total_us: micros(run_start.elapsed()),
            boxes: 1,
            ..RunMetrics::default()
        };
        measurements.per_run.push(metrics.to_timing(&run_id, "prepared"));
        measurements.runs_prepared += 1;
        merged_channel.get_or_insert(name);
    }

    let (primary, primary_info) = source_info
        .inputs
        .iter()
        .find(|(_, v)| v.index == 0)
        .map(|(k, v)| (k.clone(), v.clone()))
        .ok_or_else(|| StoreError::Malformed {
            detail: "separate dataset lists no inputs".into(),
        })?;
    let name = match merged_channel {
        Some(name) => name,
        None => merged_name(&primary)?,
    };
    let mut info = DatasetInfo {
        labels: source_info.labels.clone(),
        cell_size: source_info.cell_size,
        dimensions: source_info.dimensions.clone(),
        normalized: source_info.normalized,
        ..DatasetInfo::default()
    };
    info.inputs.insert(name, primary_info);
    merged.save_info(&info)?;

    measurements.boxes = measurements.runs_prepared;
    measurements.derived_from = separate.load_measurements()?.map(Box::new);
    measurements.total_secs = started.elapsed().as_secs_f64();
    measurements.finish();
    merged.save_measurements(&measurements)?;
    info!(
        boxes = measurements.boxes,
        destination = %merged.location(),
        "merged separate inputs"
    );
    Ok(measurements)
}
