//! Dataset fixtures.
//!
//! A fixture dataset has two inputs, a pressure field and the
//! `Material_ID` identifier channel, and one label, temperature. Input
//! statistics are `(0, 1)` so stored values equal standardized ones.

use plume_core::NormStats;
use plume_store::{Category, ChannelStack, DatasetInfo, VariableInfo};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::MemStore;

pub const PRESSURE: &str = "Pressure [Pa]";
pub const MARKER: &str = "Material_ID";
pub const TEMPERATURE: &str = "Temperature [C]";

/// Identifier value of ordinary ground.
pub const GROUND_ID: f32 = 1.0;
/// Identifier value of a heat-pump cell.
pub const HEAT_PUMP_ID: f32 = 2.0;

/// Metadata of a fixture dataset with the given temperature statistics.
pub fn dataset_info(temperature: NormStats) -> DatasetInfo {
    let mut info = DatasetInfo {
        cell_size: Some(5.0),
        normalized: true,
        ..DatasetInfo::default()
    };
    info.inputs
        .insert(PRESSURE.into(), VariableInfo::new(0, NormStats::new(0.0, 1.0)));
    info.inputs
        .insert(MARKER.into(), VariableInfo::new(1, NormStats::new(0.0, 1.0)));
    info.labels
        .insert(TEMPERATURE.into(), VariableInfo::new(0, temperature));
    info
}

/// Identifier channel over `dims` with a heat pump at each coordinate.
pub fn marker_channel(dims: &[usize], heat_pumps: &[&[i32]]) -> Vec<f32> {
    let n: usize = dims.iter().product();
    let mut values = vec![GROUND_ID; n];
    for hp in heat_pumps {
        let mut rank = 0usize;
        for (&c, &d) in hp.iter().zip(dims) {
            rank = rank * d + c as usize;
        }
        values[rank] = HEAT_PUMP_ID;
    }
    values
}

/// Row-major values `lo..=hi` spread linearly over `len` cells.
pub fn ramp(len: usize, lo: f32, hi: f32) -> Vec<f32> {
    if len < 2 {
        return vec![lo; len];
    }
    (0..len)
        .map(|i| lo + (hi - lo) * i as f32 / (len - 1) as f32)
        .collect()
}

/// Deterministic uniform values in `[lo, hi)`.
pub fn seeded_field(seed: u64, len: usize, lo: f32, hi: f32) -> Vec<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(lo..hi)).collect()
}

/// Input stack `[pressure, marker]`.
pub fn input_stack(dims: &[usize], pressure: &[f32], heat_pumps: &[&[i32]]) -> ChannelStack {
    let marker = marker_channel(dims, heat_pumps);
    ChannelStack::from_channels(&[(PRESSURE, pressure), (MARKER, marker.as_slice())], dims)
        .expect("fixture input stack")
}

/// Label stack `[temperature]`.
pub fn label_stack(dims: &[usize], temperature: &[f32]) -> ChannelStack {
    ChannelStack::from_channels(&[(TEMPERATURE, temperature)], dims).expect("fixture label stack")
}

/// Store one run with seeded pressure and, if given, labels.
pub fn insert_run(
    store: &MemStore,
    run_id: &str,
    dims: &[usize],
    heat_pumps: &[&[i32]],
    temperature: Option<&[f32]>,
) {
    let n: usize = dims.iter().product();
    let pressure = seeded_field(run_id.len() as u64, n, -1.0, 1.0);
    store.insert(run_id, Category::Inputs, input_stack(dims, &pressure, heat_pumps));
    if let Some(t) = temperature {
        store.insert(run_id, Category::Labels, label_stack(dims, t));
    }
}

/// A source store holding fixture metadata and no runs.
pub fn source_store(temperature: NormStats) -> MemStore {
    MemStore::new("source").with_info(dataset_info(temperature))
}
