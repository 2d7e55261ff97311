//! Benchmark profiles for the Plume data-preparation pipeline.
//!
//! - [`reference_config`]: 64x16 boxes, `max` stitching, one worker
//! - [`reference_info`]: dataset metadata matching the runs below
//! - [`reference_run`]: one 256x64 run with seeded heat pumps
//! - [`heat_pump_positions`]: deterministic heat-pump placement

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use plume_core::{FieldError, NormStats};
use plume_engine::PrepareConfig;
use plume_store::{ChannelStack, DatasetInfo, VariableInfo};

/// Grid rows of a reference run.
pub const ROWS: usize = 256;
/// Grid columns of a reference run.
pub const COLS: usize = 64;
/// Box shape of the reference profile.
pub const WINDOW: [usize; 2] = [64, 16];

/// Preparation settings used by every benchmark.
pub fn reference_config() -> PrepareConfig {
    PrepareConfig {
        window_shape: WINDOW.to_vec(),
        worker_count: Some(1),
        ..PrepareConfig::default()
    }
}

/// Metadata of a reference dataset, stored already standardized.
pub fn reference_info() -> DatasetInfo {
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
    info
}

/// Place `n` heat pumps so every reference box stays inside the grid.
///
/// Positions are a simple hash of the seed, probed linearly to avoid
/// touching an occupied or adjacent cell. Returns `(row, col)` pairs.
pub fn heat_pump_positions(n: usize, seed: u64) -> Vec<(usize, usize)> {
    let (hr, hc) = (WINDOW[0] / 2, WINDOW[1] / 2);
    let rows = ROWS - WINDOW[0];
    let cols = COLS - WINDOW[1];
    let mut taken = vec![false; ROWS * COLS];
    let mut out = Vec::with_capacity(n);

    for i in 0..n as u64 {
        let mut slot = (seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(i.wrapping_mul(1442695040888963407))
            % (rows * cols) as u64) as usize;
        loop {
            let (r, c) = (hr + slot / cols, hc + slot % cols);
            let near = [(0, 0), (1, 0), (0, 1)]
                .iter()
                .any(|&(dr, dc)| taken[(r + dr) * COLS + c + dc] || taken[(r - dr) * COLS + c - dc]);
            if !near {
                taken[r * COLS + c] = true;
                out.push((r, c));
                break;
            }
            slot = (slot + 1) % (rows * cols);
        }
    }
    out
}

/// One reference run with `n` heat pumps: `(inputs, labels)`.
pub fn reference_run(n: usize, seed: u64) -> Result<(ChannelStack, ChannelStack), FieldError> {
    let mut pressure = Vec::with_capacity(ROWS * COLS);
    for r in 0..ROWS {
        for c in 0..COLS {
            pressure.push(1.0 - 2.0 * r as f32 / ROWS as f32 + 0.01 * c as f32);
        }
    }
    let mut material = vec![1.0f32; ROWS * COLS];
    let mut temperature = vec![0.0f32; ROWS * COLS];
    for (r, c) in heat_pump_positions(n, seed) {
        material[r * COLS + c] = 2.0;
        temperature[r * COLS + c] = 5.0;
    }
    let inputs = ChannelStack::from_channels(
        &[
            ("Pressure [Pa]", pressure.as_slice()),
            ("Material_ID", material.as_slice()),
        ],
        &[ROWS, COLS],
    )?;
    let labels = ChannelStack::from_channels(
        &[("Temperature [C]", temperature.as_slice())],
        &[ROWS, COLS],
    )?;
    Ok((inputs, labels))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_config_validates() {
        reference_config().validate().unwrap();
    }

    #[test]
    fn positions_keep_boxes_inside() {
        let positions = heat_pump_positions(40, 42);
        assert_eq!(positions.len(), 40);
        for &(r, c) in &positions {
            assert!(r >= WINDOW[0] / 2 && r + WINDOW[0] / 2 <= ROWS);
            assert!(c >= WINDOW[1] / 2 && c + WINDOW[1] / 2 <= COLS);
        }
    }

    #[test]
    fn positions_are_deterministic() {
        assert_eq!(heat_pump_positions(10, 7), heat_pump_positions(10, 7));
    }

    #[test]
    fn run_matches_metadata() {
        let (inputs, labels) = reference_run(8, 1).unwrap();
        let info = reference_info();
        assert_eq!(inputs.channels(), info.input_names());
        assert_eq!(labels.spatial_shape(), &[ROWS, COLS]);
    }
}
