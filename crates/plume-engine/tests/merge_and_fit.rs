//! Integration test: the passes around preparation.
//!
//! `fit_dataset_info` derives statistics for a raw dataset, which can
//! then be prepared straight from physical units, and
//! `merge_separate_inputs` collapses a prepared dataset into a single
//! input channel.

use std::sync::Arc;

use plume_core::NormStats;
use plume_engine::{
    fit_dataset_info, merge_separate_inputs, prepare_dataset, DomainError, PrepareConfig,
    PrepareError,
};
use plume_stitch::StitchMethod;
use plume_store::{Category, ChannelStack};
use plume_test_utils::fixtures::{
    input_stack, insert_run, label_stack, ramp, source_store, MARKER, PRESSURE, TEMPERATURE,
};
use plume_test_utils::{ConstantModel, IdentityModel, MemStore};

fn stack(name: &str, values: &[f32], dims: &[usize]) -> ChannelStack {
    ChannelStack::from_channels(&[(name, values)], dims).unwrap()
}

// ── fit_dataset_info ────────────────────────────────────────────────

#[test]
fn fit_pools_every_run() {
    let store = MemStore::new("raw");
    let first: Vec<f32> = (0..4).map(|i| i as f32).collect();
    let second: Vec<f32> = (4..8).map(|i| i as f32).collect();
    store.insert("a", Category::Inputs, input_stack(&[2, 2], &first, &[&[0, 0]]));
    store.insert("b", Category::Inputs, input_stack(&[2, 2], &second, &[&[1, 1]]));
    store.insert("a", Category::Labels, label_stack(&[2, 2], &[10.0, 20.0, 30.0, 40.0]));

    let info = fit_dataset_info(&store, Some(5.0)).unwrap();
    assert!(!info.normalized);
    assert_eq!(info.cell_size, Some(5.0));
    assert_eq!(info.dimensions.as_deref(), Some(&[2usize, 2][..]));
    assert_eq!(info.input_names(), [PRESSURE, MARKER]);

    // 0..8: mean 3.5, sample variance 6
    let p = &info.inputs[PRESSURE];
    assert_eq!(p.index, 0);
    assert!((p.mean - 3.5).abs() < 1e-12);
    assert!((p.std - 6f64.sqrt()).abs() < 1e-12);
    assert_eq!((p.min, p.max), (Some(0.0), Some(7.0)));

    let t = info.inputs.get(MARKER).unwrap();
    assert_eq!((t.min, t.max), (Some(1.0), Some(2.0)));

    let temp = &info.labels[TEMPERATURE];
    assert!((temp.mean - 25.0).abs() < 1e-12);
}

#[test]
fn fit_rejects_mixed_grids() {
    let store = MemStore::new("raw");
    store.insert("a", Category::Inputs, stack(PRESSURE, &[0.0, 1.0, 2.0, 3.0], &[2, 2]));
    store.insert("b", Category::Inputs, stack(PRESSURE, &[0.0; 6], &[2, 3]));
    let err = fit_dataset_info(&store, None).unwrap_err();
    assert!(matches!(
        err,
        PrepareError::Domain(DomainError::ShapeMismatch { ref run_id, .. }) if run_id == "b"
    ));
}

#[test]
fn fit_rejects_constant_channel() {
    let store = MemStore::new("raw");
    store.insert("a", Category::Inputs, stack(PRESSURE, &[1.0; 4], &[2, 2]));
    assert!(matches!(
        fit_dataset_info(&store, None),
        Err(PrepareError::Norm(_))
    ));
}

// ── fit, then prepare from physical units ───────────────────────────

const DIMS: [usize; 2] = [10, 10];

fn z(value: f32, mean: f64, std: f64) -> f32 {
    ((value as f64 - mean) / std) as f32
}

fn standardized(field: &[f32], mean: f64, std: f64) -> Vec<f32> {
    field.iter().map(|&v| z(v, mean, std)).collect()
}

/// Values of a 4x4 box with `origin`, cut from a row-major 10x10 field.
fn cut(field: &[f32], origin: [usize; 2]) -> Vec<f32> {
    let mut out = Vec::with_capacity(16);
    for r in origin[0]..origin[0] + 4 {
        for c in origin[1]..origin[1] + 4 {
            out.push(field[r * DIMS[1] + c]);
        }
    }
    out
}

fn assert_close(got: &[f32], expected: &[f32]) {
    assert_eq!(got.len(), expected.len());
    for (i, (g, e)) in got.iter().zip(expected).enumerate() {
        assert!((g - e).abs() < 1e-4, "cell {i}: got {g}, expected {e}");
    }
}

#[test]
fn fitted_physical_dataset_is_standardized_on_load() {
    let pressure_a = ramp(100, 900.0, 1100.0);
    let pressure_b = ramp(100, 950.0, 1150.0);
    let temperature = ramp(100, 10.0, 14.0);
    let raw = MemStore::new("raw");
    raw.insert("a", Category::Inputs, input_stack(&DIMS, &pressure_a, &[&[5, 5]]));
    raw.insert("a", Category::Labels, label_stack(&DIMS, &temperature));
    raw.insert("b", Category::Inputs, input_stack(&DIMS, &pressure_b, &[&[4, 3], &[4, 5]]));
    raw.insert("b", Category::Labels, label_stack(&DIMS, &temperature));

    let info = fit_dataset_info(&raw, Some(5.0)).unwrap();
    assert!(!info.normalized);
    let (p, t) = (info.inputs[PRESSURE].clone(), info.labels[TEMPERATURE].clone());
    let src = Arc::new(raw.with_info(info));

    let dst = Arc::new(MemStore::new("prepared"));
    let config = PrepareConfig {
        window_shape: vec![4, 4],
        worker_count: Some(2),
        ..PrepareConfig::default()
    };
    // the model echoes its standardized pressure window as the prediction
    let report =
        prepare_dataset(&config, src, dst.clone(), Arc::new(IdentityModel::new(0))).unwrap();
    assert_eq!((report.prepared(), report.boxes()), (2, 3));

    let za = standardized(&pressure_a, p.mean, p.std);
    let zb = standardized(&pressure_b, p.mean, p.std);
    let background = z(0.0, t.mean, t.std);

    // (key, box origin, standardized pressure of the run, local overlap columns)
    let cases = [
        ("a_0", [3, 3], za.as_slice(), 0..0),
        ("b_0", [2, 1], zb.as_slice(), 2..4),
        ("b_1", [2, 3], zb.as_slice(), 0..2),
    ];
    for (key, origin, pressure, overlap) in cases {
        let inputs = dst.get(key, Category::Inputs).unwrap();
        let own = cut(pressure, origin);
        assert_close(inputs.channel("Primary Temperature [C]").unwrap(), &own);

        let expected_other: Vec<f32> = (0..16)
            .map(|i| if overlap.contains(&(i % 4)) { own[i] } else { background })
            .collect();
        assert_close(inputs.channel("Other Temperature [C]").unwrap(), &expected_other);

        let labels = dst.get(key, Category::Labels).unwrap();
        let expected_labels = standardized(&cut(&temperature, origin), t.mean, t.std);
        assert_close(labels.channel(TEMPERATURE).unwrap(), &expected_labels);
    }

    let prepared = dst.info().unwrap();
    assert!(prepared.normalized);
    assert_eq!(
        prepared.input_stats("Other Temperature [C]"),
        Some(NormStats::new(t.mean, t.std))
    );
}

// ── merge_separate_inputs ───────────────────────────────────────────

fn prepared() -> Arc<MemStore> {
    let src = source_store(NormStats::new(20.0, 5.0));
    insert_run(&src, "run", &[10, 10], &[&[4, 3], &[4, 5]], Some(&ramp(100, -1.0, 1.0)));
    let dst = Arc::new(MemStore::new("separate"));
    let config = PrepareConfig {
        window_shape: vec![4, 4],
        worker_count: Some(1),
        ..PrepareConfig::default()
    };
    prepare_dataset(&config, Arc::new(src), dst.clone(), Arc::new(ConstantModel::new(0.5)))
        .unwrap();
    dst
}

#[test]
fn merge_takes_cellwise_max_of_both_channels() {
    let separate = prepared();
    let merged = MemStore::new("merged");
    let m = merge_separate_inputs(&*separate, &merged, StitchMethod::Max).unwrap();

    assert_eq!(merged.keys(Category::Inputs), ["run_0", "run_1"]);
    for key in ["run_0", "run_1"] {
        let two = separate.get(key, Category::Inputs).unwrap();
        let one = merged.get(key, Category::Inputs).unwrap();
        assert_eq!(one.channels(), [TEMPERATURE]);
        let (a, b) = (two.channel_at(0).unwrap(), two.channel_at(1).unwrap());
        for (i, &v) in one.channel_at(0).unwrap().iter().enumerate() {
            assert_eq!(v, a[i].max(b[i]));
        }
        assert_eq!(
            merged.get(key, Category::Labels),
            separate.get(key, Category::Labels)
        );
    }

    let info = merged.info().unwrap();
    assert_eq!(info.input_names(), [TEMPERATURE]);
    assert_eq!(info.input_stats(TEMPERATURE), Some(NormStats::new(20.0, 5.0)));
    assert_eq!(info.labels, separate.info().unwrap().labels);

    assert_eq!(m.boxes, 2);
    assert_eq!(m.source, "mem://separate");
    let parent = m.derived_from.as_deref().unwrap();
    assert_eq!(parent.destination, "mem://separate");
    assert_eq!(parent.boxes, 2);
    assert_eq!(merged.measurements().unwrap(), m);
}

#[test]
fn merge_refuses_other_methods() {
    let separate = prepared();
    let merged = MemStore::new("merged");
    let err = merge_separate_inputs(&*separate, &merged, StitchMethod::Mean).unwrap_err();
    assert!(matches!(err, PrepareError::Config(_)));
    assert!(merged.keys(Category::Inputs).is_empty());
}

#[test]
fn merge_requires_two_channels() {
    let separate = prepared();
    separate.insert("odd", Category::Inputs, stack(TEMPERATURE, &[0.0; 16], &[4, 4]));
    let err = merge_separate_inputs(&*separate, &MemStore::new("merged"), StitchMethod::Max)
        .unwrap_err();
    assert!(matches!(err, PrepareError::Field(_)));
}
