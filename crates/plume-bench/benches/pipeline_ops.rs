//! Criterion benchmarks for the per-run phases.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use plume_bench::{reference_config, reference_info, reference_run};
use plume_engine::{
    infer_primaries, prepare_run, stitch_others, DatasetContext, Domain, RunMetrics,
};
use plume_store::Category;
use plume_test_utils::{ConstantModel, MemStore};

fn reference_source(heat_pumps: usize) -> (MemStore, Arc<DatasetContext>) {
    let store = MemStore::new("bench").with_info(reference_info());
    let (inputs, labels) = reference_run(heat_pumps, 42).unwrap();
    store.insert("RUN_0", Category::Inputs, inputs);
    store.insert("RUN_0", Category::Labels, labels);
    let ctx = Arc::new(DatasetContext::new(&reference_config(), reference_info()).unwrap());
    (store, ctx)
}

/// Benchmark: load a 256x64 run, locate 20 heat pumps and cut boxes.
fn bench_load_and_extract(c: &mut Criterion) {
    let (store, ctx) = reference_source(20);

    c.bench_function("load_extract_20hp", |b| {
        b.iter(|| {
            let mut domain = Domain::load(&store, "RUN_0", Arc::clone(&ctx)).unwrap();
            let boxes = domain.extract_hp_boxes().unwrap();
            black_box(boxes);
        });
    });
}

/// Benchmark: stitch the neighbours of 20 boxes.
fn bench_stitch_20_boxes(c: &mut Criterion) {
    let (store, ctx) = reference_source(20);
    let mut domain = Domain::load(&store, "RUN_0", ctx.clone()).unwrap();
    let mut boxes = domain.extract_hp_boxes().unwrap();
    let mut metrics = RunMetrics::default();
    infer_primaries(&domain, &mut boxes, &ConstantModel::new(1.0), &mut metrics).unwrap();
    let stitcher = ctx.stitcher();

    c.bench_function("stitch_others_20hp", |b| {
        b.iter(|| {
            stitch_others(black_box(&mut boxes), &stitcher).unwrap();
        });
    });
}

/// Benchmark: one full run into an in-memory destination.
fn bench_prepare_run(c: &mut Criterion) {
    let (store, ctx) = reference_source(20);
    let dest = MemStore::new("out");
    let model = ConstantModel::new(1.0);

    c.bench_function("prepare_run_20hp", |b| {
        b.iter(|| {
            let report = prepare_run(&store, &dest, "RUN_0", Arc::clone(&ctx), &model);
            black_box(report);
        });
    });
}

criterion_group!(
    benches,
    bench_load_and_extract,
    bench_stitch_20_boxes,
    bench_prepare_run
);
criterion_main!(benches);
