//! Criterion micro-benchmarks for the stack codec and payload hashing.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use plume_bench::reference_run;
use plume_store::{decode_stack, encode_stack, payload_hash};

/// Benchmark: encode one 2x256x64 input stack.
fn bench_encode_stack(c: &mut Criterion) {
    let (inputs, _) = reference_run(20, 42).unwrap();
    let mut buf = Vec::with_capacity(256 * 1024);

    c.bench_function("encode_stack_2x256x64", |b| {
        b.iter(|| {
            buf.clear();
            encode_stack(&mut buf, black_box(&inputs)).unwrap();
        });
    });
}

/// Benchmark: decode the same stack, checksum included.
fn bench_decode_stack(c: &mut Criterion) {
    let (inputs, _) = reference_run(20, 42).unwrap();
    let mut buf = Vec::new();
    encode_stack(&mut buf, &inputs).unwrap();

    c.bench_function("decode_stack_2x256x64", |b| {
        b.iter(|| {
            let stack = decode_stack(&mut black_box(buf.as_slice())).unwrap();
            black_box(stack);
        });
    });
}

/// Benchmark: hash 32K values.
fn bench_payload_hash(c: &mut Criterion) {
    let (inputs, _) = reference_run(20, 42).unwrap();
    let data = inputs.tensor().data();

    c.bench_function("payload_hash_32k", |b| {
        b.iter(|| black_box(payload_hash(black_box(data))));
    });
}

criterion_group!(
    benches,
    bench_encode_stack,
    bench_decode_stack,
    bench_payload_hash
);
criterion_main!(benches);
