//! Benchmarks comparing the sequential and parallel strategies.

use batchflow::prelude::*;
use batchflow::testing::{sample_items, DelayStage};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::path::PathBuf;
use std::time::Duration;

fn delay_runner(delay: Duration) -> BatchRunner<PathBuf> {
    let chain = StageChain::builder("bench")
        .stage(DelayStage::new("delay", delay))
        .stage(NoOpStage::new("noop"))
        .build()
        .expect("chain has stages");
    BatchRunner::new(chain)
}

fn strategy_benchmark(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    let runner = delay_runner(Duration::from_millis(1));
    let mut group = c.benchmark_group("strategies");

    for count in [4_usize, 16, 64] {
        let items = sample_items(count);

        group.bench_with_input(BenchmarkId::new("sequential", count), &items, |b, items| {
            b.to_async(&rt).iter(|| async {
                black_box(runner.run_sequential(items).await.expect("batch runs"))
            });
        });

        group.bench_with_input(BenchmarkId::new("parallel", count), &items, |b, items| {
            b.to_async(&rt).iter(|| async {
                black_box(runner.run_parallel(items).await.expect("batch runs"))
            });
        });
    }

    group.finish();
}

fn overhead_benchmark(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    let runner = delay_runner(Duration::ZERO);
    let items = sample_items(256);

    c.bench_function("parallel_overhead_256", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(runner.run_parallel(&items).await.expect("batch runs"))
        });
    });
}

criterion_group!(benches, strategy_benchmark, overhead_benchmark);
criterion_main!(benches);
