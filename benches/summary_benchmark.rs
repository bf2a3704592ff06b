//! Performance benchmarks for Octane
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use octane::config::OutputFormat;
use octane::harness::{probe_fn, Harness, SamplingSpec, Summary};
use octane::sink::{MemorySink, ResultSink};
use rand::Rng;
use std::time::Duration;

fn random_values(count: usize) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    (0..count).map(|_| rng.gen_range(0.0..100.0)).collect()
}

fn bench_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("summary");

    for count in [60, 3_600, 86_400].iter() {
        let values = random_values(*count);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &values, |b, values| {
            b.iter(|| black_box(Summary::from_values(values.iter().copied()).unwrap()));
        });
    }

    group.finish();
}

fn bench_harness_loop(c: &mut Criterion) {
    c.bench_function("harness_1000_samples_no_wait", |b| {
        let harness = Harness::new();
        b.iter(|| {
            let mut next = 0.0;
            let probe = probe_fn("synthetic", move || {
                next += 1.0;
                Ok(next)
            });
            let mut spec = SamplingSpec::new(probe)
                .with_max_samples(1_000)
                .with_interval(Duration::ZERO);
            black_box(harness.run(&mut spec).unwrap())
        });
    });
}

fn bench_yaml_sink(c: &mut Criterion) {
    let values = random_values(3_600);
    let mut iter = values.into_iter().cycle();
    let probe = probe_fn("cpu", move || Ok(iter.next().unwrap_or(0.0)));
    let mut spec = SamplingSpec::new(probe)
        .with_max_samples(3_600)
        .with_interval(Duration::ZERO);
    let result = Harness::new().run(&mut spec).unwrap();

    c.bench_function("yaml_emit_3600_samples", |b| {
        b.iter(|| {
            let mut sink = MemorySink::new(OutputFormat::Yaml);
            sink.emit(black_box(&result)).unwrap();
            black_box(sink.contents().len())
        });
    });
}

criterion_group!(benches, bench_summary, bench_harness_loop, bench_yaml_sink);
criterion_main!(benches);
