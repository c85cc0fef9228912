//! Curve pipeline benchmarks
//!
//! Benchmarks for the per-invocation hot paths:
//! - Moving-average smoothing
//! - Estimator reductions (f64, trueno SIMD for exact min/max)
//! - Seed aggregation over loaded runs
//!
//! Run with: cargo bench --bench curve_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Write as _;
use std::fs;
use trueno_curves::aggregate::{aggregate_curves, CurveSpec, Estimator};
use trueno_curves::smooth::moving_average;
use trueno_curves::storage::DatasetLoader;

/// Noisy increasing learning curve
#[allow(clippy::cast_precision_loss)]
fn noisy_curve(rng: &mut StdRng, len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| (i as f64).sqrt() + rng.gen_range(-5.0..5.0))
        .collect()
}

/// Benchmark smoothing across window sizes
fn bench_moving_average(c: &mut Criterion) {
    let mut group = c.benchmark_group("moving_average");
    let mut rng = StdRng::seed_from_u64(42);
    let series = noisy_curve(&mut rng, 10_000);

    for window in [1, 5, 20, 100] {
        group.bench_with_input(BenchmarkId::new("window", window), &window, |b, &window| {
            b.iter(|| moving_average(black_box(&series), window));
        });
    }

    group.finish();
}

/// Benchmark estimator reductions over a seed sample
fn bench_estimators(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimator_reduce");
    let mut rng = StdRng::seed_from_u64(7);
    let sample = noisy_curve(&mut rng, 1_000);

    for estimator in [Estimator::Mean, Estimator::Median, Estimator::Max, Estimator::Sum] {
        group.bench_with_input(
            BenchmarkId::new("reduce", estimator.name()),
            &estimator,
            |b, estimator| {
                b.iter(|| estimator.reduce(black_box(&sample)));
            },
        );
    }

    group.finish();
}

/// Benchmark aggregation of 3 labels x 5 seeds x 1000 epochs
fn bench_aggregate(c: &mut Criterion) {
    let tmp = tempfile::tempdir().unwrap();
    let mut rng = StdRng::seed_from_u64(1234);
    for label in ["ppo", "sac", "td3"] {
        for seed in 0..5 {
            let dir = tmp.path().join(format!("{label}_s{seed}"));
            fs::create_dir_all(&dir).unwrap();
            let mut progress = String::from("Epoch\tAverageEpRet\tTotalEnvInteracts\n");
            for (epoch, ret) in noisy_curve(&mut rng, 1_000).into_iter().enumerate() {
                writeln!(progress, "{epoch}\t{ret}\t{}", (epoch + 1) * 4000).unwrap();
            }
            fs::write(dir.join("progress.txt"), progress).unwrap();
            fs::write(dir.join("config.json"), format!(r#"{{"exp_name": "{label}"}}"#)).unwrap();
        }
    }
    let datasets = DatasetLoader::new().load(tmp.path(), None);

    let spec = CurveSpec {
        xaxis: "TotalEnvInteracts",
        value: "Performance",
        condition: "Condition1",
        estimator: Estimator::Mean,
    };
    c.bench_function("aggregate_curves_15_runs", |b| {
        b.iter(|| aggregate_curves(black_box(&datasets), &spec).unwrap());
    });
}

criterion_group!(benches, bench_moving_average, bench_estimators, bench_aggregate);
criterion_main!(benches);
