//! Benchmarks for smile_models.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use smile_models::calibration::{
    uniform_weights, MarketPoint, ZabrCalibrationConfig, ZabrCalibrator, ZabrGuess,
};
use smile_models::models::zabr::{zabr_volatility, MarketContext, ZabrEvaluation, ZabrParams};

fn benchmark_zabr_volatility(c: &mut Criterion) {
    let params = ZabrParams::new(0.2, 0.7, 0.4, -0.3, 0.8);
    let context = MarketContext { expiry: 1.0, forward: 1.0 };
    let mut group = c.benchmark_group("zabr_volatility");

    for evaluation in [
        ZabrEvaluation::ShortMaturityLognormal,
        ZabrEvaluation::ShortMaturityNormal,
        ZabrEvaluation::HaganLognormal,
    ] {
        group.bench_with_input(
            BenchmarkId::from_parameter(evaluation.as_str()),
            &evaluation,
            |b, &evaluation| {
                b.iter(|| zabr_volatility(&params, &context, black_box(1.2), evaluation))
            },
        );
    }

    group.finish();
}

fn benchmark_calibration(c: &mut Criterion) {
    let context = MarketContext { expiry: 5.0, forward: 0.04 };
    let points = vec![
        MarketPoint::new(0.03, 0.22),
        MarketPoint::new(0.04, 0.20),
        MarketPoint::new(0.05, 0.19),
    ];
    let weights = uniform_weights(points.len());
    let guess = ZabrGuess::default();

    c.bench_function("calibrate_three_points", |b| {
        let calibrator = ZabrCalibrator::with_defaults();
        b.iter(|| calibrator.calibrate(black_box(&points), &context, &guess, &weights))
    });

    let mut group = c.benchmark_group("calibrate_restarts");
    group.sample_size(10);
    for parallel in [false, true] {
        let calibrator = ZabrCalibrator::new(
            ZabrCalibrationConfig::default()
                .with_error_accept(0.0)
                .with_max_restarts(16)
                .with_parallel(parallel),
        )
        .unwrap();
        let label = if parallel { "parallel" } else { "sequential" };
        group.bench_function(BenchmarkId::from_parameter(label), |b| {
            b.iter(|| calibrator.calibrate(black_box(&points), &context, &guess, &weights))
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_zabr_volatility, benchmark_calibration);
criterion_main!(benches);
