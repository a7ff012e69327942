use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use burn::prelude::*;
use burn_ndarray::NdArray;

use box_cox_rs::test_utils::{scalar_param, tensor_from_f32_vec};
use box_cox_rs::{BoxCoxTransform, PowerKernel};

type BenchBackend = NdArray<f32>;

/// Positive observations with a deterministic pattern, `[series, steps]`.
fn create_observations(
    series: usize,
    steps: usize,
    device: &<BenchBackend as Backend>::Device,
) -> Tensor<BenchBackend, 2> {
    let data: Vec<f32> = (0..series * steps)
        .map(|i| 1.5 + (i as f32 * 0.01).sin())
        .collect();
    tensor_from_f32_vec(&data, [series, steps], device)
}

/// One `(lambda_1, lambda_2)` pair per series, mixing both branches.
fn create_transform(
    series: usize,
    kernel: PowerKernel,
    device: &<BenchBackend as Backend>::Device,
) -> BoxCoxTransform<BenchBackend, 2> {
    let lambda_1: Vec<f32> = (0..series)
        .map(|i| if i % 4 == 0 { 0.0 } else { 0.25 * (i % 8) as f32 - 0.9 })
        .collect();
    let lambda_2 = vec![0.1f32; series];

    BoxCoxTransform::new(
        tensor_from_f32_vec(&lambda_1, [series, 1], device),
        tensor_from_f32_vec(&lambda_2, [series, 1], device),
    )
    .with_power_kernel(kernel)
}

fn benchmark_forward_inverse(c: &mut Criterion) {
    let device = Default::default();

    let configs = vec![
        // (name, series, steps)
        ("small", 8, 64),
        ("medium", 64, 256),
        ("large", 256, 1024),
    ];

    let mut group = c.benchmark_group("box_cox_round_trip");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(50);

    for (name, series, steps) in configs {
        let z = create_observations(series, steps, &device);

        for kernel in [PowerKernel::Native, PowerKernel::ExpLog] {
            let transform = create_transform(series, kernel, &device);
            let id = format!("{}_{:?}", name, kernel);

            group.bench_with_input(BenchmarkId::new("forward", &id), &z, |b, z| {
                b.iter(|| black_box(transform.forward(black_box(z.clone()))))
            });

            let y = transform.forward(z.clone());
            group.bench_with_input(BenchmarkId::new("inverse", &id), &y, |b, y| {
                b.iter(|| black_box(transform.inverse(black_box(y.clone()))))
            });
        }
    }

    group.finish();
}

fn benchmark_log_abs_det_jacobian(c: &mut Criterion) {
    let device = Default::default();
    let z = create_observations(1, 4096, &device).reshape([4096]);

    let mut group = c.benchmark_group("box_cox_log_abs_det_jacobian");
    group.measurement_time(Duration::from_secs(5));

    // Scalar parameters broadcast against the whole series.
    for lambda_1 in [0.0f32, 0.5, -1.2] {
        let transform = BoxCoxTransform::new(
            scalar_param::<BenchBackend, 1>(lambda_1, &device),
            scalar_param::<BenchBackend, 1>(0.0, &device),
        );
        group.bench_with_input(BenchmarkId::from_parameter(lambda_1), &z, |b, z| {
            b.iter(|| black_box(transform.log_abs_det_jacobian(black_box(z.clone()))))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_forward_inverse,
    benchmark_log_abs_det_jacobian
);
criterion_main!(benches);
