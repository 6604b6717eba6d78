//! Benchmarks for pose smoothing performance

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::Vector3;
use wearable_tryon::filters::{exponential::ExponentialFilter, NoFilter, PoseFilter};
use wearable_tryon::landmarks::Rotation;
use wearable_tryon::pose::Pose;

fn noisy_poses(count: usize) -> Vec<Pose> {
    (0..count)
        .map(|i| {
            let t = i as f64 * 0.1;
            let position = Vector3::new(
                0.3 * t.sin() + 0.01 * rand::random::<f64>(),
                0.2 * t.cos() + 0.01 * rand::random::<f64>(),
                0.01 * rand::random::<f64>(),
            );
            let rotation = Rotation::new(0.1 * t.sin(), 0.2 * t.cos(), 0.05 * rand::random::<f64>());
            Pose::new(position, rotation, 1.0 + 0.05 * rand::random::<f64>())
        })
        .collect()
}

fn benchmark_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("pose_filters");
    let test_data = noisy_poses(100);

    let filter_configs = vec![
        ("no_filter", Box::new(NoFilter) as Box<dyn PoseFilter>),
        ("necklace_0.25", Box::new(ExponentialFilter::new(0.25))),
        ("watch_0.3", Box::new(ExponentialFilter::new(0.3))),
        ("eyewear_0.4", Box::new(ExponentialFilter::new(0.4))),
    ];

    for (name, mut filter) in filter_configs {
        group.bench_with_input(BenchmarkId::new("single_update", name), &test_data[0], |b, pose| {
            b.iter(|| black_box(filter.apply(black_box(pose))));
        });

        group.bench_with_input(BenchmarkId::new("sequence_100", name), &test_data, |b, data| {
            b.iter(|| {
                filter.reset();
                for pose in data {
                    black_box(filter.apply(black_box(pose)));
                }
            });
        });
    }

    group.finish();
}

fn benchmark_paired_smoothing(c: &mut Criterion) {
    let data: Vec<Pose> = noisy_poses(100)
        .into_iter()
        .map(|pose| {
            let secondary = pose.position + Vector3::new(0.6, 0.0, 0.0);
            pose.with_secondary(secondary)
        })
        .collect();
    let mut filter = ExponentialFilter::new(0.3);

    c.bench_function("earring_pair_sequence_100", |b| {
        b.iter(|| {
            filter.reset();
            for pose in &data {
                black_box(filter.apply(black_box(pose)));
            }
        });
    });
}

criterion_group!(benches, benchmark_filters, benchmark_paired_smoothing);
criterion_main!(benches);
