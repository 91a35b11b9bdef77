// benches/flow.rs -- Flow estimator and scan benchmarks.
//
//   cargo bench --bench flow

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use stonyman_flow::chip::{Sensor, SensorConfig, SimulatedChip};
use stonyman_flow::flow::{iia_1d, Algorithm, FlowEstimator, Neighborhood};
use stonyman_flow::image::Image;
use stonyman_flow::scan::ScanWindow;

/// Smooth two-frequency pattern, shifted `dx` quarter pixels along x.
fn make_scene(side: usize, dx: usize) -> Image<i32> {
    Image::from_fn(side, side, |r, c| {
        let x = (4 * c + dx) as f32 / 4.0;
        let y = r as f32;
        (400.0 * (x / 3.0).sin() * (y / 4.0).cos()) as i32
    })
}

fn bench_estimators(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate_2d");
    for side in [8usize, 16, 32] {
        let previous = make_scene(side, 0);
        let current = make_scene(side, 1);
        for (name, algorithm, neighborhood) in [
            ("iia_plus", Algorithm::Iia, Neighborhood::Plus),
            ("iia_square", Algorithm::Iia, Neighborhood::Square),
            ("ls_plus", Algorithm::LeastSquares, Neighborhood::Plus),
            ("ls_square", Algorithm::LeastSquares, Neighborhood::Square),
        ] {
            let estimator = FlowEstimator::new(algorithm, neighborhood, 100);
            group.bench_with_input(BenchmarkId::new(name, side), &side, |b, _| {
                b.iter(|| estimator.estimate(black_box(&current), black_box(&previous)))
            });
        }
    }
    group.finish();
}

fn bench_iia_strip(c: &mut Criterion) {
    let strip: Vec<i32> = (0..64).map(|i| ((i as f32 / 5.0).sin() * 300.0) as i32).collect();
    let shifted: Vec<i32> = (0..64)
        .map(|i| (((i as f32 - 0.25) / 5.0).sin() * 300.0) as i32)
        .collect();

    c.bench_function("iia_1d_64", |b| {
        b.iter(|| iia_1d(black_box(&shifted), black_box(&strip), 100))
    });
}

fn bench_capture(c: &mut Criterion) {
    let mut sensor = Sensor::begin(SimulatedChip::new(), SensorConfig::default())
        .expect("default config is valid");
    let window = ScanWindow::square(32, 16, 2);

    c.bench_function("capture_16x16", |b| {
        b.iter(|| sensor.engine().capture(black_box(&window)))
    });
}

criterion_group!(benches, bench_estimators, bench_iia_strip, bench_capture);
criterion_main!(benches);
