use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{ImageBuffer, Rgb, RgbImage};
use multiresize::{compute_target_size, BoxSize, Dimensions, ResizeEngine, ResizeSpec};
use tempfile::TempDir;

fn benchmark_target_size(c: &mut Criterion) {
    let sources = [
        Dimensions::new(4000, 3000),
        Dimensions::new(3000, 4000),
        Dimensions::new(1600, 1200),
        Dimensions::new(6000, 1000),
    ];
    let target = BoxSize::new(900, 600);

    c.bench_function("compute_target_size", |b| {
        b.iter(|| {
            for source in &sources {
                black_box(compute_target_size(black_box(*source), black_box(target)));
            }
        });
    });
}

fn pictures(count: u32) -> TempDir {
    let dir = TempDir::new().unwrap();
    for i in 0..count {
        let img: RgbImage = ImageBuffer::from_fn(640, 480, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, (i % 256) as u8])
        });
        img.save(dir.path().join(format!("img{i:02}.jpg"))).unwrap();
    }
    dir
}

fn benchmark_engine_run(c: &mut Criterion) {
    let dir = pictures(8);
    let specs = vec![
        ResizeSpec::new(BoxSize::new(320, 240), 95, "HIGH"),
        ResizeSpec::new(BoxSize::new(160, 120), 90, "MEDIUM"),
        ResizeSpec::new(BoxSize::new(40, 30), 85, "SMALL"),
    ];

    let mut group = c.benchmark_group("engine_run");
    group.sample_size(10);

    for workers in [1, 2, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &workers| {
            b.iter(|| {
                let mut engine = ResizeEngine::new(dir.path()).unwrap();
                engine.configure(specs.clone()).unwrap();
                black_box(engine.run(workers).unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_target_size, benchmark_engine_run);
criterion_main!(benches);
