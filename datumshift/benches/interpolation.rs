//! Grid file interpolation benchmarks
//!
//! Run with: cargo bench -p datumshift

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use datumshift::{grid_flags, Coordinate, Extent, GridFileOptions, GridFileWriter, GridShiftFile, GridUnits, ShiftVector};
use rand::{Rng, SeedableRng};

/// A 10 x 10 degree grid at 5 minute spacing with a smooth shift field
fn write_grid(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("bench.gsb");
    let mut writer = GridFileWriter::new(GridUnits::Seconds);
    writer
        .add_sampled("BENCH", None, Extent::new(-80.0, 40.0, -70.0, 50.0), 1.0 / 12.0, 1.0 / 12.0, |lng, lat| {
            ShiftVector::new(1e-4 * (lng * 0.1).sin(), 1e-4 * (lat * 0.1).cos())
        })
        .unwrap();
    writer.write_to(&path).unwrap();
    path
}

fn random_points(n: usize) -> Vec<Coordinate> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    (0..n)
        .map(|_| Coordinate::lng_lat(rng.gen_range(-79.9..-70.1), rng.gen_range(40.1..49.9)))
        .collect()
}

fn bench_backends(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_grid(&dir);
    let points = random_points(1_000);

    let mut group = c.benchmark_group("interpolate");
    group.throughput(Throughput::Elements(points.len() as u64));
    for (name, flags) in [("mapped", 0), ("heap", grid_flags::HEAP), ("stream", grid_flags::STREAM)] {
        let mut file = GridShiftFile::open(&path, GridFileOptions::default().with_flags(flags)).unwrap();
        group.bench_function(BenchmarkId::new("backend", name), |b| {
            b.iter(|| {
                for p in &points {
                    black_box(file.interpolate(black_box(*p)).unwrap());
                }
            })
        });
    }
    group.finish();
}

fn bench_cell_cache(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_grid(&dir);
    let mut file = GridShiftFile::open(&path, GridFileOptions::default()).unwrap();
    let point = Coordinate::lng_lat(-75.01, 45.01);

    c.bench_function("interpolate/same_cell", |b| {
        b.iter(|| black_box(file.interpolate(black_box(point)).unwrap()))
    });
}

fn bench_inverse(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_grid(&dir);
    let mut file = GridShiftFile::open(&path, GridFileOptions::default()).unwrap();
    let points = random_points(200);

    c.bench_function("inverse/200_points", |b| {
        b.iter(|| {
            for p in &points {
                black_box(file.inverse(black_box(*p)).unwrap());
            }
        })
    });
}

criterion_group!(benches, bench_backends, bench_cell_cache, bench_inverse);
criterion_main!(benches);
