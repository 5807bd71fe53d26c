//! Grid file behavior through the public API

mod common;

use datumshift::{
    grid_flags, Backend, Coordinate, GeodeticError, GridFileOptions, GridShiftFile, IterationParams,
    ShiftVector,
};
use proptest::prelude::*;
use rand::{Rng, SeedableRng};

fn open(path: &std::path::Path) -> GridShiftFile {
    GridShiftFile::open(path, GridFileOptions::default()).unwrap()
}

fn is_eof(err: &GeodeticError) -> bool {
    matches!(err, GeodeticError::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
}

#[test]
fn missing_num_orec_is_format_error() {
    let dir = common::tempdir();
    let path = common::single_level(dir.path());
    let mut bytes = std::fs::read(&path).unwrap();
    bytes[..8].copy_from_slice(b"NUM_XXXX");
    std::fs::write(&path, &bytes).unwrap();

    let err = GridShiftFile::open(&path, GridFileOptions::default()).unwrap_err();
    assert!(matches!(err, GeodeticError::Format(_)), "{err:?}");
}

#[test]
fn truncated_records_are_rejected() {
    let dir = common::tempdir();
    let path = common::single_level(dir.path());
    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() - 200]).unwrap();

    for options in [
        GridFileOptions::default(),
        GridFileOptions::default().with_flags(grid_flags::HEAP),
        GridFileOptions::default().with_flags(grid_flags::STREAM),
    ] {
        let err = GridShiftFile::open(&path, options).unwrap_err();
        assert!(is_eof(&err), "{err:?}");
    }
}

#[test]
fn short_overview_is_io_error() {
    let dir = common::tempdir();
    let path = common::single_level(dir.path());
    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..100]).unwrap();

    let err = GridShiftFile::open(&path, GridFileOptions::default()).unwrap_err();
    assert!(is_eof(&err), "{err:?}");
}

#[test]
fn header_and_bounds() {
    let dir = common::tempdir();
    let file = open(&common::single_level(dir.path()));
    assert_eq!(file.header().system_from, "NAD27");
    assert_eq!(file.header().system_to, "NAD83");
    assert_eq!(file.bounds(), common::SINGLE);
    assert_eq!(file.subgrids().len(), 1);
    assert!((file.density() - 0.5).abs() < 1e-12);
    assert!(!file.is_overlapping());
}

#[test]
fn nodes_reproduce_sampled_values() {
    let dir = common::tempdir();
    let mut file = open(&common::single_level(dir.path()));
    for (lng, lat) in [(-80.0, 40.0), (-75.5, 44.0), (-70.0, 50.0), (-72.0, 47.5)] {
        let got = file.interpolate(Coordinate::lng_lat(lng, lat)).unwrap();
        assert!(got.is_clean());
        let want = common::smooth(lng, lat);
        // f32 storage
        assert!((got.value.lng - want.lng).abs() < 1e-10, "lng at {lng},{lat}");
        assert!((got.value.lat - want.lat).abs() < 1e-10, "lat at {lng},{lat}");
    }
}

#[test]
fn hierarchical_descent_prefers_child_except_far_edges() {
    let dir = common::tempdir();
    let mut file = open(&common::nested(dir.path()));
    assert!(!file.is_overlapping());
    assert_eq!(file.subgrids()[0].children, vec![1]);
    assert_eq!(file.subgrids()[1].parent, Some(0));

    assert_eq!(file.locate(-75.0, 45.0), Some(1));
    assert_eq!(file.locate(-74.0, 45.0), Some(1), "east edge belongs to the child");
    assert_eq!(file.locate(-75.0, 44.0), Some(1), "south edge belongs to the child");
    assert_eq!(file.locate(-76.0, 45.0), Some(0), "west edge belongs to the parent");
    assert_eq!(file.locate(-75.0, 46.0), Some(0), "north edge belongs to the parent");
    assert_eq!(file.locate(-79.0, 41.0), Some(0));
    assert_eq!(file.locate(-60.0, 45.0), None);

    let inside = file.interpolate(Coordinate::lng_lat(-75.1, 45.1)).unwrap().value;
    assert!((inside.lat_seconds() - 2.0).abs() < 1e-9);
    let outside = file.interpolate(Coordinate::lng_lat(-78.5, 41.5)).unwrap().value;
    assert!((outside.lat_seconds() - 1.0).abs() < 1e-9);
}

#[test]
fn overlapping_top_levels_use_finest_grid() {
    let dir = common::tempdir();
    let mut file = open(&common::overlapping(dir.path()));
    assert!(file.is_overlapping());
    assert!((file.density() - 0.5).abs() < 1e-12);

    assert_eq!(file.locate(-74.0, 45.0), Some(1));
    assert_eq!(file.locate(-79.0, 41.0), Some(0));
    let shift = file.interpolate(Coordinate::lng_lat(-74.0, 45.0)).unwrap().value;
    assert!((shift.lng_seconds() - 3.0).abs() < 1e-9);
}

#[test]
fn density_override_is_reported() {
    let dir = common::tempdir();
    let path = common::single_level(dir.path());
    let file = GridShiftFile::open(&path, GridFileOptions::default().with_density_override(0.1)).unwrap();
    assert_eq!(file.density(), 0.1);
}

#[test]
fn every_backend_agrees() {
    let dir = common::tempdir();
    let path = common::single_level(dir.path());
    let point = Coordinate::lng_lat(-73.37, 46.21);

    let mut results = Vec::new();
    for (flags, backend) in [
        (0, Backend::Mapped),
        (grid_flags::HEAP, Backend::Heap),
        (grid_flags::STREAM, Backend::Stream),
    ] {
        let mut file = GridShiftFile::open(&path, GridFileOptions::default().with_flags(flags)).unwrap();
        assert_eq!(file.backend(), backend);
        assert_eq!(file.is_reentrant(), backend != Backend::Stream);
        results.push(file.interpolate(point).unwrap().value);
    }
    assert_eq!(results[0], results[1]);
    assert_eq!(results[0], results[2]);
}

#[test]
fn small_buffer_hint_selects_stream() {
    let dir = common::tempdir();
    let path = common::single_level(dir.path());
    let file = GridShiftFile::open(&path, GridFileOptions::default().with_buffer_hint(256)).unwrap();
    assert_eq!(file.backend(), Backend::Stream);
    assert!(!file.is_reentrant());
}

#[test]
fn release_then_reopen() {
    let dir = common::tempdir();
    let path = common::single_level(dir.path());
    let mut file = open(&path);
    let point = Coordinate::lng_lat(-77.3, 42.8);
    let before = file.interpolate(point).unwrap().value;

    file.release();
    assert!(file.is_released());
    assert_eq!(file.bounds(), common::SINGLE);
    let after = file.interpolate(point).unwrap().value;
    assert!(!file.is_released());
    assert_eq!(before, after);
}

#[test]
fn release_then_file_shrinks() {
    let dir = common::tempdir();
    let path = common::single_level(dir.path());
    let mut file = open(&path);
    file.release();
    std::fs::write(&path, b"short").unwrap();
    let err = file.interpolate(Coordinate::lng_lat(-75.0, 45.0)).unwrap_err();
    assert!(is_eof(&err), "{err:?}");
}

#[test]
fn inverse_round_trip_sweep() {
    let dir = common::tempdir();
    let mut file = open(&common::single_level(dir.path()));
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    for _ in 0..500 {
        let p = Coordinate::lng_lat(rng.gen_range(-79.9..-70.1), rng.gen_range(40.1..49.9));
        let q = file.forward(p).unwrap().value;
        let back = file.inverse(q).unwrap();
        assert!(back.is_clean());
        assert!((back.value.lng - p.lng).abs() < 1e-8, "{p:?}");
        assert!((back.value.lat - p.lat).abs() < 1e-8, "{p:?}");
    }
}

#[test]
fn inverse_without_iterations_left_is_soft() {
    let dir = common::tempdir();
    let mut file = open(&common::nested(dir.path()));
    // one evaluation cannot reach a 1e-15 degree residual
    let params = IterationParams::new(1, 1e-15, 1.0);
    let out = file.invert(Coordinate::lng_lat(-78.5, 41.5), &params).unwrap();
    assert!(matches!(out.soft, Some(GeodeticError::Convergence { .. })));
}

#[test]
fn inverse_outside_is_coverage() {
    let dir = common::tempdir();
    let mut file = open(&common::single_level(dir.path()));
    let p = Coordinate::lng_lat(10.0, 10.0);
    let out = file.inverse(p).unwrap();
    assert_eq!(out.value, p);
    assert!(matches!(out.soft, Some(GeodeticError::Coverage { .. })));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn outside_bounds_is_zero_with_coverage_error(lng in -180.0f64..180.0, lat in -90.0f64..90.0) {
        prop_assume!(!common::SINGLE.contains(lng, lat));
        let dir = common::tempdir();
        let mut file = open(&common::single_level(dir.path()));
        let out = file.interpolate(Coordinate::lng_lat(lng, lat)).unwrap();
        prop_assert_eq!(out.value, ShiftVector::ZERO);
        let is_coverage = matches!(out.soft, Some(GeodeticError::Coverage { .. }));
        prop_assert!(is_coverage);
    }

    #[test]
    fn interpolation_is_continuous(lng in -79.99f64..-70.01, lat in 40.01f64..49.99, d_lng in -1e-7f64..1e-7, d_lat in -1e-7f64..1e-7) {
        let dir = common::tempdir();
        let mut file = open(&common::single_level(dir.path()));
        let a = file.interpolate(Coordinate::lng_lat(lng, lat)).unwrap().value;
        let b = file.interpolate(Coordinate::lng_lat(lng + d_lng, lat + d_lat)).unwrap().value;
        prop_assert!((a.lng - b.lng).abs() < 1e-11);
        prop_assert!((a.lat - b.lat).abs() < 1e-11);
    }
}
