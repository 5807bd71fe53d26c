//! Soft error policies applied over real grid bridges

mod common;

use std::path::Path;

use datumshift::{
    Bridge, BridgeBuilder, ConversionDispatcher, Coordinate, Datum, DatumRegistry, Ellipsoid, ErrorPolicy,
    GeodeticError, GeodeticTransformation, IterationParams, MethodDef, SoftErrorKind, Status,
    TransformationRegistry,
};
use datumshift_core::model::{GridFileDef, GridShiftDef};

fn registries(grid: &Path, iteration: IterationParams) -> (DatumRegistry, TransformationRegistry) {
    let mut datums = DatumRegistry::new();
    for name in ["LOCAL", "NAD27", "NAD83"] {
        datums.insert(Datum::new(name, Ellipsoid::grs80()));
    }
    let mut transformations = TransformationRegistry::new();
    transformations
        .insert(GeodeticTransformation::new(
            "LOCAL_to_NAD27",
            "LOCAL",
            "NAD27",
            MethodDef::GeocentricTranslation {
                dx: 0.5,
                dy: 0.0,
                dz: 5.0,
            },
        ))
        .unwrap()
        .insert(
            GeodeticTransformation::new(
                "NAD27_to_NAD83",
                "NAD27",
                "NAD83",
                MethodDef::GridShift(GridShiftDef {
                    files: vec![GridFileDef::forward(grid.display().to_string())],
                    fallback: None,
                }),
            )
            .with_iteration(iteration),
        )
        .unwrap();
    (datums, transformations)
}

fn grid_bridge(grid: &Path, policy: ErrorPolicy) -> Bridge {
    let (datums, transformations) = registries(grid, IterationParams::default());
    BridgeBuilder::new(&datums)
        .with_transformations(&transformations)
        .build("NAD27", "NAD83", policy)
        .unwrap()
}

/// One point in each of `n` distinct one-degree blocks west of the grid
fn outside(n: usize) -> Vec<Coordinate> {
    (0..n).map(|i| Coordinate::lng_lat(-100.5 - i as f64, 35.5)).collect()
}

#[test]
fn once_per_block_reports_until_blocks_run_out() {
    let dir = common::tempdir();
    let mut bridge = grid_bridge(&common::single_level(dir.path()), ErrorPolicy::WarnOncePerBlock);
    let dispatcher = ConversionDispatcher::new();

    let results = dispatcher.convert_all(&mut bridge, &outside(11), false);
    let reported = results.iter().filter(|r| r.status.is_reported()).count();
    assert_eq!(reported, 10);
    assert!(matches!(
        results[10].status,
        Status::Soft {
            kind: SoftErrorKind::OutsideCoverageUnshifted,
            reported: false
        }
    ));
    for (result, input) in results.iter().zip(outside(11)) {
        assert_eq!(result.coordinate, input);
    }

    // same block again stays quiet
    assert!(!dispatcher.convert(&mut bridge, outside(1)[0], false).status.is_reported());
    bridge.reset_failures();
    assert!(dispatcher.convert(&mut bridge, outside(1)[0], false).status.is_reported());
}

#[test]
fn then_fail_escalates_on_eleventh_block() {
    let dir = common::tempdir();
    let mut bridge = grid_bridge(&common::single_level(dir.path()), ErrorPolicy::WarnOncePerBlockThenFail);
    let dispatcher = ConversionDispatcher::new();
    let points = outside(11);

    for point in &points[..10] {
        assert!(dispatcher.convert(&mut bridge, *point, false).status.is_reported());
    }
    let out = dispatcher.convert(&mut bridge, points[10], false);
    assert!(matches!(out.status, Status::Hard(GeodeticError::Coverage { .. })));
    assert_eq!(out.coordinate, points[10]);

    // points inside coverage are unaffected
    let inside = dispatcher.convert(&mut bridge, Coordinate::lng_lat(-75.3, 45.2), false);
    assert!(inside.status.is_ok());
}

#[test]
fn fail_fast_returns_input() {
    let dir = common::tempdir();
    let mut bridge = grid_bridge(&common::single_level(dir.path()), ErrorPolicy::FailFast);
    let point = Coordinate::new(-100.5, 35.5, 42.0);
    let out = ConversionDispatcher::new().convert(&mut bridge, point, true);
    assert!(out.status.is_hard());
    assert_eq!(out.coordinate, point);
}

#[test]
fn hard_failure_mid_bridge_returns_original() {
    let dir = common::tempdir();
    let grid = common::single_level(dir.path());
    // one iteration with no error allowance cannot satisfy the inverse
    let (datums, transformations) = registries(&grid, IterationParams::new(1, 1e-15, 1e-15));
    let mut bridge = BridgeBuilder::new(&datums)
        .with_transformations(&transformations)
        .build("LOCAL", "NAD27", ErrorPolicy::Ignore)
        .unwrap();
    assert_eq!(bridge.len(), 1);
    let dispatcher = ConversionDispatcher::new();
    let moved = dispatcher.convert(&mut bridge, Coordinate::lng_lat(-75.3, 45.2), false);
    assert!(moved.status.is_ok());

    let mut bridge = BridgeBuilder::new(&datums)
        .with_transformations(&transformations)
        .build("LOCAL", "NAD83", ErrorPolicy::Ignore)
        .unwrap();
    assert_eq!(bridge.len(), 2);
    let forward = dispatcher.convert(&mut bridge, Coordinate::lng_lat(-75.3, 45.2), false);
    assert!(forward.status.is_ok());

    let mut back = BridgeBuilder::new(&datums)
        .with_transformations(&transformations)
        .build("NAD83", "LOCAL", ErrorPolicy::Ignore)
        .unwrap();
    let start = Coordinate::new(-75.3, 45.2, 7.0);
    let out = dispatcher.convert(&mut back, start, false);
    assert!(matches!(out.status, Status::Hard(GeodeticError::System(_))));
    assert_eq!(out.coordinate, start);
}

#[test]
fn heights_follow_dimension() {
    let dir = common::tempdir();
    let grid = common::single_level(dir.path());
    let (datums, transformations) = registries(&grid, IterationParams::default());
    let mut bridge = BridgeBuilder::new(&datums)
        .with_transformations(&transformations)
        .build("LOCAL", "NAD83", ErrorPolicy::FailFast)
        .unwrap();
    let dispatcher = ConversionDispatcher::new();
    let start = Coordinate::new(-75.3, 45.2, 100.0);

    let flat = dispatcher.convert(&mut bridge, start, false);
    assert!(flat.status.is_ok());
    assert_eq!(flat.coordinate.hgt, 100.0);

    let full = dispatcher.convert(&mut bridge, start, true);
    assert!(full.status.is_ok());
    assert!((full.coordinate.hgt - 100.0).abs() > 1.0);
    assert!((full.coordinate.lng - flat.coordinate.lng).abs() < 1e-9);
}

#[test]
fn policy_change_keeps_blocks() {
    let dir = common::tempdir();
    let mut bridge = grid_bridge(&common::single_level(dir.path()), ErrorPolicy::WarnOncePerBlock);
    let dispatcher = ConversionDispatcher::new();
    let point = outside(1)[0];
    assert!(dispatcher.convert(&mut bridge, point, false).status.is_reported());

    bridge.set_policy(ErrorPolicy::WarnAlways);
    assert!(dispatcher.convert(&mut bridge, point, false).status.is_reported());
    bridge.set_policy(ErrorPolicy::Ignore);
    assert!(!dispatcher.convert(&mut bridge, point, false).status.is_reported());
    assert_eq!(bridge.failure_blocks().len(), 1);
}
