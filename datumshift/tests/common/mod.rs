//! Grid files shared by the integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use datumshift::{Extent, GridFileWriter, GridUnits, ShiftVector};
use tempfile::TempDir;

/// Smooth shift field, a few tenths of an arc second
pub fn smooth(lng: f64, lat: f64) -> ShiftVector {
    ShiftVector::new(
        (0.4 + 0.05 * (lng * 0.7).sin()) / 3600.0,
        (-0.3 + 0.04 * (lat * 0.9).cos()) / 3600.0,
    )
}

/// Constant shift given in arc seconds
pub fn constant(lng_seconds: f64, lat_seconds: f64) -> impl FnMut(f64, f64) -> ShiftVector {
    move |_, _| ShiftVector::new(lng_seconds / 3600.0, lat_seconds / 3600.0)
}

/// Extent of the single-level test grid
pub const SINGLE: Extent = Extent::new(-80.0, 40.0, -70.0, 50.0);

pub fn write(dir: &Path, name: &str, writer: &GridFileWriter) -> PathBuf {
    let path = dir.join(name);
    writer.write_to(&path).unwrap();
    path
}

/// One sub-grid over [`SINGLE`] at half-degree spacing
pub fn single_level(dir: &Path) -> PathBuf {
    let mut writer = GridFileWriter::new(GridUnits::Seconds).with_systems("NAD27", "NAD83");
    writer.add_sampled("CANADA", None, SINGLE, 0.5, 0.5, smooth).unwrap();
    write(dir, "single.gsb", &writer)
}

/// A parent over [`SINGLE`] and a finer child over -76..-74, 44..46
pub fn nested(dir: &Path) -> PathBuf {
    let mut writer = GridFileWriter::new(GridUnits::Seconds);
    writer
        .add_sampled("PARENT", None, SINGLE, 1.0, 1.0, constant(1.0, 1.0))
        .unwrap()
        .add_sampled(
            "CHILD",
            Some("PARENT"),
            Extent::new(-76.0, 44.0, -74.0, 46.0),
            0.25,
            0.25,
            constant(2.0, 2.0),
        )
        .unwrap();
    write(dir, "nested.gsb", &writer)
}

/// Two parentless sub-grids, the second finer and strictly inside the first
pub fn overlapping(dir: &Path) -> PathBuf {
    let mut writer = GridFileWriter::new(GridUnits::Seconds);
    writer
        .add_sampled("COARSE", None, SINGLE, 1.0, 1.0, constant(1.0, 1.0))
        .unwrap()
        .add_sampled(
            "FINE",
            None,
            Extent::new(-76.0, 42.0, -72.0, 48.0),
            0.5,
            0.5,
            constant(3.0, 3.0),
        )
        .unwrap();
    write(dir, "overlap.gsb", &writer)
}

pub fn tempdir() -> TempDir {
    tempfile::tempdir().unwrap()
}
