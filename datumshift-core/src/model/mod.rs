//! Datum, transformation and path data model

pub mod datum;
pub mod path;
pub mod transform;

pub use datum::{Datum, Ellipsoid, LegacyMethod, LegacyParameters};
pub use path::{Direction, GeodeticPath, PathStep};
pub use transform::{
    GeodeticTransformation, GridFileDef, GridShiftDef, MethodDef, RegressionDef, SevenParams, Term,
};

/// Datum name comparison used throughout resolution
pub fn same_datum(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
