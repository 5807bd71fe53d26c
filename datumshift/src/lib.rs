//! datumshift - geodetic datum transformation engine
//!
//! This library moves geographic coordinates between datums. It reads NTv2
//! grid shift files, resolves a chain of transformations between two datums,
//! and applies that chain point by point under a configurable soft error
//! policy.
//!
//! ## Architecture
//!
//! - **datumshift-core**: wire format, error taxonomy, data model, cell math
//!   and the dictionary and method traits (no I/O)
//! - **datumshift**: grid files, executable methods, dictionaries, bridge
//!   resolution and conversion
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use datumshift::{BridgeBuilder, Catalog, ConversionDispatcher, Coordinate, ErrorPolicy};
//!
//! fn example() -> datumshift::Result<()> {
//!     let registries = Catalog::from_json_file("catalog.json")?.into_registries()?;
//!     let builder = BridgeBuilder::new(&registries.datums)
//!         .with_transformations(&registries.transformations)
//!         .with_paths(&registries.paths);
//!     let mut bridge = builder.build("NAD27", "NAD83", ErrorPolicy::WarnOncePerBlock)?;
//!
//!     let out = ConversionDispatcher::new().convert(&mut bridge, Coordinate::lng_lat(-79.5, 43.7), false);
//!     println!("{:.9} {:.9} {:?}", out.coordinate.lng, out.coordinate.lat, out.status);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **mmap** (default): memory-mapped grid file images
//! - **serde** (default): JSON catalogs and configuration
//! - **cli** (default): the `datumshift` binary

pub use datumshift_core::{
    // Data model
    Coordinate, Datum, Direction, Ellipsoid, Extent, GeodeticPath, GeodeticTransformation,
    LegacyMethod, LegacyParameters, MethodDef, PathStep, ShiftVector,
    // Traits
    DatumDictionary, Lookup, PathDictionary, PivotList, ShiftMethod, TransformationDictionary,
    // Errors and policy
    ErrorPolicy, GeodeticError, IterationParams, Outcome, Result, Severity,
    // Wire format
    ByteOrder, Dialect, GridUnits, OverviewHeader, ShiftRecord, SubGridHeader,
};
pub use datumshift_core::format::constants::grid_flags;

pub mod bridge;
#[cfg(feature = "serde")]
pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod grid_file;
pub mod methods;
pub mod registry;

pub use bridge::{Bridge, BridgeBuilder, Resolution, Segment, MAX_BRIDGE_SEGMENTS};
#[cfg(feature = "serde")]
pub use catalog::{Catalog, DatumEntry, Registries};
pub use config::EngineConfig;
pub use dispatch::{Conversion, ConversionDispatcher, SoftErrorKind, Status};
pub use grid_file::{Backend, GridFileOptions, GridFileWriter, GridShiftFile, SubGrid};
pub use methods::{Method, MethodContext};
pub use registry::{DatumRegistry, PathRegistry, PivotDatums, TransformationRegistry, DEFAULT_PIVOTS};
