//! Binary format definitions for NTv2 grid-shift files
//!
//! This module contains pure data structure definitions for the wire format.
//! No I/O operations, only parsing and serialization of byte slices.

pub mod constants;
pub mod header;
pub mod record;
pub mod subgrid;

pub use header::{ByteOrder, Dialect, GridUnits, OverviewHeader};
pub use record::ShiftRecord;
pub use subgrid::SubGridHeader;
