//! datumshift core - geodetic datum shift definitions
//!
//! This crate provides the pure building blocks of the datum shift engine:
//! the NTv2 grid file wire format, the error taxonomy, bilinear cell math,
//! the iterative inverse, and the traits through which the engine reaches
//! its dictionaries and transformation methods. It performs no file I/O.

pub mod cell;
pub mod coord;
pub mod error;
pub mod failure_blocks;
pub mod format;
pub mod iteration;
pub mod model;
pub mod policy;
pub mod traits;
pub mod validation;

pub use cell::{CellPosition, GridCell, Lattice};
pub use coord::{Coordinate, Extent, ShiftVector, SECONDS_PER_DEGREE};
pub use error::*;
pub use failure_blocks::{BlockInsert, BlockKey, FailureBlocks, DEFAULT_BLOCK_CAPACITY};
pub use format::*;
pub use iteration::{invert_fixed_point, IterationParams};
pub use model::*;
pub use policy::ErrorPolicy;
pub use traits::*;
