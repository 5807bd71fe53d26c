//! Executable transformation method interface

use crate::{Coordinate, Outcome, Result};

/// A transformation method ready to apply to coordinates
///
/// Soft failures return a best-effort coordinate inside [`Outcome`]; hard
/// failures return `Err` and leave no usable value. Methods take `&mut self`
/// because grid-backed methods cache cells and reopen released files.
pub trait ShiftMethod {
    /// Source to target, height untouched
    fn forward_2d(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>>;

    /// Source to target including height
    fn forward_3d(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>>;

    /// Target to source, height untouched
    fn inverse_2d(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>>;

    /// Target to source including height
    fn inverse_3d(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>>;

    /// True if the method is a mathematical identity
    fn is_null(&self) -> bool;

    /// True if the method may be used from more than one conversion at once
    fn is_reentrant(&self) -> bool {
        true
    }

    /// Drop cached resources; the method stays usable
    fn release(&mut self) {}
}
