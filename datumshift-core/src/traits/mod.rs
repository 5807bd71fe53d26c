//! Collaborator interfaces
//!
//! The engine consumes dictionaries as read-only services and applies
//! transformations through [`ShiftMethod`]. Traits only, no implementations.

pub mod dictionary;
pub mod method;

pub use dictionary::{
    orientation, DatumDictionary, Lookup, PathDictionary, PivotList, TransformationDictionary,
};
pub use method::ShiftMethod;
