//! Grid-shift file validation utilities
//!
//! Pure validation functions with no I/O dependencies: header markers,
//! dialect and byte order detection, lattice and extent arithmetic.

pub mod bounds;
pub mod format;
pub mod parsing;

pub use bounds::{lattice_nodes, validate_record_count, validate_region};
pub use format::{detect_byte_order, detect_dialect};
pub use parsing::{label_text, names_match, pad_label};
