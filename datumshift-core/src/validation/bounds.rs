//! Extent and lattice validation for grid-shift sub-grids
//!
//! Pure arithmetic checks with overflow protection; no I/O.

use crate::format::constants::{MAX_RECORDS_PER_SUBGRID, MAX_SUBGRID_COUNT, SHIFT_RECORD_LEN};
use crate::{GeodeticError, Result};

/// Validate the declared sub-grid count
pub fn validate_subgrid_count(declared: i32) -> Result<usize> {
    if declared <= 0 {
        return Err(GeodeticError::format(format!(
            "NUM_FILE must be positive, found {declared}"
        )));
    }
    let count = declared as usize;
    if count > MAX_SUBGRID_COUNT {
        return Err(GeodeticError::format(format!(
            "NUM_FILE {count} exceeds limit of {MAX_SUBGRID_COUNT}"
        )));
    }
    Ok(count)
}

/// Number of lattice nodes spanning `[low, high]` at spacing `step`
///
/// Extents are expected to be whole multiples of the step; the quotient is
/// rounded to absorb representation error.
pub fn lattice_nodes(low: f64, high: f64, step: f64) -> Result<usize> {
    if !(low.is_finite() && high.is_finite() && step.is_finite()) {
        return Err(GeodeticError::format("non-finite sub-grid extent"));
    }
    if step <= 0.0 {
        return Err(GeodeticError::format(format!(
            "lattice increment must be positive, found {step}"
        )));
    }
    if high < low {
        return Err(GeodeticError::format(format!(
            "sub-grid extent is inverted: {low} > {high}"
        )));
    }
    let spans = ((high - low) / step).round();
    if spans >= MAX_RECORDS_PER_SUBGRID as f64 {
        return Err(GeodeticError::format("sub-grid lattice is too large"));
    }
    Ok(spans as usize + 1)
}

/// Validate that `rows * cols` equals the declared record count
pub fn validate_record_count(rows: usize, cols: usize, declared: i32) -> Result<usize> {
    let expected = rows
        .checked_mul(cols)
        .ok_or_else(|| GeodeticError::format("sub-grid lattice size overflows"))?;
    if declared < 0 || declared as usize != expected {
        return Err(GeodeticError::format(format!(
            "GS_COUNT {declared} does not match {rows} rows x {cols} columns"
        )));
    }
    if expected > MAX_RECORDS_PER_SUBGRID {
        return Err(GeodeticError::format("sub-grid record count exceeds limit"));
    }
    Ok(expected)
}

/// Byte length of `count` shift records, with overflow protection
pub fn records_byte_len(count: usize) -> Result<usize> {
    count
        .checked_mul(SHIFT_RECORD_LEN)
        .ok_or_else(|| GeodeticError::format("record block size overflows"))
}

/// Check that `[offset, offset + len)` lies within `total`
pub fn validate_region(offset: usize, len: usize, total: usize) -> Result<()> {
    let end = offset
        .checked_add(len)
        .ok_or_else(|| GeodeticError::format("region end overflows"))?;
    if end > total {
        return Err(GeodeticError::unexpected_eof(format!(
            "region {offset}..{end} extends beyond file of {total} bytes"
        )));
    }
    Ok(())
}
