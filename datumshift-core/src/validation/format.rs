//! Format-specific validation for NTv2 headers
//!
//! Pure functions that inspect raw header bytes: marker checks, dialect and
//! byte order detection.

use crate::format::constants::{overview, HEADER_RECORD_COUNT, LABEL_LEN, PACKED_INT_RECORD_LEN, RECORD_LEN};
use crate::format::header::{ByteOrder, Dialect};
use crate::{GeodeticError, Result};

/// Check that `bytes[offset..offset + 8]` equals `expected`
pub fn expect_label(bytes: &[u8], offset: usize, expected: &[u8; LABEL_LEN]) -> Result<()> {
    match bytes.get(offset..offset + LABEL_LEN) {
        Some(actual) if label_matches(actual, expected) => Ok(()),
        Some(actual) => Err(GeodeticError::format(format!(
            "expected label '{}' at offset {offset}, found '{}'",
            String::from_utf8_lossy(expected).trim_end(),
            String::from_utf8_lossy(actual).trim_end()
        ))),
        None => Err(GeodeticError::format(format!(
            "truncated header: no label at offset {offset}"
        ))),
    }
}

/// Case-insensitive label comparison; trailing blanks and NULs are equivalent
pub fn label_matches(actual: &[u8], expected: &[u8; LABEL_LEN]) -> bool {
    if actual.len() != LABEL_LEN {
        return false;
    }
    actual.iter().zip(expected.iter()).all(|(&a, &e)| {
        let a = if a == 0 { b' ' } else { a };
        a.eq_ignore_ascii_case(&e)
    })
}

/// Detect the record layout from the position of the `NUM_SREC` marker
pub fn detect_dialect(bytes: &[u8]) -> Result<Dialect> {
    if bytes.len() < LABEL_LEN || !label_matches(&bytes[..LABEL_LEN], &overview::NUM_OREC) {
        return Err(GeodeticError::format("missing NUM_OREC marker"));
    }
    let at = |offset: usize| {
        bytes
            .get(offset..offset + LABEL_LEN)
            .is_some_and(|b| label_matches(b, &overview::NUM_SREC))
    };
    if at(RECORD_LEN) {
        Ok(Dialect::Standard)
    } else if at(PACKED_INT_RECORD_LEN) {
        Ok(Dialect::Packed)
    } else {
        Err(GeodeticError::format("NUM_SREC marker not found"))
    }
}

/// Detect the byte order from the `NUM_OREC` value, which must be 11
pub fn detect_byte_order(bytes: &[u8]) -> Result<ByteOrder> {
    if bytes.len() < LABEL_LEN + 4 {
        return Err(GeodeticError::unexpected_eof("truncated NUM_OREC record"));
    }
    if ByteOrder::Little.read_i32(bytes, LABEL_LEN) == HEADER_RECORD_COUNT {
        Ok(ByteOrder::Little)
    } else if ByteOrder::Big.read_i32(bytes, LABEL_LEN) == HEADER_RECORD_COUNT {
        Ok(ByteOrder::Big)
    } else {
        Err(GeodeticError::format("NUM_OREC value is garbled"))
    }
}
