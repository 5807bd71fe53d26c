//! Shift record definitions
//!
//! A shift record is four f32 values: latitude shift, longitude shift
//! (positive west), latitude accuracy and longitude accuracy, all in the
//! file's units.

use super::constants::SHIFT_RECORD_LEN;
use super::header::ByteOrder;
use crate::{GeodeticError, Result};

/// One lattice node of a sub-grid
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShiftRecord {
    /// Latitude shift, positive north
    pub lat_shift: f32,
    /// Longitude shift, positive west
    pub lng_shift: f32,
    /// Latitude shift accuracy
    pub lat_accuracy: f32,
    /// Longitude shift accuracy
    pub lng_accuracy: f32,
}

impl ShiftRecord {
    /// Size of the record in bytes
    pub const SIZE: usize = SHIFT_RECORD_LEN;

    /// Create a record without accuracy information
    pub const fn new(lat_shift: f32, lng_shift: f32) -> Self {
        Self {
            lat_shift,
            lng_shift,
            lat_accuracy: 0.0,
            lng_accuracy: 0.0,
        }
    }

    /// Decode a record, swapping each field when the file order differs
    /// from the host order
    pub fn from_bytes(bytes: &[u8], order: ByteOrder) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(GeodeticError::format("truncated shift record"));
        }
        let raw: [u32; 4] = bytemuck::pod_read_unaligned(&bytes[..Self::SIZE]);
        let field = |i: usize| {
            let bits = if order.needs_swap() {
                raw[i].swap_bytes()
            } else {
                raw[i]
            };
            f32::from_bits(bits)
        };
        Ok(Self {
            lat_shift: field(0),
            lng_shift: field(1),
            lat_accuracy: field(2),
            lng_accuracy: field(3),
        })
    }

    /// Encode the record in the given byte order
    pub fn to_bytes(&self, order: ByteOrder) -> [u8; SHIFT_RECORD_LEN] {
        let mut out = [0u8; SHIFT_RECORD_LEN];
        for (i, v) in [
            self.lat_shift,
            self.lng_shift,
            self.lat_accuracy,
            self.lng_accuracy,
        ]
        .into_iter()
        .enumerate()
        {
            out[i * 4..i * 4 + 4].copy_from_slice(&order.f32_bytes(v));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_in_both_orders() {
        let record = ShiftRecord {
            lat_shift: 1.25,
            lng_shift: -3.5,
            lat_accuracy: 0.01,
            lng_accuracy: 0.02,
        };
        for order in [ByteOrder::Little, ByteOrder::Big] {
            let bytes = record.to_bytes(order);
            assert_eq!(ShiftRecord::from_bytes(&bytes, order).unwrap(), record);
        }
    }

    #[test]
    fn test_unaligned_decode() {
        let mut buffer = vec![0u8; 17];
        buffer[1..].copy_from_slice(&ShiftRecord::new(7.0, 8.0).to_bytes(ByteOrder::Little));
        let decoded = ShiftRecord::from_bytes(&buffer[1..], ByteOrder::Little).unwrap();
        assert_eq!(decoded.lat_shift, 7.0);
        assert_eq!(decoded.lng_shift, 8.0);
    }

    #[test]
    fn test_truncated_record() {
        assert!(ShiftRecord::from_bytes(&[0u8; 15], ByteOrder::Little).is_err());
    }
}
