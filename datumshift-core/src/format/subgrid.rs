//! Sub-grid header definitions for NTv2 files
//!
//! Each sub-grid header is followed immediately by its shift records.
//! Extents and increments are stored in the file's units with longitudes
//! positive west.

use super::constants::{subgrid, LABEL_LEN, RECORD_LEN, NO_PARENT};
use super::header::{ByteOrder, Dialect};
use crate::validation::format::expect_label;
use crate::validation::parsing::{label_text, names_match, pad_label};
use crate::{GeodeticError, Result};

/// Sub-grid header as stored in the file
#[derive(Debug, Clone, PartialEq)]
pub struct SubGridHeader {
    /// Sub-grid name
    pub name: String,
    /// Parent sub-grid name, `NONE` for top level
    pub parent: String,
    /// Creation date text
    pub created: String,
    /// Update date text
    pub updated: String,
    /// Southern latitude
    pub s_lat: f64,
    /// Northern latitude
    pub n_lat: f64,
    /// Eastern longitude, positive west
    pub e_long: f64,
    /// Western longitude, positive west
    pub w_long: f64,
    /// Latitude increment
    pub lat_inc: f64,
    /// Longitude increment
    pub long_inc: f64,
    /// Number of shift records that follow
    pub gs_count: i32,
}

impl SubGridHeader {
    /// Parse a sub-grid header
    pub fn from_bytes(bytes: &[u8], dialect: Dialect, order: ByteOrder) -> Result<Self> {
        if bytes.len() < dialect.subgrid_len() {
            return Err(GeodeticError::format("truncated sub-grid header"));
        }
        expect_label(bytes, 0, &subgrid::SUB_NAME)?;
        expect_label(bytes, RECORD_LEN, &subgrid::PARENT)?;
        expect_label(bytes, 10 * RECORD_LEN, &subgrid::GS_COUNT)?;

        let text = |k: usize| {
            let start = k * RECORD_LEN + LABEL_LEN;
            label_text(&bytes[start..start + LABEL_LEN])
        };
        let float = |k: usize| order.read_f64(bytes, k * RECORD_LEN + LABEL_LEN);

        Ok(Self {
            name: text(0),
            parent: text(1),
            created: text(2),
            updated: text(3),
            s_lat: float(4),
            n_lat: float(5),
            e_long: float(6),
            w_long: float(7),
            lat_inc: float(8),
            long_inc: float(9),
            gs_count: order.read_i32(bytes, 10 * RECORD_LEN + LABEL_LEN),
        })
    }

    /// Serialize in the given dialect and byte order
    pub fn to_bytes(&self, dialect: Dialect, order: ByteOrder) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(dialect.subgrid_len());

        for (label, text) in [
            (&subgrid::SUB_NAME, self.name.as_str()),
            (&subgrid::PARENT, self.parent.as_str()),
            (&subgrid::CREATED, self.created.as_str()),
            (&subgrid::UPDATED, self.updated.as_str()),
        ] {
            bytes.extend_from_slice(label);
            bytes.extend_from_slice(&pad_label(text));
        }

        for (label, v) in [
            (&subgrid::S_LAT, self.s_lat),
            (&subgrid::N_LAT, self.n_lat),
            (&subgrid::E_LONG, self.e_long),
            (&subgrid::W_LONG, self.w_long),
            (&subgrid::LAT_INC, self.lat_inc),
            (&subgrid::LONG_INC, self.long_inc),
        ] {
            bytes.extend_from_slice(label);
            bytes.extend_from_slice(&order.f64_bytes(v));
        }

        bytes.extend_from_slice(&subgrid::GS_COUNT);
        bytes.extend_from_slice(&order.i32_bytes(self.gs_count));
        if dialect == Dialect::Standard {
            bytes.extend_from_slice(&[0u8; 4]);
        }
        bytes
    }

    /// True for top-level sub-grids
    pub fn is_top_level(&self) -> bool {
        self.parent.is_empty() || names_match(&self.parent, NO_PARENT)
    }
}

impl Default for SubGridHeader {
    fn default() -> Self {
        Self {
            name: String::new(),
            parent: NO_PARENT.into(),
            created: String::new(),
            updated: String::new(),
            s_lat: 0.0,
            n_lat: 0.0,
            e_long: 0.0,
            w_long: 0.0,
            lat_inc: 1.0,
            long_inc: 1.0,
            gs_count: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SubGridHeader {
        SubGridHeader {
            name: "ALBR".into(),
            parent: "NONE".into(),
            created: "19950105".into(),
            updated: "19950105".into(),
            s_lat: 176_400.0,
            n_lat: 216_000.0,
            e_long: 396_000.0,
            w_long: 432_000.0,
            lat_inc: 300.0,
            long_inc: 300.0,
            gs_count: 133 * 121,
        }
    }

    #[test]
    fn test_parse_both_dialects() {
        for dialect in [Dialect::Standard, Dialect::Packed] {
            for order in [ByteOrder::Little, ByteOrder::Big] {
                let bytes = sample().to_bytes(dialect, order);
                assert_eq!(bytes.len(), dialect.subgrid_len());
                let parsed = SubGridHeader::from_bytes(&bytes, dialect, order).unwrap();
                assert_eq!(parsed, sample());
            }
        }
    }

    #[test]
    fn test_top_level_detection() {
        assert!(sample().is_top_level());
        let child = SubGridHeader {
            parent: "ALBR".into(),
            ..sample()
        };
        assert!(!child.is_top_level());
    }

    #[test]
    fn test_wrong_label_rejected() {
        let mut bytes = sample().to_bytes(Dialect::Standard, ByteOrder::Little);
        bytes[0..8].copy_from_slice(b"SUBNAME ");
        assert!(SubGridHeader::from_bytes(&bytes, Dialect::Standard, ByteOrder::Little).is_err());
    }
}
