//! NTv2 overview header definitions
//!
//! The overview header opens every grid-shift file. It names the source and
//! target systems, the unit of the shift values, and the number of sub-grids
//! that follow. Two dialects exist: the standard one where every record is 16
//! bytes, and a packed one where integer records omit their 4 byte pad.

use super::constants::{overview, HEADER_RECORD_COUNT, LABEL_LEN, RECORD_LEN};
use crate::validation::format::{detect_byte_order, detect_dialect, expect_label};
use crate::validation::parsing::{label_text, pad_label};
use crate::{GeodeticError, Result};

/// Byte order of the numeric fields of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Least significant byte first
    Little,
    /// Most significant byte first
    Big,
}

impl ByteOrder {
    /// Read an i32 at `offset`
    pub fn read_i32(self, bytes: &[u8], offset: usize) -> i32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&bytes[offset..offset + 4]);
        match self {
            ByteOrder::Little => i32::from_le_bytes(raw),
            ByteOrder::Big => i32::from_be_bytes(raw),
        }
    }

    /// Read an f64 at `offset`
    pub fn read_f64(self, bytes: &[u8], offset: usize) -> f64 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&bytes[offset..offset + 8]);
        match self {
            ByteOrder::Little => f64::from_le_bytes(raw),
            ByteOrder::Big => f64::from_be_bytes(raw),
        }
    }

    /// Encode an i32
    pub fn i32_bytes(self, value: i32) -> [u8; 4] {
        match self {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        }
    }

    /// Encode an f64
    pub fn f64_bytes(self, value: f64) -> [u8; 8] {
        match self {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        }
    }

    /// Encode an f32
    pub fn f32_bytes(self, value: f32) -> [u8; 4] {
        match self {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        }
    }

    /// True when values in this order must be swapped on the running host
    pub const fn needs_swap(self) -> bool {
        match self {
            ByteOrder::Little => cfg!(target_endian = "big"),
            ByteOrder::Big => cfg!(target_endian = "little"),
        }
    }
}

/// Record layout dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Every record is 16 bytes
    Standard,
    /// Integer records are 12 bytes
    Packed,
}

impl Dialect {
    /// Width of an integer record
    pub const fn int_record_len(self) -> usize {
        match self {
            Dialect::Standard => RECORD_LEN,
            Dialect::Packed => super::constants::PACKED_INT_RECORD_LEN,
        }
    }

    /// Size of the overview header (three integer records, eight others)
    pub const fn overview_len(self) -> usize {
        3 * self.int_record_len() + 8 * RECORD_LEN
    }

    /// Size of a sub-grid header (ten regular records, one integer record)
    pub const fn subgrid_len(self) -> usize {
        10 * RECORD_LEN + self.int_record_len()
    }

    /// Record start offsets of the overview header
    pub const fn overview_offsets(self) -> [usize; 11] {
        let int_len = self.int_record_len();
        let mut offsets = [0usize; 11];
        let mut i = 1;
        while i < 11 {
            let prev_len = if i <= 3 { int_len } else { RECORD_LEN };
            offsets[i] = offsets[i - 1] + prev_len;
            i += 1;
        }
        offsets
    }
}

impl core::fmt::Display for Dialect {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Dialect::Standard => write!(f, "standard"),
            Dialect::Packed => write!(f, "packed"),
        }
    }
}

/// Unit of extents, increments and shift values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridUnits {
    Seconds,
    Minutes,
    Degrees,
}

impl GridUnits {
    /// Parse the `GS_TYPE` text
    pub fn from_label(text: &str) -> Option<Self> {
        match text.trim().to_ascii_uppercase().as_str() {
            "SECONDS" => Some(GridUnits::Seconds),
            "MINUTES" => Some(GridUnits::Minutes),
            "DEGREES" => Some(GridUnits::Degrees),
            _ => None,
        }
    }

    /// The `GS_TYPE` text
    pub const fn label(self) -> &'static str {
        match self {
            GridUnits::Seconds => "SECONDS",
            GridUnits::Minutes => "MINUTES",
            GridUnits::Degrees => "DEGREES",
        }
    }

    /// Multiplier converting one unit into arc seconds
    pub const fn seconds_factor(self) -> f64 {
        match self {
            GridUnits::Seconds => 1.0,
            GridUnits::Minutes => 60.0,
            GridUnits::Degrees => 3600.0,
        }
    }

    /// Multiplier converting one unit into degrees
    pub fn degrees_factor(self) -> f64 {
        self.seconds_factor() / 3600.0
    }
}

/// Overview header of an NTv2 file
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewHeader {
    /// Detected record layout
    pub dialect: Dialect,
    /// Detected byte order
    pub byte_order: ByteOrder,
    /// Number of sub-grids that follow
    pub subgrid_count: usize,
    /// Unit of all angular values
    pub units: GridUnits,
    /// Free-form version text
    pub version: String,
    /// Source system name
    pub system_from: String,
    /// Target system name
    pub system_to: String,
    /// Source ellipsoid semi-major axis
    pub major_from: f64,
    /// Source ellipsoid semi-minor axis
    pub minor_from: f64,
    /// Target ellipsoid semi-major axis
    pub major_to: f64,
    /// Target ellipsoid semi-minor axis
    pub minor_to: f64,
}

impl OverviewHeader {
    /// Parse an overview header, detecting dialect and byte order
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let dialect = detect_dialect(bytes)?;
        if bytes.len() < dialect.overview_len() {
            return Err(GeodeticError::unexpected_eof("file too short for overview header"));
        }
        let byte_order = detect_byte_order(bytes)?;
        let off = dialect.overview_offsets();
        let value = LABEL_LEN;

        expect_label(bytes, off[2], &overview::NUM_FILE)?;
        expect_label(bytes, off[3], &overview::GS_TYPE)?;

        let num_srec = byte_order.read_i32(bytes, off[1] + value);
        if num_srec != HEADER_RECORD_COUNT {
            return Err(GeodeticError::format(format!(
                "NUM_SREC is {num_srec}, expected {HEADER_RECORD_COUNT}"
            )));
        }

        let num_file = byte_order.read_i32(bytes, off[2] + value);
        let subgrid_count = crate::validation::bounds::validate_subgrid_count(num_file)?;

        let gs_type = label_text(&bytes[off[3] + value..off[3] + value + LABEL_LEN]);
        let units = GridUnits::from_label(&gs_type)
            .ok_or_else(|| GeodeticError::format(format!("unsupported GS_TYPE '{gs_type}'")))?;

        let text_at = |k: usize| label_text(&bytes[off[k] + value..off[k] + value + LABEL_LEN]);

        Ok(Self {
            dialect,
            byte_order,
            subgrid_count,
            units,
            version: text_at(4),
            system_from: text_at(5),
            system_to: text_at(6),
            major_from: byte_order.read_f64(bytes, off[7] + value),
            minor_from: byte_order.read_f64(bytes, off[8] + value),
            major_to: byte_order.read_f64(bytes, off[9] + value),
            minor_to: byte_order.read_f64(bytes, off[10] + value),
        })
    }

    /// Serialize in the header's own dialect and byte order
    pub fn to_bytes(&self) -> Vec<u8> {
        let order = self.byte_order;
        let mut bytes = Vec::with_capacity(self.dialect.overview_len());

        let push_int = |bytes: &mut Vec<u8>, label: &[u8; 8], v: i32| {
            bytes.extend_from_slice(label);
            bytes.extend_from_slice(&order.i32_bytes(v));
            if self.dialect == Dialect::Standard {
                bytes.extend_from_slice(&[0u8; 4]);
            }
        };
        push_int(&mut bytes, &overview::NUM_OREC, HEADER_RECORD_COUNT);
        push_int(&mut bytes, &overview::NUM_SREC, HEADER_RECORD_COUNT);
        push_int(&mut bytes, &overview::NUM_FILE, self.subgrid_count as i32);

        for (label, text) in [
            (&overview::GS_TYPE, self.units.label()),
            (&overview::VERSION, self.version.as_str()),
            (&overview::SYSTEM_F, self.system_from.as_str()),
            (&overview::SYSTEM_T, self.system_to.as_str()),
        ] {
            bytes.extend_from_slice(label);
            bytes.extend_from_slice(&pad_label(text));
        }

        for (label, v) in [
            (&overview::MAJOR_F, self.major_from),
            (&overview::MINOR_F, self.minor_from),
            (&overview::MAJOR_T, self.major_to),
            (&overview::MINOR_T, self.minor_to),
        ] {
            bytes.extend_from_slice(label);
            bytes.extend_from_slice(&order.f64_bytes(v));
        }

        bytes
    }
}

impl Default for OverviewHeader {
    fn default() -> Self {
        Self {
            dialect: Dialect::Standard,
            byte_order: ByteOrder::Little,
            subgrid_count: 0,
            units: GridUnits::Seconds,
            version: "NTv2.0".into(),
            system_from: String::new(),
            system_to: String::new(),
            major_from: 0.0,
            minor_from: 0.0,
            major_to: 0.0,
            minor_to: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(dialect: Dialect, byte_order: ByteOrder) -> OverviewHeader {
        OverviewHeader {
            dialect,
            byte_order,
            subgrid_count: 3,
            system_from: "NAD27".into(),
            system_to: "NAD83".into(),
            major_from: 6_378_206.4,
            minor_from: 6_356_583.8,
            major_to: 6_378_137.0,
            minor_to: 6_356_752.314,
            ..OverviewHeader::default()
        }
    }

    #[test]
    fn test_overview_offsets() {
        assert_eq!(Dialect::Standard.overview_offsets()[10], 160);
        assert_eq!(Dialect::Packed.overview_offsets()[1], 12);
        assert_eq!(Dialect::Packed.overview_offsets()[3], 36);
        assert_eq!(Dialect::Packed.overview_offsets()[10], 148);
        assert_eq!(Dialect::Standard.overview_len(), 176);
        assert_eq!(Dialect::Packed.overview_len(), 164);
        assert_eq!(Dialect::Packed.subgrid_len(), 172);
    }

    #[test]
    fn test_parse_all_dialects_and_orders() {
        for dialect in [Dialect::Standard, Dialect::Packed] {
            for order in [ByteOrder::Little, ByteOrder::Big] {
                let header = sample(dialect, order);
                let bytes = header.to_bytes();
                assert_eq!(bytes.len(), dialect.overview_len());
                let parsed = OverviewHeader::from_bytes(&bytes).unwrap();
                assert_eq!(parsed, header);
            }
        }
    }

    #[test]
    fn test_missing_magic_is_format_error() {
        let mut bytes = sample(Dialect::Standard, ByteOrder::Little).to_bytes();
        bytes[0..8].copy_from_slice(b"GARBAGE!");
        assert!(matches!(
            OverviewHeader::from_bytes(&bytes),
            Err(GeodeticError::Format(_))
        ));
    }

    #[test]
    fn test_short_overview_is_io_error() {
        let bytes = sample(Dialect::Standard, ByteOrder::Little).to_bytes();
        assert!(matches!(
            OverviewHeader::from_bytes(&bytes[..100]),
            Err(GeodeticError::Io(_))
        ));
    }

    #[test]
    fn test_unknown_units_rejected() {
        let mut bytes = sample(Dialect::Standard, ByteOrder::Little).to_bytes();
        bytes[56..64].copy_from_slice(b"RADIANS ");
        assert!(OverviewHeader::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_units_factors() {
        assert_eq!(GridUnits::Minutes.seconds_factor(), 60.0);
        assert_eq!(GridUnits::Degrees.degrees_factor(), 1.0);
        assert_eq!(GridUnits::from_label("seconds "), Some(GridUnits::Seconds));
    }
}
