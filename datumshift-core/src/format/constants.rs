//! Format constants and record labels for NTv2 grid-shift files

/// Width of every record label
pub const LABEL_LEN: usize = 8;

/// Width of a labelled record in the standard dialect
pub const RECORD_LEN: usize = 16;

/// Width of an integer record in the packed dialect (no trailing pad)
pub const PACKED_INT_RECORD_LEN: usize = 12;

/// Size of one shift record: four f32 values
pub const SHIFT_RECORD_LEN: usize = 16;

/// Expected value of the `NUM_OREC` and `NUM_SREC` fields
pub const HEADER_RECORD_COUNT: i32 = 11;

/// Upper bound on sub-grids per file to prevent memory exhaustion
pub const MAX_SUBGRID_COUNT: usize = 100_000;

/// Upper bound on records per sub-grid
pub const MAX_RECORDS_PER_SUBGRID: usize = 1 << 28;

/// Parent name used by top-level sub-grids
pub const NO_PARENT: &str = "NONE";

/// Overview header labels
pub mod overview {
    pub const NUM_OREC: [u8; 8] = *b"NUM_OREC";
    pub const NUM_SREC: [u8; 8] = *b"NUM_SREC";
    pub const NUM_FILE: [u8; 8] = *b"NUM_FILE";
    pub const GS_TYPE: [u8; 8] = *b"GS_TYPE ";
    pub const VERSION: [u8; 8] = *b"VERSION ";
    pub const SYSTEM_F: [u8; 8] = *b"SYSTEM_F";
    pub const SYSTEM_T: [u8; 8] = *b"SYSTEM_T";
    pub const MAJOR_F: [u8; 8] = *b"MAJOR_F ";
    pub const MINOR_F: [u8; 8] = *b"MINOR_F ";
    pub const MAJOR_T: [u8; 8] = *b"MAJOR_T ";
    pub const MINOR_T: [u8; 8] = *b"MINOR_T ";
}

/// Sub-grid header labels
pub mod subgrid {
    pub const SUB_NAME: [u8; 8] = *b"SUB_NAME";
    pub const PARENT: [u8; 8] = *b"PARENT  ";
    pub const CREATED: [u8; 8] = *b"CREATED ";
    pub const UPDATED: [u8; 8] = *b"UPDATED ";
    pub const S_LAT: [u8; 8] = *b"S_LAT   ";
    pub const N_LAT: [u8; 8] = *b"N_LAT   ";
    pub const E_LONG: [u8; 8] = *b"E_LONG  ";
    pub const W_LONG: [u8; 8] = *b"W_LONG  ";
    pub const LAT_INC: [u8; 8] = *b"LAT_INC ";
    pub const LONG_INC: [u8; 8] = *b"LONG_INC";
    pub const GS_COUNT: [u8; 8] = *b"GS_COUNT";
}

/// Trailer label
pub const END: [u8; 8] = *b"END     ";

/// Flags accepted when opening a grid file
pub mod grid_flags {
    /// Read records through a buffered file handle instead of an image
    pub const STREAM: u32 = 1 << 0;
    /// Copy the whole file into heap memory instead of mapping it
    pub const HEAP: u32 = 1 << 1;
    /// Require the `END` trailer record
    pub const STRICT_END: u32 = 1 << 2;
}
