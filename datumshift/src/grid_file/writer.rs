//! Grid file serialization
//!
//! Produces NTv2 files in either dialect and byte order. Used to build test
//! fixtures and to export sampled shift surfaces.

use datumshift_core::format::constants::{END, NO_PARENT, RECORD_LEN};
use datumshift_core::validation::{lattice_nodes, validate_record_count};
use datumshift_core::{
    ByteOrder, Dialect, Extent, GeodeticError, GridUnits, OverviewHeader, Result, ShiftRecord,
    ShiftVector, SubGridHeader, SECONDS_PER_DEGREE,
};
use std::{fs::File, io::Write, path::Path};

/// Builder for grid shift files
#[derive(Debug, Clone)]
pub struct GridFileWriter {
    header: OverviewHeader,
    subgrids: Vec<(SubGridHeader, Vec<ShiftRecord>)>,
    end_marker: bool,
}

impl GridFileWriter {
    /// Start a standard little-endian file in the given units
    pub fn new(units: GridUnits) -> Self {
        Self {
            header: OverviewHeader {
                units,
                ..OverviewHeader::default()
            },
            subgrids: Vec::new(),
            end_marker: true,
        }
    }

    /// Set the record layout
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.header.dialect = dialect;
        self
    }

    /// Set the byte order
    pub fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.header.byte_order = order;
        self
    }

    /// Set the source and target system names
    pub fn with_systems(mut self, from: &str, to: &str) -> Self {
        self.header.system_from = from.into();
        self.header.system_to = to.into();
        self
    }

    /// Whether to append the `END` trailer
    pub fn with_end_marker(mut self, end_marker: bool) -> Self {
        self.end_marker = end_marker;
        self
    }

    /// Append a sub-grid with its records in file order
    pub fn add_subgrid(&mut self, header: SubGridHeader, records: Vec<ShiftRecord>) -> Result<&mut Self> {
        if header.gs_count < 0 || header.gs_count as usize != records.len() {
            return Err(GeodeticError::format(format!(
                "sub-grid {} declares {} records but {} were supplied",
                header.name,
                header.gs_count,
                records.len()
            )));
        }
        self.subgrids.push((header, records));
        Ok(self)
    }

    /// Append a sub-grid sampled from a shift function
    ///
    /// `extent` is east-positive degrees and must be a whole number of
    /// spacings wide and tall. `sample` receives east-positive node
    /// coordinates and returns the shift in degrees.
    pub fn add_sampled(
        &mut self,
        name: &str,
        parent: Option<&str>,
        extent: Extent,
        lat_inc: f64,
        lng_inc: f64,
        mut sample: impl FnMut(f64, f64) -> ShiftVector,
    ) -> Result<&mut Self> {
        let rows = lattice_nodes(extent.min_lat, extent.max_lat, lat_inc)?;
        let cols = lattice_nodes(extent.min_lng, extent.max_lng, lng_inc)?;
        let to_units = 1.0 / self.header.units.degrees_factor();
        let seconds_to_units = 1.0 / self.header.units.seconds_factor();

        let mut records = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            let lat = extent.min_lat + row as f64 * lat_inc;
            for col in 0..cols {
                let lng = extent.max_lng - col as f64 * lng_inc;
                let shift = sample(lng, lat);
                records.push(ShiftRecord::new(
                    (shift.lat * SECONDS_PER_DEGREE * seconds_to_units) as f32,
                    (-shift.lng * SECONDS_PER_DEGREE * seconds_to_units) as f32,
                ));
            }
        }

        let gs_count = i32::try_from(rows * cols)
            .map_err(|_| GeodeticError::format("sub-grid too large to write"))?;
        validate_record_count(rows, cols, gs_count)?;
        let header = SubGridHeader {
            name: name.into(),
            parent: parent.unwrap_or(NO_PARENT).into(),
            s_lat: extent.min_lat * to_units,
            n_lat: extent.max_lat * to_units,
            e_long: -extent.max_lng * to_units,
            w_long: -extent.min_lng * to_units,
            lat_inc: lat_inc * to_units,
            long_inc: lng_inc * to_units,
            gs_count,
            ..SubGridHeader::default()
        };
        self.add_subgrid(header, records)
    }

    /// Serialize the file
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut header = self.header.clone();
        header.subgrid_count = self.subgrids.len();
        let dialect = header.dialect;
        let order = header.byte_order;

        let records: usize = self.subgrids.iter().map(|(_, r)| r.len()).sum();
        let mut bytes = Vec::with_capacity(
            dialect.overview_len()
                + self.subgrids.len() * dialect.subgrid_len()
                + records * ShiftRecord::SIZE
                + RECORD_LEN,
        );
        bytes.extend_from_slice(&header.to_bytes());
        for (sub, records) in &self.subgrids {
            bytes.extend_from_slice(&sub.to_bytes(dialect, order));
            for record in records {
                bytes.extend_from_slice(&record.to_bytes(order));
            }
        }
        if self.end_marker {
            bytes.extend_from_slice(&END);
            bytes.extend_from_slice(&[0u8; RECORD_LEN - END.len()]);
        }
        Ok(bytes)
    }

    /// Write the file to `path`
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        let mut file = File::create(path)?;
        file.write_all(&bytes)?;
        file.flush()?;
        Ok(())
    }
}
