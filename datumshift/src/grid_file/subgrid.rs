//! Sub-grid records held in a grid file's arena

use datumshift_core::validation::{lattice_nodes, validate_record_count};
use datumshift_core::{Extent, GridUnits, Lattice, Result, SubGridHeader};

/// One sub-grid, extents and spacing in degrees
///
/// Native extents are west-positive as in the file; `extent` is the
/// east-positive rectangle used by the public API.
#[derive(Debug, Clone, PartialEq)]
pub struct SubGrid {
    /// Sub-grid name
    pub name: String,
    /// Parent name as stored in the file
    pub parent_name: String,
    /// Southern latitude
    pub s_lat: f64,
    /// Northern latitude
    pub n_lat: f64,
    /// Eastern edge, positive west
    pub e_lng: f64,
    /// Western edge, positive west
    pub w_lng: f64,
    /// Latitude spacing
    pub lat_inc: f64,
    /// Longitude spacing
    pub lng_inc: f64,
    /// Lattice rows, south to north
    pub rows: usize,
    /// Lattice columns, east to west
    pub cols: usize,
    /// Byte offset of the first shift record
    pub record_offset: usize,
    /// East-positive rectangle
    pub extent: Extent,
    /// Arena index of the parent
    pub parent: Option<usize>,
    /// Arena indices of the children
    pub children: Vec<usize>,
    pub(crate) top_level: bool,
}

impl SubGrid {
    pub(crate) fn from_header(
        header: &SubGridHeader,
        units: GridUnits,
        record_offset: usize,
    ) -> Result<Self> {
        let rows = lattice_nodes(header.s_lat, header.n_lat, header.lat_inc)?;
        let cols = lattice_nodes(header.e_long, header.w_long, header.long_inc)?;
        validate_record_count(rows, cols, header.gs_count)?;

        let to_deg = units.degrees_factor();
        let (s_lat, n_lat) = (header.s_lat * to_deg, header.n_lat * to_deg);
        let (e_lng, w_lng) = (header.e_long * to_deg, header.w_long * to_deg);
        Ok(Self {
            name: header.name.clone(),
            parent_name: header.parent.clone(),
            s_lat,
            n_lat,
            e_lng,
            w_lng,
            lat_inc: header.lat_inc * to_deg,
            lng_inc: header.long_inc * to_deg,
            rows,
            cols,
            record_offset,
            extent: Extent::new(-w_lng, s_lat, -e_lng, n_lat),
            parent: None,
            children: Vec::new(),
            top_level: header.is_top_level(),
        })
    }

    /// Number of shift records
    pub fn record_count(&self) -> usize {
        self.rows * self.cols
    }

    /// True if the file names no parent for this sub-grid
    pub fn is_top_level(&self) -> bool {
        self.top_level
    }

    /// Finest of the two lattice spacings, degrees
    pub fn spacing(&self) -> f64 {
        self.lat_inc.min(self.lng_inc)
    }

    /// Lattice geometry for cell location
    pub fn lattice(&self) -> Lattice {
        Lattice {
            s_lat: self.s_lat,
            e_lng: self.e_lng,
            lat_inc: self.lat_inc,
            lng_inc: self.lng_inc,
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Closed containment of a native point
    pub fn covers(&self, wlng: f64, lat: f64) -> bool {
        lat >= self.s_lat && lat <= self.n_lat && wlng >= self.e_lng && wlng <= self.w_lng
    }

    /// Containment with the north and west edges excluded
    ///
    /// Used while descending into children so that a shared far edge belongs
    /// to the neighbor rather than to this child.
    pub fn covers_excluding_far_edges(&self, wlng: f64, lat: f64) -> bool {
        lat >= self.s_lat && lat < self.n_lat && wlng >= self.e_lng && wlng < self.w_lng
    }

    /// Byte offset of the record at (`row`, `col`)
    pub fn node_offset(&self, row: usize, col: usize) -> usize {
        self.record_offset + self.lattice().node_index(row, col) * datumshift_core::ShiftRecord::SIZE
    }
}
