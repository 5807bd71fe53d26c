//! Bilinear interpolation over a single lattice cell
//!
//! Cells are addressed by their south-east corner, the node with the smallest
//! row and column index in native (west-positive) order. The shift inside the
//! cell is `AA + BB·u + CC·v + DD·u·v` where `u` grows westward and `v`
//! northward, both normalized to `[0, 1]`.

/// Position of a native point within a sub-grid lattice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellPosition {
    /// Row of the reference (south-east) node
    pub row: usize,
    /// Column of the reference node
    pub col: usize,
    /// Normalized westward offset inside the cell
    pub u: f64,
    /// Normalized northward offset inside the cell
    pub v: f64,
    /// No row exists north of the reference node
    pub north_edge: bool,
    /// No column exists west of the reference node
    pub west_edge: bool,
}

/// Lattice geometry of a sub-grid in native degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lattice {
    /// Southern latitude
    pub s_lat: f64,
    /// Eastern longitude, positive west
    pub e_lng: f64,
    /// Latitude spacing
    pub lat_inc: f64,
    /// Longitude spacing
    pub lng_inc: f64,
    /// Number of rows
    pub rows: usize,
    /// Number of columns
    pub cols: usize,
}

impl Lattice {
    /// Locate the cell holding a native point; the point must be covered
    pub fn locate(&self, wlng: f64, lat: f64) -> CellPosition {
        let (row, v, north_edge) = axis_position(lat - self.s_lat, self.lat_inc, self.rows);
        let (col, u, west_edge) = axis_position(wlng - self.e_lng, self.lng_inc, self.cols);
        CellPosition {
            row,
            col,
            u,
            v,
            north_edge,
            west_edge,
        }
    }

    /// Index of the node at (`row`, `col`) in row-major record order
    pub const fn node_index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }
}

fn axis_position(delta: f64, step: f64, nodes: usize) -> (usize, f64, bool) {
    let last = nodes.saturating_sub(1);
    let raw = (delta / step).floor();
    let index = if raw <= 0.0 {
        0
    } else {
        (raw as usize).min(last)
    };
    let offset = (delta - index as f64 * step) / step;
    if index >= last {
        (last, 0.0, true)
    } else {
        (index, offset.clamp(0.0, 1.0), false)
    }
}

/// Bilinear coefficients of one cell, longitude and latitude components
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GridCell {
    /// South-east corner value
    pub aa: [f64; 2],
    /// South-west minus south-east
    pub bb: [f64; 2],
    /// North-east minus south-east
    pub cc: [f64; 2],
    /// North-west minus south-west minus north-east plus south-east
    pub dd: [f64; 2],
}

impl GridCell {
    /// Build the coefficients from the corner values that exist
    ///
    /// `sw` is absent on the west edge, `ne` on the north edge, and `nw`
    /// whenever either is absent.
    pub fn from_corners(
        se: [f64; 2],
        sw: Option<[f64; 2]>,
        ne: Option<[f64; 2]>,
        nw: Option<[f64; 2]>,
    ) -> Self {
        let mut cell = GridCell {
            aa: se,
            ..GridCell::default()
        };
        for k in 0..2 {
            if let Some(sw) = sw {
                cell.bb[k] = sw[k] - se[k];
            }
            if let Some(ne) = ne {
                cell.cc[k] = ne[k] - se[k];
            }
            if let (Some(sw), Some(ne), Some(nw)) = (sw, ne, nw) {
                cell.dd[k] = nw[k] - sw[k] - ne[k] + se[k];
            }
        }
        cell
    }

    /// Evaluate the bilinear surface at (`u`, `v`)
    pub fn evaluate(&self, u: f64, v: f64) -> [f64; 2] {
        let mut out = [0.0; 2];
        for (k, slot) in out.iter_mut().enumerate() {
            *slot = self.aa[k] + self.bb[k] * u + self.cc[k] * v + self.dd[k] * u * v;
        }
        out
    }
}
