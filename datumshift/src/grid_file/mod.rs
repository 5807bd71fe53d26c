//! NTv2 grid shift files
//!
//! [`GridShiftFile`] parses the overview and sub-grid headers once, resolves
//! the sub-grid hierarchy into an index arena, and interpolates shifts from
//! the lattice records on demand. Coordinates crossing this API are
//! east-positive degrees; the file's west-positive convention stays inside.

mod image;
mod subgrid;
mod writer;

pub use image::Backend;
pub use subgrid::SubGrid;
pub use writer::GridFileWriter;

use datumshift_core::format::constants::{grid_flags, END, LABEL_LEN};
use datumshift_core::validation::bounds::records_byte_len;
use datumshift_core::validation::format::expect_label;
use datumshift_core::{
    invert_fixed_point, Coordinate, Dialect, Extent, GeodeticError, GridCell, IterationParams,
    Outcome, OverviewHeader, Result, ShiftRecord, ShiftVector, SubGridHeader,
};
use hashbrown::HashMap;
use image::GridImage;
use std::path::{Path, PathBuf};

/// Options controlling how a grid file is opened
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridFileOptions {
    /// Stream buffer size; a non-zero hint smaller than the file selects
    /// the streamed backend
    pub buffer_hint: usize,
    /// Bit set of [`grid_flags`]
    pub flags: u32,
    /// Reported density in degrees instead of the finest lattice spacing
    pub density_override: Option<f64>,
}

impl GridFileOptions {
    /// Set the stream buffer hint
    pub fn with_buffer_hint(mut self, buffer_hint: usize) -> Self {
        self.buffer_hint = buffer_hint;
        self
    }

    /// Replace the flag set
    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    /// Override the reported density
    pub fn with_density_override(mut self, density: f64) -> Self {
        self.density_override = Some(density);
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct CachedCell {
    subgrid: usize,
    row: usize,
    col: usize,
    cell: GridCell,
}

/// An opened grid shift file
#[derive(Debug)]
pub struct GridShiftFile {
    path: PathBuf,
    options: GridFileOptions,
    header: OverviewHeader,
    backend: Backend,
    subgrids: Vec<SubGrid>,
    top_level: Vec<usize>,
    overlapping: bool,
    bounds: Extent,
    density: f64,
    iteration: IterationParams,
    image: Option<GridImage>,
    cell: Option<CachedCell>,
}

impl GridShiftFile {
    /// Open and index a grid file
    pub fn open<P: AsRef<Path>>(path: P, options: GridFileOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file_len = std::fs::metadata(&path)?.len();
        let backend = Backend::select(&options, file_len);
        let mut image = GridImage::open(&path, backend, options.buffer_hint)?;

        let mut head = vec![0u8; Dialect::Standard.overview_len().min(image.len())];
        image.read_at(0, &mut head)?;
        let header = OverviewHeader::from_bytes(&head)?;

        let dialect = header.dialect;
        let order = header.byte_order;
        let header_len = dialect.subgrid_len();
        let mut buf = vec![0u8; header_len];
        let mut offset = dialect.overview_len();
        let mut subgrids = Vec::with_capacity(header.subgrid_count);

        for _ in 0..header.subgrid_count {
            image.check_region(offset, header_len)?;
            image.read_at(offset, &mut buf)?;
            let raw = SubGridHeader::from_bytes(&buf, dialect, order)?;
            let records_at = offset + header_len;
            let grid = SubGrid::from_header(&raw, header.units, records_at)?;
            let block = records_byte_len(grid.record_count())?;
            image.check_region(records_at, block)?;
            offset = records_at + block;
            subgrids.push(grid);
        }

        if options.flags & grid_flags::STRICT_END != 0 {
            let mut trailer = [0u8; LABEL_LEN];
            image.check_region(offset, LABEL_LEN)?;
            image.read_at(offset, &mut trailer)?;
            expect_label(&trailer, 0, &END)?;
        }

        link_subgrids(&mut subgrids)?;
        let top_level: Vec<usize> = (0..subgrids.len())
            .filter(|&i| subgrids[i].parent.is_none())
            .collect();
        let overlapping = top_level_overlap(&subgrids, &top_level);
        let bounds = top_level
            .iter()
            .fold(Extent::empty(), |acc, &i| acc.union(&subgrids[i].extent));
        let density = options.density_override.unwrap_or_else(|| {
            subgrids
                .iter()
                .map(SubGrid::spacing)
                .fold(f64::INFINITY, f64::min)
        });

        tracing::debug!(
            path = %path.display(),
            dialect = %dialect,
            backend = %backend,
            subgrids = subgrids.len(),
            overlapping,
            "opened grid shift file"
        );
        if overlapping {
            tracing::debug!(path = %path.display(), "top-level sub-grids overlap, using flat search");
        }

        Ok(Self {
            path,
            options,
            header,
            backend,
            subgrids,
            top_level,
            overlapping,
            bounds,
            density,
            iteration: IterationParams::default(),
            image: Some(image),
            cell: None,
        })
    }

    /// Replace the iteration controls used by [`GridShiftFile::inverse`]
    pub fn with_iteration(mut self, iteration: IterationParams) -> Self {
        self.iteration = iteration;
        self
    }

    /// Path the file was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parsed overview header
    pub fn header(&self) -> &OverviewHeader {
        &self.header
    }

    /// Backend in use
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// All sub-grids in file order
    pub fn subgrids(&self) -> &[SubGrid] {
        &self.subgrids
    }

    /// East-positive union of the top-level sub-grids
    pub fn bounds(&self) -> Extent {
        self.bounds
    }

    /// Density in degrees
    pub fn density(&self) -> f64 {
        self.density
    }

    /// True if flat search is in use
    pub fn is_overlapping(&self) -> bool {
        self.overlapping
    }

    /// Iteration controls used by [`GridShiftFile::inverse`]
    pub fn iteration(&self) -> &IterationParams {
        &self.iteration
    }

    /// True unless records are read through a stream
    pub fn is_reentrant(&self) -> bool {
        self.backend != Backend::Stream
    }

    /// True after [`GridShiftFile::release`] until the next read
    pub fn is_released(&self) -> bool {
        self.image.is_none()
    }

    /// True if the point lies inside the whole-file bounding box
    pub fn covers(&self, lng: f64, lat: f64) -> bool {
        self.bounds.contains(lng, lat)
    }

    /// Index of the sub-grid that supplies the shift at an east-positive point
    pub fn locate(&self, lng: f64, lat: f64) -> Option<usize> {
        if !self.bounds.contains(lng, lat) {
            return None;
        }
        let wlng = -lng;
        if self.overlapping {
            return self.locate_flat(wlng, lat);
        }

        let mut current = self
            .top_level
            .iter()
            .copied()
            .find(|&i| self.subgrids[i].covers(wlng, lat))?;
        while let Some(child) = self.subgrids[current]
            .children
            .iter()
            .copied()
            .find(|&c| self.subgrids[c].covers_excluding_far_edges(wlng, lat))
        {
            current = child;
        }
        Some(current)
    }

    fn locate_flat(&self, wlng: f64, lat: f64) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, grid) in self.subgrids.iter().enumerate() {
            if !grid.covers(wlng, lat) {
                continue;
            }
            match best {
                Some(b) if self.subgrids[b].spacing() <= grid.spacing() => {}
                _ => best = Some(i),
            }
        }
        best
    }

    /// Shift at an east-positive point
    ///
    /// Outside coverage the shift is zero and a soft coverage error is
    /// attached.
    pub fn interpolate(&mut self, coord: Coordinate) -> Result<Outcome<ShiftVector>> {
        let Some(index) = self.locate(coord.lng, coord.lat) else {
            return Ok(Outcome::soft(
                ShiftVector::ZERO,
                GeodeticError::Coverage {
                    lng: coord.lng,
                    lat: coord.lat,
                },
            ));
        };
        let position = self.subgrids[index].lattice().locate(-coord.lng, coord.lat);
        let cell = self.cell_at(index, position.row, position.col, position.north_edge, position.west_edge)?;
        let [lng_west, lat] = cell.evaluate(position.u, position.v);
        Ok(Outcome::ok(ShiftVector::from_native_seconds(lng_west, lat)))
    }

    /// Coefficients of the cell with reference node (`row`, `col`)
    fn cell_at(
        &mut self,
        subgrid: usize,
        row: usize,
        col: usize,
        north_edge: bool,
        west_edge: bool,
    ) -> Result<GridCell> {
        if let Some(cached) = self.cell {
            if cached.subgrid == subgrid && cached.row == row && cached.col == col {
                return Ok(cached.cell);
            }
        }

        let grid = &self.subgrids[subgrid];
        let offsets = (
            grid.node_offset(row, col),
            (!west_edge).then(|| grid.node_offset(row, col + 1)),
            (!north_edge).then(|| grid.node_offset(row + 1, col)),
            (!west_edge && !north_edge).then(|| grid.node_offset(row + 1, col + 1)),
        );
        let factor = self.header.units.seconds_factor();
        let order = self.header.byte_order;
        let image = self.image_mut()?;

        let mut node = |offset: usize| -> Result<[f64; 2]> {
            let mut raw = [0u8; ShiftRecord::SIZE];
            image.read_at(offset, &mut raw)?;
            let record = ShiftRecord::from_bytes(&raw, order)?;
            Ok([
                f64::from(record.lng_shift) * factor,
                f64::from(record.lat_shift) * factor,
            ])
        };
        let se = node(offsets.0)?;
        let sw = offsets.1.map(&mut node).transpose()?;
        let ne = offsets.2.map(&mut node).transpose()?;
        let nw = offsets.3.map(&mut node).transpose()?;

        let cell = GridCell::from_corners(se, sw, ne, nw);
        self.cell = Some(CachedCell {
            subgrid,
            row,
            col,
            cell,
        });
        Ok(cell)
    }

    fn image_mut(&mut self) -> Result<&mut GridImage> {
        if self.image.is_none() {
            tracing::debug!(path = %self.path.display(), "reopening released grid file");
            let image = GridImage::open(&self.path, self.backend, self.options.buffer_hint)?;
            if image.len() < self.expected_len() {
                return Err(GeodeticError::unexpected_eof(format!(
                    "{} shrank since it was opened",
                    self.path.display()
                )));
            }
            self.image = Some(image);
        }
        self.image
            .as_mut()
            .ok_or_else(|| GeodeticError::system("grid image missing after reopen"))
    }

    fn expected_len(&self) -> usize {
        self.subgrids
            .last()
            .map_or(self.header.dialect.overview_len(), |g| {
                g.record_offset + g.record_count() * ShiftRecord::SIZE
            })
    }

    /// Apply the shift at `coord`, height untouched
    pub fn forward(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>> {
        Ok(self.interpolate(coord)?.map(|shift| coord.shifted(shift)))
    }

    /// Undo the shift using the file's iteration controls
    pub fn inverse(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>> {
        let params = self.iteration;
        self.invert(coord, &params)
    }

    /// Find the point whose forward shift lands on `coord`
    pub fn invert(&mut self, coord: Coordinate, params: &IterationParams) -> Result<Outcome<Coordinate>> {
        let solved = invert_fixed_point([coord.lng, coord.lat], params, |p| {
            let shift = self.interpolate(Coordinate::lng_lat(p[0], p[1]))?;
            Ok(shift.map(|s| [p[0] + s.lng, p[1] + s.lat]))
        })?;
        Ok(solved.map(|[lng, lat]| coord.with_horizontal(lng, lat)))
    }

    /// Drop the file image and cell cache, keeping the sub-grid index
    pub fn release(&mut self) {
        if self.image.take().is_some() {
            tracing::debug!(path = %self.path.display(), "released grid file image");
        }
        self.cell = None;
    }
}

/// Resolve parent names into arena indices
fn link_subgrids(subgrids: &mut [SubGrid]) -> Result<()> {
    let mut by_name: HashMap<String, usize> = HashMap::with_capacity(subgrids.len());
    for (i, grid) in subgrids.iter().enumerate() {
        by_name.entry(grid.name.trim().to_ascii_uppercase()).or_insert(i);
    }

    for i in 0..subgrids.len() {
        if subgrids[i].is_top_level() {
            continue;
        }
        let wanted = subgrids[i].parent_name.trim().to_ascii_uppercase();
        let parent = *by_name.get(&wanted).ok_or_else(|| {
            GeodeticError::format(format!(
                "sub-grid {} names unknown parent {}",
                subgrids[i].name, subgrids[i].parent_name
            ))
        })?;
        if parent == i {
            return Err(GeodeticError::format(format!(
                "sub-grid {} is its own parent",
                subgrids[i].name
            )));
        }
        subgrids[i].parent = Some(parent);
        subgrids[parent].children.push(i);
    }
    Ok(())
}

fn top_level_overlap(subgrids: &[SubGrid], top_level: &[usize]) -> bool {
    top_level.iter().enumerate().any(|(k, &a)| {
        top_level[k + 1..]
            .iter()
            .any(|&b| subgrids[a].extent.overlaps(&subgrids[b].extent))
    })
}
