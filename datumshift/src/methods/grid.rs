//! Grid file interpolation method

use datumshift_core::{Coordinate, GeodeticError, Outcome, Result, ShiftMethod};

use super::Method;
use crate::grid_file::GridShiftFile;

/// A grid file and the direction it is applied in
#[derive(Debug)]
pub struct GridEntry {
    /// Opened file
    pub file: GridShiftFile,
    /// Apply the file's inverse as this method's forward
    pub inverse: bool,
}

/// Ordered grid files with an optional fallback
#[derive(Debug)]
pub struct GridShift {
    files: Vec<GridEntry>,
    fallback: Option<Box<Method>>,
}

impl GridShift {
    /// Create from opened files
    pub fn new(files: Vec<GridEntry>, fallback: Option<Method>) -> Self {
        Self {
            files,
            fallback: fallback.map(Box::new),
        }
    }

    /// Files in search order
    pub fn files(&self) -> &[GridEntry] {
        &self.files
    }

    fn apply(&mut self, coord: Coordinate, toward_target: bool, three_d: bool) -> Result<Outcome<Coordinate>> {
        for entry in &mut self.files {
            if !entry.file.covers(coord.lng, coord.lat) {
                continue;
            }
            let out = if entry.inverse == toward_target {
                entry.file.inverse(coord)?
            } else {
                entry.file.forward(coord)?
            };
            match out.soft {
                Some(GeodeticError::Coverage { .. }) => continue,
                _ => return Ok(out),
            }
        }

        match self.fallback.as_deref_mut() {
            Some(fallback) => {
                let out = match (toward_target, three_d) {
                    (true, false) => fallback.forward_2d(coord)?,
                    (true, true) => fallback.forward_3d(coord)?,
                    (false, false) => fallback.inverse_2d(coord)?,
                    (false, true) => fallback.inverse_3d(coord)?,
                };
                Ok(Outcome::soft(
                    out.value,
                    GeodeticError::CoverageFallback {
                        lng: coord.lng,
                        lat: coord.lat,
                    },
                ))
            }
            None => Ok(Outcome::soft(
                coord,
                GeodeticError::Coverage {
                    lng: coord.lng,
                    lat: coord.lat,
                },
            )),
        }
    }
}

impl ShiftMethod for GridShift {
    fn forward_2d(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>> {
        self.apply(coord, true, false)
    }

    fn forward_3d(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>> {
        self.apply(coord, true, true)
    }

    fn inverse_2d(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>> {
        self.apply(coord, false, false)
    }

    fn inverse_3d(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>> {
        self.apply(coord, false, true)
    }

    fn is_null(&self) -> bool {
        false
    }

    fn is_reentrant(&self) -> bool {
        self.files.iter().all(|e| e.file.is_reentrant())
            && self.fallback.as_ref().map_or(true, |f| f.is_reentrant())
    }

    fn release(&mut self) {
        for entry in &mut self.files {
            entry.file.release();
        }
        if let Some(fallback) = self.fallback.as_mut() {
            fallback.release();
        }
    }
}
