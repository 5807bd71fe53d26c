//! Executable transformation methods
//!
//! [`Method`] is the closed set of methods a bridge segment can carry. It is
//! built from a [`MethodDef`] once the ellipsoids of both datums are known,
//! and dispatches every [`ShiftMethod`] call to its variant.

pub mod geocentric;
pub mod grid;
pub mod molodensky;
pub mod regression;

pub use geocentric::{Helmert, RotationModel};
pub use grid::{GridEntry, GridShift};
pub use molodensky::Molodensky;
pub use regression::Regression;

use datumshift_core::{Coordinate, Ellipsoid, IterationParams, MethodDef, Outcome, Result, ShiftMethod};

use crate::grid_file::{GridFileOptions, GridShiftFile};

/// Everything needed to turn a definition into an executable method
#[derive(Debug, Clone, Copy)]
pub struct MethodContext<'a> {
    /// Source datum ellipsoid
    pub source: &'a Ellipsoid,
    /// Target datum ellipsoid
    pub target: &'a Ellipsoid,
    /// Iteration controls for inverses
    pub iteration: IterationParams,
    /// Options for opening grid files
    pub grid_options: &'a GridFileOptions,
}

/// An executable transformation method
#[derive(Debug)]
pub enum Method {
    /// Identity
    Null,
    /// Geocentric translation, Bursa-Wolf or seven-parameter
    Helmert(Helmert),
    /// Standard Molodensky
    Molodensky(Molodensky),
    /// Multiple regression polynomials
    Regression(Regression),
    /// Grid file interpolation
    Grid(GridShift),
}

impl Method {
    /// Build the method described by `def`
    ///
    /// Grid files are opened here; their errors surface unchanged.
    pub fn from_def(def: &MethodDef, ctx: &MethodContext<'_>) -> Result<Self> {
        let (source, target) = (ctx.source.clone(), ctx.target.clone());
        Ok(match def {
            MethodDef::Null => Method::Null,
            MethodDef::GeocentricTranslation { dx, dy, dz } => {
                Method::Helmert(Helmert::translation(source, target, [*dx, *dy, *dz], ctx.iteration)?)
            }
            MethodDef::BursaWolf(params) => Method::Helmert(Helmert::new(
                source,
                target,
                params,
                RotationModel::Exact,
                ctx.iteration,
            )?),
            MethodDef::SevenParameter(params) => Method::Helmert(Helmert::new(
                source,
                target,
                params,
                RotationModel::Linearized,
                ctx.iteration,
            )?),
            MethodDef::Molodensky { dx, dy, dz } => {
                Method::Molodensky(Molodensky::new(source, target, [*dx, *dy, *dz], ctx.iteration))
            }
            MethodDef::MultipleRegression(reg) => {
                let fallback = reg
                    .fallback
                    .as_deref()
                    .map(|f| Method::from_def(f, ctx))
                    .transpose()?;
                Method::Regression(Regression::new(reg, fallback, ctx.iteration))
            }
            MethodDef::GridShift(grid) => {
                let files = grid
                    .files
                    .iter()
                    .map(|f| {
                        let file = GridShiftFile::open(&f.path, ctx.grid_options.clone())?
                            .with_iteration(ctx.iteration);
                        Ok(GridEntry {
                            file,
                            inverse: f.inverse,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                let fallback = grid
                    .fallback
                    .as_deref()
                    .map(|f| Method::from_def(f, ctx))
                    .transpose()?;
                Method::Grid(GridShift::new(files, fallback))
            }
        })
    }

    /// Short name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            Method::Null => "null",
            Method::Helmert(h) => match h.model() {
                RotationModel::TranslationOnly => "geocentric-translation",
                RotationModel::Exact => "bursa-wolf",
                RotationModel::Linearized => "seven-parameter",
            },
            Method::Molodensky(_) => "molodensky",
            Method::Regression(_) => "multiple-regression",
            Method::Grid(_) => "grid-shift",
        }
    }

    fn inner(&mut self) -> Option<&mut dyn ShiftMethod> {
        match self {
            Method::Null => None,
            Method::Helmert(m) => Some(m),
            Method::Molodensky(m) => Some(m),
            Method::Regression(m) => Some(m),
            Method::Grid(m) => Some(m),
        }
    }

    fn inner_ref(&self) -> Option<&dyn ShiftMethod> {
        match self {
            Method::Null => None,
            Method::Helmert(m) => Some(m),
            Method::Molodensky(m) => Some(m),
            Method::Regression(m) => Some(m),
            Method::Grid(m) => Some(m),
        }
    }
}

impl ShiftMethod for Method {
    fn forward_2d(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>> {
        match self.inner() {
            Some(m) => m.forward_2d(coord),
            None => Ok(Outcome::ok(coord)),
        }
    }

    fn forward_3d(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>> {
        match self.inner() {
            Some(m) => m.forward_3d(coord),
            None => Ok(Outcome::ok(coord)),
        }
    }

    fn inverse_2d(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>> {
        match self.inner() {
            Some(m) => m.inverse_2d(coord),
            None => Ok(Outcome::ok(coord)),
        }
    }

    fn inverse_3d(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>> {
        match self.inner() {
            Some(m) => m.inverse_3d(coord),
            None => Ok(Outcome::ok(coord)),
        }
    }

    fn is_null(&self) -> bool {
        self.inner_ref().map_or(true, |m| m.is_null())
    }

    fn is_reentrant(&self) -> bool {
        self.inner_ref().map_or(true, |m| m.is_reentrant())
    }

    fn release(&mut self) {
        if let Some(m) = self.inner() {
            m.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datumshift_core::SevenParams;

    fn ctx<'a>(a: &'a Ellipsoid, b: &'a Ellipsoid, options: &'a GridFileOptions) -> MethodContext<'a> {
        MethodContext {
            source: a,
            target: b,
            iteration: IterationParams::default(),
            grid_options: options,
        }
    }

    #[test]
    fn test_build_each_closed_form_method() {
        let (a, b) = (Ellipsoid::clarke1866(), Ellipsoid::wgs84());
        let options = GridFileOptions::default();
        let ctx = ctx(&a, &b, &options);
        let defs = [
            (MethodDef::Null, "null"),
            (
                MethodDef::GeocentricTranslation {
                    dx: 1.0,
                    dy: 2.0,
                    dz: 3.0,
                },
                "geocentric-translation",
            ),
            (MethodDef::BursaWolf(SevenParams::default()), "bursa-wolf"),
            (MethodDef::SevenParameter(SevenParams::default()), "seven-parameter"),
            (
                MethodDef::Molodensky {
                    dx: 1.0,
                    dy: 2.0,
                    dz: 3.0,
                },
                "molodensky",
            ),
        ];
        for (def, kind) in defs {
            let method = Method::from_def(&def, &ctx).unwrap();
            assert_eq!(method.kind(), kind);
            assert_eq!(method.kind(), def.kind());
        }
    }

    #[test]
    fn test_null_is_identity() {
        let mut m = Method::Null;
        let c = Coordinate::new(1.0, 2.0, 3.0);
        assert_eq!(m.forward_3d(c).unwrap().value, c);
        assert_eq!(m.inverse_2d(c).unwrap().value, c);
        assert!(m.is_null());
        assert!(m.is_reentrant());
    }

    #[test]
    fn test_missing_grid_file_is_io_error() {
        let a = Ellipsoid::wgs84();
        let options = GridFileOptions::default();
        let def = MethodDef::GridShift(datumshift_core::GridShiftDef {
            files: vec![datumshift_core::GridFileDef::forward("/nonexistent/grid.gsb")],
            fallback: None,
        });
        let err = Method::from_def(&def, &ctx(&a, &a, &options)).unwrap_err();
        assert!(matches!(err, datumshift_core::GeodeticError::Io(_)));
    }
}
