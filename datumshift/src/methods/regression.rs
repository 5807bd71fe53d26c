//! Multiple regression polynomial transformation

use datumshift_core::{
    invert_fixed_point, Coordinate, Extent, GeodeticError, IterationParams, Outcome, RegressionDef,
    Result, ShiftMethod, Term, SECONDS_PER_DEGREE,
};

use super::Method;

/// Polynomial shifts over a bounded region
#[derive(Debug)]
pub struct Regression {
    lat0: f64,
    lng0: f64,
    k: f64,
    validation: Extent,
    lat_terms: Vec<Term>,
    lng_terms: Vec<Term>,
    hgt_terms: Vec<Term>,
    fallback: Option<Box<Method>>,
    iteration: IterationParams,
}

fn evaluate(terms: &[Term], u: f64, v: f64) -> f64 {
    terms
        .iter()
        .map(|t| t.coefficient * u.powi(i32::from(t.u_power)) * v.powi(i32::from(t.v_power)))
        .sum()
}

impl Regression {
    /// Build from a definition, with an already constructed fallback
    pub fn new(def: &RegressionDef, fallback: Option<Method>, iteration: IterationParams) -> Self {
        Self {
            lat0: def.lat0,
            lng0: def.lng0,
            k: def.k,
            validation: def.validation,
            lat_terms: def.lat_terms.clone(),
            lng_terms: def.lng_terms.clone(),
            hgt_terms: def.hgt_terms.clone(),
            fallback: fallback.map(Box::new),
            iteration,
        }
    }

    /// Shift at a point: (lng, lat) in degrees and height in meters
    fn shift_at(&self, lng: f64, lat: f64) -> [f64; 3] {
        let u = self.k * (lat - self.lat0);
        let v = self.k * (lng - self.lng0);
        [
            evaluate(&self.lng_terms, u, v) / SECONDS_PER_DEGREE,
            evaluate(&self.lat_terms, u, v) / SECONDS_PER_DEGREE,
            evaluate(&self.hgt_terms, u, v),
        ]
    }

    fn apply(&self, coord: Coordinate, three_d: bool) -> Coordinate {
        let [d_lng, d_lat, d_hgt] = self.shift_at(coord.lng, coord.lat);
        Coordinate::new(
            coord.lng + d_lng,
            coord.lat + d_lat,
            if three_d { coord.hgt + d_hgt } else { coord.hgt },
        )
    }

    /// Handle a point outside the validation region
    fn outside(
        &mut self,
        coord: Coordinate,
        run: impl FnOnce(&mut Method, Coordinate) -> Result<Outcome<Coordinate>>,
    ) -> Result<Outcome<Coordinate>> {
        match self.fallback.as_deref_mut() {
            Some(fallback) => {
                let out = run(fallback, coord)?;
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

    fn inverse(&mut self, coord: Coordinate, three_d: bool) -> Result<Outcome<Coordinate>> {
        if !self.validation.contains(coord.lng, coord.lat) {
            return self.outside(coord, |m, c| {
                if three_d {
                    m.inverse_3d(c)
                } else {
                    m.inverse_2d(c)
                }
            });
        }
        let params = self.iteration;
        let solved = invert_fixed_point([coord.lng, coord.lat], &params, |p| {
            if !self.validation.contains(p[0], p[1]) {
                return Ok(Outcome::soft(p, GeodeticError::Coverage { lng: p[0], lat: p[1] }));
            }
            let [d_lng, d_lat, _] = self.shift_at(p[0], p[1]);
            Ok(Outcome::ok([p[0] + d_lng, p[1] + d_lat]))
        })?;
        let [lng, lat] = solved.value;
        let hgt = if three_d {
            coord.hgt - self.shift_at(lng, lat)[2]
        } else {
            coord.hgt
        };
        Ok(Outcome {
            value: Coordinate::new(lng, lat, hgt),
            soft: solved.soft,
        })
    }
}

impl ShiftMethod for Regression {
    fn forward_2d(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>> {
        if !self.validation.contains(coord.lng, coord.lat) {
            return self.outside(coord, |m, c| m.forward_2d(c));
        }
        Ok(Outcome::ok(self.apply(coord, false)))
    }

    fn forward_3d(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>> {
        if !self.validation.contains(coord.lng, coord.lat) {
            return self.outside(coord, |m, c| m.forward_3d(c));
        }
        Ok(Outcome::ok(self.apply(coord, true)))
    }

    fn inverse_2d(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>> {
        self.inverse(coord, false)
    }

    fn inverse_3d(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>> {
        self.inverse(coord, true)
    }

    fn is_null(&self) -> bool {
        false
    }

    fn is_reentrant(&self) -> bool {
        self.fallback.as_ref().map_or(true, |f| f.is_reentrant())
    }

    fn release(&mut self) {
        if let Some(fallback) = self.fallback.as_mut() {
            fallback.release();
        }
    }
}
