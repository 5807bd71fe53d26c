//! Standard Molodensky transformation

use datumshift_core::{
    invert_fixed_point, Coordinate, Ellipsoid, IterationParams, Outcome, Result, ShiftMethod,
};

/// Standard Molodensky between two ellipsoids
#[derive(Debug, Clone)]
pub struct Molodensky {
    source: Ellipsoid,
    target: Ellipsoid,
    delta: [f64; 3],
    iteration: IterationParams,
}

impl Molodensky {
    /// Create from translations in meters
    pub fn new(source: Ellipsoid, target: Ellipsoid, delta: [f64; 3], iteration: IterationParams) -> Self {
        Self {
            source,
            target,
            delta,
            iteration,
        }
    }

    /// Shift of (lng, lat, hgt) from `from` to `to` by `delta`
    fn shift(from: &Ellipsoid, to: &Ellipsoid, delta: [f64; 3], coord: Coordinate) -> Coordinate {
        let [dx, dy, dz] = delta;
        let a = from.a;
        let f = from.flattening();
        let e_sq = from.e_sq;
        let da = to.a - a;
        let df = to.flattening() - f;
        let b_over_a = 1.0 - f;

        let (sin_lat, cos_lat) = coord.lat.to_radians().sin_cos();
        let (sin_lng, cos_lng) = coord.lng.to_radians().sin_cos();
        let w_sq = 1.0 - e_sq * sin_lat * sin_lat;
        let rn = a / w_sq.sqrt();
        let rm = a * (1.0 - e_sq) / (w_sq * w_sq.sqrt());
        let h = coord.hgt;

        let d_lat = (-dx * sin_lat * cos_lng - dy * sin_lat * sin_lng
            + dz * cos_lat
            + da * rn * e_sq * sin_lat * cos_lat / a
            + df * (rm / b_over_a + rn * b_over_a) * sin_lat * cos_lat)
            / (rm + h);
        let d_lng = if cos_lat.abs() < 1e-12 {
            0.0
        } else {
            (-dx * sin_lng + dy * cos_lng) / ((rn + h) * cos_lat)
        };
        let d_hgt = dx * cos_lat * cos_lng + dy * cos_lat * sin_lng + dz * sin_lat - da * a / rn
            + df * b_over_a * rn * sin_lat * sin_lat;

        Coordinate::new(
            coord.lng + d_lng.to_degrees(),
            coord.lat + d_lat.to_degrees(),
            coord.hgt + d_hgt,
        )
    }

    fn negated(&self) -> [f64; 3] {
        self.delta.map(|d| -d)
    }
}

impl ShiftMethod for Molodensky {
    fn forward_2d(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>> {
        let out = Self::shift(&self.source, &self.target, self.delta, Coordinate { hgt: 0.0, ..coord });
        Ok(Outcome::ok(coord.with_horizontal(out.lng, out.lat)))
    }

    fn forward_3d(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>> {
        Ok(Outcome::ok(Self::shift(&self.source, &self.target, self.delta, coord)))
    }

    fn inverse_2d(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>> {
        let params = self.iteration;
        let solved = invert_fixed_point([coord.lng, coord.lat], &params, |p| {
            let c = Self::shift(&self.source, &self.target, self.delta, Coordinate::lng_lat(p[0], p[1]));
            Ok(Outcome::ok([c.lng, c.lat]))
        })?;
        Ok(solved.map(|[lng, lat]| coord.with_horizontal(lng, lat)))
    }

    fn inverse_3d(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>> {
        // roles reversed: target ellipsoid is the starting surface
        Ok(Outcome::ok(Self::shift(&self.target, &self.source, self.negated(), coord)))
    }

    fn is_null(&self) -> bool {
        self.delta == [0.0; 3] && self.source.same_shape(&self.target)
    }
}
