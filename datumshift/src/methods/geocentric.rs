//! Geocentric (Helmert family) transformations
//!
//! Geodetic coordinates are carried to earth-centered cartesian form on the
//! source ellipsoid, transformed by translation, rotation and scale, and
//! brought back on the target ellipsoid.

use datumshift_core::{
    invert_fixed_point, Coordinate, Ellipsoid, GeodeticError, IterationParams, Outcome, Result,
    SevenParams, ShiftMethod,
};

const ARC_SECONDS_TO_RADIANS: f64 = std::f64::consts::PI / (180.0 * 3600.0);

/// Geodetic to earth-centered cartesian
pub fn to_geocentric(ellipsoid: &Ellipsoid, coord: Coordinate) -> [f64; 3] {
    let (lat, lng) = (coord.lat.to_radians(), coord.lng.to_radians());
    let (sin_lat, cos_lat) = lat.sin_cos();
    let n = ellipsoid.a / (1.0 - ellipsoid.e_sq * sin_lat * sin_lat).sqrt();
    [
        (n + coord.hgt) * cos_lat * lng.cos(),
        (n + coord.hgt) * cos_lat * lng.sin(),
        (n * (1.0 - ellipsoid.e_sq) + coord.hgt) * sin_lat,
    ]
}

/// Earth-centered cartesian to geodetic
pub fn from_geocentric(ellipsoid: &Ellipsoid, xyz: [f64; 3]) -> Coordinate {
    let [x, y, z] = xyz;
    let e_sq = ellipsoid.e_sq;
    let p = x.hypot(y);
    let lng = y.atan2(x);

    let mut lat = z.atan2(p * (1.0 - e_sq));
    let mut hgt = 0.0;
    for _ in 0..10 {
        let sin_lat = lat.sin();
        let n = ellipsoid.a / (1.0 - e_sq * sin_lat * sin_lat).sqrt();
        hgt = if lat.cos().abs() > 1e-10 {
            p / lat.cos() - n
        } else {
            z.abs() - ellipsoid.polar_radius()
        };
        let next = z.atan2(p * (1.0 - e_sq * n / (n + hgt)));
        let done = (next - lat).abs() < 1e-14;
        lat = next;
        if done {
            break;
        }
    }
    Coordinate::new(lng.to_degrees(), lat.to_degrees(), hgt)
}

/// How rotations are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationModel {
    /// No rotation or scale, translation only
    TranslationOnly,
    /// Exact product of the three axis rotations
    Exact,
    /// Small-angle linearization
    Linearized,
}

/// A Helmert transformation between two ellipsoids
#[derive(Debug, Clone)]
pub struct Helmert {
    source: Ellipsoid,
    target: Ellipsoid,
    translation: [f64; 3],
    matrix: [[f64; 3]; 3],
    inverse: [[f64; 3]; 3],
    model: RotationModel,
    iteration: IterationParams,
}

impl Helmert {
    /// Three-parameter translation
    pub fn translation(
        source: Ellipsoid,
        target: Ellipsoid,
        delta: [f64; 3],
        iteration: IterationParams,
    ) -> Result<Self> {
        let params = SevenParams {
            dx: delta[0],
            dy: delta[1],
            dz: delta[2],
            ..SevenParams::default()
        };
        Self::new(source, target, &params, RotationModel::TranslationOnly, iteration)
    }

    /// Seven-parameter transformation, rotations in the coordinate-frame
    /// convention
    pub fn new(
        source: Ellipsoid,
        target: Ellipsoid,
        params: &SevenParams,
        model: RotationModel,
        iteration: IterationParams,
    ) -> Result<Self> {
        let scale = 1.0 + params.scale_ppm * 1e-6;
        let [a, b, c] = [params.rx, params.ry, params.rz].map(|r| r * ARC_SECONDS_TO_RADIANS);
        let rotation = match model {
            RotationModel::TranslationOnly => IDENTITY,
            RotationModel::Linearized => [[1.0, c, -b], [-c, 1.0, a], [b, -a, 1.0]],
            RotationModel::Exact => {
                let (sa, ca) = a.sin_cos();
                let (sb, cb) = b.sin_cos();
                let (sc, cc) = c.sin_cos();
                let rx = [[1.0, 0.0, 0.0], [0.0, ca, sa], [0.0, -sa, ca]];
                let ry = [[cb, 0.0, -sb], [0.0, 1.0, 0.0], [sb, 0.0, cb]];
                let rz = [[cc, sc, 0.0], [-sc, cc, 0.0], [0.0, 0.0, 1.0]];
                multiply(&multiply(&rx, &ry), &rz)
            }
        };
        let scale = if model == RotationModel::TranslationOnly {
            1.0
        } else {
            scale
        };
        let matrix = rotation.map(|row| row.map(|v| v * scale));
        let inverse = invert_matrix(&matrix)
            .ok_or_else(|| GeodeticError::system("Helmert matrix is singular"))?;

        Ok(Self {
            source,
            target,
            translation: [params.dx, params.dy, params.dz],
            matrix,
            inverse,
            model,
            iteration,
        })
    }

    /// Rotation handling in use
    pub fn model(&self) -> RotationModel {
        self.model
    }

    fn forward_xyz(&self, xyz: [f64; 3]) -> [f64; 3] {
        let rotated = apply(&self.matrix, xyz);
        [0, 1, 2].map(|k| rotated[k] + self.translation[k])
    }

    fn inverse_xyz(&self, xyz: [f64; 3]) -> [f64; 3] {
        apply(&self.inverse, [0, 1, 2].map(|k| xyz[k] - self.translation[k]))
    }
}

impl ShiftMethod for Helmert {
    fn forward_2d(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>> {
        let out = self.forward_3d(Coordinate { hgt: 0.0, ..coord })?;
        Ok(out.map(|c| coord.with_horizontal(c.lng, c.lat)))
    }

    fn forward_3d(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>> {
        let xyz = self.forward_xyz(to_geocentric(&self.source, coord));
        Ok(Outcome::ok(from_geocentric(&self.target, xyz)))
    }

    fn inverse_2d(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>> {
        let params = self.iteration;
        let solved = invert_fixed_point([coord.lng, coord.lat], &params, |p| {
            let xyz = self.forward_xyz(to_geocentric(&self.source, Coordinate::lng_lat(p[0], p[1])));
            let c = from_geocentric(&self.target, xyz);
            Ok(Outcome::ok([c.lng, c.lat]))
        })?;
        Ok(solved.map(|[lng, lat]| coord.with_horizontal(lng, lat)))
    }

    fn inverse_3d(&mut self, coord: Coordinate) -> Result<Outcome<Coordinate>> {
        let xyz = self.inverse_xyz(to_geocentric(&self.target, coord));
        Ok(Outcome::ok(from_geocentric(&self.source, xyz)))
    }

    fn is_null(&self) -> bool {
        self.translation == [0.0; 3] && self.matrix == IDENTITY && self.source.same_shape(&self.target)
    }
}

const IDENTITY: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

fn multiply(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

fn apply(m: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    m.map(|row| row[0] * v[0] + row[1] * v[1] + row[2] * v[2])
}

fn invert_matrix(m: &[[f64; 3]; 3]) -> Option<[[f64; 3]; 3]> {
    let cof = |r0: usize, r1: usize, c0: usize, c1: usize| m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0];
    let det = m[0][0] * cof(1, 2, 1, 2) - m[0][1] * cof(1, 2, 0, 2) + m[0][2] * cof(1, 2, 0, 1);
    if det.abs() < 1e-12 {
        return None;
    }
    let inv = 1.0 / det;
    Some([
        [cof(1, 2, 1, 2) * inv, -cof(0, 2, 1, 2) * inv, cof(0, 1, 1, 2) * inv],
        [-cof(1, 2, 0, 2) * inv, cof(0, 2, 0, 2) * inv, -cof(0, 1, 0, 2) * inv],
        [cof(1, 2, 0, 1) * inv, -cof(0, 2, 0, 1) * inv, cof(0, 1, 0, 1) * inv],
    ])
}
