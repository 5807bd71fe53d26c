//! Datums and their reference ellipsoids

/// A reference ellipsoid
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ellipsoid {
    /// Key name
    pub name: String,
    /// Equatorial radius in meters
    pub a: f64,
    /// First eccentricity squared
    pub e_sq: f64,
}

impl Ellipsoid {
    /// Create an ellipsoid from radius and eccentricity squared
    pub fn new(name: impl Into<String>, a: f64, e_sq: f64) -> Self {
        Self {
            name: name.into(),
            a,
            e_sq,
        }
    }

    /// Create an ellipsoid from radius and inverse flattening
    pub fn from_inverse_flattening(name: impl Into<String>, a: f64, inv_f: f64) -> Self {
        let f = 1.0 / inv_f;
        Self::new(name, a, f * (2.0 - f))
    }

    /// WGS 1984
    pub fn wgs84() -> Self {
        Self::from_inverse_flattening("WGS84", 6_378_137.0, 298.257_223_563)
    }

    /// GRS 1980
    pub fn grs80() -> Self {
        Self::from_inverse_flattening("GRS1980", 6_378_137.0, 298.257_222_101)
    }

    /// Clarke 1866
    pub fn clarke1866() -> Self {
        Self::new("CLRK66", 6_378_206.4, 0.006_768_657_997_291_1)
    }

    /// Flattening
    pub fn flattening(&self) -> f64 {
        1.0 - (1.0 - self.e_sq).sqrt()
    }

    /// Polar radius in meters
    pub fn polar_radius(&self) -> f64 {
        self.a * (1.0 - self.e_sq).sqrt()
    }

    /// True when both shape parameters match
    pub fn same_shape(&self, other: &Ellipsoid) -> bool {
        self.a == other.a && self.e_sq == other.e_sq
    }
}

/// Method of a datum's own to-WGS84 definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LegacyMethod {
    /// Already equivalent to WGS84
    Wgs84Equivalent,
    /// Three-parameter translation
    GeocentricTranslation,
    /// Standard Molodensky
    Molodensky,
    /// Seven parameters, exact rotation
    BursaWolf,
    /// Seven parameters, linearized rotation
    SevenParameter,
    /// Anything requiring more than the parameters themselves
    Complex,
}

impl LegacyMethod {
    /// True when an ad-hoc transformation can be built from the parameters
    pub const fn is_simple(self) -> bool {
        !matches!(self, LegacyMethod::Complex)
    }
}

/// A datum's legacy to-WGS84 parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LegacyParameters {
    /// How to apply the parameters
    pub method: LegacyMethod,
    /// X translation in meters
    #[cfg_attr(feature = "serde", serde(default))]
    pub dx: f64,
    /// Y translation in meters
    #[cfg_attr(feature = "serde", serde(default))]
    pub dy: f64,
    /// Z translation in meters
    #[cfg_attr(feature = "serde", serde(default))]
    pub dz: f64,
    /// X rotation in arc seconds
    #[cfg_attr(feature = "serde", serde(default))]
    pub rx: f64,
    /// Y rotation in arc seconds
    #[cfg_attr(feature = "serde", serde(default))]
    pub ry: f64,
    /// Z rotation in arc seconds
    #[cfg_attr(feature = "serde", serde(default))]
    pub rz: f64,
    /// Scale difference in parts per million
    #[cfg_attr(feature = "serde", serde(default))]
    pub scale_ppm: f64,
}

/// A geodetic datum
#[derive(Debug, Clone, PartialEq)]
pub struct Datum {
    /// Key name
    pub name: String,
    /// Reference ellipsoid
    pub ellipsoid: Ellipsoid,
    /// Optional legacy to-WGS84 definition
    pub legacy: Option<LegacyParameters>,
}

impl Datum {
    /// Create a datum without legacy parameters
    pub fn new(name: impl Into<String>, ellipsoid: Ellipsoid) -> Self {
        Self {
            name: name.into(),
            ellipsoid,
            legacy: None,
        }
    }

    /// Attach legacy to-WGS84 parameters
    pub fn with_legacy(mut self, legacy: LegacyParameters) -> Self {
        self.legacy = Some(legacy);
        self
    }

    /// Legacy parameters usable by the legacy fallback
    pub fn simple_legacy(&self) -> Option<&LegacyParameters> {
        self.legacy.as_ref().filter(|p| p.method.is_simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wgs84_shape() {
        let e = Ellipsoid::wgs84();
        assert!((e.e_sq - 0.006_694_379_990_14).abs() < 1e-12);
        assert!((e.polar_radius() - 6_356_752.314_245).abs() < 1e-3);
        assert!((1.0 / e.flattening() - 298.257_223_563).abs() < 1e-6);
        assert!(!e.same_shape(&Ellipsoid::grs80()));
    }

    #[test]
    fn test_simple_legacy() {
        let mut p = LegacyParameters {
            method: LegacyMethod::Complex,
            dx: 1.0,
            dy: 0.0,
            dz: 0.0,
            rx: 0.0,
            ry: 0.0,
            rz: 0.0,
            scale_ppm: 0.0,
        };
        let d = Datum::new("X", Ellipsoid::wgs84()).with_legacy(p);
        assert!(d.simple_legacy().is_none());
        p.method = LegacyMethod::Molodensky;
        assert!(d.with_legacy(p).simple_legacy().is_some());
    }
}
