//! Geodetic transformation definitions
//!
//! A [`GeodeticTransformation`] names a source and target datum and the
//! method that carries coordinates from one to the other. Definitions are
//! plain data; the executable form lives with the method implementations.

use crate::coord::Extent;
use crate::iteration::IterationParams;

/// Seven Helmert parameters
///
/// Rotations follow the coordinate-frame convention.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SevenParams {
    /// X translation in meters
    pub dx: f64,
    /// Y translation in meters
    pub dy: f64,
    /// Z translation in meters
    pub dz: f64,
    /// X rotation in arc seconds
    pub rx: f64,
    /// Y rotation in arc seconds
    pub ry: f64,
    /// Z rotation in arc seconds
    pub rz: f64,
    /// Scale difference in parts per million
    pub scale_ppm: f64,
}

impl SevenParams {
    /// True when applying the parameters changes nothing
    pub fn is_zero(&self) -> bool {
        [
            self.dx,
            self.dy,
            self.dz,
            self.rx,
            self.ry,
            self.rz,
            self.scale_ppm,
        ]
        .iter()
        .all(|v| *v == 0.0)
    }
}

/// One term `coefficient · U^u_power · V^v_power` of a regression polynomial
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Term {
    /// Power of the normalized latitude
    pub u_power: u8,
    /// Power of the normalized longitude
    pub v_power: u8,
    /// Coefficient
    pub coefficient: f64,
}

impl Term {
    /// Create a term
    pub const fn new(u_power: u8, v_power: u8, coefficient: f64) -> Self {
        Self {
            u_power,
            v_power,
            coefficient,
        }
    }
}

/// Multiple regression polynomial definition
///
/// `U = k·(lat − lat0)` and `V = k·(lng − lng0)`. Latitude and longitude
/// polynomials yield arc seconds, the height polynomial meters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegressionDef {
    /// Latitude offset, degrees
    pub lat0: f64,
    /// Longitude offset, degrees east-positive
    pub lng0: f64,
    /// Normalizing scale
    pub k: f64,
    /// Region where the polynomials are valid
    pub validation: Extent,
    /// Latitude shift terms
    #[cfg_attr(feature = "serde", serde(default))]
    pub lat_terms: Vec<Term>,
    /// Longitude shift terms
    #[cfg_attr(feature = "serde", serde(default))]
    pub lng_terms: Vec<Term>,
    /// Height shift terms
    #[cfg_attr(feature = "serde", serde(default))]
    pub hgt_terms: Vec<Term>,
    /// Method applied outside the validation region
    #[cfg_attr(feature = "serde", serde(default))]
    pub fallback: Option<Box<MethodDef>>,
}

/// A grid file referenced by a grid shift transformation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridFileDef {
    /// File system path
    pub path: String,
    /// Apply the file in its inverse direction
    #[cfg_attr(feature = "serde", serde(default))]
    pub inverse: bool,
}

impl GridFileDef {
    /// A file applied forward
    pub fn forward(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            inverse: false,
        }
    }
}

/// Grid shift definition, files searched in order
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridShiftDef {
    /// Grid files, first covering file wins
    pub files: Vec<GridFileDef>,
    /// Method applied where no file covers the point
    #[cfg_attr(feature = "serde", serde(default))]
    pub fallback: Option<Box<MethodDef>>,
}

/// Transformation method and its parameters
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum MethodDef {
    /// Identity
    #[default]
    Null,
    /// Three-parameter geocentric translation
    GeocentricTranslation {
        /// X translation in meters
        dx: f64,
        /// Y translation in meters
        dy: f64,
        /// Z translation in meters
        dz: f64,
    },
    /// Standard Molodensky
    Molodensky {
        /// X translation in meters
        dx: f64,
        /// Y translation in meters
        dy: f64,
        /// Z translation in meters
        dz: f64,
    },
    /// Seven parameters with exact rotation matrix
    BursaWolf(SevenParams),
    /// Seven parameters with linearized rotation matrix
    SevenParameter(SevenParams),
    /// Polynomial regression
    MultipleRegression(RegressionDef),
    /// Grid file interpolation
    GridShift(GridShiftDef),
}

impl MethodDef {
    /// Short method name for logs and descriptions
    pub const fn kind(&self) -> &'static str {
        match self {
            MethodDef::Null => "null",
            MethodDef::GeocentricTranslation { .. } => "geocentric-translation",
            MethodDef::Molodensky { .. } => "molodensky",
            MethodDef::BursaWolf(_) => "bursa-wolf",
            MethodDef::SevenParameter(_) => "seven-parameter",
            MethodDef::MultipleRegression(_) => "multiple-regression",
            MethodDef::GridShift(_) => "grid-shift",
        }
    }

    /// True when the parameters alone make the method an identity
    ///
    /// Molodensky additionally needs identical ellipsoids, which the
    /// definition cannot know.
    pub fn has_zero_parameters(&self) -> bool {
        match self {
            MethodDef::Null => true,
            MethodDef::GeocentricTranslation { dx, dy, dz } | MethodDef::Molodensky { dx, dy, dz } => {
                *dx == 0.0 && *dy == 0.0 && *dz == 0.0
            }
            MethodDef::BursaWolf(p) | MethodDef::SevenParameter(p) => p.is_zero(),
            MethodDef::MultipleRegression(_) | MethodDef::GridShift(_) => false,
        }
    }
}

/// A pairwise transformation between two datums
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeodeticTransformation {
    /// Key name
    pub name: String,
    /// Source datum key name
    pub source: String,
    /// Target datum key name
    pub target: String,
    /// Method and parameters
    pub method: MethodDef,
    /// Iteration controls for the inverse
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub iteration: IterationParams,
    /// Whether the inverse may be used
    #[cfg_attr(feature = "serde", serde(default = "reversible_default"))]
    pub reversible: bool,
    /// Free text description
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
}

#[cfg(feature = "serde")]
fn reversible_default() -> bool {
    true
}

impl GeodeticTransformation {
    /// Create a reversible transformation with default iteration controls
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        method: MethodDef,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            target: target.into(),
            method,
            iteration: IterationParams::default(),
            reversible: true,
            description: None,
        }
    }

    /// Set the reversible flag
    pub fn with_reversible(mut self, reversible: bool) -> Self {
        self.reversible = reversible;
        self
    }

    /// Set the iteration controls
    pub fn with_iteration(mut self, iteration: IterationParams) -> Self {
        self.iteration = iteration;
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_parameters() {
        assert!(MethodDef::Null.has_zero_parameters());
        assert!(MethodDef::GeocentricTranslation {
            dx: 0.0,
            dy: 0.0,
            dz: 0.0
        }
        .has_zero_parameters());
        assert!(!MethodDef::BursaWolf(SevenParams {
            rz: 0.1,
            ..SevenParams::default()
        })
        .has_zero_parameters());
        assert!(!MethodDef::GridShift(GridShiftDef::default()).has_zero_parameters());
    }

    #[test]
    fn test_builder_defaults() {
        let gx = GeodeticTransformation::new("A_to_B", "A", "B", MethodDef::Null)
            .with_reversible(false)
            .with_description("test");
        assert!(!gx.reversible);
        assert_eq!(gx.iteration, IterationParams::default());
        assert_eq!(gx.method.kind(), "null");
    }
}
