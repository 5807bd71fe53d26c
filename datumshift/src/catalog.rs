//! JSON catalogs of datums, transformations and paths
//!
//! A catalog is a single JSON document:
//!
//! ```json
//! {
//!   "ellipsoids": [{ "name": "CLRK66", "a": 6378206.4, "e_sq": 0.006768657997291 }],
//!   "datums": [{ "name": "NAD27", "ellipsoid": "CLRK66" }],
//!   "transformations": [{
//!     "name": "NAD27_to_NAD83", "source": "NAD27", "target": "NAD83",
//!     "method": { "type": "grid_shift", "files": [{ "path": "ntv2_0.gsb" }] }
//!   }],
//!   "paths": []
//! }
//! ```
//!
//! Ellipsoids WGS84, GRS1980 and CLRK66 are always known.

use std::path::Path;

use datumshift_core::{
    Datum, Ellipsoid, GeodeticError, GeodeticPath, GeodeticTransformation, LegacyParameters, Result,
    TransformationDictionary,
};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::registry::{DatumRegistry, PathRegistry, TransformationRegistry};

/// A datum as written in a catalog, referring to its ellipsoid by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatumEntry {
    /// Key name
    pub name: String,
    /// Ellipsoid key name
    pub ellipsoid: String,
    /// Optional legacy to-WGS84 definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy: Option<LegacyParameters>,
}

/// Serialized dictionaries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    /// Extra ellipsoids
    pub ellipsoids: Vec<Ellipsoid>,
    /// Datums
    pub datums: Vec<DatumEntry>,
    /// Transformations
    pub transformations: Vec<GeodeticTransformation>,
    /// Paths
    pub paths: Vec<GeodeticPath>,
}

/// The three dictionaries built from a catalog
#[derive(Debug, Clone, Default)]
pub struct Registries {
    /// Datums
    pub datums: DatumRegistry,
    /// Transformations
    pub transformations: TransformationRegistry,
    /// Paths
    pub paths: PathRegistry,
}

impl Catalog {
    /// Parse a catalog document
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| GeodeticError::Config(format!("catalog: {e}")))
    }

    /// Read and parse a catalog file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Serialize as pretty JSON
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| GeodeticError::Config(format!("catalog: {e}")))
    }

    /// Resolve ellipsoid references and fill the dictionaries
    pub fn into_registries(self) -> Result<Registries> {
        let ellipsoids: HashMap<String, Ellipsoid> = [Ellipsoid::wgs84(), Ellipsoid::grs80(), Ellipsoid::clarke1866()]
            .into_iter()
            .chain(self.ellipsoids)
            .map(|e| (e.name.to_ascii_uppercase(), e))
            .collect();

        let mut out = Registries::default();
        for entry in self.datums {
            let ellipsoid = ellipsoids
                .get(&entry.ellipsoid.to_ascii_uppercase())
                .ok_or_else(|| {
                    GeodeticError::Config(format!(
                        "datum {} references unknown ellipsoid {}",
                        entry.name, entry.ellipsoid
                    ))
                })?
                .clone();
            let mut datum = Datum::new(entry.name, ellipsoid);
            datum.legacy = entry.legacy;
            out.datums.insert(datum);
        }
        for gx in self.transformations {
            out.transformations.insert(gx)?;
        }
        for path in self.paths {
            out.paths.insert(path);
        }
        tracing::debug!(
            datums = out.datums.len(),
            transformations = out.transformations.len(),
            paths = out.paths.len(),
            "catalog loaded"
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datumshift_core::{DatumDictionary, Direction, LegacyMethod, Lookup, MethodDef};

    const DOC: &str = r#"{
        "ellipsoids": [{ "name": "INTL", "a": 6378388.0, "e_sq": 0.00672267002233332 }],
        "datums": [
            { "name": "NAD27", "ellipsoid": "clrk66",
              "legacy": { "method": "molodensky", "dx": -8, "dy": 160, "dz": 176 } },
            { "name": "NAD83", "ellipsoid": "GRS1980" },
            { "name": "ED50", "ellipsoid": "INTL" }
        ],
        "transformations": [
            { "name": "NAD27_to_NAD83", "source": "NAD27", "target": "NAD83",
              "method": { "type": "grid_shift", "files": [{ "path": "ntv2_0.gsb" }] },
              "max_iterations": 20 },
            { "name": "ED50_to_WGS84", "source": "ED50", "target": "WGS84",
              "method": { "type": "geocentric_translation", "dx": -87, "dy": -98, "dz": -121 },
              "reversible": false }
        ]
    }"#;

    #[test]
    fn test_parse_and_build() {
        let registries = Catalog::from_json_str(DOC).unwrap().into_registries().unwrap();
        let nad27 = registries.datums.lookup("NAD27").unwrap();
        assert_eq!(nad27.ellipsoid, Ellipsoid::clarke1866());
        assert_eq!(nad27.legacy.unwrap().method, LegacyMethod::Molodensky);
        assert_eq!(registries.datums.lookup("ED50").unwrap().ellipsoid.a, 6_378_388.0);

        let gx = registries.transformations.lookup("NAD27_to_NAD83").unwrap();
        assert!(gx.reversible);
        assert_eq!(gx.iteration.max_iterations, 20);
        assert!(matches!(gx.method, MethodDef::GridShift(_)));

        assert!(matches!(
            registries.transformations.find_by_source_target("NAD27", "NAD83", true),
            Lookup::One(_, Direction::Forward)
        ));
        assert!(registries
            .transformations
            .find_by_source_target("WGS84", "ED50", true)
            .is_none());
    }

    #[test]
    fn test_unknown_ellipsoid() {
        let doc = r#"{ "datums": [{ "name": "X", "ellipsoid": "NOPE" }] }"#;
        let err = Catalog::from_json_str(doc).unwrap().into_registries().unwrap_err();
        assert!(matches!(err, GeodeticError::Config(_)));
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        assert!(matches!(Catalog::from_json_str("{ nope"), Err(GeodeticError::Config(_))));
    }

    #[test]
    fn test_json_file_round_trip() {
        let catalog = Catalog::from_json_str(DOC).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, catalog.to_json_string().unwrap()).unwrap();
        assert_eq!(Catalog::from_json_file(&path).unwrap(), catalog);
    }
}
