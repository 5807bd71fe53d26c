//! In-memory dictionaries
//!
//! Owned implementations of the lookup traits, keyed case-insensitively.
//! Callers fill them directly or load a [`crate::Catalog`].

use datumshift_core::{
    Datum, DatumDictionary, GeodeticError, GeodeticPath, GeodeticTransformation, PathDictionary,
    PivotList, Result, TransformationDictionary,
};
use hashbrown::HashMap;

fn key(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

/// Datums by name
#[derive(Debug, Clone, Default)]
pub struct DatumRegistry {
    datums: HashMap<String, Datum>,
}

impl DatumRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a datum
    pub fn insert(&mut self, datum: Datum) -> &mut Self {
        self.datums.insert(key(&datum.name), datum);
        self
    }

    /// Number of datums
    pub fn len(&self) -> usize {
        self.datums.len()
    }

    /// True if empty
    pub fn is_empty(&self) -> bool {
        self.datums.is_empty()
    }

    /// Iterate in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &Datum> {
        self.datums.values()
    }
}

impl DatumDictionary for DatumRegistry {
    fn lookup(&self, name: &str) -> Option<&Datum> {
        self.datums.get(&key(name))
    }
}

/// Transformations by name, kept in insertion order
#[derive(Debug, Clone, Default)]
pub struct TransformationRegistry {
    entries: Vec<GeodeticTransformation>,
    by_name: HashMap<String, usize>,
}

impl TransformationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transformation; names must be unique
    pub fn insert(&mut self, gx: GeodeticTransformation) -> Result<&mut Self> {
        let k = key(&gx.name);
        if self.by_name.contains_key(&k) {
            return Err(GeodeticError::Config(format!(
                "duplicate transformation name {}",
                gx.name
            )));
        }
        self.by_name.insert(k, self.entries.len());
        self.entries.push(gx);
        Ok(self)
    }
}

impl TransformationDictionary for TransformationRegistry {
    fn lookup(&self, name: &str) -> Option<&GeodeticTransformation> {
        self.by_name.get(&key(name)).map(|&i| &self.entries[i])
    }

    fn transformations(&self) -> Box<dyn Iterator<Item = &GeodeticTransformation> + '_> {
        Box::new(self.entries.iter())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Paths in insertion order
#[derive(Debug, Clone, Default)]
pub struct PathRegistry {
    entries: Vec<GeodeticPath>,
}

impl PathRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path
    pub fn insert(&mut self, path: GeodeticPath) -> &mut Self {
        self.entries.push(path);
        self
    }

    /// Number of paths
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PathDictionary for PathRegistry {
    fn paths(&self) -> Box<dyn Iterator<Item = &GeodeticPath> + '_> {
        Box::new(self.entries.iter())
    }
}

/// Pivot datums tried by default, in order
pub const DEFAULT_PIVOTS: [&str; 3] = ["WGS84", "NAD83", "ETRF89"];

/// An owned pivot list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotDatums(Vec<String>);

impl PivotDatums {
    /// Create from names in preference order
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }
}

impl Default for PivotDatums {
    fn default() -> Self {
        Self::new(DEFAULT_PIVOTS)
    }
}

impl PivotList for PivotDatums {
    fn pivots(&self) -> &[String] {
        &self.0
    }
}
