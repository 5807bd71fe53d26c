//! Read-only lookup services consumed by the bridge builder
//!
//! Implementations own their data; lookups hand out borrows. All name
//! comparisons are case-insensitive.

use crate::model::{same_datum, Datum, Direction, GeodeticPath, GeodeticTransformation};

/// Result of a source/target search
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// Nothing connects the pair
    None,
    /// Exactly one entry, with the direction it must be applied in
    One(T, Direction),
    /// More than one entry matched; the count is informational
    Many(usize),
}

impl<T> Lookup<T> {
    /// True for [`Lookup::None`]
    pub fn is_none(&self) -> bool {
        matches!(self, Lookup::None)
    }

    /// Pick the unique entry among `(entry, direction)` candidates
    ///
    /// Forward and reversed candidates count alike.
    pub fn from_candidates(candidates: impl IntoIterator<Item = (T, Direction)>) -> Self {
        let mut candidates = candidates.into_iter();
        let Some((entry, direction)) = candidates.next() else {
            return Lookup::None;
        };
        match candidates.count() {
            0 => Lookup::One(entry, direction),
            rest => Lookup::Many(rest + 1),
        }
    }
}

/// How an entry with `source`/`target` relates to a wanted pair
pub fn orientation(
    source: &str,
    target: &str,
    wanted_source: &str,
    wanted_target: &str,
    reverse_allowed: bool,
) -> Option<Direction> {
    if same_datum(source, wanted_source) && same_datum(target, wanted_target) {
        Some(Direction::Forward)
    } else if reverse_allowed && same_datum(source, wanted_target) && same_datum(target, wanted_source) {
        Some(Direction::Inverse)
    } else {
        None
    }
}

/// Datum lookup by key name
pub trait DatumDictionary {
    /// Find a datum
    fn lookup(&self, name: &str) -> Option<&Datum>;
}

/// Transformation lookup
pub trait TransformationDictionary {
    /// Find a transformation by key name
    fn lookup(&self, name: &str) -> Option<&GeodeticTransformation>;

    /// Every transformation in the dictionary
    fn transformations(&self) -> Box<dyn Iterator<Item = &GeodeticTransformation> + '_>;

    /// Find the transformation connecting `source` to `target`
    ///
    /// With `allow_reverse`, reversible entries defined target to source
    /// also match and are returned with [`Direction::Inverse`].
    fn find_by_source_target(
        &self,
        source: &str,
        target: &str,
        allow_reverse: bool,
    ) -> Lookup<&GeodeticTransformation> {
        Lookup::from_candidates(self.transformations().filter_map(|gx| {
            orientation(&gx.source, &gx.target, source, target, allow_reverse && gx.reversible)
                .map(|d| (gx, d))
        }))
    }

    /// Number of transformations
    fn len(&self) -> usize {
        self.transformations().count()
    }

    /// True when the dictionary holds nothing
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Path lookup
pub trait PathDictionary {
    /// Every path in the dictionary
    fn paths(&self) -> Box<dyn Iterator<Item = &GeodeticPath> + '_>;

    /// Find the path connecting `source` to `target`
    fn find_by_source_target(
        &self,
        source: &str,
        target: &str,
        allow_reverse: bool,
    ) -> Lookup<&GeodeticPath> {
        Lookup::from_candidates(self.paths().filter_map(|gp| {
            orientation(&gp.source, &gp.target, source, target, allow_reverse && gp.reversible)
                .map(|d| (gp, d))
        }))
    }
}

/// Ordered list of pivot datums tried when no direct route exists
pub trait PivotList {
    /// Pivot datum names in preference order
    fn pivots(&self) -> &[String];
}
