//! Bridge resolution
//!
//! Resolution keeps two partial chains: steps leaving the source (front) and
//! steps arriving at the target (back). Each round tries, in order, a
//! registered path, a registered transformation, and pivot datums between
//! the current ends. When none connects them, each end may advance through
//! the only transformation that touches it, and the round repeats.

use datumshift_core::{
    same_datum, Datum, DatumDictionary, Direction, Ellipsoid, ErrorPolicy, GeodeticError,
    GeodeticPath, GeodeticTransformation, LegacyMethod, LegacyParameters, Lookup, MethodDef,
    PathDictionary, PivotList, Result, SevenParams, ShiftMethod, TransformationDictionary,
};

use super::{Bridge, Resolution, Segment};
use crate::config::EngineConfig;
use crate::grid_file::GridFileOptions;
use crate::methods::{Method, MethodContext};
use crate::registry::PivotDatums;

/// Upper bound on segments in one bridge
pub const MAX_BRIDGE_SEGMENTS: usize = 50;

const WGS84: &str = "WGS84";

/// A transformation chosen for the bridge, not yet opened
#[derive(Debug, Clone)]
struct Step {
    gx: GeodeticTransformation,
    direction: Direction,
}

impl Step {
    fn new(gx: &GeodeticTransformation, direction: Direction) -> Self {
        Self {
            gx: gx.clone(),
            direction,
        }
    }

    /// Datum the step starts from once its direction is applied
    fn start(&self) -> &str {
        match self.direction {
            Direction::Forward => &self.gx.source,
            Direction::Inverse => &self.gx.target,
        }
    }

    /// Datum the step arrives at once its direction is applied
    fn end(&self) -> &str {
        match self.direction {
            Direction::Forward => &self.gx.target,
            Direction::Inverse => &self.gx.source,
        }
    }
}

/// Resolves datum pairs into bridges
pub struct BridgeBuilder<'a> {
    datums: &'a dyn DatumDictionary,
    transformations: Option<&'a dyn TransformationDictionary>,
    paths: Option<&'a dyn PathDictionary>,
    pivots: Option<&'a dyn PivotList>,
    default_pivots: PivotDatums,
    grid_options: GridFileOptions,
}

impl<'a> BridgeBuilder<'a> {
    /// Create a builder with only a datum dictionary
    pub fn new(datums: &'a dyn DatumDictionary) -> Self {
        Self {
            datums,
            transformations: None,
            paths: None,
            pivots: None,
            default_pivots: PivotDatums::default(),
            grid_options: GridFileOptions::default(),
        }
    }

    /// Use a transformation dictionary
    pub fn with_transformations(mut self, transformations: &'a dyn TransformationDictionary) -> Self {
        self.transformations = Some(transformations);
        self
    }

    /// Use a path dictionary
    pub fn with_paths(mut self, paths: &'a dyn PathDictionary) -> Self {
        self.paths = Some(paths);
        self
    }

    /// Use a caller-supplied pivot list instead of the default one
    pub fn with_pivots(mut self, pivots: &'a dyn PivotList) -> Self {
        self.pivots = Some(pivots);
        self
    }

    /// Options for grid files opened while resolving segments
    pub fn with_grid_options(mut self, options: GridFileOptions) -> Self {
        self.grid_options = options;
        self
    }

    /// Take pivots and grid options from an engine configuration
    ///
    /// An explicit [`BridgeBuilder::with_pivots`] list still wins.
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.default_pivots = config.pivot_list();
        self.grid_options = config.grid.clone();
        self
    }

    fn pivot_names(&self) -> &[String] {
        match self.pivots {
            Some(p) => p.pivots(),
            None => self.default_pivots.pivots(),
        }
    }

    /// Resolve `source` to `target` into an executable bridge
    pub fn build(&self, source: &str, target: &str, policy: ErrorPolicy) -> Result<Bridge> {
        if same_datum(source, target) {
            tracing::debug!(source, target, "identity bridge");
            return Ok(Bridge::new(source, target, Vec::new(), Resolution::Identity, policy));
        }

        let registry_sparse = self.transformations.map_or(true, |t| t.len() <= 1);
        if registry_sparse {
            match self.legacy_steps(source, target) {
                Ok(Some(steps)) => {
                    tracing::debug!(source, target, steps = steps.len(), "resolved from legacy parameters");
                    return self.finish(source, target, steps, Resolution::Legacy, policy);
                }
                Ok(None) => {}
                Err(e) if self.transformations.is_some() => {
                    tracing::debug!(error = %e, "legacy fallback unavailable");
                }
                Err(e) => return Err(e),
            }
            if self.transformations.is_none() {
                return Err(no_path(source, target));
            }
        }

        let (steps, resolution) = self.search(source, target)?;
        self.finish(source, target, steps, resolution, policy)
    }

    fn search(&self, source: &str, target: &str) -> Result<(Vec<Step>, Resolution)> {
        let mut front: Vec<Step> = Vec::new();
        let mut back: Vec<Step> = Vec::new();
        let mut current_source = source.to_string();
        let mut current_target = target.to_string();
        let mut walked = false;

        loop {
            if front.len() + back.len() > MAX_BRIDGE_SEGMENTS {
                return Err(too_long(source, target));
            }
            if same_datum(&current_source, &current_target) {
                front.append(&mut back);
                return Ok((front, Resolution::SingularReference));
            }

            let resolved = match self.direct_path(&current_source, &current_target)? {
                Some(steps) => Some((steps, Resolution::DirectPath)),
                None => match self.direct_transformation(&current_source, &current_target)? {
                    Some(steps) => Some((steps, Resolution::DirectTransformation)),
                    None => self.pivot(&current_source, &current_target)?,
                },
            };

            if let Some((mut middle, resolution)) = resolved {
                tracing::debug!(
                    source = %current_source,
                    target = %current_target,
                    %resolution,
                    "bridge complete"
                );
                front.append(&mut middle);
                front.append(&mut back);
                let resolution = if walked {
                    Resolution::SingularReference
                } else {
                    resolution
                };
                return Ok((front, resolution));
            }

            let mut progress = false;
            if let Some(step) = self.singular(&current_source, true, &front, &back) {
                tracing::debug!(datum = %current_source, via = %step.gx.name, "advancing source end");
                current_source = step.end().to_string();
                front.push(step);
                progress = true;
            }
            if !same_datum(&current_source, &current_target) {
                if let Some(step) = self.singular(&current_target, false, &front, &back) {
                    tracing::debug!(datum = %current_target, via = %step.gx.name, "advancing target end");
                    current_target = step.start().to_string();
                    back.insert(0, step);
                    progress = true;
                }
            }
            if !progress {
                return Err(no_path(source, target));
            }
            walked = true;
        }
    }

    /// Phase one: a registered path
    fn direct_path(&self, source: &str, target: &str) -> Result<Option<Vec<Step>>> {
        let Some(paths) = self.paths else {
            return Ok(None);
        };
        match paths.find_by_source_target(source, target, true) {
            Lookup::None => Ok(None),
            Lookup::One(path, direction) => self.path_steps(path, direction).map(Some),
            Lookup::Many(count) => {
                tracing::debug!(source, target, count, "ambiguous path");
                Err(ambiguous(source, target))
            }
        }
    }

    /// Phase two: a registered transformation
    fn direct_transformation(&self, source: &str, target: &str) -> Result<Option<Vec<Step>>> {
        let Some(transformations) = self.transformations else {
            return Ok(None);
        };
        match transformations.find_by_source_target(source, target, true) {
            Lookup::None => Ok(None),
            Lookup::One(gx, direction) => Ok(Some(vec![Step::new(gx, direction)])),
            Lookup::Many(count) => {
                tracing::debug!(source, target, count, "ambiguous transformation");
                Err(ambiguous(source, target))
            }
        }
    }

    /// Path first, then transformation
    fn route(&self, source: &str, target: &str) -> Result<Option<Vec<Step>>> {
        match self.direct_path(source, target)? {
            Some(steps) => Ok(Some(steps)),
            None => self.direct_transformation(source, target),
        }
    }

    /// Phase three: both halves through one pivot
    fn pivot(&self, source: &str, target: &str) -> Result<Option<(Vec<Step>, Resolution)>> {
        for pivot in self.pivot_names() {
            if same_datum(pivot, source) || same_datum(pivot, target) {
                continue;
            }
            let Some(mut first) = self.route(source, pivot)? else {
                continue;
            };
            let Some(mut second) = self.route(pivot, target)? else {
                continue;
            };
            first.append(&mut second);
            return Ok(Some((first, Resolution::Pivot(pivot.clone()))));
        }
        Ok(None)
    }

    /// Phase four: the only transformation touching `datum`
    ///
    /// Every transformation with `datum` at either end counts, one-way or
    /// not; those already on the bridge do not. At the source end the step
    /// must leave `datum`; at the target end it must arrive there.
    fn singular(&self, datum: &str, leaving: bool, front: &[Step], back: &[Step]) -> Option<Step> {
        let transformations = self.transformations?;
        let mut touching = transformations.transformations().filter(|gx| {
            !same_datum(&gx.source, &gx.target)
                && (same_datum(&gx.source, datum) || same_datum(&gx.target, datum))
                && !front
                    .iter()
                    .chain(back)
                    .any(|s| s.gx.name.eq_ignore_ascii_case(&gx.name))
        });
        let only = touching.next()?;
        if touching.next().is_some() {
            return None;
        }
        let direction = if leaving == same_datum(&only.source, datum) {
            Direction::Forward
        } else {
            Direction::Inverse
        };
        if direction == Direction::Inverse && !only.reversible {
            tracing::debug!(datum, via = %only.name, "only transformation is one-way");
            return None;
        }
        Some(Step::new(only, direction))
    }

    fn path_steps(&self, path: &GeodeticPath, direction: Direction) -> Result<Vec<Step>> {
        let transformations = self.transformations.ok_or_else(|| {
            GeodeticError::system(format!(
                "path {} needs a transformation dictionary",
                path.name
            ))
        })?;
        path.oriented_steps(direction)
            .into_iter()
            .map(|step| {
                let gx = transformations.lookup(&step.transformation).ok_or_else(|| {
                    GeodeticError::system(format!(
                        "path {} references unknown transformation {}",
                        path.name, step.transformation
                    ))
                })?;
                Ok(Step::new(gx, step.direction))
            })
            .collect()
    }

    /// Steps built from the datums' own to-WGS84 parameters
    fn legacy_steps(&self, source: &str, target: &str) -> Result<Option<Vec<Step>>> {
        let mut steps = Vec::new();
        if !same_datum(source, WGS84) {
            let source_datum = self.datum(source)?;
            let Some(params) = source_datum.simple_legacy() else {
                return Ok(None);
            };
            steps.push(Step {
                gx: legacy_transformation(source_datum, params),
                direction: Direction::Forward,
            });
        }
        if !same_datum(target, WGS84) {
            let target_datum = self.datum(target)?;
            let Some(params) = target_datum.simple_legacy() else {
                return Ok(None);
            };
            steps.push(Step {
                gx: legacy_transformation(target_datum, params),
                direction: Direction::Inverse,
            });
        }
        Ok(Some(steps))
    }

    fn datum(&self, name: &str) -> Result<&'a Datum> {
        self.datums
            .lookup(name)
            .ok_or_else(|| GeodeticError::UnknownDatum(name.to_string()))
    }

    fn ellipsoid(&self, name: &str) -> Result<Ellipsoid> {
        match self.datums.lookup(name) {
            Some(datum) => Ok(datum.ellipsoid.clone()),
            None if same_datum(name, WGS84) => Ok(Ellipsoid::wgs84()),
            None => Err(GeodeticError::UnknownDatum(name.to_string())),
        }
    }

    fn finish(
        &self,
        source: &str,
        target: &str,
        steps: Vec<Step>,
        resolution: Resolution,
        policy: ErrorPolicy,
    ) -> Result<Bridge> {
        if steps.len() > MAX_BRIDGE_SEGMENTS {
            return Err(too_long(source, target));
        }
        let segments = steps
            .into_iter()
            .map(|step| self.segment(step))
            .collect::<Result<Vec<_>>>()?;
        let bridge = Bridge::new(source, target, segments, resolution, policy);
        tracing::debug!(description = %bridge.description(), "bridge built");
        Ok(bridge)
    }

    fn segment(&self, step: Step) -> Result<Segment> {
        let source = self.ellipsoid(&step.gx.source)?;
        let target = self.ellipsoid(&step.gx.target)?;
        let ctx = MethodContext {
            source: &source,
            target: &target,
            iteration: step.gx.iteration,
            grid_options: &self.grid_options,
        };
        let method = Method::from_def(&step.gx.method, &ctx)?;
        let mut segment = Segment::new(
            step.gx.name.clone(),
            step.start(),
            step.end(),
            step.direction,
            method,
        );
        if segment.method.is_null() {
            tracing::debug!(segment = %segment.name, "disabling no-op segment");
            segment.enabled = false;
        }
        Ok(segment)
    }
}

fn legacy_transformation(datum: &Datum, params: &LegacyParameters) -> GeodeticTransformation {
    let seven = SevenParams {
        dx: params.dx,
        dy: params.dy,
        dz: params.dz,
        rx: params.rx,
        ry: params.ry,
        rz: params.rz,
        scale_ppm: params.scale_ppm,
    };
    let method = match params.method {
        LegacyMethod::GeocentricTranslation => MethodDef::GeocentricTranslation {
            dx: params.dx,
            dy: params.dy,
            dz: params.dz,
        },
        LegacyMethod::Molodensky => MethodDef::Molodensky {
            dx: params.dx,
            dy: params.dy,
            dz: params.dz,
        },
        LegacyMethod::BursaWolf => MethodDef::BursaWolf(seven),
        LegacyMethod::SevenParameter => MethodDef::SevenParameter(seven),
        LegacyMethod::Wgs84Equivalent | LegacyMethod::Complex => MethodDef::Null,
    };
    GeodeticTransformation::new(format!("{}_to_{WGS84}", datum.name), datum.name.clone(), WGS84, method)
        .with_description("built from legacy datum parameters")
}

fn no_path(source: &str, target: &str) -> GeodeticError {
    tracing::error!(source, target, "no path between datums");
    GeodeticError::NoPathFound {
        from: source.to_string(),
        to: target.to_string(),
    }
}

fn ambiguous(source: &str, target: &str) -> GeodeticError {
    tracing::error!(source, target, "ambiguous transformation between datums");
    GeodeticError::AmbiguousTransformation {
        from: source.to_string(),
        to: target.to_string(),
    }
}

fn too_long(source: &str, target: &str) -> GeodeticError {
    tracing::error!(source, target, max = MAX_BRIDGE_SEGMENTS, "bridge too long");
    GeodeticError::system(format!(
        "bridge from {source} to {target} exceeds {MAX_BRIDGE_SEGMENTS} segments"
    ))
}
