//! Applying a bridge to coordinates
//!
//! The dispatcher runs every enabled segment in order and folds the soft
//! errors they raise through the bridge's [`ErrorPolicy`]. A hard failure
//! anywhere returns the original coordinate.

use core::fmt;

use datumshift_core::{
    BlockInsert, BlockKey, Coordinate, Direction, ErrorPolicy, GeodeticError, Outcome, Result,
    ShiftMethod,
};

use crate::bridge::{Bridge, Segment};

/// Kind of recoverable problem met during a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftErrorKind {
    /// Outside coverage; a fallback method produced the result
    OutsideCoverageFallback,
    /// Outside coverage; the coordinate passed through unshifted
    OutsideCoverageUnshifted,
    /// An inverse did not converge within its tolerance
    NoConvergence,
}

impl SoftErrorKind {
    /// Classify a soft error; `None` for hard errors
    pub fn from_error(error: &GeodeticError) -> Option<Self> {
        match error {
            GeodeticError::CoverageFallback { .. } => Some(SoftErrorKind::OutsideCoverageFallback),
            GeodeticError::Coverage { .. } => Some(SoftErrorKind::OutsideCoverageUnshifted),
            GeodeticError::Convergence { .. } => Some(SoftErrorKind::NoConvergence),
            _ => None,
        }
    }
}

impl fmt::Display for SoftErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SoftErrorKind::OutsideCoverageFallback => "outside coverage, fallback used",
            SoftErrorKind::OutsideCoverageUnshifted => "outside coverage, unshifted",
            SoftErrorKind::NoConvergence => "no convergence",
        })
    }
}

/// Final state of one conversion
#[derive(Debug)]
pub enum Status {
    /// Every segment succeeded
    Ok,
    /// A soft error occurred; `reported` tells whether it was logged
    Soft {
        /// First soft error met
        kind: SoftErrorKind,
        /// Whether the policy reported it
        reported: bool,
    },
    /// The conversion failed and the input was returned
    Hard(GeodeticError),
}

impl Status {
    /// True for [`Status::Ok`]
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }

    /// True for [`Status::Hard`]
    pub fn is_hard(&self) -> bool {
        matches!(self, Status::Hard(_))
    }

    /// True for a soft error the policy reported
    pub fn is_reported(&self) -> bool {
        matches!(self, Status::Soft { reported: true, .. })
    }
}

/// A converted coordinate and how the conversion went
#[derive(Debug)]
pub struct Conversion {
    /// Output, or the input when the status is hard
    pub coordinate: Coordinate,
    /// Outcome classification
    pub status: Status,
}

impl Conversion {
    fn hard(original: Coordinate, error: GeodeticError) -> Self {
        Self {
            coordinate: original,
            status: Status::Hard(error),
        }
    }
}

/// Runs bridges over coordinates
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversionDispatcher;

impl ConversionDispatcher {
    /// Create a dispatcher
    pub fn new() -> Self {
        Self
    }

    /// Convert one coordinate across `bridge`
    ///
    /// In 2D mode heights pass through untouched.
    pub fn convert(&self, bridge: &mut Bridge, coordinate: Coordinate, is_3d: bool) -> Conversion {
        let mut current = coordinate;
        let mut first_soft: Option<(SoftErrorKind, GeodeticError)> = None;

        for segment in bridge.segments_mut().iter_mut().filter(|s| s.enabled) {
            match apply(segment, current, is_3d) {
                Ok(out) => {
                    current = out.value;
                    if let Some(error) = out.soft {
                        match SoftErrorKind::from_error(&error) {
                            Some(kind) => {
                                tracing::trace!(segment = %segment.name, %kind, "soft error in segment");
                                if first_soft.is_none() {
                                    first_soft = Some((kind, error));
                                }
                            }
                            None => {
                                tracing::error!(segment = %segment.name, %error, "segment failed");
                                return Conversion::hard(coordinate, error);
                            }
                        }
                    }
                }
                Err(error) => {
                    tracing::error!(segment = %segment.name, %error, "segment failed");
                    return Conversion::hard(coordinate, error);
                }
            }
        }

        let Some((kind, error)) = first_soft else {
            return Conversion {
                coordinate: current,
                status: Status::Ok,
            };
        };
        let soft = move |reported| Conversion {
            coordinate: current,
            status: Status::Soft { kind, reported },
        };

        match bridge.policy() {
            ErrorPolicy::Ignore => soft(false),
            ErrorPolicy::WarnAlways => {
                report(bridge, coordinate, kind, &error);
                soft(true)
            }
            ErrorPolicy::WarnOncePerBlock => {
                match bridge.failures.insert(block_of(coordinate)) {
                    BlockInsert::Inserted => {
                        report(bridge, coordinate, kind, &error);
                        soft(true)
                    }
                    BlockInsert::AlreadySeen | BlockInsert::Full => soft(false),
                }
            }
            ErrorPolicy::WarnOncePerBlockThenFail => {
                match bridge.failures.insert(block_of(coordinate)) {
                    BlockInsert::Inserted => {
                        report(bridge, coordinate, kind, &error);
                        soft(true)
                    }
                    BlockInsert::AlreadySeen => soft(false),
                    BlockInsert::Full => {
                        tracing::error!(
                            source = bridge.source(),
                            target = bridge.target(),
                            lng = coordinate.lng,
                            lat = coordinate.lat,
                            "too many distinct failure blocks"
                        );
                        Conversion::hard(coordinate, error)
                    }
                }
            }
            ErrorPolicy::FailFast => {
                tracing::error!(
                    source = bridge.source(),
                    target = bridge.target(),
                    %error,
                    "soft error escalated"
                );
                Conversion::hard(coordinate, error)
            }
        }
    }

    /// Convert a batch, collecting every result
    pub fn convert_all(&self, bridge: &mut Bridge, coordinates: &[Coordinate], is_3d: bool) -> Vec<Conversion> {
        coordinates
            .iter()
            .map(|&c| self.convert(bridge, c, is_3d))
            .collect()
    }
}

fn apply(segment: &mut Segment, coordinate: Coordinate, is_3d: bool) -> Result<Outcome<Coordinate>> {
    let method = &mut segment.method;
    match (segment.direction, is_3d) {
        (Direction::Forward, false) => method.forward_2d(coordinate),
        (Direction::Forward, true) => method.forward_3d(coordinate),
        (Direction::Inverse, false) => method.inverse_2d(coordinate),
        (Direction::Inverse, true) => method.inverse_3d(coordinate),
    }
}

fn block_of(coordinate: Coordinate) -> BlockKey {
    BlockKey::from_degrees(coordinate.lng, coordinate.lat)
}

fn report(bridge: &Bridge, coordinate: Coordinate, kind: SoftErrorKind, error: &GeodeticError) {
    tracing::warn!(
        source = bridge.source(),
        target = bridge.target(),
        lng = coordinate.lng,
        lat = coordinate.lat,
        %kind,
        %error,
        "datum shift soft error"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::Resolution;
    use crate::methods::{GridShift, Method};

    /// A bridge whose only segment never covers anything
    fn uncovered(policy: ErrorPolicy) -> Bridge {
        let method = Method::Grid(GridShift::new(Vec::new(), None));
        let segment = Segment::new("EMPTY_GRID", "A", "B", Direction::Forward, method);
        Bridge::new("A", "B", vec![segment], Resolution::DirectTransformation, policy)
    }

    fn at(block: i32) -> Coordinate {
        Coordinate::lng_lat(f64::from(block) + 0.5, 10.25)
    }

    #[test]
    fn test_clean_conversion() {
        let segment = Segment::new("NOOP", "A", "B", Direction::Forward, Method::Null);
        let mut bridge = Bridge::new("A", "B", vec![segment], Resolution::DirectTransformation, ErrorPolicy::FailFast);
        let out = ConversionDispatcher::new().convert(&mut bridge, Coordinate::new(1.0, 2.0, 3.0), true);
        assert!(out.status.is_ok());
        assert_eq!(out.coordinate, Coordinate::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_ignore_never_reports() {
        let mut bridge = uncovered(ErrorPolicy::Ignore);
        let out = ConversionDispatcher::new().convert(&mut bridge, at(0), false);
        assert!(matches!(
            out.status,
            Status::Soft {
                kind: SoftErrorKind::OutsideCoverageUnshifted,
                reported: false
            }
        ));
        assert_eq!(out.coordinate, at(0));
    }

    #[test]
    fn test_warn_always_reports_repeats() {
        let mut bridge = uncovered(ErrorPolicy::WarnAlways);
        let dispatcher = ConversionDispatcher::new();
        for _ in 0..3 {
            assert!(dispatcher.convert(&mut bridge, at(0), false).status.is_reported());
        }
    }

    #[test]
    fn test_once_per_block() {
        let mut bridge = uncovered(ErrorPolicy::WarnOncePerBlock);
        let dispatcher = ConversionDispatcher::new();
        assert!(dispatcher.convert(&mut bridge, at(3), false).status.is_reported());
        assert!(!dispatcher.convert(&mut bridge, at(3), false).status.is_reported());
        assert!(dispatcher.convert(&mut bridge, at(4), false).status.is_reported());
        assert_eq!(bridge.failure_blocks().len(), 2);
    }

    #[test]
    fn test_then_fail_escalates_after_capacity() {
        let mut bridge = uncovered(ErrorPolicy::WarnOncePerBlockThenFail);
        let dispatcher = ConversionDispatcher::new();
        for block in 0..10 {
            assert!(dispatcher.convert(&mut bridge, at(block), false).status.is_reported());
        }
        assert!(!dispatcher.convert(&mut bridge, at(5), false).status.is_hard());
        let out = dispatcher.convert(&mut bridge, at(10), false);
        assert!(matches!(out.status, Status::Hard(GeodeticError::Coverage { .. })));
        assert_eq!(out.coordinate, at(10));
    }

    #[test]
    fn test_fail_fast() {
        let mut bridge = uncovered(ErrorPolicy::FailFast);
        let out = ConversionDispatcher::new().convert(&mut bridge, at(0), true);
        assert!(out.status.is_hard());
    }

    #[test]
    fn test_disabled_segments_skipped() {
        let mut bridge = uncovered(ErrorPolicy::FailFast);
        bridge.segments_mut()[0].enabled = false;
        let out = ConversionDispatcher::new().convert(&mut bridge, at(0), false);
        assert!(out.status.is_ok());
    }
}
