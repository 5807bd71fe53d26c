//! Resolved chains of transformations
//!
//! A [`Bridge`] is what [`BridgeBuilder`] produces and what
//! [`crate::ConversionDispatcher`] consumes: the ordered segments between two
//! datums, each with a concrete direction and an executable method.

mod builder;

pub use builder::{BridgeBuilder, MAX_BRIDGE_SEGMENTS};

use core::fmt;

use datumshift_core::{Direction, ErrorPolicy, FailureBlocks, ShiftMethod};

use crate::methods::Method;

/// Which stage of resolution completed a bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Source and target are the same datum
    Identity,
    /// A registered path connects the datums
    DirectPath,
    /// A single registered transformation connects the datums
    DirectTransformation,
    /// Routed through the named pivot datum
    Pivot(String),
    /// Walked from one or both ends through their only transformations
    SingularReference,
    /// Built from the datums' own to-WGS84 parameters
    Legacy,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Identity => f.write_str("identity"),
            Resolution::DirectPath => f.write_str("direct path"),
            Resolution::DirectTransformation => f.write_str("direct transformation"),
            Resolution::Pivot(p) => write!(f, "pivot {p}"),
            Resolution::SingularReference => f.write_str("singular reference"),
            Resolution::Legacy => f.write_str("legacy"),
        }
    }
}

/// One transformation on a bridge
#[derive(Debug)]
pub struct Segment {
    /// Transformation name
    pub name: String,
    /// Datum the segment starts from, after applying the direction
    pub source: String,
    /// Datum the segment ends at, after applying the direction
    pub target: String,
    /// Direction the transformation is applied in
    pub direction: Direction,
    /// Disabled segments are skipped during conversion
    pub enabled: bool,
    /// Executable method
    pub method: Method,
}

impl Segment {
    /// Create an enabled segment
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        direction: Direction,
        method: Method,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            target: target.into(),
            direction,
            enabled: true,
            method,
        }
    }
}

/// An ordered chain of segments from one datum to another
#[derive(Debug)]
pub struct Bridge {
    source: String,
    target: String,
    segments: Vec<Segment>,
    resolution: Resolution,
    policy: ErrorPolicy,
    pub(crate) failures: FailureBlocks,
}

impl Bridge {
    /// Assemble a bridge from already resolved segments
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        segments: Vec<Segment>,
        resolution: Resolution,
        policy: ErrorPolicy,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            segments,
            resolution,
            policy,
            failures: FailureBlocks::new(),
        }
    }

    /// Source datum name
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Target datum name
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Segments in application order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub(crate) fn segments_mut(&mut self) -> &mut [Segment] {
        &mut self.segments
    }

    /// How the bridge was resolved
    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    /// Soft error policy
    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Change the policy; already recorded blocks are kept
    pub fn set_policy(&mut self, policy: ErrorPolicy) {
        self.policy = policy;
    }

    /// Blocks already reported under a block policy
    pub fn failure_blocks(&self) -> &FailureBlocks {
        &self.failures
    }

    /// Forget every reported block
    pub fn reset_failures(&mut self) {
        self.failures.clear();
    }

    /// Number of segments, enabled or not
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True for a bridge with no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments applied during conversion
    pub fn enabled_len(&self) -> usize {
        self.segments.iter().filter(|s| s.enabled).count()
    }

    /// True when every segment can be used from more than one thread of
    /// control without re-reading its files
    pub fn is_reentrant(&self) -> bool {
        self.segments.iter().all(|s| s.method.is_reentrant())
    }

    /// Drop file images held by segments; they reopen on next use
    pub fn release(&mut self) {
        for segment in &mut self.segments {
            segment.method.release();
        }
    }

    /// Human-readable summary of the chain
    pub fn description(&self) -> String {
        if self.segments.is_empty() {
            return format!("{} -> {} (identity)", self.source, self.target);
        }
        let steps: Vec<String> = self
            .segments
            .iter()
            .map(|s| {
                let mut step = format!("{} [{}]", s.name, s.direction);
                if !s.enabled {
                    step.push_str(" (no-op)");
                }
                step
            })
            .collect();
        format!(
            "{} -> {} via {}: {}",
            self.source,
            self.target,
            self.resolution,
            steps.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn null_segment(name: &str, from: &str, to: &str) -> Segment {
        Segment::new(name, from, to, Direction::Forward, Method::Null)
    }

    #[test]
    fn test_empty_bridge() {
        let bridge = Bridge::new("A", "A", Vec::new(), Resolution::Identity, ErrorPolicy::default());
        assert!(bridge.is_empty());
        assert!(bridge.is_reentrant());
        assert_eq!(bridge.description(), "A -> A (identity)");
    }

    #[test]
    fn test_description_lists_segments() {
        let mut second = null_segment("B_to_C", "B", "C");
        second.enabled = false;
        let bridge = Bridge::new(
            "A",
            "C",
            vec![null_segment("A_to_B", "A", "B"), second],
            Resolution::Pivot("B".into()),
            ErrorPolicy::Ignore,
        );
        assert_eq!(bridge.len(), 2);
        assert_eq!(bridge.enabled_len(), 1);
        assert_eq!(
            bridge.description(),
            "A -> C via pivot B: A_to_B [forward], B_to_C [forward] (no-op)"
        );
    }
}
