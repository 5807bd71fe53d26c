//! Pre-composed transformation paths

use core::fmt;

/// Direction in which a transformation is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// Source to target
    #[default]
    Forward,
    /// Target to source
    Inverse,
}

impl Direction {
    /// The opposite direction
    pub const fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Inverse,
            Direction::Inverse => Direction::Forward,
        }
    }

    /// Compose with another direction
    pub const fn then(self, other: Direction) -> Self {
        match self {
            Direction::Forward => other,
            Direction::Inverse => other.reversed(),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => f.write_str("forward"),
            Direction::Inverse => f.write_str("inverse"),
        }
    }
}

/// One step of a path: a transformation name and a direction
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathStep {
    /// Transformation key name
    pub transformation: String,
    /// Direction the transformation is applied in
    #[cfg_attr(feature = "serde", serde(default))]
    pub direction: Direction,
}

impl PathStep {
    /// Create a step
    pub fn new(transformation: impl Into<String>, direction: Direction) -> Self {
        Self {
            transformation: transformation.into(),
            direction,
        }
    }
}

/// A named sequence of transformations between two datums
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeodeticPath {
    /// Key name
    pub name: String,
    /// Source datum key name
    pub source: String,
    /// Target datum key name
    pub target: String,
    /// Steps in source to target order
    pub steps: Vec<PathStep>,
    /// Whether the path may be walked backward
    #[cfg_attr(feature = "serde", serde(default))]
    pub reversible: bool,
    /// Free text description
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
}

impl GeodeticPath {
    /// Steps to apply when walking the path in `direction`
    pub fn oriented_steps(&self, direction: Direction) -> Vec<PathStep> {
        match direction {
            Direction::Forward => self.steps.clone(),
            Direction::Inverse => self
                .steps
                .iter()
                .rev()
                .map(|s| PathStep::new(s.transformation.clone(), s.direction.reversed()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_composition() {
        assert_eq!(Direction::Inverse.then(Direction::Inverse), Direction::Forward);
        assert_eq!(Direction::Forward.then(Direction::Inverse), Direction::Inverse);
        assert_eq!(Direction::Inverse.to_string(), "inverse");
    }

    #[test]
    fn test_inverse_steps_reverse_order_and_direction() {
        let path = GeodeticPath {
            name: "P".into(),
            source: "A".into(),
            target: "C".into(),
            steps: vec![
                PathStep::new("A_to_B", Direction::Forward),
                PathStep::new("C_to_B", Direction::Inverse),
            ],
            reversible: true,
            description: None,
        };
        let back = path.oriented_steps(Direction::Inverse);
        assert_eq!(back[0], PathStep::new("C_to_B", Direction::Forward));
        assert_eq!(back[1], PathStep::new("A_to_B", Direction::Inverse));
    }
}
