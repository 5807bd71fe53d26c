//! Error types for datum shift operations
//!
//! Every failure is classified as soft (recoverable, a best-effort value is
//! still available) or hard (the operation produced nothing usable) at the
//! point where it originates. Soft results travel inside [`Outcome`], hard
//! ones as the `Err` side of [`Result`].

use thiserror::Error;

/// Errors that can occur while resolving or applying datum shifts
#[derive(Error, Debug)]
pub enum GeodeticError {
    /// Malformed or unsupported grid file layout
    #[error("format error: {0}")]
    Format(String),

    /// Underlying I/O failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An allocation request could not be satisfied
    #[error("memory error: {0}")]
    Memory(String),

    /// No chain of transformations connects the two datums
    #[error("no transformation path from {from} to {to}")]
    NoPathFound {
        /// Source datum key name
        from: String,
        /// Target datum key name
        to: String,
    },

    /// More than one candidate matched where exactly one was required
    #[error("ambiguous transformation from {from} to {to}")]
    AmbiguousTransformation {
        /// Source datum key name
        from: String,
        /// Target datum key name
        to: String,
    },

    /// Iteration exhausted before reaching the convergence tolerance
    #[error("no convergence after {iterations} iterations (residual {residual:e} deg)")]
    Convergence {
        /// Iterations performed
        iterations: u32,
        /// Largest per-axis residual at exhaustion, in degrees
        residual: f64,
    },

    /// Point lies outside the coverage of the data
    #[error("point ({lng}, {lat}) is outside coverage")]
    Coverage {
        /// Longitude, degrees east-positive
        lng: f64,
        /// Latitude, degrees
        lat: f64,
    },

    /// Point lies outside the coverage of the data; a fallback method was
    /// applied instead
    #[error("point ({lng}, {lat}) is outside coverage, fallback applied")]
    CoverageFallback {
        /// Longitude, degrees east-positive
        lng: f64,
        /// Latitude, degrees
        lat: f64,
    },

    /// Data corruption or a resolver invariant violation
    #[error("system error: {0}")]
    System(String),

    /// A datum name the dictionary does not know
    #[error("unknown datum: {0}")]
    UnknownDatum(String),

    /// Invalid engine configuration
    #[error("configuration error: {0}")]
    Config(String),
}

/// Severity of an error at its point of origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Recoverable; a best-effort value accompanies the error
    Soft,
    /// Fatal for the current operation
    Hard,
}

impl GeodeticError {
    /// Classify this error
    pub fn severity(&self) -> Severity {
        match self {
            GeodeticError::Coverage { .. }
            | GeodeticError::CoverageFallback { .. }
            | GeodeticError::Convergence { .. } => Severity::Soft,
            _ => Severity::Hard,
        }
    }

    /// True for recoverable errors
    pub fn is_soft(&self) -> bool {
        self.severity() == Severity::Soft
    }

    /// Shorthand for a format error
    pub fn format(msg: impl Into<String>) -> Self {
        GeodeticError::Format(msg.into())
    }

    /// A read past the end of the file
    pub fn unexpected_eof(msg: impl Into<String>) -> Self {
        GeodeticError::Io(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, msg.into()))
    }

    /// Shorthand for a system error
    pub fn system(msg: impl Into<String>) -> Self {
        GeodeticError::System(msg.into())
    }
}

/// Result type for datum shift operations
pub type Result<T> = core::result::Result<T, GeodeticError>;

/// A best-effort value, possibly accompanied by a soft error
#[derive(Debug)]
pub struct Outcome<T> {
    /// The value produced, valid even when `soft` is set
    pub value: T,
    /// Recoverable error raised while producing `value`
    pub soft: Option<GeodeticError>,
}

impl<T> Outcome<T> {
    /// A clean result
    pub fn ok(value: T) -> Self {
        Self { value, soft: None }
    }

    /// A result carrying a recoverable error
    pub fn soft(value: T, error: GeodeticError) -> Self {
        debug_assert!(error.is_soft());
        Self {
            value,
            soft: Some(error),
        }
    }

    /// True when no soft error was raised
    pub fn is_clean(&self) -> bool {
        self.soft.is_none()
    }

    /// Transform the value, keeping the soft error
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            soft: self.soft,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_classification() {
        assert!(GeodeticError::Coverage { lng: 0.0, lat: 0.0 }.is_soft());
        assert!(GeodeticError::CoverageFallback { lng: 0.0, lat: 0.0 }.is_soft());
        assert!(GeodeticError::Convergence {
            iterations: 10,
            residual: 1e-6
        }
        .is_soft());
        assert_eq!(GeodeticError::format("x").severity(), Severity::Hard);
        assert_eq!(GeodeticError::system("x").severity(), Severity::Hard);
        assert!(Severity::Hard > Severity::Soft);
    }

    #[test]
    fn test_outcome_map_keeps_soft() {
        let o = Outcome::soft(2, GeodeticError::Coverage { lng: 1.0, lat: 2.0 });
        let mapped = o.map(|v| v * 10);
        assert_eq!(mapped.value, 20);
        assert!(!mapped.is_clean());
    }

    #[test]
    fn test_display_messages() {
        let err = GeodeticError::NoPathFound {
            from: "NAD27".into(),
            to: "ED50".into(),
        };
        assert_eq!(
            err.to_string(),
            "no transformation path from NAD27 to ED50"
        );
    }
}
