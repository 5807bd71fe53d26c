//! Error aggregation policy applied by a bridge

use core::fmt;
use core::str::FromStr;

use crate::GeodeticError;

/// How soft errors raised while converting are reported or escalated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ErrorPolicy {
    /// Soft errors are never reported
    Ignore,
    /// Every soft error is reported
    WarnAlways,
    /// Report the first soft error per one-degree block; silent once the
    /// block set is full
    #[default]
    WarnOncePerBlock,
    /// As `WarnOncePerBlock`, but a new block after the set is full is a
    /// hard failure
    WarnOncePerBlockThenFail,
    /// Any soft error is a hard failure
    FailFast,
}

impl ErrorPolicy {
    /// Every policy, in order of increasing strictness
    pub const ALL: [ErrorPolicy; 5] = [
        ErrorPolicy::Ignore,
        ErrorPolicy::WarnAlways,
        ErrorPolicy::WarnOncePerBlock,
        ErrorPolicy::WarnOncePerBlockThenFail,
        ErrorPolicy::FailFast,
    ];

    /// Stable text name
    pub const fn name(self) -> &'static str {
        match self {
            ErrorPolicy::Ignore => "ignore",
            ErrorPolicy::WarnAlways => "warn-always",
            ErrorPolicy::WarnOncePerBlock => "warn-once-per-block",
            ErrorPolicy::WarnOncePerBlockThenFail => "warn-once-per-block-then-fail",
            ErrorPolicy::FailFast => "fail-fast",
        }
    }

    /// True if this policy deduplicates by block
    pub const fn uses_blocks(self) -> bool {
        matches!(
            self,
            ErrorPolicy::WarnOncePerBlock | ErrorPolicy::WarnOncePerBlockThenFail
        )
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ErrorPolicy {
    type Err = GeodeticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('_', "-");
        ErrorPolicy::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| GeodeticError::Config(format!("unknown error policy '{s}'")))
    }
}
