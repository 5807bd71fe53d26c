//! Engine configuration

use datumshift_core::{ErrorPolicy, GeodeticError, IterationParams, Result};

use crate::grid_file::GridFileOptions;
use crate::registry::{PivotDatums, DEFAULT_PIVOTS};

/// Settings shared by bridge construction and conversion
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Pivot datums in preference order
    pub pivots: Vec<String>,
    /// Soft error policy for new bridges
    pub policy: ErrorPolicy,
    /// Iteration controls for grid files opened directly
    pub iteration: IterationParams,
    /// Options for every grid file the engine opens
    pub grid: GridFileOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pivots: DEFAULT_PIVOTS.iter().map(|p| p.to_string()).collect(),
            policy: ErrorPolicy::default(),
            iteration: IterationParams::default(),
            grid: GridFileOptions::default(),
        }
    }
}

impl EngineConfig {
    /// Replace the pivot list
    pub fn with_pivots<I, S>(mut self, pivots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pivots = pivots.into_iter().map(Into::into).collect();
        self
    }

    /// Set the soft error policy
    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set iteration controls
    pub fn with_iteration(mut self, iteration: IterationParams) -> Self {
        self.iteration = iteration;
        self
    }

    /// Set grid file options
    pub fn with_grid_options(mut self, grid: GridFileOptions) -> Self {
        self.grid = grid;
        self
    }

    /// Pivot list for the bridge builder
    pub fn pivot_list(&self) -> PivotDatums {
        PivotDatums::new(self.pivots.iter().cloned())
    }

    /// Reject settings no conversion could run with
    pub fn validate(&self) -> Result<()> {
        let it = &self.iteration;
        if it.max_iterations == 0 {
            return Err(GeodeticError::Config("max_iterations must be positive".into()));
        }
        if !(it.convergence_tolerance > 0.0) || !(it.error_tolerance > 0.0) {
            return Err(GeodeticError::Config("iteration tolerances must be positive".into()));
        }
        if it.error_tolerance < it.convergence_tolerance {
            return Err(GeodeticError::Config(
                "error_tolerance must not be smaller than convergence_tolerance".into(),
            ));
        }
        if let Some(density) = self.grid.density_override {
            if !(density > 0.0) {
                return Err(GeodeticError::Config("density_override must be positive".into()));
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON document
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| GeodeticError::Config(format!("config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    #[cfg(feature = "serde")]
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }
}
