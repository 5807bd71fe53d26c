//! Fixed-point inversion of horizontal shift functions
//!
//! Used wherever only the forward direction of a shift is known: grid files
//! that store one direction, and the 2D form of the geocentric methods.

use crate::{GeodeticError, Outcome, Result};

/// Iteration controls for inverse calculations, tolerances in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IterationParams {
    /// Maximum number of forward evaluations
    pub max_iterations: u32,
    /// Per-axis residual at which an axis is considered converged
    pub convergence_tolerance: f64,
    /// Residual above which non-convergence becomes a hard failure
    pub error_tolerance: f64,
}

impl IterationParams {
    /// Create iteration parameters
    pub const fn new(max_iterations: u32, convergence_tolerance: f64, error_tolerance: f64) -> Self {
        Self {
            max_iterations,
            convergence_tolerance,
            error_tolerance,
        }
    }
}

impl Default for IterationParams {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            convergence_tolerance: 1.0e-9,
            error_tolerance: 5.0e-8,
        }
    }
}

/// Solve `forward(x) = target` for `x` by fixed-point iteration
///
/// The guess starts at `target`. Each round measures the residual
/// `forward(guess) - target` and subtracts it from the guess, axis by axis;
/// an axis already within the convergence tolerance is held fixed. A forward
/// step that raises a soft error (lost coverage) ends the search and returns
/// `target` unchanged with that error. On exhaustion the last guess that was
/// measured is returned, so the reported residual belongs to it.
pub fn invert_fixed_point<F>(
    target: [f64; 2],
    params: &IterationParams,
    mut forward: F,
) -> Result<Outcome<[f64; 2]>>
where
    F: FnMut([f64; 2]) -> Result<Outcome<[f64; 2]>>,
{
    let mut guess = target;
    let mut measured = target;
    let mut worst = f64::INFINITY;
    let iterations = params.max_iterations.max(1);

    for _ in 0..iterations {
        let step = forward(guess)?;
        if let Some(err) = step.soft {
            return Ok(Outcome::soft(target, err));
        }

        let residual = [step.value[0] - target[0], step.value[1] - target[1]];
        let converged = residual.map(|r| r.abs() <= params.convergence_tolerance);
        measured = guess;
        worst = residual[0].abs().max(residual[1].abs());

        if converged[0] && converged[1] {
            return Ok(Outcome::ok(guess));
        }
        for k in 0..2 {
            if !converged[k] {
                guess[k] -= residual[k];
            }
        }
    }

    if !(worst <= params.error_tolerance) {
        return Err(GeodeticError::system(format!(
            "inverse diverged: residual {worst:e} deg exceeds error tolerance {:e} after {iterations} iterations",
            params.error_tolerance
        )));
    }
    Ok(Outcome::soft(
        measured,
        GeodeticError::Convergence {
            iterations,
            residual: worst,
        },
    ))
}
