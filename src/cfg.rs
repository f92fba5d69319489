//! Solver configuration preset

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const fn default_max_iterations() -> usize {
    1000
}

const fn default_tolerance_m() -> f64 {
    1.0E-6
}

const fn default_poor_geometry_threshold() -> f64 {
    1.0E12
}

/// [Config] drives the [crate::prelude::Estimator].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Maximal number of Gauss-Newton iterations. Exhausting this
    /// budget is reported as non convergence, along the last estimate.
    #[cfg_attr(feature = "serde", serde(default = "default_max_iterations"))]
    pub max_iterations: usize,
    /// Convergence is declared once the position update magnitude
    /// drops below this value (in [m]).
    #[cfg_attr(feature = "serde", serde(default = "default_tolerance_m"))]
    pub tolerance_m: f64,
    /// Conditioning heuristic (trace³/det of the weighted normal matrix)
    /// above which the satellite geometry is flagged as poor.
    #[cfg_attr(feature = "serde", serde(default = "default_poor_geometry_threshold"))]
    pub poor_geometry_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tolerance_m: default_tolerance_m(),
            poor_geometry_threshold: default_poor_geometry_threshold(),
        }
    }
}

impl Config {
    /// Copies and returns [Config] with updated iteration budget.
    pub fn with_max_iterations(&self, max_iterations: usize) -> Self {
        let mut s = *self;
        s.max_iterations = max_iterations;
        s
    }

    /// Copies and returns [Config] with updated convergence tolerance (in [m]).
    pub fn with_tolerance_m(&self, tolerance_m: f64) -> Self {
        let mut s = *self;
        s.tolerance_m = tolerance_m;
        s
    }

    /// Copies and returns [Config] with updated poor geometry threshold.
    pub fn with_poor_geometry_threshold(&self, threshold: f64) -> Self {
        let mut s = *self;
        s.poor_geometry_threshold = threshold;
        s
    }
}
