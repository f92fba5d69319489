//! Damped Gauss-Newton position solver
use log::{debug, info, warn};
use nalgebra::{Matrix3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    cfg::Config,
    constants::{
        EARTH_SEMI_MAJOR_AXIS_WGS84, INITIAL_GUESS_RADIUS_M, MIN_CENTROID_NORM_M,
        MIN_MODELED_RANGE_M, MIN_OBSERVATIONS, NORMAL_MATRIX_DAMPING,
    },
    coords::EcefPoint,
    error::Error,
    linalg::{add_outer, solve3x3},
};

/// [Convergence] status of a resolution attempt. Only
/// [Convergence::Converged] means the tolerance was met, the other
/// status still come with the best available estimate.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Convergence {
    /// Last update magnitude dropped below the tolerance
    #[default]
    Converged,
    /// Iteration budget exhausted without meeting the tolerance
    MaxIterations,
    /// Normal equations could not be solved (degenerate geometry)
    SingularGeometry,
}

impl std::fmt::Display for Convergence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Converged => write!(f, "converged"),
            Self::MaxIterations => write!(f, "not converged (iteration budget exhausted)"),
            Self::SingularGeometry => write!(f, "not converged (singular geometry)"),
        }
    }
}

/// Contribution of one observation to the linearized problem,
/// at a given position estimate.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct LinearizationRow {
    /// Unit vector from the satellite to the estimate: partial
    /// derivatives of the modeled range with respect to X, Y and Z.
    pub los: Vector3<f64>,
    /// Modeled range at the estimate (m)
    pub modeled_range_m: f64,
}

/// [SolveResult] is the outcome of [Solver::resolve].
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    /// Receiver position estimate
    pub position_ecef: EcefPoint,
    /// Number of position updates that were applied
    pub iterations: usize,
    /// [Convergence] status
    pub convergence: Convergence,
    /// Damped normal matrix of the final iteration
    normal_matrix: Matrix3<f64>,
    /// [LinearizationRow]s of the final iteration, one per observation
    rows: Vec<LinearizationRow>,
}

impl SolveResult {
    /// True when the tolerance was met.
    pub fn converged(&self) -> bool {
        self.convergence == Convergence::Converged
    }

    /// Damped normal matrix (JᵗJ + damping) of the final iteration.
    pub fn normal_matrix(&self) -> &Matrix3<f64> {
        &self.normal_matrix
    }

    /// Final [LinearizationRow]s, in the order of the observations.
    pub fn rows(&self) -> &[LinearizationRow] {
        &self.rows
    }
}

/// Normal equations formed at one estimate
struct NormalEquations {
    jtj: Matrix3<f64>,
    jtv: Vector3<f64>,
    rows: Vec<LinearizationRow>,
}

impl NormalEquations {
    fn new(estimate: &EcefPoint, satellites: &[EcefPoint], ranges: &[f64]) -> Self {
        let mut jtj = Matrix3::<f64>::zeros();
        let mut jtv = Vector3::<f64>::zeros();
        let mut rows = Vec::with_capacity(satellites.len());

        for (sat, range_m) in satellites.iter().zip(ranges.iter()) {
            let delta = estimate - sat;
            let modeled_range_m = delta.norm().max(MIN_MODELED_RANGE_M);
            let los = delta / modeled_range_m;
            let residual = range_m - modeled_range_m;

            add_outer(&mut jtj, &los, 1.0);
            jtv += los * residual;

            rows.push(LinearizationRow {
                los,
                modeled_range_m,
            });
        }

        for i in 0..3 {
            jtj[(i, i)] += NORMAL_MATRIX_DAMPING;
        }

        Self { jtj, jtv, rows }
    }
}

/// Rejects updates that would turn the estimate non finite
/// (non finite or overflowing inputs), so the last estimate is kept.
fn finite_update(estimate: &EcefPoint, dx: Vector3<f64>) -> Result<Vector3<f64>, Error> {
    if (estimate + dx).iter().all(|v| v.is_finite()) {
        Ok(dx)
    } else {
        Err(Error::SingularMatrix)
    }
}

/// [Solver] estimates the receiver position that minimizes
/// the squared range residuals.
#[derive(Debug, Default, Clone)]
pub struct Solver {
    /// Solver parametrization
    pub cfg: Config,
}

impl Solver {
    /// Creates a new [Solver]
    pub fn new(cfg: &Config) -> Self {
        Self { cfg: *cfg }
    }

    /// Initial guess: satellites centroid, rescaled close to the
    /// Earth surface. Centroids too close to Earth center are
    /// only scaled by the working radius ratio.
    pub fn initial_guess(satellites: &[EcefPoint]) -> EcefPoint {
        if satellites.is_empty() {
            return EcefPoint::zeros();
        }

        let centroid = satellites
            .iter()
            .fold(EcefPoint::zeros(), |acc, sat| acc + sat)
            / satellites.len() as f64;

        let mut norm = centroid.norm();
        if norm < MIN_CENTROID_NORM_M {
            norm = EARTH_SEMI_MAJOR_AXIS_WGS84;
        }

        centroid * (INITIAL_GUESS_RADIUS_M / norm)
    }

    /// Resolves the receiver position.
    /// ## Inputs
    /// - satellites: satellite positions as [EcefPoint]s
    /// - ranges: measured ranges (m), paired with the satellites
    /// ## Returns
    /// - [SolveResult] whatever the convergence status
    /// - [Error] on invalid input only
    pub fn resolve(
        &self,
        satellites: &[EcefPoint],
        ranges: &[f64],
    ) -> Result<SolveResult, Error> {
        if satellites.len() != ranges.len() {
            return Err(Error::SizeMismatch(satellites.len(), ranges.len()));
        }
        if satellites.len() < MIN_OBSERVATIONS {
            return Err(Error::NotEnoughObservations(satellites.len()));
        }

        let mut estimate = Self::initial_guess(satellites);
        debug!("initial guess: {}", estimate.transpose());

        let mut iterations = 0;
        let mut normal = NormalEquations::new(&estimate, satellites, ranges);

        for iter in 1..=self.cfg.max_iterations {
            if iter > 1 {
                normal = NormalEquations::new(&estimate, satellites, ranges);
            }

            let dx = match solve3x3(&normal.jtj, &normal.jtv)
                .and_then(|dx| finite_update(&estimate, dx))
            {
                Ok(dx) => dx,
                Err(e) => {
                    warn!("iteration #{}: {}", iter, e);
                    return Ok(SolveResult {
                        position_ecef: estimate,
                        iterations,
                        convergence: Convergence::SingularGeometry,
                        normal_matrix: normal.jtj,
                        rows: normal.rows,
                    });
                },
            };

            estimate += dx;
            iterations = iter;

            let dx_norm = dx.norm();
            debug!("iteration #{}: |dx|={:.6E}m", iter, dx_norm);

            if dx_norm <= self.cfg.tolerance_m {
                info!("converged in {} iterations", iterations);
                return Ok(SolveResult {
                    position_ecef: estimate,
                    iterations,
                    convergence: Convergence::Converged,
                    normal_matrix: normal.jtj,
                    rows: normal.rows,
                });
            }
        }

        warn!(
            "not converged after {} iterations (tolerance={:.3E}m)",
            iterations, self.cfg.tolerance_m
        );

        Ok(SolveResult {
            position_ecef: estimate,
            iterations,
            convergence: Convergence::MaxIterations,
            normal_matrix: normal.jtj,
            rows: normal.rows,
        })
    }
}
