//! Position solutions
use log::{info, warn};

use crate::{
    cfg::Config,
    constants::MIN_OBSERVATIONS,
    coords::{ecef_to_geodetic, EcefPoint, GeoPoint},
    error::Error,
    observation::Observation,
    solver::{Convergence, Solver},
    uncertainty::{propagate, UncertaintyResult},
};

/// [PositionSolution] gathers the receiver position estimate and
/// all quality indicators, for one resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSolution {
    /// Receiver position
    pub position: GeoPoint,
    /// Receiver position, in ECEF
    pub ecef: EcefPoint,
    /// Number of solver iterations
    pub iterations: usize,
    /// Solver [Convergence] status
    pub convergence: Convergence,
    /// [UncertaintyResult], when the weighted normal matrix could be inverted
    pub uncertainty: Option<UncertaintyResult>,
    /// Conditioning threshold flagging poor geometry
    pub(crate) poor_geometry_threshold: f64,
}

impl PositionSolution {
    /// True when the solver met its tolerance
    pub fn converged(&self) -> bool {
        self.convergence == Convergence::Converged
    }

    /// Relative errors (%) on latitude, longitude and height
    pub fn relative_errors_pct(&self) -> Option<[f64; 3]> {
        self.uncertainty.as_ref().map(|u| u.relative_errors_pct)
    }

    /// Conditioning heuristic
    pub fn conditioning(&self) -> Option<f64> {
        self.uncertainty.as_ref().map(|u| u.conditioning)
    }

    /// True when the satellite geometry is poorly conditioned
    pub fn poor_geometry(&self) -> bool {
        self.uncertainty
            .as_ref()
            .map(|u| u.poor_geometry(self.poor_geometry_threshold))
            .unwrap_or(false)
    }
}

/// [Estimator] runs the complete process: coordinates conversion,
/// position solving and uncertainty propagation.
#[derive(Debug, Default, Clone)]
pub struct Estimator {
    cfg: Config,
    solver: Solver,
}

impl Estimator {
    /// Creates a new [Estimator]
    pub fn new(cfg: &Config) -> Self {
        Self {
            cfg: *cfg,
            solver: Solver::new(cfg),
        }
    }

    /// Estimates the receiver position from these [Observation]s.
    /// Numerical difficulties never cause an [Error]: they are described
    /// by the [PositionSolution] itself.
    pub fn estimate(&self, observations: &[Observation]) -> Result<PositionSolution, Error> {
        if observations.len() < MIN_OBSERVATIONS {
            return Err(Error::NotEnoughObservations(observations.len()));
        }

        let (satellites, ranges): (Vec<EcefPoint>, Vec<f64>) = observations
            .iter()
            .map(|obs| (obs.satellite_ecef(), obs.range_m))
            .unzip();

        let solved = self.solver.resolve(&satellites, &ranges)?;

        let uncertainty = match propagate(observations, &solved) {
            Ok(uncertainty) => Some(uncertainty),
            Err(e) => {
                warn!("covariance unavailable: {}", e);
                None
            },
        };

        let position = ecef_to_geodetic(&solved.position_ecef);

        let solution = PositionSolution {
            position,
            uncertainty,
            ecef: solved.position_ecef,
            iterations: solved.iterations,
            convergence: solved.convergence,
            poor_geometry_threshold: self.cfg.poor_geometry_threshold,
        };

        if solution.poor_geometry() {
            warn!(
                "poor geometry: conditioning={:.3E}",
                solution.conditioning().unwrap_or_default()
            );
        }

        info!("{} ({})", solution.position, solution.convergence);
        Ok(solution)
    }
}
