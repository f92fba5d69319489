//! Uncertainty propagation, from observation sigmas to
//! relative errors on the geodetic solution.
use log::debug;
use nalgebra::{Matrix3, Vector3};

use crate::{
    constants::{
        FRAME_JACOBIAN_STEP_M, MIN_DETERMINANT, MIN_EFFECTIVE_SIGMA_M, MIN_RELATIVE_DENOMINATOR,
        SIGMA_ANGLE_STEP_RAD, SIGMA_HEIGHT_STEP_M, WEIGHTED_MATRIX_REGULARIZER,
    },
    coords::{ecef_to_geodetic, geodetic_rad_to_ecef, EcefPoint},
    error::Error,
    linalg::{add_outer, invert3x3, project3x3},
    observation::{GeoSigma, Observation},
    solver::{LinearizationRow, SolveResult},
};

/// [UncertaintyResult] describes the quality of a position estimate
#[derive(Debug, Clone, PartialEq)]
pub struct UncertaintyResult {
    /// Effective range sigma of each observation (m)
    pub sigmas_m: Vec<f64>,
    /// Position covariance in ECEF frame (m²)
    pub covariance_ecef: Matrix3<f64>,
    /// Position covariance in geodetic frame (ddeg², ddeg², m²)
    pub covariance_geo: Matrix3<f64>,
    /// trace³/det of the weighted normal matrix. Larger is worse.
    pub conditioning: f64,
    /// Relative errors (%) on latitude, longitude and height,
    /// rounded to 2 decimals.
    pub relative_errors_pct: [f64; 3],
}

impl UncertaintyResult {
    /// Returns true if conditioning reaches `threshold`
    pub fn poor_geometry(&self, threshold: f64) -> bool {
        self.conditioning >= threshold
    }

    /// Standard deviations of the geodetic solution
    pub fn geo_sigma(&self) -> GeoSigma {
        GeoSigma::new(
            self.covariance_geo[(0, 0)].max(0.0).sqrt(),
            self.covariance_geo[(1, 1)].max(0.0).sqrt(),
            self.covariance_geo[(2, 2)].max(0.0).sqrt(),
        )
    }
}

/// Range from `receiver` to the satellite at (lat, long, alt), angles in radians
fn range_to(receiver: &EcefPoint, lat_rad: f64, long_rad: f64, alt_m: f64) -> f64 {
    (geodetic_rad_to_ecef(lat_rad, long_rad, alt_m) - receiver).norm()
}

/// Effective range sigma of this [Observation], seen from `receiver`.
/// The satellite position uncertainty is projected on the range
/// by central finite differences (1E-6 rad on angles, 1 mm on height),
/// then combined with the range sigma.
pub fn effective_sigma(observation: &Observation, receiver: &EcefPoint) -> f64 {
    let sat = &observation.satellite;
    let sigma = &observation.satellite_sigma;

    let (lat, long, alt) = (sat.lat_deg.to_radians(), sat.long_deg.to_radians(), sat.alt_m);

    let d_lat = (range_to(receiver, lat + SIGMA_ANGLE_STEP_RAD, long, alt)
        - range_to(receiver, lat - SIGMA_ANGLE_STEP_RAD, long, alt))
        / (2.0 * SIGMA_ANGLE_STEP_RAD);

    let d_long = (range_to(receiver, lat, long + SIGMA_ANGLE_STEP_RAD, alt)
        - range_to(receiver, lat, long - SIGMA_ANGLE_STEP_RAD, alt))
        / (2.0 * SIGMA_ANGLE_STEP_RAD);

    let d_alt = (range_to(receiver, lat, long, alt + SIGMA_HEIGHT_STEP_M)
        - range_to(receiver, lat, long, alt - SIGMA_HEIGHT_STEP_M))
        / (2.0 * SIGMA_HEIGHT_STEP_M);

    let mut variance = observation.range_sigma_m.powi(2);
    variance += (d_lat * sigma.lat_deg.to_radians()).powi(2);
    variance += (d_long * sigma.long_deg.to_radians()).powi(2);
    variance += (d_alt * sigma.alt_m).powi(2);

    variance.sqrt().max(MIN_EFFECTIVE_SIGMA_M)
}

/// Forms Σ (1/σᵢ²) jᵢ.jᵢᵗ
pub fn weighted_normal_matrix(rows: &[LinearizationRow], sigmas_m: &[f64]) -> Matrix3<f64> {
    let mut w = Matrix3::<f64>::zeros();
    for (row, sigma) in rows.iter().zip(sigmas_m.iter()) {
        add_outer(&mut w, &row.los, 1.0 / (sigma * sigma));
    }
    w
}

/// Conditioning heuristic: trace³/det
pub fn conditioning(w: &Matrix3<f64>) -> f64 {
    w.trace().powi(3) / w.determinant().max(MIN_DETERMINANT)
}

/// Jacobian of the ECEF to geodetic transform at `ecef`, by central
/// differences (1 mm along each axis). Rows are (lat ddeg, long ddeg, h m).
pub fn frame_jacobian(ecef: &EcefPoint) -> Matrix3<f64> {
    let mut j = Matrix3::<f64>::zeros();

    for axis in 0..3 {
        let mut step = Vector3::<f64>::zeros();
        step[axis] = FRAME_JACOBIAN_STEP_M;

        let plus = ecef_to_geodetic(&(ecef + step));
        let minus = ecef_to_geodetic(&(ecef - step));

        let mut d_long = plus.long_deg - minus.long_deg;
        // antimeridian
        if d_long > 180.0 {
            d_long -= 360.0;
        } else if d_long < -180.0 {
            d_long += 360.0;
        }

        let denom = 2.0 * FRAME_JACOBIAN_STEP_M;
        j[(0, axis)] = (plus.lat_deg - minus.lat_deg) / denom;
        j[(1, axis)] = d_long / denom;
        j[(2, axis)] = (plus.alt_m - minus.alt_m) / denom;
    }

    j
}

/// Relative error (%) of `value` given its `variance`, rounded
/// to 2 decimals (half away from zero).
pub fn relative_error_pct(variance: f64, value: f64) -> f64 {
    let pct = 100.0 * variance.max(0.0).sqrt() / value.abs().max(MIN_RELATIVE_DENOMINATOR);
    (pct * 100.0).round() / 100.0
}

/// Propagates the observations uncertainty through the final linearization
/// of `solution`.
/// ## Returns
/// - [UncertaintyResult]
/// - [Error::SingularMatrix] if the weighted normal matrix cannot be inverted
pub fn propagate(
    observations: &[Observation],
    solution: &SolveResult,
) -> Result<UncertaintyResult, Error> {
    let rows = solution.rows();
    if rows.len() != observations.len() {
        return Err(Error::SizeMismatch(observations.len(), rows.len()));
    }

    let receiver = solution.position_ecef;

    let sigmas_m = observations
        .iter()
        .map(|obs| effective_sigma(obs, &receiver))
        .collect::<Vec<_>>();

    let mut w = weighted_normal_matrix(rows, &sigmas_m);
    let conditioning = conditioning(&w);

    for i in 0..3 {
        w[(i, i)] += WEIGHTED_MATRIX_REGULARIZER;
    }

    let covariance_ecef = invert3x3(&w)?;

    let jacobian = frame_jacobian(&receiver);
    let covariance_geo = project3x3(&jacobian, &covariance_ecef);

    let geo = ecef_to_geodetic(&receiver).to_vector();

    let mut relative_errors_pct = [0.0_f64; 3];
    for (i, pct) in relative_errors_pct.iter_mut().enumerate() {
        *pct = relative_error_pct(covariance_geo[(i, i)], geo[i]);
    }

    debug!(
        "conditioning={:.3E} relative errors: {:?}%",
        conditioning, relative_errors_pct
    );

    Ok(UncertaintyResult {
        sigmas_m,
        covariance_ecef,
        covariance_geo,
        conditioning,
        relative_errors_pct,
    })
}
