//! Range observations
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::coords::{EcefPoint, GeoPoint};

/// Uncertainty (1 sigma) of a [GeoPoint]
#[derive(Debug, Default, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeoSigma {
    /// Latitude sigma (ddeg)
    pub lat_deg: f64,
    /// Longitude sigma (ddeg)
    pub long_deg: f64,
    /// Height sigma (m)
    pub alt_m: f64,
}

impl GeoSigma {
    pub fn new(lat_deg: f64, long_deg: f64, alt_m: f64) -> Self {
        Self {
            lat_deg,
            long_deg,
            alt_m,
        }
    }
}

/// [Observation] is one measured range to a satellite whose
/// position is known with some uncertainty.
/// It is considered validated (positive range, non negative
/// sigmas, angles within their domain) and is not modified
/// during a resolution.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Observation {
    /// Measured range (m)
    pub range_m: f64,
    /// Range sigma (m)
    pub range_sigma_m: f64,
    /// Satellite position
    pub satellite: GeoPoint,
    /// Satellite position sigma
    pub satellite_sigma: GeoSigma,
}

impl Observation {
    /// Builds a new [Observation]
    pub fn new(
        range_m: f64,
        range_sigma_m: f64,
        satellite: GeoPoint,
        satellite_sigma: GeoSigma,
    ) -> Self {
        Self {
            range_m,
            range_sigma_m,
            satellite,
            satellite_sigma,
        }
    }

    /// Satellite position as [EcefPoint]
    pub fn satellite_ecef(&self) -> EcefPoint {
        self.satellite.to_ecef()
    }
}
