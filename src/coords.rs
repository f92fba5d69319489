//! WGS84 geodetic and ECEF coordinates
use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::{
    EARTH_ECCENTRICITY_SQUARED_WGS84 as E2, EARTH_FLATTENING_WGS84 as F,
    EARTH_SEMI_MAJOR_AXIS_WGS84 as A, GEODETIC_LATITUDE_TOLERANCE_RAD, GEODETIC_MAX_ITERATIONS,
};

/// Earth Centered Earth Fixed coordinates, in meters.
pub type EcefPoint = Vector3<f64>;

/// Geodetic coordinates on the WGS84 ellipsoid.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeoPoint {
    /// Latitude (ddeg)
    pub lat_deg: f64,
    /// Longitude (ddeg)
    pub long_deg: f64,
    /// Height above the ellipsoid (m)
    pub alt_m: f64,
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "lat={:.9}° long={:.9}° h={:.4}m",
            self.lat_deg, self.long_deg, self.alt_m
        )
    }
}

impl GeoPoint {
    /// Builds a new [GeoPoint] from latitude (ddeg), longitude (ddeg)
    /// and height above the ellipsoid (m).
    pub fn new(lat_deg: f64, long_deg: f64, alt_m: f64) -> Self {
        Self {
            lat_deg,
            long_deg,
            alt_m,
        }
    }

    /// Converts [GeoPoint] to [EcefPoint]. See [geodetic_to_ecef].
    pub fn to_ecef(&self) -> EcefPoint {
        geodetic_to_ecef(self)
    }

    /// Converts [EcefPoint] to [GeoPoint]. See [ecef_to_geodetic].
    pub fn from_ecef(ecef: &EcefPoint) -> Self {
        ecef_to_geodetic(ecef)
    }

    /// Returns (latitude, longitude, height) as a [Vector3],
    /// angles expressed in ddeg.
    pub(crate) fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.lat_deg, self.long_deg, self.alt_m)
    }
}

/// Radius of curvature in the prime vertical
fn prime_vertical_radius(sin_lat: f64) -> f64 {
    A / (1.0 - E2 * sin_lat * sin_lat).sqrt()
}

/// Closed form geodetic to ECEF conversion, angles in radians.
pub(crate) fn geodetic_rad_to_ecef(lat_rad: f64, long_rad: f64, alt_m: f64) -> EcefPoint {
    let (sin_lat, cos_lat) = lat_rad.sin_cos();
    let (sin_long, cos_long) = long_rad.sin_cos();
    let n = prime_vertical_radius(sin_lat);
    Vector3::new(
        (n + alt_m) * cos_lat * cos_long,
        (n + alt_m) * cos_lat * sin_long,
        (n * (1.0 - E2) + alt_m) * sin_lat,
    )
}

/// Converts [GeoPoint] to [EcefPoint]. This is a closed form and
/// is valid for any real input.
pub fn geodetic_to_ecef(geo: &GeoPoint) -> EcefPoint {
    geodetic_rad_to_ecef(geo.lat_deg.to_radians(), geo.long_deg.to_radians(), geo.alt_m)
}

/// Converts [EcefPoint] to [GeoPoint] by fixed point iteration on the latitude.
/// Longitude is exact. Height is sensitive near the poles (cos(lat) ~ 0):
/// we accept this limitation. Points exactly on the polar axis are solved
/// in closed form: latitude is ±90° and height is |Z| minus the polar radius.
pub fn ecef_to_geodetic(ecef: &EcefPoint) -> GeoPoint {
    let (x, y, z) = (ecef[0], ecef[1], ecef[2]);

    let long_rad = y.atan2(x);
    let p = (x * x + y * y).sqrt();

    if p == 0.0 {
        return GeoPoint {
            lat_deg: if z < 0.0 { -90.0 } else { 90.0 },
            long_deg: long_rad.to_degrees(),
            alt_m: z.abs() - A * (1.0 - F),
        };
    }

    let mut lat_rad = z.atan2(p * (1.0 - E2));

    for _ in 0..GEODETIC_MAX_ITERATIONS {
        let n = prime_vertical_radius(lat_rad.sin());
        let h = p / lat_rad.cos() - n;
        let lat = z.atan2(p * (1.0 - E2 * n / (n + h)));
        let delta = (lat - lat_rad).abs();
        lat_rad = lat;
        if delta < GEODETIC_LATITUDE_TOLERANCE_RAD {
            break;
        }
    }

    let alt_m = p / lat_rad.cos() - prime_vertical_radius(lat_rad.sin());

    GeoPoint {
        lat_deg: lat_rad.to_degrees(),
        long_deg: long_rad.to_degrees(),
        alt_m,
    }
}
