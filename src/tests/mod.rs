mod ingest;
mod solver;

use log::LevelFilter;
use std::sync::Once;

use crate::prelude::{EcefPoint, GeoPoint, GeoSigma, Observation};

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::builder()
            .is_test(true)
            .filter_level(LevelFilter::Debug)
            .init();
    });
}

/// Reference receiver (ddeg, ddeg, m)
pub const REFERENCE_RECEIVER: (f64, f64, f64) = (50.0, 30.0, 250.0);

/// Satellites altitude (m)
pub const SATELLITE_ALTITUDE_M: f64 = 20_200_000.0;

/// Satellites (lat, long) offsets to the receiver (ddeg)
pub const REFERENCE_OFFSETS_DEG: [(f64, f64); 7] = [
    (20.0, 0.0),
    (-15.0, 40.0),
    (5.0, -60.0),
    (-25.0, -20.0),
    (10.0, 100.0),
    (-35.0, -120.0),
    (30.0, 160.0),
];

/// Wraps a longitude into [-180, 180]
pub fn wrap_longitude(long_deg: f64) -> f64 {
    let mut long_deg = long_deg;
    while long_deg > 180.0 {
        long_deg -= 360.0;
    }
    while long_deg < -180.0 {
        long_deg += 360.0;
    }
    long_deg
}

/// Builds error free [Observation]s from `receiver` to satellites
/// located at these (lat, long) offsets.
pub fn observations_around(
    receiver: &GeoPoint,
    offsets_deg: &[(f64, f64)],
    range_sigma_m: f64,
    sigma: GeoSigma,
) -> Vec<Observation> {
    let receiver_ecef: EcefPoint = receiver.to_ecef();
    offsets_deg
        .iter()
        .map(|(d_lat, d_long)| {
            let satellite = GeoPoint::new(
                (receiver.lat_deg + d_lat).clamp(-90.0, 90.0),
                wrap_longitude(receiver.long_deg + d_long),
                SATELLITE_ALTITUDE_M,
            );
            let range_m = (satellite.to_ecef() - receiver_ecef).norm();
            Observation::new(range_m, range_sigma_m, satellite, sigma)
        })
        .collect()
}

/// Reference scenario: 7 satellites, exact ranges,
/// dr=5m, dphi=dlambda=0.001°, dh=5m.
pub fn reference_observations() -> Vec<Observation> {
    let (lat, long, alt) = REFERENCE_RECEIVER;
    observations_around(
        &GeoPoint::new(lat, long, alt),
        &REFERENCE_OFFSETS_DEG,
        5.0,
        GeoSigma::new(0.001, 0.001, 5.0),
    )
}
