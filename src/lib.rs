#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

// private modules
mod cfg;
mod constants;
mod coords;
mod error;
mod observation;
mod solution;
mod solver;

// public modules
pub mod ingest;
pub mod linalg;
pub mod report;
pub mod uncertainty;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::cfg::Config;
    pub use crate::constants::{
        EARTH_ECCENTRICITY_SQUARED_WGS84, EARTH_FLATTENING_WGS84, EARTH_SEMI_MAJOR_AXIS_WGS84,
        MIN_OBSERVATIONS,
    };
    pub use crate::coords::{ecef_to_geodetic, geodetic_to_ecef, EcefPoint, GeoPoint};
    pub use crate::error::Error;
    pub use crate::ingest::{Ingested, Rejection, RejectionReason};
    pub use crate::observation::{GeoSigma, Observation};
    pub use crate::report::{Protocol, Report};
    pub use crate::solution::{Estimator, PositionSolution};
    pub use crate::solver::{Convergence, LinearizationRow, SolveResult, Solver};
    pub use crate::uncertainty::UncertaintyResult;
    // re-export
    pub use hifitime::{Duration, Epoch};
    pub use nalgebra::{Matrix3, Vector3};
}

// pub export
pub use error::Error;
