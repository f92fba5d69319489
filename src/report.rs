//! Solution export and protocol
use hifitime::{Duration, Epoch, TimeScale, Unit};
use itertools::Itertools;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{ingest::Ingested, solution::PositionSolution};

/// Export fields, in order
pub const REPORT_FIELDS: [&str; 10] = [
    "phi_deg",
    "lambda_deg",
    "h_m",
    "eps_phi_pct",
    "eps_lambda_pct",
    "eps_h_pct",
    "used",
    "discarded",
    "calc_time_ms",
    "timestamp",
];

/// [Report] is the flat export record of one resolution
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Report {
    /// Latitude (ddeg)
    pub phi_deg: f64,
    /// Longitude (ddeg)
    pub lambda_deg: f64,
    /// Height above ellipsoid (m)
    pub h_m: f64,
    /// Latitude relative error (%), None when covariance is unavailable
    pub eps_phi_pct: Option<f64>,
    /// Longitude relative error (%)
    pub eps_lambda_pct: Option<f64>,
    /// Height relative error (%)
    pub eps_h_pct: Option<f64>,
    /// Accepted observations
    pub used: usize,
    /// Rejected lines
    pub discarded: usize,
    /// Processing time (ms)
    pub calc_time_ms: f64,
    /// UTC processing date
    pub timestamp: String,
}

impl Report {
    /// Builds a new [Report]
    /// ## Inputs
    /// - solution: [PositionSolution]
    /// - used: number of accepted observations
    /// - discarded: number of rejected lines
    /// - calc_time: processing [Duration]
    /// - t: processing [Epoch]
    pub fn new(
        solution: &PositionSolution,
        used: usize,
        discarded: usize,
        calc_time: Duration,
        t: Epoch,
    ) -> Self {
        let eps = solution.relative_errors_pct();
        Self {
            used,
            discarded,
            phi_deg: solution.position.lat_deg,
            lambda_deg: solution.position.long_deg,
            h_m: solution.position.alt_m,
            eps_phi_pct: eps.map(|eps| eps[0]),
            eps_lambda_pct: eps.map(|eps| eps[1]),
            eps_h_pct: eps.map(|eps| eps[2]),
            calc_time_ms: calc_time.to_unit(Unit::Millisecond),
            timestamp: t.to_time_scale(TimeScale::UTC).to_string(),
        }
    }

    /// CSV header line
    pub fn csv_header() -> String {
        REPORT_FIELDS.iter().join(",")
    }

    /// CSV record (no line termination).
    /// Unavailable error percentages are left empty.
    pub fn to_csv_row(&self) -> String {
        let pct = |value: Option<f64>| value.map(|v| format!("{:.4}", v)).unwrap_or_default();
        [
            format!("{:.9}", self.phi_deg),
            format!("{:.9}", self.lambda_deg),
            format!("{:.4}", self.h_m),
            pct(self.eps_phi_pct),
            pct(self.eps_lambda_pct),
            pct(self.eps_h_pct),
            self.used.to_string(),
            self.discarded.to_string(),
            format!("{:.3}", self.calc_time_ms),
            self.timestamp.clone(),
        ]
        .iter()
        .join(",")
    }

    /// CSV content: header and record
    pub fn to_csv(&self) -> String {
        format!("{}\n{}\n", Self::csv_header(), self.to_csv_row())
    }
}

/// Human readable [Protocol] of one resolution
pub struct Protocol<'a> {
    ingested: &'a Ingested,
    solution: &'a PositionSolution,
    report: &'a Report,
}

impl<'a> Protocol<'a> {
    pub fn new(ingested: &'a Ingested, solution: &'a PositionSolution, report: &'a Report) -> Self {
        Self {
            ingested,
            solution,
            report,
        }
    }
}

impl std::fmt::Display for Protocol<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "POSITION ESTIMATION PROTOCOL")?;
        writeln!(f, "date: {}", self.report.timestamp)?;
        writeln!(f)?;

        writeln!(f, "INPUT")?;
        writeln!(f, "  used observations    : {}", self.report.used)?;
        writeln!(f, "  discarded lines      : {}", self.report.discarded)?;
        for rejection in self.ingested.rejections.iter() {
            writeln!(f, "    {}", rejection)?;
        }
        writeln!(f)?;

        writeln!(f, "SOLVER")?;
        writeln!(f, "  iterations           : {}", self.solution.iterations)?;
        writeln!(f, "  status               : {}", self.solution.convergence)?;
        writeln!(f, "  calculation time     : {:.3} ms", self.report.calc_time_ms)?;
        writeln!(f)?;

        writeln!(f, "POSITION (WGS84)")?;
        writeln!(f, "  latitude             : {:.9}°", self.report.phi_deg)?;
        writeln!(f, "  longitude            : {:.9}°", self.report.lambda_deg)?;
        writeln!(f, "  height               : {:.4} m", self.report.h_m)?;
        writeln!(f)?;

        writeln!(f, "UNCERTAINTY")?;
        match &self.solution.uncertainty {
            Some(uncertainty) => {
                let sigma = uncertainty.geo_sigma();
                let eps = uncertainty.relative_errors_pct;
                writeln!(
                    f,
                    "  latitude             : {:.2} % (sigma {:.3E}°)",
                    eps[0], sigma.lat_deg
                )?;
                writeln!(
                    f,
                    "  longitude            : {:.2} % (sigma {:.3E}°)",
                    eps[1], sigma.long_deg
                )?;
                writeln!(
                    f,
                    "  height               : {:.2} % (sigma {:.3} m)",
                    eps[2], sigma.alt_m
                )?;
                writeln!(
                    f,
                    "  conditioning         : {:.3E}",
                    uncertainty.conditioning
                )?;
                if self.solution.poor_geometry() {
                    writeln!(f, "  WARNING: poor satellite geometry")?;
                }
            },
            None => {
                writeln!(f, "  covariance unavailable (singular geometry)")?;
            },
        }
        Ok(())
    }
}
