//! Line oriented observation records.
//!
//! One observation per line, 8 numerical fields:
//! `r dr phi dphi lambda dlambda h dh`, separated by commas,
//! semicolons, tabs or spaces. Blank lines and lines starting
//! with `#` are ignored. The first content line may be a header
//! listing the field names.
use std::{fs::read_to_string, path::Path};

use log::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    coords::GeoPoint,
    observation::{GeoSigma, Observation},
};

/// Field names, in expected order
pub const FIELDS: [&str; 8] = ["r", "dr", "phi", "dphi", "lambda", "dlambda", "h", "dh"];

/// Why a line was rejected
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RejectionReason {
    /// Not exactly 8 fields
    FieldCount,
    /// Field is not a number
    NotANumber,
    /// Field is NaN or infinite
    NotFinite,
    /// Range must be strictly positive
    NonPositive,
    /// Sigmas must be positive or null
    Negative,
    /// Angle out of its domain
    OutOfRange,
}

impl RejectionReason {
    /// Short reason code
    pub fn code(&self) -> &'static str {
        match self {
            Self::FieldCount => "E01",
            Self::NotANumber => "E02",
            Self::NotFinite => "E03",
            Self::NonPositive => "E04",
            Self::Negative => "E05",
            Self::OutOfRange => "E06",
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FieldCount => write!(f, "field count"),
            Self::NotANumber => write!(f, "not a number"),
            Self::NotFinite => write!(f, "not finite"),
            Self::NonPositive => write!(f, "not strictly positive"),
            Self::Negative => write!(f, "negative"),
            Self::OutOfRange => write!(f, "out of range"),
        }
    }
}

/// [Rejection] describes one discarded line
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rejection {
    /// Line number (starting at 1)
    pub line: usize,
    /// [RejectionReason]
    pub reason: RejectionReason,
    /// Faulty field, if any
    pub field: Option<String>,
    /// Readable description
    pub message: String,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: [{}]", self.line, self.reason.code())?;
        if let Some(field) = &self.field {
            write!(f, " {}:", field)?;
        }
        write!(f, " {}", self.message)
    }
}

/// Accepted [Observation]s and [Rejection]s of one input
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Ingested {
    pub observations: Vec<Observation>,
    pub rejections: Vec<Rejection>,
}

impl Ingested {
    /// Number of accepted lines
    pub fn used(&self) -> usize {
        self.observations.len()
    }

    /// Number of discarded lines
    pub fn discarded(&self) -> usize {
        self.rejections.len()
    }
}

/// Domain check applied to one field
#[derive(Copy, Clone)]
enum Domain {
    StrictlyPositive,
    Positive,
    Range(f64, f64),
    Any,
}

const DOMAINS: [Domain; 8] = [
    Domain::StrictlyPositive,
    Domain::Positive,
    Domain::Range(-90.0, 90.0),
    Domain::Positive,
    Domain::Range(-180.0, 180.0),
    Domain::Positive,
    Domain::Any,
    Domain::Positive,
];

fn reject(line: usize, reason: RejectionReason, field: Option<&str>, message: String) -> Rejection {
    Rejection {
        line,
        reason,
        message,
        field: field.map(|f| f.to_string()),
    }
}

fn parse_field(line: usize, index: usize, token: &str) -> Result<f64, Rejection> {
    let name = FIELDS[index];

    let value = token.parse::<f64>().map_err(|_| {
        reject(
            line,
            RejectionReason::NotANumber,
            Some(name),
            format!("\"{}\" is not a number", token),
        )
    })?;

    if !value.is_finite() {
        return Err(reject(
            line,
            RejectionReason::NotFinite,
            Some(name),
            format!("{} is not finite", value),
        ));
    }

    match DOMAINS[index] {
        Domain::StrictlyPositive if value <= 0.0 => Err(reject(
            line,
            RejectionReason::NonPositive,
            Some(name),
            format!("{} must be > 0", value),
        )),
        Domain::Positive if value < 0.0 => Err(reject(
            line,
            RejectionReason::Negative,
            Some(name),
            format!("{} must be >= 0", value),
        )),
        Domain::Range(min, max) if value < min || value > max => Err(reject(
            line,
            RejectionReason::OutOfRange,
            Some(name),
            format!("{} not within [{}, {}]", value, min, max),
        )),
        _ => Ok(value),
    }
}

fn tokens(content: &str) -> Vec<&str> {
    content
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Header line: the field names, in order (case insensitive)
fn is_header(items: &[&str]) -> bool {
    items.len() == FIELDS.len()
        && items
            .iter()
            .zip(FIELDS.iter())
            .all(|(item, field)| item.eq_ignore_ascii_case(field))
}

/// Parses one content line into an [Observation]
fn parse_line(line: usize, items: &[&str]) -> Result<Observation, Rejection> {
    if items.len() != FIELDS.len() {
        return Err(reject(
            line,
            RejectionReason::FieldCount,
            None,
            format!("expecting {} fields, got {}", FIELDS.len(), items.len()),
        ));
    }

    let mut values = [0.0_f64; 8];
    for (index, (value, token)) in values.iter_mut().zip(items.iter()).enumerate() {
        *value = parse_field(line, index, token)?;
    }

    let [r, dr, phi, dphi, lambda, dlambda, h, dh] = values;

    Ok(Observation::new(
        r,
        dr,
        GeoPoint::new(phi, lambda, h),
        GeoSigma::new(dphi, dlambda, dh),
    ))
}

/// Parses observations from text content. Never fails:
/// faulty lines are described as [Rejection]s.
pub fn parse_str(content: &str) -> Ingested {
    let mut ingested = Ingested::default();
    let mut first_content = true;

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let items = tokens(trimmed);

        if first_content {
            first_content = false;
            if is_header(&items) {
                debug!("line {}: header \"{}\"", line_number, trimmed);
                continue;
            }
        }

        match parse_line(line_number, &items) {
            Ok(observation) => ingested.observations.push(observation),
            Err(rejection) => {
                warn!("rejected {}", rejection);
                ingested.rejections.push(rejection);
            },
        }
    }

    debug!(
        "{} observations accepted, {} rejected",
        ingested.used(),
        ingested.discarded()
    );

    ingested
}

/// Reads and parses an observation file. See [parse_str].
pub fn parse_file<P: AsRef<Path>>(path: P) -> std::io::Result<Ingested> {
    let content = read_to_string(path)?;
    Ok(parse_str(&content))
}
