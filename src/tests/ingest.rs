use rstest::*;

use crate::{
    ingest::{parse_file, parse_str},
    prelude::RejectionReason,
};

const VALID: &str = "22000000.0, 5.0, 70.0, 0.001, 30.0, 0.001, 20200000.0, 5.0";

#[test]
fn valid_content() {
    let content = format!(
        "# r dr phi dphi lambda dlambda h dh\n\n{}\n{}\n",
        VALID,
        "21000000;4.5;-10;0.002;-170.5;0.002;20200000;3"
    );

    let ingested = parse_str(&content);

    assert_eq!(ingested.used(), 2);
    assert_eq!(ingested.discarded(), 0);

    let obs = &ingested.observations[0];
    assert_eq!(obs.range_m, 22000000.0);
    assert_eq!(obs.range_sigma_m, 5.0);
    assert_eq!(obs.satellite.lat_deg, 70.0);
    assert_eq!(obs.satellite_sigma.lat_deg, 0.001);
    assert_eq!(obs.satellite.long_deg, 30.0);
    assert_eq!(obs.satellite_sigma.long_deg, 0.001);
    assert_eq!(obs.satellite.alt_m, 20200000.0);
    assert_eq!(obs.satellite_sigma.alt_m, 5.0);

    let obs = &ingested.observations[1];
    assert_eq!(obs.satellite.long_deg, -170.5);
    assert_eq!(obs.satellite_sigma.alt_m, 3.0);
}

#[test]
fn separators() {
    let content = "1e7\t1  45 , 0.1;10 0.1 ,, 100 1\n";
    let ingested = parse_str(content);
    assert_eq!(ingested.used(), 1);
    assert_eq!(ingested.observations[0].range_m, 1.0E7);
    assert_eq!(ingested.observations[0].satellite.alt_m, 100.0);
}

#[test]
fn header_line() {
    let content = format!("r,dr,phi,dphi,lambda,dlambda,h,dh\n{}\n", VALID);
    let ingested = parse_str(&content);
    assert_eq!(ingested.used(), 1);
    assert_eq!(ingested.discarded(), 0);

    // only the first content line may be a header
    let content = format!("{}\nr,dr,phi,dphi,lambda,dlambda,h,dh\n", VALID);
    let ingested = parse_str(&content);
    assert_eq!(ingested.used(), 1);
    assert_eq!(ingested.discarded(), 1);
    assert_eq!(ingested.rejections[0].line, 2);
    assert_eq!(ingested.rejections[0].reason, RejectionReason::NotANumber);
    assert_eq!(ingested.rejections[0].field.as_deref(), Some("r"));
}

#[rstest]
#[case("R DR PHI DPHI LAMBDA DLAMBDA H DH", 0)]
#[case("r;dr;phi;dphi;lambda;dlambda;h;dh", 0)]
#[case("abc,5,50,0.001,30,0.001,20200000,5", 1)]
#[case("r,dr,phi,dphi,lambda,dlambda,h", 1)]
#[case("range,dr,phi,dphi,lambda,dlambda,h,dh", 1)]
fn first_content_line(#[case] first: &str, #[case] discarded: usize) {
    let content = format!("# comment\n{}\n{}\n", first, VALID);
    let ingested = parse_str(&content);

    assert_eq!(ingested.used(), 1);
    assert_eq!(ingested.discarded(), discarded);

    // anything but the field names is a faulty data line
    assert!(ingested.rejections.iter().all(|rejection| rejection.line == 2));
}

#[test]
fn malformed_first_line() {
    let content = format!("abc,5,50,0.001,30,0.001,20200000,5\n{}\n", VALID);
    let ingested = parse_str(&content);

    assert_eq!(ingested.used(), 1);
    assert_eq!(ingested.discarded(), 1);
    assert_eq!(ingested.rejections[0].line, 1);
    assert_eq!(ingested.rejections[0].reason, RejectionReason::NotANumber);
    assert_eq!(ingested.rejections[0].field.as_deref(), Some("r"));
}

#[rstest]
#[case("1,2,3", RejectionReason::FieldCount, None)]
#[case("1,2,3,4,5,6,7,8,9", RejectionReason::FieldCount, None)]
#[case("1e7,5,abc,0,0,0,0,0", RejectionReason::NotANumber, Some("phi"))]
#[case("1e7,5,0,0,0,0,NaN,0", RejectionReason::NotFinite, Some("h"))]
#[case("1e7,inf,0,0,0,0,0,0", RejectionReason::NotFinite, Some("dr"))]
#[case("0,5,0,0,0,0,0,0", RejectionReason::NonPositive, Some("r"))]
#[case("-1e7,5,0,0,0,0,0,0", RejectionReason::NonPositive, Some("r"))]
#[case("1e7,-5,0,0,0,0,0,0", RejectionReason::Negative, Some("dr"))]
#[case("1e7,5,0,-0.1,0,0,0,0", RejectionReason::Negative, Some("dphi"))]
#[case("1e7,5,0,0,0,-1,0,0", RejectionReason::Negative, Some("dlambda"))]
#[case("1e7,5,0,0,0,0,0,-1", RejectionReason::Negative, Some("dh"))]
#[case("1e7,5,90.5,0,0,0,0,0", RejectionReason::OutOfRange, Some("phi"))]
#[case("1e7,5,0,0,-180.01,0,0,0", RejectionReason::OutOfRange, Some("lambda"))]
// first faulty field is reported
#[case("1e7,-5,95,0,0,0,0,0", RejectionReason::Negative, Some("dr"))]
fn rejections(
    #[case] line: &str,
    #[case] reason: RejectionReason,
    #[case] field: Option<&str>,
) {
    let content = format!("{}\n{}\n", VALID, line);
    let ingested = parse_str(&content);

    assert_eq!(ingested.used(), 1);
    assert_eq!(ingested.discarded(), 1);

    let rejection = &ingested.rejections[0];
    assert_eq!(rejection.line, 2);
    assert_eq!(rejection.reason, reason);
    assert_eq!(rejection.field.as_deref(), field);
    assert!(!rejection.message.is_empty());

    let display = rejection.to_string();
    assert!(display.starts_with("line 2: ["), "{}", display);
    assert!(display.contains(reason.code()));
}

#[test]
fn domain_bounds_are_inclusive() {
    let content = "1e7,0,90,0,180,0,-500,0\n1e7,0,-90,0,-180,0,0,0\n";
    let ingested = parse_str(content);
    assert_eq!(ingested.used(), 2);
    assert_eq!(ingested.discarded(), 0);
}

#[test]
fn line_numbers_account_for_comments() {
    let content = format!("# comment\n\n{}\n   \n# other\nbad line here\n", VALID);
    let ingested = parse_str(&content);
    assert_eq!(ingested.used(), 1);
    assert_eq!(ingested.rejections.len(), 1);
    assert_eq!(ingested.rejections[0].line, 6);
    assert_eq!(ingested.rejections[0].reason, RejectionReason::FieldCount);
}

#[test]
fn reason_codes() {
    let codes = [
        RejectionReason::FieldCount,
        RejectionReason::NotANumber,
        RejectionReason::NotFinite,
        RejectionReason::NonPositive,
        RejectionReason::Negative,
        RejectionReason::OutOfRange,
    ]
    .iter()
    .map(|reason| reason.code())
    .collect::<Vec<_>>();

    assert_eq!(codes, vec!["E01", "E02", "E03", "E04", "E05", "E06"]);
}

#[test]
fn missing_file() {
    assert!(parse_file("/this/file/does/not/exist.txt").is_err());
}
