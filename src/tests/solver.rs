use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::{
    prelude::{
        ecef_to_geodetic, Config, Convergence, EcefPoint, Error, GeoPoint, GeoSigma, Solver,
        EARTH_SEMI_MAJOR_AXIS_WGS84,
    },
    tests::{
        init_logger, observations_around, reference_observations, wrap_longitude,
        REFERENCE_OFFSETS_DEG, REFERENCE_RECEIVER,
    },
};

fn satellites_and_ranges() -> (Vec<EcefPoint>, Vec<f64>) {
    reference_observations()
        .iter()
        .map(|obs| (obs.satellite_ecef(), obs.range_m))
        .unzip()
}

#[test]
fn reference_convergence() {
    init_logger();

    let (satellites, ranges) = satellites_and_ranges();
    let solver = Solver::new(&Config::default());
    let solved = solver.resolve(&satellites, &ranges).unwrap();

    assert!(solved.converged());
    assert_eq!(solved.convergence, Convergence::Converged);
    assert!(solved.iterations > 0);
    assert!(solved.iterations < 50, "iterations: {}", solved.iterations);

    let geo = ecef_to_geodetic(&solved.position_ecef);
    let (lat, long, alt) = REFERENCE_RECEIVER;

    assert!((geo.lat_deg - lat).abs() < 1.0E-3, "{}", geo);
    assert!((geo.long_deg - long).abs() < 1.0E-3, "{}", geo);
    assert!((geo.alt_m - alt).abs() < 20.0, "{}", geo);

    assert_eq!(solved.rows().len(), satellites.len());

    for (row, sat) in solved.rows().iter().zip(satellites.iter()) {
        assert!((row.los.norm() - 1.0).abs() < 1.0E-12);
        let modeled = (solved.position_ecef - sat).norm();
        // rows are formed prior the last (tiny) update
        assert!((row.modeled_range_m - modeled).abs() < 1.0E-3);
    }

    let n = solved.normal_matrix();
    assert_eq!(*n, n.transpose());
    assert!(n.trace() > satellites.len() as f64);
}

#[test]
fn idempotence() {
    let (satellites, ranges) = satellites_and_ranges();
    let solver = Solver::new(&Config::default());

    let first = solver.resolve(&satellites, &ranges).unwrap();
    let second = solver.resolve(&satellites, &ranges).unwrap();

    assert_eq!(first, second);
}

#[test]
fn iteration_budget() {
    init_logger();

    let (satellites, ranges) = satellites_and_ranges();

    let cfg = Config::default().with_max_iterations(1);
    let solved = Solver::new(&cfg).resolve(&satellites, &ranges).unwrap();

    assert!(!solved.converged());
    assert_eq!(solved.convergence, Convergence::MaxIterations);
    assert_eq!(solved.iterations, 1);
    assert_eq!(solved.rows().len(), satellites.len());

    let cfg = Config::default().with_max_iterations(0);
    let solved = Solver::new(&cfg).resolve(&satellites, &ranges).unwrap();

    assert_eq!(solved.convergence, Convergence::MaxIterations);
    assert_eq!(solved.iterations, 0);
    assert_eq!(solved.position_ecef, Solver::initial_guess(&satellites));
}

#[test]
fn invalid_inputs() {
    let (satellites, ranges) = satellites_and_ranges();
    let solver = Solver::new(&Config::default());

    assert_eq!(
        solver.resolve(&satellites[..3], &ranges[..3]),
        Err(Error::NotEnoughObservations(3))
    );

    assert_eq!(
        solver.resolve(&satellites, &ranges[..5]),
        Err(Error::SizeMismatch(7, 5))
    );
}

#[test]
fn initial_guess() {
    let (satellites, _) = satellites_and_ranges();
    let guess = Solver::initial_guess(&satellites);
    assert!((guess.norm() - (EARTH_SEMI_MAJOR_AXIS_WGS84 - 100.0)).abs() < 1.0E-6);

    // centroid at Earth center
    let symmetric = vec![
        EcefPoint::new(2.0E7, 0.0, 0.0),
        EcefPoint::new(-2.0E7, 0.0, 0.0),
        EcefPoint::new(0.0, 2.0E7, 0.0),
        EcefPoint::new(0.0, -2.0E7, 0.0),
    ];
    let guess = Solver::initial_guess(&symmetric);
    assert!(guess.norm() < 1.0);
    assert!(guess.iter().all(|v| v.is_finite()));
}

#[test]
fn random_receivers() {
    init_logger();

    let mut rng = SmallRng::seed_from_u64(0xf00d);
    let solver = Solver::new(&Config::default());

    for _ in 0..100 {
        let receiver = GeoPoint::new(
            rng.random_range(-50.0..50.0),
            rng.random_range(-180.0..180.0),
            rng.random_range(-100.0..3000.0),
        );

        let observations = observations_around(
            &receiver,
            &REFERENCE_OFFSETS_DEG,
            5.0,
            GeoSigma::new(0.001, 0.001, 5.0),
        );

        let (satellites, ranges): (Vec<EcefPoint>, Vec<f64>) = observations
            .iter()
            .map(|obs| (obs.satellite_ecef(), obs.range_m))
            .unzip();

        let solved = solver.resolve(&satellites, &ranges).unwrap();
        assert!(solved.converged(), "{} did not converge", receiver);

        let geo = ecef_to_geodetic(&solved.position_ecef);
        assert!((geo.lat_deg - receiver.lat_deg).abs() < 1.0E-3, "{}", geo);
        assert!(
            wrap_longitude(geo.long_deg - receiver.long_deg).abs() < 1.0E-3,
            "{}",
            geo
        );
        assert!((geo.alt_m - receiver.alt_m).abs() < 20.0, "{}", geo);
    }
}

#[test]
fn non_finite_range() {
    init_logger();

    let (satellites, mut ranges) = satellites_and_ranges();
    ranges[0] = f64::NAN;

    let solved = Solver::new(&Config::default())
        .resolve(&satellites, &ranges)
        .unwrap();

    assert!(!solved.converged());
    assert_eq!(solved.convergence, Convergence::SingularGeometry);

    // stopped on the first solve: nothing applied, initial guess is kept
    assert_eq!(solved.iterations, 0);
    assert_eq!(solved.position_ecef, Solver::initial_guess(&satellites));
    assert_eq!(solved.rows().len(), satellites.len());
}

#[test]
fn overflowing_range() {
    init_logger();

    let (satellites, mut ranges) = satellites_and_ranges();
    ranges[0] = 1.0E300;

    let cfg = Config::default();
    let solved = Solver::new(&cfg).resolve(&satellites, &ranges).unwrap();

    assert!(!solved.converged());
    assert!(solved.iterations <= cfg.max_iterations);

    // last finite estimate is retained
    assert!(
        solved.position_ecef.iter().all(|v| v.is_finite()),
        "{}",
        solved.position_ecef
    );
}
