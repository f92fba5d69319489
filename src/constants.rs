//! Fixed numerical constants.
//!
//! Changing any of the step sizes, floors or stabilizers below subtly
//! changes the numerical results (iteration counts, error percentages).

/// WGS84 Earth Frame Ellipsoid semi-major axis (m)
pub const EARTH_SEMI_MAJOR_AXIS_WGS84: f64 = 6378137.0_f64;

/// WGS84 Earth Frame Ellipsoid flattening
pub const EARTH_FLATTENING_WGS84: f64 = 1.0 / 298.257223563;

/// WGS84 first eccentricity squared: e² = 2f - f²
pub const EARTH_ECCENTRICITY_SQUARED_WGS84: f64 =
    2.0 * EARTH_FLATTENING_WGS84 - EARTH_FLATTENING_WGS84 * EARTH_FLATTENING_WGS84;

/// Maximal number of fixed point iterations in the ECEF to geodetic conversion
pub(crate) const GEODETIC_MAX_ITERATIONS: usize = 20;

/// Latitude convergence threshold of the ECEF to geodetic conversion (rad)
pub(crate) const GEODETIC_LATITUDE_TOLERANCE_RAD: f64 = 1.0E-12;

/// Smallest pivot magnitude tolerated by the 3x3 elimination
pub(crate) const PIVOT_THRESHOLD: f64 = 1.0E-15;

/// Levenberg style damping added to the normal matrix diagonal, every iteration
pub(crate) const NORMAL_MATRIX_DAMPING: f64 = 1.0E-3;

/// Modeled ranges are floored to this value (m)
pub(crate) const MIN_MODELED_RANGE_M: f64 = 1.0E-12;

/// Initial guess is rescaled to this radius from Earth center (m)
pub(crate) const INITIAL_GUESS_RADIUS_M: f64 = EARTH_SEMI_MAJOR_AXIS_WGS84 - 100.0;

/// Satellite centroids closer than this to Earth center are not rescaled (m)
pub(crate) const MIN_CENTROID_NORM_M: f64 = 1.0;

/// Angular central difference step, for effective range sigma (rad)
pub(crate) const SIGMA_ANGLE_STEP_RAD: f64 = 1.0E-6;

/// Height central difference step, for effective range sigma (m)
pub(crate) const SIGMA_HEIGHT_STEP_M: f64 = 1.0E-3;

/// Effective range sigma floor (m)
pub(crate) const MIN_EFFECTIVE_SIGMA_M: f64 = 1.0E-12;

/// Regularizer added to the weighted normal matrix diagonal prior inversion
pub(crate) const WEIGHTED_MATRIX_REGULARIZER: f64 = 1.0E-9;

/// Determinant floor of the conditioning heuristic
pub(crate) const MIN_DETERMINANT: f64 = 1.0E-24;

/// ECEF central difference step of the frame jacobian (m)
pub(crate) const FRAME_JACOBIAN_STEP_M: f64 = 1.0E-3;

/// Denominator floor of the relative error percentages
pub(crate) const MIN_RELATIVE_DENOMINATOR: f64 = 1.0E-9;

/// Minimal number of observations to attempt a solution
pub const MIN_OBSERVATIONS: usize = 4;
