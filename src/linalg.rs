//! Dense 3x3 kernel.
//!
//! The unknown is always a 3D position, which is why we do not
//! need any other matrix dimension. Products and transposition are
//! the [Matrix3] operators; solving and inversion are implemented here
//! because their failure criterion is part of the solver behavior.
use nalgebra::{Matrix3, Vector3};

use crate::{constants::PIVOT_THRESHOLD, error::Error};

/// Solves A.x = b by Gaussian elimination with partial pivoting,
/// on the augmented 3x4 system.
///
/// ## Returns
/// - [Error::SingularMatrix] when the largest available pivot, at any
///   elimination step, is below the near zero threshold.
pub fn solve3x3(a: &Matrix3<f64>, b: &Vector3<f64>) -> Result<Vector3<f64>, Error> {
    let mut m = [[0.0_f64; 4]; 3];

    for (i, row) in m.iter_mut().enumerate() {
        for (j, value) in row.iter_mut().take(3).enumerate() {
            *value = a[(i, j)];
        }
        row[3] = b[i];
    }

    for col in 0..3 {
        let mut pivot = col;
        for row in col + 1..3 {
            if m[row][col].abs() > m[pivot][col].abs() {
                pivot = row;
            }
        }

        let magnitude = m[pivot][col].abs();
        if magnitude.is_nan() || magnitude < PIVOT_THRESHOLD {
            return Err(Error::SingularMatrix);
        }

        m.swap(col, pivot);

        for row in col + 1..3 {
            let factor = m[row][col] / m[col][col];
            for k in col..4 {
                m[row][k] -= factor * m[col][k];
            }
        }
    }

    let mut x = Vector3::<f64>::zeros();

    for row in (0..3).rev() {
        let mut sum = m[row][3];
        for k in row + 1..3 {
            sum -= m[row][k] * x[k];
        }
        x[row] = sum / m[row][row];
    }

    Ok(x)
}

/// Inverts A by solving A.xᵢ = eᵢ for the three canonical vectors.
/// Fails if any of the three resolutions fails.
pub fn invert3x3(a: &Matrix3<f64>) -> Result<Matrix3<f64>, Error> {
    let mut inv = Matrix3::<f64>::zeros();
    for i in 0..3 {
        let mut e_i = Vector3::<f64>::zeros();
        e_i[i] = 1.0;
        let x_i = solve3x3(a, &e_i)?;
        inv.set_column(i, &x_i);
    }
    Ok(inv)
}

/// Projects a covariance matrix through the linear map `j`: j.c.jᵗ
pub fn project3x3(j: &Matrix3<f64>, c: &Matrix3<f64>) -> Matrix3<f64> {
    j * c * j.transpose()
}

/// Accumulates the outer product w.u.uᵗ into `m`
pub(crate) fn add_outer(m: &mut Matrix3<f64>, u: &Vector3<f64>, w: f64) {
    *m += w * u * u.transpose();
}
