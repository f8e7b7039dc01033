//! Numerical Jacobian of a complex residual function.
//!
//! The Jacobian is held as a complex-linear `N x N` matrix. Column `j` is the
//! symmetric difference of the residuals along the real axis of variable `j`,
//!
//! ```text
//! dR/dz = (R(z + h) - R(z - h)) / 2h
//! ```
//!
//! with `h` = [`STEP`]. For holomorphic residuals this is the complex
//! derivative `R'(z)`, so the Newton step `J * delta = -R` can be solved
//! directly over the complex numbers. Probes never leave the real line of a
//! real point, which keeps real-only operators such as `%` defined there.

use nalgebra::DMatrix;
use num_complex::Complex64;

/// Finite-difference step along the real axis of each variable.
pub const STEP: f64 = 1e-6;

/// Estimates the Jacobian of `residuals` at `point`.
///
/// `residuals` must return `rows` values for every point it is given. Entry
/// `(i, j)` is the derivative of residual `i` with respect to variable `j`.
///
/// # Errors
/// The first error returned by `residuals` at a probe point is returned
/// unchanged.
///
/// # Example
/// ```
/// use complex_eqsolve::jacobian::estimate;
/// use num_complex::Complex64;
///
/// // R(z) = z^2, so R'(z) = 2z
/// let z = Complex64::new(1.0, 2.0);
/// let jac = estimate(|v: &[Complex64]| Ok::<_, ()>(vec![v[0] * v[0]]), &[z], 1).unwrap();
/// assert!((jac[(0, 0)] - 2.0 * z).norm() < 1e-6);
/// ```
pub fn estimate<F, E>(
    mut residuals: F,
    point: &[Complex64],
    rows: usize,
) -> Result<DMatrix<Complex64>, E>
where
    F: FnMut(&[Complex64]) -> Result<Vec<Complex64>, E>,
{
    let mut jacobian = DMatrix::from_element(rows, point.len(), Complex64::new(0.0, 0.0));
    let mut probe = point.to_vec();

    for (col, &origin) in point.iter().enumerate() {
        probe[col] = origin + STEP;
        let forward = residuals(&probe)?;
        probe[col] = origin - STEP;
        let backward = residuals(&probe)?;
        probe[col] = origin;

        for (row, (f, b)) in forward.iter().zip(&backward).take(rows).enumerate() {
            jacobian[(row, col)] = (f - b) / (2.0 * STEP);
        }
    }

    Ok(jacobian)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn assert_close(actual: Complex64, expected: Complex64) {
        assert_relative_eq!(actual.re, expected.re, epsilon = 1e-6);
        assert_relative_eq!(actual.im, expected.im, epsilon = 1e-6);
    }

    #[test]
    fn test_linear_system() {
        // R0 = a + b - 5, R1 = a - b - 1
        let f = |v: &[Complex64]| -> Result<Vec<Complex64>, ()> {
            Ok(vec![v[0] + v[1] - 5.0, v[0] - v[1] - 1.0])
        };
        let jac = estimate(f, &[c(0.3, 0.1), c(-2.0, 1.0)], 2).unwrap();
        assert_close(jac[(0, 0)], c(1.0, 0.0));
        assert_close(jac[(0, 1)], c(1.0, 0.0));
        assert_close(jac[(1, 0)], c(1.0, 0.0));
        assert_close(jac[(1, 1)], c(-1.0, 0.0));
    }

    #[test]
    fn test_holomorphic_derivative() {
        // R = sin(a) * b, dR/da = cos(a) * b, dR/db = sin(a)
        let f = |v: &[Complex64]| -> Result<Vec<Complex64>, ()> { Ok(vec![v[0].sin() * v[1]]) };
        let a = c(0.4, -0.7);
        let b = c(1.5, 2.0);
        let jac = estimate(f, &[a, b], 1).unwrap();
        assert_close(jac[(0, 0)], a.cos() * b);
        assert_close(jac[(0, 1)], a.sin());
    }

    #[test]
    fn test_point_error_propagates() {
        let f = |v: &[Complex64]| -> Result<Vec<Complex64>, &'static str> {
            if v[0].re > 1.0 {
                Err("out of domain")
            } else {
                Ok(vec![v[0]])
            }
        };
        assert_eq!(estimate(f, &[c(1.0, 0.0)], 1), Err("out of domain"));
    }

    #[test]
    fn test_real_point_stays_on_real_axis() {
        let f = |v: &[Complex64]| -> Result<Vec<Complex64>, &'static str> {
            if v[0].im != 0.0 {
                Err("complex operand")
            } else {
                Ok(vec![c(3.0 * v[0].re, 0.0)])
            }
        };
        let jac = estimate(f, &[c(2.0, 0.0)], 1).unwrap();
        assert_close(jac[(0, 0)], c(3.0, 0.0));
    }

    #[test]
    fn test_no_variables() {
        let f = |_: &[Complex64]| -> Result<Vec<Complex64>, ()> { Ok(vec![c(1.0, 0.0)]) };
        let jac = estimate(f, &[], 1).unwrap();
        assert_eq!(jac.shape(), (1, 0));
    }
}
