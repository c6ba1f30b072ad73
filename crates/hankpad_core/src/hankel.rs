//! Hankel determinants of a coefficient sequence, and the residual whose
//! root the sweep hunts.

use nalgebra::{DMatrix, SVector};

use crate::linalg;
use crate::series::Equation;
use crate::solver::ResidualFn;
use crate::traits::{Precision, Real};

/// Determinant of the order×order matrix m[i][j] = coeffs[i + j].
///
/// The sequence must cover every anti-diagonal the matrix reads, i.e.
/// `coeffs.len() >= 2*order - 1`. Callers uphold this by construction
/// (the sweep requests 2D+d coefficients and trims d+1), so a short
/// sequence is a programming error, not a runtime condition.
pub fn hankel_det<R: Real>(order: usize, coeffs: &[R]) -> R {
    debug_assert!(order >= 1);
    debug_assert!(
        coeffs.len() >= 2 * order - 1,
        "order {} Hankel determinant needs {} coefficients, got {}",
        order,
        2 * order - 1,
        coeffs.len()
    );
    let m = DMatrix::from_fn(order, order, |i, j| coeffs[i + j].clone());
    linalg::determinant(m)
}

/// Builds the residual x ↦ H_D(coefficients(2D+d, x) with the first d+1
/// entries dropped) for one (equation, D, d) triple.
///
/// D, d, and the working precision are captured by value, so the closure's
/// meaning is fixed at construction and never shifts under the sweep's feet.
pub fn residual<R: Real>(
    equation: Equation,
    order: usize,
    offset: usize,
    prec: Precision,
) -> ResidualFn<R, 1> {
    Box::new(move |x: &SVector<R, 1>| {
        let coeffs = equation.coefficients(prec, 2 * order + offset, &x[0]);
        hankel_det(order, &coeffs[offset + 1..])
    })
}
