//! Dense elimination routines generic over [`Real`].
//!
//! nalgebra's own LU factorization wants `ComplexField`, which an
//! arbitrary-precision scalar does not implement, so the two small kernels
//! the engine needs (a fixed-size linear solve and a dynamic determinant)
//! are written out against the `Real` capability directly. Partial pivoting
//! on |·| keeps the elimination stable at any working precision.

use nalgebra::{DMatrix, SMatrix, SVector};

use crate::traits::Real;

/// Solves a·x = b by Gaussian elimination with partial pivoting.
///
/// Returns `None` when a pivot vanishes exactly; the caller decides what a
/// singular system means for it.
pub fn solve<R: Real, const N: usize>(
    a: &SMatrix<R, N, N>,
    b: &SVector<R, N>,
) -> Option<SVector<R, N>> {
    let mut m = a.clone();
    let mut x = b.clone();

    for col in 0..N {
        let mut pivot = col;
        let mut best = m[(col, col)].abs();
        for row in col + 1..N {
            let mag = m[(row, col)].abs();
            if mag > best {
                best = mag;
                pivot = row;
            }
        }
        if m[(pivot, col)].is_zero() {
            return None;
        }
        if pivot != col {
            m.swap_rows(pivot, col);
            x.swap_rows(pivot, col);
        }

        for row in col + 1..N {
            let factor = m[(row, col)].clone() / &m[(col, col)];
            for j in col..N {
                let elim = factor.clone() * &m[(col, j)];
                m[(row, j)] = m[(row, j)].clone() - elim;
            }
            let elim = factor * &x[col];
            x[row] = x[row].clone() - elim;
        }
    }

    for col in (0..N).rev() {
        let mut acc = x[col].clone();
        for j in col + 1..N {
            let t = m[(col, j)].clone() * &x[j];
            acc = acc - t;
        }
        x[col] = acc / &m[(col, col)];
    }

    Some(x)
}

/// Determinant of a square matrix by pivoted elimination.
///
/// Consumes the matrix; the determinant is the signed product of the pivots.
pub fn determinant<R: Real>(mut m: DMatrix<R>) -> R {
    let n = m.nrows();
    debug_assert_eq!(n, m.ncols());
    debug_assert!(n > 0);

    let mut negate = false;
    for col in 0..n {
        let mut pivot = col;
        let mut best = m[(col, col)].abs();
        for row in col + 1..n {
            let mag = m[(row, col)].abs();
            if mag > best {
                best = mag;
                pivot = row;
            }
        }
        if m[(pivot, col)].is_zero() {
            // Column is all zeros below the diagonal too: determinant is
            // exactly zero, returned at the precision the entries carry.
            return m[(pivot, col)].clone();
        }
        if pivot != col {
            m.swap_rows(pivot, col);
            negate = !negate;
        }

        for row in col + 1..n {
            let factor = m[(row, col)].clone() / &m[(col, col)];
            for j in col..n {
                let elim = factor.clone() * &m[(col, j)];
                m[(row, j)] = m[(row, j)].clone() - elim;
            }
        }
    }

    let mut det = m[(0, 0)].clone();
    for i in 1..n {
        det = det * &m[(i, i)];
    }
    if negate {
        -det
    } else {
        det
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix2, Vector2};

    #[test]
    fn solves_a_two_by_two_system() {
        // 2x + y = 5, x - y = 1  =>  x = 2, y = 1.
        let a = Matrix2::new(2.0, 1.0, 1.0, -1.0);
        let b = Vector2::new(5.0, 1.0);
        let x = solve(&a, &b).unwrap();
        assert!((x[0] - 2.0).abs() < 1e-12);
        assert!((x[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn singular_system_is_reported() {
        let a = Matrix2::new(1.0, 2.0, 2.0, 4.0);
        let b = Vector2::new(1.0, 2.0);
        assert!(solve(&a, &b).is_none());
    }

    #[test]
    fn pivoting_handles_a_zero_leading_entry() {
        let a = Matrix2::new(0.0, 1.0, 1.0, 0.0);
        let b = Vector2::new(3.0, 7.0);
        let x = solve(&a, &b).unwrap();
        assert!((x[0] - 7.0).abs() < 1e-12);
        assert!((x[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn determinant_of_small_matrices() {
        let m = DMatrix::from_row_slice(2, 2, &[3.0, 1.0, 4.0, 2.0]);
        assert!((determinant(m) - 2.0).abs() < 1e-12);

        let m = DMatrix::from_row_slice(3, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0]);
        assert!((determinant(m) + 3.0).abs() < 1e-12);

        let singular = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        assert_eq!(determinant(singular), 0.0);
    }
}
