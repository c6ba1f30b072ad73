//! Newton-Raphson iteration over a fixed-size system of residuals.

use nalgebra::{SMatrix, SVector};
use thiserror::Error;

use crate::differentiate;
use crate::linalg;
use crate::traits::Real;

/// A residual function of the N-dimensional estimate vector.
pub type ResidualFn<R, const N: usize> = Box<dyn Fn(&SVector<R, N>) -> R>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SolveError {
    #[error("Newton-Raphson did not converge within {max_iter} iterations")]
    Exhausted { max_iter: usize },
}

/// A converged solve, with how hard it was to get there.
#[derive(Debug, Clone)]
pub struct NewtonResult<R: Real, const N: usize> {
    pub x: SVector<R, N>,
    pub iterations: usize,
    pub deviation: R,
}

/// Newton-Raphson solver for N equations in N unknowns.
///
/// The Jacobian is estimated by central differences at the configured step
/// size, so the step has to be chosen against the working precision of the
/// scalar type. Tolerance, step, and iteration budget persist across `solve`
/// calls until changed by the owner.
pub struct NewtonSolver<R: Real, const N: usize> {
    residuals: [ResidualFn<R, N>; N],
    tol: R,
    step: R,
    max_iter: usize,
    log_digits: Option<usize>,
}

impl<R: Real, const N: usize> NewtonSolver<R, N> {
    pub fn new(residuals: [ResidualFn<R, N>; N], tol: R, step: R) -> Self {
        Self {
            residuals,
            tol,
            step,
            max_iter: 100,
            log_digits: None,
        }
    }

    pub fn set_tol(&mut self, tol: R) {
        self.tol = tol;
    }

    pub fn set_step(&mut self, step: R) {
        self.step = step;
    }

    pub fn set_max_iter(&mut self, max_iter: usize) {
        self.max_iter = max_iter;
    }

    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Emit each iterate via `log::debug!` at the given display precision.
    pub fn set_log(&mut self, digits: usize) {
        self.log_digits = Some(digits);
    }

    pub fn unset_log(&mut self) {
        self.log_digits = None;
    }

    /// Iterates x ← x − J⁻¹·F(x) from `x0` until the deviation between two
    /// iterates drops to the tolerance.
    ///
    /// A singular Jacobian is not specially detected: a failed linear solve
    /// burns the iteration without an update, and persistent failure
    /// surfaces as [`SolveError::Exhausted`] once the budget runs out. The
    /// same goes for non-finite iterates, whose deviation never compares
    /// below the tolerance. Nothing of the pre-failure state escapes.
    pub fn solve(&self, x0: SVector<R, N>) -> Result<NewtonResult<R, N>, SolveError> {
        let mut x = x0;
        let mut iterations = 0;

        loop {
            if iterations >= self.max_iter {
                return Err(SolveError::Exhausted {
                    max_iter: self.max_iter,
                });
            }

            let jacobian: SMatrix<R, N, N> = SMatrix::from_fn(|i, j| {
                differentiate::partial(&self.residuals[i], &x, j, &self.step)
            });
            let f_val: SVector<R, N> = SVector::from_fn(|i, _| (self.residuals[i])(&x));

            iterations += 1;

            let delta = match linalg::solve(&jacobian, &f_val) {
                Some(delta) => delta,
                None => continue,
            };

            let x_old = x;
            x = SVector::from_fn(|i, _| x_old[i].clone() - &delta[i]);

            if let Some(digits) = self.log_digits {
                let iterate: Vec<String> =
                    x.iter().map(|v| format!("{v:.digits$}")).collect();
                log::debug!("( NR: {} ) {}", iterations - 1, iterate.join(" "));
            }

            let deviation = Self::deviation(&x, &x_old);
            if deviation <= self.tol {
                return Ok(NewtonResult {
                    x,
                    iterations,
                    deviation,
                });
            }
        }
    }

    /// ‖a − b‖: Euclidean for the vector form, absolute value when N = 1.
    fn deviation(a: &SVector<R, N>, b: &SVector<R, N>) -> R {
        let first = a[0].clone() - &b[0];
        if N == 1 {
            return first.abs();
        }
        let mut sum = first.clone() * &first;
        for i in 1..N {
            let d = a[i].clone() - &b[i];
            sum = sum + d.clone() * &d;
        }
        sum.sqrt()
    }
}
