//! Central-difference numerical differentiation.
//!
//! The step size is the caller's problem: it has to be small enough that the
//! O(h²) truncation term is negligible and large enough that cancellation at
//! the working precision does not dominate. The sweep controller resolves
//! this tension by recomputing h = tol² after each successful step.

use nalgebra::SVector;

use crate::traits::Real;

/// Estimates ∂f/∂x_k at `x` as (f(x + h·e_k) − f(x − h·e_k)) / 2h.
pub fn partial<R, F, const N: usize>(f: F, x: &SVector<R, N>, k: usize, h: &R) -> R
where
    R: Real,
    F: Fn(&SVector<R, N>) -> R,
{
    let mut xp = x.clone();
    let mut xm = x.clone();
    xp[k] = xp[k].clone() + h;
    xm[k] = xm[k].clone() - h;

    let two_h = h.clone() + h;
    (f(&xp) - f(&xm)) / two_h
}

/// Single-variable specialization of [`partial`].
pub fn derivative<R, F>(f: F, x: &R, h: &R) -> R
where
    R: Real,
    F: Fn(&R) -> R,
{
    let xp = x.clone() + h;
    let xm = x.clone() - h;

    let two_h = h.clone() + h;
    (f(&xp) - f(&xm)) / two_h
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Precision;
    use nalgebra::Vector2;
    use rug::Float;

    fn cube(x: &f64) -> f64 {
        x * x * x
    }

    #[test]
    fn derivative_of_cube_at_two() {
        // d/dx x^3 at x = 2 is 12.
        let est = derivative(cube, &2.0, &1e-3);
        assert!((est - 12.0).abs() < 1e-5);
    }

    #[test]
    fn halving_h_quarters_the_error() {
        // Second-order convergence while truncation dominates.
        let err_h = (derivative(cube, &2.0, &1e-3) - 12.0).abs();
        let err_half = (derivative(cube, &2.0, &5e-4) - 12.0).abs();
        let ratio = err_h / err_half;
        assert!(ratio > 3.0 && ratio < 5.0, "ratio was {ratio}");
    }

    #[test]
    fn partial_perturbs_only_the_requested_variable() {
        // f(x, y) = x^2 y: ∂f/∂x = 2xy, ∂f/∂y = x^2.
        let f = |v: &Vector2<f64>| v[0] * v[0] * v[1];
        let at = Vector2::new(3.0, 5.0);
        let dx = partial(f, &at, 0, &1e-5);
        let dy = partial(f, &at, 1, &1e-5);
        assert!((dx - 30.0).abs() < 1e-6);
        assert!((dy - 9.0).abs() < 1e-6);
    }

    #[test]
    fn derivative_tracks_the_working_precision() {
        // With MPFR at 50 digits a step of 1e-10 leaves no cancellation to
        // speak of; the estimate is good to the truncation term ~1e-20.
        let prec = Precision::new(50);
        let f = |x: &Float| x.clone() * x * x;
        let x = Float::with_prec(prec, 2.0);
        let h = <Float as crate::traits::Real>::parse(prec, "1E-10").unwrap();
        let est = derivative(f, &x, &h);
        let err = (est - 12.0).abs();
        assert!(err < Float::with_prec(prec, 1e-15));
    }
}
