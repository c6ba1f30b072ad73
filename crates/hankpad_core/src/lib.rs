//! The `hankpad_core` crate is the numeric engine behind the hankpad CLI:
//! a Newton-Raphson solver with central-difference Jacobians, the
//! coefficient recurrences of the two equation variants, Hankel
//! determinants over those coefficients, and the precision-adaptive sweep
//! that ties them together across determinant orders.
//!
//! Everything is generic over the [`traits::Real`] scalar capability,
//! supporting plain `f64` as well as MPFR floats whose precision the sweep
//! escalates as the root is refined.

pub mod differentiate;
pub mod hankel;
pub mod linalg;
pub mod mp;
pub mod series;
pub mod solver;
pub mod sweep;
pub mod traits;
