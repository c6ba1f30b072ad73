use std::fmt::Display;
use std::ops::{Add, Div, Mul, Neg, Sub};

use thiserror::Error;

/// Working precision in significant decimal digits.
///
/// Passed explicitly to every value-constructing operation. The sweep
/// controller owns the authoritative copy and is its only mutator between
/// D iterations; nothing in this crate consults process-wide state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Precision {
    digits: u32,
}

impl Precision {
    pub const fn new(digits: u32) -> Self {
        Self { digits }
    }

    pub const fn digits(self) -> u32 {
        self.digits
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot parse {input:?} as a real number")]
pub struct ParseRealError {
    pub input: String,
}

/// A real scalar the numeric engine can be instantiated over.
///
/// Covers arithmetic (owned and by-ref right-hand side), ordering, display,
/// and precision-aware construction. Implemented for the native floats
/// (fixed hardware precision, the context is ignored) and for `rug::Float`
/// in [`crate::mp`], where the digit count selects the mantissa width.
pub trait Real:
    nalgebra::Scalar
    + Display
    + PartialOrd
    + Neg<Output = Self>
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + for<'a> Add<&'a Self, Output = Self>
    + for<'a> Sub<&'a Self, Output = Self>
    + for<'a> Mul<&'a Self, Output = Self>
    + for<'a> Div<&'a Self, Output = Self>
{
    /// Constructs a value carrying the given working precision.
    fn with_prec(prec: Precision, value: f64) -> Self;

    /// Parses a decimal string (e.g. "-1.6", "1E-10") at the given precision.
    fn parse(prec: Precision, s: &str) -> Result<Self, ParseRealError>;

    /// Re-rounds an existing value to a new working precision. Values keep
    /// the precision they were constructed at, so carrying a value across a
    /// precision escalation requires an explicit re-round.
    fn at_prec(&self, prec: Precision) -> Self;

    fn zero(prec: Precision) -> Self {
        Self::with_prec(prec, 0.0)
    }

    fn one(prec: Precision) -> Self {
        Self::with_prec(prec, 1.0)
    }

    fn abs(&self) -> Self;

    fn sqrt(&self) -> Self;

    /// ⌊log10 |self|⌋, or `None` for zero and non-finite values.
    fn floor_log10(&self) -> Option<i64>;

    fn to_f64(&self) -> f64;

    fn is_zero(&self) -> bool;
}

macro_rules! native_real {
    ($ty:ty) => {
        impl Real for $ty {
            fn with_prec(_prec: Precision, value: f64) -> Self {
                <$ty as num_traits::NumCast>::from(value)
                    .unwrap_or_else(<$ty as num_traits::Float>::nan)
            }

            fn parse(_prec: Precision, s: &str) -> Result<Self, ParseRealError> {
                s.trim().parse::<$ty>().map_err(|_| ParseRealError {
                    input: s.to_owned(),
                })
            }

            fn at_prec(&self, _prec: Precision) -> Self {
                *self
            }

            fn abs(&self) -> Self {
                num_traits::Float::abs(*self)
            }

            fn sqrt(&self) -> Self {
                num_traits::Float::sqrt(*self)
            }

            fn floor_log10(&self) -> Option<i64> {
                let mag = num_traits::Float::abs(*self);
                if num_traits::Zero::is_zero(&mag) || !num_traits::Float::is_finite(mag) {
                    return None;
                }
                Some(num_traits::Float::floor(num_traits::Float::log10(mag)) as i64)
            }

            fn to_f64(&self) -> f64 {
                <f64 as num_traits::NumCast>::from(*self).unwrap_or(f64::NAN)
            }

            fn is_zero(&self) -> bool {
                num_traits::Zero::is_zero(self)
            }
        }
    };
}

native_real!(f32);
native_real!(f64);
