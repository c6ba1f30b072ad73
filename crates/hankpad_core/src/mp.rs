//! `Real` over MPFR via `rug::Float`.
//!
//! The original formulation of this method needs hundreds of significant
//! digits at large determinant orders; `rug::Float` carries per-value
//! mantissa precision, so the digit context maps to a bit width at
//! construction and values keep that width until explicitly re-rounded.

use rug::Float;

use crate::traits::{ParseRealError, Precision, Real};

/// Mantissa bits needed for the requested number of decimal digits.
pub fn prec_bits(prec: Precision) -> u32 {
    let bits = (prec.digits() as f64 * std::f64::consts::LOG2_10).ceil() as u32;
    bits.max(rug::float::prec_min())
}

impl Real for Float {
    fn with_prec(prec: Precision, value: f64) -> Self {
        Float::with_val(prec_bits(prec), value)
    }

    fn parse(prec: Precision, s: &str) -> Result<Self, ParseRealError> {
        match Float::parse(s.trim()) {
            Ok(parsed) => Ok(Float::with_val(prec_bits(prec), parsed)),
            Err(_) => Err(ParseRealError {
                input: s.to_owned(),
            }),
        }
    }

    fn at_prec(&self, prec: Precision) -> Self {
        let mut out = self.clone();
        out.set_prec(prec_bits(prec));
        out
    }

    fn abs(&self) -> Self {
        self.clone().abs()
    }

    fn sqrt(&self) -> Self {
        self.clone().sqrt()
    }

    fn floor_log10(&self) -> Option<i64> {
        if Float::is_zero(self) || !self.is_finite() {
            return None;
        }
        let exp = self.clone().abs().log10().floor();
        Some(Float::to_f64(&exp) as i64)
    }

    fn to_f64(&self) -> f64 {
        Float::to_f64(self)
    }

    fn is_zero(&self) -> bool {
        Float::is_zero(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_context_selects_the_mantissa_width() {
        let x = Float::with_prec(Precision::new(40), 1.5);
        assert_eq!(x.prec(), prec_bits(Precision::new(40)));
        assert!(x.prec() >= 132);

        let widened = x.at_prec(Precision::new(80));
        assert!(widened.prec() > x.prec());
        assert_eq!(widened, 1.5);
    }

    #[test]
    fn parse_and_floor_log10() {
        let prec = Precision::new(40);
        let x = <Float as Real>::parse(prec, "-1.6").unwrap();
        assert!((Real::to_f64(&x) + 1.6).abs() < 1e-15);

        let tiny = <Float as Real>::parse(prec, "3E-5").unwrap();
        assert_eq!(Real::floor_log10(&tiny), Some(-5));
        assert_eq!(Real::floor_log10(&Float::zero(prec)), None);

        assert!(<Float as Real>::parse(prec, "not a number").is_err());
    }
}
