//! The weight semiring used throughout the crate: exact rationals with
//! arbitrary-precision numerator and denominator.
//!
//! Weighted automata over a field admit exact reduction, which is why we work
//! over ℚ rather than floating point. The operations here mirror the usual
//! weightset surface: zero/one constants, checked division and the Kleene
//! closures `star`/`plus`, which are only defined for weights of absolute
//! value strictly below one.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use thiserror::Error;

/// Exact rational weight. Absent initial/final assignments are implicit
/// [`zero`] everywhere in the crate.
pub type Weight = BigRational;

/// Errors raised by the partial operations of the weight semiring.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeightError {
    /// Division by a zero weight.
    #[error("division by zero weight")]
    DivisionByZero,
    /// `star` or `plus` requested on a weight of absolute value at least one,
    /// where the geometric series does not converge.
    #[error("closure undefined for weight {0} (absolute value >= 1)")]
    ClosureDiverges(String),
}

/// The additive identity.
pub fn zero() -> Weight {
    Weight::zero()
}

/// The multiplicative identity.
pub fn one() -> Weight {
    Weight::one()
}

/// Builds a weight from an integer.
pub fn from_int(v: i64) -> Weight {
    Weight::from_integer(BigInt::from(v))
}

/// Division, failing on a zero divisor.
pub fn div(l: &Weight, r: &Weight) -> Result<Weight, WeightError> {
    if r.is_zero() {
        return Err(WeightError::DivisionByZero);
    }
    Ok(l / r)
}

/// Kleene star `v* = 1 / (1 - v)`, defined for `|v| < 1`.
pub fn star(v: &Weight) -> Result<Weight, WeightError> {
    if v.abs() >= one() {
        return Err(WeightError::ClosureDiverges(v.to_string()));
    }
    Ok(one() / (one() - v))
}

/// Strict closure `v+ = v / (1 - v)`, defined for `|v| < 1`.
pub fn plus(v: &Weight) -> Result<Weight, WeightError> {
    if v.abs() >= one() {
        return Err(WeightError::ClosureDiverges(v.to_string()));
    }
    Ok(v / (one() - v))
}

/// Output syntax for [`show`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightFormat {
    /// Plain `num` or `num/den` text, the format used by the matrix exporter.
    #[default]
    Text,
    /// JSON: a bare integer, or `{"num":..,"den":..}` for proper fractions.
    Json,
    /// LaTeX: a bare integer, or `\frac{num}{den}`.
    Latex,
}

/// Renders a weight in the requested syntax.
pub fn show(v: &Weight, format: WeightFormat) -> String {
    match format {
        WeightFormat::Text => v.to_string(),
        WeightFormat::Json => {
            if v.denom().is_one() {
                v.numer().to_string()
            } else {
                format!("{{\"num\":{},\"den\":{}}}", v.numer(), v.denom())
            }
        }
        WeightFormat::Latex => {
            if v.denom().is_one() {
                v.numer().to_string()
            } else {
                format!("\\frac{{{}}}{{{}}}", v.numer(), v.denom())
            }
        }
    }
}

/// Whether the weight is an integer, i.e. has denominator one. The exporter's
/// integral check relies on this.
pub fn is_integral(v: &Weight) -> bool {
    v.denom().is_one()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: i64, d: i64) -> Weight {
        Weight::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn field_operations() {
        assert_eq!(q(1, 2) + q(1, 3), q(5, 6));
        assert_eq!(q(1, 2) * q(2, 3), q(1, 3));
        assert_eq!(div(&q(1, 2), &q(3, 1)).unwrap(), q(1, 6));
        assert_eq!(div(&one(), &zero()), Err(WeightError::DivisionByZero));
    }

    #[test]
    fn closures_converge_below_one() {
        assert_eq!(star(&q(1, 2)).unwrap(), q(2, 1));
        assert_eq!(plus(&q(1, 2)).unwrap(), q(1, 1));
        assert_eq!(star(&q(-1, 3)).unwrap(), q(3, 4));
        assert!(matches!(star(&one()), Err(WeightError::ClosureDiverges(_))));
        assert!(matches!(
            plus(&q(-7, 3)),
            Err(WeightError::ClosureDiverges(_))
        ));
    }

    #[test]
    fn rendering() {
        assert_eq!(show(&q(3, 1), WeightFormat::Text), "3");
        assert_eq!(show(&q(-3, 4), WeightFormat::Text), "-3/4");
        assert_eq!(show(&q(5, 1), WeightFormat::Json), "5");
        assert_eq!(show(&q(1, 2), WeightFormat::Json), "{\"num\":1,\"den\":2}");
        assert_eq!(show(&q(1, 2), WeightFormat::Latex), "\\frac{1}{2}");
        assert!(is_integral(&q(4, 2)));
        assert!(!is_integral(&q(1, 2)));
    }
}
