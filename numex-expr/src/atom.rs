use num_complex::Complex64;
use rug::{Integer, Rational};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A leaf of an expression tree that is not a symbol.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Atom {
    /// An exact integer of arbitrary size.
    Integer(Integer),

    /// An exact rational number, such as the `1/2` in `x^(1/2)`.
    Rational(Rational),

    /// A machine-precision real number.
    Real(f64),

    /// A machine-precision complex number.
    Complex(Complex64),

    /// A string literal.
    String(String),
}

impl Atom {
    /// Returns the type name of the atom, used in error messages.
    pub fn typename(&self) -> &'static str {
        match self {
            Self::Integer(_) => "Integer",
            Self::Rational(_) => "Rational",
            Self::Real(_) => "Real",
            Self::Complex(_) => "Complex",
            Self::String(_) => "String",
        }
    }

    /// Returns true if the atom is a number.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::String(_))
    }

    /// Converts the atom to a machine real, if it is a real number.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(n.to_f64()),
            Self::Rational(q) => Some(q.to_f64()),
            Self::Real(x) => Some(*x),
            Self::Complex(_) | Self::String(_) => None,
        }
    }

    /// Converts the atom to a machine complex number, if it is a number.
    pub fn to_complex(&self) -> Option<Complex64> {
        match self {
            Self::Complex(z) => Some(*z),
            other => other.to_f64().map(|x| Complex64::new(x, 0.0)),
        }
    }

    /// Returns true if the atom is exactly one half, either as the rational `1/2` or the real
    /// `0.5`.
    pub fn is_one_half(&self) -> bool {
        match self {
            Self::Rational(q) => *q.numer() == 1 && *q.denom() == 2,
            Self::Real(x) => *x == 0.5,
            _ => false,
        }
    }
}

/// Writes a machine real the way FullForm does: integral values keep a trailing `.`.
pub(crate) fn write_real(f: &mut impl fmt::Write, x: f64) -> fmt::Result {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
        write!(f, "{}.", x)
    } else if x.is_nan() {
        write!(f, "Indeterminate")
    } else if x.is_infinite() {
        if x > 0.0 {
            write!(f, "DirectedInfinity[1]")
        } else {
            write!(f, "DirectedInfinity[-1]")
        }
    } else {
        write!(f, "{}", x)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{}", n),
            Self::Rational(q) => write!(f, "Rational[{}, {}]", q.numer(), q.denom()),
            Self::Real(x) => write_real(f, *x),
            Self::Complex(z) => {
                write!(f, "Complex[")?;
                write_real(f, z.re)?;
                write!(f, ", ")?;
                write_real(f, z.im)?;
                write!(f, "]")
            },
            Self::String(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<i64> for Atom {
    fn from(n: i64) -> Self {
        Self::Integer(Integer::from(n))
    }
}

impl From<f64> for Atom {
    fn from(x: f64) -> Self {
        Self::Real(x)
    }
}

impl From<Complex64> for Atom {
    fn from(z: Complex64) -> Self {
        Self::Complex(z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_half() {
        assert!(Atom::Rational(Rational::from((1, 2))).is_one_half());
        assert!(Atom::Rational(Rational::from((2, 4))).is_one_half());
        assert!(Atom::Real(0.5).is_one_half());
        assert!(!Atom::Rational(Rational::from((1, 3))).is_one_half());
        assert!(!Atom::Integer(Integer::from(2)).is_one_half());
    }

    #[test]
    fn conversions() {
        assert_eq!(Atom::from(3i64).to_f64(), Some(3.0));
        assert_eq!(Atom::Rational(Rational::from((3, 4))).to_f64(), Some(0.75));
        assert_eq!(Atom::Complex(Complex64::new(1.0, 2.0)).to_f64(), None);
        assert_eq!(Atom::from(2.5).to_complex(), Some(Complex64::new(2.5, 0.0)));
        assert_eq!(Atom::String("a".to_string()).to_complex(), None);
    }

    #[test]
    fn full_form_text() {
        assert_eq!(Atom::from(2.0).to_string(), "2.");
        assert_eq!(Atom::from(0.25).to_string(), "0.25");
        assert_eq!(Atom::Rational(Rational::from((1, 2))).to_string(), "Rational[1, 2]");
        assert_eq!(Atom::Complex(Complex64::new(0.0, 1.0)).to_string(), "Complex[0., 1.]");
        assert_eq!(Atom::String("hi".to_string()).to_string(), "\"hi\"");
    }
}
