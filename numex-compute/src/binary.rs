//! Elementwise binary operators.

use crate::{broadcast::{map, zip}, error::EvalError, value::Value};
use ndarray::ArrayD;
use num_complex::Complex64;
use std::borrow::Cow;

/// A binary operator applied elementwise to two broadcast operands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Min,
    Max,
    Greater,
    Less,
    GreaterEq,
    LessEq,
    Eq,
    NotEq,
    And,
    Or,
}

impl BinOp {
    /// The name of the operator, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
            Self::Min => "min",
            Self::Max => "max",
            Self::Greater => ">",
            Self::Less => "<",
            Self::GreaterEq => ">=",
            Self::LessEq => "<=",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }

    /// Returns true if the operator produces booleans.
    pub fn is_predicate(&self) -> bool {
        matches!(
            self,
            Self::Greater | Self::Less | Self::GreaterEq | Self::LessEq
                | Self::Eq | Self::NotEq | Self::And | Self::Or
        )
    }

    /// Applies the operator to the given operands.
    pub fn apply(&self, left: &Value, right: &Value) -> Result<Value, EvalError> {
        match self {
            Self::And | Self::Or => self.logical(left, right),
            Self::Eq | Self::NotEq => self.equality(left, right),
            Self::Greater | Self::Less | Self::GreaterEq | Self::LessEq | Self::Min | Self::Max => {
                self.ordered(left, right)
            },
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Pow => {
                self.arithmetic(left, right)
            },
        }
    }

    fn logical(&self, left: &Value, right: &Value) -> Result<Value, EvalError> {
        let (Value::Boolean(a), Value::Boolean(b)) = (left, right) else {
            let culprit = if matches!(left, Value::Boolean(_)) { right } else { left };
            return Err(culprit.invalid(self.name()));
        };

        let out = match self {
            Self::And => zip(a, b, |&x, &y| x && y)?,
            _ => zip(a, b, |&x, &y| x || y)?,
        };
        Ok(Value::Boolean(out))
    }

    fn equality(&self, left: &Value, right: &Value) -> Result<Value, EvalError> {
        let eq = *self == Self::Eq;
        let out = match (left, right) {
            (Value::Boolean(a), Value::Boolean(b)) => zip(a, b, |x, y| (x == y) == eq)?,
            (Value::Real(a), Value::Real(b)) => zip(a, b, |x, y| (x == y) == eq)?,
            (Value::Boolean(_) | Value::Unit, _) => return Err(left.invalid(self.name())),
            (_, Value::Boolean(_) | Value::Unit) => return Err(right.invalid(self.name())),
            _ => {
                let a = left.to_complex(self.name())?;
                let b = right.to_complex(self.name())?;
                zip(&a, &b, |x, y| (x == y) == eq)?
            },
        };
        Ok(Value::Boolean(out))
    }

    fn ordered(&self, left: &Value, right: &Value) -> Result<Value, EvalError> {
        let a = self.real_operand(left)?;
        let b = self.real_operand(right)?;
        let (a, b) = (&*a, &*b);

        Ok(match self {
            Self::Greater => Value::Boolean(zip(a, b, |x, y| x > y)?),
            Self::Less => Value::Boolean(zip(a, b, |x, y| x < y)?),
            Self::GreaterEq => Value::Boolean(zip(a, b, |x, y| x >= y)?),
            Self::LessEq => Value::Boolean(zip(a, b, |x, y| x <= y)?),
            Self::Min => Value::Real(zip(a, b, |&x, &y| if x.is_nan() || y.is_nan() {
                f64::NAN
            } else {
                x.min(y)
            })?),
            _ => Value::Real(zip(a, b, |&x, &y| if x.is_nan() || y.is_nan() {
                f64::NAN
            } else {
                x.max(y)
            })?),
        })
    }

    /// Complex operands can be ordered only if they have no imaginary part.
    fn real_operand<'a>(&self, value: &'a Value) -> Result<Cow<'a, ArrayD<f64>>, EvalError> {
        match value {
            Value::Real(a) => Ok(Cow::Borrowed(a)),
            Value::Complex(a) if a.iter().all(|z| z.im == 0.0) => Ok(Cow::Owned(map(a, |z| z.re))),
            other => Err(other.invalid(self.name())),
        }
    }

    fn arithmetic(&self, left: &Value, right: &Value) -> Result<Value, EvalError> {
        if let (Value::Real(a), Value::Real(b)) = (left, right) {
            let out = match self {
                Self::Add => zip(a, b, |x, y| x + y)?,
                Self::Sub => zip(a, b, |x, y| x - y)?,
                Self::Mul => zip(a, b, |x, y| x * y)?,
                Self::Div => zip(a, b, |x, y| x / y)?,
                _ => zip(a, b, |x, y| x.powf(*y))?,
            };
            return Ok(Value::Real(out));
        }

        let a = left.to_complex(self.name())?;
        let b = right.to_complex(self.name())?;
        let out = match self {
            Self::Add => zip(&a, &b, |x, y| x + y)?,
            Self::Sub => zip(&a, &b, |x, y| x - y)?,
            Self::Mul => zip(&a, &b, |x, y| x * y)?,
            Self::Div => zip(&a, &b, |x, y| x / y)?,
            _ => zip(&a, &b, |&x, &y| complex_pow(x, y))?,
        };
        Ok(Value::Complex(out))
    }
}

/// Raises `z` to the power `w`, using repeated multiplication for integer exponents.
fn complex_pow(z: Complex64, w: Complex64) -> Complex64 {
    let zero = Complex64::new(0.0, 0.0);
    if z == zero {
        return if w == zero {
            Complex64::new(1.0, 0.0)
        } else if w.re > 0.0 {
            zero
        } else {
            Complex64::new(f64::NAN, f64::NAN)
        };
    }

    if w.im == 0.0 && w.re.fract() == 0.0 && w.re.abs() <= i32::MAX as f64 {
        z.powi(w.re as i32)
    } else {
        z.powc(w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InvalidOperand, ShapeMismatch};
    use ndarray::{arr1, arr2};
    use pretty_assertions::assert_eq;

    fn reals(xs: &[f64]) -> Value {
        Value::from(arr1(xs).into_dyn())
    }

    #[test]
    fn broadcast_scalar_and_array() {
        let out = BinOp::Mul.apply(&reals(&[1.0, 2.0, 3.0]), &Value::from(2.0)).unwrap();
        assert_eq!(out, reals(&[2.0, 4.0, 6.0]));
    }

    #[test]
    fn broadcast_row_and_column() {
        let column = Value::from(arr2(&[[1.0], [2.0]]).into_dyn());
        let row = reals(&[10.0, 20.0, 30.0]);
        let out = BinOp::Add.apply(&column, &row).unwrap();
        assert_eq!(out, Value::from(arr2(&[[11.0, 21.0, 31.0], [12.0, 22.0, 32.0]]).into_dyn()));
    }

    #[test]
    fn incompatible_shapes() {
        let err = BinOp::Add.apply(&reals(&[1.0, 2.0]), &reals(&[1.0, 2.0, 3.0])).unwrap_err();
        assert_eq!(err, EvalError::ShapeMismatch(ShapeMismatch {
            left: vec![2],
            right: vec![3],
        }));
    }

    #[test]
    fn real_power_of_negative_base() {
        let out = BinOp::Pow.apply(&Value::from(-8.0), &Value::from(1.0 / 3.0)).unwrap();
        assert!(out.as_real_scalar().unwrap().is_nan());
        let out = BinOp::Pow.apply(&Value::from(-2.0), &Value::from(3.0)).unwrap();
        assert_eq!(out, Value::from(-8.0));
    }

    #[test]
    fn complex_power() {
        let i = Value::from(Complex64::new(0.0, 1.0));
        assert_eq!(BinOp::Pow.apply(&i, &Value::from(2.0)).unwrap(), Value::from(Complex64::new(-1.0, 0.0)));

        let zero = Value::from(Complex64::new(0.0, 0.0));
        assert_eq!(BinOp::Pow.apply(&zero, &Value::from(0.0)).unwrap(), Value::from(Complex64::new(1.0, 0.0)));
        assert_eq!(BinOp::Pow.apply(&zero, &Value::from(2.5)).unwrap(), Value::from(Complex64::new(0.0, 0.0)));
    }

    #[test]
    fn comparisons() {
        let out = BinOp::Greater.apply(&reals(&[1.0, 2.0, 3.0]), &Value::from(2.0)).unwrap();
        assert_eq!(out, Value::from(arr1(&[false, false, true]).into_dyn()));

        let out = BinOp::Eq.apply(&Value::from(Complex64::new(2.0, 0.0)), &Value::from(2.0)).unwrap();
        assert_eq!(out, Value::from(true));

        let out = BinOp::LessEq.apply(&Value::from(Complex64::new(1.0, 0.0)), &Value::from(2.0)).unwrap();
        assert_eq!(out, Value::from(true));
    }

    #[test]
    fn complex_values_are_unordered() {
        let err = BinOp::Less.apply(&Value::from(Complex64::new(1.0, 1.0)), &Value::from(2.0)).unwrap_err();
        assert_eq!(err, EvalError::InvalidOperand(InvalidOperand { op: "<", typename: "Complex" }));
    }

    #[test]
    fn min_max_propagate_nan() {
        let out = BinOp::Min.apply(&reals(&[1.0, f64::NAN]), &Value::from(0.5)).unwrap();
        let Value::Real(out) = out else { panic!("expected reals") };
        assert_eq!(out[0], 0.5);
        assert!(out[1].is_nan());
    }

    #[test]
    fn logic_requires_booleans() {
        let out = BinOp::Or.apply(&Value::from(arr1(&[true, false]).into_dyn()), &Value::from(false)).unwrap();
        assert_eq!(out, Value::from(arr1(&[true, false]).into_dyn()));

        let err = BinOp::And.apply(&Value::from(true), &Value::from(1.0)).unwrap_err();
        assert_eq!(err, EvalError::InvalidOperand(InvalidOperand { op: "&&", typename: "Real" }));

        let err = BinOp::Add.apply(&Value::from(true), &Value::from(1.0)).unwrap_err();
        assert_eq!(err, EvalError::InvalidOperand(InvalidOperand { op: "+", typename: "Boolean" }));
    }
}
