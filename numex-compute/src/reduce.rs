use crate::{binary::BinOp, error::EvalError, value::Value};

/// A fold of any number of operands with an associative binary operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reduction {
    Sum,
    Product,
    Min,
    Max,
    All,
    Any,
}

impl Reduction {
    /// The binary operator used to combine two operands.
    pub fn op(&self) -> BinOp {
        match self {
            Self::Sum => BinOp::Add,
            Self::Product => BinOp::Mul,
            Self::Min => BinOp::Min,
            Self::Max => BinOp::Max,
            Self::All => BinOp::And,
            Self::Any => BinOp::Or,
        }
    }

    /// The value of the reduction over zero operands.
    pub fn identity(&self) -> Value {
        match self {
            Self::Sum => Value::from(0.0),
            Self::Product => Value::from(1.0),
            Self::Min => Value::from(f64::INFINITY),
            Self::Max => Value::from(f64::NEG_INFINITY),
            Self::All => Value::from(true),
            Self::Any => Value::from(false),
        }
    }

    /// Folds the operands from left to right.
    pub fn apply(&self, operands: Vec<Value>) -> Result<Value, EvalError> {
        let op = self.op();
        let mut operands = operands.into_iter();
        let Some(first) = operands.next() else {
            return Ok(self.identity());
        };

        // a single operand still goes through the operator, so `Plus[True]` fails like
        // `True + 0` would
        let mut acc = match operands.next() {
            Some(second) => op.apply(&first, &second)?,
            None => op.apply(&first, &self.identity())?,
        };
        for operand in operands {
            acc = op.apply(&acc, &operand)?;
        }
        Ok(acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvalidOperand;
    use ndarray::arr1;
    use num_complex::Complex64;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_gives_identity() {
        assert_eq!(Reduction::Sum.apply(vec![]).unwrap(), Value::from(0.0));
        assert_eq!(Reduction::Product.apply(vec![]).unwrap(), Value::from(1.0));
        assert_eq!(Reduction::Min.apply(vec![]).unwrap(), Value::from(f64::INFINITY));
        assert_eq!(Reduction::Max.apply(vec![]).unwrap(), Value::from(f64::NEG_INFINITY));
        assert_eq!(Reduction::All.apply(vec![]).unwrap(), Value::from(true));
        assert_eq!(Reduction::Any.apply(vec![]).unwrap(), Value::from(false));
    }

    #[test]
    fn fold_broadcasts() {
        let out = Reduction::Sum.apply(vec![
            Value::from(1.0),
            Value::from(arr1(&[1.0, 2.0]).into_dyn()),
            Value::from(Complex64::new(0.0, 1.0)),
        ]).unwrap();
        assert_eq!(out, Value::from(arr1(&[
            Complex64::new(2.0, 1.0),
            Complex64::new(3.0, 1.0),
        ]).into_dyn()));
    }

    #[test]
    fn single_operand() {
        assert_eq!(Reduction::Max.apply(vec![Value::from(-3.0)]).unwrap(), Value::from(-3.0));
        let err = Reduction::Product.apply(vec![Value::from(true)]).unwrap_err();
        assert_eq!(err, EvalError::InvalidOperand(InvalidOperand { op: "*", typename: "Boolean" }));
    }
}
