use crate::{
    broadcast::{broadcast_shape, broadcast_to, map, zip3},
    error::{EvalError, InvalidOperand},
};
use ndarray::{ArrayD, IxDyn};
use num_complex::Complex64;
use numex_expr::{Atom, NumericArray};

/// Creates a rank-0 array holding the given value.
pub fn scalar<T: Clone>(value: T) -> ArrayD<T> {
    ArrayD::from_elem(IxDyn(&[]), value)
}

/// A value produced by a compiled expression.
///
/// Scalars are rank-0 arrays, so a value's shape alone decides how it broadcasts.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The unit type, produced by loops and `Null`.
    Unit,

    /// Booleans, produced by comparisons and logical operators.
    Boolean(ArrayD<bool>),

    /// Real numbers.
    Real(ArrayD<f64>),

    /// Complex numbers.
    Complex(ArrayD<Complex64>),
}

impl Value {
    /// Returns the typename of this value.
    pub fn typename(&self) -> &'static str {
        match self {
            Value::Unit => "Unit",
            Value::Boolean(_) => "Boolean",
            Value::Real(_) => "Real",
            Value::Complex(_) => "Complex",
        }
    }

    /// The shape of the value. [`Value::Unit`] has the shape of a scalar.
    pub fn shape(&self) -> &[usize] {
        match self {
            Value::Unit => &[],
            Value::Boolean(a) => a.shape(),
            Value::Real(a) => a.shape(),
            Value::Complex(a) => a.shape(),
        }
    }

    /// Returns true if the value is a rank-0 array.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Unit) && self.shape().is_empty()
    }

    /// Returns the value as a real number if it is a real scalar.
    pub fn as_real_scalar(&self) -> Option<f64> {
        match self {
            Value::Real(a) if a.ndim() == 0 => a.first().copied(),
            _ => None,
        }
    }

    /// Returns the value as a boolean if it is a boolean scalar.
    pub fn as_bool_scalar(&self) -> Option<bool> {
        match self {
            Value::Boolean(a) if a.ndim() == 0 => a.first().copied(),
            _ => None,
        }
    }

    /// Consumes the value and promotes real numbers to complex numbers. Other values are
    /// returned unchanged.
    pub fn coerce_complex(self) -> Self {
        match self {
            Value::Real(a) => Value::Complex(map(&a, |&x| Complex64::new(x, 0.0))),
            other => other,
        }
    }

    /// Consumes the value and keeps only the real part of complex numbers. Other values are
    /// returned unchanged.
    pub fn real_part(self) -> Self {
        match self {
            Value::Complex(a) => Value::Real(map(&a, |z| z.re)),
            other => other,
        }
    }

    /// Returns the value as a complex array, promoting reals. Fails for booleans and units.
    pub fn to_complex(&self, op: &'static str) -> Result<ArrayD<Complex64>, EvalError> {
        match self {
            Value::Real(a) => Ok(map(a, |&x| Complex64::new(x, 0.0))),
            Value::Complex(a) => Ok(a.clone()),
            other => Err(other.invalid(op)),
        }
    }

    /// Builds the error for using this value as an operand of `op`.
    pub fn invalid(&self, op: &'static str) -> EvalError {
        InvalidOperand {
            op,
            typename: self.typename(),
        }.into()
    }

    /// Converts a numeric atom into a scalar value. Returns [`None`] for strings.
    pub fn from_atom(atom: &Atom) -> Option<Self> {
        match atom {
            Atom::Complex(z) => Some(Value::Complex(scalar(*z))),
            other => other.to_f64().map(|x| Value::Real(scalar(x))),
        }
    }

    /// Converts a numeric array into a value. Integer and real arrays become real values.
    pub fn from_numeric_array(array: &NumericArray) -> Self {
        match array {
            NumericArray::Integer8(a) => Value::Real(a.mapv(f64::from)),
            NumericArray::Integer16(a) => Value::Real(a.mapv(f64::from)),
            NumericArray::Integer32(a) => Value::Real(a.mapv(f64::from)),
            NumericArray::Integer64(a) => Value::Real(a.mapv(|x| x as f64)),
            NumericArray::UnsignedInteger8(a) => Value::Real(a.mapv(f64::from)),
            NumericArray::UnsignedInteger16(a) => Value::Real(a.mapv(f64::from)),
            NumericArray::UnsignedInteger32(a) => Value::Real(a.mapv(f64::from)),
            NumericArray::UnsignedInteger64(a) => Value::Real(a.mapv(|x| x as f64)),
            NumericArray::Real32(a) => Value::Real(a.mapv(f64::from)),
            NumericArray::Real64(a) => Value::Real(a.clone()),
            NumericArray::ComplexReal32(a) => {
                Value::Complex(a.mapv(|z| Complex64::new(z.re.into(), z.im.into())))
            },
            NumericArray::ComplexReal64(a) => Value::Complex(a.clone()),
            NumericArray::Boolean(a) => Value::Boolean(a.clone()),
        }
    }

    /// Converts the value into a numeric array. Returns [`None`] for [`Value::Unit`].
    pub fn into_numeric_array(self) -> Option<NumericArray> {
        match self {
            Value::Unit => None,
            Value::Boolean(a) => Some(NumericArray::Boolean(a)),
            Value::Real(a) => Some(NumericArray::Real64(a)),
            Value::Complex(a) => Some(NumericArray::ComplexReal64(a)),
        }
    }

    /// Stacks values along a new leading axis, after broadcasting them to a common shape.
    ///
    /// Reals are promoted to complex if any value is complex. Booleans can only be stacked with
    /// booleans. Stacking nothing gives an empty real array.
    pub fn stack(values: Vec<Value>) -> Result<Value, EvalError> {
        let mut shape = Vec::new();
        for value in &values {
            if matches!(value, Value::Unit) {
                return Err(value.invalid("List"));
            }
            shape = broadcast_shape(&shape, value.shape())?;
        }

        let all_bool = !values.is_empty() && values.iter().all(|v| matches!(v, Value::Boolean(_)));
        let any_bool = values.iter().any(|v| matches!(v, Value::Boolean(_)));
        let any_complex = values.iter().any(|v| matches!(v, Value::Complex(_)));

        if all_bool {
            let arrays = values
                .into_iter()
                .map(|v| match v {
                    Value::Boolean(a) => broadcast_to(&a, &shape),
                    _ => unreachable!(),
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Value::Boolean(stack_arrays(arrays, &shape)));
        }

        if any_bool {
            return Err(InvalidOperand { op: "List", typename: "Boolean" }.into());
        }

        if any_complex {
            let arrays = values
                .iter()
                .map(|v| v.to_complex("List").and_then(|a| Ok(broadcast_to(&a, &shape)?)))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Value::Complex(stack_arrays(arrays, &shape)));
        }

        let arrays = values
            .into_iter()
            .map(|v| match v {
                Value::Real(a) => broadcast_to(&a, &shape),
                _ => unreachable!(),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::Real(stack_arrays(arrays, &shape)))
    }

    /// Selects elementwise between `then` and `otherwise` depending on the boolean `cond`.
    pub fn select(cond: &Value, then: Value, otherwise: Value) -> Result<Value, EvalError> {
        let Value::Boolean(cond) = cond else {
            return Err(cond.invalid("If"));
        };

        match (then, otherwise) {
            (Value::Boolean(a), Value::Boolean(b)) => {
                Ok(Value::Boolean(zip3(cond, &a, &b, |c, x, y| if *c { *x } else { *y })?))
            },
            (Value::Real(a), Value::Real(b)) => {
                Ok(Value::Real(zip3(cond, &a, &b, |c, x, y| if *c { *x } else { *y })?))
            },
            (a, b) => {
                let a = a.to_complex("If")?;
                let b = b.to_complex("If")?;
                Ok(Value::Complex(zip3(cond, &a, &b, |c, x, y| if *c { *x } else { *y })?))
            },
        }
    }
}

/// Stacks arrays of identical shape along a new leading axis.
fn stack_arrays<T: Clone>(arrays: Vec<ArrayD<T>>, shape: &[usize]) -> ArrayD<T> {
    let mut full = vec![arrays.len()];
    full.extend_from_slice(shape);
    let mut data = Vec::with_capacity(arrays.iter().map(ArrayD::len).sum());
    for array in &arrays {
        data.extend(array.iter().cloned());
    }
    ArrayD::from_shape_vec(IxDyn(&full), data)
        .unwrap_or_else(|_| unreachable!("every array was broadcast to the same shape"))
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Real(scalar(x))
    }
}

impl From<Complex64> for Value {
    fn from(z: Complex64) -> Self {
        Value::Complex(scalar(z))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(scalar(b))
    }
}

impl From<ArrayD<f64>> for Value {
    fn from(a: ArrayD<f64>) -> Self {
        Value::Real(a)
    }
}

impl From<ArrayD<Complex64>> for Value {
    fn from(a: ArrayD<Complex64>) -> Self {
        Value::Complex(a)
    }
}

impl From<ArrayD<bool>> for Value {
    fn from(a: ArrayD<bool>) -> Self {
        Value::Boolean(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShapeMismatch;
    use ndarray::{arr1, arr2};
    use pretty_assertions::assert_eq;
    use rug::Rational;

    #[test]
    fn scalars() {
        let x = Value::from(2.5);
        assert!(x.is_scalar());
        assert_eq!(x.as_real_scalar(), Some(2.5));
        assert_eq!(Value::from(true).as_bool_scalar(), Some(true));
        assert!(!Value::Unit.is_scalar());
        assert_eq!(Value::from(arr1(&[1.0]).into_dyn()).as_real_scalar(), None);
    }

    #[test]
    fn atoms() {
        let half = Atom::Rational(Rational::from((1, 2)));
        assert_eq!(Value::from_atom(&half), Some(Value::from(0.5)));
        assert_eq!(Value::from_atom(&Atom::from(3i64)), Some(Value::from(3.0)));
        assert_eq!(
            Value::from_atom(&Atom::Complex(Complex64::new(0.0, 1.0))),
            Some(Value::from(Complex64::new(0.0, 1.0))),
        );
        assert_eq!(Value::from_atom(&Atom::String("s".to_string())), None);
    }

    #[test]
    fn numeric_arrays() {
        let ints = NumericArray::Integer32(arr1(&[1, -2]).into_dyn());
        assert_eq!(Value::from_numeric_array(&ints), Value::from(arr1(&[1.0, -2.0]).into_dyn()));

        let value = Value::from(arr2(&[[1.0, 2.0]]).into_dyn());
        let array = value.into_numeric_array().unwrap();
        assert_eq!(array.shape(), &[1, 2]);
        assert_eq!(Value::Unit.into_numeric_array(), None);
    }

    #[test]
    fn stack_broadcasts_and_promotes() {
        let xs = Value::from(arr1(&[1.0, 2.0]).into_dyn());
        let z = Value::from(Complex64::new(0.0, 1.0));
        let stacked = Value::stack(vec![xs, z]).unwrap();
        let Value::Complex(a) = stacked else { panic!("expected complex") };
        assert_eq!(a.shape(), &[2, 2]);
        assert_eq!(a[[1, 0]], Complex64::new(0.0, 1.0));
        assert_eq!(a[[0, 1]], Complex64::new(2.0, 0.0));
    }

    #[test]
    fn stack_empty_and_errors() {
        let empty = Value::stack(vec![]).unwrap();
        assert_eq!(empty.shape(), &[0]);

        let err = Value::stack(vec![Value::from(1.0), Value::from(true)]).unwrap_err();
        assert_eq!(err, EvalError::InvalidOperand(InvalidOperand { op: "List", typename: "Boolean" }));

        let a = Value::from(arr1(&[1.0, 2.0]).into_dyn());
        let b = Value::from(arr1(&[1.0, 2.0, 3.0]).into_dyn());
        assert!(matches!(Value::stack(vec![a, b]), Err(EvalError::ShapeMismatch(ShapeMismatch { .. }))));
    }

    #[test]
    fn select() {
        let cond = Value::from(arr1(&[true, false]).into_dyn());
        let picked = Value::select(&cond, Value::from(1.0), Value::from(arr1(&[5.0, 6.0]).into_dyn())).unwrap();
        assert_eq!(picked, Value::from(arr1(&[1.0, 6.0]).into_dyn()));

        let err = Value::select(&Value::from(1.0), Value::from(1.0), Value::from(2.0)).unwrap_err();
        assert_eq!(err, EvalError::InvalidOperand(InvalidOperand { op: "If", typename: "Real" }));
    }
}
