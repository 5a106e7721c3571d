//! Elementwise functions of one or more arguments.

use crate::{
    broadcast::{map, zip, zip3},
    error::EvalError,
    special,
    value::Value,
};
use ndarray::ArrayD;
use num_complex::Complex64;
use std::f64::consts::PI;

/// A vectorized function applied elementwise to its broadcast arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Neg,
    Sqrt,
    Cbrt,
    Exp,
    Ln,
    Log10,
    Log2,

    /// `log_b(z)`, with the base first.
    LogBase,
    Sin,
    Cos,
    Tan,
    Cot,
    Sec,
    Csc,
    Asin,
    Acos,
    Atan,

    /// The angle of the point `(x, y)`, taking `y` first like C's `atan2`.
    Atan2,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Abs,
    Sign,
    Floor,
    Ceil,

    /// Rounds to the nearest integer, ties to even.
    Round,

    /// `m - n floor(m / n)`, which has the sign of `n`.
    Mod,
    Re,
    Im,
    Arg,
    Conj,
    Gamma,

    /// The upper incomplete gamma function `Γ(a, x)`.
    GammaUpper,
    Erf,

    /// Kummer's confluent hypergeometric function `₁F₁(a; b; z)`.
    Hyp1f1,
    Not,
}

impl Primitive {
    /// The name of the primitive, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Neg => "neg",
            Self::Sqrt => "sqrt",
            Self::Cbrt => "cbrt",
            Self::Exp => "exp",
            Self::Ln => "ln",
            Self::Log10 => "log10",
            Self::Log2 => "log2",
            Self::LogBase => "log",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Cot => "cot",
            Self::Sec => "sec",
            Self::Csc => "csc",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Atan2 => "atan2",
            Self::Sinh => "sinh",
            Self::Cosh => "cosh",
            Self::Tanh => "tanh",
            Self::Asinh => "asinh",
            Self::Acosh => "acosh",
            Self::Atanh => "atanh",
            Self::Abs => "abs",
            Self::Sign => "sign",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::Round => "round",
            Self::Mod => "mod",
            Self::Re => "re",
            Self::Im => "im",
            Self::Arg => "arg",
            Self::Conj => "conj",
            Self::Gamma => "gamma",
            Self::GammaUpper => "gamma_upper",
            Self::Erf => "erf",
            Self::Hyp1f1 => "hyp1f1",
            Self::Not => "not",
        }
    }

    /// The number of arguments the primitive takes.
    pub fn arity(&self) -> usize {
        match self {
            Self::LogBase | Self::Atan2 | Self::Mod | Self::GammaUpper => 2,
            Self::Hyp1f1 => 3,
            _ => 1,
        }
    }

    /// Applies the primitive to its arguments. The caller guarantees `args.len()` matches
    /// [`Primitive::arity`].
    pub fn apply(&self, args: Vec<Value>) -> Result<Value, EvalError> {
        debug_assert_eq!(args.len(), self.arity());
        if *self == Self::Not {
            return match &args[0] {
                Value::Boolean(a) => Ok(Value::Boolean(map(a, |b| !b))),
                other => Err(other.invalid(self.name())),
            };
        }

        for arg in &args {
            if matches!(arg, Value::Unit | Value::Boolean(_)) {
                return Err(arg.invalid(self.name()));
            }
        }

        if args.iter().all(|arg| matches!(arg, Value::Real(_))) {
            self.apply_real(args)
        } else {
            let args = args
                .iter()
                .map(|arg| arg.to_complex(self.name()))
                .collect::<Result<Vec<_>, _>>()?;
            self.apply_complex(&args)
        }
    }

    fn apply_real(&self, args: Vec<Value>) -> Result<Value, EvalError> {
        let arrays = args
            .into_iter()
            .map(|arg| match arg {
                Value::Real(a) => a,
                _ => unreachable!(),
            })
            .collect::<Vec<_>>();

        let unary = |f: fn(f64) -> f64| Value::Real(map(&arrays[0], |&x| f(x)));
        let binary = |f: fn(f64, f64) -> f64| -> Result<Value, EvalError> {
            Ok(Value::Real(zip(&arrays[0], &arrays[1], |&x, &y| f(x, y))?))
        };

        Ok(match self {
            Self::Neg => unary(|x| -x),
            Self::Sqrt => unary(f64::sqrt),
            Self::Cbrt => unary(f64::cbrt),
            Self::Exp => unary(f64::exp),
            Self::Ln => unary(f64::ln),
            Self::Log10 => unary(f64::log10),
            Self::Log2 => unary(f64::log2),
            Self::LogBase => binary(|b, z| z.ln() / b.ln())?,
            Self::Sin => unary(f64::sin),
            Self::Cos => unary(f64::cos),
            Self::Tan => unary(f64::tan),
            Self::Cot => unary(|x| x.tan().recip()),
            Self::Sec => unary(|x| x.cos().recip()),
            Self::Csc => unary(|x| x.sin().recip()),
            Self::Asin => unary(f64::asin),
            Self::Acos => unary(f64::acos),
            Self::Atan => unary(f64::atan),
            Self::Atan2 => binary(f64::atan2)?,
            Self::Sinh => unary(f64::sinh),
            Self::Cosh => unary(f64::cosh),
            Self::Tanh => unary(f64::tanh),
            Self::Asinh => unary(f64::asinh),
            Self::Acosh => unary(f64::acosh),
            Self::Atanh => unary(f64::atanh),
            Self::Abs => unary(f64::abs),
            Self::Sign => unary(|x| if x == 0.0 { 0.0 } else { x.signum() }),
            Self::Floor => unary(f64::floor),
            Self::Ceil => unary(f64::ceil),
            Self::Round => unary(f64::round_ties_even),
            Self::Mod => binary(|m, n| m - n * (m / n).floor())?,
            Self::Re | Self::Conj => unary(|x| x),
            Self::Im => unary(|x| if x.is_nan() { x } else { 0.0 }),
            Self::Arg => unary(|x| if x < 0.0 { PI } else if x >= 0.0 { 0.0 } else { x }),
            Self::Gamma => unary(statrs::function::gamma::gamma),
            Self::GammaUpper => binary(special::gamma_upper)?,
            Self::Erf => unary(statrs::function::erf::erf),
            Self::Hyp1f1 => Value::Real(zip3(&arrays[0], &arrays[1], &arrays[2], |&a, &b, &x| {
                special::hyp1f1(a.into(), b.into(), x.into()).re
            })?),
            Self::Not => unreachable!(),
        })
    }

    fn apply_complex(&self, args: &[ArrayD<Complex64>]) -> Result<Value, EvalError> {
        type C = Complex64;
        let unary = |f: fn(C) -> C| Value::Complex(map(&args[0], |&z| f(z)));
        let to_real = |f: fn(C) -> f64| Value::Real(map(&args[0], |&z| f(z)));
        let binary = |f: fn(C, C) -> C| -> Result<Value, EvalError> {
            Ok(Value::Complex(zip(&args[0], &args[1], |&a, &b| f(a, b))?))
        };

        Ok(match self {
            Self::Neg => unary(|z| -z),
            Self::Sqrt => unary(C::sqrt),
            Self::Cbrt => unary(C::cbrt),
            Self::Exp => unary(C::exp),
            Self::Ln => unary(C::ln),
            Self::Log10 => unary(C::log10),
            Self::Log2 => unary(C::log2),
            Self::LogBase => binary(|b, z| z.ln() / b.ln())?,
            Self::Sin => unary(C::sin),
            Self::Cos => unary(C::cos),
            Self::Tan => unary(C::tan),
            Self::Cot => unary(|z| z.tan().inv()),
            Self::Sec => unary(|z| z.cos().inv()),
            Self::Csc => unary(|z| z.sin().inv()),
            Self::Asin => unary(C::asin),
            Self::Acos => unary(C::acos),
            Self::Atan => unary(C::atan),
            Self::Atan2 => binary(complex_atan2)?,
            Self::Sinh => unary(C::sinh),
            Self::Cosh => unary(C::cosh),
            Self::Tanh => unary(C::tanh),
            Self::Asinh => unary(C::asinh),
            Self::Acosh => unary(C::acosh),
            Self::Atanh => unary(C::atanh),
            Self::Abs => to_real(C::norm),
            Self::Sign => unary(|z| if z == C::new(0.0, 0.0) { z } else { z / z.norm() }),
            Self::Floor => unary(|z| C::new(z.re.floor(), z.im.floor())),
            Self::Ceil => unary(|z| C::new(z.re.ceil(), z.im.ceil())),
            Self::Round => unary(|z| C::new(z.re.round_ties_even(), z.im.round_ties_even())),
            Self::Mod => binary(|m, n| {
                let q = m / n;
                m - n * C::new(q.re.floor(), q.im.floor())
            })?,
            Self::Re => to_real(|z| z.re),
            Self::Im => to_real(|z| z.im),
            Self::Arg => to_real(C::arg),
            Self::Conj => unary(|z| z.conj()),
            Self::Gamma => unary(special::gamma),
            Self::GammaUpper => binary(|a, x| {
                if a.im == 0.0 && x.im == 0.0 {
                    C::new(special::gamma_upper(a.re, x.re), 0.0)
                } else {
                    C::new(f64::NAN, f64::NAN)
                }
            })?,
            Self::Erf => unary(special::erf),
            Self::Hyp1f1 => Value::Complex(zip3(&args[0], &args[1], &args[2], |&a, &b, &z| {
                special::hyp1f1(a, b, z)
            })?),
            Self::Not => unreachable!(),
        })
    }
}

/// The angle of the complex point `x + iy`, `-i log((x + iy) / √(x² + y²))`, taking `y` first.
fn complex_atan2(y: Complex64, x: Complex64) -> Complex64 {
    let i = Complex64::new(0.0, 1.0);
    -i * ((x + i * y) / (x * x + y * y).sqrt()).ln()
}
