use crate::{
    error::{NonRealArgument, UnsupportedConstruct},
    grid::Grid,
};
use ndarray::{ArrayD, Dimension, IxDyn};
use numex_compiler::{
    error::{ArityMismatch, NonNumericLiteral, NonNumericSymbol, UnrecognizedOperator, UnsupportedHypergeometric},
    expr::constant,
    op::{self, Control, Operator, Rule},
    Domain,
};
use numex_compute::{broadcast::{broadcast_shape, broadcast_to}, Primitive, Value};
use numex_error::Error;
use numex_expr::{Expr, SpanTree, Symbol};
use numex_vm::error::UnboundSymbol;
use std::{collections::HashMap, fmt, ops::Range, sync::Arc};
use super::{into_heights, GridEvaluator};

/// A scalar function of real arguments, made available to the interpreter under a name.
#[derive(Clone)]
pub struct Extension {
    /// The number of arguments the function takes.
    pub arity: usize,

    /// The function, applied to every point of the broadcast arguments.
    pub function: Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>,
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension").field("arity", &self.arity).finish_non_exhaustive()
    }
}

/// Walks the expression tree over the whole mesh, without compiling it.
///
/// Only pure expressions can be interpreted: the operators the compiler knows except control
/// flow (`If` is the exception), plus any [`Extension`]s registered by name. Extensions take
/// precedence over built-in operators with the same name.
#[derive(Clone, Debug, Default)]
pub struct InterpretedGridEvaluator {
    /// The numeric domain to evaluate in.
    pub domain: Domain,

    /// Extension functions, keyed by the name of the head they implement.
    pub extensions: HashMap<String, Extension>,
}

impl InterpretedGridEvaluator {
    /// Registers an extension function.
    ///
    /// Returns the evaluator itself to allow chaining.
    pub fn with_extension(
        mut self,
        name: &str,
        arity: usize,
        function: Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>,
    ) -> Self {
        self.extensions.insert(name.to_string(), Extension { arity, function });
        self
    }

    /// Evaluates the expression with the given symbols bound to the given values.
    pub fn interpret(&self, expr: &Expr, bindings: &[(&Symbol, Value)]) -> Result<Value, Error> {
        let full_form = expr.full_form();
        Interpreter { evaluator: self, bindings }.eval(expr, &full_form.spans)
    }
}

impl GridEvaluator for InterpretedGridEvaluator {
    fn evaluate(&self, expr: &Expr, x: &Symbol, y: &Symbol, grid: &Grid) -> Result<ArrayD<f64>, Error> {
        let (xs, ys) = grid.mesh();
        let value = self.interpret(expr, &[(x, xs.into()), (y, ys.into())])?;
        into_heights(value, &grid.shape(), vec![0..expr.to_string().len()])
    }
}

struct Interpreter<'a> {
    evaluator: &'a InterpretedGridEvaluator,
    bindings: &'a [(&'a Symbol, Value)],
}

impl Interpreter<'_> {
    fn lift(&self, value: Value) -> Value {
        match self.evaluator.domain {
            Domain::Real => value,
            Domain::Complex => value.coerce_complex(),
        }
    }

    fn eval(&self, expr: &Expr, spans: &SpanTree) -> Result<Value, Error> {
        let span = || vec![spans.span.clone()];
        match expr {
            Expr::Symbol(symbol) => {
                if let Some((_, value)) = self.bindings.iter().find(|(bound, _)| *bound == symbol) {
                    Ok(self.lift(value.clone()))
                } else if let Some(value) = constant(symbol) {
                    Ok(self.lift(value))
                } else if symbol.is_system() {
                    Err(Error::new(span(), NonNumericSymbol { name: symbol.name().to_string() }))
                } else {
                    Err(Error::new(span(), UnboundSymbol { name: symbol.name().to_string() }))
                }
            },
            Expr::Atom(atom) => Value::from_atom(atom)
                .map(|value| self.lift(value))
                .ok_or_else(|| Error::new(span(), NonNumericLiteral { literal: atom.to_string() })),
            Expr::Bulk(list) => Ok(self.lift(Value::from_numeric_array(list.value()))),
            Expr::Apply(_) => self.apply(expr, spans),
        }
    }

    fn eval_elements(&self, expr: &Expr, spans: &SpanTree) -> Result<Vec<Value>, Error> {
        expr.elements()
            .iter()
            .zip(&spans.children)
            .map(|(element, spans)| self.eval(element, spans))
            .collect()
    }

    fn apply(&self, expr: &Expr, spans: &SpanTree) -> Result<Value, Error> {
        let span = || vec![spans.span.clone()];
        let compute = |result: Result<Value, numex_compute::EvalError>| {
            result.map_err(|err| err.into_error(span()))
        };
        let head = expr.head_symbol();
        let len = expr.elements().len();

        if let Some((name, extension)) = head.and_then(|head| {
            self.evaluator.extensions.get_key_value(head.name())
        }) {
            if extension.arity != len {
                return Err(Error::new(span(), ArityMismatch {
                    name: name.clone(),
                    expected: extension.arity.to_string(),
                    given: len,
                }));
            }
            let args = self.eval_elements(expr, spans)?;
            return apply_extension(name, extension, args, span());
        }

        let Some(operator) = head.and_then(op::lookup) else {
            let name = head.map_or_else(|| expr.to_string(), |head| head.name().to_string());
            return Err(Error::new(vec![spans.head_span(), spans.span.clone()], UnrecognizedOperator {
                suggestions: op::similar(&name),
                name,
            }));
        };

        let rule = operator.rule();
        if !rule.arity().contains(&len) {
            return Err(arity_mismatch(operator, len, span()));
        }

        match rule {
            Rule::Function(overloads) => {
                let overload = overloads
                    .iter()
                    .find(|overload| overload.arity == len)
                    .ok_or_else(|| arity_mismatch(operator, len, span()))?;
                let mut args = self.eval_elements(expr, spans)?;
                if overload.reversed {
                    args.reverse();
                }
                compute(overload.primitive.apply(args))
            },
            Rule::Reduce(reduction) => compute(reduction.apply(self.eval_elements(expr, spans)?)),
            Rule::Infix(bin_op) => {
                let elements = expr.elements();
                let lhs = self.eval(&elements[0], &spans.children[0])?;
                let is_sqrt = operator == Operator::Power
                    && elements[1].as_atom().is_some_and(|atom| atom.is_one_half());
                if is_sqrt {
                    compute(Primitive::Sqrt.apply(vec![lhs]))
                } else {
                    let rhs = self.eval(&elements[1], &spans.children[1])?;
                    compute(bin_op.apply(&lhs, &rhs))
                }
            },
            Rule::Stack => compute(Value::stack(self.eval_elements(expr, spans)?)),
            Rule::Hypergeometric => {
                let elements = expr.elements();
                let (upper, lower) = (&elements[0], &elements[1]);
                let count = |list: &Expr| if list.has_head("List") { list.elements().len() } else { 0 };
                if count(upper) != 1 || count(lower) != 1 {
                    return Err(Error::new(span(), UnsupportedHypergeometric {
                        p: count(upper),
                        q: count(lower),
                    }));
                }
                let args = vec![
                    self.eval(&upper.elements()[0], &spans.children[0].children[0])?,
                    self.eval(&lower.elements()[0], &spans.children[1].children[0])?,
                    self.eval(&elements[2], &spans.children[2])?,
                ];
                compute(Primitive::Hyp1f1.apply(args))
            },
            Rule::Control(Control::If) => {
                let elements = expr.elements();
                let condition = self.eval(&elements[0], &spans.children[0])?;
                let branch = |index: usize| match elements.get(index) {
                    Some(element) => self.eval(element, &spans.children[index]),
                    None => Ok(Value::Unit),
                };
                match condition.as_bool_scalar() {
                    Some(true) => branch(1),
                    Some(false) => branch(2),
                    None => compute(Value::select(&condition, branch(1)?, branch(2)?)),
                }
            },
            Rule::Control(_) => Err(Error::new(span(), UnsupportedConstruct {
                name: operator.name().to_string(),
            })),
        }
    }
}

fn arity_mismatch(operator: Operator, given: usize, spans: Vec<Range<usize>>) -> Error {
    Error::new(spans, ArityMismatch {
        name: operator.name().to_string(),
        expected: op::describe_arity(&operator.rule().arity()),
        given,
    })
}

/// Applies the extension at every point of its broadcast arguments.
fn apply_extension(
    name: &str,
    extension: &Extension,
    args: Vec<Value>,
    spans: Vec<Range<usize>>,
) -> Result<Value, Error> {
    let mut arrays = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            Value::Real(array) => arrays.push(array),
            Value::Complex(array) if array.iter().all(|z| z.im == 0.0) => {
                arrays.push(array.mapv(|z| z.re));
            },
            other => return Err(Error::new(spans, NonRealArgument {
                name: name.to_string(),
                typename: other.typename(),
            })),
        }
    }

    let mut shape = Vec::new();
    for array in &arrays {
        shape = broadcast_shape(&shape, array.shape()).map_err(|err| Error::new(spans.clone(), err))?;
    }
    let views = arrays
        .iter()
        .map(|array| broadcast_to(array, &shape))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| Error::new(spans.clone(), err))?;

    let mut point = vec![0.0; views.len()];
    let values = ArrayD::from_shape_fn(IxDyn(&shape), |idx| {
        for (x, view) in point.iter_mut().zip(&views) {
            *x = view[idx.slice()];
        }
        (extension.function)(&point)
    });
    Ok(Value::Real(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;
    use num_complex::Complex64;
    use pretty_assertions::assert_eq;

    fn interpret(evaluator: &InterpretedGridEvaluator, source: &str, x: Value) -> Result<Value, Error> {
        let expr = numex_parser::parse(source).unwrap();
        evaluator.interpret(&expr, &[(&Symbol::global("x"), x)])
    }

    #[test]
    fn elementwise_if() {
        let evaluator = InterpretedGridEvaluator::default();
        let xs = Value::from(arr1(&[-2.0, 0.0, 3.0]).into_dyn());
        assert_eq!(
            interpret(&evaluator, "If[x > 0, x, -x]", xs).unwrap(),
            Value::from(arr1(&[2.0, 0.0, 3.0]).into_dyn()),
        );
        assert_eq!(interpret(&evaluator, "If[1 < 0, x]", Value::from(1.0)).unwrap(), Value::Unit);
    }

    #[test]
    fn control_flow_is_not_interpreted() {
        let evaluator = InterpretedGridEvaluator::default();
        let err = interpret(&evaluator, "Module[{s = x}, s]", Value::from(1.0)).unwrap_err();
        assert_eq!(err.downcast_ref::<UnsupportedConstruct>(), Some(&UnsupportedConstruct {
            name: "Module".to_string(),
        }));
    }

    #[test]
    fn unknown_symbols() {
        let evaluator = InterpretedGridEvaluator::default();
        let err = interpret(&evaluator, "x + w", Value::from(1.0)).unwrap_err();
        assert!(err.is::<UnboundSymbol>());
        let err = interpret(&evaluator, "Sin[x] + Foo[x]", Value::from(1.0)).unwrap_err();
        assert_eq!(err.downcast_ref::<UnrecognizedOperator>().unwrap().name, "Foo");
    }

    #[test]
    fn extensions() {
        let evaluator = InterpretedGridEvaluator::default()
            .with_extension("Clamp", 3, Arc::new(|args: &[f64]| args[0].clamp(args[1], args[2])));
        let xs = Value::from(arr1(&[-5.0, 0.5, 5.0]).into_dyn());
        assert_eq!(
            interpret(&evaluator, "Clamp[x, -1, 1]", xs).unwrap(),
            Value::from(arr1(&[-1.0, 0.5, 1.0]).into_dyn()),
        );

        let err = interpret(&evaluator, "Clamp[x, 1]", Value::from(0.0)).unwrap_err();
        assert!(err.is::<ArityMismatch>());

        let err = interpret(&evaluator, "Clamp[x, I, 1]", Value::from(0.0)).unwrap_err();
        assert_eq!(err.downcast_ref::<NonRealArgument>(), Some(&NonRealArgument {
            name: "Clamp".to_string(),
            typename: "Complex",
        }));
    }

    #[test]
    fn complex_domain() {
        let evaluator = InterpretedGridEvaluator {
            domain: Domain::Complex,
            ..Default::default()
        };
        let Value::Complex(root) = interpret(&evaluator, "x^(1/2)", Value::from(-4.0)).unwrap() else {
            panic!("expected a complex result");
        };
        let root: Complex64 = root[[]];
        assert!(root.re.abs() < 1e-12);
        assert!((root.im - 2.0).abs() < 1e-12);

        let evaluator = evaluator
            .with_extension("Clamp", 3, Arc::new(|args: &[f64]| args[0].clamp(args[1], args[2])));
        assert_eq!(
            interpret(&evaluator, "Clamp[x, -1, 1]", Value::from(0.5)).unwrap(),
            Value::from(0.5),
        );
        let xs = Value::from(arr1(&[-5.0, 5.0]).into_dyn());
        assert_eq!(
            interpret(&evaluator, "Clamp[x, -1, 1]", xs).unwrap(),
            Value::from(arr1(&[-1.0, 1.0]).into_dyn()),
        );

        let err = interpret(&evaluator, "Clamp[x, I, 1]", Value::from(0.5)).unwrap_err();
        assert_eq!(err.downcast_ref::<NonRealArgument>().unwrap().typename, "Complex");
    }
}
