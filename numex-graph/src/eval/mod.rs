//! Strategies for evaluating a function of two variables over a [`Grid`].

pub mod interpreted;

use crate::{error::NonNumericSurface, grid::Grid};
use ndarray::ArrayD;
use numex_compute::{broadcast::broadcast_to, Value};
use numex_error::Error;
use numex_expr::{Expr, Symbol};
use numex_vm::{CompileOptions, CompiledFunction};
use std::ops::Range;

pub use interpreted::{Extension, InterpretedGridEvaluator};

/// Evaluates a function of `x` and `y` at every point of a grid.
///
/// Implementations must return an array of shape [`Grid::shape`]. Complex results keep only
/// their real part.
pub trait GridEvaluator: Send + Sync {
    fn evaluate(&self, expr: &Expr, x: &Symbol, y: &Symbol, grid: &Grid) -> Result<ArrayD<f64>, Error>;
}

/// Converts the value of a function into surface heights of the given shape.
pub(crate) fn into_heights(
    value: Value,
    shape: &[usize],
    spans: Vec<Range<usize>>,
) -> Result<ArrayD<f64>, Error> {
    let heights = match value.real_part() {
        Value::Real(heights) => heights,
        other => return Err(Error::new(spans, NonNumericSurface {
            typename: other.typename(),
        })),
    };

    // constant functions evaluate to a scalar
    broadcast_to(&heights, shape).map_err(|err| Error::new(spans, err))
}

/// Compiles the function once and evaluates the whole mesh in one vectorized call.
#[derive(Clone, Debug, Default)]
pub struct CompiledGridEvaluator {
    /// The options used to compile every function.
    pub options: CompileOptions,
}

impl CompiledGridEvaluator {
    /// Creates an evaluator compiling with the given options.
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    /// Compiles the function of `x` and `y`.
    pub fn compile(&self, expr: &Expr, x: &Symbol, y: &Symbol) -> Result<CompiledFunction, Error> {
        numex_vm::compile_with(expr, &[x.clone(), y.clone()], self.options)
    }

    /// Evaluates an already compiled function over the grid.
    pub fn evaluate_compiled(&self, function: &CompiledFunction, grid: &Grid) -> Result<ArrayD<f64>, Error> {
        let (xs, ys) = grid.mesh();
        let value = function.call(&[xs.into(), ys.into()])?;
        into_heights(value, &grid.shape(), vec![0..function.source().len()])
    }
}

impl GridEvaluator for CompiledGridEvaluator {
    fn evaluate(&self, expr: &Expr, x: &Symbol, y: &Symbol, grid: &Grid) -> Result<ArrayD<f64>, Error> {
        let function = self.compile(expr, x, y)?;
        self.evaluate_compiled(&function, grid)
    }
}

/// Compiles the function if possible, and interprets it if compilation fails.
///
/// Errors raised while evaluating a successfully compiled function are returned as is.
#[derive(Clone, Default)]
pub struct FallbackGridEvaluator {
    /// The evaluator tried first.
    pub compiled: CompiledGridEvaluator,

    /// The evaluator used when compilation fails.
    pub interpreted: InterpretedGridEvaluator,
}

impl FallbackGridEvaluator {
    pub fn new(compiled: CompiledGridEvaluator, interpreted: InterpretedGridEvaluator) -> Self {
        Self { compiled, interpreted }
    }
}

impl GridEvaluator for FallbackGridEvaluator {
    fn evaluate(&self, expr: &Expr, x: &Symbol, y: &Symbol, grid: &Grid) -> Result<ArrayD<f64>, Error> {
        match self.compiled.compile(expr, x, y) {
            Ok(function) => self.compiled.evaluate_compiled(&function, grid),
            Err(err) => {
                log::warn!("could not compile `{}`, interpreting instead: {}", expr, err.message());
                self.interpreted.evaluate(expr, x, y, grid)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;
    use numex_compiler::error::UnrecognizedOperator;
    use std::sync::Arc;

    fn parse(source: &str) -> Expr {
        numex_parser::parse(source).unwrap()
    }

    fn xy() -> (Symbol, Symbol) {
        (Symbol::global("x"), Symbol::global("y"))
    }

    #[test]
    fn compiled_matches_interpreted() {
        let (x, y) = xy();
        let grid = Grid::new((-2.0, 2.0), (0.0, 3.0), (9, 7));
        let expr = parse("Sin[x y] + Sqrt[y] - Max[x, 0]^2 / (1 + y^2)");

        let compiled = CompiledGridEvaluator::default().evaluate(&expr, &x, &y, &grid).unwrap();
        let interpreted = InterpretedGridEvaluator::default().evaluate(&expr, &x, &y, &grid).unwrap();
        assert_eq!(compiled.shape(), &[9, 7]);
        for (a, b) in compiled.iter().zip(interpreted.iter()) {
            assert_float_absolute_eq!(*a, *b, 1e-12);
        }
    }

    #[test]
    fn constants_fill_the_grid() {
        let (x, y) = xy();
        let grid = Grid::new((0.0, 1.0), (0.0, 1.0), (4, 3));
        let heights = CompiledGridEvaluator::default().evaluate(&parse("2 Pi"), &x, &y, &grid).unwrap();
        assert_eq!(heights.shape(), &[4, 3]);
        assert!(heights.iter().all(|&h| h == 2.0 * std::f64::consts::PI));
    }

    #[test]
    fn complex_results_keep_the_real_part() {
        let (x, y) = xy();
        let grid = Grid::new((-4.0, -1.0), (0.0, 0.0), (4, 1));
        let evaluator = CompiledGridEvaluator::new(CompileOptions::complex());
        let heights = evaluator.evaluate(&parse("Sqrt[x] + x"), &x, &y, &grid).unwrap();
        for (h, x) in heights.iter().zip([-4.0, -3.0, -2.0, -1.0]) {
            assert_float_absolute_eq!(*h, x, 1e-12);
        }
    }

    #[test]
    fn booleans_are_not_heights() {
        let (x, y) = xy();
        let grid = Grid::default();
        let err = CompiledGridEvaluator::default().evaluate(&parse("x > y"), &x, &y, &grid).unwrap_err();
        assert_eq!(err.downcast_ref::<NonNumericSurface>(), Some(&NonNumericSurface {
            typename: "Boolean",
        }));
    }

    #[test]
    fn fallback_interprets_unknown_operators() {
        let (x, y) = xy();
        let grid = Grid::new((0.0, 1.0), (0.0, 2.0), (3, 3));
        let expr = parse("Hypot[x, y] + 1");

        let err = CompiledGridEvaluator::default().evaluate(&expr, &x, &y, &grid).unwrap_err();
        assert!(err.is::<UnrecognizedOperator>());

        let interpreted = InterpretedGridEvaluator::default()
            .with_extension("Hypot", 2, Arc::new(|args: &[f64]| args[0].hypot(args[1])));
        let fallback = FallbackGridEvaluator::new(CompiledGridEvaluator::default(), interpreted);
        let heights = fallback.evaluate(&expr, &x, &y, &grid).unwrap();

        let (xs, ys) = grid.mesh();
        for ((h, x), y) in heights.iter().zip(xs.iter()).zip(ys.iter()) {
            assert_float_absolute_eq!(*h, x.hypot(*y) + 1.0, 1e-12);
        }
    }

    #[test]
    fn fallback_keeps_runtime_errors() {
        let (x, y) = xy();
        let expr = parse("x + z");
        let fallback = FallbackGridEvaluator::default();
        let err = fallback.evaluate(&expr, &x, &y, &Grid::default()).unwrap_err();
        assert_eq!(err.message(), "`z` has no value");
    }
}
