//! Compiles symbolic expressions into vectorized numeric functions and runs them.
//!
//! ```rust
//! use numex_expr::Symbol;
//! use numex_vm::{compile, Value};
//!
//! let expr = numex_parser::parse("x^2 + 1").unwrap();
//! let f = compile(&expr, &[Symbol::global("x")]).unwrap();
//! assert_eq!(f.call(&[Value::from(3.0)]).unwrap(), Value::from(10.0));
//! ```

pub mod error;
pub mod frame;
pub mod vm;

use error::{ArgumentCount, MissingArgument, UnknownArgument};
pub use numex_compiler::{CompileOptions, Domain, Program};
use numex_compiler::Compiler;
pub use numex_compute::Value;
use numex_error::Error;
use numex_expr::{Expr, Symbol};
use std::{ops::Range, sync::Arc};
use vm::Vm;

/// Compiles an expression into a function of the given free variables, evaluating in the real
/// domain.
pub fn compile(expr: &Expr, free_variables: &[Symbol]) -> Result<CompiledFunction, Error> {
    compile_with(expr, free_variables, CompileOptions::default())
}

/// Compiles an expression into a function of the given free variables.
pub fn compile_with(
    expr: &Expr,
    free_variables: &[Symbol],
    options: CompileOptions,
) -> Result<CompiledFunction, Error> {
    let program = Compiler::compile_function(expr, free_variables, options)?;
    log::debug!(
        "compiled function of {:?} with {} instruction(s)",
        program.parameters.iter().map(Symbol::to_string).collect::<Vec<_>>(),
        program.chunks.iter().map(|chunk| chunk.instructions.len()).sum::<usize>(),
    );
    Ok(CompiledFunction { program: Arc::new(program) })
}

/// A compiled expression that can be called on scalars or arrays.
///
/// Arguments broadcast against each other: calling a function of `x` and `y` with a column and
/// a row evaluates it on the whole grid. Cloning is cheap, and the function can be called from
/// several threads at once.
#[derive(Clone, Debug)]
pub struct CompiledFunction {
    program: Arc<Program>,
}

impl CompiledFunction {
    /// The free variables, in the order [`CompiledFunction::call`] binds arguments to them.
    pub fn parameters(&self) -> &[Symbol] {
        &self.program.parameters
    }

    /// The compiled bytecode.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// The FullForm text of the compiled expression. Spans of errors returned by the function
    /// index into it.
    pub fn source(&self) -> &str {
        &self.program.source.text
    }

    fn whole_span(&self) -> Vec<Range<usize>> {
        vec![self.program.source.spans.span.clone()]
    }

    /// Calls the function, binding the arguments to the free variables by position.
    pub fn call(&self, args: &[Value]) -> Result<Value, Error> {
        if args.len() != self.program.parameters.len() {
            return Err(Error::new(self.whole_span(), ArgumentCount {
                expected: self.program.parameters.len(),
                given: args.len(),
            }));
        }

        let args = args
            .iter()
            .map(|arg| match self.program.options.domain {
                Domain::Real => arg.clone(),
                Domain::Complex => arg.clone().coerce_complex(),
            })
            .collect();
        Vm::new(&self.program, args).run()
    }

    /// Calls the function, binding each argument to the free variable it is paired with.
    pub fn call_named<'a>(
        &self,
        args: impl IntoIterator<Item = (&'a Symbol, Value)>,
    ) -> Result<Value, Error> {
        let parameters = &self.program.parameters;
        let mut slots = vec![None; parameters.len()];
        for (symbol, value) in args {
            let Some(slot) = parameters.iter().position(|parameter| parameter == symbol) else {
                return Err(Error::new(self.whole_span(), UnknownArgument {
                    name: symbol.to_string(),
                }));
            };
            slots[slot] = Some(value);
        }

        let args = slots
            .into_iter()
            .zip(parameters)
            .map(|(value, parameter)| value.ok_or_else(|| {
                Error::new(self.whole_span(), MissingArgument { name: parameter.to_string() })
            }))
            .collect::<Result<Vec<_>, _>>()?;
        self.call(&args)
    }
}
