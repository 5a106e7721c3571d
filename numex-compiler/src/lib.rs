//! Lowers symbolic [`Expr`] trees into bytecode for numex's vectorized virtual machine.
//!
//! **If you're looking to evaluate an expression, you should use `numex-vm` instead.** This
//! crate only produces the [`Program`] the virtual machine runs.

pub mod error;
pub mod expr;
pub mod instruction;
pub mod op;
pub mod options;
pub mod scope;

use error::DuplicateFreeVariable;
use expr::Node;
pub use instruction::{Instruction, InstructionKind};
use numex_compute::Value;
use numex_error::Error;
use numex_expr::{Expr, FullForm, Symbol};
pub use options::{CompileOptions, Domain};
use scope::{Local, ScopeStack};
use std::{collections::{HashMap, HashSet}, ops::Range};

/// A label that can be used to reference a specific instruction in the bytecode.
///
/// The internal value is simply a unique ID that is resolved to the actual instruction during
/// execution.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Label(usize);

/// A sequence of instructions.
///
/// The first chunk of a [`Program`] is its entry point. Every other chunk is a branch of an `If`,
/// run on the same frame as the instruction that selects it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Chunk {
    /// The instructions in this chunk.
    pub instructions: Vec<Instruction>,
}

/// The output of the compiler, ready to be run by the virtual machine.
#[derive(Clone, Debug)]
pub struct Program {
    /// The bytecode chunks. The first chunk is the entry point.
    pub chunks: Vec<Chunk>,

    /// Labels mapped to the chunk and index of the instruction they reference.
    pub labels: HashMap<Label, (usize, usize)>,

    /// The number of slots of the frame: one per parameter, followed by one per local.
    pub slots: usize,

    /// The free variables, in the order they are bound to the first slots.
    pub parameters: Vec<Symbol>,

    /// The options the program was compiled with.
    pub options: CompileOptions,

    /// The FullForm text of the compiled expression. Instruction spans index into it.
    pub source: FullForm,
}

/// A compiler that provides tools to generate bytecode instructions for numex's virtual machine.
///
/// This is the main entry point to the compiler. [`Compiler::compile_function`] translates an
/// [`Expr`] into a [`Program`] whose parameters are a given list of free variables. The compiler
/// is also responsible for the semantics of scoping constructs such as `Module` through the slots
/// it assigns to locals.
///
/// During execution, the virtual machine uses a value stack to keep track of the values generated
/// by the bytecode. The most important rule is that **every expression leaves exactly one value
/// on the stack**, including loops and assignments, which leave the unit value and the assigned
/// value respectively. Sequences like `CompoundExpression[a, b]` drop the values of all but their
/// last element.
///
/// For example, `x + 1` compiles to:
///
/// ```rust
/// use numex_compiler::{Compiler, CompileOptions, Instruction, InstructionKind::*};
/// use numex_compute::{Reduction, Value};
/// use numex_expr::Symbol;
///
/// let expr = numex_parser::parse("x + 1").unwrap();
/// let program = Compiler::compile_function(
///     &expr,
///     &[Symbol::global("x")],
///     CompileOptions::default(),
/// ).unwrap();
///
/// // the spans index into the FullForm text
/// assert_eq!(program.source.text, "Plus[x, 1]");
/// assert_eq!(program.chunks[0].instructions, vec![
///     Instruction { kind: LoadSlot(0), spans: vec![5..6] },
///     Instruction { kind: LoadConst(Value::from(1.0)), spans: vec![8..9] },
///     Instruction { kind: Reduce(Reduction::Sum, 2), spans: vec![0..10] },
/// ]);
/// ```
#[derive(Clone, Debug)]
pub struct Compiler {
    /// The bytecode chunks generated by the compiler.
    pub chunks: Vec<Chunk>,

    /// Labels generated by the compiler, mapped to the chunk and index of the instruction they
    /// reference.
    ///
    /// When created, labels aren't associated with any instruction. Before the bytecode is
    /// executed, every label is associated with one.
    pub labels: HashMap<Label, Option<(usize, usize)>>,

    /// The locals of the scoping constructs enclosing the expression being compiled.
    pub scopes: ScopeStack,

    /// The free variables of the function being compiled.
    pub parameters: Vec<Symbol>,

    /// The options to compile with.
    pub options: CompileOptions,

    /// Index of the current chunk.
    ///
    /// This value is manually updated by the compiler.
    chunk: usize,

    /// The next unused slot.
    next_slot: usize,
}

impl Compiler {
    /// Creates a new compiler for a function of the given free variables.
    pub fn new(parameters: Vec<Symbol>, options: CompileOptions) -> Self {
        Self {
            chunks: vec![Chunk::default()], // add main chunk
            labels: Default::default(),
            scopes: Default::default(),
            next_slot: parameters.len(),
            parameters,
            options,
            chunk: 0,
        }
    }

    /// Compiles an expression into a function of the given free variables.
    ///
    /// Compilation is all-or-nothing: the first error aborts it.
    pub fn compile_function(
        expr: &Expr,
        free_variables: &[Symbol],
        options: CompileOptions,
    ) -> Result<Program, Error> {
        let source = expr.full_form();

        let mut seen = HashSet::new();
        if let Some(duplicate) = free_variables.iter().find(|symbol| !seen.insert(*symbol)) {
            return Err(Error::new(vec![source.spans.span.clone()], DuplicateFreeVariable {
                name: duplicate.to_string(),
            }));
        }

        let mut compiler = Self::new(free_variables.to_vec(), options);
        compiler.compile(Node::new(expr, &source.spans))?;
        log::debug!(
            "compiled `{}` into {} chunk(s) using {} slot(s)",
            source.text,
            compiler.chunks.len(),
            compiler.next_slot,
        );
        Ok(compiler.finish(source))
    }

    /// Compiles the given type into the current chunk.
    pub fn compile<T: Compile>(&mut self, item: T) -> Result<(), Error> {
        item.compile(self)
    }

    /// Resolves every label and packages the generated bytecode into a [`Program`].
    pub fn finish(self, source: FullForm) -> Program {
        let labels = self.labels
            .into_iter()
            .filter_map(|(label, target)| target.map(|target| (label, target)))
            .collect();
        Program {
            chunks: self.chunks,
            labels,
            slots: self.next_slot,
            parameters: self.parameters,
            options: self.options,
            source,
        }
    }

    /// Returns an immutable reference to the current chunk.
    pub fn chunk(&self) -> &Chunk {
        &self.chunks[self.chunk]
    }

    /// Returns a mutable reference to the current chunk.
    pub fn chunk_mut(&mut self) -> &mut Chunk {
        &mut self.chunks[self.chunk]
    }

    /// Creates a new scope. Within the provided function, locals inserted with
    /// [`Compiler::add_local`] are added to the new scope.
    ///
    /// The scope is popped when the function returns.
    pub fn new_scope<F>(&mut self, f: F) -> Result<(), Error>
        where F: FnOnce(&mut Compiler) -> Result<(), Error>
    {
        self.scopes.enter();
        f(self)?;
        self.scopes.exit();
        Ok(())
    }

    /// Creates a new chunk for compilation. Within the provided function, all `compiler` methods
    /// that add or edit instructions will do so to the new chunk.
    ///
    /// Returns the index of the new chunk.
    pub fn new_chunk<F>(&mut self, f: F) -> Result<usize, Error>
        where F: FnOnce(&mut Compiler) -> Result<(), Error>
    {
        let old_chunk_idx = self.chunk;
        self.chunks.push(Chunk::default());
        let new_chunk_idx = self.chunks.len() - 1;

        self.chunk = new_chunk_idx;
        f(self)?;
        self.chunk = old_chunk_idx;

        Ok(new_chunk_idx)
    }

    /// Reserves a fresh slot in the frame.
    pub fn new_slot(&mut self) -> usize {
        let slot = self.next_slot;
        self.next_slot += 1;
        slot
    }

    /// Binds a symbol to a slot in the innermost scope.
    pub fn add_local(&mut self, symbol: Symbol, local: Local) {
        self.scopes.insert(symbol, local);
    }

    /// Resolves a symbol to the slot holding its value, searching the locals of the enclosing
    /// scopes before the parameters.
    pub fn resolve_slot(&self, symbol: &Symbol) -> Option<Local> {
        self.scopes.resolve(symbol).or_else(|| {
            self.parameters
                .iter()
                .position(|parameter| parameter == symbol)
                .map(|slot| Local { slot, constant: false })
        })
    }

    /// Adds an instruction loading a constant, promoting it to the domain being compiled for.
    pub fn load_const(&mut self, value: Value, spans: Vec<Range<usize>>) {
        let value = match self.options.domain {
            Domain::Real => value,
            Domain::Complex => value.coerce_complex(),
        };
        self.add_instr_with_spans(InstructionKind::LoadConst(value), spans);
    }

    /// Adds an instruction to the current chunk with no associated source code span.
    pub fn add_instr(&mut self, instruction: impl Into<Instruction>) {
        let chunk = self.chunk_mut();
        chunk.instructions.push(instruction.into());
    }

    /// Adds an instruction to the current chunk with an associated source code span(s).
    pub fn add_instr_with_spans(
        &mut self,
        instruction: impl Into<Instruction>,
        spans: Vec<Range<usize>>,
    ) {
        let mut instruction = instruction.into();
        instruction.spans = spans;
        let chunk = self.chunk_mut();
        chunk.instructions.push(instruction);
    }

    /// Creates a unique label with no associated instruction. This label can be used to reference
    /// a specific instruction in the bytecode.
    pub fn new_unassociated_label(&mut self) -> Label {
        let label = Label(self.labels.len());
        self.labels.insert(label, None);
        label
    }

    /// Creates a unique label pointing to the end of the currently generated bytecode in the
    /// current chunk.
    ///
    /// When this method is called and [`Compile::compile`] is called immediately after, the label
    /// will point to the first instruction generated by the compilation.
    pub fn new_end_label(&mut self) -> Label {
        let label = Label(self.labels.len());
        let chunk_instrs = self.chunk().instructions.len();
        self.labels.insert(label, Some((self.chunk, chunk_instrs)));
        label
    }

    /// Associates the given label with the end of the currently generated bytecode.
    ///
    /// This is useful for creating labels that point to the end of a loop, for example.
    pub fn set_end_label(&mut self, label: Label) {
        let chunk_instrs = self.chunk().instructions.len();
        self.labels.insert(label, Some((self.chunk, chunk_instrs)));
    }
}

/// Trait for types that can be compiled into bytecode [`Instruction`]s.
pub trait Compile {
    /// Compiles the type into a sequence of [`Instruction`]s.
    fn compile(&self, compiler: &mut Compiler) -> Result<(), Error>;
}

impl<T: Compile> Compile for &T {
    fn compile(&self, compiler: &mut Compiler) -> Result<(), Error> {
        (*self).compile(compiler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::*;
    use num_complex::Complex64;
    use numex_compute::{BinOp, Primitive};
    use pretty_assertions::assert_eq;

    fn x() -> Symbol {
        Symbol::global("x")
    }

    /// Compile the given source code as a function of `x`.
    fn compile(source: &str) -> Result<Program, Error> {
        let expr = numex_parser::parse(source).unwrap();
        Compiler::compile_function(&expr, &[x()], CompileOptions::default())
    }

    fn kinds(program: &Program, chunk: usize) -> Vec<InstructionKind> {
        program.chunks[chunk].instructions
            .iter()
            .map(|instruction| instruction.kind.clone())
            .collect()
    }

    #[test]
    fn function_by_arity() {
        let program = compile("ArcTan[x, 2]").unwrap();
        assert_eq!(kinds(&program, 0), vec![
            InstructionKind::LoadSlot(0),
            InstructionKind::LoadConst(Value::from(2.0)),
            InstructionKind::Swap,
            InstructionKind::Call(Primitive::Atan2),
        ]);

        let program = compile("ArcTan[x]").unwrap();
        assert_eq!(kinds(&program, 0), vec![
            InstructionKind::LoadSlot(0),
            InstructionKind::Call(Primitive::Atan),
        ]);
    }

    #[test]
    fn square_root_exponent() {
        let sqrt = kinds(&compile("Sqrt[x]").unwrap(), 0);
        assert_eq!(kinds(&compile("x^(1/2)").unwrap(), 0), sqrt);
        assert_eq!(kinds(&compile("Power[x, 0.5]").unwrap(), 0), sqrt);
        assert_eq!(kinds(&compile("x^(1/3)").unwrap(), 0).last(), Some(&InstructionKind::Binary(BinOp::Pow)));
    }

    #[test]
    fn constants_and_unbound_symbols() {
        let program = compile("Pi + y").unwrap();
        assert_eq!(kinds(&program, 0), vec![
            InstructionKind::LoadConst(Value::from(std::f64::consts::PI)),
            InstructionKind::LoadUnbound(Symbol::global("y")),
            InstructionKind::Reduce(numex_compute::Reduction::Sum, 2),
        ]);
    }

    #[test]
    fn complex_domain_promotes_constants() {
        let expr = numex_parser::parse("Sqrt[-1]").unwrap();
        let program = Compiler::compile_function(&expr, &[], CompileOptions::complex()).unwrap();
        assert_eq!(
            program.chunks[0].instructions[0].kind,
            InstructionKind::LoadConst(Value::from(Complex64::new(-1.0, 0.0))),
        );
    }

    #[test]
    fn unrecognized_operator() {
        let err = compile("Sin[Frob[x]]").unwrap_err();
        let kind = err.downcast_ref::<UnrecognizedOperator>().unwrap();
        assert_eq!(kind.name, "Frob");
        // the head, then the whole application
        assert_eq!(err.spans, vec![4..8, 4..11]);

        let err = compile("sin[x]").unwrap_err();
        assert_eq!(err.downcast_ref::<UnrecognizedOperator>().unwrap().suggestions, vec!["Min", "Sin"]);
    }

    #[test]
    fn arity_mismatch() {
        let err = compile("ArcTan[x, x, x]").unwrap_err();
        assert_eq!(err.downcast_ref::<ArityMismatch>(), Some(&ArityMismatch {
            name: "ArcTan".to_string(),
            expected: "1 or 2".to_string(),
            given: 3,
        }));
    }

    #[test]
    fn non_numeric_leaves() {
        assert!(compile("x + \"a\"").unwrap_err().is::<NonNumericLiteral>());
        assert!(compile("x + Sin").unwrap_err().is::<NonNumericSymbol>());
    }

    #[test]
    fn duplicate_free_variables() {
        let expr = numex_parser::parse("x").unwrap();
        let err = Compiler::compile_function(&expr, &[x(), x()], CompileOptions::default())
            .unwrap_err();
        assert!(err.is::<DuplicateFreeVariable>());
    }

    #[test]
    fn hypergeometric() {
        let a = kinds(&compile("HypergeometricPFQ[{1}, {2}, x]").unwrap(), 0);
        let b = kinds(&compile("Hypergeometric1F1[1, 2, x]").unwrap(), 0);
        assert_eq!(a, b);
        assert!(compile("HypergeometricPFQ[{1, 2}, {3}, x]").unwrap_err().is::<UnsupportedHypergeometric>());
    }

    #[test]
    fn branches_get_their_own_chunks() {
        let program = compile("If[x > 0, x, -x]").unwrap();
        assert_eq!(program.chunks.len(), 3);
        assert_eq!(
            kinds(&program, 0).last(),
            Some(&InstructionKind::Branch { then: 1, otherwise: 2 }),
        );
        assert_eq!(kinds(&program, 1), vec![InstructionKind::LoadSlot(0)]);
    }

    #[test]
    fn locals_get_fresh_slots() {
        let program = compile("Module[{a = 1, b}, b = a + x; Module[{a}, a = b]]").unwrap();
        assert_eq!(program.slots, 4);
    }

    #[test]
    fn assignments() {
        compile("Module[{a = 0}, a += x; a++; --a; a]").unwrap();
        compile("x = 2 x").unwrap();
        assert!(compile("With[{a = 1}, a = 2]").unwrap_err().is::<AssignToConstant>());
        assert!(compile("y = 2").unwrap_err().is::<InvalidAssignTarget>());
        assert!(compile("Module[{a}, a]; a = 1").unwrap_err().is::<InvalidAssignTarget>());
        assert!(compile("Module[a, a]").unwrap_err().is::<InvalidLocalSpec>());
        assert!(compile("With[{a}, a]").unwrap_err().is::<InvalidLocalSpec>());
    }

    #[test]
    fn loops() {
        compile("Module[{s = 0}, Do[s += i, {i, 10}]; s]").unwrap();
        compile("Module[{s = 0}, For[i = 0, i < 3, i++, s += x]; s]").unwrap_err();
        compile("Module[{s = 0, i}, For[i = 0, i < 3, i++, s += x]; s]").unwrap();
        compile("Module[{n = x}, While[n > 1, n /= 2]; n]").unwrap();
        assert!(compile("Do[x, {1, 2, 3, 4, 5}]").unwrap_err().is::<InvalidIteratorSpec>());
        assert!(compile("Do[x, {Pi, 3}]").unwrap_err().is::<InvalidIteratorSpec>());
    }
}
