use crate::Label;
use numex_compute::{BinOp, Primitive, Reduction, Value};
use numex_expr::Symbol;
use std::ops::Range;

/// The kind of [`Instruction`].
///
/// The virtual machine is stack-based: instructions pop their operands off the value stack and
/// push their result back onto it. Every instruction leaves exactly one more or one fewer value
/// on the stack than it found, except where noted.
#[derive(Debug, Clone, PartialEq)]
pub enum InstructionKind {
    /// Load a constant value (one known at compile time) onto the stack.
    LoadConst(Value),

    /// Load the value stored in a slot of the frame onto the stack.
    ///
    /// Parameters occupy the first slots, followed by the locals of scoping constructs. Reading
    /// a local that was never assigned is an error.
    LoadSlot(usize),

    /// Store the top value on the stack in a slot of the frame. This value is **not** removed
    /// from the stack.
    ///
    /// This behavior is important since assignments are expressions whose value can be used by
    /// the enclosing expression.
    StoreSlot(usize),

    /// Mark a slot as uninitialized. Emitted when a scoping construct is entered, so that locals
    /// do not keep their values from a previous loop iteration.
    ClearSlot(usize),

    /// Raise an error for a symbol with no value. Emitted for symbols that are neither bound
    /// nor constants, so that the error is only raised if the symbol is actually reached.
    LoadUnbound(Symbol),

    /// Drops the top value from the stack.
    Drop,

    /// Swaps the top two values on the stack.
    Swap,

    /// Applies the primitive to the top [`Primitive::arity`] values on the stack, the deepest
    /// value being the first argument.
    Call(Primitive),

    /// Performs the binary operation on the second-to-top and top stack values.
    Binary(BinOp),

    /// Folds the top `n` values on the stack with the reduction.
    Reduce(Reduction, usize),

    /// Stacks the top `n` values on the stack into one array along a new leading axis.
    Stack(usize),

    /// Pops a condition and runs the chunk of the selected branch.
    ///
    /// A scalar condition runs a single branch. An array condition runs both branches and
    /// selects between their results elementwise.
    Branch {
        /// The chunk run when the condition is `True`.
        then: usize,

        /// The chunk run when the condition is `False`.
        otherwise: usize,
    },

    /// Jump to the specified label.
    Jump(Label),

    /// Pops the top value on the stack and jumps to the specified label if it is `False`.
    ///
    /// This will result in an error if the value is not a scalar boolean.
    JumpIfFalse(Label),
}

/// Represents a single instruction in the bytecode, along with its associated metadata, such as
/// source code spans.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// The kind of instruction.
    pub kind: InstructionKind,

    /// The spans in the FullForm text of the compiled expression that this instruction was
    /// generated from. Runtime errors raised by the instruction point at these spans.
    pub spans: Vec<Range<usize>>,
}

impl From<InstructionKind> for Instruction {
    fn from(kind: InstructionKind) -> Self {
        Self {
            kind,
            spans: Vec::new(),
        }
    }
}
