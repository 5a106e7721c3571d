use numex_attrs::ErrorKind;
use numex_error::{Error, ErrorKind};
use std::ops::Range;

/// The shapes of two operands cannot be broadcast together.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("cannot broadcast shapes {:?} and {:?} together", self.left, self.right),
    labels = ["in this expression"],
    help = "axes are matched from the end and must either be equal or have length 1",
)]
pub struct ShapeMismatch {
    /// The shape of the left operand.
    pub left: Vec<usize>,

    /// The shape of the right operand.
    pub right: Vec<usize>,
}

/// An operation received a value of a type it cannot work with.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("cannot apply `{}` to a `{}` value", self.op, self.typename),
    labels = ["this expression"],
)]
pub struct InvalidOperand {
    /// The name of the operation.
    pub op: &'static str,

    /// The type of the offending operand.
    pub typename: &'static str,
}

/// Represents an error that can occur while evaluating a kernel.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// The operands could not be broadcast to a common shape.
    ShapeMismatch(ShapeMismatch),

    /// An operand had the wrong type.
    InvalidOperand(InvalidOperand),
}

impl From<ShapeMismatch> for EvalError {
    fn from(e: ShapeMismatch) -> Self {
        EvalError::ShapeMismatch(e)
    }
}

impl From<InvalidOperand> for EvalError {
    fn from(e: InvalidOperand) -> Self {
        EvalError::InvalidOperand(e)
    }
}

impl EvalError {
    /// Convert the [`EvalError`] into the general [`Error`] type, pointing at the given spans.
    pub fn into_error(self, spans: Vec<Range<usize>>) -> Error {
        macro_rules! error {
            ($( $kind:ident ),* $(,)?) => {
                match self {
                    $( EvalError::$kind(e) => Error {
                        spans,
                        kind: Box::new(e) as Box<dyn ErrorKind>,
                    }, )*
                }
            };
        }

        error!(ShapeMismatch, InvalidOperand)
    }
}
