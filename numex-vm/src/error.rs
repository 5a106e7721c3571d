use numex_attrs::ErrorKind;

/// A symbol with no value was evaluated.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` has no value", self.name),
    labels = ["this symbol"],
    help = format!("to give it a value, add `{}` to the free variables of the function", self.name),
)]
pub struct UnboundSymbol {
    /// The name of the symbol.
    pub name: String,
}

/// A local was read before it was assigned.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("local `{}` is read before it is assigned", self.name),
    labels = ["this local"],
    help = "give the local an initial value where it is declared, such as `{x = 0}`",
)]
pub struct UninitializedLocal {
    /// The name of the local.
    pub name: String,
}

/// The test of a loop is not a single boolean.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "loop condition must be a single boolean",
    labels = [if self.shape.is_empty() {
        format!("this condition evaluated to a `{}`", self.typename)
    } else {
        format!("this condition evaluated to a `{}` array of shape {:?}", self.typename, self.shape)
    }],
    note = "only `If` can take an array condition, which it applies elementwise",
)]
pub struct NonScalarCondition {
    /// The type of the condition.
    pub typename: &'static str,

    /// The shape of the condition.
    pub shape: Vec<usize>,
}

/// A function was called with the wrong number of arguments.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("expected {} arguments, but {} were given", self.expected, self.given),
    labels = ["this function"],
)]
pub struct ArgumentCount {
    /// The number of free variables of the function.
    pub expected: usize,

    /// The number of arguments given.
    pub given: usize,
}

/// A named argument does not match any free variable.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` is not a free variable of this function", self.name),
    labels = ["this function"],
)]
pub struct UnknownArgument {
    /// The name of the argument.
    pub name: String,
}

/// No value was given for a free variable.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("missing argument for free variable `{}`", self.name),
    labels = ["this function"],
)]
pub struct MissingArgument {
    /// The name of the free variable.
    pub name: String,
}

/// An internal error that can't be resolved by the user.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("an internal error occurred at instruction: `{}`", self.instruction),
    labels = ["while evaluating this"],
    help = "please report this expression and error message to the developers",
    note = &self.data,
)]
pub struct InternalError {
    /// The instruction the virtual machine was executing when the error occurred.
    pub instruction: String,

    /// Arbitrary data that may help the developer diagnose the issue.
    pub data: String,
}
