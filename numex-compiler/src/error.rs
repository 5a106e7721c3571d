use ariadne::Fmt;
use numex_attrs::ErrorKind;
use numex_error::EXPR;

/// The head of an application is not a supported operator.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("unrecognized operator: `{}`", self.name),
    labels = ["this operator", "in this expression"],
    help = if self.suggestions.is_empty() {
        "only numeric functions, arithmetic, comparisons, logic and control flow can be compiled".to_string()
    } else if self.suggestions.len() == 1 {
        format!("did you mean the `{}` operator?", (&*self.suggestions[0]).fg(EXPR))
    } else {
        format!(
            "did you mean one of these operators? {}",
            self.suggestions
                .iter()
                .map(|s| format!("`{}`", s.fg(EXPR)))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
)]
pub struct UnrecognizedOperator {
    /// The name of the operator.
    pub name: String,

    /// A list of similarly named operators, if any.
    pub suggestions: Vec<String>,
}

/// An operator was applied to the wrong number of arguments.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` called with {} arguments", self.name, self.given),
    labels = [format!("this expects {} arguments", self.expected)],
)]
pub struct ArityMismatch {
    /// The name of the operator.
    pub name: String,

    /// A description of the accepted argument counts, such as `1 or 2`.
    pub expected: String,

    /// The number of arguments given.
    pub given: usize,
}

/// A string literal appeared where a number was expected.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` is not a number", self.literal),
    labels = ["this literal"],
    help = "only numeric literals can be compiled",
)]
pub struct NonNumericLiteral {
    /// The literal, as written in FullForm.
    pub literal: String,
}

/// A built-in symbol with no numeric value appeared as a leaf.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` has no numeric value", self.name),
    labels = ["this symbol"],
    help = format!(
        "built-in symbols such as {} cannot be used as variables; use a name like {} instead",
        (&self.name).fg(EXPR),
        "x".fg(EXPR),
    ),
)]
pub struct NonNumericSymbol {
    /// The name of the symbol.
    pub name: String,
}

/// The same symbol was given twice in the list of free variables.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("free variable `{}` is declared more than once", self.name),
    labels = ["in this expression"],
)]
pub struct DuplicateFreeVariable {
    /// The name of the repeated variable.
    pub name: String,
}

/// Tried to assign to a constant introduced by `With`.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("cannot assign to constant `{}`", self.name),
    labels = ["this assignment"],
    help = format!("`{}` is introduced by `With`; use `Module` for a local that can change", self.name),
)]
pub struct AssignToConstant {
    /// The name of the constant.
    pub name: String,
}

/// The target of an assignment is not a local or a free variable.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("cannot assign to `{}`", self.target),
    labels = ["this assignment"],
    help = "only free variables and locals of `Module`, `Block` or `With` can be assigned to",
)]
pub struct InvalidAssignTarget {
    /// The target, as written in FullForm.
    pub target: String,
}

/// The first argument of a scoping construct is not a list of local declarations.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("invalid local variable specification `{}`", self.spec),
    labels = ["this specification"],
    help = format!("write locals as a list such as {}", "{x, y = 1}".fg(EXPR)),
)]
pub struct InvalidLocalSpec {
    /// The specification, as written in FullForm.
    pub spec: String,
}

/// The iterator of a `Do` loop has an unsupported form.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("invalid iterator specification `{}`", self.spec),
    labels = ["this iterator"],
    note = "iterators have the form {n}, {i, max}, {i, min, max} or {i, min, max, step}",
)]
pub struct InvalidIteratorSpec {
    /// The specification, as written in FullForm.
    pub spec: String,
}

/// A generalized hypergeometric function other than `1F1` was requested.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("unsupported hypergeometric function {}F{}", self.p, self.q),
    labels = ["this function"],
    help = "only HypergeometricPFQ[{a}, {b}, z] can be compiled",
)]
pub struct UnsupportedHypergeometric {
    /// The number of upper parameters, or 0 if they are not given as a list.
    pub p: usize,

    /// The number of lower parameters, or 0 if they are not given as a list.
    pub q: usize,
}
