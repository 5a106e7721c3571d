use ariadne::Fmt;
use numex_attrs::ErrorKind;
use numex_error::EXPR;

/// The end of the source code was reached unexpectedly.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unexpected end of input",
    labels = [format!("you might need to add another {} here", "expression".fg(EXPR))],
)]
pub struct UnexpectedEof;

/// The end of the source code was expected, but something else was found.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "expected end of input",
    labels = [format!("I could not understand the remaining {} here", "expression".fg(EXPR))],
)]
pub struct ExpectedEof;

/// An unexpected token was encountered.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("unexpected `{}`", self.found),
    labels = [format!("expected {}", self.expected)],
)]
pub struct UnexpectedToken {
    /// A description of what was expected.
    pub expected: &'static str,

    /// The lexeme that was found.
    pub found: String,
}

/// A number literal could not be read.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("invalid number `{}`", self.lexeme),
    labels = ["this literal"],
)]
pub struct InvalidNumber {
    /// The literal as written.
    pub lexeme: String,
}
