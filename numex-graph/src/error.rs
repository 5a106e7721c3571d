use numex_attrs::ErrorKind;

/// A construct that only makes sense when compiled reached the interpreter.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` cannot be interpreted", self.name),
    labels = ["this expression"],
    help = "the interpreter only evaluates pure expressions; compile the function to use control flow",
)]
pub struct UnsupportedConstruct {
    /// The head of the construct.
    pub name: String,
}

/// An extension function received an argument that is not real.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` expects real arguments", self.name),
    labels = [format!("this argument is a `{}`", self.typename)],
)]
pub struct NonRealArgument {
    /// The name of the extension function.
    pub name: String,

    /// The type of the offending argument.
    pub typename: &'static str,
}

/// The function being plotted does not produce numbers.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "surface heights must be numeric",
    labels = [format!("this evaluated to a `{}`", self.typename)],
)]
pub struct NonNumericSurface {
    /// The type the function evaluated to.
    pub typename: &'static str,
}
