use numex_attrs::ErrorKind;

/// The element type of an array has no symbolic numeric counterpart.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("cannot wrap an array of `{}` elements as a list", self.name),
    help = "only integer, real, and complex arrays can stand in for a list",
)]
pub struct UnsupportedElementType {
    /// The name of the element type.
    pub name: String,
}

/// A rank-0 array has no list structure to expose.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "cannot wrap a scalar as a list",
    help = "lazy bulk lists need an array with at least one axis",
)]
pub struct ScalarNotWrappable;
