//! The data model shared by every numex crate.
//!
//! An [`Expr`] is an immutable tree of [`Symbol`]s, [`Atom`]s and applications of a head to an
//! ordered list of elements. Numeric arrays produced by compiled functions re-enter the tree as
//! [`LazyBulkList`]s, which behave like symbolic lists but only create their element nodes when
//! someone asks for them.

pub mod array;
pub mod atom;
pub mod bulk;
pub mod error;
pub mod expr;
pub mod full_form;
pub mod symbol;

pub use array::{ElementType, NumericArray};
pub use atom::Atom;
pub use bulk::{BulkElement, LazyBulkList};
pub use expr::{Apply, Expr};
pub use full_form::{FullForm, SpanTree};
pub use symbol::Symbol;
