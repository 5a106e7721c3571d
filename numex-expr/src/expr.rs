use crate::{atom::Atom, bulk::LazyBulkList, symbol::Symbol};
use num_complex::Complex64;

/// An application of a head to an ordered list of elements, such as `Sin[x]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Apply {
    /// The head of the application, usually a symbol.
    pub head: Box<Expr>,

    /// The elements, in order.
    pub elements: Vec<Expr>,
}

/// A symbolic expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// A symbol, such as `x` or `Pi`.
    Symbol(Symbol),

    /// A number or string literal.
    Atom(Atom),

    /// An application, such as `Plus[x, 1]`.
    Apply(Apply),

    /// A numeric array standing in for a (possibly nested) `List`.
    Bulk(LazyBulkList),
}

impl Expr {
    /// Applies `head` to the given elements.
    pub fn apply(head: impl Into<Expr>, elements: Vec<Expr>) -> Self {
        Self::Apply(Apply {
            head: Box::new(head.into()),
            elements,
        })
    }

    /// Applies the ``System` `` symbol with the given name to the given elements.
    pub fn call(name: &str, elements: Vec<Expr>) -> Self {
        Self::apply(Symbol::system(name), elements)
    }

    /// Builds a `List` of the given elements.
    pub fn list(elements: Vec<Expr>) -> Self {
        Self::call("List", elements)
    }

    /// Returns the symbol if this expression is one.
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Self::Symbol(symbol) => Some(symbol),
            _ => None,
        }
    }

    /// Returns the atom if this expression is one.
    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Self::Atom(atom) => Some(atom),
            _ => None,
        }
    }

    /// Returns the head symbol of an application whose head is a symbol.
    pub fn head_symbol(&self) -> Option<&Symbol> {
        match self {
            Self::Apply(apply) => apply.head.as_symbol(),
            _ => None,
        }
    }

    /// Returns true if this is an application of the ``System` `` symbol with the given name.
    pub fn has_head(&self, name: &str) -> bool {
        self.head_symbol().is_some_and(|head| head.is_system_named(name))
    }

    /// The elements of an application, or an empty slice for anything else.
    pub fn elements(&self) -> &[Expr] {
        match self {
            Self::Apply(apply) => &apply.elements,
            _ => &[],
        }
    }
}

impl From<Symbol> for Expr {
    fn from(symbol: Symbol) -> Self {
        Self::Symbol(symbol)
    }
}

impl From<Atom> for Expr {
    fn from(atom: Atom) -> Self {
        Self::Atom(atom)
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        Self::Atom(n.into())
    }
}

impl From<f64> for Expr {
    fn from(x: f64) -> Self {
        Self::Atom(x.into())
    }
}

impl From<Complex64> for Expr {
    fn from(z: Complex64) -> Self {
        Self::Atom(z.into())
    }
}

impl From<LazyBulkList> for Expr {
    fn from(list: LazyBulkList) -> Self {
        Self::Bulk(list)
    }
}
