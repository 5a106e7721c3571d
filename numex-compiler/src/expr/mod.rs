//! Lowering of each kind of expression node.

mod apply;
mod assign;
mod branch;
mod leaf;
mod loops;
mod scoping;

pub use leaf::constant;

use crate::{Compile, Compiler};
use numex_error::Error;
use numex_expr::{Expr, SpanTree};
use std::ops::Range;

/// An expression paired with the spans of its FullForm rendering.
#[derive(Clone, Copy, Debug)]
pub struct Node<'a> {
    /// The expression.
    pub expr: &'a Expr,

    /// Where the expression and its parts are in the FullForm text.
    pub spans: &'a SpanTree,
}

impl<'a> Node<'a> {
    /// Pairs an expression with its span tree.
    pub fn new(expr: &'a Expr, spans: &'a SpanTree) -> Self {
        Self { expr, spans }
    }

    /// The span of the whole expression.
    pub fn span(&self) -> Range<usize> {
        self.spans.span.clone()
    }

    /// The span of the head, or of the whole expression if it has none.
    pub fn head_span(&self) -> Range<usize> {
        self.spans.head_span()
    }

    /// The number of elements of an application.
    pub fn len(&self) -> usize {
        self.expr.elements().len()
    }

    /// The element at the given index.
    pub fn child(&self, index: usize) -> Node<'a> {
        Node::new(&self.expr.elements()[index], &self.spans.children[index])
    }

    /// The elements, in order.
    pub fn children(&self) -> impl Iterator<Item = Node<'a>> {
        self.expr.elements()
            .iter()
            .zip(self.spans.children.iter())
            .map(|(expr, spans)| Node::new(expr, spans))
    }

    /// Returns the elements if this is a `List` application.
    pub fn list(&self) -> Option<Vec<Node<'a>>> {
        self.expr.has_head("List").then(|| self.children().collect())
    }
}

impl Compile for Node<'_> {
    fn compile(&self, compiler: &mut Compiler) -> Result<(), Error> {
        match self.expr {
            Expr::Symbol(symbol) => leaf::compile_symbol(symbol, self.span(), compiler),
            Expr::Atom(atom) => leaf::compile_atom(atom, self.span(), compiler),
            Expr::Bulk(list) => {
                leaf::compile_bulk(list, self.span(), compiler);
                Ok(())
            },
            Expr::Apply(_) => apply::compile_apply(*self, compiler),
        }
    }
}
