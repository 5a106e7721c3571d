//! FullForm rendering of expressions, with the byte range of every node.
//!
//! Diagnostics produced while compiling or running an expression point into this text.

use crate::expr::Expr;
use std::{fmt, ops::Range};

/// The byte range of a node in the FullForm text, along with the ranges of its head and
/// elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpanTree {
    /// The range covered by the whole node.
    pub span: Range<usize>,

    /// The range tree of the head, for applications.
    pub head: Option<Box<SpanTree>>,

    /// The range trees of the elements, for applications.
    pub children: Vec<SpanTree>,
}

impl SpanTree {
    fn leaf(span: Range<usize>) -> Self {
        Self {
            span,
            head: None,
            children: Vec::new(),
        }
    }

    /// The span of the head, or of the whole node if it has no head.
    pub fn head_span(&self) -> Range<usize> {
        self.head.as_ref().map_or_else(|| self.span.clone(), |head| head.span.clone())
    }
}

/// An expression rendered in FullForm.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FullForm {
    /// The rendered text.
    pub text: String,

    /// The spans of every node in [`FullForm::text`].
    pub spans: SpanTree,
}

fn render(expr: &Expr, out: &mut String) -> SpanTree {
    let start = out.len();
    match expr {
        Expr::Symbol(symbol) => out.push_str(&symbol.to_string()),
        Expr::Atom(atom) => out.push_str(&atom.to_string()),
        Expr::Bulk(list) => {
            // printing a bulk list never materializes it
            let dims = list.shape()
                .iter()
                .map(usize::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!("NumericArray[{{{}}}, \"{}\"]", dims, list.element_type()));
        },
        Expr::Apply(apply) => {
            let head = render(&apply.head, out);
            out.push('[');
            let children = apply.elements
                .iter()
                .enumerate()
                .map(|(i, element)| {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    render(element, out)
                })
                .collect();
            out.push(']');
            return SpanTree {
                span: start..out.len(),
                head: Some(Box::new(head)),
                children,
            };
        },
    }
    SpanTree::leaf(start..out.len())
}

impl Expr {
    /// Renders the expression in FullForm, recording where every node lands in the text.
    pub fn full_form(&self) -> FullForm {
        let mut text = String::new();
        let spans = render(self, &mut text);
        FullForm { text, spans }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_form().text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bulk::LazyBulkList, symbol::Symbol};
    use ndarray::{ArrayD, IxDyn};
    use pretty_assertions::assert_eq;

    fn x() -> Expr {
        Symbol::global("x").into()
    }

    #[test]
    fn nested_text() {
        let expr = Expr::call("Sin", vec![Expr::call("Times", vec![x(), 2i64.into()])]);
        assert_eq!(expr.to_string(), "Sin[Times[x, 2]]");
    }

    #[test]
    fn spans_point_at_nodes() {
        let inner = Expr::call("Power", vec![x(), 2.5.into()]);
        let expr = Expr::call("Plus", vec![inner, Symbol::system("Pi").into()]);
        let FullForm { text, spans } = expr.full_form();
        assert_eq!(text, "Plus[Power[x, 2.5], Pi]");
        assert_eq!(&text[spans.span.clone()], text);
        assert_eq!(&text[spans.head_span()], "Plus");
        assert_eq!(&text[spans.children[0].span.clone()], "Power[x, 2.5]");
        assert_eq!(&text[spans.children[0].children[1].span.clone()], "2.5");
        assert_eq!(&text[spans.children[1].span.clone()], "Pi");
    }

    #[test]
    fn empty_application() {
        let expr = Expr::call("Plus", vec![]);
        let form = expr.full_form();
        assert_eq!(form.text, "Plus[]");
        assert!(form.spans.children.is_empty());
    }

    #[test]
    fn bulk_prints_without_materializing() {
        let list = LazyBulkList::from_array(ArrayD::<f64>::zeros(IxDyn(&[3, 2]))).unwrap();
        let expr = Expr::call("Point", vec![list.clone().into()]);
        assert_eq!(expr.to_string(), "Point[NumericArray[{3, 2}, \"Real64\"]]");
        assert!(!list.is_materialized());
    }
}
