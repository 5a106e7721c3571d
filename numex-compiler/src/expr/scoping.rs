use crate::{error::InvalidLocalSpec, scope::Local, Compile, Compiler, InstructionKind};
use numex_error::Error;
use numex_expr::Symbol;
use std::collections::HashSet;
use super::Node;

/// A local declared by a scoping construct, with its initial value if it has one.
struct Declaration<'a> {
    symbol: &'a Symbol,
    init: Option<Node<'a>>,
}

fn invalid_spec(node: Node) -> Error {
    Error::new(vec![node.span()], InvalidLocalSpec {
        spec: node.expr.to_string(),
    })
}

/// Parses `{x, y = v, ...}`. Constants must all have an initial value.
fn declarations<'a>(spec: Node<'a>, constants: bool) -> Result<Vec<Declaration<'a>>, Error> {
    let elements = spec.list().ok_or_else(|| invalid_spec(spec))?;
    let mut seen = HashSet::new();

    elements
        .into_iter()
        .map(|element| {
            let declaration = if element.expr.has_head("Set") && element.len() == 2 {
                Declaration {
                    symbol: element.child(0).expr.as_symbol().ok_or_else(|| invalid_spec(element))?,
                    init: Some(element.child(1)),
                }
            } else if let (Some(symbol), false) = (element.expr.as_symbol(), constants) {
                Declaration { symbol, init: None }
            } else {
                return Err(invalid_spec(element));
            };

            if declaration.symbol.is_system() || !seen.insert(declaration.symbol) {
                return Err(invalid_spec(element));
            }
            Ok(declaration)
        })
        .collect()
}

/// `Module[{x, y = v, ...}, body]`, `Block[...]` and `With[{x = v, ...}, body]`.
///
/// Every local gets a fresh slot. Initial values are evaluated before any of the locals are
/// bound, so they refer to the enclosing scope.
pub fn compile_scope(node: Node, constants: bool, compiler: &mut Compiler) -> Result<(), Error> {
    let declarations = declarations(node.child(0), constants)?;

    let mut locals = Vec::with_capacity(declarations.len());
    for declaration in &declarations {
        let slot = compiler.new_slot();
        match declaration.init {
            Some(init) => {
                init.compile(compiler)?;
                compiler.add_instr(InstructionKind::StoreSlot(slot));
                compiler.add_instr(InstructionKind::Drop);
            },
            None => compiler.add_instr(InstructionKind::ClearSlot(slot)),
        }
        locals.push((declaration.symbol.clone(), Local { slot, constant: constants }));
    }

    compiler.new_scope(|compiler| {
        for (symbol, local) in locals {
            compiler.add_local(symbol, local);
        }
        node.child(1).compile(compiler)
    })
}
