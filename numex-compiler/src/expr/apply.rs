use crate::{
    error::{ArityMismatch, UnrecognizedOperator, UnsupportedHypergeometric},
    op::{self, Control, Operator, Rule},
    Compile,
    Compiler,
    InstructionKind,
};
use numex_compute::Primitive;
use numex_error::Error;
use numex_expr::Expr;
use super::{assign, branch, loops, scoping, Node};

/// Compiles an application of a head to its elements.
pub fn compile_apply(node: Node, compiler: &mut Compiler) -> Result<(), Error> {
    let head = node.expr.head_symbol();
    let Some(operator) = head.and_then(op::lookup) else {
        let name = match (head, node.expr) {
            (Some(symbol), _) => symbol.name().to_string(),
            (None, Expr::Apply(apply)) => apply.head.to_string(),
            (None, expr) => expr.to_string(),
        };
        return Err(Error::new(vec![node.head_span(), node.span()], UnrecognizedOperator {
            suggestions: op::similar(&name),
            name,
        }));
    };

    let rule = operator.rule();
    if !rule.arity().contains(&node.len()) {
        return Err(arity_mismatch(operator, node));
    }

    match rule {
        Rule::Function(overloads) => {
            let overload = overloads
                .iter()
                .find(|overload| overload.arity == node.len())
                .ok_or_else(|| arity_mismatch(operator, node))?;

            node.children().try_for_each(|child| child.compile(compiler))?;
            if overload.reversed {
                compiler.add_instr(InstructionKind::Swap);
            }
            compiler.add_instr_with_spans(InstructionKind::Call(overload.primitive), vec![node.span()]);
        },
        Rule::Reduce(reduction) => {
            node.children().try_for_each(|child| child.compile(compiler))?;
            compiler.add_instr_with_spans(
                InstructionKind::Reduce(reduction, node.len()),
                vec![node.span()],
            );
        },
        Rule::Infix(bin_op) => {
            let (lhs, rhs) = (node.child(0), node.child(1));

            // `x^(1/2)` is the same function as `Sqrt[x]`
            let is_sqrt = operator == Operator::Power
                && rhs.expr.as_atom().is_some_and(|atom| atom.is_one_half());

            lhs.compile(compiler)?;
            if is_sqrt {
                compiler.add_instr_with_spans(InstructionKind::Call(Primitive::Sqrt), vec![node.span()]);
            } else {
                rhs.compile(compiler)?;
                compiler.add_instr_with_spans(InstructionKind::Binary(bin_op), vec![node.span()]);
            }
        },
        Rule::Stack => {
            node.children().try_for_each(|child| child.compile(compiler))?;
            compiler.add_instr_with_spans(InstructionKind::Stack(node.len()), vec![node.span()]);
        },
        Rule::Hypergeometric => compile_hypergeometric(node, compiler)?,
        Rule::Control(control) => match control {
            Control::If => branch::compile_if(node, compiler)?,
            Control::Compound => branch::compile_compound(node, compiler)?,
            Control::Module | Control::Block => scoping::compile_scope(node, false, compiler)?,
            Control::With => scoping::compile_scope(node, true, compiler)?,
            Control::Set => assign::compile_set(node, compiler)?,
            Control::Update(bin_op) => assign::compile_update(node, bin_op, compiler)?,
            Control::Increment { op: bin_op, prefix } => {
                assign::compile_increment(node, bin_op, prefix, compiler)?
            },
            Control::While => loops::compile_while(node, compiler)?,
            Control::For => loops::compile_for(node, compiler)?,
            Control::Do => loops::compile_do(node, compiler)?,
        },
    }

    Ok(())
}

fn arity_mismatch(operator: Operator, node: Node) -> Error {
    Error::new(vec![node.span()], ArityMismatch {
        name: operator.name().to_string(),
        expected: op::describe_arity(&operator.rule().arity()),
        given: node.len(),
    })
}

/// `HypergeometricPFQ[{a}, {b}, z]` is Kummer's function `1F1(a; b; z)`.
fn compile_hypergeometric(node: Node, compiler: &mut Compiler) -> Result<(), Error> {
    let (upper, lower) = (node.child(0).list(), node.child(1).list());
    let (p, q) = (
        upper.as_ref().map_or(0, Vec::len),
        lower.as_ref().map_or(0, Vec::len),
    );
    let (Some([a]), Some([b])) = (upper.as_deref(), lower.as_deref()) else {
        return Err(Error::new(vec![node.span()], UnsupportedHypergeometric { p, q }));
    };

    a.compile(compiler)?;
    b.compile(compiler)?;
    node.child(2).compile(compiler)?;
    compiler.add_instr_with_spans(InstructionKind::Call(Primitive::Hyp1f1), vec![node.span()]);
    Ok(())
}
