use crate::{
    error::{AssignToConstant, InvalidAssignTarget},
    Compile,
    Compiler,
    InstructionKind,
};
use numex_compute::{BinOp, Value};
use numex_error::Error;
use super::Node;

/// Resolves the slot assigned to by `node`, whose first element is the target.
fn target_slot(node: Node, compiler: &Compiler) -> Result<usize, Error> {
    let target = node.child(0);
    let local = target.expr
        .as_symbol()
        .and_then(|symbol| compiler.resolve_slot(symbol))
        .ok_or_else(|| Error::new(vec![target.span(), node.span()], InvalidAssignTarget {
            target: target.expr.to_string(),
        }))?;

    if local.constant {
        return Err(Error::new(vec![node.span()], AssignToConstant {
            name: target.expr.to_string(),
        }));
    }
    Ok(local.slot)
}

/// `Set[x, v]` evaluates to `v`.
pub fn compile_set(node: Node, compiler: &mut Compiler) -> Result<(), Error> {
    let slot = target_slot(node, compiler)?;
    node.child(1).compile(compiler)?;
    compiler.add_instr_with_spans(InstructionKind::StoreSlot(slot), vec![node.span()]);
    Ok(())
}

/// `AddTo[x, v]` and friends evaluate to the new value of `x`.
pub fn compile_update(node: Node, op: BinOp, compiler: &mut Compiler) -> Result<(), Error> {
    let slot = target_slot(node, compiler)?;
    compiler.add_instr_with_spans(InstructionKind::LoadSlot(slot), vec![node.child(0).span()]);
    node.child(1).compile(compiler)?;
    compiler.add_instr_with_spans(InstructionKind::Binary(op), vec![node.span()]);
    compiler.add_instr(InstructionKind::StoreSlot(slot));
    Ok(())
}

/// `Increment[x]` and `Decrement[x]` evaluate to the old value of `x`, `PreIncrement[x]` and
/// `PreDecrement[x]` to the new one.
pub fn compile_increment(
    node: Node,
    op: BinOp,
    prefix: bool,
    compiler: &mut Compiler,
) -> Result<(), Error> {
    let slot = target_slot(node, compiler)?;
    let target = node.child(0).span();

    if !prefix {
        compiler.add_instr_with_spans(InstructionKind::LoadSlot(slot), vec![target.clone()]);
    }
    compiler.add_instr_with_spans(InstructionKind::LoadSlot(slot), vec![target]);
    compiler.load_const(Value::from(1.0), vec![node.span()]);
    compiler.add_instr_with_spans(InstructionKind::Binary(op), vec![node.span()]);
    compiler.add_instr(InstructionKind::StoreSlot(slot));
    if !prefix {
        compiler.add_instr(InstructionKind::Drop);
    }
    Ok(())
}
