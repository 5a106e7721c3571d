use crate::{Compile, Compiler, InstructionKind};
use numex_compute::Value;
use numex_error::Error;
use super::Node;

/// `If[c, t]` and `If[c, t, f]`. Each branch gets its own chunk so that an array condition can
/// run both of them.
pub fn compile_if(node: Node, compiler: &mut Compiler) -> Result<(), Error> {
    let condition = node.child(0);
    condition.compile(compiler)?;

    let then = compiler.new_chunk(|compiler| node.child(1).compile(compiler))?;
    let otherwise = compiler.new_chunk(|compiler| {
        if node.len() == 3 {
            node.child(2).compile(compiler)
        } else {
            compiler.add_instr(InstructionKind::LoadConst(Value::Unit));
            Ok(())
        }
    })?;

    compiler.add_instr_with_spans(
        InstructionKind::Branch { then, otherwise },
        // for error if the condition isn't boolean
        vec![condition.span(), node.span()],
    );
    Ok(())
}

/// `CompoundExpression[e1, ..., en]` evaluates to `en`.
pub fn compile_compound(node: Node, compiler: &mut Compiler) -> Result<(), Error> {
    if node.len() == 0 {
        compiler.add_instr(InstructionKind::LoadConst(Value::Unit));
        return Ok(());
    }

    let last = node.len() - 1;
    for (i, child) in node.children().enumerate() {
        child.compile(compiler)?;
        if i < last {
            compiler.add_instr(InstructionKind::Drop);
        }
    }
    Ok(())
}
