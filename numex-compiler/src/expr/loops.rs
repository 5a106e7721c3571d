use crate::{error::InvalidIteratorSpec, scope::Local, Compile, Compiler, InstructionKind};
use numex_compute::{BinOp, Value};
use numex_error::Error;
use numex_expr::Symbol;
use super::Node;

/// `While[test, body]` evaluates to `Null`.
pub fn compile_while(node: Node, compiler: &mut Compiler) -> Result<(), Error> {
    let condition_start = compiler.new_end_label();
    let test = node.child(0);
    test.compile(compiler)?;

    let loop_end = compiler.new_unassociated_label();
    compiler.add_instr_with_spans(InstructionKind::JumpIfFalse(loop_end), vec![test.span()]);
    if node.len() == 2 {
        node.child(1).compile(compiler)?;
        compiler.add_instr(InstructionKind::Drop);
    }
    compiler.add_instr(InstructionKind::Jump(condition_start));

    compiler.set_end_label(loop_end);
    compiler.add_instr(InstructionKind::LoadConst(Value::Unit));
    Ok(())
}

/// `For[start, test, incr, body]` evaluates to `Null`.
pub fn compile_for(node: Node, compiler: &mut Compiler) -> Result<(), Error> {
    node.child(0).compile(compiler)?;
    compiler.add_instr(InstructionKind::Drop);

    let condition_start = compiler.new_end_label();
    let test = node.child(1);
    test.compile(compiler)?;

    let loop_end = compiler.new_unassociated_label();
    compiler.add_instr_with_spans(InstructionKind::JumpIfFalse(loop_end), vec![test.span()]);
    if node.len() == 4 {
        node.child(3).compile(compiler)?;
        compiler.add_instr(InstructionKind::Drop);
    }
    node.child(2).compile(compiler)?;
    compiler.add_instr(InstructionKind::Drop);
    compiler.add_instr(InstructionKind::Jump(condition_start));

    compiler.set_end_label(loop_end);
    compiler.add_instr(InstructionKind::LoadConst(Value::Unit));
    Ok(())
}

/// The parts of a `Do` iterator. Missing bounds default to 1.
struct DoIterator<'a> {
    variable: Option<&'a Symbol>,
    min: Option<Node<'a>>,
    max: Node<'a>,
    step: Option<Node<'a>>,
}

fn iterator<'a>(spec: Node<'a>) -> Result<DoIterator<'a>, Error> {
    let invalid = || Error::new(vec![spec.span()], InvalidIteratorSpec {
        spec: spec.expr.to_string(),
    });
    let elements = spec.list().ok_or_else(invalid)?;

    let variable = |node: &Node<'a>| node.expr
        .as_symbol()
        .filter(|symbol| !symbol.is_system())
        .ok_or_else(invalid);

    Ok(match elements.as_slice() {
        [max] => DoIterator { variable: None, min: None, max: *max, step: None },
        [i, max] => DoIterator { variable: Some(variable(i)?), min: None, max: *max, step: None },
        [i, min, max] => DoIterator {
            variable: Some(variable(i)?),
            min: Some(*min),
            max: *max,
            step: None,
        },
        [i, min, max, step] => DoIterator {
            variable: Some(variable(i)?),
            min: Some(*min),
            max: *max,
            step: Some(*step),
        },
        _ => return Err(invalid()),
    })
}

/// Compiles `node` and stores its value in a fresh slot, or the value 1 if there is no node.
fn store_bound(node: Option<Node>, compiler: &mut Compiler) -> Result<usize, Error> {
    match node {
        Some(node) => node.compile(compiler)?,
        None => compiler.load_const(Value::from(1.0), Vec::new()),
    }
    let slot = compiler.new_slot();
    compiler.add_instr(InstructionKind::StoreSlot(slot));
    compiler.add_instr(InstructionKind::Drop);
    Ok(slot)
}

/// `Do[body, {i, min, max, step}]` evaluates to `Null`.
///
/// The bounds and the step are evaluated once, before the first iteration. The loop runs while
/// `(i - max) step <= 0`, which covers both positive and negative steps. The iteration variable
/// is a copy of the hidden counter, refreshed at the top of every pass, so the body may assign to
/// it without changing the sequence.
pub fn compile_do(node: Node, compiler: &mut Compiler) -> Result<(), Error> {
    let spec = node.child(1);
    let iterator = iterator(spec)?;

    let counter = store_bound(iterator.min, compiler)?;
    let max = store_bound(Some(iterator.max), compiler)?;
    let step = store_bound(iterator.step, compiler)?;

    let condition_start = compiler.new_end_label();
    compiler.add_instr(InstructionKind::LoadSlot(counter));
    compiler.add_instr(InstructionKind::LoadSlot(max));
    compiler.add_instr(InstructionKind::Binary(BinOp::Sub));
    compiler.add_instr(InstructionKind::LoadSlot(step));
    compiler.add_instr_with_spans(InstructionKind::Binary(BinOp::Mul), vec![spec.span()]);
    compiler.load_const(Value::from(0.0), Vec::new());
    compiler.add_instr_with_spans(InstructionKind::Binary(BinOp::LessEq), vec![spec.span()]);

    let loop_end = compiler.new_unassociated_label();
    compiler.add_instr_with_spans(InstructionKind::JumpIfFalse(loop_end), vec![spec.span()]);
    compiler.new_scope(|compiler| {
        if let Some(variable) = iterator.variable {
            let slot = compiler.new_slot();
            compiler.add_instr(InstructionKind::LoadSlot(counter));
            compiler.add_instr(InstructionKind::StoreSlot(slot));
            compiler.add_instr(InstructionKind::Drop);
            compiler.add_local(variable.clone(), Local { slot, constant: false });
        }
        node.child(0).compile(compiler)?;
        compiler.add_instr(InstructionKind::Drop);
        Ok(())
    })?;

    compiler.add_instr(InstructionKind::LoadSlot(counter));
    compiler.add_instr(InstructionKind::LoadSlot(step));
    compiler.add_instr(InstructionKind::Binary(BinOp::Add));
    compiler.add_instr(InstructionKind::StoreSlot(counter));
    compiler.add_instr(InstructionKind::Drop);
    compiler.add_instr(InstructionKind::Jump(condition_start));

    compiler.set_end_label(loop_end);
    compiler.add_instr(InstructionKind::LoadConst(Value::Unit));
    Ok(())
}
