use crate::{error::{NonNumericLiteral, NonNumericSymbol}, Compiler, InstructionKind};
use numex_compute::{consts, Value};
use numex_error::Error;
use numex_expr::{Atom, LazyBulkList, Symbol};
use std::ops::Range;

/// Returns the value of a built-in constant.
pub fn constant(symbol: &Symbol) -> Option<Value> {
    if !symbol.is_system() {
        return None;
    }

    Some(match symbol.name() {
        "Pi" => Value::from(consts::PI),
        "E" => Value::from(consts::E),
        "I" => Value::from(consts::I),
        "Degree" => Value::from(consts::DEGREE),
        "GoldenRatio" => Value::from(consts::GOLDEN_RATIO),
        "EulerGamma" => Value::from(consts::EULER_GAMMA),
        "Infinity" => Value::from(f64::INFINITY),
        "Indeterminate" => Value::from(f64::NAN),
        "True" => Value::from(true),
        "False" => Value::from(false),
        "Null" => Value::Unit,
        _ => return None,
    })
}

pub fn compile_symbol(
    symbol: &Symbol,
    span: Range<usize>,
    compiler: &mut Compiler,
) -> Result<(), Error> {
    if let Some(local) = compiler.resolve_slot(symbol) {
        compiler.add_instr_with_spans(InstructionKind::LoadSlot(local.slot), vec![span]);
    } else if let Some(value) = constant(symbol) {
        compiler.load_const(value, vec![span]);
    } else if symbol.is_system() {
        return Err(Error::new(vec![span], NonNumericSymbol {
            name: symbol.name().to_string(),
        }));
    } else {
        // raised at call time, and only if this instruction is reached
        compiler.add_instr_with_spans(InstructionKind::LoadUnbound(symbol.clone()), vec![span]);
    }
    Ok(())
}

pub fn compile_atom(atom: &Atom, span: Range<usize>, compiler: &mut Compiler) -> Result<(), Error> {
    let Some(value) = Value::from_atom(atom) else {
        return Err(Error::new(vec![span], NonNumericLiteral {
            literal: atom.to_string(),
        }));
    };
    compiler.load_const(value, vec![span]);
    Ok(())
}

pub fn compile_bulk(list: &LazyBulkList, span: Range<usize>, compiler: &mut Compiler) {
    compiler.load_const(Value::from_numeric_array(list.value()), vec![span]);
}
