use crate::{
    error::{InternalError, NonScalarCondition, UnboundSymbol, UninitializedLocal},
    frame::Frame,
};
use numex_compiler::{Instruction, InstructionKind, Label, Program};
use numex_compute::Value;
use numex_error::Error;
use std::ops::Range;

/// A virtual machine running a [`Program`] once.
///
/// The machine owns a value stack and a [`Frame`]. Branch chunks run on the same stack and
/// frame as the instruction that selects them. Entering one pushes a `ChunkCall` onto an
/// explicit call stack.
#[derive(Debug)]
pub struct Vm<'a> {
    /// The program being run.
    program: &'a Program,

    /// The value stack.
    stack: Vec<Value>,

    /// The slots of the function.
    frame: Frame,
}

impl<'a> Vm<'a> {
    /// Creates a machine that runs `program` with the given arguments bound to its parameters.
    pub fn new(program: &'a Program, arguments: Vec<Value>) -> Self {
        Self {
            program,
            stack: Vec::new(),
            frame: Frame::new(program.slots, arguments),
        }
    }

    /// Runs the program to completion, returning the value it evaluates to.
    pub fn run(mut self) -> Result<Value, Error> {
        let program = self.program;
        let mut calls = vec![ChunkCall::new(0, Resume::Continue)];
        log::trace!("running chunk 0 of `{}`", program.source.text);

        while let Some(call) = calls.last_mut() {
            let chunk = call.chunk;
            let Some(instruction) = program.chunks[chunk].instructions.get(call.ip) else {
                if let Some(finished) = calls.pop() {
                    self.resume(finished.resume, &mut calls)?;
                }
                continue;
            };
            call.ip += 1;

            match self.execute(instruction, chunk)? {
                Step::Next => (),
                Step::Jump(ip) => {
                    if let Some(call) = calls.last_mut() {
                        call.ip = ip;
                    }
                },
                Step::Enter(call) => {
                    log::trace!("running chunk {} of `{}`", call.chunk, program.source.text);
                    calls.push(call);
                },
            }
        }

        self.pop("Return", &[])
    }

    /// Builds an [`InternalError`] for a broken invariant of the bytecode.
    fn internal(&self, instruction: &str, spans: &[Range<usize>], data: String) -> Error {
        Error::new(spans.to_vec(), InternalError {
            instruction: instruction.to_string(),
            data,
        })
    }

    fn pop(&mut self, instruction: &str, spans: &[Range<usize>]) -> Result<Value, Error> {
        match self.stack.pop() {
            Some(value) => Ok(value),
            None => Err(self.internal(instruction, spans, "value stack is empty".to_string())),
        }
    }

    /// Pops the top `n` values, returning them deepest first.
    fn pop_n(&mut self, n: usize, instruction: &str, spans: &[Range<usize>]) -> Result<Vec<Value>, Error> {
        if self.stack.len() < n {
            return Err(self.internal(
                instruction,
                spans,
                format!("needed {} values, but the stack holds {}", n, self.stack.len()),
            ));
        }
        Ok(self.stack.split_off(self.stack.len() - n))
    }

    /// Resolves a label, which must point into the given chunk.
    fn target(&self, label: Label, chunk: usize, spans: &[Range<usize>]) -> Result<usize, Error> {
        match self.program.labels.get(&label) {
            Some(&(target_chunk, index)) if target_chunk == chunk => Ok(index),
            other => Err(self.internal(
                "Jump",
                spans,
                format!("label {:?} resolves to {:?} outside chunk {}", label, other, chunk),
            )),
        }
    }

    /// Returns the FullForm text at the first span, used to name the culprit of an error.
    fn source_text(&self, spans: &[Range<usize>]) -> String {
        spans.first()
            .and_then(|span| self.program.source.text.get(span.clone()))
            .unwrap_or_default()
            .to_string()
    }

    /// Finishes a chunk call by applying what its caller was waiting for.
    fn resume(&mut self, resume: Resume<'a>, calls: &mut Vec<ChunkCall<'a>>) -> Result<(), Error> {
        match resume {
            Resume::Continue => (),
            Resume::Otherwise { condition, otherwise, spans } => {
                let then_value = self.pop("Branch", spans)?;
                log::trace!("running chunk {} of `{}`", otherwise, self.program.source.text);
                calls.push(ChunkCall::new(otherwise, Resume::Select { condition, then_value, spans }));
            },
            Resume::Select { condition, then_value, spans } => {
                let otherwise_value = self.pop("Branch", spans)?;
                let value = Value::select(&condition, then_value, otherwise_value)
                    .map_err(|err| err.into_error(spans.to_vec()))?;
                self.stack.push(value);
            },
        }
        Ok(())
    }

    /// Executes one instruction of the given chunk, returning where control goes next.
    fn execute(&mut self, instruction: &'a Instruction, chunk: usize) -> Result<Step<'a>, Error> {
        let spans = instruction.spans.as_slice();

        match &instruction.kind {
            InstructionKind::LoadConst(value) => self.stack.push(value.clone()),
            InstructionKind::LoadSlot(slot) => {
                let Some(value) = self.frame.get(*slot).cloned() else {
                    return Err(Error::new(spans.to_vec(), UninitializedLocal {
                        name: self.source_text(spans),
                    }));
                };
                self.stack.push(value);
            },
            InstructionKind::StoreSlot(slot) => {
                let Some(value) = self.stack.last().cloned() else {
                    return Err(self.internal("StoreSlot", spans, "value stack is empty".to_string()));
                };
                self.frame.set(*slot, value);
            },
            InstructionKind::ClearSlot(slot) => self.frame.clear(*slot),
            InstructionKind::LoadUnbound(symbol) => {
                return Err(Error::new(spans.to_vec(), UnboundSymbol {
                    name: symbol.to_string(),
                }));
            },
            InstructionKind::Drop => {
                self.pop("Drop", spans)?;
            },
            InstructionKind::Swap => {
                let values = self.pop_n(2, "Swap", spans)?;
                self.stack.extend(values.into_iter().rev());
            },
            InstructionKind::Call(primitive) => {
                let args = self.pop_n(primitive.arity(), primitive.name(), spans)?;
                let value = primitive.apply(args).map_err(|err| err.into_error(spans.to_vec()))?;
                self.stack.push(value);
            },
            InstructionKind::Binary(op) => {
                let right = self.pop(op.name(), spans)?;
                let left = self.pop(op.name(), spans)?;
                let value = op.apply(&left, &right).map_err(|err| err.into_error(spans.to_vec()))?;
                self.stack.push(value);
            },
            InstructionKind::Reduce(reduction, n) => {
                let operands = self.pop_n(*n, "Reduce", spans)?;
                let value = reduction.apply(operands).map_err(|err| err.into_error(spans.to_vec()))?;
                self.stack.push(value);
            },
            InstructionKind::Stack(n) => {
                let values = self.pop_n(*n, "Stack", spans)?;
                let value = Value::stack(values).map_err(|err| err.into_error(spans.to_vec()))?;
                self.stack.push(value);
            },
            InstructionKind::Branch { then, otherwise } => {
                let condition = self.pop("Branch", spans)?;
                let call = match condition.as_bool_scalar() {
                    Some(true) => ChunkCall::new(*then, Resume::Continue),
                    Some(false) => ChunkCall::new(*otherwise, Resume::Continue),
                    // array condition: evaluate both and pick elementwise
                    None => ChunkCall::new(*then, Resume::Otherwise {
                        condition,
                        otherwise: *otherwise,
                        spans,
                    }),
                };
                return Ok(Step::Enter(call));
            },
            InstructionKind::Jump(label) => return Ok(Step::Jump(self.target(*label, chunk, spans)?)),
            InstructionKind::JumpIfFalse(label) => {
                let condition = self.pop("JumpIfFalse", spans)?;
                match condition.as_bool_scalar() {
                    Some(true) => (),
                    Some(false) => return Ok(Step::Jump(self.target(*label, chunk, spans)?)),
                    None => return Err(Error::new(spans.to_vec(), NonScalarCondition {
                        typename: condition.typename(),
                        shape: condition.shape().to_vec(),
                    })),
                }
            },
        }

        Ok(Step::Next)
    }
}

/// A chunk being run, with the index of its next instruction.
#[derive(Debug)]
struct ChunkCall<'a> {
    chunk: usize,
    ip: usize,

    /// What to do once the chunk runs off its end.
    resume: Resume<'a>,
}

impl<'a> ChunkCall<'a> {
    fn new(chunk: usize, resume: Resume<'a>) -> Self {
        Self { chunk, ip: 0, resume }
    }
}

/// Work left pending by a `Branch` while one of its chunks runs.
#[derive(Debug)]
enum Resume<'a> {
    /// The chunk's value stays on the stack as the branch's value.
    Continue,

    /// The `then` chunk of an array condition finished; run `otherwise` next.
    Otherwise {
        condition: Value,
        otherwise: usize,
        spans: &'a [Range<usize>],
    },

    /// Both chunks finished; merge them elementwise by the condition.
    Select {
        condition: Value,
        then_value: Value,
        spans: &'a [Range<usize>],
    },
}

/// Where control goes after an instruction.
enum Step<'a> {
    Next,
    Jump(usize),
    Enter(ChunkCall<'a>),
}
