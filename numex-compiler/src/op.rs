//! The table of operators the compiler understands.
//!
//! Every supported head is a ``System` `` symbol mapped to exactly one [`Rule`] describing how an
//! application of it is lowered.

use levenshtein::levenshtein;
use numex_compute::{BinOp, Primitive, Reduction};
use numex_expr::Symbol;
use once_cell::sync::Lazy;
use std::{collections::HashMap, ops::RangeInclusive};

/// One accepted argument count of a [`Rule::Function`], along with the primitive it lowers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Overload {
    /// The number of arguments.
    pub arity: usize,

    /// The primitive applied to the arguments.
    pub primitive: Primitive,

    /// Whether the primitive takes the arguments in reverse order.
    pub reversed: bool,
}

/// A control-flow construct.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    If,
    Compound,
    Module,
    Block,
    With,
    Set,

    /// `x op= v`, evaluating to the new value.
    Update(BinOp),

    /// `x++`, `x--`, `++x` or `--x`. The prefix forms evaluate to the new value, the postfix
    /// forms to the old one.
    Increment {
        op: BinOp,
        prefix: bool,
    },
    While,
    For,
    Do,
}

/// How an application of an operator is lowered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    /// The arguments are passed to the primitive of the overload matching their count.
    Function(&'static [Overload]),

    /// The arguments are folded by the reduction.
    Reduce(Reduction),

    /// Exactly two arguments combined by a binary operator.
    Infix(BinOp),

    /// The arguments are stacked into an array.
    Stack,

    /// `HypergeometricPFQ[{a}, {b}, z]`, lowered to Kummer's function.
    Hypergeometric,

    /// A control-flow construct.
    Control(Control),
}

impl Rule {
    /// The accepted argument counts.
    pub fn arity(&self) -> RangeInclusive<usize> {
        match self {
            Rule::Function(overloads) => {
                let min = overloads.iter().map(|o| o.arity).min().unwrap_or(0);
                let max = overloads.iter().map(|o| o.arity).max().unwrap_or(0);
                min..=max
            },
            Rule::Reduce(_) | Rule::Stack => 0..=usize::MAX,
            Rule::Infix(_) => 2..=2,
            Rule::Hypergeometric => 3..=3,
            Rule::Control(control) => match control {
                Control::If => 2..=3,
                Control::Compound => 0..=usize::MAX,
                Control::Module | Control::Block | Control::With => 2..=2,
                Control::Set | Control::Update(_) => 2..=2,
                Control::Increment { .. } => 1..=1,
                Control::While => 1..=2,
                Control::For => 3..=4,
                Control::Do => 2..=2,
            },
        }
    }
}

/// Describes an accepted argument count for error messages.
pub fn describe_arity(arity: &RangeInclusive<usize>) -> String {
    let (min, max) = (*arity.start(), *arity.end());
    if min == max {
        min.to_string()
    } else if max == usize::MAX {
        format!("at least {}", min)
    } else if max == min + 1 {
        format!("{} or {}", min, max)
    } else {
        format!("{} to {}", min, max)
    }
}

/// A function lowered to a single primitive of one argument.
macro_rules! unary {
    ($primitive:ident) => {
        Rule::Function(&[Overload { arity: 1, primitive: Primitive::$primitive, reversed: false }])
    };
}

macro_rules! operators {
    ($($name:ident => $rule:expr),* $(,)?) => {
        /// An operator the compiler understands, named after its ``System` `` head.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum Operator {
            $($name),*
        }

        impl Operator {
            /// Every operator.
            pub const ALL: &'static [Operator] = &[$(Operator::$name),*];

            /// The short name of the operator's head.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Operator::$name => stringify!($name)),*
                }
            }

            /// How an application of the operator is lowered.
            pub fn rule(&self) -> Rule {
                match self {
                    $(Operator::$name => $rule),*
                }
            }
        }
    };
}

operators! {
    Plus => Rule::Reduce(Reduction::Sum),
    Times => Rule::Reduce(Reduction::Product),
    Power => Rule::Infix(BinOp::Pow),
    Subtract => Rule::Infix(BinOp::Sub),
    Divide => Rule::Infix(BinOp::Div),
    Minus => unary!(Neg),
    Sqrt => unary!(Sqrt),
    CubeRoot => unary!(Cbrt),
    Exp => unary!(Exp),
    Log => Rule::Function(&[
        Overload { arity: 1, primitive: Primitive::Ln, reversed: false },
        Overload { arity: 2, primitive: Primitive::LogBase, reversed: false },
    ]),
    Log10 => unary!(Log10),
    Log2 => unary!(Log2),
    Sin => unary!(Sin),
    Cos => unary!(Cos),
    Tan => unary!(Tan),
    Cot => unary!(Cot),
    Sec => unary!(Sec),
    Csc => unary!(Csc),
    ArcSin => unary!(Asin),
    ArcCos => unary!(Acos),
    ArcTan => Rule::Function(&[
        Overload { arity: 1, primitive: Primitive::Atan, reversed: false },
        Overload { arity: 2, primitive: Primitive::Atan2, reversed: true },
    ]),
    Sinh => unary!(Sinh),
    Cosh => unary!(Cosh),
    Tanh => unary!(Tanh),
    ArcSinh => unary!(Asinh),
    ArcCosh => unary!(Acosh),
    ArcTanh => unary!(Atanh),
    Abs => unary!(Abs),
    Sign => unary!(Sign),
    Floor => unary!(Floor),
    Ceiling => unary!(Ceil),
    Round => unary!(Round),
    Mod => Rule::Function(&[Overload { arity: 2, primitive: Primitive::Mod, reversed: false }]),
    Re => unary!(Re),
    Im => unary!(Im),
    Arg => unary!(Arg),
    Conjugate => unary!(Conj),
    Gamma => Rule::Function(&[
        Overload { arity: 1, primitive: Primitive::Gamma, reversed: false },
        Overload { arity: 2, primitive: Primitive::GammaUpper, reversed: false },
    ]),
    Erf => unary!(Erf),
    Hypergeometric1F1 => Rule::Function(&[
        Overload { arity: 3, primitive: Primitive::Hyp1f1, reversed: false },
    ]),
    HypergeometricPFQ => Rule::Hypergeometric,
    Min => Rule::Reduce(Reduction::Min),
    Max => Rule::Reduce(Reduction::Max),
    Greater => Rule::Infix(BinOp::Greater),
    Less => Rule::Infix(BinOp::Less),
    GreaterEqual => Rule::Infix(BinOp::GreaterEq),
    LessEqual => Rule::Infix(BinOp::LessEq),
    Equal => Rule::Infix(BinOp::Eq),
    Unequal => Rule::Infix(BinOp::NotEq),
    And => Rule::Reduce(Reduction::All),
    Or => Rule::Reduce(Reduction::Any),
    Not => unary!(Not),
    If => Rule::Control(Control::If),
    List => Rule::Stack,
    CompoundExpression => Rule::Control(Control::Compound),
    Module => Rule::Control(Control::Module),
    Block => Rule::Control(Control::Block),
    With => Rule::Control(Control::With),
    Set => Rule::Control(Control::Set),
    AddTo => Rule::Control(Control::Update(BinOp::Add)),
    SubtractFrom => Rule::Control(Control::Update(BinOp::Sub)),
    TimesBy => Rule::Control(Control::Update(BinOp::Mul)),
    DivideBy => Rule::Control(Control::Update(BinOp::Div)),
    Increment => Rule::Control(Control::Increment { op: BinOp::Add, prefix: false }),
    Decrement => Rule::Control(Control::Increment { op: BinOp::Sub, prefix: false }),
    PreIncrement => Rule::Control(Control::Increment { op: BinOp::Add, prefix: true }),
    PreDecrement => Rule::Control(Control::Increment { op: BinOp::Sub, prefix: true }),
    While => Rule::Control(Control::While),
    For => Rule::Control(Control::For),
    Do => Rule::Control(Control::Do),
}

/// Every operator, keyed by its head symbol.
pub static OPERATORS: Lazy<HashMap<Symbol, Operator>> = Lazy::new(|| {
    Operator::ALL
        .iter()
        .map(|op| (Symbol::system(op.name()), *op))
        .collect()
});

/// Returns the operator with the given head, if it is supported.
pub fn lookup(head: &Symbol) -> Option<Operator> {
    OPERATORS.get(head).copied()
}

/// Returns the names of operators with a name similar to the given name.
pub fn similar(name: &str) -> Vec<String> {
    let mut names = Operator::ALL
        .iter()
        .map(Operator::name)
        .filter(|n| levenshtein(n, name) < 2 || n.eq_ignore_ascii_case(name))
        .map(str::to_string)
        .collect::<Vec<_>>();
    names.sort();
    names.dedup();
    names
}
