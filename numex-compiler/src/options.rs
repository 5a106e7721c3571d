#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The number domain a compiled function evaluates in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Domain {
    /// Machine reals. Results outside the real line, such as `Sqrt[-1]`, are NaN.
    #[default]
    Real,

    /// Machine complex numbers. Every numeric constant and argument is promoted to a complex
    /// number before evaluation.
    Complex,
}

/// Options controlling how an expression is compiled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompileOptions {
    /// The number domain to evaluate in.
    pub domain: Domain,
}

impl CompileOptions {
    /// Options for evaluating in the complex domain.
    pub fn complex() -> Self {
        Self { domain: Domain::Complex }
    }
}
