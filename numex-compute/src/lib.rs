//! Numeric values and vectorized kernels.
//!
//! Every operation works elementwise over n-dimensional arrays and broadcasts its operands
//! following NumPy's rules. Scalars are rank-0 arrays. Out-of-domain inputs produce NaN or
//! infinities instead of errors; only structural problems (incompatible shapes, booleans used as
//! numbers) raise [`EvalError`]s.

pub mod binary;
pub mod broadcast;
pub mod consts;
pub mod error;
pub mod func;
pub mod reduce;
pub mod special;
pub mod value;

pub use binary::BinOp;
pub use error::EvalError;
pub use func::Primitive;
pub use reduce::Reduction;
pub use value::Value;
