//! Parser for a small subset of InputForm, producing [`Expr`] trees.
//!
//! ```
//! use numex_parser::parse;
//!
//! let expr = parse("Sin[(x^2 + y^2) freq] amp").unwrap();
//! assert_eq!(expr.to_string(), "Times[Sin[Times[Plus[Power[x, 2], Power[y, 2]], freq]], amp]");
//! ```
//!
//! Supported syntax: integer, real and string literals; symbols with optional contexts;
//! applications `f[a, b]`; lists `{a, b}`; the arithmetic operators `+ - * / ^` and implicit
//! multiplication; comparisons `== != < <= > >=`; the logical operators `&& || !`; assignments
//! `= += -= *= /=`; `++` and `--` in prefix and postfix position; and `;` for compound
//! expressions. Comments are written `(* like this *)`.

pub mod error;
pub mod parser;
pub mod tokenizer;

use numex_error::Error;
use numex_expr::Expr;
pub use parser::Parser;

/// Parses a complete expression from the given source.
pub fn parse(source: &str) -> Result<Expr, Error> {
    Parser::new(source).parse_full()
}
