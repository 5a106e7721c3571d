//! Evaluates functions of two variables over rectangular grids and turns the results into 3D
//! surfaces.
//!
//! A [`GridEvaluator`] computes the height of a function at every point of a [`Grid`]. Three
//! strategies are provided:
//!
//! - [`CompiledGridEvaluator`] compiles the function once with `numex-vm` and evaluates the
//!   whole mesh in a single vectorized call.
//! - [`InterpretedGridEvaluator`] walks the expression tree directly. It understands fewer
//!   constructs, but can be extended with scalar functions the compiler does not know about.
//! - [`FallbackGridEvaluator`] compiles when it can and interprets otherwise.
//!
//! [`surface`] then lays the heights out as a `Graphics3D[GraphicsComplex[...]]` expression whose
//! vertex and polygon arrays are [`LazyBulkList`](numex_expr::LazyBulkList)s, so consumers that
//! only need the arrays never pay for symbolic elements.
//!
//! # Example
//!
//! ```
//! use numex_expr::Symbol;
//! use numex_graph::{surface, FallbackGridEvaluator, Grid};
//!
//! let expr = numex_parser::parse("Sin[x^2 + y^2]").unwrap();
//! let (x, y) = (Symbol::global("x"), Symbol::global("y"));
//! let grid = Grid::new((-2.0, 2.0), (-2.0, 2.0), (50, 50));
//!
//! let graphics = surface(&FallbackGridEvaluator::default(), &expr, &x, &y, &grid).unwrap();
//! assert!(graphics.has_head("Graphics3D"));
//! ```

pub mod error;
pub mod eval;
pub mod grid;
pub mod surface;

pub use eval::{
    CompiledGridEvaluator,
    Extension,
    FallbackGridEvaluator,
    GridEvaluator,
    InterpretedGridEvaluator,
};
pub use grid::Grid;
pub use surface::surface;
