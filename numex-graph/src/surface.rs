//! Builds `Graphics3D` surfaces out of grid evaluations.

use crate::{eval::GridEvaluator, grid::Grid};
use ndarray::{ArrayD, IxDyn};
use numex_error::Error;
use numex_expr::{Expr, LazyBulkList, Symbol};
use rayon::prelude::*;

/// Evaluates the function of `x` and `y` over the grid and builds the surface
///
/// ```text
/// Graphics3D[GraphicsComplex[vertices, Polygon[quads]]]
/// ```
///
/// where `vertices` is an `n × 3` array of `{x, y, z}` points and `quads` an array of 1-based
/// vertex indices, both as [`LazyBulkList`]s. If `expr` is a `List` of functions, each one is
/// evaluated in parallel and becomes its own `GraphicsComplex`, all sharing the same quads:
///
/// ```text
/// Graphics3D[{GraphicsComplex[...], GraphicsComplex[...], ...}]
/// ```
pub fn surface(
    evaluator: &dyn GridEvaluator,
    expr: &Expr,
    x: &Symbol,
    y: &Symbol,
    grid: &Grid,
) -> Result<Expr, Error> {
    let quads = Expr::Bulk(LazyBulkList::from_array(grid.quads())?);
    let complex = |heights: ArrayD<f64>| -> Result<Expr, Error> {
        Ok(Expr::call("GraphicsComplex", vec![
            Expr::Bulk(LazyBulkList::from_array(vertices(grid, &heights))?),
            Expr::call("Polygon", vec![quads.clone()]),
        ]))
    };

    let content = if expr.has_head("List") {
        let functions = expr.elements();
        log::debug!("evaluating {} surfaces over a {:?} grid", functions.len(), grid.points);
        let heights = functions
            .par_iter()
            .map(|function| evaluator.evaluate(function, x, y, grid))
            .collect::<Result<Vec<_>, _>>()?;
        Expr::list(heights.into_iter().map(complex).collect::<Result<_, _>>()?)
    } else {
        log::debug!("evaluating a surface over a {:?} grid", grid.points);
        complex(evaluator.evaluate(expr, x, y, grid)?)?
    };

    Ok(Expr::call("Graphics3D", vec![content]))
}

/// Lays the mesh and its heights out as rows of `{x, y, z}`, in row-major order of the mesh.
fn vertices(grid: &Grid, heights: &ArrayD<f64>) -> ArrayD<f64> {
    let (xs, ys) = grid.mesh();
    let ny = grid.points.1;
    ArrayD::from_shape_fn(IxDyn(&[grid.len(), 3]), |idx| {
        let point = [idx[0] / ny, idx[0] % ny];
        match idx[1] {
            0 => xs[&point[..]],
            1 => ys[&point[..]],
            _ => heights[&point[..]],
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{CompiledGridEvaluator, FallbackGridEvaluator};
    use assert_float_eq::*;
    use numex_expr::NumericArray;
    use pretty_assertions::assert_eq;

    fn xy() -> (Symbol, Symbol) {
        (Symbol::global("x"), Symbol::global("y"))
    }

    fn bulk(expr: &Expr) -> &LazyBulkList {
        match expr {
            Expr::Bulk(list) => list,
            other => panic!("expected a bulk list, got {}", other),
        }
    }

    #[test]
    fn single_surface() {
        let (x, y) = xy();
        let grid = Grid::new((0.0, 1.0), (0.0, 2.0), (2, 3));
        let expr = numex_parser::parse("x + 10 y").unwrap();
        let graphics = surface(&CompiledGridEvaluator::default(), &expr, &x, &y, &grid).unwrap();

        assert!(graphics.has_head("Graphics3D"));
        let complex = &graphics.elements()[0];
        assert!(complex.has_head("GraphicsComplex"));

        let vertices = bulk(&complex.elements()[0]);
        assert_eq!(vertices.shape(), &[6, 3]);
        let NumericArray::Real64(vertices) = vertices.value() else {
            panic!("expected real vertices");
        };
        let expected = [
            [0.0, 0.0, 0.0], [0.0, 1.0, 10.0], [0.0, 2.0, 20.0],
            [1.0, 0.0, 1.0], [1.0, 1.0, 11.0], [1.0, 2.0, 21.0],
        ];
        for (row, expected) in vertices.outer_iter().zip(expected) {
            for (a, b) in row.iter().zip(expected) {
                assert_float_absolute_eq!(*a, b, 1e-12);
            }
        }

        let polygon = &complex.elements()[1];
        assert!(polygon.has_head("Polygon"));
        let quads = bulk(&polygon.elements()[0]);
        assert_eq!(quads.value(), &NumericArray::Integer64(grid.quads()));
    }

    #[test]
    fn surfaces_are_not_materialized() {
        let (x, y) = xy();
        let expr = numex_parser::parse("Sin[x] Cos[y]").unwrap();
        let graphics = surface(&FallbackGridEvaluator::default(), &expr, &x, &y, &Grid::default()).unwrap();
        let complex = &graphics.elements()[0];
        let vertices = bulk(&complex.elements()[0]);
        assert_eq!(vertices.len(), 625);
        assert!(!vertices.is_materialized());
        assert_eq!(graphics.to_string(), concat!(
            "Graphics3D[GraphicsComplex[NumericArray[{625, 3}, \"Real64\"], ",
            "Polygon[NumericArray[{576, 4}, \"Integer64\"]]]]",
        ));
    }

    #[test]
    fn lists_of_functions() {
        let (x, y) = xy();
        let grid = Grid::new((-1.0, 1.0), (-1.0, 1.0), (5, 5));
        let expr = numex_parser::parse("{x y, 1, -x y}").unwrap();
        let graphics = surface(&CompiledGridEvaluator::default(), &expr, &x, &y, &grid).unwrap();

        let complexes = graphics.elements()[0].elements();
        assert_eq!(complexes.len(), 3);

        let heights = complexes
            .iter()
            .map(|complex| match bulk(&complex.elements()[0]).value() {
                NumericArray::Real64(vertices) => vertices.clone(),
                _ => panic!("expected real vertices"),
            })
            .collect::<Vec<_>>();
        for i in 0..grid.len() {
            assert_float_absolute_eq!(heights[0][[i, 2]], -heights[2][[i, 2]], 1e-12);
            assert_eq!(heights[1][[i, 2]], 1.0);
        }
    }

    #[test]
    fn errors_propagate() {
        let (x, y) = xy();
        let expr = numex_parser::parse("{x, Sin[x, y]}").unwrap();
        let err = surface(&CompiledGridEvaluator::default(), &expr, &x, &y, &Grid::default()).unwrap_err();
        assert_eq!(err.message(), "`Sin` called with 2 arguments");
    }
}
