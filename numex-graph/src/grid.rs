use ndarray::{Array, ArrayD, IxDyn};

/// A rectangular grid of sample points in the `(x, y)` plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    /// The first and last sampled `x` values.
    ///
    /// The default value is `(-1.0, 1.0)`.
    pub x: (f64, f64),

    /// The first and last sampled `y` values.
    ///
    /// The default value is `(-1.0, 1.0)`.
    pub y: (f64, f64),

    /// The number of samples along each axis, given as `(nx, ny)`.
    ///
    /// The default value is `(25, 25)`.
    pub points: (usize, usize),
}

impl Default for Grid {
    fn default() -> Grid {
        Grid {
            x: (-1.0, 1.0),
            y: (-1.0, 1.0),
            points: (25, 25),
        }
    }
}

impl Grid {
    /// Creates a grid over the given ranges with the given number of samples along each axis.
    pub fn new(x: (f64, f64), y: (f64, f64), points: (usize, usize)) -> Grid {
        Grid { x, y, points }
    }

    /// The shape of the arrays returned by [`Grid::mesh`], `[nx, ny]`.
    pub fn shape(&self) -> [usize; 2] {
        [self.points.0, self.points.1]
    }

    /// The total number of sample points.
    pub fn len(&self) -> usize {
        self.points.0 * self.points.1
    }

    /// Returns true if the grid has no sample points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds the `x` and `y` coordinate arrays of the grid. Both have shape `[nx, ny]`, with `x`
    /// varying along the first axis and `y` along the second.
    pub fn mesh(&self) -> (ArrayD<f64>, ArrayD<f64>) {
        let xs = Array::linspace(self.x.0, self.x.1, self.points.0);
        let ys = Array::linspace(self.y.0, self.y.1, self.points.1);
        let shape = IxDyn(&self.shape());
        (
            ArrayD::from_shape_fn(shape.clone(), |idx| xs[idx[0]]),
            ArrayD::from_shape_fn(shape, |idx| ys[idx[1]]),
        )
    }

    /// Builds the 1-based vertex indices of the quadrilaterals joining neighboring samples, as an
    /// array of shape `[(nx - 1) * (ny - 1), 4]`. Vertices are numbered in row-major order of the
    /// mesh.
    pub fn quads(&self) -> ArrayD<i64> {
        let (nx, ny) = self.points;
        let (cx, cy) = (nx.saturating_sub(1), ny.saturating_sub(1));
        let vertex = |i: usize, j: usize| (i * ny + j + 1) as i64;
        ArrayD::from_shape_fn(IxDyn(&[cx * cy, 4]), |idx| {
            let (i, j) = (idx[0] / cy, idx[0] % cy);
            match idx[1] {
                0 => vertex(i, j),
                1 => vertex(i + 1, j),
                2 => vertex(i + 1, j + 1),
                _ => vertex(i, j + 1),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;
    use pretty_assertions::assert_eq;

    #[test]
    fn mesh() {
        let grid = Grid::new((0.0, 2.0), (-1.0, 1.0), (3, 2));
        let (x, y) = grid.mesh();
        assert_eq!(x, arr2(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]).into_dyn());
        assert_eq!(y, arr2(&[[-1.0, 1.0], [-1.0, 1.0], [-1.0, 1.0]]).into_dyn());
    }

    #[test]
    fn quads() {
        let grid = Grid::new((0.0, 1.0), (0.0, 1.0), (3, 2));
        assert_eq!(grid.quads(), arr2(&[[1, 3, 4, 2], [3, 5, 6, 4]]).into_dyn());
    }

    #[test]
    fn degenerate() {
        let grid = Grid::new((0.0, 1.0), (0.0, 1.0), (1, 4));
        assert_eq!(grid.quads().shape(), &[0, 4]);
        assert_eq!(grid.mesh().0.shape(), &[1, 4]);
    }
}
