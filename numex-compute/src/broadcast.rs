//! Broadcasting and elementwise traversal of arrays.
//!
//! Traversals over at least [`PARALLEL_THRESHOLD`] elements are split across the rayon thread
//! pool.

use crate::error::ShapeMismatch;
use ndarray::{ArrayD, IxDyn, Zip};

/// The number of elements above which kernels run in parallel.
pub const PARALLEL_THRESHOLD: usize = 1 << 14;

/// Computes the shape two arrays broadcast to.
///
/// Axes are aligned from the end. Two aligned axes are compatible if they are equal or one of
/// them has length 1; missing leading axes count as length 1.
pub fn broadcast_shape(left: &[usize], right: &[usize]) -> Result<Vec<usize>, ShapeMismatch> {
    let ndim = left.len().max(right.len());
    let mut shape = vec![0; ndim];
    for i in 0..ndim {
        let l = left.len().checked_sub(i + 1).map_or(1, |j| left[j]);
        let r = right.len().checked_sub(i + 1).map_or(1, |j| right[j]);
        shape[ndim - 1 - i] = match (l, r) {
            (l, r) if l == r => l,
            (1, r) => r,
            (l, 1) => l,
            _ => return Err(ShapeMismatch {
                left: left.to_vec(),
                right: right.to_vec(),
            }),
        };
    }
    Ok(shape)
}

/// Applies `f` to every element.
pub fn map<A, C, F>(a: &ArrayD<A>, f: F) -> ArrayD<C>
where
    A: Sync,
    C: Send,
    F: Fn(&A) -> C + Sync + Send,
{
    if a.len() >= PARALLEL_THRESHOLD {
        Zip::from(a).par_map_collect(f)
    } else {
        a.map(f)
    }
}

/// Applies `f` to every pair of elements of the broadcast operands.
pub fn zip<A, B, C, F>(a: &ArrayD<A>, b: &ArrayD<B>, f: F) -> Result<ArrayD<C>, ShapeMismatch>
where
    A: Sync,
    B: Sync,
    C: Send,
    F: Fn(&A, &B) -> C + Sync + Send,
{
    let shape = broadcast_shape(a.shape(), b.shape())?;
    let mismatch = || ShapeMismatch {
        left: a.shape().to_vec(),
        right: b.shape().to_vec(),
    };
    let av = a.broadcast(IxDyn(&shape)).ok_or_else(mismatch)?;
    let bv = b.broadcast(IxDyn(&shape)).ok_or_else(mismatch)?;

    let zip = Zip::from(&av).and(&bv);
    if av.len() >= PARALLEL_THRESHOLD {
        Ok(zip.par_map_collect(f))
    } else {
        Ok(zip.map_collect(f))
    }
}

/// Applies `f` to every triple of elements of the broadcast operands.
pub fn zip3<A, B, C, D, F>(
    a: &ArrayD<A>,
    b: &ArrayD<B>,
    c: &ArrayD<C>,
    f: F,
) -> Result<ArrayD<D>, ShapeMismatch>
where
    A: Sync,
    B: Sync,
    C: Sync,
    D: Send,
    F: Fn(&A, &B, &C) -> D + Sync + Send,
{
    let shape = broadcast_shape(&broadcast_shape(a.shape(), b.shape())?, c.shape())?;
    let mismatch = |other: &[usize]| ShapeMismatch {
        left: shape.clone(),
        right: other.to_vec(),
    };
    let av = a.broadcast(IxDyn(&shape)).ok_or_else(|| mismatch(a.shape()))?;
    let bv = b.broadcast(IxDyn(&shape)).ok_or_else(|| mismatch(b.shape()))?;
    let cv = c.broadcast(IxDyn(&shape)).ok_or_else(|| mismatch(c.shape()))?;

    let zip = Zip::from(&av).and(&bv).and(&cv);
    if av.len() >= PARALLEL_THRESHOLD {
        Ok(zip.par_map_collect(f))
    } else {
        Ok(zip.map_collect(f))
    }
}

/// Broadcasts an array to the given shape and copies it into a new array.
pub fn broadcast_to<A: Clone>(a: &ArrayD<A>, shape: &[usize]) -> Result<ArrayD<A>, ShapeMismatch> {
    a.broadcast(IxDyn(shape))
        .map(|view| view.to_owned())
        .ok_or_else(|| ShapeMismatch {
            left: a.shape().to_vec(),
            right: shape.to_vec(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr0, arr1, arr2};
    use pretty_assertions::assert_eq;

    #[test]
    fn shapes() {
        assert_eq!(broadcast_shape(&[], &[3, 4]).unwrap(), vec![3, 4]);
        assert_eq!(broadcast_shape(&[3, 1], &[1, 4]).unwrap(), vec![3, 4]);
        assert_eq!(broadcast_shape(&[4], &[3, 4]).unwrap(), vec![3, 4]);
        assert_eq!(broadcast_shape(&[2, 1, 5], &[3, 1]).unwrap(), vec![2, 3, 5]);
        assert_eq!(broadcast_shape(&[0], &[1]).unwrap(), vec![0]);
        assert_eq!(
            broadcast_shape(&[3], &[4]),
            Err(ShapeMismatch { left: vec![3], right: vec![4] }),
        );
    }

    #[test]
    fn scalar_with_matrix() {
        let a = arr0(2.0).into_dyn();
        let b = arr2(&[[1.0, 2.0], [3.0, 4.0]]).into_dyn();
        let c = zip(&a, &b, |x, y| x * y).unwrap();
        assert_eq!(c, arr2(&[[2.0, 4.0], [6.0, 8.0]]).into_dyn());
    }

    #[test]
    fn row_with_column() {
        let row = arr2(&[[1.0, 2.0, 3.0]]).into_dyn();
        let col = arr2(&[[10.0], [20.0]]).into_dyn();
        let sum = zip(&row, &col, |x, y| x + y).unwrap();
        assert_eq!(sum, arr2(&[[11.0, 12.0, 13.0], [21.0, 22.0, 23.0]]).into_dyn());
    }

    #[test]
    fn large_arrays_match_serial_result() {
        let n = PARALLEL_THRESHOLD * 2;
        let a = ArrayD::from_shape_fn(IxDyn(&[n]), |i| i[0] as f64);
        let doubled = map(&a, |x| x * 2.0);
        let summed = zip(&a, &doubled, |x, y| x + y).unwrap();
        assert!(summed.iter().enumerate().all(|(i, &v)| v == 3.0 * i as f64));
    }

    #[test]
    fn three_way() {
        let cond = arr1(&[true, false, true]).into_dyn();
        let a = arr0(1.0).into_dyn();
        let b = arr1(&[7.0, 8.0, 9.0]).into_dyn();
        let picked = zip3(&cond, &a, &b, |c, x, y| if *c { *x } else { *y }).unwrap();
        assert_eq!(picked, arr1(&[1.0, 8.0, 1.0]).into_dyn());
    }

    #[test]
    fn mismatch() {
        let a = arr1(&[1.0, 2.0]).into_dyn();
        let b = arr1(&[1.0, 2.0, 3.0]).into_dyn();
        assert!(zip(&a, &b, |x, y| x + y).is_err());
    }
}
