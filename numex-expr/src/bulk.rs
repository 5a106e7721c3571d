//! Lazy bulk lists: numeric arrays that behave like symbolic lists.
//!
//! A [`LazyBulkList`] wraps one [`NumericArray`] of rank 1 or more. Its symbolic view, the list
//! of [`BulkElement`]s along the first axis, is only built the first time
//! [`LazyBulkList::elements`] is called, and is then cached for the lifetime of the list. Any
//! consumer that only needs the raw numbers reads [`LazyBulkList::value`] instead and never pays
//! for the symbolic view.
//!
//! ```
//! use ndarray::{ArrayD, IxDyn};
//! use numex_expr::{BulkElement, LazyBulkList};
//!
//! let array = ArrayD::from_shape_vec(IxDyn(&[2, 3]), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
//! let list = LazyBulkList::from_array(array).unwrap();
//! assert!(!list.is_materialized());
//!
//! let rows = list.elements();
//! assert_eq!(rows.len(), 2);
//! assert!(list.is_materialized());
//! assert!(matches!(rows[0], BulkElement::List(_)));
//! ```

use crate::{
    array::{Element, NumericArray},
    atom::Atom,
    error::{ScalarNotWrappable, UnsupportedElementType},
    expr::Expr,
    ElementType,
};
use ndarray::ArrayD;
use numex_error::Error;
use once_cell::sync::OnceCell;
use std::{fmt, sync::Arc};

/// One element of a [`LazyBulkList`].
#[derive(Clone, Debug, PartialEq)]
pub enum BulkElement {
    /// An element of a rank-1 list.
    Atom(Atom),

    /// A row of a higher-rank list, itself lazy.
    List(LazyBulkList),
}

impl BulkElement {
    /// Converts the element into an expression, materializing nested lists fully.
    pub fn to_expr(&self) -> Expr {
        match self {
            Self::Atom(atom) => Expr::Atom(atom.clone()),
            Self::List(list) => list.to_expr(),
        }
    }
}

struct Inner {
    value: NumericArray,
    elements: OnceCell<Box<[BulkElement]>>,
}

/// A symbolic list backed by a numeric array, whose elements are created on first access.
///
/// Cloning shares both the array and the cached elements.
#[derive(Clone)]
pub struct LazyBulkList {
    inner: Arc<Inner>,
}

impl LazyBulkList {
    /// Wraps a numeric array.
    ///
    /// Fails with [`ScalarNotWrappable`] for rank-0 arrays, and [`UnsupportedElementType`] for
    /// element types with no symbolic counterpart.
    pub fn wrap(value: NumericArray) -> Result<Self, Error> {
        if !value.element_type().is_numeric() {
            return Err(Error::new(vec![], UnsupportedElementType {
                name: value.element_type().name().to_string(),
            }));
        }
        if value.ndim() == 0 {
            return Err(Error::new(vec![], ScalarNotWrappable));
        }
        Ok(Self::new_unchecked(value))
    }

    /// Wraps an array of any element type. See [`NumericArray::from_array`].
    pub fn from_array<T: 'static>(array: ArrayD<T>) -> Result<Self, Error> {
        Self::wrap(NumericArray::from_array(array)?)
    }

    fn new_unchecked(value: NumericArray) -> Self {
        Self {
            inner: Arc::new(Inner {
                value,
                elements: OnceCell::new(),
            }),
        }
    }

    /// The wrapped array.
    pub fn value(&self) -> &NumericArray {
        &self.inner.value
    }

    /// The element type of the wrapped array.
    pub fn element_type(&self) -> ElementType {
        self.inner.value.element_type()
    }

    /// The shape of the wrapped array.
    pub fn shape(&self) -> &[usize] {
        self.inner.value.shape()
    }

    /// The number of elements of the list, which is the length of the first axis.
    pub fn len(&self) -> usize {
        self.shape()[0]
    }

    /// Returns true if the list has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true once the symbolic elements have been created.
    pub fn is_materialized(&self) -> bool {
        self.inner.elements.get().is_some()
    }

    /// The symbolic elements of the list, created on the first call and cached afterwards.
    ///
    /// Every call returns the same slice.
    pub fn elements(&self) -> &[BulkElement] {
        self.inner.elements.get_or_init(|| {
            log::trace!(
                "materializing {} list of shape {:?}",
                self.element_type(),
                self.shape(),
            );
            materialize(&self.inner.value)
        })
    }

    /// Converts the list into a nested `List` expression, materializing every level.
    pub fn to_expr(&self) -> Expr {
        Expr::list(self.elements().iter().map(BulkElement::to_expr).collect())
    }

    /// Returns true if both lists share the same array and cache.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Splits the array along its first axis.
fn split<T: Element>(array: &ArrayD<T>) -> Box<[BulkElement]>
where
    NumericArray: From<ArrayD<T>>,
{
    if array.ndim() == 1 {
        array.iter().map(|x| BulkElement::Atom(x.to_atom())).collect()
    } else {
        array.outer_iter()
            .map(|row| BulkElement::List(LazyBulkList::new_unchecked(row.to_owned().into())))
            .collect()
    }
}

fn materialize(value: &NumericArray) -> Box<[BulkElement]> {
    match value {
        NumericArray::Integer8(array) => split(array),
        NumericArray::Integer16(array) => split(array),
        NumericArray::Integer32(array) => split(array),
        NumericArray::Integer64(array) => split(array),
        NumericArray::UnsignedInteger8(array) => split(array),
        NumericArray::UnsignedInteger16(array) => split(array),
        NumericArray::UnsignedInteger32(array) => split(array),
        NumericArray::UnsignedInteger64(array) => split(array),
        NumericArray::Real32(array) => split(array),
        NumericArray::Real64(array) => split(array),
        NumericArray::ComplexReal32(array) => split(array),
        NumericArray::ComplexReal64(array) => split(array),
        NumericArray::Boolean(_) => unreachable!("boolean arrays are rejected by `wrap`"),
    }
}

impl fmt::Debug for LazyBulkList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyBulkList")
            .field("element_type", &self.element_type())
            .field("shape", &self.shape())
            .field("materialized", &self.is_materialized())
            .finish()
    }
}

/// Lists are equal when their arrays are equal, regardless of materialization.
impl PartialEq for LazyBulkList {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.inner.value == other.inner.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2, IxDyn};
    use num_complex::Complex64;
    use pretty_assertions::assert_eq;
    use std::thread;

    fn matrix() -> LazyBulkList {
        LazyBulkList::from_array(arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).into_dyn()).unwrap()
    }

    #[test]
    fn starts_unmaterialized() {
        let list = matrix();
        assert!(!list.is_materialized());
        assert_eq!(list.len(), 2);
        assert_eq!(list.shape(), &[2, 3]);
        assert_eq!(list.element_type(), ElementType::Real64);
        assert!(!list.is_materialized());
    }

    #[test]
    fn rank_one_elements_are_atoms() {
        let list = LazyBulkList::from_array(arr1(&[1i32, -2, 3]).into_dyn()).unwrap();
        assert_eq!(list.elements(), &[
            BulkElement::Atom(Atom::from(1i64)),
            BulkElement::Atom(Atom::from(-2i64)),
            BulkElement::Atom(Atom::from(3i64)),
        ]);
    }

    #[test]
    fn nested_rows_stay_lazy() {
        let list = matrix();
        let rows = list.elements();
        assert!(list.is_materialized());
        assert_eq!(rows.len(), 2);

        let BulkElement::List(row) = &rows[1] else {
            panic!("expected a nested list");
        };
        assert!(!row.is_materialized());
        assert_eq!(row.shape(), &[3]);
        assert_eq!(row.elements()[2], BulkElement::Atom(Atom::Real(6.0)));
    }

    #[test]
    fn cached_elements_are_identical() {
        let list = matrix();
        let first = list.elements().as_ptr();
        let second = list.elements().as_ptr();
        assert_eq!(first, second);

        // clones share the cache
        let clone = list.clone();
        assert!(clone.is_materialized());
        assert_eq!(clone.elements().as_ptr(), first);
    }

    #[test]
    fn concurrent_materialization_happens_once() {
        let list = matrix();
        let pointers = thread::scope(|s| {
            let handles = (0..8)
                .map(|_| s.spawn(|| list.elements().as_ptr() as usize))
                .collect::<Vec<_>>();
            handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
        });
        assert!(pointers.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn value_keeps_shape() {
        let array = ArrayD::<f64>::zeros(IxDyn(&[4, 2, 3]));
        let list = LazyBulkList::from_array(array.clone()).unwrap();
        assert_eq!(list.value(), &NumericArray::Real64(array));
        assert!(!list.is_materialized());
    }

    #[test]
    fn complex_elements() {
        let z = Complex64::new(0.0, 1.0);
        let list = LazyBulkList::from_array(arr1(&[z]).into_dyn()).unwrap();
        assert_eq!(list.elements(), &[BulkElement::Atom(Atom::Complex(z))]);
    }

    #[test]
    fn to_expr_builds_nested_lists() {
        let list = LazyBulkList::from_array(arr2(&[[1u8, 2], [3, 4]]).into_dyn()).unwrap();
        let row = |a: i64, b: i64| Expr::list(vec![a.into(), b.into()]);
        assert_eq!(list.to_expr(), Expr::list(vec![row(1, 2), row(3, 4)]));
    }

    #[test]
    fn rejects_scalars() {
        let array = ArrayD::from_elem(IxDyn(&[]), 1.0);
        let err = LazyBulkList::from_array(array).unwrap_err();
        assert!(err.is::<ScalarNotWrappable>());
    }

    #[test]
    fn rejects_booleans() {
        let array = arr1(&[true, false]).into_dyn();
        let err = LazyBulkList::from_array(array).unwrap_err();
        assert_eq!(
            err.downcast_ref::<UnsupportedElementType>().map(|k| k.name.as_str()),
            Some("Boolean"),
        );
    }

    #[test]
    fn empty_list() {
        let array = ArrayD::<f64>::zeros(IxDyn(&[0]));
        let list = LazyBulkList::from_array(array).unwrap();
        assert!(list.is_empty());
        assert!(list.elements().is_empty());
        assert!(list.is_materialized());
    }
}
