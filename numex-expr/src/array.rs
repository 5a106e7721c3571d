//! Typed n-dimensional numeric arrays.

use crate::{atom::Atom, error::UnsupportedElementType};
use ndarray::ArrayD;
use num_complex::{Complex32, Complex64};
use numex_error::Error;
use rug::Integer;
use std::{any::{type_name, Any}, fmt};

/// The element type of a [`NumericArray`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    Integer8,
    Integer16,
    Integer32,
    Integer64,
    UnsignedInteger8,
    UnsignedInteger16,
    UnsignedInteger32,
    UnsignedInteger64,
    Real32,
    Real64,
    ComplexReal32,
    ComplexReal64,
    Boolean,
}

impl ElementType {
    /// The name of the element type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Integer8 => "Integer8",
            Self::Integer16 => "Integer16",
            Self::Integer32 => "Integer32",
            Self::Integer64 => "Integer64",
            Self::UnsignedInteger8 => "UnsignedInteger8",
            Self::UnsignedInteger16 => "UnsignedInteger16",
            Self::UnsignedInteger32 => "UnsignedInteger32",
            Self::UnsignedInteger64 => "UnsignedInteger64",
            Self::Real32 => "Real32",
            Self::Real64 => "Real64",
            Self::ComplexReal32 => "ComplexReal32",
            Self::ComplexReal64 => "ComplexReal64",
            Self::Boolean => "Boolean",
        }
    }

    /// Returns true if elements of this type map to numeric atoms.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::Boolean)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An element type that converts to a symbolic atom.
pub trait Element: Clone + 'static {
    fn to_atom(&self) -> Atom;
}

macro_rules! integer_element {
    ($($ty:ty),*) => {
        $(
            impl Element for $ty {
                fn to_atom(&self) -> Atom {
                    Atom::Integer(Integer::from(*self))
                }
            }
        )*
    };
}

integer_element!(i8, i16, i32, i64, u8, u16, u32, u64);

impl Element for f32 {
    fn to_atom(&self) -> Atom {
        Atom::Real(*self as f64)
    }
}

impl Element for f64 {
    fn to_atom(&self) -> Atom {
        Atom::Real(*self)
    }
}

impl Element for Complex32 {
    fn to_atom(&self) -> Atom {
        Atom::Complex(Complex64::new(self.re as f64, self.im as f64))
    }
}

impl Element for Complex64 {
    fn to_atom(&self) -> Atom {
        Atom::Complex(*self)
    }
}

/// An n-dimensional array with one of the supported element types.
#[derive(Clone, Debug, PartialEq)]
pub enum NumericArray {
    Integer8(ArrayD<i8>),
    Integer16(ArrayD<i16>),
    Integer32(ArrayD<i32>),
    Integer64(ArrayD<i64>),
    UnsignedInteger8(ArrayD<u8>),
    UnsignedInteger16(ArrayD<u16>),
    UnsignedInteger32(ArrayD<u32>),
    UnsignedInteger64(ArrayD<u64>),
    Real32(ArrayD<f32>),
    Real64(ArrayD<f64>),
    ComplexReal32(ArrayD<Complex32>),
    ComplexReal64(ArrayD<Complex64>),

    /// Boolean arrays are produced by comparisons, but cannot stand in for symbolic lists.
    Boolean(ArrayD<bool>),
}

/// Runs `$body` with `$arr` bound to the inner array, whatever its element type.
macro_rules! dispatch {
    ($value:expr, $arr:ident => $body:expr) => {
        match $value {
            NumericArray::Integer8($arr) => $body,
            NumericArray::Integer16($arr) => $body,
            NumericArray::Integer32($arr) => $body,
            NumericArray::Integer64($arr) => $body,
            NumericArray::UnsignedInteger8($arr) => $body,
            NumericArray::UnsignedInteger16($arr) => $body,
            NumericArray::UnsignedInteger32($arr) => $body,
            NumericArray::UnsignedInteger64($arr) => $body,
            NumericArray::Real32($arr) => $body,
            NumericArray::Real64($arr) => $body,
            NumericArray::ComplexReal32($arr) => $body,
            NumericArray::ComplexReal64($arr) => $body,
            NumericArray::Boolean($arr) => $body,
        }
    };
}

macro_rules! from_array {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<ArrayD<$ty>> for NumericArray {
                fn from(array: ArrayD<$ty>) -> Self {
                    Self::$variant(array)
                }
            }
        )*

        impl NumericArray {
            /// Wraps an array of any element type, failing with [`UnsupportedElementType`] if the
            /// element type is not one of the supported ones.
            pub fn from_array<T: 'static>(array: ArrayD<T>) -> Result<Self, Error> {
                let array: Box<dyn Any> = Box::new(array);
                $(
                    let array = match array.downcast::<ArrayD<$ty>>() {
                        Ok(array) => return Ok(Self::$variant(*array)),
                        Err(array) => array,
                    };
                )*
                drop(array);
                Err(Error::new(vec![], UnsupportedElementType {
                    name: type_name::<T>().to_string(),
                }))
            }
        }
    };
}

from_array! {
    i8 => Integer8,
    i16 => Integer16,
    i32 => Integer32,
    i64 => Integer64,
    u8 => UnsignedInteger8,
    u16 => UnsignedInteger16,
    u32 => UnsignedInteger32,
    u64 => UnsignedInteger64,
    f32 => Real32,
    f64 => Real64,
    Complex32 => ComplexReal32,
    Complex64 => ComplexReal64,
    bool => Boolean,
}

impl NumericArray {
    /// The element type of the array.
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Integer8(_) => ElementType::Integer8,
            Self::Integer16(_) => ElementType::Integer16,
            Self::Integer32(_) => ElementType::Integer32,
            Self::Integer64(_) => ElementType::Integer64,
            Self::UnsignedInteger8(_) => ElementType::UnsignedInteger8,
            Self::UnsignedInteger16(_) => ElementType::UnsignedInteger16,
            Self::UnsignedInteger32(_) => ElementType::UnsignedInteger32,
            Self::UnsignedInteger64(_) => ElementType::UnsignedInteger64,
            Self::Real32(_) => ElementType::Real32,
            Self::Real64(_) => ElementType::Real64,
            Self::ComplexReal32(_) => ElementType::ComplexReal32,
            Self::ComplexReal64(_) => ElementType::ComplexReal64,
            Self::Boolean(_) => ElementType::Boolean,
        }
    }

    /// The shape of the array.
    pub fn shape(&self) -> &[usize] {
        dispatch!(self, array => array.shape())
    }

    /// The number of axes of the array.
    pub fn ndim(&self) -> usize {
        dispatch!(self, array => array.ndim())
    }

    /// The total number of elements.
    pub fn len(&self) -> usize {
        dispatch!(self, array => array.len())
    }

    /// Returns true if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub(crate) use dispatch;
