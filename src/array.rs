//! Borrowed n-dimensional buffers and their validation
//!
//! Setters on scene objects take an [`ArrayView`] so that buffer shape and
//! storage order are checked at the API boundary, before anything is copied.

use crate::{Error, Result};

const MAX_DIMS: usize = 4;

/// Memory layout of a multi-dimensional buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOrder {
    /// Last index varies fastest (C order)
    RowMajor,
    /// First index varies fastest (Fortran order)
    ColumnMajor,
}

/// A borrowed, contiguous buffer with an explicit shape.
#[derive(Debug, Clone, Copy)]
pub struct ArrayView<'a, T> {
    data: &'a [T],
    dims: [usize; MAX_DIMS],
    ndim: usize,
    order: StorageOrder,
}

impl<'a, T> ArrayView<'a, T> {
    /// One-dimensional view over a slice.
    pub fn from_slice(data: &'a [T]) -> Self {
        let mut dims = [0; MAX_DIMS];
        dims[0] = data.len();
        Self {
            data,
            dims,
            ndim: 1,
            order: StorageOrder::RowMajor,
        }
    }

    /// Row-major view with the given shape.
    pub fn new(data: &'a [T], shape: &[usize]) -> Result<Self> {
        Self::with_order(data, shape, StorageOrder::RowMajor)
    }

    /// Column-major view with the given shape.
    pub fn new_fortran(data: &'a [T], shape: &[usize]) -> Result<Self> {
        Self::with_order(data, shape, StorageOrder::ColumnMajor)
    }

    pub fn with_order(data: &'a [T], shape: &[usize], order: StorageOrder) -> Result<Self> {
        if shape.is_empty() || shape.len() > MAX_DIMS {
            return Err(Error::InvalidArgument(format!(
                "Expected between 1 and {} dimensions, got {}",
                MAX_DIMS,
                shape.len()
            )));
        }
        let size = shape
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim));
        if size != Some(data.len()) {
            return Err(Error::InvalidArgument(format!(
                "Shape {:?} does not match buffer of {} elements",
                shape,
                data.len()
            )));
        }

        let mut dims = [0; MAX_DIMS];
        dims[..shape.len()].copy_from_slice(shape);
        Ok(Self {
            data,
            dims,
            ndim: shape.len(),
            order,
        })
    }

    pub fn data(&self) -> &'a [T] {
        self.data
    }

    pub fn shape(&self) -> &[usize] {
        &self.dims[..self.ndim]
    }

    pub fn ndim(&self) -> usize {
        self.ndim
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the buffer is laid out in C order. One-dimensional buffers are
    /// contiguous in both orders.
    pub fn is_row_major(&self) -> bool {
        self.ndim <= 1 || self.order == StorageOrder::RowMajor
    }

    /// Whether the buffer is laid out in Fortran order. One-dimensional buffers
    /// are contiguous in both orders.
    pub fn is_column_major(&self) -> bool {
        self.ndim <= 1 || self.order == StorageOrder::ColumnMajor
    }
}

impl<'a, T> From<&'a [T]> for ArrayView<'a, T> {
    fn from(data: &'a [T]) -> Self {
        Self::from_slice(data)
    }
}

impl<'a, T> From<&'a Vec<T>> for ArrayView<'a, T> {
    fn from(data: &'a Vec<T>) -> Self {
        Self::from_slice(data.as_slice())
    }
}

impl<'a, T, const N: usize> From<&'a [T; N]> for ArrayView<'a, T> {
    fn from(data: &'a [T; N]) -> Self {
        Self::from_slice(data.as_slice())
    }
}

/// Validate an array against an expected size, dimensionality and storage
/// order. A zero `size` or `dims` skips that check, `None` skips the order
/// check.
pub fn check_array<T>(
    array: &ArrayView<'_, T>,
    size: usize,
    dims: usize,
    order: Option<StorageOrder>,
) -> Result<()> {
    if size != 0 && array.len() != size {
        return Err(Error::InvalidArgument(format!(
            "Expected array of size: {}",
            size
        )));
    }

    if dims != 0 && array.ndim() != dims {
        return Err(Error::InvalidArgument(format!(
            "Expected an array of dimension: {}",
            dims
        )));
    }

    match order {
        Some(StorageOrder::ColumnMajor) if !array.is_column_major() => Err(
            Error::InvalidArgument("Expected a column-major (F_CONTIGUOUS) array".to_string()),
        ),
        Some(StorageOrder::RowMajor) if !array.is_row_major() => Err(Error::InvalidArgument(
            "Expected a row-major (C_CONTIGUOUS) array".to_string(),
        )),
        _ => Ok(()),
    }
}
