// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The array view type: shape, stride and offset over a shared buffer.

use crate::storage::{Buffer, Storage};
use crate::{ArrayError, DType, Element, IndexIterator, Scalar, Shape};

/// What a view points at: a boxed scalar (rank 0) or a shared buffer.
#[derive(Debug, Clone)]
pub(crate) enum Data {
    Scalar(Scalar),
    Buffer(Storage),
}

/// An n-dimensional view over a flat, shared buffer of `i32` or `f32`.
///
/// The flat buffer index of a multi-index `idx` is
/// `offset + Σ stride[i] * idx[i]`. Sub-arrays, ranges, transposes and
/// reshapes are new views over the **same** buffer: a write through any of
/// them (see [`Array::set`]) is visible through all the others.
/// [`Array::copy_of`] is the only way to obtain an independent buffer.
///
/// `Clone` is cheap and produces another view of the same buffer.
///
/// # Memory Layout
/// Arrays built from literals or copies are contiguous: strides are the
/// row-major derivation of the shape and the offset is zero. Derived views
/// may carry any strides and offset, and every view is checked on
/// construction to stay inside its buffer.
#[derive(Clone)]
pub struct Array {
    pub(crate) shape: Shape,
    pub(crate) stride: Vec<isize>,
    pub(crate) offset: usize,
    pub(crate) data: Data,
}

impl Array {
    // ── Construction ───────────────────────────────────────────

    /// Creates a rank-0 array holding a single value.
    pub fn scalar(value: impl Into<Scalar>) -> Self {
        Self {
            shape: Shape::scalar(),
            stride: vec![],
            offset: 0,
            data: Data::Scalar(value.into()),
        }
    }

    /// Creates a contiguous array from a flat row-major buffer.
    ///
    /// # Examples
    /// ```
    /// use array_core::Array;
    /// let a = Array::from_vec([2, 2], vec![1, 2, 3, 4]).unwrap();
    /// assert_eq!(a.get_int(&[1, 0]).unwrap(), 3);
    /// ```
    ///
    /// # Errors
    /// Returns [`ArrayError::ShapeMismatch`] if `data.len()` differs from the
    /// number of elements in `shape`.
    pub fn from_vec<T: Element>(shape: impl Into<Shape>, data: Vec<T>) -> Result<Self, ArrayError> {
        let shape = shape.into();
        if data.len() != shape.num_elements() {
            return Err(ArrayError::ShapeMismatch {
                op: "from_vec",
                lhs: shape,
                rhs: Shape::vector(data.len()),
            });
        }
        if shape.rank() == 0 {
            return Ok(Self::scalar(data[0].into_scalar()));
        }
        Ok(Self::contiguous(shape, T::wrap_buffer(data)))
    }

    /// Creates an arbitrary view over a new buffer.
    ///
    /// # Errors
    /// Returns [`ArrayError::ShapeMismatch`] if `stride` and `shape` differ in
    /// length, and [`ArrayError::OutOfBounds`] if any reachable index falls
    /// outside `data`.
    pub fn from_raw_parts<T: Element>(
        shape: impl Into<Shape>,
        stride: Vec<isize>,
        offset: usize,
        data: Vec<T>,
    ) -> Result<Self, ArrayError> {
        let shape = shape.into();
        if stride.len() != shape.rank() {
            return Err(ArrayError::ShapeMismatch {
                op: "from_raw_parts",
                lhs: shape,
                rhs: Shape::vector(stride.len()),
            });
        }
        if shape.rank() == 0 {
            let value = data.get(offset).ok_or(ArrayError::OutOfBounds {
                required: offset as isize,
                available: data.len(),
            })?;
            return Ok(Self::scalar(value.into_scalar()));
        }
        check_bounds(&shape, &stride, offset, data.len())?;
        Ok(Self {
            shape,
            stride,
            offset,
            data: Data::Buffer(T::wrap_buffer(data)),
        })
    }

    /// Creates a contiguous array filled with zeros of the given kind.
    pub fn zeros(shape: impl Into<Shape>, dtype: DType) -> Self {
        let shape = shape.into();
        let n = shape.num_elements();
        match (shape.rank(), dtype) {
            (0, DType::Int32) => Self::scalar(0),
            (0, DType::Float32) => Self::scalar(0.0f32),
            (_, DType::Int32) => Self::contiguous(shape, Storage::from_vec(vec![0i32; n])),
            (_, DType::Float32) => Self::contiguous(shape, Storage::from_vec(vec![0f32; n])),
        }
    }

    /// Creates a contiguous `Float32` array whose elements are drawn, in
    /// row-major order, from `supplier` (e.g. a random number generator).
    pub fn from_fn(shape: impl Into<Shape>, mut supplier: impl FnMut() -> f32) -> Self {
        let shape = shape.into();
        if shape.rank() == 0 {
            return Self::scalar(supplier());
        }
        let data: Vec<f32> = (0..shape.num_elements()).map(|_| supplier()).collect();
        Self::contiguous(shape, Storage::from_vec(data))
    }

    /// A row-major view at offset zero. `storage` must hold exactly
    /// `shape.num_elements()` elements.
    pub(crate) fn contiguous(shape: Shape, storage: Storage) -> Self {
        let stride = shape.strides();
        Self {
            shape,
            stride,
            offset: 0,
            data: Data::Buffer(storage),
        }
    }

    // ── Metadata ───────────────────────────────────────────────

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Shorthand for `self.shape().dims()`.
    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    pub fn stride(&self) -> &[isize] {
        &self.stride
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn num_dim(&self) -> usize {
        self.shape.rank()
    }

    /// Number of logical elements (1 for a rank-0 array).
    pub fn size(&self) -> usize {
        self.shape.num_elements()
    }

    pub fn dtype(&self) -> DType {
        match &self.data {
            Data::Scalar(s) => s.dtype(),
            Data::Buffer(storage) => storage.dtype(),
        }
    }

    /// The boxed value of a rank-0 array.
    pub fn as_scalar(&self) -> Option<Scalar> {
        match self.data {
            Data::Scalar(s) => Some(s),
            Data::Buffer(_) => None,
        }
    }

    /// Returns `true` if the strides are the row-major derivation of the
    /// shape. Rank-0 arrays are trivially contiguous.
    pub fn is_contiguous(&self) -> bool {
        self.stride == self.shape.strides()
    }

    /// Returns `true` if both arrays are views of the same buffer.
    pub fn shares_buffer(&self, other: &Array) -> bool {
        match (&self.data, &other.data) {
            (Data::Buffer(a), Data::Buffer(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    pub(crate) fn storage(&self) -> Option<&Storage> {
        match &self.data {
            Data::Buffer(storage) => Some(storage),
            Data::Scalar(_) => None,
        }
    }

    // ── Indexing ───────────────────────────────────────────────

    /// Computes the flat buffer index of a (possibly partial) multi-index:
    /// `offset + Σ stride[i] * idx[i]` over the supplied indices.
    ///
    /// # Errors
    /// Returns [`ArrayError::TooManyIndices`] if `idx` is longer than the
    /// rank, and [`ArrayError::IndexOutOfRange`] if an index exceeds its axis.
    pub fn compute_index(&self, idx: &[usize]) -> Result<usize, ArrayError> {
        if idx.len() > self.num_dim() {
            return Err(ArrayError::TooManyIndices {
                given: idx.len(),
                shape: self.shape.clone(),
            });
        }
        for (axis, (&i, &extent)) in idx.iter().zip(self.dims()).enumerate() {
            if i >= extent {
                return Err(ArrayError::IndexOutOfRange {
                    axis,
                    index: i,
                    extent,
                });
            }
        }
        Ok(self.flat_index(idx))
    }

    /// Flat index without validation; `idx` must be in range.
    pub(crate) fn flat_index(&self, idx: &[usize]) -> usize {
        let delta: isize = idx
            .iter()
            .zip(&self.stride)
            .map(|(&i, &s)| i as isize * s)
            .sum();
        (self.offset as isize + delta) as usize
    }

    /// Flat indices of every element, in row-major logical order.
    pub(crate) fn flat_indices(&self) -> impl Iterator<Item = usize> + '_ {
        IndexIterator::new(self.dims()).map(move |idx| self.flat_index(&idx))
    }

    /// Reads one element. Exactly one index per axis is required; a rank-0
    /// array takes none.
    pub fn get(&self, idx: &[usize]) -> Result<Scalar, ArrayError> {
        if idx.len() != self.num_dim() {
            return Err(ArrayError::WrongIndexCount {
                expected: self.num_dim(),
                actual: idx.len(),
            });
        }
        match &self.data {
            Data::Scalar(s) => Ok(*s),
            Data::Buffer(storage) => {
                let flat = self.compute_index(idx)?;
                Ok(match storage {
                    Storage::Int(b) => Scalar::Int(b.read()[flat]),
                    Storage::Float(b) => Scalar::Float(b.read()[flat]),
                })
            }
        }
    }

    /// Reads one `Int32` element.
    ///
    /// # Errors
    /// [`ArrayError::TypeMismatch`] on a `Float32` array; no coercion is done.
    pub fn get_int(&self, idx: &[usize]) -> Result<i32, ArrayError> {
        self.get_typed(idx)
    }

    /// Reads one `Float32` element.
    ///
    /// # Errors
    /// [`ArrayError::TypeMismatch`] on an `Int32` array; no coercion is done.
    pub fn get_float(&self, idx: &[usize]) -> Result<f32, ArrayError> {
        self.get_typed(idx)
    }

    fn get_typed<T: Element>(&self, idx: &[usize]) -> Result<T, ArrayError> {
        let value = self.get(idx)?;
        T::from_scalar(value).ok_or(ArrayError::TypeMismatch {
            expected: T::DTYPE,
            actual: value.dtype(),
        })
    }

    /// Writes one element in place.
    ///
    /// The write lands in the shared buffer, so it is visible through every
    /// view that overlaps this element.
    pub fn set(&mut self, idx: &[usize], value: impl Into<Scalar>) -> Result<(), ArrayError> {
        let value = value.into();
        if value.dtype() != self.dtype() {
            return Err(ArrayError::TypeMismatch {
                expected: self.dtype(),
                actual: value.dtype(),
            });
        }
        if idx.len() != self.num_dim() {
            return Err(ArrayError::WrongIndexCount {
                expected: self.num_dim(),
                actual: idx.len(),
            });
        }
        let flat = self.compute_index(idx)?;
        match (&mut self.data, value) {
            (Data::Scalar(s), v) => *s = v,
            (Data::Buffer(Storage::Int(b)), Scalar::Int(v)) => b.write()[flat] = v,
            (Data::Buffer(Storage::Float(b)), Scalar::Float(v)) => b.write()[flat] = v,
            _ => unreachable!("kinds checked above"),
        }
        Ok(())
    }

    // ── Views ──────────────────────────────────────────────────

    /// Fixes the leading `idx.len()` axes and returns a view over the
    /// remaining ones. Fixing every axis yields a rank-0 array holding that
    /// element.
    ///
    /// # Examples
    /// ```
    /// use array_core::Array;
    /// let a = Array::new(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
    /// let row = a.sub_array(&[1]).unwrap();
    /// assert_eq!(row.dims(), &[3]);
    /// assert_eq!(row.get_int(&[2]).unwrap(), 6);
    /// ```
    pub fn sub_array(&self, idx: &[usize]) -> Result<Array, ArrayError> {
        let flat = self.compute_index(idx)?;
        if idx.len() == self.num_dim() {
            return self.get(idx).map(Array::scalar);
        }
        let k = idx.len();
        Ok(Array {
            shape: Shape::from(&self.dims()[k..]),
            stride: self.stride[k..].to_vec(),
            offset: flat,
            data: self.data.clone(),
        })
    }

    /// Like [`sub_array`](Array::sub_array), but keeps a leading axis of
    /// extent 1 so that the result still has at least one dimension.
    pub fn row(&self, idx: &[usize]) -> Result<Array, ArrayError> {
        let flat = self.compute_index(idx)?;
        let k = idx.len();
        let storage = match &self.data {
            Data::Buffer(storage) => storage.clone(),
            Data::Scalar(Scalar::Int(v)) => {
                return Ok(Array::contiguous(Shape::vector(1), Storage::from_vec(vec![*v])))
            }
            Data::Scalar(Scalar::Float(v)) => {
                return Ok(Array::contiguous(Shape::vector(1), Storage::from_vec(vec![*v])))
            }
        };
        let lead_stride = match (self.dims().get(k), self.stride.get(k)) {
            (Some(&extent), Some(&stride)) => extent as isize * stride,
            _ => 1,
        };
        let mut dims = vec![1];
        dims.extend_from_slice(&self.dims()[k..]);
        let mut stride = vec![lead_stride];
        stride.extend_from_slice(&self.stride[k..]);
        Ok(Array {
            shape: Shape::new(dims),
            stride,
            offset: flat,
            data: Data::Buffer(storage),
        })
    }

    /// Selects the half-open range `[low, high)` along axis 0.
    ///
    /// # Errors
    /// [`ArrayError::TooManyIndices`] on a rank-0 array and
    /// [`ArrayError::IndexOutOfRange`] unless `low <= high <= shape[0]`.
    pub fn range(&self, low: usize, high: usize) -> Result<Array, ArrayError> {
        let Some(extent) = self.shape.dim(0) else {
            return Err(ArrayError::TooManyIndices {
                given: 1,
                shape: self.shape.clone(),
            });
        };
        if high > extent {
            return Err(ArrayError::IndexOutOfRange {
                axis: 0,
                index: high,
                extent,
            });
        }
        if low > high {
            return Err(ArrayError::IndexOutOfRange {
                axis: 0,
                index: low,
                extent: high,
            });
        }
        let mut dims = self.dims().to_vec();
        dims[0] = high - low;
        let offset = if low == high {
            self.offset
        } else {
            (self.offset as isize + self.stride[0] * low as isize) as usize
        };
        Ok(Array {
            shape: Shape::new(dims),
            stride: self.stride.clone(),
            offset,
            data: self.data.clone(),
        })
    }

    /// Reverses the order of the axes without moving any data.
    pub fn transpose(&self) -> Array {
        if self.num_dim() < 2 {
            return self.clone();
        }
        let mut dims = self.dims().to_vec();
        dims.reverse();
        let mut stride = self.stride.clone();
        stride.reverse();
        Array {
            shape: Shape::new(dims),
            stride,
            offset: self.offset,
            data: self.data.clone(),
        }
    }

    /// Reinterprets the view with a new shape over the same buffer.
    ///
    /// # Errors
    /// - [`ArrayError::NonContiguousReshape`] if the trailing stride is not 1
    ///   (e.g. after a transpose).
    /// - [`ArrayError::ShapeMismatch`] if the element count changes or the
    ///   array is rank 0.
    /// - [`ArrayError::OutOfBounds`] if the new layout would leave the buffer.
    pub fn reshape(&self, new_shape: impl Into<Shape>) -> Result<Array, ArrayError> {
        let new_shape = new_shape.into();
        let Some(&last_stride) = self.stride.last() else {
            return Err(ArrayError::ShapeMismatch {
                op: "reshape",
                lhs: self.shape.clone(),
                rhs: new_shape,
            });
        };
        if last_stride != 1 {
            return Err(ArrayError::NonContiguousReshape {
                stride: last_stride,
            });
        }
        if new_shape.num_elements() != self.size() {
            return Err(ArrayError::ShapeMismatch {
                op: "reshape",
                lhs: self.shape.clone(),
                rhs: new_shape,
            });
        }
        let storage = match &self.data {
            Data::Buffer(storage) => storage.clone(),
            Data::Scalar(_) => unreachable!("rank-0 arrays have no strides"),
        };
        if new_shape.rank() == 0 {
            return self.get(&vec![0; self.num_dim()]).map(Array::scalar);
        }
        let stride = new_shape.strides();
        check_bounds(&new_shape, &stride, self.offset, storage.len())?;
        Ok(Array {
            shape: new_shape,
            stride,
            offset: self.offset,
            data: Data::Buffer(storage),
        })
    }

    // ── Materialisation ────────────────────────────────────────

    /// Walks every logical index and writes the elements into a fresh
    /// row-major buffer with offset zero. The result never aliases `self`.
    pub fn copy_of(&self) -> Array {
        self.to_dtype(self.dtype())
    }

    /// Like [`copy_of`](Array::copy_of), converting the elements to `dtype`
    /// on the way. `Float32` to `Int32` truncates toward zero.
    pub fn to_dtype(&self, dtype: DType) -> Array {
        let storage = match &self.data {
            Data::Scalar(s) => {
                return match dtype {
                    DType::Int32 => Array::scalar(match *s {
                        Scalar::Int(v) => v,
                        Scalar::Float(v) => v as i32,
                    }),
                    DType::Float32 => Array::scalar(s.as_f32()),
                };
            }
            Data::Buffer(storage) => storage,
        };
        let storage = match (storage, dtype) {
            (Storage::Int(b), DType::Int32) => Storage::from_vec(self.gather(b, |v| v)),
            (Storage::Int(b), DType::Float32) => Storage::from_vec(self.gather(b, |v| v as f32)),
            (Storage::Float(b), DType::Float32) => Storage::from_vec(self.gather(b, |v| v)),
            (Storage::Float(b), DType::Int32) => Storage::from_vec(self.gather(b, |v| v as i32)),
        };
        Array::contiguous(self.shape.clone(), storage)
    }

    fn gather<T: Copy, U>(&self, buffer: &Buffer<T>, convert: impl Fn(T) -> U) -> Vec<U> {
        let data = buffer.read();
        self.flat_indices().map(|i| convert(data[i])).collect()
    }

    /// Lazily yields every element in row-major logical order, widened to
    /// `f64`.
    ///
    /// The iterator holds a read lock on the buffer until it is dropped, so
    /// writing through another view of the same buffer meanwhile blocks.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        let values: Box<dyn Iterator<Item = f64> + '_> = match &self.data {
            Data::Scalar(s) => Box::new(std::iter::once(s.as_f64())),
            Data::Buffer(Storage::Int(b)) => Box::new(self.widened(b)),
            Data::Buffer(Storage::Float(b)) => Box::new(self.widened(b)),
        };
        values
    }

    fn widened<'a, T: Copy + Into<f64>>(
        &'a self,
        buffer: &'a Buffer<T>,
    ) -> impl Iterator<Item = f64> + 'a {
        let data = buffer.read();
        self.flat_indices().map(move |i| data[i].into())
    }

    /// Every element in row-major logical order, widened to `f64`.
    pub fn to_vec_f64(&self) -> Vec<f64> {
        self.values().collect()
    }

    /// Every element in row-major logical order.
    ///
    /// # Errors
    /// [`ArrayError::TypeMismatch`] if `T` is not the array's element kind.
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>, ArrayError> {
        let mismatch = ArrayError::TypeMismatch {
            expected: T::DTYPE,
            actual: self.dtype(),
        };
        match &self.data {
            Data::Scalar(s) => T::from_scalar(*s).map(|v| vec![v]).ok_or(mismatch),
            Data::Buffer(storage) => {
                let buffer = T::buffer(storage).ok_or(mismatch)?;
                Ok(self.gather(buffer, |v| v))
            }
        }
    }
}

/// Verifies that every flat index reachable by `(shape, stride, offset)`
/// lies in `0..len`. Empty shapes reach nothing.
pub(crate) fn check_bounds(
    shape: &Shape,
    stride: &[isize],
    offset: usize,
    len: usize,
) -> Result<(), ArrayError> {
    if shape.num_elements() == 0 {
        return Ok(());
    }
    let mut low = offset as isize;
    let mut high = offset as isize;
    for (&extent, &s) in shape.dims().iter().zip(stride) {
        let span = (extent as isize - 1) * s;
        if span < 0 {
            low += span;
        } else {
            high += span;
        }
    }
    if low < 0 {
        return Err(ArrayError::OutOfBounds {
            required: low,
            available: len,
        });
    }
    if high >= len as isize {
        return Err(ArrayError::OutOfBounds {
            required: high,
            available: len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_dim() -> Array {
        Array::new(vec![
            vec![
                vec![vec![1111, 1112, 1113, 1114], vec![1121, 1122, 1123, 1124]],
                vec![vec![1211, 1212, 1213, 1214], vec![1221, 1222, 1223, 1223]],
                vec![vec![1311, 1312, 1313, 1314], vec![1321, 1322, 1323, 1324]],
            ],
            vec![
                vec![vec![2111, 2112, 2113, 2114], vec![2121, 2122, 2124, 2124]],
                vec![vec![2211, 2212, 2213, 2214], vec![2221, 2222, 2223, 2224]],
                vec![vec![2311, 2312, 2313, 2314], vec![2321, 2322, 2323, 2324]],
            ],
        ])
        .unwrap()
    }

    fn two_by_four() -> Array {
        Array::new([[1, 2, 3, 4], [5, 6, 7, 8]]).unwrap()
    }

    #[test]
    fn test_from_vec() {
        let a = Array::from_vec([2, 3], vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(a.dtype(), DType::Float32);
        assert_eq!(a.stride(), &[3, 1]);
        assert_eq!(a.get_float(&[1, 2]).unwrap(), 6.0);
    }

    #[test]
    fn test_from_vec_size_mismatch() {
        let result = Array::from_vec([2, 3], vec![1, 2, 3]);
        assert!(matches!(result, Err(ArrayError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_from_raw_parts_out_of_bounds() {
        let result = Array::from_raw_parts([2, 3], vec![3, 1], 1, vec![0i32; 6]);
        assert!(matches!(
            result,
            Err(ArrayError::OutOfBounds {
                required: 6,
                available: 6
            })
        ));
        let negative = Array::from_raw_parts([3], vec![-1], 1, vec![0i32; 6]);
        assert!(matches!(negative, Err(ArrayError::OutOfBounds { required: -1, .. })));
    }

    #[test]
    fn test_from_raw_parts_negative_stride() {
        let a = Array::from_raw_parts([3], vec![-1], 2, vec![1, 2, 3]).unwrap();
        assert_eq!(a.to_vec::<i32>().unwrap(), vec![3, 2, 1]);
    }

    #[test]
    fn test_zeros() {
        let a = Array::zeros([2, 2], DType::Int32);
        assert_eq!(a.to_vec::<i32>().unwrap(), vec![0; 4]);
        let s = Array::zeros(Shape::scalar(), DType::Float32);
        assert_eq!(s.as_scalar(), Some(Scalar::Float(0.0)));
    }

    #[test]
    fn test_from_fn() {
        let mut next = 0.0f32;
        let a = Array::from_fn([2, 2], || {
            next += 0.5;
            next
        });
        assert_eq!(a.to_vec::<f32>().unwrap(), vec![0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn test_get_requires_full_index() {
        let a = two_by_four();
        assert!(matches!(
            a.get_int(&[1]),
            Err(ArrayError::WrongIndexCount { expected: 2, actual: 1 })
        ));
        assert!(matches!(a.get_int(&[2, 0]), Err(ArrayError::IndexOutOfRange { axis: 0, .. })));
    }

    #[test]
    fn test_get_wrong_kind() {
        let a = two_by_four();
        assert!(matches!(
            a.get_float(&[0, 0]),
            Err(ArrayError::TypeMismatch {
                expected: DType::Float32,
                actual: DType::Int32
            })
        ));
    }

    #[test]
    fn test_compute_index() {
        let a = four_dim();
        assert_eq!(a.compute_index(&[1, 2]).unwrap(), 24 + 16);
        assert_eq!(a.compute_index(&[]).unwrap(), 0);
        assert!(matches!(
            a.compute_index(&[0, 0, 0, 0, 0]),
            Err(ArrayError::TooManyIndices { given: 5, .. })
        ));
    }

    #[test]
    fn test_four_dim_sub_array() {
        let a = four_dim();
        assert_eq!(a.dims(), &[2, 3, 2, 4]);
        assert_eq!(a.get_int(&[0, 0, 0, 0]).unwrap(), 1111);
        assert_eq!(a.get_int(&[1, 2, 0, 3]).unwrap(), 2314);

        let sub = a.sub_array(&[1, 2]).unwrap();
        assert_eq!(sub.dims(), &[2, 4]);
        let expected = [2311, 2312, 2313, 2314, 2321, 2322, 2323, 2324];
        assert_eq!(sub.to_vec::<i32>().unwrap(), expected);
        assert!(sub.shares_buffer(&a));
    }

    #[test]
    fn test_sub_array_full_index_is_scalar() {
        let a = two_by_four();
        let s = a.sub_array(&[1, 3]).unwrap();
        assert_eq!(s.num_dim(), 0);
        assert_eq!(s.as_scalar(), Some(Scalar::Int(8)));
        assert_eq!(s.get_int(&[]).unwrap(), 8);
    }

    #[test]
    fn test_row_keeps_leading_axis() {
        let a = two_by_four();
        let r = a.row(&[1]).unwrap();
        assert_eq!(r.dims(), &[1, 4]);
        assert_eq!(r.stride(), &[4, 1]);
        assert_eq!(r.to_vec::<i32>().unwrap(), vec![5, 6, 7, 8]);

        let e = a.row(&[0, 2]).unwrap();
        assert_eq!(e.dims(), &[1]);
        assert_eq!(e.to_vec::<i32>().unwrap(), vec![3]);
    }

    #[test]
    fn test_range() {
        let a = Array::new([[1, 2], [3, 4], [5, 6], [7, 8]]).unwrap();
        let r = a.range(1, 3).unwrap();
        assert_eq!(r.dims(), &[2, 2]);
        assert_eq!(r.offset(), 2);
        assert_eq!(r.to_vec::<i32>().unwrap(), vec![3, 4, 5, 6]);

        assert_eq!(a.range(4, 4).unwrap().size(), 0);
        assert!(a.range(2, 5).is_err());
        assert!(a.range(3, 2).is_err());
        assert!(Array::scalar(1).range(0, 1).is_err());
    }

    #[test]
    fn test_transpose() {
        let a = two_by_four();
        let t = a.transpose();
        assert_eq!(t.dims(), &[4, 2]);
        assert_eq!(t.stride(), &[1, 4]);
        for i in 0..4 {
            for j in 0..2 {
                assert_eq!(t.get_int(&[i, j]).unwrap(), a.get_int(&[j, i]).unwrap());
            }
        }
        let v = Array::new([1, 2, 3]).unwrap();
        assert_eq!(v.transpose().stride(), v.stride());
    }

    #[test]
    fn test_column_of_transpose() {
        let a = Array::new([
            [1.0f32, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [10.0, 11.0, 12.0, 13.0],
        ])
        .unwrap();
        let col = a.transpose().sub_array(&[1]).unwrap();
        assert_eq!(col.to_vec::<f32>().unwrap(), vec![2.0, 6.0, 11.0]);
    }

    #[test]
    fn test_reshape_2d_to_1d() {
        let flat = two_by_four().reshape([8]).unwrap();
        for i in 0..8 {
            assert_eq!(flat.get_int(&[i]).unwrap(), i as i32 + 1);
        }
    }

    #[test]
    fn test_reshape_1d_to_2d() {
        let a = Array::new([1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let r = a.reshape([2, 4]).unwrap();
        assert_eq!(r.get_int(&[1, 2]).unwrap(), 7);
        assert!(r.shares_buffer(&a));
    }

    #[test]
    fn test_reshape_of_sub_array() {
        let a = Array::from_vec([2, 6], (0..12).collect::<Vec<i32>>()).unwrap();
        let r = a.sub_array(&[1]).unwrap().reshape([2, 3]).unwrap();
        assert_eq!(r.offset(), 6);
        assert_eq!(r.get_int(&[1, 0]).unwrap(), 9);
    }

    #[test]
    fn test_reshape_transposed_fails() {
        let t = two_by_four().transpose();
        assert!(matches!(
            t.reshape([8]),
            Err(ArrayError::NonContiguousReshape { stride: 4 })
        ));
    }

    #[test]
    fn test_reshape_wrong_count_fails() {
        assert!(matches!(
            two_by_four().reshape([3, 3]),
            Err(ArrayError::ShapeMismatch { op: "reshape", .. })
        ));
        assert!(Array::scalar(1).reshape([1]).is_err());
    }

    #[test]
    fn test_copy_of_column() {
        let a = Array::new([
            [[111, 112, 113], [121, 122, 123], [131, 132, 133]],
            [[211, 212, 213], [221, 222, 223], [231, 232, 233]],
            [[311, 312, 313], [321, 322, 323], [331, 332, 333]],
        ])
        .unwrap();
        let col = a.sub_array(&[1]).unwrap().transpose().sub_array(&[1]).unwrap();
        assert_eq!(col.stride(), &[3]);
        assert_eq!(col.offset(), 10);

        let copy = col.copy_of();
        assert_eq!(copy, Array::new([212, 222, 232]).unwrap());
        assert_eq!(copy.dims(), &[3]);
        assert_eq!(copy.stride(), &[1]);
        assert_eq!(copy.offset(), 0);
        assert!(!copy.shares_buffer(&a));
    }

    #[test]
    fn test_copy_of_contiguous_is_fresh() {
        let a = two_by_four();
        let mut copy = a.copy_of();
        assert!(!copy.shares_buffer(&a));
        copy.set(&[0, 0], 100).unwrap();
        assert_eq!(a.get_int(&[0, 0]).unwrap(), 1);
    }

    #[test]
    fn test_set_visible_through_views() {
        let a = two_by_four();
        let mut t = a.transpose();
        t.set(&[3, 1], 80).unwrap();
        assert_eq!(a.get_int(&[1, 3]).unwrap(), 80);
        let row = a.sub_array(&[1]).unwrap();
        assert_eq!(row.get_int(&[3]).unwrap(), 80);
    }

    #[test]
    fn test_set_wrong_kind() {
        let mut a = two_by_four();
        assert!(matches!(a.set(&[0, 0], 1.5f32), Err(ArrayError::TypeMismatch { .. })));
    }

    #[test]
    fn test_scalar_array() {
        let mut s = Array::scalar(10);
        assert_eq!(s.dtype(), DType::Int32);
        assert_eq!(s.get_int(&[]).unwrap(), 10);
        assert_eq!(s.to_vec_f64(), vec![10.0]);
        s.set(&[], 11).unwrap();
        assert_eq!(s.get_int(&[]).unwrap(), 11);
    }

    #[test]
    fn test_values_follow_view_lazily() {
        let a = two_by_four();
        let t = a.transpose();
        let mut values = t.values();
        assert_eq!(values.next(), Some(1.0));
        assert_eq!(values.next(), Some(5.0));
        assert_eq!(values.size_hint(), (6, Some(6)));
        drop(values);
        assert_eq!(t.values().count(), 8);
        assert_eq!(Array::scalar(2.5f32).values().collect::<Vec<_>>(), vec![2.5]);
        assert_eq!(a.range(1, 1).unwrap().values().next(), None);
    }

    #[test]
    fn test_to_dtype() {
        let f = two_by_four().transpose().to_dtype(DType::Float32);
        assert_eq!(f.dtype(), DType::Float32);
        assert!(f.is_contiguous());
        assert_eq!(f.to_vec::<f32>().unwrap(), vec![1.0, 5.0, 2.0, 6.0, 3.0, 7.0, 4.0, 8.0]);
    }

    #[test]
    fn test_is_contiguous() {
        let a = two_by_four();
        assert!(a.is_contiguous());
        assert!(!a.transpose().is_contiguous());
        assert!(a.sub_array(&[1]).unwrap().is_contiguous());
    }
}
