// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Rank-dispatching dot product and (batched) matrix multiply.
//!
//! # Dispatch
//! | `a` rank | `b` rank | result                                             |
//! |----------|----------|----------------------------------------------------|
//! | 0        | any      | every element of `b` times the scalar              |
//! | any      | 0        | every element of `a` times the scalar              |
//! | 1        | 1        | inner product (rank 0)                             |
//! | n        | 1        | one inner product per leading index of `a`         |
//! | n        | m ≥ 2    | `a[.., k] · b[.., k, j]`, shape `a[..n-1] ++ b[..m-2] ++ [b[m-1]]` |
//!
//! All contractions go through a [`Kernel`] with the operands' own offsets
//! and strides, so transposed and sliced views are read in place.

use super::kernel::{InnerLayout, Kernel, MatmulLayout, ReferenceKernel};
use crate::storage::Buffer;
use crate::{Array, ArrayError, DType, Element, IndexIterator, Shape};

impl Array {
    /// Generalised dot product using the portable [`ReferenceKernel`].
    ///
    /// # Examples
    /// ```
    /// use array_core::Array;
    /// let a = Array::new([[1, 2, 3, 4], [5, 6, 7, 8]]).unwrap();
    /// let b = Array::new([[9, 10], [11, 12], [13, 14], [15, 16]]).unwrap();
    /// let c = a.dot(&b).unwrap();
    /// assert_eq!(c, Array::new([[130, 140], [322, 348]]).unwrap());
    /// ```
    ///
    /// # Errors
    /// [`ArrayError::ShapeMismatch`] when the contracted extents differ.
    pub fn dot(&self, other: &Array) -> Result<Array, ArrayError> {
        self.dot_with(other, &ReferenceKernel)
    }

    /// Generalised dot product computed by `kernel`.
    ///
    /// The result is `Int32` only if both operands are; otherwise the
    /// integer operand is converted to `Float32` first.
    pub fn dot_with(&self, other: &Array, kernel: &dyn Kernel) -> Result<Array, ArrayError> {
        tracing::debug!(
            "dot {} · {} ({} · {}) with {} kernel",
            self.shape(),
            other.shape(),
            self.dtype().as_str(),
            other.dtype().as_str(),
            kernel.name()
        );

        if self.num_dim() == 0 {
            return other.mul(self);
        }
        if other.num_dim() == 0 {
            return self.mul(other);
        }

        let dtype = self.dtype().promote(other.dtype());
        let a = promoted(self, dtype);
        let b = promoted(other, dtype);
        match dtype {
            DType::Int32 => contract::<i32>(&a, &b, kernel),
            DType::Float32 => contract::<f32>(&a, &b, kernel),
        }
    }
}

fn promoted(array: &Array, dtype: DType) -> Array {
    if array.dtype() == dtype {
        array.clone()
    } else {
        array.to_dtype(dtype)
    }
}

/// Routes an element kind to the matching typed kernel entry points.
trait Dispatch: Element {
    fn inner(kernel: &dyn Kernel, layout: &InnerLayout, a: &[Self], b: &[Self]) -> Self;
    fn matmul(kernel: &dyn Kernel, layout: &MatmulLayout, a: &[Self], b: &[Self]) -> Vec<Self>;
}

impl Dispatch for i32 {
    fn inner(kernel: &dyn Kernel, layout: &InnerLayout, a: &[i32], b: &[i32]) -> i32 {
        kernel.inner_i32(layout, a, b)
    }

    fn matmul(kernel: &dyn Kernel, layout: &MatmulLayout, a: &[i32], b: &[i32]) -> Vec<i32> {
        kernel.matmul_i32(layout, a, b)
    }
}

impl Dispatch for f32 {
    fn inner(kernel: &dyn Kernel, layout: &InnerLayout, a: &[f32], b: &[f32]) -> f32 {
        kernel.inner_f32(layout, a, b)
    }

    fn matmul(kernel: &dyn Kernel, layout: &MatmulLayout, a: &[f32], b: &[f32]) -> Vec<f32> {
        kernel.matmul_f32(layout, a, b)
    }
}

fn buffer_of<T: Element>(array: &Array) -> Result<&Buffer<T>, ArrayError> {
    array
        .storage()
        .and_then(T::buffer)
        .ok_or(ArrayError::TypeMismatch {
            expected: T::DTYPE,
            actual: array.dtype(),
        })
}

fn mismatch(a: &Array, b: &Array) -> ArrayError {
    ArrayError::ShapeMismatch {
        op: "dot",
        lhs: a.shape().clone(),
        rhs: b.shape().clone(),
    }
}

/// Contracts the last axis of `a` against the matching axis of `b`. Both
/// operands have rank ≥ 1 and the same element kind.
fn contract<T: Dispatch>(a: &Array, b: &Array, kernel: &dyn Kernel) -> Result<Array, ArrayError> {
    let n = a.num_dim();
    let m = b.num_dim();
    let k = a.dims()[n - 1];
    let contracted = if m == 1 { b.dims()[0] } else { b.dims()[m - 2] };
    if k != contracted {
        return Err(mismatch(a, b));
    }

    let a_buf = buffer_of::<T>(a)?;
    let b_buf = buffer_of::<T>(b)?;
    // A single guard when both views share one buffer (e.g. `a.dot(&a)`).
    let a_guard = a_buf.read();
    let b_guard;
    let b_data: &[T] = if a_buf.ptr_eq(b_buf) {
        &a_guard
    } else {
        b_guard = b_buf.read();
        &b_guard
    };
    let a_data: &[T] = &a_guard;

    if m == 1 {
        return batched_inner(a, b, a_data, b_data, kernel);
    }
    if m == 2 {
        return batched_matmul(a, b, a_data, b_data, kernel);
    }
    general(a, b, a_data, b_data, kernel)
}

/// `(n, 1)`: one inner product per leading index of `a`.
fn batched_inner<T: Dispatch>(
    a: &Array,
    b: &Array,
    a_data: &[T],
    b_data: &[T],
    kernel: &dyn Kernel,
) -> Result<Array, ArrayError> {
    let n = a.num_dim();
    let mut layout = InnerLayout {
        len: b.dims()[0],
        a_offset: a.offset(),
        a_stride: a.stride()[n - 1],
        b_offset: b.offset(),
        b_stride: b.stride()[0],
    };
    if n == 1 {
        let value = T::inner(kernel, &layout, a_data, b_data);
        return Ok(Array::scalar(value.into_scalar()));
    }

    let leading = &a.dims()[..n - 1];
    let mut out = Vec::with_capacity(leading.iter().product());
    for idx in IndexIterator::new(leading) {
        layout.a_offset = a.flat_index(&idx);
        out.push(T::inner(kernel, &layout, a_data, b_data));
    }
    Array::from_vec(leading, out)
}

/// `(n, 2)`: one full matrix multiply per batch index of `a`, treating the
/// last two axes of `a` (or its single axis, as one row) as the left matrix.
fn batched_matmul<T: Dispatch>(
    a: &Array,
    b: &Array,
    a_data: &[T],
    b_data: &[T],
    kernel: &dyn Kernel,
) -> Result<Array, ArrayError> {
    let n = a.num_dim();
    let (rows, a_row_stride, batch) = if n == 1 {
        (1, 0, &a.dims()[..0])
    } else {
        (a.dims()[n - 2], a.stride()[n - 2], &a.dims()[..n - 2])
    };
    let mut layout = MatmulLayout {
        rows,
        cols: b.dims()[1],
        inner: b.dims()[0],
        a_offset: a.offset(),
        a_row_stride,
        a_col_stride: a.stride()[n - 1],
        b_offset: b.offset(),
        b_row_stride: b.stride()[0],
        b_col_stride: b.stride()[1],
    };

    let mut dims = a.dims()[..n - 1].to_vec();
    dims.push(layout.cols);
    let shape = Shape::new(dims);
    if batch.is_empty() {
        let out = T::matmul(kernel, &layout, a_data, b_data);
        return Array::from_vec(shape, out);
    }

    let mut out = Vec::with_capacity(shape.num_elements());
    for idx in IndexIterator::new(batch) {
        layout.a_offset = a.flat_index(&idx);
        out.extend(T::matmul(kernel, &layout, a_data, b_data));
    }
    Array::from_vec(shape, out)
}

/// `(n, m ≥ 3)`: every leading index of `a` against every leading index of
/// `b`, each a `1 × cols` product.
fn general<T: Dispatch>(
    a: &Array,
    b: &Array,
    a_data: &[T],
    b_data: &[T],
    kernel: &dyn Kernel,
) -> Result<Array, ArrayError> {
    let n = a.num_dim();
    let m = b.num_dim();
    let a_lead = &a.dims()[..n - 1];
    let b_lead = &b.dims()[..m - 2];

    let mut dims = a_lead.to_vec();
    dims.extend_from_slice(b_lead);
    dims.push(b.dims()[m - 1]);
    let shape = Shape::new(dims);

    let mut layout = MatmulLayout {
        rows: 1,
        cols: b.dims()[m - 1],
        inner: b.dims()[m - 2],
        a_offset: a.offset(),
        a_row_stride: 0,
        a_col_stride: a.stride()[n - 1],
        b_offset: b.offset(),
        b_row_stride: b.stride()[m - 2],
        b_col_stride: b.stride()[m - 1],
    };
    tracing::trace!(
        "batched matmul: {} a-rows × {} b-slices",
        a_lead.iter().product::<usize>(),
        b_lead.iter().product::<usize>()
    );

    let mut out = Vec::with_capacity(shape.num_elements());
    for a_idx in IndexIterator::new(a_lead) {
        layout.a_offset = a.flat_index(&a_idx);
        for b_idx in IndexIterator::new(b_lead) {
            layout.b_offset = b.flat_index(&b_idx);
            out.extend(T::matmul(kernel, &layout, a_data, b_data));
        }
    }
    Array::from_vec(shape, out)
}
