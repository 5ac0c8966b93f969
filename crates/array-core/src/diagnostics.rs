// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Equality and textual rendering.
//!
//! # Equality
//! `==` is structural: two arrays are equal only if they have the same
//! element kind, the same shape **and the same strides**, and then hold
//! equal values at every multi-index. Equal logical content under a
//! different layout (say a transposed view against its contiguous copy)
//! compares unequal; use [`Array::same_values`] for a layout-blind check.
//! Offsets are not compared.
//!
//! This per-index comparison replaces the buffer-span comparison that
//! equality used to perform. That older behaviour is still available,
//! unchanged, as [`Array::raw_range_eq`]: it looks at every buffer slot
//! between the first and last reachable element, so it also sees the gaps a
//! strided view skips over and can disagree with `==` on strided views.

use crate::array::Data;
use crate::storage::{Buffer, Storage};
use crate::{Array, Element};
use std::fmt;

impl PartialEq for Array {
    fn eq(&self, other: &Array) -> bool {
        if self.dtype() != other.dtype() || self.shape != other.shape || self.stride != other.stride
        {
            return false;
        }
        match (&self.data, &other.data) {
            (Data::Scalar(a), Data::Scalar(b)) => a == b,
            (Data::Buffer(Storage::Int(a)), Data::Buffer(Storage::Int(b))) => {
                compare_with(a, b, |x, y| {
                    self.flat_indices().zip(other.flat_indices()).all(|(i, j)| x[i] == y[j])
                })
            }
            (Data::Buffer(Storage::Float(a)), Data::Buffer(Storage::Float(b))) => {
                compare_with(a, b, |x, y| {
                    self.flat_indices().zip(other.flat_indices()).all(|(i, j)| x[i] == y[j])
                })
            }
            _ => false,
        }
    }
}

/// Runs `f` over both buffers, taking a single read guard when they are the
/// same allocation.
fn compare_with<T: Element>(
    a: &Buffer<T>,
    b: &Buffer<T>,
    f: impl FnOnce(&[T], &[T]) -> bool,
) -> bool {
    let a_guard = a.read();
    if a.ptr_eq(b) {
        return f(&a_guard, &a_guard);
    }
    let b_guard = b.read();
    f(&a_guard, &b_guard)
}

impl Array {
    /// Compares the raw buffer span `offset ..= flat(last index)` of both
    /// arrays after the same kind/shape/stride checks as `==`.
    ///
    /// For contiguous arrays this agrees with `==`. For strided views it
    /// also compares the buffer slots the view skips, and for views with
    /// negative strides the span may be empty, so the verdict can differ
    /// from the per-index comparison.
    pub fn raw_range_eq(&self, other: &Array) -> bool {
        if self.dtype() != other.dtype() || self.shape != other.shape || self.stride != other.stride
        {
            return false;
        }
        match (&self.data, &other.data) {
            (Data::Scalar(a), Data::Scalar(b)) => a == b,
            (Data::Buffer(Storage::Int(a)), Data::Buffer(Storage::Int(b))) => {
                let (x, y) = (self.raw_span(), other.raw_span());
                compare_with(a, b, |a, b| a[x] == b[y])
            }
            (Data::Buffer(Storage::Float(a)), Data::Buffer(Storage::Float(b))) => {
                let (x, y) = (self.raw_span(), other.raw_span());
                compare_with(a, b, |a, b| a[x] == b[y])
            }
            _ => false,
        }
    }

    /// `offset .. flat(last index) + 1`, empty when nothing is reachable or
    /// the last index lies before the offset.
    fn raw_span(&self) -> std::ops::Range<usize> {
        if self.size() == 0 {
            return self.offset..self.offset;
        }
        let last: Vec<usize> = self.dims().iter().map(|&d| d - 1).collect();
        let end = self.flat_index(&last) + 1;
        self.offset..end.max(self.offset)
    }

    /// Returns `true` if both arrays have the same shape and the same value
    /// at every multi-index, regardless of strides, offsets or element kind.
    /// Values are compared after widening to `f64`.
    pub fn same_values(&self, other: &Array) -> bool {
        self.shape == other.shape && self.to_vec_f64() == other.to_vec_f64()
    }
}

// ── Rendering ──────────────────────────────────────────────────

/// Renders nested brace groups in row-major order, e.g. `{{1, 2}, {3, 4}}`.
/// A rank-0 array renders as its bare value.
impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Data::Scalar(s) => write!(f, "{s}"),
            Data::Buffer(Storage::Int(b)) => render(self, &b.read(), f),
            Data::Buffer(Storage::Float(b)) => render(self, &b.read(), f),
        }
    }
}

fn render<T: Element>(array: &Array, data: &[T], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    render_axis(array, data, &mut Vec::with_capacity(array.num_dim()), f)
}

fn render_axis<T: Element>(
    array: &Array,
    data: &[T],
    idx: &mut Vec<usize>,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    let axis = idx.len();
    if axis == array.num_dim() {
        return write!(f, "{}", data[array.flat_index(idx)].into_scalar());
    }
    f.write_str("{")?;
    for i in 0..array.dims()[axis] {
        if i > 0 {
            f.write_str(", ")?;
        }
        idx.push(i);
        render_axis(array, data, idx, f)?;
        idx.pop();
    }
    f.write_str("}")
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array")
            .field("dtype", &self.dtype())
            .field("shape", &self.dims())
            .field("stride", &self.stride)
            .field("offset", &self.offset)
            .field("data", &format_args!("{self}"))
            .finish()
    }
}
