// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Inner-product and matrix-multiply kernels.
//!
//! Kernels read operands straight out of flat buffers using explicit
//! offsets and strides, so transposed and sliced views never need to be
//! copied first. The dot engine picks no kernel on its own: callers pass one
//! to [`Array::dot_with`](crate::Array::dot_with), and
//! [`Array::dot`](crate::Array::dot) uses [`ReferenceKernel`].
//!
//! Integer kernels use wrapping 32-bit arithmetic. Float kernels accumulate
//! in `f64` and narrow to `f32` once per output element.

use crate::ArrayError;
use rayon::prelude::*;

/// Operand layout for a strided inner product of length `len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InnerLayout {
    pub len: usize,
    pub a_offset: usize,
    pub a_stride: isize,
    pub b_offset: usize,
    pub b_stride: isize,
}

/// Operand layout for `C[rows, cols] = A[rows, inner] · B[inner, cols]`.
///
/// `A[i, k]` lives at `a_offset + i * a_row_stride + k * a_col_stride`, and
/// likewise for `B`. The output is always a fresh row-major buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatmulLayout {
    pub rows: usize,
    pub cols: usize,
    pub inner: usize,
    pub a_offset: usize,
    pub a_row_stride: isize,
    pub a_col_stride: isize,
    pub b_offset: usize,
    pub b_row_stride: isize,
    pub b_col_stride: isize,
}

impl MatmulLayout {
    /// Number of multiply-adds the product performs.
    pub fn work(&self) -> usize {
        self.rows * self.cols * self.inner
    }
}

/// A swappable inner-product / matrix-multiply implementation.
///
/// Every implementation must agree with [`ReferenceKernel`] up to floating
/// point rounding. Implementations must not assume the operands are
/// contiguous or that `a` and `b` are different buffers.
pub trait Kernel: Send + Sync {
    /// Human-readable name of this kernel.
    fn name(&self) -> &str;

    fn inner_i32(&self, layout: &InnerLayout, a: &[i32], b: &[i32]) -> i32;

    fn inner_f32(&self, layout: &InnerLayout, a: &[f32], b: &[f32]) -> f32;

    /// Returns the `rows * cols` product in row-major order.
    fn matmul_i32(&self, layout: &MatmulLayout, a: &[i32], b: &[i32]) -> Vec<i32>;

    /// Returns the `rows * cols` product in row-major order.
    fn matmul_f32(&self, layout: &MatmulLayout, a: &[f32], b: &[f32]) -> Vec<f32>;
}

/// Element-specific accumulation used by the portable loops.
trait Accumulate: Copy + Default + Send + Sync {
    type Acc: Copy;
    const ZERO: Self::Acc;

    fn mul_add(acc: Self::Acc, a: Self, b: Self) -> Self::Acc;
    fn finish(acc: Self::Acc) -> Self;
}

impl Accumulate for i32 {
    type Acc = i32;
    const ZERO: i32 = 0;

    fn mul_add(acc: i32, a: i32, b: i32) -> i32 {
        acc.wrapping_add(a.wrapping_mul(b))
    }

    fn finish(acc: i32) -> i32 {
        acc
    }
}

impl Accumulate for f32 {
    type Acc = f64;
    const ZERO: f64 = 0.0;

    fn mul_add(acc: f64, a: f32, b: f32) -> f64 {
        acc + f64::from(a) * f64::from(b)
    }

    fn finish(acc: f64) -> f32 {
        acc as f32
    }
}

#[inline]
fn step(base: usize, stride: isize, n: usize) -> usize {
    (base as isize + stride * n as isize) as usize
}

fn inner<T: Accumulate>(layout: &InnerLayout, a: &[T], b: &[T]) -> T {
    let mut acc = T::ZERO;
    let mut ai = layout.a_offset as isize;
    let mut bi = layout.b_offset as isize;
    for _ in 0..layout.len {
        acc = T::mul_add(acc, a[ai as usize], b[bi as usize]);
        ai += layout.a_stride;
        bi += layout.b_stride;
    }
    T::finish(acc)
}

/// Fills `out` with consecutive output rows starting at `first_row`.
///
/// `out.len()` must be a multiple of `layout.cols`.
fn matmul_rows<T: Accumulate>(layout: &MatmulLayout, first_row: usize, a: &[T], b: &[T], out: &mut [T]) {
    if layout.cols == 0 {
        return;
    }
    for (r, out_row) in out.chunks_mut(layout.cols).enumerate() {
        let a_row = step(layout.a_offset, layout.a_row_stride, first_row + r);
        for (j, cell) in out_row.iter_mut().enumerate() {
            let b_col = step(layout.b_offset, layout.b_col_stride, j);
            let mut acc = T::ZERO;
            for k in 0..layout.inner {
                let aik = step(a_row, layout.a_col_stride, k);
                let bkj = step(b_col, layout.b_row_stride, k);
                acc = T::mul_add(acc, a[aik], b[bkj]);
            }
            *cell = T::finish(acc);
        }
    }
}

fn matmul_sequential<T: Accumulate>(layout: &MatmulLayout, a: &[T], b: &[T]) -> Vec<T> {
    let mut out = vec![T::default(); layout.rows * layout.cols];
    matmul_rows(layout, 0, a, b, &mut out);
    out
}

// ── Reference kernel ───────────────────────────────────────────

/// Portable triple-loop kernel. Single-threaded and allocation-free apart
/// from the output buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceKernel;

impl ReferenceKernel {
    pub fn new() -> Self {
        Self
    }
}

impl Kernel for ReferenceKernel {
    fn name(&self) -> &str {
        "reference"
    }

    fn inner_i32(&self, layout: &InnerLayout, a: &[i32], b: &[i32]) -> i32 {
        inner(layout, a, b)
    }

    fn inner_f32(&self, layout: &InnerLayout, a: &[f32], b: &[f32]) -> f32 {
        inner(layout, a, b)
    }

    fn matmul_i32(&self, layout: &MatmulLayout, a: &[i32], b: &[i32]) -> Vec<i32> {
        matmul_sequential(layout, a, b)
    }

    fn matmul_f32(&self, layout: &MatmulLayout, a: &[f32], b: &[f32]) -> Vec<f32> {
        matmul_sequential(layout, a, b)
    }
}

// ── Parallel kernel ────────────────────────────────────────────

/// Row-partitioned matrix multiply on a dedicated `rayon` pool.
///
/// Each output element is produced by the same loop as in
/// [`ReferenceKernel`], so results are bit-identical. Products smaller than
/// `threshold` multiply-adds, and all inner products, run on the calling
/// thread.
pub struct ParallelKernel {
    pool: rayon::ThreadPool,
    threshold: usize,
}

impl ParallelKernel {
    /// Builds a kernel with its own pool of `num_threads` workers.
    ///
    /// # Errors
    /// Returns [`ArrayError::Config`] if the thread pool cannot be started.
    pub fn new(num_threads: usize, threshold: usize) -> Result<Self, ArrayError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("array-kernel-{i}"))
            .build()
            .map_err(|e| ArrayError::Config(format!("cannot start kernel thread pool: {e}")))?;
        Ok(Self { pool, threshold })
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    fn matmul<T: Accumulate>(&self, layout: &MatmulLayout, a: &[T], b: &[T]) -> Vec<T> {
        if layout.work() < self.threshold || layout.rows < 2 || layout.cols == 0 {
            return matmul_sequential(layout, a, b);
        }
        let mut out = vec![T::default(); layout.rows * layout.cols];
        self.pool.install(|| {
            out.par_chunks_mut(layout.cols)
                .enumerate()
                .for_each(|(i, row)| matmul_rows(layout, i, a, b, row));
        });
        out
    }
}

impl Kernel for ParallelKernel {
    fn name(&self) -> &str {
        "parallel"
    }

    fn inner_i32(&self, layout: &InnerLayout, a: &[i32], b: &[i32]) -> i32 {
        inner(layout, a, b)
    }

    fn inner_f32(&self, layout: &InnerLayout, a: &[f32], b: &[f32]) -> f32 {
        inner(layout, a, b)
    }

    fn matmul_i32(&self, layout: &MatmulLayout, a: &[i32], b: &[i32]) -> Vec<i32> {
        self.matmul(layout, a, b)
    }

    fn matmul_f32(&self, layout: &MatmulLayout, a: &[f32], b: &[f32]) -> Vec<f32> {
        self.matmul(layout, a, b)
    }
}

impl std::fmt::Debug for ParallelKernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelKernel")
            .field("num_threads", &self.num_threads())
            .field("threshold", &self.threshold)
            .finish()
    }
}
