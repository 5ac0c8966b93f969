// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Elementwise arithmetic with one-directional broadcasting.
//!
//! Every binary operation copies the left operand (promoted to the result
//! kind) and updates that copy in place. Neither operand is ever written.
//! Shapes are validated before the copy is touched, so a failed operation
//! leaves nothing half-computed behind.

use crate::storage::Buffer;
use crate::{Array, ArrayError, DType, Element, Scalar};

/// The four elementwise binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
        }
    }

    /// Native 32-bit integer arithmetic: wrapping on overflow, truncating
    /// division.
    fn apply_i32(self, a: i32, b: i32) -> Result<i32, ArrayError> {
        Ok(match self {
            BinaryOp::Add => a.wrapping_add(b),
            BinaryOp::Sub => a.wrapping_sub(b),
            BinaryOp::Mul => a.wrapping_mul(b),
            BinaryOp::Div => {
                if b == 0 {
                    return Err(ArrayError::DivisionByZero);
                }
                a.wrapping_div(b)
            }
        })
    }

    fn apply_f32(self, a: f32, b: f32) -> f32 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
        }
    }
}

impl Array {
    /// Elementwise `self + rhs`.
    ///
    /// # Examples
    /// ```
    /// use array_core::Array;
    /// let a = Array::new([1, 2, 3, 4]).unwrap();
    /// let b = Array::new([5, 6, 7, 8]).unwrap();
    /// assert_eq!(a.add(&b).unwrap(), Array::new([6, 8, 10, 12]).unwrap());
    /// ```
    pub fn add(&self, rhs: &Array) -> Result<Array, ArrayError> {
        self.binary(rhs, BinaryOp::Add)
    }

    /// Elementwise `self - rhs`.
    pub fn sub(&self, rhs: &Array) -> Result<Array, ArrayError> {
        self.binary(rhs, BinaryOp::Sub)
    }

    /// Elementwise `self * rhs`.
    pub fn mul(&self, rhs: &Array) -> Result<Array, ArrayError> {
        self.binary(rhs, BinaryOp::Mul)
    }

    /// Elementwise `self / rhs`. Integer division truncates toward zero.
    ///
    /// # Errors
    /// [`ArrayError::DivisionByZero`] if both operands are `Int32` and some
    /// divisor is zero.
    pub fn div(&self, rhs: &Array) -> Result<Array, ArrayError> {
        self.binary(rhs, BinaryOp::Div)
    }

    /// Applies `op` elementwise, broadcasting `rhs` against `self`.
    ///
    /// Broadcasting rules, in order:
    /// 1. a rank-0 `rhs` is applied to every element of `self`;
    /// 2. operands of equal rank must have identical shapes;
    /// 3. a lower-rank `rhs` must match the trailing axes of `self` and is
    ///    replicated over the leading ones.
    ///
    /// A `rhs` of higher rank than `self` is rejected. The result has the
    /// shape of `self`, is contiguous, and is `Int32` only if both operands
    /// are.
    ///
    /// # Errors
    /// [`ArrayError::ShapeMismatch`] when the shapes are not compatible.
    pub fn binary(&self, rhs: &Array, op: BinaryOp) -> Result<Array, ArrayError> {
        check_broadcast(self, rhs, op)?;
        let dtype = self.dtype().promote(rhs.dtype());

        if let (Some(a), Some(b)) = (self.as_scalar(), rhs.as_scalar()) {
            return scalar_op(a, b, dtype, op).map(Array::scalar);
        }

        let out = self.to_dtype(dtype);
        let rhs = if rhs.dtype() == dtype {
            rhs.clone()
        } else {
            rhs.to_dtype(dtype)
        };
        match dtype {
            DType::Int32 => apply_in_place::<i32>(&out, &rhs, |a, b| op.apply_i32(a, b))?,
            DType::Float32 => apply_in_place::<f32>(&out, &rhs, |a, b| Ok(op.apply_f32(a, b)))?,
        }
        Ok(out)
    }

    /// Applies `f` to every element. The result is always `Float32`,
    /// contiguous, and independent of `self`.
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Array {
        let out = self.to_dtype(DType::Float32);
        if let Some(value) = out.as_scalar() {
            return Array::scalar(f(value.as_f32()));
        }
        if let Ok(buffer) = out_buffer::<f32>(&out) {
            buffer.write().iter_mut().for_each(|x| *x = f(*x));
        }
        out
    }
}

fn check_broadcast(lhs: &Array, rhs: &Array, op: BinaryOp) -> Result<(), ArrayError> {
    let mismatch = || ArrayError::ShapeMismatch {
        op: op.as_str(),
        lhs: lhs.shape().clone(),
        rhs: rhs.shape().clone(),
    };
    if rhs.num_dim() == 0 {
        tracing::debug!("{}: broadcasting scalar over {}", op.as_str(), lhs.shape());
        Ok(())
    } else if rhs.num_dim() == lhs.num_dim() {
        if rhs.shape() == lhs.shape() {
            Ok(())
        } else {
            Err(mismatch())
        }
    } else if lhs.num_dim() > rhs.num_dim() && rhs.shape().is_trailing_of(lhs.shape()) {
        tracing::debug!(
            "{}: replicating {} over leading axes of {}",
            op.as_str(),
            rhs.shape(),
            lhs.shape()
        );
        Ok(())
    } else {
        Err(mismatch())
    }
}

fn scalar_op(a: Scalar, b: Scalar, dtype: DType, op: BinaryOp) -> Result<Scalar, ArrayError> {
    match (dtype, a, b) {
        (DType::Int32, Scalar::Int(x), Scalar::Int(y)) => op.apply_i32(x, y).map(Scalar::Int),
        _ => Ok(Scalar::Float(op.apply_f32(a.as_f32(), b.as_f32()))),
    }
}

fn out_buffer<T: Element>(out: &Array) -> Result<&Buffer<T>, ArrayError> {
    out.storage()
        .and_then(T::buffer)
        .ok_or(ArrayError::TypeMismatch {
            expected: T::DTYPE,
            actual: out.dtype(),
        })
}

/// Combines the contiguous `out` with `rhs` in place.
///
/// Because `out` is row-major and `rhs` matches its trailing axes, the
/// `k`-th element of `out` pairs with the `k mod rhs.size()`-th element of
/// `rhs` in row-major order.
fn apply_in_place<T: Element>(
    out: &Array,
    rhs: &Array,
    f: impl Fn(T, T) -> Result<T, ArrayError>,
) -> Result<(), ArrayError> {
    let rhs_values = rhs.to_vec::<T>()?;
    let period = rhs_values.len();
    let buffer = out_buffer::<T>(out)?;
    let mut data = buffer.write();
    for (k, x) in data.iter_mut().enumerate() {
        *x = f(*x, rhs_values[k % period])?;
    }
    Ok(())
}
