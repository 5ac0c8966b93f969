// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for array construction, views and arithmetic.

use crate::{DType, Shape};

/// Errors that can occur while building, viewing or combining arrays.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArrayError {
    /// Two arrays have incompatible shapes for the requested operation.
    #[error("incompatible shapes for {op}: {lhs} vs {rhs}")]
    ShapeMismatch {
        op: &'static str,
        lhs: Shape,
        rhs: Shape,
    },

    /// More indices were supplied than the array has dimensions.
    #[error("too many indices: got {given} for shape {shape}")]
    TooManyIndices { given: usize, shape: Shape },

    /// An element accessor was not given exactly one index per dimension.
    #[error("expected {expected} indices to address a single element, got {actual}")]
    WrongIndexCount { expected: usize, actual: usize },

    /// An index (or range bound) lies beyond the extent of its axis.
    #[error("index {index} out of range for axis {axis} with extent {extent}")]
    IndexOutOfRange {
        axis: usize,
        index: usize,
        extent: usize,
    },

    /// The literal or document holds a non-numeric or mixed element kind.
    #[error("unsupported element type: {0}")]
    UnsupportedType(String),

    /// A typed accessor was used on an array of the other element kind.
    #[error("type mismatch: expected {expected:?}, found {actual:?}")]
    TypeMismatch { expected: DType, actual: DType },

    /// Reshape was requested on a view whose trailing stride is not 1.
    #[error("cannot reshape a view with trailing stride {stride}")]
    NonContiguousReshape { stride: isize },

    /// A view reaches flat indices outside its backing buffer.
    #[error("view reaches flat index {required} but the buffer holds {available} elements")]
    OutOfBounds { required: isize, available: usize },

    /// Integer division with a zero divisor.
    #[error("integer division by zero")]
    DivisionByZero,

    /// Engine configuration could not be read or is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}
