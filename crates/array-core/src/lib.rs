// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # array-core
//!
//! Dense n-dimensional numeric arrays as strided views over shared buffers.
//!
//! This crate provides:
//! - [`Array`] — a shape/stride/offset view over an `i32` or `f32` buffer.
//! - [`Shape`] — runtime shape descriptors with row-major stride derivation.
//! - [`DType`] / [`Scalar`] — the two supported element kinds.
//! - [`IndexIterator`] — row-major enumeration of every multi-index.
//! - Elementwise arithmetic with scalar and trailing-axis broadcasting.
//! - A rank-dispatching [`Array::dot`] built on a swappable [`Kernel`].
//! - [`EngineConfig`] — TOML-driven kernel selection.
//!
//! # Design Goals
//! - Views share their buffer; [`Array::copy_of`] is the only way to detach.
//! - Operations never mutate their operands and always return fresh arrays.
//! - Kernels read transposed and sliced operands in place.
//! - Clean error types via `thiserror`.

mod array;
mod config;
mod diagnostics;
mod dtype;
mod error;
mod index;
mod literal;
pub mod ops;
mod shape;
mod storage;

pub use array::Array;
pub use config::{EngineConfig, DEFAULT_PARALLEL_THRESHOLD};
pub use dtype::{DType, Element, Scalar};
pub use error::ArrayError;
pub use index::IndexIterator;
pub use literal::Literal;
pub use ops::{BinaryOp, InnerLayout, Kernel, MatmulLayout, ParallelKernel, ReferenceKernel};
pub use shape::Shape;
