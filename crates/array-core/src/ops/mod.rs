// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Array arithmetic operations.
//!
//! Elementwise operators and the dot engine both return fresh contiguous
//! arrays and never write to their operands. Matrix products go through a
//! caller-selected [`Kernel`]; the portable [`ReferenceKernel`] is the
//! default.

mod dot_op;
mod elementwise_op;
pub mod kernel;

pub use elementwise_op::BinaryOp;
pub use kernel::{InnerLayout, Kernel, MatmulLayout, ParallelKernel, ReferenceKernel};
