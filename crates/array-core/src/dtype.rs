// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Supported element kinds and the boxed scalar used by rank-0 arrays.

use crate::storage::{Buffer, Storage};
use std::fmt;

/// Enumerates the numeric kinds an [`crate::Array`] can hold.
///
/// Arithmetic and dot products dispatch on this tag: two `Int32` operands
/// stay integral, anything involving `Float32` is promoted to `Float32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DType {
    /// 32-bit signed integer.
    Int32,
    /// 32-bit IEEE 754 floating point.
    Float32,
}

impl DType {
    /// Returns a human-readable label for this data type.
    pub fn as_str(self) -> &'static str {
        match self {
            DType::Int32 => "i32",
            DType::Float32 => "f32",
        }
    }

    /// The kind produced by combining `self` with `other`.
    pub fn promote(self, other: DType) -> DType {
        if self == DType::Int32 && other == DType::Int32 {
            DType::Int32
        } else {
            DType::Float32
        }
    }
}

/// A single element, boxed by kind.
///
/// Rank-0 arrays hold one of these directly instead of a buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Int(i32),
    Float(f32),
}

impl Scalar {
    pub fn dtype(self) -> DType {
        match self {
            Scalar::Int(_) => DType::Int32,
            Scalar::Float(_) => DType::Float32,
        }
    }

    /// Widens to `f32`. Integers are converted with `as` semantics.
    pub fn as_f32(self) -> f32 {
        match self {
            Scalar::Int(v) => v as f32,
            Scalar::Float(v) => v,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Scalar::Int(v) => f64::from(v),
            Scalar::Float(v) => f64::from(v),
        }
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(v)
    }
}

impl From<f32> for Scalar {
    fn from(v: f32) -> Self {
        Scalar::Float(v)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v:?}"),
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for f32 {}
}

/// Primitive element types that may back an array buffer.
///
/// Sealed: only `i32` and `f32` implement it.
pub trait Element:
    sealed::Sealed + Copy + Default + PartialEq + Send + Sync + fmt::Debug + 'static
{
    const DTYPE: DType;

    fn into_scalar(self) -> Scalar;

    /// Unboxes a scalar of the same kind; `None` for the other kind.
    fn from_scalar(value: Scalar) -> Option<Self>;

    #[doc(hidden)]
    fn wrap_buffer(data: Vec<Self>) -> Storage;

    #[doc(hidden)]
    fn buffer(storage: &Storage) -> Option<&Buffer<Self>>;
}

impl Element for i32 {
    const DTYPE: DType = DType::Int32;

    fn into_scalar(self) -> Scalar {
        Scalar::Int(self)
    }

    fn from_scalar(value: Scalar) -> Option<Self> {
        match value {
            Scalar::Int(v) => Some(v),
            Scalar::Float(_) => None,
        }
    }

    fn wrap_buffer(data: Vec<Self>) -> Storage {
        Storage::Int(Buffer::new(data))
    }

    fn buffer(storage: &Storage) -> Option<&Buffer<Self>> {
        match storage {
            Storage::Int(b) => Some(b),
            Storage::Float(_) => None,
        }
    }
}

impl Element for f32 {
    const DTYPE: DType = DType::Float32;

    fn into_scalar(self) -> Scalar {
        Scalar::Float(self)
    }

    fn from_scalar(value: Scalar) -> Option<Self> {
        match value {
            Scalar::Float(v) => Some(v),
            Scalar::Int(_) => None,
        }
    }

    fn wrap_buffer(data: Vec<Self>) -> Storage {
        Storage::Float(Buffer::new(data))
    }

    fn buffer(storage: &Storage) -> Option<&Buffer<Self>> {
        match storage {
            Storage::Float(b) => Some(b),
            Storage::Int(_) => None,
        }
    }
}
