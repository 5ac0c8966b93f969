// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Construction of arrays from nested literals and JSON documents.
//!
//! Nesting depth determines the rank and the (uniform) length of each level
//! determines the extent of that axis. Elements are copied, in row-major
//! order, into a fresh contiguous buffer.

use crate::{Array, ArrayError, Element, Shape};
use serde_json::Value;

/// A homogeneous nested literal of `i32` or `f32`.
///
/// Implemented for the two element types themselves (rank 0) and, to any
/// depth, for arrays, slices and `Vec`s of literals.
pub trait Literal {
    type Elem: Element;

    /// Nesting depth, i.e. the rank of the resulting array.
    const DEPTH: usize;

    /// Appends the extent of this level and every level below it, following
    /// the first element at each level.
    fn dims(&self, out: &mut Vec<usize>);

    /// Appends every element in row-major order, checking that each level
    /// matches `dims`.
    fn flatten(&self, dims: &[usize], out: &mut Vec<Self::Elem>) -> Result<(), ArrayError>;
}

macro_rules! leaf_literal {
    ($t:ty) => {
        impl Literal for $t {
            type Elem = $t;
            const DEPTH: usize = 0;

            fn dims(&self, _out: &mut Vec<usize>) {}

            fn flatten(&self, _dims: &[usize], out: &mut Vec<$t>) -> Result<(), ArrayError> {
                out.push(*self);
                Ok(())
            }
        }
    };
}

leaf_literal!(i32);
leaf_literal!(f32);

impl<T: Literal> Literal for [T] {
    type Elem = T::Elem;
    const DEPTH: usize = T::DEPTH + 1;

    fn dims(&self, out: &mut Vec<usize>) {
        out.push(self.len());
        match self.first() {
            Some(first) => first.dims(out),
            None => out.extend(std::iter::repeat(0).take(T::DEPTH)),
        }
    }

    fn flatten(&self, dims: &[usize], out: &mut Vec<Self::Elem>) -> Result<(), ArrayError> {
        if dims.first() != Some(&self.len()) {
            return Err(ArrayError::ShapeMismatch {
                op: "literal",
                lhs: Shape::from(dims),
                rhs: Shape::vector(self.len()),
            });
        }
        for item in self {
            item.flatten(&dims[1..], out)?;
        }
        Ok(())
    }
}

impl<T: Literal, const N: usize> Literal for [T; N] {
    type Elem = T::Elem;
    const DEPTH: usize = T::DEPTH + 1;

    fn dims(&self, out: &mut Vec<usize>) {
        self.as_slice().dims(out)
    }

    fn flatten(&self, dims: &[usize], out: &mut Vec<Self::Elem>) -> Result<(), ArrayError> {
        self.as_slice().flatten(dims, out)
    }
}

impl<T: Literal> Literal for Vec<T> {
    type Elem = T::Elem;
    const DEPTH: usize = T::DEPTH + 1;

    fn dims(&self, out: &mut Vec<usize>) {
        self.as_slice().dims(out)
    }

    fn flatten(&self, dims: &[usize], out: &mut Vec<Self::Elem>) -> Result<(), ArrayError> {
        self.as_slice().flatten(dims, out)
    }
}

impl<L: Literal + ?Sized> Literal for &L {
    type Elem = L::Elem;
    const DEPTH: usize = L::DEPTH;

    fn dims(&self, out: &mut Vec<usize>) {
        (**self).dims(out)
    }

    fn flatten(&self, dims: &[usize], out: &mut Vec<Self::Elem>) -> Result<(), ArrayError> {
        (**self).flatten(dims, out)
    }
}

impl Array {
    /// Deep-copies a nested literal into a new contiguous array.
    ///
    /// # Examples
    /// ```
    /// use array_core::{Array, DType};
    /// let a = Array::new([[1.0f32, 2.0], [3.0, 4.0]]).unwrap();
    /// assert_eq!(a.dims(), &[2, 2]);
    /// assert_eq!(a.dtype(), DType::Float32);
    ///
    /// let s = Array::new(10).unwrap();
    /// assert_eq!(s.num_dim(), 0);
    /// ```
    ///
    /// # Errors
    /// Returns [`ArrayError::ShapeMismatch`] if the nesting is ragged.
    pub fn new<L: Literal>(literal: L) -> Result<Array, ArrayError> {
        let mut dims = Vec::with_capacity(L::DEPTH);
        literal.dims(&mut dims);
        let shape = Shape::new(dims);
        let mut data = Vec::with_capacity(shape.num_elements());
        literal.flatten(shape.dims(), &mut data)?;
        Array::from_vec(shape, data)
    }

    /// Parses a JSON document of nested number lists into an array.
    ///
    /// Integral numbers produce an `Int32` array and numbers written with a
    /// fraction or exponent produce a `Float32` array.
    ///
    /// # Errors
    /// - [`ArrayError::UnsupportedType`] for invalid JSON, non-numeric
    ///   leaves, mixed integer/float leaves, integers outside `i32`, or an
    ///   empty literal whose element kind cannot be inferred.
    /// - [`ArrayError::ShapeMismatch`] if the nesting is ragged.
    pub fn from_json(text: &str) -> Result<Array, ArrayError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| ArrayError::UnsupportedType(format!("invalid JSON literal: {e}")))?;
        Array::from_json_value(&value)
    }

    /// Like [`from_json`](Array::from_json), from an already parsed value.
    pub fn from_json_value(value: &Value) -> Result<Array, ArrayError> {
        let mut dims = Vec::new();
        let mut level = value;
        while let Value::Array(items) = level {
            dims.push(items.len());
            match items.first() {
                Some(first) => level = first,
                None => {
                    return Err(ArrayError::UnsupportedType(
                        "cannot infer the element kind of an empty literal".into(),
                    ))
                }
            }
        }
        let shape = Shape::new(dims);
        let mut leaves = match json_leaf(level)? {
            JsonLeaf::Int(_) => JsonLeaves::Int(Vec::with_capacity(shape.num_elements())),
            JsonLeaf::Float(_) => JsonLeaves::Float(Vec::with_capacity(shape.num_elements())),
        };
        collect_json(value, shape.dims(), &mut leaves)?;
        match leaves {
            JsonLeaves::Int(data) => Array::from_vec(shape, data),
            JsonLeaves::Float(data) => Array::from_vec(shape, data),
        }
    }
}

enum JsonLeaf {
    Int(i32),
    Float(f32),
}

enum JsonLeaves {
    Int(Vec<i32>),
    Float(Vec<f32>),
}

fn json_leaf(value: &Value) -> Result<JsonLeaf, ArrayError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i32::try_from(i).map(JsonLeaf::Int).map_err(|_| {
                    ArrayError::UnsupportedType(format!("integer {i} does not fit in i32"))
                })
            } else if n.is_u64() {
                Err(ArrayError::UnsupportedType(format!("integer {n} does not fit in i32")))
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                Ok(JsonLeaf::Float(f as f32))
            }
        }
        Value::Null => Err(ArrayError::UnsupportedType("null".into())),
        Value::Bool(_) => Err(ArrayError::UnsupportedType("boolean".into())),
        Value::String(_) => Err(ArrayError::UnsupportedType("string".into())),
        Value::Object(_) => Err(ArrayError::UnsupportedType("object".into())),
        Value::Array(_) => unreachable!("arrays are descended by the caller"),
    }
}

fn collect_json(value: &Value, dims: &[usize], out: &mut JsonLeaves) -> Result<(), ArrayError> {
    match (value, dims.split_first()) {
        (Value::Array(items), Some((&extent, rest))) if items.len() == extent => {
            for item in items {
                collect_json(item, rest, out)?;
            }
            Ok(())
        }
        (Value::Array(items), _) => Err(ArrayError::ShapeMismatch {
            op: "literal",
            lhs: Shape::from(dims),
            rhs: Shape::vector(items.len()),
        }),
        (leaf, None) => match (json_leaf(leaf)?, out) {
            (JsonLeaf::Int(v), JsonLeaves::Int(data)) => {
                data.push(v);
                Ok(())
            }
            (JsonLeaf::Float(v), JsonLeaves::Float(data)) => {
                data.push(v);
                Ok(())
            }
            _ => Err(ArrayError::UnsupportedType(
                "mixed integer and floating-point elements".into(),
            )),
        },
        (_, Some(_)) => Err(ArrayError::ShapeMismatch {
            op: "literal",
            lhs: Shape::from(dims),
            rhs: Shape::scalar(),
        }),
    }
}
