// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Shape descriptors and row-major stride derivation.

use std::fmt;

/// The extent of an [`crate::Array`] along each of its axes.
///
/// A `Shape` says nothing about memory layout; the per-axis strides live on
/// the array itself, so that transposed and sliced views can reuse a shape
/// with a different layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Creates a new shape from the given dimensions.
    ///
    /// # Examples
    /// ```
    /// use array_core::Shape;
    /// let s = Shape::new(vec![2, 3, 4]);
    /// assert_eq!(s.rank(), 3);
    /// assert_eq!(s.num_elements(), 24);
    /// ```
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    /// Creates a scalar shape (rank 0).
    pub fn scalar() -> Self {
        Self { dims: vec![] }
    }

    /// Creates a 1-D shape.
    pub fn vector(len: usize) -> Self {
        Self { dims: vec![len] }
    }

    /// Returns the number of dimensions (rank).
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the total number of elements.
    ///
    /// For a scalar shape (rank 0), returns 1.
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Returns the size of a specific dimension, or `None` if out of bounds.
    pub fn dim(&self, index: usize) -> Option<usize> {
        self.dims.get(index).copied()
    }

    /// Computes row-major (C-order) strides for this shape.
    ///
    /// The stride for dimension `i` is the number of elements to skip
    /// in the flat buffer to advance one step along that dimension.
    pub fn strides(&self) -> Vec<isize> {
        let rank = self.dims.len();
        if rank == 0 {
            return vec![];
        }
        let mut strides = vec![0isize; rank];
        strides[rank - 1] = 1;
        for i in (0..rank - 1).rev() {
            strides[i] = strides[i + 1] * self.dims[i + 1] as isize;
        }
        strides
    }

    /// Returns `true` if `self` equals the trailing axes of `other`.
    ///
    /// This is the one-directional broadcasting rule: a lower-rank operand
    /// is replicated over the extra leading axes of a higher-rank one.
    pub fn is_trailing_of(&self, other: &Shape) -> bool {
        self.rank() <= other.rank() && other.dims[other.rank() - self.rank()..] == self.dims[..]
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

/// Convenience: `Shape::from(vec![2, 3])`.
impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

/// Convenience: `Shape::from(&[2, 3][..])`.
impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self::new(dims.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_shape() {
        let s = Shape::scalar();
        assert_eq!(s.rank(), 0);
        assert_eq!(s.num_elements(), 1);
        assert!(s.strides().is_empty());
    }

    #[test]
    fn test_vector_shape() {
        let s = Shape::vector(5);
        assert_eq!(s.rank(), 1);
        assert_eq!(s.num_elements(), 5);
        assert_eq!(s.strides(), vec![1]);
    }


    #[test]
    fn test_matrix_strides() {
        let s = Shape::new(vec![3, 4]);
        assert_eq!(s.rank(), 2);
        assert_eq!(s.num_elements(), 12);
        assert_eq!(s.strides(), vec![4, 1]);
    }

    #[test]
    fn test_4d_strides() {
        let s = Shape::new(vec![2, 3, 2, 4]);
        assert_eq!(s.strides(), vec![24, 8, 4, 1]);
    }

    #[test]
    fn test_zero_extent() {
        let s = Shape::new(vec![3, 0, 2]);
        assert_eq!(s.num_elements(), 0);
        assert_eq!(s.strides(), vec![0, 2, 1]);
    }

    #[test]
    fn test_trailing_of() {
        let big = Shape::new(vec![2, 2, 4]);
        assert!(Shape::new(vec![2, 4]).is_trailing_of(&big));
        assert!(Shape::vector(4).is_trailing_of(&big));
        assert!(Shape::scalar().is_trailing_of(&big));
        assert!(!Shape::new(vec![4, 2]).is_trailing_of(&big));
        assert!(!Shape::new(vec![1, 2, 2, 4]).is_trailing_of(&big));
    }

    #[test]
    fn test_display() {
        let s = Shape::new(vec![2, 3, 4]);
        assert_eq!(format!("{s}"), "[2, 3, 4]");
        assert_eq!(Shape::scalar().to_string(), "[]");
    }

    #[test]
    fn test_from_conversions() {
        let s1: Shape = vec![2, 3].into();
        let s2: Shape = (&[2, 3][..]).into();
        let s3: Shape = [2, 3].into();
        assert_eq!(s1, s2);
        assert_eq!(s2, s3);
    }
}
