// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Row-major enumeration of every multi-index of a shape.

use std::iter::FusedIterator;

/// Yields every multi-index of a shape in row-major order, last axis fastest,
/// starting from the all-zero index.
///
/// The sequence is finite and single-pass. A shape with a zero extent yields
/// nothing; the rank-0 shape yields exactly one empty index.
///
/// # Examples
/// ```
/// use array_core::IndexIterator;
/// let all: Vec<Vec<usize>> = IndexIterator::new(&[2, 2]).collect();
/// assert_eq!(all, vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]]);
/// ```
#[derive(Debug, Clone)]
pub struct IndexIterator {
    shape: Vec<usize>,
    current: Vec<usize>,
    remaining: usize,
}

impl IndexIterator {
    pub fn new(shape: &[usize]) -> Self {
        Self {
            shape: shape.to_vec(),
            current: vec![0; shape.len()],
            remaining: shape.iter().product(),
        }
    }

    /// Advances `current` by one step; returns `false` once every axis has
    /// wrapped back to zero.
    fn increment(&mut self) -> bool {
        for axis in (0..self.shape.len()).rev() {
            self.current[axis] += 1;
            if self.current[axis] < self.shape[axis] {
                return true;
            }
            self.current[axis] = 0;
        }
        false
    }
}

impl Iterator for IndexIterator {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let result = self.current.clone();
        self.remaining -= 1;
        if !self.increment() {
            self.remaining = 0;
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for IndexIterator {}

impl FusedIterator for IndexIterator {}
