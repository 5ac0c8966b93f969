// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Reference-counted element buffers shared between views.
//!
//! Every view derived from an array (sub-array, transpose, reshape, range)
//! holds a clone of the same [`Buffer`] handle. The buffer lives as long as
//! the longest-lived view, and a write through any handle is visible to
//! every other handle over the same memory.

use crate::{DType, Element};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A shared, interior-mutable flat buffer of `T`.
#[derive(Debug)]
pub struct Buffer<T> {
    inner: Arc<RwLock<Vec<T>>>,
}

impl<T> Clone for Buffer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Buffer<T> {
    pub(crate) fn new(data: Vec<T>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(data)),
        }
    }

    /// Shared access to the whole buffer.
    ///
    /// A panic while a write guard was held leaves plain numbers behind, so
    /// a poisoned lock is still readable.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn len(&self) -> usize {
        self.read().len()
    }

    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// A buffer tagged with its element kind.
#[derive(Debug, Clone)]
pub enum Storage {
    Int(Buffer<i32>),
    Float(Buffer<f32>),
}

impl Storage {
    pub(crate) fn from_vec<T: Element>(data: Vec<T>) -> Self {
        T::wrap_buffer(data)
    }

    pub(crate) fn dtype(&self) -> DType {
        match self {
            Storage::Int(_) => DType::Int32,
            Storage::Float(_) => DType::Float32,
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Storage::Int(b) => b.len(),
            Storage::Float(b) => b.len(),
        }
    }

    /// Returns `true` if both handles point at the same allocation.
    pub(crate) fn ptr_eq(&self, other: &Storage) -> bool {
        match (self, other) {
            (Storage::Int(a), Storage::Int(b)) => a.ptr_eq(b),
            (Storage::Float(a), Storage::Float(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}
