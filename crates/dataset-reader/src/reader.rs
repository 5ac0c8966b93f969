// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! File access for IDX datasets with memory-mapped I/O.
//!
//! Files are mapped once with `memmap2` and decoded straight from the
//! mapping; the decoded arrays own their buffers, so the mapping can be
//! dropped as soon as decoding returns.

use crate::idx::{parse_images, parse_labels};
use crate::DatasetError;
use array_core::Array;
use std::path::{Path, PathBuf};

/// A memory-mapped IDX file.
pub struct IdxFile {
    path: PathBuf,
    mmap: memmap2::Mmap,
}

impl IdxFile {
    /// Opens and maps `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref().to_path_buf();
        let io_error = |source| DatasetError::Io {
            path: path.clone(),
            source,
        };
        let file = std::fs::File::open(&path).map_err(io_error)?;
        // SAFETY: the mapping is read-only and only borrowed while decoding;
        // callers must not truncate the file concurrently.
        let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(io_error)?;
        tracing::info!(
            "dataset reader: mmap'd {} ({:.2} MB)",
            path.display(),
            mmap.len() as f64 / (1024.0 * 1024.0),
        );
        Ok(Self { path, mmap })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the mapped file in bytes.
    pub fn len_bytes(&self) -> usize {
        self.mmap.len()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.mmap
    }

    /// Decodes the file as an image file. See [`parse_images`].
    pub fn images(&self) -> Result<Array, DatasetError> {
        let images = parse_images(self.bytes())?;
        tracing::info!("loaded images {} from {}", images.shape(), self.path.display());
        Ok(images)
    }

    /// Decodes the file as a label file. See [`parse_labels`].
    pub fn labels(&self) -> Result<Array, DatasetError> {
        let labels = parse_labels(self.bytes())?;
        tracing::info!("loaded labels {} from {}", labels.shape(), self.path.display());
        Ok(labels)
    }
}

/// Reads an image file into a `[count, rows * cols]` `Float32` array.
pub fn read_images(path: impl AsRef<Path>) -> Result<Array, DatasetError> {
    IdxFile::open(path)?.images()
}

/// Reads a label file into a `[count, 10]` one-hot `Float32` array.
pub fn read_labels(path: impl AsRef<Path>) -> Result<Array, DatasetError> {
    IdxFile::open(path)?.labels()
}

/// Matching image and label arrays.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub images: Array,
    pub labels: Array,
}

impl Dataset {
    /// Loads an image file and its label file.
    ///
    /// # Errors
    /// [`DatasetError::CountMismatch`] if the files hold a different number
    /// of items, plus any error of [`read_images`] or [`read_labels`].
    pub fn load(images: impl AsRef<Path>, labels: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let images = read_images(images)?;
        let labels = read_labels(labels)?;
        Self::new(images, labels)
    }

    /// Pairs already decoded arrays, checking that their leading extents
    /// agree.
    pub fn new(images: Array, labels: Array) -> Result<Self, DatasetError> {
        let n_images = images.shape().dim(0).unwrap_or(0);
        let n_labels = labels.shape().dim(0).unwrap_or(0);
        if n_images != n_labels {
            return Err(DatasetError::CountMismatch {
                images: n_images,
                labels: n_labels,
            });
        }
        Ok(Self { images, labels })
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.images.shape().dim(0).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Items `start..end` of both arrays, as views over the loaded buffers.
    pub fn batch(&self, start: usize, end: usize) -> Result<Dataset, DatasetError> {
        Ok(Dataset {
            images: self.images.range(start, end)?,
            labels: self.labels.range(start, end)?,
        })
    }

    /// Consecutive batches of `size` items; the last one may be shorter.
    pub fn batches(&self, size: usize) -> impl Iterator<Item = Result<Dataset, DatasetError>> + '_ {
        let size = size.max(1);
        (0..self.len())
            .step_by(size)
            .map(move |start| self.batch(start, (start + size).min(self.len())))
    }
}
