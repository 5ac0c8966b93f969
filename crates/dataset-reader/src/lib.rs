// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # dataset-reader
//!
//! Reader for the big-endian IDX image/label format (as used by MNIST),
//! producing ordinary [`array_core::Array`]s.
//!
//! - Images decode to a `[count, rows * cols]` `Float32` array with pixels
//!   scaled to `[0, 1]`.
//! - Labels decode to a `[count, 10]` one-hot `Float32` array.
//!
//! # Example
//! ```no_run
//! use dataset_reader::Dataset;
//! let train = Dataset::load("train-images-idx3-ubyte", "train-labels-idx1-ubyte").unwrap();
//! for batch in train.batches(64) {
//!     let batch = batch.unwrap();
//!     assert_eq!(batch.labels.dims()[1], 10);
//! }
//! ```

mod error;
mod idx;
mod reader;

pub use error::DatasetError;
pub use idx::{parse_images, parse_labels, IMAGE_MAGIC, LABEL_MAGIC, NUM_CLASSES};
pub use reader::{read_images, read_labels, Dataset, IdxFile};
