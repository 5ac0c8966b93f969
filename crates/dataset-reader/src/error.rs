// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for IDX dataset decoding.

use std::path::PathBuf;

/// Errors that can occur while reading an image or label file.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// The file could not be opened or mapped.
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The leading magic number does not identify the expected file kind.
    #[error("unrecognised magic number {found} (expected {expected})")]
    BadMagic { expected: u32, found: u32 },

    /// The file ends before its header or payload is complete.
    #[error("truncated {section}: need {needed} bytes, found {available}")]
    Truncated {
        section: &'static str,
        needed: usize,
        available: usize,
    },

    /// The header describes a payload too large to address.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// A label byte is not a valid class index.
    #[error("label {value} of item {index} is outside 0..{classes}")]
    LabelOutOfRange {
        index: usize,
        value: u8,
        classes: usize,
    },

    /// Image and label files describe a different number of items.
    #[error("{images} images but {labels} labels")]
    CountMismatch { images: usize, labels: usize },

    /// The decoded payload could not be turned into an array.
    #[error("array error: {0}")]
    Array(#[from] array_core::ArrayError),
}
