// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Decoding of big-endian IDX image and label payloads.
//!
//! # Layout
//! ```text
//! images: magic=2051 | count | rows | cols | count*rows*cols pixel bytes
//! labels: magic=2049 | count | count label bytes
//! ```
//! Every header field is a 4-byte big-endian integer.

use crate::DatasetError;
use array_core::Array;

/// Magic number of an image file.
pub const IMAGE_MAGIC: u32 = 2051;
/// Magic number of a label file.
pub const LABEL_MAGIC: u32 = 2049;
/// Width of a one-hot label row.
pub const NUM_CLASSES: usize = 10;

/// Sequential big-endian reader over a byte slice.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize, section: &'static str) -> Result<&'a [u8], DatasetError> {
        let available = self.bytes.len() - self.pos;
        if n > available {
            return Err(DatasetError::Truncated {
                section,
                needed: n,
                available,
            });
        }
        let out = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn read_u32(&mut self, section: &'static str) -> Result<u32, DatasetError> {
        let b = self.take(4, section)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn expect_magic(&mut self, expected: u32) -> Result<(), DatasetError> {
        let found = self.read_u32("header")?;
        if found != expected {
            return Err(DatasetError::BadMagic { expected, found });
        }
        Ok(())
    }
}

fn count(value: u32) -> Result<usize, DatasetError> {
    usize::try_from(value)
        .map_err(|_| DatasetError::InvalidHeader(format!("count {value} does not fit in memory")))
}

/// Decodes an image file into a `Float32` array of shape
/// `[count, rows * cols]`, one flattened image per row, with every pixel
/// scaled from `0..=255` to `[0, 1]`.
///
/// # Errors
/// [`DatasetError::BadMagic`] if the file is not an image file and
/// [`DatasetError::Truncated`] if it ends early. Trailing bytes are ignored.
pub fn parse_images(bytes: &[u8]) -> Result<Array, DatasetError> {
    let mut cursor = Cursor::new(bytes);
    cursor.expect_magic(IMAGE_MAGIC)?;
    let items = count(cursor.read_u32("header")?)?;
    let rows = count(cursor.read_u32("header")?)?;
    let cols = count(cursor.read_u32("header")?)?;

    let pixels_per_image = rows
        .checked_mul(cols)
        .ok_or_else(|| DatasetError::InvalidHeader(format!("{rows}x{cols} images are too large")))?;
    let total = items.checked_mul(pixels_per_image).ok_or_else(|| {
        DatasetError::InvalidHeader(format!("{items} images of {pixels_per_image} pixels are too large"))
    })?;

    let data: Vec<f32> = cursor
        .take(total, "pixel data")?
        .iter()
        .map(|&p| f32::from(p) / 255.0)
        .collect();
    tracing::debug!("decoded {} images of {}x{}", items, rows, cols);

    let stride = vec![pixels_per_image as isize, 1];
    Ok(Array::from_raw_parts([items, pixels_per_image], stride, 0, data)?)
}

/// Decodes a label file into a one-hot `Float32` array of shape
/// `[count, 10]`.
///
/// # Errors
/// [`DatasetError::BadMagic`], [`DatasetError::Truncated`], and
/// [`DatasetError::LabelOutOfRange`] for a label byte of 10 or more.
pub fn parse_labels(bytes: &[u8]) -> Result<Array, DatasetError> {
    let mut cursor = Cursor::new(bytes);
    cursor.expect_magic(LABEL_MAGIC)?;
    let items = count(cursor.read_u32("header")?)?;
    let labels = cursor.take(items, "label data")?;

    let mut data = vec![0.0f32; items * NUM_CLASSES];
    for (index, &value) in labels.iter().enumerate() {
        let class = usize::from(value);
        if class >= NUM_CLASSES {
            return Err(DatasetError::LabelOutOfRange {
                index,
                value,
                classes: NUM_CLASSES,
            });
        }
        data[index * NUM_CLASSES + class] = 1.0;
    }
    tracing::debug!("decoded {} labels", items);

    Ok(Array::from_vec([items, NUM_CLASSES], data)?)
}
