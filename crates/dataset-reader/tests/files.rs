// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: fixture files on disk → mapped → decoded → batched.

use array_core::Array;
use dataset_reader::{read_images, read_labels, Dataset, DatasetError, IdxFile, IMAGE_MAGIC, LABEL_MAGIC};
use std::path::PathBuf;

// ── Helpers ────────────────────────────────────────────────────

/// Writes `bytes` to a uniquely named file under the temp directory.
fn fixture(name: &str, bytes: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("dataset-reader-{}-{name}", std::process::id()));
    std::fs::write(&path, bytes).unwrap();
    path
}

fn idx(header: &[u32], payload: &[u8]) -> Vec<u8> {
    let mut bytes: Vec<u8> = header.iter().flat_map(|f| f.to_be_bytes()).collect();
    bytes.extend_from_slice(payload);
    bytes
}

/// Five 3x3 images whose pixels count up from `10 * item`.
fn image_fixture(name: &str) -> PathBuf {
    let payload: Vec<u8> = (0..5u8).flat_map(|i| (0..9u8).map(move |p| i * 10 + p)).collect();
    fixture(name, &idx(&[IMAGE_MAGIC, 5, 3, 3], &payload))
}

fn label_fixture(name: &str) -> PathBuf {
    fixture(name, &idx(&[LABEL_MAGIC, 5], &[5, 0, 4, 1, 9]))
}

// ── Tests ──────────────────────────────────────────────────────

#[test]
fn test_read_images_from_file() {
    let path = image_fixture("images");
    let images = read_images(&path).unwrap();
    assert_eq!(images.dims(), &[5, 9]);

    let picture = images.sub_array(&[1]).unwrap().reshape([3, 3]).unwrap();
    let middle = picture.sub_array(&[1]).unwrap();
    let expected = Array::new([13.0f32 / 255.0, 14.0 / 255.0, 15.0 / 255.0]).unwrap();
    assert_eq!(middle, expected);
    let _ = std::fs::remove_file(path);
}

#[test]
fn test_read_labels_range() {
    let path = label_fixture("labels");
    let labels = read_labels(&path).unwrap();
    let first = labels.range(0, 5).unwrap();
    let expected = Array::new([
        [0, 0, 0, 0, 0, 1, 0, 0, 0, 0],
        [1, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 1, 0, 0, 0, 0, 0],
        [0, 1, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    ])
    .unwrap();
    assert!(first.same_values(&expected));
    let _ = std::fs::remove_file(path);
}

#[test]
fn test_idx_file_metadata() {
    let path = label_fixture("metadata");
    let file = IdxFile::open(&path).unwrap();
    assert_eq!(file.path(), path.as_path());
    assert_eq!(file.len_bytes(), 8 + 5);
    assert!(matches!(file.images(), Err(DatasetError::BadMagic { .. })));
    let _ = std::fs::remove_file(path);
}

#[test]
fn test_missing_file() {
    let path = std::env::temp_dir().join("dataset-reader-does-not-exist");
    assert!(matches!(read_images(&path), Err(DatasetError::Io { .. })));
}

#[test]
fn test_dataset_batches() {
    let images = image_fixture("batch-images");
    let labels = label_fixture("batch-labels");
    let data = Dataset::load(&images, &labels).unwrap();
    assert_eq!(data.len(), 5);

    let batches: Vec<Dataset> = data.batches(2).collect::<Result<_, _>>().unwrap();
    assert_eq!(batches.len(), 3);
    assert_eq!(batches[0].images.dims(), &[2, 9]);
    assert_eq!(batches[2].images.dims(), &[1, 9]);
    assert_eq!(batches[2].labels.get_float(&[0, 9]).unwrap(), 1.0);
    assert!(batches[1].images.shares_buffer(&data.images));

    let _ = std::fs::remove_file(images);
    let _ = std::fs::remove_file(labels);
}

#[test]
fn test_dataset_count_mismatch() {
    let images = image_fixture("mismatch-images");
    let labels = fixture("mismatch-labels", &idx(&[LABEL_MAGIC, 2], &[1, 2]));
    assert!(matches!(
        Dataset::load(&images, &labels),
        Err(DatasetError::CountMismatch { images: 5, labels: 2 })
    ));
    let _ = std::fs::remove_file(images);
    let _ = std::fs::remove_file(labels);
}
