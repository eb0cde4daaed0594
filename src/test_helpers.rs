//! Shared test utilities for the gallery-meta test suite.
//!
//! Fixture builders for folder trees on disk, plus lookup helpers that work
//! with written descriptors.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! make_folder(tmp.path(), "2015_Lake", &["a.jpg", "b.jpg"]);
//! write_previous(&tmp.path().join("2015_Lake"), &[("a.jpg", 40, 30)]);
//!
//! // ... run the pipeline ...
//!
//! let descriptor = read_descriptor(&tmp.path().join("2015_Lake"));
//! assert_eq!(image_names(&descriptor), vec!["a.jpg", "b.jpg"]);
//! ```

use crate::descriptor::DESCRIPTOR_FILENAME;
use crate::types::{FolderDescriptor, ImageRecord};
use std::fs;
use std::path::{Path, PathBuf};

// =========================================================================
// Fixture setup
// =========================================================================

/// Create `base/rel` (and parents) holding empty files named `files`.
///
/// The pipeline never decodes images when a mock service is used, so empty
/// files are enough.
pub fn make_folder(base: &Path, rel: &str, files: &[&str]) -> PathBuf {
    let dir = base.join(rel);
    fs::create_dir_all(&dir).unwrap();
    for name in files {
        fs::write(dir.join(name), b"").unwrap();
    }
    dir
}

/// Image file names of `dir` in the order `read_dir` lists them.
pub fn listed_images(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| {
            let lower = name.to_lowercase();
            !name.starts_with('.') && (lower.ends_with(".jpg") || lower.ends_with(".jpeg"))
        })
        .collect()
}

/// Write a previous-run descriptor with the given `(filename, width, height)` images.
pub fn write_previous(dir: &Path, images: &[(&str, u32, u32)]) {
    let descriptor = FolderDescriptor {
        image_count: images.len(),
        images: images
            .iter()
            .map(|&(name, w, h)| ImageRecord {
                filename: name.to_string(),
                width: Some(w),
                height: Some(h),
                ..ImageRecord::default()
            })
            .collect(),
        ..FolderDescriptor::default()
    };
    fs::write(
        dir.join(DESCRIPTOR_FILENAME),
        serde_json::to_string_pretty(&descriptor).unwrap(),
    )
    .unwrap();
}

// =========================================================================
// Descriptor lookups
// =========================================================================

/// Read and parse the descriptor written into `dir`.
pub fn read_descriptor(dir: &Path) -> FolderDescriptor {
    let content = fs::read_to_string(dir.join(DESCRIPTOR_FILENAME))
        .unwrap_or_else(|e| panic!("no descriptor in {}: {e}", dir.display()));
    serde_json::from_str(&content).unwrap()
}

/// Image file names of a descriptor, in descriptor order.
pub fn image_names(descriptor: &FolderDescriptor) -> Vec<&str> {
    descriptor
        .images
        .iter()
        .map(|i| i.filename.as_str())
        .collect()
}

/// Sub-folder names of a descriptor, in descriptor order.
pub fn sub_dir_names(descriptor: &FolderDescriptor) -> Vec<&str> {
    descriptor
        .sub_dirs
        .iter()
        .map(|s| s.folder_name.as_str())
        .collect()
}

/// Find an image record by file name, panicking with the available names.
pub fn find_image<'a>(descriptor: &'a FolderDescriptor, filename: &str) -> &'a ImageRecord {
    descriptor
        .images
        .iter()
        .find(|i| i.filename == filename)
        .unwrap_or_else(|| {
            panic!(
                "image '{}' not found, available: {:?}",
                filename,
                image_names(descriptor)
            )
        })
}
