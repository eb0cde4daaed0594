//! High-level thumbnail operations.
//!
//! Thumbnail output paths are deterministic: `<folder>/<thumb_dir>/<size>-<filename>`.
//! These functions compute paths and plan resize parameters; execution happens
//! on the [`TaskQueue`](crate::queue::TaskQueue).

use super::params::{Quality, ResizeParams};
use std::path::{Path, PathBuf};

/// Thumbnail file name for one size: `<size>-<filename>`.
pub fn thumbnail_name(size: u32, filename: &str) -> String {
    format!("{}-{}", size, filename)
}

/// Absolute (or root-relative) path of a thumbnail.
pub fn thumbnail_path(folder: &Path, thumb_dir: &str, size: u32, filename: &str) -> PathBuf {
    folder.join(thumb_dir).join(thumbnail_name(size, filename))
}

/// Path of a thumbnail relative to its folder, always `/`-separated.
///
/// Used in the alternate export, which is consumed by web pages.
pub fn thumbnail_href(thumb_dir: &str, size: u32, filename: &str) -> String {
    format!("{}/{}", thumb_dir, thumbnail_name(size, filename))
}

/// Plan the resizes still needed for one image.
///
/// Sizes whose thumbnail already exists on disk are skipped; everything else
/// gets one [`ResizeParams`].
pub fn plan_thumbnails(
    folder: &Path,
    filename: &str,
    thumb_dir: &str,
    sizes: &[u32],
    quality: Quality,
) -> Vec<ResizeParams> {
    let source = folder.join(filename);
    sizes
        .iter()
        .map(|&size| (size, thumbnail_path(folder, thumb_dir, size, filename)))
        .filter(|(_, output)| !output.exists())
        .map(|(size, output)| ResizeParams {
            source: source.clone(),
            output,
            size,
            quality,
        })
        .collect()
}
