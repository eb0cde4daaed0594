//! Filesystem walk into an in-memory folder model.
//!
//! Stage 1 of a run. Walks the root depth-first and produces a [`FolderNode`]
//! tree that the aggregator consumes. The walk only lists directories and reads
//! two small per-folder files; no image is opened here.
//!
//! ## Directory Structure
//!
//! ```text
//! photos/                          # Root
//! ├── gallery.toml                 # Run configuration (optional, root only)
//! ├── 2015-08-27_Trip_to_lake/     # Folder: date 2015-08-27, title "Trip to lake"
//! │   ├── folder.ini               # Overrides (optional)
//! │   ├── meta.json                # Previous run's descriptor (reused)
//! │   ├── IMG_0001.JPG             # Images: .jpg / .jpeg, any case
//! │   ├── IMG_0002.jpeg
//! │   └── thumbs/                  # Generated thumbnails, never walked
//! ├── Family/
//! │   └── 2016_Christmas/          # Nesting is unlimited
//! └── .drafts/                     # Hidden: skipped with its contents
//! ```
//!
//! ## Classification
//!
//! Each directory entry is exactly one of:
//! - **hidden**: name starts with [`HIDDEN_MARKER`]; skipped
//! - **thumbnail directory**: the configured `thumb_dir`; skipped
//! - **symlinked directory**: skipped, so a link back to an ancestor cannot loop
//! - **subfolder**: any other directory; walked
//! - **image**: a file with a `.jpg`/`.jpeg` extension (case-insensitive)
//! - **config file**: [`FOLDER_CONFIG_FILENAME`]; handed to the provider
//! - anything else is ignored
//!
//! The previous descriptor is not classified from the listing; it is looked up
//! directly when incremental reuse is enabled.
//!
//! ## Ordering
//!
//! `image_filenames` keeps directory-listing order, which the cover fallback
//! relies on. `children` are sorted by name so the walk, the progress output
//! and the written descriptors do not depend on listing order.

use crate::cache::PreviousRun;
use crate::folder_config::{FOLDER_CONFIG_FILENAME, FolderConfigProvider, FolderOverrides};
use crate::report::{Warning, Warnings};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Entries whose name starts with this character are skipped.
pub const HIDDEN_MARKER: char = '.';

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Path not found or not a directory: {}", .0.display())]
    PathNotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Options that change what the walk collects.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Load previous descriptors for metadata reuse.
    pub incremental: bool,
    /// Name of the per-folder thumbnail directory.
    pub thumb_dir: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            incremental: true,
            thumb_dir: "thumbs".to_string(),
        }
    }
}

/// One directory of the walked tree.
#[derive(Debug, Clone, Default)]
pub struct FolderNode {
    pub path: PathBuf,
    /// Base name of the directory.
    pub name: String,
    /// Overrides from `folder.ini`, when the file exists and parses.
    pub overrides: Option<FolderOverrides>,
    /// Image file names in directory-listing order.
    pub image_filenames: Vec<String>,
    /// Subfolders, sorted by name.
    pub children: Vec<FolderNode>,
    /// What the previous run recorded, when reuse is enabled and a descriptor exists.
    pub previous: Option<PreviousRun>,
}

impl FolderNode {
    /// Images in this folder and every descendant.
    pub fn total_images(&self) -> usize {
        self.image_filenames.len()
            + self
                .children
                .iter()
                .map(FolderNode::total_images)
                .sum::<usize>()
    }

    /// Number of folders in this subtree, including this one.
    pub fn folder_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(FolderNode::folder_count)
            .sum::<usize>()
    }
}

/// Walk `root` and build the folder tree.
///
/// Fails only when the root is missing or a directory cannot be listed.
/// Unreadable `folder.ini` or `meta.json` files become warnings.
pub fn build_tree(
    root: &Path,
    options: &ScanOptions,
    provider: &impl FolderConfigProvider,
    warnings: &Warnings,
) -> Result<FolderNode, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::PathNotFound(root.to_path_buf()));
    }
    let name = root
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| root.display().to_string());
    walk(root, name, options, provider, warnings)
}

fn walk(
    path: &Path,
    name: String,
    options: &ScanOptions,
    provider: &impl FolderConfigProvider,
    warnings: &Warnings,
) -> Result<FolderNode, ScanError> {
    let mut image_filenames = Vec::new();
    let mut subdirs = Vec::new();
    let mut has_config = false;

    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let entry_path = entry.path();
        let entry_name = entry.file_name().to_string_lossy().into_owned();

        if entry_name.starts_with(HIDDEN_MARKER) {
            debug!(path = %entry_path.display(), "skipping hidden entry");
            continue;
        }
        let file_type = entry.file_type()?;
        if file_type.is_symlink() && entry_path.is_dir() {
            debug!(path = %entry_path.display(), "skipping symlinked directory");
            continue;
        }
        if file_type.is_dir() {
            if entry_name == options.thumb_dir {
                continue;
            }
            subdirs.push((entry_name, entry_path));
        } else if is_image(&entry_path) {
            image_filenames.push(entry_name);
        } else if entry_name == FOLDER_CONFIG_FILENAME {
            has_config = true;
        }
    }

    let overrides = if has_config {
        read_overrides(&path.join(FOLDER_CONFIG_FILENAME), provider, warnings)
    } else {
        None
    };
    let previous = if options.incremental {
        load_previous(path, warnings)
    } else {
        None
    };

    subdirs.sort_by(|a, b| a.0.cmp(&b.0));
    let children = subdirs
        .into_iter()
        .map(|(child_name, child_path)| walk(&child_path, child_name, options, provider, warnings))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        path = %path.display(),
        images = image_filenames.len(),
        children = children.len(),
        "scanned folder"
    );

    Ok(FolderNode {
        path: path.to_path_buf(),
        name,
        overrides,
        image_filenames,
        children,
        previous,
    })
}

fn read_overrides(
    path: &Path,
    provider: &impl FolderConfigProvider,
    warnings: &Warnings,
) -> Option<FolderOverrides> {
    match provider.read(path) {
        Ok(overrides) => Some(overrides),
        Err(e) => {
            warnings.push(Warning::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            });
            None
        }
    }
}

fn load_previous(folder: &Path, warnings: &Warnings) -> Option<PreviousRun> {
    match PreviousRun::load(folder) {
        Ok(previous) => previous,
        Err(e) => {
            warnings.push(Warning::PreviousDescriptor {
                path: folder.join(crate::descriptor::DESCRIPTOR_FILENAME),
                message: e.to_string(),
            });
            None
        }
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}
