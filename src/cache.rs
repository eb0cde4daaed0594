//! Incremental reuse of image metadata across runs.
//!
//! Identifying an image means opening it and parsing its EXIF block. For
//! large trees that dominates the run time, yet between two runs almost
//! nothing changes. The descriptor written by the previous run already holds
//! every image's dimensions and capture attributes, so it doubles as a cache.
//!
//! # Design
//!
//! The cache is the folder's own `meta.json`; there is no separate cache file.
//! Lookups are by **file name only**: an entry for `IMG_0042.jpg` is reused
//! verbatim whenever a file of that name is still in the folder. Modification
//! times and sizes are not compared, so an image edited in place keeps its old
//! metadata until the run is forced.
//!
//! Thumbnails are not tracked here at all: a thumbnail is up to date when its
//! file exists (see [`plan_thumbnails`](crate::imaging::plan_thumbnails)).
//!
//! ## Bypassing the cache
//!
//! Pass `--force` to the `build` command. The previous descriptors are then
//! not read and every image is identified again.

use crate::descriptor::DESCRIPTOR_FILENAME;
use crate::types::{FolderDescriptor, ImageRecord};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreviousDescriptorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// What the previous run recorded for one folder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviousRun {
    /// Image records by file name.
    pub images: HashMap<String, ImageRecord>,
    /// The folder's representative time from the previous run.
    pub time: Option<NaiveDateTime>,
}

impl PreviousRun {
    /// Load the previous descriptor from a folder.
    ///
    /// Returns `Ok(None)` when the folder has no descriptor yet and `Err` when
    /// one exists but cannot be read or parsed.
    pub fn load(folder: &Path) -> Result<Option<Self>, PreviousDescriptorError> {
        let path = folder.join(DESCRIPTOR_FILENAME);
        if !path.is_file() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        let descriptor: FolderDescriptor = serde_json::from_str(&content)?;
        Ok(Some(Self::from_descriptor(descriptor)))
    }

    pub fn from_descriptor(descriptor: FolderDescriptor) -> Self {
        Self {
            images: descriptor
                .images
                .into_iter()
                .map(|record| (record.filename.clone(), record))
                .collect(),
            time: descriptor.time,
        }
    }

    pub fn get(&self, filename: &str) -> Option<&ImageRecord> {
        self.images.get(filename)
    }
}

/// Summary of metadata reuse for a build run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub reused: u32,
    pub identified: u32,
    pub failed: u32,
}

impl CacheStats {
    pub fn total(&self) -> u32 {
        self.reused + self.identified + self.failed
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reused > 0 {
            write!(
                f,
                "{} reused, {} identified ({} total)",
                self.reused,
                self.identified,
                self.total()
            )?;
        } else {
            write!(f, "{} identified", self.identified)?;
        }
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        Ok(())
    }
}
