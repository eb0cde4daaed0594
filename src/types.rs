//! Shared types serialized into the per-folder descriptor.
//!
//! The same types are read back on the next run to seed incremental reuse,
//! so every field tolerates being absent when deserializing.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Camera attributes extracted from an image's EXIF block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CaptureAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Capture timestamp (EXIF `DateTimeOriginal`), local time without zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<NaiveDateTime>,
}

/// One processed image.
///
/// `width`/`height` are post-orientation: a 90°/270° EXIF rotation swaps them.
/// `None` means the dimensions could not be determined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageRecord {
    pub filename: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub exif: CaptureAttributes,
}

impl ImageRecord {
    /// Record for an image whose metadata could not be read.
    pub fn unknown(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            ..Self::default()
        }
    }

    pub fn capture_time(&self) -> Option<NaiveDateTime> {
        self.exif.date_time
    }
}

/// Lightweight summary of a child folder, listed in the parent's descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubDirSummary {
    pub folder_name: String,
    pub title: String,
    pub time: Option<NaiveDateTime>,
    pub cover: Option<String>,
    pub image_count: usize,
}

/// The persisted summary of one folder (`meta.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FolderDescriptor {
    pub title: String,
    /// Representative timestamp used to order this folder among its siblings.
    pub time: Option<NaiveDateTime>,
    pub description: String,
    /// Direct images plus every descendant folder's images.
    pub image_count: usize,
    /// Filename of the cover image, relative to the folder.
    pub cover: Option<String>,
    /// Child folders, newest first.
    pub sub_dirs: Vec<SubDirSummary>,
    pub images: Vec<ImageRecord>,
}
