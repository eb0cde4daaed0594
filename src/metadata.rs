//! Folder metadata resolution and EXIF value parsing.
//!
//! Each folder's title, description and cover can come from two places:
//!
//! - **Overrides**: `folder.ini` next to the images (see [`crate::folder_config`]).
//!   The user wrote these on purpose, so they always win.
//! - **Derived values**: the title from the folder name
//!   ([`crate::naming::parse_folder_name`]), the cover from the first image in
//!   directory-listing order, an empty description.
//!
//! ## Resolution priority
//!
//! Each field is resolved independently. The first non-empty value wins:
//!
//! - **Title**: override → folder-name title → ""
//! - **Description**: override → ""
//! - **Cover**: override → first listed image → none
//!
//! Capture times arrive from the image service as raw EXIF strings
//! (`2015:08:27 10:30:00`) and are parsed here.

use chrono::NaiveDateTime;

/// Resolve a metadata field from multiple sources.
///
/// Takes a list of optional values in priority order and returns the first
/// non-None, non-empty value.
///
/// ```text
/// title:       resolve(&[override_title, derived_title])
/// cover:       resolve(&[override_cover, first_listed_image])
/// ```
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// EXIF stores timestamps as `YYYY:MM:DD HH:MM:SS`.
const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Parse an EXIF timestamp string.
///
/// Some writers use dashes in the date part or a `T` separator, both are
/// accepted. Anything else (including the all-zero placeholder some cameras
/// write when the clock was never set) yields `None`.
pub fn parse_capture_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim().trim_end_matches('\0');
    [EXIF_DATETIME_FORMAT, "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Normalize a free-text EXIF attribute (make, model): trims padding and drops empties.
pub fn clean_attribute(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim_matches(|c: char| c == '\0' || c.is_whitespace()).to_string())
        .filter(|s| !s.is_empty())
}
