//! # gallery-meta
//!
//! Turns a directory tree of photos into a tree of metadata descriptors: one
//! `meta.json` per folder, plus resized thumbnails. Your filesystem is the
//! data source: folder names carry dates and titles, a small `folder.ini` can
//! override them, and EXIF supplies dimensions and capture times.
//!
//! # Architecture: Two-Stage Run
//!
//! ```text
//! 1. Scan       photos/  →  FolderNode tree     (directory listing, folder.ini, previous meta.json)
//! 2. Aggregate  tree     →  meta.json per folder (bottom-up, images through the task queue)
//! ```
//!
//! The scan is synchronous and cheap. The aggregation is a post-order walk: a
//! folder's descriptor is written after all of its children's, because a
//! folder's image count, time and sub-folder list are derived from them.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the root into a [`scan::FolderNode`] tree |
//! | [`process`] | Run entry point, per-image processing, image ordering |
//! | [`aggregate`] | Bottom-up merge of children and images into one descriptor per folder |
//! | [`queue`] | Bounded-concurrency task queue for identify/resize calls |
//! | [`descriptor`] | Writes `meta.json` and the optional `images.js` export |
//! | [`cache`] | Reuse of image metadata from the previous run's descriptors |
//! | [`folder_config`] | `folder.ini` overrides (title, description, cover) |
//! | [`naming`] | `YYYY-MM-DD_Title` folder-name parser |
//! | [`metadata`] | Override precedence and EXIF value parsing |
//! | [`imaging`] | Image service trait and the pure-Rust backend |
//! | [`types`] | Serialized descriptor shapes |
//! | [`report`] | Warnings, counters and the run report |
//! | [`config`] | `gallery.toml` + CLI configuration |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## One Global Concurrency Cap
//!
//! Every identify and resize runs on one rayon pool sized to
//! `processing.max_processes`, and the folder walk runs inside that same pool.
//! Many folders submit work at once, yet no more than the cap ever runs.
//!
//! ## Descriptors Before Thumbnails
//!
//! A folder's descriptor needs its images' metadata but not their thumbnails.
//! Resizes are queued and the descriptor is written right away; the run waits
//! for all thumbnails once, at the very end.
//!
//! ## Reuse by File Name
//!
//! The previous `meta.json` of a folder is the metadata cache. A record is
//! reused whenever a file of the same name is still present, without comparing
//! modification times. Use `--force` to re-identify everything.
//!
//! ## Partial Failure
//!
//! Unreadable images, broken `folder.ini` files and failed thumbnails become
//! warnings. Only a descriptor that cannot be written stops the run.

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod descriptor;
pub mod folder_config;
pub mod imaging;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod process;
pub mod queue;
pub mod report;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
