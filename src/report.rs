//! Run-level accounting: absorbed errors, counters and the final report.
//!
//! Per-image and per-folder problems never stop a run. They are turned into
//! [`Warning`]s, logged through `tracing` when they happen, and collected here
//! so the CLI can print them all at the end. Only a descriptor write failure
//! ends a run early; it is stored in [`RunReport::failure`].

use crate::cache::CacheStats;
use crate::descriptor::WriteError;
use crate::types::FolderDescriptor;
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;

/// A non-fatal problem recorded during a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    #[error("ignoring folder config {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },
    #[error("ignoring previous descriptor {}: {message}", path.display())]
    PreviousDescriptor { path: PathBuf, message: String },
    #[error("could not identify {}: {message}", path.display())]
    ImageMetadata { path: PathBuf, message: String },
    #[error("no dimensions for {}", path.display())]
    MissingDimensions { path: PathBuf },
    #[error("thumbnail {} from {} failed: {message}", path.display(), original.display())]
    Thumbnail {
        path: PathBuf,
        original: PathBuf,
        message: String,
    },
}

/// Thread-safe warning collector shared by the tree builder and the workers.
#[derive(Debug, Default)]
pub struct Warnings {
    items: Mutex<Vec<Warning>>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log and keep a warning.
    pub fn push(&self, warning: Warning) {
        tracing::warn!("{warning}");
        self.items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(warning);
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.items.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

/// Counters updated concurrently while folders are aggregated.
#[derive(Debug, Default)]
pub struct RunCounters {
    pub reused: AtomicU32,
    pub identified: AtomicU32,
    pub identify_failed: AtomicU32,
    pub thumbnails_skipped: AtomicU32,
    pub folders_written: AtomicU32,
}

impl RunCounters {
    pub fn bump(counter: &AtomicU32) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(counter: &AtomicU32, n: u32) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            reused: self.reused.load(Ordering::Relaxed),
            identified: self.identified.load(Ordering::Relaxed),
            failed: self.identify_failed.load(Ordering::Relaxed),
        }
    }
}

/// Summary of thumbnail work for a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailStats {
    pub created: u32,
    pub skipped: u32,
    pub failed: u32,
}

impl fmt::Display for ThumbnailStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} created, {} up to date", self.created, self.skipped)?;
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        Ok(())
    }
}

/// Everything a run produced, good and bad.
#[derive(Debug)]
pub struct RunReport {
    /// Descriptor of the root folder, absent when the run failed.
    pub root: Option<FolderDescriptor>,
    pub folders_written: u32,
    pub cache: CacheStats,
    pub thumbnails: ThumbnailStats,
    pub warnings: Vec<Warning>,
    /// The error that stopped the run, if any.
    pub failure: Option<WriteError>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}
