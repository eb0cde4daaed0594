//! Image service trait and shared types.
//!
//! The [`ImageService`] trait defines the two operations the pipeline needs
//! from an image toolkit: identify (dimensions + EXIF attributes) and resize
//! (write one thumbnail).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), pure Rust, no external
//! processes. Calls are funneled through the [`TaskQueue`](crate::queue::TaskQueue),
//! which bounds how many run at once.

use super::params::ResizeParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Raw result of an identify operation.
///
/// Values are reported as stored in the file: dimensions are *not* corrected
/// for EXIF orientation and the capture time is the unparsed EXIF string.
/// The image processor applies both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identified {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// EXIF orientation code (1 to 8).
    pub orientation: Option<u32>,
    pub make: Option<String>,
    pub model: Option<String>,
    /// EXIF `DateTimeOriginal`, e.g. `2015:08:27 10:30:05`.
    pub date_time: Option<String>,
}

impl Identified {
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }
}

/// Trait for image services.
///
/// Implementations are shared across worker threads, hence `Send + Sync`.
pub trait ImageService: Send + Sync {
    /// Read intrinsic dimensions and capture attributes.
    fn identify(&self, path: &Path) -> Result<Identified, ServiceError>;

    /// Write a resized copy of `params.source` to `params.output`.
    fn resize(&self, params: &ResizeParams) -> Result<(), ServiceError>;
}
