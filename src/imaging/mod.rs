//! Image service: pure Rust, no external processes.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` + `kamadak-exif` |
//! | **Resize → JPEG** | Lanczos3 + `JpegEncoder` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageService`] trait + [`RustBackend`]
//! - **Operations**: Thumbnail path layout and resize planning

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{Identified, ImageService, ServiceError};
pub use calculations::{calculate_fit_dimensions, is_quarter_turn, oriented_dimensions};
pub use operations::{plan_thumbnails, thumbnail_href, thumbnail_name, thumbnail_path};
pub use params::{Quality, ResizeParams};
pub use rust_backend::RustBackend;
