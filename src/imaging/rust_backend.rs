//! Pure Rust image service, no external processes.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Dimensions | `image::image_dimensions` (header only, no full decode) |
//! | EXIF attributes | `kamadak-exif` (Orientation, Make, Model, DateTimeOriginal) |
//! | Decode + orient | `image::ImageReader` + `DynamicImage::apply_orientation` |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |

use super::backend::{Identified, ImageService, ServiceError};
use super::calculations::calculate_fit_dimensions;
use super::params::ResizeParams;
use crate::metadata::clean_attribute;
use exif::{In, Tag};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Pure Rust service using the `image` and `kamadak-exif` crates.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// EXIF attributes we care about. Every field is optional.
#[derive(Debug, Default)]
struct ExifAttributes {
    orientation: Option<u32>,
    make: Option<String>,
    model: Option<String>,
    date_time: Option<String>,
}

/// Read EXIF attributes. Files without an EXIF block yield all-`None`.
fn read_exif(path: &Path) -> Result<ExifAttributes, ServiceError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let exif = match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(exif::Error::Io(e)) => return Err(ServiceError::Io(e)),
        Err(_) => return Ok(ExifAttributes::default()),
    };

    let ascii = |tag: Tag| -> Option<String> {
        match &exif.get_field(tag, In::PRIMARY)?.value {
            exif::Value::Ascii(values) => values
                .first()
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    };

    Ok(ExifAttributes {
        orientation: exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|f| f.value.get_uint(0))
            .filter(|v| (1..=8).contains(v)),
        make: clean_attribute(ascii(Tag::Make)),
        model: clean_attribute(ascii(Tag::Model)),
        date_time: ascii(Tag::DateTimeOriginal).or_else(|| ascii(Tag::DateTime)),
    })
}

/// Decode an image and rotate it upright according to its EXIF orientation.
fn load_oriented(path: &Path) -> Result<DynamicImage, ServiceError> {
    let decode_err =
        |e: image::ImageError| ServiceError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e));

    let mut decoder = ImageReader::open(path)?
        .with_guessed_format()?
        .into_decoder()
        .map_err(decode_err)?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut img = DynamicImage::from_decoder(decoder).map_err(decode_err)?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// Encode and save as JPEG.
fn save_jpeg(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), ServiceError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(writer, quality.clamp(1, 100) as u8);
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| ServiceError::ProcessingFailed(format!("JPEG encode failed: {}", e)))
}

impl ImageService for RustBackend {
    fn identify(&self, path: &Path) -> Result<Identified, ServiceError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            ServiceError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        let exif = read_exif(path)?;
        Ok(Identified {
            width: Some(width),
            height: Some(height),
            orientation: exif.orientation,
            make: exif.make,
            model: exif.model,
            date_time: exif.date_time,
        })
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), ServiceError> {
        let img = load_oriented(&params.source)?;
        let (w, h) = calculate_fit_dimensions((img.width(), img.height()), params.size);
        let resized = if (w, h) == (img.width(), img.height()) {
            img
        } else {
            img.resize_exact(w, h, FilterType::Lanczos3)
        };
        save_jpeg(&resized, &params.output, params.quality.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::Quality;
    use image::{ImageEncoder, RgbImage};

    /// Create a small valid JPEG file with the given dimensions.
    fn create_test_jpeg(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let file = std::fs::File::create(path).unwrap();
        let writer = std::io::BufWriter::new(file);
        image::codecs::jpeg::JpegEncoder::new(writer)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
    }

    #[test]
    fn identify_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        create_test_jpeg(&path, 200, 150);

        let backend = RustBackend::new();
        let identified = backend.identify(&path).unwrap();
        assert_eq!(identified.width, Some(200));
        assert_eq!(identified.height, Some(150));
    }

    #[test]
    fn identify_without_exif_has_no_attributes() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        create_test_jpeg(&path, 64, 64);

        let identified = RustBackend::new().identify(&path).unwrap();
        assert_eq!(identified.orientation, None);
        assert_eq!(identified.make, None);
        assert_eq!(identified.date_time, None);
    }

    #[test]
    fn identify_nonexistent_file_errors() {
        let backend = RustBackend::new();
        let result = backend.identify(Path::new("/nonexistent/image.jpg"));
        assert!(result.is_err());
    }

    #[test]
    fn identify_garbage_file_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("fake.jpg");
        std::fs::write(&path, "not an image").unwrap();

        assert!(RustBackend::new().identify(&path).is_err());
    }

    #[test]
    fn resize_fits_longer_edge() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        let output = tmp.path().join("100-source.jpg");
        create_test_jpeg(&source, 400, 200);

        RustBackend::new()
            .resize(&ResizeParams {
                source,
                output: output.clone(),
                size: 100,
                quality: Quality::new(85),
            })
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (100, 50));
    }

    #[test]
    fn resize_does_not_upscale() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("small.jpg");
        let output = tmp.path().join("300-small.jpg");
        create_test_jpeg(&source, 120, 90);

        RustBackend::new()
            .resize(&ResizeParams {
                source,
                output: output.clone(),
                size: 300,
                quality: Quality::default(),
            })
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (120, 90));
    }

    #[test]
    fn resize_missing_source_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let result = RustBackend::new().resize(&ResizeParams {
            source: tmp.path().join("missing.jpg"),
            output: tmp.path().join("out.jpg"),
            size: 100,
            quality: Quality::default(),
        });
        assert!(result.is_err());
        assert!(!tmp.path().join("out.jpg").exists());
    }
}
