//! Descriptor output.
//!
//! Each folder gets a `meta.json` holding its [`FolderDescriptor`]. When an
//! export size is configured, a second file, `images.js`, wraps the same image
//! list for direct inclusion in a web page:
//!
//! ```text
//! var images = [{"filename":"thumbs/300-a.jpg","width":4000,...}];
//! ```
//!
//! The export is a pure rewrite of already computed records: each `filename`
//! becomes the path of its thumbnail at the export size.

use crate::imaging::thumbnail_href;
use crate::types::{FolderDescriptor, ImageRecord};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-folder descriptor file.
pub const DESCRIPTOR_FILENAME: &str = "meta.json";
/// Name of the alternate export file.
pub const EXPORT_FILENAME: &str = "images.js";

const EXPORT_PREFIX: &str = "var images = ";
const EXPORT_SUFFIX: &str = ";\n";

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Failed to encode descriptor for {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to create thumbnail directory {}: {source}", path.display())]
    ThumbnailDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Alternate export settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Thumbnail size the exported file names point at.
    pub size: u32,
    pub thumb_dir: String,
}

/// Write `meta.json` (and `images.js` when exporting) into `folder`.
///
/// Returns the path of the descriptor file.
pub fn write(
    folder: &Path,
    descriptor: &FolderDescriptor,
    export: Option<&ExportOptions>,
) -> Result<PathBuf, WriteError> {
    let path = folder.join(DESCRIPTOR_FILENAME);
    let json = serde_json::to_string_pretty(descriptor).map_err(|source| WriteError::Encode {
        path: path.clone(),
        source,
    })?;
    write_file(&path, json + "\n")?;

    if let Some(export) = export {
        let export_path = folder.join(EXPORT_FILENAME);
        let images = export_images(&descriptor.images, export);
        let body = encode_export(&images).map_err(|source| WriteError::Encode {
            path: export_path.clone(),
            source,
        })?;
        write_file(&export_path, body)?;
    }

    Ok(path)
}

/// Rewrite each record's file name to its thumbnail at the export size.
pub fn export_images(images: &[ImageRecord], export: &ExportOptions) -> Vec<ImageRecord> {
    images
        .iter()
        .map(|record| ImageRecord {
            filename: thumbnail_href(&export.thumb_dir, export.size, &record.filename),
            ..record.clone()
        })
        .collect()
}

/// Wrap a serialized image array in the export envelope.
pub fn encode_export(images: &[ImageRecord]) -> Result<String, serde_json::Error> {
    let array = serde_json::to_string(images)?;
    Ok(format!("{EXPORT_PREFIX}{array}{EXPORT_SUFFIX}"))
}

fn write_file(path: &Path, contents: String) -> Result<(), WriteError> {
    std::fs::write(path, contents).map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn descriptor() -> FolderDescriptor {
        FolderDescriptor {
            title: "Lake".into(),
            image_count: 2,
            cover: Some("b.jpg".into()),
            images: vec![
                ImageRecord {
                    filename: "a.jpg".into(),
                    width: Some(40),
                    height: Some(30),
                    ..ImageRecord::default()
                },
                ImageRecord::unknown("b.jpg"),
            ],
            ..FolderDescriptor::default()
        }
    }

    fn export() -> ExportOptions {
        ExportOptions {
            size: 300,
            thumb_dir: "thumbs".into(),
        }
    }

    #[test]
    fn write_creates_descriptor() {
        let tmp = TempDir::new().unwrap();
        let path = write(tmp.path(), &descriptor(), None).unwrap();

        assert_eq!(path, tmp.path().join(DESCRIPTOR_FILENAME));
        let written: FolderDescriptor =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, descriptor());
        assert!(!tmp.path().join(EXPORT_FILENAME).exists());
    }

    #[test]
    fn write_with_export_creates_wrapped_array() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), &descriptor(), Some(&export())).unwrap();

        let body = fs::read_to_string(tmp.path().join(EXPORT_FILENAME)).unwrap();
        assert!(body.starts_with("var images = ["));
        assert!(body.ends_with("];\n"));

        let array = &body[EXPORT_PREFIX.len()..body.len() - EXPORT_SUFFIX.len()];
        let images: Vec<ImageRecord> = serde_json::from_str(array).unwrap();
        assert_eq!(images[0].filename, "thumbs/300-a.jpg");
        assert_eq!(images[0].width, Some(40));
        assert_eq!(images[1].filename, "thumbs/300-b.jpg");
    }

    #[test]
    fn export_keeps_order_and_attributes() {
        let images = export_images(&descriptor().images, &export());
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].height, Some(30));
        assert_eq!(images[1].width, None);
    }

    #[test]
    fn write_into_missing_folder_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = write(&tmp.path().join("gone"), &descriptor(), None);
        assert!(matches!(result, Err(WriteError::Io { .. })));
    }

    #[test]
    fn write_overwrites_previous_descriptor() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(DESCRIPTOR_FILENAME), "old").unwrap();
        write(tmp.path(), &descriptor(), None).unwrap();
        let content = fs::read_to_string(tmp.path().join(DESCRIPTOR_FILENAME)).unwrap();
        assert!(content.contains("\"title\": \"Lake\""));
    }
}
