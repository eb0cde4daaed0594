//! Per-folder overrides from `folder.ini`.
//!
//! A folder may carry a small INI-style file that overrides the values
//! otherwise derived from its name and contents:
//!
//! ```text
//! title=Summer at the lake
//! description=Three days of rain,\
//! one day of sun.
//! cover=IMG_0042.jpg
//! ```
//!
//! ## Format
//!
//! - One `key=value` per line, no spaces around `=`.
//! - A trailing `\` continues the value on the next line (joined with a newline).
//! - Blank lines, `#`/`;` comments and `[section]` headers are ignored.
//! - Only `title`, `description` and `cover` are recognized; other keys are skipped.
//!
//! A malformed file is reported as [`ConfigParseError`]. The tree builder treats
//! that as a warning and continues with no overrides for the folder.

use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Name of the override file inside a folder.
pub const FOLDER_CONFIG_FILENAME: &str = "folder.ini";

#[derive(Error, Debug)]
pub enum ConfigParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: expected key=value")]
    MissingSeparator { line: usize },
    #[error("line {line}: empty key")]
    EmptyKey { line: usize },
}

/// Fixed-shape overrides for one folder. Absent fields fall back to derived values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderOverrides {
    pub title: Option<String>,
    pub description: Option<String>,
    pub cover: Option<String>,
}

impl FolderOverrides {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.cover.is_none()
    }
}

/// Source of per-folder overrides.
///
/// The tree builder calls [`read`](FolderConfigProvider::read) only when a
/// [`FOLDER_CONFIG_FILENAME`] file is present in the folder.
pub trait FolderConfigProvider: Sync {
    fn read(&self, path: &Path) -> Result<FolderOverrides, ConfigParseError>;
}

/// Reads overrides from `folder.ini` files on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct IniFolderConfig;

impl FolderConfigProvider for IniFolderConfig {
    fn read(&self, path: &Path) -> Result<FolderOverrides, ConfigParseError> {
        let content = std::fs::read_to_string(path)?;
        parse_overrides(&content)
    }
}

/// Parse the contents of a `folder.ini` file.
pub fn parse_overrides(content: &str) -> Result<FolderOverrides, ConfigParseError> {
    let mut overrides = FolderOverrides::default();

    for (line_no, logical) in logical_lines(content) {
        let trimmed = logical.trim_start();
        if trimmed.is_empty()
            || trimmed.starts_with('#')
            || trimmed.starts_with(';')
            || (trimmed.starts_with('[') && trimmed.trim_end().ends_with(']'))
        {
            continue;
        }

        let (key, value) = logical
            .split_once('=')
            .ok_or(ConfigParseError::MissingSeparator { line: line_no })?;
        if key.is_empty() {
            return Err(ConfigParseError::EmptyKey { line: line_no });
        }

        match key.to_ascii_lowercase().as_str() {
            "title" => overrides.title = Some(value.to_string()),
            "description" => overrides.description = Some(value.to_string()),
            "cover" => overrides.cover = Some(value.to_string()),
            other => debug!(key = other, "ignoring unknown folder config key"),
        }
    }

    Ok(overrides)
}

/// Join backslash-continued physical lines into logical lines.
///
/// Yields `(first_physical_line_number, text)`, 1-based.
fn logical_lines(content: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let (text, continues) = match line.strip_suffix('\\') {
            Some(head) => (head, true),
            None => (line, false),
        };

        let (start, mut buf) = match pending.take() {
            Some((start, mut buf)) => {
                buf.push('\n');
                (start, buf)
            }
            None => (idx + 1, String::new()),
        };
        buf.push_str(text);

        if continues {
            pending = Some((start, buf));
        } else {
            lines.push((start, buf));
        }
    }

    // A continuation on the last line simply ends the value.
    if let Some(last) = pending {
        lines.push(last);
    }
    lines
}
