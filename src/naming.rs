//! Folder-name parsing for the `YYYY[-MM[-DD]]_Title` convention.
//!
//! Folder names double as metadata: an optional leading date followed by an
//! underscore-separated title. This module extracts both parts consistently.
//!
//! ## Recognized Patterns
//!
//! Tried in priority order; the first that matches wins:
//! - `2015-08-27_Trip_to_lake` → date 2015-08-27, title "Trip to lake"
//! - `2015-08_Trip_to_lake` → date 2015-08-01 (day defaults to the 1st)
//! - `2015_Trip_to_lake` → date 2015-01-01 (month defaults to January)
//! - `Trip_to_lake` → no date, title "Trip to lake"
//!
//! Underscores in the title part are converted to spaces. A prefix that looks
//! like a date but is not a real calendar date (`2015-13_X`), or a date with
//! nothing after the underscore (`2015_`), is not a date: the whole name
//! becomes the title.

use chrono::NaiveDate;

/// Result of parsing a folder name like `2015-08-27_Trip_to_lake`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFolderName {
    /// Date from the name prefix, if the name starts with one.
    pub date: Option<NaiveDate>,
    /// Display title: the part after the date (or the whole name), underscores → spaces.
    pub title: String,
}

/// Parse a folder base name into an optional date and a display title.
pub fn parse_folder_name(name: &str) -> ParsedFolderName {
    match split_date_prefix(name) {
        Some((date, rest)) => ParsedFolderName {
            date: Some(date),
            title: rest.replace('_', " "),
        },
        None => ParsedFolderName {
            date: None,
            title: name.replace('_', " "),
        },
    }
}

/// Split `YYYY-MM-DD_rest`, `YYYY-MM_rest` or `YYYY_rest` into its date and `rest`.
fn split_date_prefix(name: &str) -> Option<(NaiveDate, &str)> {
    let (prefix, rest) = name.split_once('_')?;
    if rest.is_empty() {
        return None;
    }

    let mut parts = prefix.split('-');
    let year = parse_digits(parts.next()?, 4)?;
    let month = match parts.next() {
        Some(m) => parse_digits(m, 2)?,
        None => 1,
    };
    let day = match parts.next() {
        Some(d) => parse_digits(d, 2)?,
        None => 1,
    };
    if parts.next().is_some() {
        return None;
    }

    let date = NaiveDate::from_ymd_opt(year as i32, month, day)?;
    Some((date, rest))
}

/// Parse a fixed-width, all-digit field.
fn parse_digits(s: &str, width: usize) -> Option<u32> {
    if s.len() != width || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
