//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every folder is its title and photo count, with filesystem paths shown
//! as secondary context via indented `Source:` lines.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! photos (27 photos)
//! 001 Trip to lake (12 photos)
//!     Source: 2015-08-27_Trip_to_lake/
//!     Date: 2015-08-27
//!     Overrides: title, cover
//!     Reusable: 10 of 12 images
//!     001 Day two (3 photos)
//!         Source: 2015-08-27_Trip_to_lake/Day_two/
//! ```
//!
//! ## Build
//!
//! ```text
//! Scanned 4 folders, 27 images
//! Trip to lake (12 photos)
//!     Source: photos/2015-08-27_Trip_to_lake
//!     Metadata: 10 reused, 2 identified (12 total)
//! ...
//! Wrote 4 descriptors
//! Metadata: 10 reused, 17 identified (27 total)
//! Thumbnails: 34 created, 20 up to date
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::cache::CacheStats;
use crate::naming::parse_folder_name;
use crate::process::ProcessEvent;
use crate::report::RunReport;
use crate::scan::FolderNode;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Title with photo count: `Trip to lake (12 photos)`.
fn folder_label(title: &str, count: usize) -> String {
    let noun = if count == 1 { "photo" } else { "photos" };
    format!("{} ({} {})", title, count, noun)
}

// ============================================================================
// Check: folder tree
// ============================================================================

/// Format the scanned tree below `root`, one entry per folder.
///
/// Titles and dates are derived exactly as a build would derive them, but no
/// image is opened.
pub fn format_tree(root: &FolderNode) -> Vec<String> {
    let mut lines = vec![folder_label(&folder_title(root), root.total_images())];
    tree_details(root, root, 1, &mut lines);
    for (i, child) in root.children.iter().enumerate() {
        tree_node(root, child, i + 1, 0, &mut lines);
    }
    lines
}

fn tree_node(
    root: &FolderNode,
    node: &FolderNode,
    pos: usize,
    depth: usize,
    lines: &mut Vec<String>,
) {
    lines.push(format!(
        "{}{} {}",
        indent(depth),
        format_index(pos),
        folder_label(&folder_title(node), node.total_images())
    ));
    tree_details(root, node, depth + 1, lines);
    for (i, child) in node.children.iter().enumerate() {
        tree_node(root, child, i + 1, depth + 1, lines);
    }
}

fn tree_details(root: &FolderNode, node: &FolderNode, depth: usize, lines: &mut Vec<String>) {
    let pad = indent(depth);
    let rel = node.path.strip_prefix(&root.path).unwrap_or(&node.path);
    if !rel.as_os_str().is_empty() {
        lines.push(format!("{}Source: {}/", pad, rel.display()));
    }
    if let Some(date) = parse_folder_name(&node.name).date {
        lines.push(format!("{}Date: {}", pad, date));
    }
    if let Some(overrides) = node.overrides.as_ref().filter(|o| !o.is_empty()) {
        let keys: Vec<&str> = [
            ("title", overrides.title.is_some()),
            ("description", overrides.description.is_some()),
            ("cover", overrides.cover.is_some()),
        ]
        .into_iter()
        .filter_map(|(key, set)| set.then_some(key))
        .collect();
        lines.push(format!("{}Overrides: {}", pad, keys.join(", ")));
    }
    if let Some(previous) = &node.previous {
        let reusable = node
            .image_filenames
            .iter()
            .filter(|f| previous.get(f).is_some())
            .count();
        lines.push(format!(
            "{}Reusable: {} of {} images",
            pad,
            reusable,
            node.image_filenames.len()
        ));
    }
}

fn folder_title(node: &FolderNode) -> String {
    node.overrides
        .as_ref()
        .and_then(|o| o.title.clone())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| parse_folder_name(&node.name).title)
}

/// Print the scanned tree to stdout.
pub fn print_tree(root: &FolderNode) {
    for line in format_tree(root) {
        println!("{}", line);
    }
}

// ============================================================================
// Build: progress events
// ============================================================================

/// Format a single progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Scanned { folders, images } => {
            vec![format!("Scanned {} folders, {} images", folders, images)]
        }
        ProcessEvent::FolderWritten {
            path,
            title,
            image_count,
            direct_images,
            reused,
            identified,
            failed,
        } => {
            let mut lines = vec![
                folder_label(title, *image_count),
                format!("    Source: {}", path.display()),
            ];
            if *direct_images > 0 {
                let stats = CacheStats {
                    reused: *reused as u32,
                    identified: *identified as u32,
                    failed: *failed as u32,
                };
                lines.push(format!("    Metadata: {}", stats));
            }
            lines
        }
    }
}

// ============================================================================
// Build: final report
// ============================================================================

/// Format the end-of-run summary: counts, warnings and the failure, if any.
pub fn format_report(report: &RunReport) -> Vec<String> {
    let mut lines = vec![
        format!("Wrote {} descriptors", report.folders_written),
        format!("Metadata: {}", report.cache),
        format!("Thumbnails: {}", report.thumbnails),
    ];
    if !report.warnings.is_empty() {
        lines.push(format!("Warnings ({})", report.warnings.len()));
        for warning in &report.warnings {
            lines.push(format!("{}{}", indent(1), warning));
        }
    }
    if let Some(failure) = &report.failure {
        lines.push(format!("Failed: {}", failure));
    }
    lines
}

/// Print the end-of-run summary to stdout.
pub fn print_report(report: &RunReport) {
    for line in format_report(report) {
        println!("{}", line);
    }
}
