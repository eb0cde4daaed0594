//! Bottom-up folder aggregation.
//!
//! [`aggregate`] is a post-order traversal: every child subtree is finished
//! (descriptor written) before its parent computes its own descriptor from the
//! children's results. Children and images are processed with rayon inside the
//! run's [`TaskQueue`](crate::queue::TaskQueue) pool, so sibling folders
//! proceed in parallel under the same global cap.
//!
//! ## Derived fields
//!
//! | Field | Source, first match wins |
//! |---|---|
//! | `title` | `folder.ini` title, title from the folder name |
//! | `description` | `folder.ini` description, empty |
//! | `cover` | `folder.ini` cover, first image in listing order, none |
//! | `time` | date from the folder name, earliest capture in the subtree, previous run's time |
//! | `imageCount` | own images plus every child's `imageCount` |
//!
//! `subDirs` is sorted newest first; folders without a time come last, ties
//! broken by folder name.

use crate::descriptor::{self, WriteError};
use crate::imaging::ImageService;
use crate::metadata::resolve;
use crate::naming::parse_folder_name;
use crate::process::{MetadataSource, ProcessEvent, RunContext, compare_times, process_image};
use crate::report::RunCounters;
use crate::scan::FolderNode;
use crate::types::{FolderDescriptor, ImageRecord, SubDirSummary};
use chrono::{NaiveDateTime, NaiveTime};
use rayon::prelude::*;
use tracing::debug;

/// A finished folder, as its parent sees it.
#[derive(Debug, Clone)]
pub struct Aggregated {
    pub descriptor: FolderDescriptor,
    /// Earliest capture time among this folder's images and all descendants'.
    pub earliest_capture: Option<NaiveDateTime>,
    pub folder_name: String,
}

impl Aggregated {
    fn summary(&self) -> SubDirSummary {
        SubDirSummary {
            folder_name: self.folder_name.clone(),
            title: self.descriptor.title.clone(),
            time: self.descriptor.time,
            cover: self.descriptor.cover.clone(),
            image_count: self.descriptor.image_count,
        }
    }
}

/// Aggregate `node` and its subtree, writing one descriptor per folder.
///
/// Stops at the first write failure. Folders already written stay on disk.
pub fn aggregate<S: ImageService + 'static>(
    node: &FolderNode,
    ctx: &RunContext<'_, S>,
) -> Result<Aggregated, WriteError> {
    let children = node
        .children
        .par_iter()
        .map(|child| aggregate(child, ctx))
        .collect::<Result<Vec<_>, _>>()?;

    if !node.image_filenames.is_empty() {
        let thumb_dir = node.path.join(&ctx.config.thumb_dir);
        std::fs::create_dir_all(&thumb_dir).map_err(|source| WriteError::ThumbnailDir {
            path: thumb_dir.clone(),
            source,
        })?;
    }

    let processed: Vec<(ImageRecord, MetadataSource)> = node
        .image_filenames
        .par_iter()
        .map(|filename| process_image(node, filename, ctx))
        .collect();
    let count = |wanted: MetadataSource| processed.iter().filter(|(_, s)| *s == wanted).count();
    let (reused, identified, failed) = (
        count(MetadataSource::Reused),
        count(MetadataSource::Identified),
        count(MetadataSource::Failed),
    );
    let mut images: Vec<ImageRecord> = processed.into_iter().map(|(record, _)| record).collect();
    ctx.config.order.sort(&mut images);

    let earliest_capture = images
        .iter()
        .filter_map(ImageRecord::capture_time)
        .chain(children.iter().filter_map(|c| c.earliest_capture))
        .min();

    let parsed = parse_folder_name(&node.name);
    let time = parsed
        .date
        .map(|date| date.and_time(NaiveTime::MIN))
        .or(earliest_capture)
        .or_else(|| node.previous.as_ref().and_then(|p| p.time));

    let image_count =
        images.len() + children.iter().map(|c| c.descriptor.image_count).sum::<usize>();

    let mut sub_dirs: Vec<SubDirSummary> = children.iter().map(Aggregated::summary).collect();
    sub_dirs.sort_by(|a, b| {
        compare_times(a.time, b.time, true).then_with(|| a.folder_name.cmp(&b.folder_name))
    });

    let overrides = node.overrides.clone().unwrap_or_default();
    let descriptor = FolderDescriptor {
        title: resolve(&[overrides.title.as_deref(), Some(parsed.title.as_str())])
            .unwrap_or_default(),
        time,
        description: resolve(&[overrides.description.as_deref()]).unwrap_or_default(),
        image_count,
        cover: resolve(&[
            overrides.cover.as_deref(),
            node.image_filenames.first().map(String::as_str),
        ]),
        sub_dirs,
        images,
    };

    let path = descriptor::write(&node.path, &descriptor, ctx.config.export.as_ref())?;
    debug!(path = %path.display(), "descriptor written");
    RunCounters::bump(&ctx.counters.folders_written);
    ctx.emit(ProcessEvent::FolderWritten {
        path: node.path.clone(),
        title: descriptor.title.clone(),
        image_count,
        direct_images: node.image_filenames.len(),
        reused,
        identified,
        failed,
    });

    Ok(Aggregated {
        descriptor,
        earliest_capture,
        folder_name: node.name.clone(),
    })
}
