//! Run entry point and per-image processing.
//!
//! Stage 2 of a run. Takes the folder tree from the scan stage, pushes every
//! image through the [`TaskQueue`] and hands each folder to the
//! [aggregator](crate::aggregate), which writes the descriptors bottom-up.
//!
//! ## Per-image work
//!
//! For each image [`process_image`] does two independent things:
//!
//! - **Thumbnails**: one resize per configured size whose output file does not
//!   exist yet. Resizes are queued and not waited for here.
//! - **Metadata**: the record from the previous run when one exists for the
//!   file name, otherwise an identify call. Orientation is applied to the
//!   dimensions and the EXIF capture time is parsed.
//!
//! A failed identify never fails the image: it is recorded as a warning and
//! the image keeps unknown (`null`) dimensions.
//!
//! ## Completion
//!
//! Descriptors are written as soon as a folder's metadata is known.
//! [`process_with_service`] returns only after the last queued thumbnail has
//! finished, so the [`RunReport`] covers all work.

use crate::aggregate;
use crate::config::GalleryConfig;
use crate::descriptor::ExportOptions;
use crate::folder_config::{FolderConfigProvider, IniFolderConfig};
use crate::imaging::{
    Identified, ImageService, Quality, RustBackend, oriented_dimensions, plan_thumbnails,
};
use crate::metadata::{clean_attribute, parse_capture_time};
use crate::queue::{QueueError, TaskQueue};
use crate::report::{RunCounters, RunReport, ThumbnailStats, Warning, Warnings};
use crate::scan::{FolderNode, ScanError, ScanOptions, build_tree};
use crate::types::{CaptureAttributes, ImageRecord};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::Ordering::Relaxed;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),
    #[error("{0}")]
    Queue(#[from] QueueError),
}

/// Order of the `images` list in each descriptor.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ImageOrder {
    /// Oldest capture first.
    #[default]
    TimeAsc,
    /// Newest capture first.
    TimeDesc,
    NameAsc,
    NameDesc,
}

impl ImageOrder {
    /// Total order over image records.
    ///
    /// Time orders put images without a capture time last in both directions
    /// and break ties by file name.
    pub fn compare(self, a: &ImageRecord, b: &ImageRecord) -> Ordering {
        match self {
            ImageOrder::TimeAsc => compare_times(a.capture_time(), b.capture_time(), false)
                .then_with(|| a.filename.cmp(&b.filename)),
            ImageOrder::TimeDesc => compare_times(a.capture_time(), b.capture_time(), true)
                .then_with(|| a.filename.cmp(&b.filename)),
            ImageOrder::NameAsc => a.filename.cmp(&b.filename),
            ImageOrder::NameDesc => b.filename.cmp(&a.filename),
        }
    }

    pub fn sort(self, images: &mut [ImageRecord]) {
        images.sort_by(|a, b| self.compare(a, b));
    }
}

/// Compare optional timestamps with missing values last, whatever the direction.
pub fn compare_times(
    a: Option<NaiveDateTime>,
    b: Option<NaiveDateTime>,
    descending: bool,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Configuration for a processing run.
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    pub sizes: Vec<u32>,
    pub thumb_dir: String,
    pub quality: Quality,
    pub order: ImageOrder,
    /// Write `images.js` next to each descriptor.
    pub export: Option<ExportOptions>,
    /// Reuse metadata from previous descriptors.
    pub incremental: bool,
    pub max_processes: usize,
}

impl ProcessConfig {
    /// Build a ProcessConfig from GalleryConfig values.
    ///
    /// `force` turns incremental reuse off. Repeated sizes are kept once, so
    /// each thumbnail file has exactly one resize.
    pub fn from_gallery_config(config: &GalleryConfig, force: bool) -> Self {
        let mut sizes: Vec<u32> = Vec::with_capacity(config.thumbnails.sizes.len());
        for &size in &config.thumbnails.sizes {
            if !sizes.contains(&size) {
                sizes.push(size);
            }
        }
        Self {
            sizes,
            thumb_dir: config.thumbnails.dir_name.clone(),
            quality: Quality::new(config.thumbnails.quality),
            order: config.images.order,
            export: config.export.size.map(|size| ExportOptions {
                size,
                thumb_dir: config.thumbnails.dir_name.clone(),
            }),
            incremental: !force,
            max_processes: config.processing.max_processes,
        }
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            incremental: self.incremental,
            thumb_dir: self.thumb_dir.clone(),
        }
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self::from_gallery_config(&GalleryConfig::default(), false)
    }
}

/// Progress events emitted while a run is in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    /// The tree walk finished.
    Scanned { folders: usize, images: usize },
    /// A folder's descriptor was written.
    FolderWritten {
        path: PathBuf,
        title: String,
        /// Recursive image count.
        image_count: usize,
        direct_images: usize,
        reused: usize,
        identified: usize,
        failed: usize,
    },
}

/// Where an image's metadata came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataSource {
    Reused,
    Identified,
    Failed,
}

/// Shared state for one run, borrowed by every folder and image task.
pub struct RunContext<'a, S> {
    pub config: &'a ProcessConfig,
    pub queue: &'a TaskQueue<S>,
    pub warnings: &'a Warnings,
    pub counters: &'a RunCounters,
    pub events: Option<&'a Sender<ProcessEvent>>,
}

impl<S> RunContext<'_, S> {
    pub fn emit(&self, event: ProcessEvent) {
        if let Some(tx) = self.events {
            // A closed receiver only means nobody is listening.
            let _ = tx.send(event);
        }
    }
}

/// Process `root` with the production image backend and `folder.ini` overrides.
pub fn process(
    root: &Path,
    config: &ProcessConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<RunReport, ProcessError> {
    process_with_service(
        Arc::new(RustBackend::new()),
        &IniFolderConfig,
        root,
        config,
        events,
    )
}

/// Process `root` using a specific image service and config provider (allows testing with mocks).
///
/// Returns `Err` only when the run could not start. A descriptor write
/// failure ends the run early but is reported in [`RunReport::failure`],
/// after the thumbnails already queued have finished.
pub fn process_with_service<S: ImageService + 'static>(
    service: Arc<S>,
    provider: &impl FolderConfigProvider,
    root: &Path,
    config: &ProcessConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<RunReport, ProcessError> {
    let warnings = Warnings::new();
    let tree = build_tree(root, &config.scan_options(), provider, &warnings)?;
    let queue = TaskQueue::new(service, config.max_processes)?;
    let counters = RunCounters::default();

    let result = {
        let ctx = RunContext {
            config,
            queue: &queue,
            warnings: &warnings,
            counters: &counters,
            events: events.as_ref(),
        };
        ctx.emit(ProcessEvent::Scanned {
            folders: tree.folder_count(),
            images: tree.total_images(),
        });
        queue.install(|| aggregate::aggregate(&tree, &ctx))
    };

    let mut thumbnails = ThumbnailStats {
        skipped: counters.thumbnails_skipped.load(Relaxed),
        ..ThumbnailStats::default()
    };
    for outcome in queue.finish() {
        match outcome.result {
            Ok(()) => thumbnails.created += 1,
            Err(e) => {
                thumbnails.failed += 1;
                warnings.push(Warning::Thumbnail {
                    path: outcome.output,
                    original: outcome.source,
                    message: e.to_string(),
                });
            }
        }
    }

    let (root, failure) = match result {
        Ok(aggregated) => (Some(aggregated.descriptor), None),
        Err(e) => {
            tracing::error!("{e}");
            (None, Some(e))
        }
    };

    Ok(RunReport {
        root,
        folders_written: counters.folders_written.load(Relaxed),
        cache: counters.cache_stats(),
        thumbnails,
        warnings: warnings.into_vec(),
        failure,
    })
}

/// Produce the record for one image and queue its missing thumbnails.
pub fn process_image<S: ImageService + 'static>(
    node: &FolderNode,
    filename: &str,
    ctx: &RunContext<'_, S>,
) -> (ImageRecord, MetadataSource) {
    let config = ctx.config;
    let plans = plan_thumbnails(
        &node.path,
        filename,
        &config.thumb_dir,
        &config.sizes,
        config.quality,
    );
    let skipped = config.sizes.len() - plans.len();
    RunCounters::add(&ctx.counters.thumbnails_skipped, skipped as u32);
    for params in plans {
        ctx.queue.resize(params);
    }

    if let Some(record) = node.previous.as_ref().and_then(|p| p.get(filename)) {
        RunCounters::bump(&ctx.counters.reused);
        return (record.clone(), MetadataSource::Reused);
    }

    let path = node.path.join(filename);
    match ctx.queue.identify(&path) {
        Ok(identified) => {
            let record = record_from_identified(filename, identified);
            if record.width.is_none() || record.height.is_none() {
                ctx.warnings.push(Warning::MissingDimensions { path });
            }
            RunCounters::bump(&ctx.counters.identified);
            (record, MetadataSource::Identified)
        }
        Err(e) => {
            ctx.warnings.push(Warning::ImageMetadata {
                path,
                message: e.to_string(),
            });
            RunCounters::bump(&ctx.counters.identify_failed);
            (ImageRecord::unknown(filename), MetadataSource::Failed)
        }
    }
}

/// Turn a raw identify result into a record: orient dimensions, parse the capture time.
pub fn record_from_identified(filename: &str, identified: Identified) -> ImageRecord {
    let (width, height) =
        oriented_dimensions(identified.width, identified.height, identified.orientation);
    ImageRecord {
        filename: filename.to_string(),
        width,
        height,
        exif: CaptureAttributes {
            make: clean_attribute(identified.make),
            model: clean_attribute(identified.model),
            date_time: identified
                .date_time
                .as_deref()
                .and_then(parse_capture_time),
        },
    }
}
