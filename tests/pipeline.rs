//! End-to-end runs over a real directory tree with a counting image service.

use gallery_meta::folder_config::IniFolderConfig;
use gallery_meta::imaging::{Identified, ImageService, ResizeParams, ServiceError};
use gallery_meta::process::{ProcessConfig, ProcessError, ProcessEvent, process_with_service};
use gallery_meta::scan::ScanError;
use gallery_meta::types::FolderDescriptor;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

/// Answers identify from the file name and writes an empty file per resize.
#[derive(Default)]
struct CountingService {
    identifies: AtomicUsize,
    resizes: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl CountingService {
    fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(5));
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ImageService for CountingService {
    fn identify(&self, path: &Path) -> Result<Identified, ServiceError> {
        self.enter();
        self.identifies.fetch_add(1, Ordering::SeqCst);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        // IMG_0003.jpg is captured at 10:03:00
        let minute: u32 = name
            .trim_start_matches("IMG_")
            .trim_end_matches(".jpg")
            .parse()
            .unwrap_or(0);
        let identified = Identified {
            make: Some("Canon".into()),
            date_time: Some(format!("2016:05:01 10:{minute:02}:00")),
            ..Identified::with_dimensions(4000, 3000)
        };
        self.leave();
        Ok(identified)
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), ServiceError> {
        self.enter();
        self.resizes.fetch_add(1, Ordering::SeqCst);
        let result = fs::write(&params.output, b"").map_err(ServiceError::from);
        self.leave();
        result
    }
}

fn touch(dir: &Path, names: &[&str]) {
    fs::create_dir_all(dir).unwrap();
    for name in names {
        fs::write(dir.join(name), b"").unwrap();
    }
}

fn sample_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    touch(root, &["IMG_0001.jpg"]);
    touch(
        &root.join("2015-08-27_Trip_to_lake"),
        &["IMG_0003.jpg", "IMG_0002.jpg", "notes.txt"],
    );
    touch(
        &root.join("2015-08-27_Trip_to_lake/Day_two"),
        &["IMG_0004.jpg", "IMG_0005.JPG"],
    );
    touch(&root.join("Misc"), &["IMG_0006.jpeg"]);
    touch(&root.join(".private"), &["IMG_0007.jpg"]);
    tmp
}

fn config(max_processes: usize) -> ProcessConfig {
    ProcessConfig {
        sizes: vec![150, 300],
        max_processes,
        ..ProcessConfig::default()
    }
}

fn read(path: &Path) -> FolderDescriptor {
    serde_json::from_str(&fs::read_to_string(path.join("meta.json")).unwrap()).unwrap()
}

#[test]
fn full_run_writes_every_descriptor() {
    let tmp = sample_tree();
    let root = tmp.path();
    let service = Arc::new(CountingService::default());

    let report = process_with_service(
        Arc::clone(&service),
        &IniFolderConfig,
        root,
        &config(2),
        None,
    )
    .unwrap();

    assert!(report.is_success());
    assert_eq!(report.folders_written, 4);
    assert_eq!(report.cache.identified, 6);
    assert_eq!(report.thumbnails.created, 12);
    assert_eq!(service.resizes.load(Ordering::SeqCst), 12);

    let top = read(root);
    assert_eq!(top.image_count, 6);
    let sub_dirs: Vec<&str> = top.sub_dirs.iter().map(|s| s.folder_name.as_str()).collect();
    assert_eq!(sub_dirs, vec!["Misc", "2015-08-27_Trip_to_lake"]);

    let lake = read(&root.join("2015-08-27_Trip_to_lake"));
    assert_eq!(lake.title, "Trip to lake");
    assert_eq!(lake.image_count, 4);
    let names: Vec<&str> = lake.images.iter().map(|i| i.filename.as_str()).collect();
    assert_eq!(names, vec!["IMG_0002.jpg", "IMG_0003.jpg"]);
    assert!(
        root.join("2015-08-27_Trip_to_lake/thumbs/150-IMG_0002.jpg")
            .exists()
    );

    assert!(!root.join(".private/meta.json").exists());
}

#[test]
fn second_run_reuses_everything() {
    let tmp = sample_tree();
    let root = tmp.path();

    let first = Arc::new(CountingService::default());
    process_with_service(first, &IniFolderConfig, root, &config(3), None).unwrap();
    let before = fs::read(root.join("2015-08-27_Trip_to_lake/meta.json")).unwrap();

    let second = Arc::new(CountingService::default());
    let report = process_with_service(
        Arc::clone(&second),
        &IniFolderConfig,
        root,
        &config(3),
        None,
    )
    .unwrap();

    assert_eq!(second.identifies.load(Ordering::SeqCst), 0);
    assert_eq!(second.resizes.load(Ordering::SeqCst), 0);
    assert_eq!(report.cache.reused, 6);
    assert_eq!(report.thumbnails.skipped, 12);
    let after = fs::read(root.join("2015-08-27_Trip_to_lake/meta.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn concurrency_cap_holds_across_folders() {
    let tmp = TempDir::new().unwrap();
    for folder in ["a", "b", "c", "d"] {
        let names: Vec<String> = (1..=5).map(|i| format!("IMG_00{i:02}.jpg")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        touch(&tmp.path().join(folder), &refs);
    }
    let service = Arc::new(CountingService::default());

    process_with_service(
        Arc::clone(&service),
        &IniFolderConfig,
        tmp.path(),
        &config(2),
        None,
    )
    .unwrap();

    assert_eq!(service.identifies.load(Ordering::SeqCst), 20);
    assert!(service.peak.load(Ordering::SeqCst) <= 2);
}

#[test]
fn events_report_progress() {
    let tmp = sample_tree();
    let (tx, rx) = std::sync::mpsc::channel();

    process_with_service(
        Arc::new(CountingService::default()),
        &IniFolderConfig,
        tmp.path(),
        &config(2),
        Some(tx),
    )
    .unwrap();

    let events: Vec<ProcessEvent> = rx.iter().collect();
    assert_eq!(
        events[0],
        ProcessEvent::Scanned {
            folders: 4,
            images: 6
        }
    );
    let written = events
        .iter()
        .filter(|e| matches!(e, ProcessEvent::FolderWritten { .. }))
        .count();
    assert_eq!(written, 4);
}

#[test]
fn missing_root_fails_before_running() {
    let tmp = TempDir::new().unwrap();
    let result = process_with_service(
        Arc::new(CountingService::default()),
        &IniFolderConfig,
        &tmp.path().join("nope"),
        &config(2),
        None,
    );
    assert!(matches!(
        result,
        Err(ProcessError::Scan(ScanError::PathNotFound(_)))
    ));
}

#[cfg(unix)]
#[test]
fn directory_symlink_loop_is_not_followed() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    touch(root, &["IMG_0001.jpg"]);
    touch(&root.join("Lake"), &["IMG_0002.jpg"]);
    std::os::unix::fs::symlink(root, root.join("Lake/loop")).unwrap();

    let report = process_with_service(
        Arc::new(CountingService::default()),
        &IniFolderConfig,
        root,
        &config(2),
        None,
    )
    .unwrap();

    assert!(report.is_success());
    assert_eq!(report.folders_written, 2);
    assert_eq!(report.root.map(|d| d.image_count), Some(2));
    assert!(read(&root.join("Lake")).sub_dirs.is_empty());
}
