use clap::{Parser, Subcommand};
use gallery_meta::config::{self, CliOverrides};
use gallery_meta::folder_config::IniFolderConfig;
use gallery_meta::process::{self, ImageOrder, ProcessConfig};
use gallery_meta::report::Warnings;
use gallery_meta::{output, scan};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "gallery-meta")]
#[command(about = "Build per-folder metadata descriptors and thumbnails for a photo tree")]
#[command(long_about = "\
Build per-folder metadata descriptors and thumbnails for a photo tree

Every folder below ROOT gets a meta.json describing its images (dimensions,
camera, capture time) and its sub-folders, plus one thumbnail per configured
size in <folder>/thumbs/<size>-<file>.

Folder structure:

  photos/
  ├── gallery.toml                 # Run config (optional)
  ├── 2015-08-27_Trip_to_lake/     # Title \"Trip to lake\", date 2015-08-27
  │   ├── folder.ini               # title=, description=, cover= overrides
  │   ├── IMG_0001.jpg
  │   └── thumbs/                  # Generated
  └── .private/                    # Hidden, skipped

Metadata resolution (first available wins):
  Title:  folder.ini → folder name
  Time:   folder-name date → earliest capture time → previous run
  Cover:  folder.ini → first image in the directory listing

Existing meta.json files are reused: images already listed there are not
opened again. Use --force to re-read every image.

Run 'gallery-meta gen-config' to generate a documented gallery.toml.")]
#[command(version = version_string())]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write meta.json and thumbnails for every folder below ROOT
    Build(BuildArgs),
    /// Show the folder tree as a build would see it, without touching images
    Check {
        /// Root folder
        root: PathBuf,
        /// Thumbnail directory name to skip while walking
        #[arg(long)]
        thumb_dir: Option<String>,
    },
    /// Print a stock gallery.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct BuildArgs {
    /// Root folder
    root: PathBuf,
    /// Thumbnail size on the longer edge, repeatable
    #[arg(long = "size", value_name = "PX")]
    sizes: Vec<u32>,
    /// Order of images in each descriptor
    #[arg(long, value_enum)]
    order: Option<ImageOrder>,
    /// Ignore existing meta.json files and identify every image again
    #[arg(long)]
    force: bool,
    /// Also write images.js pointing at thumbnails of this size
    #[arg(long, value_name = "PX")]
    export_size: Option<u32>,
    /// Maximum image operations running at once
    #[arg(long, value_name = "N")]
    max_processes: Option<usize>,
    /// Thumbnail directory name inside each folder
    #[arg(long, value_name = "NAME")]
    thumb_dir: Option<String>,
}

impl BuildArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            sizes: self.sizes.clone(),
            order: self.order,
            export_size: self.export_size,
            max_processes: self.max_processes,
            thumb_dir: self.thumb_dir.clone(),
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        Command::Build(args) => {
            let gallery = config::load_config(&args.root, &args.overrides())?;
            let process_config = ProcessConfig::from_gallery_config(&gallery, args.force);

            println!("==> Building {}", args.root.display());
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_process_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let report = process::process(&args.root, &process_config, Some(tx));
            if printer.join().is_err() {
                tracing::error!("progress printer panicked");
            }
            let report = report?;

            output::print_report(&report);
            if report.is_success() {
                println!("==> Build complete");
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Check { root, thumb_dir } => {
            let cli = CliOverrides {
                thumb_dir,
                ..CliOverrides::default()
            };
            let gallery = config::load_unvalidated(&root, &cli)?;
            let process_config = ProcessConfig::from_gallery_config(&gallery, false);

            println!("==> Checking {}", root.display());
            let warnings = Warnings::new();
            let tree = scan::build_tree(
                &root,
                &process_config.scan_options(),
                &IniFolderConfig,
                &warnings,
            )?;
            output::print_tree(&tree);

            let warnings = warnings.into_vec();
            if warnings.is_empty() {
                println!("==> Tree is valid");
            } else {
                println!("Warnings ({})", warnings.len());
                for warning in &warnings {
                    println!("    {}", warning);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
