//! # CLI Module
//!
//! Command-line interface for the duplicate image finder.
//!
//! ## Usage
//! ```bash
//! # Scan a folder for near-duplicate images
//! dupe-finder scan ./uploads/batch
//!
//! # With custom threshold
//! dupe-finder scan ./uploads/batch --threshold 5
//!
//! # JSON output with paths relative to the folder
//! dupe-finder scan ./uploads/batch --output json --relative
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use image_dupe_finder::core::comparator::GroupingMode;
use image_dupe_finder::core::hasher::HashingMode;
use image_dupe_finder::core::pipeline::{Pipeline, PipelineResult, ScanReport};
use image_dupe_finder::error::{DupeFinderError, Result};
use image_dupe_finder::events::{Event, EventChannel, HashEvent, PipelineEvent, ScanEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::thread;

/// Image Dupe Finder - Group visually similar images
#[derive(Parser, Debug)]
#[command(name = "dupe-finder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a folder for near-duplicate images
    Scan {
        /// Folder to scan (recursively)
        folder: PathBuf,

        /// Maximum Hamming distance to a cluster seed (lower = stricter)
        #[arg(short, long, default_value = "10")]
        threshold: u32,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Hash images one at a time on the main thread
        #[arg(long)]
        sequential: bool,

        /// Number of hashing threads
        #[arg(long, conflicts_with = "sequential")]
        threads: Option<usize>,

        /// How clusters are formed
        #[arg(long, default_value = "star")]
        grouping: Grouping,

        /// Print paths relative to the scanned folder
        #[arg(long)]
        relative: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Grouping {
    /// Compare against the cluster seed only (default)
    Star,
    /// Merge chains of similar images
    Connected,
}

impl From<Grouping> for GroupingMode {
    fn from(grouping: Grouping) -> Self {
        match grouping {
            Grouping::Star => GroupingMode::Star,
            Grouping::Connected => GroupingMode::Connected,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (paths only)
    Minimal,
}

/// Options for a single scan
struct ScanOptions {
    folder: PathBuf,
    threshold: u32,
    output: OutputFormat,
    sequential: bool,
    threads: Option<usize>,
    grouping: GroupingMode,
    relative: bool,
    verbose: bool,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            folder,
            threshold,
            output,
            sequential,
            threads,
            grouping,
            relative,
            verbose,
        } => {
            image_dupe_finder::init_tracing(if verbose { "debug" } else { "warn" })?;
            run_scan(ScanOptions {
                folder,
                threshold,
                output,
                sequential,
                threads,
                grouping: grouping.into(),
                relative,
                verbose,
            })
        }
    }
}

fn run_scan(options: ScanOptions) -> Result<()> {
    let term = Term::stderr();

    // Print header
    if matches!(options.output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Image Dupe Finder").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    // Build pipeline
    let mut builder = Pipeline::builder()
        .threshold(options.threshold)
        .grouping(options.grouping);
    if options.sequential {
        builder = builder.hashing_mode(HashingMode::Sequential);
    }
    if let Some(threads) = options.threads {
        builder = builder.threads(threads);
    }
    let pipeline = builder.build();

    // Set up event handling
    let (sender, receiver) = EventChannel::new();

    // Progress bar for pretty output
    let progress = if matches!(options.output, OutputFormat::Pretty) {
        let bar_style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map_err(|e| DupeFinderError::Config(format!("invalid progress template: {}", e)))?
            .progress_chars("█▓░");
        let pb = ProgressBar::new(0);
        pb.set_style(bar_style);
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let verbose = options.verbose;

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress_clone else {
                continue;
            };
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(format!("{}", phase));
                }
                Event::Scan(ScanEvent::Completed { total_images }) => {
                    pb.set_length(total_images as u64);
                }
                Event::Hash(HashEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    if verbose {
                        pb.set_message(
                            p.current_path
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .into_owned(),
                        );
                    }
                }
                Event::Hash(HashEvent::Skipped { path, reason }) if verbose => {
                    pb.println(format!(
                        "  {} {} ({})",
                        style("skipped").yellow(),
                        path.display(),
                        reason
                    ));
                }
                Event::Pipeline(PipelineEvent::Completed { .. } | PipelineEvent::Cancelled) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    // Run the pipeline
    let outcome = pipeline.run_with_events(&options.folder, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let result = outcome?;

    // Output results
    match options.output {
        OutputFormat::Pretty => {
            print_pretty_results(&term, &result, &options);
            Ok(())
        }
        OutputFormat::Json => print_json_results(result, &options),
        OutputFormat::Minimal => {
            print_minimal_results(&report(result, &options));
            Ok(())
        }
    }
}

fn report(result: PipelineResult, options: &ScanOptions) -> ScanReport {
    let report = result.into_report();
    if options.relative {
        report.relative_to(&options.folder)
    } else {
        report
    }
}

fn display_path(path: &Path, options: &ScanOptions) -> String {
    if options.relative {
        path.strip_prefix(&options.folder)
            .unwrap_or(path)
            .display()
            .to_string()
    } else {
        path.display().to_string()
    }
}

fn print_pretty_results(term: &Term, result: &PipelineResult, options: &ScanOptions) {
    term.write_line("").ok();
    term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    // Summary
    term.write_line(&format!(
        "  {} images listed in {:.1}s",
        style(result.total_images).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();

    term.write_line(&format!(
        "  {} similar groups found",
        style(result.clusters.len()).cyan()
    ))
    .ok();

    let clustered: usize = result.clusters.iter().map(Vec::len).sum();
    term.write_line(&format!("  {} images in groups", style(clustered).cyan()))
        .ok();

    if !result.skipped.is_empty() {
        term.write_line(&format!(
            "  {} images could not be decoded",
            style(result.skipped.len()).yellow()
        ))
        .ok();
    }

    if !result.scan_errors.is_empty() {
        term.write_line(&format!(
            "  {} entries could not be read",
            style(result.scan_errors.len()).yellow()
        ))
        .ok();
    }

    term.write_line("").ok();

    // Show groups
    if result.clusters.is_empty() {
        term.write_line(&format!("  {}", style("No similar images found.").green()))
            .ok();
    } else {
        term.write_line(&format!("{}", style("Similar Groups:").bold().underlined()))
            .ok();
        term.write_line("").ok();

        for (i, cluster) in result.clusters.iter().enumerate() {
            term.write_line(&format!(
                "  {} ({} images)",
                style(format!("Group {}:", i + 1)).bold(),
                cluster.len()
            ))
            .ok();

            for (idx, image) in cluster.iter().enumerate() {
                // Largest file comes first
                let marker = if idx == 0 {
                    style("★").green().to_string()
                } else {
                    style("○").dim().to_string()
                };

                term.write_line(&format!(
                    "    {} {}  {}  {}  {}",
                    marker,
                    display_path(&image.path, options),
                    style(&image.size).yellow(),
                    style(&image.resolution).dim(),
                    style(&image.modified).dim()
                ))
                .ok();
            }

            term.write_line("").ok();
        }
    }

    // Footer
    term.write_line(&format!(
        "{}",
        style("No files were modified. Review the groups before taking action.").dim()
    ))
    .ok();
}

fn print_json_results(result: PipelineResult, options: &ScanOptions) -> Result<()> {
    let hashed_images = result.hashed_images;
    let skipped_images = result.skipped.len();
    let duration_ms = result.duration_ms;
    let report = report(result, options);

    let output = serde_json::json!({
        "total_images": report.total_images,
        "hashed_images": hashed_images,
        "skipped_images": skipped_images,
        "duration_ms": duration_ms,
        "threshold": options.threshold,
        "clusters": report.clusters,
    });

    let text = serde_json::to_string_pretty(&output)
        .map_err(|e| DupeFinderError::Config(format!("failed to encode JSON output: {}", e)))?;
    println!("{}", text);
    Ok(())
}

fn print_minimal_results(report: &ScanReport) {
    for (i, cluster) in report.clusters.iter().enumerate() {
        if i > 0 {
            println!();
        }
        for image in cluster {
            println!("{}", image.path.display());
        }
    }
}
