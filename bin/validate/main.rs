//! SWE-bench data point validation CLI
//!
//! Collects data point JSON files and validates them against the official
//! harness. Exits non-zero with the validation verdict on stderr when any
//! instance fails.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use swe_validator::{CacheLevel, Validator, ValidatorConfig};
use tracing::info;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "swe-validate")]
#[command(about = "Validate SWE-bench data point JSON files using the official harness")]
struct Args {
    /// Specific data point files to validate (default: all in the data directory)
    #[arg(short, long = "files", value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Directory to scan when no --files are provided
    #[arg(long, default_value = "data_points")]
    data_dir: PathBuf,

    /// Timeout (seconds) for each instance test run inside the harness
    #[arg(long, default_value = "1200")]
    timeout: u64,

    /// Maximum parallel workers for harness execution
    #[arg(long, default_value = "2")]
    max_workers: usize,

    /// Harness cache level for Docker images
    #[arg(long, value_enum, default_value = "env")]
    cache_level: CacheLevel,

    /// Remove images above the cache level after the run
    #[arg(long)]
    clean: bool,

    /// Force rebuild all images (disables cache reuse)
    #[arg(long)]
    force_rebuild: bool,

    /// Docker namespace; use "none" to disable namespacing
    #[arg(long, default_value = "swebench")]
    namespace: String,

    /// Tag used for instance images built by the harness
    #[arg(long, default_value = "latest")]
    instance_image_tag: String,

    /// File descriptor limit for the harness (Linux only)
    #[arg(long, default_value = "4096")]
    open_file_limit: u64,

    /// Optional run identifier; defaults to a timestamped value
    #[arg(long)]
    run_id: Option<String>,

    /// Directory where temporary dataset/prediction files and reports are written
    #[arg(long, default_value = ".swe-bench-validator")]
    workdir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Explicit files win; otherwise every `*.json` directly in the data
/// directory, sorted for a stable batch order.
fn collect_paths(files: &[PathBuf], data_dir: &Path) -> Vec<PathBuf> {
    if !files.is_empty() {
        return files.to_vec();
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(data_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();
    paths
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let mut filter =
        tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse().unwrap());
    if args.verbose {
        filter = filter.add_directive("swe_validator=debug".parse().unwrap());
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let paths = collect_paths(&args.files, &args.data_dir);
    if paths.is_empty() {
        eprintln!("No data point files found to validate.");
        return ExitCode::FAILURE;
    }
    info!(count = paths.len(), "validating data point files");

    let config = ValidatorConfig {
        timeout_secs: args.timeout,
        max_workers: args.max_workers,
        cache_level: args.cache_level,
        clean: args.clean,
        force_rebuild: args.force_rebuild,
        namespace: (args.namespace != "none").then_some(args.namespace),
        instance_image_tag: args.instance_image_tag,
        open_file_limit: args.open_file_limit,
        run_id: args.run_id,
        workdir: args.workdir,
        ..ValidatorConfig::default()
    };

    match Validator::new(config).run(&paths).await {
        Ok(summary) => {
            println!(
                "Validation succeeded for {} instance(s). Run report: {}",
                summary.resolved_ids.len(),
                summary.report_path.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
