//! ePub CMYK correction CLI
//!
//! Command-line interface around the per-archive correction pipeline:
//! input validation, batch discovery, a bounded worker pool and the final
//! summary.

use crate::{
    codec::MarkerCodec,
    config::RepairConfig,
    pipeline::CorrectionPipeline,
    profile::ReferenceProfile,
    tracing_config::TracingConfig,
    types::ArchiveOutcome,
};
use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{error, info, warn};

/// Correct images inside ePub files with CMYK color space and without
/// color profiles
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "epub-cmyk-repair")]
pub struct Cli {
    /// Path to the .icc CMYK reference profile
    #[arg(value_name = "PROFILE")]
    pub profile: PathBuf,

    /// Path to an .epub file or a directory that contains ePub files
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Force replace the color profile of CMYK images that already carry one
    #[arg(short, long)]
    pub force: bool,

    /// Filename pattern for batch processing (e.g. "novel-*.epub")
    #[arg(long)]
    pub pattern: Option<String>,

    /// Number of archives processed in parallel (0 = auto-detect)
    #[arg(short, long, default_value_t = 0)]
    pub threads: usize,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// CLI entry point
pub fn main() -> Result<()> {
    let cli = Cli::parse();

    TracingConfig::new()
        .with_verbosity(cli.verbose)
        .init()
        .context("Failed to initialize tracing")?;

    validate_inputs(&cli)?;

    let profile = ReferenceProfile::load(&cli.profile)
        .with_context(|| format!("Failed to load color profile '{}'", cli.profile.display()))?;

    let mut builder = RepairConfig::builder()
        .force(cli.force)
        .recursive(cli.recursive)
        .threads(cli.threads);
    if let Some(pattern) = &cli.pattern {
        builder = builder.pattern(pattern.clone());
    }
    let config = builder.build();

    let files = collect_epub_files(&cli.path, &config)?;
    if files.is_empty() {
        warn!("no ePub files found under '{}'", cli.path.display());
    } else {
        info!("Correcting {} file(s)...", files.len());
    }

    let start_time = Instant::now();
    let totals = process_batch(&files, &profile, &config)?;
    let elapsed = start_time.elapsed();

    println!(
        "Corrected {} {} inside {} {} in {:.1}s.",
        totals.images_changed,
        plural(totals.images_changed, "image", "images"),
        totals.files_changed,
        plural(totals.files_changed, "file", "files"),
        elapsed.as_secs_f64()
    );
    if totals.skipped > 0 || totals.failed > 0 {
        println!(
            "{} skipped, {} failed.",
            totals.skipped, totals.failed
        );
    }

    // individual archive failures do not change the exit code
    Ok(())
}

/// Aggregated counters for one batch run
#[derive(Debug, Default)]
struct BatchTotals {
    images_changed: usize,
    files_changed: usize,
    skipped: usize,
    failed: usize,
}

fn process_batch(
    files: &[PathBuf],
    profile: &ReferenceProfile,
    config: &RepairConfig,
) -> Result<BatchTotals> {
    let progress = if files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap()
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let images_changed = AtomicUsize::new(0);
    let files_changed = AtomicUsize::new(0);
    let skipped = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    let process_one = |file: &PathBuf| {
        if let Some(pb) = &progress {
            pb.set_message(file.display().to_string());
        }

        let codec = MarkerCodec::new();
        let pipeline = CorrectionPipeline::new(&codec, profile, config);
        match pipeline.correct_archive(file) {
            Ok(result) => {
                images_changed.fetch_add(result.images_changed, Ordering::Relaxed);
                if result.rewritten() {
                    files_changed.fetch_add(1, Ordering::Relaxed);
                }
                if matches!(result.outcome, ArchiveOutcome::Skipped(_)) {
                    skipped.fetch_add(1, Ordering::Relaxed);
                }
            },
            Err(e) => {
                error!("failed to process '{}': {e}", file.display());
                failed.fetch_add(1, Ordering::Relaxed);
            },
        }

        if let Some(pb) = &progress {
            pb.inc(1);
        }
    };

    // archives share no mutable state, so the batch fans out over a
    // bounded pool; each worker owns its archive's extraction directory
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
        .context("Failed to build worker pool")?;
    pool.install(|| {
        use rayon::prelude::*;
        files.par_iter().for_each(process_one);
    });

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    Ok(BatchTotals {
        images_changed: images_changed.into_inner(),
        files_changed: files_changed.into_inner(),
        skipped: skipped.into_inner(),
        failed: failed.into_inner(),
    })
}

/// Reject bad paths before any processing begins
fn validate_inputs(cli: &Cli) -> Result<()> {
    if !cli.profile.is_file() {
        anyhow::bail!(
            "'{}' is not a valid path to an .icc file. Please specify the path to the .icc CMYK color profile.",
            cli.profile.display()
        );
    }
    if cli.profile.extension().and_then(|e| e.to_str()) != Some("icc") {
        anyhow::bail!("'{}' is not a .icc file.", cli.profile.display());
    }

    if cli.path.is_file() {
        if cli.path.extension().and_then(|e| e.to_str()) != Some("epub") {
            anyhow::bail!("'{}' is not an .epub file.", cli.path.display());
        }
    } else if !cli.path.is_dir() {
        anyhow::bail!("'{}' is not a valid path.", cli.path.display());
    }

    Ok(())
}

/// Find the `.epub` files to process, sorted for a deterministic order
fn collect_epub_files(path: &Path, config: &RepairConfig) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    if config.recursive {
        for entry in walkdir::WalkDir::new(path) {
            let entry = entry?;
            if entry.file_type().is_file() {
                let entry_path = entry.path();
                if is_epub_file(entry_path)
                    && matches_pattern(entry_path, config.pattern.as_deref())
                {
                    files.push(entry_path.to_path_buf());
                }
            }
        }
    } else {
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                let entry_path = entry.path();
                if is_epub_file(&entry_path)
                    && matches_pattern(&entry_path, config.pattern.as_deref())
                {
                    files.push(entry_path);
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

fn is_epub_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("epub")
}

/// Check if the file name matches the given pattern
fn matches_pattern(path: &Path, pattern: Option<&str>) -> bool {
    match pattern {
        Some(pat) => {
            if let Some(filename) = path.file_name().and_then(|n| n.to_str()) {
                glob::Pattern::new(pat)
                    .map(|p| p.matches(filename))
                    .unwrap_or(false)
            } else {
                false
            }
        },
        None => true,
    }
}

fn plural<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 {
        singular
    } else {
        plural
    }
}
