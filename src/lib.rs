#![allow(clippy::uninlined_format_args)]

//! # ePub CMYK Repair
//!
//! Repairs image assets inside ePub archives that use a CMYK color space
//! but lack an embedded ICC color profile, by injecting a supplied
//! reference profile and rewriting the archive only when a change
//! occurred.
//!
//! The correction of one archive runs through four stages: the archive is
//! validated (readable zip container, byte-exact `application/epub+zip`
//! mimetype marker) and extracted to a private temporary root; the image
//! directory is scanned and every recognized asset inspected for its color
//! space and profile presence; eligible assets (CMYK without a profile,
//! unless the force option widens the rule) receive the reference profile
//! without re-encoding their image data; and the archive is rebuilt in
//! place if and only if at least one asset changed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use epub_cmyk_repair::{repair_epub_file, ReferenceProfile, RepairConfig};
//!
//! # fn example() -> epub_cmyk_repair::Result<()> {
//! let profile = ReferenceProfile::load("USWebCoatedSWOP.icc")?;
//! let config = RepairConfig::default();
//!
//! let result = repair_epub_file("book.epub", &profile, &config)?;
//! println!("{} image(s) corrected", result.images_changed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Library vs CLI Usage
//!
//! All correction functionality is available as a library; the `cli`
//! feature (on by default) adds the command-line interface with batch
//! discovery, a bounded worker pool and progress reporting:
//!
//! ```toml
//! [dependencies]
//! epub-cmyk-repair = { version = "0.3", default-features = false }
//! ```
//!
//! ## Custom image backends
//!
//! The pipeline reaches images through the [`ImageCodec`] trait; the
//! default [`MarkerCodec`] works at the container level (JPEG APP2
//! segments, PNG iCCP chunks) so assets are never transcoded. Any
//! conforming binding can be substituted.

pub mod archive;
#[cfg(feature = "cli")]
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod injector;
pub mod pipeline;
pub mod profile;
pub mod scanner;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;

// Public API exports
pub use archive::{ArchiveHandle, ArchiveRepacker, ArchiveValidator, EPUB_MIMETYPE, TYPE_MARKER};
pub use codec::{ImageCodec, ImageInfo, MarkerCodec};
pub use config::{RepairConfig, RepairConfigBuilder};
pub use error::{RepairError, Result};
pub use injector::ProfileInjector;
pub use pipeline::CorrectionPipeline;
pub use profile::ReferenceProfile;
pub use scanner::{ImageScanner, ScannedAssets, IMAGE_DIR, IMAGE_EXTENSIONS};
pub use types::{ArchiveOutcome, ColorSpace, CorrectionResult, ImageAsset, SkipReason};

#[cfg(feature = "cli")]
pub use tracing_config::TracingConfig;

use std::path::Path;

/// Correct the images inside a single `.epub` file.
///
/// Convenience wrapper building a [`CorrectionPipeline`] with the default
/// [`MarkerCodec`]. The archive is rewritten if and only if at least one
/// image was changed; archives failing validation are skipped with a zero
/// change count.
///
/// # Errors
///
/// Returns an error for I/O failures outside the validation taxonomy and
/// for a failed repack (the original archive is preserved in that case).
pub fn repair_epub_file<P: AsRef<Path>>(
    archive_path: P,
    profile: &ReferenceProfile,
    config: &RepairConfig,
) -> Result<CorrectionResult> {
    let codec = MarkerCodec::new();
    let pipeline = CorrectionPipeline::new(&codec, profile, config);
    pipeline.correct_archive(archive_path.as_ref())
}
