//! Per-archive correction pipeline
//!
//! One archive moves through validation, scanning, injection and
//! conditional repackaging:
//!
//! ```text
//! Start -> Validated -> Scanned -> Corrected -> {Repacked | Unchanged}
//!   |          |
//!   +----------+--> Skipped(reason)
//! ```
//!
//! Validation failures skip the archive (zero change count) without
//! failing a batch; per-asset failures are warnings. The extraction
//! directory is released on every exit path.

use crate::archive::{ArchiveRepacker, ArchiveValidator};
use crate::codec::ImageCodec;
use crate::config::RepairConfig;
use crate::error::Result;
use crate::injector::ProfileInjector;
use crate::profile::ReferenceProfile;
use crate::scanner::ImageScanner;
use crate::types::CorrectionResult;
use log::{debug, info, warn};
use std::path::Path;

/// Orchestrates the correction of a single archive
pub struct CorrectionPipeline<'a> {
    codec: &'a dyn ImageCodec,
    profile: &'a ReferenceProfile,
    config: &'a RepairConfig,
}

impl<'a> CorrectionPipeline<'a> {
    /// Create a pipeline sharing the run's codec, profile and config
    #[must_use]
    pub fn new(
        codec: &'a dyn ImageCodec,
        profile: &'a ReferenceProfile,
        config: &'a RepairConfig,
    ) -> Self {
        Self {
            codec,
            profile,
            config,
        }
    }

    /// Correct the images inside one `.epub` file.
    ///
    /// The archive is rewritten if and only if at least one image was
    /// changed; otherwise it is left byte-for-byte untouched. Archives
    /// failing validation are reported and skipped with a zero change
    /// count.
    ///
    /// # Errors
    ///
    /// Returns an error for I/O failures outside the validation taxonomy
    /// and for a failed repack (in which case the original archive is
    /// preserved).
    pub fn correct_archive(&self, archive_path: &Path) -> Result<CorrectionResult> {
        let handle = match ArchiveValidator::validate_and_extract(archive_path) {
            Ok(handle) => handle,
            Err(e) => {
                if let Some(reason) = e.skip_reason() {
                    warn!("{e}, skip");
                    return Ok(CorrectionResult::skipped(reason));
                }
                return Err(e);
            },
        };

        let scanner = ImageScanner::new(self.codec);
        let injector = ProfileInjector::new(self.codec, self.profile, self.config);
        let mut images_changed = 0usize;

        for scanned in scanner.scan(handle.root())? {
            let mut asset = match scanned {
                Ok(asset) => asset,
                Err(e) => {
                    // unreadable assets are not eligible; keep scanning
                    warn!("{e}");
                    continue;
                },
            };

            match injector.inject(&mut asset) {
                Ok(true) => {
                    images_changed += 1;
                    debug!(
                        "injected profile into {} ({})",
                        asset.rel_path.display(),
                        asset.color_space
                    );
                },
                Ok(false) => {},
                Err(e) => warn!("{e}"),
            }
        }

        if images_changed == 0 {
            return Ok(CorrectionResult::unchanged());
        }

        ArchiveRepacker::repack(handle.root(), archive_path)?;
        info!("file corrected: {}", archive_path.display());
        Ok(CorrectionResult::repacked(images_changed))
    }
}
