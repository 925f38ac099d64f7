//! Core types for ePub image correction

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Color space of an image asset.
///
/// Only [`ColorSpace::Cmyk`] participates in the eligibility rule; the
/// remaining variants exist so scan results can be logged faithfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorSpace {
    /// Four-component CMYK (requires a profile for correct interpretation)
    Cmyk,
    /// Three-component RGB (including YCbCr-coded JPEG)
    Rgb,
    /// Single-component grayscale
    Gray,
    /// Component layout not recognized
    Unknown,
}

impl std::fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cmyk => write!(f, "cmyk"),
            Self::Rgb => write!(f, "rgb"),
            Self::Gray => write!(f, "gray"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// One image file under the archive's image directory.
///
/// The asset set is fixed once the archive is extracted; injection mutates
/// assets in place and flips [`ImageAsset::mutated`].
#[derive(Debug, Clone)]
pub struct ImageAsset {
    /// Absolute path inside the extraction root
    pub path: PathBuf,
    /// Path relative to the extraction root (stable across runs, used for logging)
    pub rel_path: PathBuf,
    /// Detected color space
    pub color_space: ColorSpace,
    /// Whether an ICC profile is already embedded
    pub has_profile: bool,
    /// Whether this asset was rewritten by the injector
    pub mutated: bool,
}

impl ImageAsset {
    /// Create a descriptor for a freshly scanned (not yet mutated) asset
    #[must_use]
    pub fn new(path: PathBuf, rel_path: PathBuf, color_space: ColorSpace, has_profile: bool) -> Self {
        Self {
            path,
            rel_path,
            color_space,
            has_profile,
            mutated: false,
        }
    }
}

/// Why an archive was skipped without being modified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The file is not a readable zip container
    NotAnArchive,
    /// The root-level `mimetype` marker is absent
    MissingTypeMarker,
    /// The `mimetype` marker carries unexpected content
    TypeMismatch,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnArchive => write!(f, "not a zip archive"),
            Self::MissingTypeMarker => write!(f, "missing mimetype marker"),
            Self::TypeMismatch => write!(f, "mimetype mismatch"),
        }
    }
}

/// Terminal state of the per-archive pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArchiveOutcome {
    /// At least one asset was mutated and the archive was rebuilt
    Repacked,
    /// No asset was eligible; the archive is byte-for-byte untouched
    Unchanged,
    /// Validation failed; the archive was not modified
    Skipped(SkipReason),
}

/// Per-archive result of a correction run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionResult {
    /// Number of image assets that received the reference profile
    pub images_changed: usize,
    /// Terminal pipeline state
    pub outcome: ArchiveOutcome,
}

impl CorrectionResult {
    /// Result for an archive left untouched with no eligible assets
    #[must_use]
    pub fn unchanged() -> Self {
        Self {
            images_changed: 0,
            outcome: ArchiveOutcome::Unchanged,
        }
    }

    /// Result for an archive rebuilt after `images_changed` injections
    #[must_use]
    pub fn repacked(images_changed: usize) -> Self {
        Self {
            images_changed,
            outcome: ArchiveOutcome::Repacked,
        }
    }

    /// Result for an archive skipped during validation
    #[must_use]
    pub fn skipped(reason: SkipReason) -> Self {
        Self {
            images_changed: 0,
            outcome: ArchiveOutcome::Skipped(reason),
        }
    }

    /// Whether the archive file on disk was rewritten
    #[must_use]
    pub fn rewritten(&self) -> bool {
        self.outcome == ArchiveOutcome::Repacked
    }
}
