//! Error types for ePub image correction operations

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::SkipReason;

/// Result type alias for correction operations
pub type Result<T> = std::result::Result<T, RepairError>;

/// Comprehensive error types for ePub image correction
#[derive(Error, Debug)]
pub enum RepairError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image format or processing errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// The reference color profile could not be loaded
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// The candidate file is not a readable zip container
    #[error("'{path}' is not a zip archive: {reason}", path = .path.display())]
    NotAnArchive {
        /// Path of the rejected archive
        path: PathBuf,
        /// Underlying zip error message
        reason: String,
    },

    /// No `mimetype` marker at the archive root
    #[error("'{path}' has no mimetype marker, file is probably corrupted", path = .path.display())]
    MissingTypeMarker {
        /// Path of the rejected archive
        path: PathBuf,
    },

    /// The `mimetype` marker does not declare an ePub
    #[error("'{path}' is not an application/epub+zip file (mimetype: '{found}')", path = .path.display())]
    TypeMismatch {
        /// Path of the rejected archive
        path: PathBuf,
        /// Marker content actually found
        found: String,
    },

    /// A single image asset could not be inspected
    #[error("failed to inspect image '{path}': {reason}", path = .path.display())]
    AssetRead {
        /// Path of the unreadable asset
        path: PathBuf,
        /// Human-readable cause
        reason: String,
    },

    /// Injection or persist failed on a single image asset
    #[error("failed to update image '{path}': {reason}", path = .path.display())]
    AssetWrite {
        /// Path of the asset that could not be written
        path: PathBuf,
        /// Human-readable cause
        reason: String,
    },

    /// The archive rewrite failed; the original file is left untouched
    #[error("failed to repack archive '{path}': {reason}", path = .path.display())]
    Repack {
        /// Path of the archive that was being rebuilt
        path: PathBuf,
        /// Human-readable cause
        reason: String,
    },

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RepairError {
    /// Create a new invalid profile error
    pub fn invalid_profile<S: Into<String>>(msg: S) -> Self {
        Self::InvalidProfile(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a not-an-archive error from the underlying zip failure
    pub fn not_an_archive<P: AsRef<Path>>(path: P, error: &zip::result::ZipError) -> Self {
        Self::NotAnArchive {
            path: path.as_ref().to_path_buf(),
            reason: error.to_string(),
        }
    }

    /// Create an asset read error with path context
    pub fn asset_read<P: AsRef<Path>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::AssetRead {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Create an asset write error with path context
    pub fn asset_write<P: AsRef<Path>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::AssetWrite {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Create a repack error with path context
    pub fn repack<P: AsRef<Path>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::Repack {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Map archive-level validation failures to their skip reason.
    ///
    /// Validation failures skip the archive without failing the batch;
    /// every other error kind is surfaced to the caller.
    #[must_use]
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::NotAnArchive { .. } => Some(SkipReason::NotAnArchive),
            Self::MissingTypeMarker { .. } => Some(SkipReason::MissingTypeMarker),
            Self::TypeMismatch { .. } => Some(SkipReason::TypeMismatch),
            _ => None,
        }
    }
}
