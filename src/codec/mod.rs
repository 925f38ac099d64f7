//! Image codec capability
//!
//! The pipeline talks to image assets through the [`ImageCodec`] trait:
//! open an asset, read its color space and profile presence, and read or
//! replace the embedded profile. Keeping the capability behind a trait
//! keeps the correction logic independent of a specific image backend.
//!
//! [`MarkerCodec`] is the default implementation. It works at the container
//! level (JPEG marker segments, PNG chunks), so profile injection never
//! re-encodes image data.

mod jpeg;
mod png;

use crate::error::{RepairError, Result};
use crate::types::ColorSpace;
use std::path::Path;

/// What inspection learned about one image asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    /// Detected color space
    pub color_space: ColorSpace,
    /// Whether an ICC profile is embedded
    pub has_profile: bool,
}

/// Capability for inspecting and updating embedded color profiles
pub trait ImageCodec: Send + Sync {
    /// Read the color space and profile presence of the asset at `path`
    ///
    /// # Errors
    ///
    /// Returns [`RepairError::AssetRead`] when the file cannot be read or
    /// is not a recognizable image of a supported format.
    fn inspect(&self, path: &Path) -> Result<ImageInfo>;

    /// Read the embedded ICC profile of the asset at `path`, if any
    ///
    /// # Errors
    ///
    /// Returns [`RepairError::AssetRead`] when the file cannot be read or
    /// parsed.
    fn read_profile(&self, path: &Path) -> Result<Option<Vec<u8>>>;

    /// Replace the embedded ICC profile of the asset at `path` with `icc`
    /// and persist the asset to its original location
    ///
    /// # Errors
    ///
    /// Returns [`RepairError::AssetWrite`] when the asset cannot be
    /// rewritten.
    fn write_profile(&self, path: &Path, icc: &[u8]) -> Result<()>;
}

/// Supported container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageFormat {
    Jpeg,
    Png,
}

fn format_for(path: &Path) -> Option<ImageFormat> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("jpg" | "jpeg") => Some(ImageFormat::Jpeg),
        Some("png") => Some(ImageFormat::Png),
        _ => None,
    }
}

/// Default container-level codec for JPEG and PNG assets
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkerCodec;

impl MarkerCodec {
    /// Create a new codec instance
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ImageCodec for MarkerCodec {
    fn inspect(&self, path: &Path) -> Result<ImageInfo> {
        let format = format_for(path)
            .ok_or_else(|| RepairError::asset_read(path, "unsupported image format"))?;
        let data =
            std::fs::read(path).map_err(|e| RepairError::asset_read(path, e.to_string()))?;

        match format {
            ImageFormat::Jpeg => jpeg::inspect(&data),
            ImageFormat::Png => png::inspect(&data),
        }
        .map_err(|reason| RepairError::asset_read(path, reason))
    }

    fn read_profile(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        let format = format_for(path)
            .ok_or_else(|| RepairError::asset_read(path, "unsupported image format"))?;
        let data =
            std::fs::read(path).map_err(|e| RepairError::asset_read(path, e.to_string()))?;

        match format {
            ImageFormat::Jpeg => jpeg::read_profile(&data),
            ImageFormat::Png => png::read_profile(&data),
        }
        .map_err(|reason| RepairError::asset_read(path, reason))
    }

    fn write_profile(&self, path: &Path, icc: &[u8]) -> Result<()> {
        let format = format_for(path)
            .ok_or_else(|| RepairError::asset_write(path, "unsupported image format"))?;
        let data =
            std::fs::read(path).map_err(|e| RepairError::asset_write(path, e.to_string()))?;

        let updated = match format {
            ImageFormat::Jpeg => jpeg::embed_profile(&data, icc),
            ImageFormat::Png => png::embed_profile(&data, icc),
        }
        .map_err(|reason| RepairError::asset_write(path, reason))?;

        std::fs::write(path, updated).map_err(|e| RepairError::asset_write(path, e.to_string()))
    }
}
