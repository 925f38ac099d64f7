//! Conditional injection of the reference profile into image assets

use crate::codec::ImageCodec;
use crate::config::RepairConfig;
use crate::error::Result;
use crate::profile::ReferenceProfile;
use crate::types::{ColorSpace, ImageAsset};

/// Injects the reference profile into eligible assets.
///
/// An asset is eligible iff its color space is CMYK and it carries no
/// embedded profile, or the `force` option is set, in which case an
/// existing profile on a CMYK asset is replaced. Non-CMYK assets are never
/// touched.
pub struct ProfileInjector<'a> {
    codec: &'a dyn ImageCodec,
    profile: &'a ReferenceProfile,
    force: bool,
}

impl<'a> ProfileInjector<'a> {
    /// Create an injector for one pipeline run
    #[must_use]
    pub fn new(codec: &'a dyn ImageCodec, profile: &'a ReferenceProfile, config: &RepairConfig) -> Self {
        Self {
            codec,
            profile,
            force: config.force,
        }
    }

    /// Whether `asset` qualifies for injection under the current config
    #[must_use]
    pub fn is_eligible(&self, asset: &ImageAsset) -> bool {
        asset.color_space == ColorSpace::Cmyk && (!asset.has_profile || self.force)
    }

    /// Inject the reference profile into `asset` if it is eligible.
    ///
    /// On injection the asset file is rewritten in place inside the
    /// extraction root (the archive itself is untouched at this point)
    /// and the asset is marked mutated. Returns whether the asset was
    /// changed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RepairError::AssetWrite`] when the asset cannot be
    /// persisted; the asset is left unmarked.
    pub fn inject(&self, asset: &mut ImageAsset) -> Result<bool> {
        if !self.is_eligible(asset) {
            return Ok(false);
        }

        self.codec.write_profile(&asset.path, self.profile.bytes())?;
        asset.has_profile = true;
        asset.mutated = true;
        Ok(true)
    }
}
