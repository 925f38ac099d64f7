//! Reference ICC profile loading

use crate::error::{RepairError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The reference ICC profile injected into eligible assets.
///
/// Loaded once per run and shared read-only across all injections; the
/// bytes are treated as an opaque blob and never parsed.
#[derive(Debug, Clone)]
pub struct ReferenceProfile {
    data: Arc<[u8]>,
    source: PathBuf,
}

impl ReferenceProfile {
    /// Load the reference profile from an `.icc` file.
    ///
    /// # Errors
    ///
    /// Returns [`RepairError::InvalidProfile`] when the path does not
    /// reference a readable `.icc` file or the file is empty.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.extension().and_then(|ext| ext.to_str()) != Some("icc") {
            return Err(RepairError::invalid_profile(format!(
                "'{}' is not a .icc file",
                path.display()
            )));
        }

        let data = std::fs::read(path).map_err(|e| {
            RepairError::invalid_profile(format!("cannot read '{}': {e}", path.display()))
        })?;

        if data.is_empty() {
            return Err(RepairError::invalid_profile(format!(
                "'{}' is empty",
                path.display()
            )));
        }

        Ok(Self {
            data: data.into(),
            source: path.to_path_buf(),
        })
    }

    /// Raw profile bytes
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Size of the profile data in bytes
    #[must_use]
    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    /// Path the profile was loaded from
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.txt");
        std::fs::write(&path, b"not icc").unwrap();

        let err = ReferenceProfile::load(&path).unwrap_err();
        assert!(matches!(err, RepairError::InvalidProfile(_)));
    }

    #[test]
    fn test_rejects_missing_file() {
        let err = ReferenceProfile::load("no/such/profile.icc").unwrap_err();
        assert!(matches!(err, RepairError::InvalidProfile(_)));
    }

    #[test]
    fn test_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.icc");
        std::fs::write(&path, b"").unwrap();

        let err = ReferenceProfile::load(&path).unwrap_err();
        assert!(matches!(err, RepairError::InvalidProfile(_)));
    }

    #[test]
    fn test_loads_profile_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmyk.icc");
        std::fs::write(&path, b"fake cmyk profile").unwrap();

        let profile = ReferenceProfile::load(&path).unwrap();
        assert_eq!(profile.bytes(), b"fake cmyk profile");
        assert_eq!(profile.data_size(), 17);
        assert_eq!(profile.source(), path);
    }

    #[test]
    fn test_clone_shares_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmyk.icc");
        std::fs::write(&path, b"shared").unwrap();

        let profile = ReferenceProfile::load(&path).unwrap();
        let clone = profile.clone();
        assert_eq!(profile.bytes(), clone.bytes());
    }
}
