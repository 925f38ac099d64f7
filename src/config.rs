//! Configuration for correction runs
//!
//! The configuration is an explicit value threaded into the pipeline and
//! injector rather than ambient process state, so concurrent batches can
//! run with different settings and tests need no global fixtures.

use serde::{Deserialize, Serialize};

/// Configuration for a correction run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairConfig {
    /// Replace the profile of CMYK images that already carry one.
    ///
    /// Off by default: normally only CMYK images *without* an embedded
    /// profile are corrected.
    pub force: bool,

    /// Recurse into subdirectories when the input is a directory
    pub recursive: bool,

    /// Optional filename glob applied during directory discovery
    pub pattern: Option<String>,

    /// Worker pool size for batch processing (0 = auto-detect)
    pub threads: usize,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            force: false,
            recursive: false,
            pattern: None,
            threads: 0,
        }
    }
}

impl RepairConfig {
    /// Create a new configuration builder for fluent construction
    #[must_use]
    pub fn builder() -> RepairConfigBuilder {
        RepairConfigBuilder::new()
    }
}

/// Builder for [`RepairConfig`]
#[derive(Debug, Default)]
pub struct RepairConfigBuilder {
    config: RepairConfig,
}

impl RepairConfigBuilder {
    /// Start from the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override eligibility for CMYK images that already carry a profile
    #[must_use]
    pub fn force(mut self, force: bool) -> Self {
        self.config.force = force;
        self
    }

    /// Recurse into subdirectories during discovery
    #[must_use]
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.config.recursive = recursive;
        self
    }

    /// Filename glob applied during directory discovery
    #[must_use]
    pub fn pattern<S: Into<String>>(mut self, pattern: S) -> Self {
        self.config.pattern = Some(pattern.into());
        self
    }

    /// Worker pool size for batch processing (0 = auto-detect)
    #[must_use]
    pub fn threads(mut self, threads: usize) -> Self {
        self.config.threads = threads;
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> RepairConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_force_is_off_by_default() {
        assert!(!RepairConfig::default().force);
        assert!(!RepairConfig::builder().build().force);
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = RepairConfig::builder()
            .force(true)
            .recursive(true)
            .pattern("*.epub")
            .threads(4)
            .build();

        assert!(config.force);
        assert!(config.recursive);
        assert_eq!(config.pattern.as_deref(), Some("*.epub"));
        assert_eq!(config.threads, 4);
    }
}
