//! Validation run configuration
//!
//! Surfaces every knob the evaluation harness accepts, with the defaults
//! the upstream SWE-bench CLI documents. Callers usually start from
//! `Default` and override a field or two.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Docker image cache retention level understood by the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "snake_case")]
pub enum CacheLevel {
    None,
    Base,
    #[default]
    Env,
    Instance,
}

impl CacheLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheLevel::None => "none",
            CacheLevel::Base => "base",
            CacheLevel::Env => "env",
            CacheLevel::Instance => "instance",
        }
    }
}

/// Configuration for one validation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Timeout (seconds) for each instance test run inside the harness.
    pub timeout_secs: u64,
    /// Maximum parallel workers for harness execution.
    pub max_workers: usize,
    /// Harness cache level for Docker images.
    pub cache_level: CacheLevel,
    /// Remove images above the cache level after the run.
    pub clean: bool,
    /// Force rebuild all images (disables cache reuse).
    pub force_rebuild: bool,
    /// Docker namespace; `None` disables namespacing.
    pub namespace: Option<String>,
    /// Tag used for instance images built by the harness.
    pub instance_image_tag: String,
    /// File descriptor limit for the harness (Linux only).
    pub open_file_limit: u64,
    /// Run identifier; a timestamped value is derived when absent.
    pub run_id: Option<String>,
    /// Directory where dataset/prediction files and the run report land.
    pub workdir: PathBuf,
    /// Root of the harness's per-instance evaluation logs.
    pub log_dir: PathBuf,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 1200,
            max_workers: 2,
            cache_level: CacheLevel::default(),
            clean: false,
            force_rebuild: false,
            namespace: Some("swebench".to_string()),
            instance_image_tag: "latest".to_string(),
            open_file_limit: 4096,
            run_id: None,
            workdir: PathBuf::from(".swe-bench-validator"),
            log_dir: PathBuf::from("logs/run_evaluation"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ValidatorConfig::default();
        assert_eq!(config.timeout_secs, 1200);
        assert_eq!(config.max_workers, 2);
        assert_eq!(config.cache_level, CacheLevel::Env);
        assert!(!config.clean);
        assert!(!config.force_rebuild);
        assert_eq!(config.namespace.as_deref(), Some("swebench"));
        assert_eq!(config.instance_image_tag, "latest");
        assert_eq!(config.open_file_limit, 4096);
        assert!(config.run_id.is_none());
        assert_eq!(config.workdir, PathBuf::from(".swe-bench-validator"));
    }

    #[test]
    fn test_cache_level_serialization() {
        let json = serde_json::to_string(&CacheLevel::Env).unwrap();
        assert_eq!(json, r#""env""#);

        let deserialized: CacheLevel = serde_json::from_str(r#""instance""#).unwrap();
        assert_eq!(deserialized, CacheLevel::Instance);
        assert_eq!(deserialized.as_str(), "instance");
    }
}
