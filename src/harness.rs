//! External evaluation harness boundary
//!
//! Repository checkout, patch application, image builds, and test
//! execution all happen inside the SWE-bench harness. This module owns
//! the request shape and the subprocess implementation; the rest of the
//! crate talks to the `EvaluationHarness` trait, so tests substitute a
//! fake and never need the harness installed.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::artifacts::MODEL_NAME;
use crate::config::ValidatorConfig;
use crate::error::ValidationError;

/// Dataset split submitted to the harness.
pub const SPLIT: &str = "test";

/// One harness submission: artifact locations plus run configuration.
///
/// `instance_ids` is the explicit allow-list — exactly the batch under
/// validation. The harness must not pick up unrelated instances from a
/// larger dataset file.
#[derive(Debug, Clone)]
pub struct HarnessRequest {
    pub dataset_path: PathBuf,
    pub predictions_path: PathBuf,
    pub instance_ids: Vec<String>,
    pub run_id: String,
    pub config: ValidatorConfig,
}

/// Capability interface over the external evaluation engine.
///
/// `Ok(Some(path))` is the run report location the harness claims to have
/// written; `Ok(None)` means it finished without reporting one. Internal
/// concurrency, image caching, and per-instance timeouts are the
/// implementation's own business.
#[async_trait]
pub trait EvaluationHarness: Send + Sync {
    async fn run(&self, request: &HarnessRequest) -> Result<Option<PathBuf>>;
}

/// Submit a request and resolve the run report location.
///
/// Any harness error is wrapped with the batch size; a missing or absent
/// report file is a distinct condition from a harness-raised failure.
pub async fn invoke_harness(
    harness: &dyn EvaluationHarness,
    request: &HarnessRequest,
) -> Result<PathBuf, ValidationError> {
    let report_path = match harness.run(request).await {
        Ok(path) => path,
        Err(cause) => {
            error!(instances = request.instance_ids.len(), "harness run failed");
            return Err(ValidationError::HarnessExecution {
                instances: request.instance_ids.len(),
                cause,
            });
        }
    };

    match report_path {
        Some(path) if path.exists() => Ok(path),
        _ => Err(ValidationError::ReportMissing),
    }
}

/// Harness implementation that shells out to the SWE-bench CLI.
pub struct SweBenchCli {
    python: String,
}

impl SweBenchCli {
    pub fn new() -> Self {
        Self {
            python: "python3".to_string(),
        }
    }

    /// Override the Python interpreter used to launch the harness.
    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        self.python = python.into();
        self
    }
}

impl Default for SweBenchCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EvaluationHarness for SweBenchCli {
    async fn run(&self, request: &HarnessRequest) -> Result<Option<PathBuf>> {
        let config = &request.config;

        let mut command = Command::new(&self.python);
        command
            .arg("-m")
            .arg("swebench.harness.run_evaluation")
            .arg("--dataset_name")
            .arg(&request.dataset_path)
            .arg("--split")
            .arg(SPLIT)
            .arg("--predictions_path")
            .arg(&request.predictions_path)
            .arg("--instance_ids")
            .args(&request.instance_ids)
            .arg("--max_workers")
            .arg(config.max_workers.to_string())
            .arg("--force_rebuild")
            .arg(config.force_rebuild.to_string())
            .arg("--cache_level")
            .arg(config.cache_level.as_str())
            .arg("--clean")
            .arg(config.clean.to_string())
            .arg("--open_file_limit")
            .arg(config.open_file_limit.to_string())
            .arg("--run_id")
            .arg(&request.run_id)
            .arg("--timeout")
            .arg(config.timeout_secs.to_string())
            .arg("--instance_image_tag")
            .arg(&config.instance_image_tag)
            .arg("--report_dir")
            .arg(&config.workdir);
        if let Some(namespace) = &config.namespace {
            command.arg("--namespace").arg(namespace);
        }

        info!(
            run_id = %request.run_id,
            instances = request.instance_ids.len(),
            "submitting batch to evaluation harness"
        );
        debug!(?command, "harness invocation");

        let output = command
            .output()
            .await
            .context("failed to launch evaluation harness")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "evaluation harness exited with {}: {}",
                output.status,
                stderr_tail(&stderr)
            );
        }

        Ok(Some(
            config.workdir.join(format!("{MODEL_NAME}.{}.json", request.run_id)),
        ))
    }
}

/// Harness stderr can run to thousands of lines of build output; the
/// failure cause is at the end.
fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.trim().lines().collect();
    let start = lines.len().saturating_sub(20);
    lines[start..].join("\n")
}
