//! Validation orchestration
//!
//! One invocation drives a single batch through the pipeline: preflight,
//! normalization, materialization, the harness call, classification. Each
//! stage failure is terminal; there are no retries and no partial
//! successes — the failure message enumerates per-instance detail instead.

use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::artifacts::{write_run_artifacts, MODEL_NAME};
use crate::config::ValidatorConfig;
use crate::datapoint::DataPoint;
use crate::docker::{ContainerRuntime, DockerRuntime};
use crate::error::ValidationError;
use crate::harness::{invoke_harness, EvaluationHarness, HarnessRequest, SweBenchCli};
use crate::report::{classify_run, RunReport, ValidationSummary};

/// Batch validator wired to a container runtime probe and an evaluation
/// harness implementation.
pub struct Validator {
    runtime: Arc<dyn ContainerRuntime>,
    harness: Arc<dyn EvaluationHarness>,
    config: ValidatorConfig,
}

impl Validator {
    /// Validator backed by the local Docker daemon and the SWE-bench CLI.
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            runtime: Arc::new(DockerRuntime),
            harness: Arc::new(SweBenchCli::new()),
            config,
        }
    }

    /// Validator with explicit collaborators, for tests and embedders.
    pub fn with_backends(
        config: ValidatorConfig,
        runtime: Arc<dyn ContainerRuntime>,
        harness: Arc<dyn EvaluationHarness>,
    ) -> Self {
        Self {
            runtime,
            harness,
            config,
        }
    }

    /// Validate a batch of data point files end to end.
    ///
    /// The preflight probe runs before anything touches disk, so an
    /// unreachable runtime leaves no artifacts behind. The first
    /// normalization failure aborts the whole batch.
    pub async fn run(&self, paths: &[PathBuf]) -> Result<ValidationSummary, ValidationError> {
        if paths.is_empty() {
            return Err(ValidationError::EmptyBatch);
        }

        self.runtime.ping().await?;

        let mut datapoints = Vec::with_capacity(paths.len());
        for path in paths {
            datapoints.push(DataPoint::load(path)?);
        }
        info!(count = datapoints.len(), "normalized data points");

        let run_id = self
            .config
            .run_id
            .clone()
            .unwrap_or_else(|| format!("validator-{}", Utc::now().timestamp()));

        let artifacts = write_run_artifacts(&datapoints, &run_id, &self.config.workdir)?;

        let request = HarnessRequest {
            dataset_path: artifacts.dataset_path,
            predictions_path: artifacts.predictions_path,
            instance_ids: datapoints.iter().map(|dp| dp.instance_id.clone()).collect(),
            run_id: run_id.clone(),
            config: self.config.clone(),
        };
        let report_path = invoke_harness(self.harness.as_ref(), &request).await?;

        let report = RunReport::load(&report_path)?;
        let summary = classify_run(
            &report,
            &report_path,
            &run_id,
            MODEL_NAME,
            &self.config.log_dir,
        )?;
        info!(
            run_id = %summary.run_id,
            resolved = summary.resolved_ids.len(),
            "validation succeeded"
        );
        Ok(summary)
    }
}
