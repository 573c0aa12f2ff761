//! Run workspace materialization
//!
//! The evaluation harness consumes two files per run: the dataset (full
//! data point payloads) and the predictions (one gold-patch entry per
//! instance). Both are namespaced by run_id so artifacts from distinct
//! runs never collide.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::datapoint::DataPoint;
use crate::error::ValidationError;

/// Model label attached to every prediction written by this tool.
pub const MODEL_NAME: &str = "validator";

/// One entry of the predictions artifact, in SWE-bench prediction format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub instance_id: String,
    #[serde(rename = "model_patch")]
    pub patch: String,
    #[serde(rename = "model_name_or_path")]
    pub model: String,
}

/// Locations of the materialized artifacts for one run.
#[derive(Debug, Clone)]
pub struct RunArtifacts {
    pub dataset_path: PathBuf,
    pub predictions_path: PathBuf,
}

/// Write the dataset and predictions files for a batch under `workdir`.
///
/// Directory creation is idempotent; output order matches input order.
/// The prediction for each data point is its own patch, so a resolved
/// instance proves the gold patch makes the expected tests pass.
pub fn write_run_artifacts(
    datapoints: &[DataPoint],
    run_id: &str,
    workdir: &Path,
) -> Result<RunArtifacts, ValidationError> {
    std::fs::create_dir_all(workdir).map_err(|e| ValidationError::io(workdir, e))?;

    let dataset_path = workdir.join(format!("dataset.{run_id}.json"));
    let predictions_path = workdir.join(format!("predictions.{run_id}.json"));

    let predictions: Vec<Prediction> = datapoints
        .iter()
        .map(|dp| Prediction {
            instance_id: dp.instance_id.clone(),
            patch: dp.patch.clone(),
            model: MODEL_NAME.to_string(),
        })
        .collect();

    write_json(&dataset_path, datapoints)?;
    write_json(&predictions_path, &predictions)?;

    debug!(
        dataset = %dataset_path.display(),
        predictions = %predictions_path.display(),
        "materialized run artifacts"
    );

    Ok(RunArtifacts {
        dataset_path,
        predictions_path,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ValidationError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ValidationError::io(path, std::io::Error::other(e)))?;
    std::fs::write(path, json).map_err(|e| ValidationError::io(path, e))
}
