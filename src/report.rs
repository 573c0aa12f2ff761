//! Run report classification and failure diagnostics
//!
//! The harness writes one aggregate run report plus a per-instance report
//! under its evaluation log tree. Classification partitions the batch into
//! resolved vs. failed and, for each failure, digs the still-failing test
//! names out of the instance report. Instance reports are best effort: an
//! absent or unreadable one degrades to a diagnostic line, never an error.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::datapoint::{FAIL_TO_PASS, PASS_TO_PASS};
use crate::error::ValidationError;

/// File name of the per-instance report inside its log directory.
pub const LOG_REPORT: &str = "report.json";

/// Aggregate run report produced by the harness.
///
/// Every submitted instance lands in exactly one primary fate category;
/// the harness may additionally list an instance in several failure
/// categories at once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    #[serde(default)]
    pub resolved_ids: Vec<String>,
    #[serde(default)]
    pub unresolved_ids: Vec<String>,
    #[serde(default)]
    pub error_ids: Vec<String>,
    #[serde(default)]
    pub incomplete_ids: Vec<String>,
    #[serde(default)]
    pub empty_patch_ids: Vec<String>,
    #[serde(default)]
    pub completed_ids: Vec<String>,
}

impl RunReport {
    /// Load a run report from disk.
    pub fn load(path: &Path) -> Result<Self, ValidationError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ValidationError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| ValidationError::MalformedInput {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Union of every failure category, deduplicated, in stable order.
    pub fn failures(&self) -> BTreeSet<String> {
        self.unresolved_ids
            .iter()
            .chain(&self.error_ids)
            .chain(&self.incomplete_ids)
            .chain(&self.empty_patch_ids)
            .cloned()
            .collect()
    }
}

/// Pass/fail breakdown for one test category of one instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryStatus {
    #[serde(default)]
    pub failure: Vec<String>,
    #[serde(default)]
    pub success: Vec<String>,
}

/// Per-instance evaluation report.
///
/// The report file maps instance_id to this document; categories beyond
/// `FAIL_TO_PASS` / `PASS_TO_PASS` are carried but not interpreted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceReport {
    #[serde(default)]
    pub tests_status: HashMap<String, CategoryStatus>,
}

/// Successful validation outcome handed back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub run_id: String,
    pub report_path: PathBuf,
    pub resolved_ids: Vec<String>,
    pub completed_ids: Vec<String>,
}

/// Partition a run report into a success summary or a `ValidationFailed`
/// enumerating every failing instance.
pub fn classify_run(
    report: &RunReport,
    report_path: &Path,
    run_id: &str,
    model: &str,
    log_dir: &Path,
) -> Result<ValidationSummary, ValidationError> {
    let failures = report.failures();
    if failures.is_empty() {
        return Ok(ValidationSummary {
            run_id: run_id.to_string(),
            report_path: report_path.to_path_buf(),
            resolved_ids: report.resolved_ids.clone(),
            completed_ids: report.completed_ids.clone(),
        });
    }

    debug!(failing = failures.len(), "collecting per-instance diagnostics");
    let details = format_failure_details(&failures, log_dir, run_id, model);
    Err(ValidationError::ValidationFailed {
        details: details.join("\n"),
    })
}

/// Render one diagnostic line per failing instance.
pub fn format_failure_details(
    failures: &BTreeSet<String>,
    log_dir: &Path,
    run_id: &str,
    model: &str,
) -> Vec<String> {
    let mut messages = Vec::with_capacity(failures.len());
    for instance_id in failures {
        let Some(report) = read_instance_report(log_dir, run_id, model, instance_id) else {
            messages.push(format!("{instance_id}: no report produced"));
            continue;
        };

        let mut details = Vec::new();
        if let Some(status) = report.tests_status.get(FAIL_TO_PASS) {
            if !status.failure.is_empty() {
                details.push(format!("{FAIL_TO_PASS} failed: {}", status.failure.join(", ")));
            }
        }
        if let Some(status) = report.tests_status.get(PASS_TO_PASS) {
            if !status.failure.is_empty() {
                details.push(format!("{PASS_TO_PASS} failed: {}", status.failure.join(", ")));
            }
        }
        if details.is_empty() {
            details.push("see run logs for details".to_string());
        }
        messages.push(format!("{instance_id}: {}", details.join("; ")));
    }
    messages
}

/// Where the harness writes one instance's evaluation log for one run.
fn instance_report_path(log_dir: &Path, run_id: &str, model: &str, instance_id: &str) -> PathBuf {
    log_dir
        .join(run_id)
        .join(model.replace('/', "__"))
        .join(instance_id)
        .join(LOG_REPORT)
}

/// Best-effort read of one instance's report.
fn read_instance_report(
    log_dir: &Path,
    run_id: &str,
    model: &str,
    instance_id: &str,
) -> Option<InstanceReport> {
    let path = instance_report_path(log_dir, run_id, model, instance_id);
    let content = std::fs::read_to_string(&path).ok()?;
    let mut reports: HashMap<String, InstanceReport> = match serde_json::from_str(&content) {
        Ok(reports) => reports,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable instance report");
            return None;
        }
    };
    reports.remove(instance_id)
}
