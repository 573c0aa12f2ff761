//! Data point loading and schema normalization
//!
//! SWE-bench records in the wild encode `FAIL_TO_PASS` / `PASS_TO_PASS`
//! either as native JSON arrays or as strings containing a serialized
//! array. Loading resolves both shapes into `Vec<String>` exactly once;
//! nothing downstream ever sees the ambiguous form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::ValidationError;

/// Wire name of the fail-to-pass test list.
pub const FAIL_TO_PASS: &str = "FAIL_TO_PASS";
/// Wire name of the pass-to-pass test list.
pub const PASS_TO_PASS: &str = "PASS_TO_PASS";

const REQUIRED_FIELDS: [&str; 4] = ["repo", "base_commit", "patch", "instance_id"];

/// One normalized software-repair task record.
///
/// Serializing a `DataPoint` reproduces the full source payload with the
/// test lists in canonical array form; fields beyond the typed ones pass
/// through untouched via `extra` (the harness consumes several of them,
/// e.g. `test_patch` and `environment_setup_commit`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub instance_id: String,
    pub repo: String,
    pub base_commit: String,
    pub patch: String,
    #[serde(rename = "FAIL_TO_PASS")]
    pub fail_to_pass: Vec<String>,
    #[serde(rename = "PASS_TO_PASS")]
    pub pass_to_pass: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DataPoint {
    /// Load and normalize a single data point JSON file.
    pub fn load(path: &Path) -> Result<Self, ValidationError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ValidationError::io(path, e))?;
        Self::from_json(&content, path)
    }

    /// Normalize raw JSON content into a data point.
    ///
    /// `path` is only used for error reporting.
    pub fn from_json(content: &str, path: &Path) -> Result<Self, ValidationError> {
        let payload: Value =
            serde_json::from_str(content).map_err(|e| ValidationError::MalformedInput {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let Value::Object(mut payload) = payload else {
            return Err(ValidationError::MalformedInput {
                path: path.to_path_buf(),
                reason: "expected a JSON object".to_string(),
            });
        };

        for field in REQUIRED_FIELDS {
            ensure_present(&payload, field, path)?;
        }

        let repo = take_string(&mut payload, "repo");
        let base_commit = take_string(&mut payload, "base_commit");
        let patch = take_string(&mut payload, "patch");
        let instance_id = take_string(&mut payload, "instance_id");

        let fail_to_pass = normalize_test_list(payload.remove(FAIL_TO_PASS), FAIL_TO_PASS, path)?;
        let pass_to_pass = normalize_test_list(payload.remove(PASS_TO_PASS), PASS_TO_PASS, path)?;

        Ok(Self {
            instance_id,
            repo,
            base_commit,
            patch,
            fail_to_pass,
            pass_to_pass,
            extra: payload,
        })
    }
}

fn ensure_present(
    payload: &Map<String, Value>,
    field: &str,
    path: &Path,
) -> Result<(), ValidationError> {
    match payload.get(field) {
        None | Some(Value::Null) => Err(ValidationError::missing_field(field, path)),
        Some(Value::String(s)) if s.is_empty() => Err(ValidationError::missing_field(field, path)),
        Some(_) => Ok(()),
    }
}

/// Presence was checked up front, so the removal cannot miss; non-string
/// scalars are carried through their JSON rendering.
fn take_string(payload: &mut Map<String, Value>, field: &str) -> String {
    match payload.remove(field) {
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Normalize a `FAIL_TO_PASS` / `PASS_TO_PASS` value to a list of test names.
///
/// Accepts a native list or a string that itself deserializes to a list.
fn normalize_test_list(
    raw: Option<Value>,
    field: &str,
    path: &Path,
) -> Result<Vec<String>, ValidationError> {
    match raw {
        None | Some(Value::Null) => Err(ValidationError::missing_field(field, path)),
        Some(Value::Array(items)) => Ok(items.iter().map(element_to_string).collect()),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(&s) {
            Ok(Value::Array(items)) => Ok(items.iter().map(element_to_string).collect()),
            _ => Err(ValidationError::InvalidFieldType {
                field: field.to_string(),
                path: path.to_path_buf(),
            }),
        },
        Some(_) => Err(ValidationError::InvalidFieldType {
            field: field.to_string(),
            path: path.to_path_buf(),
        }),
    }
}

fn element_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn fixture_path() -> PathBuf {
        PathBuf::from("dp/sample.json")
    }

    fn sample_payload() -> Value {
        json!({
            "instance_id": "astropy__astropy-12907",
            "repo": "astropy/astropy",
            "base_commit": "d16bfe05a744909de4b27f5875fe0d4ed41ce607",
            "patch": "diff --git a/astropy/modeling/separable.py b/astropy/modeling/separable.py\n",
            "FAIL_TO_PASS": ["test_separable[compound_model6-result6]"],
            "PASS_TO_PASS": ["test_coord_matrix", "test_cdot"],
            "test_patch": "diff --git a/astropy/modeling/tests/test_separable.py\n",
            "version": "4.3"
        })
    }

    fn load(payload: &Value) -> Result<DataPoint, ValidationError> {
        DataPoint::from_json(&payload.to_string(), &fixture_path())
    }

    #[test]
    fn test_load_native_lists() {
        let dp = load(&sample_payload()).unwrap();
        assert_eq!(dp.instance_id, "astropy__astropy-12907");
        assert_eq!(dp.repo, "astropy/astropy");
        assert_eq!(
            dp.fail_to_pass,
            vec!["test_separable[compound_model6-result6]"]
        );
        assert_eq!(dp.pass_to_pass, vec!["test_coord_matrix", "test_cdot"]);
    }

    #[test]
    fn test_load_json_string_lists() {
        let mut payload = sample_payload();
        payload["FAIL_TO_PASS"] = json!(r#"["a", "b"]"#);
        payload["PASS_TO_PASS"] = json!("[]");

        let dp = load(&payload).unwrap();
        assert_eq!(dp.fail_to_pass, vec!["a", "b"]);
        assert!(dp.pass_to_pass.is_empty());
    }

    #[test]
    fn test_list_elements_coerced_to_strings() {
        let mut payload = sample_payload();
        payload["FAIL_TO_PASS"] = json!([1, true, "a"]);

        let dp = load(&payload).unwrap();
        assert_eq!(dp.fail_to_pass, vec!["1", "true", "a"]);
    }

    #[test]
    fn test_non_json_string_list_is_invalid_field_type() {
        let mut payload = sample_payload();
        payload["FAIL_TO_PASS"] = json!("not json");

        let err = load(&payload).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidFieldType { ref field, .. } if field == FAIL_TO_PASS
        ));
    }

    #[test]
    fn test_string_encoding_non_list_is_invalid_field_type() {
        let mut payload = sample_payload();
        payload["PASS_TO_PASS"] = json!(r#"{"a": 1}"#);

        let err = load(&payload).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidFieldType { ref field, .. } if field == PASS_TO_PASS
        ));
    }

    #[test]
    fn test_null_list_is_missing_field() {
        let mut payload = sample_payload();
        payload["FAIL_TO_PASS"] = Value::Null;

        let err = load(&payload).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::MissingField { ref field, .. } if field == FAIL_TO_PASS
        ));
    }

    #[test]
    fn test_absent_list_is_missing_field() {
        let mut payload = sample_payload();
        payload.as_object_mut().unwrap().remove(PASS_TO_PASS);

        let err = load(&payload).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::MissingField { ref field, .. } if field == PASS_TO_PASS
        ));
    }

    #[test]
    fn test_missing_patch_regardless_of_other_fields() {
        let mut payload = sample_payload();
        payload.as_object_mut().unwrap().remove("patch");
        payload["FAIL_TO_PASS"] = json!("not json");

        let err = load(&payload).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::MissingField { ref field, .. } if field == "patch"
        ));
    }

    #[test]
    fn test_empty_string_field_is_missing() {
        let mut payload = sample_payload();
        payload["base_commit"] = json!("");

        let err = load(&payload).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::MissingField { ref field, .. } if field == "base_commit"
        ));
    }

    #[test]
    fn test_malformed_json() {
        let err = DataPoint::from_json("{not json", &fixture_path()).unwrap_err();
        assert!(matches!(err, ValidationError::MalformedInput { .. }));
    }

    #[test]
    fn test_non_object_payload_is_malformed() {
        let err = DataPoint::from_json("[1, 2, 3]", &fixture_path()).unwrap_err();
        assert!(matches!(err, ValidationError::MalformedInput { .. }));
    }

    #[test]
    fn test_extra_fields_preserved() {
        let dp = load(&sample_payload()).unwrap();
        assert_eq!(dp.extra["version"], json!("4.3"));
        assert!(dp.extra["test_patch"].as_str().unwrap().starts_with("diff"));

        let serialized = serde_json::to_value(&dp).unwrap();
        assert_eq!(serialized["version"], json!("4.3"));
        assert_eq!(serialized["FAIL_TO_PASS"], sample_payload()["FAIL_TO_PASS"]);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let mut payload = sample_payload();
        payload["FAIL_TO_PASS"] = json!(r#"["a", "b"]"#);
        let first = load(&payload).unwrap();

        let reencoded = serde_json::to_string(&first).unwrap();
        let second = DataPoint::from_json(&reencoded, &fixture_path()).unwrap();
        assert_eq!(first, second);
    }
}
