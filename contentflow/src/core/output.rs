//! Stage output type with factory methods.

use super::{StatePatch, StageStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The output of a stage execution.
///
/// A stage never touches [`crate::core::ContentState`] directly; it hands
/// back a patch for its own field and the pipeline applies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutput {
    /// The status of the stage execution.
    pub status: StageStatus,

    /// The field replacement to apply to the state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<StatePatch>,

    /// Additional metadata, e.g. token usage.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,

    /// Error message (for failed executions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Skip reason (for skipped executions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
}

impl StageOutput {
    fn with_status(status: StageStatus) -> Self {
        Self {
            status,
            patch: None,
            metadata: HashMap::new(),
            error: None,
            skip_reason: None,
        }
    }

    /// Creates a successful output carrying a patch.
    #[must_use]
    pub fn ok(patch: StatePatch) -> Self {
        Self::with_status(StageStatus::Ok).with_patch(patch)
    }

    /// Creates a successful output that leaves the state unchanged.
    #[must_use]
    pub fn ok_empty() -> Self {
        Self::with_status(StageStatus::Ok)
    }

    /// Creates a skip output with a reason.
    #[must_use]
    pub fn skip(reason: impl Into<String>) -> Self {
        let mut output = Self::with_status(StageStatus::Skip);
        output.skip_reason = Some(reason.into());
        output
    }

    /// Creates a failure output with an error message.
    #[must_use]
    pub fn fail(error: impl Into<String>) -> Self {
        let mut output = Self::with_status(StageStatus::Fail);
        output.error = Some(error.into());
        output
    }

    /// Attaches a patch.
    #[must_use]
    pub fn with_patch(mut self, patch: StatePatch) -> Self {
        self.patch = Some(patch);
        self
    }

    /// Adds a single metadata entry.
    #[must_use]
    pub fn add_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Returns true if the output indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns true if the output indicates failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_output() {
        let output = StageOutput::ok(StatePatch::Tags(vec!["#a".to_string()]));
        assert_eq!(output.status, StageStatus::Ok);
        assert!(output.is_success());
        assert!(!output.is_failure());
        assert_eq!(output.patch.as_ref().map(StatePatch::field), Some("tags"));
    }

    #[test]
    fn test_skip_output() {
        let output = StageOutput::skip("Not needed").with_patch(StatePatch::Tags(vec![]));
        assert_eq!(output.status, StageStatus::Skip);
        assert_eq!(output.skip_reason, Some("Not needed".to_string()));
        assert!(output.is_success());
        assert!(output.patch.is_some());
    }

    #[test]
    fn test_fail_output() {
        let output = StageOutput::fail("Something went wrong");
        assert_eq!(output.status, StageStatus::Fail);
        assert_eq!(output.error, Some("Something went wrong".to_string()));
        assert!(output.is_failure());
        assert!(output.patch.is_none());
    }

    #[test]
    fn test_with_metadata() {
        let output = StageOutput::fail("x").add_metadata("latency_ms", serde_json::json!(12.5));
        assert_eq!(output.metadata.get("latency_ms"), Some(&serde_json::json!(12.5)));
    }

    #[test]
    fn test_serialization_omits_empty_fields() {
        let json = serde_json::to_value(StageOutput::fail("boom")).unwrap();
        assert_eq!(json, serde_json::json!({"status": "fail", "error": "boom"}));
    }
}
