//! Test assertions for stage outputs and pipeline runs.

use crate::core::{StageOutput, StageStatus};
use crate::pipeline::PipelineRun;

/// Asserts that the output indicates success.
pub fn assert_output_succeeded(output: &StageOutput) {
    assert!(
        output.is_success(),
        "Expected success, got status: {:?} (error: {:?})",
        output.status,
        output.error
    );
}

/// Asserts that the output failed with a message starting with `prefix`.
pub fn assert_output_failed(output: &StageOutput, prefix: &str) {
    assert!(
        output.is_failure(),
        "Expected failure, got status: {:?}",
        output.status
    );
    let error = output.error.as_deref().unwrap_or_default();
    assert!(
        error.starts_with(prefix),
        "Expected error starting with '{prefix}', got '{error}'"
    );
}

/// Asserts that the output has the expected status.
pub fn assert_output_status(output: &StageOutput, expected: StageStatus) {
    assert_eq!(
        output.status, expected,
        "Expected status {:?}, got {:?}",
        expected, output.status
    );
}

/// Asserts that the output carries a patch for `field`.
pub fn assert_output_patches(output: &StageOutput, field: &str) {
    let actual = output.patch.as_ref().map(|p| p.field());
    assert_eq!(
        actual,
        Some(field),
        "Expected a patch for '{field}', got {actual:?}"
    );
}

/// Asserts the recorded status of `stage` in a run.
pub fn assert_stage_status(run: &PipelineRun, stage: &str, expected: StageStatus) {
    let actual = run.status_of(stage);
    assert_eq!(
        actual,
        Some(expected),
        "Expected stage '{stage}' to be {expected:?}, got {actual:?}"
    );
}

/// Asserts that the run failed and `stage` is its root cause.
pub fn assert_root_cause(run: &PipelineRun, stage: &str) {
    let root = run.root_cause();
    assert_eq!(
        root.as_ref().map(|e| e.stage.as_str()),
        Some(stage),
        "Expected root cause '{stage}', got {root:?}"
    );
}
