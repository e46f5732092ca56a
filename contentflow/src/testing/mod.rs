//! Testing utilities for content pipelines.
//!
//! This module provides:
//! - A scripted completion client that replays queued responses
//! - Small stages with fixed behaviour
//! - Canned model payloads and states
//! - Assertions for stage outputs and pipeline runs

mod assertions;
pub mod fixtures;
mod mocks;

pub use assertions::{
    assert_output_failed, assert_output_patches, assert_output_status, assert_output_succeeded,
    assert_root_cause, assert_stage_status,
};
pub use mocks::{FailingStage, RecordingStage, ScriptedCompletionClient, SuccessStage};
