//! Pipeline building and execution.
//!
//! This module provides:
//! - Pipeline builder with validation
//! - Linear execution with per-stage records
//! - Failure tolerance modes

mod builder;
mod failure_tolerance;
mod runner;

#[cfg(test)]
mod integration_tests;

pub use builder::PipelineBuilder;
pub use failure_tolerance::{FailureCollector, FailureMode, FailureRecord};
pub use runner::{ContentPipeline, PipelineRun, StageRecord, STANDARD_PIPELINE};
