//! Failure handling for pipeline runs.
//!
//! A run either stops at the first failed stage or keeps going and lets
//! downstream stages cope with whatever state is left.

use crate::errors::StageError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How to handle stage failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Stop pipeline on first failure (default). Remaining stages are
    /// recorded as skipped.
    #[default]
    FailFast,
    /// Run every stage regardless of earlier failures.
    ContinueOnFailure,
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FailFast => write!(f, "fail_fast"),
            Self::ContinueOnFailure => write!(f, "continue_on_failure"),
        }
    }
}

impl FromStr for FailureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail_fast" => Ok(Self::FailFast),
            "continue_on_failure" => Ok(Self::ContinueOnFailure),
            other => Err(format!("unknown failure mode '{other}'")),
        }
    }
}

/// Record of a stage failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Stage name.
    pub stage: String,
    /// Error message.
    pub error: String,
    /// When the failure was recorded.
    pub timestamp: DateTime<Utc>,
}

impl FailureRecord {
    /// Creates a new failure record stamped with the current time.
    #[must_use]
    pub fn new(stage: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            error: error.into(),
            timestamp: Utc::now(),
        }
    }

    /// Converts the record into a [`StageError`].
    #[must_use]
    pub fn to_stage_error(&self) -> StageError {
        StageError::new(&self.stage, &self.error)
    }
}

/// Collects failures during one run and decides whether to keep going.
#[derive(Debug)]
pub struct FailureCollector {
    mode: FailureMode,
    failures: Vec<FailureRecord>,
}

impl FailureCollector {
    /// Creates a new failure collector.
    #[must_use]
    pub fn new(mode: FailureMode) -> Self {
        Self {
            mode,
            failures: Vec::new(),
        }
    }

    /// Records a stage failure.
    pub fn record_failure(&mut self, record: FailureRecord) {
        self.failures.push(record);
    }

    /// Returns the failure that stops the run, if the mode says to stop.
    #[must_use]
    pub fn blocking_failure(&self) -> Option<&FailureRecord> {
        match self.mode {
            FailureMode::FailFast => self.failures.first(),
            FailureMode::ContinueOnFailure => None,
        }
    }

    /// Returns all failures in the order they happened.
    #[must_use]
    pub fn failures(&self) -> &[FailureRecord] {
        &self.failures
    }

    /// Consumes the collector, returning its failures.
    #[must_use]
    pub fn into_failures(self) -> Vec<FailureRecord> {
        self.failures
    }
}
