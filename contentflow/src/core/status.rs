//! Per-stage outcome and role.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a stage reads the user input or an earlier stage's output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Works on the raw user input.
    #[default]
    Transform,
    /// Works on the first refined version.
    Enrich,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transform => write!(f, "transform"),
            Self::Enrich => write!(f, "enrich"),
        }
    }
}

/// Outcome of one stage in a run.
///
/// Only `Ok` and `Fail` come from a model call; `Skip` covers both an empty
/// upstream and a run stopped by an earlier failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Not reached yet.
    #[default]
    Pending,
    /// The stage produced its field.
    Ok,
    /// The stage did not call the model.
    Skip,
    /// The call or its payload failed; `state.error` holds the message.
    Fail,
}

impl StageStatus {
    /// Lower-case label used in logs and serialized records.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ok => "ok",
            Self::Skip => "skip",
            Self::Fail => "fail",
        }
    }

    /// A skipped stage leaves the run successful.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Ok | Self::Skip)
    }

    /// True only for `Fail`, the status that becomes a root cause.
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Fail)
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
