//! Pipeline lifecycle events.
//!
//! The pipeline reports progress to an injected [`EventSink`]; nothing
//! here is global. Event names are the constants below.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// A run began.
pub const PIPELINE_STARTED: &str = "pipeline.started";
/// A run finished without a failed stage.
pub const PIPELINE_COMPLETED: &str = "pipeline.completed";
/// A run finished with at least one failed stage.
pub const PIPELINE_FAILED: &str = "pipeline.failed";
/// A stage is about to execute.
pub const STAGE_STARTED: &str = "stage.started";
/// A stage returned `ok`.
pub const STAGE_COMPLETED: &str = "stage.completed";
/// A stage returned `skip` or was not executed.
pub const STAGE_SKIPPED: &str = "stage.skipped";
/// A stage returned `fail`.
pub const STAGE_FAILED: &str = "stage.failed";
