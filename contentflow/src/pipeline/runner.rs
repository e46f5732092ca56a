//! Linear execution of a content pipeline.

use super::{FailureCollector, FailureMode, FailureRecord, PipelineBuilder};
use crate::completion::CompletionClient;
use crate::config::PipelineConfig;
use crate::core::{ContentState, StageKind, StageOutput, StageStatus};
use crate::errors::{PipelineValidationError, StageError};
use crate::events::{self, EventSink};
use crate::stages::{
    GenerateTagsStage, RefineContentStage, Stage, StageContext, SuggestImagesStage,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Name of the pipeline built by [`ContentPipeline::standard`].
pub const STANDARD_PIPELINE: &str = "content_generation";

/// What happened to one stage during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRecord {
    /// Stage name.
    pub stage: String,
    /// Stage kind.
    pub kind: StageKind,
    /// Final status.
    pub status: StageStatus,
    /// When the stage started (or was skipped).
    pub started_at: DateTime<Utc>,
    /// When the stage finished.
    pub ended_at: DateTime<Utc>,
    /// Error message for failed stages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Reason for skipped stages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
    /// Stage metadata, e.g. token usage.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl StageRecord {
    fn not_run(stage: &dyn Stage, reason: String) -> Self {
        let now = Utc::now();
        Self {
            stage: stage.name().to_string(),
            kind: stage.kind(),
            status: StageStatus::Skip,
            started_at: now,
            ended_at: now,
            error: None,
            skip_reason: Some(reason),
            metadata: HashMap::new(),
        }
    }

    /// Returns the wall-clock duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        (self.ended_at - self.started_at).num_milliseconds()
    }
}

/// The outcome of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    /// Unique ID of the run.
    pub run_id: Uuid,
    /// Name of the pipeline that ran.
    pub pipeline: String,
    /// Final state.
    pub state: ContentState,
    /// One record per stage, in pipeline order.
    pub records: Vec<StageRecord>,
    /// Failures in the order they happened.
    pub failures: Vec<FailureRecord>,
    /// Total run time.
    pub duration_ms: u64,
}

impl PipelineRun {
    /// Returns the first failed stage, the root cause of the run's failure.
    #[must_use]
    pub fn root_cause(&self) -> Option<StageError> {
        self.failures.first().map(FailureRecord::to_stage_error)
    }

    /// Returns true if no stage failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns the record for `stage`.
    #[must_use]
    pub fn record(&self, stage: &str) -> Option<&StageRecord> {
        self.records.iter().find(|r| r.stage == stage)
    }

    /// Returns the status of `stage`.
    #[must_use]
    pub fn status_of(&self, stage: &str) -> Option<StageStatus> {
        self.record(stage).map(|r| r.status)
    }
}

/// A fixed, linear sequence of stages.
///
/// Each run owns a fresh [`ContentState`]; the pipeline itself is
/// immutable and can be shared across concurrent requests.
pub struct ContentPipeline {
    name: String,
    stages: Vec<Arc<dyn Stage>>,
    failure_mode: FailureMode,
    event_sink: Arc<dyn EventSink>,
}

impl ContentPipeline {
    pub(super) fn from_parts(
        name: String,
        stages: Vec<Arc<dyn Stage>>,
        failure_mode: FailureMode,
        event_sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            name,
            stages,
            failure_mode,
            event_sink,
        }
    }

    /// Builds `refine_content -> generate_tags -> suggest_images` over one
    /// shared client.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage list fails validation.
    pub fn standard(
        client: Arc<dyn CompletionClient>,
        config: &PipelineConfig,
    ) -> Result<Self, PipelineValidationError> {
        PipelineBuilder::new(STANDARD_PIPELINE)
            .stage(Arc::new(RefineContentStage::new(Arc::clone(&client))))
            .stage(Arc::new(GenerateTagsStage::new(Arc::clone(&client))))
            .stage(Arc::new(SuggestImagesStage::new(client)))
            .failure_mode(config.failure_mode)
            .build()
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the failure mode.
    #[must_use]
    pub fn failure_mode(&self) -> FailureMode {
        self.failure_mode
    }

    /// Returns stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Runs every stage over a fresh state built from `user_input`.
    ///
    /// Never fails as a whole: stage failures are captured in the returned
    /// [`PipelineRun`].
    pub async fn run(&self, user_input: impl Into<String>) -> PipelineRun {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        let mut state = ContentState::new(user_input);
        let mut records = Vec::with_capacity(self.stages.len());
        let mut collector = FailureCollector::new(self.failure_mode);

        info!(
            pipeline = %self.name,
            run_id = %run_id,
            stages = self.stages.len(),
            failure_mode = %self.failure_mode,
            "Pipeline started"
        );
        self.event_sink
            .emit(
                events::PIPELINE_STARTED,
                Some(json!({ "pipeline": self.name, "run_id": run_id })),
            )
            .await;

        for stage in &self.stages {
            if let Some(upstream) = collector.blocking_failure() {
                let reason = format!("upstream stage '{}' failed", upstream.stage);
                debug!(run_id = %run_id, stage = stage.name(), %reason, "Stage not run");
                self.emit_stage(
                    events::STAGE_SKIPPED,
                    run_id,
                    stage.as_ref(),
                    Some(reason.as_str()),
                )
                .await;
                records.push(StageRecord::not_run(stage.as_ref(), reason));
                continue;
            }

            let record = self
                .run_stage(run_id, stage.as_ref(), &mut state, &mut collector)
                .await;
            records.push(record);
        }

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let failures = collector.into_failures();
        let (event, payload) = match failures.first() {
            Some(root) => {
                warn!(
                    pipeline = %self.name,
                    run_id = %run_id,
                    root_cause = %root.stage,
                    failed = failures.len(),
                    duration_ms,
                    "Pipeline failed"
                );
                (
                    events::PIPELINE_FAILED,
                    json!({
                        "pipeline": self.name,
                        "run_id": run_id,
                        "duration_ms": duration_ms,
                        "root_cause": root.stage,
                        "error": root.error,
                    }),
                )
            }
            None => {
                info!(pipeline = %self.name, run_id = %run_id, duration_ms, "Pipeline completed");
                (
                    events::PIPELINE_COMPLETED,
                    json!({ "pipeline": self.name, "run_id": run_id, "duration_ms": duration_ms }),
                )
            }
        };
        self.event_sink.emit(event, Some(payload)).await;

        PipelineRun {
            run_id,
            pipeline: self.name.clone(),
            state,
            records,
            failures,
            duration_ms,
        }
    }

    async fn run_stage(
        &self,
        run_id: Uuid,
        stage: &dyn Stage,
        state: &mut ContentState,
        collector: &mut FailureCollector,
    ) -> StageRecord {
        let name = stage.name();
        self.emit_stage(events::STAGE_STARTED, run_id, stage, None).await;

        let started_at = Utc::now();
        let output = stage.execute(&StageContext::new(run_id, name, state)).await;
        let ended_at = Utc::now();

        let StageOutput {
            status,
            patch,
            metadata,
            error,
            skip_reason,
        } = output;

        match status {
            StageStatus::Fail => {
                let message = error.unwrap_or_else(|| format!("stage '{name}' failed"));
                warn!(run_id = %run_id, stage = name, error = %message, "Stage failed");
                state.record_error(&message);
                collector.record_failure(FailureRecord::new(name, &message));
                self.emit_stage(events::STAGE_FAILED, run_id, stage, Some(message.as_str()))
                    .await;
                return StageRecord {
                    stage: name.to_string(),
                    kind: stage.kind(),
                    status,
                    started_at,
                    ended_at,
                    error: Some(message),
                    skip_reason: None,
                    metadata,
                };
            }
            StageStatus::Skip => {
                debug!(run_id = %run_id, stage = name, reason = ?skip_reason, "Stage skipped");
                self.emit_stage(events::STAGE_SKIPPED, run_id, stage, skip_reason.as_deref())
                    .await;
            }
            StageStatus::Ok | StageStatus::Pending => {
                debug!(
                    run_id = %run_id,
                    stage = name,
                    items = patch.as_ref().map_or(0, |p| p.len()),
                    "Stage completed"
                );
                self.emit_stage(events::STAGE_COMPLETED, run_id, stage, None).await;
            }
        }

        if let Some(patch) = patch {
            state.apply(patch);
        }

        StageRecord {
            stage: name.to_string(),
            kind: stage.kind(),
            status: if status == StageStatus::Pending {
                StageStatus::Ok
            } else {
                status
            },
            started_at,
            ended_at,
            error: None,
            skip_reason,
            metadata,
        }
    }

    async fn emit_stage(&self, event: &str, run_id: Uuid, stage: &dyn Stage, detail: Option<&str>) {
        let mut payload = json!({
            "pipeline": self.name,
            "run_id": run_id,
            "stage": stage.name(),
            "kind": stage.kind(),
        });
        if let (Some(detail), Some(map)) = (detail, payload.as_object_mut()) {
            let key = if event == events::STAGE_FAILED {
                "error"
            } else {
                "reason"
            };
            map.insert(key.to_string(), json!(detail));
        }
        self.event_sink.emit(event, Some(payload)).await;
    }
}

impl fmt::Debug for ContentPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentPipeline")
            .field("name", &self.name)
            .field("stages", &self.stage_names())
            .field("failure_mode", &self.failure_mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StatePatch;
    use crate::events::CollectingEventSink;
    use crate::testing::{FailingStage, SuccessStage};
    use pretty_assertions::assert_eq;

    fn pipeline(mode: FailureMode, stages: Vec<Arc<dyn Stage>>) -> ContentPipeline {
        stages
            .into_iter()
            .fold(PipelineBuilder::new("test"), PipelineBuilder::stage)
            .failure_mode(mode)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_run_applies_patches_in_order() {
        let p = pipeline(
            FailureMode::FailFast,
            vec![
                Arc::new(SuccessStage::new("a").with_patch(StatePatch::Tags(vec!["#x".into()]))),
                Arc::new(SuccessStage::new("b").with_patch(StatePatch::Tags(vec!["#y".into()]))),
            ],
        );

        let run = p.run("input").await;

        assert!(run.is_success());
        assert_eq!(run.state.user_input(), "input");
        assert_eq!(run.state.tags, vec!["#y".to_string()]);
        assert_eq!(run.records.len(), 2);
        assert!(run.records.iter().all(|r| r.status == StageStatus::Ok));
        assert!(run.root_cause().is_none());
    }

    #[tokio::test]
    async fn test_fail_fast_skips_remaining() {
        let p = pipeline(
            FailureMode::FailFast,
            vec![
                Arc::new(FailingStage::new("a", "broken")),
                Arc::new(SuccessStage::new("b")),
                Arc::new(SuccessStage::new("c")),
            ],
        );

        let run = p.run("input").await;

        assert!(!run.is_success());
        assert_eq!(run.status_of("a"), Some(StageStatus::Fail));
        assert_eq!(run.status_of("b"), Some(StageStatus::Skip));
        assert_eq!(
            run.record("c").and_then(|r| r.skip_reason.clone()),
            Some("upstream stage 'a' failed".to_string())
        );
        assert_eq!(run.root_cause(), Some(StageError::new("a", "broken")));
        assert_eq!(run.state.error.as_deref(), Some("broken"));
    }

    #[tokio::test]
    async fn test_continue_on_failure_keeps_root_cause() {
        let p = pipeline(
            FailureMode::ContinueOnFailure,
            vec![
                Arc::new(FailingStage::new("a", "first")),
                Arc::new(SuccessStage::new("b")),
                Arc::new(FailingStage::new("c", "second")),
            ],
        );

        let run = p.run("input").await;

        assert_eq!(run.status_of("b"), Some(StageStatus::Ok));
        assert_eq!(run.failures.len(), 2);
        assert_eq!(run.root_cause().map(|e| e.stage), Some("a".to_string()));
        assert_eq!(run.state.error.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_failed_stage_patch_is_ignored() {
        let failing = FailingStage::new("a", "broken").with_patch(StatePatch::Tags(vec!["#leak".into()]));
        let p = pipeline(FailureMode::ContinueOnFailure, vec![Arc::new(failing)]);

        let run = p.run("input").await;

        assert!(run.state.tags.is_empty());
    }

    #[tokio::test]
    async fn test_events_emitted_in_order() {
        let sink = Arc::new(CollectingEventSink::new());
        let p = pipeline(
            FailureMode::FailFast,
            vec![
                Arc::new(FailingStage::new("a", "broken")),
                Arc::new(SuccessStage::new("b")),
            ],
        )
        .with_event_sink(sink.clone());

        p.run("input").await;

        assert_eq!(
            sink.event_types(),
            vec![
                "pipeline.started",
                "stage.started",
                "stage.failed",
                "stage.skipped",
                "pipeline.failed",
            ]
        );
        let failed = &sink.events_of_type("stage.failed")[0].1;
        assert_eq!(failed.as_ref().and_then(|v| v["error"].as_str()), Some("broken"));
    }

    #[tokio::test]
    async fn test_run_ids_are_unique() {
        let p = pipeline(FailureMode::FailFast, vec![Arc::new(SuccessStage::new("a"))]);
        let first = p.run("x").await;
        let second = p.run("x").await;
        assert_ne!(first.run_id, second.run_id);
    }

    #[test]
    fn test_standard_pipeline_shape() {
        let client = Arc::new(crate::testing::ScriptedCompletionClient::new());
        let p = ContentPipeline::standard(client, &PipelineConfig::default()).unwrap();

        assert_eq!(p.name(), STANDARD_PIPELINE);
        assert_eq!(
            p.stage_names(),
            vec!["refine_content", "generate_tags", "suggest_images"]
        );
        assert_eq!(p.failure_mode(), FailureMode::FailFast);
    }
}
