//! Pipeline builder with validation.

use super::{ContentPipeline, FailureMode};
use crate::errors::PipelineValidationError;
use crate::events::{EventSink, NoOpEventSink};
use crate::stages::Stage;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Builder for creating validated pipelines.
///
/// Stages run in the order they are added.
pub struct PipelineBuilder {
    name: String,
    stages: Vec<Arc<dyn Stage>>,
    failure_mode: FailureMode,
    event_sink: Option<Arc<dyn EventSink>>,
}

impl PipelineBuilder {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            failure_mode: FailureMode::default(),
            event_sink: None,
        }
    }

    /// Appends a stage.
    #[must_use]
    pub fn stage(mut self, stage: Arc<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Sets the failure mode.
    #[must_use]
    pub fn failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    /// Sets the sink receiving lifecycle events.
    #[must_use]
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = Some(sink);
        self
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the builder has no stages, a stage has a blank
    /// name, or two stages share a name.
    pub fn build(self) -> Result<ContentPipeline, PipelineValidationError> {
        if self.stages.is_empty() {
            return Err(PipelineValidationError::new(format!(
                "Pipeline '{}' has no stages",
                self.name
            )));
        }

        validate_stage_names(&self.stages)?;

        let sink = self
            .event_sink
            .unwrap_or_else(|| Arc::new(NoOpEventSink));
        Ok(ContentPipeline::from_parts(
            self.name,
            self.stages,
            self.failure_mode,
            sink,
        ))
    }
}

fn validate_stage_names(stages: &[Arc<dyn Stage>]) -> Result<(), PipelineValidationError> {
    let mut seen = HashSet::new();
    for stage in stages {
        let name = stage.name();
        if name.trim().is_empty() {
            return Err(PipelineValidationError::new("Stage name cannot be empty"));
        }
        if !seen.insert(name) {
            return Err(
                PipelineValidationError::new(format!("Duplicate stage name '{name}'"))
                    .with_stages(vec![name.to_string()]),
            );
        }
    }
    Ok(())
}

impl fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("name", &self.name)
            .field("stages", &self.stages)
            .field("failure_mode", &self.failure_mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SuccessStage;

    #[test]
    fn test_build_empty_pipeline_fails() {
        let err = PipelineBuilder::new("empty").build().unwrap_err();
        assert!(err.message.contains("no stages"));
    }

    #[test]
    fn test_build_rejects_duplicate_names() {
        let err = PipelineBuilder::new("dup")
            .stage(Arc::new(SuccessStage::new("a")))
            .stage(Arc::new(SuccessStage::new("a")))
            .build()
            .unwrap_err();

        assert_eq!(err.stages, vec!["a".to_string()]);
        assert!(err.message.contains("Duplicate"));
    }

    #[test]
    fn test_build_rejects_blank_name() {
        let result = PipelineBuilder::new("blank")
            .stage(Arc::new(SuccessStage::new("  ")))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_build_keeps_order_and_mode() {
        let builder = PipelineBuilder::new("ordered")
            .stage(Arc::new(SuccessStage::new("first")))
            .stage(Arc::new(SuccessStage::new("second")))
            .failure_mode(FailureMode::ContinueOnFailure);
        assert_eq!(builder.name(), "ordered");
        assert_eq!(builder.stage_count(), 2);

        let pipeline = builder.build().unwrap();
        assert_eq!(pipeline.stage_names(), vec!["first", "second"]);
        assert_eq!(pipeline.failure_mode(), FailureMode::ContinueOnFailure);
    }
}
