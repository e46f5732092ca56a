//! Stage trait and the three content stages.
//!
//! Stages are the units of work in a content pipeline. Each one reads the
//! state, makes one completion call and returns a patch for its own field.

mod images;
pub mod prompts;
mod refine;
mod tags;

pub use images::SuggestImagesStage;
pub use refine::RefineContentStage;
pub use tags::GenerateTagsStage;

use crate::completion::{parse, CompletionClient, CompletionRequest, CompletionResponse};
use crate::core::{ContentState, StageKind, StageOutput};
use crate::errors::CompletionError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use uuid::Uuid;

/// Name of the refine stage.
pub const REFINE_CONTENT: &str = "refine_content";
/// Name of the tag stage.
pub const GENERATE_TAGS: &str = "generate_tags";
/// Name of the image stage.
pub const SUGGEST_IMAGES: &str = "suggest_images";

/// Read-only view handed to a stage.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    run_id: Uuid,
    stage_name: &'a str,
    state: &'a ContentState,
}

impl<'a> StageContext<'a> {
    /// Creates a new stage context.
    #[must_use]
    pub fn new(run_id: Uuid, stage_name: &'a str, state: &'a ContentState) -> Self {
        Self {
            run_id,
            stage_name,
            state,
        }
    }

    /// Returns the pipeline run ID.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Returns the stage name.
    #[must_use]
    pub fn stage_name(&self) -> &str {
        self.stage_name
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> &'a ContentState {
        self.state
    }
}

/// Trait for pipeline stages.
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// Returns the name of the stage.
    fn name(&self) -> &str;

    /// Returns the kind of work the stage performs.
    fn kind(&self) -> StageKind {
        StageKind::Transform
    }

    /// Executes the stage.
    ///
    /// Failures are reported through [`StageOutput::fail`], never by panicking.
    async fn execute(&self, ctx: &StageContext<'_>) -> StageOutput;
}

/// Sends `request` and decodes `field` from the JSON content.
///
/// Any failure is rendered as `"{prefix}: {error}"`.
pub(crate) async fn complete_field<T: DeserializeOwned>(
    client: &dyn CompletionClient,
    request: &CompletionRequest,
    field: &str,
    prefix: &str,
) -> Result<(T, CompletionResponse), String> {
    client
        .complete(request)
        .await
        .and_then(|response| {
            parse::extract_field::<T>(&response.content, field).map(|value| (value, response))
        })
        .map_err(|e: CompletionError| format!("{prefix}: {e}"))
}

/// Builds the output for a decoded completion.
pub(crate) fn success_output(
    patch: crate::core::StatePatch,
    response: &CompletionResponse,
) -> StageOutput {
    response
        .usage_metadata()
        .into_iter()
        .fold(StageOutput::ok(patch), |out, (k, v)| out.add_metadata(k, v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedCompletionClient;

    #[test]
    fn test_stage_context_accessors() {
        let state = ContentState::new("hello");
        let run_id = Uuid::new_v4();
        let ctx = StageContext::new(run_id, "refine_content", &state);

        assert_eq!(ctx.run_id(), run_id);
        assert_eq!(ctx.stage_name(), "refine_content");
        assert_eq!(ctx.state().user_input(), "hello");
    }

    #[tokio::test]
    async fn test_complete_field_prefixes_errors() {
        let client = ScriptedCompletionClient::new().with_failure("connection reset");
        let request = CompletionRequest::user_prompt("x");

        let err = complete_field::<Vec<String>>(&client, &request, "tags", "标签生成失败")
            .await
            .unwrap_err();
        assert!(err.starts_with("标签生成失败: "));
        assert!(err.contains("connection reset"));
    }

    #[tokio::test]
    async fn test_complete_field_decodes() {
        let client = ScriptedCompletionClient::new().with_content(r##"{"tags": ["#a"]}"##);
        let request = CompletionRequest::user_prompt("x");

        let (tags, _) = complete_field::<Vec<String>>(&client, &request, "tags", "p")
            .await
            .unwrap();
        assert_eq!(tags, vec!["#a".to_string()]);
    }
}
