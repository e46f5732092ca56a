//! Recommends hashtags for the primary refined version.

use super::prompts::{tags_prompt, ENRICH_TEMPERATURE, TAGS_ERROR_PREFIX};
use super::{complete_field, success_output, Stage, StageContext, GENERATE_TAGS};
use crate::completion::{CompletionClient, CompletionRequest};
use crate::core::{StageKind, StageOutput, StatePatch};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Second stage: asks for 5-7 `#` tags.
///
/// With no refined versions it skips and writes an empty list.
pub struct GenerateTagsStage {
    client: Arc<dyn CompletionClient>,
}

impl GenerateTagsStage {
    /// Creates a new tag stage.
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }
}

impl fmt::Debug for GenerateTagsStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerateTagsStage").finish_non_exhaustive()
    }
}

#[async_trait]
impl Stage for GenerateTagsStage {
    fn name(&self) -> &str {
        GENERATE_TAGS
    }

    fn kind(&self) -> StageKind {
        StageKind::Enrich
    }

    async fn execute(&self, ctx: &StageContext<'_>) -> StageOutput {
        let Some(content) = ctx.state().primary_content() else {
            return StageOutput::skip("no refined versions").with_patch(StatePatch::Tags(Vec::new()));
        };

        let request = CompletionRequest::user_prompt(tags_prompt(content))
            .with_temperature(ENRICH_TEMPERATURE)
            .json_object();

        match complete_field::<Vec<String>>(self.client.as_ref(), &request, "tags", TAGS_ERROR_PREFIX)
            .await
        {
            Ok((tags, response)) => {
                debug!(run_id = %ctx.run_id(), tags = tags.len(), "Generated tags");
                success_output(StatePatch::Tags(tags), &response)
            }
            Err(message) => {
                warn!(run_id = %ctx.run_id(), error = %message, "Tag stage failed");
                StageOutput::fail(message)
            }
        }
    }
}
