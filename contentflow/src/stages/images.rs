//! Suggests pictures to accompany the primary refined version.

use super::prompts::{images_prompt, ENRICH_TEMPERATURE, IMAGES_ERROR_PREFIX};
use super::{complete_field, success_output, Stage, StageContext, SUGGEST_IMAGES};
use crate::completion::{CompletionClient, CompletionRequest};
use crate::core::{ImageSuggestion, StageKind, StageOutput, StatePatch};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Third stage: asks for 2-3 image suggestions.
///
/// Reads the first refined version itself; it does not depend on the tag
/// stage's output.
pub struct SuggestImagesStage {
    client: Arc<dyn CompletionClient>,
}

impl SuggestImagesStage {
    /// Creates a new image stage.
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }
}

impl fmt::Debug for SuggestImagesStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuggestImagesStage").finish_non_exhaustive()
    }
}

#[async_trait]
impl Stage for SuggestImagesStage {
    fn name(&self) -> &str {
        SUGGEST_IMAGES
    }

    fn kind(&self) -> StageKind {
        StageKind::Enrich
    }

    async fn execute(&self, ctx: &StageContext<'_>) -> StageOutput {
        let Some(content) = ctx.state().primary_content() else {
            return StageOutput::skip("no refined versions")
                .with_patch(StatePatch::ImageSuggestions(Vec::new()));
        };

        let request = CompletionRequest::user_prompt(images_prompt(content))
            .with_temperature(ENRICH_TEMPERATURE)
            .json_object();

        match complete_field::<Vec<ImageSuggestion>>(
            self.client.as_ref(),
            &request,
            "suggestions",
            IMAGES_ERROR_PREFIX,
        )
        .await
        {
            Ok((suggestions, response)) => {
                debug!(run_id = %ctx.run_id(), suggestions = suggestions.len(), "Suggested images");
                success_output(StatePatch::ImageSuggestions(suggestions), &response)
            }
            Err(message) => {
                warn!(run_id = %ctx.run_id(), error = %message, "Image stage failed");
                StageOutput::fail(message)
            }
        }
    }
}
