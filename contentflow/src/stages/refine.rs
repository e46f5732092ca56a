//! Rewrites the user input into several styled versions.

use super::prompts::{refine_prompt, REFINE_ERROR_PREFIX, REFINE_TEMPERATURE};
use super::{complete_field, success_output, Stage, StageContext, REFINE_CONTENT};
use crate::completion::{CompletionClient, CompletionRequest};
use crate::core::{ContentVersion, StageKind, StageOutput, StatePatch};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// First stage: asks for three stylistic rewrites of `user_input`.
pub struct RefineContentStage {
    client: Arc<dyn CompletionClient>,
}

impl RefineContentStage {
    /// Creates a new refine stage.
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }
}

impl fmt::Debug for RefineContentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefineContentStage").finish_non_exhaustive()
    }
}

#[async_trait]
impl Stage for RefineContentStage {
    fn name(&self) -> &str {
        REFINE_CONTENT
    }

    fn kind(&self) -> StageKind {
        StageKind::Transform
    }

    async fn execute(&self, ctx: &StageContext<'_>) -> StageOutput {
        let request = CompletionRequest::user_prompt(refine_prompt(ctx.state().user_input()))
            .with_temperature(REFINE_TEMPERATURE)
            .json_object();

        match complete_field::<Vec<ContentVersion>>(
            self.client.as_ref(),
            &request,
            "versions",
            REFINE_ERROR_PREFIX,
        )
        .await
        {
            Ok((versions, response)) => {
                debug!(run_id = %ctx.run_id(), versions = versions.len(), "Refined content");
                success_output(StatePatch::RefinedVersions(versions), &response)
            }
            Err(message) => {
                warn!(run_id = %ctx.run_id(), error = %message, "Refine stage failed");
                StageOutput::fail(message)
            }
        }
    }
}
