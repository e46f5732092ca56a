//! Request-level entry point over the content pipeline.

use crate::core::{ContentVersion, ImageSuggestion};
use crate::errors::ServiceError;
use crate::pipeline::ContentPipeline;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// A generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRequest {
    /// Raw user text.
    pub user_input: String,
    /// Caller identifier. Logged, not otherwise used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ContentRequest {
    /// Creates a request without a user ID.
    #[must_use]
    pub fn new(user_input: impl Into<String>) -> Self {
        Self {
            user_input: user_input.into(),
            user_id: None,
        }
    }

    /// Sets the user ID.
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// The generated material for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentResponse {
    /// Rewritten versions of the input.
    pub refined_versions: Vec<ContentVersion>,
    /// Recommended tags.
    pub tags: Vec<String>,
    /// Image suggestions.
    pub image_suggestions: Vec<ImageSuggestion>,
}

/// Validates requests and runs them through a [`ContentPipeline`].
#[derive(Debug, Clone)]
pub struct ContentService {
    pipeline: Arc<ContentPipeline>,
}

impl ContentService {
    /// Creates a service over `pipeline`.
    #[must_use]
    pub fn new(pipeline: ContentPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Returns the underlying pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &ContentPipeline {
        &self.pipeline
    }

    /// Generates content for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EmptyInput`] for blank input, without
    /// running the pipeline, and [`ServiceError::Generation`] carrying the
    /// first failed stage when the run fails.
    pub async fn generate(&self, request: &ContentRequest) -> Result<ContentResponse, ServiceError> {
        if is_blank(&request.user_input) {
            return Err(ServiceError::EmptyInput);
        }

        info!(
            user_id = request.user_id.as_deref().unwrap_or("anonymous"),
            input_chars = request.user_input.chars().count(),
            "Generating content"
        );

        let run = self.pipeline.run(request.user_input.as_str()).await;

        if let Some(root) = run.root_cause() {
            warn!(run_id = %run.run_id, stage = %root.stage, error = %root.message, "Generation failed");
            return Err(root.into());
        }

        let state = run.state;
        Ok(ContentResponse {
            refined_versions: state.refined_versions,
            tags: state.tags,
            image_suggestions: state.image_suggestions,
        })
    }
}

/// Whitespace plus the ASCII information separators (U+001C..U+001F).
fn is_blank(input: &str) -> bool {
    input
        .chars()
        .all(|c| c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c))
}
