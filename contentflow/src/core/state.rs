//! The state record threaded through one pipeline run.

use serde::{Deserialize, Serialize};

/// One rewritten version of the user's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentVersion {
    /// Style label, e.g. "轻松版".
    pub style: String,
    /// The rewritten text.
    pub content: String,
    /// Short description of the style.
    pub description: String,
}

/// One image suggestion for the refined text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSuggestion {
    /// What the picture shows.
    pub description: String,
    /// Search or prompt keywords, as a single separated string.
    pub keywords: String,
    /// Visual style label.
    pub style: String,
}

/// Mutable record carried through the three stages of a run.
///
/// `user_input` is fixed at construction. Each output field is owned by
/// exactly one stage and only changes through [`ContentState::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentState {
    user_input: String,
    /// Output of the refine stage.
    pub refined_versions: Vec<ContentVersion>,
    /// Output of the tag stage.
    pub tags: Vec<String>,
    /// Output of the image stage.
    pub image_suggestions: Vec<ImageSuggestion>,
    /// Message of the most recent stage failure, if any.
    pub error: Option<String>,
}

impl ContentState {
    /// Creates a fresh state with empty outputs and no error.
    #[must_use]
    pub fn new(user_input: impl Into<String>) -> Self {
        Self {
            user_input: user_input.into(),
            refined_versions: Vec::new(),
            tags: Vec::new(),
            image_suggestions: Vec::new(),
            error: None,
        }
    }

    /// Returns the original user input.
    #[must_use]
    pub fn user_input(&self) -> &str {
        &self.user_input
    }

    /// Returns the content of the first refined version, the input of the
    /// tag and image stages.
    #[must_use]
    pub fn primary_content(&self) -> Option<&str> {
        self.refined_versions.first().map(|v| v.content.as_str())
    }

    /// Replaces the field named by `patch`.
    pub fn apply(&mut self, patch: StatePatch) {
        match patch {
            StatePatch::RefinedVersions(versions) => self.refined_versions = versions,
            StatePatch::Tags(tags) => self.tags = tags,
            StatePatch::ImageSuggestions(suggestions) => self.image_suggestions = suggestions,
        }
    }

    /// Records a stage failure. A later failure overwrites an earlier one.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Returns true if any stage recorded an error.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

/// A replacement value for exactly one output field of [`ContentState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum StatePatch {
    /// New `refined_versions`.
    RefinedVersions(Vec<ContentVersion>),
    /// New `tags`.
    Tags(Vec<String>),
    /// New `image_suggestions`.
    ImageSuggestions(Vec<ImageSuggestion>),
}

impl StatePatch {
    /// Returns the name of the field this patch writes.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::RefinedVersions(_) => "refined_versions",
            Self::Tags(_) => "tags",
            Self::ImageSuggestions(_) => "image_suggestions",
        }
    }

    /// Returns the number of items in the patch.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::RefinedVersions(v) => v.len(),
            Self::Tags(v) => v.len(),
            Self::ImageSuggestions(v) => v.len(),
        }
    }

    /// Returns true if the patch carries no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
