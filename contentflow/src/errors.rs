//! Error types for the contentflow pipeline.
//!
//! Each concern gets its own enum; [`ContentflowError`] wraps them for
//! callers that only need a single error type.

use thiserror::Error;

/// The main error type for contentflow operations.
#[derive(Debug, Error)]
pub enum ContentflowError {
    /// Configuration could not be loaded.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// A completion call failed.
    #[error("{0}")]
    Completion(#[from] CompletionError),

    /// The pipeline could not be built.
    #[error("{0}")]
    Pipeline(#[from] PipelineValidationError),

    /// The service rejected or failed a request.
    #[error("{0}")]
    Service(#[from] ServiceError),
}

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required variable is absent or blank.
    #[error("Missing required configuration: {0}")]
    Missing(String),

    /// A variable is present but cannot be parsed.
    #[error("Invalid value for {var}: '{value}'")]
    Invalid {
        /// The variable name.
        var: String,
        /// The offending value.
        value: String,
    },
}

impl ConfigError {
    /// Creates an invalid-value error.
    #[must_use]
    pub fn invalid(var: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Invalid {
            var: var.into(),
            value: value.into(),
        }
    }
}

/// Errors produced by a completion client or while decoding its payload.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Build(String),

    /// The request never produced a response.
    #[error("Request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("Completion service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The response carried no message content.
    #[error("Completion response contained no content")]
    EmptyResponse,

    /// The message content is not valid JSON.
    #[error("Invalid JSON in completion content: {0}")]
    InvalidJson(String),

    /// A required field is missing from the JSON payload.
    #[error("Missing field '{0}' in completion content")]
    MissingField(String),

    /// A field is present but has the wrong shape.
    #[error("Malformed field '{field}': {reason}")]
    MalformedField {
        /// The field name.
        field: String,
        /// Why decoding failed.
        reason: String,
    },
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// A stage failure, carrying the stage name and its user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Stage '{stage}' failed: {message}")]
pub struct StageError {
    /// Stage that failed.
    pub stage: String,
    /// The prefixed, human-readable message.
    pub message: String,
}

impl StageError {
    /// Creates a new stage error.
    #[must_use]
    pub fn new(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

/// Error raised when a pipeline cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PipelineValidationError {
    /// The error message.
    pub message: String,
    /// The stages involved in the error.
    pub stages: Vec<String>,
}

impl PipelineValidationError {
    /// Creates a new pipeline validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stages: Vec::new(),
        }
    }

    /// Sets the stages involved.
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<String>) -> Self {
        self.stages = stages;
        self
    }
}

/// Errors surfaced by [`crate::service::ContentService`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The user input was empty or whitespace-only.
    #[error("输入内容不能为空")]
    EmptyInput,

    /// A pipeline stage failed; `stage` is the root cause.
    #[error("{message}")]
    Generation {
        /// The first stage that failed.
        stage: String,
        /// That stage's message.
        message: String,
    },
}

impl From<StageError> for ServiceError {
    fn from(err: StageError) -> Self {
        Self::Generation {
            stage: err.stage,
            message: err.message,
        }
    }
}
