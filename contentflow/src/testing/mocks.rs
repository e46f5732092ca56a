//! Mock completion clients and stages for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::completion::{CompletionClient, CompletionRequest, CompletionResponse};
use crate::core::{ContentState, StageOutput, StatePatch};
use crate::errors::CompletionError;
use crate::stages::{Stage, StageContext};

/// A completion client that answers from a queue.
///
/// Each call pops the next scripted result and records the request. An
/// exhausted queue answers with [`CompletionError::EmptyResponse`].
#[derive(Debug, Default)]
pub struct ScriptedCompletionClient {
    responses: Mutex<VecDeque<Result<CompletionResponse, CompletionError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletionClient {
    /// Creates a client with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful response with `content` as the message text.
    #[must_use]
    pub fn with_content(self, content: impl Into<String>) -> Self {
        self.with_response(Ok(CompletionResponse::from_content(content)))
    }

    /// Queues a transport failure.
    #[must_use]
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.with_response(Err(CompletionError::Transport(message.into())))
    }

    /// Queues an arbitrary result.
    #[must_use]
    pub fn with_response(self, response: Result<CompletionResponse, CompletionError>) -> Self {
        self.responses.lock().push_back(response);
        self
    }

    /// Returns the number of calls made so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Returns every request received, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    /// Returns the number of scripted results not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.responses.lock().len()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletionClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        self.requests.lock().push(request.clone());
        self.responses
            .lock()
            .pop_front()
            .unwrap_or(Err(CompletionError::EmptyResponse))
    }
}

/// A stage that always succeeds, optionally writing a patch.
#[derive(Debug)]
pub struct SuccessStage {
    name: String,
    patch: Option<StatePatch>,
}

impl SuccessStage {
    /// Creates a success stage that leaves the state unchanged.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            patch: None,
        }
    }

    /// Sets the patch to return.
    #[must_use]
    pub fn with_patch(mut self, patch: StatePatch) -> Self {
        self.patch = Some(patch);
        self
    }
}

#[async_trait]
impl Stage for SuccessStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, _ctx: &StageContext<'_>) -> StageOutput {
        match &self.patch {
            Some(patch) => StageOutput::ok(patch.clone()),
            None => StageOutput::ok_empty(),
        }
    }
}

/// A stage that always fails.
#[derive(Debug)]
pub struct FailingStage {
    name: String,
    error: String,
    patch: Option<StatePatch>,
}

impl FailingStage {
    /// Creates a failing stage with the given message.
    #[must_use]
    pub fn new(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error: error.into(),
            patch: None,
        }
    }

    /// Attaches a patch to the failure output. The pipeline must ignore it.
    #[must_use]
    pub fn with_patch(mut self, patch: StatePatch) -> Self {
        self.patch = Some(patch);
        self
    }
}

#[async_trait]
impl Stage for FailingStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, _ctx: &StageContext<'_>) -> StageOutput {
        let output = StageOutput::fail(&self.error);
        match &self.patch {
            Some(patch) => output.with_patch(patch.clone()),
            None => output,
        }
    }
}

/// A stage that snapshots the state it was handed.
#[derive(Debug)]
pub struct RecordingStage {
    name: String,
    seen: Mutex<Vec<ContentState>>,
}

impl RecordingStage {
    /// Creates a new recording stage.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Returns the states observed, one per call.
    #[must_use]
    pub fn seen_states(&self) -> Vec<ContentState> {
        self.seen.lock().clone()
    }

    /// Returns the number of times the stage ran.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.seen.lock().len()
    }
}

#[async_trait]
impl Stage for RecordingStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: &StageContext<'_>) -> StageOutput {
        self.seen.lock().push(ctx.state().clone());
        StageOutput::ok_empty()
    }
}
