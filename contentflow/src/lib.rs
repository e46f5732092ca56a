//! # Contentflow
//!
//! Turns a short piece of user text into material for a social post by
//! running three completion calls in a fixed order:
//!
//! - **Refine**: three stylistic rewrites of the input
//! - **Tags**: 5-7 `#` tags for the first rewrite
//! - **Images**: 2-3 picture suggestions for the first rewrite
//!
//! Each stage returns a patch for one field of [`core::ContentState`]; the
//! pipeline applies patches, records per-stage outcomes and reports the
//! first failure as the root cause.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use contentflow::prelude::*;
//! use std::sync::Arc;
//!
//! let client = Arc::new(OpenAICompatibleClient::new(CompletionConfig::from_env()?)?);
//! let pipeline = ContentPipeline::standard(client, &PipelineConfig::from_env()?)?;
//! let service = ContentService::new(pipeline);
//!
//! let response = service.generate(&ContentRequest::new("周末一个人去看海")).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod completion;
pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod pipeline;
pub mod service;
pub mod stages;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::completion::{
        CompletionClient, CompletionRequest, CompletionResponse, OpenAICompatibleClient,
    };
    pub use crate::config::{CompletionConfig, PipelineConfig};
    pub use crate::core::{
        ContentState, ContentVersion, ImageSuggestion, StageKind, StageOutput, StageStatus,
        StatePatch,
    };
    pub use crate::errors::{
        CompletionError, ConfigError, ContentflowError, PipelineValidationError, ServiceError,
        StageError,
    };
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::pipeline::{
        ContentPipeline, FailureMode, PipelineBuilder, PipelineRun, StageRecord,
    };
    pub use crate::service::{ContentRequest, ContentResponse, ContentService};
    pub use crate::stages::{Stage, StageContext};
}
