//! Core domain model types for contentflow.
//!
//! This module contains the fundamental types used throughout the crate:
//! - The content state threaded through the pipeline
//! - Stage status and kind enums
//! - Stage output type with factory methods

mod output;
mod state;
mod status;

pub use output::StageOutput;
pub use state::{ContentState, ContentVersion, ImageSuggestion, StatePatch};
pub use status::{StageKind, StageStatus};
