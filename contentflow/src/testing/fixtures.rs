//! Canned model payloads and states.
//!
//! The `*_json` functions return message content exactly as a model would
//! send it for the three built-in stages; the typed functions return the
//! values those payloads decode to.

use super::ScriptedCompletionClient;
use crate::core::{ContentState, ContentVersion, ImageSuggestion, StatePatch};

/// Content for a successful refine call.
#[must_use]
pub fn versions_json() -> &'static str {
    r#"{
  "versions": [
    {"style": "轻松版", "content": "周末一个人去看海，风很大，心情很好 🌊", "description": "活泼有趣，适合日常分享"},
    {"style": "文艺版", "content": "一个人的海边，浪把心事一层层推远。", "description": "有意境，适合深度表达"},
    {"style": "真实版", "content": "周末自己跑去海边吹风，挺爽的。", "description": "口语化，更真实自然"}
  ]
}"#
}

/// Content for a successful tag call.
#[must_use]
pub fn tags_json() -> &'static str {
    r##"{"tags": ["#看海", "#一个人的周末", "#治愈", "#海风", "#独处"]}"##
}

/// Content for a successful image call.
#[must_use]
pub fn suggestions_json() -> &'static str {
    r#"{
  "suggestions": [
    {"description": "傍晚的海边，一个人的背影", "keywords": "海边、背影、黄昏", "style": "小清新"},
    {"description": "被风吹起的头发和浪花", "keywords": "海风、浪花、特写", "style": "写实"}
  ]
}"#
}

/// The versions encoded by [`versions_json`].
#[must_use]
pub fn versions() -> Vec<ContentVersion> {
    [
        ("轻松版", "周末一个人去看海，风很大，心情很好 🌊", "活泼有趣，适合日常分享"),
        ("文艺版", "一个人的海边，浪把心事一层层推远。", "有意境，适合深度表达"),
        ("真实版", "周末自己跑去海边吹风，挺爽的。", "口语化，更真实自然"),
    ]
    .into_iter()
    .map(|(style, content, description)| ContentVersion {
        style: style.to_string(),
        content: content.to_string(),
        description: description.to_string(),
    })
    .collect()
}

/// The tags encoded by [`tags_json`].
#[must_use]
pub fn tags() -> Vec<String> {
    ["#看海", "#一个人的周末", "#治愈", "#海风", "#独处"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// The suggestions encoded by [`suggestions_json`].
#[must_use]
pub fn suggestions() -> Vec<ImageSuggestion> {
    vec![
        ImageSuggestion {
            description: "傍晚的海边，一个人的背影".to_string(),
            keywords: "海边、背影、黄昏".to_string(),
            style: "小清新".to_string(),
        },
        ImageSuggestion {
            description: "被风吹起的头发和浪花".to_string(),
            keywords: "海风、浪花、特写".to_string(),
            style: "写实".to_string(),
        },
    ]
}

/// A state as it looks after a successful refine stage.
#[must_use]
pub fn refined_state(user_input: &str) -> ContentState {
    let mut state = ContentState::new(user_input);
    state.apply(StatePatch::RefinedVersions(versions()));
    state
}

/// A client scripted for one fully successful run of the standard pipeline.
#[must_use]
pub fn successful_client() -> ScriptedCompletionClient {
    ScriptedCompletionClient::new()
        .with_content(versions_json())
        .with_content(tags_json())
        .with_content(suggestions_json())
}
