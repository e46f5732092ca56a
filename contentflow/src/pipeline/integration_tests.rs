//! End-to-end runs of the standard pipeline against scripted completions.

#[cfg(test)]
mod tests {
    use crate::completion::{CompletionClient, CompletionResponse, ResponseFormat};
    use crate::config::PipelineConfig;
    use crate::core::{ContentVersion, StageStatus, StatePatch};
    use crate::errors::CompletionError;
    use crate::events::CollectingEventSink;
    use crate::pipeline::{ContentPipeline, FailureMode, PipelineBuilder};
    use crate::stages::{RefineContentStage, GENERATE_TAGS, REFINE_CONTENT, SUGGEST_IMAGES};
    use crate::testing::{
        assert_root_cause, assert_stage_status, fixtures, RecordingStage, ScriptedCompletionClient,
    };
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn standard(client: Arc<ScriptedCompletionClient>, mode: FailureMode) -> ContentPipeline {
        let client: Arc<dyn CompletionClient> = client;
        ContentPipeline::standard(client, &PipelineConfig { failure_mode: mode }).unwrap()
    }

    #[tokio::test]
    async fn test_full_run_populates_every_field() {
        let client = Arc::new(fixtures::successful_client());
        let run = standard(client.clone(), FailureMode::FailFast)
            .run("周末一个人去看海")
            .await;

        assert!(run.is_success());
        assert_eq!(run.state.refined_versions, fixtures::versions());
        assert_eq!(run.state.tags, fixtures::tags());
        assert_eq!(run.state.image_suggestions, fixtures::suggestions());
        assert!(run.state.error.is_none());
        assert_eq!(client.call_count(), 3);
        assert_eq!(client.remaining(), 0);
    }

    #[tokio::test]
    async fn test_calls_use_expected_temperatures_and_inputs() {
        let client = Arc::new(fixtures::successful_client());
        standard(client.clone(), FailureMode::FailFast)
            .run("周末一个人去看海")
            .await;

        let requests = client.requests();
        let temperatures: Vec<f32> = requests.iter().map(|r| r.temperature).collect();
        assert_eq!(temperatures, vec![0.8, 0.7, 0.7]);
        assert!(requests
            .iter()
            .all(|r| r.response_format == ResponseFormat::JsonObject));

        assert!(requests[0].prompt().contains("周末一个人去看海"));
        let primary = &fixtures::versions()[0].content;
        assert!(requests[1].prompt().contains(primary.as_str()));
        assert!(requests[2].prompt().contains(primary.as_str()));
    }

    #[tokio::test]
    async fn test_first_call_failure_fail_fast() {
        let client = Arc::new(ScriptedCompletionClient::new().with_failure("connection refused"));
        let run = standard(client.clone(), FailureMode::FailFast).run("x").await;

        assert!(run.state.refined_versions.is_empty());
        assert!(run.state.tags.is_empty());
        assert!(run.state.image_suggestions.is_empty());
        assert!(run.state.error.as_deref().is_some_and(|e| !e.is_empty()));
        assert_root_cause(&run, REFINE_CONTENT);
        assert_stage_status(&run, GENERATE_TAGS, StageStatus::Skip);
        assert_stage_status(&run, SUGGEST_IMAGES, StageStatus::Skip);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_first_call_failure_continue_on_failure() {
        let client = Arc::new(ScriptedCompletionClient::new().with_failure("connection refused"));
        let run = standard(client.clone(), FailureMode::ContinueOnFailure)
            .run("x")
            .await;

        assert!(run.state.refined_versions.is_empty());
        assert!(run.state.tags.is_empty());
        assert!(run.state.image_suggestions.is_empty());
        assert!(run.state.error.as_deref().unwrap().starts_with("文案生成失败: "));
        // Downstream stages skip on empty input without calling the model.
        assert_stage_status(&run, GENERATE_TAGS, StageStatus::Skip);
        assert_stage_status(&run, SUGGEST_IMAGES, StageStatus::Skip);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_second_call_failure_continue_on_failure() {
        let client = Arc::new(
            ScriptedCompletionClient::new()
                .with_content(fixtures::versions_json())
                .with_response(Err(CompletionError::Status {
                    status: 502,
                    body: "bad gateway".to_string(),
                }))
                .with_content(fixtures::suggestions_json()),
        );
        let run = standard(client.clone(), FailureMode::ContinueOnFailure)
            .run("x")
            .await;

        assert!(!run.state.refined_versions.is_empty());
        assert!(run.state.tags.is_empty());
        assert!(!run.state.image_suggestions.is_empty());
        assert!(run.state.error.as_deref().unwrap().starts_with("标签生成失败: "));
        assert_root_cause(&run, GENERATE_TAGS);
        assert_stage_status(&run, SUGGEST_IMAGES, StageStatus::Ok);
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_second_call_failure_fail_fast() {
        let client = Arc::new(
            ScriptedCompletionClient::new()
                .with_content(fixtures::versions_json())
                .with_failure("timed out")
                .with_content(fixtures::suggestions_json()),
        );
        let run = standard(client.clone(), FailureMode::FailFast).run("x").await;

        assert_stage_status(&run, REFINE_CONTENT, StageStatus::Ok);
        assert_stage_status(&run, GENERATE_TAGS, StageStatus::Fail);
        assert_stage_status(&run, SUGGEST_IMAGES, StageStatus::Skip);
        assert_root_cause(&run, GENERATE_TAGS);
        assert!(run.state.image_suggestions.is_empty());
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_root_cause_survives_later_failure() {
        let client = Arc::new(
            ScriptedCompletionClient::new()
                .with_content(fixtures::versions_json())
                .with_failure("tags down")
                .with_failure("images down"),
        );
        let run = standard(client, FailureMode::ContinueOnFailure).run("x").await;

        let root = run.root_cause().unwrap();
        assert_eq!(root.stage, GENERATE_TAGS);
        assert!(root.message.contains("tags down"));
        assert!(run.state.error.as_deref().unwrap().starts_with("配图建议生成失败: "));
    }

    #[tokio::test]
    async fn test_versions_pass_through_unchanged() {
        let client = Arc::new(
            ScriptedCompletionClient::new()
                .with_content(r#"{"versions":[{"style":"A","content":"C","description":"D"}]}"#)
                .with_content(fixtures::tags_json())
                .with_content(fixtures::suggestions_json()),
        );
        let run = standard(client, FailureMode::FailFast).run("x").await;

        assert_eq!(
            run.state.refined_versions,
            vec![ContentVersion {
                style: "A".to_string(),
                content: "C".to_string(),
                description: "D".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_fenced_payload_is_accepted() {
        let fenced = format!("```json\n{}\n```", fixtures::versions_json());
        let client = Arc::new(
            ScriptedCompletionClient::new()
                .with_content(fenced)
                .with_content(fixtures::tags_json())
                .with_content(fixtures::suggestions_json()),
        );
        let run = standard(client, FailureMode::FailFast).run("x").await;

        assert!(run.is_success());
        assert_eq!(run.state.refined_versions, fixtures::versions());
    }

    #[tokio::test]
    async fn test_usage_metadata_lands_on_records() {
        let response = CompletionResponse {
            content: fixtures::versions_json().to_string(),
            model: Some("test-model".to_string()),
            input_tokens: Some(120),
            output_tokens: Some(80),
            ..CompletionResponse::default()
        };
        let client = Arc::new(
            ScriptedCompletionClient::new()
                .with_response(Ok(response))
                .with_content(fixtures::tags_json())
                .with_content(fixtures::suggestions_json()),
        );
        let run = standard(client, FailureMode::FailFast).run("x").await;

        let record = run.record(REFINE_CONTENT).unwrap();
        assert_eq!(
            record.metadata.get("llm.total_tokens"),
            Some(&serde_json::json!(200))
        );
        assert!(record.ended_at >= record.started_at);
    }

    #[tokio::test]
    async fn test_downstream_stage_sees_refined_state() {
        let client: Arc<dyn CompletionClient> =
            Arc::new(ScriptedCompletionClient::new().with_content(fixtures::versions_json()));
        let recorder = Arc::new(RecordingStage::new("observer"));
        let pipeline = PipelineBuilder::new("observed")
            .stage(Arc::new(RefineContentStage::new(client)))
            .stage(recorder.clone())
            .build()
            .unwrap();

        pipeline.run("x").await;

        let seen = recorder.seen_states();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].refined_versions, fixtures::versions());
        assert!(seen[0].tags.is_empty());
    }

    #[tokio::test]
    async fn test_standard_run_event_stream() {
        let sink = Arc::new(CollectingEventSink::new());
        let client = Arc::new(fixtures::successful_client());
        standard(client, FailureMode::FailFast)
            .with_event_sink(sink.clone())
            .run("x")
            .await;

        assert_eq!(sink.events_of_type("stage.started").len(), 3);
        assert_eq!(sink.events_of_type("stage.completed").len(), 3);
        assert_eq!(
            sink.event_types().last().map(String::as_str),
            Some("pipeline.completed")
        );
    }

    #[test]
    fn test_patch_kinds_cover_state_fields() {
        let fields: Vec<&str> = [
            StatePatch::RefinedVersions(vec![]),
            StatePatch::Tags(vec![]),
            StatePatch::ImageSuggestions(vec![]),
        ]
        .iter()
        .map(StatePatch::field)
        .collect();
        assert_eq!(fields, vec!["refined_versions", "tags", "image_suggestions"]);
    }
}
