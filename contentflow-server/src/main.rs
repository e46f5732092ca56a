use anyhow::Context;
use contentflow::completion::OpenAICompatibleClient;
use contentflow::config::{CompletionConfig, PipelineConfig};
use contentflow::events::LoggingEventSink;
use contentflow::pipeline::ContentPipeline;
use contentflow::service::ContentService;
use contentflow_server::config::ServerConfig;
use contentflow_server::{build_router, init_tracing, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let server_config = ServerConfig::from_env().context("invalid server configuration")?;
    init_tracing(server_config.log_format);

    let completion_config =
        CompletionConfig::from_env().context("invalid completion configuration")?;
    let pipeline_config = PipelineConfig::from_env().context("invalid pipeline configuration")?;

    info!(
        model = %completion_config.model,
        base_url = %completion_config.base_url,
        timeout_seconds = completion_config.timeout_seconds,
        failure_mode = %pipeline_config.failure_mode,
        "Loaded configuration"
    );

    let client = Arc::new(OpenAICompatibleClient::new(completion_config)?);
    let pipeline = ContentPipeline::standard(client, &pipeline_config)?
        .with_event_sink(Arc::new(LoggingEventSink::debug()));
    let app = build_router(AppState::new(ContentService::new(pipeline)));

    let address = server_config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!("Content generator listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
