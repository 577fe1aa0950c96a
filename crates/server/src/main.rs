//! Shot sequencer HTTP service.
//!
//! Reads its settings from the environment (see `ServiceConfig`) and the
//! provider key from `ANTHROPIC_API_KEY`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use llm_client::LlmClient;
use llm_client::anthropic::AnthropicClient;
use server::{AppState, FixedWindowLimiter, ImageAnalyzer, SequencePlanner, ServiceConfig, router};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,pipeline=debug")),
        )
        .init();

    info!("Starting shot sequencer");

    let config = ServiceConfig::from_env();
    let client: Arc<dyn LlmClient> =
        Arc::new(AnthropicClient::from_env().context("Failed to configure model client")?);
    info!(
        "Using {} (vision: {}, sequence: {}, timeout {:?})",
        client.provider_name(),
        config.vision.model,
        config.sequence.model,
        config.model_timeout
    );

    let state = AppState {
        planner: Arc::new(SequencePlanner::new(client.clone(), config.planner_config())),
        analyzer: Arc::new(ImageAnalyzer::new(client, config.analyzer_config())),
        limiter: Arc::new(FixedWindowLimiter::new(
            config.rate_limit_window,
            config.rate_limit_max_requests,
        )),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
