//! Binary entry point for the webhook gateway.
//!
//! Loads configuration, opens the broker connection, provisions the
//! `github` and `gitlab` streams, and serves HTTP until asked to shut down.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use webhook_gateway_broker::{BrokerClient, NatsBrokerClient, RetentionPolicy, RetryPolicy};
use webhook_gateway_core::GatewayConfig;
use webhook_gateway_service::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "webhook_gateway_service=info,webhook_gateway_broker=info,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("starting webhook gateway");

    let config = match GatewayConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            std::process::exit(1);
        }
    };

    if config.secrets.github.is_none() {
        tracing::warn!("no GitHub webhook secret configured; /github will reject all requests");
    }
    if config.secrets.gitlab.is_none() {
        tracing::warn!("no GitLab webhook secret configured; /gitlab will reject all requests");
    }

    let broker = NatsBrokerClient::connect(&config.broker.url, config.broker.auth_token.as_deref())
        .await
        .map_err(|e| {
            error!(error = %e, "failed to connect to broker");
            anyhow::anyhow!("broker connection failed: {e}")
        })?;

    let retention = RetentionPolicy::default_for_provider_stream();
    broker
        .ensure_stream("github", vec!["github.>".to_string()], retention)
        .await?;
    broker
        .ensure_stream("gitlab", vec!["gitlab.>".to_string()], retention)
        .await?;

    let retry_policy = RetryPolicy::new(
        config.broker.max_publish_attempts,
        std::time::Duration::from_secs(1),
        std::time::Duration::from_secs(60),
        2.0,
    );

    let state = AppState {
        config: Arc::new(config),
        broker: Arc::new(broker),
        retry_policy: Arc::new(retry_policy),
        shutdown: CancellationToken::new(),
    };

    webhook_gateway_service::serve(state).await?;

    Ok(())
}
