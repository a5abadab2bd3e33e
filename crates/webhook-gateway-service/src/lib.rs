//! # Webhook Gateway Service
//!
//! The axum HTTP layer: three endpoints (`POST /github`, `POST /gitlab`,
//! `GET /health`) wired to [`webhook_gateway_core`] for authentication and
//! subject derivation and to [`webhook_gateway_broker`] for publication.

pub mod error;
pub mod middleware;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{info, instrument};

use error::IngestError;
use webhook_gateway_broker::{BrokerClient, RetryPolicy};
use webhook_gateway_core::{
    request::{Provider, WebhookRequest},
    signature::{GithubSignatureVerifier, GitlabTokenVerifier, SignatureVerifier},
    subject::{build_github_subject, build_gitlab_subject},
    GatewayConfig, ValidationError,
};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub broker: Arc<dyn BrokerClient>,
    pub retry_policy: Arc<RetryPolicy>,
    /// Cancelled on graceful shutdown; in-flight publish retries honour it so
    /// the process doesn't hang waiting out a backoff schedule on exit.
    pub shutdown: CancellationToken,
}

/// Builds the axum [`Router`], with tracing, compression, and a body-size
/// cap enforced ahead of any handler logic.
pub fn create_router(state: AppState) -> Router {
    let max_body_bytes = state.config.server.max_body_bytes;

    Router::new()
        .route("/github", post(handle_github))
        .route("/gitlab", post(handle_gitlab))
        .route("/health", get(handle_health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(axum::middleware::from_fn(
                    middleware::request_logging_middleware,
                ))
                .layer(RequestBodyLimitLayer::new(max_body_bytes)),
        )
        .with_state(state)
}

/// Binds and serves the router until a shutdown signal is received.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", state.config.server.host, state.config.server.port)
        .parse()?;
    let shutdown = state.shutdown.clone();
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "webhook gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            shutdown.cancel();
        })
        .await?;

    info!("webhook gateway shut down");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

#[instrument(skip(state, headers, body))]
async fn handle_github(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, IngestError> {
    let header_map = lowercased_headers(&headers);
    let request = WebhookRequest::new(Provider::GitHub, header_map, body.clone());

    let event_kind = request
        .event_name()
        .ok_or_else(|| ValidationError::MissingHeader {
            header: "x-github-event".to_string(),
        })?
        .to_string();

    let secret = state
        .config
        .secrets
        .for_provider(Provider::GitHub)
        .ok_or_else(|| ValidationError::SecretNotConfigured {
            provider: "github".to_string(),
        })?;

    GithubSignatureVerifier.verify(&body, |name| request.header(name).map(str::to_string), secret)?;

    if event_kind == "ping" {
        return Ok(Json(serde_json::json!({ "status": "pong" })));
    }

    let payload = request.json_body().ok_or_else(|| ValidationError::MalformedJson {
        message: "body is not valid JSON".to_string(),
    })?;

    let subject = build_github_subject(&event_kind, &payload);
    publish(&state, &subject.to_string(), body).await?;

    Ok(Json(serde_json::json!({ "status": "ok" })))
}

#[instrument(skip(state, headers, body))]
async fn handle_gitlab(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, IngestError> {
    let header_map = lowercased_headers(&headers);
    let request = WebhookRequest::new(Provider::GitLab, header_map, body.clone());

    let secret = state
        .config
        .secrets
        .for_provider(Provider::GitLab)
        .ok_or_else(|| ValidationError::SecretNotConfigured {
            provider: "gitlab".to_string(),
        })?;

    GitlabTokenVerifier.verify(&body, |name| request.header(name).map(str::to_string), secret)?;

    let payload = request.json_body().ok_or_else(|| ValidationError::MalformedJson {
        message: "body is not valid JSON".to_string(),
    })?;

    let subject = build_gitlab_subject(&payload);
    publish(&state, &subject.to_string(), body).await?;

    Ok(Json(serde_json::json!({ "status": "ok" })))
}

async fn handle_health() -> Json<Value> {
    Json(serde_json::json!({ "status": "OK" }))
}

async fn publish(state: &AppState, subject: &str, body: Bytes) -> Result<(), IngestError> {
    let cancellation = state.shutdown.child_token();
    state
        .broker
        .publish_with_retry(subject, body, &state.retry_policy, &cancellation)
        .await?;
    Ok(())
}

fn lowercased_headers(headers: &HeaderMap) -> std::collections::HashMap<String, String> {
    headers
        .iter()
        .map(|(k, v)| (k.as_str().to_ascii_lowercase(), v.to_str().unwrap_or("").to_string()))
        .collect()
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
