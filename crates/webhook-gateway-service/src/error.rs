//! Maps the core validation taxonomy and broker failures onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::{error, warn};
use webhook_gateway_broker::BrokerError;
use webhook_gateway_core::ValidationError;

/// Everything that can go wrong handling one ingest request, already
/// classified into the status code it maps to.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Authentication or malformed-request failure. Never retried by us;
    /// the sending provider decides whether to retry its own delivery.
    #[error("request rejected: {0}")]
    Validation(#[from] ValidationError),

    /// The broker could not be made to accept the publish.
    #[error("publish failed: {0}")]
    Broker(#[from] BrokerError),
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            IngestError::Validation(e) => {
                warn!(error = %e, "rejecting webhook request");
                let status = if e.is_authentication_failure() {
                    StatusCode::UNAUTHORIZED
                } else {
                    StatusCode::BAD_REQUEST
                };
                (status, e.to_string())
            }
            IngestError::Broker(e) => {
                error!(error = %e, "failed to publish webhook to broker");
                let status = match e {
                    BrokerError::Rejected(_) | BrokerError::StreamProvisioning(_) => {
                        StatusCode::BAD_GATEWAY
                    }
                    BrokerError::Cancelled => StatusCode::INTERNAL_SERVER_ERROR,
                    BrokerError::Connection(_)
                    | BrokerError::AckFailed(_)
                    | BrokerError::RetriesExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
                };
                (
                    status,
                    "failed to deliver webhook to the message broker".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "status": "error",
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}
