//! Request logging middleware.
//!
//! Every request gets a correlation ID (taken from `X-Correlation-Id` if the
//! caller supplied one, generated otherwise) that is echoed back on the
//! response and attached to every log line for that request. `/health` is
//! excluded from the start/completion log lines so liveness-probe traffic
//! doesn't drown out real webhook activity.

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{error, info, warn};

const HEALTH_PATH: &str = "/health";

pub async fn request_logging_middleware(mut request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let skip_logging = uri.path() == HEALTH_PATH;
    let start = std::time::Instant::now();

    let correlation_id = request
        .headers()
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    request.extensions_mut().insert(correlation_id.clone());

    if !skip_logging {
        info!(correlation_id = %correlation_id, %method, %uri, "request started");
    }

    let mut response = next.run(request).await;
    let duration = start.elapsed();

    if let Ok(header_value) = correlation_id.parse() {
        response
            .headers_mut()
            .insert("x-correlation-id", header_value);
    }

    if !skip_logging {
        let status = response.status();
        if status.is_server_error() {
            error!(correlation_id = %correlation_id, %method, %uri, %status, duration_ms = %duration.as_millis(), "request completed with server error");
        } else if status.is_client_error() {
            warn!(correlation_id = %correlation_id, %method, %uri, %status, duration_ms = %duration.as_millis(), "request completed with client error");
        } else {
            info!(correlation_id = %correlation_id, %method, %uri, %status, duration_ms = %duration.as_millis(), "request completed");
        }
    }

    response
}

#[cfg(test)]
#[path = "middleware_tests.rs"]
mod tests;
