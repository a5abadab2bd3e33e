//! Broker client abstraction and its JetStream implementation.

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::error::BrokerError;
use crate::retry::RetryPolicy;

/// Retention rules for a provisioned stream.
///
/// The gateway never deletes a stream itself; these bounds only tell the
/// broker when to discard its own oldest messages.
#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    pub max_age: std::time::Duration,
    pub max_messages: i64,
}

impl RetentionPolicy {
    /// ~180 days, uncapped message count beyond the age bound.
    pub fn default_for_provider_stream() -> Self {
        Self {
            max_age: std::time::Duration::from_secs(180 * 24 * 60 * 60),
            max_messages: 10_000_000,
        }
    }
}

/// A connection to the message broker: stream provisioning plus
/// at-least-once publish with retry.
///
/// Implementations must guarantee that `publish` only returns `Ok` once the
/// broker has acknowledged receipt of exactly the bytes given — this is the
/// property the rest of the gateway relies on to decide when it is safe to
/// answer the HTTP request.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Idempotently ensures a stream named `name` exists, capturing
    /// `subjects` (typically a single wildcard like `github.>`), with the
    /// given retention. Safe to call on every startup.
    async fn ensure_stream(
        &self,
        name: &str,
        subjects: Vec<String>,
        retention: RetentionPolicy,
    ) -> Result<(), BrokerError>;

    /// Publishes `payload` on `subject`, retrying transient failures
    /// according to `policy` until it succeeds, a permanent failure occurs,
    /// retries are exhausted, or `cancellation` fires.
    async fn publish_with_retry(
        &self,
        subject: &str,
        payload: Bytes,
        policy: &RetryPolicy,
        cancellation: &CancellationToken,
    ) -> Result<(), BrokerError>;
}

/// Runs the retry loop around a single-attempt publish closure.
///
/// Shared between [`NatsBrokerClient`] and the in-memory test double so both
/// exercise the exact same backoff-and-cancellation behaviour.
pub(crate) async fn retry_publish<F, Fut>(
    subject: &str,
    policy: &RetryPolicy,
    cancellation: &CancellationToken,
    mut attempt_once: F,
) -> Result<(), BrokerError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<(), BrokerError>>,
{
    let mut attempt = 0u32;
    loop {
        if cancellation.is_cancelled() {
            return Err(BrokerError::Cancelled);
        }

        match attempt_once().await {
            Ok(()) => return Ok(()),
            Err(err) if !err.is_transient() => return Err(err),
            Err(err) if !policy.should_retry(attempt) => {
                warn!(subject, attempts = attempt + 1, "publish retries exhausted");
                return Err(BrokerError::RetriesExhausted {
                    attempts: attempt + 1,
                    source: Box::new(err),
                });
            }
            Err(err) => {
                let delay = policy.calculate_delay(attempt);
                debug!(subject, attempt, ?delay, error = %err, "retrying publish after transient error");
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancellation.cancelled() => return Err(BrokerError::Cancelled),
                }
                attempt += 1;
            }
        }
    }
}

/// A [`BrokerClient`] backed by a single long-lived NATS connection with
/// JetStream enabled.
pub struct NatsBrokerClient {
    jetstream: async_nats::jetstream::Context,
}

impl NatsBrokerClient {
    /// Connects to `url`, optionally authenticating with `auth_token`.
    #[instrument(skip(auth_token))]
    pub async fn connect(url: &str, auth_token: Option<&str>) -> Result<Self, BrokerError> {
        info!(url, "connecting to broker");

        // Reconnection itself is unbounded and handled transparently by the
        // client; we only fix the delay between attempts at 2s so publishes
        // block on a predictable cadence during an outage rather than a
        // default that grows unbounded.
        let options = async_nats::ConnectOptions::new()
            .retry_on_initial_connect()
            .reconnect_delay_callback(|_attempts| std::time::Duration::from_secs(2))
            .event_callback(|event| async move {
                match event {
                    async_nats::Event::Disconnected => warn!("disconnected from broker"),
                    async_nats::Event::Connected => info!("(re)connected to broker"),
                    async_nats::Event::ClientError(e) => warn!(error = %e, "broker client error"),
                    other => debug!(?other, "broker connection event"),
                }
            });

        let client = match auth_token {
            Some(token) => options.token(token.to_string()).connect(url).await,
            None => options.connect(url).await,
        }
        .map_err(|e| BrokerError::Connection(e.to_string()))?;

        let jetstream = async_nats::jetstream::new(client);

        Ok(Self { jetstream })
    }
}

#[async_trait]
impl BrokerClient for NatsBrokerClient {
    #[instrument(skip(self))]
    async fn ensure_stream(
        &self,
        name: &str,
        subjects: Vec<String>,
        retention: RetentionPolicy,
    ) -> Result<(), BrokerError> {
        let config = async_nats::jetstream::stream::Config {
            name: name.to_string(),
            subjects,
            max_age: retention.max_age,
            max_messages: retention.max_messages,
            storage: async_nats::jetstream::stream::StorageType::File,
            discard: async_nats::jetstream::stream::DiscardPolicy::Old,
            ..Default::default()
        };

        match self.jetstream.get_stream(name).await {
            Ok(_) => {
                debug!(stream = name, "stream already exists");
                Ok(())
            }
            Err(_) => {
                info!(stream = name, "creating stream");
                self.jetstream
                    .create_stream(config)
                    .await
                    .map(|_| ())
                    .map_err(|e| BrokerError::StreamProvisioning(e.to_string()))
            }
        }
    }

    #[instrument(skip(self, payload), fields(subject = %subject, bytes = payload.len()))]
    async fn publish_with_retry(
        &self,
        subject: &str,
        payload: Bytes,
        policy: &RetryPolicy,
        cancellation: &CancellationToken,
    ) -> Result<(), BrokerError> {
        retry_publish(subject, policy, cancellation, || {
            let subject = subject.to_string();
            let payload = payload.clone();
            async move {
                let ack = self
                    .jetstream
                    .publish(subject, payload)
                    .await
                    .map_err(|e| BrokerError::Connection(e.to_string()))?;

                ack.await
                    .map_err(|e| BrokerError::AckFailed(e.to_string()))?;

                Ok(())
            }
        })
        .await
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
