//! Broker-side failure taxonomy.
//!
//! The gateway treats every broker failure as either transient (worth
//! retrying with backoff) or permanent (fail the request immediately). This
//! split, not the underlying NATS error type, is what `webhook-gateway-service`
//! maps to an HTTP status.

/// Failure from a broker operation (stream provisioning or publish).
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// Could not reach the broker, or the connection dropped mid-operation.
    #[error("broker connection failed: {0}")]
    Connection(String),

    /// The broker rejected the publish for a reason a retry cannot fix
    /// (e.g. malformed subject, rejected credentials).
    #[error("broker rejected publish: {0}")]
    Rejected(String),

    /// The broker did not acknowledge the publish before the attempt's
    /// deadline, or acknowledgement itself failed.
    #[error("broker did not acknowledge publish: {0}")]
    AckFailed(String),

    /// Creating or updating a stream failed.
    #[error("stream provisioning failed: {0}")]
    StreamProvisioning(String),

    /// The caller's cancellation token fired before the publish completed.
    #[error("publish cancelled")]
    Cancelled,

    /// Every retry attempt was exhausted without success.
    #[error("publish failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<BrokerError>,
    },
}

impl BrokerError {
    /// Whether this error is worth retrying with backoff.
    ///
    /// [`BrokerError::Rejected`] and [`BrokerError::Cancelled`] are not
    /// transient: a rejected subject will be rejected again, and a
    /// cancelled request should not be retried on behalf of a client that
    /// already disconnected.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BrokerError::Connection(_) | BrokerError::AckFailed(_)
        )
    }
}
