//! Error taxonomy for signature verification and request validation.
//!
//! These are the categories described in the gateway's error handling design:
//! authentication failures and malformed requests. Broker failures live in
//! `webhook-gateway-broker::error` since this crate has no broker dependency.

/// Errors raised while authenticating or parsing an inbound webhook request.
///
/// Every variant here maps to a client-facing 4xx response; none of them are
/// retried and none of them result in a broker publish.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required signature/token header was absent from the request.
    #[error("missing required header: {header}")]
    MissingSignatureHeader { header: String },

    /// A non-signature header needed to process the request (e.g. the event
    /// kind) was absent. Unlike a missing signature, this isn't an
    /// authentication failure — the request never got far enough to be
    /// authenticated.
    #[error("missing required header: {header}")]
    MissingHeader { header: String },

    /// A signature header was present but used an unrecognised prefix.
    #[error("unsupported signature scheme in header '{header}'")]
    UnsupportedScheme { header: String },

    /// The provider secret needed to verify this request was never configured.
    #[error("no webhook secret configured for provider '{provider}'")]
    SecretNotConfigured { provider: String },

    /// Signature/token did not match the computed value.
    #[error("signature verification failed")]
    SignatureMismatch,

    /// A signature header's hex payload could not be decoded.
    #[error("signature is not valid hex: {message}")]
    InvalidHexEncoding { message: String },

    /// The request body could not be parsed as JSON where JSON was required.
    #[error("request body is not valid JSON: {message}")]
    MalformedJson { message: String },
}

impl ValidationError {
    /// `true` for the subset of variants that represent an authentication
    /// failure (401) as opposed to a malformed request (400).
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            ValidationError::MissingSignatureHeader { .. }
                | ValidationError::UnsupportedScheme { .. }
                | ValidationError::SecretNotConfigured { .. }
                | ValidationError::SignatureMismatch
                | ValidationError::InvalidHexEncoding { .. }
        )
    }
}
