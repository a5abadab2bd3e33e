//! # Webhook Gateway Core
//!
//! Provider-agnostic building blocks for the webhook ingestion gateway:
//! configuration loading, the webhook request model, signature verification,
//! and hierarchical subject derivation.
//!
//! This crate deliberately knows nothing about HTTP or the message broker —
//! see `webhook-gateway-service` and `webhook-gateway-broker` for those
//! concerns. Keeping the cryptography and subject grammar here means they can
//! be unit tested without spinning up a server or a broker connection.

pub mod config;
pub mod error;
pub mod request;
pub mod signature;
pub mod subject;

pub use config::{ConfigError, GatewayConfig};
pub use error::ValidationError;
pub use request::{Provider, WebhookRequest};
pub use signature::{GithubSignatureVerifier, GitlabTokenVerifier, SignatureVerifier};
pub use subject::Subject;
