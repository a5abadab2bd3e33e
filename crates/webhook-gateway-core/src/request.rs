//! The provider-agnostic request model the rest of the crate operates on.
//!
//! The HTTP layer in `webhook-gateway-service` is responsible for turning an
//! axum request into a [`WebhookRequest`]; everything downstream of that
//! (signature verification, subject derivation) only ever sees this type.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// The webhook source. New providers are added here first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    GitHub,
    GitLab,
}

impl Provider {
    /// The lowercase token used as the first segment of a derived subject.
    pub fn as_subject_token(&self) -> &'static str {
        match self {
            Provider::GitHub => "github",
            Provider::GitLab => "gitlab",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_subject_token())
    }
}

/// A normalized inbound webhook request, independent of the HTTP framework.
///
/// `headers` holds every header the provider sends that this crate cares
/// about, keyed by lowercase header name. Signature verification and subject
/// derivation both read from here rather than from axum's `HeaderMap`
/// directly, which keeps them testable without constructing real HTTP
/// requests.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    pub provider: Provider,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
    pub received_at: DateTime<Utc>,
}

impl WebhookRequest {
    pub fn new(provider: Provider, headers: HashMap<String, String>, body: Bytes) -> Self {
        Self {
            provider,
            headers,
            body,
            received_at: Utc::now(),
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(|v| v.as_str())
    }

    /// The provider's event-kind header (`X-GitHub-Event` / `X-Gitlab-Event`).
    pub fn event_name(&self) -> Option<&str> {
        match self.provider {
            Provider::GitHub => self.header("x-github-event"),
            Provider::GitLab => self.header("x-gitlab-event"),
        }
    }

    /// Parses the body as JSON. Returns `None` on malformed input; callers
    /// decide how to map that to a [`crate::error::ValidationError`].
    pub fn json_body(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }
}
