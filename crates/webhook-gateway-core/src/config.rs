//! Startup configuration: broker connection, HTTP server settings, and the
//! per-provider webhook secrets.
//!
//! Configuration is layered with the [`config`] crate: built-in defaults,
//! then an optional `config.toml` in the working directory, then a `.env`
//! file (loaded via [`dotenvy`] before the builder runs, so its values show
//! up as plain process environment variables), then `GATEWAY_*` environment
//! variables, which always win. Missing provider secrets are not a startup
//! error — requests to an unconfigured provider are simply rejected at
//! signature-verification time (see [`crate::error::ValidationError::SecretNotConfigured`]).

use serde::Deserialize;

/// Top-level gateway configuration.
#[derive(Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub broker: BrokerConfig,

    #[serde(default)]
    pub secrets: ProviderSecrets,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("server", &self.server)
            .field("broker", &self.broker)
            .field("secrets", &self.secrets)
            .finish()
    }
}

/// HTTP bind address and the body-size cap enforced before parsing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Request bodies larger than this are rejected with 413 before the
    /// signature is even checked.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Connection details for the JetStream-backed broker.
#[derive(Clone, Deserialize)]
pub struct BrokerConfig {
    /// NATS server URL, e.g. `nats://localhost:4222`.
    pub url: String,
    /// Optional bearer token presented on connect.
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "default_max_publish_attempts")]
    pub max_publish_attempts: u32,
}

fn default_max_publish_attempts() -> u32 {
    10
}

impl std::fmt::Debug for BrokerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerConfig")
            .field("url", &self.url)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "<REDACTED>"),
            )
            .field("max_publish_attempts", &self.max_publish_attempts)
            .finish()
    }
}

/// Per-provider webhook secrets, keyed by provider name (`github`, `gitlab`).
///
/// A missing entry means the provider is unconfigured: requests to its
/// endpoint fail authentication rather than the gateway refusing to start,
/// since operators may deliberately enable only one provider.
#[derive(Clone, Default, Deserialize)]
pub struct ProviderSecrets {
    pub github: Option<String>,
    pub gitlab: Option<String>,
}

impl std::fmt::Debug for ProviderSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSecrets")
            .field("github", &self.github.as_ref().map(|_| "<REDACTED>"))
            .field("gitlab", &self.gitlab.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

impl ProviderSecrets {
    pub fn for_provider(&self, provider: crate::request::Provider) -> Option<&str> {
        match provider {
            crate::request::Provider::GitHub => self.github.as_deref(),
            crate::request::Provider::GitLab => self.gitlab.as_deref(),
        }
    }
}

/// Error produced while loading or validating [`GatewayConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("GATEWAY_BROKER_URL (or broker.url) must be set")]
    MissingBrokerUrl,
}

impl GatewayConfig {
    /// Loads configuration from (in increasing precedence) built-in
    /// defaults, `config.toml`, a `.env` file if present, and `GATEWAY_*`
    /// environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        // Missing .env is fine — only a genuine I/O error past "not found"
        // would be worth surfacing, and dotenvy folds that into Ok(()) for
        // the not-found case already.
        let _ = dotenvy::dotenv();

        let builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.max_body_bytes", 1024 * 1024)?
            .set_default("broker.max_publish_attempts", 10)?
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("GATEWAY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: GatewayConfig = builder.build()?.try_deserialize()?;

        if config.broker.url.trim().is_empty() {
            return Err(ConfigError::MissingBrokerUrl);
        }

        Ok(config)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
