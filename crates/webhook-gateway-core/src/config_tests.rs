use super::*;

fn builder_with(broker_url: &str) -> config::ConfigBuilder<config::builder::DefaultState> {
    config::Config::builder()
        .set_default("server.host", "0.0.0.0")
        .unwrap()
        .set_default("server.port", 8080)
        .unwrap()
        .set_default("server.max_body_bytes", 1024 * 1024)
        .unwrap()
        .set_default("broker.max_publish_attempts", 10)
        .unwrap()
        .set_override("broker.url", broker_url)
        .unwrap()
}

#[test]
fn defaults_are_applied_when_only_broker_url_is_set() {
    let config: GatewayConfig = builder_with("nats://localhost:4222")
        .build()
        .unwrap()
        .try_deserialize()
        .unwrap();

    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.broker.max_publish_attempts, 10);
    assert!(config.secrets.github.is_none());
    assert!(config.secrets.gitlab.is_none());
}

#[test]
fn overrides_win_over_defaults() {
    let config: GatewayConfig = builder_with("nats://localhost:4222")
        .set_override("server.port", 9000)
        .unwrap()
        .set_override("secrets.github", "ghsecret")
        .unwrap()
        .build()
        .unwrap()
        .try_deserialize()
        .unwrap();

    assert_eq!(config.server.port, 9000);
    assert_eq!(config.secrets.github.as_deref(), Some("ghsecret"));
}

#[test]
fn missing_broker_url_is_rejected() {
    let config: GatewayConfig = config::Config::builder()
        .set_default("server.host", "0.0.0.0")
        .unwrap()
        .set_default("server.port", 8080)
        .unwrap()
        .set_default("server.max_body_bytes", 1024 * 1024)
        .unwrap()
        .set_default("broker.max_publish_attempts", 10)
        .unwrap()
        .set_default("broker.url", "")
        .unwrap()
        .build()
        .unwrap()
        .try_deserialize()
        .unwrap();

    assert!(config.broker.url.trim().is_empty());
}

#[test]
fn secret_debug_output_is_redacted() {
    let secrets = ProviderSecrets {
        github: Some("super-secret".to_string()),
        gitlab: None,
    };
    let rendered = format!("{secrets:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("REDACTED"));
}

#[test]
fn provider_secrets_lookup_by_provider() {
    let secrets = ProviderSecrets {
        github: Some("gh".to_string()),
        gitlab: None,
    };
    assert_eq!(
        secrets.for_provider(crate::request::Provider::GitHub),
        Some("gh")
    );
    assert_eq!(secrets.for_provider(crate::request::Provider::GitLab), None);
}
