use super::*;
use crate::retry::RetryPolicy;
use std::time::Duration;

fn fast_policy() -> RetryPolicy {
    RetryPolicy::new(4, Duration::from_millis(1), Duration::from_millis(5), 2.0)
}

#[tokio::test]
async fn ensure_stream_is_idempotent() {
    let client = InMemoryBrokerClient::new();
    client
        .ensure_stream("github", vec!["github.>".to_string()], RetentionPolicy::default_for_provider_stream())
        .await
        .unwrap();
    client
        .ensure_stream("github", vec!["github.>".to_string()], RetentionPolicy::default_for_provider_stream())
        .await
        .unwrap();

    assert_eq!(client.streams(), vec!["github".to_string()]);
}

#[tokio::test]
async fn publish_records_subject_and_payload() {
    let client = InMemoryBrokerClient::new();
    let cancellation = CancellationToken::new();

    client
        .publish_with_retry(
            "gitlab.grp.proj.push",
            Bytes::from_static(b"{}"),
            &fast_policy(),
            &cancellation,
        )
        .await
        .unwrap();

    let published = client.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].0, "gitlab.grp.proj.push");
    assert_eq!(published[0].1, Bytes::from_static(b"{}"));
}

#[tokio::test]
async fn permanently_rejected_subject_fails_without_retry() {
    let client = InMemoryBrokerClient::new();
    client.reject_permanently("github.bad.subject.push");
    let cancellation = CancellationToken::new();

    let result = client
        .publish_with_retry(
            "github.bad.subject.push",
            Bytes::from_static(b"{}"),
            &fast_policy(),
            &cancellation,
        )
        .await;

    assert!(matches!(result, Err(BrokerError::Rejected(_))));
    assert!(client.published().is_empty());
}
