//! In-memory [`BrokerClient`] for tests.
//!
//! Records every successfully published message and can be configured to
//! fail the first N attempts for a given subject with a transient error
//! before succeeding, so tests can exercise the at-least-once-under-retry
//! property without a real broker.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::client::{retry_publish, BrokerClient, RetentionPolicy};
use crate::error::BrokerError;
use crate::retry::RetryPolicy;

#[derive(Default)]
pub struct InMemoryBrokerClient {
    published: Mutex<Vec<(String, Bytes)>>,
    streams: Mutex<Vec<String>>,
    remaining_failures: Mutex<HashMap<String, u32>>,
    permanently_reject: Mutex<Vec<String>>,
}

impl InMemoryBrokerClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `count` publish attempts for `subject` will fail with a
    /// transient [`BrokerError::Connection`] before an attempt is allowed to
    /// succeed.
    pub fn fail_next(&self, subject: &str, count: u32) {
        self.remaining_failures
            .lock()
            .unwrap()
            .insert(subject.to_string(), count);
    }

    /// Every publish attempt for `subject` will fail permanently.
    pub fn reject_permanently(&self, subject: &str) {
        self.permanently_reject
            .lock()
            .unwrap()
            .push(subject.to_string());
    }

    /// Messages accepted so far, in publish order.
    pub fn published(&self) -> Vec<(String, Bytes)> {
        self.published.lock().unwrap().clone()
    }

    pub fn streams(&self) -> Vec<String> {
        self.streams.lock().unwrap().clone()
    }

    fn attempt_once(&self, subject: &str, payload: &Bytes) -> Result<(), BrokerError> {
        if self
            .permanently_reject
            .lock()
            .unwrap()
            .iter()
            .any(|s| s == subject)
        {
            return Err(BrokerError::Rejected(format!(
                "subject '{subject}' is configured to always reject"
            )));
        }

        let mut remaining = self.remaining_failures.lock().unwrap();
        if let Some(count) = remaining.get_mut(subject) {
            if *count > 0 {
                *count -= 1;
                return Err(BrokerError::Connection(
                    "simulated transient broker failure".to_string(),
                ));
            }
        }
        drop(remaining);

        self.published
            .lock()
            .unwrap()
            .push((subject.to_string(), payload.clone()));
        Ok(())
    }
}

#[async_trait]
impl BrokerClient for InMemoryBrokerClient {
    async fn ensure_stream(
        &self,
        name: &str,
        _subjects: Vec<String>,
        _retention: RetentionPolicy,
    ) -> Result<(), BrokerError> {
        let mut streams = self.streams.lock().unwrap();
        if !streams.iter().any(|s| s == name) {
            streams.push(name.to_string());
        }
        Ok(())
    }

    async fn publish_with_retry(
        &self,
        subject: &str,
        payload: Bytes,
        policy: &RetryPolicy,
        cancellation: &CancellationToken,
    ) -> Result<(), BrokerError> {
        retry_publish(subject, policy, cancellation, || async {
            self.attempt_once(subject, &payload)
        })
        .await
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
