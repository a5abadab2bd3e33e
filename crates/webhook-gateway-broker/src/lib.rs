//! # Webhook Gateway Broker
//!
//! The gateway's only connection to the outside world after a webhook has
//! been authenticated: a JetStream-backed [`client::BrokerClient`] that
//! provisions per-provider streams and republishes raw webhook bodies with
//! bounded retry.

pub mod client;
pub mod error;
pub mod memory;
pub mod retry;

pub use client::{BrokerClient, NatsBrokerClient, RetentionPolicy};
pub use error::BrokerError;
pub use memory::InMemoryBrokerClient;
pub use retry::RetryPolicy;
