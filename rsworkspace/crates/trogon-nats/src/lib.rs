//! # trogon-nats
//!
//! NATS plumbing shared by TrogonStack services:
//! - Configuration resolved from `NATS_*` environment variables
//! - One-shot connections over TLS with credentials-file auth
//! - Per-operation client traits so handlers can be tested without a server
//! - Mock clients for testing (with `test-support` feature)
//!
//! ## Example
//!
//! ```rust,no_run
//! use trogon_nats::{NatsConfig, NatsDefaults, connect};
//! use trogon_std::env::SystemEnv;
//!
//! #[tokio::main]
//! async fn main() {
//!     let defaults = NatsDefaults { url: "localhost:4222", credentials: None };
//!     let config = NatsConfig::from_env(&SystemEnv, &defaults);
//!     let client = connect(&config).await.expect("Failed to connect");
//! }
//! ```
//!
//! Depend only on the operations you need:
//!
//! ```rust,no_run
//! use trogon_nats::{FlushClient, PublishReplyClient};
//!
//! pub struct Responder<N: PublishReplyClient + FlushClient> {
//!     nats: N,
//! }
//! ```

pub mod auth;
pub mod client;
pub mod connect;

#[cfg(feature = "test-support")]
pub mod mocks;

pub use auth::{NatsAuth, NatsConfig, NatsDefaults};
pub use client::{CloseClient, Connector, FlushClient, PublishReplyClient};
pub use connect::{ConnectError, NatsConnector, connect};

#[cfg(feature = "test-support")]
pub use mocks::{MockConnector, MockError, MockNatsClient, PublishedMessage};
