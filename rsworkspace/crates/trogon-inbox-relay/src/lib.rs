//! # trogon-inbox-relay
//!
//! Relays a runner's output into the NATS inbox of whoever is waiting for it.
//!
//! ## How it works
//!
//! 1. A caller sends an HTTP request whose body is a JSON envelope:
//!    `{"inbox_id": "...", "runner": "...", "output": <any>}`.
//! 2. The relay opens a dedicated NATS connection (TLS + credentials file).
//! 3. The body, trimmed of surrounding whitespace, is published to
//!    `{runner}.response` with `inbox_id` as the reply subject.
//! 4. The connection is closed and the outcome is returned: `200` with
//!    `Published <n> bytes to: "runner"`, or `500` with the failure.
//!
//! No retries: a failed connect, decode, or publish ends the invocation.
//!
//! ## Configuration (env vars)
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `RELAY_PORT` | `8082` | HTTP listening port |
//! | `RELAY_PUBLISH_TIMEOUT_SECS` | none | Deadline for publish + flush |
//! | `NATS_URL` | `tls://connect.ngs.global` | NATS server URL(s) |
//! | `NATS_CREDS` | `/var/openfaas/secrets/nts-tkn` | Credentials file; empty disables |
//! | `NATS_REQUIRE_TLS` | `true` for `tls://` URLs | Force TLS |
//! | `NATS_CONNECT_TIMEOUT_SECS` | client default | Connect deadline |

pub mod config;
pub mod envelope;
pub mod error;
pub mod relay;
pub mod server;

pub use config::RelayConfig;
pub use envelope::{DEFAULT_MESSAGE, Envelope, extract_message};
pub use error::RelayError;
pub use relay::{Published, RelayHandler, RelayRequest, RelayResponse, publish};
pub use server::{router, serve};
