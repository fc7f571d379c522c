//! End-to-end tests against a real NATS server.
//!
//! Most require Docker (uses testcontainers to spin up NATS). Those are marked
//! `#[ignore]` so they don't run in CI without Docker. The rest use no server
//! or a minimal in-process one.
//!
//! Run with:
//!   cargo test -p trogon-inbox-relay --test relay_e2e -- --include-ignored

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures_util::StreamExt as _;
use testcontainers_modules::nats::Nats;
use testcontainers_modules::testcontainers::{ContainerAsync, runners::AsyncRunner};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tower::ServiceExt as _;
use trogon_inbox_relay::{DEFAULT_MESSAGE, Envelope, RelayHandler, publish, router};
use trogon_nats::{NatsConfig, NatsConnector, connect};

// ── Helpers ───────────────────────────────────────────────────────────────────

async fn start_nats() -> (ContainerAsync<Nats>, u16) {
    let container: ContainerAsync<Nats> = Nats::default()
        .start()
        .await
        .expect("Failed to start NATS container — is Docker running?");
    let port = container.get_host_port_ipv4(4222).await.unwrap();
    (container, port)
}

fn nats_config(port: u16) -> NatsConfig {
    NatsConfig::from_url(format!("nats://127.0.0.1:{port}"))
}

/// In-process server speaking just enough of the NATS protocol for a client to
/// connect and flush. Advertises `max_payload` and records every PUB line.
async fn start_fake_nats(max_payload: usize) -> (u16, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let pubs = Arc::new(Mutex::new(Vec::new()));
    let seen = pubs.clone();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let seen = seen.clone();
            tokio::spawn(async move {
                let (read, mut write) = socket.into_split();
                let info = format!(
                    "INFO {{\"server_id\":\"fake\",\"max_payload\":{max_payload},\"proto\":1}}\r\n"
                );
                if write.write_all(info.as_bytes()).await.is_err() {
                    return;
                }
                let mut lines = BufReader::new(read).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if line.starts_with("PING") {
                        if write.write_all(b"PONG\r\n").await.is_err() {
                            return;
                        }
                    } else if line.starts_with("PUB ") {
                        seen.lock().unwrap().push(line);
                    }
                }
            });
        }
    });

    (port, pubs)
}

async fn post(app: axum::Router, body: &'static str) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// The envelope body is published on `{runner}.response` with `inbox_id` as
/// the reply subject, and the caller gets 200 with the byte count.
#[tokio::test]
#[ignore = "requires Docker"]
async fn relays_body_to_runner_response_with_inbox_reply() {
    let (_container, port) = start_nats().await;
    let observer = connect(&nats_config(port)).await.unwrap();
    let mut sub = observer.subscribe("workerA.response").await.unwrap();
    observer.flush().await.unwrap();

    let app = router(RelayHandler::new(NatsConnector::new(nats_config(port))));
    let body = "  {\"inbox_id\":\"abc123\",\"runner\":\"workerA\",\"output\":{\"ok\":true}}  ";

    let (status, text) = post(app, body).await;

    assert_eq!(status, StatusCode::OK, "unexpected body: {text}");
    assert_eq!(
        text,
        format!("Published {} bytes to: \"runner\"", body.trim().len())
    );

    let msg = tokio::time::timeout(Duration::from_secs(5), sub.next())
        .await
        .expect("timed out waiting for NATS message")
        .expect("subscriber closed");
    assert_eq!(msg.payload.as_ref(), body.trim().as_bytes());
    assert_eq!(msg.reply.as_deref(), Some("abc123"));
}

/// A responder replying to the received message reaches the inbox named in
/// the envelope.
#[tokio::test]
#[ignore = "requires Docker"]
async fn runner_reply_reaches_inbox() {
    let (_container, port) = start_nats().await;
    let observer = connect(&nats_config(port)).await.unwrap();
    let mut runner_sub = observer.subscribe("r1.response").await.unwrap();
    let mut inbox_sub = observer.subscribe("in-1").await.unwrap();
    observer.flush().await.unwrap();

    let client = connect(&nats_config(port)).await.unwrap();
    let envelope = Envelope::decode(br#"{"inbox_id":"in-1","runner":"r1"}"#).unwrap();
    publish(&client, &envelope, trogon_inbox_relay::extract_message(b""))
        .await
        .unwrap();

    let msg = tokio::time::timeout(Duration::from_secs(5), runner_sub.next())
        .await
        .expect("timed out waiting for relayed message")
        .expect("subscriber closed");
    assert_eq!(msg.payload.as_ref(), DEFAULT_MESSAGE.as_bytes());

    let reply = msg.reply.expect("relayed message must carry a reply subject");
    observer.publish(reply, "ack".into()).await.unwrap();

    let ack = tokio::time::timeout(Duration::from_secs(5), inbox_sub.next())
        .await
        .expect("timed out waiting for inbox reply")
        .expect("subscriber closed");
    assert_eq!(ack.payload.as_ref(), b"ack");
}

/// An invalid envelope is rejected and nothing reaches the broker.
#[tokio::test]
#[ignore = "requires Docker"]
async fn invalid_envelope_publishes_nothing() {
    let (_container, port) = start_nats().await;
    let observer = connect(&nats_config(port)).await.unwrap();
    let mut sub = observer.subscribe(">").await.unwrap();
    observer.flush().await.unwrap();

    let app = router(RelayHandler::new(NatsConnector::new(nats_config(port))));
    let (status, text) = post(app, "hello").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(text, "Error unmarshalling request body");

    let result = tokio::time::timeout(Duration::from_millis(200), sub.next()).await;
    assert!(result.is_err(), "must not publish on decode failure");
}

/// With no server listening, the caller gets 500 carrying the connect error.
#[tokio::test]
async fn unreachable_broker_returns_500() {
    let mut config = NatsConfig::from_url("nats://127.0.0.1:1");
    config.connect_timeout = Some(Duration::from_secs(2));
    let app = router(RelayHandler::new(NatsConnector::new(config)));

    let (status, text) = post(app, r#"{"inbox_id":"i","runner":"r"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        text.starts_with("can not connect to nats: "),
        "unexpected body: {text}"
    );
}

/// A body larger than the server's `max_payload` is refused by the client:
/// the caller gets 500 with the publish error and nothing goes on the wire.
#[tokio::test]
async fn oversized_body_returns_500_without_publishing() {
    let (port, pubs) = start_fake_nats(32).await;
    let app = router(RelayHandler::new(NatsConnector::new(nats_config(port))));
    let body = r#"{"inbox_id":"abc123","runner":"workerA","output":"well over thirty-two bytes"}"#;

    let (status, text) = post(app, body).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(text, "can not publish to NATS: max payload size exceeded");
    assert!(pubs.lock().unwrap().is_empty());
}

/// Within the limit the same server receives the publish with the reply set.
#[tokio::test]
async fn body_within_max_payload_is_published() {
    let (port, pubs) = start_fake_nats(1024).await;
    let app = router(RelayHandler::new(NatsConnector::new(nats_config(port))));
    let body = r#"{"inbox_id":"abc123","runner":"workerA"}"#;

    let (status, text) = post(app, body).await;

    assert_eq!(status, StatusCode::OK, "unexpected body: {text}");
    assert_eq!(
        *pubs.lock().unwrap(),
        vec![format!("PUB workerA.response abc123 {}", body.len())]
    );
}
