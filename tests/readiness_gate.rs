//! Timing behaviour of the credential gate, on tokio's paused clock.

mod common;

use common::{LogCapture, WAITING_MESSAGE};
use gmail_exporter::CredentialGate;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;

const INTERVAL: Duration = Duration::from_secs(10);

#[tokio::test(start_paused = true)]
async fn test_gate_keeps_waiting_while_absent() {
    let logs = LogCapture::default();
    let dir = tempfile::tempdir().unwrap();
    let gate = CredentialGate::new(dir.path().join("credentials"), INTERVAL);
    let shutdown = CancellationToken::new();

    let result = tokio::time::timeout(Duration::from_secs(3600), gate.wait(&shutdown))
        .with_subscriber(logs.dispatch())
        .await;

    assert!(result.is_err(), "gate returned without an artifact");
    assert!(logs.count(WAITING_MESSAGE) >= 360);
}

#[tokio::test(start_paused = true)]
async fn test_gate_returns_within_one_interval_of_arrival() {
    let logs = LogCapture::default();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials");
    let gate = CredentialGate::new(&path, INTERVAL);
    let shutdown = CancellationToken::new();

    let arrival = Duration::from_secs(25);
    let creator = async {
        tokio::time::sleep(arrival).await;
        std::fs::write(&path, b"").unwrap();
    };

    let started = Instant::now();
    let (artifact, ()) = async { tokio::join!(gate.wait(&shutdown), creator) }
        .with_subscriber(logs.dispatch())
        .await;
    let elapsed = started.elapsed();

    let artifact = artifact.expect("gate should return once the file exists");
    assert!(artifact.is_empty());
    assert!(elapsed >= arrival);
    assert!(elapsed <= arrival + INTERVAL);

    // Checks at 0s, 10s and 20s found nothing
    assert_eq!(logs.count(WAITING_MESSAGE), 3);
}

#[tokio::test(start_paused = true)]
async fn test_gate_returns_immediately_when_present() {
    let logs = LogCapture::default();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials");
    std::fs::write(&path, br#"{"token": "abc"}"#).unwrap();

    let started = Instant::now();
    let artifact = CredentialGate::new(&path, INTERVAL)
        .wait(&CancellationToken::new())
        .with_subscriber(logs.dispatch())
        .await
        .unwrap();

    assert!(!artifact.is_empty());
    assert!(started.elapsed() < INTERVAL);
    assert_eq!(logs.count(WAITING_MESSAGE), 0);
}
