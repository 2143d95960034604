//! Live tests against the real Gmail API.
//!
//! These tests need a valid OAuth access token and are disabled by default.
//! To run them:
//!
//! ```bash
//! # An access token with the gmail.readonly scope
//! export GMAIL_EXPORTER_TEST_TOKEN="ya29...."
//!
//! # Optional: mailbox other than the token's owner
//! export GMAIL_EXPORTER_TEST_USER="someone@example.com"
//!
//! cargo test --features integration-tests -- --ignored
//! ```

use gmail_exporter::{ExporterConfig, Updater};
use std::env;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

// ─────────────────────────────────────────────────────────────────────────────
// Test Configuration Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn get_test_token() -> Option<String> {
    dotenvy::dotenv().ok();
    env::var("GMAIL_EXPORTER_TEST_TOKEN").ok()
}

fn write_token_file(dir: &std::path::Path, token: &str) {
    let body = serde_json::json!({ "token": token }).to_string();
    std::fs::write(dir.join("credentials"), body).expect("Failed to write token file");
}

fn get_test_config(dir: &std::path::Path) -> ExporterConfig {
    let mut builder = ExporterConfig::builder()
        .credentials_path(dir.join("credentials"))
        .request_timeout(Duration::from_secs(30))
        .max_wait(Duration::from_secs(1));

    if let Ok(user) = env::var("GMAIL_EXPORTER_TEST_USER") {
        builder = builder.user_id(user);
    }

    builder.build().expect("valid test config")
}

// ─────────────────────────────────────────────────────────────────────────────
// Label List Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
#[ignore = "requires a real Gmail access token"]
async fn test_list_labels_live() {
    let token = get_test_token().expect("GMAIL_EXPORTER_TEST_TOKEN must be set");
    let dir = tempfile::tempdir().unwrap();
    write_token_file(dir.path(), &token);

    let labels = Updater::from_config(&get_test_config(dir.path()))
        .run_once(&CancellationToken::new())
        .await
        .expect("Failed to list labels");

    // Every mailbox has the INBOX system label
    assert!(labels.labels.iter().any(|label| label.id == "INBOX"));
}

#[tokio::test]
#[ignore = "requires network access to Gmail"]
async fn test_bogus_token_is_rejected_live() {
    let dir = tempfile::tempdir().unwrap();
    write_token_file(dir.path(), "bogus-token");

    let err = Updater::from_config(&get_test_config(dir.path()))
        .run_once(&CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.report().starts_with("Label list: gmail API returned 401"));
    assert!(!err.is_retryable());
}
