//! # gmail-exporter
//!
//! Groundwork for a Prometheus exporter of Gmail label counts.
//!
//! The exporter currently does one thing per process run:
//!
//! 1. Wait until a credential artifact (a token file, `credentials` by default)
//!    exists, re-checking every ten seconds
//! 2. Build a Gmail client scoped to read-only access
//! 3. List the labels of the `me` mailbox and log the result
//!
//! Every failure after the wait is returned as a typed [`Error`]; only the
//! binary's entry point turns it into a non-zero exit status.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gmail_exporter::{ExporterConfig, Updater};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> gmail_exporter::Result<()> {
//! let config = ExporterConfig::builder()
//!     .credentials_path("/var/lib/gmail-exporter/credentials")
//!     .build()?;
//!
//! let labels = Updater::from_config(&config)
//!     .run_once(&CancellationToken::new())
//!     .await?;
//!
//! for label in &labels.labels {
//!     println!("{} ({})", label.name, label.id);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Credential File
//!
//! The artifact is a Google "authorized user" token file, for example:
//!
//! ```json
//! {"token": "ya29....", "scopes": ["https://www.googleapis.com/auth/gmail.readonly"]}
//! ```
//!
//! `access_token` is accepted in place of `token`. The exporter never refreshes it.
//!
//! An empty file (or a directory) at the path still releases the gate. The
//! token then comes from Google's application-default credentials
//! ([`ApplicationDefault`]).
//!
//! ## Observability
//!
//! The crate uses `tracing` for instrumentation. Span names follow
//! `Type::method`:
//!
//! - `CredentialGate::wait` - Waiting for the credential artifact
//! - `Updater::run_once` - One pass of the update routine
//! - `GmailClient::list_labels` - The label list request
//!
//! [`logging::LoggingConfig`] builds the subscriber used by the binary.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
pub mod app;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gmail;
pub mod logging;
pub mod updater;

// Re-exports for ergonomic API
pub use config::{ExporterConfig, ExporterConfigBuilder, PollingConfig, TimeoutConfig};
pub use credentials::{
    AmbientTokenSource, ApplicationDefault, CredentialArtifact, CredentialGate, Credentials,
};
pub use error::{ApiError, Error, ErrorCategory, Result};
pub use gmail::{GmailClient, GmailClientFactory, Label, LabelList};
pub use updater::{ClientFactory, LabelApi, Updater};
