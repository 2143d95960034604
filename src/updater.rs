//! The update routine: wait for credentials, build a client, list labels once.
//!
//! Errors are returned, never acted on; the caller decides what is fatal.

use crate::config::ExporterConfig;
use crate::credentials::{CredentialArtifact, CredentialGate};
use crate::error::{ApiError, Error, Result};
use crate::gmail::{GmailClientFactory, LabelList};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Read-only label access to a mailbox.
pub trait LabelApi {
    /// Lists the labels of `user_id`.
    fn list_labels(
        &self,
        user_id: &str,
    ) -> impl Future<Output = std::result::Result<LabelList, ApiError>> + Send;
}

/// Turns a credential artifact into an API client.
pub trait ClientFactory {
    /// The client produced.
    type Client: LabelApi;

    /// Builds a client from the artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are unusable or the client cannot be set up.
    fn build(&self, artifact: &CredentialArtifact) -> impl Future<Output = Result<Self::Client>>;
}

/// Single-pass update routine.
#[derive(Debug)]
pub struct Updater<F> {
    gate: CredentialGate,
    factory: F,
    user_id: String,
}

impl Updater<GmailClientFactory> {
    /// Creates an updater talking to Gmail as described by `config`.
    #[must_use]
    pub fn from_config(config: &ExporterConfig) -> Self {
        let gate = CredentialGate::new(&config.credentials_path, config.polling.interval)
            .with_max_wait(config.polling.max_wait);

        Self::new(
            gate,
            GmailClientFactory::new(config.clone()),
            config.user_id(),
        )
    }
}

impl<F: ClientFactory> Updater<F> {
    /// Creates an updater from its parts.
    #[must_use]
    pub fn new(gate: CredentialGate, factory: F, user_id: impl Into<String>) -> Self {
        Self {
            gate,
            factory,
            user_id: user_id.into(),
        }
    }

    /// Runs the routine once and returns the fetched labels.
    ///
    /// # Errors
    ///
    /// - [`Error::Cancelled`] if `shutdown` fires before the labels arrive
    /// - any error from the credential gate or client construction
    /// - [`Error::LabelList`] if the API call fails
    #[instrument(name = "Updater::run_once", skip_all, fields(user_id = %self.user_id))]
    pub async fn run_once(&self, shutdown: &CancellationToken) -> Result<LabelList> {
        let artifact = self.gate.wait(shutdown).await?;
        let client = tokio::select! {
            () = shutdown.cancelled() => return Err(Error::Cancelled),
            result = self.factory.build(&artifact) => result?,
        };

        info!("Got gmail client successfully");

        let labels = tokio::select! {
            () = shutdown.cancelled() => return Err(Error::Cancelled),
            result = client.list_labels(&self.user_id) => {
                result.map_err(|source| Error::LabelList { source })?
            }
        };

        info!(label_count = labels.len(), "{labels:?}");

        if labels.is_empty() {
            info!("No labels found.");
        }

        Ok(labels)
    }
}
