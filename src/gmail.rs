//! Gmail REST client.
//!
//! Only `users.labels.list` is implemented. Requests carry the bearer token from
//! [`Credentials`]; no refresh is attempted.

use crate::config::ExporterConfig;
use crate::credentials::{AmbientTokenSource, ApplicationDefault, CredentialArtifact, Credentials};
use crate::error::{ApiError, Error, Result};
use crate::updater::{ClientFactory, LabelApi};
use serde::Deserialize;
use tracing::{debug, instrument};

/// Response of `users.labels.list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LabelList {
    /// Labels in the mailbox. Gmail omits the field when there are none.
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl LabelList {
    /// Number of labels returned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if the mailbox reported no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// A single Gmail label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    /// Immutable label id (`INBOX`, `Label_12`, ...).
    pub id: String,
    /// Display name.
    pub name: String,
    /// `system` or `user`.
    #[serde(rename = "type")]
    pub label_type: Option<String>,
    /// Visibility of messages with this label in the message list.
    pub message_list_visibility: Option<String>,
    /// Visibility of the label in the label list.
    pub label_list_visibility: Option<String>,
    /// Total messages with this label.
    pub messages_total: Option<u64>,
    /// Unread messages with this label.
    pub messages_unread: Option<u64>,
    /// Total threads with this label.
    pub threads_total: Option<u64>,
    /// Unread threads with this label.
    pub threads_unread: Option<u64>,
}

/// Google API error envelope.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Authorized client for the Gmail API.
pub struct GmailClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl GmailClient {
    /// Builds a client from parsed credentials.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HttpClient`] if the underlying HTTP client cannot be
    /// configured (for example, the TLS backend fails to initialise).
    pub fn new(credentials: Credentials, config: &ExporterConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = config.timeouts.request {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.timeouts.connect {
            builder = builder.connect_timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|source| Error::HttpClient { source })?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            credentials,
        })
    }

    /// Lists the labels of `user_id` (`me` for the token's owner).
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails, Gmail answers with a
    /// non-success status, or the body cannot be decoded.
    #[instrument(name = "GmailClient::list_labels", skip(self), fields(user_id = %user_id))]
    pub async fn list_labels(&self, user_id: &str) -> std::result::Result<LabelList, ApiError> {
        let url = format!("{}/gmail/v1/users/{user_id}/labels", self.base_url);

        debug!(url = %url, "Requesting label list");

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.credentials.access_token())
            .send()
            .await
            .map_err(|source| ApiError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }

        let labels = response
            .json::<LabelList>()
            .await
            .map_err(|source| ApiError::Decode { url, source })?;

        debug!(label_count = labels.len(), "Label list received");

        Ok(labels)
    }
}

impl std::fmt::Debug for GmailClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GmailClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl LabelApi for GmailClient {
    async fn list_labels(&self, user_id: &str) -> std::result::Result<LabelList, ApiError> {
        GmailClient::list_labels(self, user_id).await
    }
}

/// Builds a [`ApiError::Status`] from a non-success response body.
fn status_error(status: u16, body: &str) -> ApiError {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => match error.status {
            Some(code) => format!("{} ({code})", error.message),
            None => error.message,
        },
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    };

    ApiError::Status { status, message }
}

/// Builds [`GmailClient`]s from credential artifacts.
///
/// Empty artifacts are resolved through `S`, application-default credentials
/// unless another source is supplied.
#[derive(Debug, Clone)]
pub struct GmailClientFactory<S = ApplicationDefault> {
    config: ExporterConfig,
    ambient: S,
}

impl GmailClientFactory {
    /// Creates a factory using the scope, endpoint and timeouts of `config`.
    #[must_use]
    pub fn new(config: ExporterConfig) -> Self {
        Self::with_token_source(config, ApplicationDefault)
    }
}

impl<S: AmbientTokenSource> GmailClientFactory<S> {
    /// Creates a factory that asks `ambient` for a token when the artifact is empty.
    #[must_use]
    pub fn with_token_source(config: ExporterConfig, ambient: S) -> Self {
        Self { config, ambient }
    }
}

impl<S: AmbientTokenSource> ClientFactory for GmailClientFactory<S> {
    type Client = GmailClient;

    async fn build(&self, artifact: &CredentialArtifact) -> Result<GmailClient> {
        let credentials = Credentials::resolve(artifact, &self.config.scope, &self.ambient).await?;
        GmailClient::new(credentials, &self.config)
    }
}
