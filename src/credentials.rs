//! Credential readiness gate and token parsing.
//!
//! The exporter does not run an OAuth flow itself. Something else drops a token
//! file at a known path; [`CredentialGate::wait`] blocks until it shows up and
//! [`Credentials::resolve`] turns it into a bearer token. An artifact with no
//! content defers to an [`AmbientTokenSource`], by default Google's
//! application-default credentials.

use crate::error::{Error, Result};
use secrecy::{ExposeSecret, SecretSlice, SecretString};
use serde::Deserialize;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Scopes that allow reading labels, besides the read-only one.
const BROADER_GMAIL_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/gmail.modify",
    "https://mail.google.com/",
];

/// Raw credential bytes observed at the gate's path.
pub struct CredentialArtifact {
    path: PathBuf,
    bytes: SecretSlice<u8>,
}

impl CredentialArtifact {
    /// Wraps bytes read from `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            bytes: SecretSlice::from(bytes),
        }
    }

    /// Path the artifact was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if the artifact carried no bytes (empty file or a directory).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.expose_secret().is_empty()
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        self.bytes.expose_secret()
    }
}

impl std::fmt::Debug for CredentialArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialArtifact")
            .field("path", &self.path)
            .field("len", &self.bytes().len())
            .finish()
    }
}

/// Blocks until the credential artifact exists.
#[derive(Debug, Clone)]
pub struct CredentialGate {
    path: PathBuf,
    interval: Duration,
    max_wait: Option<Duration>,
}

impl CredentialGate {
    /// Creates a gate polling `path` every `interval`, without a deadline.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            path: path.into(),
            interval,
            max_wait: None,
        }
    }

    /// Gives up with [`Error::CredentialsTimeout`] once `max_wait` has elapsed.
    #[must_use]
    pub fn with_max_wait(mut self, max_wait: Option<Duration>) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Path being polled.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Waits for the artifact and returns its contents.
    ///
    /// The path is checked immediately and then once per interval. Only a
    /// "not found" result counts as absent.
    ///
    /// # Errors
    ///
    /// - [`Error::Cancelled`] if `shutdown` fires while waiting
    /// - [`Error::CredentialsTimeout`] if the deadline passes
    /// - [`Error::ReadCredentials`] if the artifact exists but cannot be read
    #[instrument(
        name = "CredentialGate::wait",
        skip_all,
        fields(path = %self.path.display(), interval_secs = self.interval.as_secs())
    )]
    pub async fn wait(&self, shutdown: &CancellationToken) -> Result<CredentialArtifact> {
        // Too far in the future to represent means no deadline at all.
        let deadline = self
            .max_wait
            .and_then(|max_wait| Instant::now().checked_add(max_wait));

        loop {
            if shutdown.is_cancelled() {
                return Err(Error::Cancelled);
            }

            if let Some(artifact) = self.probe().await? {
                debug!(len = artifact.bytes().len(), "Credentials found");
                return Ok(artifact);
            }

            let mut nap = self.interval;
            if let (Some(deadline), Some(timeout)) = (deadline, self.max_wait) {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Err(Error::CredentialsTimeout {
                        path: self.path.clone(),
                        timeout,
                    });
                }
                nap = nap.min(remaining);
            }

            info!("Credentials does not exist. Sleeping.");

            tokio::select! {
                () = shutdown.cancelled() => return Err(Error::Cancelled),
                () = tokio::time::sleep(nap) => {}
            }
        }
    }

    /// Checks the path once; `None` means the artifact is absent.
    async fn probe(&self) -> Result<Option<CredentialArtifact>> {
        match tokio::fs::metadata(&self.path).await {
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Ok(metadata) if metadata.is_dir() => Ok(Some(CredentialArtifact::new(
                self.path.clone(),
                Vec::new(),
            ))),
            Ok(_) => self.read().await.map(Some),
            Err(e) => {
                warn!(error = %e, "Could not stat credentials, treating them as present");
                self.read().await.map(Some)
            }
        }
    }

    async fn read(&self) -> Result<CredentialArtifact> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| Error::ReadCredentials {
                path: self.path.clone(),
                source,
            })?;

        Ok(CredentialArtifact::new(self.path.clone(), bytes))
    }
}

/// Supplies a bearer token when the credential artifact carries none.
pub trait AmbientTokenSource {
    /// Fetches an access token granting `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbientCredentials`] if no token can be obtained.
    fn token(&self, scope: &str) -> impl Future<Output = Result<SecretString>>;
}

/// Google application-default credentials.
///
/// Looks at `GOOGLE_APPLICATION_CREDENTIALS`, the gcloud configuration
/// directory and the GCE metadata server, in that order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplicationDefault;

impl AmbientTokenSource for ApplicationDefault {
    #[instrument(name = "ApplicationDefault::token", skip(self))]
    async fn token(&self, scope: &str) -> Result<SecretString> {
        let provider = gcp_auth::provider()
            .await
            .map_err(|e| Error::AmbientCredentials { source: e.into() })?;

        let token = provider
            .token(&[scope])
            .await
            .map_err(|e| Error::AmbientCredentials { source: e.into() })?;

        Ok(SecretString::from(token.as_str().to_string()))
    }
}

/// Authorized-user token file, as written by Google's OAuth libraries.
#[derive(Deserialize)]
struct TokenFile {
    #[serde(alias = "access_token")]
    token: Option<String>,
    #[serde(default)]
    scopes: Option<Vec<String>>,
    #[serde(default)]
    scope: Option<String>,
}

/// Parsed credentials: a bearer token and the scopes it was granted.
#[derive(Clone)]
pub struct Credentials {
    access_token: SecretString,
    scopes: Option<Vec<String>>,
}

impl Credentials {
    /// Turns an artifact into credentials.
    ///
    /// Artifacts with content are parsed with [`Credentials::parse`]. An empty
    /// artifact (an empty file or a directory) asks `ambient` for a token
    /// instead; construction fails only if that lookup fails too.
    ///
    /// # Errors
    ///
    /// Anything [`Credentials::parse`] returns, or [`Error::AmbientCredentials`].
    pub async fn resolve<S: AmbientTokenSource>(
        artifact: &CredentialArtifact,
        required_scope: &str,
        ambient: &S,
    ) -> Result<Self> {
        if !artifact.is_empty() {
            return Self::parse(artifact, required_scope);
        }

        info!("Credential artifact is empty, falling back to ambient credentials");
        let access_token = ambient.token(required_scope).await?;

        Ok(Self {
            access_token,
            scopes: Some(vec![required_scope.to_string()]),
        })
    }

    /// Parses an artifact and checks that it grants `required_scope`.
    ///
    /// Files that do not list their scopes are accepted as-is; the API will
    /// reject the token if it lacks access.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCredentials`] for an empty artifact or a missing token
    ///   (use [`Credentials::resolve`] to fall back to ambient credentials)
    /// - [`Error::ParseCredentials`] if the bytes are not a token file
    /// - [`Error::InsufficientScope`] if the listed scopes do not cover `required_scope`
    pub fn parse(artifact: &CredentialArtifact, required_scope: &str) -> Result<Self> {
        if artifact.is_empty() {
            return Err(Error::InvalidCredentials {
                message: "credential artifact is empty".into(),
            });
        }

        let file: TokenFile = serde_json::from_slice(artifact.bytes())
            .map_err(|source| Error::ParseCredentials { source })?;

        let token = file
            .token
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| Error::InvalidCredentials {
                message: "no access token in credential artifact".into(),
            })?;

        let scopes = file.scopes.or_else(|| {
            file.scope
                .map(|scope| scope.split_whitespace().map(str::to_string).collect())
        });

        let credentials = Self {
            access_token: SecretString::from(token.trim().to_string()),
            scopes,
        };

        if !credentials.grants(required_scope) {
            return Err(Error::InsufficientScope {
                required: required_scope.to_string(),
            });
        }

        Ok(credentials)
    }

    /// Returns `true` if the credentials allow what `required_scope` allows.
    #[must_use]
    pub fn grants(&self, required_scope: &str) -> bool {
        let Some(scopes) = &self.scopes else {
            return true;
        };

        scopes.iter().any(|scope| {
            scope == required_scope
                || (required_scope == crate::config::GMAIL_READONLY_SCOPE
                    && BROADER_GMAIL_SCOPES.contains(&scope.as_str()))
        })
    }

    /// Scopes listed in the token file, if any.
    #[must_use]
    pub fn scopes(&self) -> Option<&[String]> {
        self.scopes.as_deref()
    }

    pub(crate) fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .finish()
    }
}
