//! Error types for the gmail-exporter crate.
//!
//! All errors implement [`std::error::Error`] and provide context about what went wrong.
//! Errors are categorized by their retryability - see [`Error::is_retryable`].
//!
//! Failures of the Gmail HTTP call itself are described by [`ApiError`] and reach
//! callers wrapped in [`Error::LabelList`].

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while waiting for credentials or talking to Gmail.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration / validation errors (NOT retryable)
    // ─────────────────────────────────────────────────────────────────────────
    /// Invalid configuration provided.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// The user id is neither `me` nor a valid email address.
    #[error("invalid user id: {user_id}")]
    InvalidUserId {
        /// The rejected user id.
        user_id: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Credential errors (NOT retryable - the artifact won't fix itself)
    // ─────────────────────────────────────────────────────────────────────────
    /// The credential artifact exists but could not be read.
    #[error("failed to read credentials from {}", .path.display())]
    ReadCredentials {
        /// Path of the credential artifact.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The credential artifact is not a valid token file.
    #[error("failed to parse credentials")]
    ParseCredentials {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The credential artifact parsed but is unusable.
    #[error("invalid credentials: {message}")]
    InvalidCredentials {
        /// Why the credentials were rejected.
        message: String,
    },

    /// The artifact was empty and no ambient credentials could be obtained.
    #[error("failed to obtain application default credentials")]
    AmbientCredentials {
        /// Why the lookup failed.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The credentials were not granted the scope needed to read labels.
    #[error("credentials do not grant scope {required}")]
    InsufficientScope {
        /// The scope that was required.
        required: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    HttpClient {
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Waiting errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The credential artifact did not appear before the configured deadline.
    #[error("credentials did not appear at {} within {timeout:?}", .path.display())]
    CredentialsTimeout {
        /// Path that was polled.
        path: PathBuf,
        /// The deadline that was exceeded.
        timeout: Duration,
    },

    /// Shutdown was requested before the work completed.
    #[error("shutdown requested")]
    Cancelled,

    // ─────────────────────────────────────────────────────────────────────────
    // API errors (retryability depends on the wrapped failure)
    // ─────────────────────────────────────────────────────────────────────────
    /// The label list call failed.
    #[error("Label list")]
    LabelList {
        /// The underlying API failure.
        #[source]
        source: ApiError,
    },
}

/// Failures of a single Gmail API request.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// The request could not be sent or the connection failed.
    #[error("request to {url} failed")]
    Request {
        /// The request URL.
        url: String,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// Gmail answered with a non-success status.
    #[error("gmail API returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message reported by the API (or the raw body).
        message: String,
    },

    /// The response body was not the expected JSON document.
    #[error("failed to decode response from {url}")]
    Decode {
        /// The request URL.
        url: String,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// Returns `true` if repeating the request might succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Request { .. } => true,
            // 429 and 5xx are transient on Google APIs
            ApiError::Status { status, .. } => *status == 429 || *status >= 500,
            ApiError::Decode { .. } => false,
        }
    }
}

impl Error {
    /// Returns `true` if this error represents a transient failure that might succeed on retry.
    ///
    /// Nothing in this crate retries on its own; the classification is exposed for
    /// callers and for logging.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::LabelList { source } => source.is_retryable(),

            Error::CredentialsTimeout { .. } => true,

            Error::InvalidConfig { .. }
            | Error::InvalidUserId { .. }
            | Error::ReadCredentials { .. }
            | Error::ParseCredentials { .. }
            | Error::InvalidCredentials { .. }
            | Error::AmbientCredentials { .. }
            | Error::InsufficientScope { .. }
            | Error::HttpClient { .. }
            | Error::Cancelled => false,
        }
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidConfig { .. } | Error::InvalidUserId { .. } | Error::HttpClient { .. } => {
                ErrorCategory::Configuration
            }

            Error::ReadCredentials { .. }
            | Error::ParseCredentials { .. }
            | Error::InvalidCredentials { .. }
            | Error::AmbientCredentials { .. }
            | Error::InsufficientScope { .. } => ErrorCategory::Credentials,

            Error::CredentialsTimeout { .. } => ErrorCategory::Timeout,

            Error::Cancelled => ErrorCategory::Cancelled,

            Error::LabelList { source } => match source {
                ApiError::Request { .. } => ErrorCategory::Network,
                ApiError::Status { .. } | ApiError::Decode { .. } => ErrorCategory::Api,
            },
        }
    }

    /// Renders the error followed by its chain of sources, joined with `": "`.
    ///
    /// ```
    /// use gmail_exporter::{ApiError, Error};
    ///
    /// let err = Error::LabelList {
    ///     source: ApiError::Status { status: 503, message: "backend error".into() },
    /// };
    /// assert_eq!(err.report(), "Label list: gmail API returned 503: backend error");
    /// ```
    #[must_use]
    pub fn report(&self) -> String {
        let mut rendered = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            rendered.push_str(": ");
            rendered.push_str(&cause.to_string());
            source = cause.source();
        }
        rendered
    }
}

/// Error categories for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Configuration or validation errors.
    Configuration,
    /// Unreadable, malformed or insufficient credentials.
    Credentials,
    /// Network connectivity errors.
    Network,
    /// The API rejected the request or answered garbage.
    Api,
    /// Timeout errors.
    Timeout,
    /// Shutdown was requested.
    Cancelled,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Credentials => write!(f, "credentials"),
            ErrorCategory::Network => write!(f, "network"),
            ErrorCategory::Api => write!(f, "api"),
            ErrorCategory::Timeout => write!(f, "timeout"),
            ErrorCategory::Cancelled => write!(f, "cancelled"),
        }
    }
}
