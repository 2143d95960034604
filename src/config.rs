//! Configuration for the exporter.
//!
//! Every field has a default matching the exporter's fixed behaviour, so the
//! minimal configuration is simply:
//!
//! ```
//! use gmail_exporter::ExporterConfig;
//!
//! let config = ExporterConfig::builder().build().expect("valid config");
//! assert_eq!(config.user_id(), "me");
//! ```

use crate::error::{Error, Result};
use email_address::EmailAddress;
use std::path::PathBuf;
use std::time::Duration;

/// Default location of the credential artifact, relative to the working directory.
pub const DEFAULT_CREDENTIALS_PATH: &str = "credentials";

/// Alias Gmail understands as "the authenticated user".
pub const DEFAULT_USER_ID: &str = "me";

/// Production Gmail API endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://gmail.googleapis.com";

/// Read-only scope requested for label access.
pub const GMAIL_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

/// Configuration for the credential gate and the Gmail client.
///
/// Create using [`ExporterConfig::builder()`].
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// Path whose existence gates client construction.
    pub credentials_path: PathBuf,
    /// Mailbox whose labels are listed (`me` or an email address).
    user_id: String,
    /// Base URL of the Gmail API, without a trailing slash.
    pub api_base_url: String,
    /// Scope the credentials must grant.
    pub scope: String,
    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
    /// Polling configuration for the credential gate.
    pub polling: PollingConfig,
}

impl ExporterConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ExporterConfigBuilder {
        ExporterConfigBuilder::default()
    }

    /// Returns the validated user id.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

/// Timeouts for API requests.
///
/// `None` leaves the HTTP client's default in place.
#[derive(Debug, Clone, Default)]
pub struct TimeoutConfig {
    /// Timeout for establishing the TCP/TLS connection.
    pub connect: Option<Duration>,
    /// Timeout for a whole request, response body included.
    pub request: Option<Duration>,
}

/// Polling configuration for the credential gate.
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Interval between existence checks.
    pub interval: Duration,
    /// Give up after this long; `None` waits until shutdown.
    pub max_wait: Option<Duration>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_wait: None,
        }
    }
}

/// Accepts `me` or a syntactically valid email address.
fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id == DEFAULT_USER_ID || EmailAddress::is_valid(user_id) {
        Ok(())
    } else {
        Err(Error::InvalidUserId {
            user_id: user_id.to_string(),
        })
    }
}

/// Builder for [`ExporterConfig`].
#[derive(Debug, Default)]
pub struct ExporterConfigBuilder {
    credentials_path: Option<PathBuf>,
    user_id: Option<String>,
    api_base_url: Option<String>,
    scope: Option<String>,
    timeouts: Option<TimeoutConfig>,
    polling: Option<PollingConfig>,
}

impl ExporterConfigBuilder {
    /// Sets the path of the credential artifact.
    ///
    /// Default is `credentials` in the working directory.
    #[must_use]
    pub fn credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }

    /// Sets the mailbox whose labels are listed.
    ///
    /// Default is `me`, the authenticated user.
    #[must_use]
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Sets the Gmail API base URL (used to point the client at a test server).
    #[must_use]
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Sets the scope the credentials must grant.
    #[must_use]
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Sets timeout configuration.
    #[must_use]
    pub fn timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = Some(timeouts);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts
            .get_or_insert_with(TimeoutConfig::default)
            .request = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts
            .get_or_insert_with(TimeoutConfig::default)
            .connect = Some(timeout);
        self
    }

    /// Sets polling configuration.
    #[must_use]
    pub fn polling(mut self, polling: PollingConfig) -> Self {
        self.polling = Some(polling);
        self
    }

    /// Sets the interval between credential checks.
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.polling
            .get_or_insert_with(PollingConfig::default)
            .interval = interval;
        self
    }

    /// Sets the maximum time to wait for the credential artifact.
    #[must_use]
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.polling
            .get_or_insert_with(PollingConfig::default)
            .max_wait = Some(max_wait);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the user id, base URL or poll interval is invalid.
    pub fn build(self) -> Result<ExporterConfig> {
        let user_id = self.user_id.unwrap_or_else(|| DEFAULT_USER_ID.to_string());
        validate_user_id(&user_id)?;

        let api_base_url = self
            .api_base_url
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        reqwest::Url::parse(&api_base_url).map_err(|e| Error::InvalidConfig {
            message: format!("invalid API base URL {api_base_url}: {e}"),
        })?;

        let polling = self.polling.unwrap_or_default();
        if polling.interval.is_zero() {
            return Err(Error::InvalidConfig {
                message: "poll interval must be non-zero".into(),
            });
        }

        Ok(ExporterConfig {
            credentials_path: self
                .credentials_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH)),
            user_id,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            scope: self
                .scope
                .unwrap_or_else(|| GMAIL_READONLY_SCOPE.to_string()),
            timeouts: self.timeouts.unwrap_or_default(),
            polling,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = ExporterConfig::builder().build().unwrap();

        assert_eq!(config.credentials_path, PathBuf::from("credentials"));
        assert_eq!(config.user_id(), "me");
        assert_eq!(config.api_base_url, "https://gmail.googleapis.com");
        assert_eq!(config.scope, GMAIL_READONLY_SCOPE);
        assert_eq!(config.polling.interval, Duration::from_secs(10));
        assert!(config.polling.max_wait.is_none());
        assert!(config.timeouts.request.is_none());
    }

    #[test]
    fn test_builder_full() {
        let config = ExporterConfig::builder()
            .credentials_path("/var/lib/exporter/token.json")
            .user_id("user@example.com")
            .api_base_url("http://127.0.0.1:8080/")
            .request_timeout(Duration::from_secs(20))
            .poll_interval(Duration::from_secs(1))
            .max_wait(Duration::from_secs(60))
            .build()
            .unwrap();

        assert_eq!(config.user_id(), "user@example.com");
        assert_eq!(config.api_base_url, "http://127.0.0.1:8080");
        assert_eq!(config.timeouts.request, Some(Duration::from_secs(20)));
        assert_eq!(config.polling.interval, Duration::from_secs(1));
        assert_eq!(config.polling.max_wait, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_invalid_user_id() {
        let result = ExporterConfig::builder().user_id("not-an-address").build();
        assert!(matches!(result, Err(Error::InvalidUserId { .. })));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = ExporterConfig::builder().api_base_url("not a url").build();
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_unbounded_max_wait_accepted() {
        let config = ExporterConfig::builder()
            .max_wait(Duration::MAX)
            .build()
            .unwrap();
        assert_eq!(config.polling.max_wait, Some(Duration::MAX));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let result = ExporterConfig::builder()
            .poll_interval(Duration::ZERO)
            .build();
        assert!(result.is_err());
    }
}
