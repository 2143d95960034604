//! Process-level policy: what counts as fatal and which exit status it maps to.

use crate::config::ExporterConfig;
use crate::error::{Error, Result};
use crate::gmail::LabelList;
use crate::updater::Updater;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Labels were fetched and logged.
    Completed,
    /// Shutdown was requested before the work finished.
    Cancelled,
    /// An unrecoverable error was logged.
    Fatal,
}

impl Outcome {
    /// Process exit status for this outcome.
    #[must_use]
    pub fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Completed | Outcome::Cancelled => ExitCode::SUCCESS,
            Outcome::Fatal => ExitCode::FAILURE,
        }
    }
}

/// Logs the result of a run and classifies it.
pub fn report(result: &Result<LabelList>) -> Outcome {
    match result {
        Ok(_) => Outcome::Completed,
        Err(Error::Cancelled) => {
            info!("Shutdown requested, bye!");
            Outcome::Cancelled
        }
        Err(e) => {
            error!(
                category = %e.category(),
                retryable = e.is_retryable(),
                "{}",
                e.report()
            );
            Outcome::Fatal
        }
    }
}

/// Builds the configuration and runs the update routine once.
pub async fn run(config: Result<ExporterConfig>, shutdown: CancellationToken) -> Outcome {
    info!(version = env!("CARGO_PKG_VERSION"), "gmail-exporter");

    let result = match config {
        Ok(config) => {
            info!(?config, "Configuration loaded");
            Updater::from_config(&config).run_once(&shutdown).await
        }
        Err(e) => Err(e),
    };

    report(&result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn test_outcomes() {
        assert_eq!(report(&Ok(LabelList::default())), Outcome::Completed);
        assert_eq!(report(&Err(Error::Cancelled)), Outcome::Cancelled);

        let err = Error::LabelList {
            source: ApiError::Status {
                status: 403,
                message: "forbidden".into(),
            },
        };
        assert_eq!(report(&Err(err)), Outcome::Fatal);
    }

    #[tokio::test]
    async fn test_invalid_config_is_fatal() {
        let config = ExporterConfig::builder().user_id("nobody").build();
        assert_eq!(run(config, CancellationToken::new()).await, Outcome::Fatal);
    }

    #[tokio::test]
    async fn test_cancelled_before_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExporterConfig::builder()
            .credentials_path(dir.path().join("credentials"))
            .build();
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        assert_eq!(run(config, shutdown).await, Outcome::Cancelled);
    }
}
