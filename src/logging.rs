//! Log output setup.
//!
//! The exporter never installs a global subscriber. [`LoggingConfig::dispatch`]
//! builds a [`Dispatch`] that the entry point attaches to the work it runs:
//!
//! ```
//! use gmail_exporter::logging::LoggingConfig;
//! use tracing::instrument::WithSubscriber;
//!
//! # async fn example() {
//! let dispatch = LoggingConfig::default().dispatch(std::io::stdout);
//! async { tracing::info!("hello") }.with_subscriber(dispatch).await;
//! # }
//! ```

use tracing::Dispatch;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// How log lines are rendered.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Emit ANSI colour codes.
    pub ansi: bool,
    /// Filter directive. `None` reads `RUST_LOG`, falling back to [`DEFAULT_DIRECTIVE`].
    pub directive: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            ansi: true,
            directive: None,
        }
    }
}

impl LoggingConfig {
    /// Plain-text output with a fixed filter, independent of the environment.
    #[must_use]
    pub fn plain(directive: impl Into<String>) -> Self {
        Self {
            ansi: false,
            directive: Some(directive.into()),
        }
    }

    fn filter(&self) -> EnvFilter {
        match &self.directive {
            Some(directive) => EnvFilter::new(directive),
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE)),
        }
    }

    /// Builds a text formatter writing to `writer`, with timestamps disabled.
    pub fn dispatch<W>(&self, writer: W) -> Dispatch
    where
        W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
    {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(self.filter())
            .with_writer(writer)
            .with_ansi(self.ansi)
            .without_time()
            .with_target(false)
            .finish();

        Dispatch::new(subscriber)
    }
}
