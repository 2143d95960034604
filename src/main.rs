use gmail_exporter::logging::LoggingConfig;
use gmail_exporter::{app, ExporterConfig};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let dispatch = LoggingConfig::default().dispatch(std::io::stdout);
    let shutdown = CancellationToken::new();

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        }
    });

    app::run(ExporterConfig::builder().build(), shutdown)
        .with_subscriber(dispatch)
        .await
        .exit_code()
}
