use anyhow::Context;
use skitrack_api::logging::{self, LoggingConfig};
use skitrack_api::{bootstrap, SERVICE_NAME, SERVICE_VERSION};
use skitrack_core::{AppConfig, AppConfigTrait};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;

    logging::init_logging(
        LoggingConfig::from_app_config(&config).with_service(SERVICE_NAME, SERVICE_VERSION),
    )
    .map_err(|err| anyhow::anyhow!(err))
    .context("failed to initialize logging")?;

    for (field, source) in config.config_sources() {
        tracing::debug!(field = %field, %source, "configuration");
    }

    let container = bootstrap::shared_container(&config).context("invalid component graph")?;
    let built = container
        .instantiate_singletons()
        .context("failed to build singletons")?;
    info!(singletons = built, "components warmed up");

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;
    let address = listener.local_addr()?.to_string();
    logging::log_startup_info(SERVICE_NAME, SERVICE_VERSION, &address);

    axum::serve(listener, skitrack_api::app(container))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    logging::log_shutdown_info(SERVICE_NAME);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
    }
}
