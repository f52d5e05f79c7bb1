//! Safe staging service: collects co-signer signatures for Safe
//! transactions before they are executed on-chain.

use std::sync::Arc;

use eyre::WrapErr;
use tracing::{error, info};

use safe_staging_adapters::{gateway_from_config, StagingConfig};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = StagingConfig::from_env().wrap_err("invalid configuration")?;
    let gateway = gateway_from_config(&config).wrap_err("failed to create node clients")?;
    info!(chains = ?gateway.supported_chains(), "node clients ready");

    let app = safe_staging_server::router(Arc::new(gateway));
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("failed to bind {addr}"))?;
    info!(%addr, "safe staging service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server error")?;

    info!("safe staging service stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => {
            error!(error = %e, "cannot listen for ctrl-c; running until killed");
            std::future::pending::<()>().await;
        }
    }
}
