mod config;
mod daemon;
mod dbus;
mod error;
mod inventory;
mod model;
mod netlink;
mod resolver;

use std::sync::Arc;

use tracing::{error, info};

pub use error::{Error, Result};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loomd=info".parse().unwrap()),
        )
        .init();

    if let Err(e) = run().await {
        error!("fatal: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    info!("starting loomd");

    let config = config::Config::from_env();
    let netlink: Arc<dyn netlink::LinkControl> = Arc::new(netlink::RtNetlinkAdapter::new());
    let resolver: Arc<dyn resolver::ResolvWrite> =
        Arc::new(resolver::ResolverWriter::new(config.resolv_conf_path.clone()));

    let daemon = daemon::Daemon::start(config, netlink, resolver).await?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("received ctrl-c");
        }
        _ = wait_for_sigterm() => {
            info!("received sigterm");
        }
    }

    daemon.shutdown().await;
    info!("loomd stopped");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{SignalKind, signal};
    match signal(SignalKind::terminate()) {
        Ok(mut sig) => {
            sig.recv().await;
        }
        Err(_) => std::future::pending().await,
    }
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending().await
}
