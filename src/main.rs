use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use region_api::config::{AppConfig, Args};
use region_api::server::{self, AppState};
use region_api::{DriverRegistry, RegionRepository};

fn init_logging(db_debug: bool) {
    let default = if db_debug {
        "info,region_api=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config = AppConfig::from_args(args).unwrap_or_else(|err| {
        eprintln!("failed to load configuration: {err}");
        std::process::exit(1);
    });

    init_logging(config.database.db_debug);

    let registry = Arc::new(DriverRegistry::with_builtin());
    let regions = match RegionRepository::new(
        Arc::clone(&registry),
        Arc::new(config.database.clone()),
    ) {
        Ok(repo) => repo,
        Err(err) => {
            tracing::error!(error = %err, available = ?registry.names(), "invalid database configuration");
            std::process::exit(1);
        }
    };

    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(err) => {
            tracing::error!(host = %config.host, port = config.port, error = %err, "invalid listen address");
            std::process::exit(1);
        }
    };

    tracing::info!(engine = %config.database.db_driver, "starting region service");
    let state = AppState {
        regions: Arc::new(regions),
    };
    if let Err(err) = server::serve(addr, state, shutdown_signal()).await {
        tracing::error!(error = %err, "server exited with error");
        std::process::exit(1);
    }
}
