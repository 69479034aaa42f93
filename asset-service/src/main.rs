use std::sync::Arc;

use tokio::signal;

use asset_core::observability::init_tracing;
use asset_service::config::AssetConfig;
use asset_service::services::audit::InMemoryAuditSink;
use asset_service::services::drive::HttpDriveClient;
use asset_service::services::metrics::init_metrics;
use asset_service::services::storage::LocalStorage;
use asset_service::services::store::{
    InMemoryAssetStore, InMemoryConnectionStore, InMemoryMembershipStore,
};
use asset_service::services::token::ConnectionTokenSource;
use asset_service::startup::{Application, Collaborators};

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Membership, connection and asset stores are in-memory in this build;
/// swap these for database-backed implementations when wiring the tenant
/// directory and asset catalog.
async fn default_collaborators(config: &AssetConfig) -> std::io::Result<Collaborators> {
    let connections = Arc::new(InMemoryConnectionStore::new());

    let storage = LocalStorage::new(config.storage.local_path.clone())
        .await
        .map_err(|e| {
            tracing::error!(
                "Failed to initialize local storage at {}: {}",
                config.storage.local_path,
                e
            );
            std::io::Error::other(format!("Storage initialization error: {}", e))
        })?;

    let drive = HttpDriveClient::new(
        config.drive.api_base_url.clone(),
        std::time::Duration::from_secs(config.drive.timeout_seconds),
    )
    .map_err(|e| {
        tracing::error!("Failed to build Drive client: {}", e);
        std::io::Error::other(format!("Drive client error: {}", e))
    })?;

    Ok(Collaborators {
        memberships: Arc::new(InMemoryMembershipStore::new()),
        connections: connections.clone(),
        assets: Arc::new(InMemoryAssetStore::new()),
        storage: Arc::new(storage),
        drive: Arc::new(drive),
        token_source: Arc::new(ConnectionTokenSource::new(connections)),
        audit: Arc::new(InMemoryAuditSink::new()),
    })
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize metrics recorder (must be before any metrics are recorded)
    init_metrics();

    let config = AssetConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing("asset-service", &config.common.log_level);

    tracing::info!(
        environment = ?config.common.environment,
        port = config.common.port,
        "Starting asset service"
    );

    let collaborators = default_collaborators(&config).await?;

    let app = Application::build(config, collaborators).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    tokio::select! {
        result = app.run_until_stopped() => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {}
    }

    tracing::info!("Service shutdown complete");
    Ok(())
}
