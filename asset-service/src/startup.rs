use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use asset_core::error::AppError;
use asset_core::middleware::{request_id_middleware, RequestId};
use asset_core::rate_limit::FixedWindowLimiter;

use crate::authz::ImportGate;
use crate::config::AssetConfig;
use crate::handlers;
use crate::import::{FileValidator, ImportCoordinator};
use crate::services::audit::{AuditRecorder, AuditSink};
use crate::services::drive::DriveClient;
use crate::services::storage::Storage;
use crate::services::store::{AssetStore, ConnectionStore, MembershipStore};
use crate::services::token::{TokenManager, TokenSource};

/// Backing implementations the service runs against. Production wiring
/// lives in `main`; tests pass in-memory stands-ins.
pub struct Collaborators {
    pub memberships: Arc<dyn MembershipStore>,
    pub connections: Arc<dyn ConnectionStore>,
    pub assets: Arc<dyn AssetStore>,
    pub storage: Arc<dyn Storage>,
    pub drive: Arc<dyn DriveClient>,
    pub token_source: Arc<dyn TokenSource>,
    pub audit: Arc<dyn AuditSink>,
}

#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<ImportGate>,
    pub coordinator: Arc<ImportCoordinator>,
    pub rate_limiter: Arc<FixedWindowLimiter>,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    pub async fn build(
        config: AssetConfig,
        collaborators: Collaborators,
    ) -> Result<Self, AppError> {
        let gate = Arc::new(ImportGate::new(
            collaborators.memberships.clone(),
            collaborators.connections.clone(),
        ));
        let tokens = Arc::new(TokenManager::new(collaborators.token_source));
        let validator = FileValidator::new(
            config.import.max_file_size_bytes,
            config.import.blocked_mime_prefixes.clone(),
        );
        let coordinator = Arc::new(ImportCoordinator::new(
            collaborators.drive,
            tokens,
            collaborators.storage,
            collaborators.assets,
            AuditRecorder::new(collaborators.audit),
            validator,
        ));
        let rate_limiter = Arc::new(FixedWindowLimiter::new(
            config.import.rate_limit,
            Duration::from_secs(config.import.rate_window_seconds),
        ));

        let state = AppState {
            gate,
            coordinator,
            rate_limiter,
        };
        let app = build_router(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/import", post(handlers::import_assets))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .extensions()
                    .get::<RequestId>()
                    .map(|id| id.0.as_str())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    user_id = tracing::field::Empty,
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
