use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::services::metrics::render_metrics;

/// Metrics endpoint for Prometheus scraping.
pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        render_metrics(),
    )
}
