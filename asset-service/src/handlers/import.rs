use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use futures::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use asset_core::error::AppError;

use crate::dtos::ImportRequest;
use crate::import::validator::require_tenant;
use crate::import::ProgressSender;
use crate::middleware::AuthContext;
use crate::startup::AppState;
use crate::utils::validation::ValidatedJson;

/// `POST /import`. Authorization and rate limiting settle before the
/// response starts; everything after arrives as server-sent events.
pub async fn import_assets(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(request): ValidatedJson<ImportRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let tenant_id = require_tenant(&request)?;
    let grant = state
        .gate
        .authorize_import(auth.user_id, auth.role, tenant_id)
        .await?;

    // Denied requests never reach this point, so they cost no quota.
    let decision = state.rate_limiter.check(auth.user_id);
    if !decision.allowed {
        metrics::counter!("import_rate_limited_total").increment(1);
        tracing::warn!(
            requester = %auth.user_id,
            retry_after_secs = decision.retry_after_secs,
            "import rejected: rate limit exceeded"
        );
        return Err(AppError::RateLimited {
            limit: decision.limit,
            retry_after_secs: decision.retry_after_secs,
        });
    }

    let (tx, rx) = tokio::sync::mpsc::channel(64);
    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();

    let coordinator = state.coordinator.clone();
    let files = request.files;
    tokio::spawn(async move {
        coordinator
            .run(grant, files, ProgressSender::new(tx), cancel)
            .await;
    });

    // The drop guard rides along with the stream: when the client
    // disconnects the stream drops, the token cancels, and the
    // coordinator abandons the rest of the batch.
    let stream = ReceiverStream::new(rx).map(move |event| {
        let _held = &guard;
        Event::default().json_data(&event)
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}
