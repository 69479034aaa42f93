use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use asset_core::error::{AppError, ErrorCode};

use crate::models::Role;

/// Caller identity extractor.
///
/// The gateway authenticates the session and forwards the resolved identity
/// as `X-User-ID` and `X-User-Role`. Anything missing or malformed is
/// treated as an unauthenticated request, not a validation problem: this
/// service never guesses at identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: Role,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("X-User-ID")
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or_else(|| AppError::auth(ErrorCode::NotAuthenticated))?;

        let role = parts
            .headers
            .get("X-User-Role")
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| raw.parse::<Role>().ok())
            .ok_or_else(|| AppError::auth(ErrorCode::NotAuthenticated))?;

        // Add to tracing span for observability
        tracing::Span::current().record("user_id", tracing::field::display(user_id));

        Ok(AuthContext { user_id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<AuthContext, AppError> {
        let (mut parts, _) = request.into_parts();
        AuthContext::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn both_headers_yield_an_identity() {
        let user_id = Uuid::new_v4();
        let request = Request::builder()
            .header("X-User-ID", user_id.to_string())
            .header("X-User-Role", "editor")
            .body(())
            .unwrap();

        let context = extract(request).await.unwrap();
        assert_eq!(context.user_id, user_id);
        assert_eq!(context.role, Role::Editor);
    }

    #[tokio::test]
    async fn missing_headers_are_unauthenticated() {
        let request = Request::builder().body(()).unwrap();
        let err = extract(request).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotAuthenticated);
    }

    #[tokio::test]
    async fn malformed_values_are_unauthenticated() {
        let request = Request::builder()
            .header("X-User-ID", "not-a-uuid")
            .header("X-User-Role", "editor")
            .body(())
            .unwrap();
        assert!(extract(request).await.is_err());

        let request = Request::builder()
            .header("X-User-ID", Uuid::new_v4().to_string())
            .header("X-User-Role", "emperor")
            .body(())
            .unwrap();
        let err = extract(request).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotAuthenticated);
    }
}
