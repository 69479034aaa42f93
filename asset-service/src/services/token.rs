//! Access-token acquisition with a per-user single-flight cache.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use asset_core::error::ErrorCode;

use crate::services::store::ConnectionStore;

/// Refresh slightly ahead of expiry so a token never dies mid-download.
const EXPIRY_LEEWAY_SECONDS: i64 = 30;

#[derive(Clone)]
pub struct AccessToken {
    secret: SecretString,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            secret: SecretString::new(token.into()),
            expires_at,
        }
    }

    pub fn expose(&self) -> &str {
        self.secret.expose_secret()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn expires_within(&self, leeway: Duration) -> bool {
        Utc::now() + leeway >= self.expires_at
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("No Drive connection for this user")]
    NotConnected,
    #[error("Drive access token has expired")]
    Expired,
    #[error("Could not refresh Drive access")]
    RefreshFailed { permanent: bool },
}

impl TokenError {
    /// Hard errors abort the rest of a batch; transient ones fail a single
    /// file and let the next one try again.
    pub fn is_hard(&self) -> bool {
        matches!(
            self,
            TokenError::NotConnected | TokenError::RefreshFailed { permanent: true }
        )
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            TokenError::NotConnected => ErrorCode::DriveAuthRequired,
            TokenError::Expired => ErrorCode::TokenExpired,
            TokenError::RefreshFailed { .. } => ErrorCode::TokenRefreshFailed,
        }
    }
}

#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self, user_id: Uuid) -> Result<AccessToken, TokenError>;
}

/// Serves cached tokens while they are fresh and collapses concurrent
/// refreshes for the same user into one upstream fetch. Different users
/// never contend with each other.
pub struct TokenManager {
    source: Arc<dyn TokenSource>,
    slots: DashMap<Uuid, Arc<Mutex<Option<AccessToken>>>>,
    leeway: Duration,
}

impl TokenManager {
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self {
            source,
            slots: DashMap::new(),
            leeway: Duration::seconds(EXPIRY_LEEWAY_SECONDS),
        }
    }

    pub async fn get_valid_access_token(&self, user_id: Uuid) -> Result<AccessToken, TokenError> {
        // Clone the slot out of the map so no shard lock is held across
        // the await below.
        let slot = self.slots.entry(user_id).or_default().clone();
        let mut cached = slot.lock().await;

        if let Some(token) = cached.as_ref() {
            if !token.expires_within(self.leeway) {
                return Ok(token.clone());
            }
        }

        match self.source.fetch_token(user_id).await {
            Ok(token) => {
                *cached = Some(token.clone());
                Ok(token)
            }
            Err(err) => {
                *cached = None;
                Err(err)
            }
        }
    }

    /// Forget any cached token; the next caller fetches fresh.
    pub fn invalidate(&self, user_id: Uuid) {
        self.slots.remove(&user_id);
    }
}

/// Token source backed by the stored connection record. Refresh flows live
/// behind the connection store; this source only reads what is there.
pub struct ConnectionTokenSource {
    connections: Arc<dyn ConnectionStore>,
}

impl ConnectionTokenSource {
    pub fn new(connections: Arc<dyn ConnectionStore>) -> Self {
        Self { connections }
    }
}

#[async_trait]
impl TokenSource for ConnectionTokenSource {
    async fn fetch_token(&self, user_id: Uuid) -> Result<AccessToken, TokenError> {
        let connection = self
            .connections
            .find_for_user(user_id)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "connection lookup failed");
                TokenError::RefreshFailed { permanent: false }
            })?
            .ok_or(TokenError::NotConnected)?;

        if connection.is_expired_at(Utc::now()) {
            return Err(TokenError::Expired);
        }
        Ok(AccessToken::new(connection.token(), connection.expires_at))
    }
}
