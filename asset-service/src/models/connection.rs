use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

/// A user's OAuth connection to the external Drive provider.
///
/// The access token is wrapped so it never appears in debug output or
/// serialized payloads.
#[derive(Debug, Clone)]
pub struct ExternalConnection {
    pub user_id: Uuid,
    access_token: SecretString,
    pub scopes: Vec<String>,
    pub expires_at: DateTime<Utc>,
}

impl ExternalConnection {
    pub fn new(
        user_id: Uuid,
        access_token: impl Into<String>,
        scopes: Vec<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            access_token: SecretString::new(access_token.into()),
            scopes,
            expires_at,
        }
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|granted| granted == scope)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn token(&self) -> &str {
        self.access_token.expose_secret()
    }
}
