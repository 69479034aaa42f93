//! Shared test harness: the service on a random port with scripted
//! in-memory collaborators the tests can inspect.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use tokio::sync::Notify;
use uuid::Uuid;

use asset_service::config::AssetConfig;
use asset_service::models::{ExternalConnection, Role, TenantMembership};
use asset_service::services::audit::InMemoryAuditSink;
use asset_service::services::drive::{
    DriveClient, DriveError, DriveFile, DRIVE_READONLY_SCOPE,
};
use asset_service::services::storage::InMemoryStorage;
use asset_service::services::store::{
    InMemoryAssetStore, InMemoryConnectionStore, InMemoryMembershipStore,
};
use asset_service::services::token::{AccessToken, ConnectionTokenSource};
use asset_service::startup::{Application, Collaborators};

pub const TEST_TENANT_ID: i64 = 42;

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub memberships: Arc<InMemoryMembershipStore>,
    pub connections: Arc<InMemoryConnectionStore>,
    pub assets: Arc<InMemoryAssetStore>,
    pub storage: Arc<InMemoryStorage>,
    pub audit: Arc<InMemoryAuditSink>,
    pub drive: Arc<ScriptedDrive>,
}

pub fn test_config() -> AssetConfig {
    let mut config = AssetConfig::default();
    config.common.port = 0; // Random port for testing
    config.import.max_file_size_bytes = 1024 * 1024;
    config
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config()).await
    }

    pub async fn spawn_with(config: AssetConfig) -> Self {
        let memberships = Arc::new(InMemoryMembershipStore::new());
        let connections = Arc::new(InMemoryConnectionStore::new());
        let assets = Arc::new(InMemoryAssetStore::new());
        let storage = Arc::new(InMemoryStorage::new());
        let audit = Arc::new(InMemoryAuditSink::new());
        let drive = Arc::new(ScriptedDrive::new());

        let collaborators = Collaborators {
            memberships: memberships.clone(),
            connections: connections.clone(),
            assets: assets.clone(),
            storage: storage.clone(),
            drive: drive.clone(),
            token_source: Arc::new(ConnectionTokenSource::new(connections.clone())),
            audit: audit.clone(),
        };

        let app = Application::build(config, collaborators)
            .await
            .expect("Failed to build test application");
        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        TestApp {
            address,
            client: reqwest::Client::new(),
            memberships,
            connections,
            assets,
            storage,
            audit,
            drive,
        }
    }

    pub fn seed_member(&self, user_id: Uuid, tenant_id: i64) {
        self.memberships
            .grant(TenantMembership::new(user_id, tenant_id, Role::Standard));
    }

    pub fn seed_connection(&self, user_id: Uuid) {
        self.seed_connection_with_scopes(user_id, vec![DRIVE_READONLY_SCOPE.to_string()]);
    }

    pub fn seed_connection_with_scopes(&self, user_id: Uuid, scopes: Vec<String>) {
        self.connections.upsert(ExternalConnection::new(
            user_id,
            "test-access-token",
            scopes,
            Utc::now() + Duration::hours(1),
        ));
    }

    pub fn seed_expired_connection(&self, user_id: Uuid) {
        self.connections.upsert(ExternalConnection::new(
            user_id,
            "stale-token",
            vec![DRIVE_READONLY_SCOPE.to_string()],
            Utc::now() - Duration::minutes(5),
        ));
    }

    /// A standard-role user who is a member of the test tenant with a
    /// live read-scoped Drive connection.
    pub fn seed_importer(&self) -> Uuid {
        let user_id = Uuid::new_v4();
        self.seed_member(user_id, TEST_TENANT_ID);
        self.seed_connection(user_id);
        user_id
    }

    pub async fn post_import(
        &self,
        user_id: Uuid,
        role: &str,
        body: &serde_json::Value,
    ) -> reqwest::Response {
        self.client
            .post(format!("{}/import", self.address))
            .header("X-User-ID", user_id.to_string())
            .header("X-User-Role", role)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_import_anonymous(&self, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/import", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

/// A file spec the drive never heard of; importing it hits a 404.
pub fn unseeded_file(id: &str, name: &str) -> DriveFile {
    DriveFile {
        id: id.to_string(),
        name: name.to_string(),
        mime_type: "image/png".to_string(),
        size: Some(100),
        owner: None,
        shared: false,
    }
}

/// Request body selecting `files` for the test tenant.
pub fn import_body(files: &[&DriveFile]) -> serde_json::Value {
    serde_json::json!({
        "tenantId": TEST_TENANT_ID,
        "files": files
            .iter()
            .map(|file| {
                serde_json::json!({
                    "id": file.id,
                    "name": file.name,
                    "mimeType": file.mime_type,
                    "size": file.size,
                })
            })
            .collect::<Vec<_>>(),
    })
}

/// Drain the SSE response and parse every `data:` line as JSON.
pub async fn read_events(response: reqwest::Response) -> Vec<serde_json::Value> {
    let raw = response.text().await.expect("Failed to read SSE body");
    parse_events(&raw)
}

pub fn parse_events(raw: &str) -> Vec<serde_json::Value> {
    raw.lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).expect("SSE data line is not valid JSON"))
        .collect()
}

pub fn statuses(events: &[serde_json::Value]) -> Vec<String> {
    events
        .iter()
        .map(|event| event["status"].as_str().unwrap_or_default().to_string())
        .collect()
}

pub enum ScriptedFailure {
    NotFound,
    AccessDenied,
    AuthRejected,
    Api(u16),
}

impl ScriptedFailure {
    fn to_error(&self) -> DriveError {
        match self {
            ScriptedFailure::NotFound => DriveError::NotFound,
            ScriptedFailure::AccessDenied => DriveError::AccessDenied,
            ScriptedFailure::AuthRejected => DriveError::AuthRejected,
            ScriptedFailure::Api(status) => DriveError::Api { status: *status },
        }
    }
}

/// In-process stand-in for the Drive API. Files are seeded per test; ids
/// can be scripted to fail or to stall until released.
#[derive(Default)]
pub struct ScriptedDrive {
    files: DashMap<String, (DriveFile, Vec<u8>)>,
    failures: DashMap<String, ScriptedFailure>,
    stalls: DashMap<String, Arc<Notify>>,
    downloads: AtomicUsize,
}

impl ScriptedDrive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_file(&self, id: &str, name: &str, mime_type: &str, bytes: usize) -> DriveFile {
        let file = DriveFile {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            size: Some(bytes as i64),
            owner: Some("owner@partner.example".to_string()),
            shared: false,
        };
        self.files.insert(id.to_string(), (file.clone(), vec![0u8; bytes]));
        file
    }

    pub fn fail_with(&self, id: &str, failure: ScriptedFailure) {
        self.failures.insert(id.to_string(), failure);
    }

    /// Make downloads of `id` block until the returned handle is notified.
    pub fn stall_download(&self, id: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.stalls.insert(id.to_string(), gate.clone());
        gate
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DriveClient for ScriptedDrive {
    async fn get_file(&self, _token: &AccessToken, file_id: &str) -> Result<DriveFile, DriveError> {
        if let Some(failure) = self.failures.get(file_id) {
            return Err(failure.to_error());
        }
        self.files
            .get(file_id)
            .map(|entry| entry.value().0.clone())
            .ok_or(DriveError::NotFound)
    }

    async fn download(&self, _token: &AccessToken, file_id: &str) -> Result<Vec<u8>, DriveError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        let gate = self.stalls.get(file_id).map(|entry| entry.value().clone());
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(failure) = self.failures.get(file_id) {
            return Err(failure.to_error());
        }
        self.files
            .get(file_id)
            .map(|entry| entry.value().1.clone())
            .ok_or(DriveError::NotFound)
    }
}
