//! Audit trail for import activity.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use asset_core::error::AppError;

use crate::authz::gate::ImportGrant;
use crate::models::Asset;

pub const IMPORT_ACTION: &str = "asset.import";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub action: String,
    pub requester_id: Uuid,
    pub tenant_id: i64,
    pub asset_id: Uuid,
    pub file_name: String,
    pub source_file_id: String,
    pub source_owner: Option<String>,
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: AuditEntry) -> Result<(), AppError>;
}

#[derive(Default)]
pub struct InMemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn record(&self, entry: AuditEntry) -> Result<(), AppError> {
        self.entries.lock().await.push(entry);
        Ok(())
    }
}

/// Writes one entry per imported asset. The requester and tenant come from
/// the grant; the source owner is recorded as provenance, never as the
/// accountable party.
#[derive(Clone)]
pub struct AuditRecorder {
    sink: Arc<dyn AuditSink>,
}

impl AuditRecorder {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    pub async fn record_import(&self, grant: &ImportGrant, asset: &Asset) -> Result<(), AppError> {
        let entry = AuditEntry {
            id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            action: IMPORT_ACTION.to_string(),
            requester_id: grant.requester(),
            tenant_id: grant.tenant_id(),
            asset_id: asset.id,
            file_name: asset.file_name.clone(),
            source_file_id: asset.source.provider_file_id.clone(),
            source_owner: asset.source.owner.clone(),
        };
        tracing::info!(
            requester = %entry.requester_id,
            tenant_id = entry.tenant_id,
            asset_id = %entry.asset_id,
            file = %entry.file_name,
            "asset imported"
        );
        self.sink.record(entry).await
    }
}
