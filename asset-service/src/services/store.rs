//! Persistence seams for memberships, connections and asset rows.
//!
//! Production deployments wire database-backed implementations; the
//! in-memory versions back local runs and tests.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use asset_core::error::AppError;

use crate::models::{Asset, ExternalConnection, TenantMembership};

#[async_trait]
pub trait MembershipStore: Send + Sync {
    async fn is_member(&self, user_id: Uuid, tenant_id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ConnectionStore: Send + Sync {
    async fn find_for_user(&self, user_id: Uuid) -> Result<Option<ExternalConnection>, AppError>;
}

#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn insert(&self, asset: Asset) -> Result<(), AppError>;
    async fn list_for_tenant(&self, tenant_id: i64) -> Result<Vec<Asset>, AppError>;
}

#[derive(Default)]
pub struct InMemoryMembershipStore {
    rows: DashMap<(Uuid, i64), TenantMembership>,
}

impl InMemoryMembershipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, membership: TenantMembership) {
        self.rows
            .insert((membership.user_id, membership.tenant_id), membership);
    }
}

#[async_trait]
impl MembershipStore for InMemoryMembershipStore {
    async fn is_member(&self, user_id: Uuid, tenant_id: i64) -> Result<bool, AppError> {
        Ok(self.rows.contains_key(&(user_id, tenant_id)))
    }
}

#[derive(Default)]
pub struct InMemoryConnectionStore {
    rows: DashMap<Uuid, ExternalConnection>,
}

impl InMemoryConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, connection: ExternalConnection) {
        self.rows.insert(connection.user_id, connection);
    }

    pub fn remove(&self, user_id: Uuid) {
        self.rows.remove(&user_id);
    }
}

#[async_trait]
impl ConnectionStore for InMemoryConnectionStore {
    async fn find_for_user(&self, user_id: Uuid) -> Result<Option<ExternalConnection>, AppError> {
        Ok(self.rows.get(&user_id).map(|entry| entry.value().clone()))
    }
}

#[derive(Default)]
pub struct InMemoryAssetStore {
    rows: DashMap<Uuid, Asset>,
}

impl InMemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.rows.len()
    }
}

#[async_trait]
impl AssetStore for InMemoryAssetStore {
    async fn insert(&self, asset: Asset) -> Result<(), AppError> {
        self.rows.insert(asset.id, asset);
        Ok(())
    }

    async fn list_for_tenant(&self, tenant_id: i64) -> Result<Vec<Asset>, AppError> {
        Ok(self
            .rows
            .iter()
            .filter(|entry| entry.value().tenant_id == tenant_id)
            .map(|entry| entry.value().clone())
            .collect())
    }
}
