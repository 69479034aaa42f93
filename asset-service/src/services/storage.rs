//! Binary storage backends for imported file contents.

use std::path::PathBuf;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::fs;

use asset_core::error::AppError;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist the bytes under `key`, returning the stored location.
    async fn store(&self, key: &str, data: Vec<u8>) -> Result<String, AppError>;
}

pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).await?;
        Ok(Self { base_path })
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn store(&self, key: &str, data: Vec<u8>) -> Result<String, AppError> {
        let path = self.base_path.join(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, data).await?;
        Ok(path.to_string_lossy().into_owned())
    }
}

#[derive(Default)]
pub struct InMemoryStorage {
    objects: DashMap<String, Vec<u8>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.get(key).map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn store(&self, key: &str, data: Vec<u8>) -> Result<String, AppError> {
        self.objects.insert(key.to_string(), data);
        Ok(format!("memory://{key}"))
    }
}
