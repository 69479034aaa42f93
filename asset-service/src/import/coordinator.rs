//! The import pipeline: one file at a time through validate, metadata,
//! download, store, record and audit, with per-file failure isolation.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::authz::gate::ImportGrant;
use crate::dtos::ImportFileSpec;
use crate::import::progress::{ImportOutcome, ProgressEvent, ProgressSender};
use crate::import::validator::FileValidator;
use crate::models::Asset;
use crate::services::audit::AuditRecorder;
use crate::services::drive::{DriveClient, DriveError};
use crate::services::storage::Storage;
use crate::services::store::AssetStore;
use crate::services::token::TokenManager;

enum FileError {
    Failed { reason: String, hard: bool },
    Cancelled,
}

impl FileError {
    fn failed(reason: impl Into<String>) -> Self {
        FileError::Failed {
            reason: reason.into(),
            hard: false,
        }
    }
}

pub struct ImportCoordinator {
    drive: Arc<dyn DriveClient>,
    tokens: Arc<TokenManager>,
    storage: Arc<dyn Storage>,
    assets: Arc<dyn AssetStore>,
    audit: AuditRecorder,
    validator: FileValidator,
}

impl ImportCoordinator {
    pub fn new(
        drive: Arc<dyn DriveClient>,
        tokens: Arc<TokenManager>,
        storage: Arc<dyn Storage>,
        assets: Arc<dyn AssetStore>,
        audit: AuditRecorder,
        validator: FileValidator,
    ) -> Self {
        Self {
            drive,
            tokens,
            storage,
            assets,
            audit,
            validator,
        }
    }

    /// Run one authorized batch sequentially. Each file settles (stored or
    /// failed) before the next begins; a failed send on the progress
    /// channel or a cancelled token abandons the rest of the batch.
    pub async fn run(
        &self,
        grant: ImportGrant,
        files: Vec<ImportFileSpec>,
        progress: ProgressSender,
        cancel: CancellationToken,
    ) -> ImportOutcome {
        let total = files.len();
        let started = Instant::now();
        let mut outcome = ImportOutcome::new();

        metrics::counter!("import_jobs_total").increment(1);
        tracing::info!(
            requester = %grant.requester(),
            tenant_id = grant.tenant_id(),
            total,
            "import started"
        );

        if !progress.send(ProgressEvent::starting(total)).await {
            tracing::info!("client disconnected before the import started");
            return outcome;
        }

        // Once a hard failure happens the rest of the batch fails with the
        // same reason instead of half-running.
        let mut batch_failure: Option<String> = None;

        for (index, file) in files.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!(remaining = total - index, "import cancelled");
                break;
            }
            let done = index + 1;

            if let Some(reason) = batch_failure.clone() {
                if !self
                    .fail_file(&mut outcome, &progress, file, done, total, reason)
                    .await
                {
                    break;
                }
                continue;
            }

            if !progress
                .send(ProgressEvent::downloading(&file.name, index, total))
                .await
            {
                tracing::info!(file = %file.name, "client disconnected; abandoning import");
                break;
            }

            match self.import_one(&grant, file, &cancel).await {
                Ok(asset) => {
                    outcome.record_success();
                    metrics::counter!("import_files_total", "outcome" => "imported").increment(1);
                    if !progress
                        .send(ProgressEvent::stored(&file.name, done, total, asset.id))
                        .await
                    {
                        break;
                    }
                }
                Err(FileError::Cancelled) => {
                    tracing::info!(file = %file.name, "import cancelled mid-file");
                    break;
                }
                Err(FileError::Failed { reason, hard }) => {
                    if hard {
                        batch_failure = Some(reason.clone());
                    }
                    if !self
                        .fail_file(&mut outcome, &progress, file, done, total, reason)
                        .await
                    {
                        break;
                    }
                }
            }
        }

        progress.send(ProgressEvent::finished(&outcome, total)).await;
        metrics::histogram!("import_job_duration_seconds").record(started.elapsed().as_secs_f64());
        tracing::info!(
            imported = outcome.imported,
            failed = outcome.failed,
            "import finished"
        );
        outcome
    }

    async fn fail_file(
        &self,
        outcome: &mut ImportOutcome,
        progress: &ProgressSender,
        file: &ImportFileSpec,
        done: usize,
        total: usize,
        reason: String,
    ) -> bool {
        tracing::warn!(file = %file.name, error = %reason, "file import failed");
        metrics::counter!("import_files_total", "outcome" => "failed").increment(1);
        outcome.record_failure(format!("{}: {}", file.name, reason));
        progress
            .send(ProgressEvent::failed(&file.name, done, total, reason))
            .await
    }

    async fn import_one(
        &self,
        grant: &ImportGrant,
        file: &ImportFileSpec,
        cancel: &CancellationToken,
    ) -> Result<Asset, FileError> {
        self.validator
            .check_declared(file)
            .map_err(|err| FileError::failed(err.to_string()))?;

        let token = self
            .tokens
            .get_valid_access_token(grant.requester())
            .await
            .map_err(|err| FileError::Failed {
                reason: err.to_string(),
                hard: err.is_hard(),
            })?;

        let metadata = match until_cancelled(cancel, self.drive.get_file(&token, &file.id)).await {
            None => return Err(FileError::Cancelled),
            Some(result) => result.map_err(|err| self.drive_failure(grant.requester(), err))?,
        };
        self.validator
            .check_resolved(&metadata)
            .map_err(|err| FileError::failed(err.to_string()))?;

        let data = match until_cancelled(cancel, self.drive.download(&token, &file.id)).await {
            None => return Err(FileError::Cancelled),
            Some(result) => result.map_err(|err| self.drive_failure(grant.requester(), err))?,
        };

        let size = data.len() as i64;
        let storage_key = storage_key_for(grant.tenant_id(), &metadata.name);
        let stored_at = self
            .storage
            .store(&storage_key, data)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, file = %file.id, "storage write failed");
                FileError::failed("Failed to store file")
            })?;

        let asset = Asset::from_import(grant, &metadata, stored_at, size);
        self.assets.insert(asset.clone()).await.map_err(|err| {
            tracing::error!(error = %err, "asset row insert failed");
            FileError::failed("Failed to record asset")
        })?;
        self.audit.record_import(grant, &asset).await.map_err(|err| {
            tracing::error!(error = %err, "audit write failed");
            FileError::failed("Failed to record audit trail")
        })?;

        Ok(asset)
    }

    fn drive_failure(&self, user: Uuid, err: DriveError) -> FileError {
        if matches!(err, DriveError::AuthRejected) {
            // Upstream says the token is no longer good; drop the cached
            // copy so the next file starts from a fresh fetch.
            self.tokens.invalidate(user);
        }
        tracing::warn!(error = %err, upstream_status = ?err.upstream_status(), "drive call failed");
        FileError::failed(err.code().default_message())
    }
}

fn storage_key_for(tenant_id: i64, file_name: &str) -> String {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str());
    match extension {
        Some(ext) => format!("{}/{}.{}", tenant_id, Uuid::new_v4(), ext),
        None => format!("{}/{}", tenant_id, Uuid::new_v4()),
    }
}

async fn until_cancelled<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = T>,
) -> Option<T> {
    tokio::select! {
        _ = cancel.cancelled() => None,
        out = fut => Some(out),
    }
}
