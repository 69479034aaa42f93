//! Progress events streamed to the client while an import runs.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Starting,
    Downloading,
    Stored,
    Error,
    Finished,
}

/// One server-sent event. `progress` counts files fully settled so far;
/// the terminal `finished` event carries the batch summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub status: ImportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub progress: usize,
    pub total: usize,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ProgressEvent {
    fn base(status: ImportStatus, progress: usize, total: usize, message: String) -> Self {
        Self {
            status,
            file: None,
            progress,
            total,
            message,
            error: None,
            asset_id: None,
            imported: None,
            failed: None,
            errors: None,
        }
    }

    pub fn starting(total: usize) -> Self {
        Self::base(
            ImportStatus::Starting,
            0,
            total,
            format!("Starting import of {total} file(s)"),
        )
    }

    pub fn downloading(file: &str, done: usize, total: usize) -> Self {
        let mut event = Self::base(
            ImportStatus::Downloading,
            done,
            total,
            format!("Importing {file}"),
        );
        event.file = Some(file.to_string());
        event
    }

    pub fn stored(file: &str, done: usize, total: usize, asset_id: Uuid) -> Self {
        let mut event = Self::base(
            ImportStatus::Stored,
            done,
            total,
            format!("Imported {file}"),
        );
        event.file = Some(file.to_string());
        event.asset_id = Some(asset_id);
        event
    }

    pub fn failed(file: &str, done: usize, total: usize, reason: String) -> Self {
        let mut event = Self::base(
            ImportStatus::Error,
            done,
            total,
            format!("Failed to import {file}"),
        );
        event.file = Some(file.to_string());
        event.error = Some(reason);
        event
    }

    pub fn finished(outcome: &ImportOutcome, total: usize) -> Self {
        let mut event = Self::base(
            ImportStatus::Finished,
            total,
            total,
            format!("Imported {} of {} file(s)", outcome.imported, total),
        );
        event.imported = Some(outcome.imported);
        event.failed = Some(outcome.failed);
        event.errors = Some(outcome.errors.clone());
        event
    }
}

/// Terminal summary of one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub imported: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl ImportOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.imported += 1;
    }

    pub fn record_failure(&mut self, message: String) {
        self.failed += 1;
        self.errors.push(message);
    }
}

/// Send half of the progress channel. A failed send means the consumer is
/// gone; producers treat it as a stop signal.
#[derive(Clone)]
pub struct ProgressSender {
    tx: mpsc::Sender<ProgressEvent>,
}

impl ProgressSender {
    pub fn new(tx: mpsc::Sender<ProgressEvent>) -> Self {
        Self { tx }
    }

    pub async fn send(&self, event: ProgressEvent) -> bool {
        self.tx.send(event).await.is_ok()
    }
}
