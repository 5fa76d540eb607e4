use crate::models::{BackupRecord, LeadSubmission};
use reqwest::Client;

/// Fire-and-forget mirror of every submitted lead into the spreadsheet
/// webhook. Failures are logged and never retried or surfaced; losing the
/// backup copy must never delay or fail the user-facing request.
#[derive(Clone)]
pub struct BackupRecorder {
    client: Client,
    webhook_url: String,
}

impl BackupRecorder {
    pub fn new(webhook_url: String) -> Self {
        Self {
            client: Client::new(),
            webhook_url,
        }
    }

    /// Spawns the backup write as a detached task. The handler keeps no
    /// handle to it and continues immediately.
    pub fn dispatch(&self, lead: &LeadSubmission) {
        let recorder = self.clone();
        let record = BackupRecord::from(lead);
        tokio::spawn(async move {
            if let Err(e) = recorder.record(&record).await {
                tracing::error!("Sheets backup failed: {}", e);
            }
        });
    }

    /// Posts one flat record to the webhook. Exposed separately from
    /// `dispatch` so tests can await the outcome.
    pub async fn record(&self, record: &BackupRecord) -> Result<(), String> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(record)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(format!("webhook returned {}: {}", status, body));
        }

        tracing::debug!("✓ Lead mirrored to sheets backup");
        Ok(())
    }
}
