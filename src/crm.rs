use crate::errors::AppError;
use crate::models::{ContactUpsert, CreatedContact, OpportunityCreate};
use serde_json::{json, Value};
use std::time::Duration;

/// Fixed API version header required by the GHL v2 endpoints.
const GHL_API_VERSION: &str = "2021-07-28";

/// Client for the GHL (LeadConnector) CRM API.
///
/// Holds the transport and base URL only; credentials are supplied per call
/// so a missing key is a per-request configuration error, not a startup one.
#[derive(Clone)]
pub struct GhlClient {
    client: reqwest::Client,
    base_url: String,
}

impl GhlClient {
    pub fn new(base_url: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::InternalError(format!("Failed to create GHL client: {}", e))
            })?;

        Ok(Self { client, base_url })
    }

    /// Creates (or collides with) a contact in GHL.
    ///
    /// Non-2xx responses become `UpstreamError` carrying the raw body text,
    /// which the caller inspects for the duplicate-contact case.
    pub async fn upsert_contact(
        &self,
        api_key: &str,
        payload: &ContactUpsert,
    ) -> Result<CreatedContact, AppError> {
        let url = format!("{}/contacts/", self.base_url);
        tracing::info!(
            "Creating GHL contact: {} {}",
            payload.first_name,
            payload.last_name
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Version", GHL_API_VERSION)
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::UpstreamError(format!(
                "GHL contact creation failed {}: {}",
                status, error_text
            )));
        }

        let raw: Value = response.json().await.map_err(|e| {
            AppError::InternalError(format!("Failed to parse GHL contact response: {}", e))
        })?;

        let id = raw
            .get("contact")
            .and_then(|c| c.get("id"))
            .and_then(|i| i.as_str())
            .map(str::to_string);

        match &id {
            Some(id) => tracing::info!("✓ GHL contact created: {}", id),
            None => tracing::warn!("GHL contact response missing contact.id: {:?}", raw),
        }

        Ok(CreatedContact { id, raw })
    }

    /// Attaches a free-text note to a contact. Callers treat failures as
    /// non-fatal.
    pub async fn add_note(
        &self,
        api_key: &str,
        contact_id: &str,
        body: &str,
    ) -> Result<(), AppError> {
        let url = format!("{}/contacts/{}/notes", self.base_url, contact_id);
        tracing::info!("Adding note to GHL contact {}", contact_id);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Version", GHL_API_VERSION)
            .json(&json!({ "body": body }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::UpstreamError(format!(
                "GHL note creation failed {}: {}",
                status, error_text
            )));
        }

        tracing::info!("✓ Note added to contact {}", contact_id);
        Ok(())
    }

    /// Creates a sales opportunity linked to a contact. Callers treat
    /// failures as non-fatal.
    pub async fn create_opportunity(
        &self,
        api_key: &str,
        payload: &OpportunityCreate,
    ) -> Result<(), AppError> {
        let url = format!("{}/opportunities/", self.base_url);
        tracing::info!(
            "Creating GHL opportunity '{}' in pipeline {}",
            payload.name,
            payload.pipeline_id
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Version", GHL_API_VERSION)
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::UpstreamError(format!(
                "GHL opportunity creation failed {}: {}",
                status, error_text
            )));
        }

        tracing::info!("✓ Opportunity created for contact {}", payload.contact_id);
        Ok(())
    }
}

/// Detects the CRM's duplicate-contact rejection from its error text.
///
/// Substring matching is fragile but mirrors the CRM's current contract,
/// which exposes no structured error code for this case.
pub fn is_duplicate_error(message: &str) -> bool {
    message.contains("duplicate") || message.contains("already exists")
}
