use crate::backup::BackupRecorder;
use crate::config::Config;
use crate::crm::{is_duplicate_error, GhlClient};
use crate::crm_fields::{pipeline_for, CONVENIO_FIELD_ID, UTM_FIELD_IDS};
use crate::errors::AppError;
use crate::models::{ContactResponse, ContactUpsert, CustomField, LeadSubmission, OpportunityCreate};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
///
/// Holds only configuration and outbound clients; no mutable state is
/// shared across requests.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Client for the GHL CRM API.
    pub crm: GhlClient,
    /// Fire-and-forget spreadsheet backup writer.
    pub backup: BackupRecorder,
}

/// Routes subject to rate limiting and body limits in `main`.
pub fn contact_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/contact", post(submit_contact))
}

/// Full application router without middleware; tests drive this directly.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(contact_routes())
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "clinic-contact-api",
            "version": "0.1.0"
        })),
    )
}

/// POST /api/contact
///
/// Lead intake flow:
/// 1. Reject malformed bodies and missing/blank name or phone (400).
/// 2. Dispatch the sheets backup without awaiting it.
/// 3. Verify CRM credentials (500 with a generic message when absent).
/// 4. Upsert the contact in GHL with attribution custom fields and tags.
///    A duplicate-contact rejection counts as success.
/// 5. Best-effort: attach a note and create a pipeline opportunity; their
///    failures are logged and never fail the request.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `payload` - JSON body with the lead submission.
///
/// # Returns
///
/// * `Result<(StatusCode, Json<ContactResponse>), AppError>` - Success body
///   with the contact id when known, or a mapped error response.
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LeadSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<ContactResponse>), AppError> {
    let Json(lead) = payload.map_err(|e| {
        tracing::warn!("Malformed contact payload: {}", e);
        AppError::BadRequest
    })?;

    if lead.name.trim().is_empty() || lead.phone.trim().is_empty() {
        return Err(AppError::BadRequest);
    }

    tracing::info!(
        "📨 Contact submission: service={:?}, source={:?}",
        lead.service,
        lead.source
    );

    // Fire and forget; the CRM flow below does not wait for this.
    state.backup.dispatch(&lead);

    let (api_key, location_id) = state
        .config
        .crm_credentials()
        .map_err(|missing| AppError::ServerConfig(format!("{} not configured", missing)))?;

    let (first_name, last_name) = split_name(&lead.name);
    let custom_fields = build_custom_fields(&lead);

    let mut tags = vec!["website-lead".to_string(), "cmeo".to_string()];
    if let Some(service) = non_empty(&lead.service) {
        tags.push(service_slug(service));
    }

    let contact_payload = ContactUpsert {
        first_name: first_name.clone(),
        last_name: last_name.clone(),
        phone: lead.phone.clone(),
        email: non_empty(&lead.email).map(str::to_string),
        location_id: location_id.to_string(),
        source: lead
            .source
            .clone()
            .unwrap_or_else(|| "Website Form".to_string()),
        tags,
        custom_fields,
    };

    let contact = match state.crm.upsert_contact(api_key, &contact_payload).await {
        Ok(contact) => contact,
        Err(AppError::UpstreamError(msg)) if is_duplicate_error(&msg) => {
            // A pre-existing contact satisfies the caller's intent.
            tracing::info!("GHL reports existing contact; treating as success");
            return Ok((StatusCode::OK, Json(ContactResponse::registered(None))));
        }
        Err(e) => return Err(e),
    };

    if let Some(contact_id) = contact.id.as_deref() {
        if let Some(note) = compose_note(&lead) {
            if let Err(e) = state.crm.add_note(api_key, contact_id, &note).await {
                tracing::warn!("Failed to add note to contact {}: {}", contact_id, e);
            }
        }

        if let Some(service) = non_empty(&lead.service) {
            if let Some(pipeline) = pipeline_for(service) {
                let opportunity = OpportunityCreate {
                    pipeline_id: pipeline.pipeline_id.to_string(),
                    location_id: location_id.to_string(),
                    name: format!("{} {} - {}", first_name, last_name, service),
                    pipeline_stage_id: pipeline.stage_id.to_string(),
                    contact_id: contact_id.to_string(),
                    status: "open".to_string(),
                };
                if let Err(e) = state.crm.create_opportunity(api_key, &opportunity).await {
                    tracing::warn!(
                        "Failed to create opportunity for contact {}: {}",
                        contact_id,
                        e
                    );
                }
            }
        }
    }

    Ok((StatusCode::OK, Json(ContactResponse::registered(contact.id))))
}

/// Treats `None` and `Some("")` uniformly as absent.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Splits a full name on whitespace: first token is the given name, the
/// remaining tokens joined by single spaces form the family name.
pub fn split_name(name: &str) -> (String, String) {
    let mut parts = name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}

/// Lowercases a service name and collapses whitespace runs into single
/// hyphens, producing the tag slug.
pub fn service_slug(service: &str) -> String {
    service
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Builds the CRM custom-field list: one entry per trimmed, non-blank
/// attribution value plus the convenio field.
pub fn build_custom_fields(lead: &LeadSubmission) -> Vec<CustomField> {
    let mut fields = Vec::new();

    if let Some(utm) = &lead.utm_params {
        for (key, field_id) in UTM_FIELD_IDS {
            if let Some(value) = utm.get(key) {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    fields.push(CustomField {
                        id: field_id.to_string(),
                        value: trimmed.to_string(),
                    });
                }
            }
        }
    }

    if let Some(convenio) = &lead.convenio {
        let trimmed = convenio.trim();
        if !trimmed.is_empty() {
            fields.push(CustomField {
                id: CONVENIO_FIELD_ID.to_string(),
                value: trimmed.to_string(),
            });
        }
    }

    fields
}

/// Composes the contact note from the present fields, in fixed order.
/// Returns `None` when there is nothing to note.
pub fn compose_note(lead: &LeadSubmission) -> Option<String> {
    let mut lines = Vec::new();
    if let Some(service) = non_empty(&lead.service) {
        lines.push(format!("Servicio: {}", service));
    }
    if let Some(convenio) = non_empty(&lead.convenio) {
        lines.push(format!("Convenio: {}", convenio));
    }
    if let Some(message) = non_empty(&lead.message) {
        lines.push(format!("Mensaje: {}", message));
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
