use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============ Inbound Models ============

/// Marketing attribution values attached to a visit/lead.
///
/// The key set is fixed and closed: five UTM tags plus three ad click ids.
/// Unknown keys are silently dropped on deserialization and never emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AttributionParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_campaign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gclid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fclid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dclid: Option<String>,
}

/// The recognized attribution keys, in canonical order.
pub const ATTRIBUTION_KEYS: [&str; 8] = [
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "gclid",
    "fclid",
    "dclid",
];

impl AttributionParams {
    /// Returns the value for a recognized key, `None` for unknown keys.
    pub fn get(&self, key: &str) -> Option<&str> {
        let field = match key {
            "utm_source" => &self.utm_source,
            "utm_medium" => &self.utm_medium,
            "utm_campaign" => &self.utm_campaign,
            "utm_term" => &self.utm_term,
            "utm_content" => &self.utm_content,
            "gclid" => &self.gclid,
            "fclid" => &self.fclid,
            "dclid" => &self.dclid,
            _ => return None,
        };
        field.as_deref()
    }

    /// Sets the value for a recognized key; unknown keys are ignored.
    pub fn set(&mut self, key: &str, value: String) {
        let field = match key {
            "utm_source" => &mut self.utm_source,
            "utm_medium" => &mut self.utm_medium,
            "utm_campaign" => &mut self.utm_campaign,
            "utm_term" => &mut self.utm_term,
            "utm_content" => &mut self.utm_content,
            "gclid" => &mut self.gclid,
            "fclid" => &mut self.fclid,
            "dclid" => &mut self.dclid,
            _ => return,
        };
        *field = Some(value);
    }

    /// All eight keys paired with their current values, in canonical order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, Option<&str>)> + '_ {
        ATTRIBUTION_KEYS
            .into_iter()
            .map(|key| (key, self.get(key)))
    }
}

/// A prospective patient's contact request submitted via the website form.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LeadSubmission {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Requested specialty; selects the sales pipeline when recognized.
    #[serde(default)]
    pub service: Option<String>,
    /// Health insurance agreement; stored as a CRM custom field and note line.
    #[serde(default)]
    pub convenio: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, rename = "utmParams")]
    pub utm_params: Option<AttributionParams>,
}

// ============ Outbound Models ============

/// Response body for the contact endpoint.
///
/// Exactly one of `message` (success) or `error` (failure) is present;
/// failures are produced by `AppError::into_response`.
#[derive(Debug, Clone, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "contactId", skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,
}

impl ContactResponse {
    pub fn registered(contact_id: Option<String>) -> Self {
        Self {
            success: true,
            message: Some("Contacto registrado correctamente".to_string()),
            contact_id,
        }
    }
}

/// Flat row mirrored to the spreadsheet webhook.
///
/// Column names match the sheet headers. Every field is always a string;
/// absent values serialize as "" so the sheet never sees nulls.
#[derive(Debug, Clone, Serialize)]
pub struct BackupRecord {
    pub nombre: String,
    pub telefono: String,
    pub email: String,
    pub especialidad: String,
    pub convenio: String,
    pub mensaje: String,
    pub utm_source: String,
    pub utm_medium: String,
    pub utm_campaign: String,
    pub utm_term: String,
    pub utm_content: String,
    pub gclid: String,
    pub fclid: String,
    pub dclid: String,
}

impl From<&LeadSubmission> for BackupRecord {
    fn from(lead: &LeadSubmission) -> Self {
        let utm = lead.utm_params.clone().unwrap_or_default();
        let owned = |v: Option<&str>| v.unwrap_or_default().to_string();
        Self {
            nombre: lead.name.clone(),
            telefono: lead.phone.clone(),
            email: owned(lead.email.as_deref()),
            especialidad: owned(lead.service.as_deref()),
            convenio: owned(lead.convenio.as_deref()),
            mensaje: owned(lead.message.as_deref()),
            utm_source: owned(utm.utm_source.as_deref()),
            utm_medium: owned(utm.utm_medium.as_deref()),
            utm_campaign: owned(utm.utm_campaign.as_deref()),
            utm_term: owned(utm.utm_term.as_deref()),
            utm_content: owned(utm.utm_content.as_deref()),
            gclid: owned(utm.gclid.as_deref()),
            fclid: owned(utm.fclid.as_deref()),
            dclid: owned(utm.dclid.as_deref()),
        }
    }
}

// ============ CRM Models ============

/// One (custom field id, value) pair on a CRM contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomField {
    pub id: String,
    pub value: String,
}

/// Contact upsert payload for the GHL contacts endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactUpsert {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub location_id: String,
    pub source: String,
    pub tags: Vec<String>,
    pub custom_fields: Vec<CustomField>,
}

/// Opportunity creation payload for the GHL opportunities endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityCreate {
    pub pipeline_id: String,
    pub location_id: String,
    pub name: String,
    pub pipeline_stage_id: String,
    pub contact_id: String,
    pub status: String,
}

/// Result of a CRM contact upsert. The id can be absent when the CRM
/// responds 2xx without the expected `contact.id` shape.
#[derive(Debug, Clone)]
pub struct CreatedContact {
    pub id: Option<String>,
    pub raw: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribution_ignores_unknown_keys() {
        let json = r#"{"utm_source":"google","utm_junk":"x","gclid":"abc"}"#;
        let params: AttributionParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.utm_source.as_deref(), Some("google"));
        assert_eq!(params.gclid.as_deref(), Some("abc"));
        assert_eq!(params.utm_medium, None);
        assert_eq!(params.get("utm_junk"), None);
    }

    #[test]
    fn backup_record_defaults_absent_fields_to_empty_strings() {
        let lead: LeadSubmission =
            serde_json::from_str(r#"{"name":"Ana","phone":"+56911111111"}"#).unwrap();
        let record = BackupRecord::from(&lead);
        assert_eq!(record.nombre, "Ana");
        assert_eq!(record.email, "");
        assert_eq!(record.utm_source, "");
        assert_eq!(record.dclid, "");

        let value = serde_json::to_value(&record).unwrap();
        for key in ATTRIBUTION_KEYS {
            assert!(value.get(key).unwrap().is_string());
        }
    }

    #[test]
    fn contact_response_omits_absent_contact_id() {
        let body = serde_json::to_value(ContactResponse::registered(None)).unwrap();
        assert!(body.get("contactId").is_none());
        assert_eq!(body["success"], true);

        let body =
            serde_json::to_value(ContactResponse::registered(Some("abc".to_string()))).unwrap();
        assert_eq!(body["contactId"], "abc");
    }
}
