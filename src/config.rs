use serde::Deserialize;

/// Default base URL for the GHL (LeadConnector) API.
const DEFAULT_GHL_BASE_URL: &str = "https://services.leadconnectorhq.com";

/// Default Apps Script webhook backing up every lead to the spreadsheet.
const DEFAULT_SHEETS_WEBHOOK_URL: &str =
    "https://script.google.com/macros/s/AKfycbyO6PPusGAOkecc1O_3xOMMrqM7EXbC5EsK9WaUoPdfXRvniHDc1wSQwRHVzcHgx_lQwg/exec";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// GHL API key. Optional at startup: the contact handler answers 500 per
    /// request when absent instead of refusing to boot.
    pub ghl_api_key: Option<String>,
    /// GHL location id, same startup semantics as the API key.
    pub ghl_location_id: Option<String>,
    pub ghl_base_url: String,
    pub sheets_webhook_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            ghl_api_key: std::env::var("GHL_API_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            ghl_location_id: std::env::var("GHL_LOCATION_ID")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            ghl_base_url: std::env::var("GHL_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GHL_BASE_URL.to_string()),
            sheets_webhook_url: std::env::var("SHEETS_WEBHOOK_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SHEETS_WEBHOOK_URL.to_string()),
        };

        for (name, url) in [
            ("GHL_BASE_URL", &config.ghl_base_url),
            ("SHEETS_WEBHOOK_URL", &config.sheets_webhook_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", name);
            }
        }

        // Log configuration state without sensitive values
        if config.ghl_api_key.is_none() || config.ghl_location_id.is_none() {
            tracing::warn!(
                "GHL credentials not configured; contact submissions will fail with 500"
            );
        }
        tracing::debug!("GHL Base URL: {}", config.ghl_base_url);
        tracing::debug!("Sheets webhook URL: {}", config.sheets_webhook_url);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Returns both CRM credentials, or the name of the first missing one.
    /// The caller must not echo that name to the client.
    pub fn crm_credentials(&self) -> Result<(&str, &str), &'static str> {
        let api_key = self.ghl_api_key.as_deref().ok_or("GHL_API_KEY")?;
        let location_id = self.ghl_location_id.as_deref().ok_or("GHL_LOCATION_ID")?;
        Ok((api_key, location_id))
    }
}
