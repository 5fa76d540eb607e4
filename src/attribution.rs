//! Attribution capture: session persistence of UTM/click-id parameters.
//!
//! Models the browser-side script that records marketing parameters from the
//! landing URL and replays them when the contact form is submitted. The
//! browser's sessionStorage is abstracted as [`SessionStore`] so the capture
//! and read logic is testable here; it performs no network or CRM calls.

use crate::models::{AttributionParams, ATTRIBUTION_KEYS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

/// Session-storage key holding the captured attribution JSON blob.
pub const STORAGE_KEY: &str = "cmeo_utm_params";

/// Key-value store scoped to a browsing session.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

/// In-memory store standing in for the browser's sessionStorage.
#[derive(Debug, Default, Clone)]
pub struct MemorySessionStore {
    entries: HashMap<String, String>,
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }
}

/// All eight attribution keys resolved to plain strings, "" when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedParams {
    pub utm_source: String,
    pub utm_medium: String,
    pub utm_campaign: String,
    pub utm_term: String,
    pub utm_content: String,
    pub gclid: String,
    pub fclid: String,
    pub dclid: String,
}

impl From<AttributionParams> for CapturedParams {
    fn from(params: AttributionParams) -> Self {
        let owned = |v: Option<String>| v.unwrap_or_default();
        Self {
            utm_source: owned(params.utm_source),
            utm_medium: owned(params.utm_medium),
            utm_campaign: owned(params.utm_campaign),
            utm_term: owned(params.utm_term),
            utm_content: owned(params.utm_content),
            gclid: owned(params.gclid),
            fclid: owned(params.fclid),
            dclid: owned(params.dclid),
        }
    }
}

/// Extracts the recognized attribution keys with non-empty values from a
/// page URL's query string.
fn params_from_url(page_url: &Url) -> AttributionParams {
    let mut params = AttributionParams::default();
    for (key, value) in page_url.query_pairs() {
        if ATTRIBUTION_KEYS.contains(&key.as_ref()) && !value.is_empty() {
            params.set(&key, value.into_owned());
        }
    }
    params
}

/// Captures attribution parameters from the current page URL.
///
/// When the URL carries at least one recognized key, the stored state is
/// overwritten wholesale with exactly the keys present in the URL; keys
/// missing from a capturing URL are dropped, not merged. A URL with no
/// recognized keys leaves the store untouched, so values survive navigation
/// past the landing page.
pub fn capture(page_url: &Url, store: &mut dyn SessionStore) {
    let has_recognized_key = page_url
        .query_pairs()
        .any(|(key, _)| ATTRIBUTION_KEYS.contains(&key.as_ref()));
    if !has_recognized_key {
        return;
    }

    let params = params_from_url(page_url);
    match serde_json::to_string(&params) {
        Ok(blob) => store.set(STORAGE_KEY, blob),
        Err(e) => tracing::warn!("Failed to serialize attribution params: {}", e),
    }
}

/// Reads the attribution parameters for form submission.
///
/// Resolution order: previously captured session state first, with missing
/// fields defaulting to ""; a missing or corrupt stored blob is treated as a
/// cache miss and the live URL is parsed instead. Never errors.
pub fn read(store: &dyn SessionStore, page_url: &Url) -> CapturedParams {
    if let Some(blob) = store.get(STORAGE_KEY) {
        if let Ok(params) = serde_json::from_str::<AttributionParams>(&blob) {
            return params.into();
        }
        // Invalid JSON, fall through to URL params
    }

    params_from_url(page_url).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn capture_then_read_round_trip() {
        let mut store = MemorySessionStore::default();
        let page = url("https://clinic.example/?utm_source=google&gclid=abc");

        capture(&page, &mut store);
        let params = read(&store, &page);

        assert_eq!(params.utm_source, "google");
        assert_eq!(params.gclid, "abc");
        assert_eq!(params.utm_medium, "");
        assert_eq!(params.utm_campaign, "");
        assert_eq!(params.utm_term, "");
        assert_eq!(params.utm_content, "");
        assert_eq!(params.fclid, "");
        assert_eq!(params.dclid, "");
    }

    #[test]
    fn read_is_idempotent() {
        let mut store = MemorySessionStore::default();
        let page = url("https://clinic.example/?utm_source=fb&utm_medium=cpc");

        capture(&page, &mut store);
        let first = read(&store, &page);
        let second = read(&store, &page);
        assert_eq!(first, second);
    }

    #[test]
    fn navigation_without_params_preserves_captured_state() {
        let mut store = MemorySessionStore::default();
        let landing = url("https://clinic.example/?utm_source=google&utm_campaign=brand");
        let inner_page = url("https://clinic.example/contacto");

        capture(&landing, &mut store);
        capture(&inner_page, &mut store);

        let params = read(&store, &inner_page);
        assert_eq!(params.utm_source, "google");
        assert_eq!(params.utm_campaign, "brand");
    }

    #[test]
    fn capturing_url_overwrites_wholesale() {
        let mut store = MemorySessionStore::default();
        let first_visit = url("https://clinic.example/?utm_source=google&utm_campaign=brand");
        let second_visit = url("https://clinic.example/?gclid=xyz");

        capture(&first_visit, &mut store);
        capture(&second_visit, &mut store);

        // utm_source from the first visit is dropped, not preserved
        let params = read(&store, &second_visit);
        assert_eq!(params.utm_source, "");
        assert_eq!(params.utm_campaign, "");
        assert_eq!(params.gclid, "xyz");
    }

    #[test]
    fn recognized_key_with_empty_value_still_overwrites() {
        let mut store = MemorySessionStore::default();
        let first_visit = url("https://clinic.example/?utm_source=google");
        let second_visit = url("https://clinic.example/?utm_term=");

        capture(&first_visit, &mut store);
        capture(&second_visit, &mut store);

        let params = read(&store, &second_visit);
        assert_eq!(params.utm_source, "");
        assert_eq!(params.utm_term, "");
    }

    #[test]
    fn corrupt_stored_state_falls_back_to_url() {
        let mut store = MemorySessionStore::default();
        store.set(STORAGE_KEY, "{not json".to_string());

        let page = url("https://clinic.example/?utm_source=bing");
        let params = read(&store, &page);
        assert_eq!(params.utm_source, "bing");
    }

    #[test]
    fn unknown_and_empty_query_keys_are_ignored() {
        let mut store = MemorySessionStore::default();
        let page = url("https://clinic.example/?utm_source=&ref=foo&gclid=abc");

        capture(&page, &mut store);
        let params = read(&store, &page);
        assert_eq!(params.gclid, "abc");
        assert_eq!(params.utm_source, "");
    }

    #[test]
    fn read_without_any_state_parses_live_url() {
        let store = MemorySessionStore::default();
        let page = url("https://clinic.example/?utm_medium=cpc");

        let params = read(&store, &page);
        assert_eq!(params.utm_medium, "cpc");
        assert_eq!(params.utm_source, "");
    }
}
