//! Display language preference
//!
//! Persisted under its own key in the session-scoped storage and read
//! once at startup to pick the initial language. Unsupported or
//! unreadable tags fall back to English.

use crate::session::persistence::{BackendResult, LANGUAGE_KEY, SessionBackend};
use shared::types::Language;

/// Read the persisted language preference
pub fn load_language(backend: &dyn SessionBackend) -> Language {
    match backend.load(LANGUAGE_KEY) {
        Ok(Some(bytes)) => std::str::from_utf8(&bytes)
            .ok()
            .and_then(Language::parse)
            .unwrap_or_default(),
        Ok(None) => Language::default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read language preference");
            Language::default()
        }
    }
}

/// Persist the language preference
pub fn save_language(backend: &dyn SessionBackend, lang: Language) -> BackendResult<()> {
    backend.save(LANGUAGE_KEY, lang.as_str().as_bytes())
}
