//! Backend endpoint configuration.
//!
//! The hosted backend is addressed by a base URL plus a public (anon) API
//! key. Both are read once at startup from `<meta>` tags in the host page,
//! with compile-time environment overrides for local development.

use std::sync::OnceLock;

use crate::dom;

/// Backend endpoint configuration, set once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the hosted backend, e.g. `https://xyz.backend.example`.
    pub api_url: String,
    /// Public API key sent as the `apikey` header on every request.
    pub anon_key: String,
}

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Initialize the configuration. Later calls are ignored.
pub fn init(config: AppConfig) {
    CONFIG.set(config).ok();
}

/// Read configuration from the host page's meta tags and initialize.
///
/// `TRADEPOST_API_URL` / `TRADEPOST_ANON_KEY` set at build time win over the
/// page, so a dev build can point at a local backend without editing HTML.
pub fn init_from_document() {
    let api_url = option_env!("TRADEPOST_API_URL")
        .map(str::to_owned)
        .or_else(|| dom::meta_content("tradepost:api-url"))
        .unwrap_or_else(|| "http://localhost:54321".to_owned());
    let anon_key = option_env!("TRADEPOST_ANON_KEY")
        .map(str::to_owned)
        .or_else(|| dom::meta_content("tradepost:anon-key"))
        .unwrap_or_default();

    init(AppConfig { api_url, anon_key });
}

/// Get the configured endpoint. Falls back to defaults if `init` never ran.
pub fn get() -> AppConfig {
    CONFIG
        .get()
        .cloned()
        .unwrap_or_else(|| AppConfig {
            api_url: "http://localhost:54321".to_owned(),
            anon_key: String::new(),
        })
}
