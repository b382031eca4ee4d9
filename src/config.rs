// src/config.rs
//! Process configuration. Everything comes from the environment (`.env` is
//! loaded by the binary before this runs). A missing credential is never an
//! error; the affected component degrades to its fallback path.

use std::env;
use std::time::Duration;

const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5020";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// AI briefings (OPENAI_API_KEY).
    pub openai_api_key: Option<String>,
    /// Weather secondary upstream (OPENWEATHER_API_KEY).
    pub openweather_api_key: Option<String>,
    /// Headlines secondary upstream (NEWS_API_KEY).
    pub news_api_key: Option<String>,
    /// Market secondary upstream (ALPHA_VANTAGE_KEY).
    pub alpha_vantage_key: Option<String>,
    /// gather_all result cache TTL; 0 disables (CACHE_TTL_SECS).
    pub cache_ttl_secs: u64,
    /// Listen address for the HTTP boundary (BIND_ADDR).
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: key("OPENAI_API_KEY"),
            openweather_api_key: key("OPENWEATHER_API_KEY"),
            news_api_key: key("NEWS_API_KEY"),
            alpha_vantage_key: key("ALPHA_VANTAGE_KEY"),
            cache_ttl_secs: env::var("CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_CACHE_TTL_SECS),
            bind_addr: env::var("BIND_ADDR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        }
    }

    /// No credentials, no cache. Every source and the briefing fall through
    /// to their demo paths.
    pub fn offline() -> Self {
        Self {
            openai_api_key: None,
            openweather_api_key: None,
            news_api_key: None,
            alpha_vantage_key: None,
            cache_ttl_secs: 0,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Read an env var as a credential: trimmed, empty treated as absent.
fn key(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
