use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

pub const ENV_API_URL: &str = "TRACKER_API_URL";
pub const ENV_API_KEY: &str = "TRACKER_API_KEY";
pub const ENV_SITE_DOMAIN: &str = "TRACKER_SITE_DOMAIN";
pub const ENV_MIN_PAGE_TIME_MS: &str = "TRACKER_MIN_PAGE_TIME_MS";
pub const ENV_DB_PATH: &str = "TRACKER_DB_PATH";

/// Process-wide tracker settings, built once at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Base URL of the REST data API. Writes are skipped when absent.
    pub api_url: Option<String>,
    /// Public API credential sent with every write. Writes are skipped when absent.
    pub api_key: Option<String>,
    /// Referrers on this domain count as internal navigation.
    pub site_domain: String,
    /// Visits shorter than this produce no page view.
    pub min_page_time_ms: u64,
    /// Upper bound applied to reported scroll depth.
    pub max_scroll_depth: u8,
    pub sessions_table: String,
    pub page_views_table: String,
    pub request_timeout_secs: u64,
    /// Local SQLite store read by the analytics report.
    pub db_path: PathBuf,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            site_domain: "theprojectseo.com".into(),
            min_page_time_ms: 500,
            max_scroll_depth: 100,
            sessions_table: "tps_sessions".into(),
            page_views_table: "tps_page_views".into(),
            request_timeout_secs: 10,
            db_path: PathBuf::from("analytics.sqlite3"),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

impl TrackerConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Reads a JSON settings file, then lets the environment override it.
    /// A missing file means defaults; an unreadable one is an error, a
    /// malformed one falls back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read tracker config from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("Ignoring malformed tracker config {}: {err}", path.display());
                Self::default()
            })
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = non_empty(lookup(ENV_API_URL)) {
            self.api_url = Some(url);
        }
        if let Some(key) = non_empty(lookup(ENV_API_KEY)) {
            self.api_key = Some(key);
        }
        if let Some(domain) = non_empty(lookup(ENV_SITE_DOMAIN)) {
            self.site_domain = domain;
        }
        if let Some(raw) = non_empty(lookup(ENV_MIN_PAGE_TIME_MS)) {
            match raw.parse::<u64>() {
                Ok(ms) => self.min_page_time_ms = ms,
                Err(err) => log::warn!("Ignoring {ENV_MIN_PAGE_TIME_MS}={raw}: {err}"),
            }
        }
        if let Some(path) = non_empty(lookup(ENV_DB_PATH)) {
            self.db_path = PathBuf::from(path);
        }

        self.api_url = non_empty(self.api_url.take());
        self.api_key = non_empty(self.api_key.take());
    }

    /// Both the endpoint and the credential, or nothing.
    pub fn api_credentials(&self) -> Option<(&str, &str)> {
        match (self.api_url.as_deref(), self.api_key.as_deref()) {
            (Some(url), Some(key)) => Some((url, key)),
            _ => None,
        }
    }

    pub fn min_page_time(&self) -> Duration {
        Duration::from_millis(self.min_page_time_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
