//! Configuration extension for the extraction service
//!
//! Extends `yaxconfig::Config` with typed accessors for the scraper API
//! credentials and pipeline tuning. Environment variables take
//! precedence over the configuration file so deployments can inject
//! secrets without touching the YAML.

use crate::backends::scraper::DEFAULT_API_HOST;
use anyhow::Result;
use std::env;
use std::time::Duration;
use yaxconfig::Config;

/// Environment variable carrying the scraper API key
pub const ENV_SCRAPER_API_KEY: &str = "SCRAPER_API_KEY";

/// Environment variable carrying the scraper API host
pub const ENV_SCRAPER_API_HOST: &str = "SCRAPER_API_HOST";

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Extension trait for extraction-service configuration
pub trait YaxConfigExt {
    /// The scraper API key, if configured
    ///
    /// Checked in order: `SCRAPER_API_KEY` environment variable, then
    /// `accounts.scraper.api_key` in the configuration file. Empty
    /// strings count as absent; the scraper backend is skipped entirely
    /// when this returns `None`.
    fn get_scraper_api_key(&self) -> Result<Option<String>>;

    /// The scraper API host
    ///
    /// Checked in order: `SCRAPER_API_HOST` environment variable, then
    /// `accounts.scraper.api_host`, then the built-in default.
    fn get_scraper_api_host(&self) -> Result<String>;

    /// Upper bound for one backend attempt
    fn get_extract_backend_timeout(&self) -> Result<Duration>;
}

impl YaxConfigExt for Config {
    fn get_scraper_api_key(&self) -> Result<Option<String>> {
        if let Some(key) = env::var(ENV_SCRAPER_API_KEY).ok().and_then(non_empty) {
            return Ok(Some(key));
        }
        self.get_optional_string(&["accounts", "scraper", "api_key"])
    }

    fn get_scraper_api_host(&self) -> Result<String> {
        if let Some(host) = env::var(ENV_SCRAPER_API_HOST).ok().and_then(non_empty) {
            return Ok(host);
        }
        Ok(self
            .get_optional_string(&["accounts", "scraper", "api_host"])?
            .unwrap_or_else(|| DEFAULT_API_HOST.to_string()))
    }

    fn get_extract_backend_timeout(&self) -> Result<Duration> {
        Ok(Duration::from_secs(self.get_backend_timeout_secs()?))
    }
}
