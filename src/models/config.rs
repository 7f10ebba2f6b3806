// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::SiteConfig;
use crate::pipeline::AnomalyConfig;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP client behavior settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Central coupon API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Anomaly guard thresholds
    #[serde(default)]
    pub anomaly: AnomalyConfig,

    /// Site manifests
    #[serde(default)]
    pub sites: Vec<SiteConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.http.max_concurrent == 0 {
            return Err(AppError::validation("http.max_concurrent must be > 0"));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(AppError::validation("api.base_url is empty"));
        }
        if self.api.batch_size == 0 {
            return Err(AppError::validation("api.batch_size must be > 0"));
        }
        if self.sites.is_empty() {
            return Err(AppError::validation("No sites defined"));
        }
        for site in &self.sites {
            if site.index_url.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "Site '{}' has an empty index_url",
                    site.id
                )));
            }
        }
        Ok(())
    }
}

/// HTTP client behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum concurrent requests
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Central coupon API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the coupon API
    #[serde(default = "defaults::api_base_url")]
    pub base_url: String,

    /// Path of the batched fingerprint-existence endpoint
    #[serde(default = "defaults::existence_path")]
    pub existence_path: String,

    /// Path of the coupon persistence endpoint
    #[serde(default = "defaults::save_path")]
    pub save_path: String,

    /// Maximum fingerprints per existence request
    #[serde(default = "defaults::batch_size")]
    pub batch_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::api_base_url(),
            existence_path: defaults::existence_path(),
            save_path: defaults::save_path(),
            batch_size: defaults::batch_size(),
        }
    }
}

mod defaults {
    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; clipper/1.0)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        100
    }
    pub fn max_concurrent() -> usize {
        5
    }

    // API defaults
    pub fn api_base_url() -> String {
        "http://localhost:8080".into()
    }
    pub fn existence_path() -> String {
        "/v1/coupons/existing".into()
    }
    pub fn save_path() -> String {
        "/v1/coupons".into()
    }
    pub fn batch_size() -> usize {
        1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SiteConfig, SiteSelectors};

    fn test_site() -> SiteConfig {
        SiteConfig {
            id: "dealhub".into(),
            name: "DealHub".into(),
            index_url: "https://dealhub.example/coupons".into(),
            merchant_name: None,
            baseline_count: None,
            selectors: SiteSelectors {
                candidate_selector: "div.offer".into(),
                title_selector: "h3".into(),
                merchant_selector: None,
                id_attr: None,
                code_selector: None,
                reveal_link_selector: None,
                link_attr: "href".into(),
                description_selector: None,
                expired_marker: None,
                exclusive_marker: None,
                index_marker: None,
                detail_marker: None,
            },
        }
    }

    fn valid_config() -> Config {
        Config {
            sites: vec![test_site()],
            ..Config::default()
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_user_agent() {
        let mut config = valid_config();
        config.http.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let mut config = valid_config();
        config.api.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_sites() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [http]
            timeout_secs = 10

            [api]
            base_url = "https://api.example.com"

            [[sites]]
            id = "dealhub"
            name = "DealHub"
            index_url = "https://dealhub.example/coupons"
            candidate_selector = "div.offer"
            title_selector = "h3"
            "#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.http.timeout_secs, 10);
        // Unset fields fall back to serde defaults
        assert_eq!(config.http.max_concurrent, 5);
        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.api.batch_size, 1000);
        assert_eq!(config.sites.len(), 1);
    }
}
