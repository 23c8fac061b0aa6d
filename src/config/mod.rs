// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for Resumatch

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    /// Remote analysis service
    #[serde(default)]
    pub service: ServiceConfig,

    /// Batch behavior
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Upload guidelines
    #[serde(default)]
    pub upload: UploadConfig,

    /// Theme preference storage
    #[serde(default)]
    pub theme: ThemeConfig,

    /// Web UI settings
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServiceConfig {
    #[serde(default = "default_service_url")]
    pub url: String,
    /// Per-request deadline in seconds (0 disables)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Maximum simultaneous requests per batch (0 means unbounded)
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

/// How a batch reacts when one file fails
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Any failure fails the whole batch
    #[default]
    AllOrNothing,
    /// Keep successful files, report failed ones individually
    Partial,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct UploadConfig {
    /// Per-file size guideline enforced before analysis (null disables)
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ThemeConfig {
    #[serde(default = "default_theme_store")]
    pub store_path: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
    #[serde(default = "default_max_body")]
    pub max_body_bytes: usize,
}

// Default value functions
fn default_service_url() -> String { "http://localhost:3001/api/analyze".to_string() }
fn default_timeout() -> u64 { 120 }
fn default_max_concurrency() -> usize { 4 }
fn default_max_file_size() -> Option<u64> { Some(5 * 1024 * 1024) }
fn default_theme_store() -> PathBuf { PathBuf::from("resumatch_prefs.json") }
fn default_web_host() -> String { "127.0.0.1".to_string() }
fn default_web_port() -> u16 { 8080 }
fn default_max_body() -> usize { 50 * 1024 * 1024 }

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: default_service_url(),
            timeout_secs: default_timeout(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl ServiceConfig {
    /// Per-request deadline, if any
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size(),
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            store_path: default_theme_store(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            max_body_bytes: default_max_body(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::ResumatchError::Config(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> crate::Result<()> {
        let url = Url::parse(self.service.url.trim()).map_err(|e| {
            crate::ResumatchError::Config(format!("service.url '{}' is not a URL: {}", self.service.url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(crate::ResumatchError::Config(format!(
                "service.url must be an http(s) URL with a host, got '{}'",
                self.service.url
            )));
        }
        if self.web.max_body_bytes == 0 {
            return Err(crate::ResumatchError::Config(
                "web.max_body_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.service.url, "http://localhost:3001/api/analyze");
        assert_eq!(config.service.request_timeout(), Some(Duration::from_secs(120)));
        assert_eq!(config.analysis.failure_policy, FailurePolicy::AllOrNothing);
        assert_eq!(config.upload.max_file_size_bytes, Some(5 * 1024 * 1024));
        assert_eq!(config.web.port, 8080);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "service": { "url": "http://analyzer:9000/api/analyze", "timeout_secs": 0 },
                 "analysis": { "failure_policy": "partial" },
                 "upload": { "max_file_size_bytes": null } }"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.service.url, "http://analyzer:9000/api/analyze");
        assert_eq!(config.service.request_timeout(), None);
        assert_eq!(config.service.max_concurrency, 4);
        assert_eq!(config.analysis.failure_policy, FailurePolicy::Partial);
        assert_eq!(config.upload.max_file_size_bytes, None);
        assert_eq!(config.theme.store_path, PathBuf::from("resumatch_prefs.json"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = AppConfig::default();
        config.web.port = 9999;
        config.save(&path).unwrap();

        assert_eq!(AppConfig::load(&path).unwrap().web.port, 9999);
    }

    #[test]
    fn test_rejects_bad_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "service": { "url": "localhost:3001" } }"#).unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, crate::ResumatchError::Config(_)));
    }

    #[test]
    fn test_validate_requires_http_host() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        for url in ["http://", "ftp://files.example.com/analyze", "not a url"] {
            config.service.url = url.to_string();
            assert!(config.validate().is_err(), "{url} should be rejected");
        }

        config.service.url = "https://resumes.example.com:8443/api/analyze".to_string();
        assert!(config.validate().is_ok());
    }
}
