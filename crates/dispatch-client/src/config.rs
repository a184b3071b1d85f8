//! Client configuration read from the environment.

use std::path::PathBuf;

use dispatch_core::defaults;
use dispatch_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Optional dashboard behaviors toggled per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureFlags {
    pub overtime_modal: bool,
    /// Enables the "send next 3" dispatch action.
    pub whatsapp_stub: bool,
    pub heatmap: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            overtime_modal: true,
            whatsapp_stub: true,
            heatmap: true,
        }
    }
}

impl FeatureFlags {
    /// Parse a JSON object such as `{"whatsappStub": false}`.
    /// Keys that are absent keep their default (enabled).
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| Error::Config(format!("invalid DISPATCH_FEATURE_FLAGS: {}", e)))
    }
}

/// Settings for [`crate::ApiClient`] and the CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend root, without the `/api` suffix.
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Webhook passed along with "send next 3".
    pub webhook_next3_url: String,
    pub feature_flags: FeatureFlags,
    /// Where the planner state file lives.
    pub state_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::API_BASE_URL.to_string(),
            timeout_seconds: defaults::CLIENT_TIMEOUT_SECS,
            webhook_next3_url: defaults::WEBHOOK_NEXT3_URL.to_string(),
            feature_flags: FeatureFlags::default(),
            state_path: PathBuf::from(defaults::STATE_PATH),
        }
    }
}

impl ClientConfig {
    /// Build from `DISPATCH_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let feature_flags = match lookup("DISPATCH_FEATURE_FLAGS") {
            Some(raw) if !raw.trim().is_empty() => FeatureFlags::parse(&raw)?,
            _ => FeatureFlags::default(),
        };

        Ok(Self {
            base_url: lookup("DISPATCH_API_BASE_URL")
                .unwrap_or_else(|| defaults::API_BASE_URL.to_string()),
            timeout_seconds: lookup("DISPATCH_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::CLIENT_TIMEOUT_SECS),
            webhook_next3_url: lookup("DISPATCH_WEBHOOK_NEXT3_URL")
                .unwrap_or_else(|| defaults::WEBHOOK_NEXT3_URL.to_string()),
            feature_flags,
            state_path: lookup("DISPATCH_STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(defaults::STATE_PATH)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert!(config.feature_flags.whatsapp_stub);
    }

    #[test]
    fn test_reads_every_variable() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("DISPATCH_API_BASE_URL", "http://backend:8080"),
            ("DISPATCH_TIMEOUT_SECS", "5"),
            ("DISPATCH_WEBHOOK_NEXT3_URL", "https://hooks.example.com/n3"),
            ("DISPATCH_FEATURE_FLAGS", r#"{"whatsappStub": false}"#),
            ("DISPATCH_STATE_PATH", "/tmp/planner.json"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://backend:8080");
        assert_eq!(config.timeout_seconds, 5);
        assert_eq!(config.webhook_next3_url, "https://hooks.example.com/n3");
        assert!(!config.feature_flags.whatsapp_stub);
        assert!(config.feature_flags.heatmap);
        assert_eq!(config.state_path, PathBuf::from("/tmp/planner.json"));
    }

    #[test]
    fn test_unparseable_timeout_falls_back() {
        let config =
            ClientConfig::from_lookup(lookup_from(&[("DISPATCH_TIMEOUT_SECS", "soon")])).unwrap();
        assert_eq!(config.timeout_seconds, defaults::CLIENT_TIMEOUT_SECS);
    }

    #[test]
    fn test_malformed_feature_flags_is_config_error() {
        let err = ClientConfig::from_lookup(lookup_from(&[("DISPATCH_FEATURE_FLAGS", "{oops")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
