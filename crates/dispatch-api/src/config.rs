//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::HeaderValue;
use dispatch_core::defaults;

/// Origins allowed when `ALLOWED_ORIGINS` is unset or blank.
const DEFAULT_ORIGINS: &[&str] = &["http://localhost:3000", "http://localhost:5173"];

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Raw `ALLOWED_ORIGINS` entries; see [`parse_allowed_origins`].
    pub allowed_origins: Vec<String>,
    /// Seed file replacing the embedded fixture data.
    pub seed_path: Option<PathBuf>,
    /// When false, send-next-3 answers with a mocked message instead of
    /// calling the webhook.
    pub webhook_delivery: bool,
    pub webhook_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::SERVER_HOST.to_string(),
            port: defaults::SERVER_PORT,
            allowed_origins: DEFAULT_ORIGINS.iter().map(|s| s.to_string()).collect(),
            seed_path: None,
            webhook_delivery: false,
            webhook_timeout_secs: defaults::WEBHOOK_TIMEOUT_SECS,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Unparseable values fall back
    /// to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let allowed_origins = match lookup("ALLOWED_ORIGINS") {
            Some(raw) if !raw.trim().is_empty() => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            _ => DEFAULT_ORIGINS.iter().map(|s| s.to_string()).collect(),
        };

        Self {
            host: lookup("HOST").unwrap_or_else(|| defaults::SERVER_HOST.to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults::SERVER_PORT),
            allowed_origins,
            seed_path: lookup("DISPATCH_SEED_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            webhook_delivery: lookup("DISPATCH_WEBHOOK_DELIVERY")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            webhook_timeout_secs: lookup("WEBHOOK_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::WEBHOOK_TIMEOUT_SECS),
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

/// Turn configured origins into header values, skipping invalid entries.
pub fn parse_allowed_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect()
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
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config, ServerConfig::default());
        assert!(!config.webhook_delivery);
    }

    #[test]
    fn test_reads_every_variable() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8088"),
            ("ALLOWED_ORIGINS", "https://ops.example.com, http://localhost:4000"),
            ("DISPATCH_SEED_PATH", "/srv/seed.json"),
            ("DISPATCH_WEBHOOK_DELIVERY", "true"),
            ("WEBHOOK_TIMEOUT_SECS", "3"),
        ]));

        assert_eq!(config.socket_addr().unwrap().port(), 8088);
        assert_eq!(
            config.allowed_origins,
            vec!["https://ops.example.com", "http://localhost:4000"]
        );
        assert_eq!(config.seed_path, Some(PathBuf::from("/srv/seed.json")));
        assert!(config.webhook_delivery);
        assert_eq!(config.webhook_timeout_secs, 3);
    }

    #[test]
    fn test_bad_port_falls_back() {
        let config = ServerConfig::from_lookup(lookup_from(&[("PORT", "http")]));
        assert_eq!(config.port, defaults::SERVER_PORT);
    }

    #[test]
    fn test_invalid_origin_is_skipped() {
        let parsed = parse_allowed_origins(&[
            "http://localhost:3000".to_string(),
            "bad\norigin".to_string(),
        ]);
        assert_eq!(parsed.len(), 1);
    }
}
