use std::path::PathBuf;

use axum::http::HeaderValue;

use crate::ingest::IngestMode;

/// Error raised when an environment variable holds an unusable value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for deferred appends to finish (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Path of the JSON event log (default: `github_events.json`).
    pub events_file: PathBuf,
    /// Whether webhook appends complete before the response (default: deferred).
    pub ingest_mode: IngestMode,
    /// Optional second endpoint every normalized event is mirrored to.
    pub forward_url: Option<String>,
    /// Timeout for one forward attempt in seconds (default: `2`).
    pub forward_timeout_secs: u64,
    /// Slack incoming webhook used for status updates.
    pub slack_webhook_url: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `8000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `EVENTS_FILE`          | `github_events.json`       |
    /// | `INGEST_MODE`          | `deferred`                 |
    /// | `FORWARD_URL`          | unset                      |
    /// | `FORWARD_TIMEOUT_SECS` | `2`                        |
    /// | `SLACK_WEBHOOK_URL`    | unset                      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let optional = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let host = optional("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(&lookup, "PORT", 8000_u16, "a valid port number")?;

        let cors_origins: Vec<String> = optional("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if let Some(bad) = cors_origins
            .iter()
            .find(|o| HeaderValue::from_str(o).is_err())
        {
            return Err(ConfigError::Invalid {
                var: "CORS_ORIGINS",
                expected: "a comma-separated list of origins",
                value: bad.clone(),
            });
        }

        let request_timeout_secs =
            parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30_u64, "a number of seconds")?;
        let shutdown_timeout_secs =
            parse_or(&lookup, "SHUTDOWN_TIMEOUT_SECS", 30_u64, "a number of seconds")?;
        let forward_timeout_secs =
            parse_or(&lookup, "FORWARD_TIMEOUT_SECS", 2_u64, "a number of seconds")?;
        let ingest_mode = parse_or(
            &lookup,
            "INGEST_MODE",
            IngestMode::Deferred,
            "\"sync\" or \"deferred\"",
        )?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            events_file: optional("EVENTS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("github_events.json")),
            ingest_mode,
            forward_url: optional("FORWARD_URL"),
            forward_timeout_secs,
            slack_webhook_url: optional("SLACK_WEBHOOK_URL"),
        })
    }
}

/// Parse `var` if set (and non-blank), otherwise use `default`.
fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match lookup(var).filter(|v| !v.trim().is_empty()) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            expected,
            value: raw,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.events_file, PathBuf::from("github_events.json"));
        assert_eq!(config.ingest_mode, IngestMode::Deferred);
        assert_eq!(config.forward_url, None);
        assert_eq!(config.forward_timeout_secs, 2);
        assert_eq!(config.slack_webhook_url, None);
    }

    #[test]
    fn overrides_are_read() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("EVENTS_FILE", "/var/lib/cirelay/events.json"),
            ("INGEST_MODE", "sync"),
            ("FORWARD_URL", "http://localhost:8001/log"),
            ("SLACK_WEBHOOK_URL", "https://hooks.slack.com/services/T/B/X"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.events_file, PathBuf::from("/var/lib/cirelay/events.json"));
        assert_eq!(config.ingest_mode, IngestMode::Sync);
        assert_eq!(config.forward_url.as_deref(), Some("http://localhost:8001/log"));
        assert!(config.slack_webhook_url.is_some());
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[("PORT", " "), ("SLACK_WEBHOOK_URL", "")]).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.slack_webhook_url, None);
    }

    #[test]
    fn invalid_port_is_rejected() {
        assert_matches!(
            config_from(&[("PORT", "eighty")]),
            Err(ConfigError::Invalid { var: "PORT", .. })
        );
    }

    #[test]
    fn unknown_ingest_mode_is_rejected() {
        let err = config_from(&[("INGEST_MODE", "eventually")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "INGEST_MODE must be \"sync\" or \"deferred\", got \"eventually\""
        );
    }
}
