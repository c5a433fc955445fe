//! Client configuration.
//!
//! `ElastoConfig` is owned by each client instance and read at request time.
//! It can be built in code, parsed from TOML, and overridden from the
//! environment:
//!
//! ```toml
//! host = "localhost:9200"
//! timeout_secs = 30
//! geo_field = "location"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable overriding [`ElastoConfig::host`].
pub const ENV_HOST: &str = "ELASTO_HOST";

/// Environment variable overriding [`ElastoConfig::timeout_secs`].
pub const ENV_TIMEOUT_SECS: &str = "ELASTO_TIMEOUT_SECS";

/// Environment variable overriding [`ElastoConfig::geo_field`].
pub const ENV_GEO_FIELD: &str = "ELASTO_GEO_FIELD";

/// Connection and query defaults for one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElastoConfig {
    /// Engine host, with or without scheme (e.g. `localhost:9200`).
    #[serde(default = "default_host")]
    pub host: String,

    /// Request timeout applied by the HTTP transport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Document field holding geo points.
    #[serde(default = "default_geo_field")]
    pub geo_field: String,

    /// Radius used by `near` when none is given.
    #[serde(default = "default_radius_miles")]
    pub default_radius_miles: f64,
}

fn default_host() -> String {
    "http://localhost:9200".to_string()
}

fn default_geo_field() -> String {
    "location".to_string()
}

fn default_radius_miles() -> f64 {
    100.0
}

impl Default for ElastoConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            timeout_secs: None,
            geo_field: default_geo_field(),
            default_radius_miles: default_radius_miles(),
        }
    }
}

impl ElastoConfig {
    /// Create a configuration pointing at `host`.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Set the geo-point field name.
    pub fn with_geo_field(mut self, field: impl Into<String>) -> Self {
        self.geo_field = field.into();
        self
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))?;
        config.apply_env_overrides()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply `ELASTO_*` environment variables on top of the current values.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.host = host;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                Error::config(format!("{ENV_TIMEOUT_SECS} must be an integer, got '{raw}'"))
            })?;
            self.timeout_secs = Some(secs);
        }
        if let Some(field) = lookup(ENV_GEO_FIELD) {
            self.geo_field = field;
        }
        self.validate()
    }

    /// Check that the configuration can be used to issue requests.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::config("host must not be empty"));
        }
        if self.geo_field.trim().is_empty() {
            return Err(Error::config("geo_field must not be empty"));
        }
        if !self.default_radius_miles.is_finite() || self.default_radius_miles <= 0.0 {
            return Err(Error::config("default_radius_miles must be positive"));
        }
        Ok(())
    }

    /// Base URL of the engine, always with a scheme and without a trailing slash.
    pub fn base_url(&self) -> String {
        let host = self.host.trim().trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("http://{host}")
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = ElastoConfig::default();
        assert_eq!(config.host, "http://localhost:9200");
        assert!(config.timeout_secs.is_none());
        assert_eq!(config.geo_field, "location");
        assert_eq!(config.default_radius_miles, 100.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_base_url_adds_scheme() {
        let config = ElastoConfig::new("localhost:9200/");
        assert_eq!(config.base_url(), "http://localhost:9200");

        let config = ElastoConfig::new("https://search.example.com");
        assert_eq!(config.base_url(), "https://search.example.com");
    }

    #[test]
    fn test_from_toml_with_defaults() {
        let config = ElastoConfig::from_toml_str(r#"host = "es:9200""#).unwrap();
        assert_eq!(config.host, "es:9200");
        assert_eq!(config.geo_field, "location");
        assert_eq!(config.default_radius_miles, 100.0);
    }

    #[test]
    fn test_from_toml_rejects_empty_host() {
        let err = ElastoConfig::from_toml_str(r#"host = "  ""#).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_from_toml_rejects_garbage() {
        assert!(ElastoConfig::from_toml_str("host = [").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "host = \"localhost:9201\"").unwrap();
        writeln!(file, "timeout_secs = 5").unwrap();
        writeln!(file, "geo_field = \"coords\"").unwrap();

        let config = ElastoConfig::load(file.path()).unwrap();
        assert_eq!(config.base_url(), "http://localhost:9201");
        assert_eq!(config.timeout_secs, Some(5));
        assert_eq!(config.geo_field, "coords");
    }

    #[test]
    fn test_load_missing_file() {
        let err = ElastoConfig::load("/nonexistent/elasto.toml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_HOST, "override:9200"),
            (ENV_TIMEOUT_SECS, "12"),
            (ENV_GEO_FIELD, "position"),
        ]
        .into_iter()
        .collect();

        let mut config = ElastoConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.host, "override:9200");
        assert_eq!(config.timeout_secs, Some(12));
        assert_eq!(config.geo_field, "position");
    }

    #[test]
    fn test_overrides_reject_bad_timeout() {
        let mut config = ElastoConfig::default();
        let err = config
            .apply_overrides(|key| (key == ENV_TIMEOUT_SECS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_TIMEOUT_SECS));
    }

    #[test]
    fn test_serialization_skips_unset_timeout() {
        let json = serde_json::to_string(&ElastoConfig::default()).unwrap();
        assert!(!json.contains("timeout_secs"));
        assert!(json.contains("\"geo_field\":\"location\""));
    }
}
