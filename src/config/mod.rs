//! Configuration module for iplookup
//!
//! Handles loading configuration from a YAML file and environment variables.
//! Every field has a default, so an empty or missing file yields a working
//! configuration.

use crate::database::{DatabaseType, StructuredRecord};
use crate::error::{LookupError, Result};
use crate::utils::path;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use unic_langid::LanguageIdentifier;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds allowed for reading a request
    #[serde(default = "default_timeout")]
    pub read_timeout: u64,

    /// Seconds allowed for producing a response
    #[serde(default = "default_timeout")]
    pub write_timeout: u64,
}

/// Route configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Prefix for the lookup routes, e.g. `/api/v1`
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// CORS origins; `*` allows any origin
    #[serde(default = "default_allow_origins")]
    pub allow_origins: Vec<String>,
}

/// Backend selection per address family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Language for localized names (BCP-47)
    #[serde(default = "default_language")]
    pub language: String,

    /// Store for IPv4 addresses; `~` disables IPv4 lookups
    #[serde(default = "default_ipv4_backend")]
    pub ipv4: Option<BackendConfig>,

    /// Store for IPv6 addresses; `~` disables IPv6 lookups
    #[serde(default = "default_ipv6_backend")]
    pub ipv6: Option<BackendConfig>,
}

/// One configured store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub kind: DatabaseType,

    /// Database file (all kinds except `stub`)
    #[serde(default)]
    pub path: Option<String>,

    /// Table name (`sqlite` only)
    #[serde(default = "default_table")]
    pub table: String,

    /// Fixed record (`stub` only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<StructuredRecord>,

    /// Fixed delimited text (`stub` only); takes precedence over `record`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout() -> u64 {
    30
}

fn default_prefix() -> String {
    "/api/v1".to_string()
}

fn default_allow_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_language() -> String {
    "en".to_string()
}

fn default_table() -> String {
    crate::database::sqlite::DEFAULT_TABLE.to_string()
}

fn default_ipv4_backend() -> Option<BackendConfig> {
    Some(BackendConfig::file(DatabaseType::IP2Region, "./ipdata/ipv4.xdb"))
}

fn default_ipv6_backend() -> Option<BackendConfig> {
    Some(BackendConfig::file(DatabaseType::IP2Region, "./ipdata/ipv6.xdb"))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            read_timeout: default_timeout(),
            write_timeout: default_timeout(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            allow_origins: default_allow_origins(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            ipv4: default_ipv4_backend(),
            ipv6: default_ipv6_backend(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Upper bound on handling one request
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout + self.write_timeout)
    }
}

impl BackendConfig {
    /// File-backed store of the given kind
    pub fn file<P: Into<String>>(kind: DatabaseType, path: P) -> Self {
        Self {
            kind,
            path: Some(path.into()),
            table: default_table(),
            record: None,
            text: None,
        }
    }

    /// Fixed-record store
    pub fn stub(record: Option<StructuredRecord>) -> Self {
        Self {
            kind: DatabaseType::Stub,
            path: None,
            table: default_table(),
            record,
            text: None,
        }
    }

    /// Configured path with `~` expanded
    pub fn resolved_path(&self) -> Result<PathBuf> {
        self.path
            .as_deref()
            .map(path::expand_tilde)
            .ok_or_else(|| LookupError::config(format!("{} backend requires a path", self.kind)))
    }

    fn validate(&self, family: &str) -> Result<()> {
        match self.kind {
            DatabaseType::Stub => Ok(()),
            DatabaseType::Sqlite if !crate::regex::is_identifier(&self.table) => Err(
                LookupError::config(format!("database.{}.table {:?} is not an identifier", family, self.table)),
            ),
            _ if self.path.as_deref().is_none_or(str::is_empty) => Err(LookupError::config(format!(
                "database.{} ({}) requires a path",
                family, self.kind
            ))),
            _ => Ok(()),
        }
    }
}

impl AppConfig {
    /// Load configuration from a file, then apply environment overrides
    ///
    /// An explicit `config_file` must exist. Without one, the default location
    /// is tried and built-in defaults are used if it is absent.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        Self::load_with_env(config_file, |key| env::var(key).ok())
    }

    /// [`AppConfig::load`] with overrides read from `lookup` instead of the process environment
    pub fn load_with_env<F>(config_file: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match config_file {
            Some(file) => Self::from_file(file)?,
            None => {
                let file = path::default_config_file();
                if file.exists() {
                    Self::from_file(&file)?
                } else {
                    log::warn!("Config file {} not found, using defaults", file.display());
                    Self::default()
                }
            }
        };

        config.apply_env_from(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML file
    pub fn from_file(file: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", file.display());
        let content = fs::read_to_string(file)
            .map_err(|e| LookupError::config(format!("Failed to read config file {}: {}", file.display(), e)))?;
        Self::from_yaml_str(&content)
    }

    /// Parse YAML; an empty document yields the defaults
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| LookupError::YamlError(format!("Failed to parse config file: {}", e)))
    }

    /// Apply `IPLOOKUP_*` overrides from any key lookup
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("IPLOOKUP_PORT") {
            self.server.port = val
                .trim()
                .parse()
                .map_err(|_| LookupError::config(format!("IPLOOKUP_PORT is not a port number: {:?}", val)))?;
        }
        if let Some(val) = lookup("IPLOOKUP_IPV4_DB") {
            override_path(&mut self.database.ipv4, val);
        }
        if let Some(val) = lookup("IPLOOKUP_IPV6_DB") {
            override_path(&mut self.database.ipv6, val);
        }
        if let Some(val) = lookup("IPLOOKUP_LANG") {
            self.database.language = val;
        }
        Ok(())
    }

    /// Reject values that would only fail later at request time
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(LookupError::config("server.port must be non-zero"));
        }
        if !crate::regex::is_api_prefix(&self.api.prefix) {
            return Err(LookupError::config(format!(
                "api.prefix {:?} must start with '/' and not end with '/'",
                self.api.prefix
            )));
        }
        self.language()?;

        if let Some(backend) = &self.database.ipv4 {
            backend.validate("ipv4")?;
        }
        if let Some(backend) = &self.database.ipv6 {
            backend.validate("ipv6")?;
        }
        Ok(())
    }

    /// Parsed language tag
    pub fn language(&self) -> Result<LanguageIdentifier> {
        self.database
            .language
            .parse::<LanguageIdentifier>()
            .map_err(|e| LookupError::config(format!("database.language {:?}: {}", self.database.language, e)))
    }
}

/// Point a family at a new file, keeping its kind when one is configured
fn override_path(backend: &mut Option<BackendConfig>, path: String) {
    match backend {
        Some(backend) => backend.path = Some(path),
        None => *backend = Some(BackendConfig::file(DatabaseType::IP2Region, path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_map(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.api.prefix, "/api/v1");
        assert_eq!(config.api.allow_origins, vec!["*"]);
        assert_eq!(config.database.language, "en");

        let ipv4 = config.database.ipv4.as_ref().unwrap();
        assert_eq!(ipv4.kind, DatabaseType::IP2Region);
        assert_eq!(ipv4.path.as_deref(), Some("./ipdata/ipv4.xdb"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "server:\n  port: 9000\ndatabase:\n  ipv6: ~\n";
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.read_timeout, 30);
        assert_eq!(config.api.prefix, "/api/v1");
        assert!(config.database.ipv4.is_some());
        assert!(config.database.ipv6.is_none());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = AppConfig::from_yaml_str("  \n").unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_backend_kinds() {
        let yaml = r#"
database:
  language: de
  ipv4:
    kind: sqlite
    path: ~/ipdata/ranges.sqlite
    table: ranges_v4
  ipv6:
    kind: stub
    record:
      country: Testland
      latitude: 1.5
"#;
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        let ipv4 = config.database.ipv4.as_ref().unwrap();
        assert_eq!(ipv4.kind, DatabaseType::Sqlite);
        assert_eq!(ipv4.table, "ranges_v4");
        assert!(ipv4.resolved_path().unwrap().ends_with("ipdata/ranges.sqlite"));

        let ipv6 = config.database.ipv6.as_ref().unwrap();
        assert_eq!(ipv6.kind, DatabaseType::Stub);
        assert_eq!(ipv6.record.as_ref().unwrap().country.as_deref(), Some("Testland"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = AppConfig::from_yaml_str("server: [1, 2").unwrap_err();
        assert!(matches!(err, LookupError::YamlError(_)));

        let err = AppConfig::from_yaml_str("database:\n  ipv4:\n    kind: qqwry\n").unwrap_err();
        assert!(matches!(err, LookupError::YamlError(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.database.ipv6 = None;
        config
            .apply_env_from(env_map(&[
                ("IPLOOKUP_PORT", "9090"),
                ("IPLOOKUP_IPV4_DB", "/data/v4.xdb"),
                ("IPLOOKUP_IPV6_DB", "/data/v6.xdb"),
                ("IPLOOKUP_LANG", "zh-CN"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.ipv4.as_ref().unwrap().path.as_deref(), Some("/data/v4.xdb"));
        let ipv6 = config.database.ipv6.as_ref().unwrap();
        assert_eq!(ipv6.kind, DatabaseType::IP2Region);
        assert_eq!(ipv6.path.as_deref(), Some("/data/v6.xdb"));
        assert_eq!(config.database.language, "zh-CN");
    }

    #[test]
    fn test_env_override_bad_port() {
        let mut config = AppConfig::default();
        let err = config.apply_env_from(env_map(&[("IPLOOKUP_PORT", "http")])).unwrap_err();
        assert!(matches!(err, LookupError::ConfigError(_)));
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.api.prefix = "/api/v1/".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.api.prefix = "api".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.database.language = "not a language!".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.database.ipv4 = Some(BackendConfig {
            table: "ip; DROP".to_string(),
            ..BackendConfig::file(DatabaseType::Sqlite, "ip.sqlite")
        });
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.database.ipv6 = Some(BackendConfig {
            path: None,
            ..BackendConfig::file(DatabaseType::GeoIP2, "")
        });
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.database.ipv6 = Some(BackendConfig::stub(None));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  port: 7000\napi:\n  prefix: /geo").unwrap();

        let config = AppConfig::load_with_env(Some(file.path()), |_| None).unwrap();
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.api.prefix, "/geo");
    }

    #[test]
    fn test_load_applies_given_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  port: 7000").unwrap();

        let env = |key: &str| (key == "IPLOOKUP_PORT").then(|| "9100".to_string());
        let config = AppConfig::load_with_env(Some(file.path()), env).unwrap();
        assert_eq!(config.server.port, 9100);

        let env = |key: &str| (key == "IPLOOKUP_PORT").then(|| "0".to_string());
        assert!(AppConfig::load_with_env(Some(file.path()), env).is_err());
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = AppConfig::load_with_env(Some(Path::new("/nonexistent/iplookup.yml")), |_| None).unwrap_err();
        assert!(matches!(err, LookupError::ConfigError(_)));
    }

    #[test]
    fn test_config_serialization() {
        let yaml = serde_yaml::to_string(&AppConfig::default()).unwrap();
        assert!(yaml.contains("server"));
        assert!(yaml.contains("ip2region"));
        let parsed = AppConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed.server.port, 8080);
    }
}
