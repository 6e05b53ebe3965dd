//! Layered settings for the PRBAC bridge server
//!
//! Sources, lowest precedence first:
//! - Built-in defaults
//! - A YAML file (`prbac-server.yaml` unless told otherwise)
//! - Environment variables prefixed `PRBAC__`, nested with `__`
//!   (`PRBAC__SPICEDB__URL`, `PRBAC__SERVER__PORT`)
//! - Explicit overrides, typically from command line flags
//!
//! # Example
//!
//! ```rust,no_run
//! use config_engine::{SettingsLoader, SettingsOverrides};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = SettingsLoader::new()
//!         .file("prbac-server.yaml", false)
//!         .overrides(SettingsOverrides {
//!             port: Some(9090),
//!             ..Default::default()
//!         })
//!         .load()?;
//!
//!     println!("{}", settings.to_redacted_yaml()?);
//!     Ok(())
//! }
//! ```

pub mod error;

pub use error::*;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

pub const ENV_PREFIX: &str = "PRBAC";
pub const ENV_SEPARATOR: &str = "__";
pub const DEFAULT_CONFIG_FILE: &str = "prbac-server.yaml";

const REDACTED: &str = "********";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub spicedb: SpiceDbSettings,
    /// Path of the permission catalog JSON document
    pub catalog_path: PathBuf,
    /// Org used when a request carries none
    pub default_org: String,
    /// Catalog permission -> backend role id; `None` keeps the built-in
    /// inventory table
    #[serde(default)]
    pub system_roles: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpiceDbSettings {
    /// Base URL of the SpiceDB HTTP gateway
    pub url: String,
    /// Preshared key sent as bearer token
    pub psk: String,
    pub connect_timeout_secs: u64,
}

impl SpiceDbSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Settings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// YAML rendering of the effective settings with secrets masked.
    pub fn to_redacted_yaml(&self) -> Result<String> {
        let mut redacted = self.clone();
        if !redacted.spicedb.psk.is_empty() {
            redacted.spicedb.psk = REDACTED.to_string();
        }
        Ok(serde_yaml::to_string(&redacted)?)
    }

    fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::ValidationError("server.host must not be empty".to_string()));
        }
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError("server.port must not be 0".to_string()));
        }
        if !(self.spicedb.url.starts_with("http://") || self.spicedb.url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "spicedb.url must be an http(s) URL, got '{}'",
                self.spicedb.url
            )));
        }
        if self.spicedb.connect_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "spicedb.connect_timeout_secs must be positive".to_string(),
            ));
        }
        if self.catalog_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError("catalog_path must not be empty".to_string()));
        }
        if self.default_org.trim().is_empty() {
            return Err(ConfigError::ValidationError("default_org must not be empty".to_string()));
        }
        if let Some(roles) = &self.system_roles {
            if let Some((permission, _)) = roles.iter().find(|(_, role)| role.trim().is_empty()) {
                return Err(ConfigError::ValidationError(format!(
                    "system role for '{}' must not be empty",
                    permission
                )));
            }
        }
        Ok(())
    }
}

/// Values that win over every other source. `None` leaves the layered
/// value alone.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub spicedb_url: Option<String>,
    pub spicedb_psk: Option<String>,
    pub catalog_path: Option<PathBuf>,
    pub default_org: Option<String>,
}

/// Builder assembling the settings sources in precedence order.
#[derive(Debug, Default)]
pub struct SettingsLoader {
    file: Option<(PathBuf, bool)>,
    yaml: Option<String>,
    env_source: Option<HashMap<String, String>>,
    overrides: SettingsOverrides,
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a YAML file; a missing file is only an error when `required`.
    pub fn file(mut self, path: impl Into<PathBuf>, required: bool) -> Self {
        self.file = Some((path.into(), required));
        self
    }

    /// Inline YAML layered right after the file.
    pub fn yaml(mut self, contents: impl Into<String>) -> Self {
        self.yaml = Some(contents.into());
        self
    }

    /// Read `PRBAC__*` variables from this map instead of the process
    /// environment.
    pub fn env_source(mut self, vars: HashMap<String, String>) -> Self {
        self.env_source = Some(vars);
        self
    }

    pub fn overrides(mut self, overrides: SettingsOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn load(self) -> Result<Settings> {
        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080_i64)?
            .set_default("spicedb.url", "http://localhost:8443")?
            .set_default("spicedb.psk", "foobar")?
            .set_default("spicedb.connect_timeout_secs", 5_i64)?
            .set_default("catalog_path", "services.json")?
            .set_default("default_org", "aspian")?;

        if let Some((path, required)) = &self.file {
            debug!(path = %path.display(), required = required, "Adding settings file");
            builder = builder.add_source(File::from(path.clone()).format(FileFormat::Yaml).required(*required));
        }

        if let Some(contents) = &self.yaml {
            builder = builder.add_source(File::from_str(contents, FileFormat::Yaml));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .source(self.env_source),
        );

        let overrides = self.overrides;
        builder = builder
            .set_override_option("server.host", overrides.host)?
            .set_override_option("server.port", overrides.port.map(i64::from))?
            .set_override_option("spicedb.url", overrides.spicedb_url)?
            .set_override_option("spicedb.psk", overrides.spicedb_psk)?
            .set_override_option(
                "catalog_path",
                overrides.catalog_path.map(|p| p.to_string_lossy().into_owned()),
            )?
            .set_override_option("default_org", overrides.default_org)?;

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn isolated() -> SettingsLoader {
        SettingsLoader::new().env_source(HashMap::new())
    }

    #[test]
    fn test_defaults() {
        let settings = isolated().load().unwrap();
        assert_eq!(settings.bind_address(), "0.0.0.0:8080");
        assert_eq!(settings.spicedb.url, "http://localhost:8443");
        assert_eq!(settings.spicedb.connect_timeout(), Duration::from_secs(5));
        assert_eq!(settings.catalog_path, PathBuf::from("services.json"));
        assert_eq!(settings.default_org, "aspian");
        assert!(settings.system_roles.is_none());
    }

    #[test]
    fn test_precedence_yaml_env_override() {
        let mut env = HashMap::new();
        env.insert("PRBAC__SERVER__PORT".to_string(), "9000".to_string());
        env.insert("PRBAC__DEFAULT_ORG".to_string(), "acme".to_string());

        let settings = SettingsLoader::new()
            .yaml("server:\n  port: 7000\n  host: 127.0.0.1\ndefault_org: yaml-org\n")
            .env_source(env)
            .overrides(SettingsOverrides {
                default_org: Some("cli-org".to_string()),
                ..Default::default()
            })
            .load()
            .unwrap();

        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.default_org, "cli-org");
    }

    #[test]
    fn test_system_roles_from_yaml() {
        let settings = isolated()
            .yaml("system_roles:\n  \"inventory:hosts:read\": role-a\n")
            .load()
            .unwrap();

        let roles = settings.system_roles.unwrap();
        assert_eq!(roles.get("inventory:hosts:read").map(String::as_str), Some("role-a"));
    }

    #[test]
    fn test_missing_optional_file_is_ignored() {
        let settings = isolated().file("/nonexistent/prbac-server.yaml", false).load();
        assert!(settings.is_ok());

        let settings = isolated().file("/nonexistent/prbac-server.yaml", true).load();
        assert!(matches!(settings, Err(ConfigError::SourceError(_))));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let result = isolated()
            .overrides(SettingsOverrides {
                spicedb_url: Some("localhost:50051".to_string()),
                ..Default::default()
            })
            .load();
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_rejects_blank_org() {
        let result = isolated().yaml("default_org: \"  \"\n").load();
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_redacted_yaml_masks_psk() {
        let settings = isolated()
            .overrides(SettingsOverrides {
                spicedb_psk: Some("supersecret".to_string()),
                ..Default::default()
            })
            .load()
            .unwrap();

        let yaml = settings.to_redacted_yaml().unwrap();
        assert!(!yaml.contains("supersecret"));
        assert!(yaml.contains(REDACTED));
        assert_eq!(settings.spicedb.psk, "supersecret");
    }
}
