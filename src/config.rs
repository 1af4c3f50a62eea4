use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use validator::Validate;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct Settings {
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    #[validate(nested)]
    pub export: ExportSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

/// Lifetimes of export artifacts and the links handed out for them
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExportSettings {
    /// How long a finished export stays downloadable
    #[serde(default = "default_link_ttl_days")]
    #[validate(range(min = 1, max = 365))]
    pub link_ttl_days: u32,
    /// Validity of a signed download URL
    #[serde(default = "default_download_url_ttl_secs")]
    #[validate(range(min = 1, max = 604800))]
    pub download_url_ttl_secs: u32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            link_ttl_days: default_link_ttl_days(),
            download_url_ttl_secs: default_download_url_ttl_secs(),
        }
    }
}

impl ExportSettings {
    pub fn link_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.link_ttl_days))
    }

    pub fn download_url_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.download_url_ttl_secs))
    }
}

fn default_link_ttl_days() -> u32 { 7 }
fn default_download_url_ttl_secs() -> u32 { 15 * 60 }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with PREFS_)
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., PREFS__EXPORT__LINK_TTL_DAYS -> export.link_ttl_days
            .add_source(
                Environment::with_prefix("PREFS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::from_config(config)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("PREFS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::from_config(config)
    }

    /// Deserialize and range-check an already built `Config`
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        settings
            .validate()
            .map_err(|e| ConfigError::Message(format!("invalid settings: {}", e)))?;
        Ok(settings)
    }
}
