use config::{Config, ConfigError};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub tables: TableSettings,
    #[serde(default = "default_kms_key_alias")]
    pub kms_key_alias: String,
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default)]
    pub provisioning: ProvisioningSettings,
    #[serde(default)]
    pub verify_buckets: bool,
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TableSettings {
    #[serde(default = "default_config_table")]
    pub config_table: String,
    #[serde(default = "default_batch_table")]
    pub batch_table: String,
    #[serde(default = "default_files_table")]
    pub files_table: String,
    #[serde(default = "default_read_capacity")]
    pub read_capacity: i64,
    #[serde(default = "default_write_capacity")]
    pub write_capacity: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProvisioningSettings {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            config_table: default_config_table(),
            batch_table: default_batch_table(),
            files_table: default_files_table(),
            read_capacity: default_read_capacity(),
            write_capacity: default_write_capacity(),
        }
    }
}

impl Default for ProvisioningSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_polls: default_max_polls(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_config_table() -> String {
    "LambdaVerticaBatchLoadConfig".to_string()
}

fn default_batch_table() -> String {
    "LambdaVerticaBatches".to_string()
}

fn default_files_table() -> String {
    "LambdaVerticaProcessedFiles".to_string()
}

fn default_read_capacity() -> i64 {
    1
}

fn default_write_capacity() -> i64 {
    5
}

fn default_kms_key_alias() -> String {
    "alias/LambdaVerticaLoaderKey".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_max_polls() -> u32 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    /// Loads settings from an optional file, overlaid with `LOADER_*` environment variables.
    ///
    /// Nested keys use a double underscore, e.g. `LOADER_TABLES__CONFIG_TABLE`.
    pub fn new(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("LOADER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;

        debug!(
            config_table = %settings.tables.config_table,
            kms_key_alias = %settings.kms_key_alias,
            endpoint_url = ?settings.endpoint_url,
            "Loaded setup settings"
        );

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let settings = Settings::new(None).unwrap();

        assert_eq!(settings.tables.config_table, "LambdaVerticaBatchLoadConfig");
        assert_eq!(settings.tables.batch_table, "LambdaVerticaBatches");
        assert_eq!(settings.tables.files_table, "LambdaVerticaProcessedFiles");
        assert_eq!(settings.kms_key_alias, "alias/LambdaVerticaLoaderKey");
        assert_eq!(settings.provisioning.max_polls, 120);
        assert_eq!(settings.log.format, LogFormat::Plain);
        assert!(!settings.verify_buckets);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
kms_key_alias = "alias/custom"
endpoint_url = "http://localhost:8000"
verify_buckets = true

[tables]
config_table = "StagingConfig"

[provisioning]
poll_interval_ms = 50

[log]
format = "json"
"#
        )
        .unwrap();

        let settings = Settings::new(Some(file.path().to_str().unwrap())).unwrap();

        assert_eq!(settings.kms_key_alias, "alias/custom");
        assert_eq!(settings.endpoint_url.as_deref(), Some("http://localhost:8000"));
        assert!(settings.verify_buckets);
        assert_eq!(settings.tables.config_table, "StagingConfig");
        assert_eq!(settings.tables.batch_table, "LambdaVerticaBatches");
        assert_eq!(settings.provisioning.poll_interval_ms, 50);
        assert_eq!(settings.provisioning.max_polls, 120);
        assert_eq!(settings.log.format, LogFormat::Json);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Settings::new(Some("/nonexistent/loader-setup.toml")).is_err());
    }
}
