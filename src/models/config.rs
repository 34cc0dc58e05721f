use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Location of the optional settings file, relative to the working directory.
pub const CONFIG_FILE: &str = "config/inventory";

/// Settings of the inventory command-line tool.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct InventoryConfig {
    /// Path of the SQLite database file.
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Default `env_logger` filter; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

fn default_database_url() -> String {
    "inventory.db".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_pool_size() -> u32 {
    8
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            log_level: default_log_level(),
            pool_size: default_pool_size(),
        }
    }
}

impl InventoryConfig {
    /// Loads `config/inventory.yaml` if present, then `INVENTORY_*`
    /// environment variables on top. `.env` is read first when it exists.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::load_from(CONFIG_FILE)
    }

    /// Same as [`InventoryConfig::load`] with an explicit settings file and
    /// without reading `.env`.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let config: Self = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("INVENTORY"))
            .build()?
            .try_deserialize()?;

        if config.pool_size == 0 {
            return Err(ConfigError::Message(
                "pool_size must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = InventoryConfig::load_from("does/not/exist").unwrap();
        assert_eq!(config.pool_size, 8);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "database_url: /tmp/house.db\npool_size: 2").unwrap();

        let path = file.path().to_str().unwrap();
        let config = InventoryConfig::load_from(path).unwrap();
        assert_eq!(config.database_url, "/tmp/house.db");
        assert_eq!(config.pool_size, 2);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "pool_size: 0").unwrap();

        let path = file.path().to_str().unwrap();
        assert!(InventoryConfig::load_from(path).is_err());
    }
}
