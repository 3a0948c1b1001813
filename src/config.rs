use anyhow::{anyhow, Context, Result};
use std::env;
use std::str::FromStr;
use tracing::Level;

pub const DEFAULT_TABLE_NAME: &str = "tv-schedule";
pub const DEFAULT_ID_FIELD: &str = "id";
pub const DEFAULT_FILTER_FIELD: &str = "channel";

/// Which store the process talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    DynamoDb,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "dynamodb" => Ok(StoreBackend::DynamoDb),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow!(
                "unknown store backend '{other}' (expected 'dynamodb' or 'memory')"
            )),
        }
    }
}

/// Process settings, read once at startup.
///
/// | Variable        | Default       |
/// |-----------------|---------------|
/// | `TABLE_NAME`    | `tv-schedule` |
/// | `ID_FIELD`      | `id`          |
/// | `FILTER_FIELD`  | `channel`     |
/// | `STORE_BACKEND` | `dynamodb`    |
/// | `LOG_LEVEL`     | `info`        |
///
/// AWS credentials and region are left to `aws_config`.
#[derive(Debug, Clone)]
pub struct Config {
    pub table_name: String,
    pub id_field: String,
    pub filter_field: String,
    pub backend: StoreBackend,
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            id_field: DEFAULT_ID_FIELD.to_string(),
            filter_field: DEFAULT_FILTER_FIELD.to_string(),
            backend: StoreBackend::DynamoDb,
            log_level: Level::INFO,
        }
    }
}

impl Config {
    /// Reads the configuration from the environment. Call `dotenv` first to pick up `.env`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let text = |key: &str, default: String| -> Result<String> {
            match lookup(key) {
                Some(value) if value.trim().is_empty() => Err(anyhow!("{key} must not be empty")),
                Some(value) => Ok(value.trim().to_string()),
                None => Ok(default),
            }
        };

        let backend = match lookup("STORE_BACKEND") {
            Some(value) => value.parse().context("invalid STORE_BACKEND")?,
            None => defaults.backend,
        };
        let log_level = match lookup("LOG_LEVEL") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| anyhow!("invalid LOG_LEVEL '{value}'"))?,
            None => defaults.log_level,
        };

        Ok(Self {
            table_name: text("TABLE_NAME", defaults.table_name)?,
            id_field: text("ID_FIELD", defaults.id_field)?,
            filter_field: text("FILTER_FIELD", defaults.filter_field)?,
            backend,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.table_name, "tv-schedule");
        assert_eq!(config.id_field, "id");
        assert_eq!(config.filter_field, "channel");
        assert_eq!(config.backend, StoreBackend::DynamoDb);
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("TABLE_NAME", "schedule-test"),
            ("STORE_BACKEND", "Memory"),
            ("LOG_LEVEL", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.table_name, "schedule-test");
        assert_eq!(config.backend, StoreBackend::Memory);
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn test_invalid_values() {
        assert!(Config::from_lookup(lookup(&[("STORE_BACKEND", "redis")])).is_err());
        assert!(Config::from_lookup(lookup(&[("LOG_LEVEL", "loud")])).is_err());
        assert!(Config::from_lookup(lookup(&[("ID_FIELD", " ")])).is_err());
    }
}
