use crate::core::{DaoError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Identifier of the pool the access layer draws connections from.
    pub datasource: String,
    #[serde(default)]
    pub pools: BTreeMap<String, PoolConfig>,
    pub logging: Option<LoggingConfig>,
}

/// Definition of one named SQLite connection pool.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    /// Database file, or ":memory:".
    pub path: String,
    pub max_size: Option<u32>,
    pub min_idle: Option<u32>,
    pub connection_timeout_ms: Option<u64>,
    /// SQL run on every new connection.
    pub init_sql: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

impl PoolConfig {
    pub const DEFAULT_MAX_SIZE: u32 = 10;
    pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

    pub fn is_memory(&self) -> bool {
        self.path == ":memory:"
    }

    /// Pool capacity. Every in-memory connection is its own database, so
    /// an in-memory pool holds exactly one.
    pub fn max_size(&self) -> u32 {
        if self.is_memory() {
            1
        } else {
            self.max_size.unwrap_or(Self::DEFAULT_MAX_SIZE)
        }
    }

    /// Idle floor, never above the pool capacity.
    pub fn min_idle(&self) -> Option<u32> {
        self.min_idle.map(|min_idle| min_idle.min(self.max_size()))
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms.unwrap_or(Self::DEFAULT_TIMEOUT_MS))
    }
}

impl Config {
    /// Parses and validates a configuration document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Default location: `<config dir>/microdao/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("microdao").join("config.toml"))
    }

    fn validate(&self) -> Result<()> {
        if !self.pools.contains_key(&self.datasource) {
            return Err(DaoError::Config(format!(
                "datasource '{}' has no [pools.{}] definition",
                self.datasource, self.datasource
            )));
        }
        for (name, pool) in &self.pools {
            if pool.max_size == Some(0) {
                return Err(DaoError::Config(format!("pool '{}': max_size must be at least 1", name)));
            }
            if let (Some(min_idle), Some(max_size)) = (pool.min_idle, pool.max_size) {
                if min_idle > max_size {
                    return Err(DaoError::Config(format!(
                        "pool '{}': min_idle {} exceeds max_size {}",
                        name, min_idle, max_size
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Loads configuration from a TOML file at the given path.
///
/// # Arguments
///
/// * `path` - The file path to the TOML configuration file.
///
/// # Example
///
/// ```no_run
/// let config = microdao::config::load_config("config.toml").expect("Failed to load config");
/// println!("{:?}", config.datasource);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    Config::from_toml(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CONFIG: &str = r#"
datasource = "mydb"

[pools.mydb]
path = "data/app.db"
max_size = 4
connection_timeout_ms = 500
init_sql = "PRAGMA foreign_keys = ON;"

[pools.scratch]
path = ":memory:"
max_size = 8

[logging]
level = "debug"
"#;

    #[test]
    fn test_load_config_from_str() {
        let config = Config::from_toml(SAMPLE_CONFIG).expect("Failed to parse sample config");
        assert_eq!(config.datasource, "mydb");
        assert_eq!(config.pools.len(), 2);

        let pool = &config.pools["mydb"];
        assert_eq!(pool.path, "data/app.db");
        assert_eq!(pool.max_size(), 4);
        assert_eq!(pool.connection_timeout(), Duration::from_millis(500));
        assert_eq!(pool.init_sql.as_deref(), Some("PRAGMA foreign_keys = ON;"));

        // In-memory pools are capped at one connection
        assert_eq!(config.pools["scratch"].max_size(), 1);
        assert_eq!(config.logging.unwrap().level.unwrap(), "debug");
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_toml(
            r#"
datasource = "db"
[pools.db]
path = "x.db"
"#,
        )
        .unwrap();
        let pool = &config.pools["db"];
        assert_eq!(pool.max_size(), PoolConfig::DEFAULT_MAX_SIZE);
        assert_eq!(pool.connection_timeout(), Duration::from_secs(30));
        assert!(config.logging.is_none());
    }

    #[test]
    fn test_unknown_datasource_rejected() {
        let err = Config::from_toml(
            r#"
datasource = "missing"
[pools.db]
path = "x.db"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, DaoError::Config(_)));
    }

    #[test]
    fn test_invalid_sizes_rejected() {
        let err = Config::from_toml(
            r#"
datasource = "db"
[pools.db]
path = "x.db"
max_size = 2
min_idle = 3
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("min_idle"));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, SAMPLE_CONFIG).unwrap();
        assert_eq!(load_config(&path).unwrap().datasource, "mydb");

        let missing = load_config(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, DaoError::Io(_)));
    }
}
