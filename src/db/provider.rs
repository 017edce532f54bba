/// Connection Provider Module
///
/// Resolves named, externally configured pools and checks connections out
/// of them. The layer never opens or caches connections itself.

use crate::config::{Config, PoolConfig};
use crate::core::{DaoError, Result};
use crate::db::driver::DbConnection;
use crate::db::sqlite::SqliteConnection;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

/// Source of connection handles for the statement executor.
///
/// Implementations must be safe to share across threads; each `acquire`
/// hands out a connection owned by exactly one call.
pub trait ConnectionProvider: Send + Sync {
    type Connection: DbConnection;

    /// Identifier of the pool this provider draws from.
    fn data_source(&self) -> &str;

    /// Checks one connection out of the pool.
    ///
    /// # Errors
    ///
    /// Returns `DaoError::ConnectionAcquisition` when the pool cannot
    /// produce a connection. The call is not retried.
    fn acquire(&self) -> Result<Self::Connection>;
}

impl<P: ConnectionProvider> ConnectionProvider for Arc<P> {
    type Connection = P::Connection;

    fn data_source(&self) -> &str {
        (**self).data_source()
    }

    fn acquire(&self) -> Result<Self::Connection> {
        (**self).acquire()
    }
}

/// Provider backed by an r2d2 pool of SQLite connections.
#[derive(Clone)]
pub struct SqlitePoolProvider {
    data_source: String,
    pool: Pool<SqliteConnectionManager>,
}

impl SqlitePoolProvider {
    /// Wraps a pool the hosting program already built.
    pub fn new(data_source: impl Into<String>, pool: Pool<SqliteConnectionManager>) -> Self {
        SqlitePoolProvider {
            data_source: data_source.into(),
            pool,
        }
    }

    /// Builds the pool described by `config`.
    ///
    /// Connections are opened lazily, so an unreachable database is
    /// reported by [`acquire`](ConnectionProvider::acquire) rather than here.
    pub fn from_config(data_source: impl Into<String>, config: &PoolConfig) -> Self {
        let manager = if config.is_memory() {
            SqliteConnectionManager::memory()
        } else {
            SqliteConnectionManager::file(&config.path)
        };
        let manager = match config.init_sql.clone() {
            Some(sql) => manager.with_init(move |conn| conn.execute_batch(&sql)),
            None => manager,
        };

        let mut builder = Pool::builder()
            .max_size(config.max_size())
            .min_idle(config.min_idle())
            .connection_timeout(config.connection_timeout());
        if config.is_memory() {
            // Recycling the only connection would drop the database with it.
            builder = builder.max_lifetime(None).idle_timeout(None);
        }
        let pool = builder.build_unchecked(manager);

        Self::new(data_source, pool)
    }

    pub fn pool(&self) -> &Pool<SqliteConnectionManager> {
        &self.pool
    }
}

impl fmt::Debug for SqlitePoolProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.pool.state();
        f.debug_struct("SqlitePoolProvider")
            .field("data_source", &self.data_source)
            .field("connections", &state.connections)
            .field("idle_connections", &state.idle_connections)
            .finish()
    }
}

impl ConnectionProvider for SqlitePoolProvider {
    type Connection = SqliteConnection;

    fn data_source(&self) -> &str {
        &self.data_source
    }

    fn acquire(&self) -> Result<SqliteConnection> {
        match self.pool.get() {
            Ok(conn) => {
                debug!(data_source = %self.data_source, "acquired connection");
                Ok(conn)
            }
            Err(e) => {
                let err = DaoError::ConnectionAcquisition {
                    data_source: self.data_source.clone(),
                    source: e.into(),
                };
                error!(error = %err, "failed to acquire connection");
                Err(err)
            }
        }
    }
}

/// Named pools, resolved by identifier.
#[derive(Debug, Default, Clone)]
pub struct DataSourceRegistry {
    default: Option<String>,
    providers: BTreeMap<String, SqlitePoolProvider>,
}

impl DataSourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds one pool per `[pools.*]` entry; `datasource` becomes the
    /// default.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = DataSourceRegistry::new();
        for (name, pool) in &config.pools {
            registry.register(SqlitePoolProvider::from_config(name.as_str(), pool));
        }
        registry.default = Some(config.datasource.clone());
        registry
    }

    /// Adds or replaces a provider under its data-source name.
    pub fn register(&mut self, provider: SqlitePoolProvider) {
        self.providers
            .insert(provider.data_source().to_string(), provider);
    }

    pub fn set_default(&mut self, name: impl Into<String>) {
        self.default = Some(name.into());
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    /// Looks up a provider by data-source name.
    ///
    /// # Errors
    ///
    /// `DaoError::ConnectionAcquisition` when no pool has that name.
    pub fn provider(&self, name: &str) -> Result<SqlitePoolProvider> {
        self.providers.get(name).cloned().ok_or_else(|| {
            let err = DaoError::ConnectionAcquisition {
                data_source: name.to_string(),
                source: "no pool is registered under this name".into(),
            };
            error!(error = %err, "data source lookup failed");
            err
        })
    }

    pub fn default_provider(&self) -> Result<SqlitePoolProvider> {
        match &self.default {
            Some(name) => self.provider(name),
            None => Err(DaoError::Config("no default data source configured".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;

    fn pool_config(path: &str) -> PoolConfig {
        PoolConfig {
            path: path.to_string(),
            max_size: Some(2),
            min_idle: Some(0),
            connection_timeout_ms: Some(200),
            init_sql: None,
        }
    }

    #[test]
    fn test_acquire_from_file_pool() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.db");
        let provider = SqlitePoolProvider::from_config("mydb", &pool_config(path.to_str().unwrap()));

        assert_eq!(provider.data_source(), "mydb");
        let conn = provider.acquire().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER)").unwrap();
    }

    #[test]
    fn test_unreachable_database_fails_acquisition() {
        let provider = SqlitePoolProvider::from_config(
            "broken",
            &pool_config("/nonexistent/dir/that/does/not/exist.db"),
        );

        let err = provider.acquire().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConnectionAcquisition);
        assert!(err.to_string().contains("'broken'"));
    }

    #[test]
    fn test_exhausted_pool_fails_acquisition() {
        let provider = SqlitePoolProvider::from_config("mem", &pool_config(":memory:"));
        let _held = provider.acquire().unwrap();

        let err = provider.acquire().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConnectionAcquisition);
    }

    #[test]
    fn test_memory_pool_never_recycles_its_connection() {
        let provider = SqlitePoolProvider::from_config("mem", &pool_config(":memory:"));
        assert_eq!(provider.pool().max_lifetime(), None);
        assert_eq!(provider.pool().idle_timeout(), None);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.db");
        let provider = SqlitePoolProvider::from_config("file", &pool_config(path.to_str().unwrap()));
        assert!(provider.pool().max_lifetime().is_some());
        assert!(provider.pool().idle_timeout().is_some());
    }

    #[test]
    fn test_init_sql_runs_on_connect() {
        let mut config = pool_config(":memory:");
        config.init_sql = Some("PRAGMA foreign_keys = ON;".to_string());
        let provider = SqlitePoolProvider::from_config("mem", &config);

        let conn = provider.acquire().unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_registry_lookup() {
        let config = Config::from_toml(
            r#"
datasource = "main"
[pools.main]
path = ":memory:"
[pools.reports]
path = ":memory:"
"#,
        )
        .unwrap();
        let registry = DataSourceRegistry::from_config(&config);

        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["main", "reports"]);
        assert_eq!(registry.default_provider().unwrap().data_source(), "main");
        assert_eq!(registry.provider("reports").unwrap().data_source(), "reports");

        let err = registry.provider("missing").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConnectionAcquisition);
    }

    #[test]
    fn test_empty_registry_has_no_default() {
        let registry = DataSourceRegistry::new();
        assert_eq!(registry.default_provider().unwrap_err().kind(), ErrorKind::Config);
    }
}
