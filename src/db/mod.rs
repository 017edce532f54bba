/// Database Module
///
/// The statement pipeline of microdao, split by concern:
/// - **Driver seam** (`driver.rs`): traits the pipeline is written against
/// - **SQLite binding** (`sqlite.rs`): the seam implemented for pooled rusqlite connections
/// - **Connection providers** (`provider.rs`): named pools and connection checkout
/// - **Binding** (`binder.rs`), **mapping** (`mapper.rs`), **release** (`closer.rs`)
/// - **Execution** (`executor.rs`): the four public operations
///
/// ## Usage
///
/// ```no_run
/// use microdao::config::load_config;
/// use microdao::db::{DataSourceRegistry, StatementExecutor};
///
/// let config = load_config("config.toml")?;
/// let registry = DataSourceRegistry::from_config(&config);
/// let dao = StatementExecutor::new(registry.default_provider()?);
///
/// dao.execute_with("INSERT INTO t(id) VALUES (?)", &[1i64.into()])?;
/// let rows = dao.fetch("SELECT id FROM t")?;
/// # Ok::<(), microdao::DaoError>(())
/// ```
pub mod binder;
pub mod closer;
pub mod driver;
pub mod executor;
pub mod mapper;
pub mod provider;
pub mod sentinel;
pub mod sqlite;
pub mod statement_type;

pub use binder::ParameterBinder;
pub use closer::ResourceCloser;
pub use driver::{DbConnection, DbCursor, DbStatement, Release};
pub use executor::StatementExecutor;
pub use mapper::RowMapper;
pub use provider::{ConnectionProvider, DataSourceRegistry, SqlitePoolProvider};
pub use sentinel::{SentinelExt, FAILED_UPDATE};
pub use statement_type::StatementType;
