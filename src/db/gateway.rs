use once_cell::sync::OnceCell;
use serde_json::Value;
use sqlx::postgres::PgConnection;
use sqlx::sqlite::SqliteConnection;
use sqlx::{Connection, Postgres, Sqlite};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::config::{self, ConfigStore};
use crate::db::settings::DbSettings;
use crate::db::value::{DbRow, SqlParam, bind, decode_pg_row, decode_sqlite_row};

/// Result of a database operation.
///
/// `Unavailable` and `Failed` are deliberately not errors: a missing or broken database
/// degrades coverage instead of failing the scenario.
#[derive(Debug, Clone, PartialEq)]
pub enum DbOutcome<T> {
    Available(T),
    /// No connection could be established
    Unavailable,
    /// The statement was sent but the database rejected it
    Failed(String),
}

impl<T> DbOutcome<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, DbOutcome::Available(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            DbOutcome::Available(v) => Some(v),
            _ => None,
        }
    }

    pub fn unwrap_or(self, default: T) -> T {
        self.into_option().unwrap_or(default)
    }
}

impl<T: Default> DbOutcome<T> {
    pub fn unwrap_or_default(self) -> T {
        self.into_option().unwrap_or_default()
    }
}

/// Observable lifecycle of the shared connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayState {
    Uninitialized,
    Connected,
    Unavailable,
    Closed,
}

/// An open connection. Rows are decoded with each driver's own types.
enum Backend {
    Postgres(PgConnection),
    Sqlite(SqliteConnection),
}

impl Backend {
    async fn open(url: &str) -> Option<sqlx::Result<Self>> {
        if url.starts_with("postgres:") || url.starts_with("postgresql:") {
            Some(PgConnection::connect(url).await.map(Backend::Postgres))
        } else if url.starts_with("sqlite:") {
            Some(SqliteConnection::connect(url).await.map(Backend::Sqlite))
        } else {
            None
        }
    }

    async fn ping(&mut self) -> sqlx::Result<()> {
        match self {
            Backend::Postgres(conn) => conn.ping().await,
            Backend::Sqlite(conn) => conn.ping().await,
        }
    }

    async fn close(self) -> sqlx::Result<()> {
        match self {
            Backend::Postgres(conn) => conn.close().await,
            Backend::Sqlite(conn) => conn.close().await,
        }
    }

    async fn fetch_all(&mut self, sql: &str, params: &[SqlParam]) -> sqlx::Result<Vec<DbRow>> {
        match self {
            Backend::Postgres(conn) => {
                let query = params
                    .iter()
                    .fold(sqlx::query::<Postgres>(sql), |q, p| bind(q, p));
                let rows = query.fetch_all(&mut *conn).await?;
                Ok(rows.iter().map(decode_pg_row).collect())
            }
            Backend::Sqlite(conn) => {
                let query = params
                    .iter()
                    .fold(sqlx::query::<Sqlite>(sql), |q, p| bind(q, p));
                let rows = query.fetch_all(&mut *conn).await?;
                Ok(rows.iter().map(decode_sqlite_row).collect())
            }
        }
    }

    async fn execute(&mut self, sql: &str, params: &[SqlParam]) -> sqlx::Result<u64> {
        match self {
            Backend::Postgres(conn) => {
                let query = params
                    .iter()
                    .fold(sqlx::query::<Postgres>(sql), |q, p| bind(q, p));
                Ok(query.execute(&mut *conn).await?.rows_affected())
            }
            Backend::Sqlite(conn) => {
                let query = params
                    .iter()
                    .fold(sqlx::query::<Sqlite>(sql), |q, p| bind(q, p));
                Ok(query.execute(&mut *conn).await?.rows_affected())
            }
        }
    }
}

enum Slot {
    Uninitialized,
    Connected(Backend),
    Unavailable,
    Closed,
}

impl Slot {
    fn state(&self) -> GatewayState {
        match self {
            Slot::Uninitialized => GatewayState::Uninitialized,
            Slot::Connected(_) => GatewayState::Connected,
            Slot::Unavailable => GatewayState::Unavailable,
            Slot::Closed => GatewayState::Closed,
        }
    }
}

/// Single shared connection to the backing relational store.
///
/// The connection is opened lazily and reused. Every operation holds the lock for its
/// whole duration, so concurrent scenarios neither open duplicate connections nor
/// interleave statements on the one connection. Running scenarios against the database
/// truly in parallel would need a pool instead.
pub struct DatabaseGateway {
    settings: DbSettings,
    connection: Mutex<Slot>,
}

impl DatabaseGateway {
    pub fn new(settings: DbSettings) -> Self {
        Self {
            settings,
            connection: Mutex::new(Slot::Uninitialized),
        }
    }

    pub fn from_config(config: &ConfigStore) -> Self {
        Self::new(DbSettings::from_config(config))
    }

    /// Process-wide gateway built from [`config::global`].
    pub fn global() -> crate::Result<&'static DatabaseGateway> {
        static GLOBAL: OnceCell<DatabaseGateway> = OnceCell::new();
        GLOBAL.get_or_try_init(|| -> crate::Result<DatabaseGateway> {
            Ok(DatabaseGateway::from_config(config::global()?))
        })
    }

    pub fn settings(&self) -> &DbSettings {
        &self.settings
    }

    pub async fn state(&self) -> GatewayState {
        self.connection.lock().await.state()
    }

    async fn connect(&self) -> Option<Backend> {
        let Some(url) = self.settings.connection_url() else {
            warn!(
                "No database URL configured ({}). DB steps will be skipped.",
                DbSettings::URL_KEY
            );
            return None;
        };

        info!("Connecting to database: {}", self.settings.redacted_url());

        match Backend::open(&url).await {
            None => {
                warn!(
                    "Unsupported database URL {}. DB steps will be skipped.",
                    self.settings.redacted_url()
                );
                None
            }
            Some(Ok(conn)) => {
                info!("Database connection established");
                Some(conn)
            }
            Some(Err(e)) => {
                warn!("Could not connect to database: {}. DB steps will be skipped.", e);
                None
            }
        }
    }

    /// Live connection inside the locked slot, opening one if needed.
    async fn live<'a>(&self, slot: &'a mut Slot) -> Option<&'a mut Backend> {
        let alive = match slot {
            Slot::Connected(conn) => conn.ping().await.is_ok(),
            _ => false,
        };

        if !alive {
            if matches!(slot, Slot::Connected(_)) {
                warn!("Database connection lost, reconnecting");
            }
            *slot = match self.connect().await {
                Some(conn) => Slot::Connected(conn),
                None => Slot::Unavailable,
            };
        }

        match slot {
            Slot::Connected(conn) => Some(conn),
            _ => None,
        }
    }

    /// Whether a live connection can be obtained right now.
    pub async fn is_available(&self) -> bool {
        let mut slot = self.connection.lock().await;
        self.live(&mut slot).await.is_some()
    }

    /// Run a parameterized read.
    pub async fn query(&self, sql: &str, params: &[SqlParam]) -> DbOutcome<Vec<DbRow>> {
        info!("Executing query: {}", sql);

        let mut slot = self.connection.lock().await;
        let Some(conn) = self.live(&mut slot).await else {
            warn!("No DB connection. Returning empty results.");
            return DbOutcome::Unavailable;
        };

        match conn.fetch_all(sql, params).await {
            Ok(rows) => {
                info!("Query returned {} rows", rows.len());
                DbOutcome::Available(rows)
            }
            Err(e) => {
                error!("Query execution failed: {}", e);
                DbOutcome::Failed(e.to_string())
            }
        }
    }

    /// Run a parameterized write and report the affected row count.
    pub async fn update(&self, sql: &str, params: &[SqlParam]) -> DbOutcome<u64> {
        info!("Executing update: {}", sql);

        let mut slot = self.connection.lock().await;
        let Some(conn) = self.live(&mut slot).await else {
            warn!("No DB connection. Skipping update.");
            return DbOutcome::Unavailable;
        };

        match conn.execute(sql, params).await {
            Ok(affected) => {
                info!("Rows affected: {}", affected);
                DbOutcome::Available(affected)
            }
            Err(e) => {
                error!("Update execution failed: {}", e);
                DbOutcome::Failed(e.to_string())
            }
        }
    }

    /// Rows of a read; empty when the database is unavailable or the statement failed.
    pub async fn execute_query(&self, sql: &str, params: &[SqlParam]) -> Vec<DbRow> {
        self.query(sql, params).await.unwrap_or_default()
    }

    /// Affected rows of a write; 0 when the database is unavailable or the statement failed.
    pub async fn execute_update(&self, sql: &str, params: &[SqlParam]) -> u64 {
        self.update(sql, params).await.unwrap_or(0)
    }

    /// First column of the first row.
    pub async fn get_single_value(&self, sql: &str, params: &[SqlParam]) -> Option<Value> {
        self.execute_query(sql, params)
            .await
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next().map(|(_, value)| value))
    }

    /// Close the shared connection. Safe to call repeatedly or before anything was opened.
    pub async fn close_connection(&self) {
        let mut slot = self.connection.lock().await;
        match std::mem::replace(&mut *slot, Slot::Closed) {
            Slot::Connected(conn) => match conn.close().await {
                Ok(()) => info!("Database connection closed"),
                Err(e) => error!("Error closing DB connection: {}", e),
            },
            previous => *slot = previous,
        }
    }
}
