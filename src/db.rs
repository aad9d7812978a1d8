use std::time::Duration;

use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, DbErr,
    Statement, TransactionTrait,
};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::error::{AppError, AppResult};

/// Upper bound on waiting for the server during provisioning. A refused
/// connection is retried until this runs out.
const PROVISION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct DbOptions {
    /// Connection URL including the target database.
    pub url: String,
    /// Server URL without a database selected. `None` for embedded backends,
    /// which skip provisioning.
    pub server_url: Option<String>,
    pub database_name: String,
    pub max_connections: u32,
    pub sql_logging: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LifecycleState {
    Uninitialized,
    Ready,
    Closed,
}

enum State {
    Uninitialized,
    Ready(DatabaseConnection),
    Closed,
}

impl State {
    fn lifecycle(&self) -> LifecycleState {
        match self {
            State::Uninitialized => LifecycleState::Uninitialized,
            State::Ready(_) => LifecycleState::Ready,
            State::Closed => LifecycleState::Closed,
        }
    }
}

/// Owns the one connection pool of the process.
///
/// Construct it once and share it behind an `Arc`. It moves through
/// `Uninitialized -> Ready -> Closed`, and back to `Ready` only through
/// [`ConnectionManager::initialize`]. Sessions can only be acquired while
/// `Ready`.
pub struct ConnectionManager {
    options: DbOptions,
    state: RwLock<State>,
}

impl ConnectionManager {
    pub fn new(options: DbOptions) -> Self {
        Self { options, state: RwLock::new(State::Uninitialized) }
    }

    pub async fn state(&self) -> LifecycleState {
        self.state.read().await.lifecycle()
    }

    /// Connects and applies pending migrations. Does nothing when already
    /// `Ready`.
    pub async fn initialize(&self) -> AppResult<()> {
        let mut state = self.state.write().await;
        if matches!(*state, State::Ready(_)) {
            debug!("connection manager already initialized");
            return Ok(());
        }

        let mut opts = ConnectOptions::new(self.options.url.clone());
        opts.max_connections(self.options.max_connections.max(1))
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(30))
            .sqlx_logging(self.options.sql_logging);

        let db = Database::connect(opts).await.map_err(AppError::Connection)?;

        if let Err(err) = Migrator::up(&db, None).await {
            error!(error = %err, "failed to apply migrations");
            if let Err(close_err) = db.close().await {
                warn!(error = %close_err, "failed to close pool after migration failure");
            }
            return Err(err.into());
        }

        info!(
            backend = ?db.get_database_backend(),
            max_connections = self.options.max_connections,
            "database ready"
        );
        *state = State::Ready(db);
        Ok(())
    }

    /// Issues `CREATE DATABASE IF NOT EXISTS` against the server, without a
    /// database selected.
    pub async fn ensure_database_exists(&self) -> AppResult<()> {
        let Some(server_url) = &self.options.server_url else {
            debug!(database = %self.options.database_name, "no server url, skipping provisioning");
            return Ok(());
        };

        let name = &self.options.database_name;
        let result = async {
            if !is_valid_database_name(name) {
                return Err(DbErr::Custom(format!("invalid database name `{name}`")));
            }

            let mut opts = ConnectOptions::new(server_url.clone());
            opts.max_connections(1)
                .acquire_timeout(PROVISION_TIMEOUT)
                .sqlx_logging(self.options.sql_logging);
            let conn = Database::connect(opts).await?;

            let created = conn
                .execute(Statement::from_string(
                    conn.get_database_backend(),
                    format!("CREATE DATABASE IF NOT EXISTS `{name}`"),
                ))
                .await;
            if let Err(close_err) = conn.close().await {
                warn!(
                    database = %name,
                    error = %close_err,
                    "failed to close provisioning connection"
                );
            }
            created.map(|_| ())
        }
        .await;

        match result {
            Ok(()) => {
                info!(database = %name, "database provisioned");
                Ok(())
            },
            Err(err) => {
                error!(database = %name, error = %err, "failed to provision database");
                Err(AppError::Provisioning { database: name.clone(), source: err })
            },
        }
    }

    pub async fn acquire_session(&self) -> AppResult<Session> {
        match &*self.state.read().await {
            State::Ready(db) => Ok(Session { conn: db.clone() }),
            State::Uninitialized | State::Closed => Err(AppError::NotInitialized),
        }
    }

    /// Closes every pooled connection. Sessions acquired earlier fail on
    /// their next round-trip.
    pub async fn shutdown(&self) -> AppResult<()> {
        let previous = std::mem::replace(&mut *self.state.write().await, State::Closed);
        if let State::Ready(db) = previous {
            db.close().await?;
            info!("database pool closed");
        }
        Ok(())
    }
}

/// A request-scoped handle onto the pool.
///
/// Reads run directly against it. Writes go through [`Session::begin`]; a
/// transaction dropped before `commit` is rolled back, which covers early
/// returns, errors and cancelled futures alike.
pub struct Session {
    conn: DatabaseConnection,
}

impl Session {
    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    pub async fn begin(&self) -> AppResult<DatabaseTransaction> {
        Ok(self.conn.begin().await?)
    }
}

fn is_valid_database_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
