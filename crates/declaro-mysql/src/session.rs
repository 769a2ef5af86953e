//! A single database connection scoped to one reconciliation call.

use declaro_core::{DdlDialect, MySqlDialect};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlDatabaseError};
use sqlx::{ConnectOptions, Connection};
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::error::Result;

/// An open connection to the target server.
///
/// The target database is selected on connect when it exists; when it does
/// not, the alteration that creates it also selects it. A database the
/// account may not use is an error, never mistaken for an absent one.
pub struct Session {
    conn: MySqlConnection,
    database: String,
}

impl Session {
    /// Connects to the server named by `config`.
    ///
    /// # Errors
    ///
    /// Returns `DeclaroError::Connection` when the server cannot be reached,
    /// rejects the credentials or denies access to the target database, and
    /// `DeclaroError::Config` for an invalid configuration.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let (host, port) = config.address()?;
        let mut options = MySqlConnectOptions::new()
            .host(&host)
            .port(port)
            .username(&config.user);
        if let Some(password) = &config.password {
            options = options.password(password);
        }

        debug!(host = %host, port, user = %config.user, "Connecting");
        let conn = options.connect().await?;
        let mut session = Self {
            conn,
            database: config.database.clone(),
        };
        if !session.select_database().await? {
            debug!(database = %session.database, "Target database not selected");
        }
        Ok(session)
    }

    /// Returns the target database name.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Makes the target database the default one. Returns false when the
    /// server reports that it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `DeclaroError::Connection` for any other refusal, such as
    /// missing privileges on the database.
    pub async fn select_database(&mut self) -> Result<bool> {
        let use_database = MySqlDialect::new().use_database(&self.database);
        match self.execute(&use_database).await {
            Ok(()) => Ok(true),
            Err(err) if is_unknown_database(&err) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Executes one statement over the text protocol, which accepts every
    /// DDL statement including `USE`.
    ///
    /// # Errors
    ///
    /// Returns the server error unchanged.
    pub async fn execute(&mut self, sql: &str) -> std::result::Result<(), sqlx::Error> {
        sqlx::raw_sql(sql).execute(&mut self.conn).await?;
        Ok(())
    }

    pub(crate) fn connection(&mut self) -> &mut MySqlConnection {
        &mut self.conn
    }

    /// Closes the connection.
    ///
    /// # Errors
    ///
    /// Returns `DeclaroError::Connection` if the server does not acknowledge
    /// the close.
    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }
}

/// Server error `ER_BAD_DB_ERROR`.
const UNKNOWN_DATABASE: u16 = 1049;

fn is_unknown_database(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|e| e.try_downcast_ref::<MySqlDatabaseError>())
        .is_some_and(|e| e.number() == UNKNOWN_DATABASE)
}
