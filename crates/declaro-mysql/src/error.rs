//! Error types for reconciliation.

use declaro_core::ParseError;

/// Errors that can occur while reconciling a live database.
#[derive(Debug, thiserror::Error)]
pub enum DeclaroError {
    /// The desired schema text does not parse.
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// The database cannot be reached, authenticated against or read.
    #[error("Connection error: {0}")]
    Connection(#[from] sqlx::Error),

    /// A DDL statement failed. Statements before it stay applied.
    #[error("Statement failed: {statement}: {source}")]
    Execution {
        /// The statement that failed.
        statement: String,
        /// The server error.
        source: sqlx::Error,
    },

    /// Invalid connection configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The desired text declares a database other than the target.
    #[error("Schema declares database '{declared}' but the target is '{target}'")]
    DatabaseMismatch {
        /// Database named by `CREATE DATABASE` or `USE`.
        declared: String,
        /// Database named by the connection configuration.
        target: String,
    },

    /// IO error (reading schema or configuration files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DeclaroError {
    /// Returns true for malformed desired-schema text.
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    /// Returns true when the database could not be reached or read.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns true when a statement failed part way through a sequence.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution { .. })
    }
}

/// Result type for reconciliation.
pub type Result<T> = std::result::Result<T, DeclaroError>;
