//! Connection configuration.
//!
//! One explicit struct with named, typed fields: the CLI fills it from flags
//! and environment variables, library callers build it directly or load it
//! from a JSON file.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DeclaroError, Result};

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Dialect {
    /// MySQL and compatible servers.
    #[default]
    MySql,
}

impl Dialect {
    /// Returns the dialect name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
        }
    }

    /// Returns the port used when the host does not name one.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::MySql => 3306,
        }
    }
}

impl FromStr for Dialect {
    type Err = DeclaroError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("mysql") {
            Ok(Self::MySql)
        } else {
            Err(DeclaroError::Config(format!("unsupported dialect '{s}'")))
        }
    }
}

impl TryFrom<String> for Dialect {
    type Error = DeclaroError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Dialect> for String {
    fn from(dialect: Dialect) -> Self {
        dialect.name().to_string()
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters for connecting to the target database.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// SQL dialect.
    #[serde(default)]
    pub dialect: Dialect,
    /// `host` or `host:port`.
    pub host: String,
    /// User name.
    pub user: String,
    /// Password, if the account has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Target database.
    pub database: String,
}

impl ConnectionConfig {
    /// Creates a MySQL configuration without a password.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            dialect: Dialect::MySql,
            host: host.into(),
            user: user.into(),
            password: None,
            database: database.into(),
        }
    }

    /// Sets the password.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Loads and validates a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read, a serialization error
    /// if it is not a valid configuration, or a config error if validation
    /// fails.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every required field is present and the port is valid.
    ///
    /// # Errors
    ///
    /// Returns `DeclaroError::Config` naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(DeclaroError::Config(String::from("host is required")));
        }
        if self.user.trim().is_empty() {
            return Err(DeclaroError::Config(String::from("user is required")));
        }
        if self.database.trim().is_empty() {
            return Err(DeclaroError::Config(String::from("database is required")));
        }
        self.address().map(|_| ())
    }

    /// Splits `host` into host name and port, applying the dialect's
    /// default port. IPv6 addresses take a port only in brackets.
    ///
    /// # Errors
    ///
    /// Returns `DeclaroError::Config` when the port is not a number.
    pub fn address(&self) -> Result<(String, u16)> {
        let host = self.host.trim();
        if let Some(rest) = host.strip_prefix('[') {
            let Some((name, tail)) = rest.split_once(']') else {
                return Err(DeclaroError::Config(format!("malformed host '{host}'")));
            };
            return match tail.strip_prefix(':') {
                Some(port) => Ok((name.to_string(), parse_port(port)?)),
                None if tail.is_empty() => Ok((name.to_string(), self.dialect.default_port())),
                None => Err(DeclaroError::Config(format!("malformed host '{host}'"))),
            };
        }
        match host.split_once(':') {
            Some((name, port)) if !port.contains(':') => Ok((name.to_string(), parse_port(port)?)),
            _ => Ok((host.to_string(), self.dialect.default_port())),
        }
    }
}

fn parse_port(port: &str) -> Result<u16> {
    port.parse()
        .map_err(|_| DeclaroError::Config(format!("invalid port '{port}'")))
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("dialect", &self.dialect)
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .finish()
    }
}
