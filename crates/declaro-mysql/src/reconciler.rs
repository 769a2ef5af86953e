//! Reconciliation entry points.
//!
//! Each call opens one session, builds both schema models fresh, and closes
//! the session on every exit path. Nothing is cached between calls.

use chrono::{DateTime, Utc};
use declaro_core::{parse_schema, plan, render_schema, Alteration, Database, MySqlDialect, Schema};
use serde::Serialize;
use tracing::info;

use crate::config::ConnectionConfig;
use crate::error::{DeclaroError, Result};
use crate::executor::StatementExecutor;
use crate::introspect::introspect;
use crate::session::Session;

/// The outcome of comparing a declaration with the live database.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// Statements that make the live database match the declaration.
    pub alteration: Alteration,
    /// Rendering of the live schema.
    pub actual: Vec<String>,
    /// Rendering of the declared schema.
    pub desired: Vec<String>,
}

impl Reconciliation {
    /// Returns true if the live database differs from the declaration.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.alteration.has_changes()
    }
}

/// What `apply` or `teardown` did.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    /// Statements executed, in order.
    pub statements: Vec<String>,
    /// Rendering of the live schema afterwards.
    pub remote: Vec<String>,
    /// True when nothing was executed.
    pub dry_run: bool,
    /// When the run finished.
    pub applied_at: DateTime<Utc>,
}

/// Reconciles one target database with declared DDL.
#[derive(Debug, Clone)]
pub struct Reconciler {
    config: ConnectionConfig,
    executor: StatementExecutor,
}

impl Reconciler {
    /// Creates a reconciler for the configured target.
    ///
    /// # Errors
    ///
    /// Returns `DeclaroError::Config` if the configuration is invalid.
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            executor: StatementExecutor::new(),
        })
    }

    /// Enables dry-run mode for `apply` and `teardown`.
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.executor = self.executor.dry_run(enabled);
        self
    }

    /// Returns the connection configuration.
    #[must_use]
    pub const fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Renders the live schema, one statement per table.
    ///
    /// # Errors
    ///
    /// Returns `DeclaroError::Connection` if the database cannot be read.
    pub async fn fetch_schemas(&self) -> Result<Vec<String>> {
        let mut session = Session::connect(&self.config).await?;
        let result = introspect(&mut session).await.map(|schema| render(&schema));
        finish(session, result).await
    }

    /// Renders what `ddl` normalizes to, without connecting.
    ///
    /// # Errors
    ///
    /// Returns `DeclaroError::Parse` for malformed text and
    /// `DeclaroError::DatabaseMismatch` if it declares another database.
    pub fn read_schemas(&self, ddl: &str) -> Result<Vec<String>> {
        Ok(render(&self.desired_schema(ddl)?))
    }

    /// Parses `ddl`, introspects the live database and diffs the two.
    ///
    /// # Errors
    ///
    /// Returns `DeclaroError::Parse` before connecting when `ddl` is
    /// malformed, and `DeclaroError::Connection` if the database cannot be
    /// read.
    pub async fn get_alterations(&self, ddl: &str) -> Result<Reconciliation> {
        let desired = self.desired_schema(ddl)?;
        let mut session = Session::connect(&self.config).await?;
        let result = self.reconcile(&mut session, desired).await;
        finish(session, result).await
    }

    /// Returns true when the live database no longer matches `ddl`.
    ///
    /// # Errors
    ///
    /// Same as [`Reconciler::get_alterations`].
    pub async fn drift(&self, ddl: &str) -> Result<bool> {
        Ok(self.get_alterations(ddl).await?.has_changes())
    }

    /// Brings the live database in line with `ddl` and reports the result.
    ///
    /// # Errors
    ///
    /// Returns `DeclaroError::Execution` when a statement fails; the
    /// statements before it stay applied.
    pub async fn apply(&self, ddl: &str) -> Result<ApplyReport> {
        let desired = self.desired_schema(ddl)?;
        let mut session = Session::connect(&self.config).await?;
        let result = self.apply_in(&mut session, desired).await;
        finish(session, result).await
    }

    /// Drops every table of the target database. The database itself is
    /// kept.
    ///
    /// # Errors
    ///
    /// Same as [`Reconciler::apply`].
    pub async fn teardown(&self) -> Result<ApplyReport> {
        let mut session = Session::connect(&self.config).await?;
        let result = self.apply_in(&mut session, Schema::new()).await;
        finish(session, result).await
    }

    async fn apply_in(&self, session: &mut Session, desired: Schema) -> Result<ApplyReport> {
        let reconciliation = self.reconcile(session, desired).await?;
        let statements = self
            .executor
            .execute(session, reconciliation.alteration.statements())
            .await?;
        let remote = if self.executor.is_dry_run() || statements.is_empty() {
            reconciliation.actual
        } else {
            render(&introspect(session).await?)
        };
        Ok(ApplyReport {
            statements,
            remote,
            dry_run: self.executor.is_dry_run(),
            applied_at: Utc::now(),
        })
    }

    async fn reconcile(&self, session: &mut Session, desired: Schema) -> Result<Reconciliation> {
        let actual = introspect(session).await?;
        let desired = self.with_target_database(desired, &actual);
        let alteration = plan(&desired, &actual);
        info!(
            database = %self.config.database,
            statements = alteration.len(),
            "Planned alteration"
        );
        Ok(Reconciliation {
            alteration,
            actual: render(&actual),
            desired: render(&desired),
        })
    }

    fn desired_schema(&self, ddl: &str) -> Result<Schema> {
        let desired = parse_schema(ddl)?;
        if let Some(database) = &desired.database {
            if database.name != self.config.database {
                return Err(DeclaroError::DatabaseMismatch {
                    declared: database.name.clone(),
                    target: self.config.database.clone(),
                });
            }
        }
        Ok(desired)
    }

    /// Declares the target database when it is missing and tables are
    /// wanted in it.
    fn with_target_database(&self, mut desired: Schema, actual: &Schema) -> Schema {
        if desired.database.is_none() && actual.database.is_none() && !desired.tables.is_empty() {
            desired.database = Some(Database::new(self.config.database.clone()));
        }
        desired
    }
}

fn render(schema: &Schema) -> Vec<String> {
    render_schema(schema, &MySqlDialect::new())
}

async fn finish<T>(session: Session, result: Result<T>) -> Result<T> {
    let closed = session.close().await;
    let value = result?;
    closed?;
    Ok(value)
}
