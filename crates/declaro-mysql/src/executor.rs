//! Statement executor.
//!
//! Runs an alteration's statements strictly in order over one session.
//! MySQL commits every DDL statement on its own, so a failure leaves the
//! statements before it applied.

use tracing::{debug, info};

use crate::error::{DeclaroError, Result};
use crate::session::Session;

/// Executes statement sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementExecutor {
    dry_run: bool,
}

impl StatementExecutor {
    /// Creates an executor.
    #[must_use]
    pub const fn new() -> Self {
        Self { dry_run: false }
    }

    /// Enables dry-run mode (statements are reported but not executed).
    #[must_use]
    pub const fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Returns whether dry-run mode is on.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Executes `statements` in order and returns the ones that ran.
    ///
    /// # Errors
    ///
    /// Stops at the first failing statement and returns
    /// `DeclaroError::Execution` naming it.
    pub async fn execute(&self, session: &mut Session, statements: &[String]) -> Result<Vec<String>> {
        if statements.is_empty() {
            return Ok(Vec::new());
        }
        info!(
            count = statements.len(),
            dry_run = self.dry_run,
            "Applying alteration"
        );

        let mut executed = Vec::with_capacity(statements.len());
        for sql in statements {
            debug!(sql = %sql, "Executing SQL");
            if !self.dry_run {
                session
                    .execute(sql)
                    .await
                    .map_err(|source| DeclaroError::Execution {
                        statement: sql.clone(),
                        source,
                    })?;
            }
            executed.push(sql.clone());
        }

        info!(count = executed.len(), "Alteration applied");
        Ok(executed)
    }
}
