//! Declarative schema reconciliation against a live MySQL server.
//!
//! `declaro-mysql` connects the pure engine of `declaro-core` to a database:
//! - **Session** - one connection per call, closed on every exit path
//! - **Introspector** - reads `information_schema` into the schema model
//! - **Executor** - runs an alteration statement by statement
//! - **Reconciler** - the `fetch_schemas`, `read_schemas` and
//!   `get_alterations` entry points, plus `apply`, `teardown` and `drift`
//!
//! # Example
//!
//! ```rust,no_run
//! use declaro_mysql::prelude::*;
//!
//! # async fn run() -> declaro_mysql::error::Result<()> {
//! let config = ConnectionConfig::new("localhost:3306", "root", "app").password("secret");
//! let reconciler = Reconciler::new(config)?;
//!
//! let reconciliation = reconciler
//!     .get_alterations("CREATE TABLE greeting (id INT PRIMARY KEY, body VARCHAR(100));")
//!     .await?;
//! for statement in &reconciliation.alteration {
//!     println!("{statement};");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Show the live schema
//! declaro --host localhost --user root --database app fetch
//!
//! # Show the statements that would reconcile it with schema.sql
//! declaro --config db.json plan schema.sql
//!
//! # Execute them
//! declaro --config db.json apply schema.sql
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod introspect;
pub mod reconciler;
pub mod session;

pub use declaro_core;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{ConnectionConfig, Dialect};
    pub use crate::error::{DeclaroError, Result};
    pub use crate::executor::StatementExecutor;
    pub use crate::introspect::introspect;
    pub use crate::reconciler::{ApplyReport, Reconciler, Reconciliation};
    pub use crate::session::Session;
    pub use declaro_core::{Alteration, Schema};
}
