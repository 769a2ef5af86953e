//! # declaro-core
//!
//! Declarative schema reconciliation for MySQL.
//!
//! This crate provides:
//! - A hand-written lexer and recursive descent parser for MySQL DDL
//! - A canonical schema model, with the normalization rules shared by the
//!   parser and the catalog introspector
//! - A schema differ producing globally ordered, foreign-key-safe
//!   operations
//! - Dialect-specific SQL generation for those operations
//!
//! Everything here is synchronous and free of I/O; talking to a server is
//! the job of `declaro-mysql`.
//!
//! ```rust
//! use declaro_core::{parse_schema, plan, Schema};
//!
//! let desired = parse_schema(
//!     "CREATE TABLE greeting (id INT PRIMARY KEY, body VARCHAR(100));",
//! )
//! .unwrap();
//!
//! // Against an empty database: one CREATE TABLE.
//! let alteration = plan(&desired, &Schema::new());
//! assert_eq!(alteration.len(), 1);
//!
//! // Against itself: nothing to do.
//! assert!(!plan(&desired, &desired).has_changes());
//! ```

pub mod alteration;
pub mod ast;
pub mod dialect;
pub mod diff;
pub mod lexer;
pub mod operation;
pub mod parser;
pub mod render;
pub mod schema;

pub use alteration::{plan, Alteration};
pub use dialect::{DdlDialect, MySqlDialect};
pub use diff::{diff_schemas, SchemaDiff};
pub use operation::Operation;
pub use parser::{parse_schema, parse_statements, ParseError};
pub use render::{read_schemas, render_schema};
pub use schema::{Column, Database, ForeignKey, Index, Schema, Table};
