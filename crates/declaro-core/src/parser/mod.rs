//! DDL Parser
//!
//! A hand-written recursive descent parser for the MySQL DDL subset that
//! declares structure: databases, tables, columns, keys and foreign keys.

mod error;
#[allow(clippy::module_inception)]
mod parser;
mod script;

pub use error::ParseError;
pub use parser::Parser;
pub use script::{parse_schema, parse_statements};
