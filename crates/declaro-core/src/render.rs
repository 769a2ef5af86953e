//! Human-readable rendering of a schema as DDL.
//!
//! Used for both sides of a reconciliation: the introspected schema
//! (what the server has) and the parsed one (what the declaration
//! normalizes to). Re-parsing the output yields the same schema.

use crate::dialect::{DdlDialect, MySqlDialect};
use crate::operation::Operation;
use crate::parser::{parse_schema, ParseError};
use crate::schema::{Schema, Table, OPTION_CHARSET, OPTION_COLLATE};

/// Renders a schema as one statement per table, preceded by the
/// `CREATE DATABASE` statement when the schema has a database.
///
/// Foreign keys are rendered inline in their table.
#[must_use]
pub fn render_schema(schema: &Schema, dialect: &impl DdlDialect) -> Vec<String> {
    let mut statements = Vec::with_capacity(schema.tables.len() + 1);
    if let Some(database) = &schema.database {
        statements.push(dialect.generate_sql(&Operation::CreateDatabase(database.clone())));
    }
    for table in &schema.tables {
        statements.push(dialect.generate_sql(&Operation::create_table(without_inherited(table))));
    }
    statements
}

/// Parses `ddl` and renders the schema it declares.
///
/// # Errors
///
/// Returns the `ParseError` of the first statement that fails.
pub fn read_schemas(ddl: &str) -> Result<Vec<String>, ParseError> {
    Ok(render_schema(&parse_schema(ddl)?, &MySqlDialect::new()))
}

/// Drops column character sets and collations that repeat the table
/// defaults, as `SHOW CREATE TABLE` does.
fn without_inherited(table: &Table) -> Table {
    let charset = table.option(OPTION_CHARSET);
    let collation = table.option(OPTION_COLLATE);
    let mut table = table.clone();
    for column in &mut table.columns {
        if column.charset.is_some() && column.charset.as_deref() == charset {
            column.charset = None;
        }
        if column.collation.is_some() && column.collation.as_deref() == collation {
            column.collation = None;
        }
    }
    table
}
