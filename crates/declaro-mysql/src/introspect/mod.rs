//! Live introspector
//!
//! Reads the target database's structure from `information_schema` and
//! builds the same schema model the parser produces. Introspection only
//! reads, so it can be repeated freely.

pub mod mapper;
mod queries;

use declaro_core::Schema;
use tracing::{debug, warn};

use crate::error::Result;
use crate::session::Session;

pub use mapper::{build_schema, Catalog};

/// Introspects the session's target database.
///
/// An absent database yields an empty schema without a database entry.
///
/// # Errors
///
/// Returns `DeclaroError::Connection` if a catalog query fails or the
/// account may not read the target database.
pub async fn introspect(session: &mut Session) -> Result<Schema> {
    let catalog = read_catalog(session).await?;
    let schema = build_schema(catalog);
    debug!(
        database = %session.database(),
        tables = schema.tables.len(),
        "Introspected schema"
    );
    Ok(schema)
}

async fn read_catalog(session: &mut Session) -> Result<Catalog> {
    let database = session.database().to_string();

    let schema_row: Option<queries::SchemaRow> = sqlx::query_as(queries::SCHEMA)
        .bind(&database)
        .fetch_optional(session.connection())
        .await?;
    if schema_row.is_none() {
        // Missing from the catalog: absent, or hidden by missing privileges.
        if session.select_database().await? {
            return Err(sqlx::Error::Protocol(format!(
                "database '{database}' exists but its catalog is not readable"
            ))
            .into());
        }
        warn!(database = %database, "Target database does not exist");
        return Ok(Catalog::default());
    }

    let tables: Vec<queries::TableRow> = sqlx::query_as(queries::TABLES)
        .bind(&database)
        .fetch_all(session.connection())
        .await?;
    let columns: Vec<queries::ColumnRow> = sqlx::query_as(queries::COLUMNS)
        .bind(&database)
        .fetch_all(session.connection())
        .await?;
    let indexes: Vec<queries::IndexRow> = sqlx::query_as(queries::INDEXES)
        .bind(&database)
        .fetch_all(session.connection())
        .await?;
    let foreign_keys: Vec<queries::ForeignKeyRow> = sqlx::query_as(queries::FOREIGN_KEYS)
        .bind(&database)
        .fetch_all(session.connection())
        .await?;

    debug!(
        tables = tables.len(),
        columns = columns.len(),
        index_parts = indexes.len(),
        foreign_key_parts = foreign_keys.len(),
        "Read catalog"
    );

    Ok(Catalog {
        database: schema_row,
        tables: tables.into_iter().map(Into::into).collect(),
        columns: columns.into_iter().map(Into::into).collect(),
        indexes: indexes.into_iter().map(Into::into).collect(),
        foreign_keys: foreign_keys.into_iter().map(Into::into).collect(),
    })
}
