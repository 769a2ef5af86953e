//! Schema model
//!
//! The canonical, dialect-normalized description of a database structure,
//! the normalization rules shared by the parser and the introspector, and
//! the builder that replays DDL statements onto a schema.

mod builder;
mod model;
pub mod normalize;

pub use builder::SchemaBuilder;
pub use model::{
    Column, DataType, Database, DefaultValue, ForeignKey, ForeignKeyAction, Index, IndexColumn,
    IndexKind, Schema, Table, OPTION_CHARSET, OPTION_COLLATE, OPTION_COMMENT, OPTION_ENGINE,
    OPTION_ORDER, OPTION_ROW_FORMAT, PRIMARY_KEY_NAME,
};
