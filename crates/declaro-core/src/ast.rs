//! Abstract syntax tree for the supported DDL statements.
//!
//! The parser produces these nodes; [`SchemaBuilder`](crate::schema::SchemaBuilder)
//! replays them, in order, onto a [`Schema`](crate::schema::Schema).
//! Column types and defaults inside the tree are already normalized.

use crate::schema::{Column, Database, DefaultValue, ForeignKeyAction, IndexColumn, IndexKind};

/// A parsed DDL statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `CREATE TABLE ... ( ... ) options`.
    CreateTable(CreateTableStatement),
    /// `CREATE TABLE name LIKE source`.
    CreateTableLike {
        /// New table name.
        name: String,
        /// Table to copy.
        source: String,
        /// `IF NOT EXISTS` was given.
        if_not_exists: bool,
    },
    /// `ALTER TABLE name spec, spec, ...`.
    AlterTable {
        /// Table being altered.
        name: String,
        /// Alter specifications in order.
        specs: Vec<AlterSpec>,
    },
    /// `DROP TABLE [IF EXISTS] a, b`.
    DropTable {
        /// Tables to drop.
        names: Vec<String>,
        /// `IF EXISTS` was given.
        if_exists: bool,
    },
    /// `RENAME TABLE a TO b, c TO d`.
    RenameTable(Vec<(String, String)>),
    /// `CREATE [UNIQUE|FULLTEXT|SPATIAL] INDEX name ON table (...)`.
    CreateIndex {
        /// Indexed table.
        table: String,
        /// Index definition.
        index: IndexDefinition,
    },
    /// `DROP INDEX name ON table`.
    DropIndex {
        /// Indexed table.
        table: String,
        /// Index name.
        name: String,
    },
    /// `CREATE DATABASE|SCHEMA ...`.
    CreateDatabase {
        /// Declared database.
        database: Database,
        /// `IF NOT EXISTS` was given.
        if_not_exists: bool,
    },
    /// `USE name`.
    Use(String),
}

/// `CREATE TABLE` with an explicit definition list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTableStatement {
    /// Table name.
    pub name: String,
    /// `IF NOT EXISTS` was given.
    pub if_not_exists: bool,
    /// Columns, indexes and foreign keys in declaration order.
    pub elements: Vec<TableElement>,
    /// Table options as canonical key/value pairs.
    pub options: Vec<(String, String)>,
}

/// One entry of a `CREATE TABLE` definition list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableElement {
    /// A column definition.
    Column(ColumnDefinition),
    /// A key definition.
    Index(IndexDefinition),
    /// A foreign key definition.
    ForeignKey(ForeignKeyDefinition),
}

/// A column plus the key attributes written inline on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    /// The normalized column.
    pub column: Column,
    /// `PRIMARY KEY` written on the column.
    pub primary_key: bool,
    /// `UNIQUE [KEY]` written on the column (or implied by `SERIAL`).
    pub unique: bool,
}

/// An index as written, before a name is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    /// Explicit index name (or the constraint symbol for `UNIQUE`).
    pub name: Option<String>,
    /// Index kind.
    pub kind: IndexKind,
    /// Key parts.
    pub columns: Vec<IndexColumn>,
    /// `COMMENT` index option.
    pub comment: Option<String>,
}

/// A foreign key as written, before a name is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyDefinition {
    /// `CONSTRAINT symbol`.
    pub constraint: Option<String>,
    /// Index name written after `FOREIGN KEY`.
    pub index_name: Option<String>,
    /// Local columns.
    pub columns: Vec<String>,
    /// Referenced table.
    pub referenced_table: String,
    /// Referenced columns.
    pub referenced_columns: Vec<String>,
    /// ON DELETE action.
    pub on_delete: ForeignKeyAction,
    /// ON UPDATE action.
    pub on_update: ForeignKeyAction,
}

/// Placement of an added or modified column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnPosition {
    /// `FIRST`.
    First,
    /// `AFTER column`.
    After(String),
}

/// One `ALTER TABLE` specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlterSpec {
    /// `ADD [COLUMN] definition [FIRST | AFTER col]`.
    AddColumn {
        /// Column to add.
        column: ColumnDefinition,
        /// Placement.
        position: Option<ColumnPosition>,
    },
    /// `ADD INDEX|KEY|UNIQUE|PRIMARY KEY|FULLTEXT|SPATIAL ...`.
    AddIndex(IndexDefinition),
    /// `ADD [CONSTRAINT symbol] FOREIGN KEY ...`.
    AddForeignKey(ForeignKeyDefinition),
    /// `DROP [COLUMN] name`.
    DropColumn(String),
    /// `DROP INDEX|KEY name`.
    DropIndex(String),
    /// `DROP PRIMARY KEY`.
    DropPrimaryKey,
    /// `DROP FOREIGN KEY name`.
    DropForeignKey(String),
    /// `DROP CONSTRAINT name` or `DROP CHECK name`.
    DropConstraint(String),
    /// `MODIFY [COLUMN] definition [FIRST | AFTER col]`.
    ModifyColumn {
        /// New definition.
        column: ColumnDefinition,
        /// Placement.
        position: Option<ColumnPosition>,
    },
    /// `CHANGE [COLUMN] old definition [FIRST | AFTER col]`.
    ChangeColumn {
        /// Current column name.
        old_name: String,
        /// New definition (may carry a new name).
        column: ColumnDefinition,
        /// Placement.
        position: Option<ColumnPosition>,
    },
    /// `ALTER [COLUMN] col SET DEFAULT ...`.
    SetDefault {
        /// Column name.
        column: String,
        /// New default.
        default: DefaultValue,
    },
    /// `ALTER [COLUMN] col DROP DEFAULT`.
    DropDefault(String),
    /// `RENAME [TO | AS] new_name`.
    RenameTable(String),
    /// `RENAME COLUMN old TO new`.
    RenameColumn {
        /// Current name.
        from: String,
        /// New name.
        to: String,
    },
    /// `RENAME INDEX|KEY old TO new`.
    RenameIndex {
        /// Current name.
        from: String,
        /// New name.
        to: String,
    },
    /// Table options such as `ENGINE=InnoDB`.
    Options(Vec<(String, String)>),
}
