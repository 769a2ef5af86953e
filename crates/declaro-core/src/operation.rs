//! Schema alteration operations.
//!
//! The differ emits these in execution order; a [`DdlDialect`] turns each
//! one into exactly one SQL statement.
//!
//! [`DdlDialect`]: crate::dialect::DdlDialect

use crate::ast::ColumnPosition;
use crate::schema::{Column, Database, ForeignKey, Index, Table};

/// All possible alteration operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Create the target database.
    CreateDatabase(Database),
    /// Select the target database for the following statements.
    UseDatabase(String),
    /// Change the database character set or collation.
    AlterDatabase(Database),
    /// Create a table (without its foreign keys).
    CreateTable(CreateTableOp),
    /// Drop a table.
    DropTable(DropTableOp),
    /// Change table options.
    AlterTableOptions(TableOptionsOp),
    /// Add a column.
    AddColumn(AddColumnOp),
    /// Redefine and/or move a column.
    ModifyColumn(ModifyColumnOp),
    /// Drop a column.
    DropColumn(DropColumnOp),
    /// Create an index or primary key.
    CreateIndex(CreateIndexOp),
    /// Drop an index or primary key.
    DropIndex(DropIndexOp),
    /// Add a foreign key constraint.
    AddForeignKey(AddForeignKeyOp),
    /// Drop a foreign key constraint.
    DropForeignKey(DropForeignKeyOp),
}

impl Operation {
    /// Creates a create table operation.
    #[must_use]
    pub fn create_table(table: Table) -> Self {
        Self::CreateTable(CreateTableOp { table })
    }

    /// Creates a drop table operation.
    #[must_use]
    pub fn drop_table(name: impl Into<String>) -> Self {
        Self::DropTable(DropTableOp { name: name.into() })
    }

    /// Creates an add column operation.
    #[must_use]
    pub fn add_column(
        table: impl Into<String>,
        column: Column,
        position: Option<ColumnPosition>,
    ) -> Self {
        Self::AddColumn(AddColumnOp {
            table: table.into(),
            column,
            position,
        })
    }

    /// Creates a modify column operation.
    #[must_use]
    pub fn modify_column(
        table: impl Into<String>,
        column: Column,
        position: Option<ColumnPosition>,
    ) -> Self {
        Self::ModifyColumn(ModifyColumnOp {
            table: table.into(),
            column,
            position,
        })
    }

    /// Creates a drop column operation.
    #[must_use]
    pub fn drop_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::DropColumn(DropColumnOp {
            table: table.into(),
            column: column.into(),
        })
    }

    /// Creates a create index operation.
    #[must_use]
    pub fn create_index(table: impl Into<String>, index: Index) -> Self {
        Self::CreateIndex(CreateIndexOp {
            table: table.into(),
            index,
        })
    }

    /// Creates a drop index operation.
    #[must_use]
    pub fn drop_index(table: impl Into<String>, index: &Index) -> Self {
        Self::DropIndex(DropIndexOp {
            table: table.into(),
            name: index.name.clone(),
            primary: index.kind == crate::schema::IndexKind::Primary,
        })
    }

    /// Creates an add foreign key operation.
    #[must_use]
    pub fn add_foreign_key(table: impl Into<String>, foreign_key: ForeignKey) -> Self {
        Self::AddForeignKey(AddForeignKeyOp {
            table: table.into(),
            foreign_key,
        })
    }

    /// Creates a drop foreign key operation.
    #[must_use]
    pub fn drop_foreign_key(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DropForeignKey(DropForeignKeyOp {
            table: table.into(),
            name: name.into(),
        })
    }

    /// Returns the table this operation touches, if any.
    #[must_use]
    pub fn table(&self) -> Option<&str> {
        match self {
            Self::CreateDatabase(_) | Self::UseDatabase(_) | Self::AlterDatabase(_) => None,
            Self::CreateTable(op) => Some(&op.table.name),
            Self::DropTable(op) => Some(&op.name),
            Self::AlterTableOptions(op) => Some(&op.table),
            Self::AddColumn(op) => Some(&op.table),
            Self::ModifyColumn(op) => Some(&op.table),
            Self::DropColumn(op) => Some(&op.table),
            Self::CreateIndex(op) => Some(&op.table),
            Self::DropIndex(op) => Some(&op.table),
            Self::AddForeignKey(op) => Some(&op.table),
            Self::DropForeignKey(op) => Some(&op.table),
        }
    }

    /// Returns true for operations that remove structure.
    #[must_use]
    pub const fn is_destructive(&self) -> bool {
        matches!(
            self,
            Self::DropTable(_) | Self::DropColumn(_) | Self::DropIndex(_) | Self::DropForeignKey(_)
        )
    }
}

/// Create table operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTableOp {
    /// The full table definition. Foreign keys, if present, are rendered inline.
    pub table: Table,
}

/// Drop table operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTableOp {
    /// Table name.
    pub name: String,
}

/// Table options operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptionsOp {
    /// Table name.
    pub table: String,
    /// Options to set, in rendering order. An empty `COMMENT` clears it.
    pub options: Vec<(String, String)>,
}

/// Add column operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddColumnOp {
    /// Table name.
    pub table: String,
    /// Column definition.
    pub column: Column,
    /// Placement; `None` appends.
    pub position: Option<ColumnPosition>,
}

/// Modify column operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyColumnOp {
    /// Table name.
    pub table: String,
    /// New column definition.
    pub column: Column,
    /// Placement; `None` keeps the current position.
    pub position: Option<ColumnPosition>,
}

/// Drop column operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropColumnOp {
    /// Table name.
    pub table: String,
    /// Column name.
    pub column: String,
}

/// Create index operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIndexOp {
    /// Table name.
    pub table: String,
    /// Index definition.
    pub index: Index,
}

/// Drop index operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropIndexOp {
    /// Table name.
    pub table: String,
    /// Index name.
    pub name: String,
    /// Whether this is the primary key.
    pub primary: bool,
}

/// Add foreign key operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddForeignKeyOp {
    /// Table name.
    pub table: String,
    /// Constraint definition.
    pub foreign_key: ForeignKey,
}

/// Drop foreign key operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropForeignKeyOp {
    /// Table name.
    pub table: String,
    /// Constraint name.
    pub name: String,
}
