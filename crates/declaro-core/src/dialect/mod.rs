//! Dialect-specific SQL generation.
//!
//! A dialect turns each [`Operation`] into one executable DDL statement,
//! and renders whole tables in the server's own `SHOW CREATE TABLE`
//! layout.

mod mysql;

pub use mysql::MySqlDialect;

use crate::ast::ColumnPosition;
use crate::operation::{
    AddColumnOp, AddForeignKeyOp, CreateIndexOp, CreateTableOp, DropColumnOp, DropForeignKeyOp,
    DropIndexOp, DropTableOp, ModifyColumnOp, Operation, TableOptionsOp,
};
use crate::schema::{
    Column, DataType, Database, DefaultValue, ForeignKey, ForeignKeyAction, Index, IndexColumn,
    IndexKind, OPTION_COMMENT, OPTION_ORDER,
};

/// Trait for dialect-specific DDL generation.
pub trait DdlDialect {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Quotes an identifier.
    fn quote_identifier(&self, name: &str) -> String;

    /// Quotes a string literal.
    fn quote_string(&self, value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
    }

    /// Generates SQL for an operation.
    fn generate_sql(&self, operation: &Operation) -> String {
        match operation {
            Operation::CreateDatabase(db) => self.create_database(db),
            Operation::UseDatabase(name) => self.use_database(name),
            Operation::AlterDatabase(db) => self.alter_database(db),
            Operation::CreateTable(op) => self.create_table(op),
            Operation::DropTable(op) => self.drop_table(op),
            Operation::AlterTableOptions(op) => self.table_options(op),
            Operation::AddColumn(op) => self.add_column(op),
            Operation::ModifyColumn(op) => self.modify_column(op),
            Operation::DropColumn(op) => self.drop_column(op),
            Operation::CreateIndex(op) => self.create_index(op),
            Operation::DropIndex(op) => self.drop_index(op),
            Operation::AddForeignKey(op) => self.add_foreign_key(op),
            Operation::DropForeignKey(op) => self.drop_foreign_key(op),
        }
    }

    /// Generates SQL for CREATE DATABASE.
    fn create_database(&self, db: &Database) -> String;

    /// Generates SQL selecting the current database.
    fn use_database(&self, name: &str) -> String {
        format!("USE {}", self.quote_identifier(name))
    }

    /// Generates SQL for ALTER DATABASE.
    fn alter_database(&self, db: &Database) -> String;

    /// Generates SQL for CREATE TABLE.
    ///
    /// Columns, then the primary key, then the other indexes, then foreign
    /// keys, then the table options.
    fn create_table(&self, op: &CreateTableOp) -> String {
        let table = &op.table;
        let mut lines: Vec<String> = table
            .columns
            .iter()
            .map(|c| format!("  {}", self.column_definition(c)))
            .collect();

        let primary = table.indexes.iter().filter(|i| i.kind == IndexKind::Primary);
        let secondary = table.indexes.iter().filter(|i| i.kind != IndexKind::Primary);
        lines.extend(
            primary
                .chain(secondary)
                .map(|i| format!("  {}", self.index_definition(i))),
        );
        lines.extend(
            table
                .foreign_keys
                .iter()
                .map(|fk| format!("  {}", self.foreign_key_definition(fk))),
        );

        let mut sql = format!(
            "CREATE TABLE {} (\n{}\n)",
            self.quote_identifier(&table.name),
            lines.join(",\n")
        );
        for key in OPTION_ORDER {
            if let Some(value) = table.option(key) {
                sql.push(' ');
                sql.push_str(&self.table_option(key, value));
            }
        }
        sql
    }

    /// Generates SQL for DROP TABLE.
    fn drop_table(&self, op: &DropTableOp) -> String {
        format!("DROP TABLE {}", self.quote_identifier(&op.name))
    }

    /// Generates SQL changing table options.
    fn table_options(&self, op: &TableOptionsOp) -> String;

    /// Renders one table option assignment, e.g. `ENGINE=InnoDB`.
    fn table_option(&self, key: &str, value: &str) -> String {
        if key == OPTION_COMMENT {
            format!("{key}={}", self.quote_string(value))
        } else {
            format!("{key}={value}")
        }
    }

    /// Generates SQL for ADD COLUMN.
    fn add_column(&self, op: &AddColumnOp) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {}{}",
            self.quote_identifier(&op.table),
            self.column_definition(&op.column),
            self.position_clause(op.position.as_ref())
        )
    }

    /// Generates SQL redefining a column in place.
    fn modify_column(&self, op: &ModifyColumnOp) -> String;

    /// Generates SQL for DROP COLUMN.
    fn drop_column(&self, op: &DropColumnOp) -> String {
        format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.quote_identifier(&op.table),
            self.quote_identifier(&op.column)
        )
    }

    /// Generates SQL for CREATE INDEX.
    fn create_index(&self, op: &CreateIndexOp) -> String;

    /// Generates SQL for DROP INDEX.
    fn drop_index(&self, op: &DropIndexOp) -> String;

    /// Generates SQL for ADD FOREIGN KEY.
    fn add_foreign_key(&self, op: &AddForeignKeyOp) -> String {
        format!(
            "ALTER TABLE {} ADD {}",
            self.quote_identifier(&op.table),
            self.foreign_key_definition(&op.foreign_key)
        )
    }

    /// Generates SQL for DROP FOREIGN KEY.
    fn drop_foreign_key(&self, op: &DropForeignKeyOp) -> String;

    /// Renders a column default value.
    fn default_value(&self, default: &DefaultValue, data_type: &DataType) -> String;

    /// Generates SQL for a column definition.
    fn column_definition(&self, col: &Column) -> String {
        let mut sql = format!("{} {}", self.quote_identifier(&col.name), col.data_type);

        if let Some(ref charset) = col.charset {
            sql.push_str(" CHARACTER SET ");
            sql.push_str(charset);
        }
        if let Some(ref collation) = col.collation {
            sql.push_str(" COLLATE ");
            sql.push_str(collation);
        }

        if !col.nullable {
            sql.push_str(" NOT NULL");
        }
        match col.default {
            Some(ref default) => {
                sql.push_str(" DEFAULT ");
                sql.push_str(&self.default_value(default, &col.data_type));
            }
            None if col.nullable && !is_large_object(&col.data_type) => {
                sql.push_str(" DEFAULT NULL");
            }
            None => {}
        }

        if let Some(ref on_update) = col.on_update {
            sql.push_str(" ON UPDATE ");
            sql.push_str(on_update);
        }
        if col.auto_increment {
            sql.push_str(" AUTO_INCREMENT");
        }
        if let Some(ref comment) = col.comment {
            sql.push_str(" COMMENT ");
            sql.push_str(&self.quote_string(comment));
        }

        sql
    }

    /// Renders an index column list, e.g. `(`a`,`b`(10))`.
    fn index_columns(&self, columns: &[IndexColumn]) -> String {
        let cols: Vec<String> = columns
            .iter()
            .map(|c| match c.prefix {
                Some(len) => format!("{}({len})", self.quote_identifier(&c.name)),
                None => self.quote_identifier(&c.name),
            })
            .collect();
        format!("({})", cols.join(","))
    }

    /// Generates the in-table definition of an index.
    fn index_definition(&self, index: &Index) -> String {
        let mut sql = match index.kind {
            IndexKind::Primary => format!("PRIMARY KEY {}", self.index_columns(&index.columns)),
            kind => {
                let prefix = match kind {
                    IndexKind::Unique => "UNIQUE KEY",
                    IndexKind::Fulltext => "FULLTEXT KEY",
                    IndexKind::Spatial => "SPATIAL KEY",
                    _ => "KEY",
                };
                format!(
                    "{prefix} {} {}",
                    self.quote_identifier(&index.name),
                    self.index_columns(&index.columns)
                )
            }
        };
        if let Some(ref comment) = index.comment {
            sql.push_str(" COMMENT ");
            sql.push_str(&self.quote_string(comment));
        }
        sql
    }

    /// Generates the definition of a foreign key constraint.
    ///
    /// `NO ACTION` and `RESTRICT` are the server default and are omitted.
    fn foreign_key_definition(&self, fk: &ForeignKey) -> String {
        let quote_all = |names: &[String]| {
            names
                .iter()
                .map(|c| self.quote_identifier(c))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let mut sql = format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.quote_identifier(&fk.name),
            quote_all(&fk.columns),
            self.quote_identifier(&fk.referenced_table),
            quote_all(&fk.referenced_columns)
        );
        if fk.on_delete.effective() != ForeignKeyAction::NoAction {
            sql.push_str(" ON DELETE ");
            sql.push_str(fk.on_delete.as_sql());
        }
        if fk.on_update.effective() != ForeignKeyAction::NoAction {
            sql.push_str(" ON UPDATE ");
            sql.push_str(fk.on_update.as_sql());
        }
        sql
    }

    /// Renders a column placement clause with its leading space.
    fn position_clause(&self, position: Option<&ColumnPosition>) -> String {
        match position {
            Some(ColumnPosition::First) => String::from(" FIRST"),
            Some(ColumnPosition::After(name)) => {
                format!(" AFTER {}", self.quote_identifier(name))
            }
            None => String::new(),
        }
    }
}

/// Types whose definitions the server prints without `DEFAULT NULL`.
fn is_large_object(ty: &DataType) -> bool {
    matches!(
        ty.name.as_str(),
        "tinytext"
            | "text"
            | "mediumtext"
            | "longtext"
            | "tinyblob"
            | "blob"
            | "mediumblob"
            | "longblob"
            | "json"
            | "geometry"
            | "point"
            | "linestring"
            | "polygon"
            | "multipoint"
            | "multilinestring"
            | "multipolygon"
            | "geometrycollection"
    )
}
