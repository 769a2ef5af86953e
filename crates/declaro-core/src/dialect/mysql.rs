//! MySQL dialect.

use super::DdlDialect;
use crate::operation::{
    CreateIndexOp, DropForeignKeyOp, DropIndexOp, ModifyColumnOp, TableOptionsOp,
};
use crate::schema::{normalize, DataType, Database, DefaultValue, IndexKind};

/// MySQL dialect for DDL generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DdlDialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn create_database(&self, db: &Database) -> String {
        let mut sql = format!("CREATE DATABASE {}", self.quote_identifier(&db.name));
        if let Some(ref charset) = db.charset {
            sql.push_str(" DEFAULT CHARACTER SET ");
            sql.push_str(charset);
        }
        if let Some(ref collation) = db.collation {
            sql.push_str(" COLLATE ");
            sql.push_str(collation);
        }
        sql
    }

    fn alter_database(&self, db: &Database) -> String {
        let mut sql = format!("ALTER DATABASE {}", self.quote_identifier(&db.name));
        if let Some(ref charset) = db.charset {
            sql.push_str(" CHARACTER SET ");
            sql.push_str(charset);
        }
        if let Some(ref collation) = db.collation {
            sql.push_str(" COLLATE ");
            sql.push_str(collation);
        }
        sql
    }

    fn table_options(&self, op: &TableOptionsOp) -> String {
        let options: Vec<String> = op
            .options
            .iter()
            .map(|(key, value)| self.table_option(key, value))
            .collect();
        format!(
            "ALTER TABLE {} {}",
            self.quote_identifier(&op.table),
            options.join(" ")
        )
    }

    fn modify_column(&self, op: &ModifyColumnOp) -> String {
        format!(
            "ALTER TABLE {} MODIFY COLUMN {}{}",
            self.quote_identifier(&op.table),
            self.column_definition(&op.column),
            self.position_clause(op.position.as_ref())
        )
    }

    fn create_index(&self, op: &CreateIndexOp) -> String {
        let index = &op.index;
        let mut sql = match index.kind {
            IndexKind::Primary => {
                return format!(
                    "ALTER TABLE {} ADD PRIMARY KEY {}",
                    self.quote_identifier(&op.table),
                    self.index_columns(&index.columns)
                );
            }
            IndexKind::Unique => String::from("CREATE UNIQUE INDEX "),
            IndexKind::Fulltext => String::from("CREATE FULLTEXT INDEX "),
            IndexKind::Spatial => String::from("CREATE SPATIAL INDEX "),
            IndexKind::Plain => String::from("CREATE INDEX "),
        };
        sql.push_str(&self.quote_identifier(&index.name));
        sql.push_str(" ON ");
        sql.push_str(&self.quote_identifier(&op.table));
        sql.push(' ');
        sql.push_str(&self.index_columns(&index.columns));
        if let Some(ref comment) = index.comment {
            sql.push_str(" COMMENT ");
            sql.push_str(&self.quote_string(comment));
        }
        sql
    }

    fn drop_index(&self, op: &DropIndexOp) -> String {
        if op.primary {
            format!(
                "ALTER TABLE {} DROP PRIMARY KEY",
                self.quote_identifier(&op.table)
            )
        } else {
            format!(
                "DROP INDEX {} ON {}",
                self.quote_identifier(&op.name),
                self.quote_identifier(&op.table)
            )
        }
    }

    fn drop_foreign_key(&self, op: &DropForeignKeyOp) -> String {
        format!(
            "ALTER TABLE {} DROP FOREIGN KEY {}",
            self.quote_identifier(&op.table),
            self.quote_identifier(&op.name)
        )
    }

    fn default_value(&self, default: &DefaultValue, data_type: &DataType) -> String {
        match default {
            DefaultValue::Literal(value) if data_type.name == "bit" && value.starts_with("b'") => {
                value.clone()
            }
            DefaultValue::Literal(value) => self.quote_string(value),
            DefaultValue::Expression(expr) if normalize::current_timestamp(expr).is_some() => {
                expr.clone()
            }
            DefaultValue::Expression(expr) => format!("({expr})"),
        }
    }
}
