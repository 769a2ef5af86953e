//! Replays parsed DDL statements onto a [`Schema`].
//!
//! The builder applies MySQL's own implicit rules so that a declared
//! schema looks the way the server would report it: unnamed indexes are
//! named after their first column, unnamed foreign keys become
//! `<table>_ibfk_<n>`, foreign keys get a supporting index when none
//! covers their columns, and primary key columns are `NOT NULL`.

use super::model::{
    Column, ForeignKey, Index, IndexColumn, IndexKind, Schema, Table, OPTION_COMMENT,
    PRIMARY_KEY_NAME,
};
use super::normalize;
use crate::ast::{
    AlterSpec, ColumnDefinition, ColumnPosition, CreateTableStatement, ForeignKeyDefinition,
    IndexDefinition, Statement, TableElement,
};
use crate::schema::{Database, DefaultValue};

/// Accumulates statements into a schema.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    /// Creates a builder over an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the schema built so far.
    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Consumes the builder and returns the schema.
    #[must_use]
    pub fn finish(self) -> Schema {
        self.schema
    }

    /// Applies one statement.
    ///
    /// # Errors
    ///
    /// Returns a message when the statement cannot apply to the current
    /// state, e.g. altering a table that does not exist.
    pub fn apply(&mut self, statement: Statement) -> Result<(), String> {
        match statement {
            Statement::CreateTable(create) => self.create_table(create),
            Statement::CreateTableLike {
                name,
                source,
                if_not_exists,
            } => self.create_table_like(name, &source, if_not_exists),
            Statement::AlterTable { name, specs } => {
                let mut current = name;
                for spec in specs {
                    self.alter_table(&mut current, spec)?;
                }
                Ok(())
            }
            Statement::DropTable { names, if_exists } => {
                for name in names {
                    if self.schema.remove_table(&name).is_none() && !if_exists {
                        return Err(format!("Unknown table '{name}'"));
                    }
                }
                Ok(())
            }
            Statement::RenameTable(pairs) => {
                for (from, to) in pairs {
                    self.rename_table(&from, &to)?;
                }
                Ok(())
            }
            Statement::CreateIndex { table, index } => add_index(self.table_mut(&table)?, index),
            Statement::DropIndex { table, name } => drop_index(self.table_mut(&table)?, &name),
            Statement::CreateDatabase {
                database,
                if_not_exists,
            } => self.declare_database(database, if_not_exists),
            Statement::Use(name) => match &self.schema.database {
                Some(db) if db.name == name => Ok(()),
                Some(db) => Err(only_one_database(&db.name, &name)),
                None => {
                    self.schema.database = Some(Database::new(name));
                    Ok(())
                }
            },
        }
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table, String> {
        self.schema
            .table_mut(name)
            .ok_or_else(|| format!("Table '{name}' doesn't exist"))
    }

    fn declare_database(&mut self, database: Database, if_not_exists: bool) -> Result<(), String> {
        match &self.schema.database {
            Some(db) if db.name != database.name => Err(only_one_database(&db.name, &database.name)),
            // A bare `USE` may be refined by a later CREATE DATABASE.
            Some(db) if db.charset.is_some() || db.collation.is_some() => {
                if if_not_exists {
                    Ok(())
                } else {
                    Err(format!("Can't create database '{}'; database exists", database.name))
                }
            }
            _ => {
                self.schema.database = Some(database);
                Ok(())
            }
        }
    }

    fn create_table(&mut self, create: CreateTableStatement) -> Result<(), String> {
        if self.schema.table(&create.name).is_some() {
            if create.if_not_exists {
                return Ok(());
            }
            return Err(format!("Table '{}' already exists", create.name));
        }

        let mut table = Table::new(create.name);
        let mut indexes = Vec::new();
        let mut foreign_keys = Vec::new();
        for element in create.elements {
            match element {
                TableElement::Column(definition) => add_column(&mut table, definition, None)?,
                TableElement::Index(index) => indexes.push(index),
                TableElement::ForeignKey(fk) => foreign_keys.push(fk),
            }
        }
        if table.columns.is_empty() {
            return Err(String::from("A table must have at least 1 column"));
        }
        for index in indexes {
            add_index(&mut table, index)?;
        }
        // Supporting indexes are only created for keys no declared index covers.
        for fk in foreign_keys {
            add_foreign_key(&mut table, fk)?;
        }
        set_options(&mut table, create.options);

        self.schema.tables.push(table);
        Ok(())
    }

    fn create_table_like(
        &mut self,
        name: String,
        source: &str,
        if_not_exists: bool,
    ) -> Result<(), String> {
        if self.schema.table(&name).is_some() {
            if if_not_exists {
                return Ok(());
            }
            return Err(format!("Table '{name}' already exists"));
        }
        let mut table = self
            .schema
            .table(source)
            .cloned()
            .ok_or_else(|| format!("Table '{source}' doesn't exist"))?;
        table.name = name;
        table.foreign_keys.clear();
        self.schema.tables.push(table);
        Ok(())
    }

    fn rename_table(&mut self, from: &str, to: &str) -> Result<(), String> {
        if self.schema.table(to).is_some() {
            return Err(format!("Table '{to}' already exists"));
        }
        self.table_mut(from)?.name = to.to_string();
        for table in &mut self.schema.tables {
            for fk in &mut table.foreign_keys {
                if fk.referenced_table == from {
                    fk.referenced_table = to.to_string();
                }
            }
        }
        Ok(())
    }

    fn rename_referenced_column(&mut self, table: &str, from: &str, to: &str) {
        for other in &mut self.schema.tables {
            for fk in &mut other.foreign_keys {
                if fk.referenced_table != table {
                    continue;
                }
                for column in &mut fk.referenced_columns {
                    if column.eq_ignore_ascii_case(from) {
                        *column = to.to_string();
                    }
                }
            }
        }
    }

    fn alter_table(&mut self, current: &mut String, spec: AlterSpec) -> Result<(), String> {
        match spec {
            AlterSpec::AddColumn { column, position } => {
                add_column(self.table_mut(current)?, column, position.as_ref())
            }
            AlterSpec::AddIndex(index) => add_index(self.table_mut(current)?, index),
            AlterSpec::AddForeignKey(fk) => add_foreign_key(self.table_mut(current)?, fk),
            AlterSpec::DropColumn(name) => drop_column(self.table_mut(current)?, &name),
            AlterSpec::DropIndex(name) => drop_index(self.table_mut(current)?, &name),
            AlterSpec::DropPrimaryKey => drop_index(self.table_mut(current)?, PRIMARY_KEY_NAME),
            AlterSpec::DropForeignKey(name) => {
                let table = self.table_mut(current)?;
                let pos = table
                    .foreign_keys
                    .iter()
                    .position(|fk| fk.name.eq_ignore_ascii_case(&name))
                    .ok_or_else(|| format!("Can't DROP '{name}'; check that it exists"))?;
                table.foreign_keys.remove(pos);
                Ok(())
            }
            AlterSpec::DropConstraint(name) => {
                // Check constraints are not modelled; only foreign keys are removed.
                let table = self.table_mut(current)?;
                table
                    .foreign_keys
                    .retain(|fk| !fk.name.eq_ignore_ascii_case(&name));
                Ok(())
            }
            AlterSpec::ModifyColumn { column, position } => {
                let old_name = column.column.name.clone();
                self.replace_column(current, &old_name, column, position.as_ref())
            }
            AlterSpec::ChangeColumn {
                old_name,
                column,
                position,
            } => self.replace_column(current, &old_name, column, position.as_ref()),
            AlterSpec::SetDefault { column, default } => {
                let col = column_mut(self.table_mut(current)?, &column)?;
                col.default = Some(match default {
                    DefaultValue::Literal(value) => normalize::literal(&value, &col.data_type),
                    expression @ DefaultValue::Expression(_) => expression,
                });
                Ok(())
            }
            AlterSpec::DropDefault(column) => {
                column_mut(self.table_mut(current)?, &column)?.default = None;
                Ok(())
            }
            AlterSpec::RenameTable(to) => {
                self.rename_table(current, &to)?;
                *current = to;
                Ok(())
            }
            AlterSpec::RenameColumn { from, to } => {
                let table = self.table_mut(current)?;
                if !from.eq_ignore_ascii_case(&to) && table.column(&to).is_some() {
                    return Err(format!("Duplicate column name '{to}'"));
                }
                column_mut(table, &from)?.name.clone_from(&to);
                rename_in_table(table, &from, &to);
                self.rename_referenced_column(current, &from, &to);
                Ok(())
            }
            AlterSpec::RenameIndex { from, to } => {
                let table = self.table_mut(current)?;
                if from.eq_ignore_ascii_case(PRIMARY_KEY_NAME)
                    || to.eq_ignore_ascii_case(PRIMARY_KEY_NAME)
                {
                    return Err(format!("Incorrect index name '{to}'"));
                }
                if table.index(&to).is_some() {
                    return Err(format!("Duplicate key name '{to}'"));
                }
                let index = table
                    .indexes
                    .iter_mut()
                    .find(|i| i.name.eq_ignore_ascii_case(&from))
                    .ok_or_else(|| format!("Key '{from}' doesn't exist in table"))?;
                index.name = to;
                Ok(())
            }
            AlterSpec::Options(options) => {
                set_options(self.table_mut(current)?, options);
                Ok(())
            }
        }
    }

    /// `MODIFY` and `CHANGE`: replaces a column in place or at a new position.
    fn replace_column(
        &mut self,
        table_name: &str,
        old_name: &str,
        definition: ColumnDefinition,
        position: Option<&ColumnPosition>,
    ) -> Result<(), String> {
        let table = self.table_mut(table_name)?;
        let pos = table
            .column_position(old_name)
            .ok_or_else(|| format!("Unknown column '{old_name}' in '{table_name}'"))?;
        let new_name = definition.column.name.clone();
        if !new_name.eq_ignore_ascii_case(old_name) && table.column(&new_name).is_some() {
            return Err(format!("Duplicate column name '{new_name}'"));
        }

        let old = table.columns.remove(pos);
        let in_primary_key = table
            .primary_key()
            .is_some_and(|pk| pk.references_column(&old.name));

        let ColumnDefinition {
            mut column,
            primary_key,
            unique,
        } = definition;
        if in_primary_key || column.auto_increment {
            column.nullable = false;
        }
        let at = match position {
            Some(position) => insertion_point(table, position)?,
            None => pos,
        };
        table.columns.insert(at, column);

        rename_in_table(table, &old.name, &new_name);
        add_inline_keys(table, &new_name, primary_key, unique)?;
        if old.name != new_name {
            self.rename_referenced_column(table_name, &old.name, &new_name);
        }
        Ok(())
    }
}

fn only_one_database(declared: &str, other: &str) -> String {
    format!("Only one database may be declared, found '{declared}' and '{other}'")
}

/// An empty `COMMENT` removes the table comment.
fn set_options(table: &mut Table, options: Vec<(String, String)>) {
    for (key, value) in options {
        if key == OPTION_COMMENT && value.is_empty() {
            table.options.remove(&key);
        } else {
            table.options.insert(key, value);
        }
    }
}

fn column_mut<'t>(table: &'t mut Table, name: &str) -> Result<&'t mut Column, String> {
    let table_name = table.name.clone();
    table
        .column_mut(name)
        .ok_or_else(|| format!("Unknown column '{name}' in '{table_name}'"))
}

fn insertion_point(table: &Table, position: &ColumnPosition) -> Result<usize, String> {
    match position {
        ColumnPosition::First => Ok(0),
        ColumnPosition::After(after) => table
            .column_position(after)
            .map(|p| p + 1)
            .ok_or_else(|| format!("Unknown column '{after}' in '{}'", table.name)),
    }
}

fn add_column(
    table: &mut Table,
    definition: ColumnDefinition,
    position: Option<&ColumnPosition>,
) -> Result<(), String> {
    let ColumnDefinition {
        mut column,
        primary_key,
        unique,
    } = definition;
    if table.column(&column.name).is_some() {
        return Err(format!("Duplicate column name '{}'", column.name));
    }
    if column.auto_increment {
        column.nullable = false;
    }
    let name = column.name.clone();
    let at = match position {
        Some(position) => insertion_point(table, position)?,
        None => table.columns.len(),
    };
    table.columns.insert(at, column);
    add_inline_keys(table, &name, primary_key, unique)
}

fn add_inline_keys(
    table: &mut Table,
    column: &str,
    primary_key: bool,
    unique: bool,
) -> Result<(), String> {
    if primary_key {
        add_index(table, inline_index(IndexKind::Primary, column))?;
    }
    if unique {
        add_index(table, inline_index(IndexKind::Unique, column))?;
    }
    Ok(())
}

fn inline_index(kind: IndexKind, column: &str) -> IndexDefinition {
    IndexDefinition {
        name: None,
        kind,
        columns: vec![IndexColumn::new(column)],
        comment: None,
    }
}

fn add_index(table: &mut Table, definition: IndexDefinition) -> Result<(), String> {
    let IndexDefinition {
        name,
        kind,
        columns,
        comment,
    } = definition;

    let mut resolved = Vec::with_capacity(columns.len());
    for part in columns {
        let column = table.column(&part.name).ok_or_else(|| {
            format!("Key column '{}' doesn't exist in table '{}'", part.name, table.name)
        })?;
        resolved.push(IndexColumn {
            name: column.name.clone(),
            prefix: part.prefix,
        });
    }
    let first = resolved
        .first()
        .map(|c| c.name.clone())
        .ok_or_else(|| String::from("An index needs at least one column"))?;

    let name = if kind == IndexKind::Primary {
        if table.primary_key().is_some() {
            return Err(String::from("Multiple primary key defined"));
        }
        for part in &resolved {
            if let Some(column) = table.column_mut(&part.name) {
                column.nullable = false;
            }
        }
        PRIMARY_KEY_NAME.to_string()
    } else {
        match name {
            Some(name) if name.eq_ignore_ascii_case(PRIMARY_KEY_NAME) => {
                return Err(format!("Incorrect index name '{name}'"));
            }
            Some(name) if table.index(&name).is_some() => {
                return Err(format!("Duplicate key name '{name}'"));
            }
            Some(name) => name,
            None => unique_index_name(table, &first),
        }
    };

    let index = Index {
        name,
        columns: resolved,
        kind,
        comment,
    };
    // The primary key always comes first, as the server reports it.
    if kind == IndexKind::Primary {
        table.indexes.insert(0, index);
    } else {
        table.indexes.push(index);
    }
    Ok(())
}

/// MySQL names an unnamed index after its first column, adding `_2`,
/// `_3`, ... on collision.
fn unique_index_name(table: &Table, base: &str) -> String {
    let taken = |name: &str| table.index(name).is_some() || name.eq_ignore_ascii_case(PRIMARY_KEY_NAME);
    if !taken(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

fn next_foreign_key_name(table: &Table) -> String {
    let prefix = format!("{}_ibfk_", table.name);
    let highest = table
        .foreign_keys
        .iter()
        .filter_map(|fk| fk.name.strip_prefix(&prefix))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{prefix}{}", highest + 1)
}

fn add_foreign_key(table: &mut Table, definition: ForeignKeyDefinition) -> Result<(), String> {
    let ForeignKeyDefinition {
        constraint,
        index_name,
        columns,
        referenced_table,
        referenced_columns,
        on_delete,
        on_update,
    } = definition;

    if columns.len() != referenced_columns.len() {
        return Err(String::from(
            "Foreign key column count doesn't match referenced column count",
        ));
    }
    let mut resolved = Vec::with_capacity(columns.len());
    for name in &columns {
        let column = table.column(name).ok_or_else(|| {
            format!("Key column '{name}' doesn't exist in table '{}'", table.name)
        })?;
        resolved.push(column.name.clone());
    }

    let name = constraint
        .clone()
        .unwrap_or_else(|| next_foreign_key_name(table));
    if table.foreign_key(&name).is_some() {
        return Err(format!("Duplicate foreign key constraint name '{name}'"));
    }

    let covered = table
        .indexes
        .iter()
        .any(|index| index.supports_foreign_key(&resolved));
    if !covered {
        let preferred = index_name.or(constraint);
        let supporting = match preferred {
            Some(name) if table.index(&name).is_none() => Some(name),
            _ => None,
        };
        add_index(
            table,
            IndexDefinition {
                name: supporting,
                kind: IndexKind::Plain,
                columns: resolved.iter().map(IndexColumn::new).collect(),
                comment: None,
            },
        )?;
    }

    table.foreign_keys.push(ForeignKey {
        name,
        columns: resolved,
        referenced_table,
        referenced_columns,
        on_delete,
        on_update,
    });
    Ok(())
}

fn drop_column(table: &mut Table, name: &str) -> Result<(), String> {
    let pos = table
        .column_position(name)
        .ok_or_else(|| format!("Can't DROP '{name}'; check that column/key exists"))?;
    if table
        .foreign_keys
        .iter()
        .any(|fk| fk.columns.iter().any(|c| c.eq_ignore_ascii_case(name)))
    {
        return Err(format!(
            "Cannot drop column '{name}': needed in a foreign key constraint"
        ));
    }
    if table.columns.len() == 1 {
        return Err(String::from(
            "You can't delete all columns with ALTER TABLE; use DROP TABLE instead",
        ));
    }
    table.columns.remove(pos);
    for index in &mut table.indexes {
        index.columns.retain(|c| !c.name.eq_ignore_ascii_case(name));
    }
    table.indexes.retain(|index| !index.columns.is_empty());
    Ok(())
}

fn drop_index(table: &mut Table, name: &str) -> Result<(), String> {
    let pos = table
        .indexes
        .iter()
        .position(|i| i.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| format!("Can't DROP '{name}'; check that column/key exists"))?;
    table.indexes.remove(pos);
    Ok(())
}

/// Renames a column inside the table's own indexes and foreign keys.
fn rename_in_table(table: &mut Table, from: &str, to: &str) {
    for index in &mut table.indexes {
        for column in &mut index.columns {
            if column.name.eq_ignore_ascii_case(from) {
                column.name = to.to_string();
            }
        }
    }
    for fk in &mut table.foreign_keys {
        for column in &mut fk.columns {
            if column.eq_ignore_ascii_case(from) {
                *column = to.to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn build(statements: &[&str]) -> Result<Schema, String> {
        let mut builder = SchemaBuilder::new();
        for sql in statements {
            let statement = Parser::new(sql).parse_statement().map_err(|e| e.message)?;
            builder.apply(statement)?;
        }
        Ok(builder.finish())
    }

    fn index_names(table: &Table) -> Vec<&str> {
        table.indexes.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn unnamed_indexes_are_named_after_first_column() {
        let schema = build(&["CREATE TABLE t (a INT UNIQUE, b INT, UNIQUE (a), INDEX (b, a), KEY (b))"])
            .unwrap();
        let table = schema.table("t").unwrap();
        assert_eq!(index_names(table), vec!["a", "a_2", "b", "b_2"]);
    }

    #[test]
    fn primary_key_columns_become_not_null() {
        let schema = build(&["CREATE TABLE t (a INT, b INT NULL, PRIMARY KEY (a, b))"]).unwrap();
        let table = schema.table("t").unwrap();
        assert!(table.columns.iter().all(|c| !c.nullable));
        assert_eq!(table.primary_key().unwrap().name, "PRIMARY");
    }

    #[test]
    fn foreign_keys_get_generated_names_and_supporting_indexes() {
        let schema = build(&[
            "CREATE TABLE p (id INT PRIMARY KEY)",
            "CREATE TABLE c (id INT PRIMARY KEY, p1 INT, p2 INT,
                FOREIGN KEY (p1) REFERENCES p (id),
                CONSTRAINT fk_two FOREIGN KEY (p2) REFERENCES p (id),
                FOREIGN KEY (id) REFERENCES p (id))",
        ])
        .unwrap();
        let table = schema.table("c").unwrap();
        let fk_names: Vec<_> = table.foreign_keys.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(fk_names, vec!["c_ibfk_1", "fk_two", "c_ibfk_2"]);
        // The primary key already covers `id`.
        assert_eq!(index_names(table), vec!["PRIMARY", "p1", "fk_two"]);
    }

    #[test]
    fn alter_table_replays_in_order() {
        let schema = build(&[
            "CREATE TABLE t (a INT, b INT, c INT, KEY idx_bc (b, c))",
            "ALTER TABLE t ADD d INT FIRST, DROP COLUMN c, CHANGE b bb BIGINT AFTER d",
            "ALTER TABLE t RENAME TO u",
        ])
        .unwrap();
        assert!(schema.table("t").is_none());
        let table = schema.table("u").unwrap();
        let names: Vec<_> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["d", "bb", "a"]);
        let idx = table.index("idx_bc").unwrap();
        assert_eq!(idx.columns, vec![IndexColumn::new("bb")]);
    }

    #[test]
    fn rename_table_updates_references() {
        let schema = build(&[
            "CREATE TABLE p (id INT PRIMARY KEY)",
            "CREATE TABLE c (pid INT, FOREIGN KEY (pid) REFERENCES p (id))",
            "RENAME TABLE p TO parent",
            "ALTER TABLE parent RENAME COLUMN id TO pk",
        ])
        .unwrap();
        let fk = &schema.table("c").unwrap().foreign_keys[0];
        assert_eq!(fk.referenced_table, "parent");
        assert_eq!(fk.referenced_columns, vec![String::from("pk")]);
    }

    #[test]
    fn set_default_is_normalized_against_column_type() {
        let schema = build(&[
            "CREATE TABLE t (price DECIMAL(8,2))",
            "ALTER TABLE t ALTER COLUMN price SET DEFAULT 3",
        ])
        .unwrap();
        assert_eq!(
            schema.table("t").unwrap().columns[0].default,
            Some(DefaultValue::Literal(String::from("3.00")))
        );
    }

    #[test]
    fn database_statements() {
        let schema = build(&["CREATE DATABASE app CHARACTER SET utf8mb4", "USE app"]).unwrap();
        assert_eq!(schema.database.unwrap().charset.as_deref(), Some("utf8mb4"));
        assert!(build(&["USE app", "USE other"]).is_err());
    }

    #[test]
    fn invalid_statements_are_rejected() {
        assert!(build(&["CREATE TABLE t (a INT)", "CREATE TABLE t (a INT)"]).is_err());
        assert!(build(&["CREATE TABLE t (a INT)", "CREATE TABLE IF NOT EXISTS t (b INT)"]).is_ok());
        assert!(build(&["CREATE TABLE t (a INT, KEY (missing))"]).is_err());
        assert!(build(&["CREATE TABLE t (a INT, a INT)"]).is_err());
        assert!(build(&["ALTER TABLE missing ADD b INT"]).is_err());
        assert!(build(&["CREATE TABLE t (a INT PRIMARY KEY, b INT PRIMARY KEY)"]).is_err());
        assert!(build(&["DROP TABLE missing"]).is_err());
        assert!(build(&["DROP TABLE IF EXISTS missing"]).is_ok());
    }

    #[test]
    fn create_table_like_copies_structure_without_foreign_keys() {
        let schema = build(&[
            "CREATE TABLE p (id INT PRIMARY KEY)",
            "CREATE TABLE a (id INT, pid INT, FOREIGN KEY (pid) REFERENCES p (id))",
            "CREATE TABLE b LIKE a",
        ])
        .unwrap();
        let b = schema.table("b").unwrap();
        assert!(b.foreign_keys.is_empty());
        assert_eq!(index_names(b), vec!["pid"]);
    }
}
