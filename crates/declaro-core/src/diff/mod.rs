//! Schema diff engine.
//!
//! Compares a desired [`Schema`] (parsed from DDL) with an actual one
//! (introspected from a live server) and produces the operations that
//! turn the actual structure into the desired one.
//!
//! Operations are collected into phases and assembled in one global
//! order, so that referential integrity holds between any two
//! consecutive statements:
//!
//! 1. database creation or alteration
//! 2. foreign key drops
//! 3. column modifies that remove `AUTO_INCREMENT`
//! 4. index drops
//! 5. table creations (without foreign keys)
//! 6. table option changes
//! 7. column adds and modifies, with placement
//! 8. index adds
//! 9. column modifies that add `AUTO_INCREMENT`
//! 10. column drops
//! 11. table drops
//! 12. foreign key adds
//!
//! Within a phase, tables follow the desired declaration order and
//! actual-only tables follow by name.

mod column_order;

use std::collections::{BTreeMap, BTreeSet};

use crate::ast::ColumnPosition;
use crate::dialect::DdlDialect;
use crate::operation::{Operation, TableOptionsOp};
use crate::schema::{
    Column, Database, ForeignKey, Index, Schema, Table, OPTION_COMMENT, OPTION_ORDER,
};

// ================================================================
// Public types
// ================================================================

/// Result of comparing two schemas.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemaDiff {
    /// The operations to apply, in execution order.
    pub operations: Vec<Operation>,
}

impl SchemaDiff {
    /// Returns `true` if the schemas are structurally equal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Returns the number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Convenience: generates SQL for every operation using the
    /// given dialect.
    #[must_use]
    pub fn to_sql(&self, dialect: &impl DdlDialect) -> Vec<String> {
        self.operations
            .iter()
            .map(|op| dialect.generate_sql(op))
            .collect()
    }
}

// ================================================================
// Equality rules
// ================================================================

/// Compares a desired column with an actual one.
///
/// Character set and collation are only compared when the desired side
/// declares them; otherwise they are whatever the server defaulted to.
fn columns_equivalent(desired: &Column, actual: &Column) -> bool {
    desired.data_type == actual.data_type
        && desired.nullable == actual.nullable
        && desired.default == actual.default
        && desired.auto_increment == actual.auto_increment
        && desired.on_update == actual.on_update
        && desired.comment == actual.comment
        && (desired.charset.is_none() || desired.charset == actual.charset)
        && (desired.collation.is_none() || desired.collation == actual.collation)
}

fn indexes_equivalent(a: &Index, b: &Index) -> bool {
    a.kind == b.kind
        && a.comment == b.comment
        && a.columns.len() == b.columns.len()
        && a.columns
            .iter()
            .zip(&b.columns)
            .all(|(x, y)| x.name.eq_ignore_ascii_case(&y.name) && x.prefix == y.prefix)
}

fn names_equal(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_ignore_ascii_case(y))
}

fn fks_equivalent(a: &ForeignKey, b: &ForeignKey) -> bool {
    names_equal(&a.columns, &b.columns)
        && a.referenced_table == b.referenced_table
        && names_equal(&a.referenced_columns, &b.referenced_columns)
        && a.on_delete.effective() == b.on_delete.effective()
        && a.on_update.effective() == b.on_update.effective()
}

// ================================================================
// Phases
// ================================================================

#[derive(Default)]
struct Phases {
    database: Vec<Operation>,
    fk_drops: Vec<Operation>,
    auto_increment_removals: Vec<Operation>,
    index_drops: Vec<Operation>,
    creates: Vec<Operation>,
    options: Vec<Operation>,
    columns: Vec<Operation>,
    index_adds: Vec<Operation>,
    auto_increment_additions: Vec<Operation>,
    column_drops: Vec<Operation>,
    table_drops: Vec<Operation>,
    fk_adds: Vec<Operation>,
}

impl Phases {
    fn into_diff(self) -> SchemaDiff {
        let mut operations = Vec::new();
        operations.extend(self.database);
        operations.extend(self.fk_drops);
        operations.extend(self.auto_increment_removals);
        operations.extend(self.index_drops);
        operations.extend(self.creates);
        operations.extend(self.options);
        operations.extend(self.columns);
        operations.extend(self.index_adds);
        operations.extend(self.auto_increment_additions);
        operations.extend(self.column_drops);
        operations.extend(self.table_drops);
        operations.extend(self.fk_adds);
        SchemaDiff { operations }
    }
}

/// Cross-table facts a foreign key needs to know about before the
/// per-table diff runs.
struct Context<'a> {
    /// Actual indexes that will be dropped (removed or changed), by table.
    dropped_indexes: BTreeMap<&'a str, Vec<&'a Index>>,
    /// `(table, lowercase column)` pairs whose type, character set or
    /// collation changes.
    retyped: BTreeSet<(String, String)>,
}

impl<'a> Context<'a> {
    fn new(pairs: &[(&'a Table, &'a Table)]) -> Self {
        let mut dropped_indexes = BTreeMap::new();
        let mut retyped = BTreeSet::new();
        for &(desired, actual) in pairs {
            dropped_indexes.insert(actual.name.as_str(), dropped_indexes_of(desired, actual));
            for column in &desired.columns {
                if let Some(current) = actual.column(&column.name) {
                    if reshapes_key_column(column, current) {
                        retyped.insert((actual.name.clone(), column.name.to_ascii_lowercase()));
                    }
                }
            }
        }
        Self {
            dropped_indexes,
            retyped,
        }
    }

    fn dropped_indexes(&self, table: &str) -> &[&'a Index] {
        self.dropped_indexes
            .get(table)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn is_retyped(&self, table: &str, columns: &[String]) -> bool {
        columns.iter().any(|c| {
            self.retyped
                .contains(&(table.to_string(), c.to_ascii_lowercase()))
        })
    }

    /// A foreign key that survives unchanged still has to be dropped and
    /// re-added when the server would refuse the surrounding changes
    /// while it exists: a type, character set or collation change on
    /// either side, or losing an index it relies on.
    fn disturbs(&self, table: &str, fk: &ForeignKey) -> bool {
        self.is_retyped(table, &fk.columns)
            || self.is_retyped(&fk.referenced_table, &fk.referenced_columns)
            || self
                .dropped_indexes(table)
                .iter()
                .any(|index| index.supports_foreign_key(&fk.columns))
            || self
                .dropped_indexes(&fk.referenced_table)
                .iter()
                .any(|index| index.supports_foreign_key(&fk.referenced_columns))
    }
}

/// Changes the server rejects on a column that takes part in a foreign
/// key. Character set and collation count only when declared, as in
/// [`columns_equivalent`].
fn reshapes_key_column(desired: &Column, actual: &Column) -> bool {
    desired.data_type != actual.data_type
        || desired.charset.as_ref().is_some_and(|c| Some(c) != actual.charset.as_ref())
        || desired.collation.as_ref().is_some_and(|c| Some(c) != actual.collation.as_ref())
}

/// Actual indexes that are removed or changed: changed ones in desired
/// order, then removed ones by name.
fn dropped_indexes_of<'a>(desired: &Table, actual: &'a Table) -> Vec<&'a Index> {
    let mut dropped: Vec<&Index> = desired
        .indexes
        .iter()
        .filter_map(|index| {
            actual
                .index(&index.name)
                .filter(|current| !indexes_equivalent(index, current))
        })
        .collect();
    let mut removed: Vec<&Index> = actual
        .indexes
        .iter()
        .filter(|index| desired.index(&index.name).is_none())
        .collect();
    removed.sort_by(|a, b| a.name.cmp(&b.name));
    dropped.extend(removed);
    dropped
}

// ================================================================
// Schema-level diff
// ================================================================

/// Compares a desired schema with the actual one and produces the
/// operations needed to migrate from `actual` to `desired`.
///
/// The result is deterministic, and empty when the schemas are
/// structurally equal. An empty `desired` schema tears every table down.
#[must_use]
pub fn diff_schemas(desired: &Schema, actual: &Schema) -> SchemaDiff {
    let mut phases = Phases::default();
    diff_database(
        desired.database.as_ref(),
        actual.database.as_ref(),
        &mut phases,
    );

    let pairs: Vec<(&Table, &Table)> = desired
        .tables
        .iter()
        .filter_map(|table| actual.table(&table.name).map(|current| (table, current)))
        .collect();
    let context = Context::new(&pairs);

    for table in &desired.tables {
        match actual.table(&table.name) {
            Some(current) => diff_table(table, current, &context, &mut phases),
            None => {
                phases.creates.push(Operation::create_table(Table {
                    foreign_keys: Vec::new(),
                    ..table.clone()
                }));
                for fk in &table.foreign_keys {
                    phases
                        .fk_adds
                        .push(Operation::add_foreign_key(&table.name, fk.clone()));
                }
            }
        }
    }

    let mut dropped: Vec<&Table> = actual
        .tables
        .iter()
        .filter(|table| desired.table(&table.name).is_none())
        .collect();
    dropped.sort_by(|a, b| a.name.cmp(&b.name));
    for table in dropped {
        for fk in sorted_by_name(&table.foreign_keys, |fk| &fk.name) {
            phases
                .fk_drops
                .push(Operation::drop_foreign_key(&table.name, &fk.name));
        }
        phases.table_drops.push(Operation::drop_table(&table.name));
    }

    phases.into_diff()
}

/// The database is created when missing and altered when a declared
/// character set or collation differs. It is never dropped.
fn diff_database(desired: Option<&Database>, actual: Option<&Database>, phases: &mut Phases) {
    let Some(desired) = desired else {
        return;
    };
    match actual {
        None => {
            phases.database.push(Operation::CreateDatabase(desired.clone()));
            phases
                .database
                .push(Operation::UseDatabase(desired.name.clone()));
        }
        Some(current) => {
            let charset_differs = desired.charset.is_some() && desired.charset != current.charset;
            let collation_differs =
                desired.collation.is_some() && desired.collation != current.collation;
            if charset_differs || collation_differs {
                phases.database.push(Operation::AlterDatabase(Database {
                    name: current.name.clone(),
                    charset: desired.charset.clone(),
                    collation: desired.collation.clone(),
                }));
            }
        }
    }
}

fn sorted_by_name<T>(items: &[T], name: impl Fn(&T) -> &String) -> Vec<&T> {
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by(|a, b| name(*a).cmp(name(*b)));
    sorted
}

// ================================================================
// Table-level diff
// ================================================================

fn diff_table(desired: &Table, actual: &Table, context: &Context<'_>, phases: &mut Phases) {
    diff_foreign_keys(desired, actual, context, phases);
    diff_options(desired, actual, phases);
    diff_columns(desired, actual, context, phases);
    diff_indexes(desired, actual, context, phases);

    let dropped = actual
        .columns
        .iter()
        .filter(|column| desired.column(&column.name).is_none());
    let mut names: Vec<&String> = dropped.map(|column| &column.name).collect();
    names.sort();
    for name in names {
        phases
            .column_drops
            .push(Operation::drop_column(&actual.name, name));
    }
}

fn diff_foreign_keys(desired: &Table, actual: &Table, context: &Context<'_>, phases: &mut Phases) {
    for fk in &desired.foreign_keys {
        match actual.foreign_key(&fk.name) {
            Some(current) if fks_equivalent(fk, current) && !context.disturbs(&actual.name, current) => {}
            Some(current) => {
                phases
                    .fk_drops
                    .push(Operation::drop_foreign_key(&actual.name, &current.name));
                phases
                    .fk_adds
                    .push(Operation::add_foreign_key(&desired.name, fk.clone()));
            }
            None => phases
                .fk_adds
                .push(Operation::add_foreign_key(&desired.name, fk.clone())),
        }
    }
    for fk in sorted_by_name(&actual.foreign_keys, |fk| &fk.name) {
        if desired.foreign_key(&fk.name).is_none() {
            phases
                .fk_drops
                .push(Operation::drop_foreign_key(&actual.name, &fk.name));
        }
    }
}

fn diff_indexes(desired: &Table, actual: &Table, context: &Context<'_>, phases: &mut Phases) {
    for index in context.dropped_indexes(&actual.name) {
        phases
            .index_drops
            .push(Operation::drop_index(&actual.name, index));
    }
    for index in &desired.indexes {
        let unchanged = actual
            .index(&index.name)
            .is_some_and(|current| indexes_equivalent(index, current));
        if !unchanged {
            phases
                .index_adds
                .push(Operation::create_index(&desired.name, index.clone()));
        }
    }
}

/// Only options the desired side declares are compared, except the
/// comment: an undeclared comment means no comment.
fn diff_options(desired: &Table, actual: &Table, phases: &mut Phases) {
    let mut options = Vec::new();
    for key in OPTION_ORDER {
        let wanted = desired.option(key);
        let current = actual.option(key);
        if key == OPTION_COMMENT {
            let wanted = wanted.unwrap_or_default();
            if wanted != current.unwrap_or_default() {
                options.push((key.to_string(), wanted.to_string()));
            }
        } else if let Some(wanted) = wanted {
            if current != Some(wanted) {
                options.push((key.to_string(), wanted.to_string()));
            }
        }
    }
    if !options.is_empty() {
        phases.options.push(Operation::AlterTableOptions(TableOptionsOp {
            table: desired.name.clone(),
            options,
        }));
    }
}

// ================================================================
// Column diff
// ================================================================

/// Diffs columns, including `AUTO_INCREMENT` transitions and placement.
///
/// The server only accepts an `AUTO_INCREMENT` column that leads some
/// index. The flag is therefore removed before index drops and added
/// after index adds, and a column that keeps the flag but loses every
/// index it leads gets both.
fn diff_columns(desired: &Table, actual: &Table, context: &Context<'_>, phases: &mut Phases) {
    let dropped_indexes = context.dropped_indexes(&actual.name);
    let keeps_key = |column: &str| {
        actual.indexes.iter().any(|index| {
            index
                .columns
                .first()
                .is_some_and(|first| first.name.eq_ignore_ascii_case(column))
                && !dropped_indexes
                    .iter()
                    .any(|dropped| dropped.name.eq_ignore_ascii_case(&index.name))
        })
    };

    // State of each actual column once the early modifies have run.
    let mut settled: BTreeMap<String, Column> = BTreeMap::new();
    let mut late: BTreeSet<String> = BTreeSet::new();

    for current in actual.columns.iter().filter(|c| c.auto_increment) {
        let key = current.name.to_ascii_lowercase();
        let interim = match desired.column(&current.name) {
            None if keeps_key(&current.name) => None,
            None => Some(Column {
                auto_increment: false,
                ..current.clone()
            }),
            Some(column) if !column.auto_increment => Some(column.clone()),
            Some(_) if keeps_key(&current.name) => None,
            Some(column) => {
                late.insert(key.clone());
                Some(Column {
                    auto_increment: false,
                    ..column.clone()
                })
            }
        };
        if let Some(interim) = interim {
            phases.auto_increment_removals.push(Operation::modify_column(
                &actual.name,
                interim.clone(),
                None,
            ));
            settled.insert(key, interim);
        }
    }
    for column in desired.columns.iter().filter(|c| c.auto_increment) {
        let gains = actual
            .column(&column.name)
            .map_or(true, |current| !current.auto_increment);
        if gains {
            late.insert(column.name.to_ascii_lowercase());
        }
    }

    let lowercase = |c: &Column| c.name.to_ascii_lowercase();
    let shared_actual: Vec<String> = actual
        .columns
        .iter()
        .filter(|c| desired.column(&c.name).is_some())
        .map(lowercase)
        .collect();
    let shared_desired: Vec<String> = desired
        .columns
        .iter()
        .filter(|c| actual.column(&c.name).is_some())
        .map(lowercase)
        .collect();
    let stable = column_order::stable_columns(&shared_actual, &shared_desired);

    // New columns after the last shared one are simply appended.
    let trailing = desired
        .columns
        .iter()
        .rposition(|c| actual.column(&c.name).is_some())
        .map_or(0, |i| i + 1);

    let mut previous: Option<&str> = None;
    for (i, column) in desired.columns.iter().enumerate() {
        let key = column.name.to_ascii_lowercase();
        let mut target = column.clone();
        if late.contains(&key) {
            target.auto_increment = false;
        }
        let position = previous.map_or(ColumnPosition::First, |p| {
            ColumnPosition::After(p.to_string())
        });

        match actual.column(&column.name) {
            None => {
                let position = (i < trailing).then_some(position);
                phases
                    .columns
                    .push(Operation::add_column(&desired.name, target, position));
            }
            Some(current) => {
                let current = settled.get(&key).unwrap_or(current);
                if !stable.contains(&key) {
                    phases.columns.push(Operation::modify_column(
                        &desired.name,
                        target,
                        Some(position),
                    ));
                } else if !columns_equivalent(&target, current) {
                    phases
                        .columns
                        .push(Operation::modify_column(&desired.name, target, None));
                }
            }
        }
        previous = Some(column.name.as_str());
    }

    for column in desired
        .columns
        .iter()
        .filter(|c| late.contains(&c.name.to_ascii_lowercase()))
    {
        phases.auto_increment_additions.push(Operation::modify_column(
            &desired.name,
            column.clone(),
            None,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::MySqlDialect;
    use crate::parser::parse_schema;
    use crate::schema::{ForeignKeyAction, IndexKind};

    // ============================================================
    // Helpers
    // ============================================================

    fn schema(ddl: &str) -> Schema {
        parse_schema(ddl).unwrap()
    }

    fn sql(desired: &str, actual: &str) -> Vec<String> {
        diff_schemas(&schema(desired), &schema(actual)).to_sql(&MySqlDialect::new())
    }

    fn position_of(statements: &[String], needle: &str) -> usize {
        statements
            .iter()
            .position(|s| s.starts_with(needle))
            .unwrap_or_else(|| panic!("no statement starting with {needle:?} in {statements:#?}"))
    }

    const BLOG: &str = "
        CREATE TABLE users (
            id INT PRIMARY KEY AUTO_INCREMENT,
            email VARCHAR(255) NOT NULL,
            UNIQUE KEY uq_email (email)
        );
        CREATE TABLE posts (
            id INT PRIMARY KEY AUTO_INCREMENT,
            user_id INT NOT NULL,
            title VARCHAR(200),
            CONSTRAINT fk_posts_user FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
        );
    ";

    // ============================================================
    // Identity and determinism
    // ============================================================

    #[test]
    fn no_changes_produces_empty_diff() {
        let s = schema(BLOG);
        assert!(diff_schemas(&s, &s).is_empty());
    }

    #[test]
    fn server_defaults_do_not_cause_changes() {
        let statements = sql(
            "CREATE TABLE t (name VARCHAR(10), n INT(11) DEFAULT '0')",
            "CREATE TABLE t (
                name varchar(10) CHARACTER SET utf8mb4 COLLATE utf8mb4_0900_ai_ci DEFAULT NULL,
                n int DEFAULT 0
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_0900_ai_ci",
        );
        assert!(statements.is_empty(), "{statements:#?}");
    }

    #[test]
    fn restrict_and_no_action_are_equal() {
        let statements = sql(
            "CREATE TABLE p (id INT PRIMARY KEY);
             CREATE TABLE c (pid INT, CONSTRAINT fk FOREIGN KEY (pid) REFERENCES p (id) ON DELETE RESTRICT)",
            "CREATE TABLE p (id INT PRIMARY KEY);
             CREATE TABLE c (pid INT, CONSTRAINT fk FOREIGN KEY (pid) REFERENCES p (id))",
        );
        assert!(statements.is_empty(), "{statements:#?}");
    }

    #[test]
    fn diff_is_deterministic() {
        let desired = schema(BLOG);
        let actual = schema("CREATE TABLE legacy (id INT); CREATE TABLE users (id INT)");
        assert_eq!(diff_schemas(&desired, &actual), diff_schemas(&desired, &actual));
    }

    // ============================================================
    // Tables
    // ============================================================

    #[test]
    fn new_tables_are_created_before_foreign_keys() {
        let diff = diff_schemas(&schema(BLOG), &Schema::new());
        let ops = &diff.operations;
        assert_eq!(ops.len(), 3);
        assert!(matches!(&ops[0], Operation::CreateTable(op) if op.table.name == "users"));
        assert!(matches!(
            &ops[1],
            Operation::CreateTable(op) if op.table.name == "posts" && op.table.foreign_keys.is_empty()
        ));
        assert!(matches!(
            &ops[2],
            Operation::AddForeignKey(op) if op.table == "posts" && op.foreign_key.name == "fk_posts_user"
        ));
    }

    #[test]
    fn teardown_drops_foreign_keys_before_tables() {
        let diff = diff_schemas(&Schema::new(), &schema(BLOG));
        let statements = diff.to_sql(&MySqlDialect::new());
        assert_eq!(
            statements,
            vec![
                "ALTER TABLE `posts` DROP FOREIGN KEY `fk_posts_user`",
                "DROP TABLE `posts`",
                "DROP TABLE `users`",
            ]
        );
    }

    #[test]
    fn dropping_a_referenced_table_drops_the_reference_first() {
        let statements = sql(
            "CREATE TABLE posts (id INT PRIMARY KEY, user_id INT NOT NULL)",
            BLOG,
        );
        let fk = position_of(&statements, "ALTER TABLE `posts` DROP FOREIGN KEY `fk_posts_user`");
        let table = position_of(&statements, "DROP TABLE `users`");
        assert!(fk < table);
        // The supporting index is no longer declared either.
        assert!(statements.contains(&String::from("DROP INDEX `fk_posts_user` ON `posts`")));
    }

    // ============================================================
    // Columns
    // ============================================================

    #[test]
    fn widened_column_is_narrowed_back() {
        let statements = sql(
            "CREATE TABLE greeting (id INT PRIMARY KEY, body VARCHAR(100))",
            "CREATE TABLE greeting (id INT PRIMARY KEY, body VARCHAR(200))",
        );
        assert_eq!(
            statements,
            vec!["ALTER TABLE `greeting` MODIFY COLUMN `body` varchar(100) DEFAULT NULL"]
        );
    }

    #[test]
    fn added_columns_are_placed() {
        let statements = sql(
            "CREATE TABLE t (a INT, b INT, c INT, d INT)",
            "CREATE TABLE t (a INT, c INT)",
        );
        assert_eq!(
            statements,
            vec![
                "ALTER TABLE `t` ADD COLUMN `b` int DEFAULT NULL AFTER `a`",
                "ALTER TABLE `t` ADD COLUMN `d` int DEFAULT NULL",
            ]
        );
    }

    #[test]
    fn only_out_of_order_columns_move() {
        let statements = sql(
            "CREATE TABLE t (d INT, a INT, b INT, c INT)",
            "CREATE TABLE t (a INT, b INT, c INT, d INT)",
        );
        assert_eq!(
            statements,
            vec!["ALTER TABLE `t` MODIFY COLUMN `d` int DEFAULT NULL FIRST"]
        );
    }

    #[test]
    fn dropped_columns_go_after_adds() {
        let statements = sql("CREATE TABLE t (b INT)", "CREATE TABLE t (a INT)");
        assert_eq!(
            statements,
            vec![
                "ALTER TABLE `t` ADD COLUMN `b` int DEFAULT NULL",
                "ALTER TABLE `t` DROP COLUMN `a`",
            ]
        );
    }

    #[test]
    fn declared_collation_is_compared() {
        let statements = sql(
            "CREATE TABLE t (name VARCHAR(10) COLLATE utf8mb4_bin)",
            "CREATE TABLE t (name VARCHAR(10) CHARACTER SET utf8mb4 COLLATE utf8mb4_0900_ai_ci)",
        );
        assert_eq!(
            statements,
            vec!["ALTER TABLE `t` MODIFY COLUMN `name` varchar(10) COLLATE utf8mb4_bin DEFAULT NULL"]
        );
    }

    #[test]
    fn auto_increment_is_added_after_its_key() {
        let statements = sql(
            "CREATE TABLE t (id INT NOT NULL AUTO_INCREMENT PRIMARY KEY, v INT)",
            "CREATE TABLE t (v INT)",
        );
        assert_eq!(
            statements,
            vec![
                "ALTER TABLE `t` ADD COLUMN `id` int NOT NULL FIRST",
                "ALTER TABLE `t` ADD PRIMARY KEY (`id`)",
                "ALTER TABLE `t` MODIFY COLUMN `id` int NOT NULL AUTO_INCREMENT",
            ]
        );
    }

    #[test]
    fn auto_increment_is_removed_before_its_key() {
        let statements = sql(
            "CREATE TABLE t (id INT NOT NULL, v INT)",
            "CREATE TABLE t (id INT NOT NULL AUTO_INCREMENT PRIMARY KEY, v INT)",
        );
        assert_eq!(
            statements,
            vec![
                "ALTER TABLE `t` MODIFY COLUMN `id` int NOT NULL",
                "ALTER TABLE `t` DROP PRIMARY KEY",
            ]
        );
    }

    #[test]
    fn auto_increment_survives_a_rebuilt_primary_key() {
        let diff = diff_schemas(
            &schema("CREATE TABLE t (id INT AUTO_INCREMENT, k INT, PRIMARY KEY (id, k))"),
            &schema("CREATE TABLE t (id INT AUTO_INCREMENT PRIMARY KEY, k INT)"),
        );
        let ops = &diff.operations;
        assert_eq!(ops.len(), 5, "{ops:#?}");
        assert!(matches!(&ops[0], Operation::ModifyColumn(op) if !op.column.auto_increment));
        assert!(matches!(&ops[1], Operation::DropIndex(op) if op.primary));
        assert!(matches!(&ops[2], Operation::ModifyColumn(op) if op.column.name == "k" && !op.column.nullable));
        assert!(matches!(&ops[3], Operation::CreateIndex(op) if op.index.kind == IndexKind::Primary));
        assert!(matches!(&ops[4], Operation::ModifyColumn(op) if op.column.auto_increment));
    }

    // ============================================================
    // Indexes and foreign keys
    // ============================================================

    #[test]
    fn changed_index_is_dropped_and_readded() {
        let statements = sql(
            "CREATE TABLE t (a INT, b INT, KEY idx (a, b))",
            "CREATE TABLE t (a INT, b INT, KEY idx (a))",
        );
        assert_eq!(
            statements,
            vec![
                "DROP INDEX `idx` ON `t`",
                "CREATE INDEX `idx` ON `t` (`a`,`b`)",
            ]
        );
    }

    #[test]
    fn changed_foreign_key_is_dropped_first_and_added_last() {
        let desired = BLOG.replace("ON DELETE CASCADE", "ON DELETE SET NULL");
        let diff = diff_schemas(&schema(&desired), &schema(BLOG));
        let ops = &diff.operations;
        assert_eq!(ops.len(), 2);
        assert!(matches!(&ops[0], Operation::DropForeignKey(op) if op.name == "fk_posts_user"));
        assert!(matches!(
            &ops[1],
            Operation::AddForeignKey(op) if op.foreign_key.on_delete == ForeignKeyAction::SetNull
        ));
    }

    #[test]
    fn retyped_referenced_column_recreates_the_foreign_key() {
        let desired = "
            CREATE TABLE users (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                email VARCHAR(255) NOT NULL,
                UNIQUE KEY uq_email (email)
            );
            CREATE TABLE posts (
                id INT PRIMARY KEY AUTO_INCREMENT,
                user_id BIGINT NOT NULL,
                title VARCHAR(200),
                CONSTRAINT fk_posts_user FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            );
        ";
        let statements = sql(desired, BLOG);
        let drop = position_of(&statements, "ALTER TABLE `posts` DROP FOREIGN KEY");
        let modify = position_of(&statements, "ALTER TABLE `users` MODIFY COLUMN `id` bigint");
        let add = position_of(&statements, "ALTER TABLE `posts` ADD CONSTRAINT");
        assert!(drop < modify && modify < add, "{statements:#?}");
    }

    #[test]
    fn charset_change_on_key_columns_recreates_the_foreign_key() {
        let declare = |charset: &str| {
            format!(
                "CREATE TABLE p (code VARCHAR(10) CHARACTER SET {charset} NOT NULL PRIMARY KEY);
                 CREATE TABLE c (
                     id INT PRIMARY KEY,
                     code VARCHAR(10) CHARACTER SET {charset} NOT NULL,
                     CONSTRAINT fk FOREIGN KEY (code) REFERENCES p (code)
                 )"
            )
        };
        let statements = sql(&declare("latin1"), &declare("utf8mb4"));
        let drop = position_of(&statements, "ALTER TABLE `c` DROP FOREIGN KEY `fk`");
        let parent = position_of(&statements, "ALTER TABLE `p` MODIFY COLUMN `code`");
        let child = position_of(&statements, "ALTER TABLE `c` MODIFY COLUMN `code`");
        let add = position_of(&statements, "ALTER TABLE `c` ADD CONSTRAINT `fk`");
        assert!(drop < parent && drop < child, "{statements:#?}");
        assert!(parent < add && child < add, "{statements:#?}");

        // Undeclared character sets are whatever the server chose.
        let implicit = "CREATE TABLE p (code VARCHAR(10) NOT NULL PRIMARY KEY);
             CREATE TABLE c (
                 id INT PRIMARY KEY,
                 code VARCHAR(10) NOT NULL,
                 CONSTRAINT fk FOREIGN KEY (code) REFERENCES p (code)
             )";
        assert!(sql(implicit, &declare("utf8mb4")).is_empty());
    }

    #[test]
    fn dropping_a_prefix_index_leaves_the_foreign_key() {
        let parent = "CREATE TABLE p (code VARCHAR(10) NOT NULL PRIMARY KEY);";
        let statements = sql(
            &format!(
                "{parent}
                 CREATE TABLE c (
                     code VARCHAR(10) NOT NULL,
                     KEY code_idx (code),
                     CONSTRAINT fk FOREIGN KEY (code) REFERENCES p (code)
                 )"
            ),
            &format!(
                "{parent}
                 CREATE TABLE c (
                     code VARCHAR(10) NOT NULL,
                     KEY code_idx (code),
                     KEY code_head (code(4)),
                     CONSTRAINT fk FOREIGN KEY (code) REFERENCES p (code)
                 )"
            ),
        );
        assert_eq!(statements, vec!["DROP INDEX `code_head` ON `c`"]);
    }

    #[test]
    fn new_foreign_key_follows_its_column() {
        let statements = sql(
            "CREATE TABLE p (id INT PRIMARY KEY);
             CREATE TABLE c (id INT, pid INT, FOREIGN KEY (pid) REFERENCES p (id))",
            "CREATE TABLE p (id INT PRIMARY KEY);
             CREATE TABLE c (id INT)",
        );
        assert_eq!(
            statements,
            vec![
                "ALTER TABLE `c` ADD COLUMN `pid` int DEFAULT NULL",
                "CREATE INDEX `pid` ON `c` (`pid`)",
                "ALTER TABLE `c` ADD CONSTRAINT `c_ibfk_1` FOREIGN KEY (`pid`) REFERENCES `p` (`id`)",
            ]
        );
    }

    // ============================================================
    // Options and database
    // ============================================================

    #[test]
    fn declared_options_and_comment_are_compared() {
        let statements = sql(
            "CREATE TABLE t (a INT) ENGINE=MyISAM",
            "CREATE TABLE t (a INT) ENGINE=InnoDB ROW_FORMAT=DYNAMIC COMMENT='old'",
        );
        assert_eq!(statements, vec!["ALTER TABLE `t` ENGINE=MyISAM COMMENT=''"]);
    }

    #[test]
    fn missing_database_is_created_and_selected() {
        let statements = sql("CREATE DATABASE app; USE app; CREATE TABLE t (a INT)", "");
        assert_eq!(statements[0], "CREATE DATABASE `app`");
        assert_eq!(statements[1], "USE `app`");
        assert!(statements[2].starts_with("CREATE TABLE `t`"));
    }

    #[test]
    fn database_charset_is_altered_when_declared() {
        let statements = sql(
            "CREATE DATABASE app CHARACTER SET latin1",
            "CREATE DATABASE app CHARACTER SET utf8mb4 COLLATE utf8mb4_0900_ai_ci",
        );
        assert_eq!(statements, vec!["ALTER DATABASE `app` CHARACTER SET latin1"]);
        assert!(sql("CREATE DATABASE app", "CREATE DATABASE app CHARACTER SET utf8mb4").is_empty());
    }
}
