//! Builds a schema model from catalog rows.
//!
//! Pure functions: every server-specific spelling goes through the same
//! normalization as the parser, so an unchanged database diffs empty against
//! its declaration.

use declaro_core::schema::normalize;
use declaro_core::schema::{
    Column, DataType, Database, ForeignKey, ForeignKeyAction, Index, IndexColumn, IndexKind,
    Schema, Table, OPTION_CHARSET, OPTION_COLLATE, OPTION_COMMENT, OPTION_ENGINE,
    OPTION_ROW_FORMAT, PRIMARY_KEY_NAME,
};

use super::queries::{ColumnRow, ForeignKeyRow, IndexRow, SchemaRow, TableRow};

/// A row of `information_schema.TABLES`.
#[derive(Debug, Clone, Default)]
pub struct TableInfo {
    pub name: String,
    pub engine: Option<String>,
    pub collation: Option<String>,
    pub create_options: Option<String>,
    pub comment: Option<String>,
}

impl From<TableRow> for TableInfo {
    fn from((name, engine, collation, create_options, comment): TableRow) -> Self {
        Self {
            name,
            engine,
            collation,
            create_options,
            comment,
        }
    }
}

/// A row of `information_schema.COLUMNS`.
#[derive(Debug, Clone, Default)]
pub struct ColumnInfo {
    pub table: String,
    pub name: String,
    pub column_type: String,
    pub is_nullable: String,
    pub default: Option<String>,
    pub extra: Option<String>,
    pub charset: Option<String>,
    pub collation: Option<String>,
    pub comment: Option<String>,
}

impl From<ColumnRow> for ColumnInfo {
    fn from(
        (table, name, column_type, is_nullable, default, extra, charset, collation, comment): ColumnRow,
    ) -> Self {
        Self {
            table,
            name,
            column_type,
            is_nullable,
            default,
            extra,
            charset,
            collation,
            comment,
        }
    }
}

/// A key part from `information_schema.STATISTICS`.
#[derive(Debug, Clone, Default)]
pub struct IndexPart {
    pub table: String,
    pub index: String,
    pub non_unique: i64,
    /// `None` for a functional key part.
    pub column: Option<String>,
    pub sub_part: Option<i64>,
    pub index_type: Option<String>,
    pub comment: Option<String>,
}

impl From<IndexRow> for IndexPart {
    fn from(
        (table, index, non_unique, column, sub_part, index_type, comment): IndexRow,
    ) -> Self {
        Self {
            table,
            index,
            non_unique,
            column,
            sub_part,
            index_type,
            comment,
        }
    }
}

/// A column pair of a foreign key.
#[derive(Debug, Clone, Default)]
pub struct ForeignKeyPart {
    pub table: String,
    pub constraint: String,
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
    pub update_rule: String,
    pub delete_rule: String,
}

impl From<ForeignKeyRow> for ForeignKeyPart {
    fn from(
        (table, constraint, column, referenced_table, referenced_column, update_rule, delete_rule): ForeignKeyRow,
    ) -> Self {
        Self {
            table,
            constraint,
            column,
            referenced_table,
            referenced_column,
            update_rule,
            delete_rule,
        }
    }
}

/// Everything read from the catalog for one database.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub database: Option<SchemaRow>,
    pub tables: Vec<TableInfo>,
    pub columns: Vec<ColumnInfo>,
    pub indexes: Vec<IndexPart>,
    pub foreign_keys: Vec<ForeignKeyPart>,
}

/// Builds the schema model. Tables, indexes after the primary key, and
/// foreign keys come out sorted by name.
#[must_use]
pub fn build_schema(catalog: Catalog) -> Schema {
    let mut schema = Schema::new();
    schema.database = catalog.database.map(|(name, charset, collation)| Database {
        name,
        charset: charset.map(|c| c.to_ascii_lowercase()),
        collation: collation.map(|c| c.to_ascii_lowercase()),
    });

    for info in catalog.tables {
        // Names are unique in the catalog.
        let _ = schema.add_table(table(info));
    }

    for info in catalog.columns {
        if let Some(table) = schema.table_mut(&info.table) {
            table.columns.push(column(info));
        }
    }

    for (table_name, index) in group_indexes(catalog.indexes) {
        if let Some(table) = schema.table_mut(&table_name) {
            table.indexes.push(index);
        }
    }

    for (table_name, fk) in group_foreign_keys(catalog.foreign_keys) {
        if let Some(table) = schema.table_mut(&table_name) {
            table.foreign_keys.push(fk);
        }
    }

    for table in &mut schema.tables {
        table.indexes.sort_by(|a, b| {
            (a.kind != IndexKind::Primary, &a.name).cmp(&(b.kind != IndexKind::Primary, &b.name))
        });
        table.foreign_keys.sort_by(|a, b| a.name.cmp(&b.name));
    }
    schema.sort_tables();
    schema
}

fn table(info: TableInfo) -> Table {
    let mut table = Table::new(info.name);
    if let Some(engine) = info.engine.filter(|e| !e.is_empty()) {
        table
            .options
            .insert(OPTION_ENGINE.to_string(), normalize::engine(&engine));
    }
    if let Some(collation) = info.collation.filter(|c| !c.is_empty()) {
        let collation = collation.to_ascii_lowercase();
        table
            .options
            .insert(OPTION_CHARSET.to_string(), charset_of(&collation));
        table.options.insert(OPTION_COLLATE.to_string(), collation);
    }
    if let Some(row_format) = info.create_options.as_deref().and_then(row_format) {
        table
            .options
            .insert(OPTION_ROW_FORMAT.to_string(), row_format);
    }
    if let Some(comment) = info.comment.filter(|c| !c.is_empty()) {
        table.options.insert(OPTION_COMMENT.to_string(), comment);
    }
    table
}

/// The character set a collation belongs to: its name up to the first `_`.
fn charset_of(collation: &str) -> String {
    collation
        .split('_')
        .next()
        .unwrap_or(collation)
        .to_string()
}

/// Extracts `row_format=...` from `CREATE_OPTIONS`.
fn row_format(create_options: &str) -> Option<String> {
    create_options.split_whitespace().find_map(|option| {
        let (key, value) = option.split_once('=')?;
        key.eq_ignore_ascii_case("row_format")
            .then(|| value.to_ascii_uppercase())
    })
}

fn column(info: ColumnInfo) -> Column {
    let data_type = normalize::column_type(&info.column_type)
        .unwrap_or_else(|_| DataType::simple(info.column_type.to_ascii_lowercase()));
    let extra = info.extra.unwrap_or_default();

    let mut column = Column::new(info.name, data_type);
    column.nullable = info.is_nullable.eq_ignore_ascii_case("YES");
    column.default = normalize::catalog_default(info.default.as_deref(), &extra, &column.data_type);
    column.auto_increment = extra.to_ascii_lowercase().contains("auto_increment");
    column.on_update = normalize::catalog_on_update(&extra);
    column.charset = info.charset.map(|c| c.to_ascii_lowercase());
    column.collation = info.collation.map(|c| c.to_ascii_lowercase());
    column.comment = info.comment.filter(|c| !c.is_empty());
    column
}

fn index_kind(part: &IndexPart) -> IndexKind {
    let index_type = part.index_type.as_deref().unwrap_or_default();
    if part.index == PRIMARY_KEY_NAME {
        IndexKind::Primary
    } else if index_type.eq_ignore_ascii_case("FULLTEXT") {
        IndexKind::Fulltext
    } else if index_type.eq_ignore_ascii_case("SPATIAL") {
        IndexKind::Spatial
    } else if part.non_unique == 0 {
        IndexKind::Unique
    } else {
        IndexKind::Plain
    }
}

/// Folds consecutive key parts into indexes. Indexes with a functional
/// key part are left out.
fn group_indexes(parts: Vec<IndexPart>) -> Vec<(String, Index)> {
    let mut grouped: Vec<(String, String, Option<Index>)> = Vec::new();
    for part in parts {
        let column = part.column.clone().map(|name| IndexColumn {
            name,
            prefix: part.sub_part.and_then(|n| u32::try_from(n).ok()),
        });

        if let Some((table, name, slot)) = grouped.last_mut() {
            if *table == part.table && *name == part.index {
                match (slot.as_mut(), column) {
                    (Some(index), Some(column)) => index.columns.push(column),
                    _ => *slot = None,
                }
                continue;
            }
        }

        let index = column.map(|column| Index {
            name: part.index.clone(),
            columns: vec![column],
            kind: index_kind(&part),
            comment: part.comment.clone().filter(|c| !c.is_empty()),
        });
        grouped.push((part.table, part.index, index));
    }
    grouped
        .into_iter()
        .filter_map(|(table, _, index)| index.map(|index| (table, index)))
        .collect()
}

/// Folds consecutive column pairs into foreign keys.
fn group_foreign_keys(parts: Vec<ForeignKeyPart>) -> Vec<(String, ForeignKey)> {
    let mut grouped: Vec<(String, ForeignKey)> = Vec::new();
    for part in parts {
        if let Some((table, fk)) = grouped.last_mut() {
            if *table == part.table && fk.name == part.constraint {
                fk.columns.push(part.column);
                fk.referenced_columns.push(part.referenced_column);
                continue;
            }
        }
        grouped.push((
            part.table,
            ForeignKey {
                name: part.constraint,
                columns: vec![part.column],
                referenced_table: part.referenced_table,
                referenced_columns: vec![part.referenced_column],
                on_delete: ForeignKeyAction::from_rule(&part.delete_rule)
                    .unwrap_or(ForeignKeyAction::NoAction),
                on_update: ForeignKeyAction::from_rule(&part.update_rule)
                    .unwrap_or(ForeignKeyAction::NoAction),
            },
        ));
    }
    grouped
}

#[cfg(test)]
mod tests {
    use declaro_core::{parse_schema, plan};

    use super::*;

    fn table_row(name: &str) -> TableInfo {
        TableInfo {
            name: name.to_string(),
            engine: Some(String::from("InnoDB")),
            collation: Some(String::from("utf8mb4_0900_ai_ci")),
            create_options: Some(String::new()),
            comment: Some(String::new()),
        }
    }

    fn column_row(table: &str, name: &str, column_type: &str, nullable: bool) -> ColumnInfo {
        ColumnInfo {
            table: table.to_string(),
            name: name.to_string(),
            column_type: column_type.to_string(),
            is_nullable: String::from(if nullable { "YES" } else { "NO" }),
            extra: Some(String::new()),
            comment: Some(String::new()),
            ..ColumnInfo::default()
        }
    }

    fn text_column(table: &str, name: &str, column_type: &str, nullable: bool) -> ColumnInfo {
        ColumnInfo {
            charset: Some(String::from("utf8mb4")),
            collation: Some(String::from("utf8mb4_0900_ai_ci")),
            ..column_row(table, name, column_type, nullable)
        }
    }

    fn key_part(table: &str, index: &str, unique: bool, column: &str) -> IndexPart {
        IndexPart {
            table: table.to_string(),
            index: index.to_string(),
            non_unique: i64::from(!unique),
            column: Some(column.to_string()),
            sub_part: None,
            index_type: Some(String::from("BTREE")),
            comment: Some(String::new()),
        }
    }

    fn shop_catalog() -> Catalog {
        let mut id = column_row("customers", "id", "int unsigned", false);
        id.extra = Some(String::from("auto_increment"));

        let mut balance = column_row("customers", "balance", "decimal(10,2)", false);
        balance.default = Some(String::from("0.00"));

        let mut created_at = column_row("customers", "created_at", "datetime", false);
        created_at.default = Some(String::from("CURRENT_TIMESTAMP"));
        created_at.extra = Some(String::from("DEFAULT_GENERATED"));

        let mut updated_at = column_row("customers", "updated_at", "timestamp(3)", true);
        updated_at.default = Some(String::from("CURRENT_TIMESTAMP(3)"));
        updated_at.extra = Some(String::from(
            "DEFAULT_GENERATED on update CURRENT_TIMESTAMP(3)",
        ));

        let mut flags = column_row("customers", "flags", "bit(3)", true);
        flags.default = Some(String::from("b'101'"));

        let mut token = column_row("customers", "token", "binary(16)", true);
        token.default = Some(String::from("uuid_to_bin(uuid())"));
        token.extra = Some(String::from("DEFAULT_GENERATED"));

        let mut status = text_column("customers", "status", "enum('new','paid')", false);
        status.default = Some(String::from("new"));

        let order_id = column_row("orders", "id", "int", false);
        let customer_id = column_row("orders", "customer_id", "int unsigned", false);

        Catalog {
            database: Some((
                String::from("shop"),
                Some(String::from("utf8mb4")),
                Some(String::from("utf8mb4_0900_ai_ci")),
            )),
            tables: vec![table_row("orders"), table_row("customers")],
            columns: vec![
                id,
                text_column("customers", "email", "varchar(255)", false),
                balance,
                created_at,
                updated_at,
                flags,
                token,
                status,
                text_column("customers", "note", "text", true),
                order_id,
                customer_id,
            ],
            indexes: vec![
                key_part("customers", "PRIMARY", true, "id"),
                key_part("customers", "uq_email", true, "email"),
                key_part("orders", "PRIMARY", true, "id"),
                key_part("orders", "fk_orders_customer", false, "customer_id"),
            ],
            foreign_keys: vec![ForeignKeyPart {
                table: String::from("orders"),
                constraint: String::from("fk_orders_customer"),
                column: String::from("customer_id"),
                referenced_table: String::from("customers"),
                referenced_column: String::from("id"),
                update_rule: String::from("NO ACTION"),
                delete_rule: String::from("CASCADE"),
            }],
        }
    }

    const SHOP: &str = "
        CREATE DATABASE shop;
        USE shop;
        CREATE TABLE customers (
            id INT(10) UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
            email VARCHAR(255) NOT NULL,
            balance DECIMAL(10,2) NOT NULL DEFAULT 0,
            created_at DATETIME NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP(3) NULL DEFAULT CURRENT_TIMESTAMP(3) ON UPDATE CURRENT_TIMESTAMP(3),
            flags BIT(3) DEFAULT b'101',
            token BINARY(16) DEFAULT (UUID_TO_BIN(UUID())),
            status ENUM('new', 'paid') NOT NULL DEFAULT 'new',
            note TEXT,
            UNIQUE KEY uq_email (email)
        ) ENGINE=InnoDB;
        CREATE TABLE orders (
            id INTEGER NOT NULL PRIMARY KEY,
            customer_id INT UNSIGNED NOT NULL,
            CONSTRAINT fk_orders_customer FOREIGN KEY (customer_id)
                REFERENCES customers (id) ON DELETE CASCADE
        );
    ";

    #[test]
    fn catalog_matches_its_declaration() {
        let desired = parse_schema(SHOP).unwrap();
        let actual = build_schema(shop_catalog());
        let alteration = plan(&desired, &actual);
        assert!(!alteration.has_changes(), "{alteration}");
    }

    #[test]
    fn tables_sorted_and_options_read() {
        let schema = build_schema(shop_catalog());
        let names: Vec<&str> = schema.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["customers", "orders"]);

        let customers = schema.table("customers").unwrap();
        assert_eq!(customers.option(OPTION_ENGINE), Some("InnoDB"));
        assert_eq!(customers.option(OPTION_CHARSET), Some("utf8mb4"));
        assert_eq!(customers.option(OPTION_COLLATE), Some("utf8mb4_0900_ai_ci"));
        assert_eq!(customers.option(OPTION_COMMENT), None);
    }

    #[test]
    fn column_details() {
        let schema = build_schema(shop_catalog());
        let customers = schema.table("customers").unwrap();

        let id = customers.column("id").unwrap();
        assert!(id.auto_increment);
        assert!(id.data_type.unsigned);
        assert!(!id.nullable);

        let updated_at = customers.column("updated_at").unwrap();
        assert_eq!(updated_at.on_update.as_deref(), Some("CURRENT_TIMESTAMP(3)"));
        assert!(updated_at.nullable);

        let note = customers.column("note").unwrap();
        assert_eq!(note.default, None);
        assert_eq!(note.comment, None);
        assert_eq!(note.charset.as_deref(), Some("utf8mb4"));
    }

    #[test]
    fn absent_database_is_empty() {
        let schema = build_schema(Catalog::default());
        assert!(schema.database.is_none());
        assert!(schema.tables.is_empty());
    }

    #[test]
    fn indexes_grouped_primary_first() {
        let mut name_part = key_part("t", "name_idx", false, "name");
        name_part.sub_part = Some(20);
        let catalog = Catalog {
            tables: vec![table_row("t")],
            columns: vec![
                column_row("t", "a", "int", false),
                column_row("t", "b", "int", false),
                text_column("t", "name", "varchar(100)", true),
            ],
            indexes: vec![
                key_part("t", "PRIMARY", true, "a"),
                key_part("t", "PRIMARY", true, "b"),
                key_part("t", "a_idx", false, "a"),
                name_part,
            ],
            ..Catalog::default()
        };
        let schema = build_schema(catalog);
        let table = schema.table("t").unwrap();
        let names: Vec<&str> = table.indexes.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["PRIMARY", "a_idx", "name_idx"]);

        let primary = table.primary_key().unwrap();
        assert_eq!(primary.columns.len(), 2);
        assert_eq!(primary.kind, IndexKind::Primary);
        assert_eq!(table.index("name_idx").unwrap().columns[0].prefix, Some(20));
    }

    #[test]
    fn fulltext_and_functional_indexes() {
        let mut fulltext = key_part("t", "ft", false, "body");
        fulltext.index_type = Some(String::from("FULLTEXT"));
        let mut functional = key_part("t", "fn_idx", false, "body");
        functional.column = None;
        let catalog = Catalog {
            tables: vec![table_row("t")],
            columns: vec![text_column("t", "body", "text", true)],
            indexes: vec![
                key_part("t", "both", false, "body"),
                functional,
                fulltext,
            ],
            ..Catalog::default()
        };
        let schema = build_schema(catalog);
        let table = schema.table("t").unwrap();
        assert_eq!(table.index("ft").unwrap().kind, IndexKind::Fulltext);
        assert!(table.index("fn_idx").is_none());
        assert!(table.index("both").is_some());
    }

    #[test]
    fn composite_foreign_key() {
        let part = |column: &str, referenced: &str| ForeignKeyPart {
            table: String::from("child"),
            constraint: String::from("child_ibfk_1"),
            column: column.to_string(),
            referenced_table: String::from("parent"),
            referenced_column: referenced.to_string(),
            update_rule: String::from("RESTRICT"),
            delete_rule: String::from("SET NULL"),
        };
        let catalog = Catalog {
            tables: vec![table_row("child")],
            foreign_keys: vec![part("a", "x"), part("b", "y")],
            ..Catalog::default()
        };
        let schema = build_schema(catalog);
        let fk = &schema.table("child").unwrap().foreign_keys[0];
        assert_eq!(fk.columns, ["a", "b"]);
        assert_eq!(fk.referenced_columns, ["x", "y"]);
        assert_eq!(fk.on_delete, ForeignKeyAction::SetNull);
        assert_eq!(fk.on_update, ForeignKeyAction::Restrict);
    }

    #[test]
    fn row_format_and_comment() {
        let info = TableInfo {
            create_options: Some(String::from("row_format=compressed KEY_BLOCK_SIZE=8")),
            comment: Some(String::from("audit log")),
            engine: Some(String::from("innodb")),
            ..table_row("log")
        };
        let table = table(info);
        assert_eq!(table.option(OPTION_ROW_FORMAT), Some("COMPRESSED"));
        assert_eq!(table.option(OPTION_COMMENT), Some("audit log"));
        assert_eq!(table.option(OPTION_ENGINE), Some("InnoDB"));
    }
}
