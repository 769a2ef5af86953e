//! Catalog queries.
//!
//! Every textual column is cast to `CHAR` and every number to `SIGNED`, so
//! the rows decode the same way on servers whose catalog reports `BLOB` or
//! unsigned columns. Each query takes the target database as its only
//! parameter.

/// The target database, if it exists.
pub const SCHEMA: &str = r"
SELECT CAST(SCHEMA_NAME AS CHAR),
       CAST(DEFAULT_CHARACTER_SET_NAME AS CHAR),
       CAST(DEFAULT_COLLATION_NAME AS CHAR)
FROM information_schema.SCHEMATA
WHERE SCHEMA_NAME = ?
";

/// Base tables with their options.
pub const TABLES: &str = r"
SELECT CAST(TABLE_NAME AS CHAR),
       CAST(ENGINE AS CHAR),
       CAST(TABLE_COLLATION AS CHAR),
       CAST(CREATE_OPTIONS AS CHAR),
       CAST(TABLE_COMMENT AS CHAR)
FROM information_schema.TABLES
WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE'
ORDER BY TABLE_NAME
";

/// Columns in ordinal order.
pub const COLUMNS: &str = r"
SELECT CAST(TABLE_NAME AS CHAR),
       CAST(COLUMN_NAME AS CHAR),
       CAST(COLUMN_TYPE AS CHAR),
       CAST(IS_NULLABLE AS CHAR),
       CAST(COLUMN_DEFAULT AS CHAR),
       CAST(EXTRA AS CHAR),
       CAST(CHARACTER_SET_NAME AS CHAR),
       CAST(COLLATION_NAME AS CHAR),
       CAST(COLUMN_COMMENT AS CHAR)
FROM information_schema.COLUMNS
WHERE TABLE_SCHEMA = ?
ORDER BY TABLE_NAME, ORDINAL_POSITION
";

/// Index key parts, grouped by index.
pub const INDEXES: &str = r"
SELECT CAST(TABLE_NAME AS CHAR),
       CAST(INDEX_NAME AS CHAR),
       CAST(NON_UNIQUE AS SIGNED),
       CAST(COLUMN_NAME AS CHAR),
       CAST(SUB_PART AS SIGNED),
       CAST(INDEX_TYPE AS CHAR),
       CAST(INDEX_COMMENT AS CHAR)
FROM information_schema.STATISTICS
WHERE TABLE_SCHEMA = ?
ORDER BY TABLE_NAME, INDEX_NAME, SEQ_IN_INDEX
";

/// Foreign key column pairs with their referential actions.
pub const FOREIGN_KEYS: &str = r"
SELECT CAST(k.TABLE_NAME AS CHAR),
       CAST(k.CONSTRAINT_NAME AS CHAR),
       CAST(k.COLUMN_NAME AS CHAR),
       CAST(k.REFERENCED_TABLE_NAME AS CHAR),
       CAST(k.REFERENCED_COLUMN_NAME AS CHAR),
       CAST(r.UPDATE_RULE AS CHAR),
       CAST(r.DELETE_RULE AS CHAR)
FROM information_schema.KEY_COLUMN_USAGE k
JOIN information_schema.REFERENTIAL_CONSTRAINTS r
  ON r.CONSTRAINT_SCHEMA = k.CONSTRAINT_SCHEMA
 AND r.TABLE_NAME = k.TABLE_NAME
 AND r.CONSTRAINT_NAME = k.CONSTRAINT_NAME
WHERE k.TABLE_SCHEMA = ? AND k.REFERENCED_TABLE_NAME IS NOT NULL
ORDER BY k.TABLE_NAME, k.CONSTRAINT_NAME, k.ORDINAL_POSITION
";

pub type SchemaRow = (String, Option<String>, Option<String>);

pub type TableRow = (
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

pub type ColumnRow = (
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

pub type IndexRow = (
    String,
    String,
    i64,
    Option<String>,
    Option<i64>,
    Option<String>,
    Option<String>,
);

pub type ForeignKeyRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    String,
);
