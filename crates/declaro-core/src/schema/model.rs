//! Canonical structural model shared by the parser and the introspector.
//!
//! Values in this module are already normalized: two models describing
//! the same MySQL structure compare equal under the differ's rules no
//! matter which side produced them.

use std::collections::BTreeMap;
use std::fmt;

/// Table option key for the storage engine.
pub const OPTION_ENGINE: &str = "ENGINE";
/// Table option key for the default character set.
pub const OPTION_CHARSET: &str = "DEFAULT CHARSET";
/// Table option key for the default collation.
pub const OPTION_COLLATE: &str = "COLLATE";
/// Table option key for the row format.
pub const OPTION_ROW_FORMAT: &str = "ROW_FORMAT";
/// Table option key for the table comment.
pub const OPTION_COMMENT: &str = "COMMENT";

/// Rendering order of table options.
pub const OPTION_ORDER: [&str; 5] = [
    OPTION_ENGINE,
    OPTION_CHARSET,
    OPTION_COLLATE,
    OPTION_ROW_FORMAT,
    OPTION_COMMENT,
];

/// The target database (schema namespace) itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    /// Database name.
    pub name: String,
    /// Default character set, lowercase.
    pub charset: Option<String>,
    /// Default collation, lowercase.
    pub collation: Option<String>,
}

impl Database {
    /// Creates a database entry with server-default character set and collation.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            charset: None,
            collation: None,
        }
    }
}

/// A whole database structure: an ordered collection of uniquely named tables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    /// The database, when declared (parser) or present (introspector).
    pub database: Option<Database>,
    /// Tables in declaration order.
    pub tables: Vec<Table>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the schema has neither a database nor tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.database.is_none() && self.tables.is_empty()
    }

    /// Looks up a table by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Looks up a table by name for mutation.
    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.name == name)
    }

    /// Returns the position of a table in declaration order.
    #[must_use]
    pub fn table_position(&self, name: &str) -> Option<usize> {
        self.tables.iter().position(|t| t.name == name)
    }

    /// Adds a table, returning it back if the name is already taken.
    ///
    /// # Errors
    ///
    /// Returns the rejected table when a table with the same name exists.
    pub fn add_table(&mut self, table: Table) -> Result<(), Table> {
        if self.table(&table.name).is_some() {
            return Err(table);
        }
        self.tables.push(table);
        Ok(())
    }

    /// Removes a table by name.
    pub fn remove_table(&mut self, name: &str) -> Option<Table> {
        let pos = self.table_position(name)?;
        Some(self.tables.remove(pos))
    }

    /// Sorts tables by name, for sources without a declaration order.
    pub fn sort_tables(&mut self) {
        self.tables.sort_by(|a, b| a.name.cmp(&b.name));
    }
}

/// A table: ordered columns, named indexes and foreign keys, and options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<Column>,
    /// Indexes, including the primary key (named `PRIMARY`).
    pub indexes: Vec<Index>,
    /// Foreign key constraints.
    pub foreign_keys: Vec<ForeignKey>,
    /// Table options keyed by the `OPTION_*` constants.
    pub options: BTreeMap<String, String>,
}

impl Table {
    /// Creates an empty table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            options: BTreeMap::new(),
        }
    }

    /// Looks up a column by name (case-insensitive, as MySQL does).
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Looks up a column by name for mutation.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Returns the position of a column.
    #[must_use]
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Looks up an index by name (case-insensitive).
    #[must_use]
    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes
            .iter()
            .find(|i| i.name.eq_ignore_ascii_case(name))
    }

    /// Returns the primary key, if any.
    #[must_use]
    pub fn primary_key(&self) -> Option<&Index> {
        self.indexes.iter().find(|i| i.kind == IndexKind::Primary)
    }

    /// Looks up a foreign key by constraint name (case-insensitive).
    #[must_use]
    pub fn foreign_key(&self, name: &str) -> Option<&ForeignKey> {
        self.foreign_keys
            .iter()
            .find(|fk| fk.name.eq_ignore_ascii_case(name))
    }

    /// Returns a table option value.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }
}

/// A canonical column type: lowercase base name, rendered arguments and
/// numeric attributes. `int(11)` and `INTEGER` both become `int`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataType {
    /// Lowercase base type name, e.g. `varchar`.
    pub name: String,
    /// Arguments as rendered inside the parentheses, e.g. `10,2`.
    pub args: Option<String>,
    /// UNSIGNED attribute.
    pub unsigned: bool,
    /// ZEROFILL attribute.
    pub zerofill: bool,
}

impl DataType {
    /// Creates a type without arguments.
    #[must_use]
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: None,
            unsigned: false,
            zerofill: false,
        }
    }

    /// Creates a type with arguments.
    #[must_use]
    pub fn with_args(name: impl Into<String>, args: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Some(args.into()),
            unsigned: false,
            zerofill: false,
        }
    }

    /// Returns the scale of a `decimal(p,s)` type.
    #[must_use]
    pub fn decimal_scale(&self) -> Option<usize> {
        if self.name != "decimal" {
            return None;
        }
        self.args
            .as_deref()
            .and_then(|a| a.split(',').nth(1))
            .and_then(|s| s.trim().parse().ok())
    }

    /// Returns true for integer types.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(
            self.name.as_str(),
            "tinyint" | "smallint" | "mediumint" | "int" | "bigint"
        )
    }

    /// Returns true for numeric types, bit excluded.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || matches!(self.name.as_str(), "decimal" | "float" | "double")
    }

    /// Returns true for types that carry a character set.
    #[must_use]
    pub fn is_textual(&self) -> bool {
        matches!(
            self.name.as_str(),
            "char"
                | "varchar"
                | "tinytext"
                | "text"
                | "mediumtext"
                | "longtext"
                | "enum"
                | "set"
        )
    }

    /// Returns true for the date and time types.
    #[must_use]
    pub fn is_temporal(&self) -> bool {
        matches!(self.name.as_str(), "datetime" | "timestamp")
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(args) = &self.args {
            write!(f, "({args})")?;
        }
        if self.unsigned {
            f.write_str(" unsigned")?;
        }
        if self.zerofill {
            f.write_str(" zerofill")?;
        }
        Ok(())
    }
}

/// A normalized column default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    /// A constant, stored unquoted (`abc`, `0`, `1.50`, `b'101'`).
    Literal(String),
    /// An expression (`CURRENT_TIMESTAMP`, `(uuid())`), stored without outer parentheses.
    Expression(String),
}

/// A table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Canonical type.
    pub data_type: DataType,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Default value; `None` means no default (or `DEFAULT NULL`).
    pub default: Option<DefaultValue>,
    /// AUTO_INCREMENT flag.
    pub auto_increment: bool,
    /// Character set, lowercase.
    pub charset: Option<String>,
    /// Collation, lowercase.
    pub collation: Option<String>,
    /// `ON UPDATE` expression, e.g. `CURRENT_TIMESTAMP`.
    pub on_update: Option<String>,
    /// Column comment.
    pub comment: Option<String>,
}

impl Column {
    /// Creates a nullable column without default or attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            default: None,
            auto_increment: false,
            charset: None,
            collation: None,
            on_update: None,
            comment: None,
        }
    }
}

/// Index kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// The primary key.
    Primary,
    /// A unique index.
    Unique,
    /// A plain (non-unique) index.
    Plain,
    /// A FULLTEXT index.
    Fulltext,
    /// A SPATIAL index.
    Spatial,
}

impl IndexKind {
    /// Returns true for kinds enforcing uniqueness.
    #[must_use]
    pub const fn is_unique(self) -> bool {
        matches!(self, Self::Primary | Self::Unique)
    }
}

/// A column reference inside an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexColumn {
    /// Column name.
    pub name: String,
    /// Prefix length, e.g. `10` for `name(10)`.
    pub prefix: Option<u32>,
}

impl IndexColumn {
    /// Creates a full-column reference.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: None,
        }
    }
}

/// The name MySQL gives every primary key.
pub const PRIMARY_KEY_NAME: &str = "PRIMARY";

/// An index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    /// Index name; `PRIMARY` for the primary key.
    pub name: String,
    /// Indexed columns in order.
    pub columns: Vec<IndexColumn>,
    /// Index kind.
    pub kind: IndexKind,
    /// Index comment.
    pub comment: Option<String>,
}

impl Index {
    /// Returns true if the index enforces uniqueness.
    #[must_use]
    pub const fn is_unique(&self) -> bool {
        self.kind.is_unique()
    }

    /// Returns true if `columns` form a left prefix of this index.
    #[must_use]
    pub fn covers(&self, columns: &[String]) -> bool {
        columns.len() <= self.columns.len()
            && columns
                .iter()
                .zip(&self.columns)
                .all(|(c, ic)| ic.name.eq_ignore_ascii_case(c))
    }

    /// Returns true if the server can use this index to back a foreign key
    /// on `columns`: a primary, unique or plain index whose leading parts
    /// are those columns in full.
    #[must_use]
    pub fn supports_foreign_key(&self, columns: &[String]) -> bool {
        matches!(
            self.kind,
            IndexKind::Primary | IndexKind::Unique | IndexKind::Plain
        ) && self.covers(columns)
            && self
                .columns
                .iter()
                .take(columns.len())
                .all(|c| c.prefix.is_none())
    }

    /// Returns true if the index references the column.
    #[must_use]
    pub fn references_column(&self, column: &str) -> bool {
        self.columns
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(column))
    }
}

/// Foreign key referential action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignKeyAction {
    /// No action (the default).
    NoAction,
    /// Restrict deletion/update.
    Restrict,
    /// Cascade the operation.
    Cascade,
    /// Set to NULL.
    SetNull,
    /// Set to default value.
    SetDefault,
}

impl ForeignKeyAction {
    /// Returns the SQL representation of the action.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }

    /// Parses a catalog rule such as `SET NULL`.
    #[must_use]
    pub fn from_rule(rule: &str) -> Option<Self> {
        match rule.trim().to_ascii_uppercase().as_str() {
            "NO ACTION" => Some(Self::NoAction),
            "RESTRICT" => Some(Self::Restrict),
            "CASCADE" => Some(Self::Cascade),
            "SET NULL" => Some(Self::SetNull),
            "SET DEFAULT" => Some(Self::SetDefault),
            _ => None,
        }
    }

    /// InnoDB enforces `RESTRICT` and `NO ACTION` identically, and older
    /// servers report an omitted action as either.
    #[must_use]
    pub const fn effective(self) -> Self {
        match self {
            Self::Restrict => Self::NoAction,
            other => other,
        }
    }
}

/// A foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Constraint name.
    pub name: String,
    /// Local columns in order.
    pub columns: Vec<String>,
    /// Referenced table.
    pub referenced_table: String,
    /// Referenced columns in order.
    pub referenced_columns: Vec<String>,
    /// ON DELETE action.
    pub on_delete: ForeignKeyAction,
    /// ON UPDATE action.
    pub on_update: ForeignKeyAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_display() {
        let mut ty = DataType::with_args("decimal", "10,2");
        ty.unsigned = true;
        assert_eq!(ty.to_string(), "decimal(10,2) unsigned");
        assert_eq!(ty.decimal_scale(), Some(2));
        assert_eq!(DataType::simple("int").to_string(), "int");
    }

    #[test]
    fn schema_rejects_duplicate_tables() {
        let mut schema = Schema::new();
        assert!(schema.add_table(Table::new("a")).is_ok());
        assert!(schema.add_table(Table::new("a")).is_err());
        assert_eq!(schema.tables.len(), 1);
    }

    #[test]
    fn column_lookup_is_case_insensitive() {
        let mut table = Table::new("t");
        table.columns.push(Column::new("Id", DataType::simple("int")));
        assert!(table.column("id").is_some());
        assert_eq!(table.column_position("ID"), Some(0));
    }

    #[test]
    fn index_covers_left_prefix() {
        let index = Index {
            name: String::from("ab"),
            columns: vec![IndexColumn::new("a"), IndexColumn::new("b")],
            kind: IndexKind::Plain,
            comment: None,
        };
        assert!(index.covers(&[String::from("a")]));
        assert!(index.covers(&[String::from("a"), String::from("b")]));
        assert!(!index.covers(&[String::from("b")]));
    }

    #[test]
    fn prefix_and_fulltext_indexes_cannot_back_a_foreign_key() {
        let code = [String::from("code")];
        let mut index = Index {
            name: String::from("code_idx"),
            columns: vec![IndexColumn::new("code")],
            kind: IndexKind::Plain,
            comment: None,
        };
        assert!(index.supports_foreign_key(&code));

        index.columns[0].prefix = Some(4);
        assert!(index.covers(&code));
        assert!(!index.supports_foreign_key(&code));

        index.columns[0].prefix = None;
        index.kind = IndexKind::Fulltext;
        assert!(!index.supports_foreign_key(&code));
    }

    #[test]
    fn restrict_and_no_action_are_equivalent() {
        assert_eq!(
            ForeignKeyAction::Restrict.effective(),
            ForeignKeyAction::NoAction.effective()
        );
        assert_eq!(ForeignKeyAction::from_rule("set null"), Some(ForeignKeyAction::SetNull));
    }
}
