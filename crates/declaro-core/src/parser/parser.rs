//! DDL parser implementation.

use super::error::ParseError;
use crate::ast::{
    AlterSpec, ColumnDefinition, ColumnPosition, CreateTableStatement, ForeignKeyDefinition,
    IndexDefinition, Statement, TableElement,
};
use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};
use crate::schema::normalize;
use crate::schema::{
    Column, DataType, Database, DefaultValue, ForeignKeyAction, IndexColumn, IndexKind,
    OPTION_CHARSET, OPTION_COLLATE, OPTION_COMMENT, OPTION_ENGINE, OPTION_ROW_FORMAT,
};

/// Table options that are accepted and discarded.
const IGNORED_TABLE_OPTIONS: &[&str] = &[
    "AVG_ROW_LENGTH",
    "CHECKSUM",
    "COMPRESSION",
    "CONNECTION",
    "DELAY_KEY_WRITE",
    "ENCRYPTION",
    "ENGINE_ATTRIBUTE",
    "INSERT_METHOD",
    "KEY_BLOCK_SIZE",
    "MAX_ROWS",
    "MIN_ROWS",
    "PACK_KEYS",
    "SECONDARY_ENGINE_ATTRIBUTE",
    "STATS_AUTO_RECALC",
    "STATS_PERSISTENT",
    "STATS_SAMPLE_PAGES",
    "TABLESPACE",
];

/// DDL parser for a single statement.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    source: &'a str,
    current: Token,
    previous: Token,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given statement text.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Self {
            lexer,
            source: input,
            current,
            previous: Token::new(TokenKind::Eof, Span::new(0, 0)),
        }
    }

    /// Parses a single DDL statement. A trailing `;` is allowed.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the input is not a supported DDL statement.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let statement = match &self.current.kind {
            TokenKind::Keyword(Keyword::Create) => self.parse_create()?,
            TokenKind::Keyword(Keyword::Alter) => self.parse_alter_table()?,
            TokenKind::Keyword(Keyword::Drop) => self.parse_drop()?,
            TokenKind::Keyword(Keyword::Rename) => self.parse_rename_table()?,
            TokenKind::Keyword(Keyword::Use) => {
                self.advance();
                Statement::Use(self.expect_name()?)
            }
            _ => return Err(self.error("CREATE, ALTER, DROP, RENAME, or USE")),
        };
        self.eat(&TokenKind::Semicolon);
        if !self.current.is_eof() {
            return Err(self.error("end of statement"));
        }
        Ok(statement)
    }

    // ------------------------------------------------------------------
    // CREATE
    // ------------------------------------------------------------------

    fn parse_create(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Create)?;
        match &self.current.kind {
            TokenKind::Keyword(Keyword::Table) => self.parse_create_table(),
            TokenKind::Keyword(Keyword::Database | Keyword::Schema) => {
                self.parse_create_database()
            }
            TokenKind::Keyword(
                Keyword::Unique | Keyword::Fulltext | Keyword::Spatial | Keyword::Index,
            ) => self.parse_create_index(),
            TokenKind::Keyword(Keyword::Temporary) => Err(ParseError::unsupported(
                "temporary tables",
                self.current.span,
            )),
            TokenKind::Identifier(word) => Err(ParseError::unsupported(
                format!("CREATE {}", word.to_ascii_uppercase()),
                self.current.span,
            )),
            _ => Err(self.error("TABLE, DATABASE, or INDEX")),
        }
    }

    fn parse_create_table(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Table)?;
        let if_not_exists = self.parse_if_not_exists()?;
        let name = self.parse_table_name()?;

        if self.eat_keyword(Keyword::Like) {
            let source = self.parse_table_name()?;
            return Ok(Statement::CreateTableLike {
                name,
                source,
                if_not_exists,
            });
        }

        self.expect(&TokenKind::LeftParen)?;
        if self.eat_keyword(Keyword::Like) {
            let source = self.parse_table_name()?;
            self.expect(&TokenKind::RightParen)?;
            return Ok(Statement::CreateTableLike {
                name,
                source,
                if_not_exists,
            });
        }

        let elements = self.parse_table_elements()?;
        let options = self.parse_table_options()?;
        Ok(Statement::CreateTable(CreateTableStatement {
            name,
            if_not_exists,
            elements,
            options,
        }))
    }

    fn parse_create_database(&mut self) -> Result<Statement, ParseError> {
        self.advance();
        let if_not_exists = self.parse_if_not_exists()?;
        let mut database = Database::new(self.expect_name()?);

        while !self.at_statement_end() {
            self.eat_keyword(Keyword::Default);
            match &self.current.kind {
                TokenKind::Keyword(Keyword::Character | Keyword::Charset) => {
                    database.charset = Some(self.parse_charset_clause()?);
                }
                TokenKind::Keyword(Keyword::Collate) => {
                    self.advance();
                    self.eat(&TokenKind::Eq);
                    database.collation = Some(self.expect_name_or_string()?.to_ascii_lowercase());
                }
                TokenKind::Identifier(word) if word.eq_ignore_ascii_case("ENCRYPTION") => {
                    self.advance();
                    self.eat(&TokenKind::Eq);
                    self.expect_string()?;
                }
                _ => return Err(self.error("CHARACTER SET or COLLATE")),
            }
        }

        Ok(Statement::CreateDatabase {
            database,
            if_not_exists,
        })
    }

    fn parse_create_index(&mut self) -> Result<Statement, ParseError> {
        let kind = match &self.current.kind {
            TokenKind::Keyword(Keyword::Unique) => IndexKind::Unique,
            TokenKind::Keyword(Keyword::Fulltext) => IndexKind::Fulltext,
            TokenKind::Keyword(Keyword::Spatial) => IndexKind::Spatial,
            _ => IndexKind::Plain,
        };
        if kind != IndexKind::Plain {
            self.advance();
        }
        self.expect_keyword(Keyword::Index)?;
        let name = self.expect_name()?;
        self.skip_index_type()?;
        self.expect_keyword(Keyword::On)?;
        let table = self.parse_table_name()?;
        let columns = self.parse_key_parts()?;
        let comment = self.parse_index_options()?;
        self.skip_algorithm_and_lock()?;

        Ok(Statement::CreateIndex {
            table,
            index: IndexDefinition {
                name: Some(name),
                kind,
                columns,
                comment,
            },
        })
    }

    /// Parses a parenthesized definition list; the `(` is already consumed.
    fn parse_table_elements(&mut self) -> Result<Vec<TableElement>, ParseError> {
        let mut elements = Vec::new();
        loop {
            if let Some(element) = self.parse_table_element()? {
                elements.push(element);
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(elements)
    }

    fn parse_table_element(&mut self) -> Result<Option<TableElement>, ParseError> {
        if self.is_constraint_start() {
            return self.parse_constraint();
        }
        Ok(Some(TableElement::Column(self.parse_column_definition()?)))
    }

    fn is_constraint_start(&self) -> bool {
        matches!(
            self.current.kind,
            TokenKind::Keyword(
                Keyword::Constraint
                    | Keyword::Primary
                    | Keyword::Unique
                    | Keyword::Key
                    | Keyword::Index
                    | Keyword::Fulltext
                    | Keyword::Spatial
                    | Keyword::Foreign
                    | Keyword::Check
            )
        )
    }

    /// Parses a key, foreign key or check definition. Checks yield `None`.
    fn parse_constraint(&mut self) -> Result<Option<TableElement>, ParseError> {
        let symbol = if self.eat_keyword(Keyword::Constraint) {
            if matches!(
                self.current.kind,
                TokenKind::Keyword(
                    Keyword::Primary | Keyword::Unique | Keyword::Foreign | Keyword::Check
                )
            ) {
                None
            } else {
                Some(self.expect_name()?)
            }
        } else {
            None
        };

        let element = match &self.current.kind {
            TokenKind::Keyword(Keyword::Primary) => {
                self.advance();
                self.expect_keyword(Keyword::Key)?;
                TableElement::Index(self.parse_index_body(IndexKind::Primary, None)?)
            }
            TokenKind::Keyword(Keyword::Unique) => {
                self.advance();
                self.eat_index_or_key();
                TableElement::Index(self.parse_index_body(IndexKind::Unique, symbol)?)
            }
            TokenKind::Keyword(Keyword::Index | Keyword::Key) => {
                self.advance();
                TableElement::Index(self.parse_index_body(IndexKind::Plain, None)?)
            }
            TokenKind::Keyword(Keyword::Fulltext) => {
                self.advance();
                self.eat_index_or_key();
                TableElement::Index(self.parse_index_body(IndexKind::Fulltext, None)?)
            }
            TokenKind::Keyword(Keyword::Spatial) => {
                self.advance();
                self.eat_index_or_key();
                TableElement::Index(self.parse_index_body(IndexKind::Spatial, None)?)
            }
            TokenKind::Keyword(Keyword::Foreign) => {
                TableElement::ForeignKey(self.parse_foreign_key(symbol)?)
            }
            TokenKind::Keyword(Keyword::Check) => {
                self.skip_check()?;
                return Ok(None);
            }
            _ => return Err(self.error("PRIMARY KEY, UNIQUE, FOREIGN KEY, or CHECK")),
        };
        Ok(Some(element))
    }

    fn parse_index_body(
        &mut self,
        kind: IndexKind,
        fallback_name: Option<String>,
    ) -> Result<IndexDefinition, ParseError> {
        let written = if self.check(&TokenKind::LeftParen) || self.check_keyword(Keyword::Using) {
            None
        } else {
            Some(self.expect_name()?)
        };
        self.skip_index_type()?;
        let columns = self.parse_key_parts()?;
        let comment = self.parse_index_options()?;
        let name = match kind {
            IndexKind::Primary => None,
            _ => written.or(fallback_name),
        };
        Ok(IndexDefinition {
            name,
            kind,
            columns,
            comment,
        })
    }

    fn parse_key_parts(&mut self) -> Result<Vec<IndexColumn>, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let mut columns = Vec::new();
        loop {
            if self.check(&TokenKind::LeftParen) {
                return Err(ParseError::unsupported(
                    "functional key parts",
                    self.current.span,
                ));
            }
            let name = self.expect_name()?;
            let prefix = if self.eat(&TokenKind::LeftParen) {
                let length = self.expect_u32()?;
                self.expect(&TokenKind::RightParen)?;
                Some(length)
            } else {
                None
            };
            if self.check_keyword(Keyword::Asc) || self.check_keyword(Keyword::Desc) {
                self.advance();
            }
            columns.push(IndexColumn { name, prefix });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(columns)
    }

    /// Parses trailing index options and returns the comment, if any.
    fn parse_index_options(&mut self) -> Result<Option<String>, ParseError> {
        let mut comment = None;
        loop {
            match &self.current.kind {
                TokenKind::Keyword(Keyword::Using) => self.skip_index_type()?,
                TokenKind::Keyword(Keyword::Comment) => {
                    self.advance();
                    comment = Some(self.expect_string()?).filter(|c| !c.is_empty());
                }
                TokenKind::Keyword(Keyword::Visible | Keyword::Invisible) => self.advance(),
                TokenKind::Identifier(word) if word.eq_ignore_ascii_case("KEY_BLOCK_SIZE") => {
                    self.advance();
                    self.eat(&TokenKind::Eq);
                    self.expect_u32()?;
                }
                TokenKind::Identifier(word) if word.eq_ignore_ascii_case("WITH") => {
                    self.advance();
                    self.expect_name()?;
                    self.expect_name()?;
                }
                _ => break,
            }
        }
        Ok(comment)
    }

    fn parse_foreign_key(
        &mut self,
        constraint: Option<String>,
    ) -> Result<ForeignKeyDefinition, ParseError> {
        self.expect_keyword(Keyword::Foreign)?;
        self.expect_keyword(Keyword::Key)?;
        let index_name = if self.check(&TokenKind::LeftParen) {
            None
        } else {
            Some(self.expect_name()?)
        };
        let columns = self.parse_name_list()?;
        let reference = self.parse_references()?;
        Ok(ForeignKeyDefinition {
            constraint,
            index_name,
            columns,
            referenced_table: reference.table,
            referenced_columns: reference.columns,
            on_delete: reference.on_delete,
            on_update: reference.on_update,
        })
    }

    fn parse_references(&mut self) -> Result<Reference, ParseError> {
        self.expect_keyword(Keyword::References)?;
        let table = self.parse_table_name()?;
        let columns = self.parse_name_list()?;

        if self.eat_keyword(Keyword::Match) {
            if self.check_keyword(Keyword::Full)
                || self.check_keyword(Keyword::Partial)
                || self.check_keyword(Keyword::Simple)
            {
                self.advance();
            } else {
                return Err(self.error("FULL, PARTIAL, or SIMPLE"));
            }
        }

        let mut on_delete = ForeignKeyAction::NoAction;
        let mut on_update = ForeignKeyAction::NoAction;
        while self.check_keyword(Keyword::On) {
            self.advance();
            if self.eat_keyword(Keyword::Delete) {
                on_delete = self.parse_referential_action()?;
            } else if self.eat_keyword(Keyword::Update) {
                on_update = self.parse_referential_action()?;
            } else {
                return Err(self.error("DELETE or UPDATE"));
            }
        }

        Ok(Reference {
            table,
            columns,
            on_delete,
            on_update,
        })
    }

    fn parse_referential_action(&mut self) -> Result<ForeignKeyAction, ParseError> {
        let action = match &self.current.kind {
            TokenKind::Keyword(Keyword::Restrict) => ForeignKeyAction::Restrict,
            TokenKind::Keyword(Keyword::Cascade) => ForeignKeyAction::Cascade,
            TokenKind::Keyword(Keyword::Set) => {
                self.advance();
                if self.check_keyword(Keyword::Null) {
                    ForeignKeyAction::SetNull
                } else if self.check_keyword(Keyword::Default) {
                    ForeignKeyAction::SetDefault
                } else {
                    return Err(self.error("NULL or DEFAULT"));
                }
            }
            TokenKind::Keyword(Keyword::No) => {
                self.advance();
                if !self.check_keyword(Keyword::Action) {
                    return Err(self.error("ACTION"));
                }
                ForeignKeyAction::NoAction
            }
            _ => return Err(self.error("RESTRICT, CASCADE, SET NULL, SET DEFAULT, or NO ACTION")),
        };
        self.advance();
        Ok(action)
    }

    // ------------------------------------------------------------------
    // Columns
    // ------------------------------------------------------------------

    fn parse_column_definition(&mut self) -> Result<ColumnDefinition, ParseError> {
        let name = self.expect_name()?;
        let (data_type, serial) = self.parse_data_type()?;
        let mut definition = ColumnDefinition {
            column: Column::new(name, data_type),
            primary_key: false,
            unique: serial,
        };
        if serial {
            definition.column.nullable = false;
            definition.column.auto_increment = true;
        }
        self.parse_column_attributes(&mut definition)?;
        Ok(definition)
    }

    /// Parses a column type. Returns the canonical type and whether it was
    /// written as `SERIAL`.
    fn parse_data_type(&mut self) -> Result<(DataType, bool), ParseError> {
        let start = self.current.span;
        let first = match &self.current.kind {
            TokenKind::Identifier(word) => word.to_ascii_lowercase(),
            TokenKind::Keyword(
                kw @ (Keyword::Set | Keyword::Character | Keyword::Binary | Keyword::National),
            ) => kw.as_str().to_ascii_lowercase(),
            _ => return Err(self.error("data type")),
        };
        self.advance();

        let mut name = first;
        match name.as_str() {
            "serial" => {
                let mut ty = DataType::simple("bigint");
                ty.unsigned = true;
                return Ok((ty, true));
            }
            "double" => {
                if self.eat_keyword(Keyword::Precision) {
                    name.push_str(" precision");
                }
            }
            "char" | "character" => {
                if self.eat_keyword(Keyword::Varying) {
                    name.push_str(" varying");
                }
            }
            "nchar" => {
                if self.eat_keyword(Keyword::Varying) {
                    name.push_str(" varying");
                } else if self.check_word("varchar") {
                    self.advance();
                    name.push_str(" varchar");
                }
            }
            "national" => {
                let next = self.expect_name()?.to_ascii_lowercase();
                name = format!("national {next}");
                if (next == "char" || next == "character") && self.eat_keyword(Keyword::Varying) {
                    name.push_str(" varying");
                }
            }
            "long" => {
                if self.check_word("varchar") || self.check_word("varbinary") {
                    name = format!("long {}", self.expect_name()?.to_ascii_lowercase());
                }
            }
            _ => {}
        }

        let mut args = Vec::new();
        if self.eat(&TokenKind::LeftParen) {
            loop {
                match &self.current.kind {
                    TokenKind::Number(n) => args.push(n.clone()),
                    TokenKind::String(s) => args.push(normalize::quote_member(s)),
                    _ => return Err(self.error("type argument")),
                }
                self.advance();
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RightParen)?;
        }

        let mut unsigned = false;
        let mut zerofill = false;
        loop {
            if self.eat_keyword(Keyword::Unsigned) {
                unsigned = true;
            } else if self.eat_keyword(Keyword::Zerofill) {
                zerofill = true;
            } else if !self.eat_keyword(Keyword::Signed) {
                break;
            }
        }

        let ty = normalize::data_type(&name, &args, unsigned, zerofill)
            .map_err(|message| ParseError::new(message, start.merge(self.previous.span)))?;
        Ok((ty, false))
    }

    fn parse_column_attributes(
        &mut self,
        definition: &mut ColumnDefinition,
    ) -> Result<(), ParseError> {
        loop {
            match &self.current.kind {
                TokenKind::Keyword(Keyword::Not) => {
                    self.advance();
                    self.expect_keyword(Keyword::Null)?;
                    definition.column.nullable = false;
                }
                TokenKind::Keyword(Keyword::Null) => {
                    self.advance();
                    definition.column.nullable = true;
                }
                TokenKind::Keyword(Keyword::Default) => {
                    self.advance();
                    let ty = definition.column.data_type.clone();
                    definition.column.default = self.parse_default(&ty)?;
                }
                TokenKind::Keyword(Keyword::AutoIncrement) => {
                    self.advance();
                    definition.column.auto_increment = true;
                }
                TokenKind::Keyword(Keyword::Unique) => {
                    self.advance();
                    self.eat_keyword(Keyword::Key);
                    definition.unique = true;
                }
                TokenKind::Keyword(Keyword::Primary) => {
                    self.advance();
                    self.expect_keyword(Keyword::Key)?;
                    definition.primary_key = true;
                }
                TokenKind::Keyword(Keyword::Key) => {
                    self.advance();
                    definition.primary_key = true;
                }
                TokenKind::Keyword(Keyword::Comment) => {
                    self.advance();
                    definition.column.comment = Some(self.expect_string()?).filter(|c| !c.is_empty());
                }
                TokenKind::Keyword(Keyword::Collate) => {
                    self.advance();
                    definition.column.collation =
                        Some(self.expect_name_or_string()?.to_ascii_lowercase());
                }
                TokenKind::Keyword(Keyword::Character | Keyword::Charset) => {
                    definition.column.charset = Some(self.parse_charset_clause()?);
                }
                TokenKind::Keyword(Keyword::On) => {
                    self.advance();
                    self.expect_keyword(Keyword::Update)?;
                    let span = self.current.span;
                    let text = self.capture_call()?;
                    definition.column.on_update =
                        Some(normalize::current_timestamp(&text).ok_or_else(|| {
                            ParseError::unsupported(format!("ON UPDATE {text}"), span)
                        })?);
                }
                TokenKind::Keyword(Keyword::References) => {
                    // Inline references are accepted and ignored, as MySQL does.
                    self.parse_references()?;
                }
                TokenKind::Keyword(Keyword::Constraint) => {
                    self.advance();
                    if !self.check_keyword(Keyword::Check) {
                        self.expect_name()?;
                    }
                    self.skip_check()?;
                }
                TokenKind::Keyword(Keyword::Check) => self.skip_check()?,
                TokenKind::Keyword(Keyword::Generated | Keyword::As) => {
                    return Err(ParseError::unsupported(
                        "generated columns",
                        self.current.span,
                    ));
                }
                TokenKind::Keyword(Keyword::Visible | Keyword::Invisible) => self.advance(),
                TokenKind::Identifier(word)
                    if ["COLUMN_FORMAT", "STORAGE", "SRID"]
                        .iter()
                        .any(|w| word.eq_ignore_ascii_case(w)) =>
                {
                    self.advance();
                    self.advance();
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Parses the value after `DEFAULT`. `DEFAULT NULL` yields `None`.
    fn parse_default(&mut self, ty: &DataType) -> Result<Option<DefaultValue>, ParseError> {
        let token = self.current.clone();
        let negative = token.kind == TokenKind::Minus;
        let value = match token.kind {
            TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                return Ok(None);
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                normalize::literal("1", ty)
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                normalize::literal("0", ty)
            }
            TokenKind::String(s) => {
                self.advance();
                normalize::literal(&s, ty)
            }
            TokenKind::Number(n) => {
                self.advance();
                normalize::literal(&n, ty)
            }
            TokenKind::Minus | TokenKind::Plus => {
                self.advance();
                let n = self.expect_number()?;
                let signed = if negative {
                    format!("-{n}")
                } else {
                    n
                };
                normalize::literal(&signed, ty)
            }
            TokenKind::HexString(digits) => {
                self.advance();
                normalize::hex_literal(&digits, ty)
                    .map_err(|message| ParseError::new(message, token.span))?
            }
            TokenKind::BitString(digits) => {
                self.advance();
                normalize::literal(&format!("b'{digits}'"), ty)
            }
            TokenKind::LeftParen => normalize::expression(&self.capture_parenthesized()?),
            TokenKind::Identifier(word) if word.starts_with('_') => {
                // Charset introducer, e.g. _utf8mb4'abc'.
                self.advance();
                normalize::literal(&self.expect_string()?, ty)
            }
            TokenKind::Identifier(_) | TokenKind::Keyword(_) => {
                let text = self.capture_call()?;
                let ts = normalize::current_timestamp(&text).ok_or_else(|| {
                    ParseError::unsupported(format!("default value {text}"), token.span)
                })?;
                DefaultValue::Expression(ts)
            }
            _ => return Err(self.error("default value")),
        };
        Ok(Some(value))
    }

    // ------------------------------------------------------------------
    // ALTER TABLE
    // ------------------------------------------------------------------

    fn parse_alter_table(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Alter)?;
        if self.check_keyword(Keyword::Database) || self.check_keyword(Keyword::Schema) {
            return Err(ParseError::unsupported("ALTER DATABASE", self.current.span));
        }
        while self.check_word("ONLINE") || self.check_word("IGNORE") {
            self.advance();
        }
        self.expect_keyword(Keyword::Table)?;
        let name = self.parse_table_name()?;

        let mut specs = Vec::new();
        loop {
            self.parse_alter_spec(&mut specs)?;
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(Statement::AlterTable { name, specs })
    }

    fn parse_alter_spec(&mut self, specs: &mut Vec<AlterSpec>) -> Result<(), ParseError> {
        let spec = match &self.current.kind {
            TokenKind::Keyword(Keyword::Add) => {
                self.advance();
                return self.parse_alter_add(specs);
            }
            TokenKind::Keyword(Keyword::Drop) => {
                self.advance();
                self.parse_alter_drop()?
            }
            TokenKind::Keyword(Keyword::Modify) => {
                self.advance();
                self.eat_keyword(Keyword::Column);
                let column = self.parse_column_definition()?;
                let position = self.parse_column_position()?;
                AlterSpec::ModifyColumn { column, position }
            }
            TokenKind::Keyword(Keyword::Change) => {
                self.advance();
                self.eat_keyword(Keyword::Column);
                let old_name = self.expect_name()?;
                let column = self.parse_column_definition()?;
                let position = self.parse_column_position()?;
                AlterSpec::ChangeColumn {
                    old_name,
                    column,
                    position,
                }
            }
            TokenKind::Keyword(Keyword::Alter) => {
                self.advance();
                self.eat_keyword(Keyword::Column);
                self.parse_alter_column()?
            }
            TokenKind::Keyword(Keyword::Rename) => {
                self.advance();
                self.parse_alter_rename()?
            }
            TokenKind::Identifier(word)
                if word.eq_ignore_ascii_case("ALGORITHM") || word.eq_ignore_ascii_case("LOCK") =>
            {
                self.skip_algorithm_and_lock()?;
                return Ok(());
            }
            TokenKind::Identifier(word) if word.eq_ignore_ascii_case("FORCE") => {
                self.advance();
                return Ok(());
            }
            TokenKind::Identifier(word) if word.eq_ignore_ascii_case("CONVERT") => {
                return Err(ParseError::unsupported(
                    "CONVERT TO CHARACTER SET",
                    self.current.span,
                ));
            }
            _ if self.is_table_option_start() => {
                let mut options = Vec::new();
                while self.is_table_option_start() {
                    if let Some(option) = self.parse_table_option()? {
                        options.push(option);
                    }
                }
                AlterSpec::Options(options)
            }
            _ => return Err(self.error("alter specification")),
        };
        specs.push(spec);
        Ok(())
    }

    fn parse_alter_add(&mut self, specs: &mut Vec<AlterSpec>) -> Result<(), ParseError> {
        let explicit_column = self.eat_keyword(Keyword::Column);
        if !explicit_column && self.is_constraint_start() {
            match self.parse_constraint()? {
                Some(TableElement::Index(index)) => specs.push(AlterSpec::AddIndex(index)),
                Some(TableElement::ForeignKey(fk)) => specs.push(AlterSpec::AddForeignKey(fk)),
                Some(TableElement::Column(column)) => specs.push(AlterSpec::AddColumn {
                    column,
                    position: None,
                }),
                None => {}
            }
            return Ok(());
        }

        if self.eat(&TokenKind::LeftParen) {
            loop {
                let column = self.parse_column_definition()?;
                specs.push(AlterSpec::AddColumn {
                    column,
                    position: None,
                });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RightParen)?;
            return Ok(());
        }

        let column = self.parse_column_definition()?;
        let position = self.parse_column_position()?;
        specs.push(AlterSpec::AddColumn { column, position });
        Ok(())
    }

    fn parse_alter_drop(&mut self) -> Result<AlterSpec, ParseError> {
        let spec = match &self.current.kind {
            TokenKind::Keyword(Keyword::Primary) => {
                self.advance();
                self.expect_keyword(Keyword::Key)?;
                AlterSpec::DropPrimaryKey
            }
            TokenKind::Keyword(Keyword::Index | Keyword::Key) => {
                self.advance();
                AlterSpec::DropIndex(self.expect_name()?)
            }
            TokenKind::Keyword(Keyword::Foreign) => {
                self.advance();
                self.expect_keyword(Keyword::Key)?;
                AlterSpec::DropForeignKey(self.expect_name()?)
            }
            TokenKind::Keyword(Keyword::Constraint | Keyword::Check) => {
                self.advance();
                AlterSpec::DropConstraint(self.expect_name()?)
            }
            TokenKind::Keyword(Keyword::Column) => {
                self.advance();
                AlterSpec::DropColumn(self.expect_name()?)
            }
            _ => AlterSpec::DropColumn(self.expect_name()?),
        };
        Ok(spec)
    }

    fn parse_alter_column(&mut self) -> Result<AlterSpec, ParseError> {
        let column = self.expect_name()?;
        if self.eat_keyword(Keyword::Set) {
            if self.eat_keyword(Keyword::Default) {
                // The column type is unknown here; the builder renormalizes.
                let default = self
                    .parse_default(&DataType::simple("text"))?
                    .ok_or_else(|| ParseError::unsupported("SET DEFAULT NULL", self.previous.span))?;
                return Ok(AlterSpec::SetDefault { column, default });
            }
            if self.check_keyword(Keyword::Visible) || self.check_keyword(Keyword::Invisible) {
                self.advance();
                return Ok(AlterSpec::Options(Vec::new()));
            }
            return Err(self.error("DEFAULT"));
        }
        if self.eat_keyword(Keyword::Drop) {
            self.expect_keyword(Keyword::Default)?;
            return Ok(AlterSpec::DropDefault(column));
        }
        Err(self.error("SET DEFAULT or DROP DEFAULT"))
    }

    fn parse_alter_rename(&mut self) -> Result<AlterSpec, ParseError> {
        if self.eat_keyword(Keyword::Column) {
            let from = self.expect_name()?;
            self.expect_keyword(Keyword::To)?;
            let to = self.expect_name()?;
            return Ok(AlterSpec::RenameColumn { from, to });
        }
        if self.check_keyword(Keyword::Index) || self.check_keyword(Keyword::Key) {
            self.advance();
            let from = self.expect_name()?;
            self.expect_keyword(Keyword::To)?;
            let to = self.expect_name()?;
            return Ok(AlterSpec::RenameIndex { from, to });
        }
        if !self.eat_keyword(Keyword::To) {
            self.eat_keyword(Keyword::As);
        }
        Ok(AlterSpec::RenameTable(self.parse_table_name()?))
    }

    fn parse_column_position(&mut self) -> Result<Option<ColumnPosition>, ParseError> {
        if self.eat_keyword(Keyword::First) {
            return Ok(Some(ColumnPosition::First));
        }
        if self.eat_keyword(Keyword::After) {
            return Ok(Some(ColumnPosition::After(self.expect_name()?)));
        }
        Ok(None)
    }

    // ------------------------------------------------------------------
    // DROP / RENAME
    // ------------------------------------------------------------------

    fn parse_drop(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Drop)?;
        match &self.current.kind {
            TokenKind::Keyword(Keyword::Table) => {
                self.advance();
                let if_exists = if self.eat_keyword(Keyword::If) {
                    self.expect_keyword(Keyword::Exists)?;
                    true
                } else {
                    false
                };
                let mut names = vec![self.parse_table_name()?];
                while self.eat(&TokenKind::Comma) {
                    names.push(self.parse_table_name()?);
                }
                if self.check_keyword(Keyword::Restrict) || self.check_keyword(Keyword::Cascade) {
                    self.advance();
                }
                Ok(Statement::DropTable { names, if_exists })
            }
            TokenKind::Keyword(Keyword::Index) => {
                self.advance();
                let name = self.expect_name()?;
                self.expect_keyword(Keyword::On)?;
                let table = self.parse_table_name()?;
                self.skip_algorithm_and_lock()?;
                Ok(Statement::DropIndex { table, name })
            }
            TokenKind::Keyword(Keyword::Database | Keyword::Schema) => Err(
                ParseError::unsupported("dropping databases", self.current.span),
            ),
            TokenKind::Keyword(Keyword::Temporary) => Err(ParseError::unsupported(
                "temporary tables",
                self.current.span,
            )),
            _ => Err(self.error("TABLE or INDEX")),
        }
    }

    fn parse_rename_table(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Rename)?;
        self.expect_keyword(Keyword::Table)?;
        let mut pairs = Vec::new();
        loop {
            let from = self.parse_table_name()?;
            self.expect_keyword(Keyword::To)?;
            let to = self.parse_table_name()?;
            pairs.push((from, to));
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(Statement::RenameTable(pairs))
    }

    // ------------------------------------------------------------------
    // Table options
    // ------------------------------------------------------------------

    fn parse_table_options(&mut self) -> Result<Vec<(String, String)>, ParseError> {
        let mut options = Vec::new();
        while !self.at_statement_end() {
            if let Some(option) = self.parse_table_option()? {
                options.push(option);
            }
            self.eat(&TokenKind::Comma);
        }
        Ok(options)
    }

    fn is_table_option_start(&self) -> bool {
        match &self.current.kind {
            TokenKind::Keyword(
                Keyword::Engine
                | Keyword::Default
                | Keyword::Character
                | Keyword::Charset
                | Keyword::Collate
                | Keyword::Comment
                | Keyword::AutoIncrement,
            ) => true,
            TokenKind::Identifier(word) => {
                word.eq_ignore_ascii_case(OPTION_ROW_FORMAT)
                    || IGNORED_TABLE_OPTIONS
                        .iter()
                        .any(|o| word.eq_ignore_ascii_case(o))
            }
            _ => false,
        }
    }

    /// Parses one table option. Options without structural meaning yield `None`.
    fn parse_table_option(&mut self) -> Result<Option<(String, String)>, ParseError> {
        let option = match &self.current.kind {
            TokenKind::Keyword(Keyword::Engine) => {
                self.advance();
                self.eat(&TokenKind::Eq);
                let engine = self.expect_name_or_string()?;
                (OPTION_ENGINE.to_string(), normalize::engine(&engine))
            }
            TokenKind::Keyword(Keyword::Default) => {
                self.advance();
                if !matches!(
                    self.current.kind,
                    TokenKind::Keyword(Keyword::Character | Keyword::Charset | Keyword::Collate)
                ) {
                    return Err(self.error("CHARACTER SET or COLLATE"));
                }
                return self.parse_table_option();
            }
            TokenKind::Keyword(Keyword::Character | Keyword::Charset) => {
                (OPTION_CHARSET.to_string(), self.parse_charset_clause()?)
            }
            TokenKind::Keyword(Keyword::Collate) => {
                self.advance();
                self.eat(&TokenKind::Eq);
                let collation = self.expect_name_or_string()?.to_ascii_lowercase();
                (OPTION_COLLATE.to_string(), collation)
            }
            TokenKind::Keyword(Keyword::Comment) => {
                self.advance();
                self.eat(&TokenKind::Eq);
                (OPTION_COMMENT.to_string(), self.expect_string()?)
            }
            TokenKind::Keyword(Keyword::AutoIncrement) => {
                self.advance();
                self.eat(&TokenKind::Eq);
                self.expect_number()?;
                return Ok(None);
            }
            TokenKind::Identifier(word) if word.eq_ignore_ascii_case(OPTION_ROW_FORMAT) => {
                self.advance();
                self.eat(&TokenKind::Eq);
                let format = self.expect_name()?.to_ascii_uppercase();
                (OPTION_ROW_FORMAT.to_string(), format)
            }
            TokenKind::Identifier(word)
                if IGNORED_TABLE_OPTIONS
                    .iter()
                    .any(|o| word.eq_ignore_ascii_case(o)) =>
            {
                self.advance();
                self.eat(&TokenKind::Eq);
                if self.at_statement_end() {
                    return Err(self.error("option value"));
                }
                self.advance();
                return Ok(None);
            }
            TokenKind::Identifier(word) if word.eq_ignore_ascii_case("PARTITION") => {
                return Err(ParseError::unsupported("partitioning", self.current.span));
            }
            TokenKind::Keyword(Keyword::As) => {
                return Err(ParseError::unsupported(
                    "CREATE TABLE ... AS SELECT",
                    self.current.span,
                ));
            }
            _ => return Err(self.error("table option")),
        };
        Ok(Some(option))
    }

    /// Parses `CHARACTER SET [=] name` or `CHARSET [=] name`.
    fn parse_charset_clause(&mut self) -> Result<String, ParseError> {
        if self.eat_keyword(Keyword::Character) {
            self.expect_keyword(Keyword::Set)?;
        } else {
            self.expect_keyword(Keyword::Charset)?;
        }
        self.eat(&TokenKind::Eq);
        Ok(self.expect_name_or_string()?.to_ascii_lowercase())
    }

    // ------------------------------------------------------------------
    // Skipping helpers
    // ------------------------------------------------------------------

    fn skip_index_type(&mut self) -> Result<(), ParseError> {
        if self.eat_keyword(Keyword::Using) {
            self.expect_name()?;
        }
        Ok(())
    }

    fn skip_algorithm_and_lock(&mut self) -> Result<(), ParseError> {
        while self.check_word("ALGORITHM") || self.check_word("LOCK") {
            self.advance();
            self.eat(&TokenKind::Eq);
            self.expect_name()?;
        }
        Ok(())
    }

    /// Skips `CHECK (expr) [[NOT] ENFORCED]`.
    fn skip_check(&mut self) -> Result<(), ParseError> {
        self.expect_keyword(Keyword::Check)?;
        self.skip_parenthesized()?;
        self.eat_keyword(Keyword::Not);
        self.eat_keyword(Keyword::Enforced);
        Ok(())
    }

    /// Skips a balanced parenthesized group and returns its span.
    fn skip_parenthesized(&mut self) -> Result<Span, ParseError> {
        let start = self.current.span;
        self.expect(&TokenKind::LeftParen)?;
        let mut depth = 1usize;
        while depth > 0 {
            match &self.current.kind {
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen => depth -= 1,
                TokenKind::Eof | TokenKind::Error(_) => return Err(self.error("')'")),
                _ => {}
            }
            self.advance();
        }
        Ok(start.merge(self.previous.span))
    }

    fn capture_parenthesized(&mut self) -> Result<String, ParseError> {
        let span = self.skip_parenthesized()?;
        Ok(self.source[span.start..span.end].to_string())
    }

    /// Captures a bare word optionally followed by an argument list, e.g.
    /// `CURRENT_TIMESTAMP(3)` or `NOW()`.
    fn capture_call(&mut self) -> Result<String, ParseError> {
        let start = self.current.span;
        if !matches!(
            self.current.kind,
            TokenKind::Identifier(_) | TokenKind::Keyword(_)
        ) {
            return Err(self.error("expression"));
        }
        self.advance();
        let end = if self.check(&TokenKind::LeftParen) {
            self.skip_parenthesized()?
        } else {
            start
        };
        Ok(self.source[start.start..end.end].to_string())
    }

    // ------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------

    fn parse_if_not_exists(&mut self) -> Result<bool, ParseError> {
        if self.eat_keyword(Keyword::If) {
            self.expect_keyword(Keyword::Not)?;
            self.expect_keyword(Keyword::Exists)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Parses `[db.]table`, returning the table name.
    fn parse_table_name(&mut self) -> Result<String, ParseError> {
        let name = self.expect_name()?;
        if self.eat(&TokenKind::Dot) {
            return self.expect_name();
        }
        Ok(name)
    }

    /// Parses `(name, name, ...)`.
    fn parse_name_list(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let mut names = vec![self.expect_name()?];
        while self.eat(&TokenKind::Comma) {
            names.push(self.expect_name()?);
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(names)
    }

    fn eat_index_or_key(&mut self) {
        if self.check_keyword(Keyword::Index) || self.check_keyword(Keyword::Key) {
            self.advance();
        }
    }

    fn at_statement_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Eof | TokenKind::Semicolon)
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        self.previous = std::mem::replace(&mut self.current, self.lexer.next_token());
    }

    /// Checks if the current token matches the given kind.
    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    /// Checks if the current token is the given keyword.
    fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(&self.current.kind, TokenKind::Keyword(kw) if *kw == keyword)
    }

    /// Checks if the current token is a bare word (case-insensitive).
    fn check_word(&self, word: &str) -> bool {
        matches!(&self.current.kind, TokenKind::Identifier(w) if w.eq_ignore_ascii_case(word))
    }

    /// Consumes the current token if it matches the given kind.
    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            return true;
        }
        false
    }

    /// Consumes the current token if it is the given keyword.
    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            return true;
        }
        false
    }

    /// Expects the current token to be the given kind.
    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(&format!("{kind:?}")))
        }
    }

    /// Expects the current token to be the given keyword.
    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), ParseError> {
        if self.check_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(keyword.as_str()))
        }
    }

    /// Expects a name: an identifier, or a keyword used as one.
    fn expect_name(&mut self) -> Result<String, ParseError> {
        let name = match &self.current.kind {
            TokenKind::Identifier(name) => name.clone(),
            TokenKind::Keyword(_) => {
                self.source[self.current.span.start..self.current.span.end].to_string()
            }
            _ => return Err(self.error("identifier")),
        };
        self.advance();
        Ok(name)
    }

    fn expect_name_or_string(&mut self) -> Result<String, ParseError> {
        if let TokenKind::String(value) = &self.current.kind {
            let value = value.clone();
            self.advance();
            return Ok(value);
        }
        self.expect_name()
    }

    fn expect_string(&mut self) -> Result<String, ParseError> {
        match &self.current.kind {
            TokenKind::String(value) => {
                let value = value.clone();
                self.advance();
                Ok(value)
            }
            _ => Err(self.error("string literal")),
        }
    }

    fn expect_number(&mut self) -> Result<String, ParseError> {
        match &self.current.kind {
            TokenKind::Number(value) => {
                let value = value.clone();
                self.advance();
                Ok(value)
            }
            _ => Err(self.error("number")),
        }
    }

    fn expect_u32(&mut self) -> Result<u32, ParseError> {
        let span = self.current.span;
        let text = self.expect_number()?;
        text.parse()
            .map_err(|_| ParseError::new(format!("Invalid length '{text}'"), span))
    }

    /// Builds an error for the current token.
    fn error(&self, expected: &str) -> ParseError {
        if self.current.is_eof() {
            ParseError::unexpected_eof(expected, self.current.span)
        } else {
            ParseError::unexpected(expected, self.current.kind.clone(), self.current.span)
        }
    }
}

/// The target of a `REFERENCES` clause.
struct Reference {
    table: String,
    columns: Vec<String>,
    on_delete: ForeignKeyAction,
    on_update: ForeignKeyAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str) -> Result<Statement, ParseError> {
        Parser::new(sql).parse_statement()
    }

    fn create_table(sql: &str) -> CreateTableStatement {
        match parse(sql).unwrap() {
            Statement::CreateTable(create) => create,
            other => panic!("Expected CREATE TABLE, got {other:?}"),
        }
    }

    fn column(element: &TableElement) -> &ColumnDefinition {
        match element {
            TableElement::Column(c) => c,
            other => panic!("Expected column, got {other:?}"),
        }
    }

    #[test]
    fn test_create_table_columns_and_keys() {
        let create = create_table(
            "CREATE TABLE IF NOT EXISTS `users` (
                id INT UNSIGNED NOT NULL AUTO_INCREMENT,
                email VARCHAR(255) NOT NULL,
                PRIMARY KEY (id),
                UNIQUE KEY uq_email (email(100))
            ) ENGINE=innodb DEFAULT CHARSET=UTF8MB4",
        );
        assert!(create.if_not_exists);
        assert_eq!(create.name, "users");
        assert_eq!(create.elements.len(), 4);

        let id = column(&create.elements[0]);
        assert_eq!(id.column.data_type.to_string(), "int unsigned");
        assert!(!id.column.nullable);
        assert!(id.column.auto_increment);

        assert!(matches!(
            &create.elements[3],
            TableElement::Index(i) if i.name.as_deref() == Some("uq_email")
                && i.kind == IndexKind::Unique
                && i.columns[0].prefix == Some(100)
        ));
        assert_eq!(
            create.options,
            vec![
                (String::from("ENGINE"), String::from("InnoDB")),
                (String::from("DEFAULT CHARSET"), String::from("utf8mb4")),
            ]
        );
    }

    #[test]
    fn test_type_synonyms_and_defaults() {
        let create = create_table(
            "CREATE TABLE t (
                a INTEGER(11) DEFAULT '007',
                b BOOLEAN DEFAULT TRUE,
                c DECIMAL(10,2) DEFAULT 1,
                d CHARACTER VARYING(20) DEFAULT \"x\",
                e TIMESTAMP DEFAULT NOW() ON UPDATE CURRENT_TIMESTAMP,
                f DOUBLE PRECISION DEFAULT -1.50,
                g ENUM('a','b') DEFAULT 'a',
                h JSON DEFAULT (JSON_ARRAY())
            )",
        );
        let col = |i: usize| column(&create.elements[i]).column.clone();

        assert_eq!(col(0).data_type.to_string(), "int");
        assert_eq!(col(0).default, Some(DefaultValue::Literal(String::from("7"))));
        assert_eq!(col(1).data_type.to_string(), "tinyint");
        assert_eq!(col(1).default, Some(DefaultValue::Literal(String::from("1"))));
        assert_eq!(col(2).default, Some(DefaultValue::Literal(String::from("1.00"))));
        assert_eq!(col(3).data_type.to_string(), "varchar(20)");
        assert_eq!(
            col(4).default,
            Some(DefaultValue::Expression(String::from("CURRENT_TIMESTAMP")))
        );
        assert_eq!(col(4).on_update.as_deref(), Some("CURRENT_TIMESTAMP"));
        assert_eq!(col(5).data_type.to_string(), "double");
        assert_eq!(col(5).default, Some(DefaultValue::Literal(String::from("-1.5"))));
        assert_eq!(col(6).data_type.to_string(), "enum('a','b')");
        assert_eq!(
            col(7).default,
            Some(DefaultValue::Expression(String::from("json_array()")))
        );
    }

    #[test]
    fn test_default_null_is_no_default() {
        let create = create_table("CREATE TABLE t (a INT NULL DEFAULT NULL)");
        let a = column(&create.elements[0]);
        assert!(a.column.nullable);
        assert_eq!(a.column.default, None);
    }

    #[test]
    fn test_keywords_as_column_names() {
        let create = create_table("CREATE TABLE t (comment TEXT, `key` INT, date DATE)");
        assert_eq!(column(&create.elements[0]).column.name, "comment");
        assert_eq!(column(&create.elements[1]).column.name, "key");
        assert_eq!(column(&create.elements[2]).column.name, "date");
    }

    #[test]
    fn test_foreign_key_definition() {
        let create = create_table(
            "CREATE TABLE child (
                parent_id INT,
                CONSTRAINT fk_parent FOREIGN KEY (parent_id) REFERENCES db.parent (id)
                    ON UPDATE CASCADE ON DELETE SET NULL
            )",
        );
        assert!(matches!(
            &create.elements[1],
            TableElement::ForeignKey(fk) if fk.constraint.as_deref() == Some("fk_parent")
                && fk.referenced_table == "parent"
                && fk.referenced_columns == vec![String::from("id")]
                && fk.on_delete == ForeignKeyAction::SetNull
                && fk.on_update == ForeignKeyAction::Cascade
        ));
    }

    #[test]
    fn test_check_constraints_are_skipped() {
        let create = create_table(
            "CREATE TABLE t (a INT CHECK (a > 0), CONSTRAINT c1 CHECK (a < 10) NOT ENFORCED)",
        );
        assert_eq!(create.elements.len(), 1);
    }

    #[test]
    fn test_serial_column() {
        let create = create_table("CREATE TABLE t (id SERIAL)");
        let id = column(&create.elements[0]);
        assert_eq!(id.column.data_type.to_string(), "bigint unsigned");
        assert!(id.unique);
        assert!(id.column.auto_increment);
        assert!(!id.column.nullable);
    }

    #[test]
    fn test_alter_table_specs() {
        let stmt = parse(
            "ALTER TABLE t ADD COLUMN b INT AFTER a, DROP COLUMN c, DROP INDEX idx, \
             MODIFY d BIGINT FIRST, ADD INDEX (b), DROP FOREIGN KEY fk, ENGINE=MyISAM",
        )
        .unwrap();
        let Statement::AlterTable { name, specs } = stmt else {
            panic!("Expected ALTER TABLE");
        };
        assert_eq!(name, "t");
        assert_eq!(specs.len(), 7);
        assert!(matches!(
            &specs[0],
            AlterSpec::AddColumn { position: Some(ColumnPosition::After(a)), .. } if a == "a"
        ));
        assert!(matches!(&specs[1], AlterSpec::DropColumn(c) if c == "c"));
        assert!(matches!(&specs[2], AlterSpec::DropIndex(i) if i == "idx"));
        assert!(matches!(
            &specs[3],
            AlterSpec::ModifyColumn { position: Some(ColumnPosition::First), .. }
        ));
        assert!(matches!(&specs[4], AlterSpec::AddIndex(i) if i.name.is_none()));
        assert!(matches!(&specs[5], AlterSpec::DropForeignKey(f) if f == "fk"));
        assert!(matches!(&specs[6], AlterSpec::Options(o) if o[0].1 == "MyISAM"));
    }

    #[test]
    fn test_other_statements() {
        assert!(matches!(
            parse("CREATE UNIQUE INDEX ix ON t (a, b DESC)").unwrap(),
            Statement::CreateIndex { table, index } if table == "t" && index.kind == IndexKind::Unique
        ));
        assert!(matches!(
            parse("DROP INDEX ix ON t").unwrap(),
            Statement::DropIndex { table, name } if table == "t" && name == "ix"
        ));
        assert!(matches!(
            parse("DROP TABLE IF EXISTS a, b").unwrap(),
            Statement::DropTable { names, if_exists: true } if names.len() == 2
        ));
        assert!(matches!(
            parse("RENAME TABLE a TO b, c TO d").unwrap(),
            Statement::RenameTable(pairs) if pairs.len() == 2
        ));
        assert!(matches!(
            parse("CREATE DATABASE IF NOT EXISTS app DEFAULT CHARACTER SET utf8mb4").unwrap(),
            Statement::CreateDatabase { database, if_not_exists: true }
                if database.name == "app" && database.charset.as_deref() == Some("utf8mb4")
        ));
        assert!(matches!(parse("USE app;").unwrap(), Statement::Use(db) if db == "app"));
        assert!(matches!(
            parse("CREATE TABLE b LIKE a").unwrap(),
            Statement::CreateTableLike { name, source, .. } if name == "b" && source == "a"
        ));
    }

    #[test]
    fn test_rejects_unsupported_statements() {
        assert!(parse("INSERT INTO t VALUES (1)").is_err());
        assert!(parse("CREATE VIEW v AS SELECT 1").is_err());
        assert!(parse("CREATE TABLE t (a INT) PARTITION BY HASH(a)").is_err());
        assert!(parse("CREATE TABLE t (a INT AS (1))").is_err());
        assert!(parse("DROP DATABASE app").is_err());
    }

    #[test]
    fn test_error_reports_position() {
        let err = parse("CREATE TABLE t (a NOPE)").unwrap_err();
        assert_eq!(err.span, Span::new(18, 22));
        assert!(err.message.contains("nope"));

        let err = parse("CREATE TABLE t (a INT").unwrap_err();
        assert_eq!(err.found, Some(TokenKind::Eof));
    }
}
