//! Token types for the DDL lexer.

use super::Span;

/// Keywords recognised by the DDL grammar.
///
/// Data type names are not keywords; they are lexed as identifiers and
/// resolved by the parser, so a column may be called `date` or `text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    // Statements
    Create,
    Alter,
    Drop,
    Rename,
    Use,
    Table,
    Temporary,
    Database,
    Schema,
    Like,

    // Existence guards
    If,
    Not,
    Exists,

    // Keys and constraints
    Primary,
    Key,
    Index,
    Unique,
    Fulltext,
    Spatial,
    Foreign,
    References,
    Constraint,
    Check,
    Enforced,
    Match,
    Full,
    Partial,
    Simple,

    // Referential actions
    On,
    Update,
    Delete,
    Cascade,
    Restrict,
    Set,
    No,
    Action,

    // Alter specifications
    Add,
    Column,
    Modify,
    Change,
    To,
    As,
    First,
    After,

    // Column attributes
    Default,
    Null,
    AutoIncrement,
    Unsigned,
    Zerofill,
    Signed,
    Character,
    Charset,
    Collate,
    Comment,
    National,
    Varying,
    Precision,
    Binary,
    Generated,
    Always,
    Visible,
    Invisible,

    // Index attributes
    Using,
    Asc,
    Desc,

    // Table options
    Engine,

    // Literals
    True,
    False,
}

impl Keyword {
    /// Attempts to parse a keyword from a string (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "CREATE" => Some(Self::Create),
            "ALTER" => Some(Self::Alter),
            "DROP" => Some(Self::Drop),
            "RENAME" => Some(Self::Rename),
            "USE" => Some(Self::Use),
            "TABLE" => Some(Self::Table),
            "TEMPORARY" => Some(Self::Temporary),
            "DATABASE" => Some(Self::Database),
            "SCHEMA" => Some(Self::Schema),
            "LIKE" => Some(Self::Like),
            "IF" => Some(Self::If),
            "NOT" => Some(Self::Not),
            "EXISTS" => Some(Self::Exists),
            "PRIMARY" => Some(Self::Primary),
            "KEY" => Some(Self::Key),
            "INDEX" => Some(Self::Index),
            "UNIQUE" => Some(Self::Unique),
            "FULLTEXT" => Some(Self::Fulltext),
            "SPATIAL" => Some(Self::Spatial),
            "FOREIGN" => Some(Self::Foreign),
            "REFERENCES" => Some(Self::References),
            "CONSTRAINT" => Some(Self::Constraint),
            "CHECK" => Some(Self::Check),
            "ENFORCED" => Some(Self::Enforced),
            "MATCH" => Some(Self::Match),
            "FULL" => Some(Self::Full),
            "PARTIAL" => Some(Self::Partial),
            "SIMPLE" => Some(Self::Simple),
            "ON" => Some(Self::On),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            "CASCADE" => Some(Self::Cascade),
            "RESTRICT" => Some(Self::Restrict),
            "SET" => Some(Self::Set),
            "NO" => Some(Self::No),
            "ACTION" => Some(Self::Action),
            "ADD" => Some(Self::Add),
            "COLUMN" => Some(Self::Column),
            "MODIFY" => Some(Self::Modify),
            "CHANGE" => Some(Self::Change),
            "TO" => Some(Self::To),
            "AS" => Some(Self::As),
            "FIRST" => Some(Self::First),
            "AFTER" => Some(Self::After),
            "DEFAULT" => Some(Self::Default),
            "NULL" => Some(Self::Null),
            "AUTO_INCREMENT" => Some(Self::AutoIncrement),
            "UNSIGNED" => Some(Self::Unsigned),
            "ZEROFILL" => Some(Self::Zerofill),
            "SIGNED" => Some(Self::Signed),
            "CHARACTER" => Some(Self::Character),
            "CHARSET" => Some(Self::Charset),
            "COLLATE" => Some(Self::Collate),
            "COMMENT" => Some(Self::Comment),
            "NATIONAL" => Some(Self::National),
            "VARYING" => Some(Self::Varying),
            "PRECISION" => Some(Self::Precision),
            "BINARY" => Some(Self::Binary),
            "GENERATED" => Some(Self::Generated),
            "ALWAYS" => Some(Self::Always),
            "VISIBLE" => Some(Self::Visible),
            "INVISIBLE" => Some(Self::Invisible),
            "USING" => Some(Self::Using),
            "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            "ENGINE" => Some(Self::Engine),
            "TRUE" => Some(Self::True),
            "FALSE" => Some(Self::False),
            _ => None,
        }
    }

    /// Returns the canonical spelling of the keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Alter => "ALTER",
            Self::Drop => "DROP",
            Self::Rename => "RENAME",
            Self::Use => "USE",
            Self::Table => "TABLE",
            Self::Temporary => "TEMPORARY",
            Self::Database => "DATABASE",
            Self::Schema => "SCHEMA",
            Self::Like => "LIKE",
            Self::If => "IF",
            Self::Not => "NOT",
            Self::Exists => "EXISTS",
            Self::Primary => "PRIMARY",
            Self::Key => "KEY",
            Self::Index => "INDEX",
            Self::Unique => "UNIQUE",
            Self::Fulltext => "FULLTEXT",
            Self::Spatial => "SPATIAL",
            Self::Foreign => "FOREIGN",
            Self::References => "REFERENCES",
            Self::Constraint => "CONSTRAINT",
            Self::Check => "CHECK",
            Self::Enforced => "ENFORCED",
            Self::Match => "MATCH",
            Self::Full => "FULL",
            Self::Partial => "PARTIAL",
            Self::Simple => "SIMPLE",
            Self::On => "ON",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Cascade => "CASCADE",
            Self::Restrict => "RESTRICT",
            Self::Set => "SET",
            Self::No => "NO",
            Self::Action => "ACTION",
            Self::Add => "ADD",
            Self::Column => "COLUMN",
            Self::Modify => "MODIFY",
            Self::Change => "CHANGE",
            Self::To => "TO",
            Self::As => "AS",
            Self::First => "FIRST",
            Self::After => "AFTER",
            Self::Default => "DEFAULT",
            Self::Null => "NULL",
            Self::AutoIncrement => "AUTO_INCREMENT",
            Self::Unsigned => "UNSIGNED",
            Self::Zerofill => "ZEROFILL",
            Self::Signed => "SIGNED",
            Self::Character => "CHARACTER",
            Self::Charset => "CHARSET",
            Self::Collate => "COLLATE",
            Self::Comment => "COMMENT",
            Self::National => "NATIONAL",
            Self::Varying => "VARYING",
            Self::Precision => "PRECISION",
            Self::Binary => "BINARY",
            Self::Generated => "GENERATED",
            Self::Always => "ALWAYS",
            Self::Visible => "VISIBLE",
            Self::Invisible => "INVISIBLE",
            Self::Using => "USING",
            Self::Asc => "ASC",
            Self::Desc => "DESC",
            Self::Engine => "ENGINE",
            Self::True => "TRUE",
            Self::False => "FALSE",
        }
    }
}

/// Token kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    /// Numeric literal, kept as written (`42`, `1.50`, `2e3`).
    Number(String),
    /// String literal with quotes removed and escapes resolved.
    String(String),
    /// Hexadecimal literal (`X'4142'` or `0x4142`), digits only.
    HexString(String),
    /// Bit-value literal (`b'101'` or `0b101`), digits only.
    BitString(String),

    // Identifiers and keywords
    /// Bare or backtick-quoted identifier.
    Identifier(String),
    /// Keyword.
    Keyword(Keyword),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Bang,
    Ampersand,
    Pipe,
    Caret,
    Tilde,
    At,

    // Delimiters
    LeftParen,
    RightParen,
    Comma,
    Semicolon,
    Dot,
    Colon,

    // Special
    /// End of input.
    Eof,
    /// Lexing error.
    Error(String),
}

/// A token with its kind and location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The location in the source.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_from_str() {
        assert_eq!(Keyword::from_str("create"), Some(Keyword::Create));
        assert_eq!(Keyword::from_str("Auto_Increment"), Some(Keyword::AutoIncrement));
        assert_eq!(Keyword::from_str("varchar"), None);
    }

    #[test]
    fn test_keyword_as_str_round_trips() {
        for kw in [Keyword::Primary, Keyword::AutoIncrement, Keyword::Fulltext] {
            assert_eq!(Keyword::from_str(kw.as_str()), Some(kw));
        }
    }

    #[test]
    fn test_token_as_keyword() {
        let token = Token::new(TokenKind::Keyword(Keyword::Table), Span::new(0, 5));
        assert_eq!(token.as_keyword(), Some(Keyword::Table));
        assert!(Token::new(TokenKind::Eof, Span::default()).is_eof());
    }
}
