//! DDL tokenizer implementation.

use super::{Keyword, Span, Token, TokenKind};

/// A lexer that tokenizes MySQL DDL input.
pub struct Lexer<'a> {
    /// The input source code.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
        }
    }

    /// Returns the source text the lexer was created with.
    #[must_use]
    pub const fn source(&self) -> &'a str {
        self.input
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns the next character without advancing.
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Skips whitespace and comments (`-- `, `#` and `/* */`).
    ///
    /// Versioned comments (`/*!40101 ... */`) are skipped as well.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.advance();
            }

            let line_comment = (self.peek() == Some('-') && self.peek_next() == Some('-'))
                || self.peek() == Some('#');
            if line_comment {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.advance();
                }
                continue;
            }

            if self.peek() == Some('/') && self.peek_next() == Some('*') {
                self.advance(); // /
                self.advance(); // *
                loop {
                    match self.advance() {
                        Some('*') if self.peek() == Some('/') => {
                            self.advance();
                            break;
                        }
                        None => break,
                        _ => {}
                    }
                }
                continue;
            }

            break;
        }
    }

    /// Creates a span from start to current position.
    const fn make_span(&self) -> Span {
        Span::new(self.start, self.pos)
    }

    /// Creates a token with the current span.
    const fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.make_span())
    }

    fn is_identifier_char(c: char) -> bool {
        c.is_alphanumeric() || c == '_' || c == '$'
    }

    /// Scans an identifier or keyword.
    fn scan_identifier(&mut self) -> Token {
        while self.peek().is_some_and(Self::is_identifier_char) {
            self.advance();
        }

        let text = &self.input[self.start..self.pos];

        if let Some(keyword) = Keyword::from_str(text) {
            self.make_token(TokenKind::Keyword(keyword))
        } else {
            self.make_token(TokenKind::Identifier(String::from(text)))
        }
    }

    /// Scans a backtick-quoted identifier.
    fn scan_quoted_identifier(&mut self) -> Token {
        self.advance(); // consume opening backtick
        let mut value = String::new();

        loop {
            match self.advance() {
                Some('`') if self.peek() == Some('`') => {
                    value.push('`');
                    self.advance();
                }
                Some('`') => break,
                Some(c) => value.push(c),
                None => {
                    return self.make_token(TokenKind::Error(String::from(
                        "Unterminated quoted identifier",
                    )));
                }
            }
        }

        self.make_token(TokenKind::Identifier(value))
    }

    /// Scans a number, or a `0x`/`0b` literal.
    fn scan_number(&mut self) -> Token {
        if self.peek() == Some('0') {
            match self.peek_next() {
                Some('x' | 'X') => return self.scan_prefixed_digits(16),
                Some('b' | 'B') => return self.scan_prefixed_digits(2),
                _ => {}
            }
        }

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance(); // consume .
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if self.peek().is_some_and(|c| c == 'e' || c == 'E') {
            self.advance(); // consume e/E
            if self.peek().is_some_and(|c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = &self.input[self.start..self.pos];
        self.make_token(TokenKind::Number(String::from(text)))
    }

    /// Scans `0x1F` / `0b101` style literals.
    fn scan_prefixed_digits(&mut self, radix: u32) -> Token {
        self.advance(); // 0
        self.advance(); // x or b
        let digits_start = self.pos;
        while self.peek().is_some_and(|c| c.is_digit(radix)) {
            self.advance();
        }
        let digits = String::from(&self.input[digits_start..self.pos]);
        if digits.is_empty() {
            return self.make_token(TokenKind::Error(String::from("Malformed numeric literal")));
        }
        if radix == 16 {
            self.make_token(TokenKind::HexString(digits))
        } else {
            self.make_token(TokenKind::BitString(digits))
        }
    }

    /// Scans a single- or double-quoted string literal.
    fn scan_string(&mut self, quote: char) -> Token {
        self.advance(); // consume opening quote
        let mut value = String::new();

        loop {
            match self.advance() {
                Some(c) if c == quote => {
                    if self.peek() == Some(quote) {
                        value.push(quote);
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some('\\') => match self.advance() {
                    Some('0') => value.push('\0'),
                    Some('b') => value.push('\u{8}'),
                    Some('n') => value.push('\n'),
                    Some('r') => value.push('\r'),
                    Some('t') => value.push('\t'),
                    Some('Z') => value.push('\u{1a}'),
                    Some(c @ ('%' | '_')) => {
                        value.push('\\');
                        value.push(c);
                    }
                    Some(c) => value.push(c),
                    None => break,
                },
                Some(c) => value.push(c),
                None => {
                    return self.make_token(TokenKind::Error(String::from(
                        "Unterminated string literal",
                    )));
                }
            }
        }

        self.make_token(TokenKind::String(value))
    }

    /// Scans `X'..'` and `B'..'` literals.
    fn scan_quoted_digits(&mut self, radix: u32) -> Token {
        self.advance(); // consume X/B
        self.advance(); // consume opening quote
        let digits_start = self.pos;
        while self.peek().is_some_and(|c| c.is_digit(radix)) {
            self.advance();
        }
        let digits = String::from(&self.input[digits_start..self.pos]);
        if self.peek() != Some('\'') {
            return self.make_token(TokenKind::Error(String::from(
                "Invalid character in hex or bit literal",
            )));
        }
        self.advance(); // consume closing quote
        if radix == 16 {
            self.make_token(TokenKind::HexString(digits))
        } else {
            self.make_token(TokenKind::BitString(digits))
        }
    }

    /// Scans the next token.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        self.start = self.pos;

        let Some(c) = self.advance() else {
            return self.make_token(TokenKind::Eof);
        };

        match c {
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            ',' => self.make_token(TokenKind::Comma),
            ';' => self.make_token(TokenKind::Semicolon),
            '+' => self.make_token(TokenKind::Plus),
            '-' => self.make_token(TokenKind::Minus),
            '*' => self.make_token(TokenKind::Star),
            '/' => self.make_token(TokenKind::Slash),
            '%' => self.make_token(TokenKind::Percent),
            '~' => self.make_token(TokenKind::Tilde),
            '^' => self.make_token(TokenKind::Caret),
            '@' => self.make_token(TokenKind::At),
            ':' => self.make_token(TokenKind::Colon),
            '=' => self.make_token(TokenKind::Eq),
            '&' => self.make_token(TokenKind::Ampersand),
            '|' => self.make_token(TokenKind::Pipe),
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                self.pos = self.start;
                self.scan_number()
            }
            '.' => self.make_token(TokenKind::Dot),
            '<' => {
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::LtEq)
                } else if self.peek() == Some('>') {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                } else {
                    self.make_token(TokenKind::Lt)
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::GtEq)
                } else {
                    self.make_token(TokenKind::Gt)
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                } else {
                    self.make_token(TokenKind::Bang)
                }
            }

            '\'' | '"' => {
                self.pos = self.start;
                self.scan_string(c)
            }

            '`' => {
                self.pos = self.start;
                self.scan_quoted_identifier()
            }

            'X' | 'x' if self.peek() == Some('\'') => {
                self.pos = self.start;
                self.scan_quoted_digits(16)
            }
            'B' | 'b' if self.peek() == Some('\'') => {
                self.pos = self.start;
                self.scan_quoted_digits(2)
            }

            c if c.is_ascii_digit() => {
                self.pos = self.start;
                self.scan_number()
            }

            c if c.is_alphabetic() || c == '_' || c == '$' => {
                self.pos = self.start;
                self.scan_identifier()
            }

            _ => self.make_token(TokenKind::Error(format!("Unexpected character: {c}"))),
        }
    }

    /// Tokenizes the entire input and returns all tokens.
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

/// Splits a script into statement spans on `;` tokens.
///
/// Terminators inside strings, quoted identifiers and comments do not
/// split. Empty statements (blank fragments, comment-only fragments,
/// repeated terminators) are dropped. Each span runs from the first
/// token of the statement to the end of its last token.
#[must_use]
pub fn split_statements(input: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut current: Option<Span> = None;
    let mut lexer = Lexer::new(input);

    loop {
        let token = lexer.next_token();
        match token.kind {
            TokenKind::Eof => break,
            TokenKind::Semicolon => {
                if let Some(span) = current.take() {
                    spans.push(span);
                }
            }
            _ => {
                current = Some(current.map_or(token.span, |span| span.merge(token.span)));
            }
        }
    }

    if let Some(span) = current {
        spans.push(span);
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn ident(s: &str) -> TokenKind {
        TokenKind::Identifier(String::from(s))
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(token_kinds("   \n\t  "), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            token_kinds("CREATE -- note\n# hash\n/* block */ TABLE /*!40101 SET x */"),
            vec![
                TokenKind::Keyword(Keyword::Create),
                TokenKind::Keyword(Keyword::Table),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(
            token_kinds("create Table auto_increment"),
            vec![
                TokenKind::Keyword(Keyword::Create),
                TokenKind::Keyword(Keyword::Table),
                TokenKind::Keyword(Keyword::AutoIncrement),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            token_kinds("users `order` `we``ird` varchar"),
            vec![
                ident("users"),
                ident("order"),
                ident("we`ird"),
                ident("varchar"),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_quoted_keyword_is_identifier() {
        assert_eq!(token_kinds("`key`"), vec![ident("key"), TokenKind::Eof]);
    }

    #[test]
    fn test_numbers_keep_their_text() {
        assert_eq!(
            token_kinds("42 1.50 2e3 .5"),
            vec![
                TokenKind::Number(String::from("42")),
                TokenKind::Number(String::from("1.50")),
                TokenKind::Number(String::from("2e3")),
                TokenKind::Number(String::from(".5")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_strings_and_escapes() {
        assert_eq!(
            token_kinds(r#"'it''s' "dq" 'a\'b' 'x\ny'"#),
            vec![
                TokenKind::String(String::from("it's")),
                TokenKind::String(String::from("dq")),
                TokenKind::String(String::from("a'b")),
                TokenKind::String(String::from("x\ny")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_hex_and_bit_literals() {
        assert_eq!(
            token_kinds("X'4142' 0x4142 b'101' 0b101"),
            vec![
                TokenKind::HexString(String::from("4142")),
                TokenKind::HexString(String::from("4142")),
                TokenKind::BitString(String::from("101")),
                TokenKind::BitString(String::from("101")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let kinds = token_kinds("'abc");
        assert!(matches!(&kinds[0], TokenKind::Error(msg) if msg.contains("Unterminated")));
    }

    #[test]
    fn test_delimiters_and_operators() {
        assert_eq!(
            token_kinds("( ) , ; . = <> != <= >="),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::Comma,
                TokenKind::Semicolon,
                TokenKind::Dot,
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::NotEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_span_tracking() {
        let tokens = Lexer::new("CREATE `t`").tokenize();
        assert_eq!(tokens[0].span, Span::new(0, 6));
        assert_eq!(tokens[1].span, Span::new(7, 10));
    }

    #[test]
    fn test_split_statements() {
        let input = "CREATE TABLE a (x INT);\n\n  ;CREATE TABLE b (y VARCHAR(2) DEFAULT ';');  ";
        let texts: Vec<&str> = split_statements(input)
            .into_iter()
            .map(|s| &input[s.start..s.end])
            .collect();
        assert_eq!(
            texts,
            vec![
                "CREATE TABLE a (x INT)",
                "CREATE TABLE b (y VARCHAR(2) DEFAULT ';')"
            ]
        );
    }

    #[test]
    fn test_split_ignores_comment_only_fragments() {
        let input = "-- header ; still comment\n/* ; */\nCREATE TABLE a (x INT)";
        let spans = split_statements(input);
        assert_eq!(spans.len(), 1);
        assert_eq!(&input[spans[0].start..spans[0].end], "CREATE TABLE a (x INT)");
    }
}
