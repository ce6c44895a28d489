//! Part 21 (STEP physical file format) lexer.
//!
//! Splits an exchange file into tokens: keywords, `#n` instance names,
//! quoted strings, numbers, `.ENUM.` literals and punctuation. Comments
//! (`/* ... */`) and whitespace are skipped.

use crate::error::StepError;

/// A token in a STEP file.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Keyword or identifier (e.g., `CARTESIAN_POINT`, `DATA`).
    Keyword(String),
    /// Entity reference (e.g., `#123` becomes `EntityRef(123)`).
    EntityRef(u64),
    /// String literal (contents without quotes, `''` unescaped).
    String(String),
    /// Real number.
    Real(f64),
    /// Integer number.
    Integer(i64),
    /// Enumeration (e.g., `.T.` becomes `Enum("T")`).
    Enum(String),
    /// Left parenthesis `(`.
    LParen,
    /// Right parenthesis `)`.
    RParen,
    /// Comma `,`.
    Comma,
    /// Semicolon `;`.
    Semicolon,
    /// Equals `=`.
    Equals,
    /// Asterisk `*` (derived value marker).
    Asterisk,
    /// Dollar `$` (null/unset value marker).
    Dollar,
}

/// Position in the source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub col: usize,
}

/// A token with its position in the source.
#[derive(Debug, Clone)]
pub struct SpannedToken {
    /// The token.
    pub token: Token,
    /// Position where the token starts.
    pub pos: Position,
}

/// Lexer for Part 21 STEP files.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Tokenize the entire input.
    pub fn tokenize(&mut self) -> Result<Vec<SpannedToken>, StepError> {
        let mut tokens = Vec::new();
        while let Some(tok) = self.next_token()? {
            tokens.push(tok);
        }
        Ok(tokens)
    }

    /// Get the next token, or `None` if at end of input.
    pub fn next_token(&mut self) -> Result<Option<SpannedToken>, StepError> {
        self.skip_whitespace_and_comments();

        let Some(ch) = self.peek() else {
            return Ok(None);
        };
        let pos = self.position();

        let token = match ch {
            b'(' => self.punct(Token::LParen),
            b')' => self.punct(Token::RParen),
            b',' => self.punct(Token::Comma),
            b';' => self.punct(Token::Semicolon),
            b'=' => self.punct(Token::Equals),
            b'*' => self.punct(Token::Asterisk),
            b'$' => self.punct(Token::Dollar),
            b'#' => self.read_entity_ref()?,
            b'\'' => self.read_string()?,
            b'.' => self.read_enum()?,
            b'-' | b'+' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit() || c == b'.') => {
                self.read_number()?
            }
            b'0'..=b'9' => self.read_number()?,
            b'A'..=b'Z' | b'a'..=b'z' | b'_' => self.read_keyword(),
            _ => return Err(self.error_here(format!("unexpected character: '{}'", ch as char))),
        };

        Ok(Some(SpannedToken { token, pos }))
    }

    fn position(&self) -> Position {
        Position {
            line: self.line,
            col: self.col,
        }
    }

    fn error_here(&self, message: impl Into<String>) -> StepError {
        StepError::lexer(self.line, self.col, message)
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn punct(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    /// Consume bytes while `pred` holds and return them as a string.
    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> String {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.advance();
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            self.take_while(|c| c.is_ascii_whitespace());
            if self.peek() == Some(b'/') && self.peek_at(1) == Some(b'*') {
                self.advance();
                self.advance();
                while self.peek().is_some() {
                    if self.peek() == Some(b'*') && self.peek_at(1) == Some(b'/') {
                        self.advance();
                        self.advance();
                        break;
                    }
                    self.advance();
                }
                continue;
            }
            break;
        }
    }

    fn read_entity_ref(&mut self) -> Result<Token, StepError> {
        let start = self.position();
        self.advance(); // '#'
        let digits = self.take_while(|c| c.is_ascii_digit());
        if digits.is_empty() {
            return Err(StepError::lexer(start.line, start.col, "expected digits after '#'"));
        }
        digits.parse().map(Token::EntityRef).map_err(|_| {
            StepError::lexer(start.line, start.col, format!("invalid entity ID: {digits}"))
        })
    }

    fn read_string(&mut self) -> Result<Token, StepError> {
        let start = self.position();
        self.advance(); // opening quote

        let mut content = Vec::new();
        loop {
            match self.advance() {
                None => return Err(StepError::lexer(start.line, start.col, "unterminated string")),
                Some(b'\'') if self.peek() == Some(b'\'') => {
                    self.advance();
                    content.push(b'\'');
                }
                Some(b'\'') => break,
                Some(ch) => content.push(ch),
            }
        }
        Ok(Token::String(String::from_utf8_lossy(&content).into_owned()))
    }

    fn read_enum(&mut self) -> Result<Token, StepError> {
        let start = self.position();
        self.advance(); // opening '.'
        let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == b'_');
        if self.advance() != Some(b'.') {
            return Err(StepError::lexer(start.line, start.col, "unterminated enumeration"));
        }
        if name.is_empty() {
            return Err(StepError::lexer(start.line, start.col, "empty enumeration"));
        }
        Ok(Token::Enum(name.to_ascii_uppercase()))
    }

    /// Integers are `[sign] digits`. Anything with a decimal point or an
    /// exponent is real; Part 21 allows an empty fraction (`1.`, `1.E-07`).
    fn read_number(&mut self) -> Result<Token, StepError> {
        let start = self.position();
        let mut text = String::new();

        if let Some(sign @ (b'-' | b'+')) = self.peek() {
            self.advance();
            text.push(sign as char);
        }
        text.push_str(&self.take_while(|c| c.is_ascii_digit()));

        let mut is_real = false;
        if self.peek() == Some(b'.') {
            is_real = true;
            self.advance();
            text.push('.');
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }

        if let Some(b'E' | b'e') = self.peek() {
            is_real = true;
            self.advance();
            text.push('E');
            if let Some(sign @ (b'-' | b'+')) = self.peek() {
                self.advance();
                text.push(sign as char);
            }
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }

        if is_real {
            text.parse().map(Token::Real).map_err(|_| {
                StepError::lexer(start.line, start.col, format!("invalid real number: {text}"))
            })
        } else {
            text.parse().map(Token::Integer).map_err(|_| {
                StepError::lexer(start.line, start.col, format!("invalid integer: {text}"))
            })
        }
    }

    fn read_keyword(&mut self) -> Token {
        // Hyphens appear in ISO-10303-21 and END-ISO-10303-21.
        let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == b'_' || c == b'-');
        Token::Keyword(name.to_ascii_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input.as_bytes());
        lexer
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|st| st.token)
            .collect()
    }

    #[test]
    fn test_entity_ref() {
        assert_eq!(tokenize("#123"), vec![Token::EntityRef(123)]);
        assert!(Lexer::new(b"#x").tokenize().is_err());
    }

    #[test]
    fn test_string_with_escaped_quote() {
        assert_eq!(tokenize("'hello'"), vec![Token::String("hello".into())]);
        assert_eq!(tokenize("'it''s'"), vec![Token::String("it's".into())]);
        assert_eq!(tokenize("''"), vec![Token::String(String::new())]);
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new(b"'abc").tokenize().unwrap_err();
        assert!(matches!(err, StepError::Lexer { line: 1, col: 1, .. }));
    }

    #[test]
    fn test_enum() {
        assert_eq!(tokenize(".T."), vec![Token::Enum("T".into())]);
        assert_eq!(tokenize(".milli."), vec![Token::Enum("MILLI".into())]);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(tokenize("42"), vec![Token::Integer(42)]);
        assert_eq!(tokenize("-7"), vec![Token::Integer(-7)]);
        assert_eq!(tokenize("3.25"), vec![Token::Real(3.25)]);
        assert_eq!(tokenize("-1.5E-10"), vec![Token::Real(-1.5e-10)]);
        assert_eq!(tokenize("2.0E3"), vec![Token::Real(2000.0)]);
    }

    #[test]
    fn test_reals_with_empty_fraction() {
        assert_eq!(tokenize("1."), vec![Token::Real(1.0)]);
        assert_eq!(tokenize("1.E-07"), vec![Token::Real(1e-7)]);
        assert_eq!(tokenize("0.E0"), vec![Token::Real(0.0)]);
        assert_eq!(tokenize("-.5"), vec![Token::Real(-0.5)]);
    }

    #[test]
    fn test_rust_exponent_format_round_trips() {
        let text = format!("{:.15E}", -123.456);
        assert_eq!(tokenize(&text), vec![Token::Real(-123.456)]);
    }

    #[test]
    fn test_keywords() {
        assert_eq!(tokenize("data"), vec![Token::Keyword("DATA".into())]);
        assert_eq!(
            tokenize("END-ISO-10303-21"),
            vec![Token::Keyword("END-ISO-10303-21".into())]
        );
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            tokenize("()=,;*$"),
            vec![
                Token::LParen,
                Token::RParen,
                Token::Equals,
                Token::Comma,
                Token::Semicolon,
                Token::Asterisk,
                Token::Dollar,
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(tokenize("/* comment */ #1"), vec![Token::EntityRef(1)]);
        assert_eq!(
            tokenize("#1 /* inline */ #2"),
            vec![Token::EntityRef(1), Token::EntityRef(2)]
        );
    }

    #[test]
    fn test_complex_instance() {
        let tokens = tokenize("#7=(LENGTH_UNIT()NAMED_UNIT(*)SI_UNIT(.MILLI.,.METRE.));");
        assert_eq!(tokens[2], Token::LParen);
        assert_eq!(tokens[3], Token::Keyword("LENGTH_UNIT".into()));
        assert_eq!(tokens[8], Token::Asterisk);
        assert_eq!(tokens[12], Token::Enum("MILLI".into()));
    }

    #[test]
    fn test_positions() {
        let mut lexer = Lexer::new(b"#1\n  =");
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens[1].pos, Position { line: 2, col: 3 });
    }
}
